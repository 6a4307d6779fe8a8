//! Game orchestrator: command dispatch and the turn machine.
//!
//! [`Game`] owns the configuration, the capability table, and the state.
//! Every player input goes through [`Game::submit`], which:
//! 1. Checks the command against the phase and the player's stage
//! 2. Runs the mode's legality check
//! 3. Applies the effect through a [`TurnContext`]
//! 4. Advances stages (follow-up, block wait, or turn end)
//! 5. Resolves a pending block combat once both blocks are in
//! 6. Checks whether either side has lost every fort
//!
//! # Invariants
//!
//! - A rejected command leaves the state untouched
//! - At most one attack is pending, and none survives a turn end
//! - Once finished, the game accepts no further commands
//!
//! # Example
//!
//! ```
//! use broadside_core::config::GameConfig;
//! use broadside_core::game::{Command, Game};
//! use broadside_core::ship::Player;
//! use broadside_core::state::{Phase, Stage};
//!
//! let mut game = Game::new(GameConfig::default()).unwrap();
//! assert!(game.submit(Player::First, Command::Ready).unwrap().is_applied());
//! assert!(game.submit(Player::Second, Command::Ready).unwrap().is_applied());
//!
//! assert_eq!(game.state().phase(), Phase::Play);
//! assert_eq!(game.state().stage(Player::First), Stage::Move);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace};

use crate::action::{self, ActionMode, Continuation, Rules, TurnContext};
use crate::board::Position;
use crate::capability::{CapabilityError, CapabilityTable};
use crate::config::{ConfigError, GameConfig};
use crate::error::{ActionError, IllegalAction, InvariantViolation, Verdict};
use crate::event::Event;
use crate::resolver::{check_block, get_blocks, Block, CombatResolver};
use crate::ship::Player;
use crate::state::{GameOutcome, GameState, Phase, Stage};
use crate::view::PlayerView;

/// A player input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Finish placement.
    Ready,
    /// Placement-stage action.
    Place {
        /// Must be [`ActionMode::Place`].
        mode: ActionMode,
        /// First cell.
        from: Position,
        /// Second cell.
        to: Position,
    },
    /// Turn-opening action.
    Move {
        /// Any mode except place.
        mode: ActionMode,
        /// Acting ship.
        from: Position,
        /// Target cell.
        to: Position,
    },
    /// Follow-up action by the ship that moved or won.
    Attack {
        /// Attack, shoot, or explode.
        mode: ActionMode,
        /// Acting ship; must be the follow-up ship.
        from: Position,
        /// Target cell.
        to: Position,
    },
    /// End the turn without (further) action.
    Skip,
    /// Attacker's block declaration.
    AttackBlock(Block),
    /// Defender's block declaration.
    ResponseBlock(Block),
    /// Set or clear the player's private label on a ship.
    Label {
        /// Labeled cell.
        at: Position,
        /// Label text; empty clears it.
        text: String,
    },
}

impl Command {
    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Place { .. } => "place",
            Self::Move { .. } => "move",
            Self::Attack { .. } => "attack",
            Self::Skip => "skip",
            Self::AttackBlock(_) => "attackBlock",
            Self::ResponseBlock(_) => "responseBlock",
            Self::Label { .. } => "label",
        }
    }
}

/// Game could not be created.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Configuration is inconsistent.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Capability table is inconsistent or incomplete.
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    /// Supplied state does not match the configuration.
    #[error("board size {board} does not match configured {config}")]
    BoardMismatch {
        /// Size of the supplied board.
        board: u16,
        /// Configured size.
        config: u16,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Attack,
    Response,
}

/// One game between two players.
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    table: CapabilityTable,
    state: GameState,
}

impl Game {
    /// Starts a game with the standard capability table.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if the configuration is invalid.
    pub fn new(config: GameConfig) -> Result<Self, SetupError> {
        Self::with_table(config, CapabilityTable::standard())
    }

    /// Starts a game with a custom capability table.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if the configuration or table is invalid, or
    /// the table lacks a kind from the roster.
    pub fn with_table(config: GameConfig, table: CapabilityTable) -> Result<Self, SetupError> {
        table.validate()?;
        table.covers(config.roster())?;
        let state = GameState::new(&config)?;
        info!(
            field = config.field_size,
            zone = config.placement_zone_size,
            ships = config.roster_len(),
            "game created"
        );
        Ok(Self {
            config,
            table,
            state,
        })
    }

    /// Resumes a game from an existing state.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if anything is inconsistent.
    pub fn from_state(
        config: GameConfig,
        table: CapabilityTable,
        state: GameState,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        table.validate()?;
        table.covers(state.board().ships().map(|(_, s)| s.kind))?;
        if state.board().size() != config.field_size {
            return Err(SetupError::BoardMismatch {
                board: state.board().size(),
                config: config.field_size,
            });
        }
        Ok(Self {
            config,
            table,
            state,
        })
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Capability table.
    #[must_use]
    pub fn table(&self) -> &CapabilityTable {
        &self.table
    }

    /// Outcome, once finished.
    #[must_use]
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.state.outcome()
    }

    /// `player`'s filtered view.
    #[must_use]
    pub fn view(&self, player: Player) -> PlayerView {
        PlayerView::new(&self.state, &self.config, player)
    }

    fn rules(&self) -> Rules<'_> {
        Rules::new(&self.state, &self.table, &self.config)
    }

    // =========================================================================
    // Command Entry Point
    // =========================================================================

    /// Submits `command` on behalf of `player`.
    ///
    /// Illegal commands return [`Verdict::Invalid`] and change nothing.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation`] if the state turns out inconsistent.
    /// The game should be discarded after such an error.
    pub fn submit(&mut self, player: Player, command: Command) -> Result<Verdict, InvariantViolation> {
        let name = command.name();
        let result = self.dispatch(player, command);
        Self::settle(result, player, name)
    }

    fn settle(
        result: Result<(), ActionError>,
        player: Player,
        command: &'static str,
    ) -> Result<Verdict, InvariantViolation> {
        match result {
            Ok(()) => {
                debug!(%player, command, "applied");
                Ok(Verdict::Applied)
            }
            Err(ActionError::Illegal(reason)) => {
                trace!(%player, command, %reason, "rejected");
                Ok(Verdict::Invalid(reason))
            }
            Err(ActionError::Invariant(violation)) => {
                error!(%player, command, %violation, "invariant violated");
                Err(violation)
            }
        }
    }

    fn dispatch(&mut self, player: Player, command: Command) -> Result<(), ActionError> {
        if let Phase::Finished(_) = self.state.phase {
            return Err(IllegalAction::GameFinished.into());
        }
        let stage = self.state.stage(player);

        match command {
            Command::Ready => self.ready(player),
            Command::Place { mode, from, to } => {
                if stage != Stage::Place {
                    return Err(IllegalAction::WrongStage(stage).into());
                }
                if mode != ActionMode::Place {
                    return Err(IllegalAction::ModeNotAllowed(mode).into());
                }
                self.perform(player, mode, from, to)
            }
            Command::Move { mode, from, to } => {
                if stage != Stage::Move {
                    return Err(IllegalAction::WrongStage(stage).into());
                }
                if mode == ActionMode::Place {
                    return Err(IllegalAction::ModeNotAllowed(mode).into());
                }
                self.perform(player, mode, from, to)
            }
            Command::Attack { mode, from, to } => {
                let Stage::Attack { from: origin } = stage else {
                    return Err(IllegalAction::WrongStage(stage).into());
                };
                if from != origin {
                    return Err(IllegalAction::WrongShip(origin).into());
                }
                if !ActionMode::FOLLOW_UPS.contains(&mode) {
                    return Err(IllegalAction::ModeNotAllowed(mode).into());
                }
                self.perform(player, mode, from, to)
            }
            Command::Skip => match stage {
                Stage::Move | Stage::Attack { .. } => {
                    self.end_turn();
                    Ok(())
                }
                _ => Err(IllegalAction::WrongStage(stage).into()),
            },
            Command::AttackBlock(block) => self.declare(player, block, Side::Attack),
            Command::ResponseBlock(block) => self.declare(player, block, Side::Response),
            Command::Label { at, text } => self.label(player, at, text),
        }
    }

    // =========================================================================
    // Phase and Turn Machine
    // =========================================================================

    fn ready(&mut self, player: Player) -> Result<(), ActionError> {
        if self.state.phase != Phase::Placement {
            return Err(IllegalAction::WrongPhase.into());
        }
        if self.state.is_ready(player) {
            return Err(IllegalAction::AlreadyReady.into());
        }
        self.state.ready[player.index()] = true;
        self.state.set_stage(player, Stage::Wait);
        self.state.append(Event::Ready { player });

        if self.state.ready == [true, true] {
            self.state.phase = Phase::Play;
            self.state.current = Player::First;
            self.state.set_stage(Player::First, Stage::Move);
            self.state.set_stage(Player::Second, Stage::Wait);
            info!("placement finished, play begins");
            self.check_terminal();
        }
        Ok(())
    }

    fn perform(
        &mut self,
        player: Player,
        mode: ActionMode,
        from: Position,
        to: Position,
    ) -> Result<(), ActionError> {
        let resolver = action::resolver_for(mode);
        resolver.can(self.rules(), player, from, to)?;
        let next = {
            let mut ctx = TurnContext::new(&mut self.state, &self.table, player);
            resolver.take(&mut ctx, from, to)?
        };
        debug!(%player, ?mode, %from, %to, "action taken");
        self.advance(player, next)?;
        Ok(())
    }

    fn advance(&mut self, player: Player, next: Continuation) -> Result<(), InvariantViolation> {
        match next {
            Continuation::Stay => {}
            Continuation::EndTurn => self.end_turn(),
            Continuation::FollowUp(pos) => {
                let ours = self
                    .state
                    .board
                    .get(pos)
                    .is_some_and(|s| s.is_owned_by(player));
                if ours && action::has_follow_up(self.rules(), player, pos) {
                    self.state.set_stage(player, Stage::Attack { from: pos });
                } else {
                    self.end_turn();
                }
            }
            Continuation::AwaitBlocks => {
                if self.state.pending.is_none() {
                    return Err(InvariantViolation::NoPendingAttack);
                }
                self.state.set_stage(player, Stage::AttackBlock);
                self.state.set_stage(player.opponent(), Stage::ResponseBlock);
            }
        }
        self.check_terminal();
        Ok(())
    }

    fn end_turn(&mut self) {
        let player = self.state.current;
        self.state.pending = None;
        self.state.clear_flags();
        self.state.append(Event::TurnEnd { player });

        let next = player.opponent();
        self.state.set_stage(player, Stage::Wait);
        self.state.set_stage(next, Stage::Move);
        self.state.current = next;
        self.state.turn += 1;
        debug!(turn = self.state.turn, %next, "turn passed");
    }

    fn check_terminal(&mut self) {
        if self.state.phase != Phase::Play {
            return;
        }
        let fort = self.table.roles().fort;
        let held = Player::BOTH.map(|p| self.state.forts_held(fort, p));
        let outcome = match held {
            [0, 0] => GameOutcome::Draw,
            [0, _] => GameOutcome::Winner(Player::Second),
            [_, 0] => GameOutcome::Winner(Player::First),
            _ => return,
        };
        self.state.phase = Phase::Finished(outcome);
        self.state.pending = None;
        for p in Player::BOTH {
            self.state.set_stage(p, Stage::Wait);
        }
        info!(?outcome, turn = self.state.turn, "game over");
    }

    // =========================================================================
    // Block Combat
    // =========================================================================

    fn declare(&mut self, player: Player, block: Block, side: Side) -> Result<(), ActionError> {
        let expected = match side {
            Side::Attack => Stage::AttackBlock,
            Side::Response => Stage::ResponseBlock,
        };
        let stage = self.state.stage(player);
        if stage != expected {
            return Err(IllegalAction::WrongStage(stage).into());
        }
        let pending = self
            .state
            .pending
            .as_ref()
            .ok_or(InvariantViolation::NoPendingAttack)?;
        let (filled, anchor) = match side {
            Side::Attack => (pending.attack_block.is_some(), pending.from),
            Side::Response => (pending.response_block.is_some(), pending.to),
        };
        if filled {
            return Err(IllegalAction::AlreadyDeclared.into());
        }
        if !block.contains(anchor) {
            return Err(IllegalAction::BlockMissingAnchor(anchor).into());
        }
        check_block(
            &self.state.board,
            &self.table,
            player,
            block.declared,
            usize::from(block.size),
            &block.coords,
        )?;

        let event = Event::Response {
            declared_size: block.size,
            declared_type: block.declared,
            player,
        };
        let pending = self
            .state
            .pending
            .as_mut()
            .ok_or(InvariantViolation::NoPendingAttack)?;
        match side {
            Side::Attack => pending.attack_block = Some(block),
            Side::Response => pending.response_block = Some(block),
        }
        let ready = pending.blocks().is_some();
        self.state.append(event);
        self.state.set_stage(player, Stage::Wait);

        if ready {
            self.resolve_pending()?;
        }
        Ok(())
    }

    fn resolve_pending(&mut self) -> Result<(), InvariantViolation> {
        let pending = self
            .state
            .pending
            .take()
            .ok_or(InvariantViolation::NoPendingAttack)?;
        let (Some(attack), Some(response)) = (pending.attack_block, pending.response_block) else {
            return Err(InvariantViolation::MissingBlock);
        };
        let outcome = CombatResolver::resolve(&self.table, &attack, &response)?;
        let attacker = self.state.current;
        let next = {
            let mut ctx = TurnContext::new(&mut self.state, &self.table, attacker);
            CombatResolver::apply(
                &mut ctx,
                pending.from,
                pending.to,
                outcome,
                Some((&attack, &response)),
            )?
        };
        self.state.set_stage(attacker.opponent(), Stage::Wait);
        self.advance(attacker, next)
    }

    /// Blocks `player` may declare for the pending attack.
    ///
    /// Empty unless `player` is in a block-declaration stage.
    #[must_use]
    pub fn block_candidates(&self, player: Player) -> Vec<Block> {
        let Some(pending) = self.state.pending() else {
            return Vec::new();
        };
        let anchor = match self.state.stage(player) {
            Stage::AttackBlock => pending.from,
            Stage::ResponseBlock => pending.to,
            _ => return Vec::new(),
        };
        get_blocks(self.state.board(), &self.table, player, anchor)
    }

    // =========================================================================
    // Queries and Conveniences
    // =========================================================================

    /// Cells `player` could target from `from` in `mode`.
    #[must_use]
    pub fn legal_targets(&self, player: Player, mode: ActionMode, from: Position) -> Vec<Position> {
        action::legal_targets(self.rules(), player, mode, from)
    }

    fn label(&mut self, player: Player, at: Position, text: String) -> Result<(), ActionError> {
        if !self.state.board.contains(at) {
            return Err(IllegalAction::OutOfBounds(at).into());
        }
        if self.state.phase == Phase::Placement && !self.config.in_zone(player, at) {
            return Err(IllegalAction::LabelHidden(at).into());
        }
        let ship = self
            .state
            .board
            .get_mut(at)
            .ok_or(IllegalAction::EmptyCell(at))?;
        ship.labels[player.index()] = text;
        Ok(())
    }

    /// Randomly rearranges `player`'s zone with a seeded shuffle.
    ///
    /// The same seed on the same layout always gives the same result.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation`] only if the state is inconsistent.
    pub fn shuffle_zone(&mut self, player: Player, seed: u64) -> Result<Verdict, InvariantViolation> {
        let result = self.shuffle(player, seed);
        Self::settle(result, player, "shuffle")
    }

    fn shuffle(&mut self, player: Player, seed: u64) -> Result<(), ActionError> {
        if self.state.phase != Phase::Placement {
            return Err(IllegalAction::WrongPhase.into());
        }
        let stage = self.state.stage(player);
        if stage != Stage::Place {
            return Err(IllegalAction::WrongStage(stage).into());
        }
        let cells: Vec<Position> = self.config.zone_positions(player).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for i in (1..cells.len()).rev() {
            let j = rng.gen_range(0..=i);
            if i != j {
                self.perform(player, ActionMode::Place, cells[i], cells[j])?;
            }
        }
        Ok(())
    }
}
