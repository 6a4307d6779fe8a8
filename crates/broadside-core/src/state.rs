//! Authoritative game state.
//!
//! [`GameState`] is owned by [`Game`](crate::game::Game) and mutated only
//! through [`TurnContext`](crate::action::TurnContext) and the game's own
//! turn bookkeeping. External code reads it through accessors or a
//! [`PlayerView`](crate::view::PlayerView).
//!
//! # Stages
//!
//! Each player has a [`Stage`] saying which command family they may issue:
//!
//! ```text
//! Place ──Ready──▶ Wait ──(both ready)──▶ Move (player 0) / Wait (player 1)
//! Move ──move──▶ Attack{from} ──attack/shoot/explode/skip──▶ end turn
//! Move/Attack ──attack needing blocks──▶ AttackBlock / ResponseBlock
//! ```

use serde::{Deserialize, Serialize};

use crate::board::{Board, Position};
use crate::config::{ConfigError, GameConfig};
use crate::event::{Event, EventLog};
use crate::resolver::Block;
use crate::ship::{Owner, Player, Ship, ShipFlags, ShipKind};

/// How a finished game ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameOutcome {
    /// One player still holds a fort.
    Winner(Player),
    /// Neither player holds a fort.
    Draw,
}

/// Game-wide phase.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Players arrange their zones.
    Placement,
    /// Turns alternate.
    Play,
    /// No further commands are accepted.
    Finished(GameOutcome),
}

/// Per-player sub-stage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    /// Rearranging the placement zone.
    Place,
    /// Nothing to do until the opponent acts.
    Wait,
    /// Start of turn: move, or act in place.
    Move,
    /// Follow-up action restricted to the ship at `from`.
    Attack {
        /// The only ship allowed to act.
        from: Position,
    },
    /// Declare the attacking block.
    AttackBlock,
    /// Declare the defending block.
    ResponseBlock,
}

/// An attack waiting for both block declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAttack {
    /// Attacking ship cell.
    pub from: Position,
    /// Target ship cell.
    pub to: Position,
    /// Attacker's declaration, once made.
    pub attack_block: Option<Block>,
    /// Defender's declaration, once made.
    pub response_block: Option<Block>,
}

impl PendingAttack {
    /// A fresh pending attack with no declarations.
    #[must_use]
    pub fn new(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            attack_block: None,
            response_block: None,
        }
    }

    /// Both declarations, once both are present.
    #[must_use]
    pub fn blocks(&self) -> Option<(&Block, &Block)> {
        self.attack_block.as_ref().zip(self.response_block.as_ref())
    }
}

/// The full state of one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) phase: Phase,
    pub(crate) stages: [Stage; 2],
    pub(crate) ready: [bool; 2],
    pub(crate) current: Player,
    pub(crate) turn: u32,
    pub(crate) specials_used: [u32; 2],
    pub(crate) pending: Option<PendingAttack>,
    pub(crate) log: EventLog,
}

impl GameState {
    /// Builds the placement-phase state for a validated configuration.
    ///
    /// Each player's roster fills their zone in layout order; player 1's
    /// layout mirrors player 0's.
    ///
    /// # Errors
    ///
    /// Returns any [`ConfigError`] from [`GameConfig::validate`].
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut board = Board::new(config.field_size);
        for player in Player::BOTH {
            for (i, kind) in config.roster().enumerate() {
                let pos = config.starting_position(player, i);
                board.set(pos, Some(Ship::new(kind, Owner::Player(player))));
            }
        }
        Ok(Self {
            board,
            phase: Phase::Placement,
            stages: [Stage::Place, Stage::Place],
            ready: [false, false],
            current: Player::First,
            turn: 0,
            specials_used: [0, 0],
            pending: None,
            log: EventLog::new(),
        })
    }

    /// Builds a play-phase state from an explicit layout.
    ///
    /// Useful for puzzles and resumed games. Player 0 is to move.
    /// Ships placed off the board are dropped.
    ///
    /// # Arguments
    ///
    /// * `config` - Board dimensions
    /// * `ships` - `(cell, kind, owner)` triples
    ///
    /// # Errors
    ///
    /// Returns any [`ConfigError`] from [`GameConfig::validate`].
    pub fn from_layout(
        config: &GameConfig,
        ships: impl IntoIterator<Item = (Position, ShipKind, Owner)>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut board = Board::new(config.field_size);
        for (pos, kind, owner) in ships {
            board.set(pos, Some(Ship::new(kind, owner)));
        }
        Ok(Self {
            board,
            phase: Phase::Play,
            stages: [Stage::Move, Stage::Wait],
            ready: [true, true],
            current: Player::First,
            turn: 0,
            specials_used: [0, 0],
            pending: None,
            log: EventLog::new(),
        })
    }

    /// The board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// `player`'s sub-stage.
    #[must_use]
    pub fn stage(&self, player: Player) -> Stage {
        self.stages[player.index()]
    }

    /// Whether `player` has declared readiness.
    #[must_use]
    pub fn is_ready(&self, player: Player) -> bool {
        self.ready[player.index()]
    }

    /// Player whose turn it is.
    #[must_use]
    pub fn current_player(&self) -> Player {
        self.current
    }

    /// Completed turn count.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Shots and blasts fired by `player`.
    #[must_use]
    pub fn specials_used(&self, player: Player) -> u32 {
        self.specials_used[player.index()]
    }

    /// Attack awaiting block declarations.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingAttack> {
        self.pending.as_ref()
    }

    /// Event log.
    #[must_use]
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Outcome, once the game is finished.
    #[must_use]
    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.phase {
            Phase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub(crate) fn set_stage(&mut self, player: Player, stage: Stage) {
        self.stages[player.index()] = stage;
    }

    pub(crate) fn append(&mut self, event: Event) {
        self.log.append(self.turn, event);
    }

    pub(crate) fn clear_flags(&mut self) {
        for ship in self.board.ships_mut() {
            ship.flags = ShipFlags::empty();
        }
    }

    /// Number of forts of `kind` still controlled by `player`.
    pub(crate) fn forts_held(&self, fort: ShipKind, player: Player) -> usize {
        self.board
            .ships()
            .filter(|(_, s)| s.kind == fort && s.is_owned_by(player))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_lays_out_both_rosters() {
        let config = GameConfig::default();
        let state = GameState::new(&config).unwrap();

        assert_eq!(state.phase(), Phase::Placement);
        for p in Player::BOTH {
            assert_eq!(state.stage(p), Stage::Place);
            let owned = state.board().ships().filter(|(_, s)| s.is_owned_by(p)).count();
            assert_eq!(owned, 35);
        }
    }

    #[test]
    fn layouts_are_mirrored() {
        let config = GameConfig::default();
        let state = GameState::new(&config).unwrap();
        let board = state.board();

        for (pos, ship) in board.ships().filter(|(_, s)| s.is_owned_by(Player::First)) {
            let mirror = Position::new(13 - pos.row, pos.col);
            let other = board.get(mirror).unwrap();
            assert_eq!(other.kind, ship.kind);
            assert!(other.is_owned_by(Player::Second));
        }
    }

    #[test]
    fn ships_stay_in_zones() {
        let config = GameConfig::default();
        let state = GameState::new(&config).unwrap();
        for (pos, ship) in state.board().ships() {
            let owner = ship.owner.player().unwrap();
            assert!(config.in_zone(owner, pos));
        }
    }

    #[test]
    fn from_layout_starts_in_play() {
        let config = GameConfig::default();
        let state = GameState::from_layout(
            &config,
            [(Position::new(3, 3), ShipKind::Fort, Owner::Player(Player::First))],
        )
        .unwrap();
        assert_eq!(state.phase(), Phase::Play);
        assert_eq!(state.stage(Player::First), Stage::Move);
        assert_eq!(state.stage(Player::Second), Stage::Wait);
        assert_eq!(state.board().ships().count(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig {
            field_size: 4,
            placement_zone_size: 3,
            initial_ships: vec![],
        };
        assert!(GameState::new(&config).is_err());
    }

    #[test]
    fn pending_blocks_need_both_sides() {
        let mut pending = PendingAttack::new(Position::new(0, 0), Position::new(0, 1));
        assert!(pending.blocks().is_none());
        pending.attack_block = Some(Block::new(ShipKind::Cruiser, vec![Position::new(0, 0)]));
        assert!(pending.blocks().is_none());
        pending.response_block = Some(Block::new(ShipKind::Cruiser, vec![Position::new(0, 1)]));
        assert!(pending.blocks().is_some());
    }
}
