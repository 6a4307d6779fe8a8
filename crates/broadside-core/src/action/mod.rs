//! Action resolvers: legality checks and effects for each action mode.
//!
//! Every mode (place, move, attack, shoot, explode) has one
//! [`ActionResolver`] with three operations:
//! 1. [`can_from`](ActionResolver::can_from): may this ship start the action at all?
//! 2. [`can`](ActionResolver::can): is this exact `(from, to)` legal?
//! 3. [`take`](ActionResolver::take): apply it. Only called after `can` passed.
//!
//! Checks read the state through [`Rules`]; effects write through a
//! [`TurnContext`], which owns the only mutable handle to the state for the
//! duration of one command.
//!
//! # Invariants
//!
//! - `can_from` and `can` never mutate anything
//! - `take` is only invoked on a `(from, to)` pair that passed `can`
//! - Every ship removal goes through [`TurnContext::kill`], which logs it

mod attack;
pub(crate) mod explode;
mod movement;
mod place;
mod shoot;

pub use attack::AttackResolver;
pub use explode::ExplodeResolver;
pub use movement::{path_clear, MoveResolver};
pub use place::PlaceResolver;
pub use shoot::ShootResolver;

use serde::{Deserialize, Serialize};

use crate::board::Position;
use crate::capability::{CapabilityDescriptor, CapabilityTable};
use crate::config::GameConfig;
use crate::error::{ActionError, IllegalAction, InvariantViolation};
use crate::event::Event;
use crate::ship::{Owner, Player, Ship, ShipFlags, ShipKind};
use crate::state::GameState;

/// Kind of action a command performs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionMode {
    /// Swap two cells in the own zone.
    Place,
    /// Relocate a ship.
    Move,
    /// Melee attack on an adjacent ship.
    Attack,
    /// Ranged attack along a line.
    Shoot,
    /// Self-destructing blast.
    Explode,
}

impl ActionMode {
    /// Modes that can follow a move in the same turn.
    pub const FOLLOW_UPS: [ActionMode; 3] = [ActionMode::Attack, ActionMode::Shoot, ActionMode::Explode];
}

/// What the turn machine should do after an effect.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// Stay in the current stage.
    Stay,
    /// End the acting player's turn.
    EndTurn,
    /// Offer a follow-up action to the ship at the given cell.
    FollowUp(Position),
    /// Wait for both block declarations.
    AwaitBlocks,
}

/// Read-only view used by legality checks.
#[derive(Debug, Clone, Copy)]
pub struct Rules<'a> {
    /// Game state.
    pub state: &'a GameState,
    /// Capability table.
    pub table: &'a CapabilityTable,
    /// Static configuration.
    pub config: &'a GameConfig,
}

impl<'a> Rules<'a> {
    /// Bundles the three read-only inputs.
    #[must_use]
    pub fn new(state: &'a GameState, table: &'a CapabilityTable, config: &'a GameConfig) -> Self {
        Self {
            state,
            table,
            config,
        }
    }

    /// Ship at `pos` that `player` controls.
    ///
    /// # Errors
    ///
    /// Off-board, empty, and foreign cells are illegal.
    pub fn own_ship(&self, player: Player, pos: Position) -> Result<&'a Ship, IllegalAction> {
        let board = self.state.board();
        if !board.contains(pos) {
            return Err(IllegalAction::OutOfBounds(pos));
        }
        let ship = board.get(pos).ok_or(IllegalAction::EmptyCell(pos))?;
        if !ship.is_owned_by(player) {
            return Err(IllegalAction::NotOwner(pos));
        }
        Ok(ship)
    }

    /// Enemy ship at `pos`, from `player`'s point of view.
    ///
    /// # Errors
    ///
    /// Off-board, empty, own, and neutral cells are illegal.
    pub fn enemy_ship(&self, player: Player, pos: Position) -> Result<&'a Ship, IllegalAction> {
        let ship = self.occupied(pos)?;
        if !ship.is_enemy_of(player) {
            return Err(IllegalAction::NotEnemy(pos));
        }
        Ok(ship)
    }

    /// Any ship at `pos`.
    ///
    /// # Errors
    ///
    /// Off-board and empty cells are illegal.
    pub fn occupied(&self, pos: Position) -> Result<&'a Ship, IllegalAction> {
        let board = self.state.board();
        if !board.contains(pos) {
            return Err(IllegalAction::OutOfBounds(pos));
        }
        board.get(pos).ok_or(IllegalAction::EmptyCell(pos))
    }

    /// Descriptor for `kind`.
    ///
    /// # Errors
    ///
    /// A missing entry is an invariant violation.
    pub fn capability(&self, kind: ShipKind) -> Result<&'a CapabilityDescriptor, InvariantViolation> {
        self.table.get(kind)
    }

    /// Checks that a ship of `kind` standing at `at` has its escort.
    ///
    /// `vacated` is a cell that will be empty once the action completes
    /// (the mover's origin) and does not count as an escort.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalAction::EscortMissing`] when no own escort touches `at`.
    pub fn require_escort(
        &self,
        player: Player,
        kind: ShipKind,
        at: Position,
        vacated: Option<Position>,
    ) -> Result<(), ActionError> {
        let Some(escort) = self.capability(kind)?.escort else {
            return Ok(());
        };
        let board = self.state.board();
        let escorted = board
            .neighbors(at)
            .filter(|&n| Some(n) != vacated)
            .filter_map(|n| board.get(n))
            .any(|s| s.is_owned_by(player) && self.table.escorts(s.kind, escort));
        if escorted {
            Ok(())
        } else {
            Err(IllegalAction::EscortMissing { kind, escort }.into())
        }
    }
}

/// Mutable handle to the state for one command's effects.
///
/// All writes performed by resolvers and hooks go through these methods.
pub struct TurnContext<'a> {
    state: &'a mut GameState,
    table: &'a CapabilityTable,
    player: Player,
}

impl<'a> TurnContext<'a> {
    /// Opens a context for `player`.
    pub(crate) fn new(state: &'a mut GameState, table: &'a CapabilityTable, player: Player) -> Self {
        Self {
            state,
            table,
            player,
        }
    }

    /// Acting player.
    #[must_use]
    pub fn player(&self) -> Player {
        self.player
    }

    /// Read access to the state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &*self.state
    }

    /// Capability table.
    #[must_use]
    pub fn table(&self) -> &CapabilityTable {
        self.table
    }

    /// Ship at `pos`.
    ///
    /// # Errors
    ///
    /// An empty cell is an invariant violation here; effects only touch
    /// cells their checks proved occupied.
    pub fn ship(&self, pos: Position) -> Result<&Ship, InvariantViolation> {
        self.state
            .board
            .get(pos)
            .ok_or(InvariantViolation::MissingShip(pos))
    }

    /// Kind of the ship at `pos`.
    ///
    /// # Errors
    ///
    /// See [`TurnContext::ship`].
    pub fn kind_at(&self, pos: Position) -> Result<ShipKind, InvariantViolation> {
        self.ship(pos).map(|s| s.kind)
    }

    /// Descriptor for `kind`, copied out of the table.
    ///
    /// # Errors
    ///
    /// A missing entry is an invariant violation.
    pub fn capability(&self, kind: ShipKind) -> Result<CapabilityDescriptor, InvariantViolation> {
        self.table.get(kind).copied()
    }

    /// Appends an event stamped with the current turn.
    pub fn log(&mut self, event: Event) {
        self.state.append(event);
    }

    /// Removes the ship at `pos` and logs its death.
    ///
    /// Returns the removed ship, or `None` if the cell was already empty.
    ///
    /// # Errors
    ///
    /// Infallible today; the signature matches the other effect helpers.
    pub fn kill(&mut self, pos: Position) -> Result<Option<Ship>, InvariantViolation> {
        let Some(ship) = self.state.board.take(pos) else {
            return Ok(None);
        };
        tracing::debug!(%pos, kind = %ship.kind, "ship destroyed");
        self.log(Event::Die {
            at: pos,
            ship: ship.kind,
            player: ship.owner,
        });
        Ok(Some(ship))
    }

    /// Moves the ship at `from` into the empty cell `to`.
    ///
    /// # Errors
    ///
    /// Fails if `from` is empty.
    pub fn relocate(&mut self, from: Position, to: Position) -> Result<(), InvariantViolation> {
        let ship = self
            .state
            .board
            .take(from)
            .ok_or(InvariantViolation::MissingShip(from))?;
        self.state.board.set(to, Some(ship));
        Ok(())
    }

    /// Exchanges two cells.
    pub fn swap(&mut self, a: Position, b: Position) {
        self.state.board.swap(a, b);
    }

    /// Changes the controller of the ship at `pos`. Clears its flags.
    ///
    /// # Errors
    ///
    /// Fails if `pos` is empty.
    pub fn set_owner(&mut self, pos: Position, owner: Owner) -> Result<(), InvariantViolation> {
        let ship = self
            .state
            .board
            .get_mut(pos)
            .ok_or(InvariantViolation::MissingShip(pos))?;
        ship.owner = owner;
        ship.flags = ShipFlags::empty();
        Ok(())
    }

    /// Sets transient flags on the ship at `pos`, if any.
    pub fn mark(&mut self, pos: Position, flags: ShipFlags) {
        if let Some(ship) = self.state.board.get_mut(pos) {
            ship.flags.insert(flags);
        }
    }

    /// Counts one shot or blast for the acting player.
    pub fn count_special(&mut self) {
        self.state.specials_used[self.player.index()] += 1;
    }

    /// Registers an attack awaiting blocks.
    pub(crate) fn open_pending(&mut self, from: Position, to: Position) {
        self.state.pending = Some(crate::state::PendingAttack::new(from, to));
        self.mark(from, ShipFlags::ATTACKING);
        self.mark(to, ShipFlags::DEFENDING);
    }
}

/// Rules and effects for one action mode.
///
/// # Example
///
/// ```
/// use broadside_core::action::{resolver_for, ActionMode, Rules};
/// use broadside_core::board::Position;
/// use broadside_core::capability::CapabilityTable;
/// use broadside_core::config::GameConfig;
/// use broadside_core::ship::Player;
/// use broadside_core::state::GameState;
///
/// let config = GameConfig::default();
/// let table = CapabilityTable::standard();
/// let state = GameState::new(&config).unwrap();
/// let rules = Rules::new(&state, &table, &config);
///
/// let place = resolver_for(ActionMode::Place);
/// assert!(place.can(rules, Player::First, Position::new(0, 0), Position::new(4, 13)).is_ok());
/// assert!(place.can(rules, Player::First, Position::new(0, 0), Position::new(13, 0)).is_err());
/// ```
pub trait ActionResolver: Send + Sync {
    /// Mode this resolver implements.
    fn mode(&self) -> ActionMode;

    /// Checks whether `player` may start this action from `from`.
    ///
    /// # Errors
    ///
    /// [`ActionError::Illegal`] for rule violations; [`ActionError::Invariant`]
    /// for inconsistent tables.
    fn can_from(&self, rules: Rules<'_>, player: Player, from: Position) -> Result<(), ActionError>;

    /// Checks the full `(from, to)` action. Implies [`can_from`](Self::can_from).
    ///
    /// # Errors
    ///
    /// As for [`can_from`](Self::can_from).
    fn can(&self, rules: Rules<'_>, player: Player, from: Position, to: Position) -> Result<(), ActionError>;

    /// Applies the action.
    ///
    /// # Errors
    ///
    /// Only invariant violations; legality was settled by [`can`](Self::can).
    fn take(&self, ctx: &mut TurnContext<'_>, from: Position, to: Position) -> Result<Continuation, InvariantViolation>;
}

static PLACE: PlaceResolver = PlaceResolver;
static MOVE: MoveResolver = MoveResolver;
static ATTACK: AttackResolver = AttackResolver;
static SHOOT: ShootResolver = ShootResolver;
static EXPLODE: ExplodeResolver = ExplodeResolver;

/// Resolver implementing `mode`.
#[must_use]
pub fn resolver_for(mode: ActionMode) -> &'static dyn ActionResolver {
    match mode {
        ActionMode::Place => &PLACE,
        ActionMode::Move => &MOVE,
        ActionMode::Attack => &ATTACK,
        ActionMode::Shoot => &SHOOT,
        ActionMode::Explode => &EXPLODE,
    }
}

/// Every cell `to` for which `(from, to)` is legal in `mode`, row-major.
#[must_use]
pub fn legal_targets(rules: Rules<'_>, player: Player, mode: ActionMode, from: Position) -> Vec<Position> {
    let resolver = resolver_for(mode);
    if resolver.can_from(rules, player, from).is_err() {
        return Vec::new();
    }
    rules
        .state
        .board()
        .positions()
        .filter(|&to| resolver.can(rules, player, from, to).is_ok())
        .collect()
}

/// Returns `true` if the ship at `from` has any legal follow-up action.
#[must_use]
pub fn has_follow_up(rules: Rules<'_>, player: Player, from: Position) -> bool {
    ActionMode::FOLLOW_UPS
        .iter()
        .any(|&mode| !legal_targets(rules, player, mode, from).is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::helpers::{layout, ship_at};

    #[test]
    fn resolver_is_object_safe() {
        fn _accepts_boxed(_resolver: Box<dyn ActionResolver>) {}
        fn _accepts_slice(_resolvers: &[&dyn ActionResolver]) {}
    }

    #[test]
    fn resolver_for_matches_mode() {
        for mode in [
            ActionMode::Place,
            ActionMode::Move,
            ActionMode::Attack,
            ActionMode::Shoot,
            ActionMode::Explode,
        ] {
            assert_eq!(resolver_for(mode).mode(), mode);
        }
    }

    mod escort_tests {
        use super::*;

        #[test]
        fn carrier_escorts_plane() {
            let (config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Plane, Player::First),
                ship_at(5, 6, ShipKind::Carrier, Player::First),
            ]);
            let rules = Rules::new(&state, &table, &config);
            assert!(rules
                .require_escort(Player::First, ShipKind::Plane, Position::new(5, 5), None)
                .is_ok());
        }

        #[test]
        fn flagship_is_universal_escort() {
            let (config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Plane, Player::First),
                ship_at(6, 6, ShipKind::Flagship, Player::First),
            ]);
            let rules = Rules::new(&state, &table, &config);
            assert!(rules
                .require_escort(Player::First, ShipKind::Plane, Position::new(5, 5), None)
                .is_ok());
        }

        #[test]
        fn enemy_carrier_does_not_escort() {
            let (config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Plane, Player::First),
                ship_at(5, 6, ShipKind::Carrier, Player::Second),
            ]);
            let rules = Rules::new(&state, &table, &config);
            assert_eq!(
                rules.require_escort(Player::First, ShipKind::Plane, Position::new(5, 5), None),
                Err(ActionError::Illegal(IllegalAction::EscortMissing {
                    kind: ShipKind::Plane,
                    escort: ShipKind::Carrier,
                }))
            );
        }

        #[test]
        fn vacated_cell_does_not_escort() {
            let (config, table, state) = layout(&[ship_at(5, 6, ShipKind::Carrier, Player::First)]);
            let rules = Rules::new(&state, &table, &config);
            assert!(rules
                .require_escort(
                    Player::First,
                    ShipKind::Plane,
                    Position::new(5, 5),
                    Some(Position::new(5, 6)),
                )
                .is_err());
        }

        #[test]
        fn unescorted_kinds_always_pass() {
            let (config, table, state) = layout(&[]);
            let rules = Rules::new(&state, &table, &config);
            assert!(rules
                .require_escort(Player::First, ShipKind::Cruiser, Position::new(0, 0), None)
                .is_ok());
        }
    }

    mod context_tests {
        use super::*;

        #[test]
        fn kill_logs_death() {
            let (_config, table, mut state) =
                layout(&[ship_at(2, 2, ShipKind::Mine, Player::Second)]);
            let mut ctx = TurnContext::new(&mut state, &table, Player::First);

            let killed = ctx.kill(Position::new(2, 2)).unwrap();
            assert_eq!(killed.map(|s| s.kind), Some(ShipKind::Mine));
            assert_eq!(ctx.kill(Position::new(2, 2)).unwrap(), None);

            assert_eq!(state.log().len(), 1);
            assert_eq!(
                state.log().entries()[0].event,
                Event::Die {
                    at: Position::new(2, 2),
                    ship: ShipKind::Mine,
                    player: Owner::Player(Player::Second),
                }
            );
        }

        #[test]
        fn relocate_requires_ship() {
            let (_config, table, mut state) = layout(&[]);
            let mut ctx = TurnContext::new(&mut state, &table, Player::First);
            assert_eq!(
                ctx.relocate(Position::new(0, 0), Position::new(0, 1)),
                Err(InvariantViolation::MissingShip(Position::new(0, 0)))
            );
        }

        #[test]
        fn set_owner_clears_flags() {
            let (_config, table, mut state) =
                layout(&[ship_at(1, 1, ShipKind::Cruiser, Player::First)]);
            let mut ctx = TurnContext::new(&mut state, &table, Player::First);
            ctx.mark(Position::new(1, 1), ShipFlags::MOVED);
            ctx.set_owner(Position::new(1, 1), Owner::Neutral).unwrap();

            let ship = state.board().get(Position::new(1, 1)).unwrap();
            assert_eq!(ship.owner, Owner::Neutral);
            assert!(ship.flags.is_empty());
        }
    }
}
