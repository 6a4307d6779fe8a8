//! Error and verdict types.
//!
//! The engine separates two failure classes:
//! - [`IllegalAction`]: the requested command breaks a rule. Nothing changes
//!   and the caller receives [`Verdict::Invalid`].
//! - [`InvariantViolation`]: internal state is inconsistent (for example a
//!   ship type missing from the capability table). These are fatal and are
//!   surfaced as `Err` from [`Game::submit`](crate::game::Game::submit).
//!
//! Rule checks return [`ActionError`], which carries either class so `?`
//! works across both.

use crate::action::ActionMode;
use crate::board::Position;
use crate::ship::ShipKind;
use crate::state::Stage;

/// Reason a command was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IllegalAction {
    /// The game already has an outcome.
    #[error("game is finished")]
    GameFinished,
    /// Command does not belong to the current phase.
    #[error("command not allowed in this phase")]
    WrongPhase,
    /// Command does not belong to the player's current stage.
    #[error("command not allowed in stage {0:?}")]
    WrongStage(Stage),
    /// Mode cannot be used with this command.
    #[error("mode {0:?} not allowed here")]
    ModeNotAllowed(ActionMode),
    /// Player already declared readiness.
    #[error("already ready")]
    AlreadyReady,
    /// Position lies off the board.
    #[error("{0} is off the board")]
    OutOfBounds(Position),
    /// Cell holds no ship.
    #[error("no ship at {0}")]
    EmptyCell(Position),
    /// Cell is occupied.
    #[error("{0} is occupied")]
    Occupied(Position),
    /// Ship belongs to someone else.
    #[error("ship at {0} is not yours")]
    NotOwner(Position),
    /// Target is not an enemy ship.
    #[error("ship at {0} is not an enemy")]
    NotEnemy(Position),
    /// Origin and destination coincide.
    #[error("origin and destination coincide")]
    SamePosition,
    /// Cell lies outside the player's placement zone.
    #[error("{0} is outside your placement zone")]
    OutsideZone(Position),
    /// Ship type lacks the capability for this mode.
    #[error("{kind} cannot {mode:?}")]
    Incapable {
        /// Acting ship type.
        kind: ShipKind,
        /// Requested mode.
        mode: ActionMode,
    },
    /// Ship type needs an escort that is not adjacent.
    #[error("{kind} needs an adjacent {escort}")]
    EscortMissing {
        /// Escorted ship type.
        kind: ShipKind,
        /// Required escort type.
        escort: ShipKind,
    },
    /// Target is beyond the allowed distance.
    #[error("distance {distance} exceeds {max}")]
    TooFar {
        /// Measured distance.
        distance: u32,
        /// Allowed maximum.
        max: u32,
    },
    /// Ranged target is adjacent.
    #[error("target too close")]
    TooClose,
    /// Melee target is not orthogonally adjacent.
    #[error("target not adjacent")]
    NotAdjacent,
    /// Ranged target is not on an allowed line.
    #[error("target not in line")]
    NotInLine,
    /// No empty path to the destination.
    #[error("path from {from} to {to} is blocked")]
    PathBlocked {
        /// Start cell.
        from: Position,
        /// End cell.
        to: Position,
    },
    /// Follow-up must use the ship that earned it.
    #[error("follow-up must start from {0}")]
    WrongShip(Position),
    /// Block declaration already submitted.
    #[error("block already declared")]
    AlreadyDeclared,
    /// Block size outside 1..=3 or not matching its coordinates.
    #[error("invalid block size {0}")]
    BlockSize(usize),
    /// Consecutive block members are not touching.
    #[error("block members {0} and {1} are not adjacent")]
    BlockNotContiguous(Position, Position),
    /// A three-ship chain whose ends coincide.
    #[error("block chain folds back on itself")]
    BlockFolded,
    /// Declared type carries no strength.
    #[error("{0} cannot form blocks")]
    BlockNotEligible(ShipKind),
    /// Occupants do not fit the declared type.
    #[error("ships do not form a {0} block")]
    BlockMismatch(ShipKind),
    /// Block omits the ship it must contain.
    #[error("block must include {0}")]
    BlockMissingAnchor(Position),
    /// Label target cannot be seen by the player.
    #[error("cannot label hidden cell {0}")]
    LabelHidden(Position),
}

/// Internal inconsistency. Always fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// A ship type has no capability entry.
    #[error("no capability entry for {0}")]
    MissingCapability(ShipKind),
    /// Block arithmetic needs a strength the type does not have.
    #[error("{0} has no strength")]
    MissingStrength(ShipKind),
    /// An attack has no defined resolution.
    #[error("attack by {attacker} on {target} has no resolution")]
    Unresolvable {
        /// Attacking type.
        attacker: ShipKind,
        /// Target type.
        target: ShipKind,
    },
    /// A cell expected to hold a ship is empty.
    #[error("expected a ship at {0}")]
    MissingShip(Position),
    /// Block-related work with no pending attack.
    #[error("no pending attack")]
    NoPendingAttack,
    /// Combat resolution ran without both blocks.
    #[error("combat resolved without both blocks")]
    MissingBlock,
}

/// Either failure class, produced by rule checks and effects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// Rule violation; reject without side effects.
    #[error(transparent)]
    Illegal(#[from] IllegalAction),
    /// Fatal inconsistency.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// Outcome of submitting a legal-or-not command.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Command was applied.
    Applied,
    /// Command was rejected; state is unchanged.
    Invalid(IllegalAction),
}

impl Verdict {
    /// Returns `true` if the command was applied.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    /// The rejection reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&IllegalAction> {
        match self {
            Self::Applied => None,
            Self::Invalid(reason) => Some(reason),
        }
    }
}
