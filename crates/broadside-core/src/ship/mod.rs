//! Ship module: players, ownership, and the per-cell ship record.
//!
//! This module provides the types that occupy board cells:
//! - [`Player`]: One of the two seats at the table
//! - [`Owner`]: Who controls a ship (a player or nobody)
//! - [`ShipKind`]: Type tag looked up in the capability table
//! - [`ShipFlags`]: Transient per-turn markers
//! - [`Ship`]: The complete ship record stored in a cell
//!
//! # Example
//!
//! ```
//! use broadside_core::ship::{Owner, Player, Ship, ShipFlags, ShipKind};
//!
//! let mut ship = Ship::new(ShipKind::Cruiser, Owner::Player(Player::First));
//! ship.flags.insert(ShipFlags::MOVED);
//!
//! assert!(ship.is_owned_by(Player::First));
//! assert!(!ship.is_owned_by(Player::Second));
//! ```

mod kind;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use kind::{ShipKind, UnknownShipTag};

/// One of the two players.
///
/// `First` always takes the opening turn once both players are ready.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Player {
    /// Player 0; placement zone at the top rows.
    First,
    /// Player 1; placement zone at the bottom rows.
    Second,
}

impl Player {
    /// Both players in seat order.
    pub const BOTH: [Player; 2] = [Player::First, Player::Second];

    /// Seat index (0 or 1).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    /// Returns the player for a seat index, if it is 0 or 1.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::First),
            1 => Some(Self::Second),
            _ => None,
        }
    }

    /// The other player.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.index())
    }
}

/// Controller of a ship.
///
/// Neutral ships belong to nobody. They cannot act and are captured by
/// the first player who attacks them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Owner {
    /// Controlled by a player.
    Player(Player),
    /// Controlled by nobody.
    Neutral,
}

impl Owner {
    /// Returns the controlling player, if any.
    #[must_use]
    pub const fn player(self) -> Option<Player> {
        match self {
            Self::Player(p) => Some(p),
            Self::Neutral => None,
        }
    }
}

impl From<Player> for Owner {
    fn from(player: Player) -> Self {
        Self::Player(player)
    }
}

bitflags! {
    /// Transient markers cleared at every turn end.
    ///
    /// The engine never reads these to decide legality; they exist so
    /// renderers can show what happened this turn.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ShipFlags: u8 {
        /// Ship moved this turn.
        const MOVED = 1 << 0;
        /// Ship is the attacker of the pending block combat.
        const ATTACKING = 1 << 1;
        /// Ship is the target of the pending block combat.
        const DEFENDING = 1 << 2;
        /// Ship won a block combat and earned a follow-up attack.
        const BONUS = 1 << 3;
    }
}

/// A ship occupying one board cell.
///
/// Labels are private notes, one slot per player. Each player only ever
/// sees their own slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    /// Type tag.
    pub kind: ShipKind,
    /// Current controller.
    pub owner: Owner,
    /// Per-player annotation text, indexed by [`Player::index`].
    pub labels: [String; 2],
    /// Transient per-turn markers.
    pub flags: ShipFlags,
}

impl Ship {
    /// Creates an unlabeled, unflagged ship.
    ///
    /// # Arguments
    ///
    /// * `kind` - Type tag
    /// * `owner` - Initial controller
    #[must_use]
    pub fn new(kind: ShipKind, owner: Owner) -> Self {
        Self {
            kind,
            owner,
            labels: [String::new(), String::new()],
            flags: ShipFlags::empty(),
        }
    }

    /// Returns `true` if `player` controls this ship.
    #[must_use]
    pub fn is_owned_by(&self, player: Player) -> bool {
        self.owner == Owner::Player(player)
    }

    /// Returns `true` if the opponent of `player` controls this ship.
    #[must_use]
    pub fn is_enemy_of(&self, player: Player) -> bool {
        self.owner == Owner::Player(player.opponent())
    }

    /// The label `player` attached to this ship, if any.
    #[must_use]
    pub fn label_for(&self, player: Player) -> Option<&str> {
        let label = self.labels[player.index()].as_str();
        (!label.is_empty()).then_some(label)
    }
}
