//! Ship type tags.
//!
//! Every ship on the board carries exactly one [`ShipKind`]. Kinds serialize
//! as their short board tags (`"Lk"`, `"Av"`, ...) so configuration files and
//! the event log stay compact and readable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type tag of a ship.
///
/// The tag alone carries no rules; all behavior lives in the
/// [`CapabilityTable`](crate::capability::CapabilityTable).
///
/// # Example
///
/// ```
/// use broadside_core::ship::ShipKind;
///
/// assert_eq!(ShipKind::Carrier.tag(), "Av");
/// assert_eq!("Lk".parse::<ShipKind>().unwrap(), ShipKind::Battleship);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShipKind {
    /// Immobile shore fort. Losing every fort loses the game.
    #[serde(rename = "F")]
    Fort,
    /// Heaviest gun ship.
    #[serde(rename = "Lk")]
    Battleship,
    /// Fast heavy escort.
    #[serde(rename = "Kr")]
    Cruiser,
    /// Commerce raider; substitutes into weaker blocks.
    #[serde(rename = "Rd")]
    Raider,
    /// Destroyer.
    #[serde(rename = "Em")]
    Destroyer,
    /// Aircraft carrier; convoy lead and plane escort.
    #[serde(rename = "Av")]
    Carrier,
    /// Flagship; satisfies any escort requirement.
    #[serde(rename = "Fl")]
    Flagship,
    /// Patrol ship; convoy guard.
    #[serde(rename = "St")]
    Patrol,
    /// Minesweeper.
    #[serde(rename = "Tr")]
    Minesweeper,
    /// Torpedo boat; carries torpedoes.
    #[serde(rename = "Tk")]
    TorpedoBoat,
    /// Submarine.
    #[serde(rename = "Pl")]
    Submarine,
    /// Carrier-borne plane.
    #[serde(rename = "Sa")]
    Plane,
    /// Torpedo waiting next to its boat.
    #[serde(rename = "T")]
    Torpedo,
    /// Naval mine.
    #[serde(rename = "Mn")]
    Mine,
    /// Nuclear bomb.
    #[serde(rename = "AB")]
    NuclearBomb,
    /// Gas bomb; strips crews instead of sinking hulls.
    #[serde(rename = "XB")]
    GasBomb,
}

impl ShipKind {
    /// Number of ship kinds.
    pub const COUNT: usize = 16;

    /// All kinds in declaration order.
    pub const ALL: [ShipKind; Self::COUNT] = [
        ShipKind::Fort,
        ShipKind::Battleship,
        ShipKind::Cruiser,
        ShipKind::Raider,
        ShipKind::Destroyer,
        ShipKind::Carrier,
        ShipKind::Flagship,
        ShipKind::Patrol,
        ShipKind::Minesweeper,
        ShipKind::TorpedoBoat,
        ShipKind::Submarine,
        ShipKind::Plane,
        ShipKind::Torpedo,
        ShipKind::Mine,
        ShipKind::NuclearBomb,
        ShipKind::GasBomb,
    ];

    /// Dense index of this kind, usable for table lookups.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short board tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Fort => "F",
            Self::Battleship => "Lk",
            Self::Cruiser => "Kr",
            Self::Raider => "Rd",
            Self::Destroyer => "Em",
            Self::Carrier => "Av",
            Self::Flagship => "Fl",
            Self::Patrol => "St",
            Self::Minesweeper => "Tr",
            Self::TorpedoBoat => "Tk",
            Self::Submarine => "Pl",
            Self::Plane => "Sa",
            Self::Torpedo => "T",
            Self::Mine => "Mn",
            Self::NuclearBomb => "AB",
            Self::GasBomb => "XB",
        }
    }

    /// Looks a kind up by its board tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for ShipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned when parsing an unknown ship tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ship tag `{0}`")]
pub struct UnknownShipTag(pub String);

impl FromStr for ShipKind {
    type Err = UnknownShipTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| UnknownShipTag(s.to_string()))
    }
}
