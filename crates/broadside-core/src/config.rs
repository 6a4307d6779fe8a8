//! Game configuration: board size, placement zones, and the roster.
//!
//! Configuration is plain data read once at game start. It is validated
//! before any state is built, so a [`GameState`](crate::state::GameState)
//! never exists for a board the roster cannot fit on.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "fieldSize": 14,
//!   "placementZoneSize": 5,
//!   "initialShips": [["F", 2], ["Lk", 2]]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::board::Position;
use crate::ship::{Player, ShipKind};

/// Configuration rejected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Board has no cells.
    #[error("field size must be positive")]
    EmptyField,
    /// Zones would overlap or exceed the board.
    #[error("placement zone of {zone} rows does not fit twice in {field} rows")]
    ZoneTooLarge {
        /// Rows per zone.
        zone: u16,
        /// Board edge length.
        field: u16,
    },
    /// Roster does not fit into one zone.
    #[error("roster of {ships} ships exceeds zone capacity {capacity}")]
    RosterOverflow {
        /// Ships per player.
        ships: usize,
        /// Cells per zone.
        capacity: usize,
    },
    /// A ship type appears more than once in the roster.
    #[error("{0} listed twice in roster")]
    DuplicateRosterEntry(ShipKind),
    /// JSON could not be parsed.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Static game parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Board edge length.
    pub field_size: u16,
    /// Rows in each player's placement zone.
    pub placement_zone_size: u16,
    /// Ship types and counts given to each player, in layout order.
    pub initial_ships: Vec<(ShipKind, u16)>,
}

impl Default for GameConfig {
    fn default() -> Self {
        use ShipKind::{
            Battleship, Carrier, Cruiser, Destroyer, Flagship, Fort, GasBomb, Mine,
            Minesweeper, NuclearBomb, Patrol, Plane, Raider, Submarine, Torpedo, TorpedoBoat,
        };
        Self {
            field_size: 14,
            placement_zone_size: 5,
            initial_ships: vec![
                (Fort, 2),
                (Battleship, 2),
                (Cruiser, 2),
                (Raider, 1),
                (Destroyer, 3),
                (Carrier, 1),
                (Flagship, 1),
                (Patrol, 4),
                (Minesweeper, 3),
                (TorpedoBoat, 2),
                (Submarine, 2),
                (Plane, 2),
                (Torpedo, 4),
                (Mine, 4),
                (NuclearBomb, 1),
                (GasBomb, 1),
            ],
        }
    }
}

impl GameConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed input, or any validation
    /// error from [`GameConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the board, zones, and roster are consistent.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field_size == 0 {
            return Err(ConfigError::EmptyField);
        }
        if u32::from(self.placement_zone_size) * 2 > u32::from(self.field_size) {
            return Err(ConfigError::ZoneTooLarge {
                zone: self.placement_zone_size,
                field: self.field_size,
            });
        }
        for (i, (kind, _)) in self.initial_ships.iter().enumerate() {
            if self.initial_ships[..i].iter().any(|(k, _)| k == kind) {
                return Err(ConfigError::DuplicateRosterEntry(*kind));
            }
        }
        let ships = self.roster_len();
        let capacity = self.zone_capacity();
        if ships > capacity {
            return Err(ConfigError::RosterOverflow { ships, capacity });
        }
        Ok(())
    }

    /// Ships per player.
    #[must_use]
    pub fn roster_len(&self) -> usize {
        self.initial_ships.iter().map(|&(_, n)| usize::from(n)).sum()
    }

    /// Cells in one placement zone.
    #[must_use]
    pub fn zone_capacity(&self) -> usize {
        usize::from(self.placement_zone_size) * usize::from(self.field_size)
    }

    /// Roster expanded into one kind per ship, in layout order.
    pub fn roster(&self) -> impl Iterator<Item = ShipKind> + '_ {
        self.initial_ships
            .iter()
            .flat_map(|&(kind, n)| std::iter::repeat(kind).take(usize::from(n)))
    }

    /// Rows belonging to `player`'s placement zone.
    #[must_use]
    pub fn zone_rows(&self, player: Player) -> Range<i32> {
        let field = i32::from(self.field_size);
        let zone = i32::from(self.placement_zone_size);
        match player {
            Player::First => 0..zone,
            Player::Second => field - zone..field,
        }
    }

    /// Returns `true` if `pos` is a board cell inside `player`'s zone.
    #[must_use]
    pub fn in_zone(&self, player: Player, pos: Position) -> bool {
        self.zone_rows(player).contains(&pos.row)
            && (0..i32::from(self.field_size)).contains(&pos.col)
    }

    /// Zone cells for `player`, row-major.
    pub fn zone_positions(&self, player: Player) -> impl Iterator<Item = Position> {
        let cols = i32::from(self.field_size);
        self.zone_rows(player)
            .flat_map(move |row| (0..cols).map(move |col| Position::new(row, col)))
    }

    /// Starting cell of the `index`-th roster ship for `player`.
    ///
    /// Player 0 fills its zone row-major from the top; player 1 uses the
    /// same layout mirrored top-to-bottom.
    #[must_use]
    pub fn starting_position(&self, player: Player, index: usize) -> Position {
        let n = usize::from(self.field_size).max(1);
        let row = i32::try_from(index / n).unwrap_or(i32::MAX);
        let col = i32::try_from(index % n).unwrap_or(i32::MAX);
        match player {
            Player::First => Position::new(row, col),
            Player::Second => Position::new(i32::from(self.field_size) - 1 - row, col),
        }
    }
}
