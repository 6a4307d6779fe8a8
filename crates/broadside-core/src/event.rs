//! Append-only event log.
//!
//! Every state change that players are allowed to learn about is recorded
//! as an [`Event`]. The log is public to both players: it never carries
//! hidden ship identities except where the rules reveal them (deaths,
//! ranged attacks, block declarations).
//!
//! # Invariants
//!
//! - Entries are only ever appended
//! - `seq` numbers are dense and start at 0

use serde::{Deserialize, Serialize};

use crate::board::Position;
use crate::ship::{Owner, Player, ShipKind};

/// A publicly visible state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Event {
    /// Player declared readiness.
    Ready {
        /// Who is ready.
        player: Player,
    },
    /// A ship moved.
    Move {
        /// Origin.
        from: Position,
        /// Destination.
        to: Position,
        /// Acting player.
        player: Player,
    },
    /// A melee attack was launched.
    Attack {
        /// Attacker cell.
        from: Position,
        /// Target cell.
        to: Position,
        /// Acting player.
        player: Player,
    },
    /// A ranged attack, or an area blast when `area` is set.
    Shoot {
        /// Shooter cell.
        from: Position,
        /// Aim cell.
        to: Position,
        /// Shooter type (revealed).
        ship: ShipKind,
        /// Acting player.
        player: Player,
        /// Blast radius for area effects.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        area: Option<u8>,
    },
    /// A bomb detonated.
    Explode {
        /// Bomb cell.
        from: Position,
        /// Blast center.
        to: Position,
        /// Bomb type (revealed).
        ship: ShipKind,
        /// Bomb owner.
        player: Player,
    },
    /// A ship was destroyed.
    Die {
        /// Cell it occupied.
        at: Position,
        /// Its type (revealed).
        ship: ShipKind,
        /// Its controller at death.
        player: Owner,
    },
    /// A block was declared for the pending combat.
    Response {
        /// Number of ships in the block.
        declared_size: u8,
        /// Declared block type.
        declared_type: ShipKind,
        /// Declaring player.
        player: Player,
    },
    /// A neutral ship changed hands.
    Capture {
        /// Captured cell.
        at: Position,
        /// New controller.
        player: Player,
    },
    /// A turn ended.
    TurnEnd {
        /// Player whose turn ended.
        player: Player,
    },
}

/// One logged event with its sequence number and turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Dense position in the log.
    pub seq: u64,
    /// Turn counter when the event happened.
    pub turn: u32,
    /// The event.
    pub event: Event,
}

/// Ordered, append-only list of [`LogEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event and returns its entry.
    pub(crate) fn append(&mut self, turn: u32, event: Event) -> &LogEntry {
        let seq = self.entries.len() as u64;
        tracing::trace!(seq, turn, ?event, "log");
        self.entries.push(LogEntry { seq, turn, event });
        &self.entries[self.entries.len() - 1]
    }

    /// All entries in order.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries with `seq >= from`.
    #[must_use]
    pub fn since(&self, from: u64) -> &[LogEntry] {
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(self.entries.len());
        &self.entries[start..]
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// Iterates over events only.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter().map(|e| &e.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_are_dense() {
        let mut log = EventLog::new();
        log.append(0, Event::Ready { player: Player::First });
        log.append(0, Event::Ready { player: Player::Second });
        log.append(1, Event::TurnEnd { player: Player::First });

        let seqs: Vec<_> = log.entries().iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(log.last().map(|e| e.turn), Some(1));
    }

    #[test]
    fn since_slices_tail() {
        let mut log = EventLog::new();
        for _ in 0..4 {
            log.append(0, Event::TurnEnd { player: Player::First });
        }
        assert_eq!(log.since(1).len(), 3);
        assert_eq!(log.since(99).len(), 0);
    }

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::Die {
            at: Position::new(1, 2),
            ship: ShipKind::Mine,
            player: Owner::Neutral,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "die");
        assert_eq!(json["ship"], "Mn");
    }

    #[test]
    fn shoot_area_omitted_when_absent() {
        let event = Event::Shoot {
            from: Position::new(0, 0),
            to: Position::new(0, 3),
            ship: ShipKind::Torpedo,
            player: Player::First,
            area: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("area").is_none());
    }
}
