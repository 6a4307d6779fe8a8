//! Per-player visibility filter.
//!
//! A [`PlayerView`] is a fresh, owned copy of the state with everything the
//! requester may not know removed:
//!
//! - **Placement**: cells outside the requester's zone are blank
//! - **Play**: enemy identities read as unknown, neutral ones as sinking,
//!   and their transient flags are cleared
//! - **Always**: only the requester's own label survives on each ship
//!
//! The authoritative state is never modified.

use serde::{Deserialize, Serialize};

use crate::board::Position;
use crate::config::GameConfig;
use crate::event::LogEntry;
use crate::ship::{Owner, Player, Ship, ShipFlags, ShipKind};
use crate::state::{GameState, Phase, Stage};

/// What a viewer knows about a ship's type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Identity {
    /// Type is visible.
    Known(ShipKind),
    /// Type is hidden from this viewer.
    Unknown,
    /// Neutral hulk whose crew was lost; type hidden.
    Sinking,
}

/// A ship as one player sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipView {
    /// Visible type.
    pub identity: Identity,
    /// Controller.
    pub owner: Owner,
    /// The viewer's own label.
    pub label: Option<String>,
    /// Transient markers; empty for hidden ships.
    pub flags: ShipFlags,
}

impl ShipView {
    fn reveal(ship: &Ship, viewer: Player) -> Self {
        Self {
            identity: Identity::Known(ship.kind),
            owner: ship.owner,
            label: ship.label_for(viewer).map(str::to_string),
            flags: ship.flags,
        }
    }

    fn conceal(ship: &Ship, viewer: Player) -> Self {
        let identity = match ship.owner {
            Owner::Neutral => Identity::Sinking,
            Owner::Player(_) => Identity::Unknown,
        };
        Self {
            identity,
            owner: ship.owner,
            label: ship.label_for(viewer).map(str::to_string),
            flags: ShipFlags::empty(),
        }
    }
}

/// Pending attack as both players may see it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingView {
    /// Attacker cell.
    pub from: Position,
    /// Target cell.
    pub to: Position,
    /// The viewer has declared their block.
    pub declared: bool,
}

/// Filtered snapshot for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    /// Viewer.
    pub player: Player,
    /// Game phase.
    pub phase: Phase,
    /// Viewer's stage.
    pub stage: Stage,
    /// Player to act.
    pub current: Player,
    /// Turn counter.
    pub turn: u32,
    /// Board edge length.
    pub field_size: u16,
    /// Cells, row-major.
    pub cells: Vec<Option<ShipView>>,
    /// Pending block combat, if any.
    pub pending: Option<PendingView>,
    /// Public event log.
    pub log: Vec<LogEntry>,
}

impl PlayerView {
    /// Builds `player`'s view of `state`.
    #[must_use]
    pub fn new(state: &GameState, config: &GameConfig, player: Player) -> Self {
        let board = state.board();
        let placing = state.phase() == Phase::Placement;

        let cells = board
            .positions()
            .map(|pos| {
                let ship = board.get(pos)?;
                if placing {
                    config
                        .in_zone(player, pos)
                        .then(|| ShipView::reveal(ship, player))
                } else if ship.is_owned_by(player) {
                    Some(ShipView::reveal(ship, player))
                } else {
                    Some(ShipView::conceal(ship, player))
                }
            })
            .collect();

        let pending = state.pending().map(|p| PendingView {
            from: p.from,
            to: p.to,
            declared: if player == state.current_player() {
                p.attack_block.is_some()
            } else {
                p.response_block.is_some()
            },
        });

        Self {
            player,
            phase: state.phase(),
            stage: state.stage(player),
            current: state.current_player(),
            turn: state.turn(),
            field_size: board.size(),
            cells,
            pending,
            log: state.log().entries().to_vec(),
        }
    }

    /// The view of the cell at `pos`.
    #[must_use]
    pub fn cell(&self, pos: Position) -> Option<&ShipView> {
        let n = i32::from(self.field_size);
        if !(0..n).contains(&pos.row) || !(0..n).contains(&pos.col) {
            return None;
        }
        let i = usize::try_from(pos.row * n + pos.col).ok()?;
        self.cells.get(i).and_then(Option::as_ref)
    }

    /// Visible ships with their cells, row-major.
    pub fn ships(&self) -> impl Iterator<Item = (Position, &ShipView)> {
        let n = i32::from(self.field_size).max(1);
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            let i = i32::try_from(i).ok()?;
            cell.as_ref().map(|s| (Position::new(i / n, i % n), s))
        })
    }
}
