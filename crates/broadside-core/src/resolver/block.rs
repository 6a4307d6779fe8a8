//! Block declarations.
//!
//! A block is an ordered chain of one to three own ships where each
//! consecutive pair touches (including diagonally). The occupants must fit
//! the declared type under one of four grouping rules:
//!
//! - **(a) uniform**: every occupant is the declared type
//! - **(b) raider**: occupants are the declared type or the raider, and the
//!   declared type is no stronger than the raider
//! - **(c) convoy pair**: lead and guard, declared as the lead
//! - **(d) convoy triple**: lead, raider, guard in chain order (either
//!   direction), declared as the lead

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::board::{Board, Position};
use crate::capability::CapabilityTable;
use crate::error::IllegalAction;
use crate::ship::{Player, ShipKind};

/// Largest allowed block.
pub const MAX_BLOCK_SIZE: usize = 3;

/// A declared block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Type the block fights as.
    pub declared: ShipKind,
    /// Number of ships.
    pub size: u8,
    /// Member cells in chain order.
    pub coords: Vec<Position>,
}

impl Block {
    /// Creates a block whose size is the number of cells.
    #[must_use]
    pub fn new(declared: ShipKind, coords: Vec<Position>) -> Self {
        Self {
            declared,
            size: u8::try_from(coords.len()).unwrap_or(u8::MAX),
            coords,
        }
    }

    /// Returns `true` if `pos` is a member.
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.coords.contains(&pos)
    }

    /// Members sorted, for order-insensitive comparison.
    #[must_use]
    pub fn cells(&self) -> Vec<Position> {
        let mut cells = self.coords.clone();
        cells.sort_unstable();
        cells
    }

    /// Total block strength under `table`.
    #[must_use]
    pub fn power(&self, table: &CapabilityTable) -> Option<f64> {
        table
            .strength(self.declared)
            .map(|s| f64::from(self.size) * s)
    }
}

/// Validates a block declaration by `player`.
///
/// # Arguments
///
/// * `board` - Current board
/// * `table` - Capability table
/// * `player` - Declaring player
/// * `declared` - Declared block type
/// * `size` - Declared size; must equal `coords.len()`
/// * `coords` - Member cells in chain order
///
/// # Errors
///
/// Returns the first rule the declaration breaks.
pub fn check_block(
    board: &Board,
    table: &CapabilityTable,
    player: Player,
    declared: ShipKind,
    size: usize,
    coords: &[Position],
) -> Result<(), IllegalAction> {
    if size == 0 || size > MAX_BLOCK_SIZE || size != coords.len() {
        return Err(IllegalAction::BlockSize(size));
    }
    if let Some(&pos) = coords.iter().find(|&&pos| !board.contains(pos)) {
        return Err(IllegalAction::OutOfBounds(pos));
    }
    for pair in coords.windows(2) {
        if !pair[0].touches(pair[1]) {
            return Err(IllegalAction::BlockNotContiguous(pair[0], pair[1]));
        }
    }
    if size == 3 && coords[0] == coords[2] {
        return Err(IllegalAction::BlockFolded);
    }

    let mut kinds = Vec::with_capacity(size);
    for &pos in coords {
        let ship = board.get(pos).ok_or(IllegalAction::EmptyCell(pos))?;
        if !ship.is_owned_by(player) {
            return Err(IllegalAction::NotOwner(pos));
        }
        kinds.push(ship.kind);
    }

    if table.strength(declared).is_none() {
        return Err(IllegalAction::BlockNotEligible(declared));
    }
    if fits(table, declared, &kinds) {
        Ok(())
    } else {
        Err(IllegalAction::BlockMismatch(declared))
    }
}

/// Returns `true` if occupants `kinds` (chain order) may fight as `declared`.
fn fits(table: &CapabilityTable, declared: ShipKind, kinds: &[ShipKind]) -> bool {
    if kinds.iter().all(|&k| k == declared) {
        return true;
    }

    let roles = table.roles();
    if let Some(raider) = roles.raider {
        let substitutes = kinds.iter().all(|&k| k == declared || k == raider);
        let weaker = match (table.strength(declared), table.strength(raider)) {
            (Some(d), Some(r)) => d <= r,
            _ => false,
        };
        if substitutes && weaker {
            return true;
        }
    }

    let Some(convoy) = roles.convoy else {
        return false;
    };
    if declared != convoy.lead {
        return false;
    }
    match kinds {
        [a, b] => {
            (*a == convoy.lead && *b == convoy.guard) || (*a == convoy.guard && *b == convoy.lead)
        }
        [a, mid, c] => roles.raider.is_some_and(|raider| {
            *mid == raider
                && ((*a == convoy.lead && *c == convoy.guard)
                    || (*a == convoy.guard && *c == convoy.lead))
        }),
        _ => false,
    }
}

/// Chains of one to three on-board cells that include `anchor`.
///
/// A chain and its reverse are reported once.
fn chains(board: &Board, anchor: Position) -> Vec<Vec<Position>> {
    let mut found = BTreeSet::new();
    let mut insert = |chain: Vec<Position>| {
        let mut reversed = chain.clone();
        reversed.reverse();
        found.insert(chain.min(reversed));
    };

    insert(vec![anchor]);
    for n in board.neighbors(anchor) {
        insert(vec![anchor, n]);
        for m in board.neighbors(n).filter(|&m| m != anchor) {
            insert(vec![anchor, n, m]);
        }
        for m in board.neighbors(anchor).filter(|&m| m != n) {
            insert(vec![n, anchor, m]);
        }
    }
    found.into_iter().collect()
}

/// Every valid block `player` could declare that contains `anchor`.
///
/// Blocks with the same declared type over the same set of cells are
/// reported once. Output is ordered by size, declared type, then cells.
///
/// # Example
///
/// ```
/// use broadside_core::board::Position;
/// use broadside_core::capability::CapabilityTable;
/// use broadside_core::config::GameConfig;
/// use broadside_core::resolver::get_blocks;
/// use broadside_core::ship::{Owner, Player, ShipKind};
/// use broadside_core::state::GameState;
///
/// let config = GameConfig::default();
/// let state = GameState::from_layout(
///     &config,
///     [(Position::new(5, 5), ShipKind::Cruiser, Owner::Player(Player::First))],
/// )
/// .unwrap();
/// let table = CapabilityTable::standard();
///
/// let blocks = get_blocks(state.board(), &table, Player::First, Position::new(5, 5));
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].declared, ShipKind::Cruiser);
/// ```
#[must_use]
pub fn get_blocks(
    board: &Board,
    table: &CapabilityTable,
    player: Player,
    anchor: Position,
) -> Vec<Block> {
    let owned = |pos: Position| board.get(pos).is_some_and(|s| s.is_owned_by(player));
    if !owned(anchor) {
        return Vec::new();
    }

    let mut seen = BTreeSet::new();
    let mut blocks = Vec::new();
    for chain in chains(board, anchor) {
        if !chain.iter().all(|&p| owned(p)) {
            continue;
        }
        for declared in table.block_kinds() {
            if check_block(board, table, player, declared, chain.len(), &chain).is_err() {
                continue;
            }
            let block = Block::new(declared, chain.clone());
            if seen.insert((declared, block.cells())) {
                blocks.push(block);
            }
        }
    }
    blocks.sort_by(|a, b| {
        (a.size, a.declared, a.cells()).cmp(&(b.size, b.declared, b.cells()))
    });
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GameState;
    use crate::tests::helpers::{layout, ship_at};

    fn p(row: i32, col: i32) -> Position {
        Position::new(row, col)
    }

    fn check(state: &GameState, table: &CapabilityTable, declared: ShipKind, coords: &[Position]) -> Result<(), IllegalAction> {
        check_block(state.board(), table, Player::First, declared, coords.len(), coords)
    }

    mod shape_tests {
        use super::*;

        #[test]
        fn size_must_match_coords() {
            let (_config, table, state) = layout(&[ship_at(5, 5, ShipKind::Cruiser, Player::First)]);
            assert_eq!(
                check_block(state.board(), &table, Player::First, ShipKind::Cruiser, 2, &[p(5, 5)]),
                Err(IllegalAction::BlockSize(2))
            );
            assert_eq!(
                check_block(state.board(), &table, Player::First, ShipKind::Cruiser, 0, &[]),
                Err(IllegalAction::BlockSize(0))
            );
        }

        #[test]
        fn four_ships_too_many() {
            let (_config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Cruiser, Player::First),
                ship_at(5, 6, ShipKind::Cruiser, Player::First),
                ship_at(5, 7, ShipKind::Cruiser, Player::First),
                ship_at(5, 8, ShipKind::Cruiser, Player::First),
            ]);
            assert_eq!(
                check(&state, &table, ShipKind::Cruiser, &[p(5, 5), p(5, 6), p(5, 7), p(5, 8)]),
                Err(IllegalAction::BlockSize(4))
            );
        }

        #[test]
        fn bounds_checked_before_adjacency() {
            let (_config, table, state) = layout(&[ship_at(5, 5, ShipKind::Cruiser, Player::First)]);
            let far = p(i32::MIN, 0);
            assert_eq!(
                check(&state, &table, ShipKind::Cruiser, &[p(5, 5), far]),
                Err(IllegalAction::OutOfBounds(far))
            );
        }

        #[test]
        fn gap_breaks_chain() {
            let (_config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Cruiser, Player::First),
                ship_at(5, 7, ShipKind::Cruiser, Player::First),
            ]);
            assert_eq!(
                check(&state, &table, ShipKind::Cruiser, &[p(5, 5), p(5, 7)]),
                Err(IllegalAction::BlockNotContiguous(p(5, 5), p(5, 7)))
            );
        }

        #[test]
        fn diagonal_pair_is_contiguous() {
            let (_config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Cruiser, Player::First),
                ship_at(6, 6, ShipKind::Cruiser, Player::First),
            ]);
            assert!(check(&state, &table, ShipKind::Cruiser, &[p(5, 5), p(6, 6)]).is_ok());
        }

        #[test]
        fn folded_chain_rejected() {
            let (_config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Cruiser, Player::First),
                ship_at(5, 6, ShipKind::Cruiser, Player::First),
            ]);
            assert_eq!(
                check(&state, &table, ShipKind::Cruiser, &[p(5, 5), p(5, 6), p(5, 5)]),
                Err(IllegalAction::BlockFolded)
            );
        }

        #[test]
        fn enemy_member_rejected() {
            let (_config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Cruiser, Player::First),
                ship_at(5, 6, ShipKind::Cruiser, Player::Second),
            ]);
            assert_eq!(
                check(&state, &table, ShipKind::Cruiser, &[p(5, 5), p(5, 6)]),
                Err(IllegalAction::NotOwner(p(5, 6)))
            );
        }
    }

    mod grouping_tests {
        use super::*;

        #[test]
        fn uniform_block() {
            let (_config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Patrol, Player::First),
                ship_at(5, 6, ShipKind::Patrol, Player::First),
            ]);
            assert!(check(&state, &table, ShipKind::Patrol, &[p(5, 5), p(5, 6)]).is_ok());
            assert_eq!(
                check(&state, &table, ShipKind::Cruiser, &[p(5, 5), p(5, 6)]),
                Err(IllegalAction::BlockMismatch(ShipKind::Cruiser))
            );
        }

        #[test]
        fn strengthless_type_not_eligible() {
            let (_config, table, state) = layout(&[ship_at(5, 5, ShipKind::Submarine, Player::First)]);
            assert_eq!(
                check(&state, &table, ShipKind::Submarine, &[p(5, 5)]),
                Err(IllegalAction::BlockNotEligible(ShipKind::Submarine))
            );
        }

        #[test]
        fn raider_joins_weaker_block() {
            let (_config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Destroyer, Player::First),
                ship_at(5, 6, ShipKind::Raider, Player::First),
            ]);
            assert!(check(&state, &table, ShipKind::Destroyer, &[p(5, 5), p(5, 6)]).is_ok());
        }

        #[test]
        fn raider_cannot_join_stronger_block() {
            let (_config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Cruiser, Player::First),
                ship_at(5, 6, ShipKind::Raider, Player::First),
            ]);
            assert_eq!(
                check(&state, &table, ShipKind::Cruiser, &[p(5, 5), p(5, 6)]),
                Err(IllegalAction::BlockMismatch(ShipKind::Cruiser))
            );
        }

        #[test]
        fn convoy_pair_either_order() {
            let (_config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Carrier, Player::First),
                ship_at(5, 6, ShipKind::Patrol, Player::First),
            ]);
            assert!(check(&state, &table, ShipKind::Carrier, &[p(5, 5), p(5, 6)]).is_ok());
            assert!(check(&state, &table, ShipKind::Carrier, &[p(5, 6), p(5, 5)]).is_ok());
            assert_eq!(
                check(&state, &table, ShipKind::Patrol, &[p(5, 5), p(5, 6)]),
                Err(IllegalAction::BlockMismatch(ShipKind::Patrol))
            );
        }

        #[test]
        fn convoy_triple_needs_raider_in_middle() {
            let (_config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Carrier, Player::First),
                ship_at(5, 6, ShipKind::Raider, Player::First),
                ship_at(5, 7, ShipKind::Patrol, Player::First),
            ]);
            let forward = [p(5, 5), p(5, 6), p(5, 7)];
            let backward = [p(5, 7), p(5, 6), p(5, 5)];
            assert!(check(&state, &table, ShipKind::Carrier, &forward).is_ok());
            assert!(check(&state, &table, ShipKind::Carrier, &backward).is_ok());
        }

        #[test]
        fn convoy_triple_wrong_order_rejected() {
            let (_config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Raider, Player::First),
                ship_at(5, 6, ShipKind::Carrier, Player::First),
                ship_at(5, 7, ShipKind::Patrol, Player::First),
            ]);
            assert_eq!(
                check(&state, &table, ShipKind::Carrier, &[p(5, 5), p(5, 6), p(5, 7)]),
                Err(IllegalAction::BlockMismatch(ShipKind::Carrier))
            );
        }
    }

    mod enumeration_tests {
        use super::*;

        #[test]
        fn lone_ship_has_one_block() {
            let (_config, table, state) = layout(&[ship_at(0, 0, ShipKind::Battleship, Player::First)]);
            let blocks = get_blocks(state.board(), &table, Player::First, p(0, 0));
            assert_eq!(blocks, vec![Block::new(ShipKind::Battleship, vec![p(0, 0)])]);
        }

        #[test]
        fn foreign_anchor_has_none() {
            let (_config, table, state) = layout(&[ship_at(0, 0, ShipKind::Battleship, Player::Second)]);
            assert!(get_blocks(state.board(), &table, Player::First, p(0, 0)).is_empty());
        }

        #[test]
        fn pair_reported_once() {
            let (_config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Patrol, Player::First),
                ship_at(5, 6, ShipKind::Patrol, Player::First),
            ]);
            let blocks = get_blocks(state.board(), &table, Player::First, p(5, 5));
            let pairs: Vec<_> = blocks.iter().filter(|b| b.size == 2).collect();
            assert_eq!(pairs.len(), 1);
            assert_eq!(blocks.len(), 2);
        }

        #[test]
        fn raider_offers_every_weaker_declaration() {
            let (_config, table, state) = layout(&[ship_at(5, 5, ShipKind::Raider, Player::First)]);
            let declared: Vec<_> = get_blocks(state.board(), &table, Player::First, p(5, 5))
                .into_iter()
                .map(|b| b.declared)
                .collect();
            assert!(declared.contains(&ShipKind::Raider));
            assert!(declared.contains(&ShipKind::Destroyer));
            assert!(declared.contains(&ShipKind::Minesweeper));
            assert!(!declared.contains(&ShipKind::Cruiser));
        }

        #[test]
        fn triangle_reported_once_per_type() {
            let (_config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Patrol, Player::First),
                ship_at(5, 6, ShipKind::Patrol, Player::First),
                ship_at(6, 5, ShipKind::Patrol, Player::First),
            ]);
            let triples: Vec<_> = get_blocks(state.board(), &table, Player::First, p(5, 5))
                .into_iter()
                .filter(|b| b.size == 3)
                .collect();
            assert_eq!(triples.len(), 1);
        }

        #[test]
        fn every_candidate_passes_check() {
            let (_config, table, state) = layout(&[
                ship_at(5, 5, ShipKind::Carrier, Player::First),
                ship_at(5, 6, ShipKind::Raider, Player::First),
                ship_at(6, 7, ShipKind::Patrol, Player::First),
                ship_at(4, 5, ShipKind::Patrol, Player::First),
                ship_at(6, 6, ShipKind::Destroyer, Player::First),
            ]);
            let blocks = get_blocks(state.board(), &table, Player::First, p(5, 6));
            assert!(blocks.iter().any(|b| b.size == 3 && b.declared == ShipKind::Carrier));
            for block in &blocks {
                assert!(block.contains(p(5, 6)));
                assert!(check(&state, &table, block.declared, &block.coords).is_ok());
            }
        }
    }

    #[test]
    fn power_is_size_times_strength() {
        let table = CapabilityTable::standard();
        let block = Block::new(ShipKind::Patrol, vec![p(0, 0), p(0, 1)]);
        assert_eq!(block.power(&table), Some(3.0));
        assert_eq!(Block::new(ShipKind::Plane, vec![p(0, 0)]).power(&table), None);
    }
}
