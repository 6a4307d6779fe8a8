//! Square grid of cells, each empty or holding one [`Ship`].
//!
//! The board is the only place ship records live. All writes go through
//! [`Board::set`] and [`Board::get_mut`]; rule code never indexes the cell
//! vector directly.
//!
//! # Coordinates
//!
//! A [`Position`] is `(row, col)` with row 0 at the top. Offsets use
//! [`glam::IVec2`] with `x` as the column delta and `y` as the row delta.
//! Two distances are used by the rules:
//! - **Manhattan**: movement budget and attack adjacency
//! - **Chebyshev**: escort neighborhoods, block chains, blast areas

use glam::IVec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ship::Ship;

/// A cell coordinate.
///
/// Positions are plain values and may lie outside the board; use
/// [`Board::contains`] before touching a cell.
///
/// # Example
///
/// ```
/// use broadside_core::board::Position;
///
/// let a = Position::new(2, 3);
/// let b = Position::new(4, 2);
///
/// assert_eq!(a.manhattan(b), 3);
/// assert_eq!(a.chebyshev(b), 2);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Row index, 0 at the top.
    pub row: i32,
    /// Column index, 0 at the left.
    pub col: i32,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Offset from `self` to `other` (`x` = columns, `y` = rows).
    ///
    /// Saturates at `±i32::MAX` so far-off coordinates never overflow.
    #[must_use]
    pub fn delta_to(self, other: Position) -> IVec2 {
        IVec2::new(
            other.col.saturating_sub(self.col),
            other.row.saturating_sub(self.row),
        )
        .max(IVec2::splat(-i32::MAX))
    }

    /// This position shifted by `delta`.
    #[must_use]
    pub fn offset(self, delta: IVec2) -> Position {
        Position::new(self.row + delta.y, self.col + delta.x)
    }

    /// Sum of absolute row and column differences.
    #[must_use]
    pub fn manhattan(self, other: Position) -> u32 {
        let d = self.delta_to(other).abs();
        d.x.saturating_add(d.y).unsigned_abs()
    }

    /// Larger of the absolute row and column differences.
    #[must_use]
    pub fn chebyshev(self, other: Position) -> u32 {
        self.delta_to(other).abs().max_element().unsigned_abs()
    }

    /// Returns `true` if `other` is one of the eight surrounding cells.
    #[must_use]
    pub fn touches(self, other: Position) -> bool {
        self.chebyshev(other) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

/// The eight king-move offsets, row-major.
pub const KING_OFFSETS: [IVec2; 8] = [
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
];

/// Square grid of optional ships, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: u16,
    cells: Vec<Option<Ship>>,
}

impl Board {
    /// Creates an empty board with `size × size` cells.
    #[must_use]
    pub fn new(size: u16) -> Self {
        let n = usize::from(size);
        Self {
            size,
            cells: vec![None; n * n],
        }
    }

    /// Edge length.
    #[must_use]
    pub const fn size(&self) -> u16 {
        self.size
    }

    /// Returns `true` if `pos` lies on the board.
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        let n = i32::from(self.size);
        (0..n).contains(&pos.row) && (0..n).contains(&pos.col)
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        // Both coordinates are in 0..size here.
        let row = usize::try_from(pos.row).ok()?;
        let col = usize::try_from(pos.col).ok()?;
        Some(row * usize::from(self.size) + col)
    }

    /// Ship at `pos`, or `None` if the cell is empty or off-board.
    #[must_use]
    pub fn get(&self, pos: Position) -> Option<&Ship> {
        self.index(pos).and_then(|i| self.cells[i].as_ref())
    }

    /// Mutable access to the ship at `pos`.
    pub(crate) fn get_mut(&mut self, pos: Position) -> Option<&mut Ship> {
        let i = self.index(pos)?;
        self.cells[i].as_mut()
    }

    /// Writes `ship` into `pos`, returning the previous occupant.
    ///
    /// Off-board writes are ignored and return `None`.
    pub(crate) fn set(&mut self, pos: Position, ship: Option<Ship>) -> Option<Ship> {
        let i = self.index(pos)?;
        std::mem::replace(&mut self.cells[i], ship)
    }

    /// Removes and returns the ship at `pos`.
    pub(crate) fn take(&mut self, pos: Position) -> Option<Ship> {
        self.set(pos, None)
    }

    /// Exchanges the contents of two cells. Either may be empty.
    pub(crate) fn swap(&mut self, a: Position, b: Position) {
        if let (Some(i), Some(j)) = (self.index(a), self.index(b)) {
            self.cells.swap(i, j);
        }
    }

    /// Returns `true` if `pos` is on the board and unoccupied.
    #[must_use]
    pub fn is_vacant(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|i| self.cells[i].is_none())
    }

    /// Every on-board position, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let n = i32::from(self.size);
        (0..n).flat_map(move |row| (0..n).map(move |col| Position::new(row, col)))
    }

    /// Occupied cells with their ships, row-major.
    pub fn ships(&self) -> impl Iterator<Item = (Position, &Ship)> + '_ {
        self.positions()
            .zip(self.cells.iter())
            .filter_map(|(pos, cell)| cell.as_ref().map(|ship| (pos, ship)))
    }

    /// Mutable iteration over every ship.
    pub(crate) fn ships_mut(&mut self) -> impl Iterator<Item = &mut Ship> {
        self.cells.iter_mut().flatten()
    }

    /// On-board cells touching `pos` (up to eight).
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        KING_OFFSETS
            .iter()
            .map(move |&d| pos.offset(d))
            .filter(|&p| self.contains(p))
    }

    /// On-board cells within Chebyshev distance `radius` of `center`,
    /// including `center` itself. Row-major.
    pub fn within(&self, center: Position, radius: u32) -> impl Iterator<Item = Position> + '_ {
        let r = i32::try_from(radius).unwrap_or(i32::MAX).min(i32::from(self.size));
        (-r..=r)
            .flat_map(move |dr| (-r..=r).map(move |dc| Position::new(center.row + dr, center.col + dc)))
            .filter(|&p| self.contains(p))
    }
}
