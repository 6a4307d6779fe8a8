//! Move resolver and path clearance.

use glam::IVec2;

use super::{ActionMode, ActionResolver, Continuation, Rules, TurnContext};
use crate::board::{Board, Position};
use crate::error::{ActionError, IllegalAction, InvariantViolation};
use crate::event::Event;
use crate::ship::{Player, ShipFlags};

/// Returns `true` if some monotone path of single orthogonal steps leads
/// from `from` to `to` with every intermediate cell empty.
///
/// Each step moves one cell closer along the row or the column axis, so a
/// path is exactly `manhattan(from, to)` steps long. The endpoints
/// themselves are not inspected.
///
/// # Example
///
/// ```
/// use broadside_core::action::path_clear;
/// use broadside_core::board::{Board, Position};
///
/// let board = Board::new(5);
/// assert!(path_clear(&board, Position::new(0, 0), Position::new(2, 3)));
/// ```
#[must_use]
pub fn path_clear(board: &Board, from: Position, to: Position) -> bool {
    let delta = from.delta_to(to);
    let step = delta.signum();
    let width = usize::try_from(delta.x.unsigned_abs()).unwrap_or(usize::MAX) + 1;
    let height = usize::try_from(delta.y.unsigned_abs()).unwrap_or(usize::MAX) + 1;
    let mut seen = vec![false; width.saturating_mul(height)];

    // Cells are indexed by their offset from `from` inside the bounding box.
    let slot = |pos: Position| -> usize {
        let d = from.delta_to(pos).abs();
        let x = usize::try_from(d.x).unwrap_or(usize::MAX);
        let y = usize::try_from(d.y).unwrap_or(usize::MAX);
        y.saturating_mul(width).saturating_add(x)
    };

    let mut stack = vec![from];
    while let Some(cell) = stack.pop() {
        if cell == to {
            return true;
        }
        let remaining = cell.delta_to(to);
        let steps = [
            (remaining.x != 0).then(|| IVec2::new(step.x, 0)),
            (remaining.y != 0).then(|| IVec2::new(0, step.y)),
        ];
        for next in steps.into_iter().flatten().map(|d| cell.offset(d)) {
            let i = slot(next);
            if seen[i] {
                continue;
            }
            seen[i] = true;
            if next == to || board.is_vacant(next) {
                stack.push(next);
            }
        }
    }
    false
}

/// Relocates a ship within its Manhattan movement budget.
#[derive(Debug, Default, Clone, Copy)]
pub struct MoveResolver;

impl ActionResolver for MoveResolver {
    fn mode(&self) -> ActionMode {
        ActionMode::Move
    }

    fn can_from(&self, rules: Rules<'_>, player: Player, from: Position) -> Result<(), ActionError> {
        let ship = rules.own_ship(player, from)?;
        if rules.capability(ship.kind)?.max_move == 0 {
            return Err(IllegalAction::Incapable {
                kind: ship.kind,
                mode: ActionMode::Move,
            }
            .into());
        }
        rules.require_escort(player, ship.kind, from, None)
    }

    fn can(&self, rules: Rules<'_>, player: Player, from: Position, to: Position) -> Result<(), ActionError> {
        self.can_from(rules, player, from)?;
        let board = rules.state.board();
        if !board.contains(to) {
            return Err(IllegalAction::OutOfBounds(to).into());
        }
        if from == to {
            return Err(IllegalAction::SamePosition.into());
        }
        if !board.is_vacant(to) {
            return Err(IllegalAction::Occupied(to).into());
        }
        let ship = rules.own_ship(player, from)?;
        let max = u32::from(rules.capability(ship.kind)?.max_move);
        let distance = from.manhattan(to);
        if distance > max {
            return Err(IllegalAction::TooFar { distance, max }.into());
        }
        rules.require_escort(player, ship.kind, to, Some(from))?;
        if !path_clear(board, from, to) {
            return Err(IllegalAction::PathBlocked { from, to }.into());
        }
        Ok(())
    }

    fn take(&self, ctx: &mut TurnContext<'_>, from: Position, to: Position) -> Result<Continuation, InvariantViolation> {
        ctx.relocate(from, to)?;
        ctx.mark(to, ShipFlags::MOVED);
        let player = ctx.player();
        ctx.log(Event::Move { from, to, player });
        Ok(Continuation::FollowUp(to))
    }
}
