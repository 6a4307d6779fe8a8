//! Place resolver: rearranging the own zone before play.

use super::{ActionMode, ActionResolver, Continuation, Rules, TurnContext};
use crate::board::Position;
use crate::error::{ActionError, IllegalAction, InvariantViolation};
use crate::ship::Player;
use crate::state::Phase;

/// Swaps two cells of the player's placement zone.
///
/// Either cell may be empty. Placement is secret, so nothing is logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceResolver;

impl ActionResolver for PlaceResolver {
    fn mode(&self) -> ActionMode {
        ActionMode::Place
    }

    fn can_from(&self, rules: Rules<'_>, player: Player, from: Position) -> Result<(), ActionError> {
        if rules.state.phase() != Phase::Placement {
            return Err(IllegalAction::WrongPhase.into());
        }
        if !rules.state.board().contains(from) {
            return Err(IllegalAction::OutOfBounds(from).into());
        }
        if !rules.config.in_zone(player, from) {
            return Err(IllegalAction::OutsideZone(from).into());
        }
        Ok(())
    }

    fn can(&self, rules: Rules<'_>, player: Player, from: Position, to: Position) -> Result<(), ActionError> {
        self.can_from(rules, player, from)?;
        if !rules.state.board().contains(to) {
            return Err(IllegalAction::OutOfBounds(to).into());
        }
        if !rules.config.in_zone(player, to) {
            return Err(IllegalAction::OutsideZone(to).into());
        }
        if from == to {
            return Err(IllegalAction::SamePosition.into());
        }
        Ok(())
    }

    fn take(&self, ctx: &mut TurnContext<'_>, from: Position, to: Position) -> Result<Continuation, InvariantViolation> {
        ctx.swap(from, to);
        Ok(Continuation::Stay)
    }
}
