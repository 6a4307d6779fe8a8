//! Shoot resolver: ranged fire along a straight line.
//!
//! Obstruction uses the same monotone path search as movement, so a diagonal
//! shot passes if any staircase route to the target is empty.

use super::{path_clear, ActionMode, ActionResolver, Continuation, Rules, TurnContext};
use crate::board::Position;
use crate::capability::ShootSpec;
use crate::error::{ActionError, IllegalAction, InvariantViolation};
use crate::event::Event;
use crate::ship::Player;

/// Ranged attack on a non-adjacent enemy in line of fire.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShootResolver;

impl ShootResolver {
    fn spec(rules: Rules<'_>, player: Player, from: Position) -> Result<ShootSpec, ActionError> {
        let ship = rules.own_ship(player, from)?;
        rules.capability(ship.kind)?.shoot.ok_or_else(|| {
            IllegalAction::Incapable {
                kind: ship.kind,
                mode: ActionMode::Shoot,
            }
            .into()
        })
    }
}

impl ActionResolver for ShootResolver {
    fn mode(&self) -> ActionMode {
        ActionMode::Shoot
    }

    fn can_from(&self, rules: Rules<'_>, player: Player, from: Position) -> Result<(), ActionError> {
        Self::spec(rules, player, from)?;
        let kind = rules.own_ship(player, from)?.kind;
        rules.require_escort(player, kind, from, None)
    }

    fn can(&self, rules: Rules<'_>, player: Player, from: Position, to: Position) -> Result<(), ActionError> {
        self.can_from(rules, player, from)?;
        let spec = Self::spec(rules, player, from)?;
        rules.enemy_ship(player, to)?;

        let d = from.delta_to(to).abs();
        let aligned = d.x == 0 || d.y == 0 || (spec.diagonal && d.x == d.y);
        if !aligned {
            return Err(IllegalAction::NotInLine.into());
        }
        let distance = from.chebyshev(to);
        if distance < 2 {
            return Err(IllegalAction::TooClose.into());
        }
        let max = u32::from(spec.range);
        if distance > max {
            return Err(IllegalAction::TooFar { distance, max }.into());
        }
        if !path_clear(rules.state.board(), from, to) {
            return Err(IllegalAction::PathBlocked { from, to }.into());
        }
        Ok(())
    }

    fn take(&self, ctx: &mut TurnContext<'_>, from: Position, to: Position) -> Result<Continuation, InvariantViolation> {
        let player = ctx.player();
        let shooter = ctx.kind_at(from)?;
        let spec = ctx
            .capability(shooter)?
            .shoot
            .ok_or(InvariantViolation::MissingCapability(shooter))?;
        let target = ctx.kind_at(to)?;

        ctx.count_special();
        ctx.log(Event::Shoot {
            from,
            to,
            ship: shooter,
            player,
            area: None,
        });

        if spec.immune.contains(&target) {
            tracing::debug!(%from, %to, %target, "shot absorbed");
            return Ok(if spec.continue_on_miss {
                Continuation::FollowUp(from)
            } else {
                Continuation::EndTurn
            });
        }

        ctx.kill(to)?;
        if spec.consumed_on_hit {
            ctx.kill(from)?;
        }
        Ok(Continuation::EndTurn)
    }
}
