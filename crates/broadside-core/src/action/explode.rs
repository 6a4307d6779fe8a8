//! Explode resolver: self-destructing area effects.
//!
//! A blast with reach 0 detonates in place and is logged as `explode`.
//! A blast with reach > 0 is thrown at a cell and is logged as an area
//! `shoot`. Either way the originating ship is destroyed first, then every
//! ship within the blast radius of the center is killed or neutralized.

use super::{ActionMode, ActionResolver, Continuation, Rules, TurnContext};
use crate::board::Position;
use crate::capability::{BlastEffect, BlastSpec};
use crate::error::{ActionError, IllegalAction, InvariantViolation};
use crate::event::Event;
use crate::ship::{Owner, Player, ShipKind};

/// Detonates `kind` at `from`, centered on `to`.
///
/// `player` is the bomb's owner, recorded in the log entry.
///
/// # Errors
///
/// Propagates invariant violations from the context.
pub(crate) fn detonate(
    ctx: &mut TurnContext<'_>,
    player: Player,
    from: Position,
    to: Position,
    kind: ShipKind,
    spec: BlastSpec,
) -> Result<(), InvariantViolation> {
    let event = if spec.reach == 0 {
        Event::Explode {
            from,
            to,
            ship: kind,
            player,
        }
    } else {
        Event::Shoot {
            from,
            to,
            ship: kind,
            player,
            area: Some(spec.radius),
        }
    };
    ctx.log(event);
    ctx.kill(from)?;

    let area: Vec<Position> = ctx
        .state()
        .board()
        .within(to, u32::from(spec.radius))
        .collect();
    for pos in area {
        match spec.effect {
            BlastEffect::Kill => {
                ctx.kill(pos)?;
            }
            BlastEffect::Neutralize => {
                if ctx.state().board().get(pos).is_some() {
                    ctx.set_owner(pos, Owner::Neutral)?;
                }
            }
        }
    }
    tracing::debug!(%from, %to, %kind, radius = spec.radius, "blast");
    Ok(())
}

/// Self-destructing blast within the ship's reach.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExplodeResolver;

impl ExplodeResolver {
    fn spec(rules: Rules<'_>, player: Player, from: Position) -> Result<BlastSpec, ActionError> {
        let ship = rules.own_ship(player, from)?;
        rules.capability(ship.kind)?.blast.ok_or_else(|| {
            IllegalAction::Incapable {
                kind: ship.kind,
                mode: ActionMode::Explode,
            }
            .into()
        })
    }
}

impl ActionResolver for ExplodeResolver {
    fn mode(&self) -> ActionMode {
        ActionMode::Explode
    }

    fn can_from(&self, rules: Rules<'_>, player: Player, from: Position) -> Result<(), ActionError> {
        Self::spec(rules, player, from)?;
        let kind = rules.own_ship(player, from)?.kind;
        rules.require_escort(player, kind, from, None)
    }

    fn can(&self, rules: Rules<'_>, player: Player, from: Position, to: Position) -> Result<(), ActionError> {
        self.can_from(rules, player, from)?;
        if !rules.state.board().contains(to) {
            return Err(IllegalAction::OutOfBounds(to).into());
        }
        let spec = Self::spec(rules, player, from)?;
        let distance = from.chebyshev(to);
        let max = u32::from(spec.reach);
        if distance > max {
            return Err(IllegalAction::TooFar { distance, max }.into());
        }
        Ok(())
    }

    fn take(&self, ctx: &mut TurnContext<'_>, from: Position, to: Position) -> Result<Continuation, InvariantViolation> {
        let player = ctx.player();
        let kind = ctx.kind_at(from)?;
        let spec = ctx
            .capability(kind)?
            .blast
            .ok_or(InvariantViolation::MissingCapability(kind))?;
        ctx.count_special();
        detonate(ctx, player, from, to, kind, spec)?;
        Ok(Continuation::EndTurn)
    }
}
