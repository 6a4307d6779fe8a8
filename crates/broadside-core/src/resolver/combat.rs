//! Combat resolution.
//!
//! Scores a melee attack and applies the result:
//! - **Duel**: when the attacker has a duel rule it decides; otherwise a
//!   target duel rule decides with its result reversed.
//! - **Blocks**: `attack.size × strength(attack.declared)` minus the same
//!   for the response block.
//!
//! # Outcomes
//!
//! | Score | Outcome | Effect |
//! |-------|---------|--------|
//! | `|s| < ε` | Draw | every ship in both blocks dies (or both duelists) |
//! | `s > 0` | Attacker wins | target dies; attacker earns a follow-up |
//! | `s < 0` | Attacker loses | attacker dies |

use std::cmp::Ordering;

use super::Block;
use crate::action::{Continuation, TurnContext};
use crate::board::Position;
use crate::capability::CapabilityTable;
use crate::error::InvariantViolation;
use crate::ship::{ShipFlags, ShipKind};

/// Result of a resolved combat, from the attacker's side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CombatOutcome {
    /// Target is destroyed.
    AttackerWins,
    /// Both sides are destroyed.
    Draw,
    /// Attacker is destroyed.
    AttackerLoses,
}

impl From<Ordering> for CombatOutcome {
    fn from(ord: Ordering) -> Self {
        match ord {
            Ordering::Greater => Self::AttackerWins,
            Ordering::Equal => Self::Draw,
            Ordering::Less => Self::AttackerLoses,
        }
    }
}

/// Stateless combat scoring and effects.
#[derive(Debug, Default, Clone, Copy)]
pub struct CombatResolver;

impl CombatResolver {
    /// Scores within this distance of zero are draws.
    pub const EPSILON: f64 = 1e-7;

    /// Immediate duel outcome, if either kind has a duel rule.
    ///
    /// # Errors
    ///
    /// Fails if either kind is missing from the table.
    pub fn duel(
        table: &CapabilityTable,
        attacker: ShipKind,
        target: ShipKind,
    ) -> Result<Option<CombatOutcome>, InvariantViolation> {
        if let Some(compare) = table.get(attacker)?.compare {
            return Ok(Some(compare(target).into()));
        }
        if let Some(compare) = table.get(target)?.compare {
            return Ok(Some(compare(attacker).reverse().into()));
        }
        Ok(None)
    }

    /// Signed block score: positive favors the attacker.
    ///
    /// # Errors
    ///
    /// Fails if a declared type has no strength.
    pub fn score(
        table: &CapabilityTable,
        attack: &Block,
        response: &Block,
    ) -> Result<f64, InvariantViolation> {
        let power = |block: &Block| {
            block
                .power(table)
                .ok_or(InvariantViolation::MissingStrength(block.declared))
        };
        Ok(power(attack)? - power(response)?)
    }

    /// Classifies a score.
    #[must_use]
    pub fn classify(score: f64) -> CombatOutcome {
        if score.abs() < Self::EPSILON {
            CombatOutcome::Draw
        } else if score > 0.0 {
            CombatOutcome::AttackerWins
        } else {
            CombatOutcome::AttackerLoses
        }
    }

    /// Outcome of a block combat.
    ///
    /// # Errors
    ///
    /// Fails if a declared type has no strength.
    pub fn resolve(
        table: &CapabilityTable,
        attack: &Block,
        response: &Block,
    ) -> Result<CombatOutcome, InvariantViolation> {
        Self::score(table, attack, response).map(Self::classify)
    }

    /// Applies `outcome` for an attack from `from` on `to`.
    ///
    /// With `blocks`, a draw destroys every member of both blocks;
    /// without, only the two duelists.
    ///
    /// # Errors
    ///
    /// Propagates context failures.
    pub fn apply(
        ctx: &mut TurnContext<'_>,
        from: Position,
        to: Position,
        outcome: CombatOutcome,
        blocks: Option<(&Block, &Block)>,
    ) -> Result<Continuation, InvariantViolation> {
        tracing::debug!(%from, %to, ?outcome, "combat resolved");
        match outcome {
            CombatOutcome::Draw => {
                match blocks {
                    Some((attack, response)) => {
                        for &pos in attack.coords.iter().chain(&response.coords) {
                            ctx.kill(pos)?;
                        }
                    }
                    None => {
                        ctx.kill(from)?;
                        ctx.kill(to)?;
                    }
                }
                Ok(Continuation::EndTurn)
            }
            CombatOutcome::AttackerWins => {
                ctx.kill(to)?;
                ctx.mark(from, ShipFlags::BONUS);
                Ok(Continuation::FollowUp(from))
            }
            CombatOutcome::AttackerLoses => {
                ctx.kill(from)?;
                Ok(Continuation::EndTurn)
            }
        }
    }
}
