//! The standard sixteen-kind table and its special rules.

use std::cmp::Ordering;

use super::{
    BlastEffect, BlastSpec, CapabilityDescriptor, CapabilityTable, Convoy, Roles, ShootSpec,
};
use crate::action::{explode, Continuation, TurnContext};
use crate::board::Position;
use crate::error::InvariantViolation;
use crate::ship::ShipKind::{
    self, Battleship, Carrier, Cruiser, Destroyer, Flagship, Fort, GasBomb, Mine, Minesweeper,
    NuclearBomb, Patrol, Plane, Raider, Submarine, Torpedo, TorpedoBoat,
};

// =============================================================================
// Fragments
// =============================================================================

fn warship(max_move: u8, strength: f64) -> CapabilityDescriptor {
    CapabilityDescriptor::mobile(max_move).with_strength(strength)
}

const TORPEDO_RUN: ShootSpec = ShootSpec {
    diagonal: false,
    range: 5,
    immune: &[Minesweeper],
    consumed_on_hit: true,
    continue_on_miss: true,
};

const NUCLEAR_BLAST: BlastSpec = BlastSpec {
    reach: 0,
    radius: 1,
    effect: BlastEffect::Kill,
};

const GAS_CLOUD: BlastSpec = BlastSpec {
    reach: 2,
    radius: 1,
    effect: BlastEffect::Neutralize,
};

impl CapabilityTable {
    /// The standard rule set.
    #[must_use]
    pub fn standard() -> Self {
        let roles = Roles {
            universal_escort: Some(Flagship),
            raider: Some(Raider),
            convoy: Some(Convoy {
                lead: Carrier,
                guard: Patrol,
            }),
            fort: Fort,
        };

        CapabilityTable::new(roles)
            .with(Fort, CapabilityDescriptor::immobile().when_attacked(storm_fort))
            .with(Battleship, warship(1, 5.0))
            .with(Cruiser, warship(2, 4.0))
            .with(Raider, warship(2, 3.0))
            .with(Destroyer, warship(2, 2.25))
            .with(Carrier, warship(1, 2.0))
            .with(Flagship, warship(1, 2.0))
            .with(Patrol, warship(2, 1.5))
            .with(Minesweeper, warship(1, 1.0))
            .with(TorpedoBoat, warship(3, 1.0))
            .with(
                Submarine,
                CapabilityDescriptor::mobile(1).with_compare(submarine_duel),
            )
            .with(
                Plane,
                CapabilityDescriptor::mobile(4)
                    .escorted_by(Carrier)
                    .with_compare(plane_duel),
            )
            .with(
                Torpedo,
                CapabilityDescriptor::mobile(2)
                    .escorted_by(TorpedoBoat)
                    .with_shoot(TORPEDO_RUN)
                    .when_attacked(sink_on_contact),
            )
            .with(
                Mine,
                CapabilityDescriptor::immobile().when_attacked(sweep_or_detonate),
            )
            .with(
                NuclearBomb,
                CapabilityDescriptor::mobile(1)
                    .with_blast(NUCLEAR_BLAST)
                    .when_attacked(detonate_in_place),
            )
            .with(
                GasBomb,
                CapabilityDescriptor::mobile(1)
                    .with_blast(GAS_CLOUD)
                    .when_attacked(defuse),
            )
    }
}

// =============================================================================
// Duel Rules
// =============================================================================

fn submarine_duel(other: ShipKind) -> Ordering {
    match other {
        Battleship | Cruiser | Raider | Carrier | Flagship | Torpedo => Ordering::Greater,
        Submarine => Ordering::Equal,
        _ => Ordering::Less,
    }
}

fn plane_duel(other: ShipKind) -> Ordering {
    match other {
        Patrol | Fort => Ordering::Less,
        Plane => Ordering::Equal,
        _ => Ordering::Greater,
    }
}

// =============================================================================
// On-Attacked Hooks
// =============================================================================

/// Fort hook: a strength-bearing attacker storms the fort, anything else
/// is sunk by its guns.
///
/// # Errors
///
/// Fails if either cell is empty or a kind is missing from the table.
pub fn storm_fort(
    ctx: &mut TurnContext<'_>,
    from: Position,
    to: Position,
) -> Result<Continuation, InvariantViolation> {
    let attacker = ctx.kind_at(from)?;
    if ctx.capability(attacker)?.strength.is_some() {
        ctx.kill(to)?;
    } else {
        ctx.kill(from)?;
    }
    Ok(Continuation::EndTurn)
}

/// Mine hook: minesweepers clear it, anything else sinks along with it.
///
/// # Errors
///
/// Fails if the attacker cell is empty.
pub fn sweep_or_detonate(
    ctx: &mut TurnContext<'_>,
    from: Position,
    to: Position,
) -> Result<Continuation, InvariantViolation> {
    if ctx.kind_at(from)? != Minesweeper {
        ctx.kill(from)?;
    }
    ctx.kill(to)?;
    Ok(Continuation::EndTurn)
}

/// Torpedo hook: the torpedo is sunk where it lies.
///
/// # Errors
///
/// Never fails for an occupied target.
pub fn sink_on_contact(
    ctx: &mut TurnContext<'_>,
    _from: Position,
    to: Position,
) -> Result<Continuation, InvariantViolation> {
    ctx.kill(to)?;
    Ok(Continuation::EndTurn)
}

/// Nuclear bomb hook: the bomb goes off in its own cell.
///
/// # Errors
///
/// Fails if the bomb cell is empty or its kind has no entry.
pub fn detonate_in_place(
    ctx: &mut TurnContext<'_>,
    _from: Position,
    to: Position,
) -> Result<Continuation, InvariantViolation> {
    let bomb = ctx.ship(to)?;
    let kind = bomb.kind;
    let owner = bomb.owner.player().unwrap_or_else(|| ctx.player().opponent());
    let spec = ctx.capability(kind)?.blast.unwrap_or(NUCLEAR_BLAST);
    explode::detonate(ctx, owner, to, to, kind, spec)?;
    Ok(Continuation::EndTurn)
}

/// Gas bomb hook: the bomb is defused and removed.
///
/// # Errors
///
/// Never fails for an occupied target.
pub fn defuse(
    ctx: &mut TurnContext<'_>,
    _from: Position,
    to: Position,
) -> Result<Continuation, InvariantViolation> {
    ctx.kill(to)?;
    Ok(Continuation::EndTurn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_valid() {
        let table = CapabilityTable::standard();
        table.validate().unwrap();
        assert_eq!(table.kinds().count(), ShipKind::COUNT);
    }

    #[test]
    fn standard_covers_default_roster() {
        let table = CapabilityTable::standard();
        let config = crate::config::GameConfig::default();
        table.covers(config.roster()).unwrap();
    }

    #[test]
    fn strengths_match_roster_sheet() {
        let table = CapabilityTable::standard();
        assert_eq!(table.strength(Battleship), Some(5.0));
        assert_eq!(table.strength(Destroyer), Some(2.25));
        assert_eq!(table.strength(Patrol), Some(1.5));
        assert_eq!(table.strength(Fort), None);
        assert_eq!(table.strength(Submarine), None);
    }

    #[test]
    fn block_kinds_exclude_specials() {
        let table = CapabilityTable::standard();
        let kinds: Vec<_> = table.block_kinds().collect();
        assert!(kinds.contains(&Raider));
        assert!(!kinds.contains(&Plane));
        assert!(!kinds.contains(&Mine));
        assert_eq!(kinds.len(), 9);
    }

    #[test]
    fn submarine_duels() {
        assert_eq!(submarine_duel(Battleship), Ordering::Greater);
        assert_eq!(submarine_duel(Submarine), Ordering::Equal);
        assert_eq!(submarine_duel(Destroyer), Ordering::Less);
        assert_eq!(submarine_duel(Plane), Ordering::Less);
    }

    #[test]
    fn plane_duels() {
        assert_eq!(plane_duel(Patrol), Ordering::Less);
        assert_eq!(plane_duel(Plane), Ordering::Equal);
        assert_eq!(plane_duel(Battleship), Ordering::Greater);
        assert_eq!(plane_duel(Submarine), Ordering::Greater);
    }

    #[test]
    fn plane_needs_carrier_escort() {
        let table = CapabilityTable::standard();
        assert_eq!(table.get(Plane).unwrap().escort, Some(Carrier));
        assert_eq!(table.get(Torpedo).unwrap().escort, Some(TorpedoBoat));
    }
}
