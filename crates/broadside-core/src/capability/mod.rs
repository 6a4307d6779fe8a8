//! Capability table: everything a ship type can do.
//!
//! Rules never branch on [`ShipKind`] directly. Instead each kind maps to a
//! [`CapabilityDescriptor`] assembled from small fragments (mobility,
//! strength, escort, ranged fire, blast, special hooks). The table also names
//! the kinds that play structural roles in block combat and victory.
//!
//! # Architecture
//!
//! - [`CapabilityDescriptor`]: per-kind record built with `with_*` fragments
//! - [`ShootSpec`] / [`BlastSpec`]: ranged and area capabilities
//! - [`Roles`]: raider, convoy, universal escort, and fort kinds
//! - [`CapabilityTable`]: kind → descriptor lookup, validated once
//!
//! # Example
//!
//! ```
//! use broadside_core::capability::CapabilityTable;
//! use broadside_core::ship::ShipKind;
//!
//! let table = CapabilityTable::standard();
//! table.validate().unwrap();
//!
//! let cruiser = table.get(ShipKind::Cruiser).unwrap();
//! assert_eq!(cruiser.max_move, 2);
//! assert_eq!(cruiser.strength, Some(4.0));
//! ```

mod standard;

use std::cmp::Ordering;
use std::fmt;

use crate::action::{Continuation, TurnContext};
use crate::board::Position;
use crate::error::InvariantViolation;
use crate::ship::ShipKind;

pub use standard::{defuse, detonate_in_place, sink_on_contact, storm_fort, sweep_or_detonate};

/// Custom duel rule: how the owner's kind fares against another kind.
///
/// `Greater` means the owner wins, `Less` the owner loses.
pub type CompareFn = fn(ShipKind) -> Ordering;

/// Hook run instead of normal combat when a ship of this kind is attacked.
///
/// Receives the attacker and target cells.
pub type OnAttackFn =
    fn(&mut TurnContext<'_>, Position, Position) -> Result<Continuation, InvariantViolation>;

/// Ranged attack along a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShootSpec {
    /// Diagonal lines allowed in addition to orthogonal ones.
    pub diagonal: bool,
    /// Maximum Chebyshev distance.
    pub range: u8,
    /// Target kinds the shot cannot sink.
    pub immune: &'static [ShipKind],
    /// Shooter is destroyed when the shot sinks its target.
    pub consumed_on_hit: bool,
    /// Shooter may keep acting after a shot that sank nothing.
    pub continue_on_miss: bool,
}

/// What an area blast does to each ship it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlastEffect {
    /// Destroy the ship.
    Kill,
    /// Strip ownership; the ship becomes neutral.
    Neutralize,
}

/// Self-destructing area effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlastSpec {
    /// Maximum Chebyshev distance to the blast center. Zero means in place.
    pub reach: u8,
    /// Chebyshev radius around the center.
    pub radius: u8,
    /// Effect on covered ships.
    pub effect: BlastEffect,
}

/// Everything one ship kind can do.
///
/// Build descriptors from fragments:
///
/// ```
/// use broadside_core::capability::CapabilityDescriptor;
/// use broadside_core::ship::ShipKind;
///
/// let plane = CapabilityDescriptor::mobile(4).escorted_by(ShipKind::Carrier);
/// assert_eq!(plane.max_move, 4);
/// assert!(!plane.can_attack());
/// ```
#[derive(Clone, Copy, Default)]
pub struct CapabilityDescriptor {
    /// Manhattan movement budget; zero means immobile.
    pub max_move: u8,
    /// Kind that must be adjacent before this ship may act.
    pub escort: Option<ShipKind>,
    /// Block strength; absent means the kind cannot form blocks.
    pub strength: Option<f64>,
    /// Hook replacing normal combat when attacked.
    pub on_attack: Option<OnAttackFn>,
    /// Ranged attack.
    pub shoot: Option<ShootSpec>,
    /// Self-destructing blast.
    pub blast: Option<BlastSpec>,
    /// Custom duel rule bypassing blocks.
    pub compare: Option<CompareFn>,
}

impl CapabilityDescriptor {
    /// Fragment for a kind that never moves.
    #[must_use]
    pub fn immobile() -> Self {
        Self::default()
    }

    /// Fragment for a kind moving up to `max_move` cells.
    #[must_use]
    pub fn mobile(max_move: u8) -> Self {
        Self {
            max_move,
            ..Self::default()
        }
    }

    /// Adds block strength.
    #[must_use]
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }

    /// Requires an adjacent escort.
    #[must_use]
    pub fn escorted_by(mut self, escort: ShipKind) -> Self {
        self.escort = Some(escort);
        self
    }

    /// Adds a custom duel rule.
    #[must_use]
    pub fn with_compare(mut self, compare: CompareFn) -> Self {
        self.compare = Some(compare);
        self
    }

    /// Adds an on-attacked hook.
    #[must_use]
    pub fn when_attacked(mut self, hook: OnAttackFn) -> Self {
        self.on_attack = Some(hook);
        self
    }

    /// Adds a ranged attack.
    #[must_use]
    pub fn with_shoot(mut self, shoot: ShootSpec) -> Self {
        self.shoot = Some(shoot);
        self
    }

    /// Adds a self-destructing blast.
    #[must_use]
    pub fn with_blast(mut self, blast: BlastSpec) -> Self {
        self.blast = Some(blast);
        self
    }

    /// Returns `true` if the kind can launch melee attacks.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.strength.is_some() || self.compare.is_some()
    }

    /// Returns `true` if attacking this kind has a defined outcome for
    /// some attacker.
    #[must_use]
    pub fn is_attackable(&self) -> bool {
        self.strength.is_some() || self.compare.is_some() || self.on_attack.is_some()
    }
}

impl fmt::Debug for CapabilityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityDescriptor")
            .field("max_move", &self.max_move)
            .field("escort", &self.escort)
            .field("strength", &self.strength)
            .field("on_attack", &self.on_attack.is_some())
            .field("shoot", &self.shoot)
            .field("blast", &self.blast)
            .field("compare", &self.compare.is_some())
            .finish()
    }
}

/// A two-kind pairing that forms mixed blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Convoy {
    /// Kind whose name the block is declared under.
    pub lead: ShipKind,
    /// Kind paired with the lead.
    pub guard: ShipKind,
}

/// Kinds with structural roles in the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roles {
    /// Satisfies any escort requirement.
    pub universal_escort: Option<ShipKind>,
    /// May substitute into blocks of weaker kinds.
    pub raider: Option<ShipKind>,
    /// Lead/guard pairing for mixed blocks.
    pub convoy: Option<Convoy>,
    /// Kind whose total loss loses the game.
    pub fort: ShipKind,
}

/// Table rejected at startup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CapabilityError {
    /// A kind needed by the roster or a role is absent.
    #[error("no capability entry for {0}")]
    MissingKind(ShipKind),
    /// Strength is zero, negative, or not finite.
    #[error("{kind} has invalid strength {strength}")]
    InvalidStrength {
        /// Offending kind.
        kind: ShipKind,
        /// Its strength.
        strength: f64,
    },
    /// Attacking this kind has no defined outcome.
    #[error("attacks on {0} have no resolution")]
    Unattackable(ShipKind),
    /// A role kind lacks the strength its role needs.
    #[error("{0} needs a strength for its role")]
    RoleWithoutStrength(ShipKind),
    /// Shoot range too short to ever fire.
    #[error("{0} has a shoot range below 2")]
    ShortRange(ShipKind),
}

/// Kind → descriptor lookup plus structural roles.
#[derive(Debug, Clone)]
pub struct CapabilityTable {
    entries: [Option<CapabilityDescriptor>; ShipKind::COUNT],
    roles: Roles,
}

impl CapabilityTable {
    /// Creates a table with no entries.
    #[must_use]
    pub fn new(roles: Roles) -> Self {
        Self {
            entries: [None; ShipKind::COUNT],
            roles,
        }
    }

    /// Adds or replaces the descriptor for `kind`.
    pub fn insert(&mut self, kind: ShipKind, descriptor: CapabilityDescriptor) {
        self.entries[kind.index()] = Some(descriptor);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, kind: ShipKind, descriptor: CapabilityDescriptor) -> Self {
        self.insert(kind, descriptor);
        self
    }

    /// Descriptor for `kind`.
    ///
    /// # Errors
    ///
    /// A missing entry is an [`InvariantViolation`]; tables are validated
    /// against the roster before play.
    pub fn get(&self, kind: ShipKind) -> Result<&CapabilityDescriptor, InvariantViolation> {
        self.entries[kind.index()]
            .as_ref()
            .ok_or(InvariantViolation::MissingCapability(kind))
    }

    /// Descriptor for `kind`, if present.
    #[must_use]
    pub fn lookup(&self, kind: ShipKind) -> Option<&CapabilityDescriptor> {
        self.entries[kind.index()].as_ref()
    }

    /// Returns `true` if `kind` has an entry.
    #[must_use]
    pub fn contains(&self, kind: ShipKind) -> bool {
        self.entries[kind.index()].is_some()
    }

    /// Structural roles.
    #[must_use]
    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    /// Strength of `kind`, if it has an entry with one.
    #[must_use]
    pub fn strength(&self, kind: ShipKind) -> Option<f64> {
        self.lookup(kind).and_then(|d| d.strength)
    }

    /// Kinds with an entry, in [`ShipKind::ALL`] order.
    pub fn kinds(&self) -> impl Iterator<Item = ShipKind> + '_ {
        ShipKind::ALL.into_iter().filter(|&k| self.contains(k))
    }

    /// Kinds that may be declared as a block type.
    pub fn block_kinds(&self) -> impl Iterator<Item = ShipKind> + '_ {
        self.kinds().filter(|&k| self.strength(k).is_some())
    }

    /// Returns `true` if a ship of `kind` next to a ship that needs
    /// `required` satisfies that escort requirement.
    #[must_use]
    pub fn escorts(&self, kind: ShipKind, required: ShipKind) -> bool {
        kind == required || self.roles.universal_escort == Some(kind)
    }

    /// Checks internal consistency.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), CapabilityError> {
        for kind in self.kinds() {
            let d = self.get(kind).map_err(|_| CapabilityError::MissingKind(kind))?;
            if let Some(strength) = d.strength {
                if !(strength.is_finite() && strength > 0.0) {
                    return Err(CapabilityError::InvalidStrength { kind, strength });
                }
            }
            if !d.is_attackable() {
                return Err(CapabilityError::Unattackable(kind));
            }
            if let Some(escort) = d.escort {
                self.require(escort)?;
            }
            if let Some(shoot) = d.shoot {
                if shoot.range < 2 {
                    return Err(CapabilityError::ShortRange(kind));
                }
            }
        }

        let roles = self.roles;
        self.require(roles.fort)?;
        if let Some(escort) = roles.universal_escort {
            self.require(escort)?;
        }
        if let Some(raider) = roles.raider {
            self.require_strength(raider)?;
        }
        if let Some(convoy) = roles.convoy {
            self.require_strength(convoy.lead)?;
            self.require(convoy.guard)?;
        }
        Ok(())
    }

    /// Checks that every kind in `kinds` has an entry.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::MissingKind`] for the first absent kind.
    pub fn covers(&self, kinds: impl IntoIterator<Item = ShipKind>) -> Result<(), CapabilityError> {
        kinds.into_iter().try_for_each(|k| self.require(k))
    }

    fn require(&self, kind: ShipKind) -> Result<(), CapabilityError> {
        if self.contains(kind) {
            Ok(())
        } else {
            Err(CapabilityError::MissingKind(kind))
        }
    }

    fn require_strength(&self, kind: ShipKind) -> Result<(), CapabilityError> {
        self.require(kind)?;
        self.strength(kind)
            .map(|_| ())
            .ok_or(CapabilityError::RoleWithoutStrength(kind))
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::standard()
    }
}
