//! Block combat: declaration checks, candidate search, and resolution.
//!
//! When neither side of a melee attack has a duel rule or a hook, both
//! players declare a [`Block`] of up to three touching ships under one
//! declared type. Resolution compares `size × strength` of the two blocks.
//!
//! # Available Resolvers
//!
//! - [`check_block`]: validates one declaration
//! - [`get_blocks`]: enumerates every valid declaration containing a ship
//! - [`CombatResolver`]: scores blocks or duels and applies the outcome

mod block;
mod combat;

pub use block::{check_block, get_blocks, Block};
pub use combat::{CombatOutcome, CombatResolver};
