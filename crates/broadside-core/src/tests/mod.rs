//! Cross-module tests.
//!
//! - `scenarios.rs`: full games driven through [`Game::submit`](crate::game::Game::submit)
//! - `properties.rs`: property tests for block checks, placement, and movement
//! - `helpers.rs`: layout builders shared by every test module in the crate

pub(crate) mod helpers;

pub use helpers::*;
