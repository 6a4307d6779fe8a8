//! # Broadside Core
//!
//! Rules engine for Broadside, a two-player fog-of-war naval strategy game
//! on a square grid.
//!
//! The engine validates and applies player commands, resolves combat, keeps
//! a public event log, and produces per-player filtered views. It performs
//! no I/O; hosts feed it commands and render its views.
//!
//! ## Architecture
//!
//! - **Capabilities**: a [`CapabilityTable`](capability::CapabilityTable)
//!   maps each ship kind to data (movement, strength, escort) and optional
//!   behavior hooks (attack reactions, shooting, blasts, duel rules)
//! - **Resolvers**: one [`ActionResolver`](action::ActionResolver) per
//!   action mode checks legality and applies effects
//! - **Blocks**: melee attacks without a duel rule are settled by
//!   comparing declared blocks of up to three ships
//! - **Game**: [`Game`] runs the phase and stage machine
//!
//! ## Usage
//!
//! ```rust
//! use broadside_core::{Command, Game, GameConfig, Player};
//!
//! let mut game = Game::new(GameConfig::default()).unwrap();
//! assert!(game.shuffle_zone(Player::First, 42).unwrap().is_applied());
//! assert!(game.submit(Player::First, Command::Ready).unwrap().is_applied());
//! assert!(game.submit(Player::Second, Command::Ready).unwrap().is_applied());
//!
//! let view = game.view(Player::Second);
//! assert_eq!(view.ships().count(), 70);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod action;
pub mod board;
pub mod capability;
pub mod config;
pub mod error;
pub mod event;
pub mod game;
pub mod resolver;
pub mod ship;
pub mod state;
pub mod view;

#[cfg(test)]
mod tests;

pub use board::Position;
pub use config::GameConfig;
pub use error::{IllegalAction, InvariantViolation, Verdict};
pub use game::{Command, Game, SetupError};
pub use ship::{Player, ShipKind};
pub use view::PlayerView;
