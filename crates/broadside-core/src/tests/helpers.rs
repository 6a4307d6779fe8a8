//! Layout builders and command shorthands for tests.

use crate::board::Position;
use crate::capability::CapabilityTable;
use crate::config::GameConfig;
use crate::game::{Command, Game};
use crate::ship::{Owner, Player, ShipKind};
use crate::state::GameState;

// =============================================================================
// Layouts
// =============================================================================

/// Shorthand for [`Position::new`].
pub fn p(row: i32, col: i32) -> Position {
    Position::new(row, col)
}

/// A ship owned by `player` at `(row, col)`.
pub fn ship_at(row: i32, col: i32, kind: ShipKind, player: Player) -> (Position, ShipKind, Owner) {
    (p(row, col), kind, Owner::Player(player))
}

/// A neutral hulk at `(row, col)`.
pub fn neutral_at(row: i32, col: i32, kind: ShipKind) -> (Position, ShipKind, Owner) {
    (p(row, col), kind, Owner::Neutral)
}

/// Default config, standard table, and a play-phase state holding exactly
/// `ships`. Player 0 is to move.
pub fn layout(ships: &[(Position, ShipKind, Owner)]) -> (GameConfig, CapabilityTable, GameState) {
    let config = GameConfig::default();
    let state = GameState::from_layout(&config, ships.iter().copied()).unwrap();
    (config, CapabilityTable::standard(), state)
}

/// A play-phase game holding `ships` plus one fort per player in the far
/// corner column, so the game does not end on the first terminal check.
///
/// Forts sit at `(0, 13)` for player 0 and `(13, 13)` for player 1.
pub fn game(ships: &[(Position, ShipKind, Owner)]) -> Game {
    let mut all = vec![
        ship_at(0, 13, ShipKind::Fort, Player::First),
        ship_at(13, 13, ShipKind::Fort, Player::Second),
    ];
    all.extend_from_slice(ships);
    let (config, table, state) = layout(&all);
    Game::from_state(config, table, state).unwrap()
}

// =============================================================================
// Commands
// =============================================================================

/// Submits `command` and asserts it was applied.
pub fn submit_ok(game: &mut Game, player: Player, command: Command) {
    let verdict = game.submit(player, command.clone()).unwrap();
    assert!(
        verdict.is_applied(),
        "{player} {command:?} rejected: {:?}",
        verdict.reason()
    );
}

/// Kind of the ship at `(row, col)`, if any.
pub fn kind_at(game: &Game, row: i32, col: i32) -> Option<ShipKind> {
    game.state().board().get(p(row, col)).map(|s| s.kind)
}
