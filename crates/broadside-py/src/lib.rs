//! # Broadside Python Bindings
//!
//! PyO3 bindings exposing the Broadside rules engine to Python hosts and
//! training loops.
//!
//! ## Usage
//!
//! ```python
//! import broadside
//!
//! game = broadside.Game()
//! game.shuffle_zone(0, seed=7)
//! game.ready(0)
//! game.ready(1)
//!
//! # Every command returns False when it is illegal.
//! ok = game.move(0, "move", (4, 3), (5, 3))
//!
//! # Filtered observation: identity plane then owner plane.
//! obs = game.observe(1)
//! ```

use broadside_core::action::ActionMode;
use broadside_core::capability::CapabilityTable;
use broadside_core::error::InvariantViolation;
use broadside_core::resolver::Block;
use broadside_core::ship::Owner;
use broadside_core::state::{GameOutcome, Phase};
use broadside_core::view::Identity;
use broadside_core::{Command, Game, GameConfig, Player, Position, ShipKind, Verdict};
use numpy::{PyArray1, ToPyArray};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

// =============================================================================
// Observation Codes
// =============================================================================

const EMPTY: i16 = -1;
const UNKNOWN: i16 = -2;
const SINKING: i16 = -3;

const OWNER_NONE: i16 = 0;
const OWNER_SELF: i16 = 1;
const OWNER_ENEMY: i16 = 2;
const OWNER_NEUTRAL: i16 = 3;

// =============================================================================
// Argument Conversion
// =============================================================================

fn player(index: usize) -> PyResult<Player> {
    Player::from_index(index)
        .ok_or_else(|| PyValueError::new_err(format!("player must be 0 or 1, got {index}")))
}

fn mode(name: &str) -> PyResult<ActionMode> {
    match name {
        "place" => Ok(ActionMode::Place),
        "move" => Ok(ActionMode::Move),
        "attack" => Ok(ActionMode::Attack),
        "shoot" => Ok(ActionMode::Shoot),
        "explode" => Ok(ActionMode::Explode),
        other => Err(PyValueError::new_err(format!("unknown action mode: {other}"))),
    }
}

fn kind(tag: &str) -> PyResult<ShipKind> {
    tag.parse::<ShipKind>()
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

fn pos((row, col): (i32, i32)) -> Position {
    Position::new(row, col)
}

fn block(declared: &str, cells: Vec<(i32, i32)>) -> PyResult<Block> {
    Ok(Block::new(
        kind(declared)?,
        cells.into_iter().map(pos).collect(),
    ))
}

/// Illegal commands become `False`; broken invariants raise.
fn accepted(result: Result<Verdict, InvariantViolation>) -> PyResult<bool> {
    result
        .map(|verdict| verdict.is_applied())
        .map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

fn json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

// =============================================================================
// Game Wrapper
// =============================================================================

/// One Broadside game.
#[pyclass(name = "Game")]
pub struct PyGame {
    inner: Game,
    last_error: Option<String>,
}

impl PyGame {
    fn submit(&mut self, player_index: usize, command: Command) -> PyResult<bool> {
        let result = self.inner.submit(player(player_index)?, command);
        self.remember(&result);
        accepted(result)
    }

    fn remember(&mut self, result: &Result<Verdict, InvariantViolation>) {
        self.last_error = match result {
            Ok(Verdict::Invalid(reason)) => Some(reason.to_string()),
            _ => None,
        };
    }
}

#[pymethods]
impl PyGame {
    /// Create a game in the placement phase.
    ///
    /// `config_json` overrides the other arguments when given.
    #[new]
    #[pyo3(signature = (field_size=14, placement_zone_size=5, config_json=None))]
    fn new(field_size: u16, placement_zone_size: u16, config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(text) => {
                GameConfig::from_json(text).map_err(|e| PyValueError::new_err(e.to_string()))?
            }
            None => GameConfig {
                field_size,
                placement_zone_size,
                ..GameConfig::default()
            },
        };
        let inner = Game::with_table(config, CapabilityTable::standard())
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self {
            inner,
            last_error: None,
        })
    }

    /// Board edge length.
    #[getter]
    fn field_size(&self) -> u16 {
        self.inner.config().field_size
    }

    /// Current phase: "placement", "play", or "finished".
    #[getter]
    fn phase(&self) -> &'static str {
        match self.inner.state().phase() {
            Phase::Placement => "placement",
            Phase::Play => "play",
            Phase::Finished(_) => "finished",
        }
    }

    /// Player whose turn it is.
    #[getter]
    fn current_player(&self) -> usize {
        self.inner.state().current_player().index()
    }

    /// Completed turns.
    #[getter]
    fn turn(&self) -> u32 {
        self.inner.state().turn()
    }

    /// Winner index, -1 for a draw, or None while running.
    #[getter]
    fn outcome(&self) -> Option<i8> {
        self.inner.outcome().map(|outcome| match outcome {
            GameOutcome::Winner(Player::First) => 0,
            GameOutcome::Winner(Player::Second) => 1,
            GameOutcome::Draw => -1,
        })
    }

    /// Reason the last command was rejected, if it was.
    #[getter]
    fn last_error(&self) -> Option<String> {
        self.last_error.clone()
    }

    /// Finish placement.
    fn ready(&mut self, player: usize) -> PyResult<bool> {
        self.submit(player, Command::Ready)
    }

    /// Swap two cells of the player's zone.
    fn place(&mut self, player: usize, from: (i32, i32), to: (i32, i32)) -> PyResult<bool> {
        self.submit(
            player,
            Command::Place {
                mode: ActionMode::Place,
                from: pos(from),
                to: pos(to),
            },
        )
    }

    /// Turn-opening action in any non-place mode.
    #[pyo3(name = "move")]
    fn move_(&mut self, player: usize, action: &str, from: (i32, i32), to: (i32, i32)) -> PyResult<bool> {
        let command = Command::Move {
            mode: mode(action)?,
            from: pos(from),
            to: pos(to),
        };
        self.submit(player, command)
    }

    /// Follow-up action by the ship that moved or won.
    fn attack(&mut self, player: usize, action: &str, from: (i32, i32), to: (i32, i32)) -> PyResult<bool> {
        let command = Command::Attack {
            mode: mode(action)?,
            from: pos(from),
            to: pos(to),
        };
        self.submit(player, command)
    }

    /// End the turn.
    fn skip(&mut self, player: usize) -> PyResult<bool> {
        self.submit(player, Command::Skip)
    }

    /// Declare the attacking block.
    fn attack_block(&mut self, player: usize, declared: &str, cells: Vec<(i32, i32)>) -> PyResult<bool> {
        let block = block(declared, cells)?;
        self.submit(player, Command::AttackBlock(block))
    }

    /// Declare the defending block.
    fn response_block(&mut self, player: usize, declared: &str, cells: Vec<(i32, i32)>) -> PyResult<bool> {
        let block = block(declared, cells)?;
        self.submit(player, Command::ResponseBlock(block))
    }

    /// Set the player's private label on a ship; empty text clears it.
    fn label(&mut self, player: usize, at: (i32, i32), text: String) -> PyResult<bool> {
        self.submit(player, Command::Label { at: pos(at), text })
    }

    /// Seeded shuffle of the player's zone.
    fn shuffle_zone(&mut self, player_index: usize, seed: u64) -> PyResult<bool> {
        let result = self.inner.shuffle_zone(player(player_index)?, seed);
        self.remember(&result);
        accepted(result)
    }

    /// Cells reachable from `from` in the given mode.
    fn legal_targets(&self, player_index: usize, action: &str, from: (i32, i32)) -> PyResult<Vec<(i32, i32)>> {
        let targets = self
            .inner
            .legal_targets(player(player_index)?, mode(action)?, pos(from));
        Ok(targets.into_iter().map(|p| (p.row, p.col)).collect())
    }

    /// Blocks the player may declare now, as JSON.
    fn block_candidates(&self, player_index: usize) -> PyResult<String> {
        json(&self.inner.block_candidates(player(player_index)?))
    }

    /// Filtered observation as a flat `int16` array of length `2 × n²`.
    ///
    /// The first plane holds kind indices (-1 empty, -2 unknown, -3
    /// sinking). The second holds owners (0 none, 1 self, 2 enemy, 3
    /// neutral).
    fn observe<'py>(&self, py: Python<'py>, player_index: usize) -> PyResult<Bound<'py, PyArray1<i16>>> {
        let viewer = player(player_index)?;
        let view = self.inner.view(viewer);

        let mut identity = Vec::with_capacity(view.cells.len());
        let mut owner = Vec::with_capacity(view.cells.len());
        for cell in &view.cells {
            match cell {
                None => {
                    identity.push(EMPTY);
                    owner.push(OWNER_NONE);
                }
                Some(ship) => {
                    identity.push(match ship.identity {
                        Identity::Known(kind) => i16::try_from(kind.index()).unwrap_or(UNKNOWN),
                        Identity::Unknown => UNKNOWN,
                        Identity::Sinking => SINKING,
                    });
                    owner.push(match ship.owner {
                        Owner::Player(p) if p == viewer => OWNER_SELF,
                        Owner::Player(_) => OWNER_ENEMY,
                        Owner::Neutral => OWNER_NEUTRAL,
                    });
                }
            }
        }
        identity.extend(owner);
        Ok(identity.to_pyarray(py))
    }

    /// Filtered view as JSON.
    fn view_json(&self, player_index: usize) -> PyResult<String> {
        json(&self.inner.view(player(player_index)?))
    }

    /// Log entries from sequence number `since` onward, as JSON.
    #[pyo3(signature = (since=0))]
    fn log_json(&self, since: u64) -> PyResult<String> {
        json(&self.inner.state().log().since(since))
    }
}

// =============================================================================
// Module
// =============================================================================

/// Install a `tracing` subscriber printing engine logs to stderr.
///
/// Returns False if a subscriber was already installed.
#[pyfunction]
#[pyo3(signature = (level="info"))]
fn init_logging(level: &str) -> PyResult<bool> {
    let level: tracing::Level = level
        .parse()
        .map_err(|_| PyValueError::new_err(format!("unknown log level: {level}")))?;
    Ok(tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok())
}

/// Names of every ship kind, indexed like the observation codes.
#[pyfunction]
fn ship_tags() -> Vec<&'static str> {
    ShipKind::ALL.iter().map(|k| k.tag()).collect()
}

#[pymodule]
fn _broadside(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyGame>()?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    m.add_function(wrap_pyfunction!(ship_tags, m)?)?;
    Ok(())
}
