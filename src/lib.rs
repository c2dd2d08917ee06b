//! # Recast Chess Engine
//!
//! Deterministic game state engine for Recast Chess, a real-time chess
//! variant played on a small grid where moves are gated by cooldowns and
//! captured pieces can be redeployed by their captor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RECAST CHESS ENGINE                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  ├── fixed.rs     - Q16.16 fixed-point time                  │
//! │  ├── coord.rs     - Grid cells and step deltas               │
//! │  └── hash.rs      - State hashing for verification           │
//! │                                                              │
//! │  game/            - Game logic (deterministic)               │
//! │  ├── rules.rs     - Move legality, cooldown table            │
//! │  ├── piece.rs     - Pieces and stock entries                 │
//! │  ├── board.rs     - Grid, captures, stock, cooldowns         │
//! │  ├── interaction.rs - Selection state machine                │
//! │  ├── controller.rs  - Match driver, end latch                │
//! │  ├── config.rs    - JSON configuration                       │
//! │  ├── setup.rs     - Opening layouts                          │
//! │  ├── input.rs     - Command stream and replay                │
//! │  └── events.rs    - Notifications for presentation           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! - No floating-point arithmetic in game logic
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies: time only advances through `tick(dt)`
//!
//! Given identical commands, the simulation produces **identical results**
//! regardless of whether it is driven by mouse, keyboard or a replayed log.
//!
//! ## Example
//!
//! ```
//! use recast_chess::{Coord, MatchConfig, MatchController, Team};
//! use recast_chess::game::setup;
//!
//! let config = MatchConfig { setup: setup::kings_only(), ..MatchConfig::default() };
//! let mut game = MatchController::new(&config).unwrap();
//!
//! game.attempt_move_or_place(Team::Blue, Coord::new(1, 0)).unwrap(); // select
//! game.attempt_move_or_place(Team::Blue, Coord::new(1, 1)).unwrap(); // move
//! assert_eq!(game.board().piece_at(Coord::new(1, 1)).unwrap().team, Team::Blue);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::core::coord::{Coord, Delta};
pub use crate::core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use crate::game::board::{Board, BoardError, MoveOutcome, PlacementOutcome};
pub use crate::game::config::MatchConfig;
pub use crate::game::controller::{MatchController, MatchError};
pub use crate::game::events::{GameEvent, GameEventData};
pub use crate::game::rules::{is_legal_move, PieceType, Team};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate the demo driver uses (Hz)
pub const TICK_RATE: u32 = 60;
