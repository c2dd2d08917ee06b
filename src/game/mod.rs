//! Game Logic Module
//!
//! All game simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `rules`: Teams, piece types, move legality, cooldown table
//! - `piece`: Pieces and stock entries
//! - `board`: Grid, captures, stock, cooldown decay
//! - `interaction`: Per-team selection state machine
//! - `controller`: Match driver and end-of-match latch
//! - `config`: Match configuration (JSON)
//! - `setup`: Opening layouts
//! - `input`: Command stream and replay
//! - `events`: Notifications for presentation and replay

pub mod rules;
pub mod piece;
pub mod board;
pub mod interaction;
pub mod controller;
pub mod config;
pub mod setup;
pub mod input;
pub mod events;

// Re-export key types
pub use rules::{is_legal_move, PieceStats, PieceStatsTable, PieceType, StatsError, Team};
pub use piece::{Piece, PieceId, StockEntry, StockId};
pub use board::{Board, BoardError, MoveOutcome, PlacementOutcome};
pub use interaction::{Interaction, Refusal, Selection, TurnInteraction};
pub use controller::{MatchController, MatchError, TickResult};
pub use config::{ConfigError, MatchConfig};
pub use setup::SetupEntry;
pub use input::{replay, Command, CommandLog};
pub use events::{GameEvent, GameEventData};
