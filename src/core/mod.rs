//! Core deterministic primitives.
//!
//! Fixed-point time, grid coordinates and state hashing. Nothing here knows
//! about pieces or rules.

pub mod fixed;
pub mod coord;
pub mod hash;

// Re-export core types
pub use fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use coord::{Coord, Delta};
pub use hash::{compute_state_hash, short_hex, StateHash, StateHasher};
