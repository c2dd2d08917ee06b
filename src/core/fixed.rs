//! Q16.16 Fixed-Point Time
//!
//! Cooldowns and tick deltas are carried as fixed-point seconds so that the
//! simulation is a pure function of the deltas it is fed.
//!
//! ## Seconds as Q16.16
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  i32 value v  =  v / 65536 seconds                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  1 s      = 65536                                           │
//! │  1 frame  = 1092   (60 Hz, rounded)                         │
//! │  longest  = 3600 s (config limit, far below i32 overflow)   │
//! │  step     = 1/65536 s, about 15 µs                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Floats only appear at the edges: config loading and display.

use std::fmt;

/// Duration in 1/65536 s units.
pub type Fixed = i32;

/// Fractional bits
pub const FIXED_SCALE: i32 = 16;

/// One second
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE;

/// Half a second
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1;

/// Largest duration a config may ask for (one hour).
pub const MAX_COOLDOWN: Fixed = 3600 * FIXED_ONE;

// =============================================================================
// DEFAULT TIMINGS
// =============================================================================

/// One 60 Hz frame: round(65536 / 60)
pub const TICK_DURATION: Fixed = 1092;

/// Default move cooldowns by piece type (Pawn, Rook, Bishop, King)
pub const DEFAULT_MOVE_COOLDOWNS: [Fixed; 4] = [
    131072,  // Pawn:   2.0 * 65536
    196608,  // Rook:   3.0 * 65536
    196608,  // Bishop: 3.0 * 65536
    262144,  // King:   4.0 * 65536
];

/// Default recast cooldowns by piece type (Pawn, Rook, Bishop, King)
pub const DEFAULT_RECAST_COOLDOWNS: [Fixed; 4] = [
    196608,  // Pawn:   3.0 * 65536
    327680,  // Rook:   5.0 * 65536
    327680,  // Bishop: 5.0 * 65536
    0,       // King: never stocked
];

// =============================================================================
// CONVERSIONS
// =============================================================================

/// Seconds to fixed-point, truncating. Setup and tests only.
///
/// ```
/// use recast_chess::core::fixed::{to_fixed, from_secs, FIXED_HALF};
/// assert_eq!(to_fixed(2.5), from_secs(2) + FIXED_HALF);
/// ```
#[inline]
pub fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Fixed-point to seconds, for display only.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Whole seconds as fixed-point.
#[inline]
pub const fn from_secs(secs: i32) -> Fixed {
    secs << FIXED_SCALE
}

/// Count a cooldown down by `dt`, never below zero.
///
/// A non-positive `dt` leaves the value untouched.
#[inline]
pub fn decay(remaining: Fixed, dt: Fixed) -> Fixed {
    if dt <= 0 {
        return remaining;
    }
    remaining.saturating_sub(dt).max(0)
}

/// Serde adapter storing a `Fixed` as floating-point seconds.
///
/// Used on config fields so files stay human-readable.
pub mod seconds {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{to_float, Fixed, FIXED_ONE};

    /// Serialize as seconds.
    pub fn serialize<S: Serializer>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(to_float(*value) as f64)
    }

    /// Deserialize from seconds, rounding to the nearest 1/65536.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fixed, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() {
            return Err(serde::de::Error::custom("duration must be finite"));
        }
        let raw = (secs * FIXED_ONE as f64).round();
        if raw > i32::MAX as f64 || raw < i32::MIN as f64 {
            return Err(serde::de::Error::custom("duration out of range"));
        }
        Ok(raw as Fixed)
    }
}

// =============================================================================
// DISPLAY WRAPPER
// =============================================================================

/// Formats a `Fixed` as seconds for log output.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Secs(pub Fixed);

impl fmt::Debug for Secs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secs({:.4})", to_float(self.0))
    }
}

impl fmt::Display for Secs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", to_float(self.0))
    }
}

// =============================================================================
// TESTS
// =============================================================================
