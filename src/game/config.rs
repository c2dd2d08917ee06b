//! Match Configuration
//!
//! Board size, per-type cooldowns and the opening layout. Loaded from JSON;
//! durations are written in seconds and converted to fixed-point once here.

use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::game::board::MAX_DIMENSION;
use crate::game::rules::{PieceStatsTable, StatsError};
use crate::game::setup::{self, SetupEntry, DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config is not valid JSON for this schema.
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Width or height is zero or too large.
    #[error("Invalid board dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// A cooldown is out of range.
    #[error("Invalid piece stats: {0}")]
    Stats(#[from] StatsError),
}

/// Configuration for one match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Number of columns
    pub width: u32,
    /// Number of rows
    pub height: u32,
    /// Cooldown constants per piece type
    pub pieces: PieceStatsTable,
    /// Opening layout
    pub setup: Vec<SetupEntry>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            pieces: PieceStatsTable::default(),
            setup: setup::standard(),
        }
    }
}

impl MatchConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check dimensions and cooldown ranges.
    ///
    /// The setup itself is checked when it is placed on the board.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dimension_ok = |d: u32| d > 0 && d <= MAX_DIMENSION;
        if !dimension_ok(self.width) || !dimension_ok(self.height) {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        self.pieces.validate()?;
        Ok(())
    }
}
