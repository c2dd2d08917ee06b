//! Input Commands and Replay
//!
//! Every way of driving a match (mouse, keyboard, a recorded log) is reduced
//! to the same small command set, so identical command streams always produce
//! identical matches.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::coord::Coord;
use crate::core::fixed::{self, Fixed};
use crate::core::hash::{StateHash, StateHasher};
use crate::game::config::MatchConfig;
use crate::game::controller::{MatchController, MatchError};
use crate::game::events::GameEvent;
use crate::game::interaction::Interaction;
use crate::game::rules::Team;

/// Number of stock slots reachable from the keyboard ('1'..='9').
pub const STOCK_HOTKEYS: usize = 9;

// =============================================================================
// COMMAND
// =============================================================================

/// One input to a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    /// Select a piece without the click semantics
    Select { team: Team, cell: Coord },
    /// Click on a cell
    Activate { team: Team, cell: Coord },
    /// Pick a stock slot by position
    ChooseStock { team: Team, index: usize },
    /// Drop the current selection
    Cancel { team: Team },
    /// Advance time
    Tick {
        #[serde(with = "fixed::seconds")]
        dt: Fixed,
    },
}

impl Command {
    /// Map a number key to a stock selection: '1' is the oldest entry.
    pub fn from_stock_key(team: Team, key: char) -> Option<Command> {
        let digit = key.to_digit(10)? as usize;
        if digit == 0 || digit > STOCK_HOTKEYS {
            return None;
        }
        Some(Command::ChooseStock { team, index: digit - 1 })
    }

    /// Team issuing the command (`None` for ticks).
    pub fn team(&self) -> Option<Team> {
        match self {
            Command::Select { team, .. }
            | Command::Activate { team, .. }
            | Command::ChooseStock { team, .. }
            | Command::Cancel { team } => Some(*team),
            Command::Tick { .. } => None,
        }
    }

    /// Apply to a match. Ticks return `Ok(None)`.
    pub fn apply(&self, controller: &mut MatchController) -> Result<Option<Interaction>, MatchError> {
        match *self {
            Command::Select { team, cell } => controller.select(team, cell).map(Some),
            Command::Activate { team, cell } => controller.attempt_move_or_place(team, cell).map(Some),
            Command::ChooseStock { team, index } => controller.choose_stock(team, index).map(Some),
            Command::Cancel { team } => controller.cancel(team).map(Some),
            Command::Tick { dt } => {
                controller.tick(dt);
                Ok(None)
            }
        }
    }

    /// Hash this command for log verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        match *self {
            Command::Select { team, cell } => {
                hasher.update_u8(0);
                hasher.update_u8(team as u8);
                hasher.update_coord(cell);
            }
            Command::Activate { team, cell } => {
                hasher.update_u8(1);
                hasher.update_u8(team as u8);
                hasher.update_coord(cell);
            }
            Command::ChooseStock { team, index } => {
                hasher.update_u8(2);
                hasher.update_u8(team as u8);
                hasher.update_u32(index as u32);
            }
            Command::Cancel { team } => {
                hasher.update_u8(3);
                hasher.update_u8(team as u8);
            }
            Command::Tick { dt } => {
                hasher.update_u8(4);
                hasher.update_fixed(dt);
            }
        }
    }
}

// =============================================================================
// COMMAND LOG
// =============================================================================

/// Ordered recording of the commands fed to one match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLog {
    commands: Vec<Command>,
}

impl CommandLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command.
    pub fn record(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// All recorded commands.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Sum of all tick deltas in the log.
    pub fn total_time(&self) -> Fixed {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Tick { dt } if *dt > 0 => Some(*dt),
                _ => None,
            })
            .fold(0, Fixed::saturating_add)
    }

    /// Hash of the log contents.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_command_log();
        hasher.update_u32(self.commands.len() as u32);
        for command in &self.commands {
            command.hash_into(&mut hasher);
        }
        hasher.finalize()
    }

    /// Serialize as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<Vec<Command>> for CommandLog {
    fn from(commands: Vec<Command>) -> Self {
        Self { commands }
    }
}

// =============================================================================
// REPLAY
// =============================================================================

/// Play `commands` against a fresh match built from `config`.
///
/// Commands arriving after the match ended are skipped, as a live match
/// would reject them. Returns the final match and every event produced.
pub fn replay(config: &MatchConfig, commands: &[Command]) -> Result<(MatchController, Vec<GameEvent>), MatchError> {
    let mut controller = MatchController::new(config)?;
    let mut events = Vec::new();

    for command in commands {
        match command.apply(&mut controller) {
            Ok(_) => {}
            Err(MatchError::MatchAlreadyEnded) => {
                debug!("Replay skipped {:?}: match already ended", command);
            }
            Err(err) => return Err(err),
        }
        events.extend(controller.take_events());
    }

    Ok((controller, events))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_secs, FIXED_HALF};
    use crate::game::events::GameEventData;
    use crate::game::setup;

    fn kings_config() -> MatchConfig {
        MatchConfig {
            setup: setup::kings_only(),
            ..MatchConfig::default()
        }
    }

    #[test]
    fn test_stock_hotkeys() {
        assert_eq!(
            Command::from_stock_key(Team::Red, '1'),
            Some(Command::ChooseStock { team: Team::Red, index: 0 })
        );
        assert_eq!(
            Command::from_stock_key(Team::Blue, '9'),
            Some(Command::ChooseStock { team: Team::Blue, index: 8 })
        );
        assert_eq!(Command::from_stock_key(Team::Blue, '0'), None);
        assert_eq!(Command::from_stock_key(Team::Blue, 'q'), None);
    }

    #[test]
    fn test_command_team() {
        assert_eq!(Command::Cancel { team: Team::Red }.team(), Some(Team::Red));
        assert_eq!(Command::Tick { dt: FIXED_HALF }.team(), None);
    }

    #[test]
    fn test_command_json_shape() {
        let command: Command = serde_json::from_str(
            r#"{ "kind": "activate", "team": "blue", "cell": { "x": 1, "y": 0 } }"#,
        )
        .unwrap();
        assert_eq!(command, Command::Activate { team: Team::Blue, cell: Coord::new(1, 0) });

        let tick: Command = serde_json::from_str(r#"{ "kind": "tick", "dt": 0.5 }"#).unwrap();
        assert_eq!(tick, Command::Tick { dt: FIXED_HALF });
    }

    #[test]
    fn test_log_hash_depends_on_order() {
        let a = Command::Activate { team: Team::Blue, cell: Coord::new(1, 0) };
        let b = Command::Tick { dt: FIXED_HALF };
        let log1 = CommandLog::from(vec![a, b]);
        let log2 = CommandLog::from(vec![b, a]);
        assert_ne!(log1.compute_hash(), log2.compute_hash());
        assert_eq!(log1.compute_hash(), CommandLog::from(vec![a, b]).compute_hash());
        assert_eq!(log1.total_time(), FIXED_HALF);
    }

    #[test]
    fn test_log_json() {
        let mut log = CommandLog::new();
        log.record(Command::Select { team: Team::Red, cell: Coord::new(1, 4) });
        log.record(Command::Tick { dt: from_secs(1) });
        let parsed = CommandLog::from_json(&log.to_json().unwrap()).unwrap();
        assert_eq!(parsed.compute_hash(), log.compute_hash());
    }

    #[test]
    fn test_replay_is_deterministic() {
        let commands = vec![
            Command::Activate { team: Team::Blue, cell: Coord::new(1, 0) },
            Command::Activate { team: Team::Blue, cell: Coord::new(1, 1) },
            Command::Activate { team: Team::Red, cell: Coord::new(1, 4) },
            Command::Activate { team: Team::Red, cell: Coord::new(0, 3) },
            Command::Tick { dt: from_secs(4) },
            Command::Activate { team: Team::Blue, cell: Coord::new(1, 1) },
            Command::Activate { team: Team::Blue, cell: Coord::new(1, 2) },
        ];
        let (first, events1) = replay(&kings_config(), &commands).unwrap();
        let (second, events2) = replay(&kings_config(), &commands).unwrap();

        assert_eq!(first.compute_hash(), second.compute_hash());
        assert_eq!(events1, events2);
        assert_eq!(first.board().piece_at(Coord::new(1, 2)).unwrap().team, Team::Blue);
    }

    #[test]
    fn test_replay_skips_commands_after_end() {
        let commands = vec![
            Command::Activate { team: Team::Blue, cell: Coord::new(1, 0) },
            Command::Activate { team: Team::Blue, cell: Coord::new(1, 1) },
            Command::Tick { dt: from_secs(4) },
            Command::Activate { team: Team::Blue, cell: Coord::new(1, 1) },
            Command::Activate { team: Team::Blue, cell: Coord::new(1, 2) },
            Command::Tick { dt: from_secs(4) },
            Command::Activate { team: Team::Blue, cell: Coord::new(1, 2) },
            Command::Activate { team: Team::Blue, cell: Coord::new(1, 3) },
            Command::Tick { dt: from_secs(4) },
            Command::Activate { team: Team::Blue, cell: Coord::new(1, 3) },
            // Captures the Red King on (1, 4)
            Command::Activate { team: Team::Blue, cell: Coord::new(1, 4) },
            Command::Activate { team: Team::Red, cell: Coord::new(0, 0) },
            Command::Tick { dt: from_secs(4) },
        ];
        let (game, events) = replay(&kings_config(), &commands).unwrap();
        assert_eq!(game.is_game_ended(), (true, Some(Team::Blue)));
        assert_eq!(game.elapsed(), from_secs(12));

        let ended: Vec<_> = events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::MatchEnded { .. }))
            .collect();
        assert_eq!(ended.len(), 1);
        assert!(game.board().stock_of(Team::Blue).is_empty());
    }
}
