//! Match Controller
//!
//! The single entry point a presentation layer drives: it owns the board and
//! both teams' selection state, advances cooldowns, and latches the end of
//! the match so the final position stays frozen.

use tracing::{debug, info};

use crate::core::coord::Coord;
use crate::core::fixed::{Fixed, Secs};
use crate::core::hash::{StateHash, StateHasher};
use crate::game::board::{Board, BoardError};
use crate::game::config::{ConfigError, MatchConfig};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::interaction::{Interaction, Selection, TurnInteraction};
use crate::game::rules::Team;
use crate::game::setup::SetupEntry;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated since the previous drain
    pub events: Vec<GameEvent>,
    /// Whether the match is over
    pub match_ended: bool,
    /// Winner (once the match has ended)
    pub winner: Option<Team>,
}

/// Match-level errors.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// Any command after the match has ended.
    #[error("Match already ended")]
    MatchAlreadyEnded,

    /// Board construction or setup failed.
    #[error("Board error: {0}")]
    Board(#[from] BoardError),

    /// Configuration rejected.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Drives one match.
#[derive(Clone, Debug)]
pub struct MatchController {
    board: Board,
    blue: TurnInteraction,
    red: TurnInteraction,
    game_ended: bool,
    winner: Option<Team>,
}

impl MatchController {
    /// Create a match from a config, placing its opening layout.
    pub fn new(config: &MatchConfig) -> Result<Self, MatchError> {
        Self::with_setup(config, &config.setup)
    }

    /// Create a match from a config with a different opening layout.
    pub fn with_setup(config: &MatchConfig, setup: &[SetupEntry]) -> Result<Self, MatchError> {
        config.validate()?;
        let mut board = Board::new(config.width, config.height, config.pieces)?;
        board.place_initial_setup(setup)?;
        info!(
            "New {}x{} match with {} pieces",
            config.width,
            config.height,
            setup.len()
        );
        Ok(Self::from_board(board))
    }

    /// Wrap an already prepared board.
    pub fn from_board(board: Board) -> Self {
        let winner = board.winner();
        Self {
            board,
            blue: TurnInteraction::new(Team::Blue),
            red: TurnInteraction::new(Team::Red),
            game_ended: winner.is_some(),
            winner,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The board (read-only).
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// A team's selection state machine.
    pub fn interaction(&self, team: Team) -> &TurnInteraction {
        match team {
            Team::Blue => &self.blue,
            Team::Red => &self.red,
        }
    }

    /// A team's current selection.
    pub fn selection(&self, team: Team) -> Selection {
        self.interaction(team).selection()
    }

    /// Whether the match has ended, and who won.
    pub fn is_game_ended(&self) -> (bool, Option<Team>) {
        (self.game_ended, self.winner)
    }

    /// Winner, once the match has ended.
    #[inline]
    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// Total simulated time.
    #[inline]
    pub fn elapsed(&self) -> Fixed {
        self.board.elapsed()
    }

    /// Hash of the board plus both selections.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::new(b"RECAST_CHESS_MATCH_V1");
        hasher.update_bytes(&self.board.compute_hash());
        for team in Team::ALL {
            match self.selection(team) {
                Selection::Idle => hasher.update_u8(0),
                Selection::PieceSelected(piece) => {
                    hasher.update_u8(1);
                    hasher.update_u32(piece.0);
                }
                Selection::StockSelected(entry) => {
                    hasher.update_u8(2);
                    hasher.update_u32(entry.0);
                }
            }
        }
        hasher.update_bool(self.game_ended);
        hasher.finalize()
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Advance all cooldowns by `dt` and drain pending events.
    ///
    /// Once the match has ended the board is not touched.
    pub fn tick(&mut self, dt: Fixed) -> TickResult {
        if !self.game_ended {
            self.board.tick(dt);
        }
        TickResult {
            events: self.board.take_events(),
            match_ended: self.game_ended,
            winner: self.winner,
        }
    }

    /// Select `team`'s piece on `cell`.
    pub fn select(&mut self, team: Team, cell: Coord) -> Result<Interaction, MatchError> {
        self.interact(team, |interaction, board| interaction.select(board, cell))
    }

    /// Select the `index`-th entry of `team`'s stock.
    pub fn choose_stock(&mut self, team: Team, index: usize) -> Result<Interaction, MatchError> {
        self.interact(team, |interaction, board| interaction.choose_stock(board, index))
    }

    /// Handle a click on `cell` by `team`: select, move, or place from stock
    /// depending on what is selected.
    pub fn attempt_move_or_place(&mut self, team: Team, cell: Coord) -> Result<Interaction, MatchError> {
        self.interact(team, |interaction, board| interaction.activate(board, cell))
    }

    /// Drop `team`'s selection.
    pub fn cancel(&mut self, team: Team) -> Result<Interaction, MatchError> {
        self.interact(team, |interaction, _| interaction.cancel())
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.board.take_events()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn interact<F>(&mut self, team: Team, f: F) -> Result<Interaction, MatchError>
    where
        F: FnOnce(&mut TurnInteraction, &mut Board) -> Interaction,
    {
        if self.game_ended {
            debug!("{:?} command ignored: match already ended", team);
            return Err(MatchError::MatchAlreadyEnded);
        }

        let (mine, theirs) = match team {
            Team::Blue => (&mut self.blue, &mut self.red),
            Team::Red => (&mut self.red, &mut self.blue),
        };
        let board = &mut self.board;

        let before = mine.selection();
        let result = f(&mut *mine, &mut *board);
        let after = mine.selection();

        if before != after {
            let data = match after {
                Selection::Idle => GameEventData::SelectionCleared { team },
                Selection::PieceSelected(piece) => {
                    let destinations = match &result {
                        Interaction::PieceSelected { destinations, .. } => destinations.clone(),
                        _ => board.piece(piece).map(|p| board.legal_destinations(p)).unwrap_or_default(),
                    };
                    GameEventData::PieceSelected { team, piece, destinations }
                }
                Selection::StockSelected(entry) => GameEventData::StockSelected { team, entry },
            };
            board.push_event(data);
        }

        // A capture may have removed the piece the other team had selected
        if theirs.clear_if_stale(board) {
            board.push_event(GameEventData::SelectionCleared { team: theirs.team() });
        }

        self.latch_end();
        Ok(result)
    }

    /// Record the first end-of-match signal from the board.
    fn latch_end(&mut self) {
        if self.game_ended {
            return;
        }
        let Some(winner) = self.board.winner() else {
            return;
        };
        self.game_ended = true;
        self.winner = Some(winner);
        info!("{:?} wins after {}", winner, Secs(self.board.elapsed()));

        for interaction in [&mut self.blue, &mut self.red] {
            if !interaction.is_idle() {
                interaction.cancel();
                self.board.push_event(GameEventData::SelectionCleared { team: interaction.team() });
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_secs, FIXED_ONE, TICK_DURATION};
    use crate::game::board::MoveOutcome;
    use crate::game::rules::PieceType;
    use crate::game::setup;

    fn controller(entries: &[SetupEntry]) -> MatchController {
        MatchController::with_setup(&MatchConfig::default(), entries).unwrap()
    }

    #[test]
    fn test_new_from_default_config() {
        let game = MatchController::new(&MatchConfig::default()).unwrap();
        assert_eq!(game.board().pieces().count(), 12);
        assert_eq!(game.is_game_ended(), (false, None));
        assert_eq!(game.selection(Team::Blue), Selection::Idle);
    }

    #[test]
    fn test_new_rejects_bad_setup() {
        let bad = [SetupEntry::new(PieceType::King, Team::Blue, 7, 0)];
        let result = MatchController::with_setup(&MatchConfig::default(), &bad);
        assert!(matches!(result, Err(MatchError::Board(BoardError::OutOfBounds(_)))));
    }

    #[test]
    fn test_click_flow_emits_selection_events() {
        let mut game = controller(&setup::kings_only());

        game.attempt_move_or_place(Team::Blue, Coord::new(1, 0)).unwrap();
        let events = game.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0].data,
            GameEventData::PieceSelected { team: Team::Blue, destinations, .. } if destinations.contains(&Coord::new(1, 1))
        ));

        let result = game.attempt_move_or_place(Team::Blue, Coord::new(1, 1)).unwrap();
        assert_eq!(result, Interaction::MoveAttempted(Ok(MoveOutcome::Moved)));
        let events = game.take_events();
        assert!(matches!(events[0].data, GameEventData::PieceMoved { .. }));
        assert_eq!(events[1].data, GameEventData::SelectionCleared { team: Team::Blue });
    }

    #[test]
    fn test_teams_select_independently() {
        let mut game = controller(&setup::kings_only());
        game.select(Team::Blue, Coord::new(1, 0)).unwrap();
        game.select(Team::Red, Coord::new(1, 4)).unwrap();
        assert!(matches!(game.selection(Team::Blue), Selection::PieceSelected(_)));
        assert!(matches!(game.selection(Team::Red), Selection::PieceSelected(_)));

        // Blue cannot select Red's King
        game.cancel(Team::Blue).unwrap();
        game.select(Team::Blue, Coord::new(1, 4)).unwrap();
        assert_eq!(game.selection(Team::Blue), Selection::Idle);
    }

    #[test]
    fn test_tick_drives_cooldowns() {
        let mut game = controller(&setup::kings_only());
        game.attempt_move_or_place(Team::Blue, Coord::new(1, 0)).unwrap();
        game.attempt_move_or_place(Team::Blue, Coord::new(1, 1)).unwrap();

        let result = game.tick(from_secs(1));
        assert!(!result.match_ended);
        assert!(!result.events.is_empty(), "command events are drained by tick");

        game.select(Team::Blue, Coord::new(1, 1)).unwrap();
        assert_eq!(game.selection(Team::Blue), Selection::Idle);

        for _ in 0..(3 * 60 + 1) {
            game.tick(TICK_DURATION);
        }
        game.select(Team::Blue, Coord::new(1, 1)).unwrap();
        assert!(matches!(game.selection(Team::Blue), Selection::PieceSelected(_)));
    }

    #[test]
    fn test_capture_clears_opponent_selection() {
        let mut game = controller(&[
            SetupEntry::new(PieceType::Rook, Team::Blue, 0, 1),
            SetupEntry::new(PieceType::Rook, Team::Red, 0, 2),
            SetupEntry::new(PieceType::King, Team::Blue, 2, 0),
            SetupEntry::new(PieceType::King, Team::Red, 2, 4),
        ]);
        game.select(Team::Blue, Coord::new(0, 1)).unwrap();
        game.take_events();

        game.attempt_move_or_place(Team::Red, Coord::new(0, 2)).unwrap();
        game.attempt_move_or_place(Team::Red, Coord::new(0, 1)).unwrap();

        assert_eq!(game.selection(Team::Blue), Selection::Idle);
        let events = game.take_events();
        assert!(events.iter().any(|e| e.data == GameEventData::SelectionCleared { team: Team::Blue }));
        assert_eq!(game.board().stock_of(Team::Red).len(), 1);
    }

    #[test]
    fn test_end_latches_and_freezes() {
        let mut game = controller(&[
            SetupEntry::new(PieceType::King, Team::Blue, 1, 3),
            SetupEntry::new(PieceType::King, Team::Red, 0, 0),
            SetupEntry::new(PieceType::Pawn, Team::Red, 2, 2),
        ]);
        game.select(Team::Red, Coord::new(2, 2)).unwrap();
        game.attempt_move_or_place(Team::Blue, Coord::new(1, 3)).unwrap();
        let result = game.attempt_move_or_place(Team::Blue, Coord::new(1, 4)).unwrap();
        assert_eq!(
            result,
            Interaction::MoveAttempted(Ok(MoveOutcome::MovedAndWon { winner: Team::Blue, captured: None }))
        );
        assert_eq!(game.is_game_ended(), (true, Some(Team::Blue)));
        assert_eq!(game.selection(Team::Red), Selection::Idle);

        let events = game.take_events();
        assert!(events.iter().any(|e| e.data == GameEventData::MatchEnded { winner: Team::Blue }));
        assert!(events.iter().any(|e| e.data == GameEventData::SelectionCleared { team: Team::Red }));

        let frozen = game.compute_hash();
        assert!(matches!(game.select(Team::Red, Coord::new(2, 2)), Err(MatchError::MatchAlreadyEnded)));
        assert!(matches!(game.choose_stock(Team::Blue, 0), Err(MatchError::MatchAlreadyEnded)));
        assert!(matches!(
            game.attempt_move_or_place(Team::Red, Coord::new(2, 1)),
            Err(MatchError::MatchAlreadyEnded)
        ));
        assert!(matches!(game.cancel(Team::Blue), Err(MatchError::MatchAlreadyEnded)));

        let result = game.tick(FIXED_ONE);
        assert!(result.match_ended);
        assert_eq!(result.winner, Some(Team::Blue));
        assert!(result.events.is_empty());
        assert_eq!(game.compute_hash(), frozen);
    }

    #[test]
    fn test_tick_after_end_still_delivers_final_events() {
        let mut game = controller(&[
            SetupEntry::new(PieceType::King, Team::Blue, 1, 3),
            SetupEntry::new(PieceType::King, Team::Red, 0, 0),
        ]);
        game.attempt_move_or_place(Team::Blue, Coord::new(1, 3)).unwrap();
        game.attempt_move_or_place(Team::Blue, Coord::new(1, 4)).unwrap();

        let result = game.tick(FIXED_ONE);
        assert!(result.match_ended);
        assert!(result
            .events
            .iter()
            .any(|e| e.data == GameEventData::MatchEnded { winner: Team::Blue }));
        assert_eq!(game.elapsed(), 0);
    }

    #[test]
    fn test_from_board_respects_finished_board() {
        let mut board = Board::new(3, 5, Default::default()).unwrap();
        let ids = board
            .place_initial_setup(&[SetupEntry::new(PieceType::King, Team::Red, 0, 1)])
            .unwrap();
        board.attempt_move(ids[0], Coord::new(0, 0)).unwrap();

        let mut game = MatchController::from_board(board);
        assert_eq!(game.is_game_ended(), (true, Some(Team::Red)));
        assert!(matches!(game.cancel(Team::Red), Err(MatchError::MatchAlreadyEnded)));
    }
}
