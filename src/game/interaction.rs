//! Selection State Machine
//!
//! Turns a stream of cell activations into board commands for one team.
//! The transient "what is selected" state lives here, never on the board.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::coord::Coord;
use crate::game::board::{Board, BoardError, MoveOutcome, PlacementOutcome};
use crate::game::piece::{PieceId, StockId};
use crate::game::rules::Team;

/// What a team currently has selected. At most one thing at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    /// Nothing selected
    #[default]
    Idle,
    /// A ready piece waiting for its destination
    PieceSelected(PieceId),
    /// A ready stock entry waiting for its placement cell
    StockSelected(StockId),
}

/// Why a selection request was turned down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Refusal {
    /// Cell is off the board
    OutOfBounds,
    /// No piece on the cell
    EmptyCell,
    /// Piece belongs to the other team
    NotOwnPiece,
    /// Piece is still cooling down
    PieceNotReady,
    /// No stock entry at that index
    NoSuchStockEntry,
    /// Stock entry is still cooling down
    StockEntryNotReady,
}

/// What an interaction call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interaction {
    /// A piece is now selected; highlight `destinations`
    PieceSelected {
        piece: PieceId,
        destinations: Vec<Coord>,
    },
    /// A stock entry is now selected
    StockSelected { entry: StockId },
    /// Request refused; selection unchanged
    Refused(Refusal),
    /// The selected piece was sent to the board; selection is now idle
    MoveAttempted(Result<MoveOutcome, BoardError>),
    /// The selected stock entry was sent to the board; selection is now idle
    PlacementAttempted(Result<PlacementOutcome, BoardError>),
    /// Selection dropped on request
    Cancelled,
}

/// Per-team selection state machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnInteraction {
    team: Team,
    selection: Selection,
}

impl TurnInteraction {
    /// Create an idle interaction for `team`.
    pub fn new(team: Team) -> Self {
        Self {
            team,
            selection: Selection::Idle,
        }
    }

    /// Team this interaction acts for.
    #[inline]
    pub fn team(&self) -> Team {
        self.team
    }

    /// Current selection.
    #[inline]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Check if nothing is selected.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.selection == Selection::Idle
    }

    /// Select the team's ready piece on `cell`, replacing any selection.
    ///
    /// A refused request leaves the current selection in place.
    pub fn select(&mut self, board: &Board, cell: Coord) -> Interaction {
        let piece = match self.selectable_piece(board, cell) {
            Ok(piece) => piece,
            Err(refusal) => {
                debug!("{:?} cannot select {}: {:?}", self.team, cell, refusal);
                return Interaction::Refused(refusal);
            }
        };

        let destinations = board
            .piece(piece)
            .map(|p| board.legal_destinations(p))
            .unwrap_or_default();
        self.selection = Selection::PieceSelected(piece);
        debug!("{:?} selected {:?} at {}", self.team, piece, cell);
        Interaction::PieceSelected { piece, destinations }
    }

    /// Select the ready stock entry at `index`, replacing any selection.
    ///
    /// A refused request leaves the current selection in place.
    pub fn choose_stock(&mut self, board: &Board, index: usize) -> Interaction {
        let Some(entry) = board.stock_entry(self.team, index) else {
            debug!("{:?} has no stock entry at {}", self.team, index);
            return Interaction::Refused(Refusal::NoSuchStockEntry);
        };
        if !entry.can_recast() {
            debug!("{:?} stock entry {:?} not ready", self.team, entry.id);
            return Interaction::Refused(Refusal::StockEntryNotReady);
        }

        self.selection = Selection::StockSelected(entry.id);
        debug!("{:?} selected {:?} ({:?})", self.team, entry.id, entry.piece_type);
        Interaction::StockSelected { entry: entry.id }
    }

    /// Handle a click on `cell`.
    ///
    /// Idle: try to select the piece there. With a piece or stock entry
    /// selected: send exactly one move or placement to the board and return
    /// to idle whatever the result.
    pub fn activate(&mut self, board: &mut Board, cell: Coord) -> Interaction {
        match self.selection {
            Selection::Idle => self.select(board, cell),
            Selection::PieceSelected(piece) => {
                self.selection = Selection::Idle;
                let result = board.attempt_move(piece, cell);
                if !matches!(result, Ok(outcome) if outcome.is_committed()) {
                    debug!("{:?} move of {:?} to {} not applied: {:?}", self.team, piece, cell, result);
                }
                Interaction::MoveAttempted(result)
            }
            Selection::StockSelected(entry) => {
                self.selection = Selection::Idle;
                let result = board.place_from_stock(self.team, entry, cell);
                if let Err(err) = &result {
                    debug!("{:?} placement of {:?} at {} failed: {}", self.team, entry, cell, err);
                }
                Interaction::PlacementAttempted(result)
            }
        }
    }

    /// Drop any selection.
    pub fn cancel(&mut self) -> Interaction {
        self.selection = Selection::Idle;
        Interaction::Cancelled
    }

    /// Drop the selection if it refers to something no longer on the board
    /// (a selected piece was captured, for instance). Returns whether it did.
    pub fn clear_if_stale(&mut self, board: &Board) -> bool {
        let stale = match self.selection {
            Selection::Idle => false,
            Selection::PieceSelected(piece) => board.piece(piece).map_or(true, |p| p.team != self.team),
            Selection::StockSelected(entry) => board.find_stock(self.team, entry).is_none(),
        };
        if stale {
            self.selection = Selection::Idle;
        }
        stale
    }

    fn selectable_piece(&self, board: &Board, cell: Coord) -> Result<PieceId, Refusal> {
        if !board.in_bounds(cell) {
            return Err(Refusal::OutOfBounds);
        }
        let piece = board.piece_at(cell).ok_or(Refusal::EmptyCell)?;
        if piece.team != self.team {
            return Err(Refusal::NotOwnPiece);
        }
        if !board.can_select(piece) {
            return Err(Refusal::PieceNotReady);
        }
        Ok(piece.id)
    }
}

// =============================================================================
// TESTS
// =============================================================================
