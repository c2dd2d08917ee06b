//! Game Events
//!
//! Notifications produced by the engine for the presentation layer and for
//! replay verification. The engine only appends to the queue; consumers poll
//! it with `take_events`.

use serde::{Serialize, Deserialize};

use crate::core::coord::Coord;
use crate::core::fixed::Fixed;
use crate::game::piece::{PieceId, StockId};
use crate::game::rules::{PieceType, Team};

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A piece moved to a new cell
    PieceMoved {
        piece: PieceId,
        piece_type: PieceType,
        team: Team,
        from: Coord,
        to: Coord,
    },

    /// A piece was removed by an opposing move
    PieceCaptured {
        piece: PieceId,
        piece_type: PieceType,
        team: Team,
        by: PieceId,
    },

    /// A captured piece entered its captor's stock
    StockAdded {
        entry: StockId,
        piece_type: PieceType,
        team: Team,
    },

    /// A stock entry's recast cooldown expired
    StockReady {
        entry: StockId,
        team: Team,
    },

    /// A stock entry was redeployed onto the board
    PiecePlacedFromStock {
        entry: StockId,
        piece: PieceId,
        piece_type: PieceType,
        team: Team,
        at: Coord,
    },

    /// A team selected one of its pieces
    PieceSelected {
        team: Team,
        piece: PieceId,
        destinations: Vec<Coord>,
    },

    /// A team selected one of its stock entries
    StockSelected {
        team: Team,
        entry: StockId,
    },

    /// A team's selection was dropped
    SelectionCleared {
        team: Team,
    },

    /// Match ended
    MatchEnded {
        winner: Team,
    },
}

/// A game event with ordering and timing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Position in the event stream (monotonic)
    pub seq: u32,

    /// Simulated time at which the event occurred
    pub elapsed: Fixed,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(seq: u32, elapsed: Fixed, data: GameEventData) -> Self {
        Self { seq, elapsed, data }
    }

    /// Team the event concerns, if any.
    pub fn team(&self) -> Option<Team> {
        match &self.data {
            GameEventData::PieceMoved { team, .. } => Some(*team),
            GameEventData::PieceCaptured { team, .. } => Some(*team),
            GameEventData::StockAdded { team, .. } => Some(*team),
            GameEventData::StockReady { team, .. } => Some(*team),
            GameEventData::PiecePlacedFromStock { team, .. } => Some(*team),
            GameEventData::PieceSelected { team, .. } => Some(*team),
            GameEventData::StockSelected { team, .. } => Some(*team),
            GameEventData::SelectionCleared { team } => Some(*team),
            GameEventData::MatchEnded { winner } => Some(*winner),
        }
    }

    /// Check if this event changed the board (as opposed to UI selection).
    pub fn is_board_change(&self) -> bool {
        !matches!(
            self.data,
            GameEventData::PieceSelected { .. }
                | GameEventData::StockSelected { .. }
                | GameEventData::SelectionCleared { .. }
        )
    }
}

/// Appends events with monotonically increasing sequence numbers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventQueue {
    next_seq: u32,
    pending: Vec<GameEvent>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push event data stamped with `elapsed`.
    pub fn push(&mut self, elapsed: Fixed, data: GameEventData) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.pending.push(GameEvent::new(seq, elapsed, data));
    }

    /// Take pending events (consumes them).
    pub fn take(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Events not yet taken.
    pub fn pending(&self) -> &[GameEvent] {
        &self.pending
    }

    /// Number of events not yet taken.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if there are no pending events.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
