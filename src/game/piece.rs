//! Pieces and Stock Entries
//!
//! A `Piece` is a live unit on the board. A `StockEntry` is a captured piece
//! waiting, under its own recast cooldown, to be redeployed by the team that
//! captured it.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::coord::Coord;
use crate::core::fixed::Fixed;
use crate::core::hash::StateHasher;
use crate::game::rules::{PieceType, Team};

// =============================================================================
// IDS
// =============================================================================

/// Identity of a live piece (monotonic counter, never reused).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PieceId(pub u32);

impl fmt::Debug for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "piece#{}", self.0)
    }
}

/// Identity of a stock entry (monotonic counter, never reused).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StockId(pub u32);

impl fmt::Debug for StockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stock#{}", self.0)
    }
}

// =============================================================================
// PIECE
// =============================================================================

/// A piece on the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    /// Unique piece ID
    pub id: PieceId,

    /// Kind of piece
    pub piece_type: PieceType,

    /// Owning team
    pub team: Team,

    /// Current cell
    pub position: Coord,

    /// Cooldown applied after every move
    pub move_cooldown_max: Fixed,

    /// Time left before the piece may move (0 = ready)
    pub move_cooldown_remaining: Fixed,
}

impl Piece {
    /// Create a piece that is ready to move.
    pub fn new(id: PieceId, piece_type: PieceType, team: Team, position: Coord, move_cooldown_max: Fixed) -> Self {
        Self {
            id,
            piece_type,
            team,
            position,
            move_cooldown_max,
            move_cooldown_remaining: 0,
        }
    }

    /// Check if the move cooldown has expired.
    #[inline]
    pub fn can_move(&self) -> bool {
        self.move_cooldown_remaining <= 0
    }

    /// Restart the move cooldown from its maximum.
    #[inline]
    pub fn reset_cooldown(&mut self) {
        self.move_cooldown_remaining = self.move_cooldown_max;
    }

    /// Hash this piece's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id.0);
        hasher.update_u8(self.piece_type as u8);
        hasher.update_u8(self.team as u8);
        hasher.update_coord(self.position);
        hasher.update_fixed(self.move_cooldown_max);
        hasher.update_fixed(self.move_cooldown_remaining);
    }
}

// =============================================================================
// STOCK ENTRY
// =============================================================================

/// A captured piece held in its captor's stock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    /// Unique entry ID
    pub id: StockId,

    /// Kind of piece that will be placed
    pub piece_type: PieceType,

    /// Team that captured the piece and may redeploy it
    pub owning_team: Team,

    /// Recast cooldown the entry started with
    pub recast_cooldown_max: Fixed,

    /// Time left before the entry may be placed (0 = ready)
    pub recast_cooldown_remaining: Fixed,
}

impl StockEntry {
    /// Create an entry with a full recast cooldown.
    pub fn new(id: StockId, piece_type: PieceType, owning_team: Team, recast_cooldown: Fixed) -> Self {
        Self {
            id,
            piece_type,
            owning_team,
            recast_cooldown_max: recast_cooldown,
            recast_cooldown_remaining: recast_cooldown,
        }
    }

    /// Check if the recast cooldown has expired.
    #[inline]
    pub fn can_recast(&self) -> bool {
        self.recast_cooldown_remaining <= 0
    }

    /// Hash this entry's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id.0);
        hasher.update_u8(self.piece_type as u8);
        hasher.update_u8(self.owning_team as u8);
        hasher.update_fixed(self.recast_cooldown_max);
        hasher.update_fixed(self.recast_cooldown_remaining);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_secs, FIXED_ONE};

    #[test]
    fn test_new_piece_is_ready() {
        let piece = Piece::new(PieceId(0), PieceType::King, Team::Blue, Coord::new(1, 0), from_secs(4));
        assert!(piece.can_move());
        assert_eq!(piece.move_cooldown_remaining, 0);
    }

    #[test]
    fn test_reset_cooldown() {
        let mut piece = Piece::new(PieceId(0), PieceType::Rook, Team::Red, Coord::new(0, 0), from_secs(3));
        piece.reset_cooldown();
        assert!(!piece.can_move());
        assert_eq!(piece.move_cooldown_remaining, from_secs(3));
    }

    #[test]
    fn test_stock_entry_starts_cooling() {
        let entry = StockEntry::new(StockId(7), PieceType::Pawn, Team::Blue, FIXED_ONE);
        assert!(!entry.can_recast());
        assert_eq!(entry.recast_cooldown_max, entry.recast_cooldown_remaining);

        let instant = StockEntry::new(StockId(8), PieceType::Pawn, Team::Blue, 0);
        assert!(instant.can_recast());
    }

    #[test]
    fn test_piece_hash_tracks_cooldown() {
        let mut piece = Piece::new(PieceId(1), PieceType::Bishop, Team::Blue, Coord::new(2, 2), FIXED_ONE);
        let hash = |p: &Piece| {
            let mut h = StateHasher::for_board_state();
            p.hash_into(&mut h);
            h.finalize()
        };
        let before = hash(&piece);
        piece.reset_cooldown();
        assert_ne!(before, hash(&piece));
    }
}
