//! Starting Layouts
//!
//! The caller supplies the opening position as a list of entries; these are
//! the layouts the game ships with.

use serde::{Serialize, Deserialize};

use crate::core::coord::Coord;
use crate::game::rules::{PieceType, Team};

/// Board width of the shipped layouts.
pub const DEFAULT_WIDTH: u32 = 3;

/// Board height of the shipped layouts.
pub const DEFAULT_HEIGHT: u32 = 5;

/// One piece of an opening layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupEntry {
    /// Kind of piece
    pub piece_type: PieceType,
    /// Owning team
    pub team: Team,
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl SetupEntry {
    /// Create an entry.
    pub const fn new(piece_type: PieceType, team: Team, x: i32, y: i32) -> Self {
        Self { piece_type, team, x, y }
    }

    /// Cell of this entry.
    #[inline]
    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

/// Two Kings facing each other on the 3x5 board.
pub fn kings_only() -> Vec<SetupEntry> {
    vec![
        SetupEntry::new(PieceType::King, Team::Blue, 1, 0),
        SetupEntry::new(PieceType::King, Team::Red, 1, 4),
    ]
}

/// Full 3x5 opening: a back row of Rook, King, Bishop behind three Pawns,
/// mirrored for Red.
pub fn standard() -> Vec<SetupEntry> {
    let mut entries = Vec::with_capacity(12);
    for (team, back, front) in [(Team::Blue, 0, 1), (Team::Red, 4, 3)] {
        let back_row = match team {
            Team::Blue => [PieceType::Rook, PieceType::King, PieceType::Bishop],
            Team::Red => [PieceType::Bishop, PieceType::King, PieceType::Rook],
        };
        for (x, piece_type) in back_row.into_iter().enumerate() {
            entries.push(SetupEntry::new(piece_type, team, x as i32, back));
        }
        for x in 0..DEFAULT_WIDTH as i32 {
            entries.push(SetupEntry::new(PieceType::Pawn, team, x, front));
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_kings_only_layout() {
        let layout = kings_only();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout[0].coord(), Coord::new(1, 0));
        assert_eq!(layout[1].coord(), Coord::new(1, 4));
    }

    #[test]
    fn test_standard_layout_fits_board() {
        let layout = standard();
        assert_eq!(layout.len(), 12);

        let cells: BTreeSet<Coord> = layout.iter().map(SetupEntry::coord).collect();
        assert_eq!(cells.len(), layout.len(), "no two pieces share a cell");
        assert!(layout.iter().all(|e| e.coord().in_bounds(DEFAULT_WIDTH, DEFAULT_HEIGHT)));

        for team in Team::ALL {
            let kings = layout
                .iter()
                .filter(|e| e.team == team && e.piece_type == PieceType::King)
                .count();
            assert_eq!(kings, 1);
        }
    }
}
