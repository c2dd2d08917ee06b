//! Move Legality and Piece Constants
//!
//! Pure, stateless rules. Every piece moves exactly one step; there is no
//! sliding and therefore no blocking.

use serde::{Serialize, Deserialize};

use crate::core::coord::Delta;
use crate::core::fixed::{self, Fixed, DEFAULT_MOVE_COOLDOWNS, DEFAULT_RECAST_COOLDOWNS, MAX_COOLDOWN};

// =============================================================================
// TEAM
// =============================================================================

/// Side of the board. Blue starts at the bottom, Red at the top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Team {
    /// Bottom side, advances toward +y
    Blue = 0,
    /// Top side, advances toward -y
    Red = 1,
}

impl Team {
    /// Both teams in a fixed order.
    pub const ALL: [Team; 2] = [Team::Blue, Team::Red];

    /// The other team.
    #[inline]
    pub fn opponent(self) -> Team {
        match self {
            Team::Blue => Team::Red,
            Team::Red => Team::Blue,
        }
    }

    /// Forward direction along y.
    #[inline]
    pub fn forward(self) -> i32 {
        match self {
            Team::Blue => 1,
            Team::Red => -1,
        }
    }

    /// Row of the opponent's back rank on a board of `height` rows.
    #[inline]
    pub fn far_rank(self, height: u32) -> i32 {
        match self {
            Team::Blue => height as i32 - 1,
            Team::Red => 0,
        }
    }
}

// =============================================================================
// PIECE TYPE
// =============================================================================

/// Kind of piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PieceType {
    /// One step straight forward
    Pawn = 0,
    /// One orthogonal step
    Rook = 1,
    /// One diagonal step
    Bishop = 2,
    /// One step in any direction
    King = 3,
}

impl PieceType {
    /// All piece types, in table order.
    pub const ALL: [PieceType; 4] = [
        PieceType::Pawn,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::King,
    ];

    /// Check whether this type may step by `delta` for `team`.
    ///
    /// The King predicate admits the zero delta; the board rejects it as a
    /// move onto the piece's own cell.
    #[inline]
    pub fn allows(self, team: Team, delta: Delta) -> bool {
        match self {
            PieceType::Pawn => delta.dx == 0 && delta.dy == team.forward(),
            PieceType::Rook => delta.manhattan() == 1,
            PieceType::Bishop => delta.dx.abs() == 1 && delta.dy.abs() == 1,
            PieceType::King => delta.chebyshev() <= 1,
        }
    }

}

/// Check whether `piece_type` owned by `team` may move by `(dx, dy)`.
#[inline]
pub fn is_legal_move(piece_type: PieceType, team: Team, dx: i32, dy: i32) -> bool {
    piece_type.allows(team, Delta::new(dx, dy))
}

// =============================================================================
// PER-TYPE CONSTANTS
// =============================================================================

/// Cooldown constants for one piece type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceStats {
    /// Time after a move (or a placement) before the piece may move again
    #[serde(with = "fixed::seconds")]
    pub move_cooldown: Fixed,
    /// Time a captured piece waits in stock before it can be redeployed
    #[serde(with = "fixed::seconds")]
    pub recast_cooldown: Fixed,
}

/// A cooldown table entry outside the supported range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StatsError {
    /// A move or recast cooldown is below zero.
    #[error("Negative cooldown for {0:?}")]
    NegativeCooldown(PieceType),

    /// A move cooldown of zero would let a piece move every tick.
    #[error("Zero move cooldown for {0:?}")]
    ZeroMoveCooldown(PieceType),

    /// A cooldown exceeds the supported range.
    #[error("Cooldown too large for {0:?}")]
    CooldownTooLarge(PieceType),
}

/// Lookup table of [`PieceStats`] keyed by [`PieceType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceStatsTable {
    /// Pawn constants
    pub pawn: PieceStats,
    /// Rook constants
    pub rook: PieceStats,
    /// Bishop constants
    pub bishop: PieceStats,
    /// King constants
    pub king: PieceStats,
}

impl PieceStatsTable {
    /// Constants for `piece_type`.
    #[inline]
    pub fn get(&self, piece_type: PieceType) -> PieceStats {
        match piece_type {
            PieceType::Pawn => self.pawn,
            PieceType::Rook => self.rook,
            PieceType::Bishop => self.bishop,
            PieceType::King => self.king,
        }
    }

    /// Move cooldown for `piece_type`.
    #[inline]
    pub fn move_cooldown(&self, piece_type: PieceType) -> Fixed {
        self.get(piece_type).move_cooldown
    }

    /// Recast cooldown for `piece_type`.
    #[inline]
    pub fn recast_cooldown(&self, piece_type: PieceType) -> Fixed {
        self.get(piece_type).recast_cooldown
    }

    /// Iterate `(type, stats)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (PieceType, PieceStats)> + '_ {
        PieceType::ALL.into_iter().map(move |t| (t, self.get(t)))
    }

    /// Check every cooldown is in range.
    ///
    /// Move cooldowns must be positive so a moved or placed piece always
    /// waits. Recast cooldowns may be zero (the entry is ready at once).
    pub fn validate(&self) -> Result<(), StatsError> {
        for (piece_type, stats) in self.iter() {
            if stats.move_cooldown < 0 || stats.recast_cooldown < 0 {
                return Err(StatsError::NegativeCooldown(piece_type));
            }
            if stats.move_cooldown == 0 {
                return Err(StatsError::ZeroMoveCooldown(piece_type));
            }
            if stats.move_cooldown > MAX_COOLDOWN || stats.recast_cooldown > MAX_COOLDOWN {
                return Err(StatsError::CooldownTooLarge(piece_type));
            }
        }
        Ok(())
    }
}

impl Default for PieceStatsTable {
    fn default() -> Self {
        let stats = |t: PieceType| PieceStats {
            move_cooldown: DEFAULT_MOVE_COOLDOWNS[t as usize],
            recast_cooldown: DEFAULT_RECAST_COOLDOWNS[t as usize],
        };
        Self {
            pawn: stats(PieceType::Pawn),
            rook: stats(PieceType::Rook),
            bishop: stats(PieceType::Bishop),
            king: stats(PieceType::King),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_secs, FIXED_ONE};

    /// Reference predicate written independently of `PieceType::allows`.
    fn expected(piece_type: PieceType, team: Team, dx: i32, dy: i32) -> bool {
        let (ax, ay) = (dx.abs(), dy.abs());
        match piece_type {
            PieceType::Pawn => match team {
                Team::Blue => (dx, dy) == (0, 1),
                Team::Red => (dx, dy) == (0, -1),
            },
            PieceType::Rook => (ax, ay) == (1, 0) || (ax, ay) == (0, 1),
            PieceType::Bishop => ax == 1 && ay == 1,
            PieceType::King => ax <= 1 && ay <= 1,
        }
    }

    #[test]
    fn test_rule_table_exhaustive() {
        for piece_type in PieceType::ALL {
            for team in Team::ALL {
                for dx in -2..=2 {
                    for dy in -2..=2 {
                        assert_eq!(
                            is_legal_move(piece_type, team, dx, dy),
                            expected(piece_type, team, dx, dy),
                            "{:?} {:?} ({}, {})", piece_type, team, dx, dy
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_legal_move_counts() {
        let count = |t: PieceType, team: Team| {
            (-2..=2)
                .flat_map(|dx| (-2..=2).map(move |dy| (dx, dy)))
                .filter(|&(dx, dy)| is_legal_move(t, team, dx, dy))
                .count()
        };
        assert_eq!(count(PieceType::Pawn, Team::Blue), 1);
        assert_eq!(count(PieceType::Rook, Team::Red), 4);
        assert_eq!(count(PieceType::Bishop, Team::Blue), 4);
        // Eight neighbours plus the zero delta
        assert_eq!(count(PieceType::King, Team::Red), 9);
    }

    #[test]
    fn test_pawn_direction_depends_on_team() {
        assert!(is_legal_move(PieceType::Pawn, Team::Blue, 0, 1));
        assert!(!is_legal_move(PieceType::Pawn, Team::Blue, 0, -1));
        assert!(is_legal_move(PieceType::Pawn, Team::Red, 0, -1));
        assert!(!is_legal_move(PieceType::Pawn, Team::Red, 0, 1));
        assert!(!is_legal_move(PieceType::Pawn, Team::Blue, 0, 2));
        assert!(!is_legal_move(PieceType::Pawn, Team::Blue, 1, 1));
    }

    #[test]
    fn test_team_helpers() {
        assert_eq!(Team::Blue.opponent(), Team::Red);
        assert_eq!(Team::Red.opponent(), Team::Blue);
        assert_eq!(Team::Blue.far_rank(5), 4);
        assert_eq!(Team::Red.far_rank(5), 0);
    }

    #[test]
    fn test_default_stats_table() {
        let table = PieceStatsTable::default();
        assert_eq!(table.move_cooldown(PieceType::King), from_secs(4));
        assert_eq!(table.recast_cooldown(PieceType::King), 0);
        assert_eq!(table.recast_cooldown(PieceType::Rook), from_secs(5));
        assert_eq!(table.iter().count(), 4);
    }

    #[test]
    fn test_stats_table_validate() {
        assert_eq!(PieceStatsTable::default().validate(), Ok(()));

        let mut table = PieceStatsTable::default();
        table.king.move_cooldown = -FIXED_ONE;
        assert_eq!(table.validate(), Err(StatsError::NegativeCooldown(PieceType::King)));

        let mut table = PieceStatsTable::default();
        table.rook.recast_cooldown = -1;
        assert_eq!(table.validate(), Err(StatsError::NegativeCooldown(PieceType::Rook)));

        let mut table = PieceStatsTable::default();
        table.pawn.move_cooldown = 0;
        assert_eq!(table.validate(), Err(StatsError::ZeroMoveCooldown(PieceType::Pawn)));

        let mut table = PieceStatsTable::default();
        table.bishop.recast_cooldown = MAX_COOLDOWN + 1;
        assert_eq!(table.validate(), Err(StatsError::CooldownTooLarge(PieceType::Bishop)));

        let mut table = PieceStatsTable::default();
        table.pawn.recast_cooldown = 0;
        assert_eq!(table.validate(), Ok(()));
    }

    #[test]
    fn test_stats_table_json() {
        let json = r#"{
            "pawn":   { "move_cooldown": 1.0, "recast_cooldown": 2.0 },
            "rook":   { "move_cooldown": 1.5, "recast_cooldown": 2.5 },
            "bishop": { "move_cooldown": 1.5, "recast_cooldown": 2.5 },
            "king":   { "move_cooldown": 4.0, "recast_cooldown": 0.0 }
        }"#;
        let table: PieceStatsTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.move_cooldown(PieceType::Pawn), from_secs(1));
        assert_eq!(table.recast_cooldown(PieceType::Rook), crate::core::fixed::to_fixed(2.5));
    }
}
