//! Board Hashing
//!
//! SHA-256 digests over board contents and command logs. Two boards with the
//! same hash are bit-identical for every field that affects play, which is
//! how rejected commands and replays are checked.

use sha2::{Digest, Sha256};

use super::coord::Coord;
use super::fixed::Fixed;

/// 32-byte SHA-256 digest.
pub type StateHash = [u8; 32];

/// Domain tag for board digests.
const BOARD_DOMAIN: &[u8] = b"RECAST_CHESS_STATE_V1";

/// Domain tag for command log digests.
const COMMAND_DOMAIN: &[u8] = b"RECAST_CHESS_COMMANDS_V1";

/// Incremental hasher with fixed-width, little-endian encodings.
///
/// Callers must feed fields in a fixed order.
pub struct StateHasher {
    digest: Sha256,
}

impl StateHasher {
    /// Start a digest tagged with `domain`.
    pub fn new(domain: &[u8]) -> Self {
        let mut digest = Sha256::new();
        digest.update(domain);
        Self { digest }
    }

    /// Hasher for board contents.
    pub fn for_board_state() -> Self {
        Self::new(BOARD_DOMAIN)
    }

    /// Hasher for a command log.
    pub fn for_command_log() -> Self {
        Self::new(COMMAND_DOMAIN)
    }

    /// Raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.digest.update(bytes);
    }

    /// One byte.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.digest.update([value]);
    }

    /// Little-endian u32.
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.digest.update(value.to_le_bytes());
    }

    /// Little-endian i32.
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.digest.update(value.to_le_bytes());
    }

    /// Durations hash as their raw Q16.16 value.
    #[inline]
    pub fn update_fixed(&mut self, value: Fixed) {
        self.update_i32(value);
    }

    /// Cell as x then y.
    #[inline]
    pub fn update_coord(&mut self, cell: Coord) {
        self.update_i32(cell.x);
        self.update_i32(cell.y);
    }

    /// Bool as one byte.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(u8::from(value));
    }

    /// Finish the digest.
    pub fn finalize(self) -> StateHash {
        self.digest.finalize().into()
    }
}

/// Hash a `width` x `height` board whose contents are added by `add_cells`.
///
/// Dimensions go in first so the same cell data on a differently shaped
/// board never collides.
pub fn compute_state_hash<F>(width: u32, height: u32, add_cells: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_board_state();
    hasher.update_u32(width);
    hasher.update_u32(height);
    add_cells(&mut hasher);
    hasher.finalize()
}

/// First eight bytes of a digest as hex, for log lines.
pub fn short_hex(hash: &StateHash) -> String {
    hex::encode(&hash[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::from_secs;

    fn king_at(cell: Coord, cooldown: Fixed) -> StateHash {
        compute_state_hash(3, 5, |h| {
            h.update_coord(cell);
            h.update_fixed(cooldown);
        })
    }

    #[test]
    fn test_same_board_same_hash() {
        assert_eq!(king_at(Coord::new(1, 0), 0), king_at(Coord::new(1, 0), 0));
    }

    #[test]
    fn test_cell_and_cooldown_both_count() {
        let base = king_at(Coord::new(1, 0), 0);
        assert_ne!(base, king_at(Coord::new(1, 1), 0));
        assert_ne!(base, king_at(Coord::new(1, 0), from_secs(4)));
    }

    #[test]
    fn test_axis_order_matters() {
        assert_ne!(king_at(Coord::new(1, 2), 0), king_at(Coord::new(2, 1), 0));
    }

    #[test]
    fn test_dimensions_are_hashed() {
        let tall = compute_state_hash(3, 5, |h| h.update_bool(true));
        let wide = compute_state_hash(5, 3, |h| h.update_bool(true));
        assert_ne!(tall, wide);
    }

    #[test]
    fn test_domains_are_separate() {
        let mut board = StateHasher::for_board_state();
        let mut log = StateHasher::for_command_log();
        board.update_u32(0);
        log.update_u32(0);
        assert_ne!(board.finalize(), log.finalize());
    }

    #[test]
    fn test_short_hex() {
        let hash = king_at(Coord::new(0, 0), 0);
        let short = short_hex(&hash);
        assert_eq!(short.len(), 16);
        assert!(hex::encode(hash).starts_with(&short));
    }
}
