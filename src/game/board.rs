//! Board State
//!
//! Owns the grid, the live pieces and both teams' stock. Every command either
//! commits all of its effects or returns without touching the board.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::{debug, info, trace};

use crate::core::coord::Coord;
use crate::core::fixed::{decay, Fixed, Secs};
use crate::core::hash::{compute_state_hash, StateHash};
use crate::game::events::{EventQueue, GameEvent, GameEventData};
use crate::game::piece::{Piece, PieceId, StockEntry, StockId};
use crate::game::rules::{PieceStatsTable, PieceType, StatsError, Team};
use crate::game::setup::SetupEntry;

/// Largest width or height a board may have.
pub const MAX_DIMENSION: u32 = 64;

// =============================================================================
// OUTCOMES AND ERRORS
// =============================================================================

/// Result of a move attempt that reached the rules check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// Moved onto an empty cell
    Moved,
    /// Moved onto and captured an opposing piece
    MovedWithCapture { captured: PieceType },
    /// Moved and ended the match (King capture or King on the far rank)
    MovedAndWon {
        winner: Team,
        captured: Option<PieceType>,
    },
    /// Delta not allowed for this piece type; board unchanged
    RejectedIllegal,
    /// Target holds a piece of the mover's team; board unchanged
    RejectedOccupiedBySelf,
}

impl MoveOutcome {
    /// Check if the move was applied to the board.
    #[inline]
    pub fn is_committed(&self) -> bool {
        matches!(
            self,
            MoveOutcome::Moved | MoveOutcome::MovedWithCapture { .. } | MoveOutcome::MovedAndWon { .. }
        )
    }
}

/// Result of a successful stock placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementOutcome {
    /// New piece created on the board
    Placed { piece: PieceId },
}

/// Board command errors. None of them leave a partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// Dimensions are zero or too large.
    #[error("Invalid board dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// A cooldown in the stats table is out of range.
    #[error("Invalid piece stats: {0}")]
    InvalidStats(#[from] StatsError),

    /// Coordinates outside the grid.
    #[error("Cell {0} is outside the board")]
    OutOfBounds(Coord),

    /// Piece ID not on the board (never existed or captured).
    #[error("No such piece: {0:?}")]
    NoSuchPiece(PieceId),

    /// Stock entry ID not in the team's stock.
    #[error("No such stock entry: {0:?}")]
    NoSuchStockEntry(StockId),

    /// Piece still has move cooldown left.
    #[error("Piece {0:?} is still cooling down")]
    PieceNotReady(PieceId),

    /// Placement target is not empty.
    #[error("Cell {0} is occupied")]
    CellOccupied(Coord),

    /// Stock entry still has recast cooldown left.
    #[error("Stock entry {0:?} is still cooling down")]
    StockEntryNotReady(StockId),

    /// The match is over; the board is frozen.
    #[error("Match already ended")]
    MatchAlreadyEnded,
}

// =============================================================================
// BOARD
// =============================================================================

/// Complete state of the board.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Board {
    width: u32,
    height: u32,

    /// Per-type cooldown constants
    stats: PieceStatsTable,

    /// Row-major cell contents
    grid: Vec<Option<PieceId>>,

    /// Live pieces (BTreeMap for deterministic iteration)
    pieces: BTreeMap<PieceId, Piece>,

    /// Blue's (bottom) stock in capture order
    blue_stock: Vec<StockEntry>,

    /// Red's (top) stock in capture order
    red_stock: Vec<StockEntry>,

    next_piece_id: u32,
    next_stock_id: u32,

    /// Sum of all tick deltas applied so far
    elapsed: Fixed,

    /// Set once, by the move that ends the match
    winner: Option<Team>,

    /// Events generated since the last `take_events`
    #[serde(skip)]
    events: EventQueue,
}

impl Board {
    /// Create an empty board.
    ///
    /// Rejects a stats table with negative, zero move, or oversized cooldowns.
    pub fn new(width: u32, height: u32, stats: PieceStatsTable) -> Result<Self, BoardError> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(BoardError::InvalidDimensions { width, height });
        }
        stats.validate()?;
        Ok(Self {
            width,
            height,
            stats,
            grid: vec![None; (width * height) as usize],
            pieces: BTreeMap::new(),
            blue_stock: Vec::new(),
            red_stock: Vec::new(),
            next_piece_id: 0,
            next_stock_id: 0,
            elapsed: 0,
            winner: None,
            events: EventQueue::new(),
        })
    }

    /// Seed the opening position.
    ///
    /// The whole layout is validated first; on error nothing is placed.
    pub fn place_initial_setup(&mut self, setup: &[SetupEntry]) -> Result<Vec<PieceId>, BoardError> {
        if self.winner.is_some() {
            return Err(BoardError::MatchAlreadyEnded);
        }

        let mut claimed = vec![false; self.grid.len()];
        for entry in setup {
            let coord = entry.coord();
            let index = self.index(coord).ok_or(BoardError::OutOfBounds(coord))?;
            if self.grid[index].is_some() || claimed[index] {
                return Err(BoardError::CellOccupied(coord));
            }
            claimed[index] = true;
        }

        let ids = setup
            .iter()
            .map(|entry| {
                let max = self.stats.move_cooldown(entry.piece_type);
                let id = self.alloc_piece_id();
                self.insert_piece(Piece::new(id, entry.piece_type, entry.team, entry.coord(), max));
                id
            })
            .collect::<Vec<_>>();

        debug!("Placed {} setup pieces", ids.len());
        Ok(ids)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cooldown table this board was built with.
    #[inline]
    pub fn stats(&self) -> &PieceStatsTable {
        &self.stats
    }

    /// Total simulated time.
    #[inline]
    pub fn elapsed(&self) -> Fixed {
        self.elapsed
    }

    /// Winning team, once the match has ended.
    #[inline]
    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// Check if the match has ended.
    #[inline]
    pub fn is_ended(&self) -> bool {
        self.winner.is_some()
    }

    /// Check if `coord` lies on the board.
    #[inline]
    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.in_bounds(self.width, self.height)
    }

    /// Piece occupying `coord`, if any.
    pub fn piece_at(&self, coord: Coord) -> Option<&Piece> {
        let index = self.index(coord)?;
        self.grid[index].and_then(|id| self.pieces.get(&id))
    }

    /// Get a piece by ID.
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    /// All live pieces in ID order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.values()
    }

    /// Live pieces of one team in ID order.
    pub fn pieces_of(&self, team: Team) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.values().filter(move |p| p.team == team)
    }

    /// A team's stock in capture order.
    pub fn stock_of(&self, team: Team) -> &[StockEntry] {
        match team {
            Team::Blue => &self.blue_stock,
            Team::Red => &self.red_stock,
        }
    }

    /// Stock entry at position `index` of a team's stock.
    pub fn stock_entry(&self, team: Team, index: usize) -> Option<&StockEntry> {
        self.stock_of(team).get(index)
    }

    /// Look up a stock entry by ID.
    pub fn find_stock(&self, team: Team, id: StockId) -> Option<&StockEntry> {
        self.stock_of(team).iter().find(|e| e.id == id)
    }

    /// Check if a piece may be selected (its move cooldown has expired).
    #[inline]
    pub fn can_select(&self, piece: &Piece) -> bool {
        piece.can_move()
    }

    /// Every in-bounds cell the piece's rule allows, in row-major order.
    ///
    /// Occupancy is not considered: cells holding friendly pieces are listed
    /// and only rejected when the move is attempted.
    pub fn legal_destinations(&self, piece: &Piece) -> Vec<Coord> {
        let mut cells = Vec::new();
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let target = Coord::new(x, y);
                if piece.piece_type.allows(piece.team, piece.position.delta_to(target)) {
                    cells.push(target);
                }
            }
        }
        cells
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Move a piece one step.
    ///
    /// Rule and friendly-occupancy rejections are reported as
    /// [`MoveOutcome`] variants; everything else that prevents the attempt
    /// is a [`BoardError`].
    pub fn attempt_move(&mut self, piece_id: PieceId, target: Coord) -> Result<MoveOutcome, BoardError> {
        if self.winner.is_some() {
            return Err(BoardError::MatchAlreadyEnded);
        }
        let target_index = self.index(target).ok_or(BoardError::OutOfBounds(target))?;
        let mover = self.pieces.get(&piece_id).ok_or(BoardError::NoSuchPiece(piece_id))?;
        if !mover.can_move() {
            return Err(BoardError::PieceNotReady(piece_id));
        }
        let (team, piece_type, from) = (mover.team, mover.piece_type, mover.position);

        if !piece_type.allows(team, from.delta_to(target)) {
            debug!("Rejected {:?} {:?} {} -> {}: illegal step", team, piece_type, from, target);
            return Ok(MoveOutcome::RejectedIllegal);
        }

        let occupant = self.grid[target_index]
            .and_then(|id| self.pieces.get(&id))
            .map(|p| (p.id, p.team, p.piece_type));
        if let Some((_, occupant_team, _)) = occupant {
            if occupant_team == team {
                debug!("Rejected {:?} {:?} {} -> {}: own piece", team, piece_type, from, target);
                return Ok(MoveOutcome::RejectedOccupiedBySelf);
            }
        }

        // Commit
        let captured = occupant.map(|(id, _, captured_type)| {
            self.pieces.remove(&id);
            (id, captured_type)
        });
        if let Some(from_index) = self.index(from) {
            self.grid[from_index] = None;
        }
        self.grid[target_index] = Some(piece_id);
        if let Some(piece) = self.pieces.get_mut(&piece_id) {
            piece.position = target;
            piece.reset_cooldown();
        }

        if let Some((captured_id, captured_type)) = captured {
            info!("{:?} {:?} captured {:?} {:?} at {}", team, piece_type, team.opponent(), captured_type, target);
            self.emit(GameEventData::PieceCaptured {
                piece: captured_id,
                piece_type: captured_type,
                team: team.opponent(),
                by: piece_id,
            });
        }
        self.emit(GameEventData::PieceMoved {
            piece: piece_id,
            piece_type,
            team,
            from,
            to: target,
        });

        let mut winner = None;
        if let Some((_, captured_type)) = captured {
            if captured_type == PieceType::King {
                winner = Some(team);
            } else {
                self.add_to_stock(team, captured_type);
            }
        }
        if piece_type == PieceType::King && target.y == team.far_rank(self.height) {
            winner = Some(team);
        }

        if let Some(winner) = winner {
            self.winner = Some(winner);
            info!("Match ended: {:?} wins at {}", winner, Secs(self.elapsed));
            self.emit(GameEventData::MatchEnded { winner });
            return Ok(MoveOutcome::MovedAndWon {
                winner,
                captured: captured.map(|(_, t)| t),
            });
        }

        Ok(match captured {
            Some((_, captured_type)) => MoveOutcome::MovedWithCapture { captured: captured_type },
            None => MoveOutcome::Moved,
        })
    }

    /// Redeploy a team's stock entry onto an empty cell.
    ///
    /// The new piece starts with its full move cooldown.
    pub fn place_from_stock(
        &mut self,
        team: Team,
        entry_id: StockId,
        target: Coord,
    ) -> Result<PlacementOutcome, BoardError> {
        if self.winner.is_some() {
            return Err(BoardError::MatchAlreadyEnded);
        }
        let target_index = self.index(target).ok_or(BoardError::OutOfBounds(target))?;
        let slot = self
            .stock_of(team)
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or(BoardError::NoSuchStockEntry(entry_id))?;
        if self.grid[target_index].is_some() {
            return Err(BoardError::CellOccupied(target));
        }
        if !self.stock_of(team)[slot].can_recast() {
            return Err(BoardError::StockEntryNotReady(entry_id));
        }

        let entry = self.stock_mut(team).remove(slot);
        let max = self.stats.move_cooldown(entry.piece_type);
        let id = self.alloc_piece_id();
        let mut piece = Piece::new(id, entry.piece_type, team, target, max);
        piece.reset_cooldown();
        self.insert_piece(piece);

        info!("{:?} placed {:?} from stock at {}", team, entry.piece_type, target);
        self.emit(GameEventData::PiecePlacedFromStock {
            entry: entry.id,
            piece: id,
            piece_type: entry.piece_type,
            team,
            at: target,
        });

        Ok(PlacementOutcome::Placed { piece: id })
    }

    /// Advance every cooldown by `dt`, clamping at zero.
    ///
    /// No-op for a non-positive `dt` and once the match has ended.
    pub fn tick(&mut self, dt: Fixed) {
        if self.winner.is_some() || dt <= 0 {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        trace!("Tick {} (elapsed {})", Secs(dt), Secs(self.elapsed));

        for piece in self.pieces.values_mut() {
            piece.move_cooldown_remaining = decay(piece.move_cooldown_remaining, dt);
        }

        let mut became_ready = Vec::new();
        for team in Team::ALL {
            for entry in self.stock_mut(team).iter_mut() {
                let was_ready = entry.can_recast();
                entry.recast_cooldown_remaining = decay(entry.recast_cooldown_remaining, dt);
                if !was_ready && entry.can_recast() {
                    became_ready.push((entry.id, team));
                }
            }
        }
        for (entry, team) in became_ready {
            self.emit(GameEventData::StockReady { entry, team });
        }
    }

    // =========================================================================
    // Events and hashing
    // =========================================================================

    /// Append a notification stamped with the current time.
    pub fn push_event(&mut self, data: GameEventData) {
        self.emit(data);
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.events.take()
    }

    /// Events not yet taken.
    pub fn pending_events(&self) -> &[GameEvent] {
        self.events.pending()
    }

    /// Compute hash of current state for verification.
    ///
    /// Pending events are not part of the state.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.width, self.height, |hasher| {
            for (t, stats) in self.stats.iter() {
                hasher.update_u8(t as u8);
                hasher.update_fixed(stats.move_cooldown);
                hasher.update_fixed(stats.recast_cooldown);
            }

            // Grid in row-major order
            for cell in &self.grid {
                hasher.update_u32(cell.map_or(u32::MAX, |id| id.0));
            }

            // Pieces in sorted order (BTreeMap guarantees this)
            for piece in self.pieces.values() {
                piece.hash_into(hasher);
            }

            for team in Team::ALL {
                let stock = self.stock_of(team);
                hasher.update_u8(team as u8);
                hasher.update_u32(stock.len() as u32);
                for entry in stock {
                    entry.hash_into(hasher);
                }
            }

            hasher.update_u32(self.next_piece_id);
            hasher.update_u32(self.next_stock_id);
            hasher.update_fixed(self.elapsed);
            hasher.update_u8(self.winner.map_or(u8::MAX, |t| t as u8));
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn index(&self, coord: Coord) -> Option<usize> {
        if !self.in_bounds(coord) {
            return None;
        }
        Some(coord.y as usize * self.width as usize + coord.x as usize)
    }

    fn stock_mut(&mut self, team: Team) -> &mut Vec<StockEntry> {
        match team {
            Team::Blue => &mut self.blue_stock,
            Team::Red => &mut self.red_stock,
        }
    }

    fn alloc_piece_id(&mut self) -> PieceId {
        let id = PieceId(self.next_piece_id);
        self.next_piece_id += 1;
        id
    }

    /// Caller guarantees the piece's cell is in bounds and empty.
    fn insert_piece(&mut self, piece: Piece) {
        if let Some(index) = self.index(piece.position) {
            self.grid[index] = Some(piece.id);
        }
        self.pieces.insert(piece.id, piece);
    }

    fn add_to_stock(&mut self, team: Team, piece_type: PieceType) {
        let id = StockId(self.next_stock_id);
        self.next_stock_id += 1;
        let recast = self.stats.recast_cooldown(piece_type);
        let entry = StockEntry::new(id, piece_type, team, recast);
        let ready = entry.can_recast();
        self.stock_mut(team).push(entry);
        debug!("{:?} stocked {:?} ({} recast)", team, piece_type, Secs(recast));
        self.emit(GameEventData::StockAdded { entry: id, piece_type, team });
        // No tick will see a zero-recast entry change state
        if ready {
            self.emit(GameEventData::StockReady { entry: id, team });
        }
    }

    fn emit(&mut self, data: GameEventData) {
        self.events.push(self.elapsed, data);
    }
}

// =============================================================================
// TESTS
// =============================================================================
