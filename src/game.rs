use std::time::SystemTime;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{ErrorKind, GameError};
use crate::piece::{Colour, Piece, Position};
use crate::record::{MoveRecord, Recorder};
use crate::rules::Rules;
use crate::state::PieceState;

/// Lifecycle of a game.
///
/// `Stateless` precedes piece creation; the first successful turn claim moves
/// an initialized game to `Started`; `Finished` is terminal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum GameState {
    Stateless,
    Initialized,
    Started,
    Finished,
}

/// A single-board game: turn claiming, move execution, king promotion and
/// win detection.
///
/// Intended usage:
///
/// 1. Construct with [`Game::new`] and call [`Game::initialize`] (or use
///    [`Game::standard`]).
/// 2. Alternate players with [`Game::begin_turn`] / [`Game::move_piece`] /
///    [`Game::end_turn`]; `move_piece` claims the turn implicitly.
/// 3. [`Game::has_turn`] names the colour holding the move lock, if any;
///    [`Game::next_player`] the colour expected to claim next.
///
/// Single-threaded by design: a host embedding this in a threaded server must
/// serialize all calls per game instance.
#[derive(Clone, Debug)]
pub struct Game {
    rules: Rules,
    pieces: Vec<Piece>,
    board: Board,
    turns: [bool; 2],
    last_player: Option<Colour>,
    next_player: Option<Colour>,
    winning_colour: Option<Colour>,
    game_state: GameState,
    draw: bool,
    auto_end_turn: bool,
    piece_offset: u32,
    win_check: bool,
    game_id: i64,
    start_time: Option<SystemTime>,
    end_time: Option<SystemTime>,
    recorder: Recorder,
}

impl Game {
    /// An empty game shell. No pieces exist until [`Game::initialize`].
    pub fn new(rules: Rules) -> Self {
        let board = Board::new(rules.board_width(), rules.board_height());
        Self {
            rules,
            pieces: Vec::new(),
            board,
            turns: [false; 2],
            last_player: None,
            next_player: None,
            winning_colour: None,
            game_state: GameState::Stateless,
            draw: false,
            auto_end_turn: true,
            piece_offset: 0,
            win_check: true,
            game_id: -1,
            start_time: None,
            end_time: None,
            recorder: Recorder::new(),
        }
    }

    /// An initialized 8x8 game.
    pub fn standard() -> Result<Self, GameError> {
        let mut game = Self::new(Rules::standard());
        game.initialize()?;
        Ok(game)
    }

    /// Offsets piece numbers by `offset`, keeping numbers unique when several
    /// boards share one game. Must be applied before [`Game::initialize`].
    pub fn with_piece_offset(mut self, offset: u32) -> Self {
        self.piece_offset = offset;
        self
    }

    /// Creates the configured pieces for both colours at their start
    /// positions and fills the board. Re-initialization wants a fresh
    /// instance.
    pub fn initialize(&mut self) -> Result<(), GameError> {
        if self.game_state != GameState::Stateless {
            return Err(GameError::new(
                ErrorKind::IllegalState,
                format!("game {} is already initialized", self.game_id),
            ));
        }

        for colour in Colour::ALL {
            for order in 1..=self.rules.piece_count() {
                let number = self.piece_offset + order;
                let piece = Piece::new(&self.rules, colour, number, order)?;
                let at = self.rules.coord_of(piece.position());
                self.pieces.push(piece);
                self.board.set(at.x, at.y, Some(self.pieces.len() - 1));
            }
        }

        self.turns = [false; 2];
        self.game_state = GameState::Initialized;
        debug!(
            "game {}: initialized, {} pieces per colour",
            self.game_id,
            self.rules.piece_count()
        );
        Ok(())
    }

    /// Claims the move lock for `colour`.
    ///
    /// A no-op when the colour already holds the lock, or moved last and the
    /// opponent has not claimed in between. Fails with `OutOfTurn` when
    /// another colour holds the lock and with `IllegalState` before
    /// initialization or after the game has finished.
    pub fn begin_turn(&mut self, colour: Colour) -> Result<(), GameError> {
        self.begin_state_check()?;

        if let Some(holder) = self.has_turn() {
            if holder == colour {
                return Ok(());
            }
            return Err(GameError::new(
                ErrorKind::OutOfTurn,
                format!("cannot claim turn for {colour}; {holder} claims the turn"),
            ));
        }

        // A colour may not claim twice in a row.
        if self.last_player == Some(colour) {
            return Ok(());
        }

        if self.game_state == GameState::Initialized {
            self.game_state = GameState::Started;
            self.start_time = Some(SystemTime::now());
            debug!("game {}: started", self.game_id);
        }

        self.turns[colour.index()] = true;
        self.last_player = Some(colour);
        self.next_player = Some(colour.other());
        debug!("game {}: {colour} claims the turn", self.game_id);
        Ok(())
    }

    /// Releases `colour`'s move lock unconditionally.
    pub fn end_turn(&mut self, colour: Colour) {
        self.turns[colour.index()] = false;
    }

    /// The colour holding the move lock, if any.
    pub fn has_turn(&self) -> Option<Colour> {
        Colour::ALL.into_iter().find(|c| self.turns[c.index()])
    }

    /// Moves the piece identified by `(colour, number)` to `to_position`,
    /// claiming the turn if necessary.
    ///
    /// The attempt is appended to the move log before any validation, so
    /// rejected moves are recorded too. On success returns the full state
    /// snapshot. With auto-end-turn enabled (the default) the lock is
    /// released afterwards unless the move was a jump and the same piece has
    /// a further jump available.
    pub fn move_piece(
        &mut self,
        colour: Colour,
        number: u32,
        to_position: Position,
    ) -> Result<Vec<PieceState>, GameError> {
        self.recorder.record(self.game_id, colour, number, to_position);

        self.begin_turn(colour)?;

        if self.has_turn() != Some(colour) {
            return Err(GameError::for_move(
                ErrorKind::OutOfTurn,
                colour,
                number,
                to_position,
                format!("{colour} may not move until the opponent has taken a turn"),
            ));
        }

        if self.game_state != GameState::Started {
            return Err(GameError::new(
                ErrorKind::IllegalState,
                format!("game {} not started", self.game_id),
            ));
        }

        if to_position < 0 || !self.rules.is_valid_position(to_position) {
            return Err(GameError::for_move(
                ErrorKind::IllegalValue,
                colour,
                number,
                to_position,
                format!("illegal position {to_position}"),
            ));
        }

        let idx = self.piece_check(colour, number, to_position)?;

        if !self.pieces[idx].direction_check(&self.rules, to_position)? {
            return Err(GameError::for_move(
                ErrorKind::IllegalMove,
                colour,
                number,
                to_position,
                format!("cannot move {} to {to_position}", self.pieces[idx]),
            ));
        }

        let was_jump = self.move_impl(idx, to_position)?;

        if self.rules.is_kingable(&self.pieces[idx]) {
            self.pieces[idx].set_kinged(true);
            trace!("game {}: {} kinged", self.game_id, self.pieces[idx]);
        }

        if self.auto_end_turn && (!was_jump || !self.can_jump_piece(idx)) {
            self.end_turn(colour);
        }

        if self.win_check {
            self.end_of_game_check(colour);
        }

        Ok(self.state())
    }

    /// Forces the game to a finished, drawn state. Callers are expected to
    /// have agreed out-of-band; no confirmation protocol is enforced here.
    pub fn draw(&mut self) {
        self.finish();
        self.draw = true;
        debug!("game {}: drawn", self.game_id);
    }

    /// True iff `colour` has at least one piece with a legal move or jump.
    pub fn can_move(&self, colour: Colour) -> bool {
        self.pieces
            .iter()
            .any(|p| p.colour() == colour && self.movable_piece(p))
    }

    /// True iff the piece itself can step or jump somewhere: kings in either
    /// row direction, other pieces only towards the opponent.
    pub fn movable_piece(&self, piece: &Piece) -> bool {
        if piece.is_jumped() {
            return false;
        }

        let at = self.rules.coord_of(piece.position());
        let forward = piece.colour() == Colour::White;

        if piece.is_kinged() {
            self.board.can_move_or_jump(&self.pieces, true, at.x, at.y)
                || self.board.can_move_or_jump(&self.pieces, false, at.x, at.y)
        } else {
            self.board.can_move_or_jump(&self.pieces, forward, at.x, at.y)
        }
    }

    /// State snapshot of every piece, in insertion order.
    pub fn state(&self) -> Vec<PieceState> {
        self.pieces.iter().map(PieceState::from).collect()
    }

    /// State snapshot filtered to one colour.
    pub fn state_of(&self, colour: Colour) -> Vec<PieceState> {
        self.pieces
            .iter()
            .filter(|p| p.colour() == colour)
            .map(PieceState::from)
            .collect()
    }

    /// The live piece collection. Use [`Game::state`] for state information
    /// only; this accessor supports bulk-replace via [`Game::set_state`].
    pub fn full_state(&self) -> &[Piece] {
        &self.pieces
    }

    /// Replaces the entire piece set, re-deriving board occupancy from
    /// scratch. The count must match the configured piece complement.
    pub fn set_state(&mut self, pieces: Vec<Piece>) -> Result<(), GameError> {
        let expected = self.rules.piece_count() as usize * Colour::ALL.len();
        if pieces.len() != expected {
            return Err(GameError::new(
                ErrorKind::IllegalValue,
                format!("expected {expected} pieces, got {}", pieces.len()),
            ));
        }

        self.replace_state(pieces);
        Ok(())
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    pub fn winning_colour(&self) -> Option<Colour> {
        self.winning_colour
    }

    pub fn is_draw(&self) -> bool {
        self.draw
    }

    pub fn last_player(&self) -> Option<Colour> {
        self.last_player
    }

    pub fn next_player(&self) -> Option<Colour> {
        self.next_player
    }

    pub fn auto_end_turn(&self) -> bool {
        self.auto_end_turn
    }

    /// Controls whether a completed move releases the turn lock
    /// automatically. On by default.
    pub fn set_auto_end_turn(&mut self, auto_end_turn: bool) {
        self.auto_end_turn = auto_end_turn;
    }

    pub fn game_id(&self) -> i64 {
        self.game_id
    }

    pub fn set_game_id(&mut self, game_id: i64) {
        self.game_id = game_id;
    }

    /// When the game entered `Started`, if it has.
    pub fn start_time(&self) -> Option<SystemTime> {
        self.start_time
    }

    /// When the game entered `Finished`, if it has.
    pub fn end_time(&self) -> Option<SystemTime> {
        self.end_time
    }

    /// Every move attempt so far, accepted or rejected.
    pub fn moves(&self) -> &[MoveRecord] {
        self.recorder.moves()
    }

    pub fn clear_moves(&mut self) {
        self.recorder.clear();
    }

    fn begin_state_check(&self) -> Result<(), GameError> {
        match self.game_state {
            GameState::Stateless => Err(GameError::new(
                ErrorKind::IllegalState,
                format!("game {} has not been initialized", self.game_id),
            )),
            GameState::Finished => Err(GameError::new(
                ErrorKind::IllegalState,
                format!("game {} is finished", self.game_id),
            )),
            GameState::Initialized | GameState::Started => Ok(()),
        }
    }

    fn piece_check(
        &self,
        colour: Colour,
        number: u32,
        to_position: Position,
    ) -> Result<usize, GameError> {
        if !self.pieces.iter().any(|p| p.colour() == colour) {
            return Err(GameError::for_move(
                ErrorKind::IllegalState,
                colour,
                number,
                to_position,
                format!("no pieces for colour {colour}"),
            ));
        }

        let idx = self
            .pieces
            .iter()
            .position(|p| p.colour() == colour && p.number() == number)
            .ok_or_else(|| {
                GameError::for_move(
                    ErrorKind::IllegalState,
                    colour,
                    number,
                    to_position,
                    format!("no piece {number} for colour {colour}"),
                )
            })?;

        if self.pieces[idx].is_jumped() {
            return Err(GameError::for_move(
                ErrorKind::IllegalState,
                colour,
                number,
                to_position,
                format!("{} has been jumped", self.pieces[idx]),
            ));
        }

        Ok(idx)
    }

    /// Executes a validated move request: occupancy check, step/jump
    /// classification, capture, then the position and occupancy writes.
    /// Returns whether the move was a jump.
    fn move_impl(&mut self, idx: usize, to_position: Position) -> Result<bool, GameError> {
        let colour = self.pieces[idx].colour();
        let number = self.pieces[idx].number();
        let from = self.rules.coord_of(self.pieces[idx].position());
        let to = self.rules.coord_of(to_position);

        if let Some(occupant) = self.board.piece_at(to.x, to.y) {
            return Err(GameError::for_move(
                ErrorKind::IllegalMove,
                colour,
                number,
                to_position,
                format!(
                    "cannot move {} to {to_position}: {} already occupies it",
                    self.pieces[idx], self.pieces[occupant]
                ),
            ));
        }

        let was_jump = if from.is_jump(to) {
            let mid = from.midpoint(to);
            let over = self.board.piece_at(mid.x, mid.y).ok_or_else(|| {
                GameError::for_move(
                    ErrorKind::IllegalJump,
                    colour,
                    number,
                    to_position,
                    format!("no piece at {}:{} to jump", mid.x, mid.y),
                )
            })?;

            if self.pieces[over].colour() == colour {
                return Err(GameError::for_move(
                    ErrorKind::IllegalJump,
                    colour,
                    number,
                    to_position,
                    format!("cannot jump over one's own piece {}", self.pieces[over]),
                ));
            }

            self.pieces[over].jumped();
            self.board.set(mid.x, mid.y, None);
            true
        } else if from.is_step(to) {
            false
        } else {
            return Err(GameError::for_move(
                ErrorKind::IllegalMove,
                colour,
                number,
                to_position,
                format!("illegal move: {} to {to_position}", self.pieces[idx]),
            ));
        };

        self.pieces[idx].set_position(&self.rules, to_position)?;
        self.board.set(to.x, to.y, Some(idx));
        self.board.set(from.x, from.y, None);
        trace!(
            "game {}: {} {}",
            self.game_id,
            self.pieces[idx],
            if was_jump { "(jump)" } else { "(step)" }
        );
        Ok(was_jump)
    }

    /// True if the piece has a further jump from its current square.
    pub(crate) fn can_jump_piece(&self, idx: usize) -> bool {
        let piece = &self.pieces[idx];
        if piece.is_jumped() {
            return false;
        }

        let at = self.rules.coord_of(piece.position());
        if piece.is_kinged() {
            self.board.can_jump(&self.pieces, true, at.x, at.y)
                || self.board.can_jump(&self.pieces, false, at.x, at.y)
        } else {
            let forward = piece.colour() == Colour::White;
            self.board.can_jump(&self.pieces, forward, at.x, at.y)
        }
    }

    fn end_of_game_check(&mut self, mover: Colour) {
        if self.other_colours_in_play(mover) {
            return;
        }

        self.winning_colour = Some(mover);
        self.finish();
        debug!("game {}: won by {mover}", self.game_id);
    }

    fn other_colours_in_play(&self, mover: Colour) -> bool {
        Colour::ALL
            .into_iter()
            .filter(|c| *c != mover)
            .any(|c| self.can_move(c))
    }

    fn finish(&mut self) {
        self.game_state = GameState::Finished;
        self.end_time = Some(SystemTime::now());
    }

    pub(crate) fn arena_index(&self, colour: Colour, number: u32) -> Option<usize> {
        self.pieces
            .iter()
            .position(|p| p.colour() == colour && p.number() == number)
    }

    pub(crate) fn piece(&self, idx: usize) -> &Piece {
        &self.pieces[idx]
    }

    /// Replaces the piece arena without a count check; multi-board splices
    /// leave individual boards with uneven complements.
    pub(crate) fn replace_state(&mut self, pieces: Vec<Piece>) {
        self.pieces = pieces;
        self.sync_board();
    }

    /// Splices the piece identified by `(colour, number)` out of this board.
    pub(crate) fn remove_piece(&mut self, colour: Colour, number: u32) -> Option<Piece> {
        let idx = self.arena_index(colour, number)?;
        let piece = self.pieces.remove(idx);
        // Removal shifts arena indices; rebuild the grid.
        self.sync_board();
        Some(piece)
    }

    /// Splices a piece into this board at its current (relative) position.
    pub(crate) fn insert_piece(&mut self, piece: Piece) {
        let at = self.rules.coord_of(piece.position());
        let jumped = piece.is_jumped();
        self.pieces.push(piece);
        if !jumped {
            self.board.set(at.x, at.y, Some(self.pieces.len() - 1));
        }
    }

    pub(crate) fn colour_at(&self, x: i32, y: i32) -> Option<Colour> {
        self.board.piece_at(x, y).map(|i| self.pieces[i].colour())
    }

    /// Marks the occupant of `(x, y)` jumped and clears the square.
    pub(crate) fn capture_at(&mut self, x: i32, y: i32) {
        if let Some(idx) = self.board.piece_at(x, y) {
            self.pieces[idx].jumped();
            self.board.set(x, y, None);
        }
    }

    /// Disables per-board win detection; a multi-board composite judges the
    /// end of the game across all of its boards instead.
    pub(crate) fn set_win_check(&mut self, win_check: bool) {
        self.win_check = win_check;
    }

    pub(crate) fn finish_with(&mut self, winner: Option<Colour>) {
        self.winning_colour = winner;
        self.finish();
    }

    fn sync_board(&mut self) {
        self.board.reset();
        for (idx, piece) in self.pieces.iter().enumerate() {
            if piece.is_jumped() {
                continue;
            }
            let at = self.rules.coord_of(piece.position());
            self.board.set(at.x, at.y, Some(idx));
        }
    }
}
