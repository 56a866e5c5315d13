use std::time::SystemTime;

use log::{debug, trace};

use crate::coord::{split_diff, Coord};
use crate::error::{ErrorKind, GameError};
use crate::game::{Game, GameState};
use crate::piece::{Colour, Piece, Position, JUMPED};
use crate::record::{MoveRecord, Recorder};
use crate::rules::Rules;
use crate::state::PieceState;

/// A stack of boards sharing one rule set, adding a third spatial dimension
/// (the board index, `z`).
///
/// Positions at this level are absolute: `z * width * height + relative`.
/// On top of ordinary same-board play, a piece may cross to an adjacent board
/// (`|dz| == 1`) onto an empty square reached by a pure z-translation or a
/// single diagonal step, or jump two boards (`|dz| == 2`) over an opposing
/// piece sitting on the intermediate board at the planar midpoint, which is
/// captured. Turn state, auto-end-turn and win detection are aggregated
/// across all boards.
#[derive(Clone, Debug)]
pub struct MultiBoardGame {
    rules: Rules,
    boards: Vec<Game>,
    last_board: Option<usize>,
    game_state: GameState,
    auto_end_turn: bool,
    game_id: i64,
    start_time: Option<SystemTime>,
    end_time: Option<SystemTime>,
    recorder: Recorder,
}

impl MultiBoardGame {
    /// A game of `num_boards` initialized boards. Piece numbers are offset
    /// per board so every `(colour, number)` pair is unique game-wide.
    pub fn new(rules: Rules, num_boards: usize) -> Result<Self, GameError> {
        if num_boards < 2 {
            return Err(GameError::new(
                ErrorKind::IllegalValue,
                format!("a multi-board game needs at least 2 boards, got {num_boards}"),
            ));
        }

        let mut boards = Vec::with_capacity(num_boards);
        for z in 0..num_boards {
            let mut board = Game::new(rules.clone())
                .with_piece_offset(z as u32 * rules.piece_count());
            board.initialize()?;
            // The composite owns the end-of-turn and end-of-game policies.
            board.set_auto_end_turn(false);
            board.set_win_check(false);
            boards.push(board);
        }

        debug!("multi-board game: {num_boards} boards initialized");
        Ok(Self {
            rules,
            boards,
            last_board: None,
            game_state: GameState::Initialized,
            auto_end_turn: true,
            game_id: -1,
            start_time: None,
            end_time: None,
            recorder: Recorder::new(),
        })
    }

    /// A two-board game on standard 8x8 boards.
    pub fn standard() -> Result<Self, GameError> {
        Self::new(Rules::standard(), 2)
    }

    #[inline]
    pub fn num_boards(&self) -> usize {
        self.boards.len()
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// The board holding an absolute position.
    #[inline]
    pub fn board_index(&self, position: Position) -> usize {
        debug_assert!(position >= 0);
        (position / self.rules.square_count()) as usize
    }

    /// Translates an absolute position onto board `z`.
    #[inline]
    pub fn relative_position(&self, position: Position, z: usize) -> Position {
        position - z as i32 * self.rules.square_count()
    }

    /// Translates a board-local position on board `z` to an absolute one.
    #[inline]
    pub fn absolute_position(&self, position: Position, z: usize) -> Position {
        position + z as i32 * self.rules.square_count()
    }

    /// Claims the move lock for `colour` on every board.
    pub fn begin_turn(&mut self, colour: Colour) -> Result<(), GameError> {
        if self.game_state == GameState::Finished {
            return Err(GameError::new(
                ErrorKind::IllegalState,
                format!("game {} is finished", self.game_id),
            ));
        }

        for board in &mut self.boards {
            board.begin_turn(colour)?;
        }

        if self.game_state == GameState::Initialized
            && self.boards[0].game_state() == GameState::Started
        {
            self.game_state = GameState::Started;
            self.start_time = Some(SystemTime::now());
            debug!("multi-board game {}: started", self.game_id);
        }

        Ok(())
    }

    /// Releases `colour`'s lock on every board.
    pub fn end_turn(&mut self, colour: Colour) {
        for board in &mut self.boards {
            board.end_turn(colour);
        }
    }

    /// The colour holding the move lock, if any. Boards are kept in step, so
    /// the first board speaks for all of them.
    pub fn has_turn(&self) -> Option<Colour> {
        self.boards[0].has_turn()
    }

    /// Moves the piece identified by `(colour, number)` to the absolute
    /// position `to_position`, claiming the turn if necessary.
    ///
    /// Same-board destinations follow ordinary move/jump legality; a
    /// destination one board away is a cross-board step, two boards away a
    /// cross-board jump, and anything further is rejected. As with
    /// single-board games the attempt is logged before validation, and
    /// auto-end-turn keeps the lock only while a further jump (on any board)
    /// is available to the moved piece.
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

        self.position_check(colour, number, to_position)?;

        if number == 0 || number > self.rules.piece_count() * self.num_boards() as u32 {
            return Err(GameError::for_move(
                ErrorKind::IllegalValue,
                colour,
                number,
                to_position,
                format!("piece number {number} is not valid"),
            ));
        }

        let (from_z, idx) = self.locate(colour, number).ok_or_else(|| {
            GameError::for_move(
                ErrorKind::IllegalState,
                colour,
                number,
                to_position,
                format!("piece {colour}-{number} not found"),
            )
        })?;

        if self.boards[from_z].piece(idx).is_jumped() {
            return Err(GameError::for_move(
                ErrorKind::IllegalState,
                colour,
                number,
                to_position,
                format!("{} has been jumped", self.boards[from_z].piece(idx)),
            ));
        }

        let to_z = self.board_index(to_position);

        let was_jump = if from_z == to_z {
            let rel = self.relative_position(to_position, to_z);
            let from_y = self.rules.y_of(self.boards[from_z].piece(idx).position());
            self.boards[from_z].move_piece(colour, number, rel)?;
            (self.rules.y_of(rel) - from_y).abs() == 2
        } else {
            self.move_across_boards(colour, number, to_position, from_z, to_z)?
        };

        self.last_board = Some(to_z);
        trace!(
            "multi-board game {}: {colour}-{number} to {to_position} (board {to_z})",
            self.game_id
        );

        if self.auto_end_turn && (!was_jump || !self.can_jump_anywhere(colour, number)) {
            self.end_turn(colour);
        }

        self.end_of_game_check(colour);

        Ok(self.state())
    }

    /// True iff `colour` can step or jump on some board, or move a piece
    /// across boards.
    pub fn can_move(&self, colour: Colour) -> bool {
        if self.boards.iter().any(|b| b.can_move(colour)) {
            return true;
        }

        self.boards.iter().enumerate().any(|(z, board)| {
            board
                .full_state()
                .iter()
                .any(|p| p.colour() == colour && self.can_cross_board(z, p))
        })
    }

    /// Forces a finished, drawn state on every board.
    pub fn draw(&mut self) {
        for board in &mut self.boards {
            board.draw();
        }
        self.game_state = GameState::Finished;
        self.end_time = Some(SystemTime::now());
        debug!("multi-board game {}: drawn", self.game_id);
    }

    pub fn is_draw(&self) -> bool {
        self.boards[0].is_draw()
    }

    pub fn winning_colour(&self) -> Option<Colour> {
        self.boards[0].winning_colour()
    }

    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    /// The last player of the most recently acted-on board.
    pub fn last_player(&self) -> Option<Colour> {
        self.last_board.and_then(|z| self.boards[z].last_player())
    }

    /// The next player of the most recently acted-on board.
    pub fn next_player(&self) -> Option<Colour> {
        self.last_board.and_then(|z| self.boards[z].next_player())
    }

    pub fn auto_end_turn(&self) -> bool {
        self.auto_end_turn
    }

    pub fn set_auto_end_turn(&mut self, auto_end_turn: bool) {
        self.auto_end_turn = auto_end_turn;
    }

    pub fn game_id(&self) -> i64 {
        self.game_id
    }

    pub fn set_game_id(&mut self, game_id: i64) {
        self.game_id = game_id;
        for board in &mut self.boards {
            board.set_game_id(game_id);
        }
    }

    pub fn start_time(&self) -> Option<SystemTime> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<SystemTime> {
        self.end_time
    }

    /// Every move attempt made through this composite, accepted or rejected.
    pub fn moves(&self) -> &[MoveRecord] {
        self.recorder.moves()
    }

    pub fn clear_moves(&mut self) {
        self.recorder.clear();
    }

    /// State snapshot of every piece on every board, absolute positions.
    pub fn state(&self) -> Vec<PieceState> {
        let mut out = Vec::new();
        for (z, board) in self.boards.iter().enumerate() {
            out.extend(board.state().into_iter().map(|ps| self.to_absolute(ps, z)));
        }
        out
    }

    /// State snapshot filtered to one colour, absolute positions.
    pub fn state_of(&self, colour: Colour) -> Vec<PieceState> {
        let mut out = Vec::new();
        for (z, board) in self.boards.iter().enumerate() {
            out.extend(
                board
                    .state_of(colour)
                    .into_iter()
                    .map(|ps| self.to_absolute(ps, z)),
            );
        }
        out
    }

    /// Per-board state snapshots, absolute positions.
    pub fn state_by_board(&self) -> Vec<Vec<PieceState>> {
        self.boards
            .iter()
            .enumerate()
            .map(|(z, board)| {
                board
                    .state()
                    .into_iter()
                    .map(|ps| self.to_absolute(ps, z))
                    .collect()
            })
            .collect()
    }

    /// Clones of the live per-board piece collections, board-local
    /// positions. Pair with [`MultiBoardGame::set_state`] for bulk replace.
    pub fn full_state(&self) -> Vec<Vec<Piece>> {
        self.boards.iter().map(|b| b.full_state().to_vec()).collect()
    }

    /// Replaces every board's piece set. The outer vector is indexed by
    /// board; the total piece count must match the configured complement.
    pub fn set_state(&mut self, state: Vec<Vec<Piece>>) -> Result<(), GameError> {
        if state.len() != self.num_boards() {
            return Err(GameError::new(
                ErrorKind::IllegalValue,
                format!("expected {} boards, got {}", self.num_boards(), state.len()),
            ));
        }

        let expected =
            self.rules.piece_count() as usize * Colour::ALL.len() * self.num_boards();
        let total: usize = state.iter().map(Vec::len).sum();
        if total != expected {
            return Err(GameError::new(
                ErrorKind::IllegalValue,
                format!("expected {expected} pieces, got {total}"),
            ));
        }

        for (board, pieces) in self.boards.iter_mut().zip(state) {
            board.replace_state(pieces);
        }
        Ok(())
    }

    fn to_absolute(&self, mut ps: PieceState, z: usize) -> PieceState {
        if ps.position != JUMPED {
            ps.position = self.absolute_position(ps.position, z);
        }
        ps
    }

    fn position_check(
        &self,
        colour: Colour,
        number: u32,
        to_position: Position,
    ) -> Result<(), GameError> {
        let bound = self.rules.square_count() * self.num_boards() as i32;
        let in_range = to_position >= 0 && to_position < bound;
        if !in_range
            || !self
                .rules
                .is_valid_position(self.relative_position(to_position, self.board_index(to_position)))
        {
            return Err(GameError::for_move(
                ErrorKind::IllegalValue,
                colour,
                number,
                to_position,
                format!("to position {to_position} is not valid"),
            ));
        }
        Ok(())
    }

    /// The board and arena index currently holding `(colour, number)`.
    fn locate(&self, colour: Colour, number: u32) -> Option<(usize, usize)> {
        self.boards
            .iter()
            .enumerate()
            .find_map(|(z, b)| b.arena_index(colour, number).map(|idx| (z, idx)))
    }

    /// Executes a cross-board step or jump. Returns whether it was a jump.
    fn move_across_boards(
        &mut self,
        colour: Colour,
        number: u32,
        to_position: Position,
        from_z: usize,
        to_z: usize,
    ) -> Result<bool, GameError> {
        let dz = from_z.abs_diff(to_z) as i32;
        if dz > 2 {
            return Err(GameError::for_move(
                ErrorKind::IllegalMove,
                colour,
                number,
                to_position,
                format!("cannot move to {to_position} as it is across {dz} boards"),
            ));
        }

        let rel_to = self.relative_position(to_position, to_z);
        let to_xy = self.rules.coord_of(rel_to);

        if let Some(occupant) = self.boards[to_z].colour_at(to_xy.x, to_xy.y) {
            return Err(GameError::for_move(
                ErrorKind::IllegalMove,
                colour,
                number,
                to_position,
                format!("a {occupant} piece already occupies position {to_position}"),
            ));
        }

        let (from_pos, kinged) = {
            // Caller has already located and vetted the piece.
            let idx = match self.boards[from_z].arena_index(colour, number) {
                Some(idx) => idx,
                None => {
                    return Err(GameError::for_move(
                        ErrorKind::IllegalState,
                        colour,
                        number,
                        to_position,
                        format!("piece {colour}-{number} not found on board {from_z}"),
                    ))
                }
            };
            let piece = self.boards[from_z].piece(idx);
            (piece.position(), piece.is_kinged())
        };
        let from_xy = self.rules.coord_of(from_pos);
        let delta = to_xy - from_xy;

        let planar_ok =
            (delta.x == 0 && delta.y == 0) || (delta.x.abs() == dz && delta.y.abs() == dz);
        if !planar_ok {
            return Err(GameError::for_move(
                ErrorKind::IllegalMove,
                colour,
                number,
                to_position,
                format!("illegal cross-board move: {colour}-{number} to {to_position}"),
            ));
        }

        if delta.y != 0 && !kinged && delta.y.signum() != self.rules.forward_dy(colour) {
            return Err(GameError::for_move(
                ErrorKind::IllegalMove,
                colour,
                number,
                to_position,
                format!("cannot move {colour}-{number} backwards to {to_position}"),
            ));
        }

        if dz == 2 {
            let mid_z = split_diff(from_z as i32, to_z as i32) as usize;
            let mid = from_xy.midpoint(to_xy);
            match self.boards[mid_z].colour_at(mid.x, mid.y) {
                None => {
                    return Err(GameError::for_move(
                        ErrorKind::IllegalJump,
                        colour,
                        number,
                        to_position,
                        format!("no piece on board {mid_z} at {}:{} to jump", mid.x, mid.y),
                    ))
                }
                Some(over) if over == colour => {
                    return Err(GameError::for_move(
                        ErrorKind::IllegalJump,
                        colour,
                        number,
                        to_position,
                        "cannot jump over one's own piece".to_string(),
                    ))
                }
                Some(_) => self.boards[mid_z].capture_at(mid.x, mid.y),
            }
        }

        // Splice the piece between the two boards.
        let mut piece = match self.boards[from_z].remove_piece(colour, number) {
            Some(piece) => piece,
            None => {
                return Err(GameError::for_move(
                    ErrorKind::IllegalState,
                    colour,
                    number,
                    to_position,
                    format!("piece {colour}-{number} vanished from board {from_z}"),
                ))
            }
        };
        piece.set_position(&self.rules, rel_to)?;
        if self.rules.is_kingable(&piece) {
            piece.set_kinged(true);
        }
        self.boards[to_z].insert_piece(piece);

        Ok(dz == 2)
    }

    /// True if the moved piece still has a jump available, on its own board
    /// or across boards.
    fn can_jump_anywhere(&self, colour: Colour, number: u32) -> bool {
        let (z, idx) = match self.locate(colour, number) {
            Some(found) => found,
            None => return false,
        };

        if self.boards[z].can_jump_piece(idx) {
            return true;
        }

        self.can_cross_jump(z, self.boards[z].piece(idx))
    }

    fn can_cross_board(&self, z: usize, piece: &Piece) -> bool {
        if piece.is_jumped() {
            return false;
        }
        self.can_cross_step(z, piece) || self.can_cross_jump(z, piece)
    }

    fn can_cross_step(&self, z: usize, piece: &Piece) -> bool {
        self.has_cross_destination(z, piece, 1)
    }

    fn can_cross_jump(&self, z: usize, piece: &Piece) -> bool {
        self.has_cross_destination(z, piece, 2)
    }

    /// Scans the boards `factor` away for a legal cross-board destination:
    /// straight z-translations and the diagonal variants, honouring the
    /// piece's allowed row directions, with the capture requirement when
    /// `factor` is 2.
    fn has_cross_destination(&self, z: usize, piece: &Piece, factor: i32) -> bool {
        let at = self.rules.coord_of(piece.position());
        let colour = piece.colour();

        let dys: Vec<i32> = if piece.is_kinged() {
            vec![1, -1]
        } else {
            vec![self.rules.forward_dy(colour)]
        };
        let mut deltas: Vec<Coord> = vec![Coord::new(0, 0)];
        for dy in dys {
            deltas.push(Coord::new(factor, dy * factor));
            deltas.push(Coord::new(-factor, dy * factor));
        }

        for dz in [factor, -factor] {
            let to_z = z as i32 + dz;
            if to_z < 0 || to_z >= self.num_boards() as i32 {
                continue;
            }
            let to_z = to_z as usize;
            let mid_z = z as i32 + dz / 2;

            for delta in &deltas {
                let to = at + *delta;
                if !self.in_bounds(to) {
                    continue;
                }
                if self.boards[to_z].colour_at(to.x, to.y).is_some() {
                    continue;
                }
                if factor == 1 {
                    return true;
                }
                let mid = at.midpoint(to);
                match self.boards[mid_z as usize].colour_at(mid.x, mid.y) {
                    Some(over) if over != colour => return true,
                    _ => continue,
                }
            }
        }

        false
    }

    fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0
            && coord.x < self.rules.board_width()
            && coord.y >= 0
            && coord.y < self.rules.board_height()
    }

    fn end_of_game_check(&mut self, mover: Colour) {
        let others_in_play = Colour::ALL
            .into_iter()
            .filter(|c| *c != mover)
            .any(|c| self.can_move(c));
        if others_in_play {
            return;
        }

        for board in &mut self.boards {
            board.finish_with(Some(mover));
        }
        self.game_state = GameState::Finished;
        self.end_time = Some(SystemTime::now());
        debug!("multi-board game {}: won by {mover}", self.game_id);
    }
}
