use crate::coord::{split_diff, Coord};
use crate::piece::Piece;

/// Occupancy grid for one board.
///
/// Squares hold indices into the owning game's piece arena rather than piece
/// references; the game keeps the grid and the arena in sync. Mutation here
/// is a direct write with no cross-checking.
#[derive(Clone, Debug)]
pub struct Board {
    width: i32,
    height: i32,
    squares: Vec<Option<usize>>,
}

impl Board {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            squares: vec![None; (width * height) as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Empties every square.
    pub fn reset(&mut self) {
        self.squares.fill(None);
    }

    /// The arena index of the piece on `(x, y)`, if any. Out-of-bounds
    /// squares read as empty.
    pub fn piece_at(&self, x: i32, y: i32) -> Option<usize> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.squares[(y * self.width + x) as usize]
    }

    /// Writes the occupant of `(x, y)`.
    pub fn set(&mut self, x: i32, y: i32, piece: Option<usize>) {
        debug_assert!(self.in_bounds(x, y));
        self.squares[(y * self.width + x) as usize] = piece;
    }

    /// True if the piece on `(x, y)` has a simple diagonal step available in
    /// the given row direction.
    pub fn can_move(&self, forward: bool, x: i32, y: i32) -> bool {
        let to_y = if forward { y + 1 } else { y - 1 };
        self.step_free(x + 1, to_y) || self.step_free(x - 1, to_y)
    }

    /// True if the piece on `(x, y)` has a jump available in the given row
    /// direction: a free landing square two steps away diagonally with an
    /// opposing piece in between.
    pub fn can_jump(&self, pieces: &[Piece], forward: bool, x: i32, y: i32) -> bool {
        self.jump_free(pieces, x, y, x + 2, forward) || self.jump_free(pieces, x, y, x - 2, forward)
    }

    pub fn can_move_or_jump(&self, pieces: &[Piece], forward: bool, x: i32, y: i32) -> bool {
        self.can_move(forward, x, y) || self.can_jump(pieces, forward, x, y)
    }

    fn step_free(&self, to_x: i32, to_y: i32) -> bool {
        self.in_bounds(to_x, to_y) && self.piece_at(to_x, to_y).is_none()
    }

    fn jump_free(&self, pieces: &[Piece], x: i32, y: i32, to_x: i32, forward: bool) -> bool {
        let to_y = if forward { y + 2 } else { y - 2 };

        if !self.in_bounds(to_x, to_y) || self.piece_at(to_x, to_y).is_some() {
            return false;
        }

        let mid = Coord::new(split_diff(x, to_x), split_diff(y, to_y));
        let (own, over) = match (self.piece_at(x, y), self.piece_at(mid.x, mid.y)) {
            (Some(own), Some(over)) => (own, over),
            _ => return false,
        };

        pieces[own].colour() != pieces[over].colour()
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Colour;
    use crate::rules::Rules;

    fn pieces(rules: &Rules) -> Vec<Piece> {
        vec![
            Piece::new(rules, Colour::White, 1, 1).unwrap(),
            Piece::new(rules, Colour::Black, 1, 1).unwrap(),
            Piece::new(rules, Colour::White, 2, 2).unwrap(),
        ]
    }

    #[test]
    fn empty_board_allows_steps_in_bounds_only() {
        let board = Board::new(8, 8);
        assert!(board.can_move(true, 1, 0));
        assert!(board.can_move(false, 1, 1));
        // Back row, backwards: off the board.
        assert!(!board.can_move(false, 1, 0));
        // Corner forward from the last row.
        assert!(!board.can_move(true, 0, 7));
    }

    #[test]
    fn jump_requires_an_opposing_piece_between() {
        let rules = Rules::standard();
        let arena = pieces(&rules);
        let mut board = Board::new(8, 8);

        board.set(1, 2, Some(0)); // white
        assert!(!board.can_jump(&arena, true, 1, 2));

        board.set(2, 3, Some(1)); // black in the way
        assert!(board.can_jump(&arena, true, 1, 2));

        // Landing square occupied.
        board.set(3, 4, Some(2));
        assert!(!board.can_jump(&arena, true, 1, 2));

        // Same-colour piece in the way on the other diagonal.
        board.set(3, 4, None);
        board.set(2, 3, Some(2));
        assert!(!board.can_jump(&arena, true, 1, 2));
    }

    #[test]
    fn reset_clears_occupancy() {
        let mut board = Board::new(4, 4);
        board.set(1, 0, Some(0));
        assert_eq!(board.piece_at(1, 0), Some(0));
        board.reset();
        assert_eq!(board.piece_at(1, 0), None);
        assert_eq!(board.piece_at(-1, 0), None);
    }
}
