use crate::coord::Coord;
use crate::error::{ErrorKind, GameError};
use crate::piece::{Colour, Piece, Position, JUMPED};

/// Standard board width.
pub const STD_WIDTH: i32 = 8;

/// Standard board height.
pub const STD_HEIGHT: i32 = 8;

/// Board geometry and movement legality policy for one game variant.
///
/// White pieces are initially placed on the top half of the board, black on
/// the bottom. Pieces are positioned sequentially by creation order, left to
/// right and top to bottom. Squares are numbered from zero, left to right and
/// top to bottom; pieces sit only on alternating squares (even rows hold odd
/// square indices and vice versa).
///
/// Immutable after construction; a game holds one `Rules` value for its whole
/// lifetime. Positions decompose as `y = pos / width`, `x = pos % width`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rules {
    width: i32,
    height: i32,
    piece_count: u32,
}

impl Rules {
    /// Rules for the standard 8x8 board, 12 pieces per colour.
    pub fn standard() -> Self {
        match Self::new(STD_WIDTH, STD_HEIGHT) {
            Ok(rules) => rules,
            // 8x8 always satisfies the dimension constraints.
            Err(_) => unreachable!(),
        }
    }

    /// Rules for a board of the given dimensions. Width and height must be
    /// even and greater than 2; every row but the two centre rows is filled
    /// at the start of play.
    pub fn new(width: i32, height: i32) -> Result<Self, GameError> {
        if width <= 2 || width % 2 != 0 || height <= 2 || height % 2 != 0 {
            return Err(GameError::new(
                ErrorKind::IllegalValue,
                format!("board dimensions {width}x{height} must be even and > 2"),
            ));
        }
        let piece_count = (width / 2) * ((height - 2) / 2);
        Ok(Self {
            width,
            height,
            piece_count: piece_count as u32,
        })
    }

    #[inline]
    pub fn board_width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn board_height(&self) -> i32 {
        self.height
    }

    /// Pieces per colour per board.
    #[inline]
    pub fn piece_count(&self) -> u32 {
        self.piece_count
    }

    /// Squares per board.
    #[inline]
    pub fn square_count(&self) -> i32 {
        self.width * self.height
    }

    /// True for the out-of-play sentinel and for in-bounds squares of the
    /// playable colour (checkerboard parity).
    pub fn is_valid_position(&self, position: Position) -> bool {
        if position == JUMPED {
            return true;
        }
        if position < 0 || position >= self.square_count() {
            return false;
        }
        let even_row = self.y_of(position) % 2 == 0;
        let even_pos = position % 2 == 0;
        if even_row {
            !even_pos
        } else {
            even_pos
        }
    }

    /// True iff `order` can index a piece of one colour on one board.
    #[inline]
    pub fn is_valid_piece_order(&self, order: u32) -> bool {
        order >= 1 && order <= self.piece_count
    }

    /// The deterministic start square for the piece of `colour` with the
    /// given creation order: white fills the top rows, black the bottom,
    /// left to right and top to bottom.
    pub fn start_position(&self, colour: Colour, order: u32) -> Result<Position, GameError> {
        if !self.is_valid_piece_order(order) {
            return Err(GameError::new(
                ErrorKind::IllegalValue,
                format!(
                    "piece order {order} out of range 1..={} for {colour}",
                    self.piece_count
                ),
            ));
        }

        let ppr = self.width / 2;
        let factor = match colour {
            Colour::White => 0,
            Colour::Black => self.height / 2 + 1,
        };

        let row = (order as i32 - 1) / ppr + factor;
        let idx = (order as i32 - 1) % ppr;

        Ok(self.to_position(row, idx))
    }

    /// The square for playable-slot `idx` of `row`.
    fn to_position(&self, row: i32, idx: i32) -> Position {
        let offset = if row % 2 == 0 { 1 } else { 0 };
        row * self.width + idx * 2 + offset
    }

    /// True if the piece may travel towards `to_position`, judged by position
    /// ordering only: white moves towards increasing positions, black towards
    /// decreasing, kings both ways. Asking about the piece's own square is an
    /// error.
    pub fn direction_check(&self, piece: &Piece, to_position: Position) -> Result<bool, GameError> {
        if piece.position() == to_position {
            return Err(GameError::for_move(
                ErrorKind::IllegalValue,
                piece.colour(),
                piece.number(),
                to_position,
                format!("{piece} is already at position {to_position}"),
            ));
        }

        if piece.is_kinged() {
            return Ok(true);
        }

        Ok(match piece.colour() {
            Colour::White => to_position > piece.position(),
            Colour::Black => to_position < piece.position(),
        })
    }

    /// The row delta of a forward move for `colour`.
    #[inline]
    pub fn forward_dy(&self, colour: Colour) -> i32 {
        match colour {
            Colour::White => 1,
            Colour::Black => -1,
        }
    }

    /// True when an un-kinged piece has reached the opponent's home row.
    pub fn is_kingable(&self, piece: &Piece) -> bool {
        if piece.is_kinged() || piece.is_jumped() {
            return false;
        }

        match piece.colour() {
            Colour::Black => piece.position() < self.width,
            Colour::White => piece.position() >= self.square_count() - self.width,
        }
    }

    #[inline]
    pub fn x_of(&self, position: Position) -> i32 {
        position % self.width
    }

    #[inline]
    pub fn y_of(&self, position: Position) -> i32 {
        position / self.width
    }

    #[inline]
    pub fn coord_of(&self, position: Position) -> Coord {
        Coord::new(self.x_of(position), self.y_of(position))
    }

    #[inline]
    pub fn position_of(&self, coord: Coord) -> Position {
        coord.y * self.width + coord.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_odd_or_tiny_dimensions() {
        assert!(Rules::new(7, 8).is_err());
        assert!(Rules::new(8, 7).is_err());
        assert!(Rules::new(2, 8).is_err());
        assert!(Rules::new(8, 2).is_err());
        assert!(Rules::new(4, 4).is_ok());
    }

    #[test]
    fn standard_piece_count() {
        assert_eq!(Rules::standard().piece_count(), 12);
        assert_eq!(Rules::new(10, 10).unwrap().piece_count(), 20);
        assert_eq!(Rules::new(4, 4).unwrap().piece_count(), 2);
    }

    #[test]
    fn position_parity() {
        let rules = Rules::standard();
        assert!(rules.is_valid_position(JUMPED));
        assert!(!rules.is_valid_position(-2));
        assert!(!rules.is_valid_position(64));

        // Row 0 holds odd squares, row 1 even squares.
        assert!(rules.is_valid_position(1));
        assert!(!rules.is_valid_position(0));
        assert!(rules.is_valid_position(8));
        assert!(!rules.is_valid_position(9));

        for pos in 0..64 {
            let playable = (rules.y_of(pos) + pos) % 2 == 1;
            assert_eq!(rules.is_valid_position(pos), playable, "position {pos}");
        }
    }

    #[test]
    fn start_positions_fill_halves() {
        let rules = Rules::standard();
        assert_eq!(rules.start_position(Colour::White, 1).unwrap(), 1);
        assert_eq!(rules.start_position(Colour::White, 4).unwrap(), 7);
        assert_eq!(rules.start_position(Colour::White, 5).unwrap(), 8);
        assert_eq!(rules.start_position(Colour::White, 9).unwrap(), 17);
        assert_eq!(rules.start_position(Colour::White, 12).unwrap(), 23);
        assert_eq!(rules.start_position(Colour::Black, 1).unwrap(), 40);
        assert_eq!(rules.start_position(Colour::Black, 12).unwrap(), 62);
        assert!(rules.start_position(Colour::White, 0).is_err());
        assert!(rules.start_position(Colour::White, 13).is_err());
    }

    #[test]
    fn king_thresholds() {
        let rules = Rules::standard();
        let mut white = Piece::new(&rules, Colour::White, 1, 1).unwrap();
        assert!(!rules.is_kingable(&white));
        // Row 7 holds even squares; 58 is on white's kinging row.
        white.set_position(&rules, 58).unwrap();
        assert!(rules.is_kingable(&white));
        white.set_kinged(true);
        assert!(!rules.is_kingable(&white));

        let mut black = Piece::new(&rules, Colour::Black, 1, 1).unwrap();
        assert!(!rules.is_kingable(&black));
        // Row 0 holds odd squares; 5 is on black's kinging row.
        black.set_position(&rules, 5).unwrap();
        assert!(rules.is_kingable(&black));
        black.jumped();
        assert!(!rules.is_kingable(&black));
    }

    #[test]
    fn coordinate_round_trip() {
        let rules = Rules::new(10, 8).unwrap();
        for pos in 0..rules.square_count() {
            assert_eq!(rules.position_of(rules.coord_of(pos)), pos);
        }
        assert_eq!(rules.x_of(17), 7);
        assert_eq!(rules.y_of(17), 1);
    }
}
