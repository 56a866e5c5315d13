use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, GameError};
use crate::rules::Rules;

/// A square identifier, unique per board: left-to-right, top-to-bottom,
/// starting at 0. `JUMPED` marks a captured piece, out of play.
pub type Position = i32;

/// The reserved position of a captured piece.
pub const JUMPED: Position = -1;

/// A side in a two-player game.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Colour {
    White,
    Black,
}

impl Colour {
    pub const ALL: [Colour; 2] = [Colour::White, Colour::Black];

    #[inline]
    pub fn other(self) -> Self {
        match self {
            Colour::White => Colour::Black,
            Colour::Black => Colour::White,
        }
    }

    /// Stable index for per-colour tables.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Colour::White => 0,
            Colour::Black => 1,
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Colour::White => write!(f, "WHITE"),
            Colour::Black => write!(f, "BLACK"),
        }
    }
}

impl TryFrom<i64> for Colour {
    type Error = GameError;

    fn try_from(value: i64) -> Result<Self, GameError> {
        match value {
            0 => Ok(Colour::White),
            1 => Ok(Colour::Black),
            other => Err(GameError::new(
                ErrorKind::IllegalValue,
                format!("illegal piece colour {other}, must be 0 (WHITE) or 1 (BLACK)"),
            )),
        }
    }
}

/// A piece and its current state.
///
/// Identity is the `(colour, number)` pair, fixed for the lifetime of a game.
/// `order` is the per-board, per-colour creation rank used to derive the
/// start position; in a single-board game it equals `number`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    colour: Colour,
    number: u32,
    order: u32,
    position: Position,
    kinged: bool,
}

impl Piece {
    /// A piece at its rule-assigned start position.
    pub fn new(rules: &Rules, colour: Colour, number: u32, order: u32) -> Result<Self, GameError> {
        if number == 0 {
            return Err(GameError::new(
                ErrorKind::IllegalValue,
                "piece numbers are 1-based",
            ));
        }
        let position = rules.start_position(colour, order)?;
        Ok(Self {
            colour,
            number,
            order,
            position,
            kinged: false,
        })
    }

    #[inline]
    pub fn colour(&self) -> Colour {
        self.colour
    }

    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[inline]
    pub fn order(&self) -> u32 {
        self.order
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn is_kinged(&self) -> bool {
        self.kinged
    }

    pub fn set_kinged(&mut self, kinged: bool) {
        self.kinged = kinged;
    }

    /// Moves the piece, rejecting positions outside the rules' domain.
    pub fn set_position(&mut self, rules: &Rules, position: Position) -> Result<(), GameError> {
        if !rules.is_valid_position(position) {
            return Err(GameError::for_move(
                ErrorKind::IllegalValue,
                self.colour,
                self.number,
                position,
                format!("illegal position {position} for {self}"),
            ));
        }
        self.position = position;
        Ok(())
    }

    /// Takes the piece out of play. Irreversible within a game.
    pub fn jumped(&mut self) {
        self.position = JUMPED;
    }

    #[inline]
    pub fn is_jumped(&self) -> bool {
        self.position == JUMPED
    }

    /// Direction validity only; see [`Rules::direction_check`].
    pub fn direction_check(&self, rules: &Rules, to_position: Position) -> Result<bool, GameError> {
        rules.direction_check(self, to_position)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_jumped() {
            write!(f, "{}-{} jumped", self.colour, self.number)
        } else {
            write!(f, "{}-{} at position {}", self.colour, self.number, self.position)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_conversions() {
        assert_eq!(Colour::White.other(), Colour::Black);
        assert_eq!(Colour::try_from(0_i64).unwrap(), Colour::White);
        assert_eq!(Colour::try_from(1_i64).unwrap(), Colour::Black);
        assert_eq!(Colour::try_from(2_i64).unwrap_err().kind, ErrorKind::IllegalValue);
        assert_eq!(Colour::Black.to_string(), "BLACK");
    }

    #[test]
    fn position_mutation_is_validated() {
        let rules = Rules::standard();
        let mut piece = Piece::new(&rules, Colour::White, 3, 3).unwrap();
        assert_eq!(piece.position(), 5);

        let err = piece.set_position(&rules, 4).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalValue);
        assert_eq!(piece.position(), 5);

        piece.set_position(&rules, 12).unwrap();
        assert_eq!(piece.to_string(), "WHITE-3 at position 12");

        piece.jumped();
        assert!(piece.is_jumped());
        assert_eq!(piece.to_string(), "WHITE-3 jumped");
    }

    #[test]
    fn numbers_are_one_based() {
        let rules = Rules::standard();
        let err = Piece::new(&rules, Colour::White, 0, 1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalValue);
    }
}
