use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::piece::{Colour, Position};

/// Classification of a rejected operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A supplied position or piece number is outside the rules' domain.
    IllegalValue,
    /// Wrong direction, occupied destination, or a delta that is neither a
    /// step nor a jump.
    IllegalMove,
    /// A jump over an empty square or over a same-colour piece.
    IllegalJump,
    /// A turn-ownership violation: another colour holds the move lock, or a
    /// colour tried to move twice in a row.
    OutOfTurn,
    /// An operation attempted in the wrong lifecycle state, or a failed
    /// piece/colour lookup.
    IllegalState,
}

/// A rejected game operation.
///
/// Every validation failure is surfaced synchronously as one of these; a
/// rejected move leaves the game unchanged apart from the move-log entry
/// written before validation.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct GameError {
    pub kind: ErrorKind,
    pub colour: Option<Colour>,
    pub number: Option<u32>,
    pub to_position: Option<Position>,
    pub message: String,
}

impl GameError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            colour: None,
            number: None,
            to_position: None,
            message: message.into(),
        }
    }

    /// An error annotated with the move that provoked it.
    pub fn for_move(
        kind: ErrorKind,
        colour: Colour,
        number: u32,
        to_position: Position,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            colour: Some(colour),
            number: Some(number),
            to_position: Some(to_position),
            message: message.into(),
        }
    }
}
