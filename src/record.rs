use serde::{Deserialize, Serialize};

use crate::piece::{Colour, Position};

/// One attempted move, as supplied by the caller.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub game_id: i64,
    pub colour: Colour,
    pub number: u32,
    pub to_position: Position,
}

/// Append-only move log.
///
/// Games record to it before validating, so rejected moves appear here too.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    moves: Vec<MoveRecord>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, game_id: i64, colour: Colour, number: u32, to_position: Position) {
        self.moves.push(MoveRecord {
            game_id,
            colour,
            number,
            to_position,
        });
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }
}
