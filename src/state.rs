use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, GameError};
use crate::piece::{Colour, Piece, Position};

/// The externally visible state of one piece.
///
/// Position `-1` denotes captured/out-of-play. Hosts define their own wire
/// encoding of these snapshots.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PieceState {
    pub colour: Colour,
    pub number: u32,
    pub position: Position,
    pub kinged: bool,
}

impl From<&Piece> for PieceState {
    fn from(piece: &Piece) -> Self {
        Self {
            colour: piece.colour(),
            number: piece.number(),
            position: piece.position(),
            kinged: piece.is_kinged(),
        }
    }
}

/// The entries of `next` whose position or kinged flag differs from
/// `previous`, matched by `(colour, number)`.
///
/// The two snapshots must describe the same piece universe; an entry of
/// `next` with no counterpart in `previous` is an integrity error, not a
/// silent skip.
pub fn diff(previous: &[PieceState], next: &[PieceState]) -> Result<Vec<PieceState>, GameError> {
    let mut changed = Vec::new();

    for entry in next {
        let old = previous
            .iter()
            .find(|o| o.colour == entry.colour && o.number == entry.number)
            .ok_or_else(|| {
                GameError::new(
                    ErrorKind::IllegalState,
                    format!(
                        "snapshot mismatch: no previous entry for {}-{}",
                        entry.colour, entry.number
                    ),
                )
            })?;

        if old.position != entry.position || old.kinged != entry.kinged {
            changed.push(*entry);
        }
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ps(colour: Colour, number: u32, position: Position, kinged: bool) -> PieceState {
        PieceState {
            colour,
            number,
            position,
            kinged,
        }
    }

    #[test]
    fn diff_reports_position_and_king_changes_only() {
        let old = vec![
            ps(Colour::White, 1, 17, false),
            ps(Colour::White, 2, 19, false),
            ps(Colour::Black, 1, 40, false),
        ];
        let new = vec![
            ps(Colour::White, 1, 24, false),
            ps(Colour::White, 2, 19, false),
            ps(Colour::Black, 1, 40, true),
        ];

        let d = diff(&old, &new).unwrap();
        assert_eq!(d.len(), 2);
        assert!(d.contains(&ps(Colour::White, 1, 24, false)));
        assert!(d.contains(&ps(Colour::Black, 1, 40, true)));
    }

    #[test]
    fn diff_rejects_universe_mismatch() {
        let old = vec![ps(Colour::White, 1, 17, false)];
        let new = vec![ps(Colour::White, 2, 19, false)];

        let err = diff(&old, &new).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalState);
    }
}
