//! A turn-based rules engine for checkers-family board games: arbitrary even
//! board dimensions, single-board and stacked multi-board play, pluggable
//! rule values.
//!
//! A host drives a game through [`game::Game`] (or [`multi::MultiBoardGame`])
//! with `begin_turn` / `move_piece` / `end_turn` and inspects the resulting
//! [`state::PieceState`] snapshots. Each game instance is single-threaded;
//! embedding hosts serialize access.

pub mod board;
pub mod coord;
pub mod error;
pub mod game;
pub mod multi;
pub mod piece;
pub mod record;
pub mod rules;
pub mod state;
