//! Move-quality evaluation and puzzle generation.
//!
//! Replays a game, scores every position with a UCI engine, classifies each
//! move by centipawn loss and turns the bad ones into "find a better move"
//! puzzles.

pub use chess_core;

pub mod analysis;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod puzzle;
pub mod replay;
pub mod stockfish;
