//! Chess rules adapter and PGN reading shared by the worker and the server.

pub mod error;
pub mod game_data;
pub mod pgn;
pub mod position;

pub use error::{PgnError, RulesError};
pub use position::{GamePosition, GameStatus, LegalMove, Side};
