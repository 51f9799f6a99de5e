use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("Invalid FEN {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Unreadable move {0:?}")]
    InvalidSan(String),

    #[error("Illegal move {san} in position {fen}")]
    IllegalMove { san: String, fen: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PgnError {
    #[error("Game does not start from the standard position")]
    NonStandardStart,

    #[error("PGN contains no moves")]
    NoMoves,
}
