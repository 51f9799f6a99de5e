//! Worker error types

use std::time::Duration;

use chess_core::{PgnError, RulesError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid move sequence at index {index} ({san}): {reason}")]
    InvalidMoveSequence {
        index: usize,
        san: String,
        reason: RulesError,
    },

    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Engine timed out after {timeout:?} evaluating {fen}")]
    EngineTimeout { fen: String, timeout: Duration },

    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),

    #[error("PGN error: {0}")]
    Pgn(#[from] PgnError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    /// Engine-level failures; the whole request fails on these
    pub fn is_engine_failure(&self) -> bool {
        matches!(
            self,
            WorkerError::EngineUnavailable(_) | WorkerError::EngineTimeout { .. }
        )
    }
}
