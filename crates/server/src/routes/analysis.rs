use axum::{Extension, Json};
use chess_core::Side;
use puzzle_worker::analyzer::{self, GameAnalysis};
use puzzle_worker::error::WorkerError;
use puzzle_worker::puzzle::PuzzleSet;
use puzzle_worker::stockfish::EnginePool;
use serde::Deserialize;

use crate::config::Config;
use crate::error::AppError;

/// A game to analyze: either PGN text or a SAN move list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRequest {
    pub pgn: Option<String>,
    pub moves: Option<Vec<String>>,
    /// Only report this side's mistakes
    pub player_color: Option<Side>,
}

impl GameRequest {
    fn into_moves(self) -> Result<Vec<String>, AppError> {
        if let Some(moves) = self.moves {
            return Ok(moves);
        }
        match self.pgn.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(pgn) => {
                let game = chess_core::pgn::parse_pgn(pgn).map_err(WorkerError::from)?;
                Ok(game.moves)
            }
            None => Err(AppError::BadRequest("PGN is required".to_string())),
        }
    }
}

/// POST /api/analyze
pub async fn analyze_game(
    Extension(engines): Extension<EnginePool>,
    Extension(config): Extension<Config>,
    Json(req): Json<GameRequest>,
) -> Result<Json<GameAnalysis>, AppError> {
    let options = config.worker.analysis_options().with_side(req.player_color);
    let moves = req.into_moves()?;

    let report = analyzer::analyze_game(&engines, &moves, &options).await?;
    Ok(Json(report))
}

/// POST /api/puzzles
pub async fn generate_puzzles(
    Extension(engines): Extension<EnginePool>,
    Extension(config): Extension<Config>,
    Json(req): Json<GameRequest>,
) -> Result<Json<PuzzleSet>, AppError> {
    let options = config.worker.analysis_options().with_side(req.player_color);
    let moves = req.into_moves()?;

    let puzzles = analyzer::generate_puzzles(&engines, &moves, &options).await?;
    Ok(Json(puzzles))
}
