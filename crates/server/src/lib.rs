//! HTTP surface for puzzle generation.

pub mod clients;
pub mod config;
pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use puzzle_worker::stockfish::EnginePool;
use tower_http::cors::{Any, CorsLayer};

use crate::clients::chess_com::ChessComClient;
use crate::config::Config;

/// Build the router. The engine pool is shared by every request, so its
/// process ceiling holds server-wide.
pub fn app(config: Config, engines: EnginePool, chess_com: ChessComClient) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health::health_check))
        .route("/api/games/{username}", get(routes::games::get_user_games))
        .route("/api/analyze", post(routes::analysis::analyze_game))
        .route("/api/puzzles", post(routes::analysis::generate_puzzles))
        .layer(Extension(engines))
        .layer(Extension(config))
        .layer(Extension(chess_com))
        .layer(cors)
}
