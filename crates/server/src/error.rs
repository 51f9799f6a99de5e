use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use puzzle_worker::error::WorkerError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Upstream(String),

    #[error(transparent)]
    Worker(#[from] WorkerError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Upstream(msg) => {
                tracing::warn!("Game history request failed: {msg}");
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Worker(e) => match e {
                WorkerError::InvalidMoveSequence { .. }
                | WorkerError::Rules(_)
                | WorkerError::Pgn(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                WorkerError::EngineUnavailable(_) => {
                    tracing::error!("Engine error: {e}");
                    (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
                }
                WorkerError::EngineTimeout { .. } => {
                    tracing::error!("Engine error: {e}");
                    (StatusCode::GATEWAY_TIMEOUT, e.to_string())
                }
                WorkerError::Config(_) | WorkerError::Json(_) | WorkerError::Io(_) => {
                    tracing::error!("Internal error: {e}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
                }
            },
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let timeout = AppError::from(WorkerError::EngineTimeout {
            fen: "8/8/8/8/8/8/8/8 w - - 0 1".into(),
            timeout: Duration::from_secs(1),
        });
        assert_eq!(timeout.into_response().status(), StatusCode::GATEWAY_TIMEOUT);

        let unavailable = AppError::from(WorkerError::EngineUnavailable("gone".into()));
        assert_eq!(unavailable.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        let bad = AppError::from(WorkerError::Pgn(chess_core::PgnError::NoMoves));
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
