use axum::{extract::Path, extract::Query, Extension, Json};
use chrono::Datelike;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::clients::chess_com::{ChessComClient, ChessComError};
use crate::error::AppError;

#[derive(Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/games/{username}?year=2025&month=3
///
/// Defaults to the current (UTC) month.
pub async fn get_user_games(
    Extension(client): Extension<ChessComClient>,
    Path(username): Path<String>,
    Query(q): Query<MonthQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let now = chrono::Utc::now();
    let year = q.year.unwrap_or(now.year());
    let month = q.month.unwrap_or(now.month());
    if !(1..=12).contains(&month) {
        return Err(AppError::BadRequest(format!("Invalid month: {month}")));
    }

    let games = client
        .fetch_month_games(&username, year, month)
        .await
        .map_err(|e| match e {
            ChessComError::PlayerNotFound(_) => AppError::NotFound(e.to_string()),
            other => AppError::Upstream(other.to_string()),
        })?;

    tracing::info!(%username, year, month, games = games.len(), "Fetched game archive");

    Ok(Json(serde_json::json!({
        "username": username,
        "gamesCount": games.len(),
        "games": games,
    })))
}
