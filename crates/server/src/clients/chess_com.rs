use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ChessComError {
    #[error("Player {0} not found on Chess.com")]
    PlayerNotFound(String),

    #[error("Chess.com request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Chess.com returned HTTP {0}")]
    Status(StatusCode),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerResult {
    pub username: String,
    pub rating: Option<i32>,
    pub result: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Accuracies {
    pub white: Option<f64>,
    pub black: Option<f64>,
}

/// One game from a monthly archive. Read in Chess.com's snake_case,
/// written back out in camelCase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ArchivedGame {
    pub url: Option<String>,
    pub pgn: Option<String>,
    pub time_class: Option<String>,
    pub time_control: Option<String>,
    pub end_time: Option<i64>,
    pub rated: Option<bool>,
    #[serde(default)]
    pub rules: Option<String>,
    #[serde(default)]
    pub white: PlayerResult,
    #[serde(default)]
    pub black: PlayerResult,
    pub accuracies: Option<Accuracies>,
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    #[serde(default)]
    games: Vec<ArchivedGame>,
}

#[derive(Debug, Clone)]
pub struct ChessComClient {
    client: Client,
    base_url: String,
}

impl ChessComClient {
    pub fn new(base_url: &str) -> Result<Self, ChessComError> {
        let client = Client::builder()
            .user_agent("BlunderPuzzles/1.0")
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one month of a player's games. Variant games are dropped since
    /// they can't be replayed with standard rules.
    pub async fn fetch_month_games(
        &self,
        username: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<ArchivedGame>, ChessComError> {
        let url = format!(
            "{}/player/{}/games/{}/{:02}",
            self.base_url,
            username.to_lowercase(),
            year,
            month
        );

        // Rate limit
        tokio::time::sleep(Duration::from_millis(100)).await;

        let resp = self.client.get(&url).send().await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ChessComError::PlayerNotFound(username.to_string()));
        }
        if !resp.status().is_success() {
            return Err(ChessComError::Status(resp.status()));
        }

        let data: ArchiveResponse = resp.json().await?;

        Ok(data
            .games
            .into_iter()
            .filter(|game| game.rules.as_deref().unwrap_or("chess") == "chess")
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_game_deserializes() {
        let raw = r#"{
            "games": [{
                "url": "https://www.chess.com/game/live/1",
                "pgn": "1. e4 e5 *",
                "time_class": "blitz",
                "time_control": "180",
                "end_time": 1700000000,
                "rated": true,
                "rules": "chess",
                "white": {"username": "alice", "rating": 1500, "result": "win"},
                "black": {"username": "bob", "rating": 1480, "result": "resigned"},
                "accuracies": {"white": 91.2, "black": 77.5}
            }, {
                "rules": "chess960",
                "white": {"username": "alice"},
                "black": {"username": "carol"}
            }]
        }"#;

        let data: ArchiveResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(data.games.len(), 2);
        let game = &data.games[0];
        assert_eq!(game.white.username, "alice");
        assert_eq!(game.black.rating, Some(1480));
        assert_eq!(game.accuracies.as_ref().and_then(|a| a.white), Some(91.2));

        let out = serde_json::to_value(game).unwrap();
        assert_eq!(out["timeClass"], "blitz");
    }
}
