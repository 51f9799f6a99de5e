use std::env;

use puzzle_worker::config::WorkerConfig;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub chess_com_base_url: String,
    pub worker: WorkerConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            chess_com_base_url: env::var("CHESS_COM_BASE_URL")
                .unwrap_or_else(|_| "https://api.chess.com/pub".to_string()),
            worker: WorkerConfig::from_env(),
        }
    }
}
