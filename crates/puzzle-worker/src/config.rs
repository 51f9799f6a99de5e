//! Worker configuration from environment variables

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::analyzer::AnalysisOptions;
use crate::stockfish::EngineConfig;

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Path to Stockfish binary
    pub stockfish_path: String,

    /// Search depth per position
    pub depth: u32,

    /// Wall-clock budget for a single evaluation
    pub engine_timeout_secs: u64,

    /// Ceiling on concurrently running engine processes
    pub max_engines: usize,

    /// Puzzles generated per game at most
    pub max_puzzles: usize,

    /// Alternatives listed per puzzle at most
    pub max_alternatives: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            stockfish_path: "/usr/local/bin/stockfish".to_string(),
            depth: 12,
            engine_timeout_secs: 30,
            max_engines: num_cpus::get().clamp(1, 4),
            max_puzzles: 10,
            max_alternatives: 3,
        }
    }
}

impl WorkerConfig {
    /// Load configuration from environment variables. Missing or unparseable
    /// values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            stockfish_path: env::var("STOCKFISH_PATH").unwrap_or(defaults.stockfish_path),
            depth: parse_var("ENGINE_DEPTH")
                .filter(|d| *d > 0)
                .unwrap_or(defaults.depth),
            engine_timeout_secs: parse_var("ENGINE_TIMEOUT_SECS")
                .filter(|t| *t > 0)
                .unwrap_or(defaults.engine_timeout_secs),
            max_engines: parse_var("MAX_ENGINES")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_engines),
            max_puzzles: parse_var("MAX_PUZZLES").unwrap_or(defaults.max_puzzles),
            max_alternatives: parse_var("MAX_ALTERNATIVES").unwrap_or(defaults.max_alternatives),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            program: PathBuf::from(&self.stockfish_path),
            args: Vec::new(),
            timeout: Duration::from_secs(self.engine_timeout_secs),
            max_concurrent: self.max_engines,
        }
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            depth: self.depth,
            concurrency: self.max_engines,
            max_puzzles: self.max_puzzles,
            max_alternatives: self.max_alternatives,
            side: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
