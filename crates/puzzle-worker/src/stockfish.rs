//! Stockfish engine wrapper using UCI protocol (async I/O)
//!
//! Each evaluation gets a fresh engine process, so no UCI session state can
//! leak between positions or requests. A semaphore caps how many processes
//! are alive at once and every process is killed on every exit path:
//! completion, error, timeout, or the caller dropping the future.

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::error::WorkerError;

/// Mate scores are folded into the centipawn scale just below this value
pub const MATE_SCORE: i32 = 10_000;

/// Anything that can score a position.
pub trait Evaluator {
    /// Centipawn score of `fen` from White's point of view
    fn evaluate(
        &self,
        fen: &str,
        depth: u32,
    ) -> impl Future<Output = Result<i32, WorkerError>> + Send;
}

/// Result of a single position evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalResult {
    /// Centipawn score (from engine's perspective, i.e., side to move)
    pub cp: Option<i32>,
    /// Mate in N moves (positive = side to move mates, negative = gets mated)
    pub mate: Option<i32>,
}

/// How engine processes are launched and bounded
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Wall-clock budget for one evaluate call, from the moment it is made:
    /// waiting for a process slot, start-up and search all count
    pub timeout: Duration,
    /// Ceiling on live engine processes
    pub max_concurrent: usize,
}

/// Stockfish engine instance, owned by exactly one evaluation
struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process
    fn spawn(config: &EngineConfig) -> Result<Self, WorkerError> {
        let mut process = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                WorkerError::EngineUnavailable(format!(
                    "failed to spawn {}: {e}",
                    config.program.display()
                ))
            })?;

        let (Some(stdin), Some(stdout)) = (process.stdin.take(), process.stdout.take()) else {
            let _ = process.start_kill();
            return Err(WorkerError::EngineUnavailable(
                "engine pipes were not captured".into(),
            ));
        };

        Ok(Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), WorkerError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| WorkerError::EngineUnavailable(format!("failed to write to engine: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| WorkerError::EngineUnavailable(format!("failed to flush engine stdin: {e}")))?;
        Ok(())
    }

    /// Read the next output line, trimmed. EOF means the engine went away.
    async fn next_line(&mut self) -> Result<String, WorkerError> {
        let mut line = String::new();
        let read = self
            .stdout
            .read_line(&mut line)
            .await
            .map_err(|e| WorkerError::EngineUnavailable(format!("failed to read from engine: {e}")))?;
        if read == 0 {
            return Err(WorkerError::EngineUnavailable(
                "engine closed its output before finishing".into(),
            ));
        }
        let trimmed = line.trim().to_string();
        debug!(line = %trimmed, "SF >");
        Ok(trimmed)
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), WorkerError> {
        while self.next_line().await? != expected {}
        Ok(())
    }

    /// Run the whole UCI exchange for one position and return the last
    /// score reported before `bestmove`
    async fn search(&mut self, fen: &str, depth: u32) -> Result<EvalResult, WorkerError> {
        self.send("uci").await?;
        self.wait_for("uciok").await?;

        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go depth {depth}")).await?;

        let mut result = EvalResult::default();
        loop {
            let line = self.next_line().await?;

            if is_progress_line(&line) {
                if let Some(cp) = parse_cp(&line) {
                    result.cp = Some(cp);
                    result.mate = None;
                }
                if let Some(mate) = parse_mate(&line) {
                    result.mate = Some(mate);
                    result.cp = None;
                }
            } else if line.starts_with("bestmove") {
                return Ok(result);
            }
        }
    }

    /// Ask the engine to quit, then make sure the process is gone and reaped
    async fn shutdown(mut self) {
        let _ = self.send("quit").await;
        if let Err(e) = self.process.kill().await {
            debug!(error = %e, "engine already exited");
        }
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop; covers cancellation
        let _ = self.process.start_kill();
    }
}

/// Bounded set of one-shot engine processes. Cheap to clone; clones share
/// the same process ceiling.
#[derive(Debug, Clone)]
pub struct EnginePool {
    config: Arc<EngineConfig>,
    permits: Arc<Semaphore>,
}

impl EnginePool {
    pub fn new(config: EngineConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        Self {
            config: Arc::new(config),
            permits,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Engine processes that could start right now without waiting
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Evaluate a position in a dedicated engine process.
    /// Scores are from the side to move's perspective.
    pub async fn evaluate_raw(&self, fen: &str, depth: u32) -> Result<EvalResult, WorkerError> {
        let deadline = Instant::now() + self.config.timeout;

        let _permit = match timeout_at(deadline, self.permits.acquire()).await {
            Ok(permit) => permit
                .map_err(|_| WorkerError::EngineUnavailable("engine pool closed".into()))?,
            Err(_) => {
                warn!(fen, timeout = ?self.config.timeout, "No engine slot freed up in time");
                return Err(self.timeout_error(fen));
            }
        };

        let mut engine = StockfishEngine::spawn(&self.config)?;
        let outcome = timeout_at(deadline, engine.search(fen, depth.max(1))).await;
        engine.shutdown().await;

        match outcome {
            Ok(result) => result,
            Err(_) => {
                warn!(fen, timeout = ?self.config.timeout, "Engine timed out, process killed");
                Err(self.timeout_error(fen))
            }
        }
    }

    fn timeout_error(&self, fen: &str) -> WorkerError {
        WorkerError::EngineTimeout {
            fen: fen.to_string(),
            timeout: self.config.timeout,
        }
    }
}

impl Evaluator for EnginePool {
    async fn evaluate(&self, fen: &str, depth: u32) -> Result<i32, WorkerError> {
        let result = self.evaluate_raw(fen, depth).await?;
        Ok(eval_to_white_cp(result.cp, result.mate, is_white_to_move(fen)))
    }
}

/// Convert a side-to-move score to White's perspective. No score at all
/// (the engine printed no `score` token) counts as 0.
pub fn eval_to_white_cp(cp: Option<i32>, mate: Option<i32>, is_white_to_move: bool) -> i32 {
    let relative = if let Some(m) = mate {
        if m > 0 {
            MATE_SCORE - m * 10
        } else {
            -MATE_SCORE - m * 10
        }
    } else {
        cp.unwrap_or(0)
    };

    if is_white_to_move {
        relative
    } else {
        -relative
    }
}

fn is_white_to_move(fen: &str) -> bool {
    fen.split_whitespace().nth(1) != Some("b")
}

/// `info ... depth N ...` lines carry the running score
fn is_progress_line(line: &str) -> bool {
    let mut parts = line.split_whitespace();
    parts.next() == Some("info") && parts.any(|p| p == "depth")
}

/// Parse centipawn score from info line
fn parse_cp(line: &str) -> Option<i32> {
    token_after(line, "cp")
}

/// Parse mate score from info line
fn parse_mate(line: &str) -> Option<i32> {
    token_after(line, "mate")
}

fn token_after(line: &str, key: &str) -> Option<i32> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    parts
        .windows(2)
        .find(|w| w[0] == key)
        .and_then(|w| w[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cp() {
        let line = "info depth 20 seldepth 25 multipv 1 score cp 35 nodes 100000 pv e2e4";
        assert_eq!(parse_cp(line), Some(35));
        assert_eq!(parse_cp("info depth 3 score cp -120 lowerbound"), Some(-120));
        assert_eq!(parse_cp("info depth 3 nodes 20"), None);
    }

    #[test]
    fn test_parse_mate() {
        let line = "info depth 20 score mate 3 nodes 100000 pv e2e4";
        assert_eq!(parse_mate(line), Some(3));
        assert_eq!(parse_mate("info depth 0 score mate 0"), Some(0));
    }

    #[test]
    fn test_progress_lines() {
        assert!(is_progress_line("info depth 12 seldepth 18 score cp 20"));
        assert!(!is_progress_line("info string NNUE evaluation using nn.nnue"));
        assert!(!is_progress_line("bestmove e2e4 ponder e7e5"));
    }

    #[test]
    fn test_eval_to_white_cp() {
        assert_eq!(eval_to_white_cp(Some(50), None, true), 50);
        assert_eq!(eval_to_white_cp(Some(50), None, false), -50);
        assert_eq!(eval_to_white_cp(None, None, false), 0);
        assert_eq!(eval_to_white_cp(None, Some(2), true), 9980);
        assert_eq!(eval_to_white_cp(None, Some(-2), true), -9980);
        // Black to move and already mated
        assert_eq!(eval_to_white_cp(None, Some(0), false), MATE_SCORE);
    }

    #[test]
    fn test_side_to_move_from_fen() {
        assert!(is_white_to_move("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"));
        assert!(!is_white_to_move("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"));
    }
}
