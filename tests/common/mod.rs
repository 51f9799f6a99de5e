#![allow(dead_code)]

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use puzzle_worker::error::WorkerError;
use puzzle_worker::stockfish::{EngineConfig, Evaluator};
use reqwest::Client;

/// Build a reqwest client for tests.
pub fn client() -> Client {
    Client::new()
}

pub fn moves(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// In-memory evaluator driven by a scoring function. Counts calls.
pub struct ScriptedEvaluator<F> {
    score: F,
    delay: Option<fn(&str) -> Duration>,
    calls: AtomicUsize,
}

impl<F> ScriptedEvaluator<F>
where
    F: Fn(&str) -> i32 + Send + Sync,
{
    pub fn new(score: F) -> Self {
        Self {
            score,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep a per-position amount before answering, so completions
    /// arrive out of order.
    pub fn with_delay(mut self, delay: fn(&str) -> Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F> Evaluator for ScriptedEvaluator<F>
where
    F: Fn(&str) -> i32 + Send + Sync,
{
    fn evaluate(
        &self,
        fen: &str,
        _depth: u32,
    ) -> impl Future<Output = Result<i32, WorkerError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let score = (self.score)(fen);
        let delay = self.delay.map(|d| d(fen));
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(score)
        }
    }
}

/// Fails every evaluation after the first `ok_calls`.
pub struct FailingEvaluator {
    pub ok_calls: usize,
    calls: AtomicUsize,
}

impl FailingEvaluator {
    pub fn new(ok_calls: usize) -> Self {
        Self {
            ok_calls,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Evaluator for FailingEvaluator {
    async fn evaluate(&self, _fen: &str, _depth: u32) -> Result<i32, WorkerError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.ok_calls {
            Ok(0)
        } else {
            Err(WorkerError::EngineUnavailable("mock engine crashed".into()))
        }
    }
}

/// White to move?
pub fn white_to_move(fen: &str) -> bool {
    fen.split_whitespace().nth(1) == Some("w")
}

// ---------------------------------------------------------------------------
// Mock UCI engines (POSIX sh scripts)
// ---------------------------------------------------------------------------

/// Answers the handshake and reports a fixed side-to-move score.
pub fn scoring_engine(cp: i32) -> String {
    format!(
        r#"[ -n "$1" ] && echo $$ > "$1"
while read -r line; do
  case "$line" in
    uci) echo "id name MockFish"; echo "uciok" ;;
    go*)
      echo "info depth 1 seldepth 1 score cp 7 nodes 20 pv e2e4"
      echo "info string still thinking"
      echo "info depth 2 seldepth 3 score cp {cp} nodes 40 pv e2e4"
      echo "bestmove e2e4" ;;
    quit) exit 0 ;;
  esac
done
"#
    )
}

/// Finishes the search without ever printing a score.
pub const SILENT_ENGINE: &str = r#"while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    go*) echo "info depth 0"; echo "bestmove (none)" ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Reports that the side to move is already mated.
pub const MATED_ENGINE: &str = r#"while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    go*) echo "info depth 0 score mate 0"; echo "bestmove (none)" ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Accepts the search and never finishes it.
pub const HANGING_ENGINE: &str = r#"[ -n "$1" ] && echo $$ > "$1"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
  esac
done
"#;

/// Crashes as soon as a search starts.
pub const CRASHING_ENGINE: &str = r#"while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    go*) exit 3 ;;
  esac
done
"#;

/// Write `body` as a script in `dir` and return its path.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write mock engine");
    path
}

/// Run the script through `sh`, optionally passing a pid file path.
pub fn engine_config(
    script: &Path,
    pid_file: Option<&Path>,
    timeout: Duration,
    max_concurrent: usize,
) -> EngineConfig {
    let mut args = vec![script.display().to_string()];
    if let Some(pid_file) = pid_file {
        args.push(pid_file.display().to_string());
    }
    EngineConfig {
        program: PathBuf::from("sh"),
        args,
        timeout,
        max_concurrent,
    }
}

pub fn read_pid(pid_file: &Path) -> u32 {
    std::fs::read_to_string(pid_file)
        .expect("mock engine wrote its pid")
        .trim()
        .parse()
        .expect("pid is a number")
}

/// A process counts as alive until it has exited; zombies count as gone.
pub fn process_alive(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => {
            // Format: "pid (comm) state ..."; comm may contain spaces
            let state = stat
                .rsplit_once(')')
                .and_then(|(_, rest)| rest.split_whitespace().next());
            !matches!(state, Some("Z") | Some("X"))
        }
        Err(_) => false,
    }
}

/// Poll until the process is gone or the deadline passes.
pub async fn wait_until_dead(pid: u32, deadline: Duration) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < deadline {
        if !process_alive(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    !process_alive(pid)
}
