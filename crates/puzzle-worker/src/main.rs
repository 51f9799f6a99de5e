//! Puzzle worker CLI
//!
//! Analyzes one PGN file with a local Stockfish and prints the puzzles (or the
//! full per-move analysis with `--analyze`) as JSON on stdout.
//!
//!     puzzle-worker game.pgn [--side white|black] [--analyze]

use std::path::PathBuf;

use chess_core::Side;
use tracing::info;

use puzzle_worker::analyzer;
use puzzle_worker::config::WorkerConfig;
use puzzle_worker::error::WorkerError;
use puzzle_worker::stockfish::EnginePool;

struct Args {
    pgn_path: PathBuf,
    side: Option<Side>,
    full_analysis: bool,
}

fn parse_args() -> Result<Args, WorkerError> {
    let mut pgn_path = None;
    let mut side = None;
    let mut full_analysis = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--analyze" => full_analysis = true,
            "--side" => {
                let value = args
                    .next()
                    .ok_or_else(|| WorkerError::Config("--side needs a value".into()))?;
                side = Some(value.parse::<Side>().map_err(WorkerError::Config)?);
            }
            other if other.starts_with("--") => {
                return Err(WorkerError::Config(format!("unknown flag {other}")));
            }
            path => pgn_path = Some(PathBuf::from(path)),
        }
    }

    let pgn_path = pgn_path.ok_or_else(|| {
        WorkerError::Config("usage: puzzle-worker <game.pgn> [--side white|black] [--analyze]".into())
    })?;

    Ok(Args {
        pgn_path,
        side,
        full_analysis,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args()?;
    let config = WorkerConfig::from_env();
    info!(
        stockfish_path = %config.stockfish_path,
        depth = config.depth,
        max_engines = config.max_engines,
        "Worker config loaded"
    );

    let pgn = std::fs::read_to_string(&args.pgn_path)?;
    let game = chess_core::pgn::parse_pgn(&pgn).map_err(WorkerError::from)?;
    let meta = &game.metadata;
    info!(
        white = %meta.white,
        white_elo = ?meta.white_elo,
        black = %meta.black,
        black_elo = ?meta.black_elo,
        result = %meta.result,
        date = meta.date.as_deref().unwrap_or("?"),
        plies = game.moves.len(),
        "Game loaded"
    );

    let engines = EnginePool::new(config.engine_config());
    let options = config.analysis_options().with_side(args.side);

    let output = if args.full_analysis {
        let report = analyzer::analyze_game(&engines, &game.moves, &options).await?;
        serde_json::to_string_pretty(&report)?
    } else {
        let puzzles = analyzer::generate_puzzles(&engines, &game.moves, &options).await?;
        serde_json::to_string_pretty(&puzzles)?
    };

    println!("{output}");
    Ok(())
}
