//! Core game analysis logic
//!
//! Replays the move list, evaluates every position of the game line once,
//! classifies each ply and turns flagged plies into puzzles. Evaluations run
//! concurrently through an ordered buffer, so results always line up with
//! the plies they belong to.

use std::pin::pin;

use chess_core::Side;
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::{self, Classification};
use crate::error::WorkerError;
use crate::puzzle::{self, MoveEvaluation, PuzzleSet, DEFAULT_MAX_ALTERNATIVES, DEFAULT_MAX_PUZZLES};
use crate::replay::{replay_all, MoveRecord};
use crate::stockfish::Evaluator;

/// Per-request knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub depth: u32,
    /// Evaluations in flight at once for this request
    pub concurrency: usize,
    pub max_puzzles: usize,
    pub max_alternatives: usize,
    /// Only report this side's moves
    pub side: Option<Side>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            depth: 12,
            concurrency: 4,
            max_puzzles: DEFAULT_MAX_PUZZLES,
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
            side: None,
        }
    }
}

impl AnalysisOptions {
    pub fn with_side(mut self, side: Option<Side>) -> Self {
        self.side = side;
        self
    }

    fn includes(&self, side: Side) -> bool {
        self.side.map_or(true, |only| only == side)
    }
}

/// Move output for JSON serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveAnalysis {
    pub index: usize,
    pub move_number: usize,
    pub side: Side,
    #[serde(rename = "move")]
    pub played_move: String,
    /// Position before the move
    pub fen: String,
    pub eval_before: i32,
    pub eval_after: i32,
    pub cp_loss: i32,
    pub classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Accuracy {
    pub white: f64,
    pub black: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAnalysis {
    pub total_moves: usize,
    pub mistakes_found: usize,
    pub mistakes: Vec<MoveAnalysis>,
    pub moves: Vec<MoveAnalysis>,
    pub accuracy: Accuracy,
}

/// Generate up to `max_puzzles` puzzles from a game's move list.
///
/// The whole list is validated before any engine work starts, so an illegal
/// move never yields partial results. Once the cap is reached, remaining
/// plies are dropped along with any evaluations still in flight.
pub async fn generate_puzzles<E: Evaluator>(
    evaluator: &E,
    moves: &[String],
    options: &AnalysisOptions,
) -> Result<PuzzleSet, WorkerError> {
    let records = replay_all(moves)?;
    info!(plies = records.len(), side = ?options.side, "Generating puzzles");

    if options.max_puzzles == 0 || records.is_empty() {
        return Ok(PuzzleSet::default());
    }

    let mut evals = pin!(evaluation_stream(evaluator, &records, options));
    let mut before = next_eval(&mut evals).await?;
    let mut puzzles = Vec::new();

    for record in &records {
        let after = next_eval(&mut evals).await?;
        let evaluation = evaluate_move(record, before, after);
        before = after;

        if !evaluation.classification.is_flagged() || !options.includes(record.side) {
            continue;
        }

        let puzzle = puzzle::synthesize(
            puzzles.len() + 1,
            record,
            evaluation,
            options.max_alternatives,
        )?;
        debug!(
            id = puzzle.id,
            ply = record.index,
            san = %record.played_move,
            classification = %evaluation.classification,
            "Puzzle created"
        );
        puzzles.push(puzzle);

        if puzzles.len() >= options.max_puzzles {
            debug!(max = options.max_puzzles, "Puzzle cap reached, skipping the rest of the game");
            break;
        }
    }

    info!(puzzles = puzzles.len(), "Puzzle generation complete");
    Ok(PuzzleSet::new(puzzles))
}

/// Evaluate and classify every ply of a game.
pub async fn analyze_game<E: Evaluator>(
    evaluator: &E,
    moves: &[String],
    options: &AnalysisOptions,
) -> Result<GameAnalysis, WorkerError> {
    let records = replay_all(moves)?;
    info!(plies = records.len(), "Starting analysis");

    let mut move_outputs = Vec::with_capacity(records.len());
    let mut white_cp_loss = 0;
    let mut black_cp_loss = 0;
    let mut white_move_count = 0u32;
    let mut black_move_count = 0u32;

    if !records.is_empty() {
        let mut evals = pin!(evaluation_stream(evaluator, &records, options));
        let mut before = next_eval(&mut evals).await?;

        for record in &records {
            let after = next_eval(&mut evals).await?;
            let evaluation = evaluate_move(record, before, after);
            before = after;

            let cp_loss = if record.delivers_mate {
                0
            } else {
                analysis::centipawn_loss(evaluation.before, evaluation.after, record.side)
            };
            match record.side {
                Side::White => {
                    white_cp_loss += analysis::capped_loss(cp_loss);
                    white_move_count += 1;
                }
                Side::Black => {
                    black_cp_loss += analysis::capped_loss(cp_loss);
                    black_move_count += 1;
                }
            }

            move_outputs.push(MoveAnalysis {
                index: record.index,
                move_number: record.move_number(),
                side: record.side,
                played_move: record.played_move.clone(),
                fen: record.position_before.clone(),
                eval_before: evaluation.before,
                eval_after: evaluation.after,
                cp_loss,
                classification: evaluation.classification,
                description: evaluation
                    .classification
                    .is_flagged()
                    .then(|| describe_mistake(evaluation.classification, cp_loss)),
            });
        }
    }

    let mistakes: Vec<MoveAnalysis> = move_outputs
        .iter()
        .filter(|m| m.classification.is_flagged() && options.includes(m.side))
        .cloned()
        .collect();

    info!(
        plies = move_outputs.len(),
        mistakes = mistakes.len(),
        "Analysis complete"
    );

    Ok(GameAnalysis {
        total_moves: move_outputs.len(),
        mistakes_found: mistakes.len(),
        mistakes,
        moves: move_outputs,
        accuracy: Accuracy {
            white: analysis::calculate_accuracy(white_cp_loss, white_move_count),
            black: analysis::calculate_accuracy(black_cp_loss, black_move_count),
        },
    })
}

/// Scores for the start position and the position after every ply, in game
/// order. positionAfter[i] is positionBefore[i + 1], so each is scored once.
fn evaluation_stream<'a, E: Evaluator>(
    evaluator: &'a E,
    records: &'a [MoveRecord],
    options: &AnalysisOptions,
) -> impl Stream<Item = Result<i32, WorkerError>> + 'a {
    let depth = options.depth;
    let fens = records
        .first()
        .map(|first| first.position_before.as_str())
        .into_iter()
        .chain(records.iter().map(|r| r.position_after.as_str()));

    stream::iter(fens)
        .map(move |fen| evaluator.evaluate(fen, depth))
        .buffered(options.concurrency.max(1))
}

async fn next_eval<S>(evals: &mut S) -> Result<i32, WorkerError>
where
    S: Stream<Item = Result<i32, WorkerError>> + Unpin,
{
    evals
        .next()
        .await
        .unwrap_or_else(|| Err(WorkerError::EngineUnavailable("evaluation stream ended early".into())))
}

/// A mating move is never a mistake, whatever the scores say
fn evaluate_move(record: &MoveRecord, before: i32, after: i32) -> MoveEvaluation {
    let classification = if record.delivers_mate {
        Classification::None
    } else {
        analysis::classify(before, after, record.side)
    };
    MoveEvaluation {
        before,
        after,
        classification,
    }
}

fn describe_mistake(classification: Classification, cp_loss: i32) -> String {
    let label = match classification {
        Classification::Blunder => "Blunder",
        Classification::Mistake => "Mistake",
        Classification::Inaccuracy => "Inaccuracy",
        Classification::None => "Move",
    };
    format!("{label}: gave away {cp_loss} centipawns")
}
