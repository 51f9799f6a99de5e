/// Puzzle data model and synthesis from flagged moves

use chess_core::{GamePosition, Side};
use serde::{Deserialize, Serialize};

use crate::analysis::{centipawn_loss, Classification};
use crate::error::WorkerError;
use crate::replay::MoveRecord;

/// Alternatives listed per puzzle by default
pub const DEFAULT_MAX_ALTERNATIVES: usize = 3;

/// Puzzles generated per game by default
pub const DEFAULT_MAX_PUZZLES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Bigger swings are easier to spot
    pub fn from_classification(classification: Classification) -> Self {
        match classification {
            Classification::Blunder => Difficulty::Easy,
            Classification::Mistake => Difficulty::Medium,
            Classification::Inaccuracy | Classification::None => Difficulty::Hard,
        }
    }
}

/// A "find a better move" puzzle built from one bad move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub id: usize,
    /// Position before the bad move, with the blundering side to move
    pub start_position: String,
    pub blunder_move: String,
    pub alternative_moves: Vec<String>,
    pub side: Side,
    pub move_number: usize,
    pub difficulty: Difficulty,
    pub classification: Classification,
    pub eval_before: i32,
    pub eval_after: i32,
    pub cp_loss: i32,
    pub description: String,
}

/// Evaluations around a move, White's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveEvaluation {
    pub before: i32,
    pub after: i32,
    pub classification: Classification,
}

/// Produced payload for one game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleSet {
    pub puzzles_generated: usize,
    pub puzzles: Vec<Puzzle>,
}

impl PuzzleSet {
    pub fn new(puzzles: Vec<Puzzle>) -> Self {
        Self {
            puzzles_generated: puzzles.len(),
            puzzles,
        }
    }
}

/// Build a puzzle from a flagged move. Alternatives are the first legal moves
/// in the rules adapter's enumeration order, minus the move actually played;
/// they are not ranked by strength.
pub fn synthesize(
    id: usize,
    record: &MoveRecord,
    evaluation: MoveEvaluation,
    max_alternatives: usize,
) -> Result<Puzzle, WorkerError> {
    let position = GamePosition::from_fen(&record.position_before)?;

    let mut alternative_moves: Vec<String> = Vec::with_capacity(max_alternatives);
    for legal in position.legal_moves() {
        if alternative_moves.len() >= max_alternatives {
            break;
        }
        if legal.uci == record.played_uci
            || legal.san == record.played_move
            || alternative_moves.contains(&legal.san)
        {
            continue;
        }
        alternative_moves.push(legal.san);
    }

    Ok(Puzzle {
        id,
        start_position: record.position_before.clone(),
        blunder_move: record.played_move.clone(),
        alternative_moves,
        side: record.side,
        move_number: record.move_number(),
        difficulty: Difficulty::from_classification(evaluation.classification),
        classification: evaluation.classification,
        eval_before: evaluation.before,
        eval_after: evaluation.after,
        cp_loss: centipawn_loss(evaluation.before, evaluation.after, record.side),
        description: format!("Find a better move than {}", record.played_move),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::replay_all;

    fn blunder() -> MoveEvaluation {
        MoveEvaluation {
            before: 30,
            after: -400,
            classification: Classification::Blunder,
        }
    }

    #[test]
    fn test_alternatives_exclude_played_move() {
        let game: Vec<String> = ["e4"].iter().map(|s| s.to_string()).collect();
        let record = &replay_all(&game).unwrap()[0];

        let puzzle = synthesize(1, record, blunder(), 3).unwrap();
        assert_eq!(puzzle.alternative_moves.len(), 3);
        assert!(!puzzle.alternative_moves.contains(&"e4".to_string()));
        assert_eq!(puzzle.blunder_move, "e4");
        assert_eq!(puzzle.start_position, record.position_before);
        assert_eq!(puzzle.cp_loss, 430);
        assert_eq!(puzzle.difficulty, Difficulty::Easy);
        assert_eq!(puzzle.move_number, 1);
        assert_eq!(puzzle.description, "Find a better move than e4");

        // Native enumeration order is preserved
        let legal: Vec<String> = GamePosition::start()
            .legal_moves()
            .into_iter()
            .map(|m| m.san)
            .filter(|san| san != "e4")
            .take(3)
            .collect();
        assert_eq!(puzzle.alternative_moves, legal);
    }

    #[test]
    fn test_alternative_cap() {
        let game: Vec<String> = ["Nf3", "d5"].iter().map(|s| s.to_string()).collect();
        let record = &replay_all(&game).unwrap()[1];

        assert!(synthesize(1, record, blunder(), 0).unwrap().alternative_moves.is_empty());
        assert_eq!(synthesize(1, record, blunder(), 50).unwrap().alternative_moves.len(), 19);
    }

    #[test]
    fn test_only_move_leaves_no_alternatives() {
        // Black king in the corner with a single legal move
        let record = MoveRecord {
            index: 1,
            side: Side::Black,
            played_move: "Kg8".to_string(),
            played_uci: "h8g8".to_string(),
            position_before: "7k/8/6K1/8/8/8/8/5R2 b - - 0 1".to_string(),
            position_after: "6k1/8/6K1/8/8/8/8/5R2 w - - 1 2".to_string(),
            delivers_mate: false,
        };
        let puzzle = synthesize(4, &record, blunder(), 3).unwrap();
        assert!(puzzle.alternative_moves.is_empty());
        assert_eq!(puzzle.id, 4);
        assert_eq!(puzzle.side, Side::Black);
    }

    #[test]
    fn test_difficulty_from_classification() {
        assert_eq!(
            Difficulty::from_classification(Classification::Mistake),
            Difficulty::Medium
        );
        assert_eq!(
            Difficulty::from_classification(Classification::Inaccuracy),
            Difficulty::Hard
        );
    }
}
