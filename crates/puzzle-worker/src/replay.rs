//! Sequential game replay: one `MoveRecord` per ply.

use chess_core::{GamePosition, GameStatus, Side};
use serde::Serialize;

use crate::error::WorkerError;

/// One ply of a replayed game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    /// 0-based ply index
    pub index: usize,
    pub side: Side,
    /// SAN as normalized by the rules adapter
    pub played_move: String,
    pub played_uci: String,
    pub position_before: String,
    pub position_after: String,
    pub delivers_mate: bool,
}

impl MoveRecord {
    /// Full-move number of this ply (1-based)
    pub fn move_number(&self) -> usize {
        self.index / 2 + 1
    }
}

/// Lazy, forward-only walk over a move list from the initial position.
/// Stops for good after the first illegal move.
pub struct Replayer<'a> {
    moves: &'a [String],
    position: GamePosition,
    index: usize,
    failed: bool,
}

impl<'a> Replayer<'a> {
    pub fn new(moves: &'a [String]) -> Self {
        Self {
            moves,
            position: GamePosition::start(),
            index: 0,
            failed: false,
        }
    }
}

impl Iterator for Replayer<'_> {
    type Item = Result<MoveRecord, WorkerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let san = self.moves.get(self.index)?;
        let index = self.index;

        let (played, after) = match self.position.play_san(san) {
            Ok(step) => step,
            Err(reason) => {
                self.failed = true;
                return Some(Err(WorkerError::InvalidMoveSequence {
                    index,
                    san: san.clone(),
                    reason,
                }));
            }
        };

        let record = MoveRecord {
            index,
            side: self.position.side_to_move(),
            played_move: played.san,
            played_uci: played.uci,
            position_before: self.position.fen(),
            position_after: after.fen(),
            delivers_mate: after.status() == GameStatus::Checkmate,
        };

        self.position = after;
        self.index += 1;
        Some(Ok(record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.moves.len() - self.index))
        }
    }
}

impl std::iter::FusedIterator for Replayer<'_> {}

/// Replay the whole list; any illegal move fails the lot.
pub fn replay_all(moves: &[String]) -> Result<Vec<MoveRecord>, WorkerError> {
    Replayer::new(moves).collect()
}
