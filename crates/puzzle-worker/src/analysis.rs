/// Move classification and accuracy — pure functions only
/// (No engine or board dependencies)

use std::fmt;

use chess_core::Side;
use serde::{Deserialize, Serialize};

/// Classification thresholds (centipawn loss, inclusive lower bounds)
const THRESHOLD_INACCURACY: i32 = 100;
const THRESHOLD_MISTAKE: i32 = 200;
const THRESHOLD_BLUNDER: i32 = 300;

/// Maximum CP loss a single move contributes to accuracy
const MAX_CP_LOSS: i32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    None,
    Inaccuracy,
    Mistake,
    Blunder,
}

impl Classification {
    pub fn is_flagged(self) -> bool {
        self != Classification::None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::None => "none",
            Classification::Inaccuracy => "inaccuracy",
            Classification::Mistake => "mistake",
            Classification::Blunder => "blunder",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Centipawns the mover gave away. Positive = the position got worse for the
/// side that just moved; evaluations are from White's perspective.
pub fn centipawn_loss(eval_before: i32, eval_after: i32, side: Side) -> i32 {
    match side {
        Side::White => eval_before - eval_after,
        Side::Black => eval_after - eval_before,
    }
}

/// Checked from the most severe label down. Callers must skip this for
/// moves that deliver checkmate: those are never mistakes.
pub fn classify(eval_before: i32, eval_after: i32, side: Side) -> Classification {
    let loss = centipawn_loss(eval_before, eval_after, side);

    if loss >= THRESHOLD_BLUNDER {
        Classification::Blunder
    } else if loss >= THRESHOLD_MISTAKE {
        Classification::Mistake
    } else if loss >= THRESHOLD_INACCURACY {
        Classification::Inaccuracy
    } else {
        Classification::None
    }
}

/// Loss clamped to what a single move may contribute to accuracy
pub fn capped_loss(loss: i32) -> i32 {
    loss.clamp(0, MAX_CP_LOSS)
}

pub fn calculate_accuracy(total_cp_loss: i32, move_count: u32) -> f64 {
    if move_count == 0 {
        return 100.0;
    }
    let acpl = total_cp_loss as f64 / move_count as f64;
    let accuracy = 100.0 * (1.0 / (1.0 + acpl / 100.0)).sqrt();
    accuracy.clamp(0.0, 100.0)
}
