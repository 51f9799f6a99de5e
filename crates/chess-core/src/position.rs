//! Thin adapter over shakmaty: everything the pipeline needs to know about
//! chess rules goes through `GamePosition`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position, Role};

use crate::error::RulesError;

/// The side that moves: White is the first player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::White => "white",
            Side::Black => "black",
        })
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Side::White),
            "black" | "b" => Ok(Side::Black),
            other => Err(format!("unknown side: {other}")),
        }
    }
}

/// Terminal-state flags for a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
}

/// A legal move with the metadata callers display or filter on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegalMove {
    /// SAN including the `+` / `#` suffix
    pub san: String,
    pub uci: String,
    pub from: String,
    pub to: String,
    pub piece: &'static str,
    pub captured: Option<&'static str>,
}

/// An immutable board state. Applying a move returns a new position.
#[derive(Debug, Clone)]
pub struct GamePosition {
    board: Chess,
}

impl Default for GamePosition {
    fn default() -> Self {
        Self::start()
    }
}

impl GamePosition {
    /// The standard initial position
    pub fn start() -> Self {
        Self {
            board: Chess::default(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let invalid = |reason: String| RulesError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };
        let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{e}")))?;
        let board = parsed
            .into_position::<Chess>(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{e}")))?;
        Ok(Self { board })
    }

    pub fn fen(&self) -> String {
        Fen::from_position(&self.board, EnPassantMode::Legal).to_string()
    }

    pub fn side_to_move(&self) -> Side {
        self.board.turn().into()
    }

    pub fn status(&self) -> GameStatus {
        if self.board.is_checkmate() {
            GameStatus::Checkmate
        } else if self.board.is_stalemate() {
            GameStatus::Stalemate
        } else {
            GameStatus::Ongoing
        }
    }

    /// Apply a SAN move. Check/mate suffixes and `!`/`?` annotations are
    /// tolerated; castling may be written with zeros.
    pub fn play_san(&self, san: &str) -> Result<(LegalMove, GamePosition), RulesError> {
        let cleaned = clean_san(san);
        let parsed: SanPlus = cleaned
            .parse()
            .map_err(|_| RulesError::InvalidSan(san.to_string()))?;
        let mv = parsed
            .san
            .to_move(&self.board)
            .map_err(|_| RulesError::IllegalMove {
                san: san.to_string(),
                fen: self.fen(),
            })?;

        let (legal, board) = self.describe(mv);
        Ok((legal, GamePosition { board }))
    }

    /// All legal moves in shakmaty's generation order
    pub fn legal_moves(&self) -> Vec<LegalMove> {
        self.board
            .legal_moves()
            .into_iter()
            .map(|mv| self.describe(mv).0)
            .collect()
    }

    fn describe(&self, mv: Move) -> (LegalMove, Chess) {
        let mut after = self.board.clone();
        after.play_unchecked(mv.clone());

        let mut san = San::from_move(&self.board, mv.clone()).to_string();
        if after.is_checkmate() {
            san.push('#');
        } else if after.is_check() {
            san.push('+');
        }

        let legal = LegalMove {
            san,
            uci: mv.to_uci(CastlingMode::Standard).to_string(),
            from: mv.from().map(|sq| sq.to_string()).unwrap_or_default(),
            to: mv.to().to_string(),
            piece: role_name(mv.role()),
            captured: mv.capture().map(role_name),
        };
        (legal, after)
    }
}

fn clean_san(san: &str) -> String {
    let trimmed = san.trim().trim_end_matches(['!', '?']);
    match trimmed.trim_end_matches(['+', '#']) {
        "0-0" => "O-O".to_string(),
        "0-0-0" => "O-O-O".to_string(),
        _ => trimmed.to_string(),
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Pawn => "pawn",
        Role::Knight => "knight",
        Role::Bishop => "bishop",
        Role::Rook => "rook",
        Role::Queen => "queen",
        Role::King => "king",
    }
}
