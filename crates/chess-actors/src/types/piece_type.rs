use serde::{Deserialize, Serialize};
use std::fmt;

/// Chess piece color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceColor {
    /// Black pieces.
    Black,
    /// White pieces.
    White,
}

impl PieceColor {
    /// Rank (0-7) holding this side's back-row pieces.
    #[must_use]
    pub const fn back_rank(self) -> u8 {
        match self {
            Self::White => 0,
            Self::Black => 7,
        }
    }

    /// Rank (0-7) holding this side's pawns at the start of a game.
    #[must_use]
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Self::White => 1,
            Self::Black => 6,
        }
    }
}

impl fmt::Display for PieceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Black => write!(f, "black"),
            Self::White => write!(f, "white"),
        }
    }
}

/// Chess piece kind, independent of color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pawn => write!(f, "pawn"),
            Self::Knight => write!(f, "knight"),
            Self::Bishop => write!(f, "bishop"),
            Self::Rook => write!(f, "rook"),
            Self::Queen => write!(f, "queen"),
            Self::King => write!(f, "king"),
        }
    }
}

/// A piece kind together with its color.
///
/// Displays as the Unicode chess symbol, e.g. `♙` for a white pawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceType {
    pub kind: PieceKind,
    pub color: PieceColor,
}

impl PieceType {
    #[must_use]
    pub const fn new(kind: PieceKind, color: PieceColor) -> Self {
        Self { kind, color }
    }

    /// Unicode chess symbol for this piece.
    #[must_use]
    pub const fn symbol(self) -> char {
        match (self.color, self.kind) {
            (PieceColor::White, PieceKind::Pawn) => '♙',
            (PieceColor::White, PieceKind::Knight) => '♘',
            (PieceColor::White, PieceKind::Bishop) => '♗',
            (PieceColor::White, PieceKind::Rook) => '♖',
            (PieceColor::White, PieceKind::Queen) => '♕',
            (PieceColor::White, PieceKind::King) => '♔',
            (PieceColor::Black, PieceKind::Pawn) => '♟',
            (PieceColor::Black, PieceKind::Knight) => '♞',
            (PieceColor::Black, PieceKind::Bishop) => '♝',
            (PieceColor::Black, PieceKind::Rook) => '♜',
            (PieceColor::Black, PieceKind::Queen) => '♛',
            (PieceColor::Black, PieceKind::King) => '♚',
        }
    }
}

/// A freshly spawned piece is a white pawn until told otherwise.
impl Default for PieceType {
    fn default() -> Self {
        Self::new(PieceKind::Pawn, PieceColor::White)
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols() {
        let white_pawn = PieceType::new(PieceKind::Pawn, PieceColor::White);
        assert_eq!(white_pawn.to_string(), "♙");
        assert_eq!(
            PieceType::new(PieceKind::King, PieceColor::Black).symbol(),
            '♚'
        );
        assert_eq!(
            PieceType::new(PieceKind::Knight, PieceColor::White).symbol(),
            '♘'
        );
    }

    #[test]
    fn symbols_are_distinct() {
        use std::collections::HashSet;
        let kinds = [
            PieceKind::Pawn,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Queen,
            PieceKind::King,
        ];
        let symbols: HashSet<char> = [PieceColor::White, PieceColor::Black]
            .into_iter()
            .flat_map(|color| kinds.map(|kind| PieceType::new(kind, color).symbol()))
            .collect();
        assert_eq!(symbols.len(), 12);
    }

    #[test]
    fn home_ranks() {
        assert_eq!(PieceColor::White.back_rank(), 0);
        assert_eq!(PieceColor::White.pawn_rank(), 1);
        assert_eq!(PieceColor::Black.back_rank(), 7);
        assert_eq!(PieceColor::Black.pawn_rank(), 6);
    }

    #[test]
    fn kind_and_color_serialize_lowercase() {
        let piece = PieceType::new(PieceKind::Queen, PieceColor::Black);
        let json = serde_json::to_string(&piece).unwrap();
        assert_eq!(json, r#"{"kind":"queen","color":"black"}"#);
    }
}
