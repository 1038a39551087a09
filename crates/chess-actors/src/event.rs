use crate::types::{Coords, PieceId, PieceType};
use serde::Serialize;
use std::fmt;

/// Changes applied by the board coordinator, in the order it applied them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BoardEvent {
    Placed {
        piece: PieceId,
        piece_type: PieceType,
        square: Coords,
    },
    Moved {
        piece: PieceId,
        piece_type: PieceType,
        from: Coords,
        to: Coords,
    },
    Removed {
        piece: PieceId,
        piece_type: PieceType,
        square: Coords,
    },
}

impl BoardEvent {
    pub fn piece(&self) -> PieceId {
        match self {
            Self::Placed { piece, .. } | Self::Moved { piece, .. } | Self::Removed { piece, .. } => {
                *piece
            }
        }
    }

    pub fn piece_type(&self) -> PieceType {
        match self {
            Self::Placed { piece_type, .. }
            | Self::Moved { piece_type, .. }
            | Self::Removed { piece_type, .. } => *piece_type,
        }
    }

    /// Emit the board trace line for this event.
    pub(crate) fn trace(&self) {
        let piece_type = self.piece_type();
        match self {
            Self::Placed { piece, square, .. } => tracing::info!(
                %piece,
                kind = %piece_type.kind,
                color = %piece_type.color,
                %square,
                "new piece placed: {}",
                self
            ),
            Self::Moved {
                piece, from, to, ..
            } => tracing::info!(
                %piece,
                kind = %piece_type.kind,
                color = %piece_type.color,
                %from,
                %to,
                "piece moved: {}",
                self
            ),
            Self::Removed { piece, square, .. } => tracing::info!(
                %piece,
                kind = %piece_type.kind,
                color = %piece_type.color,
                %square,
                "piece deleted: {}",
                self
            ),
        }
    }
}

impl fmt::Display for BoardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placed {
                piece_type, square, ..
            } => write!(f, "New piece: {piece_type} on {square}"),
            Self::Moved {
                piece_type,
                from,
                to,
                ..
            } => write!(f, "Move: {piece_type} from {from} to {to}"),
            Self::Removed {
                piece_type, square, ..
            } => write!(f, "Deleted piece {piece_type} from {square}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PieceColor, PieceKind};

    fn white_pawn() -> PieceType {
        PieceType::new(PieceKind::Pawn, PieceColor::White)
    }

    #[test]
    fn display_lines() {
        let placed = BoardEvent::Placed {
            piece: PieceId(1),
            piece_type: white_pawn(),
            square: Coords::at(3, 1),
        };
        assert_eq!(placed.to_string(), "New piece: ♙ on D2");

        let moved = BoardEvent::Moved {
            piece: PieceId(1),
            piece_type: white_pawn(),
            from: Coords::at(3, 1),
            to: Coords::at(3, 3),
        };
        assert_eq!(moved.to_string(), "Move: ♙ from D2 to D4");

        let removed = BoardEvent::Removed {
            piece: PieceId(1),
            piece_type: PieceType::new(PieceKind::King, PieceColor::Black),
            square: Coords::at(4, 7),
        };
        assert_eq!(removed.to_string(), "Deleted piece ♚ from E8");
        assert_eq!(removed.piece(), PieceId(1));
    }

    #[test]
    fn serializes_with_event_tag() {
        let moved = BoardEvent::Moved {
            piece: PieceId(7),
            piece_type: white_pawn(),
            from: Coords::at(3, 1),
            to: Coords::at(3, 3),
        };
        let value = serde_json::to_value(&moved).unwrap();
        assert_eq!(value["event"], "moved");
        assert_eq!(value["piece"], 7);
        assert_eq!(value["piece_type"]["kind"], "pawn");
        assert_eq!(value["from"], "D2");
        assert_eq!(value["to"], "D4");
    }
}
