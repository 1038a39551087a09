use crate::types::{Coords, PieceId};

/// Errors returned to callers of the board and piece handles.
///
/// These are recoverable: the coordinator and the pieces stay consistent and
/// further requests may proceed.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("invalid chess coordinate {input:?}: {reason}")]
    InvalidCoordinate { input: String, reason: &'static str },

    #[error("no piece at {0}")]
    NoPieceAt(Coords),

    #[error("piece {id} is no longer running")]
    PieceUnavailable { id: PieceId },

    #[error("board coordinator is not running")]
    BoardClosed,

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error(transparent)]
    Fault(#[from] Fault),
}

/// Contract violations inside the actor protocol.
///
/// A fault means the calling code has a bug. The coordinator does not try to
/// repair its state: it stops and reports the fault through
/// [`BoardDone`](crate::board::BoardDone).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    #[error("square {square} is already occupied by piece {occupant}, cannot place piece {incoming}")]
    SquareOccupied {
        square: Coords,
        occupant: PieceId,
        incoming: PieceId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = BoardError::NoPieceAt(Coords::at(3, 1));
        assert_eq!(err.to_string(), "no piece at D2");

        let err = BoardError::InvalidCoordinate {
            input: "Z9".into(),
            reason: "file must be A-H",
        };
        assert_eq!(
            err.to_string(),
            "invalid chess coordinate \"Z9\": file must be A-H"
        );

        let err = BoardError::from(Fault::SquareOccupied {
            square: Coords::at(4, 3),
            occupant: PieceId(1),
            incoming: PieceId(2),
        });
        assert_eq!(
            err.to_string(),
            "square E4 is already occupied by piece #1, cannot place piece #2"
        );
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BoardError>();
        assert_send_sync::<Fault>();
    }
}
