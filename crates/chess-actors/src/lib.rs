//! A chess board modelled as concurrent actors.
//!
//! Every piece is its own tokio task holding its square and type. A single
//! board coordinator task owns the index from square to piece, and a relay
//! task per piece forwards the piece's moves to the coordinator. Tasks share
//! no mutable state; they only exchange messages.
//!
//! There is no rules engine: the board records where pieces are, nothing more.
//!
//! ```no_run
//! use chess_actors::prelude::*;
//!
//! # async fn demo() -> Result<(), BoardError> {
//! let (board, done) = spawn_board(BoardConfig::default())?;
//! init_board(&board).await?;
//! board.move_piece_str("D2", "D4").await?;
//! clear_board(&board).await?;
//! drop(board);
//! done.wait().await?;
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod config;
pub mod error;
pub mod event;
pub mod piece;
pub mod relay;
pub mod setup;
pub mod types;

/// Prelude module for convenient glob imports.
pub mod prelude {
    pub use crate::board::{parse_move, spawn_board, BoardDone, BoardHandle};
    pub use crate::config::BoardConfig;
    pub use crate::error::{BoardError, Fault};
    pub use crate::event::BoardEvent;
    pub use crate::piece::{spawn_piece, PieceHandle};
    pub use crate::setup::{add_piece, clear_board, init_board};
    pub use crate::types::{Coords, PieceColor, PieceId, PieceKind, PieceType};
}
