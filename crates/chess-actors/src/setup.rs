//! Board setup and teardown built on the board and piece protocols.

use crate::board::BoardHandle;
use crate::error::BoardError;
use crate::piece::{spawn_piece, PieceHandle};
use crate::relay::attach_relay;
use crate::types::{Coords, PieceColor, PieceKind, PieceType};
use tracing::debug;

/// Spawn a piece of `piece_type` on `square`, register it with `board`, and
/// attach a relay so its later moves reach the board.
pub async fn add_piece(
    board: &BoardHandle,
    square: Coords,
    piece_type: PieceType,
) -> Result<PieceHandle, BoardError> {
    let piece = spawn_piece(board.config());
    piece.set_type(piece_type).await?;
    // No subscriber yet, so this move is not announced.
    piece.set_coords(square).await?;
    board.upsert_piece(square, piece.clone()).await?;
    attach_relay(&piece, board).await?;
    Ok(piece)
}

async fn add_on_home_rank(
    board: &BoardHandle,
    file: u8,
    kind: PieceKind,
    color: PieceColor,
) -> Result<PieceHandle, BoardError> {
    let rank = match kind {
        PieceKind::Pawn => color.pawn_rank(),
        _ => color.back_rank(),
    };
    add_piece(board, Coords::at(file, rank), PieceType::new(kind, color)).await
}

/// Add a pawn on `file` of `color`'s pawn rank.
pub async fn add_pawn(
    board: &BoardHandle,
    file: u8,
    color: PieceColor,
) -> Result<PieceHandle, BoardError> {
    add_on_home_rank(board, file, PieceKind::Pawn, color).await
}

pub async fn add_knight(
    board: &BoardHandle,
    file: u8,
    color: PieceColor,
) -> Result<PieceHandle, BoardError> {
    add_on_home_rank(board, file, PieceKind::Knight, color).await
}

pub async fn add_bishop(
    board: &BoardHandle,
    file: u8,
    color: PieceColor,
) -> Result<PieceHandle, BoardError> {
    add_on_home_rank(board, file, PieceKind::Bishop, color).await
}

pub async fn add_rook(
    board: &BoardHandle,
    file: u8,
    color: PieceColor,
) -> Result<PieceHandle, BoardError> {
    add_on_home_rank(board, file, PieceKind::Rook, color).await
}

/// Add `color`'s queen on the D file.
pub async fn add_queen(board: &BoardHandle, color: PieceColor) -> Result<PieceHandle, BoardError> {
    add_on_home_rank(board, 3, PieceKind::Queen, color).await
}

/// Add `color`'s king on the E file.
pub async fn add_king(board: &BoardHandle, color: PieceColor) -> Result<PieceHandle, BoardError> {
    add_on_home_rank(board, 4, PieceKind::King, color).await
}

/// Place one side's sixteen pieces in the standard starting position.
pub async fn init_side(
    board: &BoardHandle,
    color: PieceColor,
) -> Result<Vec<PieceHandle>, BoardError> {
    let mut pieces = Vec::with_capacity(16);
    for file in 0..8 {
        pieces.push(add_pawn(board, file, color).await?);
    }
    pieces.push(add_rook(board, 0, color).await?);
    pieces.push(add_knight(board, 1, color).await?);
    pieces.push(add_bishop(board, 2, color).await?);
    pieces.push(add_queen(board, color).await?);
    pieces.push(add_king(board, color).await?);
    pieces.push(add_bishop(board, 5, color).await?);
    pieces.push(add_knight(board, 6, color).await?);
    pieces.push(add_rook(board, 7, color).await?);
    Ok(pieces)
}

/// Fill an empty board with the standard 32-piece starting position.
pub async fn init_board(board: &BoardHandle) -> Result<Vec<PieceHandle>, BoardError> {
    let mut pieces = init_side(board, PieceColor::White).await?;
    pieces.extend(init_side(board, PieceColor::Black).await?);
    Ok(pieces)
}

/// Remove and terminate every piece on the board. Returns how many were removed.
pub async fn clear_board(board: &BoardHandle) -> Result<usize, BoardError> {
    // Drain the enumeration before removing anything: the coordinator cannot
    // take a removal while it is still streaming.
    let pieces = board.pieces().await?;
    for piece in &pieces {
        board.remove_piece(piece).await?;
    }
    debug!(removed = pieces.len(), "board cleared");
    Ok(pieces.len())
}
