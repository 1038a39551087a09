//! Board demo: standard position, 1. d4, clear, shut down.
//!
//! Run with: `cargo run --package board-demo`
//! Set `RUST_LOG=chess_actors=debug` for relay and coordinator detail.

use chess_actors::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chess_actors=info,board_demo=info")),
        )
        .init();

    let (board, done) = spawn_board(BoardConfig::default())?;

    let pieces = init_board(&board).await?;
    tracing::info!(pieces = pieces.len(), "board set up");

    // Open with the queen's pawn.
    board.move_piece_str("D2", "D4").await?;

    let removed = clear_board(&board).await?;
    tracing::info!(removed, "board cleared");

    // Relays exit as their pieces stop; the coordinator finishes once the
    // last of them lets go of its handle.
    drop(board);
    done.wait().await?;
    tracing::info!("board coordinator finished");
    Ok(())
}
