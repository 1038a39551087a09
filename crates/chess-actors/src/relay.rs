//! Relays forward a piece's coordinate changes to the board coordinator.

use crate::board::BoardHandle;
use crate::error::BoardError;
use crate::piece::PieceHandle;
use crate::types::Coords;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, Instrument};

/// Spawn a task that re-announces every coordinate received on `updates` to
/// `board`, tagged with `piece`.
///
/// The task ends when `updates` closes, which happens when the piece is
/// terminated or its subscription is replaced, or when the board stops.
pub fn spawn_relay(
    piece: PieceHandle,
    mut updates: mpsc::Receiver<Coords>,
    board: BoardHandle,
) -> JoinHandle<()> {
    let span = tracing::debug_span!("relay", piece = %piece.id());
    tokio::spawn(
        async move {
            while let Some(square) = updates.recv().await {
                if board.upsert_piece(square, piece.clone()).await.is_err() {
                    debug!(%square, "board closed, relay stopping");
                    return;
                }
            }
            debug!("move stream closed, relay exiting");
        }
        .instrument(span),
    )
}

/// Subscribe a new relay to `piece` so its moves reach `board`.
pub async fn attach_relay(
    piece: &PieceHandle,
    board: &BoardHandle,
) -> Result<JoinHandle<()>, BoardError> {
    let (tx, rx) = mpsc::channel(board.config().move_subscription_capacity);
    piece.subscribe_moves(Some(tx)).await?;
    Ok(spawn_relay(piece.clone(), rx, board.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::spawn_board;
    use crate::config::BoardConfig;
    use crate::event::BoardEvent;
    use crate::piece::spawn_piece;
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    const WAIT: Duration = Duration::from_secs(1);

    async fn next_square(
        events: &mut (impl tokio_stream::Stream<Item = BoardEvent> + Unpin),
    ) -> Coords {
        match timeout(WAIT, events.next()).await.unwrap().unwrap() {
            BoardEvent::Placed { square, .. } => square,
            BoardEvent::Moved { to, .. } => to,
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn relay_forwards_moves_and_exits_on_terminate() {
        let (board, done) = spawn_board(BoardConfig::default()).unwrap();
        let mut events = board.events();

        let piece = spawn_piece(board.config());
        piece.set_coords(Coords::at(1, 0)).await.unwrap();
        board.upsert_piece(Coords::at(1, 0), piece.clone()).await.unwrap();
        let relay = attach_relay(&piece, &board).await.unwrap();
        assert_eq!(next_square(&mut events).await, Coords::at(1, 0));

        piece.set_coords(Coords::at(2, 2)).await.unwrap();
        assert_eq!(next_square(&mut events).await, Coords::at(2, 2));
        piece.set_coords(Coords::at(3, 4)).await.unwrap();
        assert_eq!(next_square(&mut events).await, Coords::at(3, 4));

        piece.terminate().await.unwrap();
        timeout(WAIT, relay).await.unwrap().unwrap();

        // The board keeps the stopped piece indexed until it is removed.
        assert_eq!(
            board.occupancy().await.unwrap(),
            vec![(Coords::at(3, 4), piece.clone())]
        );
        board.remove_piece(&piece).await.unwrap_err();
        assert!(board.occupancy().await.unwrap().is_empty());

        drop(board);
        timeout(WAIT, done.wait()).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn relay_exits_when_source_closes_and_releases_board() {
        let (board, done) = spawn_board(BoardConfig::default()).unwrap();
        let mut events = board.events();
        let (tx, rx) = mpsc::channel(4);
        let piece = spawn_piece(board.config());
        // The relay now holds the only board handle.
        let relay = spawn_relay(piece.clone(), rx, board);

        tx.send(Coords::at(0, 0)).await.unwrap();
        assert_eq!(next_square(&mut events).await, Coords::at(0, 0));

        drop(tx);
        timeout(WAIT, relay).await.unwrap().unwrap();
        timeout(WAIT, done.wait()).await.unwrap().unwrap();

        piece.terminate().await.unwrap();
    }
}
