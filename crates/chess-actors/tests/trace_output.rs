//! The coordinator's trace lines, as seen by a `tracing` subscriber.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chess_actors::prelude::*;
use tokio::time::timeout;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// The default `#[tokio::test]` runtime is single threaded, so every spawned
// actor logs through the subscriber installed on the test thread.
#[tokio::test]
async fn placement_move_and_removal_are_traced() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let (board, done) = spawn_board(BoardConfig::default()).unwrap();
    let pawn = add_piece(
        &board,
        Coords::at(3, 1),
        PieceType::new(PieceKind::Pawn, PieceColor::White),
    )
    .await
    .unwrap();
    board.move_piece_str("D2", "D4").await.unwrap();
    board.remove_piece(&pawn).await.unwrap();
    drop(board);
    timeout(Duration::from_secs(2), done.wait())
        .await
        .unwrap()
        .unwrap();

    let text = captured.text();
    let lines: Vec<&str> = text.lines().collect();

    let placed = lines
        .iter()
        .find(|line| line.contains("new piece placed"))
        .expect("placement traced");
    assert!(placed.contains("New piece: ♙ on D2"), "{placed}");
    assert!(placed.contains("kind=pawn"), "{placed}");

    let moved = lines
        .iter()
        .find(|line| line.contains("piece moved"))
        .expect("move traced");
    assert!(moved.contains("Move: ♙ from D2 to D4"), "{moved}");
    assert!(moved.contains("kind=pawn"), "{moved}");
    assert!(moved.contains("color=white"), "{moved}");

    let deleted = lines
        .iter()
        .find(|line| line.contains("piece deleted"))
        .expect("removal traced");
    assert!(deleted.contains("from D4"), "{deleted}");
    assert!(deleted.contains("square=D4"), "{deleted}");

    // The relay's re-announcement of D4 does not produce a second move line.
    assert_eq!(
        lines.iter().filter(|line| line.contains("piece moved")).count(),
        1
    );
}
