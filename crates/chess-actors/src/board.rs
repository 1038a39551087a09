//! The board coordinator.
//!
//! A single tokio task owns the map from square to piece handle. Everything
//! else reaches it through [`BoardHandle`], so the map has exactly one writer
//! and needs no lock. Operations are applied one at a time in mailbox order;
//! while an operation waits on a piece (type and coordinate queries,
//! termination acknowledgments) no other board operation runs.

use crate::config::BoardConfig;
use crate::error::{BoardError, Fault};
use crate::event::BoardEvent;
use crate::piece::PieceHandle;
use crate::types::{Coords, PieceId};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, ReceiverStream};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, instrument, warn};

/// Operations accepted by the board coordinator's mailbox.
#[derive(Debug)]
pub enum BoardOp {
    /// Index `piece` under `square`, either as a new registration or as the
    /// latest position of an already registered piece.
    UpsertPiece { square: Coords, piece: PieceHandle },
    /// Move whatever stands on `from` to `to`.
    MovePiece {
        from: Coords,
        to: Coords,
        reply: oneshot::Sender<Result<(), BoardError>>,
    },
    /// Stream every registered piece, then close the channel.
    EnumerateAllPieces(mpsc::Sender<PieceHandle>),
    /// Terminate `piece` and drop it from the board.
    RemovePiece {
        piece: PieceHandle,
        done: oneshot::Sender<Result<(), BoardError>>,
    },
    /// Copy of the current square → piece index.
    Occupancy(oneshot::Sender<Vec<(Coords, PieceHandle)>>),
}

/// Parse a move given as two human-readable squares, e.g. `("D2", "D4")`.
pub fn parse_move(from: &str, to: &str) -> Result<(Coords, Coords), BoardError> {
    Ok((from.parse()?, to.parse()?))
}

/// Spawn the board coordinator on the current tokio runtime.
///
/// The coordinator runs until every [`BoardHandle`] is dropped, including the
/// clones held by relays, or until it hits a [`Fault`]. Await the returned
/// [`BoardDone`] to know when it has finished.
pub fn spawn_board(config: BoardConfig) -> Result<(BoardHandle, BoardDone), BoardError> {
    config.validate()?;
    let config = Arc::new(config);

    let (mailbox, inbox) = mpsc::channel(config.board_mailbox_capacity);
    let (events, _) = broadcast::channel(config.event_capacity);
    let (done_tx, done_rx) = oneshot::channel();

    let coordinator = Coordinator {
        squares: HashMap::new(),
        events: events.clone(),
    };
    tokio::spawn(coordinator.run(inbox, done_tx));

    Ok((
        BoardHandle {
            mailbox,
            events,
            config,
        },
        BoardDone { rx: done_rx },
    ))
}

/// Client side of the board coordinator's mailbox.
#[derive(Clone)]
pub struct BoardHandle {
    mailbox: mpsc::Sender<BoardOp>,
    events: broadcast::Sender<BoardEvent>,
    config: Arc<BoardConfig>,
}

impl BoardHandle {
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Deliver a raw operation to the coordinator's mailbox.
    pub async fn send(&self, op: BoardOp) -> Result<(), BoardError> {
        self.mailbox
            .send(op)
            .await
            .map_err(|_| BoardError::BoardClosed)
    }

    /// Announce that `piece` stands on `square`.
    ///
    /// This does not wait for the coordinator to apply it. Placing a piece on
    /// a square held by another piece is a contract violation that stops the
    /// coordinator.
    pub async fn upsert_piece(
        &self,
        square: Coords,
        piece: PieceHandle,
    ) -> Result<(), BoardError> {
        self.send(BoardOp::UpsertPiece { square, piece }).await
    }

    /// Move the piece on `from` to `to`.
    ///
    /// Returns [`BoardError::NoPieceAt`] if `from` is empty. Moving onto an
    /// occupied square is a contract violation: the coordinator stops and the
    /// fault is returned here as well as through [`BoardDone`].
    pub async fn move_piece(&self, from: Coords, to: Coords) -> Result<(), BoardError> {
        let (reply, rx) = oneshot::channel();
        self.send(BoardOp::MovePiece { from, to, reply }).await?;
        rx.await.map_err(|_| BoardError::BoardClosed)?
    }

    /// [`move_piece`](Self::move_piece) with human-readable squares.
    pub async fn move_piece_str(&self, from: &str, to: &str) -> Result<(), BoardError> {
        let (from, to) = parse_move(from, to)?;
        self.move_piece(from, to).await
    }

    /// Stream the registered pieces.
    ///
    /// The coordinator hands pieces over one at a time and is blocked until
    /// the stream is drained or dropped, so do not send it other requests
    /// while consuming. The board may change as soon as the stream ends.
    pub async fn pieces_stream(&self) -> Result<ReceiverStream<PieceHandle>, BoardError> {
        let (tx, rx) = mpsc::channel(self.config.enumeration_capacity);
        self.send(BoardOp::EnumerateAllPieces(tx)).await?;
        Ok(ReceiverStream::new(rx))
    }

    /// Collect every registered piece.
    pub async fn pieces(&self) -> Result<Vec<PieceHandle>, BoardError> {
        Ok(self.pieces_stream().await?.collect().await)
    }

    /// Terminate `piece` and remove it from the board.
    pub async fn remove_piece(&self, piece: &PieceHandle) -> Result<(), BoardError> {
        let (done, rx) = oneshot::channel();
        self.send(BoardOp::RemovePiece {
            piece: piece.clone(),
            done,
        })
        .await?;
        rx.await.map_err(|_| BoardError::BoardClosed)?
    }

    /// Snapshot of which piece stands on which square.
    pub async fn occupancy(&self) -> Result<Vec<(Coords, PieceHandle)>, BoardError> {
        let (tx, rx) = oneshot::channel();
        self.send(BoardOp::Occupancy(tx)).await?;
        rx.await.map_err(|_| BoardError::BoardClosed)
    }

    /// The piece the coordinator has indexed under `square`, if any.
    pub async fn piece_at(&self, square: Coords) -> Result<Option<PieceHandle>, BoardError> {
        Ok(self
            .occupancy()
            .await?
            .into_iter()
            .find_map(|(at, piece)| (at == square).then_some(piece)))
    }

    /// Subscribe to board changes from now on.
    ///
    /// Subscribers that fall more than `event_capacity` events behind skip
    /// the missed events.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = BoardEvent> + Send>> {
        let stream = BroadcastStream::new(self.events.subscribe());
        Box::pin(stream.filter_map(|r: Result<BoardEvent, _>| match r {
            Ok(event) => Some(event),
            Err(BroadcastStreamRecvError::Lagged(count)) => {
                warn!(
                    lagged_count = count,
                    "board event subscriber lagged, {} events dropped", count
                );
                None
            }
        }))
    }
}

/// Completion signal of the board coordinator.
pub struct BoardDone {
    rx: oneshot::Receiver<Result<(), Fault>>,
}

impl BoardDone {
    /// Wait for the coordinator to exit.
    ///
    /// Resolves with `Ok(())` once all handles are dropped and in-flight work
    /// is finished, or with the fault that stopped it.
    pub async fn wait(self) -> Result<(), BoardError> {
        match self.rx.await {
            Ok(result) => result.map_err(BoardError::from),
            Err(_) => Err(BoardError::BoardClosed),
        }
    }
}

/// State owned by the coordinator task.
struct Coordinator {
    squares: HashMap<Coords, PieceHandle>,
    events: broadcast::Sender<BoardEvent>,
}

impl Coordinator {
    #[instrument(name = "board", skip_all)]
    async fn run(
        mut self,
        mut inbox: mpsc::Receiver<BoardOp>,
        done: oneshot::Sender<Result<(), Fault>>,
    ) {
        let result = loop {
            let Some(op) = inbox.recv().await else {
                debug!(pieces = self.squares.len(), "board mailbox closed");
                break Ok(());
            };
            if let Err(fault) = self.handle(op).await {
                error!(%fault, "board contract violation, stopping coordinator");
                break Err(fault);
            }
        };
        // Pending requests fail with `BoardClosed` once the inbox is dropped.
        drop(inbox);
        let _ = done.send(result);
    }

    async fn handle(&mut self, op: BoardOp) -> Result<(), Fault> {
        match op {
            BoardOp::UpsertPiece { square, piece } => self.upsert(square, piece).await,
            BoardOp::MovePiece { from, to, reply } => {
                let result = self.move_piece(from, to).await;
                match result {
                    Err(BoardError::Fault(fault)) => {
                        let _ = reply.send(Err(BoardError::Fault(fault.clone())));
                        Err(fault)
                    }
                    other => {
                        let _ = reply.send(other);
                        Ok(())
                    }
                }
            }
            BoardOp::EnumerateAllPieces(reply) => {
                // Snapshot first: the map cannot change while we stream, but
                // the consumer may hold us up for a while.
                let pieces: Vec<PieceHandle> = self.squares.values().cloned().collect();
                for piece in pieces {
                    if reply.send(piece).await.is_err() {
                        debug!("enumeration receiver dropped early");
                        break;
                    }
                }
                Ok(())
            }
            BoardOp::RemovePiece { piece, done } => {
                let _ = done.send(self.remove(piece).await);
                Ok(())
            }
            BoardOp::Occupancy(reply) => {
                let _ = reply.send(
                    self.squares
                        .iter()
                        .map(|(square, piece)| (*square, piece.clone()))
                        .collect(),
                );
                Ok(())
            }
        }
    }

    async fn upsert(&mut self, square: Coords, piece: PieceHandle) -> Result<(), Fault> {
        if self.squares.get(&square) == Some(&piece) {
            debug!(piece = %piece.id(), %square, "piece already indexed on square");
            return Ok(());
        }

        // The announcement may be stale: the piece can have moved again or
        // been removed while it sat in the mailbox.
        let current = match piece.coords().await {
            Ok(current) => current,
            Err(err) => {
                debug!(piece = %piece.id(), %square, %err, "dropping upsert for stopped piece");
                return Ok(());
            }
        };
        if current != square {
            debug!(piece = %piece.id(), %square, %current, "dropping stale upsert");
            return Ok(());
        }
        let piece_type = match piece.piece_type().await {
            Ok(piece_type) => piece_type,
            Err(err) => {
                debug!(piece = %piece.id(), %square, %err, "dropping upsert for stopped piece");
                return Ok(());
            }
        };

        if let Some(occupant) = self.squares.get(&square) {
            return Err(Fault::SquareOccupied {
                square,
                occupant: occupant.id(),
                incoming: piece.id(),
            });
        }

        let event = match self.square_of(piece.id()) {
            Some(from) => {
                self.squares.remove(&from);
                BoardEvent::Moved {
                    piece: piece.id(),
                    piece_type,
                    from,
                    to: square,
                }
            }
            None => BoardEvent::Placed {
                piece: piece.id(),
                piece_type,
                square,
            },
        };
        self.squares.insert(square, piece);
        self.publish(event);
        Ok(())
    }

    async fn move_piece(&mut self, from: Coords, to: Coords) -> Result<(), BoardError> {
        let Some(piece) = self.squares.get(&from).cloned() else {
            return Err(BoardError::NoPieceAt(from));
        };
        if from == to {
            debug!(piece = %piece.id(), square = %from, "move to the same square");
            return Ok(());
        }
        if let Some(occupant) = self.squares.get(&to) {
            return Err(Fault::SquareOccupied {
                square: to,
                occupant: occupant.id(),
                incoming: piece.id(),
            }
            .into());
        }
        let piece_type = piece.piece_type().await?;

        self.squares.remove(&from);
        self.squares.insert(to, piece.clone());
        // Keep the piece's own position in step. Its relay will announce the
        // new square, which is already indexed by then.
        if let Err(err) = piece.set_coords(to).await {
            warn!(piece = %piece.id(), %err, "moved piece stopped before taking its new square");
        }

        self.publish(BoardEvent::Moved {
            piece: piece.id(),
            piece_type,
            from,
            to,
        });
        Ok(())
    }

    async fn remove(&mut self, piece: PieceHandle) -> Result<(), BoardError> {
        let stopped = async {
            let square = piece.coords().await?;
            let piece_type = piece.piece_type().await?;
            piece.terminate().await?;
            Ok::<_, BoardError>((square, piece_type))
        }
        .await;
        let (square, piece_type) = match stopped {
            Ok(found) => found,
            Err(err) => {
                self.purge(piece.id());
                return Err(err);
            }
        };

        let removed_from = if self.squares.get(&square) == Some(&piece) {
            Some(square)
        } else {
            self.square_of(piece.id())
        };
        match removed_from {
            Some(square) => {
                self.squares.remove(&square);
                self.publish(BoardEvent::Removed {
                    piece: piece.id(),
                    piece_type,
                    square,
                });
            }
            None => debug!(piece = %piece.id(), %square, "terminated piece was not on the board"),
        }
        Ok(())
    }

    /// Drop the entry of a piece that stopped before it could be removed.
    fn purge(&mut self, id: PieceId) {
        if let Some(square) = self.square_of(id) {
            self.squares.remove(&square);
            warn!(piece = %id, %square, "removed entry of a piece that had already stopped");
        }
    }

    fn square_of(&self, id: PieceId) -> Option<Coords> {
        self.squares
            .iter()
            .find_map(|(square, piece)| (piece.id() == id).then_some(*square))
    }

    fn publish(&self, event: BoardEvent) {
        event.trace();
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
