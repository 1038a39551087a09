//! Piece actors.
//!
//! Each piece is a tokio task that owns its square and type. Other tasks talk
//! to it only through its mailbox, using [`PieceHandle`]. Requests that need
//! an answer carry a fresh `oneshot` sender that the actor consumes.

use crate::config::BoardConfig;
use crate::error::BoardError;
use crate::types::{Coords, PieceId, PieceType};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::ControlFlow;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, trace, warn};

/// Operations accepted by a piece actor's mailbox.
#[derive(Debug)]
pub enum PieceOp {
    /// Move the piece and notify the move subscriber, if any. The
    /// notification never blocks the piece.
    SetCoords(Coords),
    GetCoords(oneshot::Sender<Coords>),
    SetType(PieceType),
    GetType(oneshot::Sender<PieceType>),
    /// Replace the move subscriber. `None` cancels the subscription.
    SubscribeMoves(Option<mpsc::Sender<Coords>>),
    /// Close the move subscription, acknowledge, and stop.
    Terminate(oneshot::Sender<()>),
}

/// Address of a running piece actor.
///
/// Handles are cheap to clone and compare by [`PieceId`].
#[derive(Clone)]
pub struct PieceHandle {
    id: PieceId,
    mailbox: mpsc::Sender<PieceOp>,
}

/// Spawn a new piece actor on the current tokio runtime.
///
/// The piece starts on A1 as a white pawn and accepts messages immediately.
pub fn spawn_piece(config: &BoardConfig) -> PieceHandle {
    let id = PieceId::next();
    let (mailbox, inbox) = mpsc::channel(config.piece_mailbox_capacity);
    let actor = PieceActor {
        id,
        coords: Coords::at(0, 0),
        piece_type: PieceType::default(),
        subscriber: None,
        pending: None,
    };
    tokio::spawn(actor.run(inbox));
    PieceHandle { id, mailbox }
}

impl PieceHandle {
    pub fn id(&self) -> PieceId {
        self.id
    }

    /// Deliver a raw operation to the piece's mailbox.
    pub async fn send(&self, op: PieceOp) -> Result<(), BoardError> {
        self.mailbox
            .send(op)
            .await
            .map_err(|_| self.unavailable())
    }

    pub async fn set_coords(&self, coords: Coords) -> Result<(), BoardError> {
        self.send(PieceOp::SetCoords(coords)).await
    }

    pub async fn coords(&self) -> Result<Coords, BoardError> {
        let (tx, rx) = oneshot::channel();
        self.send(PieceOp::GetCoords(tx)).await?;
        rx.await.map_err(|_| self.unavailable())
    }

    pub async fn set_type(&self, piece_type: PieceType) -> Result<(), BoardError> {
        self.send(PieceOp::SetType(piece_type)).await
    }

    pub async fn piece_type(&self) -> Result<PieceType, BoardError> {
        let (tx, rx) = oneshot::channel();
        self.send(PieceOp::GetType(tx)).await?;
        rx.await.map_err(|_| self.unavailable())
    }

    /// Route every future coordinate change of this piece to `subscriber`,
    /// replacing any previous subscriber. `None` cancels.
    pub async fn subscribe_moves(
        &self,
        subscriber: Option<mpsc::Sender<Coords>>,
    ) -> Result<(), BoardError> {
        self.send(PieceOp::SubscribeMoves(subscriber)).await
    }

    /// Stop the piece and wait for its acknowledgment.
    ///
    /// Once this returns the move subscription is closed, so no further
    /// coordinate changes are published.
    pub async fn terminate(&self) -> Result<(), BoardError> {
        let (tx, rx) = oneshot::channel();
        self.send(PieceOp::Terminate(tx)).await?;
        rx.await.map_err(|_| self.unavailable())
    }

    /// Resolves once the actor task has dropped its mailbox.
    pub async fn stopped(&self) {
        self.mailbox.closed().await
    }

    /// Wrap a hand-driven mailbox, for tests that script a piece's replies.
    #[cfg(test)]
    pub(crate) fn from_parts(id: PieceId, mailbox: mpsc::Sender<PieceOp>) -> Self {
        Self { id, mailbox }
    }

    fn unavailable(&self) -> BoardError {
        BoardError::PieceUnavailable { id: self.id }
    }
}

impl PartialEq for PieceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PieceHandle {}

impl Hash for PieceHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for PieceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PieceHandle").field("id", &self.id).finish()
    }
}

/// State owned by a single piece task.
struct PieceActor {
    id: PieceId,
    coords: Coords,
    piece_type: PieceType,
    subscriber: Option<mpsc::Sender<Coords>>,
    /// Latest position not yet accepted by a full subscriber channel.
    pending: Option<Coords>,
}

impl PieceActor {
    #[instrument(name = "piece", skip_all, fields(piece = %self.id))]
    async fn run(mut self, mut inbox: mpsc::Receiver<PieceOp>) {
        loop {
            let outbox = self.pending.and(self.subscriber.clone());
            tokio::select! {
                op = inbox.recv() => {
                    let Some(op) = op else { break };
                    trace!(?op, "piece op");
                    if self.handle(op).is_break() {
                        return;
                    }
                }
                permit = subscriber_ready(outbox) => self.flush(permit),
            }
        }
        warn!(
            square = %self.coords,
            "piece mailbox closed without Terminate"
        );
    }

    fn handle(&mut self, op: PieceOp) -> ControlFlow<()> {
        match op {
            PieceOp::SetCoords(coords) => {
                self.coords = coords;
                self.notify(coords);
            }
            PieceOp::GetCoords(reply) => {
                let _ = reply.send(self.coords);
            }
            PieceOp::SetType(piece_type) => self.piece_type = piece_type,
            PieceOp::GetType(reply) => {
                let _ = reply.send(self.piece_type);
            }
            PieceOp::SubscribeMoves(subscriber) => {
                self.subscriber = subscriber;
                self.pending = None;
            }
            PieceOp::Terminate(ack) => {
                // Dropping the sender ends the relay reading from it.
                self.subscriber = None;
                let _ = ack.send(());
                debug!(square = %self.coords, "piece terminated");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Publish `coords` without waiting on the subscriber. A full channel
    /// keeps only the newest position until there is room again.
    fn notify(&mut self, coords: Coords) {
        let Some(subscriber) = &self.subscriber else {
            return;
        };
        match subscriber.try_send(coords) {
            Ok(()) => self.pending = None,
            Err(TrySendError::Full(coords)) => {
                trace!(square = %coords, "move subscriber busy, coalescing");
                self.pending = Some(coords);
            }
            Err(TrySendError::Closed(_)) => self.drop_subscription(coords),
        }
    }

    fn flush(&mut self, permit: Option<mpsc::OwnedPermit<Coords>>) {
        let Some(coords) = self.pending.take() else {
            return;
        };
        match permit {
            Some(permit) => {
                permit.send(coords);
            }
            None => self.drop_subscription(coords),
        }
    }

    fn drop_subscription(&mut self, coords: Coords) {
        debug!(square = %coords, "move subscriber went away, dropping subscription");
        self.subscriber = None;
        self.pending = None;
    }
}

/// Resolves once `outbox` has room, or with `None` if it closed. Never
/// resolves without an outbox.
async fn subscriber_ready(
    outbox: Option<mpsc::Sender<Coords>>,
) -> Option<mpsc::OwnedPermit<Coords>> {
    match outbox {
        Some(outbox) => outbox.reserve_owned().await.ok(),
        None => std::future::pending().await,
    }
}
