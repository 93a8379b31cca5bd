//! Duplex message endpoints.
//!
//! [`pair`] creates two linked [`Endpoint`]s. Each direction is a bounded FIFO
//! queue, so `send` suspends while the peer's queue is full and `recv`
//! suspends while it is empty. Closing an endpoint never blocks: it stops
//! outgoing traffic (the peer drains what is queued, then sees
//! [`ChannelError::EndOfStream`]) and refuses incoming traffic (the peer's
//! `send` fails with a [`SendError`]).

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use super::attachment::Attachment;

/// A discrete unit of transport: bytes plus an optional attachment.
#[derive(Debug)]
pub struct Message {
    pub payload: Vec<u8>,
    pub attachment: Option<Attachment>,
}

impl Message {
    /// A message without attachment.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            attachment: None,
        }
    }

    /// A message carrying an attachment.
    pub fn with_attachment(payload: impl Into<Vec<u8>>, attachment: Attachment) -> Self {
        Self {
            payload: payload.into(),
            attachment: Some(attachment),
        }
    }

    /// Payload rendered for logs.
    pub fn payload_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Close the attachment, if any, leaving only the payload.
    pub fn discard_attachment(&mut self) {
        if let Some(attachment) = self.attachment.take() {
            attachment.close();
        }
    }
}

/// Errors observed on a channel endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The peer has closed and nothing else is queued.
    #[error("end of stream")]
    EndOfStream,

    /// The peer is gone; nothing sent now will be received.
    #[error("broken channel")]
    BrokenChannel,
}

/// A rejected send.
///
/// Hands the message back so the caller stays responsible for its
/// attachment.
#[derive(Debug, Error)]
#[error("broken channel")]
pub struct SendError(pub Message);

impl SendError {
    pub fn into_message(self) -> Message {
        self.0
    }

    /// Take back the attachment of the rejected message.
    pub fn into_attachment(self) -> Option<Attachment> {
        self.0.attachment
    }
}

impl From<SendError> for ChannelError {
    fn from(err: SendError) -> Self {
        let mut message = err.0;
        message.discard_attachment();
        ChannelError::BrokenChannel
    }
}

/// One side of a duplex channel pair.
#[derive(Debug)]
pub struct Endpoint {
    tx: Option<mpsc::Sender<Message>>,
    rx: mpsc::Receiver<Message>,
}

/// Create a linked pair of endpoints.
///
/// `capacity` bounds each direction's queue; zero is treated as one.
pub fn pair(capacity: usize) -> (Endpoint, Endpoint) {
    let capacity = capacity.max(1);
    let (a_tx, b_rx) = mpsc::channel(capacity);
    let (b_tx, a_rx) = mpsc::channel(capacity);
    (
        Endpoint {
            tx: Some(a_tx),
            rx: a_rx,
        },
        Endpoint {
            tx: Some(b_tx),
            rx: b_rx,
        },
    )
}

impl Endpoint {
    /// Send a payload with an optional attachment to the peer.
    pub async fn send(
        &self,
        payload: impl Into<Vec<u8>>,
        attachment: Option<Attachment>,
    ) -> Result<(), SendError> {
        self.send_message(Message {
            payload: payload.into(),
            attachment,
        })
        .await
    }

    /// Send a prepared message to the peer.
    ///
    /// On failure the message comes back inside the error.
    pub async fn send_message(&self, message: Message) -> Result<(), SendError> {
        match &self.tx {
            Some(tx) => tx.send(message).await.map_err(|e| SendError(e.0)),
            None => Err(SendError(message)),
        }
    }

    /// Receive the next message from the peer.
    pub async fn recv(&mut self) -> Result<Message, ChannelError> {
        self.rx.recv().await.ok_or(ChannelError::EndOfStream)
    }

    /// Close this side. Idempotent.
    ///
    /// Messages that were queued to this side but never received are dropped
    /// and their attachments closed. A send that had already reserved queue
    /// space may still land after the drain; such messages are released, and
    /// their attachments closed, when this endpoint is dropped.
    pub fn close(&mut self) {
        if self.tx.take().is_none() {
            return;
        }
        self.rx.close();
        let mut dropped = 0usize;
        while let Ok(mut message) = self.rx.try_recv() {
            message.discard_attachment();
            dropped += 1;
        }
        if dropped > 0 {
            debug!(dropped, "closed endpoint with unread messages");
        }
    }

    /// Whether [`close`](Self::close) has been called on this side.
    pub fn is_closed(&self) -> bool {
        self.tx.is_none()
    }
}
