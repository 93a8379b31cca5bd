//! Testing utilities for users of the pipetree library.
//!
//! This module provides helpers for testing handlers and pipelines:
//!
//! - [`collect`]: A destination endpoint whose peer gathers every message
//! - [`tracked_attachment`]: An in-memory attachment that counts its closes
//! - [`SharedBuffer`]: An in-memory writer, e.g. for [`Print::with_writer`]
//!
//! [`Print::with_writer`]: crate::handlers::Print::with_writer

use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::task::JoinHandle;

use crate::channel::{Attachment, Endpoint, Message, pair};

/// Create a destination whose peer collects every message it receives.
///
/// Close (or drop) the returned endpoint to end collection, then await the
/// handle for the messages in arrival order.
///
/// # Example
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use pipetree::testing::collect;
///
/// let (mut destination, collected) = collect(8);
/// destination.send("hello", None).await.unwrap();
/// destination.close();
///
/// let messages = collected.await.unwrap();
/// assert_eq!(messages[0].payload, b"hello");
/// # }
/// ```
pub fn collect(capacity: usize) -> (Endpoint, JoinHandle<Vec<Message>>) {
    let (public, mut private) = pair(capacity);
    let handle = tokio::spawn(async move {
        let mut messages = Vec::new();
        while let Ok(message) = private.recv().await {
            messages.push(message);
        }
        messages
    });
    (public, handle)
}

/// Observes how many times a tracked attachment was closed.
#[derive(Debug, Clone, Default)]
pub struct CloseProbe {
    closes: Arc<AtomicUsize>,
}

impl CloseProbe {
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closes() > 0
    }
}

struct TrackedReader {
    inner: Cursor<Vec<u8>>,
    closes: Arc<AtomicUsize>,
}

impl AsyncRead for TrackedReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl Drop for TrackedReader {
    fn drop(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// An in-memory attachment reading `contents`, paired with a probe that
/// counts how often it was closed.
pub fn tracked_attachment(label: &str, contents: &[u8]) -> (Attachment, CloseProbe) {
    let probe = CloseProbe::default();
    let reader = TrackedReader {
        inner: Cursor::new(contents.to_vec()),
        closes: Arc::clone(&probe.closes),
    };
    (Attachment::from_reader(label, reader), probe)
}

/// A cloneable in-memory writer; clones share the same bytes.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.bytes
            .lock()
            .map(|bytes| bytes.clone())
            .unwrap_or_default()
    }
}

impl AsyncWrite for SharedBuffer {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.bytes.lock() {
            Ok(mut bytes) => {
                bytes.extend_from_slice(buf);
                Poll::Ready(Ok(buf.len()))
            }
            Err(_) => Poll::Ready(Err(io::Error::other("buffer lock poisoned"))),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
