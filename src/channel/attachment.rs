//! Attachments: external resources that travel alongside a message.
//!
//! An [`Attachment`] has exactly one owner at a time. Sending it moves it into
//! the channel; receiving it moves it out to the receiver, who must either
//! forward it again or close it. Closing is dropping: the underlying resource
//! is released exactly once, whichever path ends its life.

use std::fmt;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};
use tracing::debug;

static NEXT_ATTACHMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachmentId(u64);

impl AttachmentId {
    fn next() -> Self {
        Self(NEXT_ATTACHMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the underlying number.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A readable resource handle conveyed with a message.
pub struct Attachment {
    id: AttachmentId,
    label: String,
    reader: Pin<Box<dyn AsyncRead + Send>>,
}

impl Attachment {
    /// Wrap any async reader as an attachment.
    pub fn from_reader(label: impl Into<String>, reader: impl AsyncRead + Send + 'static) -> Self {
        Self {
            id: AttachmentId::next(),
            label: label.into(),
            reader: Box::pin(reader),
        }
    }

    /// Wrap an open file, labelled with its path.
    pub fn from_file(path: impl AsRef<Path>, file: tokio::fs::File) -> Self {
        Self::from_reader(path.as_ref().display().to_string(), file)
    }

    /// Open a file for reading and wrap it.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        Ok(Self::from_file(path, file))
    }

    pub fn id(&self) -> AttachmentId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Release the underlying resource.
    pub fn close(self) {
        debug!(attachment = %self.id, label = %self.label, "closing attachment");
        drop(self);
    }
}

impl AsyncRead for Attachment {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.reader.as_mut().poll_read(cx, buf)
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.label)
    }
}
