//! The discard sink: a default top-level destination.

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::channel::{Endpoint, pair};

/// A destination that logs and drops everything sent to it.
///
/// Create it once with [`spawn`](Self::spawn), lend out
/// [`endpoint`](Self::endpoint) to whatever needs a destination, and finish
/// with [`shutdown`](Self::shutdown). Attachments received are closed.
pub struct DiscardSink {
    endpoint: Endpoint,
    task: JoinHandle<usize>,
}

impl DiscardSink {
    /// Start the drain task.
    pub fn spawn(capacity: usize) -> Self {
        let (endpoint, mut private) = pair(capacity);
        let task = tokio::spawn(async move {
            let mut discarded = 0usize;
            while let Ok(mut message) = private.recv().await {
                info!("[devnull] discarding '{}'", message.payload_lossy());
                message.discard_attachment();
                discarded += 1;
            }
            private.close();
            discarded
        });
        Self { endpoint, task }
    }

    /// The endpoint to send discarded messages to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Close the sink and wait for the drain task. Returns how many messages
    /// were discarded.
    pub async fn shutdown(mut self) -> usize {
        self.endpoint.close();
        match self.task.await {
            Ok(discarded) => discarded,
            Err(err) => {
                warn!(error = %err, "discard sink task failed");
                0
            }
        }
    }
}
