//! Message relay between two endpoints.

use tracing::{debug, warn};

use crate::channel::{ChannelError, Endpoint};

/// Forward every message from `source` to `sink`, unmodified, until the
/// source reaches end-of-stream.
///
/// Returns the number of messages forwarded. Stops at the first receive or
/// forward error; when a forward fails the relay closes the rejected
/// message's attachment itself, since the sink never took ownership.
/// Neither endpoint is closed here.
pub async fn relay(source: &mut Endpoint, sink: &Endpoint) -> Result<usize, ChannelError> {
    let mut forwarded = 0usize;
    loop {
        let message = match source.recv().await {
            Ok(message) => message,
            Err(ChannelError::EndOfStream) => {
                debug!(forwarded, "relay reached end of stream");
                return Ok(forwarded);
            }
            Err(err) => {
                warn!(forwarded, error = %err, "relay: receive failed");
                return Err(err);
            }
        };
        if let Err(err) = sink.send_message(message).await {
            let mut rejected = err.into_message();
            rejected.discard_attachment();
            warn!(forwarded, "relay: sink is closed, dropping message");
            return Err(ChannelError::BrokenChannel);
        }
        forwarded += 1;
    }
}
