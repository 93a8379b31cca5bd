//! Reference handlers: `trace`, `emit`, `print` and `openfile`.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use super::{Handler, HandlerError};
use crate::channel::{Attachment, ChannelError, Endpoint};
use crate::core::fields::Fields;

/// Key under which `emit` places its arguments.
pub const EMIT_KEY: &str = "emit";

/// Logs every input message and forwards it unchanged.
pub struct Trace;

#[async_trait]
impl Handler for Trace {
    async fn run(
        &self,
        _args: &[String],
        input: &mut Endpoint,
        output: &Endpoint,
    ) -> Result<(), HandlerError> {
        loop {
            let message = match input.recv().await {
                Ok(message) => message,
                Err(ChannelError::EndOfStream) => return Ok(()),
                Err(err) => return Err(err.into()),
            };
            let attachment = message
                .attachment
                .as_ref()
                .map(|a| a.id().to_string())
                .unwrap_or_else(|| "-".to_string());
            info!("[TRACE] {} [{}]", message.payload_lossy(), attachment);

            // Keep draining after a failed forward so upstream never blocks.
            if let Err(err) = output.send_message(message).await {
                warn!(error = %err, "trace: forward failed");
                if let Some(attachment) = err.into_attachment() {
                    attachment.close();
                }
            }
        }
    }

    fn description(&self) -> Option<&str> {
        Some("log each input message and pass it on")
    }
}

/// Sends one message holding its arguments, ignoring input.
pub struct Emit;

#[async_trait]
impl Handler for Emit {
    async fn run(
        &self,
        args: &[String],
        _input: &mut Endpoint,
        output: &Endpoint,
    ) -> Result<(), HandlerError> {
        let fields = Fields::new().set(EMIT_KEY, args.iter().skip(1).cloned());
        if let Err(err) = output.send(fields.encode()?, None).await {
            warn!(error = %err, "emit: send failed");
        }
        Ok(())
    }

    fn description(&self) -> Option<&str> {
        Some("send the arguments as one message")
    }
}

type WriterFactory = Arc<dyn Fn() -> Box<dyn AsyncWrite + Send + Unpin> + Send + Sync>;

/// Streams the contents of every input attachment to a writer, then closes
/// the attachment. Messages without attachment are dropped.
pub struct Print {
    open_writer: WriterFactory,
}

impl Print {
    /// Print to the process's standard output.
    pub fn stdout() -> Self {
        Self::with_writer(tokio::io::stdout)
    }

    /// Print to writers produced by `make`, one per run.
    pub fn with_writer<W, F>(make: F) -> Self
    where
        F: Fn() -> W + Send + Sync + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            open_writer: Arc::new(move || {
                Box::new(make()) as Box<dyn AsyncWrite + Send + Unpin>
            }),
        }
    }
}

#[async_trait]
impl Handler for Print {
    async fn run(
        &self,
        _args: &[String],
        input: &mut Endpoint,
        _output: &Endpoint,
    ) -> Result<(), HandlerError> {
        let mut out = (self.open_writer)();
        loop {
            let message = match input.recv().await {
                Ok(message) => message,
                Err(ChannelError::EndOfStream) => break,
                Err(err) => return Err(err.into()),
            };
            let Some(mut attachment) = message.attachment else {
                continue;
            };
            let copied = tokio::io::copy(&mut attachment, &mut out).await;
            let label = attachment.label().to_string();
            attachment.close();
            match copied {
                Ok(bytes) => debug!(attachment = %label, bytes, "print: copied"),
                Err(err) => warn!(attachment = %label, error = %err, "print: copy failed"),
            }
        }
        if let Err(err) = out.flush().await {
            warn!(error = %err, "print: flush failed");
        }
        Ok(())
    }

    fn description(&self) -> Option<&str> {
        Some("write attached contents to standard output")
    }
}

/// Opens each argument as a file and sends it as an attachment.
///
/// Paths that cannot be opened are skipped.
pub struct OpenFile;

#[async_trait]
impl Handler for OpenFile {
    async fn run(
        &self,
        args: &[String],
        _input: &mut Endpoint,
        output: &Endpoint,
    ) -> Result<(), HandlerError> {
        for path in args.iter().skip(1) {
            let attachment = match Attachment::open(path).await {
                Ok(attachment) => attachment,
                Err(err) => {
                    debug!(path = %path, error = %err, "openfile: skipping");
                    continue;
                }
            };
            let payload = Fields::new()
                .set("path", [path.as_str()])
                .set("type", ["file"])
                .encode()?;
            if let Err(err) = output.send(payload, Some(attachment)).await {
                warn!(path = %path, error = %err, "openfile: send failed");
                if let Some(attachment) = err.into_attachment() {
                    attachment.close();
                }
            }
        }
        Ok(())
    }

    fn description(&self) -> Option<&str> {
        Some("open files and send them downstream")
    }
}
