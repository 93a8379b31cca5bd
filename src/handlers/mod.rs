//! Command handlers.
//!
//! A [`Handler`] is the behaviour bound to a command name. It consumes
//! messages from an input endpoint and produces messages on an output
//! endpoint. Handlers are looked up by name in a [`HandlerRegistry`].

mod builtins;
mod registry;

use async_trait::async_trait;
use thiserror::Error;

use crate::channel::{ChannelError, Endpoint};
use crate::core::fields::CodecError;

pub use builtins::{EMIT_KEY, Emit, OpenFile, Print, Trace};
pub use registry::HandlerRegistry;

/// Errors a handler may report back to the executor.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A channel operation failed in a way the handler could not absorb.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// A payload could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// I/O on an attachment or the process streams failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Handler-specific failure.
    #[error("{0}")]
    Failed(String),
}

/// The behaviour of one command.
///
/// `args[0]` is the command name as written in the script. The executor owns
/// both endpoints; it closes `output` once `run` returns, which is what tells
/// downstream consumers that this command is done.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use pipetree::{Endpoint, Handler, HandlerError};
///
/// struct Count;
///
/// #[async_trait]
/// impl Handler for Count {
///     async fn run(
///         &self,
///         _args: &[String],
///         input: &mut Endpoint,
///         output: &Endpoint,
///     ) -> Result<(), HandlerError> {
///         let mut n = 0;
///         while input.recv().await.is_ok() {
///             n += 1;
///         }
///         let _ = output.send(n.to_string(), None).await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync {
    /// Run the command to completion.
    async fn run(
        &self,
        args: &[String],
        input: &mut Endpoint,
        output: &Endpoint,
    ) -> Result<(), HandlerError>;

    /// One-line description for listings.
    fn description(&self) -> Option<&str> {
        None
    }
}
