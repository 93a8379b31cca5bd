//! Recursive pipeline executor.
//!
//! The [`Pipeline`] runs a script tree. For each command it:
//!
//! 1. Resolves the handler by name (failing with `no such command`)
//! 2. Creates an input pair and an output pair
//! 3. Spawns the handler on the private ends, closing its output when it
//!    returns
//! 4. Relays the handler's output to the caller's destination, concurrently
//!    with
//! 5. Executing the children depth-first with the input pair's public end as
//!    their destination, then closing that end
//! 6. Joining the handler and the relay before returning the first error
//!
//! The caller's destination is never closed here.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{Instrument, debug, info_span};

use crate::channel::{Endpoint, pair};
use crate::core::script::{CommandNode, render_script};
use crate::handlers::{HandlerError, HandlerRegistry};

use super::relay::relay;

/// Default bound of each direction of a channel pair.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors that stop script execution.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The command name is not registered.
    #[error("no such command: {0}")]
    NoSuchCommand(String),

    /// A command node without any arguments.
    #[error("empty command")]
    EmptyCommand,

    /// The handler reported a failure.
    #[error("command '{command}' failed: {source}")]
    HandlerFailed {
        command: String,
        #[source]
        source: HandlerError,
    },

    /// The handler task panicked or was cancelled.
    #[error("command '{command}' did not complete: {reason}")]
    HandlerPanicked { command: String, reason: String },
}

/// Executes script trees against a handler registry.
pub struct Pipeline {
    registry: Arc<HandlerRegistry>,
    channel_capacity: usize,
}

impl Pipeline {
    /// Create a pipeline over the given registry.
    pub fn new(registry: HandlerRegistry) -> Self {
        Self::with_shared_registry(Arc::new(registry))
    }

    /// Create a pipeline sharing an existing registry.
    pub fn with_shared_registry(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            registry,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Set the per-direction queue bound of the pairs this pipeline creates.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Verify that every command in the tree resolves, without running
    /// anything.
    pub fn check(&self, script: &[CommandNode]) -> Result<(), PipelineError> {
        let mut first_error = None;
        for node in script {
            node.walk(&mut |n| {
                if first_error.is_some() {
                    return;
                }
                match n.name() {
                    None => first_error = Some(PipelineError::EmptyCommand),
                    Some(name) if !self.registry.contains(name) => {
                        first_error = Some(PipelineError::NoSuchCommand(name.to_string()))
                    }
                    Some(_) => {}
                }
            });
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Execute `script` in order, sending top-level output to `destination`.
    ///
    /// Stops at the first failing command; later siblings are not started.
    pub async fn execute_script(
        &self,
        destination: &Endpoint,
        script: &[CommandNode],
    ) -> Result<(), PipelineError> {
        debug!(script = %render_script(script), "execute_script");
        for node in script {
            self.execute(destination, node).await?;
        }
        debug!(script = %render_script(script), "execute_script done");
        Ok(())
    }

    /// Execute one command node and its children.
    pub fn execute<'a>(
        &'a self,
        destination: &'a Endpoint,
        node: &'a CommandNode,
    ) -> BoxFuture<'a, Result<(), PipelineError>> {
        let command = node.args().join(" ");
        let span = info_span!("command", command = %command);
        Box::pin(self.execute_command(destination, node, command).instrument(span))
    }

    async fn execute_command(
        &self,
        destination: &Endpoint,
        node: &CommandNode,
        command: String,
    ) -> Result<(), PipelineError> {
        let name = node.name().ok_or(PipelineError::EmptyCommand)?;
        let handler = self
            .registry
            .lookup(name)
            .ok_or_else(|| PipelineError::NoSuchCommand(name.to_string()))?;
        debug!("execute_command");

        let (input_public, mut input_private) = pair(self.channel_capacity);
        let (mut output_public, mut output_private) = pair(self.channel_capacity);

        let args = node.args().to_vec();
        let handler_task = tokio::spawn(
            async move {
                let result = handler.run(&args, &mut input_private, &output_private).await;
                debug!("handler returned, closing output");
                output_private.close();
                result
            }
            .in_current_span(),
        );

        let relay_task = async {
            debug!("relay start");
            if let Err(err) = relay(&mut output_public, destination).await {
                // A dead relay must not leave the handler blocked on a full queue.
                output_public.close();
                debug!(error = %err, "relay aborted");
            }
            debug!("relay done");
        };

        let children_task = async move {
            let mut input_public = input_public;
            let result = self.execute_script(&input_public, node.children()).await;
            // Only now is it certain no child will write again.
            input_public.close();
            result
        };

        let ((), children_result) = tokio::join!(relay_task, children_task);
        debug!("waiting for handler");
        let handler_result = handler_task.await;
        debug!("handler and relay complete");

        children_result?;
        match handler_result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(PipelineError::HandlerFailed { command, source }),
            Err(err) => Err(PipelineError::HandlerPanicked {
                command,
                reason: err.to_string(),
            }),
        }
    }
}
