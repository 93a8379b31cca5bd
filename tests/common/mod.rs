//! Common test utilities shared across integration tests.

use pipetree::testing::{SharedBuffer, collect};
use pipetree::{CommandNode, HandlerRegistry, Message, Pipeline, PipelineError, Print};
use std::sync::Arc;
use std::time::Duration;

/// Builtin registry whose `print` writes into the returned buffer.
pub fn registry_with_captured_print() -> (HandlerRegistry, SharedBuffer) {
    let buffer = SharedBuffer::new();
    let mut registry = HandlerRegistry::with_builtins();
    let writer = buffer.clone();
    registry.register("print", Arc::new(Print::with_writer(move || writer.clone())));
    (registry, buffer)
}

/// Run a script against a collecting destination.
///
/// Returns the execution result together with everything that reached the
/// destination.
///
/// # Panics
///
/// Panics if the script does not finish within five seconds.
pub async fn run_collecting(
    pipeline: &Pipeline,
    script: &[CommandNode],
) -> (Result<(), PipelineError>, Vec<Message>) {
    let (mut destination, collected) = collect(pipeline.channel_capacity());
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        pipeline.execute_script(&destination, script),
    )
    .await
    .expect("pipeline did not finish");
    destination.close();
    (result, collected.await.unwrap())
}
