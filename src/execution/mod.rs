//! Script execution engine.
//!
//! This module provides the recursive pipeline executor, the relay that moves
//! a command's output to its caller, and the discard sink used as the default
//! top-level destination.

mod pipeline;
mod relay;
mod sink;

pub use pipeline::{DEFAULT_CHANNEL_CAPACITY, Pipeline, PipelineError};
pub use relay::relay;
pub use sink::DiscardSink;
