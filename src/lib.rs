//! pipetree - run tree-shaped command scripts as networks of handlers.
//!
//! Every command in a script runs as a handler connected to its parent and
//! children by duplex message channels. A command's children execute with
//! their output feeding its input, and its own output is relayed upward to
//! its caller. Messages carry a byte payload and, optionally, an attachment
//! (such as an open file) whose ownership moves with the message.

pub mod channel;
pub mod config;
pub mod core;
pub mod execution;
pub mod handlers;
pub mod testing;

pub use channel::{Attachment, AttachmentId, ChannelError, Endpoint, Message, SendError, pair};
pub use config::{ConfigError, NodeConfig, PipelineSettings, ScriptFile, ScriptLoader};
pub use crate::core::fields::{CodecError, Fields};
pub use crate::core::script::{CommandNode, render_script};
pub use execution::{DEFAULT_CHANNEL_CAPACITY, DiscardSink, Pipeline, PipelineError, relay};
pub use handlers::{EMIT_KEY, Emit, Handler, HandlerError, HandlerRegistry, OpenFile, Print, Trace};
