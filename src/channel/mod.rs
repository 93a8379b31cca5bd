//! Message channels between handlers.
//!
//! This module provides the duplex endpoints that connect every command to
//! its parent and children, and the attachments that ride along with
//! messages.

mod attachment;
mod endpoint;

pub use attachment::{Attachment, AttachmentId};
pub use endpoint::{ChannelError, Endpoint, Message, SendError, pair};
