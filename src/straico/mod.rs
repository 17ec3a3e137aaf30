//! Straico API adapter core.
//!
//! Requests flow through [`request::build`], [`auth::attach`] and a
//! [`transport::Transport`], driven item by item by
//! [`processor::ItemProcessor`].

/// Bearer-token credentials and credential stores.
pub mod auth;
/// Error taxonomy shared by the core.
pub mod error;
/// Flattening of responses into the output sequence.
pub mod normalize;
/// Resources, operations and the routing table.
pub mod operation;
/// Input items and parameter/binary collaborators.
pub mod params;
/// Per-batch item processing.
pub mod processor;
/// Request descriptors and the request builder.
pub mod request;
/// HTTP execution of request descriptors.
pub mod transport;

pub use error::{StraicoError, TransportError};
pub use operation::{Operation, Resource, Route};
pub use params::{Attachment, Batch, InputItem};
pub use processor::{ItemProcessor, ProcessorOptions};
