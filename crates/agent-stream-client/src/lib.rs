//! Streaming client for a long-running agent workflow exposed over SSE.
//!
//! The crate is the core behind a live dashboard: it opens a single logical
//! subscription to a workflow run, decodes the wire protocol frame by frame,
//! classifies frames into typed events, and appends them to an ordered
//! event log. At most one subscription is active at a time; a new `start`
//! supersedes the previous one and no frame from a superseded transport can
//! ever reach the new log.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use agent_stream_client::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ClientError> {
//! let transport = HttpTransport::new(BackendConfig::from_env())?;
//! let manager = SessionManager::new(Arc::new(transport));
//!
//! let mut revision = manager.watch_revision();
//! manager.start(StreamRequest::query("Summarize the AI Sharing meeting"));
//! while manager.busy() {
//!     if revision.changed().await.is_err() {
//!         break;
//!     }
//! }
//! for event in manager.events() {
//!     println!("{}: {}", event.kind, event.payload);
//! }
//! # Ok(())
//! # }
//! ```

/// Backend endpoint configuration.
pub mod config;
/// Public error types.
pub mod errors;
/// Event kinds, the log entry type, and typed payload views.
pub mod event;
/// Common imports for typical usage.
pub mod prelude;
/// Subscription lifecycle and the event log.
pub mod session;
/// Wire-frame decoding and classification.
pub mod sse;
/// Transport seam and the HTTP implementation.
pub mod transport;

pub use config::BackendConfig;
pub use errors::{ClientError, TransportError};
pub use event::{
    CompletionPayload, ErrorPayload, EventKind, NodeUpdateDetails, NodeUpdatePayload, StartPayload,
    StreamEvent, TestPayload,
};
pub use session::{SessionManager, SubscriptionState};
pub use sse::{SseDecoder, SseFrame, classify_frame};
pub use transport::{FrameStream, FrameStreamHandle, HttpTransport, StreamRequest, StreamTransport};
