//! Common imports for typical client usage.
pub use crate::{
    BackendConfig, ClientError, EventKind, HttpTransport, SessionManager, StreamEvent,
    StreamRequest, StreamTransport, SubscriptionState, TransportError,
};
