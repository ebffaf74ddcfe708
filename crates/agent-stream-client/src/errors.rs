/// Failures reported by a stream transport.
///
/// These never reach the caller as a `Result`: the session manager absorbs
/// them and records a synthetic `error` event in the log instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the connection was refused.
    #[error("connect error: {message}")]
    Connect { message: String },
    /// The endpoint answered with a non-success status.
    #[error("http error (status {status}): {message}")]
    Http { status: u16, message: String },
    /// The established stream failed mid-read.
    #[error("read error: {message}")]
    Read { message: String },
}

impl TransportError {
    /// Creates a connect-level error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Creates an HTTP status error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a mid-stream read error.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Connect { message } | Self::Http { message, .. } | Self::Read { message } => {
                message
            }
        }
    }
}

/// Construction-time errors surfaced to the caller.
///
/// Everything after `start` is reported through the event log, so this only
/// covers invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Invalid backend or client configuration.
    #[error("config error: {0}")]
    Config(String),
}
