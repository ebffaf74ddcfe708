use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Classified frame kinds emitted by the workflow backend.
///
/// The closed vocabulary covers the kinds the backend emits today; any other
/// label is preserved verbatim in `Other` (including the default `message`
/// label assigned to unlabeled frames) so the presentation layer can still
/// render it generically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Workflow run accepted; first frame of a query stream.
    Start,
    /// Progress update from one workflow stage.
    NodeUpdate,
    /// Terminal frame of a healthy run.
    Completion,
    /// Failure reported by the backend or synthesized by the session manager.
    Error,
    /// Connectivity-check frame from the test endpoint.
    Test,
    /// Any other label, passed through untouched.
    Other(String),
}

impl EventKind {
    /// Maps a frame's event-type label to a kind.
    pub fn from_label(label: &str) -> Self {
        match label {
            "start" => Self::Start,
            "node_update" => Self::NodeUpdate,
            "completion" => Self::Completion,
            "error" => Self::Error,
            "test" => Self::Test,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the wire label for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::NodeUpdate => "node_update",
            Self::Completion => "completion",
            Self::Error => "error",
            Self::Test => "test",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified frame, as stored in the event log.
///
/// `payload` is the frame body decoded as JSON, kept opaque here; the typed
/// views below are optional conveniences for the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamEvent {
    pub kind: EventKind,
    pub payload: Value,
}

impl StreamEvent {
    /// Creates an event from a classified kind and decoded body.
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self { kind, payload }
    }

    /// Decodes the payload into a typed view.
    ///
    /// Returns `None` when the payload does not match the requested shape;
    /// shape mismatches are never errors at this layer.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(self.payload.clone()).ok()
    }

    /// Returns the payload's `timestamp` field (unix seconds) when present.
    pub fn timestamp(&self) -> Option<f64> {
        self.payload.get("timestamp").and_then(Value::as_f64)
    }
}

/// Body of a `start` frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StartPayload {
    pub message: String,
    pub query: String,
    pub timestamp: f64,
}

/// Body of a `node_update` frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeUpdatePayload {
    /// Workflow stage that produced the update.
    pub node: String,
    /// Stage-specific fields; anything the stage omits stays `None`.
    #[serde(default)]
    pub payload: NodeUpdateDetails,
    pub timestamp: f64,
}

/// Known stage-specific fields of a `node_update` body.
///
/// Stages emit different subsets, so every field is optional and unknown
/// fields are ignored.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeUpdateDetails {
    #[serde(default)]
    pub step_summary: Option<Vec<String>>,
    #[serde(default)]
    pub next_step: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub todo: Option<Value>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub transcript_path: Option<String>,
    #[serde(default)]
    pub notion_parent_id: Option<String>,
}

/// Body of a `completion` frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompletionPayload {
    pub message: String,
    pub total_steps: u64,
    #[serde(default)]
    pub final_summary: Option<String>,
    pub timestamp: f64,
}

/// Body of an `error` frame (wire-emitted or synthesized).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub timestamp: f64,
}

/// Body of a `test` frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TestPayload {
    pub message: String,
    pub timestamp: f64,
}
