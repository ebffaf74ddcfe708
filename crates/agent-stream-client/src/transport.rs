use std::collections::VecDeque;
use std::pin::Pin;

use futures::StreamExt as _;
use futures::stream;
use tracing::debug;

use crate::config::BackendConfig;
use crate::errors::{ClientError, TransportError};
use crate::sse::{SseDecoder, SseFrame};

/// One subscription request, mapped to an endpoint by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamRequest {
    /// Free-text query routed through the workflow engine.
    Query { query: String },
    /// Connectivity check against the fixed test endpoint.
    Test,
}

impl StreamRequest {
    /// Creates a query-stream request.
    pub fn query(query: impl Into<String>) -> Self {
        Self::Query {
            query: query.into(),
        }
    }

    /// Short endpoint name used in logs.
    pub fn endpoint_name(&self) -> &'static str {
        match self {
            Self::Query { .. } => "query",
            Self::Test => "test-sse",
        }
    }
}

/// Boxed stream of decoded frames produced by a transport.
pub type FrameStream =
    Pin<Box<dyn futures::Stream<Item = Result<SseFrame, TransportError>> + Send + 'static>>;

/// Handle returned once the endpoint accepted the subscription request.
pub struct FrameStreamHandle {
    pub frames: FrameStream,
}

/// Seam between the session manager and the wire.
///
/// The HTTP implementation below is the production transport; tests supply
/// fakes built from canned frame vectors.
#[async_trait::async_trait]
pub trait StreamTransport: Send + Sync {
    /// Opens a subscription and returns its frame stream.
    async fn open(&self, request: &StreamRequest) -> Result<FrameStreamHandle, TransportError>;
}

type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, TransportError>> + Send + 'static>>;

/// HTTP transport for the workflow backend's SSE endpoints.
pub struct HttpTransport {
    client: reqwest::Client,
    config: BackendConfig,
}

impl HttpTransport {
    /// Creates a transport from backend configuration.
    pub fn new(config: BackendConfig) -> Result<Self, ClientError> {
        if config.base_url.trim().is_empty() {
            return Err(ClientError::Config("backend base_url must not be empty".into()));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait::async_trait]
impl StreamTransport for HttpTransport {
    async fn open(&self, request: &StreamRequest) -> Result<FrameStreamHandle, TransportError> {
        let http_req = match request {
            StreamRequest::Query { query } => self
                .client
                .get(self.config.query_url())
                .query(&[("query", query.as_str())]),
            StreamRequest::Test => self.client.get(self.config.test_url()),
        };
        debug!(endpoint = request.endpoint_name(), "opening stream subscription");

        let response = http_req
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| TransportError::connect(format!("stream request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TransportError::http(status.as_u16(), body));
        }

        let bytes_stream: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| TransportError::read(format!("stream read failed: {e}")))),
        );
        Ok(FrameStreamHandle {
            frames: Box::pin(frame_stream(bytes_stream)),
        })
    }
}

fn frame_stream(
    bytes_stream: ByteStream,
) -> impl futures::Stream<Item = Result<SseFrame, TransportError>> + Send {
    struct State {
        bytes_stream: ByteStream,
        decoder: SseDecoder,
        pending: VecDeque<SseFrame>,
        done: bool,
    }

    stream::try_unfold(
        State {
            bytes_stream,
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(frame) = state.pending.pop_front() {
                    return Ok(Some((frame, state)));
                }
                if state.done {
                    return Ok(None);
                }

                match state.bytes_stream.next().await {
                    Some(Ok(chunk)) => {
                        for frame in state.decoder.push_chunk(&chunk) {
                            state.pending.push_back(frame);
                        }
                    }
                    Some(Err(err)) => return Err(err),
                    None => state.done = true,
                }
            }
        },
    )
}
