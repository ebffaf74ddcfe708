use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use futures::StreamExt as _;
use tokio::sync::watch;
use tracing::debug;

use crate::event::{EventKind, StreamEvent};
use crate::sse::classify_frame;
use crate::transport::{StreamRequest, StreamTransport};

const OPEN_FAILURE_FALLBACK: &str = "failed to open stream";
const CONNECTION_ERROR_MESSAGE: &str = "stream connection error";

/// Lifecycle of the single logical subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscriptionState {
    /// No subscription has been started yet.
    Idle,
    /// Connection requested, no frame classified yet.
    Open,
    /// Receiving frames.
    Active,
    /// Terminated by `completion`, a transport error, or `stop`.
    Closed,
}

struct SubscriptionHandle {
    id: uuid::Uuid,
    abort: watch::Sender<bool>,
}

struct Inner {
    log: Vec<StreamEvent>,
    state: SubscriptionState,
    busy: bool,
    /// Generation counter; a subscription task may only mutate the log while
    /// its captured epoch matches this value.
    epoch: u64,
    current: Option<SubscriptionHandle>,
}

struct Shared {
    inner: Mutex<Inner>,
    revision: watch::Sender<u64>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    /// Appends one event unless the subscription was superseded or stopped.
    /// The epoch check happens under the log lock, so a stale task can never
    /// interleave with the current one.
    fn append_if_current(&self, epoch: u64, event: StreamEvent) -> bool {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            return false;
        }
        if inner.state == SubscriptionState::Open {
            inner.state = SubscriptionState::Active;
        }
        inner.log.push(event);
        drop(inner);
        self.notify();
        true
    }

    fn close_if_current(&self, epoch: u64) {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            return;
        }
        inner.state = SubscriptionState::Closed;
        inner.busy = false;
        inner.current = None;
        drop(inner);
        self.notify();
    }

    /// Records a synthetic `error` event and closes, unless superseded.
    fn fail_if_current(&self, epoch: u64, message: &str) {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            return;
        }
        inner.log.push(synthetic_error(message));
        inner.state = SubscriptionState::Closed;
        inner.busy = false;
        inner.current = None;
        drop(inner);
        self.notify();
    }
}

fn synthetic_error(message: &str) -> StreamEvent {
    StreamEvent::new(
        EventKind::Error,
        serde_json::json!({ "error": message, "timestamp": unix_timestamp() }),
    )
}

fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Owns the lifecycle of at most one active subscription.
///
/// `start` supersedes any running subscription, clears the log, and spawns a
/// task that feeds classified frames into the log until a terminal condition.
/// The presentation layer only ever reads `events()`, `busy()` and `state()`;
/// every failure after `start` is absorbed into the log as a synthetic
/// `error` event.
pub struct SessionManager {
    transport: Arc<dyn StreamTransport>,
    shared: Arc<Shared>,
}

impl SessionManager {
    /// Creates a manager over the given transport.
    pub fn new(transport: Arc<dyn StreamTransport>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            transport,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    log: Vec::new(),
                    state: SubscriptionState::Idle,
                    busy: false,
                    epoch: 0,
                    current: None,
                }),
                revision,
            }),
        }
    }

    /// Starts a new subscription, superseding any running one.
    ///
    /// Returns immediately; results surface through the event log. Must be
    /// called within a Tokio runtime.
    pub fn start(&self, request: StreamRequest) {
        let id = uuid::Uuid::new_v4();
        let (abort_tx, abort_rx) = watch::channel(false);

        let (epoch, previous) = {
            let mut inner = self.shared.lock();
            inner.epoch += 1;
            inner.log.clear();
            inner.busy = true;
            inner.state = SubscriptionState::Open;
            let previous = inner.current.replace(SubscriptionHandle {
                id,
                abort: abort_tx,
            });
            (inner.epoch, previous)
        };
        if let Some(previous) = previous {
            debug!(subscription = %previous.id, "superseding active subscription");
            let _ = previous.abort.send(true);
        }
        debug!(subscription = %id, endpoint = request.endpoint_name(), "starting subscription");
        self.shared.notify();

        tokio::spawn(subscription_task(
            self.transport.clone(),
            request,
            self.shared.clone(),
            epoch,
            abort_rx,
        ));
    }

    /// Tears down the current subscription, if any. Idempotent.
    pub fn stop(&self) {
        let previous = {
            let mut inner = self.shared.lock();
            let previous = inner.current.take();
            if previous.is_some() {
                // Invalidate in-flight appends from the aborted task.
                inner.epoch += 1;
            }
            if matches!(inner.state, SubscriptionState::Open | SubscriptionState::Active) {
                inner.state = SubscriptionState::Closed;
            }
            inner.busy = false;
            previous
        };
        if let Some(previous) = previous {
            debug!(subscription = %previous.id, "stopping subscription");
            let _ = previous.abort.send(true);
            self.shared.notify();
        }
    }

    /// Snapshot of the event log in arrival order.
    pub fn events(&self) -> Vec<StreamEvent> {
        self.shared.lock().log.clone()
    }

    /// True while a subscription is `Open` or `Active`.
    pub fn busy(&self) -> bool {
        self.shared.lock().busy
    }

    /// Current subscription lifecycle state.
    pub fn state(&self) -> SubscriptionState {
        self.shared.lock().state
    }

    /// Id of the current subscription, if one exists.
    pub fn subscription_id(&self) -> Option<uuid::Uuid> {
        self.shared.lock().current.as_ref().map(|handle| handle.id)
    }

    /// Receiver bumped on every log or state mutation, so a consumer can
    /// await changes instead of polling.
    pub fn watch_revision(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn subscription_task(
    transport: Arc<dyn StreamTransport>,
    request: StreamRequest,
    shared: Arc<Shared>,
    epoch: u64,
    mut abort_rx: watch::Receiver<bool>,
) {
    let handle = match transport.open(&request).await {
        Ok(handle) => handle,
        Err(err) => {
            debug!(endpoint = request.endpoint_name(), error = %err, "failed to open subscription");
            let message = err.message().trim();
            let message = if message.is_empty() {
                OPEN_FAILURE_FALLBACK
            } else {
                message
            };
            shared.fail_if_current(epoch, message);
            return;
        }
    };

    let mut frames = handle.frames;
    loop {
        tokio::select! {
            changed = abort_rx.changed() => {
                match changed {
                    Ok(()) if *abort_rx.borrow() => return,
                    Ok(()) => {}
                    // Sender dropped: the manager itself is gone.
                    Err(_) => return,
                }
            }
            next = frames.next() => {
                match next {
                    Some(Ok(frame)) => {
                        let Some(event) = classify_frame(&frame) else {
                            debug!(label = frame.label(), "dropping malformed frame");
                            continue;
                        };
                        let terminal = event.kind == EventKind::Completion;
                        if !shared.append_if_current(epoch, event) {
                            return;
                        }
                        if terminal {
                            shared.close_if_current(epoch);
                            return;
                        }
                    }
                    Some(Err(err)) => {
                        debug!(error = %err, "subscription transport error");
                        shared.fail_if_current(epoch, CONNECTION_ERROR_MESSAGE);
                        return;
                    }
                    None => {
                        // The backend closes the connection only after
                        // `completion`; an earlier EOF is a failure.
                        debug!("stream ended before completion");
                        shared.fail_if_current(epoch, CONNECTION_ERROR_MESSAGE);
                        return;
                    }
                }
            }
        }
    }
}
