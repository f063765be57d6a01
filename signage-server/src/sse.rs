use axum::{body::Body, response::Response, routing::get};
use futures_util::Stream;
use log::{debug, warn};
use parking_lot::Mutex;
use signage_collab::{EventRegistry, EventSink, SinkError, SinkId, GLOBAL_CHANNEL};
use signage_core::{event_frame, SignageEvent};
use std::{
    collections::VecDeque,
    convert::Infallible,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
    task::{Context, Poll, Waker},
};

use crate::{context::ServerContext, errors::ServerResult, Router};

/// Frames a subscriber may leave unread before it is disconnected
const MAX_PENDING_FRAMES: usize = 256;

/// A subscriber's end of an event stream. Frames written by the registry
/// queue up here until the response body polls them.
///
/// The registry writes preformatted frames (keep-alive comments included),
/// so the body streams raw text instead of going through axum's `Sse`.
struct SseConnection {
    id: SinkId,
    pending_frames: Mutex<VecDeque<String>>,
    waker: Mutex<Option<Waker>>,
    closed: AtomicBool,
}

/// The response body of a subscription. Unsubscribes when dropped.
pub struct ConnectionHandle {
    channel: String,
    connection: Arc<SseConnection>,
    /// Required to remove the connection when dropped
    registry: Weak<EventRegistry>,
}

impl SseConnection {
    fn new() -> Self {
        Self {
            id: SinkId::new(),
            pending_frames: Default::default(),
            waker: Default::default(),
            closed: AtomicBool::new(false),
        }
    }
}

impl EventSink for SseConnection {
    fn id(&self) -> SinkId {
        self.id
    }

    fn write(&self, frame: &str) -> Result<(), SinkError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SinkError::Closed);
        }

        let overflowed = {
            let mut pending_frames = self.pending_frames.lock();

            if pending_frames.len() >= MAX_PENDING_FRAMES {
                pending_frames.clear();
                self.closed.store(true, Ordering::Release);
                true
            } else {
                pending_frames.push_back(frame.to_string());
                false
            }
        };

        if let Some(waker) = self.waker.lock().take() {
            waker.wake()
        }

        if overflowed {
            warn!("Connection {} stopped reading, disconnecting it", self.id);
            return Err(SinkError::Closed);
        }

        Ok(())
    }
}

/// Subscribes a new connection to a channel and greets it
pub fn subscribe(registry: &Arc<EventRegistry>, channel: impl Into<String>) -> ConnectionHandle {
    let channel = channel.into();
    let connection = Arc::new(SseConnection::new());

    let greeting = SignageEvent::connected(format!("Subscribed to {}", channel));

    match serde_json::to_string(&greeting) {
        Ok(data) => {
            let _ = connection.write(&event_frame(greeting.name(), &data));
        }
        Err(e) => warn!("Could not serialize greeting: {}", e),
    }

    registry.add_client(&channel, connection.clone());
    debug!("Connection {} subscribed to {}", connection.id, channel);

    ConnectionHandle {
        channel,
        connection,
        registry: Arc::downgrade(registry),
    }
}

impl ConnectionHandle {
    pub fn into_response(self) -> Response<Body> {
        Response::builder()
            .status(200)
            .header("Content-Type", "text/event-stream")
            .header("Cache-Control", "no-cache")
            .header("X-Accel-Buffering", "no")
            .body(Body::from_stream(self))
            .unwrap_or_default()
    }
}

impl Stream for ConnectionHandle {
    type Item = Result<String, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut pending_frames = self.connection.pending_frames.lock();

        if let Some(frame) = pending_frames.pop_front() {
            return Poll::Ready(Some(Ok(frame)));
        }

        // Ends the body, which drops the handle and unsubscribes
        if self.connection.closed.load(Ordering::Acquire) {
            return Poll::Ready(None);
        }

        // Stored while the queue is locked, so a concurrent write can't miss it
        *self.connection.waker.lock() = Some(cx.waker().clone());
        Poll::Pending
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.connection.closed.store(true, Ordering::Release);

        if let Some(registry) = self.registry.upgrade() {
            registry.remove_client(&self.channel, self.connection.id);
            debug!("Connection {} left {}", self.connection.id, self.channel);
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/events",
    tag = "events",
    responses(
        (
            status = 200,
            content_type = "text/event-stream",
            description = "Every display notification, for admin dashboards"
        )
    )
)]
async fn global_events(context: ServerContext) -> ServerResult<Response<Body>> {
    Ok(subscribe(context.events(), GLOBAL_CHANNEL).into_response())
}

pub fn router() -> Router {
    Router::new().route("/", get(global_events))
}
