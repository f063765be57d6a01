use std::{collections::HashMap, sync::Arc};

use log::{debug, warn};
use parking_lot::Mutex;
use serde::Serialize;
use signage_core::{comment_frame, event_frame, DisplayAction, Display, DocumentId, Id, SignageEvent};
use thiserror::Error;

/// The channel admin dashboards subscribe to. Every display notification is mirrored here.
pub const GLOBAL_CHANNEL: &str = "global";

pub type SinkId = Id<dyn EventSink>;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Subscriber has disconnected")]
    Closed,
}

/// A writable stream belonging to one subscriber
pub trait EventSink: Send + Sync {
    fn id(&self) -> SinkId;
    /// Writes a fully formatted frame to the subscriber
    fn write(&self, frame: &str) -> Result<(), SinkError>;
}

/// Maps display ids (and [GLOBAL_CHANNEL]) to the sinks subscribed to them,
/// and fans events out to those sinks.
#[derive(Default)]
pub struct EventRegistry {
    subscribers: Mutex<HashMap<String, Vec<Arc<dyn EventSink>>>>,
}

impl EventRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Subscribes a sink to a display. A sink already subscribed to the display is not added twice.
    pub fn add_client(&self, display_id: &str, sink: Arc<dyn EventSink>) {
        let mut subscribers = self.subscribers.lock();
        let sinks = subscribers.entry(display_id.to_string()).or_default();

        if sinks.iter().any(|s| s.id() == sink.id()) {
            debug!("Sink {} is already subscribed to {}", sink.id(), display_id);
            return;
        }

        sinks.push(sink);
    }

    pub fn remove_client(&self, display_id: &str, sink_id: SinkId) {
        let mut subscribers = self.subscribers.lock();

        let Some(sinks) = subscribers.get_mut(display_id) else {
            return;
        };

        sinks.retain(|s| s.id() != sink_id);

        if sinks.is_empty() {
            subscribers.remove(display_id);
        }
    }

    /// Writes an event to every sink subscribed to the display and returns
    /// how many writes succeeded. A failing sink does not stop delivery to the rest.
    pub fn send_event_to_display<T>(&self, display_id: &str, event_name: &str, payload: &T) -> usize
    where
        T: Serialize + ?Sized,
    {
        let sinks = self.sinks(display_id);

        if sinks.is_empty() {
            return 0;
        }

        let data = match serde_json::to_string(payload) {
            Ok(data) => data,
            Err(e) => {
                warn!("Could not serialize {} event: {}", event_name, e);
                return 0;
            }
        };

        let frame = event_frame(event_name, &data);
        let delivered = write_all(&sinks, &frame);

        debug!(
            "Delivered {} to {}/{} subscribers of {}",
            event_name,
            delivered,
            sinks.len(),
            display_id
        );

        delivered
    }

    pub fn emit(&self, channel: &str, event: &SignageEvent) -> usize {
        self.send_event_to_display(channel, event.name(), event)
    }

    /// Tells subscribers of a display, and the global channel, that the display changed
    pub fn notify_display(&self, display_id: &DocumentId, action: DisplayAction, display: Option<Display>) {
        let event = SignageEvent::display_updated(*display_id, action, display);

        self.emit(&display_id.to_string(), &event);
        self.emit(GLOBAL_CHANNEL, &event);
    }

    /// Writes a keep-alive comment to every subscriber
    pub fn ping_all(&self) -> usize {
        let sinks: Vec<_> = self
            .subscribers
            .lock()
            .values()
            .flatten()
            .cloned()
            .collect();

        write_all(&sinks, &comment_frame("keep-alive"))
    }

    pub fn subscriber_count(&self, display_id: &str) -> usize {
        self.subscribers
            .lock()
            .get(display_id)
            .map_or(0, |sinks| sinks.len())
    }

    /// Clones the sinks out so no lock is held while writing
    fn sinks(&self, display_id: &str) -> Vec<Arc<dyn EventSink>> {
        self.subscribers
            .lock()
            .get(display_id)
            .cloned()
            .unwrap_or_default()
    }
}

fn write_all(sinks: &[Arc<dyn EventSink>], frame: &str) -> usize {
    sinks
        .iter()
        .filter(|sink| match sink.write(frame) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to write to sink {}: {}", sink.id(), e);
                false
            }
        })
        .count()
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::json;

    use super::{EventRegistry, EventSink, SinkError, SinkId, GLOBAL_CHANNEL};

    /// Records every frame written to it
    pub(crate) struct RecordingSink {
        id: SinkId,
        pub frames: Mutex<Vec<String>>,
        pub broken: bool,
    }

    impl RecordingSink {
        pub fn new() -> Arc<Self> {
            Self::with_state(false)
        }

        pub fn broken() -> Arc<Self> {
            Self::with_state(true)
        }

        fn with_state(broken: bool) -> Arc<Self> {
            Arc::new(Self {
                id: SinkId::new(),
                frames: Default::default(),
                broken,
            })
        }

        pub fn frames(&self) -> Vec<String> {
            self.frames.lock().clone()
        }
    }

    impl EventSink for RecordingSink {
        fn id(&self) -> SinkId {
            self.id
        }

        fn write(&self, frame: &str) -> Result<(), SinkError> {
            if self.broken {
                return Err(SinkError::Closed);
            }

            self.frames.lock().push(frame.to_string());
            Ok(())
        }
    }

    #[test]
    fn writes_exact_frames() {
        let registry = EventRegistry::new();
        let sink = RecordingSink::new();

        registry.add_client("d1", sink.clone());

        let delivered = registry.send_event_to_display("d1", "display_updated", &json!({ "a": 1 }));

        assert_eq!(delivered, 1);
        assert_eq!(
            sink.frames(),
            vec!["event: display_updated\ndata: {\"a\":1}\n\n".to_string()]
        );
    }

    #[test]
    fn unknown_displays_are_a_no_op() {
        let registry = EventRegistry::new();
        let sink = RecordingSink::new();

        registry.add_client("d1", sink.clone());

        let delivered = registry.send_event_to_display("d2", "display_updated", &json!({}));

        assert_eq!(delivered, 0);
        assert!(sink.frames().is_empty());
        assert_eq!(registry.subscriber_count("d2"), 0);
    }

    #[test]
    fn a_failing_sink_does_not_block_the_others() {
        let registry = EventRegistry::new();
        let first = RecordingSink::new();
        let broken = RecordingSink::broken();
        let last = RecordingSink::new();

        registry.add_client("d1", first.clone());
        registry.add_client("d1", broken.clone());
        registry.add_client("d1", last.clone());

        let delivered = registry.send_event_to_display("d1", "display_updated", &json!({}));

        assert_eq!(delivered, 2);
        assert_eq!(first.frames().len(), 1);
        assert_eq!(last.frames().len(), 1);
    }

    #[test]
    fn the_same_sink_is_subscribed_once() {
        let registry = EventRegistry::new();
        let sink = RecordingSink::new();

        registry.add_client("d1", sink.clone());
        registry.add_client("d1", sink.clone());

        assert_eq!(registry.subscriber_count("d1"), 1);
        assert_eq!(registry.send_event_to_display("d1", "x", &json!(null)), 1);
    }

    #[test]
    fn removing_the_last_sink_removes_the_key() {
        let registry = EventRegistry::new();
        let a = RecordingSink::new();
        let b = RecordingSink::new();

        registry.add_client("d1", a.clone());
        registry.add_client("d1", b.clone());
        registry.remove_client("d1", a.id());

        assert_eq!(registry.send_event_to_display("d1", "x", &json!(null)), 1);
        assert!(a.frames().is_empty());

        registry.remove_client("d1", b.id());
        assert!(!registry.subscribers.lock().contains_key("d1"));

        // Removing from a missing key is fine
        registry.remove_client("d1", b.id());
    }

    #[test]
    fn notifications_reach_the_display_and_global_channel() {
        let registry = EventRegistry::new();
        let display_sink = RecordingSink::new();
        let admin_sink = RecordingSink::new();
        let display_id = signage_core::DocumentId::generate();

        registry.add_client(&display_id.to_string(), display_sink.clone());
        registry.add_client(GLOBAL_CHANNEL, admin_sink.clone());

        registry.notify_display(&display_id, signage_core::DisplayAction::Delete, None);

        let expected = format!(
            "event: display_updated\ndata: {{\"displayId\":\"{}\",\"action\":\"delete\"}}\n\n",
            display_id
        );

        assert_eq!(display_sink.frames(), vec![expected.clone()]);
        assert_eq!(admin_sink.frames(), vec![expected]);
    }

    #[test]
    fn pings_reach_every_subscriber() {
        let registry = EventRegistry::new();
        let a = RecordingSink::new();
        let b = RecordingSink::new();

        registry.add_client("d1", a.clone());
        registry.add_client(GLOBAL_CHANNEL, b.clone());

        assert_eq!(registry.ping_all(), 2);
        assert_eq!(a.frames(), vec![": keep-alive\n\n".to_string()]);
    }
}
