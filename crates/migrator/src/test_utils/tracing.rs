//! A `tracing-subscriber` layer that records emitted events and their levels.

use spin::Mutex;
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{layer::Context, Layer};

/// Shared storage for collected events.
#[derive(Debug, Default, Clone)]
pub struct TraceStorage(pub Arc<Mutex<Vec<(Level, String)>>>);

impl TraceStorage {
    /// Returns the messages recorded at `level`.
    pub fn get_by_level(&self, level: Level) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .filter_map(|(l, message)| (*l == level).then(|| message.clone()))
            .collect()
    }

    /// Returns `true` if any message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.get_by_level(level).iter().any(|m| m.contains(needle))
    }

    /// Returns if the storage is empty.
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// A subscriber layer that pushes every event into a [TraceStorage].
#[derive(Debug, Default)]
pub struct CollectingLayer {
    /// The storage for the collected events.
    pub storage: TraceStorage,
}

impl CollectingLayer {
    /// Creates a new collecting layer writing into `storage`.
    pub const fn new(storage: TraceStorage) -> Self {
        Self { storage }
    }
}

impl<S: Subscriber> Layer<S> for CollectingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        let message = format!("{:?}", event);
        self.storage.0.lock().push((level, message));
    }
}
