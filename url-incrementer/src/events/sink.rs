//! Event sink trait and implementations.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn, Level};

/// Receives incrementer notifications.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emits an event.
    ///
    /// # Arguments
    ///
    /// * `event_type` - The event name, e.g. `"error_skip.skipped"`
    /// * `data` - Optional payload
    async fn emit(&self, event_type: &str, data: Option<Value>);

    /// Emits an event without awaiting. Must not panic or fail.
    fn try_emit(&self, event_type: &str, data: Option<Value>);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event_type: &str, _data: Option<Value>) {}

    fn try_emit(&self, _event_type: &str, _data: Option<Value>) {}
}

/// Forwards events to `tracing` at a fixed level.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a sink logging at `level`. Levels above `WARN` log at `WARN`;
    /// levels below `DEBUG` log at `DEBUG`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// A debug-level sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    fn log_event(&self, event_type: &str, data: Option<&Value>) {
        match self.level {
            Level::ERROR | Level::WARN => warn!(event_type, event_data = ?data, "Incrementer event"),
            Level::INFO => info!(event_type, event_data = ?data, "Incrementer event"),
            _ => debug!(event_type, event_data = ?data, "Incrementer event"),
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event_type: &str, data: Option<Value>) {
        self.log_event(event_type, data.as_ref());
    }

    fn try_emit(&self, event_type: &str, data: Option<Value>) {
        self.log_event(event_type, data.as_ref());
    }
}

/// Keeps every event in memory, for tests and inspection.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<(String, Option<Value>)>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Option<Value>)> {
        self.events.read().clone()
    }

    /// Returns the collected event names in order.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events.read().iter().map(|(t, _)| t.clone()).collect()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events whose type starts with `type_prefix`.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<(String, Option<Value>)> {
        self.events
            .read()
            .iter()
            .filter(|(t, _)| t.starts_with(type_prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event_type: &str, data: Option<Value>) {
        self.events.write().push((event_type.to_string(), data));
    }

    fn try_emit(&self, event_type: &str, data: Option<Value>) {
        self.events.write().push((event_type.to_string(), data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_types;

    #[tokio::test]
    async fn test_noop_and_logging_sinks_accept_events() {
        NoOpEventSink.emit(event_types::ERROR_SKIP_SKIPPED, None).await;
        let sink = LoggingEventSink::debug();
        sink.emit(
            event_types::ERROR_SKIP_SETTLED,
            Some(serde_json::json!({"url": "http://x.com/2", "status": 200})),
        )
        .await;
        sink.try_emit(event_types::ERROR_SKIP_EXHAUSTED, None);
    }

    #[tokio::test]
    async fn test_collecting_sink() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit(event_types::ERROR_SKIP_SKIPPED, None).await;
        sink.try_emit(
            event_types::ERROR_SKIP_SETTLED,
            Some(serde_json::json!({"status": 200})),
        );

        assert_eq!(sink.len(), 2);
        assert_eq!(
            sink.event_types(),
            vec!["error_skip.skipped", "error_skip.settled"]
        );
        assert_eq!(sink.events()[1].1, Some(serde_json::json!({"status": 200})));
    }

    #[tokio::test]
    async fn test_collecting_sink_filter_and_clear() {
        let sink = CollectingEventSink::new();
        sink.emit(event_types::ERROR_SKIP_SKIPPED, None).await;
        sink.emit(event_types::ERROR_SKIP_SKIPPED, None).await;
        sink.emit("other.event", None).await;

        assert_eq!(sink.events_of_type("error_skip.").len(), 2);

        sink.clear();
        assert!(sink.is_empty());
    }
}
