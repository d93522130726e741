//! Event sinks for incrementer notifications.
//!
//! The error-skip loop reports each skipped URL and how the loop ended
//! through an [`EventSink`]. What a sink does with them is up to the
//! embedding application; [`LoggingEventSink`] forwards them to `tracing`.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Event type names.
pub mod event_types {
    /// A URL answered with a configured error status and was passed over.
    pub const ERROR_SKIP_SKIPPED: &str = "error_skip.skipped";
    /// A URL answered with a status outside the configured error codes.
    pub const ERROR_SKIP_SETTLED: &str = "error_skip.settled";
    /// The existence check could not be made.
    pub const ERROR_SKIP_TRANSPORT_ERROR: &str = "error_skip.transport_error";
    /// The skip budget ran out.
    pub const ERROR_SKIP_EXHAUSTED: &str = "error_skip.exhausted";
}
