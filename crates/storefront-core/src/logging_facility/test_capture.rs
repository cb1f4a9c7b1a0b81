//! Test capture mode for deterministic logging assertions
//!
//! A test-only subscriber layer that records every event in memory. Tests
//! running in parallel share one global capture, so assertions filter on
//! the `session_id` every store operation carries.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::types::schema::{FIELD_COMPONENT, FIELD_EVENT, FIELD_OP, FIELD_SESSION_ID};

/// One recorded event, with every field rendered to text
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn component(&self) -> Option<&str> {
        self.field(FIELD_COMPONENT)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    /// The `event` field (`start`, `end`, `cache_miss`, ...)
    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.field(FIELD_SESSION_ID)
    }
}

#[derive(Default)]
struct FieldText(HashMap<String, String>);

impl FieldText {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldText {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }
}

/// Subscriber layer feeding a [`TestCapture`]
pub struct TestCaptureLayer {
    sink: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCaptureLayer {
    pub fn new() -> (Self, TestCapture) {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let capture = TestCapture { sink: sink.clone() };
        (Self { sink }, capture)
    }
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut text = FieldText::default();
        event.record(&mut text);
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            fields: text.0,
        };
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(captured);
    }
}

/// Read side of the capture
#[derive(Clone)]
pub struct TestCapture {
    sink: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    /// Everything captured so far, in emission order
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events emitted by one session, in emission order
    pub fn session_events(&self, session_id: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.session_id() == Some(session_id))
            .collect()
    }

    /// The `event` values one session logged for `op`, e.g.
    /// `["start", "rollback", "end_error"]`
    pub fn op_sequence(&self, session_id: &str, op: &str) -> Vec<String> {
        self.session_events(session_id)
            .iter()
            .filter(|e| e.op() == Some(op))
            .filter_map(|e| e.event().map(str::to_string))
            .collect()
    }

    /// First event of a session with the given `op` and `event` values
    pub fn find(&self, session_id: &str, op: &str, event: &str) -> Option<CapturedEvent> {
        self.session_events(session_id)
            .into_iter()
            .find(|e| e.op() == Some(op) && e.event() == Some(event))
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber (first call only) and
/// return the shared capture
///
/// ```
/// use storefront_core::logging_facility::test_capture::init_test_capture;
/// use storefront_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_op", session_id = "doc-session");
/// assert_eq!(capture.op_sequence("doc-session", "doc_capture_op"), vec!["start"]);
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCaptureLayer::new();
            tracing_subscriber::registry().with(layer).try_init().ok();
            capture
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{log_op_end, log_op_start};

    #[test]
    fn test_op_sequence_is_scoped_to_session() {
        let capture = init_test_capture();
        log_op_start!("capture_scope", session_id = "session-a");
        log_op_start!("capture_scope", session_id = "session-b");
        log_op_end!("capture_scope", duration_ms = 0u64, session_id = "session-a");

        assert_eq!(
            capture.op_sequence("session-a", "capture_scope"),
            vec!["start", "end"]
        );
        assert_eq!(capture.op_sequence("session-b", "capture_scope"), vec!["start"]);
    }

    #[test]
    fn test_find_exposes_fields() {
        let capture = init_test_capture();
        log_op_end!("capture_find", duration_ms = 7u64, session_id = "session-find");

        let end = capture.find("session-find", "capture_find", "end").unwrap();
        assert_eq!(end.level, Level::INFO);
        assert_eq!(end.field("duration_ms"), Some("7"));
        assert!(end.component().unwrap().contains("test_capture"));
    }
}
