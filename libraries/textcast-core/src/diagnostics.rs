//! In-memory log capture for a diagnostics screen.
//!
//! `DiagnosticsLayer` is a `tracing_subscriber` layer that copies every event
//! into a bounded `LogBuffer`. It only observes; nothing in the playback core
//! reads the buffer back.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Default number of entries kept before the oldest are evicted
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// One captured log event
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
}

#[derive(Debug)]
struct BufferState {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    enabled: bool,
}

/// Shared, bounded log buffer
///
/// Cloning yields another handle to the same buffer.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    state: Arc<Mutex<BufferState>>,
}

impl LogBuffer {
    /// Create an enabled buffer holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(BufferState {
                entries: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
                capacity: capacity.max(1),
                enabled: true,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BufferState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an entry, evicting the oldest when full. Dropped when disabled.
    pub fn push(&self, entry: LogEntry) {
        let mut state = self.lock();
        if !state.enabled {
            return;
        }
        while state.entries.len() >= state.capacity {
            state.entries.pop_front();
        }
        state.entries.push_back(entry);
    }

    /// Snapshot of captured entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.lock().enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    /// Plain-text dump suitable for sharing
    pub fn export(&self) -> String {
        let state = self.lock();
        let mut out = String::new();
        for (i, entry) in state.entries.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = writeln!(
                out,
                "[{}] [{}] {}\n{}",
                entry.timestamp.to_rfc3339(),
                entry.level,
                entry.target,
                entry.message
            );
        }
        out
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

/// Collects the `message` field and appends other fields as `key=value`
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            if !self.fields.is_empty() {
                self.fields.push(' ');
            }
            let _ = write!(self.fields, "{}={}", field.name(), value);
        }
    }

    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push_field(field, value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push_field(field, &format!("{:?}", value));
    }
}

/// Tracing layer feeding a `LogBuffer`
pub struct DiagnosticsLayer {
    buffer: LogBuffer,
}

impl DiagnosticsLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<S> Layer<S> for DiagnosticsLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !self.buffer.is_enabled() {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        self.buffer.push(LogEntry {
            timestamp: Utc::now(),
            level: event.metadata().level().to_string(),
            target: event.metadata().target().to_string(),
            message: visitor.finish(),
        });
    }
}
