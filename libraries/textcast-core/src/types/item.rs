use super::ids::CompositeId;
use serde::{Deserialize, Serialize};

/// A playable entry in a listing or play queue.
///
/// Values are replaced, never mutated in place: optimistic updates
/// substitute a new `QueueItem` at the item's position.
///
/// `progress` and `current_time` come from independent sources (the
/// progress index vs. the listing's own duration), so
/// `progress ≈ current_time / total_duration` is expected but not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Opaque id; `"{containerId}/{childId}"` for episodes
    pub id: String,

    pub title: String,

    pub author: Option<String>,

    /// Cover image URL
    pub cover_url: Option<String>,

    /// Fraction listened, 0.0 to 1.0
    pub progress: f64,

    /// Last known position in seconds
    pub current_time: f64,

    /// Total length in seconds (0 when unknown)
    pub total_duration: f64,
}

impl QueueItem {
    /// Create an item with no recorded progress
    pub fn new(id: impl Into<String>, title: impl Into<String>, total_duration: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: None,
            cover_url: None,
            progress: 0.0,
            current_time: 0.0,
            total_duration: total_duration.max(0.0),
        }
    }

    /// Set the author
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the cover URL
    #[must_use]
    pub fn with_cover_url(mut self, url: impl Into<String>) -> Self {
        self.cover_url = Some(url.into());
        self
    }

    /// Copy with a different listening position and progress fraction
    #[must_use]
    pub fn with_progress(&self, current_time: f64, progress: f64) -> Self {
        Self {
            current_time: current_time.max(0.0),
            progress: progress.clamp(0.0, 1.0),
            ..self.clone()
        }
    }

    /// Zero-progress copy, used when restarting an item
    #[must_use]
    pub fn restarted(&self) -> Self {
        self.with_progress(0.0, 0.0)
    }

    /// Container/child split of the id
    pub fn composite_id(&self) -> CompositeId {
        CompositeId::parse(&self.id)
    }

    /// Whole-number percentage derived from position and duration
    pub fn progress_percent(&self) -> u8 {
        if self.total_duration <= 0.0 {
            return 0;
        }
        (self.current_time / self.total_duration * 100.0)
            .round()
            .clamp(0.0, 100.0) as u8
    }

    /// Human-readable progress, e.g. `"30m / 1h 0m (50%)"`
    pub fn progress_text(&self) -> String {
        format!(
            "{} / {} ({}%)",
            format_duration(self.current_time),
            format_duration(self.total_duration),
            self.progress_percent()
        )
    }
}

/// Format seconds as `"{h}h {m}m"`, or `"{m}m"` under an hour
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = total / 60 % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
