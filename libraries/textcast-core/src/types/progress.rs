use super::ids::CompositeId;
use super::item::QueueItem;
use crate::error::Result;
use crate::traits::MediaServer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Server-side listening state for one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Container (library item) id
    pub container_id: String,

    /// Child (episode) id for episodic content
    pub child_id: Option<String>,

    /// Duration in seconds as known by the server
    pub duration: f64,

    /// Fraction listened, 0.0 to 1.0
    pub progress: f64,

    /// Position in seconds
    pub current_time: f64,

    pub is_finished: bool,

    pub last_update: Option<DateTime<Utc>>,
}

impl ProgressEntry {
    /// Composite key this entry is indexed under
    pub fn key(&self) -> String {
        CompositeId::new(self.container_id.clone(), self.child_id.clone()).to_string()
    }
}

/// Lookup table from composite id to last known server progress.
///
/// Refreshed wholesale from the current-user endpoint; entries are never
/// patched individually.
#[derive(Debug, Clone, Default)]
pub struct ProgressIndex {
    entries: HashMap<String, ProgressEntry>,
}

impl ProgressIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from server entries (later duplicates win)
    pub fn from_entries(entries: impl IntoIterator<Item = ProgressEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.key(), entry))
            .collect();
        Self { entries }
    }

    /// Replace every entry with a fresh fetch from the server.
    ///
    /// On failure the previous contents are kept.
    pub async fn refresh(&mut self, server: &dyn MediaServer) -> Result<()> {
        let entries = server.fetch_current_user_progress().await?;
        *self = Self::from_entries(entries);
        debug!(entries = self.len(), "Refreshed progress index");
        Ok(())
    }

    /// Entry for a composite id
    pub fn get(&self, id: &str) -> Option<&ProgressEntry> {
        self.entries.get(id)
    }

    /// Copy of `item` carrying the indexed position, if any.
    ///
    /// The item's own duration is kept.
    pub fn apply(&self, item: &QueueItem) -> QueueItem {
        match self.get(&item.id) {
            Some(entry) => item.with_progress(entry.current_time, entry.progress),
            None => item.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
