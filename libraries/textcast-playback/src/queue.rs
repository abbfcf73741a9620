//! Ordered play queue with a cursor
//!
//! The queue is a snapshot handed over by `play_from`; it is never fetched
//! or merged on its own. The cursor invariant is `cursor < len` whenever
//! it is set. It is `None` when the queue is empty, and after a stop, which
//! keeps the items but leaves nothing current.

use textcast_core::QueueItem;

/// Where a removed item sat relative to the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Id was not in the queue
    NotFound,

    /// Removed before the cursor; cursor shifted down by one
    BeforeCursor,

    /// Removed after the cursor; cursor unchanged
    AfterCursor,

    /// Removed the current item
    ///
    /// With a successor, the cursor now points at it. Without one the
    /// queue has been cleared.
    Current { has_successor: bool },

    /// Removed from a queue with nothing current
    Detached,
}

/// Play queue
#[derive(Debug, Clone, Default)]
pub struct PlaybackQueue {
    items: Vec<QueueItem>,
    cursor: Option<usize>,
}

impl PlaybackQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue positioned at `start`
    ///
    /// Returns `None` when `start` is out of range (including an empty list).
    pub fn from_items(items: Vec<QueueItem>, start: usize) -> Option<Self> {
        if start >= items.len() {
            return None;
        }
        Some(Self {
            items,
            cursor: Some(start),
        })
    }

    /// Item under the cursor
    pub fn current(&self) -> Option<&QueueItem> {
        self.cursor.and_then(|index| self.items.get(index))
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn has_next(&self) -> bool {
        self.cursor.is_some_and(|index| index + 1 < self.items.len())
    }

    pub fn has_previous(&self) -> bool {
        self.cursor.is_some_and(|index| index > 0)
    }

    /// Move the cursor forward; `false` at the last item
    pub fn advance(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.cursor = self.cursor.map(|index| index + 1);
        true
    }

    /// Move the cursor back; `false` at the first item
    pub fn retreat(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.cursor = self.cursor.map(|index| index - 1);
        true
    }

    /// Index of an item by id
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Update the stored position of the current item
    pub(crate) fn set_current_time(&mut self, current_time: f64) {
        if let Some(item) = self.cursor.and_then(|index| self.items.get_mut(index)) {
            item.current_time = current_time;
        }
    }

    /// Drop the current item but keep the queued items
    pub fn release(&mut self) {
        self.cursor = None;
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.cursor = None;
    }

    /// Remove an item and repair the cursor
    pub fn remove(&mut self, id: &str) -> Removal {
        let Some(index) = self.position_of(id) else {
            return Removal::NotFound;
        };
        self.items.remove(index);

        let Some(cursor) = self.cursor else {
            return Removal::Detached;
        };

        if index < cursor {
            self.cursor = Some(cursor - 1);
            Removal::BeforeCursor
        } else if index > cursor {
            Removal::AfterCursor
        } else if index < self.items.len() {
            Removal::Current {
                has_successor: true,
            }
        } else {
            self.clear();
            Removal::Current {
                has_successor: false,
            }
        }
    }
}
