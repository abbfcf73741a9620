//! Playback session bookkeeping
//!
//! One session per loaded item. Listening time is measured on the wall
//! clock while playing and is only added to the session total once the
//! server has acknowledged a sync. Time carried by a failed sync is kept
//! and sent again with the next attempt.

use textcast_core::SyncReport;
use tokio::time::{Duration, Instant};
use tracing::debug;

/// A sync that has been handed to the server but not yet acknowledged
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSync {
    pub session_id: String,
    pub report: SyncReport,
    /// Listening seconds this sync would commit
    pub listened: f64,
}

#[derive(Debug)]
enum SessionState {
    Idle,
    Active(ActiveSession),
}

#[derive(Debug)]
struct ActiveSession {
    session_id: String,
    total_time_listened: f64,
    /// Closed listening stretches not yet acknowledged by the server
    unsynced: f64,
    listening_since: Option<Instant>,
    last_sync_at: Instant,
    last_attempt_at: Instant,
}

impl ActiveSession {
    fn take_listened(&mut self, now: Instant) -> f64 {
        let open = self
            .listening_since
            .map_or(0.0, |since| now.saturating_duration_since(since).as_secs_f64());
        if self.listening_since.is_some() {
            self.listening_since = Some(now);
        }
        std::mem::take(&mut self.unsynced) + open
    }
}

/// Tracks the open playback session and the time listened in it
#[derive(Debug)]
pub struct SessionTracker {
    state: SessionState,
    sync_interval: Duration,
}

impl SessionTracker {
    pub fn new(sync_interval: Duration) -> Self {
        Self {
            state: SessionState::Idle,
            sync_interval,
        }
    }

    /// Open a session, discarding any previous one and its accumulator
    pub fn start(&mut self, session_id: impl Into<String>, now: Instant) {
        let session_id = session_id.into();
        debug!(session_id = %session_id, "Playback session active");
        self.state = SessionState::Active(ActiveSession {
            session_id,
            total_time_listened: 0.0,
            unsynced: 0.0,
            listening_since: None,
            last_sync_at: now,
            last_attempt_at: now,
        });
    }

    /// Drop the session without a final sync
    pub fn reset(&mut self) {
        if let SessionState::Active(session) = &self.state {
            debug!(session_id = %session.session_id, "Playback session closed");
        }
        self.state = SessionState::Idle;
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    pub fn session_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::Active(session) => Some(&session.session_id),
            SessionState::Idle => None,
        }
    }

    /// Acknowledged listening time of the current session, in seconds
    pub fn total_time_listened(&self) -> f64 {
        match &self.state {
            SessionState::Active(session) => session.total_time_listened,
            SessionState::Idle => 0.0,
        }
    }

    pub fn last_sync_at(&self) -> Option<Instant> {
        match &self.state {
            SessionState::Active(session) => Some(session.last_sync_at),
            SessionState::Idle => None,
        }
    }

    /// Start measuring listening time
    pub fn mark_playing(&mut self, now: Instant) {
        if let SessionState::Active(session) = &mut self.state {
            session.listening_since.get_or_insert(now);
        }
    }

    /// Stop measuring; the elapsed stretch waits for the next sync
    pub fn mark_paused(&mut self, now: Instant) {
        if let SessionState::Active(session) = &mut self.state {
            if let Some(since) = session.listening_since.take() {
                session.unsynced += now.saturating_duration_since(since).as_secs_f64();
            }
        }
    }

    /// Whether a periodic sync should be attempted now
    ///
    /// Only while listening, and at most once per interval counted from the
    /// previous attempt, successful or not.
    pub fn is_sync_due(&self, now: Instant) -> bool {
        match &self.state {
            SessionState::Active(session) => {
                session.listening_since.is_some()
                    && now.saturating_duration_since(session.last_attempt_at) >= self.sync_interval
            }
            SessionState::Idle => false,
        }
    }

    /// Build the next sync report
    ///
    /// `None` without an active session or without a known duration.
    pub fn begin_sync(&mut self, now: Instant, current_time: f64, duration: f64) -> Option<PendingSync> {
        if !(duration.is_finite() && duration > 0.0) {
            return None;
        }
        let SessionState::Active(session) = &mut self.state else {
            return None;
        };

        session.last_attempt_at = now;
        let listened = session.take_listened(now);
        Some(PendingSync {
            session_id: session.session_id.clone(),
            report: SyncReport {
                current_time,
                duration,
                time_listened: session.total_time_listened + listened,
            },
            listened,
        })
    }

    /// Commit an acknowledged sync; `false` if the session has since changed
    pub fn complete_sync(&mut self, pending: &PendingSync, now: Instant) -> bool {
        match &mut self.state {
            SessionState::Active(session) if session.session_id == pending.session_id => {
                session.total_time_listened += pending.listened;
                session.last_sync_at = now;
                true
            }
            _ => false,
        }
    }

    /// Put the listening time of a failed sync back for the next attempt
    pub fn fail_sync(&mut self, pending: &PendingSync) {
        if let SessionState::Active(session) = &mut self.state {
            if session.session_id == pending.session_id {
                session.unsynced += pending.listened;
            }
        }
    }
}
