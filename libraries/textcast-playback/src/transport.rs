//! Platform-agnostic media transport
//!
//! The platform player (AVPlayer, GStreamer, a web `<audio>` element...)
//! implements [`MediaTransport`] and reports back through
//! [`TransportEvent`]s. [`TransportAdapter`] sits between the platform and
//! the controller: it clamps commands, tracks position and duration, and
//! turns raw events into idempotent [`AdapterSignal`]s.

/// Platform media player
///
/// Commands are fire-and-forget. Outcomes come back asynchronously as
/// [`TransportEvent`]s on whatever channel the host wires up.
pub trait MediaTransport: Send {
    /// Replace the current media and start preparing `url`
    fn load(&mut self, url: &str);

    fn play(&mut self);

    fn pause(&mut self);

    /// Jump to an absolute position in seconds
    fn seek(&mut self, seconds: f64);
}

/// Raw notifications from the platform player
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Media prepared; `duration` may still be 0 for live or unknown lengths
    Ready { duration: f64 },

    /// Periodic position report (at most one second apart)
    Tick {
        current_time: f64,
        duration: f64,
        is_playing: bool,
    },

    /// Playback reached the end of the media
    Ended,

    /// Preparation or playback failed
    Failed { message: String },
}

/// Normalized signals for the controller
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterSignal {
    /// Emitted once per load
    Ready { duration: f64 },

    Position {
        current_time: f64,
        duration: f64,
        is_playing: bool,
    },

    /// Emitted once per load
    Ended,

    Failed { message: String },
}

/// Wraps a [`MediaTransport`] and keeps the last known playback position.
pub struct TransportAdapter {
    transport: Box<dyn MediaTransport>,
    loaded: bool,
    ready: bool,
    reached_end: bool,
    is_playing: bool,
    current_time: f64,
    duration: f64,
}

impl TransportAdapter {
    pub fn new(transport: Box<dyn MediaTransport>) -> Self {
        Self {
            transport,
            loaded: false,
            ready: false,
            reached_end: false,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
        }
    }

    /// Load a new source, resetting position, duration and the end flag
    pub fn load(&mut self, url: &str) {
        self.reset();
        self.loaded = true;
        self.transport.load(url);
    }

    /// Pause and forget the current source
    ///
    /// Events arriving afterwards are ignored until the next `load`.
    pub fn unload(&mut self) {
        if self.loaded {
            self.transport.pause();
        }
        self.reset();
    }

    pub fn play(&mut self) {
        if !self.loaded {
            return;
        }
        self.is_playing = true;
        self.transport.play();
    }

    pub fn pause(&mut self) {
        if !self.loaded {
            return;
        }
        self.is_playing = false;
        self.transport.pause();
    }

    /// Seek, clamped to `[0, duration]` (upper bound only once known)
    pub fn seek(&mut self, seconds: f64) {
        if !self.loaded {
            return;
        }
        let target = self.clamp(seconds);
        self.current_time = target;
        if target < self.duration {
            self.reached_end = false;
        }
        self.transport.seek(target);
    }

    pub fn skip_forward(&mut self, delta: f64) {
        self.seek(self.current_time + delta);
    }

    pub fn skip_backward(&mut self, delta: f64) {
        self.seek(self.current_time - delta);
    }

    /// Fold a platform event into the adapter state
    pub fn observe(&mut self, event: TransportEvent) -> Vec<AdapterSignal> {
        if !self.loaded {
            return Vec::new();
        }

        let mut signals = Vec::new();
        match event {
            TransportEvent::Ready { duration } => {
                self.discover_duration(duration);
                self.mark_ready(&mut signals);
            }
            TransportEvent::Tick {
                current_time,
                duration,
                is_playing,
            } => {
                self.discover_duration(duration);
                self.current_time = current_time.max(0.0);
                self.is_playing = is_playing;
                // A tick with a known duration proves the media is prepared
                if self.duration > 0.0 {
                    self.mark_ready(&mut signals);
                }
                signals.push(AdapterSignal::Position {
                    current_time: self.current_time,
                    duration: self.duration,
                    is_playing,
                });
            }
            TransportEvent::Ended => {
                if !self.reached_end {
                    self.reached_end = true;
                    self.is_playing = false;
                    if self.duration > 0.0 {
                        self.current_time = self.duration;
                    }
                    signals.push(AdapterSignal::Ended);
                }
            }
            TransportEvent::Failed { message } => {
                self.is_playing = false;
                signals.push(AdapterSignal::Failed { message });
            }
        }
        signals
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    fn reset(&mut self) {
        self.loaded = false;
        self.ready = false;
        self.reached_end = false;
        self.is_playing = false;
        self.current_time = 0.0;
        self.duration = 0.0;
    }

    fn discover_duration(&mut self, duration: f64) {
        if self.duration <= 0.0 && duration.is_finite() && duration > 0.0 {
            self.duration = duration;
        }
    }

    fn mark_ready(&mut self, signals: &mut Vec<AdapterSignal>) {
        if !self.ready {
            self.ready = true;
            signals.push(AdapterSignal::Ready {
                duration: self.duration,
            });
        }
    }

    fn clamp(&self, seconds: f64) -> f64 {
        let lower = seconds.max(0.0);
        if self.duration > 0.0 {
            lower.min(self.duration)
        } else {
            lower
        }
    }
}
