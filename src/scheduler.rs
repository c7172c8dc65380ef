//! Regeneration scheduler
//!
//! Trailing-edge debounce: every request resets a single pending deadline,
//! and only once the window elapses with no further requests does exactly one
//! regeneration become due. The clock is injectable through the `*_at`
//! variants so tests never have to sleep.

use std::time::{Duration, Instant};

/// Default debounce window in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 1_000;

/// Debounced regeneration scheduler
#[derive(Debug)]
pub struct RegenScheduler {
    window: Duration,
    deadline: Option<Instant>,
}

impl RegenScheduler {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Request a regeneration; callable any number of times, arbitrarily fast
    pub fn request(&mut self) {
        self.request_at(Instant::now());
    }

    /// Clock-injected variant of [`request`](Self::request)
    pub fn request_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Whether a regeneration is scheduled (due or not)
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the window has elapsed since the last request
    pub fn due(&self) -> bool {
        self.due_at(Instant::now())
    }

    /// Clock-injected variant of [`due`](Self::due)
    pub fn due_at(&self, now: Instant) -> bool {
        self.deadline.map(|d| now >= d).unwrap_or(false)
    }

    /// Consume a due request. Returns true at most once per elapsed window.
    pub fn take(&mut self) -> bool {
        self.take_at(Instant::now())
    }

    /// Clock-injected variant of [`take`](Self::take)
    pub fn take_at(&mut self, now: Instant) -> bool {
        if self.due_at(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }

    /// Consume any pending request immediately, ignoring the window
    pub fn flush(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Drop any pending request without running it
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

impl Default for RegenScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}
