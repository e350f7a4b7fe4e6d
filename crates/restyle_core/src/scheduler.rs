//! Change scheduler
//!
//! Gates how often the external compiler runs. The scheduler is a two-state
//! machine:
//!
//! ```text
//!            request / compile now
//!   Ready ─────────────────────────▶ CoolingDown(deadline)
//!     ▲                                   │  request / coalesced
//!     │        expiry / compile again     │
//!     └───────────────────────────────────┘
//! ```
//!
//! The first request in a burst compiles immediately. Requests during the
//! cooldown are coalesced, and expiry always compiles once more to pick up
//! edits made inside the window. There is no way to cancel an armed
//! trailing compile.
//!
//! The scheduler does not own a timer thread. Hosts drive it by calling
//! [`ChangeScheduler::poll`] (the editor's `tick`) and can sleep until
//! [`ChangeScheduler::next_deadline`].

use std::time::{Duration, Instant};

/// Cooldown window between compiles
pub const DEFAULT_DELAY: Duration = Duration::from_millis(750);

/// Scheduler gate state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Ready,
    CoolingDown { deadline: Instant },
}

/// What the caller must do with a recompilation request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Compile now; the cooldown has been armed
    Immediate,
    /// A trailing compile is already armed and will cover this request
    Coalesced,
    /// The scheduler is disabled for a batch operation
    Suppressed,
}

/// Trailing-edge coalescing debounce
#[derive(Clone, Debug)]
pub struct ChangeScheduler {
    state: SchedulerState,
    delay: Duration,
    enabled: bool,
    coalesced: u64,
}

impl ChangeScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: SchedulerState::Ready,
            delay,
            enabled: true,
            coalesced: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_ready(&self) -> bool {
        self.state == SchedulerState::Ready
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable request handling. Disabling does not disarm a
    /// pending trailing compile.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Requests coalesced since the last compile
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }

    /// Handle a recompilation request made at `now`.
    ///
    /// An expired cooldown still counts as armed until [`Self::poll`] sees
    /// it, so callers poll first.
    pub fn request(&mut self, now: Instant) -> Dispatch {
        if !self.enabled {
            return Dispatch::Suppressed;
        }
        match self.state {
            SchedulerState::Ready => {
                self.state = SchedulerState::CoolingDown {
                    deadline: now + self.delay,
                };
                self.coalesced = 0;
                tracing::debug!("ChangeScheduler: compile now, cooling down for {:?}", self.delay);
                Dispatch::Immediate
            }
            SchedulerState::CoolingDown { .. } => {
                self.coalesced += 1;
                Dispatch::Coalesced
            }
        }
    }

    /// Returns `true` once when the armed cooldown has expired; the caller
    /// must then compile. The scheduler is back in `Ready` afterwards.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            SchedulerState::CoolingDown { deadline } if now >= deadline => {
                tracing::debug!(
                    "ChangeScheduler: cooldown expired, trailing compile ({} coalesced)",
                    self.coalesced
                );
                self.state = SchedulerState::Ready;
                self.coalesced = 0;
                true
            }
            _ => false,
        }
    }

    /// Instant at which the armed trailing compile is due
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            SchedulerState::Ready => None,
            SchedulerState::CoolingDown { deadline } => Some(deadline),
        }
    }
}

impl Default for ChangeScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}
