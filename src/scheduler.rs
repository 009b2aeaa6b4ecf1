use std::time::{Duration, Instant};

/// What caused a reload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Timer,
    FileChanged,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadRequest {
    pub trigger: Trigger,
    pub verbose: bool,
}

/// Decides once per frame whether the fragment shader should be reloaded.
///
/// The timer measures from the last attempt of any kind, successful or not.
/// A zero interval turns the timer off.
#[derive(Debug)]
pub struct ReloadPolicy {
    interval: Duration,
    verbose: bool,
    last_attempt: Instant,
    key_was_down: bool,
}

impl ReloadPolicy {
    pub fn new(interval: Duration, verbose: bool, now: Instant) -> Self {
        Self {
            interval,
            verbose,
            last_attempt: now,
            key_was_down: false,
        }
    }

    /// Returns at most one request per call.
    ///
    /// `key_down` is the current state of the reload key; only the frame on
    /// which it goes down counts. Manual requests are always verbose.
    pub fn poll(&mut self, now: Instant, key_down: bool, file_changed: bool) -> Option<ReloadRequest> {
        let pressed = key_down && !self.key_was_down;
        self.key_was_down = key_down;

        let timer_due = !self.interval.is_zero()
            && now.saturating_duration_since(self.last_attempt) >= self.interval;

        let request = if pressed {
            ReloadRequest {
                trigger: Trigger::Manual,
                verbose: true,
            }
        } else if file_changed {
            ReloadRequest {
                trigger: Trigger::FileChanged,
                verbose: self.verbose,
            }
        } else if timer_due {
            ReloadRequest {
                trigger: Trigger::Timer,
                verbose: self.verbose,
            }
        } else {
            return None;
        };

        self.last_attempt = now;
        Some(request)
    }
}
