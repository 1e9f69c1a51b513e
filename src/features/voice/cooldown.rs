//! Cooldown gate for command processing.

use std::time::{Duration, Instant};

/// Default cooldown window.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(1200);

/// Suppresses command processing for a window after it is triggered.
///
/// Triggering again while active restarts the window.
#[derive(Debug, Clone)]
pub struct Cooldown {
    window: Duration,
    until: Option<Instant>,
}

impl Cooldown {
    /// Create an inactive gate with the given window.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            until: None,
        }
    }

    /// Length of the window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Start (or restart) the window now.
    pub fn trigger(&mut self) {
        self.trigger_at(Instant::now());
    }

    /// Start (or restart) the window at `now`.
    pub fn trigger_at(&mut self, now: Instant) {
        self.until = now.checked_add(self.window);
    }

    /// Whether processing is currently suppressed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active_at(Instant::now())
    }

    /// Whether processing is suppressed at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    /// Time left in the window at `now`.
    #[must_use]
    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.until
            .map_or(Duration::ZERO, |until| until.saturating_duration_since(now))
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_until_triggered() {
        let cooldown = Cooldown::default();
        assert!(!cooldown.is_active());
        assert_eq!(cooldown.window(), Duration::from_millis(1200));
    }

    #[test]
    fn test_window_elapses() {
        let mut cooldown = Cooldown::new(Duration::from_millis(1200));
        let start = Instant::now();
        cooldown.trigger_at(start);

        assert!(cooldown.is_active_at(start));
        assert!(cooldown.is_active_at(start + Duration::from_millis(1199)));
        assert!(!cooldown.is_active_at(start + Duration::from_millis(1200)));
        assert_eq!(
            cooldown.remaining_at(start + Duration::from_millis(200)),
            Duration::from_millis(1000)
        );
    }

    #[test]
    fn test_retrigger_extends_window() {
        let mut cooldown = Cooldown::new(Duration::from_secs(1));
        let start = Instant::now();
        cooldown.trigger_at(start);
        cooldown.trigger_at(start + Duration::from_millis(900));

        assert!(cooldown.is_active_at(start + Duration::from_millis(1500)));
    }

    #[test]
    fn test_zero_window_never_blocks() {
        let mut cooldown = Cooldown::new(Duration::ZERO);
        cooldown.trigger();
        assert!(!cooldown.is_active());
    }
}
