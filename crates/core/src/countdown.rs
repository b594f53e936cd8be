//! Countdown module - the player's move timer
//!
//! Driven by `tick(elapsed_ms)` like every other timer in the engine; it never
//! reads a clock itself. Pausing freezes the remaining time and resuming picks up
//! from there.

/// Restartable, pausable one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    duration_ms: u32,
    remaining_ms: u32,
    running: bool,
    paused: bool,
}

impl Countdown {
    pub fn new(duration_ms: u32) -> Self {
        Self {
            duration_ms,
            remaining_ms: duration_ms,
            running: false,
            paused: false,
        }
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn remaining_ms(&self) -> u32 {
        self.remaining_ms
    }

    /// Counting down (not stopped, not paused)
    pub fn is_running(&self) -> bool {
        self.running && !self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Start from the full duration
    pub fn start(&mut self) {
        self.remaining_ms = self.duration_ms;
        self.running = true;
        self.paused = false;
    }

    pub fn restart(&mut self) {
        self.start();
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.paused = false;
    }

    /// Freeze the remaining time. No-op when not running.
    pub fn pause(&mut self) {
        if self.running {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Advance by `elapsed_ms`. Returns true exactly once, on the tick that
    /// reaches zero; the timer is stopped afterwards.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if !self.is_running() {
            return false;
        }

        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
        if self.remaining_ms == 0 {
            self.running = false;
            return true;
        }
        false
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(crate::types::MOVE_COUNTDOWN_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once() {
        let mut cd = Countdown::new(100);
        cd.start();
        assert!(!cd.tick(60));
        assert_eq!(cd.remaining_ms(), 40);
        assert!(cd.tick(60));
        assert!(!cd.tick(60));
        assert!(!cd.is_running());
    }

    #[test]
    fn test_not_started_never_fires() {
        let mut cd = Countdown::new(10);
        assert!(!cd.tick(1000));
    }

    #[test]
    fn test_pause_keeps_remaining_time() {
        let mut cd = Countdown::new(100);
        cd.start();
        cd.tick(30);
        cd.pause();
        assert!(!cd.tick(500));
        assert_eq!(cd.remaining_ms(), 70);

        cd.resume();
        assert!(!cd.tick(69));
        assert!(cd.tick(1));
    }

    #[test]
    fn test_restart_resets_to_full() {
        let mut cd = Countdown::new(100);
        cd.start();
        cd.tick(90);
        cd.restart();
        assert_eq!(cd.remaining_ms(), 100);
        assert!(cd.is_running());
    }

    #[test]
    fn test_pause_on_stopped_timer_is_noop() {
        let mut cd = Countdown::new(100);
        cd.pause();
        assert!(!cd.is_paused());
    }

    proptest::proptest! {
        #[test]
        fn prop_fires_on_first_tick_reaching_zero(
            duration in 1u32..20_000,
            steps in proptest::collection::vec(0u32..2_000, 0..64),
        ) {
            let mut cd = Countdown::new(duration);
            cd.start();
            let mut elapsed = 0u32;
            for step in steps {
                let was_running = cd.is_running();
                elapsed = elapsed.saturating_add(step);
                let fired = cd.tick(step);
                proptest::prop_assert_eq!(fired, was_running && elapsed >= duration);
                proptest::prop_assert_eq!(cd.remaining_ms(), duration.saturating_sub(elapsed));
            }
        }
    }
}
