//! Rate limiting for resize and scroll storms.
//!
//! The two limiters are armed together by the coordinator: [`Throttle`]
//! bounds the update frequency while events keep arriving, [`Debounce`]
//! guarantees one trailing, accurate update after they settle. Each has an
//! explicit `*_at(now)` variant so tests control the clock.

use std::time::Duration;

use web_time::Instant;

/// Leading-edge limiter: [`ready`] returns true at most once per window.
///
/// [`ready`]: Throttle::ready
#[derive(Debug)]
pub struct Throttle {
    window: Duration,
    last_fire: Option<Instant>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fire: None,
        }
    }

    pub fn ready(&mut self) -> bool {
        self.ready_at(Instant::now())
    }

    pub fn ready_at(&mut self, now: Instant) -> bool {
        match self.last_fire {
            Some(last) if now.saturating_duration_since(last) <= self.window => false,
            _ => {
                self.last_fire = Some(now);
                true
            }
        }
    }

    /// Forgets the last fire time; the next call fires immediately.
    pub fn reset(&mut self) {
        self.last_fire = None;
    }
}

/// Trailing-edge limiter: [`arm`] (re)starts the settle window,
/// [`fire_ready`] reports true once it elapses with no further arming.
///
/// The trailing edge is host-driven: whoever owns the event loop polls
/// `fire_ready` from its frame tick.
///
/// [`arm`]: Debounce::arm
/// [`fire_ready`]: Debounce::fire_ready
#[derive(Debug)]
pub struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn arm(&mut self) {
        self.arm_at(Instant::now());
    }

    pub fn arm_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn fire_ready(&mut self) -> bool {
        self.fire_ready_at(Instant::now())
    }

    pub fn fire_ready_at(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_fires_once_per_window() {
        let mut throttle = Throttle::new(Duration::from_millis(200));
        let t0 = Instant::now();

        assert!(throttle.ready_at(t0));
        assert!(!throttle.ready_at(t0 + Duration::from_millis(100)));
        assert!(!throttle.ready_at(t0 + Duration::from_millis(200)));
        assert!(throttle.ready_at(t0 + Duration::from_millis(201)));
    }

    #[test]
    fn test_throttle_reset() {
        let mut throttle = Throttle::new(Duration::from_millis(200));
        let t0 = Instant::now();

        assert!(throttle.ready_at(t0));
        throttle.reset();
        assert!(throttle.ready_at(t0));
    }

    #[test]
    fn test_debounce_fires_after_settle() {
        let mut debounce = Debounce::new(Duration::from_millis(200));
        let t0 = Instant::now();

        debounce.arm_at(t0);
        assert!(!debounce.fire_ready_at(t0 + Duration::from_millis(199)));
        assert!(debounce.fire_ready_at(t0 + Duration::from_millis(200)));
        // One-shot until re-armed.
        assert!(!debounce.fire_ready_at(t0 + Duration::from_millis(400)));
    }

    #[test]
    fn test_rearming_pushes_deadline() {
        let mut debounce = Debounce::new(Duration::from_millis(200));
        let t0 = Instant::now();

        debounce.arm_at(t0);
        debounce.arm_at(t0 + Duration::from_millis(150));
        assert!(!debounce.fire_ready_at(t0 + Duration::from_millis(250)));
        assert!(debounce.fire_ready_at(t0 + Duration::from_millis(350)));
    }

    #[test]
    fn test_cancel_disarms() {
        let mut debounce = Debounce::new(Duration::from_millis(200));
        debounce.arm();
        assert!(debounce.is_armed());
        debounce.cancel();
        assert!(!debounce.is_armed());
    }
}
