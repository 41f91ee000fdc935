use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub trait Clock: Send {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Returns false, leaving the time unchanged, when `by` would overflow the clock.
    pub fn advance(&self, by: Duration) -> bool {
        let Ok(mut elapsed) = self.elapsed.lock() else {
            return false;
        };
        match elapsed
            .checked_add(by)
            .filter(|next| self.origin.checked_add(*next).is_some())
        {
            Some(next) => {
                *elapsed = next;
                true
            }
            None => false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
            .lock()
            .map(|elapsed| *elapsed)
            .unwrap_or_default()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        // advance() keeps origin + elapsed representable.
        self.origin
            .checked_add(self.elapsed())
            .unwrap_or(self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_advances() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        let start = clock.now();

        assert!(handle.advance(Duration::from_millis(1_500)));

        assert_eq!(clock.now() - start, Duration::from_millis(1_500));
        assert_eq!(clock.elapsed(), Duration::from_millis(1_500));
    }

    #[test]
    fn overflowing_advance_is_refused() {
        let clock = ManualClock::new();
        let huge = Duration::from_secs(10_000_000_000_000_000_000);

        assert!(clock.advance(Duration::from_secs(1)));
        assert!(!clock.advance(Duration::MAX));
        let before = clock.now();
        for _ in 0..4 {
            clock.advance(huge);
        }

        assert!(clock.now() >= before);
        assert!(clock.elapsed() >= Duration::from_secs(1));
    }
}
