use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of "now" for anything that measures answer latency.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock advanced by hand. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

/// Pausable elapsed-time accumulator for the current question.
///
/// Does nothing until started. `pause` folds the running span into the
/// accumulator, `reset` zeroes it and stops.
#[derive(Clone, Debug, Default)]
pub struct Stopwatch {
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn start(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_duration_since(since);
        }
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.running_since = None;
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + now.saturating_duration_since(since),
            None => self.accumulated,
        }
    }

    pub fn elapsed_ms(&self, now: Instant) -> u64 {
        self.elapsed(now).as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_unstarted_stays_at_zero() {
        let clock = ManualClock::new();
        let watch = Stopwatch::new();
        clock.advance(ms(500));
        assert_eq!(watch.elapsed_ms(clock.now()), 0);
        assert!(!watch.is_running());
    }

    #[test]
    fn test_non_decreasing_while_running() {
        let clock = ManualClock::new();
        let mut watch = Stopwatch::new();
        watch.start(clock.now());

        let mut last = 0;
        for step in [0, 3, 10, 0, 250] {
            clock.advance(ms(step));
            let now = watch.elapsed_ms(clock.now());
            assert!(now >= last, "elapsed went backwards: {now} < {last}");
            last = now;
        }
        assert_eq!(last, 263);
    }

    #[test]
    fn test_frozen_while_paused() {
        let clock = ManualClock::new();
        let mut watch = Stopwatch::new();
        watch.start(clock.now());
        clock.advance(ms(120));
        watch.pause(clock.now());

        clock.advance(ms(5_000));
        assert_eq!(watch.elapsed_ms(clock.now()), 120);

        // Resuming continues from the frozen value
        watch.start(clock.now());
        clock.advance(ms(30));
        assert_eq!(watch.elapsed_ms(clock.now()), 150);
    }

    #[test]
    fn test_zero_after_reset() {
        let clock = ManualClock::new();
        let mut watch = Stopwatch::new();
        watch.start(clock.now());
        clock.advance(ms(700));
        watch.reset();
        assert_eq!(watch.elapsed_ms(clock.now()), 0);
        assert!(!watch.is_running());
    }

    #[test]
    fn test_double_start_keeps_original_origin() {
        let clock = ManualClock::new();
        let mut watch = Stopwatch::new();
        watch.start(clock.now());
        clock.advance(ms(40));
        watch.start(clock.now());
        clock.advance(ms(10));
        assert_eq!(watch.elapsed_ms(clock.now()), 50);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let before = other.now();
        clock.advance(ms(25));
        assert_eq!(other.now().duration_since(before), ms(25));
    }
}
