//! Cancelable deferred tasks
//!
//! The modal never sleeps. Each timed transition is an entry in a
//! [`Scheduler`] keyed by a [`TimerToken`]; the owner polls the scheduler
//! against a [`Clock`] and applies whatever became due. Clearing a token is
//! the only cancellation mechanism.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic time, measured from an arbitrary epoch
pub trait Clock {
    /// Time elapsed since the clock's epoch
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Hand-advanced clock for deterministic tests and replays
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the modal.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Move time forward by whole milliseconds
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Handle to a scheduled entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug)]
struct Entry<T> {
    token: TimerToken,
    due: Duration,
    task: T,
}

/// Queue of deferred tasks ordered by due time
///
/// Entries due at the same instant fire in the order they were scheduled.
#[derive(Debug)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_token: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_token: 0,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to become due at `now + delay`
    pub fn schedule(&mut self, now: Duration, delay: Duration, task: T) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.entries.push(Entry {
            token,
            due: now + delay,
            task,
        });
        token
    }

    /// Cancel an entry; returns whether it was still pending
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.token != token);
        self.entries.len() != before
    }

    /// Cancel every pending entry
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Whether an entry is still pending
    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.entries.iter().any(|e| e.token == token)
    }

    /// Number of pending entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return the earliest entry due at or before `now`
    ///
    /// Popping one entry at a time lets the caller cancel siblings in
    /// response to what just fired.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerToken, T)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| (e.due, e.token.0))
            .map(|(i, _)| i)?;
        let entry = self.entries.remove(index);
        Some((entry.token, entry.task))
    }

    /// Due time of the earliest pending entry
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.due).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(0), ms(900), "open");
        scheduler.schedule(ms(0), ms(350), "lift");

        assert!(scheduler.pop_due(ms(349)).is_none());
        assert_eq!(scheduler.pop_due(ms(1000)).map(|(_, t)| t), Some("lift"));
        assert_eq!(scheduler.pop_due(ms(1000)).map(|(_, t)| t), Some("open"));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_ties_fire_in_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(0), ms(100), 1);
        scheduler.schedule(ms(0), ms(100), 2);

        assert_eq!(scheduler.pop_due(ms(100)).map(|(_, t)| t), Some(1));
        assert_eq!(scheduler.pop_due(ms(100)).map(|(_, t)| t), Some(2));
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let token = scheduler.schedule(ms(0), ms(10), ());
        assert!(scheduler.is_pending(token));
        assert!(scheduler.cancel(token));
        assert!(!scheduler.cancel(token));
        assert!(scheduler.pop_due(ms(100)).is_none());
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance_ms(250);
        assert_eq!(clock.now(), ms(250));
    }

    #[test]
    fn test_next_due() {
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.next_due(), None);
        scheduler.schedule(ms(50), ms(100), ());
        scheduler.schedule(ms(0), ms(30), ());
        assert_eq!(scheduler.next_due(), Some(ms(30)));
    }
}
