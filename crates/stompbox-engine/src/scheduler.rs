//! Repeating host-thread tasks.
//!
//! The engine's periodic work (level meter, tuner, performance stats) runs on
//! the thread that owns the controller, driven by explicit `poll(now)` calls.
//! Each task is registered with a period and returns a [`TaskHandle`] that
//! cancels it; nothing runs in the background.
//!
//! A task that falls behind (the host polled late) runs once and is re-armed
//! one period after `now`; missed runs are not replayed.

use std::time::{Duration, Instant};

/// Shortest accepted period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Cancel handle of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Entry<T> {
    handle: TaskHandle,
    task: T,
    period: Duration,
    deadline: Instant,
}

/// Set of repeating tasks keyed by value `T`.
#[derive(Debug)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T: Copy> Scheduler<T> {
    /// Empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` every `period`, first at `now + period`.
    pub fn every(&mut self, task: T, period: Duration, now: Instant) -> TaskHandle {
        let period = period.max(MIN_PERIOD);
        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        self.entries.push(Entry {
            handle,
            task,
            period,
            deadline: now + period,
        });
        handle
    }

    /// Stops a task. Returns false if it was not scheduled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Stops every task.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// True while `handle` is scheduled.
    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Number of scheduled tasks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    /// Tasks whose deadline is at or before `now`, in registration order.
    /// Each is re-armed before returning.
    pub fn due(&mut self, now: Instant) -> Vec<T> {
        let mut due = Vec::new();
        for entry in &mut self.entries {
            if entry.deadline <= now {
                due.push(entry.task);
                entry.deadline += entry.period;
                if entry.deadline <= now {
                    entry.deadline = now + entry.period;
                }
            }
        }
        if !due.is_empty() {
            tracing::trace!(count = due.len(), "scheduler tasks due");
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn fires_on_period_boundaries() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.every('m', 80 * MS, t0);
        s.every('t', 50 * MS, t0);

        assert!(s.due(t0 + 49 * MS).is_empty());
        assert_eq!(s.due(t0 + 50 * MS), vec!['t']);
        assert_eq!(s.due(t0 + 80 * MS), vec!['m']);
        assert_eq!(s.due(t0 + 100 * MS), vec!['t']);
        assert_eq!(s.next_deadline(), Some(t0 + 150 * MS));
    }

    #[test]
    fn late_poll_runs_once() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.every(1u8, 10 * MS, t0);
        assert_eq!(s.due(t0 + 1000 * MS), vec![1]);
        assert!(s.due(t0 + 1005 * MS).is_empty());
        assert_eq!(s.due(t0 + 1010 * MS), vec![1]);
    }

    #[test]
    fn cancel_and_cancel_all() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        let a = s.every("a", 10 * MS, t0);
        let b = s.every("b", 10 * MS, t0);
        assert!(s.cancel(a));
        assert!(!s.cancel(a));
        assert!(!s.is_scheduled(a));
        assert!(s.is_scheduled(b));
        assert_eq!(s.due(t0 + 10 * MS), vec!["b"]);

        s.cancel_all();
        assert!(s.is_empty());
        assert!(s.due(t0 + 100 * MS).is_empty());
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn zero_period_is_raised() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.every((), Duration::ZERO, t0);
        assert!(s.due(t0).is_empty());
        assert_eq!(s.due(t0 + MS).len(), 1);
    }
}
