//! Deferred task scheduler
//!
//! A priority queue keyed by due time on a monotonic simulation clock. Callers
//! request "run this after N seconds" (or "every N seconds") and continue
//! immediately; the tick loop polls `advance` once per frame and executes the
//! returned tasks at the tick boundary.
//!
//! Tasks are plain data, not closures, so a task that refers to an entity must
//! tolerate that entity being gone by the time it runs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Smallest interval accepted for repeating tasks
const MIN_REPEAT_INTERVAL: f64 = 1.0e-3;

/// Handle used to cancel a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Entry<T> {
    due: f64,
    /// Insertion order, breaks ties between tasks due at the same instant
    seq: u64,
    handle: TaskHandle,
    repeat: Option<f64>,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the earliest due first
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Scheduler for one-shot and repeating tasks
#[derive(Debug)]
pub struct Scheduler<T> {
    now: f64,
    queue: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Current simulation clock (seconds)
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn push(&mut self, delay: f64, repeat: Option<f64>, task: T) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        let handle = TaskHandle(seq);
        self.queue.push(Entry {
            due: self.now + delay.max(0.0),
            seq,
            handle,
            repeat,
            task,
        });
        handle
    }

    /// Run `task` once, `delay` seconds from now
    pub fn schedule_once(&mut self, delay: f32, task: T) -> TaskHandle {
        self.push(delay as f64, None, task)
    }

    /// Run `task` every `interval` seconds, first after one interval
    pub fn schedule_repeating(&mut self, interval: f32, task: T) -> TaskHandle {
        let interval = (interval as f64).max(MIN_REPEAT_INTERVAL);
        self.push(interval, Some(interval), task)
    }

    /// Cancel a pending task. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.queue.len();
        self.queue.retain(|e| e.handle != handle);
        self.queue.len() != before
    }

    /// Cancel every pending task matching `pred`. Returns how many were removed.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.queue.len();
        self.queue.retain(|e| !pred(&e.task));
        before - self.queue.len()
    }

    /// Drop every pending task (clock keeps running)
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Drop every pending task and rewind the clock
    pub fn reset(&mut self) {
        self.queue.clear();
        self.now = 0.0;
        self.next_seq = 0;
    }
}

impl<T: Clone> Scheduler<T> {
    /// Advance the clock by `dt` seconds and return every task that came due,
    /// ordered by due time. Repeating tasks are re-queued (and may appear more
    /// than once if `dt` spans several intervals).
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        self.now += dt.max(0.0) as f64;
        let mut due = Vec::new();

        while let Some(entry) = self.queue.peek() {
            if entry.due > self.now {
                break;
            }
            let Some(entry) = self.queue.pop() else { break };
            if let Some(interval) = entry.repeat {
                self.queue.push(Entry {
                    due: entry.due + interval,
                    seq: entry.seq,
                    handle: entry.handle,
                    repeat: entry.repeat,
                    task: entry.task.clone(),
                });
            }
            due.push(entry.task);
        }

        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_one_shot_fires_once() {
        let mut sched = Scheduler::new();
        sched.schedule_once(0.5, "boom");

        assert!(sched.advance(0.25).is_empty());
        assert_eq!(sched.advance(0.25), vec!["boom"]);
        assert!(sched.advance(1.0).is_empty());
        assert!(sched.is_empty());
    }

    #[test]
    fn test_zero_delay_fires_next_advance() {
        let mut sched = Scheduler::new();
        sched.schedule_once(0.0, 1);
        assert_eq!(sched.advance(0.0), vec![1]);
    }

    #[test]
    fn test_repeating_catches_up() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(0.1, 'r');

        assert_eq!(sched.advance(0.35).len(), 3);
        assert_eq!(sched.advance(0.05).len(), 1);
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut sched = Scheduler::new();
        let a = sched.schedule_once(1.0, 'a');
        sched.schedule_once(1.0, 'b');

        assert!(sched.cancel(a));
        assert!(!sched.cancel(a));
        assert_eq!(sched.advance(2.0), vec!['b']);
    }

    #[test]
    fn test_cancel_repeating() {
        let mut sched = Scheduler::new();
        let h = sched.schedule_repeating(0.1, ());
        sched.advance(0.1);
        assert!(sched.cancel(h));
        assert!(sched.advance(1.0).is_empty());
    }

    #[test]
    fn test_cancel_where() {
        let mut sched = Scheduler::new();
        for i in 0..10 {
            sched.schedule_once(0.1 * i as f32, i);
        }
        assert_eq!(sched.cancel_where(|t| t % 2 == 0), 5);
        let fired = sched.advance(5.0);
        assert!(fired.iter().all(|t| t % 2 == 1));
    }

    #[test]
    fn test_same_due_keeps_insertion_order() {
        let mut sched = Scheduler::new();
        sched.schedule_once(0.2, "first");
        sched.schedule_once(0.2, "second");
        assert_eq!(sched.advance(0.2), vec!["first", "second"]);
    }

    #[test]
    fn test_reset_rewinds_clock() {
        let mut sched = Scheduler::new();
        sched.schedule_once(5.0, ());
        sched.advance(1.0);
        sched.reset();
        assert_eq!(sched.now(), 0.0);
        assert!(sched.is_empty());
    }

    proptest! {
        #[test]
        fn prop_tasks_fire_in_due_order(delays in prop::collection::vec(0.0f32..10.0, 1..40)) {
            let mut sched = Scheduler::new();
            for (i, d) in delays.iter().enumerate() {
                sched.schedule_once(*d, (*d, i));
            }
            let fired = sched.advance(10.0);
            prop_assert_eq!(fired.len(), delays.len());
            for pair in fired.windows(2) {
                prop_assert!(pair[0].0 <= pair[1].0);
            }
        }

        #[test]
        fn prop_nothing_fires_early(delay in 0.01f32..5.0, step in 0.001f32..0.05) {
            let mut sched = Scheduler::new();
            sched.schedule_once(delay, ());
            let mut elapsed = 0.0f64;
            loop {
                let fired = sched.advance(step);
                elapsed += step as f64;
                if !fired.is_empty() {
                    prop_assert!(elapsed + 1e-6 >= delay as f64);
                    break;
                }
                prop_assert!(elapsed < delay as f64 + step as f64 + 1e-6);
            }
        }
    }
}
