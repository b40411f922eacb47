use std::time::Duration;

use crate::player::PlaybackSession;
use crate::timeline::ClipId;

const MIN_REPEAT_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Work attached to a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    PositionPoll,
    ClipStop {
        session: PlaybackSession,
        clip_id: ClipId,
    },
}

/// Timer popped from the queue because its deadline passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub kind: TimerKind,
    pub deadline: Duration,
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    id: TimerId,
    kind: TimerKind,
    deadline: Duration,
    interval: Option<Duration>,
}

/// Owned set of cancellable one-shot and repeating timers.
///
/// Time is a monotonic offset from session start supplied by the caller, so
/// the queue behaves the same under a wall clock and a simulated one.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use engine::scheduler::{TimerKind, TimerQueue};
///
/// let mut timers = TimerQueue::new();
/// let poll = timers.schedule_repeating(
///     Duration::from_millis(100),
///     Duration::from_millis(100),
///     TimerKind::PositionPoll,
/// );
///
/// let fired = timers.pop_next_due(Duration::from_millis(100)).expect("due");
/// assert_eq!(fired.id, poll);
/// assert_eq!(timers.next_deadline(), Some(Duration::from_millis(200)));
/// ```
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    entries: Vec<TimerEntry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `kind` to fire once at `deadline`.
    pub fn schedule_once(&mut self, deadline: Duration, kind: TimerKind) -> TimerId {
        self.insert(deadline, None, kind)
    }

    /// Schedules `kind` to fire at `first_deadline` and then every `interval`.
    pub fn schedule_repeating(
        &mut self,
        first_deadline: Duration,
        interval: Duration,
        kind: TimerKind,
    ) -> TimerId {
        self.insert(first_deadline, Some(interval.max(MIN_REPEAT_INTERVAL)), kind)
    }

    /// Cancels a timer. Returns false when it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Returns the earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|entry| entry.deadline).min()
    }

    /// Pops the earliest timer whose deadline is at or before `now`.
    ///
    /// Ties fire in scheduling order. Repeating timers are re-armed; a timer
    /// that fell more than one interval behind skips the missed ticks.
    pub fn pop_next_due(&mut self, now: Duration) -> Option<FiredTimer> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.deadline <= now)
            .min_by_key(|(_, entry)| (entry.deadline, entry.id))
            .map(|(index, _)| index)?;

        let entry = self.entries[index];
        let fired = FiredTimer {
            id: entry.id,
            kind: entry.kind,
            deadline: entry.deadline,
        };

        match entry.interval {
            Some(interval) => {
                let mut next = entry.deadline.saturating_add(interval);
                if next <= now {
                    next = now.saturating_add(interval);
                }
                self.entries[index].deadline = next;
            }
            None => {
                self.entries.swap_remove(index);
            }
        }

        Some(fired)
    }

    /// Counts pending timers matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&TimerKind) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|entry| predicate(&entry.kind))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, deadline: Duration, interval: Option<Duration>, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(TimerEntry {
            id,
            kind,
            deadline,
            interval,
        });
        id
    }
}
