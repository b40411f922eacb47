use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::provider::PlaybackProvider;
use crate::scheduler::{TimerId, TimerKind, TimerQueue};
use crate::time::clamp_position;

/// Default cadence of position polling while the provider plays.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Tracked playback position, in seconds.
///
/// `current_time` always stays inside `[0, duration]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlaybackPosition {
    pub current_time: f64,
    pub duration: f64,
}

impl PlaybackPosition {
    /// Stores `seconds` clamped to the known duration and returns it.
    pub fn set_current(&mut self, seconds: f64) -> f64 {
        self.current_time = clamp_position(seconds, self.duration);
        self.current_time
    }

    /// Updates the duration and re-clamps the current time.
    pub fn set_duration(&mut self, seconds: f64) {
        self.duration = if seconds.is_finite() {
            seconds.max(0.0)
        } else {
            0.0
        };
        self.current_time = clamp_position(self.current_time, self.duration);
    }

    /// Returns the position as a fraction of the duration, `0` when unknown.
    pub fn fraction(&self) -> f64 {
        if self.duration > 0.0 {
            self.current_time / self.duration
        } else {
            0.0
        }
    }
}

/// Polls the provider position while it is playing.
///
/// Owns at most one repeating timer in the shared [`TimerQueue`].
#[derive(Debug)]
pub struct TimeTracker {
    interval: Duration,
    active: Option<TimerId>,
    position: PlaybackPosition,
}

impl TimeTracker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            active: None,
            position: PlaybackPosition::default(),
        }
    }

    /// Starts polling, replacing any poll that is already running.
    pub fn start(&mut self, timers: &mut TimerQueue, now: Duration) -> TimerId {
        self.stop(timers);
        let id = timers.schedule_repeating(
            now.saturating_add(self.interval),
            self.interval,
            TimerKind::PositionPoll,
        );
        self.active = Some(id);
        debug!(
            interval_ms = self.interval.as_millis() as u64,
            "position polling started"
        );
        id
    }

    /// Stops polling. Returns false when nothing was running.
    pub fn stop(&mut self, timers: &mut TimerQueue) -> bool {
        let Some(id) = self.active.take() else {
            return false;
        };
        timers.cancel(id);
        debug!("position polling stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Returns true when `id` is the poll timer this tracker owns.
    pub fn owns(&self, id: TimerId) -> bool {
        self.active == Some(id)
    }

    /// Reads the provider position and republishes it.
    ///
    /// A duration that is still unknown is refreshed from the provider first.
    pub fn tick<P>(&mut self, provider: &P) -> PlaybackPosition
    where
        P: PlaybackProvider,
    {
        if self.position.duration <= 0.0 {
            self.position.set_duration(provider.duration());
        }
        self.position.set_current(provider.current_time());
        self.position
    }

    pub fn position(&self) -> PlaybackPosition {
        self.position
    }

    pub fn position_mut(&mut self) -> &mut PlaybackPosition {
        &mut self.position
    }

    pub(crate) fn reset_position(&mut self) {
        self.position = PlaybackPosition::default();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{DEFAULT_POLL_INTERVAL, PlaybackPosition, TimeTracker};
    use crate::scheduler::{TimerKind, TimerQueue};
    use crate::test_support::RecordingProvider;

    fn poll_count(timers: &TimerQueue) -> usize {
        timers.count(|kind| matches!(kind, TimerKind::PositionPoll))
    }

    #[test]
    fn restarting_replaces_the_previous_poll() {
        let mut timers = TimerQueue::new();
        let mut tracker = TimeTracker::new(DEFAULT_POLL_INTERVAL);

        let first = tracker.start(&mut timers, Duration::ZERO);
        let second = tracker.start(&mut timers, Duration::from_millis(30));

        assert_eq!(poll_count(&timers), 1);
        assert!(!timers.is_active(first));
        assert!(tracker.owns(second));
        assert_eq!(timers.next_deadline(), Some(Duration::from_millis(130)));
    }

    #[test]
    fn stop_cancels_the_poll_and_is_idempotent() {
        let mut timers = TimerQueue::new();
        let mut tracker = TimeTracker::new(DEFAULT_POLL_INTERVAL);
        tracker.start(&mut timers, Duration::ZERO);

        assert!(tracker.stop(&mut timers));
        assert!(!tracker.stop(&mut timers));
        assert_eq!(poll_count(&timers), 0);
        assert!(!tracker.is_running());
    }

    #[test]
    fn tick_clamps_provider_position_and_fills_unknown_duration() {
        let mut provider = RecordingProvider::ready(50.0);
        provider.set_current_time(72.0);
        let mut tracker = TimeTracker::new(DEFAULT_POLL_INTERVAL);

        let position = tracker.tick(&provider);

        assert_eq!(
            position,
            PlaybackPosition {
                current_time: 50.0,
                duration: 50.0
            }
        );
    }

    #[test]
    fn shrinking_duration_reclamps_current_time() {
        let mut position = PlaybackPosition::default();
        position.set_duration(100.0);
        position.set_current(80.0);

        position.set_duration(60.0);

        assert_eq!(position.current_time, 60.0);
        assert_eq!(position.fraction(), 1.0);
    }
}
