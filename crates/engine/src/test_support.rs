use std::collections::VecDeque;

use crate::provider::{PlaybackProvider, ProviderNotification};
use crate::timeline::{Clip, ClipTimeline};

/// Transport call observed by [`RecordingProvider`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ProviderCall {
    SeekTo { seconds: f64, allow_seek_ahead: bool },
    Play,
    Pause,
}

/// Provider double that records calls and replays queued notifications.
#[derive(Debug, Default)]
pub(crate) struct RecordingProvider {
    current_time: f64,
    duration: f64,
    calls: Vec<ProviderCall>,
    notifications: VecDeque<ProviderNotification>,
}

impl RecordingProvider {
    /// Provider that reports `duration` and has no queued notifications.
    pub(crate) fn ready(duration: f64) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    /// Provider that will announce readiness on the next notification poll.
    pub(crate) fn announcing_ready(duration: f64) -> Self {
        let mut provider = Self::ready(duration);
        provider.push_notification(ProviderNotification::Ready { duration });
        provider
    }

    pub(crate) fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    /// Changes what `duration()` reports without sending a notification.
    pub(crate) fn set_duration(&mut self, seconds: f64) {
        self.duration = seconds;
    }

    pub(crate) fn push_notification(&mut self, notification: ProviderNotification) {
        self.notifications.push_back(notification);
    }

    pub(crate) fn calls(&self) -> &[ProviderCall] {
        &self.calls
    }

    pub(crate) fn take_calls(&mut self) -> Vec<ProviderCall> {
        std::mem::take(&mut self.calls)
    }
}

impl PlaybackProvider for RecordingProvider {
    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool) {
        self.current_time = seconds;
        self.calls.push(ProviderCall::SeekTo {
            seconds,
            allow_seek_ahead,
        });
    }

    fn play_video(&mut self) {
        self.calls.push(ProviderCall::Play);
    }

    fn pause_video(&mut self) {
        self.calls.push(ProviderCall::Pause);
    }

    fn poll_notifications(&mut self) -> Vec<ProviderNotification> {
        self.notifications.drain(..).collect()
    }
}

/// Builds a clip through the public marker flow.
pub(crate) fn committed_clip(start: f64, end: f64) -> Clip {
    let mut timeline = ClipTimeline::new();
    timeline.mark_start(start);
    match timeline.mark_end(end) {
        Ok(clip) => clip,
        Err(error) => panic!("test clip {start}..{end} is invalid: {error}"),
    }
}
