use tracing::debug;

use crate::provider::PlaybackProvider;
use crate::tracker::PlaybackPosition;

/// Turns scrub input into provider seeks with immediate position feedback.
#[derive(Debug, Clone, Copy)]
pub struct SeekController {
    allow_seek_ahead: bool,
}

impl SeekController {
    pub fn new(allow_seek_ahead: bool) -> Self {
        Self { allow_seek_ahead }
    }

    /// Seeks to `seconds`, clamped to `[0, duration]`.
    ///
    /// `position` is updated before the provider is asked to seek so the
    /// displayed time does not wait for the next poll. An unknown duration
    /// is read from the provider first.
    pub fn seek<P>(&self, provider: &mut P, position: &mut PlaybackPosition, seconds: f64) -> f64
    where
        P: PlaybackProvider,
    {
        refresh_duration(provider, position);
        let target = position.set_current(seconds);
        provider.seek_to(target, self.allow_seek_ahead);
        debug!(requested = seconds, target, "seek issued");
        target
    }

    /// Seeks to `fraction` of the duration; `fraction` is clamped to `[0, 1]`.
    pub fn scrub<P>(&self, provider: &mut P, position: &mut PlaybackPosition, fraction: f64) -> f64
    where
        P: PlaybackProvider,
    {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        refresh_duration(provider, position);
        let seconds = fraction * position.duration;
        self.seek(provider, position, seconds)
    }
}

/// Some widgets report a zero duration when they become ready.
fn refresh_duration<P>(provider: &P, position: &mut PlaybackPosition)
where
    P: PlaybackProvider,
{
    if position.duration <= 0.0 {
        position.set_duration(provider.duration());
    }
}
