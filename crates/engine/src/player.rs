use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::provider::PlaybackProvider;
use crate::scheduler::{TimerId, TimerKind, TimerQueue};
use crate::time::seconds_to_duration;
use crate::timeline::{Clip, ClipId};

/// Monotonic id of one playback request.
///
/// Every clip playback and every manual transport action starts a new
/// session; a stop scheduled under an older session is obsolete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PlaybackSession(u64);

impl PlaybackSession {
    pub fn get(self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScheduledStop {
    timer: TimerId,
    session: PlaybackSession,
    clip_id: ClipId,
}

/// Plays stored clips and pauses the provider once a clip's duration elapses.
#[derive(Debug, Default)]
pub struct ClipPlayer {
    session: u64,
    pending_stop: Option<ScheduledStop>,
}

impl ClipPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeks to `clip`, starts playback and schedules the bounded stop.
    ///
    /// Any stop scheduled by an earlier call is cancelled first.
    pub fn play<P>(
        &mut self,
        provider: &mut P,
        timers: &mut TimerQueue,
        clip: &Clip,
        now: Duration,
    ) -> PlaybackSession
    where
        P: PlaybackProvider,
    {
        self.supersede(timers);
        let session = self.current_session();

        provider.seek_to(clip.start_time(), true);
        provider.play_video();

        let stop_after = seconds_to_duration(clip.duration());
        let timer = timers.schedule_once(
            now.saturating_add(stop_after),
            TimerKind::ClipStop {
                session,
                clip_id: clip.id(),
            },
        );
        self.pending_stop = Some(ScheduledStop {
            timer,
            session,
            clip_id: clip.id(),
        });

        info!(
            clip_id = clip.id(),
            session = session.get(),
            start_time = clip.start_time(),
            stop_after_ms = stop_after.as_millis() as u64,
            "clip playback started"
        );
        session
    }

    /// Starts a new session and cancels the pending stop, if any.
    ///
    /// Returns the clip whose stop was cancelled.
    pub fn supersede(&mut self, timers: &mut TimerQueue) -> Option<ClipId> {
        self.session += 1;
        let stop = self.pending_stop.take()?;
        timers.cancel(stop.timer);
        debug!(
            clip_id = stop.clip_id,
            session = stop.session.get(),
            "pending clip stop cancelled"
        );
        Some(stop.clip_id)
    }

    /// Handles a fired stop timer.
    ///
    /// Pauses the provider only when `session` is still the active one and
    /// returns the stopped clip; stale stops are ignored.
    pub fn on_stop_timer<P>(&mut self, provider: &mut P, session: PlaybackSession) -> Option<ClipId>
    where
        P: PlaybackProvider,
    {
        match self.pending_stop {
            Some(stop) if stop.session == session && session == self.current_session() => {
                self.pending_stop = None;
                provider.pause_video();
                info!(
                    clip_id = stop.clip_id,
                    session = session.get(),
                    "clip playback stopped"
                );
                Some(stop.clip_id)
            }
            _ => {
                debug!(
                    session = session.get(),
                    current = self.session,
                    "stale clip stop ignored"
                );
                None
            }
        }
    }

    pub fn current_session(&self) -> PlaybackSession {
        PlaybackSession(self.session)
    }

    /// Returns the clip currently waiting for its bounded stop.
    pub fn pending_clip(&self) -> Option<ClipId> {
        self.pending_stop.map(|stop| stop.clip_id)
    }
}
