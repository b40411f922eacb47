use std::time::Duration;

use player_sim::{Clock, SimulatedVideo};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{EngineError, Result};
use crate::link::LinkBuilder;
use crate::player::{ClipPlayer, PlaybackSession};
use crate::provider::{PlaybackProvider, PlayerState, ProviderNotification, SimulatedProvider};
use crate::scheduler::{FiredTimer, TimerKind, TimerQueue};
use crate::seek::SeekController;
use crate::timeline::{ClipId, ClipTimeline};
use crate::tracker::{PlaybackPosition, TimeTracker};

/// Commands accepted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Provider finished loading and reports its initial duration.
    ProviderReady {
        duration: f64,
    },
    /// Provider transport state changed.
    ProviderStateChanged {
        state: PlayerState,
    },
    TogglePlayback,
    Play,
    Pause,
    /// Seeks to an absolute position in seconds.
    Seek {
        seconds: f64,
    },
    /// Seeks to a fraction of the duration, `0.0..=1.0`.
    Scrub {
        fraction: f64,
    },
    /// Marks the current position as the pending clip start.
    MarkStart,
    /// Commits the pending start and the current position into a clip.
    MarkEnd,
    DeleteClip {
        clip_id: ClipId,
    },
    /// Replays one clip and pauses when its duration elapses.
    PlayClip {
        clip_id: ClipId,
    },
    /// Stops polling and cancels any pending clip stop.
    Teardown,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::ProviderReady { .. } => "provider_ready",
            Self::ProviderStateChanged { .. } => "provider_state_changed",
            Self::TogglePlayback => "toggle_playback",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Seek { .. } => "seek",
            Self::Scrub { .. } => "scrub",
            Self::MarkStart => "mark_start",
            Self::MarkEnd => "mark_end",
            Self::DeleteClip { .. } => "delete_clip",
            Self::PlayClip { .. } => "play_clip",
            Self::Teardown => "teardown",
        }
    }
}

impl From<ProviderNotification> for Command {
    fn from(value: ProviderNotification) -> Self {
        match value {
            ProviderNotification::Ready { duration } => Self::ProviderReady { duration },
            ProviderNotification::StateChanged(state) => Self::ProviderStateChanged { state },
        }
    }
}

/// Events emitted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    ProviderReady {
        duration: f64,
    },
    PlaybackStateChanged {
        state: PlayerState,
    },
    PositionChanged {
        current_time: f64,
        duration: f64,
    },
    TimelineChanged(TimelineSnapshot),
    ClipPlaybackStarted {
        clip_id: ClipId,
        session: PlaybackSession,
    },
    ClipPlaybackStopped {
        clip_id: ClipId,
        session: PlaybackSession,
    },
    /// A pending clip stop was dropped because a newer action took over.
    ClipPlaybackCancelled {
        clip_id: ClipId,
    },
    Error(EngineErrorEvent),
}

impl Event {
    fn position(position: PlaybackPosition) -> Self {
        Self::PositionChanged {
            current_time: position.current_time,
            duration: position.duration,
        }
    }
}

/// User-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineErrorKind {
    NoStartMarker,
    InvalidRange,
    ClipNotFound,
    Other,
}

impl From<&EngineError> for EngineErrorKind {
    fn from(value: &EngineError) -> Self {
        match value {
            EngineError::NoStartMarker => Self::NoStartMarker,
            EngineError::InvalidRange { .. } => Self::InvalidRange,
            EngineError::ClipNotFound { .. } => Self::ClipNotFound,
            _ => Self::Other,
        }
    }
}

/// User-facing error payload emitted as an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineErrorEvent {
    pub kind: EngineErrorKind,
    pub message: String,
}

impl EngineErrorEvent {
    pub fn from_error(error: &EngineError) -> Self {
        Self {
            kind: EngineErrorKind::from(error),
            message: error.to_string(),
        }
    }
}

/// Immutable timeline snapshot consumed by front ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimelineSnapshot {
    pub clips: Vec<ClipSummary>,
    pub pending_start: Option<f64>,
}

/// Snapshot representation of one clip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipSummary {
    pub id: ClipId,
    pub label: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub watch_link: String,
    pub embed_link: String,
}

/// Clip timeline engine driving one playback provider.
///
/// The engine never reads a clock itself: callers pass the monotonic session
/// time `now` to every command and call [`Engine::advance`] from their event
/// loop so due timers fire and provider notifications are applied.
#[derive(Debug)]
pub struct Engine<P> {
    config: SessionConfig,
    links: LinkBuilder,
    provider: P,
    ready: bool,
    state: PlayerState,
    timeline: ClipTimeline,
    tracker: TimeTracker,
    player: ClipPlayer,
    seek: SeekController,
    timers: TimerQueue,
}

impl<C> Engine<SimulatedProvider<C>>
where
    C: Clock,
{
    /// Creates an engine around a simulated player for `config.video_id`.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use engine::{Engine, Event, SessionConfig};
    /// use player_sim::ManualClock;
    ///
    /// let mut engine =
    ///     Engine::with_simulator(SessionConfig::default(), 90.0, Duration::ZERO, ManualClock::new())
    ///         .expect("valid session");
    ///
    /// let events = engine.advance(Duration::ZERO);
    /// assert!(matches!(events[0], Event::ProviderReady { .. }));
    /// assert!(engine.is_ready());
    /// ```
    pub fn with_simulator(
        config: SessionConfig,
        duration_seconds: f64,
        ready_after: Duration,
        clock: C,
    ) -> Result<Self> {
        let video = SimulatedVideo {
            video_id: config.video_id.clone(),
            duration_seconds,
            ready_after,
        };
        Self::new(SimulatedProvider::new(video, clock)?, config)
    }
}

impl<P> Engine<P>
where
    P: PlaybackProvider,
{
    /// Creates an engine around an already constructed provider.
    ///
    /// The provider is treated as unavailable until it announces readiness.
    pub fn new(provider: P, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let links = LinkBuilder::new(&config.link_host, &config.video_id)?;
        Ok(Self {
            tracker: TimeTracker::new(config.poll_interval()),
            seek: SeekController::new(config.allow_seek_ahead),
            config,
            links,
            provider,
            ready: false,
            state: PlayerState::Unstarted,
            timeline: ClipTimeline::new(),
            player: ClipPlayer::new(),
            timers: TimerQueue::new(),
        })
    }

    /// Applies one command and returns emitted events.
    ///
    /// Commands that need the provider are silently ignored until it is
    /// ready. Marker errors are returned to the caller unchanged.
    pub fn handle_command(&mut self, now: Duration, command: Command) -> Result<Vec<Event>> {
        let name = command.name();
        let result = match command {
            Command::ProviderReady { duration } => Ok(self.provider_ready(duration)),
            Command::ProviderStateChanged { state } => Ok(self.state_changed(state, now)),
            Command::TogglePlayback => self.toggle_playback(),
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::Seek { seconds } => self.seek(seconds),
            Command::Scrub { fraction } => self.scrub(fraction),
            Command::MarkStart => Ok(self.mark_start()),
            Command::MarkEnd => self.mark_end(),
            Command::DeleteClip { clip_id } => Ok(self.delete_clip(clip_id)),
            Command::PlayClip { clip_id } => self.play_clip(clip_id, now),
            Command::Teardown => Ok(self.teardown()),
        };

        match result {
            Err(EngineError::ProviderUnavailable) => {
                debug!(command = name, "provider not ready; command ignored");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Applies provider notifications and fires every timer due at `now`.
    pub fn advance(&mut self, now: Duration) -> Vec<Event> {
        let mut events = self.pump_notifications(now);
        while let Some(fired) = self.timers.pop_next_due(now) {
            events.extend(self.fire_timer(fired));
            events.extend(self.pump_notifications(now));
        }
        events
    }

    /// Returns the earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Stops polling and cancels any pending clip stop.
    pub fn teardown(&mut self) -> Vec<Event> {
        let stopped_polling = self.tracker.stop(&mut self.timers);
        let events = self.supersede_clip();
        info!(stopped_polling, "session torn down");
        events
    }

    /// Replaces the provider after the host re-created the video widget.
    ///
    /// Readiness, the tracked position and the pending start marker are
    /// reset; committed clips are kept. Returns the previous provider.
    pub fn reinitialize(&mut self, provider: P) -> P {
        self.teardown();
        self.ready = false;
        self.state = PlayerState::Unstarted;
        self.tracker.reset_position();
        self.timeline.clear_pending_start();
        info!(clip_count = self.timeline.len(), "provider re-initialized");
        std::mem::replace(&mut self.provider, provider)
    }

    /// Builds the current timeline snapshot.
    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            clips: self
                .timeline
                .clips()
                .iter()
                .enumerate()
                .map(|(index, clip)| ClipSummary {
                    id: clip.id(),
                    label: format!("Clip {}", index + 1),
                    start_time: clip.start_time(),
                    end_time: clip.end_time(),
                    duration: clip.duration(),
                    watch_link: self.links.watch(clip.start_time()),
                    embed_link: self.links.embed(clip),
                })
                .collect(),
            pending_start: self.timeline.pending_start(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn timeline(&self) -> &ClipTimeline {
        &self.timeline
    }

    pub fn position(&self) -> PlaybackPosition {
        self.tracker.position()
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn is_polling(&self) -> bool {
        self.tracker.is_running()
    }

    /// Returns the clip waiting for its bounded stop, if any.
    pub fn playing_clip(&self) -> Option<ClipId> {
        self.player.pending_clip()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    fn provider_ready(&mut self, duration: f64) -> Vec<Event> {
        let was_ready = std::mem::replace(&mut self.ready, true);
        self.tracker.position_mut().set_duration(duration);
        let position = self.tracker.position();
        info!(duration = position.duration, was_ready, "provider ready");

        vec![
            Event::ProviderReady {
                duration: position.duration,
            },
            Event::position(position),
        ]
    }

    fn state_changed(&mut self, state: PlayerState, now: Duration) -> Vec<Event> {
        let previous = std::mem::replace(&mut self.state, state);
        debug!(?previous, ?state, "provider state changed");

        let mut events = vec![Event::PlaybackStateChanged { state }];
        if state.is_playing() {
            self.tracker.start(&mut self.timers, now);
        } else if self.tracker.stop(&mut self.timers) && self.ready {
            let position = self.tracker.tick(&self.provider);
            events.push(Event::position(position));
        }
        events
    }

    fn toggle_playback(&mut self) -> Result<Vec<Event>> {
        if self.state.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    fn play(&mut self) -> Result<Vec<Event>> {
        self.ensure_ready()?;
        let events = self.supersede_clip();
        self.provider.play_video();
        Ok(events)
    }

    fn pause(&mut self) -> Result<Vec<Event>> {
        self.ensure_ready()?;
        let events = self.supersede_clip();
        self.provider.pause_video();
        Ok(events)
    }

    fn seek(&mut self, seconds: f64) -> Result<Vec<Event>> {
        self.ensure_ready()?;
        let mut events = self.supersede_clip();
        self.seek
            .seek(&mut self.provider, self.tracker.position_mut(), seconds);
        events.push(Event::position(self.tracker.position()));
        Ok(events)
    }

    fn scrub(&mut self, fraction: f64) -> Result<Vec<Event>> {
        self.ensure_ready()?;
        let mut events = self.supersede_clip();
        self.seek
            .scrub(&mut self.provider, self.tracker.position_mut(), fraction);
        events.push(Event::position(self.tracker.position()));
        Ok(events)
    }

    fn mark_start(&mut self) -> Vec<Event> {
        self.timeline
            .mark_start(self.tracker.position().current_time);
        vec![Event::TimelineChanged(self.snapshot())]
    }

    fn mark_end(&mut self) -> Result<Vec<Event>> {
        self.timeline
            .mark_end(self.tracker.position().current_time)?;
        Ok(vec![Event::TimelineChanged(self.snapshot())])
    }

    fn delete_clip(&mut self, clip_id: ClipId) -> Vec<Event> {
        match self.timeline.delete_clip(clip_id) {
            Some(_) => vec![Event::TimelineChanged(self.snapshot())],
            None => Vec::new(),
        }
    }

    fn play_clip(&mut self, clip_id: ClipId, now: Duration) -> Result<Vec<Event>> {
        let clip = *self
            .timeline
            .find(clip_id)
            .ok_or(EngineError::ClipNotFound { clip_id })?;
        self.ensure_ready()?;

        let mut events: Vec<Event> = self
            .player
            .pending_clip()
            .map(|cancelled| Event::ClipPlaybackCancelled { clip_id: cancelled })
            .into_iter()
            .collect();
        let session = self
            .player
            .play(&mut self.provider, &mut self.timers, &clip, now);
        self.tracker.position_mut().set_current(clip.start_time());

        events.push(Event::ClipPlaybackStarted { clip_id, session });
        events.push(Event::position(self.tracker.position()));
        Ok(events)
    }

    fn fire_timer(&mut self, fired: FiredTimer) -> Vec<Event> {
        match fired.kind {
            TimerKind::PositionPoll => {
                if !self.tracker.owns(fired.id) {
                    warn!(timer = ?fired.id, "orphaned poll timer cancelled");
                    self.timers.cancel(fired.id);
                    return Vec::new();
                }
                if !self.ready {
                    return Vec::new();
                }
                vec![Event::position(self.tracker.tick(&self.provider))]
            }
            TimerKind::ClipStop { session, .. } => self
                .player
                .on_stop_timer(&mut self.provider, session)
                .map(|clip_id| Event::ClipPlaybackStopped { clip_id, session })
                .into_iter()
                .collect(),
        }
    }

    fn pump_notifications(&mut self, now: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        for notification in self.provider.poll_notifications() {
            events.extend(match notification {
                ProviderNotification::Ready { duration } => self.provider_ready(duration),
                ProviderNotification::StateChanged(state) => self.state_changed(state, now),
            });
        }
        events
    }

    fn supersede_clip(&mut self) -> Vec<Event> {
        self.player
            .supersede(&mut self.timers)
            .map(|clip_id| Event::ClipPlaybackCancelled { clip_id })
            .into_iter()
            .collect()
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.ready {
            Ok(())
        } else {
            Err(EngineError::ProviderUnavailable)
        }
    }
}
