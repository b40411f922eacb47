use player_sim::{
    Clock, Notification, PlayerStatus, SimulatedPlayer, SimulatedVideo, SimulatorError,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Transport state reported by the playback provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl PlayerState {
    /// Maps the numeric state codes used by embedded web players.
    ///
    /// # Example
    /// ```
    /// use engine::PlayerState;
    ///
    /// assert_eq!(PlayerState::from_code(1), Some(PlayerState::Playing));
    /// assert_eq!(PlayerState::from_code(-1), Some(PlayerState::Unstarted));
    /// assert_eq!(PlayerState::from_code(4), None);
    /// ```
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Unstarted),
            0 => Some(Self::Ended),
            1 => Some(Self::Playing),
            2 => Some(Self::Paused),
            3 => Some(Self::Buffering),
            5 => Some(Self::Cued),
            _ => None,
        }
    }

    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

/// Notification emitted by a playback provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProviderNotification {
    Ready { duration: f64 },
    StateChanged(PlayerState),
}

/// Capabilities the engine needs from an embedded video player.
///
/// Transport calls are fire-and-forget: the resulting state change arrives
/// later through [`PlaybackProvider::poll_notifications`].
pub trait PlaybackProvider {
    /// Returns the current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Returns the media duration in seconds, `0` when unknown.
    fn duration(&self) -> f64;

    /// Moves the playhead to `seconds`.
    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool);

    fn play_video(&mut self);

    fn pause_video(&mut self);

    /// Drains ready/state-change notifications queued since the last call.
    fn poll_notifications(&mut self) -> Vec<ProviderNotification> {
        Vec::new()
    }
}

/// Provider backed by the deterministic simulated player.
#[derive(Debug)]
pub struct SimulatedProvider<C> {
    player: SimulatedPlayer<C>,
}

impl<C> SimulatedProvider<C>
where
    C: Clock,
{
    /// Loads `video` into a simulated player driven by `clock`.
    pub fn new(video: SimulatedVideo, clock: C) -> Result<Self> {
        Ok(Self {
            player: SimulatedPlayer::new(video, clock)?,
        })
    }

    pub fn player(&self) -> &SimulatedPlayer<C> {
        &self.player
    }
}

impl<C> PlaybackProvider for SimulatedProvider<C>
where
    C: Clock,
{
    fn current_time(&self) -> f64 {
        self.player.current_time()
    }

    fn duration(&self) -> f64 {
        self.player.duration()
    }

    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool) {
        log_rejected("seek_to", self.player.seek_to(seconds, allow_seek_ahead));
    }

    fn play_video(&mut self) {
        log_rejected("play_video", self.player.play_video());
    }

    fn pause_video(&mut self) {
        log_rejected("pause_video", self.player.pause_video());
    }

    fn poll_notifications(&mut self) -> Vec<ProviderNotification> {
        self.player
            .drain_notifications()
            .into_iter()
            .map(ProviderNotification::from)
            .collect()
    }
}

fn log_rejected(call: &'static str, result: player_sim::Result<()>) {
    match result {
        Ok(()) => {}
        Err(SimulatorError::NotReady) => debug!(call, "simulated player not ready"),
        Err(error) => warn!(call, %error, "simulated player rejected call"),
    }
}

impl From<PlayerStatus> for PlayerState {
    fn from(value: PlayerStatus) -> Self {
        match value {
            PlayerStatus::Unstarted => Self::Unstarted,
            PlayerStatus::Ended => Self::Ended,
            PlayerStatus::Playing => Self::Playing,
            PlayerStatus::Paused => Self::Paused,
            PlayerStatus::Buffering => Self::Buffering,
            PlayerStatus::Cued => Self::Cued,
        }
    }
}

impl From<Notification> for ProviderNotification {
    fn from(value: Notification) -> Self {
        match value {
            Notification::Ready { duration } => Self::Ready { duration },
            Notification::StateChanged(status) => Self::StateChanged(status.into()),
        }
    }
}
