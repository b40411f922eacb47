use std::collections::VecDeque;
use std::time::Duration;

use crate::clock::Clock;
use crate::error::{Result, SimulatorError};

/// Transport status reported by the simulated player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

/// Notification queued by the player for its host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notification {
    Ready { duration: f64 },
    StateChanged(PlayerStatus),
}

/// Description of the video loaded into the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedVideo {
    pub video_id: String,
    pub duration_seconds: f64,
    /// Delay between construction and the `Ready` notification.
    pub ready_after: Duration,
}

/// Deterministic stand-in for an embedded video widget.
///
/// Position advances with the supplied clock while playing. Transport calls
/// issued before the player is ready are rejected with
/// [`SimulatorError::NotReady`] and leave the player untouched.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use player_sim::{ManualClock, Notification, SimulatedPlayer, SimulatedVideo};
///
/// let clock = ManualClock::new();
/// let mut player = SimulatedPlayer::new(
///     SimulatedVideo {
///         video_id: "demo".to_owned(),
///         duration_seconds: 60.0,
///         ready_after: Duration::ZERO,
///     },
///     clock.clone(),
/// )
/// .expect("valid video");
///
/// assert_eq!(
///     player.drain_notifications().first(),
///     Some(&Notification::Ready { duration: 60.0 })
/// );
/// player.play_video().expect("ready");
/// clock.advance(Duration::from_secs(2));
/// assert_eq!(player.current_time(), 2.0);
/// ```
#[derive(Debug)]
pub struct SimulatedPlayer<C> {
    video: SimulatedVideo,
    clock: C,
    status: PlayerStatus,
    ready: bool,
    ready_at: Duration,
    anchor_position: f64,
    anchor_at: Duration,
    pending: VecDeque<Notification>,
}

impl<C> SimulatedPlayer<C>
where
    C: Clock,
{
    /// Creates a player for `video`, validating its metadata.
    pub fn new(video: SimulatedVideo, clock: C) -> Result<Self> {
        if video.video_id.trim().is_empty() {
            return Err(SimulatorError::EmptyVideoId);
        }
        if !video.duration_seconds.is_finite() || video.duration_seconds <= 0.0 {
            return Err(SimulatorError::InvalidDuration(video.duration_seconds));
        }

        let now = clock.now();
        let mut player = Self {
            ready_at: now.saturating_add(video.ready_after),
            video,
            clock,
            status: PlayerStatus::Unstarted,
            ready: false,
            anchor_position: 0.0,
            anchor_at: now,
            pending: VecDeque::new(),
        };
        player.refresh();
        Ok(player)
    }

    /// Returns the loaded video description.
    pub fn video(&self) -> &SimulatedVideo {
        &self.video
    }

    /// Returns the current transport status.
    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    /// Returns true once the load delay has elapsed.
    pub fn is_ready(&self) -> bool {
        self.ready || self.clock.now() >= self.ready_at
    }

    /// Returns the playback position in seconds, `0` before ready.
    pub fn current_time(&self) -> f64 {
        if !self.is_ready() {
            return 0.0;
        }
        match self.status {
            PlayerStatus::Playing => {
                let elapsed = self
                    .clock
                    .now()
                    .saturating_sub(self.anchor_at)
                    .as_secs_f64();
                (self.anchor_position + elapsed).min(self.video.duration_seconds)
            }
            _ => self.anchor_position,
        }
    }

    /// Returns the video duration in seconds, `0` before ready.
    pub fn duration(&self) -> f64 {
        if self.is_ready() {
            self.video.duration_seconds
        } else {
            0.0
        }
    }

    /// Moves the playhead to `seconds`, clamped to the video bounds.
    ///
    /// Seeking while playing with `allow_seek_ahead` simulates a short
    /// rebuffer: `Buffering` then `Playing` are queued.
    pub fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool) -> Result<()> {
        if !seconds.is_finite() {
            return Err(SimulatorError::InvalidTimestampSeconds(seconds));
        }
        self.ensure_ready()?;

        self.anchor_position = seconds.clamp(0.0, self.video.duration_seconds);
        self.anchor_at = self.clock.now();
        match self.status {
            PlayerStatus::Ended => self.set_status(PlayerStatus::Paused),
            PlayerStatus::Playing if allow_seek_ahead => {
                self.pending
                    .push_back(Notification::StateChanged(PlayerStatus::Buffering));
                self.pending
                    .push_back(Notification::StateChanged(PlayerStatus::Playing));
            }
            _ => {}
        }
        Ok(())
    }

    /// Starts or resumes playback. Playing from the end restarts at zero.
    pub fn play_video(&mut self) -> Result<()> {
        self.ensure_ready()?;

        if self.status == PlayerStatus::Playing {
            return Ok(());
        }
        if self.status == PlayerStatus::Ended {
            self.anchor_position = 0.0;
        }
        self.anchor_at = self.clock.now();
        self.set_status(PlayerStatus::Playing);
        Ok(())
    }

    /// Pauses playback and freezes the position.
    pub fn pause_video(&mut self) -> Result<()> {
        self.ensure_ready()?;

        match self.status {
            PlayerStatus::Playing => {
                self.anchor_position = self.current_time();
                self.anchor_at = self.clock.now();
                self.set_status(PlayerStatus::Paused);
            }
            PlayerStatus::Buffering | PlayerStatus::Cued => {
                self.set_status(PlayerStatus::Paused);
            }
            PlayerStatus::Unstarted | PlayerStatus::Ended | PlayerStatus::Paused => {}
        }
        Ok(())
    }

    /// Returns and clears queued notifications.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.refresh();
        self.pending.drain(..).collect()
    }

    fn ensure_ready(&mut self) -> Result<()> {
        self.refresh();
        if self.ready {
            Ok(())
        } else {
            Err(SimulatorError::NotReady)
        }
    }

    fn refresh(&mut self) {
        if !self.ready && self.clock.now() >= self.ready_at {
            self.ready = true;
            self.anchor_at = self.clock.now();
            self.pending.push_back(Notification::Ready {
                duration: self.video.duration_seconds,
            });
        }

        if self.status == PlayerStatus::Playing
            && self.current_time() >= self.video.duration_seconds
        {
            self.anchor_position = self.video.duration_seconds;
            self.anchor_at = self.clock.now();
            self.set_status(PlayerStatus::Ended);
        }
    }

    fn set_status(&mut self, status: PlayerStatus) {
        if self.status == status {
            return;
        }
        self.status = status;
        self.pending.push_back(Notification::StateChanged(status));
    }
}
