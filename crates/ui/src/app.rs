use std::sync::mpsc::TrySendError;

use engine::{
    ClipId, Command, Event, PlaybackPosition, PlayerState, TimelineSnapshot, format_clock,
};
use iced::widget::{button, canvas, column, container, row, text};
use iced::{Alignment, Element, Length, Subscription, Task};

use crate::bridge::{BridgeEvent, EngineCommandSender, engine_subscription};
use crate::widgets::{clip_list, timeline, transport};

/// UI messages handled by the iced app update loop.
#[derive(Debug, Clone)]
pub enum Message {
    TogglePlayback,
    Scrubbed(f64),
    MarkStart,
    MarkEnd,
    PlayClip(ClipId),
    DeleteClip(ClipId),
    CopyLink(String),
    DismissAlert,
    Bridge(BridgeEvent),
}

/// Root UI state.
pub struct AppState {
    engine_tx: Option<EngineCommandSender>,
    timeline: TimelineSnapshot,
    position: PlaybackPosition,
    player_state: PlayerState,
    ready: bool,
    playing_clip: Option<ClipId>,
    alert: Option<String>,
    status: String,
    clip_cache: canvas::Cache,
}

impl AppState {
    /// Boots the app; the engine bridge starts with the subscription.
    pub fn boot() -> (Self, Task<Message>) {
        (
            Self::with_sender(None, String::from("starting engine bridge")),
            Task::none(),
        )
    }

    fn with_sender(engine_tx: Option<EngineCommandSender>, status: String) -> Self {
        Self {
            engine_tx,
            timeline: TimelineSnapshot::default(),
            position: PlaybackPosition::default(),
            player_state: PlayerState::Unstarted,
            ready: false,
            playing_clip: None,
            alert: None,
            status,
            clip_cache: canvas::Cache::new(),
        }
    }

    pub fn title(&self) -> String {
        match self.timeline.clips.len() {
            0 => String::from("Clipmark"),
            1 => String::from("Clipmark - 1 clip"),
            count => format!("Clipmark - {count} clips"),
        }
    }

    /// Handles one UI message.
    ///
    /// While an alert is shown only the dismissal and bridge traffic are
    /// processed.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        if self.alert.is_some()
            && !matches!(message, Message::DismissAlert | Message::Bridge(_))
        {
            return Task::none();
        }

        match message {
            Message::TogglePlayback => {
                self.send_command(Command::TogglePlayback);
            }
            Message::Scrubbed(seconds) => {
                let target = seconds.clamp(0.0, self.position.duration.max(0.0));
                self.position.current_time = target;
                self.send_command(Command::Seek { seconds: target });
            }
            Message::MarkStart => {
                if self.send_command(Command::MarkStart) {
                    self.status = format!(
                        "start marked at {}",
                        format_clock(self.position.current_time)
                    );
                }
            }
            Message::MarkEnd => {
                self.send_command(Command::MarkEnd);
            }
            Message::PlayClip(clip_id) => {
                self.send_command(Command::PlayClip { clip_id });
            }
            Message::DeleteClip(clip_id) => {
                self.send_command(Command::DeleteClip { clip_id });
            }
            Message::CopyLink(link) => {
                self.status = format!("copied {link}");
                return iced::clipboard::write(link);
            }
            Message::DismissAlert => {
                self.alert = None;
            }
            Message::Bridge(BridgeEvent::Ready(sender)) => {
                self.engine_tx = Some(sender);
                self.status = String::from("loading video");
            }
            Message::Bridge(BridgeEvent::Event(event)) => {
                self.apply_engine_event(event);
            }
            Message::Bridge(BridgeEvent::Failed(reason)) => {
                self.status = format!("engine failed to start: {reason}");
                self.engine_tx = None;
            }
            Message::Bridge(BridgeEvent::Disconnected) => {
                self.status = String::from("engine event channel closed");
                self.engine_tx = None;
                self.ready = false;
            }
        }

        Task::none()
    }

    fn send_command(&mut self, command: Command) -> bool {
        let Some(sender) = &self.engine_tx else {
            self.status = String::from("engine is not ready");
            return false;
        };
        match sender.try_send(command) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.status = String::from("engine command queue is full");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                self.status = String::from("engine command channel closed");
                self.engine_tx = None;
                false
            }
        }
    }

    fn apply_engine_event(&mut self, event: Event) {
        match event {
            Event::ProviderReady { duration } => {
                self.ready = true;
                self.position.duration = duration;
                self.clip_cache.clear();
                self.status = String::from("video ready");
            }
            Event::PlaybackStateChanged { state } => {
                self.player_state = state;
            }
            Event::PositionChanged {
                current_time,
                duration,
            } => {
                if duration != self.position.duration {
                    self.clip_cache.clear();
                }
                self.position = PlaybackPosition {
                    current_time,
                    duration,
                };
            }
            Event::TimelineChanged(snapshot) => {
                self.timeline = snapshot;
                self.clip_cache.clear();
            }
            Event::ClipPlaybackStarted { clip_id, .. } => {
                self.playing_clip = Some(clip_id);
                self.clip_cache.clear();
                if let Some(clip) = self.timeline.clips.iter().find(|clip| clip.id == clip_id) {
                    self.status = format!("playing {}", clip.label);
                }
            }
            Event::ClipPlaybackStopped { clip_id, .. }
            | Event::ClipPlaybackCancelled { clip_id } => {
                if self.playing_clip == Some(clip_id) {
                    self.playing_clip = None;
                    self.clip_cache.clear();
                }
            }
            Event::Error(error) => {
                self.alert = Some(error.message);
            }
        }
    }

    /// Renders the UI tree.
    pub fn view(&self) -> Element<'_, Message> {
        if let Some(alert) = &self.alert {
            return container(
                column![text(alert.as_str()), button("OK").on_press(Message::DismissAlert)]
                    .spacing(12)
                    .align_x(Alignment::Center),
            )
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into();
        }

        let pending = match self.timeline.pending_start {
            Some(start) => format!("Start: {}", format_clock(start)),
            None => String::from("No start time set"),
        };
        let markers = row![
            button("Set Start Time").on_press(Message::MarkStart),
            button("Set End Time & Create Clip").on_press_maybe(
                self.timeline
                    .pending_start
                    .is_some()
                    .then_some(Message::MarkEnd)
            ),
            text(pending),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        column![
            transport::view(
                self.ready,
                self.player_state.is_playing(),
                self.position,
                Message::TogglePlayback,
                Message::Scrubbed,
            ),
            timeline::view(
                &self.timeline,
                self.position,
                self.playing_clip,
                &self.clip_cache,
                Message::Scrubbed,
            ),
            markers,
            text(format!("Clips: {}", self.timeline.clips.len())),
            clip_list::view(
                &self.timeline.clips,
                self.playing_clip,
                Message::PlayClip,
                Message::DeleteClip,
                Message::CopyLink,
            ),
            text(format!("Status: {}", self.status)),
        ]
        .spacing(12)
        .padding(16)
        .into()
    }

    /// Subscribes to bridge events emitted by the engine worker thread.
    pub fn subscription(&self) -> Subscription<Message> {
        engine_subscription().map(Message::Bridge)
    }

    #[cfg(test)]
    fn from_sender_for_test(engine_tx: EngineCommandSender) -> Self {
        Self::with_sender(Some(engine_tx), String::from("idle"))
    }
}
