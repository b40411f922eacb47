use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use engine::{Command, Engine, EngineErrorEvent, Event, PlaybackProvider, SessionConfig, config};
use iced::futures::{SinkExt, StreamExt, channel::mpsc as futures_mpsc, executor};
use iced::{Subscription, stream};
use player_sim::{Clock, SystemClock};
use tracing::{debug, info};

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const EVENT_CHANNEL_CAPACITY: usize = 64;
const SUBSCRIPTION_CHANNEL_CAPACITY: usize = 64;

/// Longest the worker sleeps before checking the provider again.
const IDLE_WAIT: Duration = Duration::from_millis(50);

const SIMULATED_DURATION_SECONDS: f64 = 212.0;
const SIMULATED_LOAD_DELAY: Duration = Duration::from_millis(800);

/// Sender used by the UI thread to dispatch commands to the engine thread.
pub type EngineCommandSender = mpsc::SyncSender<Command>;

/// Receiver used by the UI thread to read events emitted by the engine thread.
pub type EngineEventReceiver = mpsc::Receiver<Event>;

type SpawnResult = Result<(EngineCommandSender, EngineEventReceiver), String>;

/// Messages emitted by the engine bridge subscription.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    Ready(EngineCommandSender),
    Event(Event),
    Failed(String),
    Disconnected,
}

/// Builds a subscription that starts the engine bridge and forwards events.
pub fn engine_subscription() -> Subscription<BridgeEvent> {
    Subscription::run(bridge_worker_stream)
}

fn bridge_worker_stream() -> impl iced::futures::Stream<Item = BridgeEvent> {
    bridge_worker_stream_with(spawn_simulated_bridge)
}

fn bridge_worker_stream_with(
    spawn_bridge: fn() -> SpawnResult,
) -> impl iced::futures::Stream<Item = BridgeEvent> {
    stream::channel(
        SUBSCRIPTION_CHANNEL_CAPACITY,
        move |mut output| async move {
            let (engine_tx, engine_rx) = match spawn_bridge() {
                Ok(channels) => channels,
                Err(reason) => {
                    let _ = output.send(BridgeEvent::Failed(reason)).await;
                    return;
                }
            };
            let _ = output.send(BridgeEvent::Ready(engine_tx)).await;

            let (forward_tx, mut forward_rx) =
                futures_mpsc::channel::<BridgeEvent>(SUBSCRIPTION_CHANNEL_CAPACITY);

            thread::spawn(move || {
                let mut forward_tx = forward_tx;
                while let Ok(event) = engine_rx.recv() {
                    if executor::block_on(forward_tx.send(BridgeEvent::Event(event))).is_err() {
                        return;
                    }
                }
                let _ = executor::block_on(forward_tx.send(BridgeEvent::Disconnected));
            });

            while let Some(event) = forward_rx.next().await {
                if output.send(event).await.is_err() {
                    break;
                }
            }
        },
    )
}

/// Spawns the bridge around a simulated player on the wall clock.
///
/// `CLIPMARK_VIDEO_ID` overrides the default video id.
pub fn spawn_simulated_bridge() -> SpawnResult {
    let mut config = SessionConfig::default();
    if let Ok(video_id) = std::env::var("CLIPMARK_VIDEO_ID") {
        config.video_id = video_id;
    }
    if config.video_id.trim().is_empty() {
        config.video_id = config::DEFAULT_VIDEO_ID.to_owned();
    }

    let clock = SystemClock::new();
    let engine = Engine::with_simulator(
        config,
        SIMULATED_DURATION_SECONDS,
        SIMULATED_LOAD_DELAY,
        clock,
    )
    .map_err(|error| error.to_string())?;
    Ok(spawn_engine_bridge(engine, clock))
}

/// Spawns a worker thread that owns `engine` and fires its timers on `clock`.
///
/// The worker sleeps until the next engine deadline or the next command,
/// whichever comes first. Dropping the command sender tears the engine down.
pub fn spawn_engine_bridge<P, C>(
    mut engine: Engine<P>,
    clock: C,
) -> (EngineCommandSender, EngineEventReceiver)
where
    P: PlaybackProvider + Send + 'static,
    C: Clock + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::sync_channel::<Command>(COMMAND_CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::sync_channel::<Event>(EVENT_CHANNEL_CAPACITY);

    thread::spawn(move || {
        info!("engine worker started");
        loop {
            let now = clock.now();
            if !forward(&event_tx, engine.advance(now)) {
                break;
            }

            let wait = engine.next_deadline().map_or(IDLE_WAIT, |deadline| {
                deadline.saturating_sub(now).min(IDLE_WAIT)
            });
            match command_rx.recv_timeout(wait) {
                Ok(command) => {
                    let events = match engine.handle_command(clock.now(), command) {
                        Ok(events) => events,
                        Err(error) => {
                            debug!(%error, "command rejected");
                            vec![Event::Error(EngineErrorEvent::from_error(&error))]
                        }
                    };
                    if !forward(&event_tx, events) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        let _ = engine.teardown();
        info!("engine worker stopped");
    });

    (command_tx, event_rx)
}

fn forward(event_tx: &mpsc::SyncSender<Event>, events: Vec<Event>) -> bool {
    events.into_iter().all(|event| event_tx.send(event).is_ok())
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use engine::{Command, Engine, EngineErrorKind, Event, SessionConfig};
    use iced::futures::{StreamExt, executor, pin_mut};
    use player_sim::ManualClock;

    use super::{BridgeEvent, SpawnResult, bridge_worker_stream_with, spawn_engine_bridge};

    const WAIT: Duration = Duration::from_secs(1);

    fn spawn_manual(clock: &ManualClock) -> (super::EngineCommandSender, super::EngineEventReceiver) {
        let engine = Engine::with_simulator(
            SessionConfig::default(),
            60.0,
            Duration::ZERO,
            clock.clone(),
        )
        .expect("valid session");
        spawn_engine_bridge(engine, clock.clone())
    }

    fn recv_until<F>(event_rx: &super::EngineEventReceiver, mut predicate: F) -> Event
    where
        F: FnMut(&Event) -> bool,
    {
        loop {
            let event = event_rx.recv_timeout(WAIT).expect("engine event");
            if predicate(&event) {
                return event;
            }
        }
    }

    #[test]
    fn bridge_announces_provider_ready() {
        let clock = ManualClock::new();
        let (_command_tx, event_rx) = spawn_manual(&clock);

        let event = event_rx.recv_timeout(WAIT).expect("ready event");

        assert_eq!(event, Event::ProviderReady { duration: 60.0 });
    }

    #[test]
    fn bridge_emits_error_event_when_command_fails() {
        let clock = ManualClock::new();
        let (command_tx, event_rx) = spawn_manual(&clock);

        command_tx.send(Command::MarkEnd).expect("send mark end");

        let Event::Error(error) = recv_until(&event_rx, |event| matches!(event, Event::Error(_)))
        else {
            panic!("expected Event::Error");
        };
        assert_eq!(error.kind, EngineErrorKind::NoStartMarker);
        assert_eq!(error.message, "please set a start time first");
    }

    #[test]
    fn bridge_fires_poll_timer_on_the_worker_clock() {
        let clock = ManualClock::new();
        let (command_tx, event_rx) = spawn_manual(&clock);
        recv_until(&event_rx, |event| {
            matches!(event, Event::ProviderReady { .. })
        });

        command_tx.send(Command::Play).expect("send play");
        recv_until(&event_rx, |event| {
            matches!(event, Event::PlaybackStateChanged { .. })
        });
        clock.advance(Duration::from_millis(150));

        let event = recv_until(&event_rx, |event| {
            matches!(event, Event::PositionChanged { current_time, .. } if *current_time > 0.0)
        });
        let Event::PositionChanged { current_time, .. } = event else {
            unreachable!();
        };
        assert!((current_time - 0.15).abs() < 1e-9);
    }

    #[test]
    fn bridge_worker_stream_emits_ready_forwards_events_and_disconnected() {
        let (bridge_tx, bridge_rx) = mpsc::channel::<BridgeEvent>();

        thread::spawn(move || {
            let stream = bridge_worker_stream_with(spawn_test_bridge);
            executor::block_on(async move {
                pin_mut!(stream);
                while let Some(event) = stream.next().await {
                    let done = matches!(event, BridgeEvent::Disconnected);
                    if bridge_tx.send(event).is_err() || done {
                        break;
                    }
                }
            });
        });

        let ready = bridge_rx.recv_timeout(WAIT).expect("ready event");
        let BridgeEvent::Ready(command_tx) = ready else {
            panic!("expected BridgeEvent::Ready");
        };

        let first = bridge_rx.recv_timeout(WAIT).expect("forwarded event");
        assert!(matches!(
            first,
            BridgeEvent::Event(Event::ProviderReady { .. })
        ));

        command_tx.send(Command::MarkStart).expect("send mark start");
        let marked = loop {
            match bridge_rx.recv_timeout(WAIT).expect("forwarded event") {
                BridgeEvent::Event(Event::TimelineChanged(snapshot)) => break snapshot,
                BridgeEvent::Event(_) => continue,
                other => panic!("unexpected bridge event: {other:?}"),
            }
        };
        assert_eq!(marked.pending_start, Some(0.0));

        drop(command_tx);

        let disconnected = bridge_rx.recv_timeout(WAIT).expect("disconnected event");
        assert!(matches!(disconnected, BridgeEvent::Disconnected));
    }

    #[test]
    fn bridge_worker_stream_reports_spawn_failure() {
        let stream = bridge_worker_stream_with(failing_bridge);

        let events: Vec<BridgeEvent> = executor::block_on(stream.collect());

        assert!(matches!(
            events.as_slice(),
            [BridgeEvent::Failed(reason)] if reason == "no player"
        ));
    }

    fn spawn_test_bridge() -> SpawnResult {
        Ok(spawn_manual(&ManualClock::new()))
    }

    fn failing_bridge() -> SpawnResult {
        Err(String::from("no player"))
    }
}
