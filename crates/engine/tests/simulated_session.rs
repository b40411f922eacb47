use std::time::Duration;

use engine::{
    Command, Engine, Event, PlayerState, SessionConfig, SimulatedProvider, format_clock,
};
use player_sim::{ManualClock, PlayerStatus};

type SimEngine = Engine<SimulatedProvider<ManualClock>>;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn session(duration_seconds: f64, ready_after: Duration) -> (SimEngine, ManualClock) {
    let clock = ManualClock::new();
    let engine = Engine::with_simulator(
        SessionConfig::default(),
        duration_seconds,
        ready_after,
        clock.clone(),
    )
    .expect("valid session");
    (engine, clock)
}

/// Fires every deadline up to `target` with the clock pinned to each one.
fn step_to(engine: &mut SimEngine, clock: &ManualClock, target: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        match engine.next_deadline() {
            Some(deadline) if deadline <= target => {
                clock.set(deadline);
                events.extend(engine.advance(deadline));
            }
            _ => break,
        }
    }
    clock.set(target);
    events.extend(engine.advance(target));
    events
}

fn run(engine: &mut SimEngine, clock: &ManualClock, at: Duration, command: Command) -> Vec<Event> {
    let mut events = step_to(engine, clock, at);
    events.extend(engine.handle_command(at, command).expect("command accepted"));
    events.extend(engine.advance(at));
    events
}

fn last_position(events: &[Event]) -> Option<f64> {
    events.iter().rev().find_map(|event| match event {
        Event::PositionChanged { current_time, .. } => Some(*current_time),
        _ => None,
    })
}

fn assert_near(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= 0.05,
        "expected {expected} +/- 0.05, got {actual}"
    );
}

#[test]
fn mark_and_replay_clip_pauses_at_clip_end() {
    let (mut engine, clock) = session(120.0, ms(500));

    let early = run(&mut engine, &clock, ms(100), Command::Play);
    assert!(early.is_empty());
    assert!(!engine.is_ready());

    let events = step_to(&mut engine, &clock, ms(500));
    assert!(events.contains(&Event::ProviderReady { duration: 120.0 }));

    let events = run(&mut engine, &clock, ms(500), Command::Play);
    assert!(events.contains(&Event::PlaybackStateChanged {
        state: PlayerState::Playing
    }));
    assert!(engine.is_polling());

    let events = step_to(&mut engine, &clock, ms(10_500));
    assert_near(last_position(&events).expect("polled"), 10.0);
    run(&mut engine, &clock, ms(10_500), Command::MarkStart);
    assert_eq!(engine.snapshot().pending_start, Some(10.0));

    step_to(&mut engine, &clock, ms(15_500));
    run(&mut engine, &clock, ms(15_500), Command::MarkEnd);
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.clips.len(), 1);
    let clip = snapshot.clips[0].clone();
    assert_near(clip.duration, 5.0);
    assert_eq!(format_clock(clip.start_time), "0:10");

    let events = run(
        &mut engine,
        &clock,
        ms(15_500),
        Command::PlayClip { clip_id: clip.id },
    );
    assert!(
        events
            .iter()
            .any(|event| matches!(event, Event::ClipPlaybackStarted { clip_id, .. } if *clip_id == clip.id))
    );

    let events = step_to(&mut engine, &clock, ms(20_400));
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, Event::ClipPlaybackStopped { .. }))
    );

    let events = step_to(&mut engine, &clock, ms(20_500));
    assert!(
        events
            .iter()
            .any(|event| matches!(event, Event::ClipPlaybackStopped { clip_id, .. } if *clip_id == clip.id))
    );
    assert_eq!(engine.state(), PlayerState::Paused);
    assert_eq!(engine.provider().player().status(), PlayerStatus::Paused);
    assert_eq!(engine.provider().player().video().video_id, "BYizgB2FcAQ");
    assert_near(engine.position().current_time, 15.0);
    assert!(!engine.is_polling());
    assert_eq!(engine.next_deadline(), None);
}

#[test]
fn replaying_another_clip_discards_the_earlier_stop() {
    let (mut engine, clock) = session(120.0, Duration::ZERO);
    step_to(&mut engine, &clock, Duration::ZERO);

    for (start, end) in [(0.0, 2.0), (30.0, 40.0)] {
        run(&mut engine, &clock, Duration::ZERO, Command::Seek { seconds: start });
        run(&mut engine, &clock, Duration::ZERO, Command::MarkStart);
        run(&mut engine, &clock, Duration::ZERO, Command::Seek { seconds: end });
        run(&mut engine, &clock, Duration::ZERO, Command::MarkEnd);
    }
    let ids: Vec<_> = engine.snapshot().clips.iter().map(|clip| clip.id).collect();
    let (short, long) = (ids[0], ids[1]);

    run(&mut engine, &clock, ms(1_000), Command::PlayClip { clip_id: short });
    let events = run(&mut engine, &clock, ms(2_000), Command::PlayClip { clip_id: long });
    assert!(events.contains(&Event::ClipPlaybackCancelled { clip_id: short }));

    let events = step_to(&mut engine, &clock, ms(3_000));
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, Event::ClipPlaybackStopped { .. }))
    );
    assert_eq!(engine.state(), PlayerState::Playing);

    let events = step_to(&mut engine, &clock, ms(12_000));
    assert!(
        events
            .iter()
            .any(|event| matches!(event, Event::ClipPlaybackStopped { clip_id, .. } if *clip_id == long))
    );
    assert_near(engine.position().current_time, 40.0);
}

#[test]
fn manual_pause_stops_polling() {
    let (mut engine, clock) = session(60.0, Duration::ZERO);
    run(&mut engine, &clock, Duration::ZERO, Command::TogglePlayback);
    step_to(&mut engine, &clock, ms(2_000));
    assert!(engine.is_polling());

    let events = run(&mut engine, &clock, ms(2_000), Command::TogglePlayback);
    assert!(events.contains(&Event::PlaybackStateChanged {
        state: PlayerState::Paused
    }));
    assert!(!engine.is_polling());

    let events = step_to(&mut engine, &clock, ms(5_000));
    assert!(last_position(&events).is_none());
    assert_near(engine.position().current_time, 2.0);
}

#[test]
fn playing_to_the_end_reports_ended() {
    let (mut engine, clock) = session(3.0, Duration::ZERO);
    run(&mut engine, &clock, Duration::ZERO, Command::Play);

    let events = step_to(&mut engine, &clock, ms(5_000));

    assert!(events.contains(&Event::PlaybackStateChanged {
        state: PlayerState::Ended
    }));
    assert!(!engine.is_polling());
    assert_eq!(engine.position().current_time, 3.0);
}

#[test]
fn events_serialize_as_tagged_json() {
    let (mut engine, clock) = session(60.0, Duration::ZERO);
    step_to(&mut engine, &clock, Duration::ZERO);
    run(&mut engine, &clock, Duration::ZERO, Command::Seek { seconds: 4.2 });
    run(&mut engine, &clock, Duration::ZERO, Command::MarkStart);
    let events = run(&mut engine, &clock, Duration::ZERO, Command::Seek { seconds: 9.0 });
    assert_eq!(last_position(&events), Some(9.0));

    let events = engine
        .handle_command(Duration::ZERO, Command::MarkEnd)
        .expect("mark end");
    let json = serde_json::to_value(&events[0]).expect("serializable");

    assert_eq!(json["event"], "timeline_changed");
    assert_eq!(json["clips"][0]["label"], "Clip 1");
    assert_eq!(
        json["clips"][0]["embed_link"],
        "https://www.youtube.com/embed/BYizgB2FcAQ?start=4&end=9"
    );
    assert!(json["pending_start"].is_null());
}
