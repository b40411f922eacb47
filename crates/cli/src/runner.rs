use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use engine::{Engine, EngineErrorEvent, Event, SessionConfig, SimulatedProvider};
use player_sim::ManualClock;
use serde::Serialize;
use tracing::{debug, warn};

use crate::script::Script;

/// Simulated video loaded for a replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Simulation {
    pub duration_seconds: f64,
    pub ready_after: Duration,
}

/// Totals reported after a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: usize,
    pub events: usize,
    pub errors: usize,
    pub clips: usize,
}

#[derive(Serialize)]
struct OutputLine<'a> {
    at_ms: u64,
    #[serde(flatten)]
    event: &'a Event,
}

/// Drives the engine on a virtual clock and writes events as JSON lines.
pub struct Runner<W> {
    engine: Engine<SimulatedProvider<ManualClock>>,
    clock: ManualClock,
    out: W,
    positions: bool,
    summary: RunSummary,
}

impl<W> Runner<W>
where
    W: Write,
{
    pub fn new(config: SessionConfig, simulation: Simulation, out: W) -> Result<Self> {
        let clock = ManualClock::new();
        let engine = Engine::with_simulator(
            config,
            simulation.duration_seconds,
            simulation.ready_after,
            clock.clone(),
        )
        .context("Failed to create engine")?;
        Ok(Self {
            engine,
            clock,
            out,
            positions: false,
            summary: RunSummary::default(),
        })
    }

    /// Includes poll-driven `position_changed` lines in the output.
    pub fn with_positions(mut self, positions: bool) -> Self {
        self.positions = positions;
        self
    }

    pub fn run(mut self, script: &Script) -> Result<RunSummary> {
        for step in &script.steps {
            let at = step.at();
            self.advance_to(at)?;
            debug!(at_ms = step.at_ms, command = ?step.command, "script step");

            match self.engine.handle_command(at, step.command) {
                Ok(events) => self.emit(at, &events)?,
                Err(error) => {
                    warn!(at_ms = step.at_ms, %error, "command rejected");
                    self.summary.errors += 1;
                    let event = Event::Error(EngineErrorEvent::from_error(&error));
                    self.emit(at, &[event])?;
                }
            }
            let events = self.engine.advance(at);
            self.emit(at, &events)?;
            self.summary.steps += 1;
        }

        let end = script.end();
        self.advance_to(end)?;
        let events = self.engine.teardown();
        self.emit(end, &events)?;
        self.out.flush().context("Failed to flush output")?;

        self.summary.clips = self.engine.timeline().len();
        Ok(self.summary)
    }

    /// Fires every timer up to `target`, pinning the clock to each deadline.
    fn advance_to(&mut self, target: Duration) -> Result<()> {
        while let Some(deadline) = self.engine.next_deadline() {
            if deadline > target {
                break;
            }
            self.clock.set(deadline);
            let events = self.engine.advance(deadline);
            self.emit(deadline, &events)?;
        }
        self.clock.set(target);
        let events = self.engine.advance(target);
        self.emit(target, &events)
    }

    fn emit(&mut self, at: Duration, events: &[Event]) -> Result<()> {
        for event in events {
            if !self.positions && matches!(event, Event::PositionChanged { .. }) {
                continue;
            }
            let line = OutputLine {
                at_ms: at.as_millis() as u64,
                event,
            };
            serde_json::to_writer(&mut self.out, &line).context("Failed to encode event")?;
            writeln!(self.out).context("Failed to write event")?;
            self.summary.events += 1;
        }
        Ok(())
    }
}
