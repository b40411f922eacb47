mod args;
mod logger;
mod runner;
mod script;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use args::Cli;
use runner::{Runner, Simulation};
use script::Script;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_logging(cli.verbose);

    let config = cli.session_config()?;
    let script = Script::load(&cli.script)?;
    let simulation = Simulation {
        duration_seconds: cli.duration,
        ready_after: cli.ready_after(),
    };

    let stdout = std::io::stdout().lock();
    let summary = Runner::new(config, simulation, stdout)?
        .with_positions(cli.positions)
        .run(&script)?;

    info!(
        steps = summary.steps,
        events = summary.events,
        errors = summary.errors,
        clips = summary.clips,
        "replay finished"
    );
    Ok(())
}
