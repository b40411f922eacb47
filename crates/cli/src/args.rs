use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use engine::SessionConfig;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "clipmark",
    version,
    about = "Replay a clip marking script against a simulated video"
)]
pub struct Cli {
    /// JSON script of timed commands
    pub script: PathBuf,

    /// JSON session config; flags below override its fields
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Video id used for deep links
    #[arg(long = "video-id")]
    pub video_id: Option<String>,

    /// Host used for deep links
    #[arg(long)]
    pub host: Option<String>,

    /// Position poll interval (milliseconds)
    #[arg(long = "poll-interval-ms", value_parser = parse_positive_u64)]
    pub poll_interval_ms: Option<u64>,

    /// Length of the simulated video (seconds)
    #[arg(long, default_value = "212", value_parser = parse_positive_seconds)]
    pub duration: f64,

    /// Simulated load delay before the player is ready (milliseconds)
    #[arg(long = "ready-after-ms", default_value = "0")]
    pub ready_after_ms: u64,

    /// Also print position updates from the poll timer
    #[arg(long)]
    pub positions: bool,

    /// Log at debug level unless CLIPMARK_LOG or RUST_LOG is set
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Resolves the session config from the optional file and flag overrides.
    pub fn session_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)
                .with_context(|| format!("Failed to load config: {:?}", path))?,
            None => SessionConfig::default(),
        };
        if let Some(video_id) = &self.video_id {
            config.video_id = video_id.clone();
        }
        if let Some(host) = &self.host {
            config.link_host = host.clone();
        }
        if let Some(interval) = self.poll_interval_ms {
            config.poll_interval_ms = interval;
        }
        config.validate().context("Invalid session config")?;
        Ok(config)
    }

    pub fn ready_after(&self) -> Duration {
        Duration::from_millis(self.ready_after_ms)
    }
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed: u64 = value
        .parse()
        .map_err(|err| format!("invalid number {value:?}: {err}"))?;
    if parsed == 0 {
        return Err(String::from("value must be greater than zero"));
    }
    Ok(parsed)
}

fn parse_positive_seconds(value: &str) -> Result<f64, String> {
    let parsed: f64 = value
        .parse()
        .map_err(|err| format!("invalid seconds {value:?}: {err}"))?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err(String::from("seconds must be a positive number"));
    }
    Ok(parsed)
}
