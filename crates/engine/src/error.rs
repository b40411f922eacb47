use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Result type used by the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by engine commands and clip timeline operations.
#[derive(Debug)]
pub enum EngineError {
    NoStartMarker,
    InvalidRange {
        start: f64,
        end: f64,
    },
    ProviderUnavailable,
    ClipNotFound {
        clip_id: u64,
    },
    InvalidConfig {
        reason: String,
    },
    InvalidLinkHost {
        host: String,
        source: url::ParseError,
    },
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },
    ConfigSerialization {
        path: PathBuf,
        source: serde_json::Error,
    },
    Simulator(player_sim::SimulatorError),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoStartMarker => write!(f, "please set a start time first"),
            Self::InvalidRange { start, end } => write!(
                f,
                "end time must be after start time (start {start:.2}s, end {end:.2}s)"
            ),
            Self::ProviderUnavailable => write!(f, "playback provider is not ready"),
            Self::ClipNotFound { clip_id } => write!(f, "clip not found: {clip_id}"),
            Self::InvalidConfig { reason } => write!(f, "invalid session config: {reason}"),
            Self::InvalidLinkHost { host, source } => {
                write!(f, "invalid link host {host:?} ({source})")
            }
            Self::ConfigIo { path, source } => {
                write!(f, "read session config: {} ({source})", path.display())
            }
            Self::ConfigSerialization { path, source } => write!(
                f,
                "session config deserialization failed at {} ({source})",
                path.display()
            ),
            Self::Simulator(err) => write!(f, "simulated player error: {err}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidLinkHost { source, .. } => Some(source),
            Self::ConfigIo { source, .. } => Some(source),
            Self::ConfigSerialization { source, .. } => Some(source),
            Self::Simulator(err) => Some(err),
            _ => None,
        }
    }
}

impl From<player_sim::SimulatorError> for EngineError {
    fn from(value: player_sim::SimulatorError) -> Self {
        Self::Simulator(value)
    }
}
