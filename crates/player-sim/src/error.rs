use std::fmt::{Display, Formatter};

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, SimulatorError>;

/// Error type for the simulated video player.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulatorError {
    InvalidDuration(f64),
    InvalidTimestampSeconds(f64),
    EmptyVideoId,
    NotReady,
}

impl Display for SimulatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDuration(value) => {
                write!(f, "invalid video duration seconds: {value}")
            }
            Self::InvalidTimestampSeconds(value) => {
                write!(f, "invalid timestamp seconds: {value}")
            }
            Self::EmptyVideoId => write!(f, "video id is empty"),
            Self::NotReady => write!(f, "player is not ready"),
        }
    }
}

impl std::error::Error for SimulatorError {}
