use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::tracker::DEFAULT_POLL_INTERVAL;

/// Video watched by default when no id is configured.
pub const DEFAULT_VIDEO_ID: &str = "BYizgB2FcAQ";
/// Host used for deep links.
pub const DEFAULT_LINK_HOST: &str = "www.youtube.com";

/// Per-session settings for the clip engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub video_id: String,
    pub link_host: String,
    pub poll_interval_ms: u64,
    /// Whether scrub seeks may request data beyond the buffered range.
    pub allow_seek_ahead: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            video_id: DEFAULT_VIDEO_ID.to_owned(),
            link_host: DEFAULT_LINK_HOST.to_owned(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            allow_seek_ahead: true,
        }
    }
}

impl SessionConfig {
    /// Reads a JSON config file; missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&raw).map_err(|source| EngineError::ConfigSerialization {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects empty identifiers and a zero poll interval.
    pub fn validate(&self) -> Result<()> {
        if self.video_id.trim().is_empty() {
            return Err(EngineError::InvalidConfig {
                reason: String::from("video id is empty"),
            });
        }
        if self.link_host.trim().is_empty() {
            return Err(EngineError::InvalidConfig {
                reason: String::from("link host is empty"),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(EngineError::InvalidConfig {
                reason: String::from("poll interval must be positive"),
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
