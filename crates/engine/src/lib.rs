//! UI-agnostic clip timeline engine for Clipmark.

pub mod api;
pub mod config;
pub mod error;
pub mod link;
pub mod player;
pub mod provider;
pub mod scheduler;
pub mod seek;
pub mod time;
pub mod timeline;
pub mod tracker;

#[cfg(test)]
mod test_support;

pub use api::{
    ClipSummary, Command, Engine, EngineErrorEvent, EngineErrorKind, Event, TimelineSnapshot,
};
pub use config::SessionConfig;
pub use error::{EngineError, Result};
pub use player::PlaybackSession;
pub use provider::{PlaybackProvider, PlayerState, ProviderNotification, SimulatedProvider};
pub use time::{format_clock, seconds_to_duration};
pub use timeline::{Clip, ClipId};
pub use tracker::PlaybackPosition;
