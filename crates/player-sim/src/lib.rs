mod clock;
mod error;
mod player;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, SimulatorError};
pub use player::{Notification, PlayerStatus, SimulatedPlayer, SimulatedVideo};
