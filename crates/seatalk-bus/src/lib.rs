//! Seatalk1 bus sessions.
//!
//! A [`Bus`] ties a frame reader and writer to a message [`Registry`]:
//! receive typed messages, skip noise, send typed messages back.
//! [`AutopilotState`] tracks what the autopilot last reported and
//! [`AutopilotController`] drives the autopilot with remote key presses.
//!
//! [`Registry`]: seatalk_messages::Registry

pub mod autopilot;
pub mod bus;
pub mod controller;
pub mod error;
#[cfg(unix)]
pub mod listener;

pub use autopilot::{
    angles_are_close, buttons_for_status, deadband_keystroke, next_turn_keystroke, shorter_turn,
    AutopilotState, REMOTE_SOURCE,
};
pub use bus::{Bus, BusConfig, BusStats, Received, ResyncPolicy};
pub use controller::{AutopilotController, DEFAULT_RETRY_INTERVAL, MAX_COMMAND_TIMEOUT};
pub use error::{BusError, Result};
#[cfg(unix)]
pub use listener::BusListener;
