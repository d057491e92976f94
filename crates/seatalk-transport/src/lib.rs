//! Byte source/sink abstraction for a Seatalk1 bus.
//!
//! The protocol layers above only need a blocking byte stream. This crate
//! provides one over:
//! - a device node (a serial adapter already configured for 4800 baud, 9 bit)
//! - a Unix domain socket bridge (for simulators and capture replay)
//!
//! Baud rate, parity and the command-bit handling of the physical bus are the
//! responsibility of whatever sits behind the device node.

pub mod device;
pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use device::open_device;
pub use error::{Result, TransportError};
pub use traits::BusStream;

#[cfg(unix)]
pub use uds::BusBridge;
