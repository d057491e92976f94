//! Seatalk1 autopilot bus protocol.
//!
//! Seatalk1 is a single-wire marine instrument bus. This crate bundles the
//! layers needed to talk to it:
//!
//! - [`transport`]: byte streams over a device node or a Unix socket bridge
//! - [`frame`]: frame assembly from the undelimited byte stream
//! - [`messages`]: the descriptor registry and typed message codecs
//! - [`bus`]: bus sessions with resynchronization, plus autopilot state
//!
//! ```
//! use seatalk::frame::Frame;
//! use seatalk::messages::{DeadbandMode, DeadbandSetting, Message, Registry};
//!
//! let registry = Registry::builtin();
//! let message: Message = DeadbandSetting { mode: DeadbandMode::Minimal }.into();
//! let frame = registry.encode(&message).unwrap();
//! assert_eq!(frame, Frame::try_from(&[0x87, 0x00, 0x02][..]).unwrap());
//! ```

/// Re-export transport types.
pub mod transport {
    pub use seatalk_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use seatalk_frame::*;
}

/// Re-export message types.
pub mod messages {
    pub use seatalk_messages::*;
}

/// Re-export bus session types.
pub mod bus {
    pub use seatalk_bus::*;
}
