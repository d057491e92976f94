//! Seatalk1 message layer.
//!
//! A [`Registry`] holds one [`Descriptor`] per message kind and turns
//! assembled frames into typed [`Message`] values and back.
//!
//! ```
//! use seatalk_frame::Frame;
//! use seatalk_messages::{Message, Registry, SilentDiagnostics};
//!
//! let registry = Registry::builtin();
//! let frame = Frame::try_from(&[0x86, 0x01, 0x02, 0xFD][..]).unwrap();
//! let message = registry.decode(&frame, &SilentDiagnostics).unwrap();
//! assert!(matches!(message, Message::Keystroke(_)));
//! assert_eq!(registry.encode(&message).unwrap(), frame);
//! ```

pub mod bits;
pub mod config;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod flags;
pub mod kinds;
pub mod message;
pub mod registry;
pub mod units;

pub use config::RegistryConfig;
pub use descriptor::{DecodeFn, Descriptor, EncodeFn, MatchFn};
pub use diagnostics::{Diagnostics, SilentDiagnostics, TracingDiagnostics};
pub use error::{MessageError, Result};
pub use flags::{AutopilotAlarms, AutopilotButtons, CourseComputerWarnings};
pub use kinds::{
    ApparentWindAngle, ApparentWindSpeed, AutopilotCourse, AutopilotStatus, AutopilotWindStatus,
    CalibrationItem, CalibrationParameter, CourseComputerStatus, DeadbandMode, DeadbandSetting,
    HeadingAndRudder, Keystroke, LampIntensity, LampLevel, NavigationToWaypoint,
    SpeedThroughWater, TargetWaypointName, TurnDirection,
};
pub use message::{Message, MessageKind};
pub use registry::Registry;
pub use units::{Angle, Length, LengthUnit, Speed, SpeedUnit};
