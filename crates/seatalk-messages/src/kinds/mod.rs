//! Per-kind codecs.
//!
//! Each module defines the decoded value, its `decode`/`encode`/`matches`
//! functions and a `DESCRIPTOR` tying them to a command byte and length.

pub mod autopilot_course;
pub mod calibration;
pub mod course_computer;
pub mod deadband;
pub mod heading_rudder;
pub mod keystroke;
pub mod lamp;
pub mod navigation;
pub mod speed_through_water;
pub mod waypoint_name;
pub mod wind_angle;
pub mod wind_speed;
pub mod wind_status;

pub use autopilot_course::{AutopilotCourse, AutopilotStatus, TurnDirection};
pub use calibration::{CalibrationItem, CalibrationParameter};
pub use course_computer::CourseComputerStatus;
pub use deadband::{DeadbandMode, DeadbandSetting};
pub use heading_rudder::HeadingAndRudder;
pub use keystroke::Keystroke;
pub use lamp::{LampIntensity, LampLevel};
pub use navigation::NavigationToWaypoint;
pub use speed_through_water::SpeedThroughWater;
pub use waypoint_name::TargetWaypointName;
pub use wind_angle::ApparentWindAngle;
pub use wind_speed::ApparentWindSpeed;
pub use wind_status::AutopilotWindStatus;

use seatalk_frame::Frame;

use crate::descriptor::Descriptor;
use crate::error::MessageError;
use crate::message::{Message, MessageKind};

/// Built-in descriptors in dispatch order.
pub const BUILTIN: [Descriptor; 14] = [
    heading_rudder::DESCRIPTOR,
    autopilot_course::DESCRIPTOR,
    autopilot_course::DESCRIPTOR_ALT,
    keystroke::DESCRIPTOR,
    deadband::DESCRIPTOR,
    lamp::DESCRIPTOR,
    calibration::DESCRIPTOR,
    wind_angle::DESCRIPTOR,
    wind_speed::DESCRIPTOR,
    navigation::DESCRIPTOR,
    course_computer::DESCRIPTOR,
    waypoint_name::DESCRIPTOR,
    wind_status::DESCRIPTOR,
    speed_through_water::DESCRIPTOR,
];

/// Match predicate for kinds whose command byte and length are enough.
pub(crate) fn any_frame(_frame: &Frame) -> bool {
    true
}

pub(crate) fn wrong_kind(expected: MessageKind, message: &Message) -> MessageError {
    MessageError::KindMismatch {
        expected,
        actual: message.kind(),
    }
}
