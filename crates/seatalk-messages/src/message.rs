use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kinds::{
    ApparentWindAngle, ApparentWindSpeed, AutopilotCourse, AutopilotWindStatus,
    CalibrationParameter, CourseComputerStatus, DeadbandSetting, HeadingAndRudder, Keystroke,
    LampIntensity, NavigationToWaypoint, SpeedThroughWater, TargetWaypointName,
};

/// A decoded Seatalk1 message.
///
/// Serializes with an internal `kind` tag, e.g.
/// `{"kind":"deadband","mode":"minimal"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    HeadingRudder(HeadingAndRudder),
    AutopilotCourse(AutopilotCourse),
    AutopilotCourseAlt(AutopilotCourse),
    WindAngle(ApparentWindAngle),
    WindSpeed(ApparentWindSpeed),
    AutopilotWindStatus(AutopilotWindStatus),
    SpeedThroughWater(SpeedThroughWater),
    LampIntensity(LampIntensity),
    WaypointName(TargetWaypointName),
    CourseComputer(CourseComputerStatus),
    NavigateToWaypoint(NavigationToWaypoint),
    Keystroke(Keystroke),
    Deadband(DeadbandSetting),
    Calibration(CalibrationParameter),
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::HeadingRudder(_) => MessageKind::HeadingRudder,
            Message::AutopilotCourse(_) => MessageKind::AutopilotCourse,
            Message::AutopilotCourseAlt(_) => MessageKind::AutopilotCourseAlt,
            Message::WindAngle(_) => MessageKind::WindAngle,
            Message::WindSpeed(_) => MessageKind::WindSpeed,
            Message::AutopilotWindStatus(_) => MessageKind::AutopilotWindStatus,
            Message::SpeedThroughWater(_) => MessageKind::SpeedThroughWater,
            Message::LampIntensity(_) => MessageKind::LampIntensity,
            Message::WaypointName(_) => MessageKind::WaypointName,
            Message::CourseComputer(_) => MessageKind::CourseComputer,
            Message::NavigateToWaypoint(_) => MessageKind::NavigateToWaypoint,
            Message::Keystroke(_) => MessageKind::Keystroke,
            Message::Deadband(_) => MessageKind::Deadband,
            Message::Calibration(_) => MessageKind::Calibration,
        }
    }
}

/// Tag identifying a message kind without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    HeadingRudder,
    AutopilotCourse,
    AutopilotCourseAlt,
    WindAngle,
    WindSpeed,
    AutopilotWindStatus,
    SpeedThroughWater,
    LampIntensity,
    WaypointName,
    CourseComputer,
    NavigateToWaypoint,
    Keystroke,
    Deadband,
    Calibration,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::HeadingRudder => "heading_rudder",
            MessageKind::AutopilotCourse => "autopilot_course",
            MessageKind::AutopilotCourseAlt => "autopilot_course_alt",
            MessageKind::WindAngle => "wind_angle",
            MessageKind::WindSpeed => "wind_speed",
            MessageKind::AutopilotWindStatus => "autopilot_wind_status",
            MessageKind::SpeedThroughWater => "speed_through_water",
            MessageKind::LampIntensity => "lamp_intensity",
            MessageKind::WaypointName => "waypoint_name",
            MessageKind::CourseComputer => "course_computer",
            MessageKind::NavigateToWaypoint => "navigate_to_waypoint",
            MessageKind::Keystroke => "keystroke",
            MessageKind::Deadband => "deadband",
            MessageKind::Calibration => "calibration",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! impl_from_payload {
    ($($payload:ident => $variant:ident),+ $(,)?) => {
        $(
            impl From<$payload> for Message {
                fn from(value: $payload) -> Self {
                    Message::$variant(value)
                }
            }
        )+
    };
}

impl_from_payload! {
    HeadingAndRudder => HeadingRudder,
    AutopilotCourse => AutopilotCourse,
    ApparentWindAngle => WindAngle,
    ApparentWindSpeed => WindSpeed,
    AutopilotWindStatus => AutopilotWindStatus,
    SpeedThroughWater => SpeedThroughWater,
    LampIntensity => LampIntensity,
    TargetWaypointName => WaypointName,
    CourseComputerStatus => CourseComputer,
    NavigationToWaypoint => NavigateToWaypoint,
    Keystroke => Keystroke,
    DeadbandSetting => Deadband,
    CalibrationParameter => Calibration,
}
