//! `84 U6 VW XY 0Z 0M RR SS TT`: compass heading, autopilot course and
//! rudder position. `95` carries the same layout from some autopilot models.

use seatalk_frame::{command, Frame};
use serde::{Deserialize, Serialize};

use crate::bits::{decode_course, decode_heading, encode_course, encode_heading};
use crate::descriptor::Descriptor;
use crate::diagnostics::Diagnostics;
use crate::error::{MessageError, Result};
use crate::flags::AutopilotAlarms;
use crate::kinds::wrong_kind;
use crate::message::{Message, MessageKind};
use crate::units::Angle;

pub const DESCRIPTOR: Descriptor = Descriptor {
    kind: MessageKind::AutopilotCourse,
    name: "autopilot_course",
    command_byte: command::AUTOPILOT_COURSE,
    expected_length: 9,
    decode,
    encode,
    matches,
};

pub const DESCRIPTOR_ALT: Descriptor = Descriptor {
    kind: MessageKind::AutopilotCourseAlt,
    name: "autopilot_course_alt",
    command_byte: command::AUTOPILOT_COURSE_ALT,
    expected_length: 9,
    decode: decode_alt,
    encode: encode_alt,
    matches,
};

/// Which way the boat is turning. Unreliable without a rudder sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    #[default]
    Port,
    Starboard,
}

impl TurnDirection {
    pub(crate) fn from_u_nibble(u: u8) -> Self {
        if u & 0x8 != 0 {
            TurnDirection::Starboard
        } else {
            TurnDirection::Port
        }
    }

    pub(crate) fn is_starboard(self) -> bool {
        self == TurnDirection::Starboard
    }
}

/// Operating mode reported by the autopilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutopilotStatus {
    #[default]
    Standby,
    Auto,
    /// Wind mode selected while in standby.
    InactiveWind,
    Wind,
    /// Track mode selected while in standby.
    InactiveTrack,
    Track,
    Calibration,
}

impl AutopilotStatus {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(AutopilotStatus::Standby),
            0x02 => Some(AutopilotStatus::Auto),
            0x04 => Some(AutopilotStatus::InactiveWind),
            0x06 => Some(AutopilotStatus::Wind),
            0x08 => Some(AutopilotStatus::InactiveTrack),
            0x0A => Some(AutopilotStatus::Track),
            0x10 => Some(AutopilotStatus::Calibration),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            AutopilotStatus::Standby => 0x00,
            AutopilotStatus::Auto => 0x02,
            AutopilotStatus::InactiveWind => 0x04,
            AutopilotStatus::Wind => 0x06,
            AutopilotStatus::InactiveTrack => 0x08,
            AutopilotStatus::Track => 0x0A,
            AutopilotStatus::Calibration => 0x10,
        }
    }

    /// Steering a course (auto, wind or track).
    pub fn is_operating(self) -> bool {
        matches!(
            self,
            AutopilotStatus::Auto | AutopilotStatus::Wind | AutopilotStatus::Track
        )
    }

    /// Not steering, possibly with a mode preselected.
    pub fn is_standby(self) -> bool {
        matches!(
            self,
            AutopilotStatus::Standby | AutopilotStatus::InactiveWind | AutopilotStatus::InactiveTrack
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "CourseRepr")]
pub struct AutopilotCourse {
    heading: Angle,
    turn_direction: TurnDirection,
    course: Angle,
    status: AutopilotStatus,
    alarms: AutopilotAlarms,
    rudder: i8,
    display_flags: u8,
    autopilot_type: u8,
}

#[derive(Deserialize)]
struct CourseRepr {
    heading: Angle,
    #[serde(default)]
    turn_direction: TurnDirection,
    course: Angle,
    status: AutopilotStatus,
    #[serde(default)]
    alarms: AutopilotAlarms,
    #[serde(default)]
    rudder: i8,
    #[serde(default)]
    display_flags: u8,
    #[serde(default)]
    autopilot_type: u8,
}

impl TryFrom<CourseRepr> for AutopilotCourse {
    type Error = MessageError;

    fn try_from(repr: CourseRepr) -> Result<Self> {
        AutopilotCourse::new(repr.heading, repr.course, repr.status)
            .with_turn_direction(repr.turn_direction)
            .with_rudder(repr.rudder)
            .with_display_flags(repr.display_flags)
            .with_alarms(repr.alarms)?
            .with_autopilot_type(repr.autopilot_type)
    }
}

impl AutopilotCourse {
    /// A report with no alarms, rudder amidships and model code 0.
    pub fn new(heading: Angle, course: Angle, status: AutopilotStatus) -> Self {
        Self {
            heading,
            course,
            status,
            ..Self::default()
        }
    }

    pub fn with_turn_direction(mut self, turn_direction: TurnDirection) -> Self {
        self.turn_direction = turn_direction;
        self
    }

    pub fn with_heading(mut self, heading: Angle) -> Self {
        self.heading = heading;
        self
    }

    pub fn with_status(mut self, status: AutopilotStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_course(mut self, course: Angle) -> Self {
        self.course = course;
        self
    }

    pub fn with_rudder(mut self, rudder: i8) -> Self {
        self.rudder = rudder;
        self
    }

    pub fn with_display_flags(mut self, display_flags: u8) -> Self {
        self.display_flags = display_flags;
        self
    }

    /// Alarm bits must fit the low nibble. Unknown low bits are kept.
    pub fn with_alarms(mut self, alarms: AutopilotAlarms) -> Result<Self> {
        if alarms.bits() & 0xF0 != 0 {
            return Err(MessageError::out_of_range("alarms", alarms));
        }
        self.alarms = alarms;
        Ok(self)
    }

    /// Model code, `0..=15`.
    pub fn with_autopilot_type(mut self, autopilot_type: u8) -> Result<Self> {
        if autopilot_type > 0x0F {
            return Err(MessageError::out_of_range("autopilot type", autopilot_type));
        }
        self.autopilot_type = autopilot_type;
        Ok(self)
    }

    /// Heading of the autopilot's own compass, whole degrees.
    pub fn heading(&self) -> Angle {
        self.heading
    }

    pub fn turn_direction(&self) -> TurnDirection {
        self.turn_direction
    }

    /// Course the autopilot steers, half-degree resolution. Often stale in
    /// standby.
    pub fn course(&self) -> Angle {
        self.course
    }

    pub fn status(&self) -> AutopilotStatus {
        self.status
    }

    pub fn alarms(&self) -> AutopilotAlarms {
        self.alarms
    }

    /// Rudder position in degrees, positive to starboard.
    pub fn rudder(&self) -> i8 {
        self.rudder
    }

    /// Display control byte, passed through unchanged.
    pub fn display_flags(&self) -> u8 {
        self.display_flags
    }

    pub fn autopilot_type(&self) -> u8 {
        self.autopilot_type
    }
}

fn matches(frame: &Frame) -> bool {
    AutopilotStatus::from_byte(frame[4]).is_some() && frame[5] & 0xF0 == 0 && frame[8] & 0xF0 == 0
}

fn decode_fields(frame: &Frame, kind: MessageKind, diag: &dyn Diagnostics) -> Result<AutopilotCourse> {
    let u = frame.aux_nibble();
    let vw = frame[2];
    let status = AutopilotStatus::from_byte(frame[4]).ok_or(MessageError::InvalidBits {
        field: "autopilot status",
        value: frame[4],
    })?;
    let alarms = AutopilotAlarms::from_bits_retain(frame[5]);
    if alarms.unknown_bits() != 0 {
        diag.unrecognized_bits(kind, "alarms", u32::from(alarms.unknown_bits()));
    }

    AutopilotCourse::new(
        Angle::from_degrees(f64::from(decode_heading(u, vw)?)),
        Angle::from_degrees(decode_course(vw, frame[3])),
        status,
    )
    .with_turn_direction(TurnDirection::from_u_nibble(u))
    .with_rudder(frame[6] as i8)
    .with_display_flags(frame[7])
    .with_alarms(alarms)?
    .with_autopilot_type(frame[8])
}

fn encode_fields(command: u8, course: &AutopilotCourse) -> Result<Frame> {
    let (u, heading_bits) = encode_heading(
        course.heading.degrees(),
        course.turn_direction.is_starboard(),
    );
    let (course_bits, half_degrees) = encode_course(course.course.degrees());

    Ok(Frame::build(
        command,
        u,
        &[
            heading_bits | course_bits,
            half_degrees,
            course.status.to_byte(),
            course.alarms.bits(),
            course.rudder as u8,
            course.display_flags,
            course.autopilot_type,
        ],
    )?)
}

fn decode(frame: &Frame, diag: &dyn Diagnostics) -> Result<Message> {
    decode_fields(frame, MessageKind::AutopilotCourse, diag).map(Message::AutopilotCourse)
}

fn decode_alt(frame: &Frame, diag: &dyn Diagnostics) -> Result<Message> {
    decode_fields(frame, MessageKind::AutopilotCourseAlt, diag).map(Message::AutopilotCourseAlt)
}

fn encode(message: &Message) -> Result<Frame> {
    match message {
        Message::AutopilotCourse(course) => encode_fields(command::AUTOPILOT_COURSE, course),
        other => Err(wrong_kind(MessageKind::AutopilotCourse, other)),
    }
}

fn encode_alt(message: &Message) -> Result<Frame> {
    match message {
        Message::AutopilotCourseAlt(course) => encode_fields(command::AUTOPILOT_COURSE_ALT, course),
        other => Err(wrong_kind(MessageKind::AutopilotCourseAlt, other)),
    }
}
