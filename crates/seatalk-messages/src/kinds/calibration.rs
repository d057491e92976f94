//! `88 03 WW XX YY ZZ`: autopilot calibration parameter (`WW`) with its
//! current, maximum and minimum values. Receive only.

use seatalk_frame::{command, Frame};
use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;
use crate::diagnostics::Diagnostics;
use crate::error::{MessageError, Result};
use crate::kinds::any_frame;
use crate::message::{Message, MessageKind};

pub const DESCRIPTOR: Descriptor = Descriptor {
    kind: MessageKind::Calibration,
    name: "calibration",
    command_byte: command::CALIBRATION,
    expected_length: 6,
    decode,
    encode,
    matches: any_frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationItem {
    RudderGain,
    CounterRudder,
    RudderLimit,
    TurnRateLimit,
    Speed,
    OffCourseLimit,
    AutoTrim,
    PowerSteer,
    DriveType,
    RudderDamping,
    Variation,
    AutoAdapt,
    AutoAdaptLatitude,
    AutoRelease,
    RudderAlignment,
    WindTrim,
    Response,
    BoatType,
    CalLock,
    AutoTackAngle,
    Unknown(u8),
}

impl CalibrationItem {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x01 => CalibrationItem::RudderGain,
            0x02 => CalibrationItem::CounterRudder,
            0x03 => CalibrationItem::RudderLimit,
            0x04 => CalibrationItem::TurnRateLimit,
            0x05 => CalibrationItem::Speed,
            0x06 => CalibrationItem::OffCourseLimit,
            0x07 => CalibrationItem::AutoTrim,
            0x09 => CalibrationItem::PowerSteer,
            0x0A => CalibrationItem::DriveType,
            0x0B => CalibrationItem::RudderDamping,
            0x0C => CalibrationItem::Variation,
            0x0D => CalibrationItem::AutoAdapt,
            0x0E => CalibrationItem::AutoAdaptLatitude,
            0x0F => CalibrationItem::AutoRelease,
            0x10 => CalibrationItem::RudderAlignment,
            0x11 => CalibrationItem::WindTrim,
            0x12 => CalibrationItem::Response,
            0x13 => CalibrationItem::BoatType,
            0x15 => CalibrationItem::CalLock,
            0x1D => CalibrationItem::AutoTackAngle,
            other => CalibrationItem::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            CalibrationItem::RudderGain => 0x01,
            CalibrationItem::CounterRudder => 0x02,
            CalibrationItem::RudderLimit => 0x03,
            CalibrationItem::TurnRateLimit => 0x04,
            CalibrationItem::Speed => 0x05,
            CalibrationItem::OffCourseLimit => 0x06,
            CalibrationItem::AutoTrim => 0x07,
            CalibrationItem::PowerSteer => 0x09,
            CalibrationItem::DriveType => 0x0A,
            CalibrationItem::RudderDamping => 0x0B,
            CalibrationItem::Variation => 0x0C,
            CalibrationItem::AutoAdapt => 0x0D,
            CalibrationItem::AutoAdaptLatitude => 0x0E,
            CalibrationItem::AutoRelease => 0x0F,
            CalibrationItem::RudderAlignment => 0x10,
            CalibrationItem::WindTrim => 0x11,
            CalibrationItem::Response => 0x12,
            CalibrationItem::BoatType => 0x13,
            CalibrationItem::CalLock => 0x15,
            CalibrationItem::AutoTackAngle => 0x1D,
            CalibrationItem::Unknown(code) => code,
        }
    }
}

impl Default for CalibrationItem {
    fn default() -> Self {
        CalibrationItem::Unknown(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalibrationParameter {
    pub parameter: CalibrationItem,
    pub current: i8,
    pub max: i8,
    pub min: i8,
}

fn decode(frame: &Frame, diag: &dyn Diagnostics) -> Result<Message> {
    let parameter = CalibrationItem::from_code(frame[2]);
    if let CalibrationItem::Unknown(code) = parameter {
        diag.unrecognized_bits(MessageKind::Calibration, "parameter", u32::from(code));
    }
    Ok(Message::Calibration(CalibrationParameter {
        parameter,
        current: frame[3] as i8,
        max: frame[4] as i8,
        min: frame[5] as i8,
    }))
}

fn encode(_message: &Message) -> Result<Frame> {
    Err(MessageError::UnsupportedEncode(MessageKind::Calibration))
}
