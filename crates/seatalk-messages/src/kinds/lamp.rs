//! `30 00 0X`: display backlight level.

use seatalk_frame::{command, Frame};
use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;
use crate::diagnostics::Diagnostics;
use crate::error::{MessageError, Result};
use crate::kinds::wrong_kind;
use crate::message::{Message, MessageKind};

pub const DESCRIPTOR: Descriptor = Descriptor {
    kind: MessageKind::LampIntensity,
    name: "lamp_intensity",
    command_byte: command::LAMP_INTENSITY,
    expected_length: 3,
    decode,
    encode,
    matches,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LampLevel {
    /// Off.
    #[default]
    Level0,
    Level1,
    Level2,
    Level3,
}

impl LampLevel {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x0 => Some(LampLevel::Level0),
            0x4 => Some(LampLevel::Level1),
            0x8 => Some(LampLevel::Level2),
            0xC => Some(LampLevel::Level3),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            LampLevel::Level0 => 0x0,
            LampLevel::Level1 => 0x4,
            LampLevel::Level2 => 0x8,
            LampLevel::Level3 => 0xC,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LampIntensity {
    pub level: LampLevel,
}

fn matches(frame: &Frame) -> bool {
    LampLevel::from_byte(frame[2]).is_some()
}

fn decode(frame: &Frame, _diag: &dyn Diagnostics) -> Result<Message> {
    let level = LampLevel::from_byte(frame[2]).ok_or(MessageError::InvalidBits {
        field: "lamp level",
        value: frame[2],
    })?;
    Ok(Message::LampIntensity(LampIntensity { level }))
}

fn encode(message: &Message) -> Result<Frame> {
    let Message::LampIntensity(value) = message else {
        return Err(wrong_kind(MessageKind::LampIntensity, message));
    };
    Ok(Frame::build(command::LAMP_INTENSITY, 0, &[value.level.to_byte()])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::SilentDiagnostics;

    #[test]
    fn all_levels_round_trip() {
        for (byte, level) in [
            (0x0, LampLevel::Level0),
            (0x4, LampLevel::Level1),
            (0x8, LampLevel::Level2),
            (0xC, LampLevel::Level3),
        ] {
            let f = Frame::try_from(&[0x30, 0x00, byte][..]).unwrap();
            assert!(matches(&f));
            let message = decode(&f, &SilentDiagnostics).unwrap();
            assert_eq!(message, Message::LampIntensity(LampIntensity { level }));
            assert_eq!(encode(&message).unwrap(), f);
        }
    }

    #[test]
    fn in_between_values_do_not_match() {
        for byte in [0x1, 0x3, 0x5, 0xD, 0x10] {
            let f = Frame::try_from(&[0x30, 0x00, byte][..]).unwrap();
            assert!(!matches(&f), "0x{byte:X}");
        }
    }
}
