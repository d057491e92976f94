//! `87 00 0X`: autopilot response deadband.

use seatalk_frame::{command, Frame};
use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;
use crate::diagnostics::Diagnostics;
use crate::error::{MessageError, Result};
use crate::kinds::wrong_kind;
use crate::message::{Message, MessageKind};

pub const DESCRIPTOR: Descriptor = Descriptor {
    kind: MessageKind::Deadband,
    name: "deadband",
    command_byte: command::DEADBAND,
    expected_length: 3,
    decode,
    encode,
    matches,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadbandMode {
    #[default]
    Automatic,
    Minimal,
}

impl DeadbandMode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(DeadbandMode::Automatic),
            2 => Some(DeadbandMode::Minimal),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            DeadbandMode::Automatic => 1,
            DeadbandMode::Minimal => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeadbandSetting {
    pub mode: DeadbandMode,
}

fn matches(frame: &Frame) -> bool {
    DeadbandMode::from_byte(frame[2]).is_some()
}

fn decode(frame: &Frame, _diag: &dyn Diagnostics) -> Result<Message> {
    let mode = DeadbandMode::from_byte(frame[2]).ok_or(MessageError::InvalidBits {
        field: "deadband mode",
        value: frame[2],
    })?;
    Ok(Message::Deadband(DeadbandSetting { mode }))
}

fn encode(message: &Message) -> Result<Frame> {
    let Message::Deadband(value) = message else {
        return Err(wrong_kind(MessageKind::Deadband, message));
    };
    Ok(Frame::build(command::DEADBAND, 0, &[value.mode.to_byte()])?)
}
