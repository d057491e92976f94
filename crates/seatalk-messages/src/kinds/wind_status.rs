//! `11 00 0X`: autopilot wind mode status, shares its command byte with
//! apparent wind speed.

use seatalk_frame::{command, Frame};
use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::kinds::wrong_kind;
use crate::message::{Message, MessageKind};

pub const DESCRIPTOR: Descriptor = Descriptor {
    kind: MessageKind::AutopilotWindStatus,
    name: "autopilot_wind_status",
    command_byte: command::WIND_SPEED,
    expected_length: 3,
    decode,
    encode,
    matches,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutopilotWindStatus {
    pub wind_mode_active: bool,
}

fn matches(frame: &Frame) -> bool {
    frame[2] <= 1
}

fn decode(frame: &Frame, _diag: &dyn Diagnostics) -> Result<Message> {
    Ok(Message::AutopilotWindStatus(AutopilotWindStatus {
        wind_mode_active: frame[2] == 1,
    }))
}

fn encode(message: &Message) -> Result<Frame> {
    let Message::AutopilotWindStatus(value) = message else {
        return Err(wrong_kind(MessageKind::AutopilotWindStatus, message));
    };
    Ok(Frame::build(
        command::WIND_SPEED,
        0,
        &[u8::from(value.wind_mode_active)],
    )?)
}
