//! `10 01 XX YY`: apparent wind angle, `XXYY / 2` degrees from the bow.

use seatalk_frame::{command, Frame};
use serde::{Deserialize, Serialize};

use crate::bits::round_degrees;
use crate::descriptor::Descriptor;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::kinds::{any_frame, wrong_kind};
use crate::message::{Message, MessageKind};
use crate::units::Angle;

pub const DESCRIPTOR: Descriptor = Descriptor {
    kind: MessageKind::WindAngle,
    name: "wind_angle",
    command_byte: command::WIND_ANGLE,
    expected_length: 4,
    decode,
    encode,
    matches: any_frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ApparentWindAngle {
    /// Relative to the bow in `(-180, 180]`, negative to port.
    pub angle: Angle,
}

fn decode(frame: &Frame, _diag: &dyn Diagnostics) -> Result<Message> {
    let half_degrees = u16::from_be_bytes([frame[2], frame[3]]);
    Ok(Message::WindAngle(ApparentWindAngle {
        angle: Angle::from_degrees(f64::from(half_degrees) / 2.0).signed(),
    }))
}

fn encode(message: &Message) -> Result<Frame> {
    let Message::WindAngle(value) = message else {
        return Err(wrong_kind(MessageKind::WindAngle, message));
    };
    let half_degrees = round_degrees(value.angle.degrees() * 2.0, 720) as u16;
    Ok(Frame::build(command::WIND_ANGLE, 0, &half_degrees.to_be_bytes())?)
}
