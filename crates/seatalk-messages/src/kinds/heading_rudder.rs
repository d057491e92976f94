//! `9C U1 VW RR`: compass heading and rudder position.

use seatalk_frame::{command, Frame};
use serde::{Deserialize, Serialize};

use crate::bits::{decode_heading, encode_heading};
use crate::descriptor::Descriptor;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::kinds::{any_frame, wrong_kind, TurnDirection};
use crate::message::{Message, MessageKind};
use crate::units::Angle;

pub const DESCRIPTOR: Descriptor = Descriptor {
    kind: MessageKind::HeadingRudder,
    name: "heading_rudder",
    command_byte: command::HEADING_RUDDER,
    expected_length: 4,
    decode,
    encode,
    matches: any_frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadingAndRudder {
    pub heading: Angle,
    pub turn_direction: TurnDirection,
    /// Degrees, positive to starboard.
    pub rudder: i8,
}

fn decode(frame: &Frame, _diag: &dyn Diagnostics) -> Result<Message> {
    let u = frame.aux_nibble();
    Ok(Message::HeadingRudder(HeadingAndRudder {
        heading: Angle::from_degrees(f64::from(decode_heading(u, frame[2])?)),
        turn_direction: TurnDirection::from_u_nibble(u),
        rudder: frame[3] as i8,
    }))
}

fn encode(message: &Message) -> Result<Frame> {
    let Message::HeadingRudder(value) = message else {
        return Err(wrong_kind(MessageKind::HeadingRudder, message));
    };
    let (u, vw) = encode_heading(
        value.heading.degrees(),
        value.turn_direction.is_starboard(),
    );
    Ok(Frame::build(
        command::HEADING_RUDDER,
        u,
        &[vw, value.rudder as u8],
    )?)
}
