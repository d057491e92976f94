//! `20 01 XX XX`: speed through water in tenths of a knot, big-endian.
//!
//! Attribute bit `0x40` marks a value forwarded by another device.

use seatalk_frame::{command, Frame};
use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;
use crate::diagnostics::Diagnostics;
use crate::error::{MessageError, Result};
use crate::kinds::{any_frame, wrong_kind};
use crate::message::{Message, MessageKind};
use crate::units::Speed;

pub const DESCRIPTOR: Descriptor = Descriptor {
    kind: MessageKind::SpeedThroughWater,
    name: "speed_through_water",
    command_byte: command::SPEED_THROUGH_WATER,
    expected_length: 4,
    decode,
    encode,
    matches: any_frame,
};

const FORWARDED: u8 = 0x4;
const MAX_KNOTS: f64 = 6553.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpeedRepr")]
pub struct SpeedThroughWater {
    speed: Speed,
    forwarded: bool,
}

#[derive(Deserialize)]
struct SpeedRepr {
    speed: Speed,
    #[serde(default)]
    forwarded: bool,
}

impl TryFrom<SpeedRepr> for SpeedThroughWater {
    type Error = MessageError;

    fn try_from(repr: SpeedRepr) -> Result<Self> {
        Ok(SpeedThroughWater::new(repr.speed)?.with_forwarded(repr.forwarded))
    }
}

impl SpeedThroughWater {
    pub fn new(speed: Speed) -> Result<Self> {
        if !(0.0..=MAX_KNOTS).contains(&speed.knots()) {
            return Err(MessageError::out_of_range("speed through water", speed));
        }
        Ok(Self {
            speed,
            forwarded: false,
        })
    }

    pub fn with_forwarded(mut self, forwarded: bool) -> Self {
        self.forwarded = forwarded;
        self
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn is_forwarded(&self) -> bool {
        self.forwarded
    }
}

impl Default for SpeedThroughWater {
    fn default() -> Self {
        Self {
            speed: Speed::from_knots(0.0),
            forwarded: false,
        }
    }
}

fn decode(frame: &Frame, _diag: &dyn Diagnostics) -> Result<Message> {
    let tenths = u16::from_be_bytes([frame[2], frame[3]]);
    Ok(Message::SpeedThroughWater(SpeedThroughWater {
        speed: Speed::from_knots(f64::from(tenths) / 10.0),
        forwarded: frame.aux_nibble() & FORWARDED != 0,
    }))
}

fn encode(message: &Message) -> Result<Frame> {
    let Message::SpeedThroughWater(value) = message else {
        return Err(wrong_kind(MessageKind::SpeedThroughWater, message));
    };
    let tenths = (value.speed.knots() * 10.0).round();
    if !(0.0..=f64::from(u16::MAX)).contains(&tenths) {
        return Err(MessageError::out_of_range("speed through water", value.speed));
    }
    let aux = if value.forwarded { FORWARDED } else { 0 };
    Ok(Frame::build(
        command::SPEED_THROUGH_WATER,
        aux,
        &(tenths as u16).to_be_bytes(),
    )?)
}
