//! `11 01 XX 0Y`: apparent wind speed, `(XX & 0x7F) + Y / 10`.
//!
//! Bit 7 of `XX` selects m/s instead of knots. Encoding always sends knots.

use seatalk_frame::{command, Frame};
use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;
use crate::diagnostics::Diagnostics;
use crate::error::{MessageError, Result};
use crate::kinds::wrong_kind;
use crate::message::{Message, MessageKind};
use crate::units::{Speed, SpeedUnit};

pub const DESCRIPTOR: Descriptor = Descriptor {
    kind: MessageKind::WindSpeed,
    name: "wind_speed",
    command_byte: command::WIND_SPEED,
    expected_length: 4,
    decode,
    encode,
    matches,
};

/// Largest value either unit can carry: 127 whole units and 9 tenths.
const MAX_VALUE: f64 = 127.9;
const MAX_TENTHS: u32 = 1279;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpeedRepr")]
pub struct ApparentWindSpeed {
    speed: Speed,
}

#[derive(Deserialize)]
struct SpeedRepr {
    speed: Speed,
}

impl TryFrom<SpeedRepr> for ApparentWindSpeed {
    type Error = MessageError;

    fn try_from(repr: SpeedRepr) -> Result<Self> {
        ApparentWindSpeed::new(repr.speed)
    }
}

impl ApparentWindSpeed {
    /// Accepts `0..=127.9` in the speed's own unit.
    pub fn new(speed: Speed) -> Result<Self> {
        if !(0.0..=MAX_VALUE).contains(&speed.value) {
            return Err(MessageError::out_of_range("wind speed", speed));
        }
        Ok(Self { speed })
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }
}

impl Default for ApparentWindSpeed {
    fn default() -> Self {
        Self {
            speed: Speed::from_knots(0.0),
        }
    }
}

fn matches(frame: &Frame) -> bool {
    frame[3] <= 9
}

fn decode(frame: &Frame, _diag: &dyn Diagnostics) -> Result<Message> {
    let tenths = u16::from(frame[2] & 0x7F) * 10 + u16::from(frame[3]);
    let value = f64::from(tenths) / 10.0;
    let speed = if frame[2] & 0x80 != 0 {
        Speed::from_meters_per_second(value)
    } else {
        Speed::from_knots(value)
    };
    Ok(Message::WindSpeed(ApparentWindSpeed { speed }))
}

fn encode(message: &Message) -> Result<Frame> {
    let Message::WindSpeed(value) = message else {
        return Err(wrong_kind(MessageKind::WindSpeed, message));
    };
    let knots = match value.speed.unit {
        SpeedUnit::Knots => value.speed.value,
        SpeedUnit::MetersPerSecond => value.speed.knots(),
    };
    let tenths = (knots * 10.0).round();
    if !(0.0..=f64::from(MAX_TENTHS)).contains(&tenths) {
        return Err(MessageError::out_of_range("wind speed", value.speed));
    }
    let tenths = tenths as u32;
    Ok(Frame::build(
        command::WIND_SPEED,
        0,
        &[(tenths / 10) as u8, (tenths % 10) as u8],
    )?)
}
