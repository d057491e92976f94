//! `82 05 XX xx YY yy ZZ zz`: last four characters of the target waypoint
//! name, six bits per character. Each upper-case byte is followed by its
//! complement.

use seatalk_frame::{command, Frame};
use serde::{Deserialize, Serialize};

use crate::bits::{is_complement, pack_sixbit, unpack_sixbit};
use crate::descriptor::Descriptor;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::kinds::wrong_kind;
use crate::message::{Message, MessageKind};

pub const DESCRIPTOR: Descriptor = Descriptor {
    kind: MessageKind::WaypointName,
    name: "waypoint_name",
    command_byte: command::WAYPOINT_NAME,
    expected_length: 8,
    decode,
    encode,
    matches,
};

const NAME_LEN: usize = 4;
const FIRST_CHAR: u8 = b'0';
const LAST_CHAR: u8 = b'o';

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "NameRepr")]
pub struct TargetWaypointName {
    name: String,
}

#[derive(Deserialize)]
struct NameRepr {
    name: String,
}

/// Deserialized names keep their case. Lower-case `'a'..='o'` is carried on
/// the wire as-is, so a decoded name survives a JSON round trip unchanged.
impl From<NameRepr> for TargetWaypointName {
    fn from(repr: NameRepr) -> Self {
        Self {
            name: normalize(repr.name.chars()),
        }
    }
}

impl TargetWaypointName {
    /// Normalize a name to what the bus can carry: upper case, the last four
    /// characters, padded with `'0'`. Characters outside `'0'..='o'` become
    /// `'0'`.
    pub fn new(name: &str) -> Self {
        Self {
            name: normalize(name.chars().map(|c| c.to_ascii_uppercase())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Last four characters, padded with `'0'`. A character outside the wire
/// range is upper-cased if that brings it into range, otherwise it becomes
/// `'0'`.
fn normalize(name: impl Iterator<Item = char>) -> String {
    let chars: Vec<char> = name.collect();
    let tail = &chars[chars.len().saturating_sub(NAME_LEN)..];

    let mut normalized: String = tail
        .iter()
        .map(|&c| {
            if is_wire_char(c) {
                c
            } else if is_wire_char(c.to_ascii_uppercase()) {
                c.to_ascii_uppercase()
            } else {
                char::from(FIRST_CHAR)
            }
        })
        .collect();
    while normalized.len() < NAME_LEN {
        normalized.push(char::from(FIRST_CHAR));
    }
    normalized
}

fn is_wire_char(c: char) -> bool {
    u8::try_from(c).is_ok_and(|b| (FIRST_CHAR..=LAST_CHAR).contains(&b))
}

impl Default for TargetWaypointName {
    fn default() -> Self {
        TargetWaypointName::new("")
    }
}

fn matches(frame: &Frame) -> bool {
    is_complement(frame[2], frame[3])
        && is_complement(frame[4], frame[5])
        && is_complement(frame[6], frame[7])
}

fn decode(frame: &Frame, _diag: &dyn Diagnostics) -> Result<Message> {
    let name = unpack_sixbit([frame[2], frame[4], frame[6]])
        .iter()
        .map(|&c| char::from(c + FIRST_CHAR))
        .collect();
    Ok(Message::WaypointName(TargetWaypointName { name }))
}

fn encode(message: &Message) -> Result<Frame> {
    let Message::WaypointName(value) = message else {
        return Err(wrong_kind(MessageKind::WaypointName, message));
    };

    let mut values = [0u8; NAME_LEN];
    for (slot, b) in values.iter_mut().zip(value.name.bytes()) {
        *slot = b.wrapping_sub(FIRST_CHAR);
    }
    let [x, y, z] = pack_sixbit(values);
    Ok(Frame::build(
        command::WAYPOINT_NAME,
        0,
        &[x, !x, y, !y, z, !z],
    )?)
}
