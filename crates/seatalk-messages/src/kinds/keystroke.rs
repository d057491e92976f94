//! `86 X1 YY yy`: a key press on an autopilot control head or remote.
//!
//! `X` identifies the sending device, `YY` is the key code and `yy` its
//! complement.

use seatalk_frame::{command, Frame};
use serde::{Deserialize, Serialize};

use crate::bits::is_complement;
use crate::descriptor::Descriptor;
use crate::diagnostics::Diagnostics;
use crate::error::{MessageError, Result};
use crate::flags::AutopilotButtons;
use crate::kinds::wrong_kind;
use crate::message::{Message, MessageKind};

pub const DESCRIPTOR: Descriptor = Descriptor {
    kind: MessageKind::Keystroke,
    name: "keystroke",
    command_byte: command::KEYSTROKE,
    expected_length: 4,
    decode,
    encode,
    matches,
};

/// Key codes and the buttons they stand for.
const KEY_CODES: &[(u8, u16)] = &[
    (0x01, AutopilotButtons::AUTO.bits()),
    (0x02, AutopilotButtons::STANDBY.bits()),
    (0x03, AutopilotButtons::TRACK.bits()),
    (0x04, AutopilotButtons::DISP.bits()),
    (0x05, AutopilotButtons::MINUS_ONE.bits()),
    (0x06, AutopilotButtons::MINUS_TEN.bits()),
    (0x07, AutopilotButtons::PLUS_ONE.bits()),
    (0x08, AutopilotButtons::PLUS_TEN.bits()),
    (0x21, AutopilotButtons::MINUS_ONE.bits() | AutopilotButtons::MINUS_TEN.bits()),
    (0x22, AutopilotButtons::PLUS_ONE.bits() | AutopilotButtons::PLUS_TEN.bits()),
    (0x23, AutopilotButtons::STANDBY.bits() | AutopilotButtons::AUTO.bits()),
    (0x28, AutopilotButtons::PLUS_TEN.bits() | AutopilotButtons::MINUS_TEN.bits()),
    (0x2E, AutopilotButtons::MINUS_ONE.bits() | AutopilotButtons::PLUS_ONE.bits()),
    (0x41, LONG | AutopilotButtons::AUTO.bits()),
    (0x42, LONG | AutopilotButtons::STANDBY.bits()),
    (0x43, LONG | AutopilotButtons::TRACK.bits()),
    (0x44, LONG | AutopilotButtons::DISP.bits()),
    (0x45, LONG | AutopilotButtons::MINUS_ONE.bits()),
    (0x46, LONG | AutopilotButtons::MINUS_TEN.bits()),
    (0x47, LONG | AutopilotButtons::PLUS_ONE.bits()),
    (0x48, LONG | AutopilotButtons::PLUS_TEN.bits()),
    (
        0x68,
        LONG | AutopilotButtons::PLUS_TEN.bits() | AutopilotButtons::MINUS_TEN.bits(),
    ),
    (
        0x6E,
        LONG | AutopilotButtons::MINUS_ONE.bits() | AutopilotButtons::PLUS_ONE.bits(),
    ),
];

const LONG: u16 = AutopilotButtons::LONG_PRESS.bits();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "KeystrokeRepr")]
pub struct Keystroke {
    key_code: u8,
    source: u8,
}

#[derive(Deserialize)]
struct KeystrokeRepr {
    key_code: u8,
    #[serde(default)]
    source: u8,
}

impl TryFrom<KeystrokeRepr> for Keystroke {
    type Error = MessageError;

    fn try_from(repr: KeystrokeRepr) -> Result<Self> {
        Keystroke::new(repr.key_code, repr.source)
    }
}

impl Keystroke {
    /// Switch the deadband to minimal (response level adjust).
    pub const ENTER_MINIMAL_DEADBAND: u8 = 0x0A;
    /// Switch the deadband back to automatic.
    pub const BACK_TO_AUTOMATIC: u8 = 0x09;

    /// A raw key code. `source` is the device nibble, `0..=15`.
    pub fn new(key_code: u8, source: u8) -> Result<Self> {
        if source > 0x0F {
            return Err(MessageError::out_of_range("keystroke source", source));
        }
        Ok(Self { key_code, source })
    }

    /// The key code for a button combination.
    pub fn from_buttons(buttons: AutopilotButtons, source: u8) -> Result<Self> {
        let key_code = KEY_CODES
            .iter()
            .find(|(_, bits)| *bits == buttons.bits())
            .map(|(code, _)| *code)
            .ok_or_else(|| MessageError::out_of_range("button combination", buttons))?;
        Keystroke::new(key_code, source)
    }

    pub fn key_code(&self) -> u8 {
        self.key_code
    }

    pub fn source(&self) -> u8 {
        self.source
    }

    /// Buttons for this key code, if the code stands for buttons.
    pub fn buttons(&self) -> Option<AutopilotButtons> {
        buttons_for_code(self.key_code)
    }
}

fn buttons_for_code(code: u8) -> Option<AutopilotButtons> {
    KEY_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, bits)| AutopilotButtons::from_bits_retain(*bits))
}

fn is_known_code(code: u8) -> bool {
    code == Keystroke::ENTER_MINIMAL_DEADBAND
        || code == Keystroke::BACK_TO_AUTOMATIC
        || buttons_for_code(code).is_some()
}

fn matches(frame: &Frame) -> bool {
    is_complement(frame[2], frame[3])
}

fn decode(frame: &Frame, diag: &dyn Diagnostics) -> Result<Message> {
    let key_code = frame[2];
    if !is_known_code(key_code) {
        diag.unrecognized_bits(MessageKind::Keystroke, "key code", u32::from(key_code));
    }
    Ok(Message::Keystroke(Keystroke {
        key_code,
        source: frame.aux_nibble(),
    }))
}

fn encode(message: &Message) -> Result<Frame> {
    let Message::Keystroke(key) = message else {
        return Err(wrong_kind(MessageKind::Keystroke, message));
    };
    Ok(Frame::build(
        command::KEYSTROKE,
        key.source,
        &[key.key_code, !key.key_code],
    )?)
}
