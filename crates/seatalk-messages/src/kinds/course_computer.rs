//! `83 07 XX 00 00 00 00 80 00 00`: course computer warnings.

use seatalk_frame::{command, Frame};
use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::flags::CourseComputerWarnings;
use crate::kinds::wrong_kind;
use crate::message::{Message, MessageKind};

pub const DESCRIPTOR: Descriptor = Descriptor {
    kind: MessageKind::CourseComputer,
    name: "course_computer",
    command_byte: command::COURSE_COMPUTER,
    expected_length: 10,
    decode,
    encode,
    matches,
};

const TRAILER: [u8; 7] = [0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CourseComputerStatus {
    pub warnings: CourseComputerWarnings,
}

fn matches(frame: &Frame) -> bool {
    frame[3..] == TRAILER
}

fn decode(frame: &Frame, diag: &dyn Diagnostics) -> Result<Message> {
    let warnings = CourseComputerWarnings::from_bits_retain(frame[2]);
    if warnings.unknown_bits() != 0 {
        diag.unrecognized_bits(
            MessageKind::CourseComputer,
            "warnings",
            u32::from(warnings.unknown_bits()),
        );
    }
    Ok(Message::CourseComputer(CourseComputerStatus { warnings }))
}

fn encode(message: &Message) -> Result<Frame> {
    let Message::CourseComputer(value) = message else {
        return Err(wrong_kind(MessageKind::CourseComputer, message));
    };
    let mut data = [0u8; 8];
    data[0] = value.warnings.bits();
    data[1..].copy_from_slice(&TRAILER);
    Ok(Frame::build(command::COURSE_COMPUTER, 0, &data)?)
}
