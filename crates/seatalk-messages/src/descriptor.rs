use std::fmt;

use seatalk_frame::{command_name, Frame};

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::message::{Message, MessageKind};

/// Decodes a frame that passed the descriptor's `matches` predicate.
pub type DecodeFn = fn(&Frame, &dyn Diagnostics) -> Result<Message>;

/// Encodes a message into a frame of exactly `expected_length` bytes.
pub type EncodeFn = fn(&Message) -> Result<Frame>;

/// Decides whether a frame of the right command byte and length belongs to
/// this kind.
pub type MatchFn = fn(&Frame) -> bool;

/// Definition of one message kind.
///
/// Several descriptors may share a command byte. The registry tells them
/// apart by `expected_length` first and `matches` second.
#[derive(Clone, Copy)]
pub struct Descriptor {
    pub kind: MessageKind,
    pub name: &'static str,
    pub command_byte: u8,
    pub expected_length: usize,
    pub decode: DecodeFn,
    pub encode: EncodeFn,
    pub matches: MatchFn,
}

impl Descriptor {
    /// Whether a frame is a dispatch candidate for this descriptor.
    pub fn is_candidate(&self, frame: &Frame) -> bool {
        self.command_byte == frame.command() && self.expected_length == frame.len()
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field(
                "command_byte",
                &format_args!("0x{:02X} ({})", self.command_byte, command_name(self.command_byte)),
            )
            .field("expected_length", &self.expected_length)
            .finish()
    }
}
