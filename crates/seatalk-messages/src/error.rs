use seatalk_frame::FrameError;

use crate::message::MessageKind;

/// Errors that can occur while decoding or encoding messages.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// No descriptor is registered for this command byte and length.
    #[error("unknown message (command 0x{command:02X}, {length} bytes)")]
    UnknownMessage { command: u8, length: usize },

    /// Descriptors exist for this command byte and length, but none matched.
    #[error("malformed message (command 0x{command:02X}, {length} bytes)")]
    MalformedMessage { command: u8, length: usize },

    /// The kind has no transmit path.
    #[error("encoding {0} messages is not supported")]
    UnsupportedEncode(MessageKind),

    /// No descriptor for the kind is registered.
    #[error("no descriptor registered for {0}")]
    NotRegistered(MessageKind),

    /// A value cannot be represented on the wire.
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: String },

    /// A bit pattern that the layout rules out.
    #[error("invalid bit pattern 0x{value:X} in {field}")]
    InvalidBits { field: &'static str, value: u8 },

    /// A descriptor declares a length frames can never have.
    #[error("descriptor {name} declares length {length} (allowed 3..={max})")]
    DescriptorLength {
        name: &'static str,
        length: usize,
        max: usize,
    },

    /// A codec was handed a message of another kind.
    #[error("{expected} codec cannot encode a {actual} message")]
    KindMismatch {
        expected: MessageKind,
        actual: MessageKind,
    },

    /// An encoder produced a frame of the wrong length.
    #[error("{kind} encoder produced {actual} bytes, expected {expected}")]
    LengthMismatch {
        kind: MessageKind,
        expected: usize,
        actual: usize,
    },

    /// Building the frame failed.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl MessageError {
    pub(crate) fn out_of_range(field: &'static str, value: impl ToString) -> Self {
        MessageError::OutOfRange {
            field,
            value: value.to_string(),
        }
    }

    /// Unknown and malformed frames are expected on a noisy bus; the caller
    /// can skip them and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MessageError::UnknownMessage { .. } | MessageError::MalformedMessage { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MessageError>;
