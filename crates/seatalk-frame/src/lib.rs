//! Seatalk1 frame assembly.
//!
//! The bus carries no delimiters. A frame is recovered purely from structure:
//! - byte 0 is the command byte
//! - the low nibble of byte 1 (the attribute byte) is `total length - 3`
//! - the high nibble of byte 1 may carry message-specific bits
//!
//! Frames are therefore 3 to 18 bytes long. This crate only assembles frames;
//! deciding what a frame means is left to `seatalk-messages`.

pub mod codec;
pub mod command;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{decode_frame, encode_frame, Frame, FrameConfig, MAX_FRAME_LEN, MIN_FRAME_LEN};
pub use command::command_name;
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
