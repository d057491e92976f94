/// Errors that can occur while assembling or writing frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A frame must be between 3 and 18 bytes long.
    #[error("invalid frame length {len} (expected 3..=18)")]
    InvalidLength { len: usize },

    /// The stream ended part way through a frame.
    #[error("truncated frame (expected {expected} bytes, received {received})")]
    Truncated { expected: usize, received: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream could not be configured.
    #[error(transparent)]
    Transport(#[from] seatalk_transport::TransportError),

    /// The stream ended on a frame boundary.
    #[error("connection closed")]
    ConnectionClosed,
}

impl FrameError {
    /// Whether this error came from a read timeout (or a non-blocking read
    /// with no data), after which reading may resume.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            FrameError::Io(e)
                if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut)
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
