/// Errors that can occur in bus sessions.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] seatalk_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] seatalk_frame::FrameError),

    /// Message-level error.
    #[error("message error: {0}")]
    Message(#[from] seatalk_messages::MessageError),

    /// Too many bytes were dropped in a row without finding a valid frame.
    #[error("lost frame sync ({discarded} bytes discarded without a valid frame)")]
    SyncLost { discarded: usize },

    /// The autopilot did not reach the requested state in time.
    #[error("autopilot did not respond within {0:?}")]
    CommandTimeout(std::time::Duration),

    /// The autopilot is in no state to carry out the command.
    #[error("autopilot not ready: {0}")]
    NotReady(String),

    /// The command can never be carried out as given.
    #[error("invalid autopilot command: {0}")]
    InvalidCommand(String),

    /// A key on the autopilot itself was pressed while a command was running.
    #[error("command cancelled by a key press on the autopilot")]
    KeypadOverride,

    /// Track mode needs a course change confirmed in this direction.
    #[error("track mode needs a course change to {0:?} confirmed")]
    ConfirmTurn(seatalk_messages::TurnDirection),
}

impl BusError {
    /// Whether this error came from a read timeout, after which receiving
    /// may resume.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BusError::Frame(e) if e.is_timeout())
    }

    /// Whether the autopilot refused or failed to follow a command.
    pub fn is_autopilot(&self) -> bool {
        matches!(
            self,
            BusError::CommandTimeout(_)
                | BusError::NotReady(_)
                | BusError::InvalidCommand(_)
                | BusError::KeypadOverride
                | BusError::ConfirmTurn(_)
        )
    }

    /// Whether the stream ended.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            BusError::Frame(
                seatalk_frame::FrameError::ConnectionClosed
                    | seatalk_frame::FrameError::Truncated { .. }
            )
        )
    }
}

pub type Result<T> = std::result::Result<T, BusError>;
