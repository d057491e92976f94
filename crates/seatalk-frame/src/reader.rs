use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};
use seatalk_transport::BusStream;
use tracing::debug;

use crate::codec::{decode_frame, pending_frame_len, Frame, FrameConfig, MAX_FRAME_LEN, MIN_FRAME_LEN};
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 64;

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally. Bytes that arrived past the current
/// frame stay buffered for the next call.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(MAX_FRAME_LEN * 4),
            config,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached on a
    /// frame boundary and `Err(FrameError::Truncated)` when it is reached
    /// part way through a frame.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = decode_frame(&mut self.buf)? {
                return Ok(frame);
            }
            self.fill()?;
        }
    }

    /// Assemble the next frame without consuming it.
    ///
    /// A following [`read_frame`](Self::read_frame) returns the same frame
    /// unless [`advance`](Self::advance) moved the boundary in between.
    pub fn peek_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(total) = pending_frame_len(&self.buf) {
                if self.buf.len() >= total {
                    return Frame::new(self.buf[..total].to_vec());
                }
            }
            self.fill()?;
        }
    }

    /// Drop up to `n` buffered bytes, moving the frame boundary forward.
    ///
    /// Returns how many bytes were dropped.
    pub fn advance(&mut self, n: usize) -> usize {
        let n = n.min(self.buf.len());
        self.buf.advance(n);
        n
    }

    /// Drop everything buffered so the next read starts on fresh bytes.
    ///
    /// Returns how many bytes were dropped.
    pub fn discard_partial(&mut self) -> usize {
        let n = self.buf.len();
        self.buf.clear();
        n
    }

    /// Bytes read from the stream but not yet returned as a frame.
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    fn fill(&mut self) -> Result<()> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => return Err(self.eof()),
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    let dropped = self.discard_partial();
                    if dropped > 0 {
                        debug!(dropped, "read timed out mid-frame; discarding partial frame");
                    }
                    return Err(FrameError::Io(err));
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    fn eof(&mut self) -> FrameError {
        if self.buf.is_empty() {
            return FrameError::ConnectionClosed;
        }
        let expected = pending_frame_len(&self.buf).unwrap_or(MIN_FRAME_LEN);
        let received = self.discard_partial();
        FrameError::Truncated { expected, received }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<BusStream> {
    /// Create a frame reader for a `BusStream` and apply the read timeout
    /// from config.
    pub fn with_config_bus(inner: BusStream, config: FrameConfig) -> Result<Self> {
        inner.set_read_timeout(config.read_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}
