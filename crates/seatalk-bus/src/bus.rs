use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use seatalk_frame::{Frame, FrameConfig, FrameReader, FrameWriter};
use seatalk_messages::{Diagnostics, Message, MessageError, Registry, TracingDiagnostics};
use seatalk_transport::BusStream;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{BusError, Result};

/// Where to restart assembly after a frame was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResyncPolicy {
    /// Drop one byte and try the next byte as a command byte. Recovers from
    /// garbage of any length.
    #[default]
    DiscardByte,
    /// Drop the whole rejected frame. Faster, but a garbled length nibble
    /// can swallow valid frames that follow.
    DiscardFrame,
}

/// Bus session behavior.
#[derive(Debug, Clone, Default)]
pub struct BusConfig {
    /// Read/write timeouts for the underlying stream.
    pub frame: FrameConfig,
    pub resync: ResyncPolicy,
    /// Give up with [`BusError::SyncLost`] after this many consecutive
    /// discarded bytes. `None` never gives up.
    pub max_consecutive_discards: Option<usize>,
}

/// Counters kept by a [`Bus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusStats {
    /// Messages decoded and returned.
    pub messages: u64,
    /// Frames with no descriptor for their command byte and length.
    pub unknown: u64,
    /// Frames rejected by every candidate descriptor.
    pub malformed: u64,
    /// Frames that matched a descriptor but failed to decode.
    pub decode_errors: u64,
    /// Bytes dropped while resynchronizing.
    pub discarded_bytes: u64,
    /// Times the session went from in sync to out of sync.
    pub sync_losses: u64,
    /// Frames written.
    pub sent: u64,
}

/// A decoded message together with the frame it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    pub frame: Frame,
    pub message: Message,
}

/// A Seatalk1 bus session: typed messages in, typed messages out.
pub struct Bus<R, W> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
    registry: Arc<Registry>,
    diagnostics: Arc<dyn Diagnostics + Send + Sync>,
    config: BusConfig,
    stats: BusStats,
    in_sync: bool,
    consecutive_discards: usize,
}

impl<R: Read, W: Write> Bus<R, W> {
    /// Create a session from separate read and write halves.
    pub fn from_parts(reader: R, writer: W, registry: Arc<Registry>, config: BusConfig) -> Self {
        Self::from_framed(
            FrameReader::with_config(reader, config.frame.clone()),
            FrameWriter::with_config(writer, config.frame.clone()),
            registry,
            config,
        )
    }

    fn from_framed(
        reader: FrameReader<R>,
        writer: FrameWriter<W>,
        registry: Arc<Registry>,
        config: BusConfig,
    ) -> Self {
        Self {
            reader,
            writer,
            registry,
            diagnostics: Arc::new(TracingDiagnostics),
            config,
            stats: BusStats::default(),
            in_sync: true,
            consecutive_discards: 0,
        }
    }

    /// Replace the diagnostics sink (default: `tracing`).
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics + Send + Sync>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Receive the next message (blocking).
    ///
    /// Unknown and malformed frames are skipped according to the
    /// [`ResyncPolicy`]. A frame that matched a descriptor but could not be
    /// decoded is consumed and its error returned; the next call continues
    /// with the following frame.
    pub fn recv(&mut self) -> Result<Received> {
        loop {
            let frame = self.reader.peek_frame()?;
            match self.registry.decode(&frame, self.diagnostics.as_ref()) {
                Ok(message) => {
                    self.reader.advance(frame.len());
                    self.mark_in_sync();
                    self.stats.messages += 1;
                    debug!(kind = %message.kind(), %frame, "received message");
                    return Ok(Received { frame, message });
                }
                Err(err) if err.is_recoverable() => {
                    match err {
                        MessageError::UnknownMessage { .. } => self.stats.unknown += 1,
                        _ => self.stats.malformed += 1,
                    }
                    self.skip(&frame, &err)?;
                }
                Err(err) => {
                    self.reader.advance(frame.len());
                    self.stats.decode_errors += 1;
                    warn!(%frame, error = %err, "failed to decode frame");
                    return Err(err.into());
                }
            }
        }
    }

    /// Receive the next message, dropping the frame.
    pub fn recv_message(&mut self) -> Result<Message> {
        self.recv().map(|received| received.message)
    }

    /// Encode and send one message.
    pub fn send(&mut self, message: &Message) -> Result<()> {
        let frame = self.registry.encode(message)?;
        self.send_frame(&frame)
    }

    /// Send a raw frame.
    pub fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        self.writer.write_frame(frame)?;
        self.stats.sent += 1;
        debug!(%frame, "sent frame");
        Ok(())
    }

    pub fn stats(&self) -> BusStats {
        self.stats
    }

    /// Whether the last frame assembled was accepted.
    pub fn is_in_sync(&self) -> bool {
        self.in_sync
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Split the session back into its framed halves.
    pub fn into_parts(self) -> (FrameReader<R>, FrameWriter<W>) {
        (self.reader, self.writer)
    }

    fn skip(&mut self, frame: &Frame, err: &MessageError) -> Result<()> {
        if self.in_sync {
            self.in_sync = false;
            self.stats.sync_losses += 1;
            warn!(%frame, error = %err, "lost frame sync; resynchronizing");
        }

        let n = match self.config.resync {
            ResyncPolicy::DiscardByte => 1,
            ResyncPolicy::DiscardFrame => frame.len(),
        };
        let dropped = self.reader.advance(n);
        self.stats.discarded_bytes += dropped as u64;
        self.consecutive_discards += dropped;

        match self.config.max_consecutive_discards {
            Some(max) if self.consecutive_discards > max => Err(BusError::SyncLost {
                discarded: self.consecutive_discards,
            }),
            _ => Ok(()),
        }
    }

    fn mark_in_sync(&mut self) {
        if !self.in_sync {
            info!(
                discarded = self.consecutive_discards,
                "frame sync recovered"
            );
            self.in_sync = true;
        }
        self.consecutive_discards = 0;
    }
}

impl Bus<BusStream, BusStream> {
    /// Open a serial device node carrying the bus.
    pub fn open(path: impl AsRef<Path>, registry: Arc<Registry>, config: BusConfig) -> Result<Self> {
        let stream = seatalk_transport::open_device(path)?;
        Self::from_stream(stream, registry, config)
    }

    /// Connect to a bus bridge socket.
    #[cfg(unix)]
    pub fn connect(
        path: impl AsRef<Path>,
        registry: Arc<Registry>,
        config: BusConfig,
    ) -> Result<Self> {
        let stream = seatalk_transport::BusBridge::connect(path)?;
        Self::from_stream(stream, registry, config)
    }

    /// Use one bidirectional stream for both directions.
    pub fn from_stream(stream: BusStream, registry: Arc<Registry>, config: BusConfig) -> Result<Self> {
        let reader_stream = stream.try_clone()?;
        let reader = FrameReader::with_config_bus(reader_stream, config.frame.clone())?;
        let writer = FrameWriter::with_config_bus(stream, config.frame.clone())?;
        debug!(kind = reader.get_ref().kind(), "bus session opened");
        Ok(Self::from_framed(reader, writer, registry, config))
    }
}
