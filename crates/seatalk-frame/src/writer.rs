use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use seatalk_transport::BusStream;

use crate::codec::{encode_frame, Frame, FrameConfig, MAX_FRAME_LEN};
use crate::error::{FrameError, Result};

/// Writes complete frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(MAX_FRAME_LEN),
            config,
        }
    }

    /// Write a complete frame (blocking) and flush.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.write_frames(std::slice::from_ref(frame))
    }

    /// Write several frames back to back, then flush once.
    ///
    /// A write timeout surfaces as an `Io` error with `WouldBlock` or
    /// `TimedOut`; see [`FrameError::is_timeout`].
    pub fn write_frames(&mut self, frames: &[Frame]) -> Result<()> {
        self.buf.clear();
        for frame in frames {
            encode_frame(frame, &mut self.buf);
        }

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Build a frame from its parts and write it.
    pub fn send(&mut self, command: u8, aux: u8, data: &[u8]) -> Result<()> {
        let frame = Frame::build(command, aux, data)?;
        self.write_frame(&frame)
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameWriter<BusStream> {
    /// Create a frame writer for a `BusStream` and apply the write timeout
    /// from config.
    pub fn with_config_bus(inner: BusStream, config: FrameConfig) -> Result<Self> {
        inner.set_write_timeout(config.write_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::reader::FrameReader;

    fn written(writer: FrameWriter<Cursor<Vec<u8>>>) -> Vec<u8> {
        writer.into_inner().into_inner()
    }

    #[test]
    fn write_single_frame() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::new()));
        let frame = Frame::new(vec![0x20, 0x01, 0x00, 0x64]).unwrap();

        writer.write_frame(&frame).unwrap();

        assert_eq!(written(writer), vec![0x20, 0x01, 0x00, 0x64]);
    }

    #[test]
    fn write_frames_back_to_back() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::new()));
        let frames = [
            Frame::build(0x30, 0, &[0x0c]).unwrap(),
            Frame::build(0x87, 0, &[0x01]).unwrap(),
        ];

        writer.write_frames(&frames).unwrap();

        let mut reader = FrameReader::new(Cursor::new(written(writer)));
        assert_eq!(reader.read_frame().unwrap(), frames[0]);
        assert_eq!(reader.read_frame().unwrap(), frames[1]);
    }

    #[test]
    fn send_builds_attribute_byte() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::new()));
        writer.send(0x86, 0x1, &[0x06, 0xf9]).unwrap();
        assert_eq!(written(writer), vec![0x86, 0x11, 0x06, 0xf9]);
    }

    #[test]
    fn send_rejects_empty_data() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::new()));
        assert!(matches!(
            writer.send(0x86, 0, &[]).unwrap_err(),
            FrameError::InvalidLength { len: 2 }
        ));
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = FrameWriter::new(sink);

        writer.send(0x87, 0, &[0x02]).unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn retries_interrupted() {
        let mut writer = FrameWriter::new(FailOnceWriter::new(ErrorKind::Interrupted));
        writer.send(0x30, 0, &[0x08]).unwrap();
        assert_eq!(writer.into_inner().data, vec![0x30, 0x00, 0x08]);
    }

    #[test]
    fn would_block_is_a_timeout_not_a_retry() {
        let mut writer = FrameWriter::new(FailOnceWriter::new(ErrorKind::WouldBlock));
        let err = writer.send(0x30, 0, &[0x08]).unwrap_err();
        assert!(err.is_timeout());
        assert!(writer.get_ref().data.is_empty());

        let mut writer = FrameWriter::new(FailOnceWriter {
            write_failed: true,
            ..FailOnceWriter::new(ErrorKind::WouldBlock)
        });
        let err = writer.send(0x30, 0, &[0x08]).unwrap_err();
        assert!(matches!(err, FrameError::Io(ref e) if e.kind() == ErrorKind::WouldBlock));
        assert_eq!(writer.get_ref().data, vec![0x30, 0x00, 0x08]);
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.send(0x30, 0, &[0x00]).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        assert!(writer.config().write_timeout.is_none());
        let _ = writer.get_ref();
        let _ = writer.get_mut();
        let _inner = writer.into_inner();
    }

    #[test]
    fn device_stream_rejects_write_timeout() {
        let path = std::env::temp_dir().join(format!(
            "seatalk-frame-writer-device-{}",
            std::process::id()
        ));
        std::fs::write(&path, b"").unwrap();
        let stream = seatalk_transport::open_device(&path).unwrap();

        let cfg = FrameConfig {
            write_timeout: Some(std::time::Duration::from_millis(10)),
            ..FrameConfig::default()
        };
        let err = FrameWriter::with_config_bus(stream, cfg).err().unwrap();
        assert!(matches!(err, FrameError::Transport(_)));

        let _ = std::fs::remove_file(&path);
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailOnceWriter {
        kind: ErrorKind,
        write_failed: bool,
        flush_failed: bool,
        data: Vec<u8>,
    }

    impl FailOnceWriter {
        fn new(kind: ErrorKind) -> Self {
            Self {
                kind,
                write_failed: false,
                flush_failed: false,
                data: Vec::new(),
            }
        }
    }

    impl Write for FailOnceWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.write_failed {
                self.write_failed = true;
                return Err(std::io::Error::from(self.kind));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_failed {
                self.flush_failed = true;
                return Err(std::io::Error::from(self.kind));
            }
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
