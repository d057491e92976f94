use std::fs::File;
use std::io::{Read, Write};

use crate::error::{Result, TransportError};

/// A connected bus stream. Implements `Read` (byte source) and `Write`
/// (byte sink).
///
/// Either a device node opened read/write, or one end of a Unix domain
/// socket bridge.
pub struct BusStream {
    inner: BusStreamInner,
}

enum BusStreamInner {
    Device(File),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for BusStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            BusStreamInner::Device(file) => file.read(buf),
            #[cfg(unix)]
            BusStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for BusStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            BusStreamInner::Device(file) => file.write(buf),
            #[cfg(unix)]
            BusStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            BusStreamInner::Device(file) => file.flush(),
            #[cfg(unix)]
            BusStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl BusStream {
    pub(crate) fn from_device(file: File) -> Self {
        Self {
            inner: BusStreamInner::Device(file),
        }
    }

    #[cfg(unix)]
    pub(crate) fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: BusStreamInner::Unix(stream),
        }
    }

    /// Set read timeout on the underlying stream.
    ///
    /// Device nodes only accept `None`; their timing is configured on the tty
    /// itself.
    pub fn set_read_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        match &self.inner {
            BusStreamInner::Device(_) => reject_device_timeout(timeout),
            #[cfg(unix)]
            BusStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        match &self.inner {
            BusStreamInner::Device(_) => reject_device_timeout(timeout),
            #[cfg(unix)]
            BusStreamInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            BusStreamInner::Device(file) => Ok(Self::from_device(file.try_clone()?)),
            #[cfg(unix)]
            BusStreamInner::Unix(stream) => Ok(Self::from_unix(stream.try_clone()?)),
        }
    }

    /// Short name of the stream kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match &self.inner {
            BusStreamInner::Device(_) => "device",
            #[cfg(unix)]
            BusStreamInner::Unix(_) => "unix",
        }
    }
}

fn reject_device_timeout(timeout: Option<std::time::Duration>) -> Result<()> {
    match timeout {
        None => Ok(()),
        Some(_) => Err(TransportError::TimeoutUnsupported("device")),
    }
}

impl std::fmt::Debug for BusStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusStream")
            .field("type", &self.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn device_stream_rejects_timeouts() {
        let path = std::env::temp_dir().join(format!(
            "seatalk-transport-timeout-{}",
            std::process::id()
        ));
        std::fs::write(&path, b"").unwrap();
        let stream = crate::device::open_device(&path).unwrap();

        assert!(stream.set_read_timeout(None).is_ok());
        assert!(matches!(
            stream.set_read_timeout(Some(Duration::from_millis(10))),
            Err(TransportError::TimeoutUnsupported("device"))
        ));
        assert!(matches!(
            stream.set_write_timeout(Some(Duration::from_millis(10))),
            Err(TransportError::TimeoutUnsupported("device"))
        ));
        assert_eq!(stream.kind(), "device");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    #[cfg(unix)]
    fn unix_pair_reads_and_writes() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut left = BusStream::from_unix(left);
        let mut right = BusStream::from_unix(right);

        left.write_all(&[0x86, 0x01, 0x02, 0xfd]).unwrap();
        let mut buf = [0u8; 4];
        right.read_exact(&mut buf).unwrap();

        assert_eq!(buf, [0x86, 0x01, 0x02, 0xfd]);
        assert!(right
            .set_read_timeout(Some(Duration::from_millis(10)))
            .is_ok());
        assert_eq!(format!("{right:?}"), "BusStream { type: \"unix\" }");
    }
}
