use std::fs::OpenOptions;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::BusStream;

/// Open a bus device node for reading and writing.
///
/// The node is expected to be configured already (line speed, parity). Any
/// readable and writable path works, which makes plain files usable as
/// captures in tests.
pub fn open_device(path: impl AsRef<Path>) -> Result<BusStream> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| TransportError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
    debug!(?path, "opened bus device");
    Ok(BusStream::from_device(file))
}
