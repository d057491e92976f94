use std::fs;
use std::time::Duration;

use crate::cmd::{parse_duration, parse_hex, ReplayArgs};
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID};

/// Stream a capture, byte for byte, to the first client of a bridge
/// socket. Garbage in the capture is sent as is.
pub fn run(args: ReplayArgs) -> CliResult<i32> {
    let text = fs::read_to_string(&args.file)
        .map_err(|err| io_error(&format!("failed reading {}", args.file.display()), err))?;
    let chunks = parse_capture(&text)?;
    let delay = args.delay.as_deref().map(parse_duration).transpose()?;
    serve(&args, &chunks, delay)
}

#[cfg(unix)]
fn serve(args: &ReplayArgs, chunks: &[Vec<u8>], delay: Option<Duration>) -> CliResult<i32> {
    use std::io::Write;

    use seatalk_transport::BusBridge;
    use tracing::info;

    use crate::exit::{transport_error, SUCCESS};

    let bridge = BusBridge::bind(&args.socket).map_err(|err| transport_error("bind failed", err))?;
    let mut stream = bridge
        .accept()
        .map_err(|err| transport_error("accept failed", err))?;

    let mut written = 0usize;
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 {
            if let Some(delay) = delay {
                std::thread::sleep(delay);
            }
        }
        stream
            .write_all(chunk)
            .map_err(|err| io_error("write failed", err))?;
        written += chunk.len();
    }
    stream.flush().map_err(|err| io_error("write failed", err))?;

    info!(lines = chunks.len(), bytes = written, "capture replayed");
    Ok(SUCCESS)
}

#[cfg(not(unix))]
fn serve(_args: &ReplayArgs, _chunks: &[Vec<u8>], _delay: Option<Duration>) -> CliResult<i32> {
    Err(CliError::new(
        crate::exit::USAGE,
        "replay needs unix domain sockets",
    ))
}

fn parse_capture(text: &str) -> CliResult<Vec<Vec<u8>>> {
    let mut chunks = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let content = line.split('#').next().unwrap_or_default();
        if content.trim().is_empty() {
            continue;
        }
        let bytes = parse_hex(content)
            .map_err(|err| CliError::new(DATA_INVALID, format!("capture line {}: {err}", n + 1)))?;
        chunks.push(bytes);
    }
    Ok(chunks)
}
