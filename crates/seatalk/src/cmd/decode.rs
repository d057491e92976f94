use std::io::{self, Cursor};

use seatalk_bus::{Bus, BusError, Received};
use seatalk_frame::{Frame, FrameError};
use seatalk_messages::{Registry, TracingDiagnostics};
use tracing::{debug, warn};

use crate::cmd::{parse_hex, DecodeArgs};
use crate::exit::{bus_error, frame_error, message_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_received, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = args.session.registry();
    if args.frame {
        for hex in &args.hex {
            let received = decode_one(hex, &registry)?;
            print_received(&received, format);
        }
        return Ok(SUCCESS);
    }

    let mut bytes = Vec::new();
    for hex in &args.hex {
        bytes.extend(parse_hex(hex)?);
    }
    let total = bytes.len();

    let mut bus = Bus::from_parts(
        Cursor::new(bytes),
        io::sink(),
        registry,
        args.session.bus_config(None),
    );
    loop {
        match bus.recv() {
            Ok(received) => print_received(&received, format),
            Err(BusError::Frame(FrameError::ConnectionClosed)) => break,
            Err(err) => return Err(bus_error("decode failed", err)),
        }
    }

    let stats = bus.stats();
    debug!(
        bytes = total,
        messages = stats.messages,
        discarded = stats.discarded_bytes,
        "decode finished"
    );
    if stats.messages == 0 && total > 0 {
        return Err(CliError::new(DATA_INVALID, "no valid frames in input"));
    }
    if stats.discarded_bytes > 0 {
        warn!(discarded = stats.discarded_bytes, "skipped bytes outside valid frames");
    }
    Ok(SUCCESS)
}

fn decode_one(hex: &str, registry: &Registry) -> CliResult<Received> {
    let frame = Frame::try_from(parse_hex(hex)?).map_err(|err| frame_error("invalid frame", err))?;
    let message = registry
        .decode(&frame, &TracingDiagnostics)
        .map_err(|err| message_error(&format!("cannot decode [{frame}]"), err))?;
    Ok(Received { frame, message })
}
