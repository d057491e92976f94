use std::sync::Arc;

use seatalk_bus::BusConfig;
use seatalk_frame::Frame;
use seatalk_messages::{Registry, SilentDiagnostics};
use tracing::{info, warn};

use crate::cmd::{open_bus, parse_hex, parse_message, SendArgs};
use crate::exit::{bus_error, frame_error, message_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = Arc::new(Registry::builtin());
    let frame = resolve_frame(&args, &registry)?;

    let mut bus = open_bus(&args.path, args.socket, registry, BusConfig::default())?;
    bus.send_frame(&frame)
        .map_err(|err| bus_error("send failed", err))?;
    info!(frame = %frame, "frame sent");

    print_frame(&frame, format);
    Ok(SUCCESS)
}

fn resolve_frame(args: &SendArgs, registry: &Registry) -> CliResult<Frame> {
    if let Some(json) = &args.json {
        let message = parse_message(json)?;
        return registry
            .encode(&message)
            .map_err(|err| message_error("encode failed", err));
    }
    if let Some(hex) = &args.hex {
        let frame =
            Frame::try_from(parse_hex(hex)?).map_err(|err| frame_error("invalid frame", err))?;
        if !frame.is_length_consistent() {
            warn!(frame = %frame, "attribute nibble disagrees with frame length");
        }
        if let Err(err) = registry.decode(&frame, &SilentDiagnostics) {
            warn!(frame = %frame, error = %err, "sending a frame no descriptor accepts");
        }
        return Ok(frame);
    }
    Err(CliError::new(USAGE, "one of --json or --hex is required"))
}
