use seatalk_messages::Registry;

use crate::cmd::{parse_message, EncodeArgs};
use crate::exit::{message_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let message = parse_message(&args.json)?;
    let frame = Registry::builtin()
        .encode(&message)
        .map_err(|err| message_error("encode failed", err))?;
    print_frame(&frame, format);
    Ok(SUCCESS)
}
