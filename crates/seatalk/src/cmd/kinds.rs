use seatalk_messages::Registry;

use crate::cmd::KindsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_kinds, OutputFormat};

pub fn run(_args: KindsArgs, format: OutputFormat) -> CliResult<i32> {
    print_kinds(Registry::builtin().descriptors(), format);
    Ok(SUCCESS)
}
