use std::time::Duration;

use seatalk_bus::{AutopilotController, BusError, MAX_COMMAND_TIMEOUT};
use seatalk_messages::{Angle, AutopilotStatus, DeadbandMode, TurnDirection};
use tracing::info;

use crate::cmd::{
    open_bus, parse_duration, AutopilotAction, AutopilotArgs, DeadbandArg, ModeArg, TurnArg,
};
use crate::exit::{bus_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_autopilot, OutputFormat};

/// Read timeout on bridge sockets, so command deadlines are checked while
/// the bus is quiet.
const SOCKET_POLL: Duration = Duration::from_millis(100);

pub fn run(args: AutopilotArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    if timeout > MAX_COMMAND_TIMEOUT {
        return Err(CliError::new(
            USAGE,
            format!("timeout may not exceed {}s", MAX_COMMAND_TIMEOUT.as_secs()),
        ));
    }

    let read_timeout = args.socket.then_some(SOCKET_POLL);
    let bus = open_bus(
        &args.path,
        args.socket,
        args.session.registry(),
        args.session.bus_config(read_timeout),
    )?;
    let mut controller = AutopilotController::new(bus).with_timeout(timeout);
    controller
        .wait_online()
        .map_err(|err| bus_error("autopilot did not report", err))?;
    info!(state = %controller.state(), "autopilot online");

    let result = match args.action {
        AutopilotAction::Show => Ok(()),
        AutopilotAction::Status { mode, confirm } => {
            controller.set_status(mode.into(), confirm.map(TurnDirection::from))
        }
        AutopilotAction::Turn { to, by, direction } => match (to, by) {
            (Some(to), _) => {
                controller.turn_to(Angle::from_degrees(to), direction.map(TurnDirection::from))
            }
            (None, Some(by)) => controller.turn_by(by),
            (None, None) => return Err(CliError::new(USAGE, "one of --to or --by is required")),
        },
        AutopilotAction::Deadband { mode } => controller.set_deadband(mode.into()),
    };
    result.map_err(command_error)?;

    print_autopilot(controller.state(), format);
    Ok(SUCCESS)
}

fn command_error(err: BusError) -> CliError {
    let hint = match &err {
        BusError::ConfirmTurn(direction) => {
            let flag = match direction {
                TurnDirection::Port => "port",
                TurnDirection::Starboard => "starboard",
            };
            format!(" (rerun with --confirm {flag})")
        }
        _ => String::new(),
    };
    let mut cli = bus_error("autopilot command failed", err);
    cli.message.push_str(&hint);
    cli
}

impl From<ModeArg> for AutopilotStatus {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => AutopilotStatus::Auto,
            ModeArg::Standby => AutopilotStatus::Standby,
            ModeArg::Wind => AutopilotStatus::Wind,
            ModeArg::Track => AutopilotStatus::Track,
        }
    }
}

impl From<TurnArg> for TurnDirection {
    fn from(turn: TurnArg) -> Self {
        match turn {
            TurnArg::Port => TurnDirection::Port,
            TurnArg::Starboard => TurnDirection::Starboard,
        }
    }
}

impl From<DeadbandArg> for DeadbandMode {
    fn from(mode: DeadbandArg) -> Self {
        match mode {
            DeadbandArg::Automatic => DeadbandMode::Automatic,
            DeadbandArg::Minimal => DeadbandMode::Minimal,
        }
    }
}
