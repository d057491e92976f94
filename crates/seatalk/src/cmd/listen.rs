use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use seatalk_bus::{AutopilotState, BusStats};
use tracing::info;

use crate::cmd::{open_bus, parse_duration, ListenArgs};
use crate::exit::{bus_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_autopilot, print_received, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let poll = parse_duration(&args.poll)?;
    // Device nodes take their timing from the tty settings.
    let read_timeout = args.socket.then_some(poll);
    let mut bus = open_bus(
        &args.path,
        args.socket,
        args.session.registry(),
        args.session.bus_config(read_timeout),
    )?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut autopilot = args.autopilot.then(AutopilotState::default);
    let mut received_count = 0usize;

    while running.load(Ordering::SeqCst) {
        let received = match bus.recv() {
            Ok(received) => received,
            Err(err) if err.is_timeout() => {
                if let Some(state) = autopilot.as_mut() {
                    check_offline(state, format);
                }
                continue;
            }
            Err(err) if err.is_closed() => {
                info!("bus closed");
                break;
            }
            Err(err) => return Err(bus_error("receive failed", err)),
        };

        match autopilot.as_mut() {
            Some(state) => {
                let before = state.clone();
                state.observe(&received.message, Instant::now());
                if *state != before {
                    print_autopilot(state, format);
                }
            }
            None => print_received(&received, format),
        }

        received_count = received_count.saturating_add(1);
        if args.count.is_some_and(|count| received_count >= count) {
            break;
        }
    }

    log_stats(&bus.stats());
    Ok(SUCCESS)
}

fn check_offline(state: &mut AutopilotState, format: OutputFormat) {
    let was_offline = state.is_offline();
    state.update_status(Instant::now());
    if state.is_offline() && !was_offline {
        print_autopilot(state, format);
    }
}

fn log_stats(stats: &BusStats) {
    info!(
        messages = stats.messages,
        unknown = stats.unknown,
        malformed = stats.malformed,
        decode_errors = stats.decode_errors,
        discarded_bytes = stats.discarded_bytes,
        sync_losses = stats.sync_losses,
        "listen finished"
    );
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
