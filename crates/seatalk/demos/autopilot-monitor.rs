//! Simulated autopilot plus a remote control, talking over a bridge socket.
//!
//! Run with:
//!   cargo run --example autopilot-monitor
//!
//! The simulator reports an autopilot in auto mode steering 90 degrees. An
//! `AutopilotController` steps the desired course towards 112 degrees with
//! keystrokes, the way a handheld remote would.

use std::fs;
use std::sync::Arc;
use std::thread;

use seatalk::bus::{AutopilotController, Bus, BusConfig, BusListener};
use seatalk::messages::{
    Angle, AutopilotButtons, AutopilotCourse, AutopilotStatus, Message, Registry,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sock_dir = std::env::temp_dir().join(format!("seatalk-demo-{}", std::process::id()));
    fs::create_dir_all(&sock_dir)?;
    let sock_path = sock_dir.join("bus.sock");

    let registry = Arc::new(Registry::builtin());
    let listener = BusListener::bind(&sock_path)?.with_registry(Arc::clone(&registry));
    eprintln!("Simulated autopilot on {}", sock_path.display());

    let autopilot = thread::spawn(move || -> Result<(), seatalk::bus::BusError> {
        let mut bus = listener.accept()?;
        let mut course = AutopilotCourse::new(
            Angle::from_degrees(90.0),
            Angle::from_degrees(90.0),
            AutopilotStatus::Auto,
        );
        bus.send(&course.into())?;
        loop {
            let message = match bus.recv_message() {
                Ok(message) => message,
                Err(err) if err.is_closed() => return Ok(()),
                Err(err) => return Err(err),
            };
            if let Message::Keystroke(key) = message {
                let step = key.buttons().map_or(0.0, course_step);
                course = course
                    .with_course(Angle::from_degrees(course.course().degrees() + step).normalized());
                bus.send(&course.into())?;
            }
        }
    });

    let remote = Bus::connect(&sock_path, registry, BusConfig::default())?;
    let mut controller = AutopilotController::new(remote);
    controller.wait_online()?;
    println!("{}", controller.state());

    controller.turn_to(Angle::from_degrees(112.0), None)?;
    println!("{}", controller.state());

    drop(controller);
    autopilot
        .join()
        .map_err(|_| "autopilot thread panicked")??;
    let _ = fs::remove_dir_all(&sock_dir);
    Ok(())
}

fn course_step(buttons: AutopilotButtons) -> f64 {
    [
        (AutopilotButtons::PLUS_ONE, 1.0),
        (AutopilotButtons::MINUS_ONE, -1.0),
        (AutopilotButtons::PLUS_TEN, 10.0),
        (AutopilotButtons::MINUS_TEN, -10.0),
    ]
    .into_iter()
    .find(|(b, _)| *b == buttons)
    .map_or(0.0, |(_, step)| step)
}
