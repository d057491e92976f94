//! Remote control of an autopilot over a bus session.
//!
//! [`AutopilotController`] presses keys the way a handheld remote does and
//! watches the autopilot's reports until the requested state shows up. Every
//! command is bounded by a timeout; a key pressed on the autopilot itself
//! cancels the command in progress.
//!
//! Deadlines are checked between received messages. Give the bus a read
//! timeout (see [`FrameConfig::read_timeout`]) so a quiet bus cannot hold a
//! command past its deadline.
//!
//! [`FrameConfig::read_timeout`]: seatalk_frame::FrameConfig::read_timeout

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use seatalk_messages::{
    Angle, AutopilotButtons, AutopilotStatus, CourseComputerWarnings, DeadbandMode, Keystroke,
    Message, TurnDirection,
};
use tracing::{debug, info, warn};

use crate::autopilot::{
    buttons_for_status, deadband_keystroke, next_turn_keystroke, shorter_turn, AutopilotState,
    DEFAULT_TIMEOUT, REMOTE_SOURCE,
};
use crate::bus::Bus;
use crate::error::{BusError, Result};

/// Longest timeout a command may use.
pub const MAX_COMMAND_TIMEOUT: Duration = Duration::from_secs(6);

/// Pause between repeated key presses while waiting for a state change.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(150);

/// How long to wait for the course change warning after entering track mode.
const TRACK_CONFIRM_WINDOW: Duration = Duration::from_secs(5);

/// Confirms the course change requested when entering track mode.
const TRACK_CONFIRM_KEY: u8 = 0x28;

/// Drives an autopilot through a [`Bus`] and tracks its state.
pub struct AutopilotController<R, W> {
    bus: Bus<R, W>,
    state: AutopilotState,
    timeout: Duration,
    retry_interval: Duration,
    keypad_pressed: bool,
}

impl<R: Read, W: Write> AutopilotController<R, W> {
    pub fn new(bus: Bus<R, W>) -> Self {
        Self {
            bus,
            state: AutopilotState::new(DEFAULT_TIMEOUT),
            timeout: DEFAULT_TIMEOUT,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            keypad_pressed: false,
        }
    }

    /// Per-command timeout, capped at [`MAX_COMMAND_TIMEOUT`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if timeout > MAX_COMMAND_TIMEOUT {
            warn!(?timeout, max = ?MAX_COMMAND_TIMEOUT, "command timeout capped");
        }
        self.timeout = timeout.min(MAX_COMMAND_TIMEOUT);
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn state(&self) -> &AutopilotState {
        &self.state
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn bus(&self) -> &Bus<R, W> {
        &self.bus
    }

    pub fn into_bus(self) -> Bus<R, W> {
        self.bus
    }

    /// Receive at most one message and fold it into the state.
    ///
    /// Returns `None` when the read timed out or the frame could not be
    /// decoded.
    pub fn poll(&mut self) -> Result<Option<Message>> {
        let message = match self.bus.recv() {
            Ok(received) => Some(received.message),
            Err(err) if err.is_timeout() => None,
            Err(BusError::Message(err)) => {
                debug!(error = %err, "skipping undecodable frame");
                None
            }
            Err(err) => return Err(err),
        };

        let now = Instant::now();
        if let Some(message) = &message {
            if let Message::Keystroke(key) = message {
                if key.source() != REMOTE_SOURCE {
                    debug!(code = key.key_code(), source = key.source(), "key pressed on autopilot");
                    self.keypad_pressed = true;
                }
            }
            self.state.observe(message, now);
        }
        self.state.update_status(now);
        Ok(message)
    }

    /// Wait until the autopilot reports in.
    pub fn wait_online(&mut self) -> Result<()> {
        let deadline = Instant::now() + self.timeout;
        if self.poll_until(deadline, |s| !s.is_offline())? {
            Ok(())
        } else {
            Err(BusError::CommandTimeout(self.timeout))
        }
    }

    /// Switch the autopilot to `status`.
    ///
    /// Wind and track mode are entered from auto mode. Entering track mode
    /// usually needs a course change confirmed; without a matching
    /// `confirm_turn` this fails with [`BusError::ConfirmTurn`] naming the
    /// direction to confirm on the next call.
    pub fn set_status(
        &mut self,
        status: AutopilotStatus,
        confirm_turn: Option<TurnDirection>,
    ) -> Result<()> {
        let buttons = buttons_for_status(status).ok_or_else(|| {
            BusError::InvalidCommand(format!("status {status:?} cannot be set remotely"))
        })?;
        if self.state.status() == Some(status) && self.state.warnings().is_empty() {
            info!(?status, "autopilot already in requested status");
            return Ok(());
        }
        if self.state.is_offline() {
            return Err(BusError::NotReady("autopilot is offline".into()));
        }

        info!(?status, %buttons, "setting autopilot status");
        if matches!(status, AutopilotStatus::Wind | AutopilotStatus::Track) {
            let auto = Keystroke::from_buttons(AutopilotButtons::AUTO, REMOTE_SOURCE)?;
            self.press_until(auto, |s| {
                matches!(
                    s.status(),
                    Some(AutopilotStatus::Auto | AutopilotStatus::Wind | AutopilotStatus::Track)
                )
            })?;
        }

        let key = Keystroke::from_buttons(buttons, REMOTE_SOURCE)?;
        self.press_until(key, |s| {
            s.status() == Some(status) || (status == AutopilotStatus::Standby && s.is_standby())
        })?;

        if status == AutopilotStatus::Track {
            self.confirm_track(confirm_turn)?;
        }
        info!(status = ?self.state.status(), "autopilot status set");
        Ok(())
    }

    /// Switch the deadband. Only possible while steering.
    pub fn set_deadband(&mut self, mode: DeadbandMode) -> Result<()> {
        if self.state.is_offline() || self.state.is_standby() {
            return Err(BusError::NotReady(
                "deadband can only be changed while steering".into(),
            ));
        }
        let Some(key) = deadband_keystroke(self.state.deadband(), mode)? else {
            return Ok(());
        };
        info!(?mode, "setting deadband");
        self.press_until(key, |s| s.deadband() == mode)
    }

    /// Step the desired heading to `target`.
    ///
    /// Takes the shorter turn unless `direction` is given. Each key press
    /// must be answered with a changed desired heading within the timeout.
    pub fn turn_to(&mut self, target: Angle, direction: Option<TurnDirection>) -> Result<()> {
        let target = target.normalized();
        let mut desired = self.desired_heading()?;
        let direction = direction.unwrap_or_else(|| shorter_turn(desired, target));
        info!(%target, ?direction, "turning");

        while let Some(key) = next_turn_keystroke(desired, target, direction)? {
            self.keypad_pressed = false;
            self.bus.send(&key.into())?;
            let before = desired;
            let deadline = Instant::now() + self.timeout;
            let changed = self.poll_until(deadline, |s| {
                !s.is_operating() || s.desired_heading() != Some(before)
            })?;
            if self.keypad_pressed {
                warn!("turn cancelled by a key press on the autopilot");
                return Err(BusError::KeypadOverride);
            }
            if !changed {
                return Err(BusError::CommandTimeout(self.timeout));
            }
            desired = self.desired_heading()?;
        }

        info!(%desired, "reached desired heading");
        Ok(())
    }

    /// Turn by `degrees` relative to the desired heading, positive to
    /// starboard.
    pub fn turn_by(&mut self, degrees: f64) -> Result<()> {
        if !degrees.is_finite() || degrees.abs() >= 360.0 {
            return Err(BusError::InvalidCommand(format!(
                "turn of {degrees} degrees is not within a full circle"
            )));
        }
        let desired = self.desired_heading()?;
        let direction = if degrees >= 0.0 {
            TurnDirection::Starboard
        } else {
            TurnDirection::Port
        };
        let target = Angle::from_degrees(desired.degrees() + degrees);
        self.turn_to(target, Some(direction))
    }

    fn desired_heading(&self) -> Result<Angle> {
        match self.state.desired_heading() {
            Some(desired) if self.state.is_operating() => Ok(desired),
            _ => Err(BusError::NotReady("autopilot is not steering".into())),
        }
    }

    /// Wait for the course change warning and confirm it.
    fn confirm_track(&mut self, confirm_turn: Option<TurnDirection>) -> Result<()> {
        let deadline = Instant::now() + TRACK_CONFIRM_WINDOW;
        let warned = self.poll_until(deadline, |s| {
            s.warnings().contains(CourseComputerWarnings::DRIVE_FAILURE)
        })?;
        if !warned {
            return match self.state.status() {
                Some(AutopilotStatus::Track) => Ok(()),
                _ => Err(BusError::NotReady("autopilot left track mode".into())),
            };
        }

        let required = if self
            .state
            .warnings()
            .contains(CourseComputerWarnings::COURSE_CHANGE_TO_PORT)
        {
            TurnDirection::Port
        } else {
            TurnDirection::Starboard
        };
        if confirm_turn != Some(required) {
            info!(?required, "course change needs confirmation");
            return Err(BusError::ConfirmTurn(required));
        }

        info!(?required, "confirming course change");
        self.bus
            .send(&Keystroke::new(TRACK_CONFIRM_KEY, REMOTE_SOURCE)?.into())?;
        self.state.clear_warnings();
        let deadline = Instant::now() + self.timeout;
        if self.poll_until(deadline, |s| s.status() == Some(AutopilotStatus::Track))? {
            Ok(())
        } else {
            Err(BusError::CommandTimeout(self.timeout))
        }
    }

    /// Press `key` every retry interval until `done` holds.
    fn press_until<F>(&mut self, key: Keystroke, done: F) -> Result<()>
    where
        F: Fn(&AutopilotState) -> bool,
    {
        let deadline = Instant::now() + self.timeout;
        let message = Message::from(key);
        self.keypad_pressed = false;

        loop {
            if done(&self.state) {
                return Ok(());
            }
            if self.keypad_pressed {
                warn!(code = key.key_code(), "command cancelled by a key press on the autopilot");
                return Err(BusError::KeypadOverride);
            }
            let now = Instant::now();
            if now >= deadline {
                warn!(code = key.key_code(), timeout = ?self.timeout, "autopilot did not respond");
                return Err(BusError::CommandTimeout(self.timeout));
            }
            self.bus.send(&message)?;
            self.poll_until((now + self.retry_interval).min(deadline), &done)?;
        }
    }

    /// Poll until `done` holds or `deadline` passes. Returns whether `done`
    /// held.
    fn poll_until<F>(&mut self, deadline: Instant, done: F) -> Result<bool>
    where
        F: Fn(&AutopilotState) -> bool,
    {
        while !done(&self.state) {
            if self.keypad_pressed || Instant::now() >= deadline {
                return Ok(false);
            }
            self.poll()?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use seatalk_messages::Registry;

    use super::*;
    use crate::bus::BusConfig;

    fn offline_controller() -> AutopilotController<Cursor<Vec<u8>>, Vec<u8>> {
        let bus = Bus::from_parts(
            Cursor::new(Vec::new()),
            Vec::new(),
            Arc::new(Registry::builtin()),
            BusConfig::default(),
        );
        AutopilotController::new(bus)
    }

    fn controller_over(input: Vec<u8>) -> AutopilotController<Cursor<Vec<u8>>, Vec<u8>> {
        let bus = Bus::from_parts(
            Cursor::new(input),
            Vec::new(),
            Arc::new(Registry::builtin()),
            BusConfig::default(),
        );
        AutopilotController::new(bus)
    }

    fn sent(controller: AutopilotController<Cursor<Vec<u8>>, Vec<u8>>) -> Vec<u8> {
        let (_, writer) = controller.into_bus().into_parts();
        writer.into_inner()
    }

    #[test]
    fn commands_are_refused_while_offline() {
        let mut controller = offline_controller();
        assert!(matches!(
            controller.set_status(AutopilotStatus::Auto, None),
            Err(BusError::NotReady(_))
        ));
        assert!(matches!(
            controller.set_deadband(DeadbandMode::Minimal),
            Err(BusError::NotReady(_))
        ));
        assert!(matches!(
            controller.turn_to(Angle::from_degrees(10.0), None),
            Err(BusError::NotReady(_))
        ));
        assert!(sent(controller).is_empty());
    }

    #[test]
    fn invalid_commands_are_rejected_up_front() {
        let mut controller = offline_controller();
        assert!(matches!(
            controller.set_status(AutopilotStatus::Calibration, None),
            Err(BusError::InvalidCommand(_))
        ));
        assert!(matches!(controller.turn_by(360.0), Err(BusError::InvalidCommand(_))));
        assert!(matches!(controller.turn_by(f64::NAN), Err(BusError::InvalidCommand(_))));
    }

    #[test]
    fn timeout_is_capped() {
        let controller = offline_controller().with_timeout(Duration::from_secs(30));
        assert_eq!(controller.timeout(), MAX_COMMAND_TIMEOUT);
    }

    #[test]
    fn current_status_sends_nothing() {
        let report = [0x84, 0x06, 0x12, 0x00, 0x02, 0x00, 0x00, 0x00, 0x08];
        let mut controller = controller_over(report.to_vec());
        controller.wait_online().unwrap();
        assert!(controller.state().is_operating());

        controller.set_status(AutopilotStatus::Auto, None).unwrap();
        controller.set_deadband(DeadbandMode::Automatic).unwrap();
        assert!(sent(controller).is_empty());
    }

    #[test]
    fn standby_refuses_deadband_change() {
        let report = [0x84, 0x06, 0x12, 0x00, 0x00, 0x00, 0x00, 0x00, 0x08];
        let mut controller = controller_over(report.to_vec());
        controller.wait_online().unwrap();
        assert!(matches!(
            controller.set_deadband(DeadbandMode::Minimal),
            Err(BusError::NotReady(_))
        ));
    }

    #[test]
    fn closed_bus_ends_the_wait() {
        let mut controller = offline_controller();
        let err = controller.wait_online().unwrap_err();
        assert!(err.is_closed());
    }

    #[cfg(unix)]
    mod simulated {
        use std::path::{Path, PathBuf};
        use std::thread;

        use seatalk_frame::FrameConfig;
        use seatalk_messages::{AutopilotCourse, CourseComputerStatus, DeadbandSetting};
        use seatalk_transport::BusStream;

        use super::*;
        use crate::listener::BusListener;

        const POLL: Duration = Duration::from_millis(20);

        #[derive(Clone, Copy, PartialEq)]
        enum Behavior {
            Obedient,
            Deaf,
            Keypad,
        }

        fn session_config() -> BusConfig {
            BusConfig {
                frame: FrameConfig {
                    read_timeout: Some(POLL),
                    ..FrameConfig::default()
                },
                ..BusConfig::default()
            }
        }

        fn make_sock_path(tag: &str) -> PathBuf {
            let dir = std::env::temp_dir().join(format!(
                "stc-{}-{}-{}",
                tag,
                std::process::id(),
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .expect("time should be after epoch")
                    .as_nanos()
            ));
            std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
            dir.join("bus.sock")
        }

        fn cleanup(sock_path: &Path) {
            if let Some(parent) = sock_path.parent() {
                let _ = std::fs::remove_dir_all(parent);
            }
        }

        fn step(code: u8) -> f64 {
            match code {
                0x05 => -1.0,
                0x06 => -10.0,
                0x07 => 1.0,
                0x08 => 10.0,
                _ => 0.0,
            }
        }

        /// An autopilot answering remote keys, returning the key codes it saw.
        fn spawn_autopilot(
            sock_path: &Path,
            status: AutopilotStatus,
            behavior: Behavior,
        ) -> thread::JoinHandle<Vec<u8>> {
            let listener = BusListener::bind(sock_path)
                .expect("listener should bind")
                .with_config(session_config());

            thread::spawn(move || {
                let mut bus = listener.accept().expect("listener should accept");
                let mut course =
                    AutopilotCourse::new(Angle::from_degrees(90.0), Angle::from_degrees(90.0), status)
                        .with_autopilot_type(8)
                        .expect("valid autopilot type");
                let mut warnings = CourseComputerWarnings::empty();
                let mut keys = Vec::new();
                let _ = bus.send(&course.into());

                loop {
                    let key = match bus.recv_message() {
                        Ok(Message::Keystroke(key)) => key,
                        Ok(_) => continue,
                        Err(err) if err.is_timeout() => {
                            let _ = bus.send(&course.into());
                            continue;
                        }
                        // Closed or reset by the controller.
                        Err(_) => return keys,
                    };
                    keys.push(key.key_code());

                    match behavior {
                        Behavior::Deaf => continue,
                        Behavior::Keypad => {
                            let standby = Keystroke::new(0x02, 0).expect("valid keystroke");
                            let _ = bus.send(&standby.into());
                            continue;
                        }
                        Behavior::Obedient => {}
                    }

                    let current = course.status();
                    match key.key_code() {
                        0x01 => course = course.with_status(AutopilotStatus::Auto),
                        0x02 => course = course.with_status(AutopilotStatus::Standby),
                        0x23 if current == AutopilotStatus::Auto => {
                            course = course.with_status(AutopilotStatus::Wind);
                        }
                        0x28 if current == AutopilotStatus::Auto => {
                            course = course.with_status(AutopilotStatus::Track);
                            warnings = CourseComputerWarnings::DRIVE_FAILURE
                                | CourseComputerWarnings::COURSE_CHANGE_TO_PORT;
                        }
                        0x28 if current == AutopilotStatus::Track => {
                            warnings = CourseComputerWarnings::empty();
                        }
                        0x0A => {
                            let _ = bus.send(&DeadbandSetting { mode: DeadbandMode::Minimal }.into());
                        }
                        0x09 => {
                            let _ = bus.send(&DeadbandSetting { mode: DeadbandMode::Automatic }.into());
                        }
                        code => {
                            let next = course.course().degrees() + step(code);
                            course = course.with_course(Angle::from_degrees(next).normalized());
                        }
                    }
                    let _ = bus.send(&CourseComputerStatus { warnings }.into());
                    let _ = bus.send(&course.into());
                }
            })
        }

        fn connect(sock_path: &Path) -> AutopilotController<BusStream, BusStream> {
            let bus = Bus::connect(sock_path, Arc::new(Registry::builtin()), session_config())
                .expect("controller should connect");
            let mut controller = AutopilotController::new(bus)
                .with_timeout(Duration::from_secs(2))
                .with_retry_interval(Duration::from_millis(250));
            controller.wait_online().expect("autopilot should report in");
            controller
        }

        #[test]
        fn standby_to_auto_and_back() {
            let sock_path = make_sock_path("auto");
            let autopilot = spawn_autopilot(&sock_path, AutopilotStatus::Standby, Behavior::Obedient);
            let mut controller = connect(&sock_path);
            assert!(controller.state().is_standby());

            controller.set_status(AutopilotStatus::Auto, None).unwrap();
            assert_eq!(controller.state().status(), Some(AutopilotStatus::Auto));
            assert_eq!(controller.state().desired_heading(), Some(Angle::from_degrees(90.0)));

            controller.set_status(AutopilotStatus::Standby, None).unwrap();
            assert!(controller.state().is_standby());

            drop(controller);
            let keys = autopilot.join().expect("autopilot thread should finish");
            assert_eq!(keys.first(), Some(&0x01));
            assert_eq!(keys.last(), Some(&0x02));
            cleanup(&sock_path);
        }

        #[test]
        fn wind_mode_is_entered_through_auto() {
            let sock_path = make_sock_path("wind");
            let autopilot = spawn_autopilot(&sock_path, AutopilotStatus::Standby, Behavior::Obedient);
            let mut controller = connect(&sock_path);

            controller.set_status(AutopilotStatus::Wind, None).unwrap();
            assert_eq!(controller.state().status(), Some(AutopilotStatus::Wind));

            drop(controller);
            let keys = autopilot.join().expect("autopilot thread should finish");
            let auto = keys.iter().position(|&k| k == 0x01).expect("auto pressed");
            let wind = keys.iter().position(|&k| k == 0x23).expect("wind pressed");
            assert!(auto < wind);
            cleanup(&sock_path);
        }

        #[test]
        fn track_mode_needs_the_turn_confirmed() {
            let sock_path = make_sock_path("track");
            let autopilot = spawn_autopilot(&sock_path, AutopilotStatus::Auto, Behavior::Obedient);
            let mut controller = connect(&sock_path);

            let err = controller.set_status(AutopilotStatus::Track, None).unwrap_err();
            assert!(matches!(err, BusError::ConfirmTurn(TurnDirection::Port)));

            controller
                .set_status(AutopilotStatus::Track, Some(TurnDirection::Port))
                .unwrap();
            assert_eq!(controller.state().status(), Some(AutopilotStatus::Track));
            assert!(controller.state().warnings().is_empty());

            drop(controller);
            let keys = autopilot.join().expect("autopilot thread should finish");
            assert_eq!(keys.iter().filter(|&&k| k == TRACK_CONFIRM_KEY).count(), 2);
            cleanup(&sock_path);
        }

        #[test]
        fn deadband_follows_the_report() {
            let sock_path = make_sock_path("deadband");
            let autopilot = spawn_autopilot(&sock_path, AutopilotStatus::Auto, Behavior::Obedient);
            let mut controller = connect(&sock_path);

            controller.set_deadband(DeadbandMode::Minimal).unwrap();
            assert_eq!(controller.state().deadband(), DeadbandMode::Minimal);
            controller.set_deadband(DeadbandMode::Automatic).unwrap();
            assert_eq!(controller.state().deadband(), DeadbandMode::Automatic);

            drop(controller);
            let keys = autopilot.join().expect("autopilot thread should finish");
            assert!(keys.contains(&Keystroke::ENTER_MINIMAL_DEADBAND));
            assert!(keys.contains(&Keystroke::BACK_TO_AUTOMATIC));
            cleanup(&sock_path);
        }

        #[test]
        fn turn_steps_by_tens_then_ones() {
            let sock_path = make_sock_path("turn");
            let autopilot = spawn_autopilot(&sock_path, AutopilotStatus::Auto, Behavior::Obedient);
            let mut controller = connect(&sock_path);

            controller.turn_to(Angle::from_degrees(112.0), None).unwrap();
            assert_eq!(controller.state().desired_heading(), Some(Angle::from_degrees(111.0)));

            controller.turn_by(-21.0).unwrap();
            assert_eq!(controller.state().desired_heading(), Some(Angle::from_degrees(91.0)));

            drop(controller);
            let keys = autopilot.join().expect("autopilot thread should finish");
            assert_eq!(keys, vec![0x08, 0x08, 0x07, 0x06, 0x06]);
            cleanup(&sock_path);
        }

        #[test]
        fn deaf_autopilot_times_out() {
            let sock_path = make_sock_path("deaf");
            let autopilot = spawn_autopilot(&sock_path, AutopilotStatus::Standby, Behavior::Deaf);
            let mut controller = connect(&sock_path).with_timeout(Duration::from_millis(800));

            let started = Instant::now();
            let err = controller.set_status(AutopilotStatus::Auto, None).unwrap_err();
            assert!(matches!(err, BusError::CommandTimeout(_)));
            assert!(err.is_autopilot());
            assert!(started.elapsed() < Duration::from_secs(3));

            drop(controller);
            let keys = autopilot.join().expect("autopilot thread should finish");
            assert!(keys.len() > 1, "key should be repeated, saw {keys:?}");
            cleanup(&sock_path);
        }

        #[test]
        fn key_press_on_autopilot_cancels_command() {
            let sock_path = make_sock_path("keypad");
            let autopilot = spawn_autopilot(&sock_path, AutopilotStatus::Standby, Behavior::Keypad);
            let mut controller = connect(&sock_path);

            let err = controller.set_status(AutopilotStatus::Auto, None).unwrap_err();
            assert!(matches!(err, BusError::KeypadOverride));

            drop(controller);
            autopilot.join().expect("autopilot thread should finish");
            cleanup(&sock_path);
        }
    }
}
