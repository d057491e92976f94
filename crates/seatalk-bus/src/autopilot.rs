//! Autopilot state as seen from the bus.
//!
//! [`AutopilotState`] folds received messages into the latest known
//! autopilot status. It does no I/O; feed it from [`Bus::recv`] and call
//! [`AutopilotState::update_status`] periodically to detect a silent
//! autopilot.
//!
//! [`Bus::recv`]: crate::Bus::recv

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use seatalk_messages::{
    Angle, AutopilotAlarms, AutopilotButtons, AutopilotStatus, CalibrationItem,
    CalibrationParameter, CourseComputerWarnings, DeadbandMode, Keystroke, Message, Result,
    TurnDirection,
};
use serde::Serialize;
use tracing::{info, warn};

/// Device nibble used for keystrokes sent from a remote control.
pub const REMOTE_SOURCE: u8 = 1;

/// How long without an autopilot course message before the autopilot is
/// considered offline, divided by two.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Rudder readings smaller than this are treated as "no rudder sensor"
/// until a larger one is seen.
const RUDDER_SENSOR_THRESHOLD: f64 = 0.5;

const CLOSE_ANGLE: f64 = 1.5;
const LARGE_STEP: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutopilotState {
    /// `None` while offline.
    status: Option<AutopilotStatus>,
    heading: Option<Angle>,
    desired_heading: Option<Angle>,
    rudder: Option<Angle>,
    rudder_available: bool,
    alarms: AutopilotAlarms,
    deadband: DeadbandMode,
    autopilot_type: u8,
    turn_direction: TurnDirection,
    warnings: CourseComputerWarnings,
    #[serde(serialize_with = "serialize_values")]
    calibration: BTreeMap<CalibrationItem, CalibrationParameter>,
    #[serde(skip)]
    last_update: Option<Instant>,
    #[serde(skip)]
    timeout: Duration,
}

impl Default for AutopilotState {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl AutopilotState {
    pub fn new(timeout: Duration) -> Self {
        Self {
            status: None,
            heading: None,
            desired_heading: None,
            rudder: None,
            rudder_available: false,
            alarms: AutopilotAlarms::empty(),
            deadband: DeadbandMode::Automatic,
            autopilot_type: 0,
            turn_direction: TurnDirection::Port,
            warnings: CourseComputerWarnings::empty(),
            calibration: BTreeMap::new(),
            last_update: None,
            timeout,
        }
    }

    /// Fold one received message into the state.
    ///
    /// Only autopilot course messages (`84`/`95`) count as a sign of life;
    /// heading and rudder reports may be echoes of our own traffic.
    pub fn observe(&mut self, message: &Message, now: Instant) {
        match message {
            Message::AutopilotCourse(course) | Message::AutopilotCourseAlt(course) => {
                self.last_update = Some(now);
                self.status = Some(course.status());
                self.heading = Some(course.heading());
                self.desired_heading = (!course.status().is_standby()).then_some(course.course());
                self.autopilot_type = course.autopilot_type();
                self.turn_direction = course.turn_direction();
                self.alarms = course.alarms();
                self.set_rudder(course.rudder());
            }
            Message::HeadingRudder(value) => {
                self.heading = Some(value.heading);
                self.turn_direction = value.turn_direction;
                self.set_rudder(value.rudder);
            }
            Message::Deadband(value) => self.deadband = value.mode,
            Message::Calibration(param) => {
                info!(
                    parameter = ?param.parameter,
                    current = param.current,
                    min = param.min,
                    max = param.max,
                    "calibration value"
                );
                self.calibration.insert(param.parameter, *param);
            }
            Message::CourseComputer(status) => {
                if !status.warnings.is_empty() {
                    warn!(warnings = %status.warnings, "course computer has warnings");
                }
                self.warnings = status.warnings;
            }
            _ => {}
        }

        if self.is_offline() || self.is_standby() {
            self.deadband = DeadbandMode::Automatic;
            self.warnings = CourseComputerWarnings::empty();
        }
    }

    /// Go offline when no autopilot course message arrived within twice the
    /// timeout.
    pub fn update_status(&mut self, now: Instant) {
        let fresh = self
            .last_update
            .is_some_and(|last| now.saturating_duration_since(last) <= self.timeout * 2);
        if fresh {
            return;
        }
        if self.status.is_some() {
            warn!("autopilot connection timed out; assuming it is offline");
        }
        self.status = None;
        self.deadband = DeadbandMode::Automatic;
        self.rudder = None;
        self.desired_heading = None;
        self.heading = None;
        self.warnings = CourseComputerWarnings::empty();
    }

    /// The autopilot does not announce that a confirmed course change
    /// cleared its warnings.
    pub(crate) fn clear_warnings(&mut self) {
        self.warnings = CourseComputerWarnings::empty();
    }

    fn set_rudder(&mut self, rudder: i8) {
        let degrees = f64::from(rudder);
        if !self.rudder_available {
            self.rudder_available = degrees.abs() >= RUDDER_SENSOR_THRESHOLD;
        }
        self.rudder = self.rudder_available.then_some(Angle::from_degrees(degrees));
    }

    pub fn status(&self) -> Option<AutopilotStatus> {
        self.status
    }

    pub fn is_offline(&self) -> bool {
        self.status.is_none()
    }

    pub fn is_operating(&self) -> bool {
        self.status.is_some_and(AutopilotStatus::is_operating)
    }

    pub fn is_standby(&self) -> bool {
        self.status.is_some_and(AutopilotStatus::is_standby)
    }

    /// Heading of the autopilot's own compass.
    pub fn heading(&self) -> Option<Angle> {
        self.heading
    }

    /// Course being steered. Only known while operating.
    pub fn desired_heading(&self) -> Option<Angle> {
        self.desired_heading
    }

    /// Only known once a rudder sensor has reported a non-zero angle.
    pub fn rudder(&self) -> Option<Angle> {
        self.rudder
    }

    pub fn alarms(&self) -> AutopilotAlarms {
        self.alarms
    }

    pub fn deadband(&self) -> DeadbandMode {
        self.deadband
    }

    pub fn autopilot_type(&self) -> u8 {
        self.autopilot_type
    }

    pub fn turn_direction(&self) -> TurnDirection {
        self.turn_direction
    }

    pub fn warnings(&self) -> CourseComputerWarnings {
        self.warnings
    }

    pub fn calibration(&self) -> impl Iterator<Item = &CalibrationParameter> {
        self.calibration.values()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Display for AutopilotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_na = |angle: Option<Angle>| angle.map_or_else(|| "N/A".to_string(), |a| a.to_string());
        let mode = self
            .status
            .map_or_else(|| "Offline".to_string(), |s| format!("{s:?}"));
        write!(
            f,
            "MODE:{mode}; HDG:{}; DES:{}; RUD:{}; DB:{:?}; ALRT:{}; TD:{:?}",
            or_na(self.heading),
            or_na(self.desired_heading),
            or_na(self.rudder),
            self.deadband,
            self.alarms,
            self.turn_direction,
        )
    }
}

fn serialize_values<S: serde::Serializer>(
    map: &BTreeMap<CalibrationItem, CalibrationParameter>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(map.values())
}

/// Buttons that switch the autopilot into `status`.
///
/// Wind and track mode have to be entered from auto mode.
pub fn buttons_for_status(status: AutopilotStatus) -> Option<AutopilotButtons> {
    match status {
        AutopilotStatus::Auto => Some(AutopilotButtons::AUTO),
        AutopilotStatus::Standby => Some(AutopilotButtons::STANDBY),
        AutopilotStatus::Track => Some(AutopilotButtons::PLUS_TEN | AutopilotButtons::MINUS_TEN),
        AutopilotStatus::Wind => Some(AutopilotButtons::AUTO | AutopilotButtons::STANDBY),
        _ => None,
    }
}

/// Keystroke toggling the deadband from `current` to `desired`, if they
/// differ.
pub fn deadband_keystroke(current: DeadbandMode, desired: DeadbandMode) -> Result<Option<Keystroke>> {
    if current == desired {
        return Ok(None);
    }
    let code = match current {
        DeadbandMode::Automatic => Keystroke::ENTER_MINIMAL_DEADBAND,
        DeadbandMode::Minimal => Keystroke::BACK_TO_AUTOMATIC,
    };
    Keystroke::new(code, REMOTE_SOURCE).map(Some)
}

/// Whether two headings are within one and a half degrees.
pub fn angles_are_close(a: Angle, b: Angle) -> bool {
    a.difference_to(b).abs().degrees() < CLOSE_ANGLE
}

/// Direction of the shorter turn from `from` to `to`.
pub fn shorter_turn(from: Angle, to: Angle) -> TurnDirection {
    if from.difference_to(to).degrees() >= 0.0 {
        TurnDirection::Starboard
    } else {
        TurnDirection::Port
    }
}

/// Next keystroke when stepping the desired heading toward `target`.
///
/// Steps by ten degrees while more than ten degrees remain, by one degree
/// otherwise. Returns `None` once the heading is close to the target.
pub fn next_turn_keystroke(
    desired: Angle,
    target: Angle,
    direction: TurnDirection,
) -> Result<Option<Keystroke>> {
    if angles_are_close(desired, target) {
        return Ok(None);
    }
    let large = desired.difference_to(target).abs().degrees() > LARGE_STEP;
    let buttons = match (direction, large) {
        (TurnDirection::Starboard, true) => AutopilotButtons::PLUS_TEN,
        (TurnDirection::Starboard, false) => AutopilotButtons::PLUS_ONE,
        (TurnDirection::Port, true) => AutopilotButtons::MINUS_TEN,
        (TurnDirection::Port, false) => AutopilotButtons::MINUS_ONE,
    };
    Keystroke::from_buttons(buttons, REMOTE_SOURCE).map(Some)
}

#[cfg(test)]
mod tests {
    use seatalk_messages::{
        AutopilotCourse, CourseComputerStatus, DeadbandSetting, HeadingAndRudder,
    };

    use super::*;

    fn course(status: AutopilotStatus, heading: f64, desired: f64, rudder: i8) -> Message {
        Message::AutopilotCourse(
            AutopilotCourse::new(Angle::from_degrees(heading), Angle::from_degrees(desired), status)
                .with_rudder(rudder),
        )
    }

    #[test]
    fn starts_offline() {
        let state = AutopilotState::default();
        assert!(state.is_offline());
        assert_eq!(state.desired_heading(), None);
        assert_eq!(state.heading(), None);
        assert!(state.alarms().is_empty());
        assert_eq!(state.rudder(), None);
    }

    #[test]
    fn standby_has_no_desired_heading() {
        let mut state = AutopilotState::default();
        state.observe(&course(AutopilotStatus::Standby, 95.0, 100.0, 0), Instant::now());

        assert_eq!(state.status(), Some(AutopilotStatus::Standby));
        assert_eq!(state.desired_heading(), None);
        assert_eq!(state.heading(), Some(Angle::from_degrees(95.0)));
        assert_eq!(state.rudder(), None);
    }

    #[test]
    fn auto_reports_course_alarms_and_rudder() {
        let mut state = AutopilotState::default();
        let first_course = AutopilotCourse::new(
            Angle::from_degrees(95.0),
            Angle::from_degrees(100.0),
            AutopilotStatus::Auto,
        )
        .with_rudder(-10)
        .with_alarms(AutopilotAlarms::OFF_COURSE)
        .unwrap()
        .with_autopilot_type(2)
        .unwrap();
        let message = Message::AutopilotCourse(first_course);
        state.observe(&message, Instant::now());

        assert!(state.is_operating());
        assert_eq!(state.desired_heading(), Some(Angle::from_degrees(100.0)));
        assert_eq!(state.alarms(), AutopilotAlarms::OFF_COURSE);
        assert_eq!(state.autopilot_type(), 2);
        assert_eq!(state.rudder(), Some(Angle::from_degrees(-10.0)));

        // Once seen, a centered rudder is still a reading.
        state.observe(&course(AutopilotStatus::Auto, 95.0, 100.0, 0), Instant::now());
        assert_eq!(state.rudder(), Some(Angle::ZERO));
    }

    #[test]
    fn heading_only_does_not_bring_autopilot_online() {
        let mut state = AutopilotState::default();
        let message = Message::HeadingRudder(HeadingAndRudder {
            heading: Angle::from_degrees(90.0),
            ..HeadingAndRudder::default()
        });
        let now = Instant::now();
        state.observe(&message, now);

        assert_eq!(state.heading(), Some(Angle::from_degrees(90.0)));
        assert_eq!(state.rudder(), None);
        state.update_status(now);
        assert!(state.is_offline());
    }

    #[test]
    fn goes_offline_after_twice_the_timeout() {
        let mut state = AutopilotState::new(Duration::from_secs(3));
        let start = Instant::now();
        state.observe(&course(AutopilotStatus::Auto, 95.0, 100.0, 0), start);

        state.update_status(start + Duration::from_secs(6));
        assert_eq!(state.status(), Some(AutopilotStatus::Auto));

        state.update_status(start + Duration::from_secs(7));
        assert!(state.is_offline());
        assert_eq!(state.heading(), None);
        assert_eq!(state.desired_heading(), None);
    }

    #[test]
    fn standby_resets_deadband_and_warnings() {
        let mut state = AutopilotState::default();
        let now = Instant::now();
        state.observe(&course(AutopilotStatus::Auto, 10.0, 10.0, 0), now);
        state.observe(
            &Message::Deadband(DeadbandSetting {
                mode: DeadbandMode::Minimal,
            }),
            now,
        );
        state.observe(
            &Message::CourseComputer(CourseComputerStatus {
                warnings: CourseComputerWarnings::DRIVE_FAILURE,
            }),
            now,
        );
        assert_eq!(state.deadband(), DeadbandMode::Minimal);
        assert_eq!(state.warnings(), CourseComputerWarnings::DRIVE_FAILURE);

        state.observe(&course(AutopilotStatus::Standby, 10.0, 10.0, 0), now);
        assert_eq!(state.deadband(), DeadbandMode::Automatic);
        assert!(state.warnings().is_empty());
    }

    #[test]
    fn calibration_values_are_kept_per_item() {
        let mut state = AutopilotState::default();
        let gain = |current| {
            Message::Calibration(CalibrationParameter {
                parameter: CalibrationItem::RudderGain,
                current,
                max: 9,
                min: 1,
            })
        };
        state.observe(&gain(3), Instant::now());
        state.observe(&gain(5), Instant::now());

        let values: Vec<_> = state.calibration().collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].current, 5);
    }

    #[test]
    fn status_buttons() {
        assert_eq!(
            buttons_for_status(AutopilotStatus::Track),
            Some(AutopilotButtons::PLUS_TEN | AutopilotButtons::MINUS_TEN)
        );
        assert_eq!(
            buttons_for_status(AutopilotStatus::Wind),
            Some(AutopilotButtons::AUTO | AutopilotButtons::STANDBY)
        );
        assert_eq!(buttons_for_status(AutopilotStatus::Calibration), None);
    }

    #[test]
    fn deadband_toggle_codes() {
        let enter = deadband_keystroke(DeadbandMode::Automatic, DeadbandMode::Minimal)
            .unwrap()
            .unwrap();
        assert_eq!(enter.key_code(), 0x0A);
        assert_eq!(enter.source(), REMOTE_SOURCE);

        let leave = deadband_keystroke(DeadbandMode::Minimal, DeadbandMode::Automatic)
            .unwrap()
            .unwrap();
        assert_eq!(leave.key_code(), 0x09);

        assert!(deadband_keystroke(DeadbandMode::Minimal, DeadbandMode::Minimal)
            .unwrap()
            .is_none());
    }

    #[test]
    fn turn_steps() {
        let deg = Angle::from_degrees;
        let step = |from, to, dir| {
            next_turn_keystroke(deg(from), deg(to), dir)
                .unwrap()
                .and_then(|k| k.buttons())
        };

        assert_eq!(step(100.0, 130.0, TurnDirection::Starboard), Some(AutopilotButtons::PLUS_TEN));
        assert_eq!(step(125.0, 130.0, TurnDirection::Starboard), Some(AutopilotButtons::PLUS_ONE));
        assert_eq!(step(355.0, 10.0, TurnDirection::Starboard), Some(AutopilotButtons::PLUS_TEN));
        assert_eq!(step(10.0, 5.0, TurnDirection::Port), Some(AutopilotButtons::MINUS_ONE));
        assert_eq!(step(130.0, 131.0, TurnDirection::Starboard), None);
    }

    #[test]
    fn closeness_and_shorter_turn() {
        let deg = Angle::from_degrees;
        assert!(angles_are_close(deg(359.5), deg(0.5)));
        assert!(!angles_are_close(deg(10.0), deg(12.0)));
        assert_eq!(shorter_turn(deg(350.0), deg(10.0)), TurnDirection::Starboard);
        assert_eq!(shorter_turn(deg(10.0), deg(350.0)), TurnDirection::Port);
    }

    #[test]
    fn display_summary() {
        let mut state = AutopilotState::default();
        assert!(state.to_string().starts_with("MODE:Offline; HDG:N/A"));
        state.observe(&course(AutopilotStatus::Auto, 95.0, 100.0, 0), Instant::now());
        assert!(state.to_string().starts_with("MODE:Auto; HDG:95.0°; DES:100.0°; RUD:N/A"));
    }

    #[test]
    fn snapshot_serializes() {
        let state = AutopilotState::default();
        let mut state = state;
        state.observe(
            &Message::Calibration(CalibrationParameter {
                parameter: CalibrationItem::Unknown(0x08),
                current: 1,
                max: 2,
                min: 0,
            }),
            Instant::now(),
        );
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], serde_json::Value::Null);
        assert_eq!(json["deadband"], "automatic");
        assert_eq!(json["calibration"][0]["current"], 1);
    }
}
