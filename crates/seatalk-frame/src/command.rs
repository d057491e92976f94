//! Well-known Seatalk1 command bytes.
//!
//! Only the command byte is listed here. Several message kinds can share a
//! command byte and are told apart by length and content.

/// Depth below transducer.
pub const DEPTH: u8 = 0x00;

/// Apparent wind angle.
pub const WIND_ANGLE: u8 = 0x10;

/// Apparent wind speed, or autopilot wind mode status (3-byte form).
pub const WIND_SPEED: u8 = 0x11;

/// Speed through water.
pub const SPEED_THROUGH_WATER: u8 = 0x20;

/// Water temperature.
pub const WATER_TEMPERATURE: u8 = 0x23;

/// Set lamp intensity.
pub const LAMP_INTENSITY: u8 = 0x30;

/// Latitude position.
pub const LATITUDE: u8 = 0x50;

/// Longitude position.
pub const LONGITUDE: u8 = 0x51;

/// Speed over ground.
pub const SPEED_OVER_GROUND: u8 = 0x52;

/// Course over ground.
pub const COURSE_OVER_GROUND: u8 = 0x53;

/// Target waypoint name.
pub const WAYPOINT_NAME: u8 = 0x82;

/// Course computer status and warnings.
pub const COURSE_COMPUTER: u8 = 0x83;

/// Compass heading, autopilot course and rudder position.
pub const AUTOPILOT_COURSE: u8 = 0x84;

/// Navigation to waypoint.
pub const NAVIGATE_TO_WAYPOINT: u8 = 0x85;

/// Keystroke.
pub const KEYSTROKE: u8 = 0x86;

/// Response level (deadband).
pub const DEADBAND: u8 = 0x87;

/// Autopilot calibration parameter.
pub const CALIBRATION: u8 = 0x88;

/// Compass heading sent by ST40 compass instruments.
pub const COMPASS_HEADING: u8 = 0x89;

/// Same layout as `AUTOPILOT_COURSE`, sent by some autopilot models.
pub const AUTOPILOT_COURSE_ALT: u8 = 0x95;

/// Magnetic variation.
pub const MAGNETIC_VARIATION: u8 = 0x99;

/// Compass heading and rudder position.
pub const HEADING_RUDDER: u8 = 0x9C;

/// Returns a human-readable name for a command byte.
pub fn command_name(command: u8) -> &'static str {
    match command {
        DEPTH => "DEPTH",
        WIND_ANGLE => "WIND_ANGLE",
        WIND_SPEED => "WIND_SPEED",
        SPEED_THROUGH_WATER => "SPEED_THROUGH_WATER",
        WATER_TEMPERATURE => "WATER_TEMPERATURE",
        LAMP_INTENSITY => "LAMP_INTENSITY",
        LATITUDE => "LATITUDE",
        LONGITUDE => "LONGITUDE",
        SPEED_OVER_GROUND => "SPEED_OVER_GROUND",
        COURSE_OVER_GROUND => "COURSE_OVER_GROUND",
        WAYPOINT_NAME => "WAYPOINT_NAME",
        COURSE_COMPUTER => "COURSE_COMPUTER",
        AUTOPILOT_COURSE => "AUTOPILOT_COURSE",
        NAVIGATE_TO_WAYPOINT => "NAVIGATE_TO_WAYPOINT",
        KEYSTROKE => "KEYSTROKE",
        DEADBAND => "DEADBAND",
        CALIBRATION => "CALIBRATION",
        COMPASS_HEADING => "COMPASS_HEADING",
        AUTOPILOT_COURSE_ALT => "AUTOPILOT_COURSE_ALT",
        MAGNETIC_VARIATION => "MAGNETIC_VARIATION",
        HEADING_RUDDER => "HEADING_RUDDER",
        _ => "UNKNOWN",
    }
}
