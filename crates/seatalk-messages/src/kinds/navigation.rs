//! `85 X6 XX VU ZW ZZ YF 00 yf`: navigation to waypoint.
//!
//! ```text
//! XXX  cross track error, hundredths of a nautical mile
//! U    bits 0-1 bearing quadrant, bit 3 bearing is true
//! WV   bearing within the quadrant, half degrees
//! ZZZ  distance, hundredths (Y & 1) or tenths of a nautical mile
//! Y    bit 2 steer right (negative cross track error)
//! F    1 XTE valid, 2 bearing valid, 4 distance valid, 8 large XTE
//! yf   complement of YF
//! ```

use seatalk_frame::{command, Frame};
use serde::{Deserialize, Serialize};

use crate::bits::{is_complement, round_degrees};
use crate::descriptor::Descriptor;
use crate::diagnostics::Diagnostics;
use crate::error::{MessageError, Result};
use crate::kinds::wrong_kind;
use crate::message::{Message, MessageKind};
use crate::units::{Angle, Length};

pub const DESCRIPTOR: Descriptor = Descriptor {
    kind: MessageKind::NavigateToWaypoint,
    name: "navigate_to_waypoint",
    command_byte: command::NAVIGATE_TO_WAYPOINT,
    expected_length: 9,
    decode,
    encode,
    matches,
};

const XTE_VALID: u8 = 0x1;
const BEARING_VALID: u8 = 0x2;
const DISTANCE_VALID: u8 = 0x4;
const XTE_LARGE: u8 = 0x8;

const DISTANCE_IN_HUNDREDTHS: u8 = 0x1;
const STEER_RIGHT: u8 = 0x4;
const BEARING_TRUE: u8 = 0x8;

const MAX_TWELVE_BITS: u32 = 0xFFF;
/// Distances up to this are sent in hundredths.
const FINE_DISTANCE_LIMIT: f64 = 9.9;
const MAX_DISTANCE: f64 = 409.5;
const LARGE_XTE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "NavigationRepr")]
pub struct NavigationToWaypoint {
    cross_track_error: Option<Length>,
    bearing: Option<Angle>,
    bearing_is_true: bool,
    distance: Option<Length>,
}

#[derive(Deserialize)]
struct NavigationRepr {
    #[serde(default)]
    cross_track_error: Option<Length>,
    #[serde(default)]
    bearing: Option<Angle>,
    #[serde(default)]
    bearing_is_true: bool,
    #[serde(default)]
    distance: Option<Length>,
}

impl TryFrom<NavigationRepr> for NavigationToWaypoint {
    type Error = MessageError;

    fn try_from(repr: NavigationRepr) -> Result<Self> {
        NavigationToWaypoint::new(
            repr.cross_track_error,
            repr.bearing,
            repr.bearing_is_true,
            repr.distance,
        )
    }
}

impl NavigationToWaypoint {
    /// `None` marks a field as not available.
    ///
    /// A negative cross track error means steer right. Its magnitude is
    /// clamped to 40.95 nm when encoded. Distance must be within
    /// `0..=409.5` nm.
    pub fn new(
        cross_track_error: Option<Length>,
        bearing: Option<Angle>,
        bearing_is_true: bool,
        distance: Option<Length>,
    ) -> Result<Self> {
        if let Some(d) = distance {
            if !(0.0..=MAX_DISTANCE).contains(&d.nautical_miles()) {
                return Err(MessageError::out_of_range("distance to waypoint", d));
            }
        }
        Ok(Self {
            cross_track_error,
            bearing,
            bearing_is_true,
            distance,
        })
    }

    pub fn cross_track_error(&self) -> Option<Length> {
        self.cross_track_error
    }

    pub fn bearing(&self) -> Option<Angle> {
        self.bearing
    }

    pub fn bearing_is_true(&self) -> bool {
        self.bearing_is_true
    }

    pub fn distance(&self) -> Option<Length> {
        self.distance
    }
}

fn matches(frame: &Frame) -> bool {
    is_complement(frame[6], frame[8])
}

fn decode(frame: &Frame, _diag: &dyn Diagnostics) -> Result<Message> {
    let y = frame[6] >> 4;
    let flags = frame[6] & 0x0F;

    let cross_track_error = (flags & XTE_VALID != 0).then(|| {
        let hundredths = u16::from(frame[2]) << 4 | u16::from(frame[1] >> 4);
        let magnitude = f64::from(hundredths) / 100.0;
        Length::from_nautical_miles(if y & STEER_RIGHT != 0 {
            -magnitude
        } else {
            magnitude
        })
    });

    let u = frame[3] & 0x0F;
    let v = frame[3] >> 4;
    let w = frame[4] & 0x0F;
    let bearing = (flags & BEARING_VALID != 0).then(|| {
        let halves = u16::from(w) << 4 | u16::from(v);
        Angle::from_degrees(f64::from(u & 0x3) * 90.0 + f64::from(halves) / 2.0).normalized()
    });

    let distance = (flags & DISTANCE_VALID != 0).then(|| {
        let zzz = u16::from(frame[5]) << 4 | u16::from(frame[4] >> 4);
        let divisor = if y & DISTANCE_IN_HUNDREDTHS != 0 { 100.0 } else { 10.0 };
        Length::from_nautical_miles(f64::from(zzz) / divisor)
    });

    Ok(Message::NavigateToWaypoint(NavigationToWaypoint {
        cross_track_error,
        bearing,
        bearing_is_true: u & BEARING_TRUE != 0,
        distance,
    }))
}

fn encode(message: &Message) -> Result<Frame> {
    let Message::NavigateToWaypoint(nav) = message else {
        return Err(wrong_kind(MessageKind::NavigateToWaypoint, message));
    };

    let mut y = 0u8;
    let mut flags = 0u8;

    let mut xte = 0u32;
    if let Some(length) = nav.cross_track_error {
        let nm = length.nautical_miles();
        xte = ((nm.abs() * 100.0).round() as u32).min(MAX_TWELVE_BITS);
        flags |= XTE_VALID;
        if nm < 0.0 {
            y |= STEER_RIGHT;
        }
        if nm.abs() > LARGE_XTE {
            flags |= XTE_LARGE;
        }
    }

    let mut u = if nav.bearing_is_true { BEARING_TRUE } else { 0 };
    let mut halves_in_quadrant = 0u32;
    if let Some(bearing) = nav.bearing {
        let halves = round_degrees(bearing.degrees() * 2.0, 720);
        u |= (halves / 180) as u8;
        halves_in_quadrant = halves % 180;
        flags |= BEARING_VALID;
    }
    let v = (halves_in_quadrant & 0x0F) as u8;
    let w = (halves_in_quadrant >> 4) as u8;

    let mut zzz = 0u32;
    if let Some(length) = nav.distance {
        let nm = length.nautical_miles();
        if !(0.0..=MAX_DISTANCE).contains(&nm) {
            return Err(MessageError::out_of_range("distance to waypoint", length));
        }
        let scaled = if nm <= FINE_DISTANCE_LIMIT {
            y |= DISTANCE_IN_HUNDREDTHS;
            nm * 100.0
        } else {
            nm * 10.0
        };
        zzz = (scaled.round() as u32).min(MAX_TWELVE_BITS);
        flags |= DISTANCE_VALID;
    }

    let yf = y << 4 | flags;
    Ok(Frame::build(
        command::NAVIGATE_TO_WAYPOINT,
        (xte & 0x0F) as u8,
        &[
            (xte >> 4) as u8,
            v << 4 | u,
            ((zzz & 0x0F) as u8) << 4 | w,
            (zzz >> 4) as u8,
            yf,
            0x00,
            !yf,
        ],
    )?)
}
