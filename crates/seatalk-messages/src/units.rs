//! Physical quantities carried by Seatalk1 messages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Meters per nautical mile.
pub const METERS_PER_NAUTICAL_MILE: f64 = 1852.0;

/// Meters per second in one knot.
pub const METERS_PER_SECOND_PER_KNOT: f64 = METERS_PER_NAUTICAL_MILE / 3600.0;

/// An angle in degrees.
///
/// No range is implied. Use [`Angle::normalized`] for a compass direction
/// and [`Angle::signed`] for an angle relative to the bow.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Angle {
    degrees: f64,
}

impl Angle {
    pub const ZERO: Angle = Angle { degrees: 0.0 };

    pub const fn from_degrees(degrees: f64) -> Self {
        Self { degrees }
    }

    pub fn degrees(self) -> f64 {
        self.degrees
    }

    /// The same direction in `[0, 360)`.
    pub fn normalized(self) -> Angle {
        let d = self.degrees.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs.
        Angle::from_degrees(if d >= 360.0 { 0.0 } else { d })
    }

    /// The same direction in `(-180, 180]`.
    pub fn signed(self) -> Angle {
        let d = self.normalized().degrees;
        Angle::from_degrees(if d > 180.0 { d - 360.0 } else { d })
    }

    /// Shortest signed turn from `self` to `target`, in `(-180, 180]`.
    /// Positive means clockwise.
    pub fn difference_to(self, target: Angle) -> Angle {
        Angle::from_degrees(target.degrees - self.degrees).signed()
    }

    pub fn abs(self) -> Angle {
        Angle::from_degrees(self.degrees.abs())
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°", self.degrees)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    Knots,
    MetersPerSecond,
}

/// A speed together with the unit it was expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speed {
    pub value: f64,
    pub unit: SpeedUnit,
}

impl Speed {
    pub const fn from_knots(value: f64) -> Self {
        Self {
            value,
            unit: SpeedUnit::Knots,
        }
    }

    pub const fn from_meters_per_second(value: f64) -> Self {
        Self {
            value,
            unit: SpeedUnit::MetersPerSecond,
        }
    }

    pub fn knots(self) -> f64 {
        match self.unit {
            SpeedUnit::Knots => self.value,
            SpeedUnit::MetersPerSecond => self.value / METERS_PER_SECOND_PER_KNOT,
        }
    }

    pub fn meters_per_second(self) -> f64 {
        match self.unit {
            SpeedUnit::Knots => self.value * METERS_PER_SECOND_PER_KNOT,
            SpeedUnit::MetersPerSecond => self.value,
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            SpeedUnit::Knots => write!(f, "{:.1} kn", self.value),
            SpeedUnit::MetersPerSecond => write!(f, "{:.1} m/s", self.value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    NauticalMiles,
    Meters,
    Millimeters,
}

/// A distance together with the unit it was expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    pub const fn from_nautical_miles(value: f64) -> Self {
        Self {
            value,
            unit: LengthUnit::NauticalMiles,
        }
    }

    pub const fn from_meters(value: f64) -> Self {
        Self {
            value,
            unit: LengthUnit::Meters,
        }
    }

    pub const fn from_millimeters(value: f64) -> Self {
        Self {
            value,
            unit: LengthUnit::Millimeters,
        }
    }

    pub fn meters(self) -> f64 {
        match self.unit {
            LengthUnit::NauticalMiles => self.value * METERS_PER_NAUTICAL_MILE,
            LengthUnit::Meters => self.value,
            LengthUnit::Millimeters => self.value / 1000.0,
        }
    }

    pub fn nautical_miles(self) -> f64 {
        match self.unit {
            LengthUnit::NauticalMiles => self.value,
            _ => self.meters() / METERS_PER_NAUTICAL_MILE,
        }
    }

    pub fn millimeters(self) -> f64 {
        match self.unit {
            LengthUnit::Millimeters => self.value,
            _ => self.meters() * 1000.0,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            LengthUnit::NauticalMiles => write!(f, "{:.2} nm", self.value),
            LengthUnit::Meters => write!(f, "{:.1} m", self.value),
            LengthUnit::Millimeters => write!(f, "{:.0} mm", self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn angle_normalization() {
        assert_eq!(Angle::from_degrees(-11.0).normalized().degrees(), 349.0);
        assert_eq!(Angle::from_degrees(360.0).normalized().degrees(), 0.0);
        assert_eq!(Angle::from_degrees(725.5).normalized().degrees(), 5.5);
        assert_eq!(Angle::from_degrees(-1e-20).normalized().degrees(), 0.0);
    }

    #[test]
    fn angle_signed_range_is_half_open_at_minus_180() {
        assert_eq!(Angle::from_degrees(180.0).signed().degrees(), 180.0);
        assert_eq!(Angle::from_degrees(-180.0).signed().degrees(), 180.0);
        assert_eq!(Angle::from_degrees(349.0).signed().degrees(), -11.0);
    }

    #[test]
    fn angle_difference_takes_short_way() {
        let from = Angle::from_degrees(350.0);
        assert_eq!(from.difference_to(Angle::from_degrees(10.0)).degrees(), 20.0);
        assert_eq!(
            Angle::from_degrees(10.0)
                .difference_to(Angle::from_degrees(350.0))
                .degrees(),
            -20.0
        );
    }

    #[test]
    fn speed_conversions() {
        let s = Speed::from_meters_per_second(METERS_PER_SECOND_PER_KNOT * 10.0);
        assert!(close(s.knots(), 10.0));
        assert!(close(Speed::from_knots(1.0).meters_per_second(), 1852.0 / 3600.0));
    }

    #[test]
    fn length_conversions() {
        let l = Length::from_nautical_miles(2.0);
        assert!(close(l.meters(), 3704.0));
        assert!(close(Length::from_meters(926.0).nautical_miles(), 0.5));
        assert!(close(Length::from_millimeters(1852.0).nautical_miles(), 0.001));
        assert!(close(Length::from_meters(1.5).millimeters(), 1500.0));
    }

    #[test]
    fn angle_serializes_as_plain_number() {
        let json = serde_json::to_string(&Angle::from_degrees(12.5)).unwrap();
        assert_eq!(json, "12.5");
        let speed: Speed = serde_json::from_str(r#"{"value":3.0,"unit":"meters_per_second"}"#).unwrap();
        assert_eq!(speed, Speed::from_meters_per_second(3.0));
    }
}
