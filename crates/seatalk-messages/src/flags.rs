//! Flag sets carried in single bytes.
//!
//! Unknown bits are kept as-is so that a decoded value encodes back to the
//! same byte; [`unknown_bits`](AutopilotAlarms::unknown_bits) exposes them for
//! diagnostics.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($repr:ty) {
            $( $(#[$fmeta:meta])* const $flag:ident = $value:expr; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($repr);

        impl $name {
            $( $(#[$fmeta])* pub const $flag: $name = $name($value); )+

            const NAMED: &'static [(&'static str, $repr)] = &[$( (stringify!($flag), $value) ),+];

            pub const fn empty() -> Self {
                $name(0)
            }

            /// Wrap raw bits, keeping any that have no name.
            pub const fn from_bits_retain(bits: $repr) -> Self {
                $name(bits)
            }

            pub const fn bits(self) -> $repr {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Bits that are set but have no name.
            pub fn unknown_bits(self) -> $repr {
                let known = Self::NAMED.iter().fold(0 as $repr, |acc, (_, bits)| acc | *bits);
                self.0 & !known
            }

            /// Names of the set flags, in declaration order.
            pub fn names(self) -> Vec<&'static str> {
                Self::NAMED
                    .iter()
                    .filter(|(_, bits)| self.0 & bits == *bits)
                    .map(|(name, _)| *name)
                    .collect()
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                $name(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_empty() {
                    return f.write_str("NONE");
                }
                let mut parts: Vec<String> = self.names().into_iter().map(str::to_string).collect();
                let unknown = self.unknown_bits();
                if unknown != 0 {
                    parts.push(format!("0x{unknown:X}"));
                }
                f.write_str(&parts.join(" | "))
            }
        }
    };
}

flag_set! {
    /// Buttons on an autopilot control head or remote.
    pub struct AutopilotButtons(u16) {
        const MINUS_ONE = 0x0001;
        const MINUS_TEN = 0x0002;
        const PLUS_ONE = 0x0004;
        const PLUS_TEN = 0x0008;
        const AUTO = 0x0010;
        const STANDBY = 0x0020;
        const TRACK = 0x0040;
        const DISP = 0x0080;
        /// Held for more than a second.
        const LONG_PRESS = 0x0100;
    }
}

flag_set! {
    /// Alarms reported by the autopilot.
    pub struct AutopilotAlarms(u8) {
        const OFF_COURSE = 0x04;
        const WIND_SHIFT = 0x08;
    }
}

flag_set! {
    /// Warnings reported by the course computer.
    pub struct CourseComputerWarnings(u8) {
        /// Automatic release: the autopilot dropped out of auto mode.
        const AUTO_RELEASE = 0x01;
        /// Confirmation of a course change to port is required.
        const COURSE_CHANGE_TO_PORT = 0x04;
        /// The drive has stopped.
        const DRIVE_FAILURE = 0x08;
    }
}
