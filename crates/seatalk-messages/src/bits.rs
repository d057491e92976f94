//! Bit-packing helpers shared by the per-kind codecs.
//!
//! Seatalk1 squeezes values into nibbles and spare bits of neighbouring
//! bytes. The layouts used by more than one kind live here.

use crate::error::{MessageError, Result};

/// Number of set bits in the two heading bits of the `u` nibble.
///
/// Only `0x0`, `0x4`, `0x8` and `0xC` are possible after masking with `0xC`;
/// anything else means the caller forgot to mask.
pub fn bit_count(nibble: u8) -> Result<u8> {
    match nibble {
        0x0 => Ok(0),
        0x4 | 0x8 => Ok(1),
        0xC => Ok(2),
        value => Err(MessageError::InvalidBits {
            field: "heading nibble",
            value,
        }),
    }
}

/// Reconstruct a compass heading from the `u` nibble and the `vw` byte.
///
/// `heading = (u & 3) * 90 + (vw & 0x3F) * 2 + bit_count(u & 0xC)`, folded
/// into `[0, 360)`. The sum can reach 360 (quadrant 3, `vw` 44, both odd
/// bits set), which is how north is sent while turning to starboard.
pub fn decode_heading(u: u8, vw: u8) -> Result<u16> {
    let quadrant = u16::from(u & 0x3) * 90;
    let coarse = u16::from(vw & 0x3F) * 2;
    let fine = u16::from(bit_count(u & 0xC)?);
    Ok((quadrant + coarse + fine) % 360)
}

/// Split a heading into the `u` nibble and the low six bits of `vw`.
///
/// Bit `0x8` of `u` doubles as the turn direction flag, so the odd-degree
/// bits are chosen to keep it set when turning to starboard and clear when
/// turning to port. Decoding the result with [`decode_heading`] yields the
/// rounded heading.
pub fn encode_heading(degrees: f64, starboard: bool) -> (u8, u8) {
    let heading = round_degrees(degrees, 360);
    let quadrant = (heading / 90) as u8;
    let within = (heading % 90) as u8;

    if !starboard {
        let odd = within % 2;
        return (quadrant | (odd << 2), within / 2);
    }
    if within % 2 == 1 {
        return (quadrant | 0x8, within / 2);
    }
    if within == 0 {
        // Two bits set add 2; borrow 90 from the previous quadrant.
        return ((quadrant + 3) % 4 | 0xC, 44);
    }
    (quadrant | 0xC, (within - 2) / 2)
}

/// Desired autopilot course from the top two bits of `vw` and a half-degree
/// byte.
pub fn decode_course(vw: u8, half_degrees: u8) -> f64 {
    f64::from(vw >> 6) * 90.0 + f64::from(half_degrees) / 2.0
}

/// Split a course into the top two bits of `vw` (already shifted into place)
/// and the half-degree byte.
pub fn encode_course(degrees: f64) -> (u8, u8) {
    let halves = round_degrees(degrees * 2.0, 720);
    let quadrant = (halves / 180) as u8;
    ((quadrant << 6), (halves % 180) as u8)
}

/// Round to the nearest whole unit and fold into `[0, modulus)`.
pub fn round_degrees(value: f64, modulus: u32) -> u32 {
    let m = f64::from(modulus);
    let rounded = value.round().rem_euclid(m);
    (rounded as u32) % modulus
}

/// Whether `b` is the bitwise complement of `a`.
pub fn is_complement(a: u8, b: u8) -> bool {
    a ^ b == 0xFF
}

/// Unpack four 6-bit values from three bytes.
///
/// ```text
/// c1 = a & 0x3F
/// c2 = (b & 0x0F) << 2 | a >> 6
/// c3 = (c & 0x03) << 4 | b >> 4
/// c4 = c >> 2
/// ```
pub fn unpack_sixbit([a, b, c]: [u8; 3]) -> [u8; 4] {
    [
        a & 0x3F,
        ((b & 0x0F) << 2) | (a >> 6),
        ((c & 0x03) << 4) | (b >> 4),
        c >> 2,
    ]
}

/// Inverse of [`unpack_sixbit`]. Inputs above `0x3F` are masked.
pub fn pack_sixbit(values: [u8; 4]) -> [u8; 3] {
    let [c1, c2, c3, c4] = values.map(|v| v & 0x3F);
    [
        c1 | ((c2 & 0x03) << 6),
        (c2 >> 2) | ((c3 & 0x0F) << 4),
        (c3 >> 4) | (c4 << 2),
    ]
}
