//! Numeric encoding used by the power supply registers.
//!
//! Register values are 16-bit words holding a signed 5-bit exponent in the
//! upper bits and a signed 11-bit mantissa in the lower bits, both two's
//! complement. The value is `mantissa * 2^exponent`.

/// Smallest representable mantissa.
pub const MANTISSA_MIN: i16 = -1024;
/// Largest representable mantissa.
pub const MANTISSA_MAX: i16 = 1023;
/// Smallest representable exponent.
pub const EXPONENT_MIN: i8 = -16;
/// Largest representable exponent.
pub const EXPONENT_MAX: i8 = 15;

/// Exponent field, sign extended.
const fn exponent(word: u16) -> i32 {
    ((word as i16) >> 11) as i32
}

/// Mantissa field, sign extended.
const fn mantissa(word: u16) -> i32 {
    ((word as i32) << 21) >> 21
}

/// Decode a register word.
///
/// This is a total function, every 16-bit input has a value.
///
/// # Example
///
/// ```
/// use corsairmi_exporter::linear11;
///
/// assert_eq!(linear11(0x0000), 0.0);
/// assert_eq!(linear11(0xF8E6), 115.0);
/// assert_eq!(linear11(0xF87F), 63.5);
/// ```
#[must_use = "Why covert a value if you are not going to use the result?"]
pub fn linear11(word: u16) -> f64 {
    f64::from(mantissa(word)) * 2.0_f64.powi(exponent(word))
}

/// Encode a mantissa and exponent into a register word.
///
/// Returns `None` if either field is out of range.
///
/// # Example
///
/// ```
/// use corsairmi_exporter::{encode_linear11, linear11};
///
/// let word: u16 = encode_linear11(1, -1).unwrap();
/// assert_eq!(linear11(word), 0.5);
/// assert_eq!(encode_linear11(1024, 0), None);
/// ```
pub fn encode_linear11(mantissa: i16, exponent: i8) -> Option<u16> {
    if !(MANTISSA_MIN..=MANTISSA_MAX).contains(&mantissa)
        || !(EXPONENT_MIN..=EXPONENT_MAX).contains(&exponent)
    {
        return None;
    }
    let m: u16 = (mantissa as u16) & 0x07FF;
    let e: u16 = ((exponent as u16) & 0x1F) << 11;
    Some(e | m)
}

/// A 32-bit register word.
///
/// Only the low half carries an encoded value, the high half is kept as read
/// but never decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Wide(pub u32);

impl Wide {
    /// Low 16 bits, the encoded value.
    pub const fn encoded(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// High 16 bits, reserved by the firmware.
    pub const fn reserved(&self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Decoded value of the low half.
    ///
    /// ```
    /// use corsairmi_exporter::Wide;
    ///
    /// assert_eq!(Wide(0xABCD_D30A).value(), 12.15625);
    /// assert_eq!(Wide(0xABCD_D30A).reserved(), 0xABCD);
    /// ```
    #[must_use]
    pub fn value(&self) -> f64 {
        linear11(self.encoded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn decode_known_words() {
        assert_eq!(linear11(0), 0.0);
        assert_eq!(linear11(0xF087), 33.75);
        assert_eq!(linear11(0xF07D), 31.25);
        assert_eq!(linear11(0xF062), 24.5);
        assert_eq!(linear11(0x1000), 0.0);
        assert_eq!(linear11(0xF8E6), 115.0);
        assert_eq!(linear11(0x0809), 18.0);
        assert_eq!(linear11(0xD30A), 12.15625);
        assert_eq!(linear11(0xF003), 0.75);
        assert_eq!(linear11(0x0804), 8.0);
        assert_eq!(linear11(0xD141), 5.015625);
        assert_eq!(linear11(0xE01A), 1.625);
        assert_eq!(linear11(0xF80F), 7.5);
        assert_eq!(linear11(0xD0D3), 3.296875);
        assert_eq!(linear11(0xE00D), 0.8125);
        assert_eq!(linear11(0xF805), 2.5);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn decode_negative_fields() {
        // mantissa -1, exponent 0
        assert_eq!(linear11(0x07FF), -1.0);
        // mantissa -1024, exponent 15
        assert_eq!(linear11(0x7C00), -1024.0 * 32768.0);
        // mantissa 1023, exponent -16
        assert_eq!(linear11(0x83FF), 1023.0 / 65536.0);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn encode_examples() {
        assert_eq!(encode_linear11(0, 0), Some(0x0000));
        assert_eq!(linear11(encode_linear11(100, 0).unwrap()), 100.0);
        assert_eq!(linear11(encode_linear11(1, -1).unwrap()), 0.5);
        assert_eq!(linear11(encode_linear11(65, -1).unwrap()), 32.5);
    }

    #[test]
    fn encode_out_of_range() {
        assert_eq!(encode_linear11(1024, 0), None);
        assert_eq!(encode_linear11(-1025, 0), None);
        assert_eq!(encode_linear11(0, 16), None);
        assert_eq!(encode_linear11(0, -17), None);
    }

    #[test]
    fn wide_halves() {
        let w = Wide(0x1234_F805);
        assert_eq!(w.encoded(), 0xF805);
        assert_eq!(w.reserved(), 0x1234);
        assert!((w.value() - 2.5).abs() < f64::EPSILON);
    }
}
