//! Formatting doubles (and floats) as text.

use bitflags::bitflags;
use log::debug;

use fpconv_core::{DIGITS_BUFFER_SIZE, DtoaMode, double_to_ascii};

use crate::errors::FormatError;

/// Largest `digits_after_point` accepted by [`DoubleToStringConverter::to_fixed`].
pub const MAX_FIXED_DIGITS_AFTER_POINT: i32 = 100;
/// [`DoubleToStringConverter::to_fixed`] rejects values of this magnitude
/// and above.
pub const FIRST_NON_FIXED: f64 = 1e60;
/// Largest digit count accepted by [`DoubleToStringConverter::to_exponential`].
pub const MAX_EXPONENTIAL_DIGITS: i32 = 120;
pub const MIN_PRECISION_DIGITS: i32 = 1;
pub const MAX_PRECISION_DIGITS: i32 = 120;

// Exponents are at most 4 digits long; wider padding is ignored.
const MAX_EXPONENT_LENGTH: i32 = 5;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DtoaFlags: u32 {
        /// `1e+5` rather than `1e5`.
        const EMIT_POSITIVE_EXPONENT_SIGN = 1 << 0;
        /// `12.` rather than `12` when no digits follow the point.
        const EMIT_TRAILING_DECIMAL_POINT = 1 << 1;
        /// `12.0` rather than `12.` (needs `EMIT_TRAILING_DECIMAL_POINT`).
        const EMIT_TRAILING_ZERO_AFTER_POINT = 1 << 2;
        /// Print negative zero as `0`.
        const UNIQUE_ZERO = 1 << 3;
        /// Drop trailing zeros after the point in precision mode.
        const NO_TRAILING_ZERO = 1 << 4;
    }
}

/// Converts doubles to decimal text in several notations.
///
/// Shortest output uses decimal notation when the decimal exponent `e` (as
/// in `d.ddd * 10^e`) satisfies `decimal_in_shortest_low <= e <
/// decimal_in_shortest_high`, and exponential notation otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleToStringConverter {
    pub flags: DtoaFlags,
    pub infinity_symbol: Option<String>,
    pub nan_symbol: Option<String>,
    pub exponent_character: u8,
    pub decimal_in_shortest_low: i32,
    pub decimal_in_shortest_high: i32,
    pub max_leading_padding_zeroes_in_precision_mode: i32,
    pub max_trailing_padding_zeroes_in_precision_mode: i32,
    /// Exponents are zero-padded to at least this many digits.
    pub min_exponent_width: i32,
}

impl Default for DoubleToStringConverter {
    fn default() -> Self {
        Self {
            flags: DtoaFlags::EMIT_POSITIVE_EXPONENT_SIGN | DtoaFlags::UNIQUE_ZERO,
            infinity_symbol: Some("inf".to_owned()),
            nan_symbol: Some("nan".to_owned()),
            exponent_character: b'e',
            decimal_in_shortest_low: -6,
            decimal_in_shortest_high: 21,
            max_leading_padding_zeroes_in_precision_mode: 6,
            max_trailing_padding_zeroes_in_precision_mode: 0,
            min_exponent_width: 0,
        }
    }
}

impl DoubleToStringConverter {
    /// The conversions of ECMAScript's `Number.prototype.toString`,
    /// `toFixed`, `toExponential` and `toPrecision`.
    pub fn ecma_script() -> Self {
        Self {
            infinity_symbol: Some("Infinity".to_owned()),
            nan_symbol: Some("NaN".to_owned()),
            ..Self::default()
        }
    }

    /// Appends the shortest representation that reads back as `value`.
    pub fn to_shortest(&self, value: f64, out: &mut String) -> Result<(), FormatError> {
        self.to_shortest_ieee_number(value, DtoaMode::Shortest, out)
    }

    /// Appends the shortest representation that reads back as `value` when
    /// parsed as an `f32`.
    pub fn to_shortest_single(&self, value: f32, out: &mut String) -> Result<(), FormatError> {
        self.to_shortest_ieee_number(value as f64, DtoaMode::ShortestSingle, out)
    }

    fn to_shortest_ieee_number(
        &self,
        value: f64,
        mode: DtoaMode,
        out: &mut String,
    ) -> Result<(), FormatError> {
        if !value.is_finite() {
            return self.handle_special_values(value, out);
        }

        let mut buffer = [0u8; DIGITS_BUFFER_SIZE];
        let (negative, digits) = double_to_ascii(value, mode, 0, &mut buffer);
        let digits_str = &buffer[..digits.length];

        self.push_sign(negative, value, out);
        let exponent = digits.point - 1;
        if self.decimal_in_shortest_low <= exponent && exponent < self.decimal_in_shortest_high {
            let digits_after_point = (digits.length as i32 - digits.point).max(0);
            self.create_decimal_representation(digits_str, digits.point, digits_after_point, out);
        } else {
            self.create_exponential_representation(digits_str, exponent, out);
        }
        Ok(())
    }

    /// Appends `value` rounded to exactly `digits_after_point` places after
    /// the point, in decimal notation. Ties round to even.
    pub fn to_fixed(
        &self,
        value: f64,
        digits_after_point: i32,
        out: &mut String,
    ) -> Result<(), FormatError> {
        if !value.is_finite() {
            return self.handle_special_values(value, out);
        }
        check_digits(digits_after_point, 0, MAX_FIXED_DIGITS_AFTER_POINT)?;
        if value.abs() >= FIRST_NON_FIXED {
            debug!("{value:e} is too large for fixed notation");
            return Err(FormatError::TooLargeForFixed(value));
        }

        let mut buffer = [0u8; DIGITS_BUFFER_SIZE];
        let (negative, digits) =
            double_to_ascii(value, DtoaMode::Fixed, digits_after_point, &mut buffer);

        self.push_sign(negative, value, out);
        self.create_decimal_representation(
            &buffer[..digits.length],
            digits.point,
            digits_after_point,
            out,
        );
        Ok(())
    }

    /// Appends `value` in exponential notation with `digits_after_point`
    /// digits after the point, or with the shortest digits if `None`.
    pub fn to_exponential(
        &self,
        value: f64,
        digits_after_point: Option<i32>,
        out: &mut String,
    ) -> Result<(), FormatError> {
        if !value.is_finite() {
            return self.handle_special_values(value, out);
        }

        let mut buffer = [0u8; DIGITS_BUFFER_SIZE];
        let (negative, digits) = match digits_after_point {
            None => double_to_ascii(value, DtoaMode::Shortest, 0, &mut buffer),
            Some(requested) => {
                check_digits(requested, 0, MAX_EXPONENTIAL_DIGITS)?;
                let requested_digits = requested + 1;
                let (negative, mut digits) =
                    double_to_ascii(value, DtoaMode::Precision, requested_digits, &mut buffer);
                debug_assert!(digits.length <= requested_digits as usize);
                // Zero comes back as a single digit.
                buffer[digits.length..requested_digits as usize].fill(b'0');
                digits.length = requested_digits as usize;
                (negative, digits)
            }
        };

        self.push_sign(negative, value, out);
        self.create_exponential_representation(&buffer[..digits.length], digits.point - 1, out);
        Ok(())
    }

    /// Appends `value` with `precision` significant digits, in decimal
    /// notation unless that would need more padding zeros than configured.
    pub fn to_precision(
        &self,
        value: f64,
        precision: i32,
        out: &mut String,
    ) -> Result<(), FormatError> {
        if !value.is_finite() {
            return self.handle_special_values(value, out);
        }
        check_digits(precision, MIN_PRECISION_DIGITS, MAX_PRECISION_DIGITS)?;

        let mut buffer = [0u8; DIGITS_BUFFER_SIZE];
        let (negative, digits) = double_to_ascii(value, DtoaMode::Precision, precision, &mut buffer);
        debug_assert!(digits.length <= precision as usize);
        let mut length = digits.length;
        let mut precision = precision;
        let decimal_point = digits.point;

        self.push_sign(negative, value, out);

        let exponent = decimal_point - 1;
        let extra_zero = self.flags.contains(DtoaFlags::EMIT_TRAILING_ZERO_AFTER_POINT) as i32;
        let as_exponential = -decimal_point + 1 > self.max_leading_padding_zeroes_in_precision_mode
            || decimal_point - precision + extra_zero
                > self.max_trailing_padding_zeroes_in_precision_mode;

        if self.flags.contains(DtoaFlags::NO_TRAILING_ZERO) {
            // Everything after the first digit is fractional in exponential
            // notation.
            let stop = if as_exponential { 1 } else { decimal_point.max(1) as usize };
            while length > stop && buffer[length - 1] == b'0' {
                length -= 1;
            }
            precision = precision.min(length as i32);
        }

        if as_exponential {
            buffer[length..precision as usize].fill(b'0');
            self.create_exponential_representation(&buffer[..precision as usize], exponent, out);
        } else {
            self.create_decimal_representation(
                &buffer[..length],
                decimal_point,
                (precision - decimal_point).max(0),
                out,
            );
        }
        Ok(())
    }

    fn handle_special_values(&self, value: f64, out: &mut String) -> Result<(), FormatError> {
        if value.is_infinite() {
            let Some(symbol) = &self.infinity_symbol else {
                debug!("no infinity symbol configured");
                return Err(FormatError::NoSymbol("infinity"));
            };
            if value < 0.0 {
                out.push('-');
            }
            out.push_str(symbol);
            return Ok(());
        }
        let Some(symbol) = &self.nan_symbol else {
            debug!("no NaN symbol configured");
            return Err(FormatError::NoSymbol("NaN"));
        };
        out.push_str(symbol);
        Ok(())
    }

    fn push_sign(&self, negative: bool, value: f64, out: &mut String) {
        if negative && (value != 0.0 || !self.flags.contains(DtoaFlags::UNIQUE_ZERO)) {
            out.push('-');
        }
    }

    /// `d.ddde+x`. `digits` must not be empty.
    fn create_exponential_representation(&self, digits: &[u8], exponent: i32, out: &mut String) {
        debug_assert!(!digits.is_empty());
        out.push(digits[0] as char);
        if digits.len() > 1 {
            out.push('.');
            push_ascii(out, &digits[1..]);
        }
        out.push(self.exponent_character as char);
        if exponent < 0 {
            out.push('-');
        } else if self.flags.contains(DtoaFlags::EMIT_POSITIVE_EXPONENT_SIGN) {
            out.push('+');
        }
        let exponent = exponent.unsigned_abs();
        debug_assert!(exponent < 10_000);
        let width = self.min_exponent_width.clamp(0, MAX_EXPONENT_LENGTH) as usize;
        out.push_str(&format!("{exponent:0width$}"));
    }

    /// Decimal notation with exactly `digits_after_point` digits after the
    /// point, padding with zeros as needed.
    fn create_decimal_representation(
        &self,
        digits: &[u8],
        decimal_point: i32,
        digits_after_point: i32,
        out: &mut String,
    ) {
        let length = digits.len() as i32;
        if decimal_point <= 0 {
            // "0.00000decimal_rep" or "0.000decimal_rep00"
            out.push('0');
            if digits_after_point > 0 {
                out.push('.');
                push_zeros(out, -decimal_point);
                debug_assert!(length <= digits_after_point + decimal_point);
                push_ascii(out, digits);
                push_zeros(out, digits_after_point + decimal_point - length);
            }
        } else if decimal_point >= length {
            // "decimal_rep0000.00000" or "decimal_rep.0000"
            push_ascii(out, digits);
            push_zeros(out, decimal_point - length);
            if digits_after_point > 0 {
                out.push('.');
                push_zeros(out, digits_after_point);
            }
        } else {
            // "decima.l_rep000"
            debug_assert!(digits_after_point > 0);
            let split = decimal_point as usize;
            push_ascii(out, &digits[..split]);
            out.push('.');
            push_ascii(out, &digits[split..]);
            push_zeros(out, digits_after_point - (length - decimal_point));
        }
        if digits_after_point == 0 {
            if self.flags.contains(DtoaFlags::EMIT_TRAILING_DECIMAL_POINT) {
                out.push('.');
            }
            if self.flags.contains(DtoaFlags::EMIT_TRAILING_ZERO_AFTER_POINT) {
                out.push('0');
            }
        }
    }
}

fn check_digits(requested: i32, min: i32, max: i32) -> Result<(), FormatError> {
    if (min..=max).contains(&requested) {
        Ok(())
    } else {
        debug!("digit count {requested} outside {min}..={max}");
        Err(FormatError::DigitsOutOfRange { requested, min, max })
    }
}

fn push_ascii(out: &mut String, digits: &[u8]) {
    out.extend(digits.iter().map(|&c| c as char));
}

fn push_zeros(out: &mut String, count: i32) {
    out.extend(std::iter::repeat_n('0', count.max(0) as usize));
}
