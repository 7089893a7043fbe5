//! Parsing decimal, hexadecimal and octal text into doubles and floats.
//!
//! The lexer here only collects significant digits and a decimal exponent;
//! the correctly rounded conversion happens in [`fpconv_core::strtod`].

use bitflags::bitflags;
use log::debug;

use fpconv_core::ieee::Double;
use fpconv_core::simple_fp::SimpleFp;
use fpconv_core::strtod::{strtod_trimmed, strtof_trimmed};

use crate::errors::ParseError;

/// Decimal input keeps this many significant digits. Dropped non-zero
/// digits become a trailing sticky `1`, so the result stays exact enough
/// to round correctly.
pub const MAX_SIGNIFICANT_DIGITS: usize = 772;

// Decimal exponents saturate here while reading; anything this large is
// zero or infinity anyway.
const MAX_EXPONENT: i32 = i32::MAX / 2;

const DOUBLE_SIGNIFICAND_SIZE: u32 = 53;
const DOUBLE_DENORMAL_EXPONENT: i32 = -1074;
const SINGLE_SIGNIFICAND_SIZE: u32 = 24;
const SINGLE_DENORMAL_EXPONENT: i32 = -149;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StrtodFlags: u32 {
        /// `0x1F` style hexadecimal integers.
        const ALLOW_HEX = 1 << 0;
        /// Integers with a leading `0` are read as octal when all their
        /// digits are octal.
        const ALLOW_OCTALS = 1 << 1;
        /// Stop at the first character that does not continue the number.
        const ALLOW_TRAILING_JUNK = 1 << 2;
        const ALLOW_LEADING_SPACES = 1 << 3;
        const ALLOW_TRAILING_SPACES = 1 << 4;
        /// `- 1`
        const ALLOW_SPACES_AFTER_SIGN = 1 << 5;
        /// Case-insensitive infinity/NaN symbols and `0X` prefix.
        const ALLOW_CASE_INSENSITIVITY = 1 << 6;
        /// `0x1.8p3` style hexadecimal floats.
        const ALLOW_HEX_FLOATS = 1 << 7;
    }
}

/// Converts text to doubles or floats.
#[derive(Debug, Clone, PartialEq)]
pub struct StringToDoubleConverter {
    pub flags: StrtodFlags,
    /// Returned for empty (or, with space flags, all-space) input. `None`
    /// makes such input an error.
    pub empty_string_value: Option<f64>,
    pub infinity_symbol: Option<String>,
    pub nan_symbol: Option<String>,
    pub decimal_separator: u8,
    /// Accepted between two digits of the integral part, and ignored.
    pub thousands_separator: Option<u8>,
}

impl Default for StringToDoubleConverter {
    fn default() -> Self {
        Self {
            flags: StrtodFlags::empty(),
            empty_string_value: None,
            infinity_symbol: Some("inf".to_owned()),
            nan_symbol: Some("nan".to_owned()),
            decimal_separator: b'.',
            thousands_separator: None,
        }
    }
}

impl StringToDoubleConverter {
    /// ECMAScript's `StringToNumber`, except that junk is reported as an
    /// error instead of producing NaN.
    pub fn ecma_script() -> Self {
        Self {
            flags: StrtodFlags::ALLOW_HEX
                | StrtodFlags::ALLOW_LEADING_SPACES
                | StrtodFlags::ALLOW_TRAILING_SPACES,
            empty_string_value: Some(0.0),
            infinity_symbol: Some("Infinity".to_owned()),
            nan_symbol: Some("NaN".to_owned()),
            ..Self::default()
        }
    }

    /// Parses `input` as a double, returning the value and the number of
    /// bytes consumed (less than `input.len()` only with
    /// [`StrtodFlags::ALLOW_TRAILING_JUNK`]).
    pub fn string_to_double(&self, input: &[u8]) -> Result<(f64, usize), ParseError> {
        self.string_to_ieee(input, true)
    }

    /// Like [`Self::string_to_double`], rounding directly to the nearest
    /// `f32`.
    pub fn string_to_float(&self, input: &[u8]) -> Result<(f32, usize), ParseError> {
        // Values produced with read_as_double == false are exact floats.
        let (value, consumed) = self.string_to_ieee(input, false)?;
        Ok((value as f32, consumed))
    }

    fn string_to_ieee(&self, input: &[u8], read_as_double: bool) -> Result<(f64, usize), ParseError> {
        debug_assert_ne!(Some(self.decimal_separator), self.thousands_separator);
        let allow_leading_spaces = self.flags.contains(StrtodFlags::ALLOW_LEADING_SPACES);
        let allow_trailing_spaces = self.flags.contains(StrtodFlags::ALLOW_TRAILING_SPACES);
        let allow_trailing_junk = self.flags.contains(StrtodFlags::ALLOW_TRAILING_JUNK);
        let junk = |offset: usize| {
            debug!(
                "rejecting {:?}: unexpected character at offset {offset}",
                String::from_utf8_lossy(input)
            );
            ParseError::Junk(offset)
        };

        let mut s = Scanner::new(input, self.thousands_separator);
        if s.at_end() {
            return self.empty(0);
        }
        if allow_leading_spaces || allow_trailing_spaces {
            if !s.skip_whitespace() {
                return self.empty(s.pos);
            }
            if !allow_leading_spaces && s.pos != 0 {
                return Err(junk(0));
            }
        }

        let mut sign = false;
        if let Some(c @ (b'+' | b'-')) = s.peek() {
            sign = c == b'-';
            s.bump();
            let after_sign = s.pos;
            if !s.skip_whitespace() {
                return Err(junk(s.pos));
            }
            if !self.flags.contains(StrtodFlags::ALLOW_SPACES_AFTER_SIGN) && s.pos != after_sign {
                return Err(junk(after_sign));
            }
        }
        let signed = |value: f64| if sign { -value } else { value };

        let symbols = [
            (&self.infinity_symbol, f64::INFINITY),
            (&self.nan_symbol, f64::NAN),
        ];
        for (symbol, value) in symbols {
            let Some(symbol) = symbol.as_deref().map(str::as_bytes) else {
                continue;
            };
            let Some(&first) = symbol.first() else { continue };
            if s.peek().is_some_and(|c| self.chars_match(c, first)) {
                if !s.consume(symbol, |a, b| self.chars_match(a, b)) {
                    return Err(junk(s.pos));
                }
                let consumed = self.finish(&mut s).map_err(junk)?;
                return Ok((signed(value), consumed));
            }
        }

        let mut leading_zero = false;
        if s.peek() == Some(b'0') {
            if s.advance(10) {
                return Ok((signed(0.0), s.pos));
            }
            leading_zero = true;

            let hex_allowed = self
                .flags
                .intersects(StrtodFlags::ALLOW_HEX | StrtodFlags::ALLOW_HEX_FLOATS);
            if hex_allowed && s.peek().is_some_and(|c| self.chars_match(c, b'x')) {
                s.bump();
                if s.at_end() {
                    return Err(junk(s.pos));
                }
                let hex_float = self.flags.contains(StrtodFlags::ALLOW_HEX_FLOATS)
                    && is_hex_float(s.rest(), self.thousands_separator);
                let hex_integer = self.flags.contains(StrtodFlags::ALLOW_HEX)
                    && s.peek().is_some_and(|c| c.is_ascii_hexdigit());
                if !hex_float && !hex_integer {
                    return Err(junk(s.pos));
                }
                let value = read_hex(&mut s, hex_float, read_as_double);
                let consumed = self.finish(&mut s).map_err(junk)?;
                return Ok((signed(value), consumed));
            }

            while s.peek() == Some(b'0') {
                if s.advance(10) {
                    return Ok((signed(0.0), s.pos));
                }
            }
        }

        let mut octal = leading_zero && self.flags.contains(StrtodFlags::ALLOW_OCTALS);
        let mut digits = Vec::with_capacity(MAX_SIGNIFICANT_DIGITS + 1);
        let mut exponent: i32 = 0;
        let mut insignificant_digits: i32 = 0;
        let mut nonzero_digit_dropped = false;

        'number: {
            while let Some(c @ b'0'..=b'9') = s.peek() {
                if digits.len() < MAX_SIGNIFICANT_DIGITS {
                    digits.push(c);
                } else {
                    // Moved into the exponent.
                    insignificant_digits += 1;
                    nonzero_digit_dropped |= c != b'0';
                }
                octal &= c < b'8';
                if s.advance(10) {
                    break 'number;
                }
            }
            if digits.is_empty() {
                octal = false;
            }

            if s.peek() == Some(self.decimal_separator) {
                if octal {
                    if !allow_trailing_junk {
                        return Err(junk(s.pos));
                    }
                    break 'number;
                }
                s.bump();
                if s.at_end() {
                    if digits.is_empty() && !leading_zero {
                        return Err(junk(s.pos - 1));
                    }
                    break 'number;
                }

                if digits.is_empty() {
                    // Zeros between the point and the first significant
                    // digit only scale the value.
                    while s.peek() == Some(b'0') {
                        s.bump();
                        if s.at_end() {
                            return Ok((signed(0.0), s.pos));
                        }
                        exponent -= 1;
                    }
                }

                while let Some(c @ b'0'..=b'9') = s.peek() {
                    if digits.len() < MAX_SIGNIFICANT_DIGITS {
                        digits.push(c);
                        exponent -= 1;
                    } else {
                        nonzero_digit_dropped |= c != b'0';
                    }
                    s.bump();
                    if s.at_end() {
                        break 'number;
                    }
                }
            }

            // No digits at all, as in "." or "+e5".
            if !leading_zero && exponent == 0 && digits.is_empty() {
                return Err(junk(s.pos));
            }

            if let Some(b'e' | b'E') = s.peek() {
                if octal {
                    if !allow_trailing_junk {
                        return Err(junk(s.pos));
                    }
                    break 'number;
                }
                let junk_begin = s.pos;
                s.bump();
                let mut negative_exponent = false;
                if let Some(c @ (b'+' | b'-')) = s.peek() {
                    negative_exponent = c == b'-';
                    s.bump();
                }
                if !s.peek().is_some_and(|c| c.is_ascii_digit()) {
                    if allow_trailing_junk {
                        s.pos = junk_begin;
                        break 'number;
                    }
                    return Err(junk(s.pos));
                }

                let mut num: i32 = 0;
                while let Some(c @ b'0'..=b'9') = s.peek() {
                    num = num
                        .saturating_mul(10)
                        .saturating_add((c - b'0') as i32)
                        .min(MAX_EXPONENT);
                    s.bump();
                }
                exponent = exponent.saturating_add(if negative_exponent { -num } else { num });
            }
        }
        let consumed = self.finish(&mut s).map_err(junk)?;
        let exponent = exponent
            .saturating_add(insignificant_digits)
            .clamp(-MAX_EXPONENT, MAX_EXPONENT);

        if octal {
            let mut accumulator = RadixAccumulator::new(3);
            for &c in &digits {
                accumulator.push(c - b'0', false);
            }
            return Ok((signed(accumulator.to_value(read_as_double)), consumed));
        }

        let mut exponent = exponent;
        if nonzero_digit_dropped {
            digits.push(b'1');
            exponent -= 1;
        }
        // Leading zeros never make it into the buffer; trailing ones just
        // scale the value.
        while digits.last() == Some(&b'0') {
            digits.pop();
            exponent += 1;
        }

        let converted = if read_as_double {
            strtod_trimmed(&digits, exponent)
        } else {
            strtof_trimmed(&digits, exponent) as f64
        };
        Ok((signed(converted), consumed))
    }

    fn empty(&self, consumed: usize) -> Result<(f64, usize), ParseError> {
        match self.empty_string_value {
            Some(value) => Ok((value, consumed)),
            None => {
                debug!("rejecting empty input");
                Err(ParseError::Empty)
            }
        }
    }

    fn chars_match(&self, input: u8, expected: u8) -> bool {
        if self.flags.contains(StrtodFlags::ALLOW_CASE_INSENSITIVITY) {
            input.eq_ignore_ascii_case(&expected)
        } else {
            input == expected
        }
    }

    /// Handles whatever follows a complete number. Returns the number of
    /// bytes consumed, or the offset of the offending byte.
    fn finish(&self, s: &mut Scanner) -> Result<usize, usize> {
        if self.flags.contains(StrtodFlags::ALLOW_TRAILING_SPACES) {
            s.skip_whitespace();
        }
        if s.at_end() || self.flags.contains(StrtodFlags::ALLOW_TRAILING_JUNK) {
            Ok(s.pos)
        } else {
            Err(s.pos)
        }
    }
}

fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    separator: Option<u8>,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a [u8], separator: Option<u8>) -> Self {
        Self {
            input,
            pos: 0,
            separator,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    /// Steps over the current byte, and over a thousands separator that
    /// sits between it and another digit. Returns true at end of input.
    fn advance(&mut self, radix: u32) -> bool {
        let was_digit = self.peek().is_some_and(|c| is_digit(c, radix));
        self.pos += 1;
        if let Some(separator) = self.separator {
            let next_is_digit = self
                .input
                .get(self.pos + 1)
                .is_some_and(|&c| is_digit(c, radix));
            if was_digit && self.peek() == Some(separator) && next_is_digit {
                self.pos += 1;
            }
        }
        self.at_end()
    }

    /// Skips whitespace; returns whether anything else follows.
    fn skip_whitespace(&mut self) -> bool {
        while self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
        !self.at_end()
    }

    /// Consumes `expected` if the input continues with it.
    fn consume(&mut self, expected: &[u8], eq: impl Fn(u8, u8) -> bool) -> bool {
        let rest = self.rest();
        if rest.len() < expected.len() || !rest.iter().zip(expected).all(|(&a, &b)| eq(a, b)) {
            return false;
        }
        self.pos += expected.len();
        true
    }
}

fn is_digit(c: u8, radix: u32) -> bool {
    (c as char).is_digit(radix)
}

/// Checks for `hexdigits[.hexdigits]p[+-]digits` with at least one hex
/// digit, the `0x` prefix already consumed.
fn is_hex_float(input: &[u8], separator: Option<u8>) -> bool {
    let mut i = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    loop {
        match input.get(i) {
            Some(c) if c.is_ascii_hexdigit() => seen_digit = true,
            Some(b'.') if !seen_dot => seen_dot = true,
            Some(b'p' | b'P') => break,
            Some(&c)
                if Some(c) == separator
                    && i > 0
                    && input[i - 1].is_ascii_hexdigit()
                    && input.get(i + 1).is_some_and(u8::is_ascii_hexdigit) => {}
            _ => return false,
        }
        i += 1;
    }
    if !seen_digit {
        return false;
    }
    i += 1;
    if let Some(b'+' | b'-') = input.get(i) {
        i += 1;
    }
    input.get(i).is_some_and(u8::is_ascii_digit)
}

/// Reads hex digits (and for hex floats the fraction and binary exponent)
/// after the `0x` prefix. The scanner stops at the first byte that is not
/// part of the number.
fn read_hex(s: &mut Scanner, hex_float: bool, read_as_double: bool) -> f64 {
    let mut accumulator = RadixAccumulator::new(4);
    let mut post_decimal = false;
    loop {
        match s.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                accumulator.push((c as char).to_digit(16).unwrap_or(0) as u8, post_decimal);
            }
            Some(b'.') if hex_float && !post_decimal => post_decimal = true,
            _ => break,
        }
        if s.advance(16) {
            break;
        }
    }

    if hex_float && matches!(s.peek(), Some(b'p' | b'P')) {
        s.bump();
        let mut negative = false;
        if let Some(c @ (b'+' | b'-')) = s.peek() {
            negative = c == b'-';
            s.bump();
        }
        let mut written_exponent: i32 = 0;
        while let Some(c @ b'0'..=b'9') = s.peek() {
            written_exponent = written_exponent
                .saturating_mul(10)
                .saturating_add((c - b'0') as i32)
                .min(MAX_EXPONENT);
            s.bump();
        }
        accumulator.scale(if negative { -written_exponent } else { written_exponent });
    }
    accumulator.to_value(read_as_double)
}

/// Collects digits of a power-of-two radix into a 64-bit significand,
/// remembering whether any dropped low digit was non-zero.
struct RadixAccumulator {
    bits_per_digit: u32,
    significand: u64,
    exponent: i32,
    sticky: bool,
}

impl RadixAccumulator {
    fn new(bits_per_digit: u32) -> Self {
        Self {
            bits_per_digit,
            significand: 0,
            exponent: 0,
            sticky: false,
        }
    }

    fn push(&mut self, digit: u8, post_decimal: bool) {
        if self.significand >> (63 - self.bits_per_digit) == 0 {
            self.significand = (self.significand << self.bits_per_digit) | digit as u64;
            if post_decimal {
                self.exponent -= self.bits_per_digit as i32;
            }
        } else {
            self.sticky |= digit != 0;
            if !post_decimal {
                self.exponent += self.bits_per_digit as i32;
            }
        }
    }

    fn scale(&mut self, binary_exponent: i32) {
        self.exponent = self
            .exponent
            .saturating_add(binary_exponent)
            .clamp(-MAX_EXPONENT, MAX_EXPONENT);
    }

    /// Rounds `significand * 2^exponent` to the nearest double or float
    /// (ties to even), including into the denormal range.
    fn to_value(&self, read_as_double: bool) -> f64 {
        if self.significand == 0 {
            return 0.0;
        }
        let (precision, denormal_exponent) = if read_as_double {
            (DOUBLE_SIGNIFICAND_SIZE, DOUBLE_DENORMAL_EXPONENT)
        } else {
            (SINGLE_SIGNIFICAND_SIZE, SINGLE_DENORMAL_EXPONENT)
        };

        // With a sticky digit there are at least 60 significant bits, so
        // the lowest bit is far below the rounding position.
        let significand = self.significand | self.sticky as u64;
        let bit_length = u64::BITS - significand.leading_zeros();
        let lsb_exponent = (self.exponent + bit_length as i32 - precision as i32).max(denormal_exponent);
        let shift = lsb_exponent.saturating_sub(self.exponent);

        let rounded = if shift <= 0 {
            significand << -shift
        } else if shift >= 64 {
            // Below half the smallest denormal.
            0
        } else {
            let kept = significand >> shift;
            let dropped = significand & ((1 << shift) - 1);
            let half = 1 << (shift - 1);
            if dropped > half || (dropped == half && kept & 1 == 1) {
                kept + 1
            } else {
                kept
            }
        };
        if rounded == 0 {
            return 0.0;
        }
        // An exact double; a float result is also exact as a double unless
        // it overflows, which the double conversion turns into infinity.
        let value = Double::from_simple_fp(SimpleFp::new(rounded, lsb_exponent)).value();
        if !read_as_double && value > f32::MAX as f64 {
            return f64::INFINITY;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(converter: &StringToDoubleConverter, input: &str) -> Result<(f64, usize), ParseError> {
        converter.string_to_double(input.as_bytes())
    }

    fn value(converter: &StringToDoubleConverter, input: &str) -> f64 {
        let (value, consumed) = parse(converter, input).unwrap();
        assert_eq!(consumed, input.len(), "{input:?}");
        value
    }

    fn permissive() -> StringToDoubleConverter {
        StringToDoubleConverter {
            flags: StrtodFlags::all(),
            ..StringToDoubleConverter::default()
        }
    }

    #[test]
    fn decimal() {
        let c = StringToDoubleConverter::default();
        assert_eq!(value(&c, "0"), 0.0);
        assert_eq!(value(&c, "1"), 1.0);
        assert_eq!(value(&c, "-1.5"), -1.5);
        assert_eq!(value(&c, "+12.25e1"), 122.5);
        assert_eq!(value(&c, "0.1"), 0.1);
        assert_eq!(value(&c, ".5"), 0.5);
        assert_eq!(value(&c, "5."), 5.0);
        assert_eq!(value(&c, "0.000001"), 1e-6);
        assert_eq!(value(&c, "1e23"), 1e23);
        assert_eq!(value(&c, "1E-5"), 1e-5);
        assert_eq!(value(&c, "123456789012345678901234567890"), 1.2345678901234568e29);
        assert_eq!(value(&c, "1e400"), f64::INFINITY);
        assert_eq!(value(&c, "-1e400"), f64::NEG_INFINITY);
        assert_eq!(value(&c, "1e-400"), 0.0);
        assert_eq!(value(&c, "1e99999999999999999999"), f64::INFINITY);
        assert_eq!(value(&c, "0.0e99999999999999999999"), 0.0);
    }

    #[test]
    fn zeros_keep_their_sign() {
        let c = StringToDoubleConverter::default();
        assert!(value(&c, "-0").is_sign_negative());
        assert!(value(&c, "-0.000").is_sign_negative());
        assert!(value(&c, "-0e10").is_sign_negative());
        assert!(value(&c, "0.0").is_sign_positive());
    }

    #[test]
    fn long_decimal_input_rounds_correctly() {
        let c = StringToDoubleConverter::default();
        // Halfway between 1 and the next double, followed by many zeros and
        // then a non-zero digit: rounds up.
        let halfway = "1.00000000000000011102230246251565404236316680908203125";
        let above = format!("{halfway}{}1", "0".repeat(1000));
        assert_eq!(value(&c, halfway), 1.0);
        assert_eq!(value(&c, &above), 1.0000000000000002);
        let below = format!("1.00000000000000011102230246251565404236316680908203124{}9", "9".repeat(1000));
        assert_eq!(value(&c, &below), 1.0);
    }

    #[test]
    fn rejects_junk() {
        let c = StringToDoubleConverter::default();
        assert_eq!(parse(&c, ""), Err(ParseError::Empty));
        assert_eq!(parse(&c, "."), Err(ParseError::Junk(0)));
        assert_eq!(parse(&c, "+"), Err(ParseError::Junk(1)));
        assert_eq!(parse(&c, "e5"), Err(ParseError::Junk(0)));
        assert_eq!(parse(&c, "1x"), Err(ParseError::Junk(1)));
        assert_eq!(parse(&c, "1e"), Err(ParseError::Junk(2)));
        assert_eq!(parse(&c, "1e+"), Err(ParseError::Junk(3)));
        assert_eq!(parse(&c, " 1"), Err(ParseError::Junk(0)));
        assert_eq!(parse(&c, "1 "), Err(ParseError::Junk(1)));
        assert_eq!(parse(&c, "- 1"), Err(ParseError::Junk(1)));
        assert_eq!(parse(&c, "0x10"), Err(ParseError::Junk(1)));
        assert_eq!(parse(&c, "in"), Err(ParseError::Junk(0)));
    }

    #[test]
    fn trailing_junk() {
        let c = StringToDoubleConverter {
            flags: StrtodFlags::ALLOW_TRAILING_JUNK,
            ..StringToDoubleConverter::default()
        };
        assert_eq!(parse(&c, "1.5abc"), Ok((1.5, 3)));
        assert_eq!(parse(&c, "1e"), Ok((1.0, 1)));
        assert_eq!(parse(&c, "1e+x"), Ok((1.0, 1)));
        assert_eq!(parse(&c, "12 34"), Ok((12.0, 2)));
        assert_eq!(parse(&c, "infinity"), Ok((f64::INFINITY, 3)));
    }

    #[test]
    fn spaces() {
        let c = permissive();
        assert_eq!(parse(&c, "  1.5  "), Ok((1.5, 7)));
        assert_eq!(parse(&c, "- 2"), Ok((-2.0, 3)));
        assert_eq!(parse(&c, "   "), Err(ParseError::Empty));
        let c = StringToDoubleConverter::ecma_script();
        assert_eq!(parse(&c, "   "), Ok((0.0, 3)));
        assert_eq!(parse(&c, ""), Ok((0.0, 0)));
        assert_eq!(parse(&c, "\t\n 42 \r"), Ok((42.0, 7)));
        assert_eq!(parse(&c, "4 2"), Err(ParseError::Junk(2)));
    }

    #[test]
    fn symbols() {
        let c = StringToDoubleConverter::ecma_script();
        assert_eq!(value(&c, "Infinity"), f64::INFINITY);
        assert_eq!(value(&c, "-Infinity"), f64::NEG_INFINITY);
        assert!(value(&c, "NaN").is_nan());
        assert_eq!(parse(&c, "infinity"), Err(ParseError::Junk(0)));
        assert_eq!(parse(&c, "Infinit"), Err(ParseError::Junk(0)));
        assert_eq!(parse(&c, "Infinityx"), Err(ParseError::Junk(8)));
        let c = permissive();
        assert_eq!(value(&c, "INF"), f64::INFINITY);
        assert!(value(&c, "-nAn").is_nan());
    }

    #[test]
    fn hex_integers() {
        let c = permissive();
        assert_eq!(value(&c, "0x10"), 16.0);
        assert_eq!(value(&c, "0XfF"), 255.0);
        assert_eq!(value(&c, "-0x0"), -0.0);
        assert_eq!(value(&c, "0x1fffffffffffff"), 9007199254740991.0);
        // 2^53 + 1 ties to even; 2^53 + 3 rounds up.
        assert_eq!(value(&c, "0x20000000000001"), 9007199254740992.0);
        assert_eq!(value(&c, "0x20000000000003"), 9007199254740996.0);
        // The sticky tail breaks the tie.
        assert_eq!(value(&c, "0x200000000000010000000000000001"), 9007199254740994.0 * 2f64.powi(64));
        assert_eq!(parse(&c, "0x"), Err(ParseError::Junk(2)));
        assert_eq!(parse(&c, "0xg"), Err(ParseError::Junk(2)));
    }

    #[test]
    fn hex_floats() {
        let c = StringToDoubleConverter {
            flags: StrtodFlags::ALLOW_HEX_FLOATS,
            ..StringToDoubleConverter::default()
        };
        assert_eq!(value(&c, "0x1.8p1"), 3.0);
        assert_eq!(value(&c, "0x.8p0"), 0.5);
        assert_eq!(value(&c, "0x10p-4"), 1.0);
        assert_eq!(value(&c, "-0x1p-1074"), -5e-324);
        assert_eq!(value(&c, "0x1p-1075"), 0.0);
        assert_eq!(value(&c, "0x1.8p-1075"), 5e-324);
        assert_eq!(value(&c, "0x1.fffffffffffffp1023"), f64::MAX);
        assert_eq!(value(&c, "0x1p1024"), f64::INFINITY);
        assert_eq!(value(&c, "0x1p99999999999"), f64::INFINITY);
        // Denormal results round once, from the full significand.
        assert_eq!(value(&c, "0x1.7ffffffffffffp-1073"), f64::from_bits(3));
        assert_eq!(parse(&c, "0x1.8"), Err(ParseError::Junk(2)));
        assert_eq!(parse(&c, "0x1p"), Err(ParseError::Junk(2)));
    }

    #[test]
    fn octals() {
        let c = StringToDoubleConverter {
            flags: StrtodFlags::ALLOW_OCTALS,
            ..StringToDoubleConverter::default()
        };
        assert_eq!(value(&c, "017"), 15.0);
        assert_eq!(value(&c, "-0777"), -511.0);
        assert_eq!(value(&c, "019"), 19.0);
        assert_eq!(value(&c, "0.5"), 0.5);
        assert_eq!(parse(&c, "017.5"), Err(ParseError::Junk(3)));
        assert_eq!(parse(&c, "017e1"), Err(ParseError::Junk(3)));
    }

    #[test]
    fn thousands_separator() {
        let c = StringToDoubleConverter {
            thousands_separator: Some(b','),
            ..StringToDoubleConverter::default()
        };
        assert_eq!(value(&c, "1,234,567.5"), 1234567.5);
        assert_eq!(parse(&c, "1,,234"), Err(ParseError::Junk(1)));
        assert_eq!(parse(&c, "1,"), Err(ParseError::Junk(1)));
        assert_eq!(parse(&c, ",1"), Err(ParseError::Junk(0)));
    }

    #[test]
    fn decimal_separator() {
        let c = StringToDoubleConverter {
            decimal_separator: b',',
            thousands_separator: Some(b'.'),
            ..StringToDoubleConverter::default()
        };
        assert_eq!(value(&c, "1.234,5"), 1234.5);
    }

    #[test]
    fn floats_round_once() {
        let c = StringToDoubleConverter::default();
        let (v, _) = c.string_to_float(b"1.00000005960464478383004674").unwrap();
        assert_eq!(v, f32::from_bits(0x3F80_0001));
        let (v, _) = c.string_to_float(b"3.4028236e38").unwrap();
        assert_eq!(v, f32::INFINITY);
        let (v, _) = c.string_to_float(b"0.1").unwrap();
        assert_eq!(v, 0.1f32);

        let c = permissive();
        let (v, _) = c.string_to_float(b"0x1000001").unwrap();
        assert_eq!(v, 16777216.0);
        let (v, _) = c.string_to_float(b"0x1000003").unwrap();
        assert_eq!(v, 16777220.0);
        let (v, _) = c.string_to_float(b"0x1p-150").unwrap();
        assert_eq!(v, 0.0);
        let (v, _) = c.string_to_float(b"0x1.000002p-150").unwrap();
        assert_eq!(v, f32::from_bits(1));
        let (v, _) = c.string_to_float(b"0x1p128").unwrap();
        assert_eq!(v, f32::INFINITY);
    }
}
