//! Entry point that picks the fast generator when it can and falls back to
//! the exact one.

use log::trace;

use crate::Digits;
use crate::bignum_dtoa::{BignumDtoaMode, bignum_dtoa};
use crate::fast_dtoa::{FastDtoaMode, fast_dtoa};
use crate::fixed_dtoa::fast_fixed_dtoa;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtoaMode {
    /// Shortest digits that read back as the same double.
    Shortest,
    /// Shortest digits that read back as the same float. The input must be
    /// exactly representable as an `f32`.
    ShortestSingle,
    /// Digits up to `requested_digits` places after the decimal point, with
    /// trailing zeros trimmed.
    Fixed,
    /// Exactly `requested_digits` significant digits.
    Precision,
}

/// Converts the magnitude of `v` to decimal digits, returning whether `v`
/// is negative together with the digit string's length and decimal point.
///
/// `v` must be finite. Zero produces `"0"` with point 1, except in
/// [`DtoaMode::Precision`] with zero requested digits, which produces
/// nothing.
///
/// The buffer must be large enough for the result: 17 bytes in the shortest
/// modes, `requested_digits` in precision mode, and in fixed mode the
/// number of integral digits plus `requested_digits`.
pub fn double_to_ascii(
    v: f64,
    mode: DtoaMode,
    requested_digits: i32,
    buffer: &mut [u8],
) -> (bool, Digits) {
    debug_assert!(v.is_finite());
    debug_assert!(
        matches!(mode, DtoaMode::Shortest | DtoaMode::ShortestSingle) || requested_digits >= 0
    );

    let negative = v.is_sign_negative();
    let v = v.abs();

    if mode == DtoaMode::Precision && requested_digits == 0 {
        return (negative, Digits { length: 0, point: 0 });
    }

    if v == 0.0 {
        buffer[0] = b'0';
        return (negative, Digits { length: 1, point: 1 });
    }

    let fast = match mode {
        DtoaMode::Shortest => fast_dtoa(v, FastDtoaMode::Shortest, 0, buffer),
        DtoaMode::ShortestSingle => fast_dtoa(v, FastDtoaMode::ShortestSingle, 0, buffer),
        DtoaMode::Fixed => fast_fixed_dtoa(v, requested_digits, buffer),
        DtoaMode::Precision => fast_dtoa(v, FastDtoaMode::Precision, requested_digits, buffer),
    };
    if let Some(digits) = fast {
        return (negative, digits);
    }

    trace!("fast path gave up on {v:e} ({mode:?}, {requested_digits}), using bignum");
    let bignum_mode = match mode {
        DtoaMode::Shortest => BignumDtoaMode::Shortest,
        DtoaMode::ShortestSingle => BignumDtoaMode::ShortestSingle,
        DtoaMode::Fixed => BignumDtoaMode::Fixed,
        DtoaMode::Precision => BignumDtoaMode::Precision,
    };
    let mut digits = bignum_dtoa(v, bignum_mode, requested_digits, buffer);
    if mode == DtoaMode::Fixed {
        while digits.length > 0 && buffer[digits.length - 1] == b'0' {
            digits.length -= 1;
        }
    }
    (negative, digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(v: f64, mode: DtoaMode, requested_digits: i32) -> (bool, String, i32) {
        let mut buffer = [0u8; 500];
        let (negative, digits) = double_to_ascii(v, mode, requested_digits, &mut buffer);
        let text = core::str::from_utf8(&buffer[..digits.length]).unwrap();
        (negative, text.to_string(), digits.point)
    }

    #[test]
    fn zero() {
        assert_eq!(convert(0.0, DtoaMode::Shortest, 0), (false, "0".into(), 1));
        assert_eq!(convert(-0.0, DtoaMode::Shortest, 0), (true, "0".into(), 1));
        assert_eq!(convert(0.0, DtoaMode::Fixed, 2), (false, "0".into(), 1));
        assert_eq!(convert(0.0, DtoaMode::Precision, 3), (false, "0".into(), 1));
        assert_eq!(convert(1.5, DtoaMode::Precision, 0), (false, "".into(), 0));
    }

    #[test]
    fn shortest() {
        assert_eq!(convert(1.0, DtoaMode::Shortest, 0), (false, "1".into(), 1));
        assert_eq!(convert(-0.1, DtoaMode::Shortest, 0), (true, "1".into(), 0));
        assert_eq!(convert(1e17, DtoaMode::Shortest, 0), (false, "1".into(), 18));
        // Grisu3 gives up on this one.
        assert_eq!(
            convert(3.5844466002796428e298, DtoaMode::Shortest, 0),
            (false, "35844466002796428".into(), 299)
        );
        assert_eq!(
            convert(0.1f32 as f64, DtoaMode::ShortestSingle, 0),
            (false, "1".into(), 0)
        );
    }

    #[test]
    fn precision_falls_back_on_ties() {
        assert_eq!(convert(1.5, DtoaMode::Precision, 1), (false, "2".into(), 1));
        assert_eq!(convert(2.5, DtoaMode::Precision, 1), (false, "2".into(), 1));
        assert_eq!(convert(0.0012345, DtoaMode::Precision, 3), (false, "123".into(), -2));
        assert_eq!(convert(1.0, DtoaMode::Precision, 3), (false, "100".into(), 1));
    }

    #[test]
    fn fixed_trims_trailing_zeros_on_both_paths() {
        assert_eq!(convert(123.456, DtoaMode::Fixed, 2), (false, "12346".into(), 3));
        assert_eq!(convert(0.5, DtoaMode::Fixed, 0), (false, "".into(), 0));
        assert_eq!(convert(1.0, DtoaMode::Fixed, 5), (false, "1".into(), 1));
        // Too large for the fast path.
        assert_eq!(
            convert(1e23, DtoaMode::Fixed, 1),
            (false, "99999999999999991611392".into(), 23)
        );
        assert_eq!(convert(1.0, DtoaMode::Fixed, 21), (false, "1".into(), 1));
        assert_eq!(convert(0.04, DtoaMode::Fixed, 1), (false, "".into(), -1));
    }
}
