//! Exact digit generation with [`Bignum`] arithmetic.
//!
//! The value and its boundaries are expressed as fractions over a common
//! denominator, scaled so that the first digit falls in `1..=9`, and digits
//! are then produced by repeated division. This never fails, but is much
//! slower than [`crate::fast_dtoa`].

use core::cmp::Ordering;

use crate::Digits;
use crate::bignum::Bignum;
use crate::ieee::{Double, Single};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BignumDtoaMode {
    /// Shortest digits that read back as the same double.
    Shortest,
    /// Shortest digits that read back as the same float. The input must be
    /// exactly representable as an `f32`.
    ShortestSingle,
    /// Digits up to `requested_digits` places after the decimal point.
    /// Trailing zeros are not trimmed.
    Fixed,
    /// Exactly `requested_digits` significant digits.
    Precision,
}

/// Writes the digits of `v` into `buffer`. `v` must be finite and positive.
///
/// Shortest modes break ties towards an even last digit (and towards
/// even significands on the boundaries, matching round-to-nearest-even
/// reading). Counted modes round to nearest, ties to even.
///
/// In [`BignumDtoaMode::Fixed`] a value that rounds to zero produces no
/// digits and `point == -requested_digits`.
pub fn bignum_dtoa(
    v: f64,
    mode: BignumDtoaMode,
    requested_digits: i32,
    buffer: &mut [u8],
) -> Digits {
    debug_assert!(v > 0.0);
    debug_assert!(!Double::new(v).is_special());

    let (significand, exponent, lower_boundary_is_closer) =
        if mode == BignumDtoaMode::ShortestSingle {
            let single = Single::new(v as f32);
            debug_assert_eq!(single.value() as f64, v);
            (
                single.significand() as u64,
                single.exponent(),
                single.lower_boundary_is_closer(),
            )
        } else {
            let double = Double::new(v);
            (
                double.significand(),
                double.exponent(),
                double.lower_boundary_is_closer(),
            )
        };
    let need_boundary_deltas =
        matches!(mode, BignumDtoaMode::Shortest | BignumDtoaMode::ShortestSingle);

    let is_even = significand & 1 == 0;
    let normalized_exponent = normalized_exponent(significand, exponent);
    // May be one too low.
    let estimated_power = estimate_power(normalized_exponent);

    // The value is too small to show up in the requested digits, even
    // after rounding.
    if mode == BignumDtoaMode::Fixed && -estimated_power - 1 > requested_digits {
        return Digits {
            length: 0,
            point: -requested_digits,
        };
    }

    let mut state = ScaledValue::new(
        significand,
        exponent,
        lower_boundary_is_closer,
        estimated_power,
        need_boundary_deltas,
    );
    // Now v = numerator / denominator * 10^estimated_power.
    let mut point = state.fixup_multiply_10(estimated_power, is_even);
    // Now v = numerator / denominator * 10^(point - 1), with
    // 1 <= (numerator + delta_plus) / denominator < 10.

    let length = match mode {
        BignumDtoaMode::Shortest | BignumDtoaMode::ShortestSingle => {
            state.generate_shortest_digits(is_even, buffer)
        }
        BignumDtoaMode::Fixed => state.generate_fixed_digits(requested_digits, &mut point, buffer),
        BignumDtoaMode::Precision => {
            state.generate_counted_digits(requested_digits, &mut point, buffer)
        }
    };
    Digits { length, point }
}

fn normalized_exponent(mut significand: u64, mut exponent: i32) -> i32 {
    while significand & Double::HIDDEN_BIT == 0 {
        significand <<= 1;
        exponent -= 1;
    }
    exponent
}

/// Estimates `ceil(log10(v))` for a value with the given normalized binary
/// exponent. The result is either exact or one too low.
fn estimate_power(exponent: i32) -> i32 {
    // log10(2)
    const K1_LOG10: f64 = 0.30102999566398114;
    // A normalized double has a 53-bit significand, so v < 2^(exponent + 53).
    let estimate = (exponent + Double::SIGNIFICAND_SIZE - 1) as f64 * K1_LOG10 - 1e-10;
    ceil(estimate)
}

// f64::ceil lives in std.
fn ceil(value: f64) -> i32 {
    let truncated = value as i32;
    if (truncated as f64) < value {
        truncated + 1
    } else {
        truncated
    }
}

/// `v` as `numerator / denominator`, and the distances to its neighbours'
/// midpoints as `delta_minus / denominator` and `delta_plus / denominator`.
/// The deltas stay zero unless boundaries were requested.
struct ScaledValue {
    numerator: Bignum,
    denominator: Bignum,
    delta_minus: Bignum,
    delta_plus: Bignum,
}

impl ScaledValue {
    fn new(
        significand: u64,
        exponent: i32,
        lower_boundary_is_closer: bool,
        estimated_power: i32,
        need_boundary_deltas: bool,
    ) -> Self {
        let mut state = ScaledValue {
            numerator: Bignum::new(),
            denominator: Bignum::new(),
            delta_minus: Bignum::new(),
            delta_plus: Bignum::new(),
        };
        if exponent >= 0 {
            state.positive_exponent(significand, exponent, estimated_power, need_boundary_deltas);
        } else if estimated_power >= 0 {
            state.negative_exponent_positive_power(
                significand,
                exponent,
                estimated_power,
                need_boundary_deltas,
            );
        } else {
            state.negative_exponent_negative_power(
                significand,
                exponent,
                estimated_power,
                need_boundary_deltas,
            );
        }

        if need_boundary_deltas && lower_boundary_is_closer {
            // The lower neighbour is half as far away: double everything
            // except delta_minus.
            state.denominator.shift_left(1);
            state.numerator.shift_left(1);
            state.delta_plus.shift_left(1);
        }
        state
    }

    /// `v = f * 2^e` with `e >= 0`, hence `estimated_power >= 0`.
    fn positive_exponent(
        &mut self,
        significand: u64,
        exponent: i32,
        estimated_power: i32,
        need_boundary_deltas: bool,
    ) {
        debug_assert!(estimated_power >= 0);
        self.numerator.assign_u64(significand);
        self.numerator.shift_left(exponent);
        self.denominator.assign_power_u16(10, estimated_power);

        if need_boundary_deltas {
            // With a common factor of 2 the half-ulp distances 2^(e-1)
            // become the integer 2^e.
            self.denominator.shift_left(1);
            self.numerator.shift_left(1);
            self.delta_plus.assign_u16(1);
            self.delta_plus.shift_left(exponent);
            self.delta_minus.assign_u16(1);
            self.delta_minus.shift_left(exponent);
        }
    }

    /// `v = f * 2^e` with `e < 0` but `v >= 1`; `e` is small.
    fn negative_exponent_positive_power(
        &mut self,
        significand: u64,
        exponent: i32,
        estimated_power: i32,
        need_boundary_deltas: bool,
    ) {
        self.numerator.assign_u64(significand);
        self.denominator.assign_power_u16(10, estimated_power);
        self.denominator.shift_left(-exponent);

        if need_boundary_deltas {
            // Denominator 2 * 2^-e makes both half-ulp distances equal to 1.
            self.denominator.shift_left(1);
            self.numerator.shift_left(1);
            self.delta_plus.assign_u16(1);
            self.delta_minus.assign_u16(1);
        }
    }

    /// `v < 1`: multiply the numerator and deltas by `10^-estimated_power`
    /// rather than dividing the denominator.
    fn negative_exponent_negative_power(
        &mut self,
        significand: u64,
        exponent: i32,
        estimated_power: i32,
        need_boundary_deltas: bool,
    ) {
        self.numerator.assign_power_u16(10, -estimated_power);
        if need_boundary_deltas {
            self.delta_plus.assign_bignum(&self.numerator);
            self.delta_minus.assign_bignum(&self.numerator);
        }
        self.numerator.multiply_by_u64(significand);

        self.denominator.assign_u16(1);
        self.denominator.shift_left(-exponent);

        if need_boundary_deltas {
            // The deltas already hold 10^-estimated_power, which is the half
            // ulp once the common factor of 2 is in place.
            self.numerator.shift_left(1);
            self.denominator.shift_left(1);
        }
    }

    /// Corrects an estimated power that was one too low, returning the
    /// decimal point.
    fn fixup_multiply_10(&mut self, estimated_power: i32, is_even: bool) -> i32 {
        let comparison = Bignum::plus_compare(&self.numerator, &self.delta_plus, &self.denominator);
        // On a boundary the even significand wins the round trip, so the
        // upper boundary itself is reachable.
        let in_range = if is_even {
            comparison != Ordering::Less
        } else {
            comparison == Ordering::Greater
        };
        if in_range {
            estimated_power + 1
        } else {
            self.numerator.times_10();
            self.delta_minus.times_10();
            self.delta_plus.times_10();
            estimated_power
        }
    }

    /// Generates digits until the remainder is within one of the deltas.
    fn generate_shortest_digits(&mut self, is_even: bool, buffer: &mut [u8]) -> usize {
        // Saves a multiplication per digit in the common symmetric case.
        let deltas_equal = Bignum::equal(&self.delta_minus, &self.delta_plus);
        let mut length = 0;
        loop {
            let digit = self.numerator.divide_modulo_int_bignum(&self.denominator);
            debug_assert!(digit <= 9);
            buffer[length] = b'0' + digit as u8;
            length += 1;

            let delta_plus = if deltas_equal {
                &self.delta_minus
            } else {
                &self.delta_plus
            };
            // Can we round down (drop the remainder) or up (add one to the
            // last digit) and stay strictly inside the boundaries?
            let minus_comparison = Bignum::compare(&self.numerator, &self.delta_minus);
            let plus_comparison =
                Bignum::plus_compare(&self.numerator, delta_plus, &self.denominator);
            let (in_delta_room_minus, in_delta_room_plus) = if is_even {
                (
                    minus_comparison != Ordering::Greater,
                    plus_comparison != Ordering::Less,
                )
            } else {
                (
                    minus_comparison == Ordering::Less,
                    plus_comparison == Ordering::Greater,
                )
            };

            match (in_delta_room_minus, in_delta_room_plus) {
                (false, false) => {
                    self.numerator.times_10();
                    self.delta_minus.times_10();
                    if !deltas_equal {
                        self.delta_plus.times_10();
                    }
                }
                (true, true) => {
                    // Both work: pick the closer one by comparing the
                    // remainder with half the denominator.
                    let round_up = match Bignum::plus_compare(
                        &self.numerator,
                        &self.numerator,
                        &self.denominator,
                    ) {
                        Ordering::Less => false,
                        Ordering::Greater => true,
                        Ordering::Equal => (buffer[length - 1] - b'0') % 2 == 1,
                    };
                    if round_up {
                        // A '9' would have stopped the loop one digit
                        // earlier.
                        debug_assert!(buffer[length - 1] != b'9');
                        buffer[length - 1] += 1;
                    }
                    return length;
                }
                (true, false) => return length,
                (false, true) => {
                    debug_assert!(buffer[length - 1] != b'9');
                    buffer[length - 1] += 1;
                    return length;
                }
            }
        }
    }

    /// Generates exactly `count` digits, rounding the last one to nearest
    /// with ties to even. A carry out of the first digit bumps `point`.
    fn generate_counted_digits(&mut self, count: i32, point: &mut i32, buffer: &mut [u8]) -> usize {
        debug_assert!(count >= 0);
        let count = count as usize;
        if count == 0 {
            return 0;
        }
        for slot in &mut buffer[..count - 1] {
            let digit = self.numerator.divide_modulo_int_bignum(&self.denominator);
            debug_assert!(digit <= 9);
            *slot = b'0' + digit as u8;
            self.numerator.times_10();
        }
        let mut digit = self.numerator.divide_modulo_int_bignum(&self.denominator);
        let round_up = match Bignum::plus_compare(&self.numerator, &self.numerator, &self.denominator)
        {
            Ordering::Less => false,
            Ordering::Greater => true,
            Ordering::Equal => digit % 2 == 1,
        };
        if round_up {
            digit += 1;
        }
        debug_assert!(digit <= 10);
        buffer[count - 1] = b'0' + digit as u8;

        // Propagate a carry through trailing '9's.
        for i in (1..count).rev() {
            if buffer[i] != b'0' + 10 {
                break;
            }
            buffer[i] = b'0';
            buffer[i - 1] += 1;
        }
        if buffer[0] == b'0' + 10 {
            buffer[0] = b'1';
            *point += 1;
        }
        count
    }

    /// Generates the digits up to `requested_digits` places after the
    /// point. Leading zeros after the point are not emitted.
    fn generate_fixed_digits(&mut self, requested_digits: i32, point: &mut i32, buffer: &mut [u8]) -> usize {
        // Even when the first digit lies beyond the requested ones, the
        // value may still round up into the last requested place
        // (0.5 with zero digits, say).
        if -*point > requested_digits {
            // e.g. 0.001 with one requested digit.
            *point = -requested_digits;
            0
        } else if -*point == requested_digits {
            // Only rounding decides: 0.06 becomes "1" (0.1), 0.04 nothing.
            // The omitted place holds a 0, so an exact tie rounds down.
            self.denominator.times_10();
            if Bignum::plus_compare(&self.numerator, &self.numerator, &self.denominator)
                == Ordering::Greater
            {
                buffer[0] = b'1';
                *point += 1;
                1
            } else {
                0
            }
        } else {
            let needed_digits = *point + requested_digits;
            self.generate_counted_digits(needed_digits, point, buffer)
        }
    }
}
