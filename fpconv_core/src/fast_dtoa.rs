//! Digit generation using 64-bit extended-precision arithmetic only.
//!
//! [`fast_dtoa`] either produces a provably correct result or gives up; in
//! shortest mode it gives up for roughly 0.5% of doubles, and callers then
//! fall back to [`crate::bignum_dtoa`].
//!
//! The algorithm is Grisu3 from Florian Loitsch, "Printing Floating-Point
//! Numbers Quickly and Accurately with Integers", PLDI 2010.

use crate::Digits;
use crate::cached_powers;
use crate::ieee::{Double, Single};
use crate::simple_fp::SimpleFp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastDtoaMode {
    /// Shortest digits that read back as the same double.
    Shortest,
    /// Shortest digits that read back as the same float. The input must be
    /// exactly representable as an `f32`.
    ShortestSingle,
    /// Exactly `requested_digits` significant digits, correctly rounded.
    Precision,
}

/// Longest shortest-mode output for a double.
pub const FAST_DTOA_MAXIMAL_LENGTH: usize = 17;
/// Longest shortest-mode output for a float.
pub const FAST_DTOA_MAXIMAL_SINGLE_LENGTH: usize = 9;

// After scaling by a cached power the binary exponent lies in this window,
// so the integral part fits in a u32 and fractionals * 10 fit in a u64.
const MINIMAL_TARGET_EXPONENT: i32 = -60;
const MAXIMAL_TARGET_EXPONENT: i32 = -32;

/// Writes the digits of `v` into `buffer`, or returns `None` if the result
/// could not be proven correct. `v` must be finite and positive.
///
/// `requested_digits` is only read in [`FastDtoaMode::Precision`]. The
/// buffer must hold [`FAST_DTOA_MAXIMAL_LENGTH`] bytes, or
/// `requested_digits` bytes in precision mode.
pub fn fast_dtoa(
    v: f64,
    mode: FastDtoaMode,
    requested_digits: i32,
    buffer: &mut [u8],
) -> Option<Digits> {
    debug_assert!(v > 0.0);
    debug_assert!(!Double::new(v).is_special());

    let (length, decimal_exponent) = match mode {
        FastDtoaMode::Shortest | FastDtoaMode::ShortestSingle => {
            debug_assert!(buffer.len() >= FAST_DTOA_MAXIMAL_LENGTH);
            grisu3(v, mode, buffer)?
        }
        FastDtoaMode::Precision => {
            debug_assert!(requested_digits > 0);
            debug_assert!(buffer.len() >= requested_digits as usize);
            grisu3_counted(v, requested_digits, buffer)?
        }
    };
    Some(Digits {
        length,
        point: length as i32 + decimal_exponent,
    })
}

/// Moves the last generated digit towards `w` and checks that the result is
/// safe.
///
/// All distances are measured downwards from `too_high` in units of the
/// current scale: `rest` to the buffer, `distance_too_high_w` to `w`,
/// `unsafe_interval` to `too_low`. `unit` is the error bound of the inputs.
fn round_weed(
    buffer: &mut [u8],
    length: usize,
    distance_too_high_w: u64,
    unsafe_interval: u64,
    mut rest: u64,
    ten_kappa: u64,
    unit: u64,
) -> bool {
    // w lies strictly between too_high - big_distance and
    // too_high - small_distance.
    let small_distance = distance_too_high_w - unit;
    let big_distance = distance_too_high_w + unit;

    // Comparison order matters: every subtraction below is non-negative.
    debug_assert!(rest <= unsafe_interval);
    while rest < small_distance
        && unsafe_interval - rest >= ten_kappa
        && (rest + ten_kappa < small_distance
            || small_distance - rest >= rest + ten_kappa - small_distance)
    {
        buffer[length - 1] -= 1;
        rest += ten_kappa;
    }

    // If decrementing once more would bring us closer to the low end of w's
    // error range, we cannot tell which candidate is closest.
    if rest < big_distance
        && unsafe_interval - rest >= ten_kappa
        && (rest + ten_kappa < big_distance
            || big_distance - rest > rest + ten_kappa - big_distance)
    {
        return false;
    }

    // The result must lie in [too_low + 2 unit, too_high - 2 unit].
    (2 * unit <= rest) && (rest <= unsafe_interval - 4 * unit)
}

/// Rounds the buffer up when `2 * rest > ten_kappa`, or fails when `unit`
/// makes the direction ambiguous. Exact halfway cases always fail.
///
/// Rounding "99" up carries into a new leading digit; the buffer becomes
/// "10" and `kappa` grows by one.
fn round_weed_counted(
    buffer: &mut [u8],
    length: usize,
    rest: u64,
    ten_kappa: u64,
    unit: u64,
    kappa: &mut i32,
) -> bool {
    debug_assert!(rest < ten_kappa);
    if unit >= ten_kappa {
        return false;
    }
    if ten_kappa - unit <= unit {
        return false;
    }
    // 2 * (rest + unit) <= 10^kappa: safe to round down.
    if (ten_kappa - rest > rest) && (ten_kappa - 2 * rest >= 2 * unit) {
        return true;
    }
    // 2 * (rest - unit) >= 10^kappa: safe to round up.
    if (rest > unit) && (ten_kappa - (rest - unit) <= (rest - unit)) {
        buffer[length - 1] += 1;
        for i in (1..length).rev() {
            if buffer[i] != b'0' + 10 {
                break;
            }
            buffer[i] = b'0';
            buffer[i - 1] += 1;
        }
        if buffer[0] == b'0' + 10 {
            buffer[0] = b'1';
            *kappa += 1;
        }
        return true;
    }
    false
}

const SMALL_POWERS_OF_TEN: [u32; 11] = [
    0, 1, 10, 100, 1000, 10000, 100000, 1000000, 10000000, 100000000, 1000000000,
];

/// Returns the biggest power of ten `<= number` and its exponent plus one.
/// `number_bits` bounds the bit length of `number`. Zero yields `(0, 0)`.
fn biggest_power_ten(number: u32, number_bits: i32) -> (u32, i32) {
    debug_assert!((number as u64) < (1u64 << (number_bits + 1)));
    // 1233 / 4096 ~= log10(2)
    let mut exponent_plus_one_guess = ((number_bits + 1) * 1233 >> 12) + 1;
    if number < SMALL_POWERS_OF_TEN[exponent_plus_one_guess as usize] {
        exponent_plus_one_guess -= 1;
    }
    (
        SMALL_POWERS_OF_TEN[exponent_plus_one_guess as usize],
        exponent_plus_one_guess,
    )
}

/// Generates the shortest digits of a number inside `]low, high[`, closest
/// to `w`. All three inputs share one exponent in the target window and are
/// accurate to one unit; the interval widened by that unit ("unsafe") is
/// used to stop, and [`round_weed`] checks the narrowed ("safe") one.
///
/// Returns the digit count and `kappa`, so that the value is
/// `buffer * 10^kappa`.
fn digit_gen(
    low: SimpleFp,
    w: SimpleFp,
    high: SimpleFp,
    buffer: &mut [u8],
) -> Option<(usize, i32)> {
    debug_assert!(low.exponent() == w.exponent() && w.exponent() == high.exponent());
    debug_assert!(low.significand() + 1 <= high.significand() - 1);
    debug_assert!(
        (MINIMAL_TARGET_EXPONENT..=MAXIMAL_TARGET_EXPONENT).contains(&w.exponent())
    );
    let mut unit: u64 = 1;
    let too_low = SimpleFp::new(low.significand() - unit, low.exponent());
    let too_high = SimpleFp::new(high.significand() + unit, high.exponent());
    let mut unsafe_interval = SimpleFp::minus(&too_high, &too_low).significand();

    // Digits are generated from too_high; stopping early rounds down.
    let one_exponent = -w.exponent();
    let one = 1u64 << one_exponent;
    let mut integrals = (too_high.significand() >> one_exponent) as u32;
    let mut fractionals = too_high.significand() & (one - 1);
    let (mut divisor, divisor_exponent_plus_one) =
        biggest_power_ten(integrals, SimpleFp::SIGNIFICAND_SIZE - one_exponent);
    let mut kappa = divisor_exponent_plus_one;
    let mut length = 0;
    let distance_too_high_w = SimpleFp::minus(&too_high, &w).significand();

    // Invariant: buffer == too_high / 10^kappa (integer division).
    while kappa > 0 {
        let digit = integrals / divisor;
        debug_assert!(digit <= 9);
        buffer[length] = b'0' + digit as u8;
        length += 1;
        integrals %= divisor;
        kappa -= 1;
        let rest = ((integrals as u64) << one_exponent) + fractionals;
        if rest < unsafe_interval {
            return round_weed(
                buffer,
                length,
                distance_too_high_w,
                unsafe_interval,
                rest,
                (divisor as u64) << one_exponent,
                unit,
            )
            .then_some((length, kappa));
        }
        divisor /= 10;
    }

    // Fractional digits. The error grows with every multiplication by ten.
    debug_assert!(one_exponent <= 60);
    debug_assert!(fractionals < one);
    debug_assert!(u64::MAX / 10 >= one);
    loop {
        fractionals *= 10;
        unit *= 10;
        unsafe_interval *= 10;
        let digit = (fractionals >> one_exponent) as u8;
        debug_assert!(digit <= 9);
        buffer[length] = b'0' + digit;
        length += 1;
        fractionals &= one - 1;
        kappa -= 1;
        if fractionals < unsafe_interval {
            return round_weed(
                buffer,
                length,
                distance_too_high_w * unit,
                unsafe_interval,
                fractionals,
                one,
                unit,
            )
            .then_some((length, kappa));
        }
    }
}

/// Generates exactly `requested_digits` digits of `w`, rounded to nearest.
/// `w` must be accurate to one unit. Fails when the error bound reaches the
/// digits being produced, or when the rounding direction is unclear.
fn digit_gen_counted(
    w: SimpleFp,
    mut requested_digits: i32,
    buffer: &mut [u8],
) -> Option<(usize, i32)> {
    debug_assert!(
        (MINIMAL_TARGET_EXPONENT..=MAXIMAL_TARGET_EXPONENT).contains(&w.exponent())
    );
    let mut w_error: u64 = 1;
    let one_exponent = -w.exponent();
    let one = 1u64 << one_exponent;
    let mut integrals = (w.significand() >> one_exponent) as u32;
    let mut fractionals = w.significand() & (one - 1);
    let (mut divisor, divisor_exponent_plus_one) =
        biggest_power_ten(integrals, SimpleFp::SIGNIFICAND_SIZE - one_exponent);
    let mut kappa = divisor_exponent_plus_one;
    let mut length = 0;

    while kappa > 0 {
        let digit = integrals / divisor;
        debug_assert!(digit <= 9);
        buffer[length] = b'0' + digit as u8;
        length += 1;
        requested_digits -= 1;
        integrals %= divisor;
        kappa -= 1;
        if requested_digits == 0 {
            break;
        }
        divisor /= 10;
    }

    if requested_digits == 0 {
        let rest = ((integrals as u64) << one_exponent) + fractionals;
        return round_weed_counted(
            buffer,
            length,
            rest,
            (divisor as u64) << one_exponent,
            w_error,
            &mut kappa,
        )
        .then_some((length, kappa));
    }

    debug_assert!(one_exponent <= 60);
    debug_assert!(fractionals < one);
    debug_assert!(u64::MAX / 10 >= one);
    while requested_digits > 0 && fractionals > w_error {
        fractionals *= 10;
        w_error *= 10;
        let digit = (fractionals >> one_exponent) as u8;
        debug_assert!(digit <= 9);
        buffer[length] = b'0' + digit;
        length += 1;
        requested_digits -= 1;
        fractionals &= one - 1;
        kappa -= 1;
    }
    if requested_digits != 0 {
        return None;
    }
    round_weed_counted(buffer, length, fractionals, one, w_error, &mut kappa)
        .then_some((length, kappa))
}

/// Picks the cached power `10^-k` that moves a normalized `w` into the
/// target window, returning the power and `-k`.
fn scaling_power(w: SimpleFp) -> (SimpleFp, i32) {
    let min_exponent = MINIMAL_TARGET_EXPONENT - (w.exponent() + SimpleFp::SIGNIFICAND_SIZE);
    let max_exponent = MAXIMAL_TARGET_EXPONENT - (w.exponent() + SimpleFp::SIGNIFICAND_SIZE);
    let (ten_mk, mk) =
        cached_powers::get_cached_power_for_binary_exponent_range(min_exponent, max_exponent);
    debug_assert!(
        (MINIMAL_TARGET_EXPONENT..=MAXIMAL_TARGET_EXPONENT)
            .contains(&(w.exponent() + ten_mk.exponent() + SimpleFp::SIGNIFICAND_SIZE))
    );
    (ten_mk, mk)
}

/// Shortest digits of `v`, as (length, decimal exponent of the last digit).
fn grisu3(v: f64, mode: FastDtoaMode, buffer: &mut [u8]) -> Option<(usize, i32)> {
    let w = Double::new(v).to_normalized_simple_fp();
    // Anything strictly between the boundaries reads back as v. Boundary
    // values themselves are never produced.
    let (boundary_minus, boundary_plus) = if mode == FastDtoaMode::ShortestSingle {
        Single::new(v as f32).normalized_boundaries()
    } else {
        Double::new(v).normalized_boundaries()
    };
    debug_assert_eq!(boundary_plus.exponent(), w.exponent());
    let (ten_mk, mk) = scaling_power(w);

    // Both the cached power and the product are rounded, so each scaled
    // value is within one unit of the exact product.
    let scaled_w = SimpleFp::times(&w, &ten_mk);
    debug_assert_eq!(
        scaled_w.exponent(),
        boundary_plus.exponent() + ten_mk.exponent() + SimpleFp::SIGNIFICAND_SIZE
    );
    let scaled_boundary_minus = SimpleFp::times(&boundary_minus, &ten_mk);
    let scaled_boundary_plus = SimpleFp::times(&boundary_plus, &ten_mk);

    let (length, kappa) =
        digit_gen(scaled_boundary_minus, scaled_w, scaled_boundary_plus, buffer)?;
    Some((length, -mk + kappa))
}

/// `requested_digits` correctly rounded digits of `v`. Exact halfway cases
/// are beyond the precision of this path and fail.
fn grisu3_counted(v: f64, requested_digits: i32, buffer: &mut [u8]) -> Option<(usize, i32)> {
    let w = Double::new(v).to_normalized_simple_fp();
    let (ten_mk, mk) = scaling_power(w);
    let scaled_w = SimpleFp::times(&w, &ten_mk);
    let (length, kappa) = digit_gen_counted(scaled_w, requested_digits, buffer)?;
    Some((length, -mk + kappa))
}
