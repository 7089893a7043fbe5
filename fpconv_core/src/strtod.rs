//! Correctly rounded decimal to binary conversion.
//!
//! The input is a string of decimal digits `d` and an exponent `e`,
//! denoting `d * 10^e`. Three strategies are tried in order:
//!
//! 1. exact `f64` arithmetic, when both the digits and the power of ten are
//!    exactly representable;
//! 2. a `SimpleFp` product with a tracked error bound, which settles almost
//!    every remaining input;
//! 3. an exact [`Bignum`] comparison against the midpoint between the two
//!    candidate doubles.

use core::cmp::Ordering;

use crate::bignum::Bignum;
use crate::cached_powers;
use crate::ieee::{Double, Single};
use crate::simple_fp::SimpleFp;

/// Any integer with at most 15 decimal digits fits in a 53-bit significand.
const MAX_EXACT_DOUBLE_INTEGER_DECIMAL_DIGITS: usize = 15;
/// 10^19 < 2^64.
const MAX_U64_DECIMAL_DIGITS: usize = 19;

// Anything >= 10^309 is infinity; anything <= 10^-324 is zero. 2.5e-324 is
// still read as the smallest denormal.
const MAX_DECIMAL_POWER: i32 = 309;
const MIN_DECIMAL_POWER: i32 = -324;

/// Longer inputs are cut to this many significant digits, with the last one
/// replaced by a non-zero sticky digit. 772 digits would suffice to decide
/// every rounding; the rest is margin.
pub const MAX_SIGNIFICANT_DECIMAL_DIGITS: usize = 780;

static EXACT_POWERS_OF_TEN: [f64; 23] = [
    1.0, 10.0, 100.0, 1000.0, 10000.0, 100000.0, 1000000.0, 10000000.0, 100000000.0,
    1000000000.0, 10000000000.0, 100000000000.0, 1000000000000.0, 10000000000000.0,
    100000000000000.0, 1000000000000000.0, 10000000000000000.0, 100000000000000000.0,
    1000000000000000000.0, 10000000000000000000.0, 100000000000000000000.0, 1e21, 1e22,
];

/// The double nearest to `digits * 10^exponent` (ties to even).
///
/// `digits` must be ASCII decimal digits. Leading and trailing zeros are
/// allowed here; they are trimmed before conversion.
pub fn str_to_double(digits: &[u8], exponent: i32) -> f64 {
    debug_assert!(!digits.is_empty());
    debug_assert!(digits.iter().all(u8::is_ascii_digit));
    let mut copy_buffer = [0u8; MAX_SIGNIFICANT_DECIMAL_DIGITS];
    let (trimmed, exponent) = trim_and_cut(digits, exponent, &mut copy_buffer);
    strtod_trimmed(trimmed, exponent)
}

/// The float nearest to `digits * 10^exponent` (ties to even), computed
/// without an intermediate double rounding.
pub fn str_to_float(digits: &[u8], exponent: i32) -> f32 {
    debug_assert!(!digits.is_empty());
    debug_assert!(digits.iter().all(u8::is_ascii_digit));
    let mut copy_buffer = [0u8; MAX_SIGNIFICANT_DECIMAL_DIGITS];
    let (trimmed, exponent) = trim_and_cut(digits, exponent, &mut copy_buffer);
    strtof_trimmed(trimmed, exponent)
}

/// Like [`str_to_double`] for input without leading or trailing zeros and
/// at most [`MAX_SIGNIFICANT_DECIMAL_DIGITS`] digits. Empty input is zero.
pub fn strtod_trimmed(trimmed: &[u8], exponent: i32) -> f64 {
    debug_assert!(trimmed.len() <= MAX_SIGNIFICANT_DECIMAL_DIGITS);
    debug_assert!(is_trimmed_digits(trimmed));
    let (guess, is_correct) = compute_guess(trimmed, exponent);
    if is_correct {
        return guess;
    }

    // The answer is either the guess or its successor.
    let double = Double::new(guess);
    let upper_boundary = double.upper_boundary();
    match compare_buffer_with_simple_fp(trimmed, exponent, upper_boundary) {
        Ordering::Less => guess,
        Ordering::Greater => double.next_double(),
        Ordering::Equal if double.significand() & 1 == 0 => guess,
        Ordering::Equal => double.next_double(),
    }
}

/// Like [`str_to_float`] for input without leading or trailing zeros and
/// at most [`MAX_SIGNIFICANT_DECIMAL_DIGITS`] digits. Empty input is zero.
pub fn strtof_trimmed(trimmed: &[u8], exponent: i32) -> f32 {
    debug_assert!(trimmed.len() <= MAX_SIGNIFICANT_DECIMAL_DIGITS);
    debug_assert!(is_trimmed_digits(trimmed));

    let (double_guess, is_correct) = compute_guess(trimmed, exponent);
    // `as` rounds to nearest-even and overflows to infinity.
    let float_guess = double_guess as f32;
    if float_guess as f64 == double_guess {
        // Integers usually end up here.
        return float_guess;
    }

    // Rounding the double guess to a float may round a second time in the
    // same direction: 12349 -> 1235 -> 124 instead of 123. Look at the
    // floats of the neighbouring doubles (two successors if the double
    // guess may be one too low) and fall back to an exact comparison when
    // they straddle a float boundary.
    let double_next = Double::new(double_guess).next_double();
    let double_previous = Double::new(double_guess).previous_double();

    let f1 = double_previous as f32;
    let f3 = double_next as f32;
    let f4 = if is_correct {
        f3
    } else {
        Double::new(double_next).next_double() as f32
    };
    debug_assert!(f1 <= float_guess && float_guess <= f3 && f3 <= f4);

    if f1 == f4 {
        return float_guess;
    }

    // The correct float is f1 or f4.
    let guess = f1;
    let next = f4;
    let upper_boundary = if guess == 0.0 {
        // Half the smallest denormal float.
        let min_float = f32::from_bits(1);
        Double::new(min_float as f64 / 2.0).to_simple_fp()
    } else {
        Single::new(guess).upper_boundary()
    };
    match compare_buffer_with_simple_fp(trimmed, exponent, upper_boundary) {
        Ordering::Less => guess,
        Ordering::Greater => next,
        Ordering::Equal if Single::new(guess).significand() & 1 == 0 => guess,
        Ordering::Equal => next,
    }
}

fn is_trimmed_digits(buffer: &[u8]) -> bool {
    buffer.iter().all(u8::is_ascii_digit)
        && buffer.first().is_none_or(|&c| c != b'0')
        && buffer.last().is_none_or(|&c| c != b'0')
}

/// Strips leading and trailing zeros (adjusting the exponent) and cuts
/// overlong input to [`MAX_SIGNIFICANT_DECIMAL_DIGITS`], in which case the
/// result lives in `copy_buffer`.
fn trim_and_cut<'a>(
    buffer: &'a [u8],
    exponent: i32,
    copy_buffer: &'a mut [u8; MAX_SIGNIFICANT_DECIMAL_DIGITS],
) -> (&'a [u8], i32) {
    let leading_zeros = buffer.iter().take_while(|&&c| c == b'0').count();
    let left_trimmed = &buffer[leading_zeros..];
    let trailing_zeros = left_trimmed.iter().rev().take_while(|&&c| c == b'0').count();
    let right_trimmed = &left_trimmed[..left_trimmed.len() - trailing_zeros];
    let exponent = exponent + trailing_zeros as i32;

    if right_trimmed.len() <= MAX_SIGNIFICANT_DECIMAL_DIGITS {
        return (right_trimmed, exponent);
    }

    // The dropped tail is non-zero (the last digit is not '0' after
    // trimming), so a sticky '1' keeps the rounding direction.
    let kept = MAX_SIGNIFICANT_DECIMAL_DIGITS - 1;
    copy_buffer[..kept].copy_from_slice(&right_trimmed[..kept]);
    copy_buffer[kept] = b'1';
    let exponent = exponent + (right_trimmed.len() - MAX_SIGNIFICANT_DECIMAL_DIGITS) as i32;
    (&copy_buffer[..], exponent)
}

/// Reads as many leading digits as surely fit into a u64, returning the
/// value and the number of digits read.
fn read_u64(buffer: &[u8]) -> (u64, usize) {
    let mut result: u64 = 0;
    let mut read = 0;
    // "1844674407370955161" stops the loop although a following digit
    // up to 6 would still fit.
    while read < buffer.len() && result <= u64::MAX / 10 - 1 {
        let digit = buffer[read] - b'0';
        debug_assert!(digit <= 9);
        result = 10 * result + digit as u64;
        read += 1;
    }
    (result, read)
}

/// Reads the leading digits as a (not normalized) `SimpleFp` and returns
/// it with the number of digits that did not fit. If digits were left over
/// the value is rounded, with an error of at most half a unit.
fn read_simple_fp(buffer: &[u8]) -> (SimpleFp, usize) {
    let (mut significand, read_digits) = read_u64(buffer);
    if buffer.len() == read_digits {
        return (SimpleFp::new(significand, 0), 0);
    }
    if buffer[read_digits] >= b'5' {
        significand += 1;
    }
    (SimpleFp::new(significand, 0), buffer.len() - read_digits)
}

/// Tries exact double arithmetic.
fn double_strtod(trimmed: &[u8], exponent: i32) -> Option<f64> {
    if trimmed.len() > MAX_EXACT_DOUBLE_INTEGER_DECIMAL_DIGITS {
        return None;
    }
    let exact_powers = EXACT_POWERS_OF_TEN.len() as i32;
    // IEEE guarantees a correctly rounded product (or quotient) of two exact
    // operands.
    let read = || {
        let (value, read_digits) = read_u64(trimmed);
        debug_assert_eq!(read_digits, trimmed.len());
        value as f64
    };
    if exponent < 0 && -exponent < exact_powers {
        return Some(read() / EXACT_POWERS_OF_TEN[-exponent as usize]);
    }
    if (0..exact_powers).contains(&exponent) {
        return Some(read() * EXACT_POWERS_OF_TEN[exponent as usize]);
    }
    // A short digit string can absorb part of the power and stay exact.
    let remaining_digits = (MAX_EXACT_DOUBLE_INTEGER_DECIMAL_DIGITS - trimmed.len()) as i32;
    if exponent >= 0 && exponent - remaining_digits < exact_powers {
        return Some(
            read()
                * EXACT_POWERS_OF_TEN[remaining_digits as usize]
                * EXACT_POWERS_OF_TEN[(exponent - remaining_digits) as usize],
        );
    }
    None
}

/// `10^exponent` for `1 <= exponent < 8`, exactly.
fn adjustment_power_of_ten(exponent: i32) -> SimpleFp {
    debug_assert!(0 < exponent && exponent < cached_powers::DECIMAL_EXPONENT_DISTANCE);
    match exponent {
        1 => SimpleFp::new(0xa000_0000_0000_0000, -60),
        2 => SimpleFp::new(0xc800_0000_0000_0000, -57),
        3 => SimpleFp::new(0xfa00_0000_0000_0000, -54),
        4 => SimpleFp::new(0x9c40_0000_0000_0000, -50),
        5 => SimpleFp::new(0xc350_0000_0000_0000, -47),
        6 => SimpleFp::new(0xf424_0000_0000_0000, -44),
        7 => SimpleFp::new(0x9896_8000_0000_0000, -40),
        _ => unreachable!("adjustment exponent out of range: {exponent}"),
    }
}

/// Extended-precision estimate. Returns the value and whether it is known
/// to be correct; if not, the correct double is the returned one or its
/// successor.
fn simple_fp_strtod(buffer: &[u8], exponent: i32) -> (f64, bool) {
    let (mut input, remaining_decimals) = read_simple_fp(buffer);
    // Errors are tracked in eighths of a unit of the last place.
    const DENOMINATOR_LOG: i32 = 3;
    const DENOMINATOR: u64 = 1 << DENOMINATOR_LOG;
    let exponent = exponent + remaining_decimals as i32;
    let mut error: u64 = if remaining_decimals == 0 { 0 } else { DENOMINATOR / 2 };

    let old_e = input.exponent();
    input.normalize();
    error <<= old_e - input.exponent();

    debug_assert!(exponent <= cached_powers::MAX_DECIMAL_EXPONENT);
    if exponent < cached_powers::MIN_DECIMAL_EXPONENT {
        return (0.0, true);
    }
    let (cached_power, cached_decimal_exponent) =
        cached_powers::get_cached_power_for_decimal_exponent(exponent);

    if cached_decimal_exponent != exponent {
        let adjustment_exponent = exponent - cached_decimal_exponent;
        input.multiply(&adjustment_power_of_ten(adjustment_exponent));
        // The adjustment power is exact. If the product still fits in 64
        // bits it is exact too; otherwise it is off by half a unit.
        if (MAX_U64_DECIMAL_DIGITS as i32 - buffer.len() as i32) < adjustment_exponent {
            error += DENOMINATOR / 2;
        }
    }

    input.multiply(&cached_power);
    // Multiplying a (error_a) by b (error_b) costs
    //   error_a + error_b + error_a * error_b / 2^64 + 0.5
    // Cached powers are within half a unit, and the cross term is below
    // one eighth unless there is no error at all.
    let error_b = DENOMINATOR / 2;
    let error_ab = if error == 0 { 0 } else { 1 };
    let fixed_error = DENOMINATOR / 2;
    error += error_b + error_ab + fixed_error;

    let old_e = input.exponent();
    input.normalize();
    error <<= old_e - input.exponent();

    // How many low bits get rounded away when converting to a double?
    let order_of_magnitude = SimpleFp::SIGNIFICAND_SIZE + input.exponent();
    let effective_significand_size =
        Double::significand_size_for_order_of_magnitude(order_of_magnitude);
    let mut precision_digits_count = SimpleFp::SIGNIFICAND_SIZE - effective_significand_size;
    if precision_digits_count + DENOMINATOR_LOG >= SimpleFp::SIGNIFICAND_SIZE {
        // Only for tiny denormals: the scaled halfway point would overflow,
        // so drop low bits from everything (paying for them in the error).
        let shift_amount = (precision_digits_count + DENOMINATOR_LOG) - SimpleFp::SIGNIFICAND_SIZE + 1;
        input.set_significand(input.significand() >> shift_amount);
        input.set_exponent(input.exponent() + shift_amount);
        error = (error >> shift_amount) + 1 + DENOMINATOR;
        precision_digits_count -= shift_amount;
    }
    debug_assert!(precision_digits_count < 64);
    let precision_bits_mask = (1u64 << precision_digits_count) - 1;
    let precision_bits = (input.significand() & precision_bits_mask) * DENOMINATOR;
    let half_way = (1u64 << (precision_digits_count - 1)) * DENOMINATOR;
    let mut rounded_input = SimpleFp::new(
        input.significand() >> precision_digits_count,
        input.exponent() + precision_digits_count,
    );
    if precision_bits >= half_way + error {
        rounded_input.set_significand(rounded_input.significand() + 1);
    }

    let result = Double::from_simple_fp(rounded_input).value();
    // Too close to the halfway point to decide. We rounded down, so the
    // result is the correct double or the one below it.
    let is_correct = !(half_way - error < precision_bits && precision_bits < half_way + error);
    (result, is_correct)
}

/// Compares `buffer * 10^exponent` with `fp` exactly.
fn compare_buffer_with_simple_fp(buffer: &[u8], exponent: i32, fp: SimpleFp) -> Ordering {
    debug_assert!(buffer.len() as i32 + exponent <= MAX_DECIMAL_POWER + 1);
    debug_assert!(buffer.len() as i32 + exponent > MIN_DECIMAL_POWER);
    debug_assert!(buffer.len() <= MAX_SIGNIFICANT_DECIMAL_DIGITS);
    // 10^310 needs about 1030 bits; shifts add at most one bigit.
    const _: () = assert!((MAX_DECIMAL_POWER as usize + 1) * 333 / 100 < Bignum::MAX_SIGNIFICANT_BITS);
    let mut buffer_bignum = Bignum::new();
    let mut fp_bignum = Bignum::new();
    buffer_bignum.assign_decimal_string(buffer);
    fp_bignum.assign_u64(fp.significand());
    if exponent >= 0 {
        buffer_bignum.multiply_by_power_of_ten(exponent);
    } else {
        fp_bignum.multiply_by_power_of_ten(-exponent);
    }
    if fp.exponent() > 0 {
        fp_bignum.shift_left(fp.exponent());
    } else {
        buffer_bignum.shift_left(-fp.exponent());
    }
    Bignum::compare(&buffer_bignum, &fp_bignum)
}

/// Returns a double guess and whether it is known to be correct. When it
/// is not, the correct double is the guess or its successor.
fn compute_guess(trimmed: &[u8], exponent: i32) -> (f64, bool) {
    if trimmed.is_empty() {
        return (0.0, true);
    }
    let length = trimmed.len() as i32;
    if exponent + length - 1 >= MAX_DECIMAL_POWER {
        return (Double::infinity(), true);
    }
    if exponent + length <= MIN_DECIMAL_POWER {
        return (0.0, true);
    }

    if let Some(guess) = double_strtod(trimmed, exponent) {
        return (guess, true);
    }
    let (guess, is_correct) = simple_fp_strtod(trimmed, exponent);
    (guess, is_correct || guess == Double::infinity())
}
