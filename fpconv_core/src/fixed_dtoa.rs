//! Fixed-notation digits (a given number of places after the point) using
//! 64- and 128-bit integers.
//!
//! Only handles values below 2^73 and at most 20 fractional digits, which
//! covers what `toFixed`-style formatting needs in practice; anything else
//! is left to [`crate::bignum_dtoa`].

use crate::Digits;
use crate::ieee::Double;

const DOUBLE_SIGNIFICAND_SIZE: i32 = Double::SIGNIFICAND_SIZE;
const TEN_7: u64 = 10_000_000;
const FIVE_17: u64 = 0xB1_A2BC_2EC5;

/// Writes the digits of `v` rounded to `fractional_count` places after the
/// point (ties to even). `v` must be finite and positive.
///
/// Leading and trailing zeros are trimmed. If the result rounds to zero the
/// digit string is empty and `point == -fractional_count`. Returns `None`
/// when the value or the requested precision is out of range. The buffer
/// must hold at least 43 bytes.
pub fn fast_fixed_dtoa(v: f64, fractional_count: i32, buffer: &mut [u8]) -> Option<Digits> {
    debug_assert!(v > 0.0);
    let double = Double::new(v);
    let mut significand = double.significand();
    let exponent = double.exponent();
    // v = significand * 2^exponent, with a 53-bit significand. Beyond
    // 2^73 (~9.5e21) the integral part no longer fits the split below.
    if exponent > 20 || fractional_count > 20 {
        return None;
    }
    let mut out = DigitWriter { buffer, length: 0 };
    let mut point;

    if exponent + DOUBLE_SIGNIFICAND_SIZE > 64 {
        // Divide by 10^17 = 5^17 * 2^17: the quotient gives the leading
        // digits and the remainder fits in a u64.
        //   f * 2^e = q * 5^17 * 2^17 + r
        let mut divisor = FIVE_17;
        let divisor_power = 17;
        let dividend;
        let quotient;
        let remainder;
        if exponent > divisor_power {
            // f * 2^(e-17) = q * 5^17 + r / 2^17, and e - 17 <= 3.
            dividend = significand << (exponent - divisor_power);
            quotient = (dividend / divisor) as u32;
            remainder = (dividend % divisor) << divisor_power;
        } else {
            // f = q * 5^17 * 2^(17-e) + r / 2^e
            divisor <<= divisor_power - exponent;
            dividend = significand;
            quotient = (dividend / divisor) as u32;
            remainder = (dividend % divisor) << exponent;
        }
        out.fill_digits_32(quotient);
        out.fill_digits_64_fixed_length(remainder);
        point = out.length as i32;
    } else if exponent >= 0 {
        significand <<= exponent;
        out.fill_digits_64(significand);
        point = out.length as i32;
    } else if exponent > -DOUBLE_SIGNIFICAND_SIZE {
        let integrals = significand >> -exponent;
        let fractionals = significand - (integrals << -exponent);
        if integrals > u32::MAX as u64 {
            out.fill_digits_64(integrals);
        } else {
            out.fill_digits_32(integrals as u32);
        }
        point = out.length as i32;
        out.fill_fractionals(fractionals, exponent, fractional_count, &mut point);
    } else if exponent < -128 {
        // Below 2^-128 (~2.9e-39) all 20 places are zero.
        point = -fractional_count;
    } else {
        point = 0;
        out.fill_fractionals(significand, exponent, fractional_count, &mut point);
    }

    out.trim_zeros(&mut point);
    if out.length == 0 {
        point = -fractional_count;
    }
    Some(Digits {
        length: out.length,
        point,
    })
}

struct DigitWriter<'a> {
    buffer: &'a mut [u8],
    length: usize,
}

impl DigitWriter<'_> {
    /// Writes exactly `requested_length` digits, zero padded.
    fn fill_digits_32_fixed_length(&mut self, mut number: u32, requested_length: usize) {
        for slot in self.buffer[self.length..self.length + requested_length]
            .iter_mut()
            .rev()
        {
            *slot = b'0' + (number % 10) as u8;
            number /= 10;
        }
        self.length += requested_length;
    }

    /// Writes `number` without leading zeros; zero writes nothing.
    fn fill_digits_32(&mut self, mut number: u32) {
        let start = self.length;
        while number != 0 {
            self.buffer[self.length] = b'0' + (number % 10) as u8;
            number /= 10;
            self.length += 1;
        }
        self.buffer[start..self.length].reverse();
    }

    fn fill_digits_64_fixed_length(&mut self, mut number: u64) {
        let part2 = (number % TEN_7) as u32;
        number /= TEN_7;
        let part1 = (number % TEN_7) as u32;
        let part0 = (number / TEN_7) as u32;

        self.fill_digits_32_fixed_length(part0, 3);
        self.fill_digits_32_fixed_length(part1, 7);
        self.fill_digits_32_fixed_length(part2, 7);
    }

    fn fill_digits_64(&mut self, mut number: u64) {
        let part2 = (number % TEN_7) as u32;
        number /= TEN_7;
        let part1 = (number % TEN_7) as u32;
        let part0 = (number / TEN_7) as u32;

        if part0 != 0 {
            self.fill_digits_32(part0);
            self.fill_digits_32_fixed_length(part1, 7);
            self.fill_digits_32_fixed_length(part2, 7);
        } else if part1 != 0 {
            self.fill_digits_32(part1);
            self.fill_digits_32_fixed_length(part2, 7);
        } else {
            self.fill_digits_32(part2);
        }
    }

    /// Adds one unit in the last place. An empty buffer stands for zero and
    /// becomes "1".
    fn round_up(&mut self, point: &mut i32) {
        if self.length == 0 {
            self.buffer[0] = b'1';
            *point = 1;
            self.length = 1;
            return;
        }
        self.buffer[self.length - 1] += 1;
        for i in (1..self.length).rev() {
            if self.buffer[i] != b'0' + 10 {
                return;
            }
            self.buffer[i] = b'0';
            self.buffer[i - 1] += 1;
        }
        // Every digit was a '9' and is now '0', so a leading '1' and a
        // shifted point finish the job.
        if self.buffer[0] == b'0' + 10 {
            self.buffer[0] = b'1';
            *point += 1;
        }
    }

    fn last_digit_is_odd(&self) -> bool {
        self.length > 0 && (self.buffer[self.length - 1] - b'0') % 2 == 1
    }

    /// Appends up to `fractional_count` digits of `fractionals * 2^exponent`
    /// (which is below one) and rounds. The rounding may carry into digits
    /// written earlier.
    fn fill_fractionals(
        &mut self,
        fractionals: u64,
        exponent: i32,
        fractional_count: i32,
        point: &mut i32,
    ) {
        debug_assert!((-128..=0).contains(&exponent));
        if -exponent <= 64 {
            debug_assert!(fractionals >> 56 == 0);
            // Multiplying by 5 and moving the binary point down by one is
            // multiplying by 10 without overflowing: three steps grow the
            // value by 125 < 2^7 while the point falls to 61 or less.
            let mut fractionals = fractionals;
            let mut binary_point = -exponent;
            for _ in 0..fractional_count {
                if fractionals == 0 {
                    break;
                }
                fractionals *= 5;
                binary_point -= 1;
                let digit = fractionals >> binary_point;
                debug_assert!(digit <= 9);
                self.buffer[self.length] = b'0' + digit as u8;
                self.length += 1;
                fractionals -= digit << binary_point;
            }
            if fractionals != 0 {
                debug_assert!(binary_point >= 1);
                let half = 1u64 << (binary_point - 1);
                if fractionals > half || (fractionals == half && self.last_digit_is_odd()) {
                    self.round_up(point);
                }
            }
        } else {
            debug_assert!(-exponent <= 128);
            let mut fractionals = (fractionals as u128) << (128 + exponent);
            let mut binary_point = 128;
            for _ in 0..fractional_count {
                if fractionals == 0 {
                    break;
                }
                fractionals *= 5;
                binary_point -= 1;
                let digit = fractionals >> binary_point;
                debug_assert!(digit <= 9);
                self.buffer[self.length] = b'0' + digit as u8;
                self.length += 1;
                fractionals -= digit << binary_point;
            }
            if fractionals != 0 {
                let half = 1u128 << (binary_point - 1);
                if fractionals > half || (fractionals == half && self.last_digit_is_odd()) {
                    self.round_up(point);
                }
            }
        }
    }

    fn trim_zeros(&mut self, point: &mut i32) {
        while self.length > 0 && self.buffer[self.length - 1] == b'0' {
            self.length -= 1;
        }
        let first_non_zero = self.buffer[..self.length]
            .iter()
            .position(|&c| c != b'0')
            .unwrap_or(self.length);
        if first_non_zero != 0 {
            self.buffer.copy_within(first_non_zero..self.length, 0);
            self.length -= first_non_zero;
            *point -= first_non_zero as i32;
        }
    }
}
