//! Fixed-capacity unsigned big integers, just large enough for exact
//! double conversions.
//!
//! A value is stored as little-endian 28-bit "bigits" followed by
//! `exponent` implicit zero bigits. Two bigits multiply into a `u64` with
//! eight bits to spare, which lets [`Bignum::square`] sum whole columns of
//! partial products before carrying.
//!
//! The capacity is fixed at [`Bignum::MAX_SIGNIFICANT_BITS`]. Exceeding it
//! is a caller bug and panics.

use core::cmp::Ordering;
use core::fmt;

type Chunk = u32;
type DoubleChunk = u64;

const CHUNK_SIZE: u32 = Chunk::BITS;
const BIGIT_SIZE: u32 = 28;
const BIGIT_MASK: Chunk = (1 << BIGIT_SIZE) - 1;
const MAX_SIGNIFICANT_BITS: usize = 3584;
const BIGIT_CAPACITY: usize = MAX_SIGNIFICANT_BITS.div_ceil(BIGIT_SIZE as usize);

// 5^27 is the largest power of five that fits in a u64; 5^13 fits in a u32.
const FIVE_27: u64 = 0x6765_c793_fa10_079d;
const FIVE_13: u32 = 1_220_703_125;
const FIVE_1_TO_12: [u32; 12] = [
    5, 25, 125, 625, 3125, 15625, 78125, 390625, 1953125, 9765625, 48828125, 244140625,
];

#[derive(Clone)]
pub struct Bignum {
    bigits: [Chunk; BIGIT_CAPACITY],
    used_bigits: usize,
    /// Number of implicit zero bigits below `bigits[0]`.
    exponent: usize,
}

impl Default for Bignum {
    fn default() -> Self {
        Self::new()
    }
}

impl Bignum {
    /// 3584 bits covers 10^1000, well beyond what any double needs.
    pub const MAX_SIGNIFICANT_BITS: usize = MAX_SIGNIFICANT_BITS;

    pub const fn new() -> Self {
        Self {
            bigits: [0; BIGIT_CAPACITY],
            used_bigits: 0,
            exponent: 0,
        }
    }

    pub fn from_u64(value: u64) -> Self {
        let mut result = Self::new();
        result.assign_u64(value);
        result
    }

    pub fn is_zero(&self) -> bool {
        self.used_bigits == 0
    }

    pub fn assign_u16(&mut self, value: u16) {
        self.zero();
        if value > 0 {
            self.bigits[0] = value as Chunk;
            self.used_bigits = 1;
        }
    }

    pub fn assign_u64(&mut self, mut value: u64) {
        self.zero();
        while value > 0 {
            self.bigits[self.used_bigits] = (value & BIGIT_MASK as u64) as Chunk;
            self.used_bigits += 1;
            value >>= BIGIT_SIZE;
        }
    }

    pub fn assign_bignum(&mut self, other: &Bignum) {
        self.exponent = other.exponent;
        self.bigits[..other.used_bigits].copy_from_slice(&other.bigits[..other.used_bigits]);
        self.used_bigits = other.used_bigits;
    }

    /// Parses ASCII decimal digits. The input must contain digits only.
    pub fn assign_decimal_string(&mut self, value: &[u8]) {
        // Largest digit count that always fits in a u64.
        const MAX_U64_DECIMAL_DIGITS: usize = 19;
        self.zero();
        let mut chunks = value.chunks_exact(MAX_U64_DECIMAL_DIGITS);
        for chunk in &mut chunks {
            self.multiply_by_power_of_ten(MAX_U64_DECIMAL_DIGITS as i32);
            self.add_u64(read_u64(chunk));
        }
        let rest = chunks.remainder();
        self.multiply_by_power_of_ten(rest.len() as i32);
        self.add_u64(read_u64(rest));
        self.clamp();
    }

    /// Parses ASCII hex digits (either case). The input must contain hex
    /// digits only.
    pub fn assign_hex_string(&mut self, value: &[u8]) {
        self.zero();
        self.ensure_capacity((value.len() * 4).div_ceil(BIGIT_SIZE as usize));
        // Collects hex digits, least significant first, until a whole
        // bigit is available.
        let mut tmp: DoubleChunk = 0;
        let mut bits = 0;
        for &c in value.iter().rev() {
            tmp |= (hex_char_value(c) as DoubleChunk) << bits;
            bits += 4;
            if bits >= BIGIT_SIZE {
                self.bigits[self.used_bigits] = (tmp & BIGIT_MASK as DoubleChunk) as Chunk;
                self.used_bigits += 1;
                bits -= BIGIT_SIZE;
                tmp >>= BIGIT_SIZE;
            }
        }
        if tmp > 0 {
            self.bigits[self.used_bigits] = tmp as Chunk;
            self.used_bigits += 1;
        }
        self.clamp();
    }

    /// Sets `self` to `base^power_exponent`. `base` must be non-zero.
    pub fn assign_power_u16(&mut self, mut base: u16, power_exponent: i32) {
        debug_assert!(base != 0);
        debug_assert!(power_exponent >= 0);
        if power_exponent == 0 {
            self.assign_u16(1);
            return;
        }
        self.zero();
        let shifts = base.trailing_zeros() as i32;
        base >>= shifts;
        let bit_size = (u16::BITS - base.leading_zeros()) as i32;
        self.ensure_capacity((bit_size * power_exponent) as usize / BIGIT_SIZE as usize + 2);

        // Left-to-right exponentiation. `mask` starts just below the top
        // set bit of the exponent, since that bit is the initial `base`.
        let mut mask: i32 = 1;
        while power_exponent >= mask {
            mask <<= 1;
        }
        mask >>= 2;
        let mut this_value = base as u64;

        // Stay in a u64 for as long as the square fits.
        let mut delayed_multiplication = false;
        while mask != 0 && this_value <= u32::MAX as u64 {
            this_value *= this_value;
            if power_exponent & mask != 0 {
                let base_bits_mask = !((1u64 << (64 - bit_size)) - 1);
                if this_value & base_bits_mask == 0 {
                    this_value *= base as u64;
                } else {
                    delayed_multiplication = true;
                }
            }
            mask >>= 1;
        }
        self.assign_u64(this_value);
        if delayed_multiplication {
            self.multiply_by_u32(base as u32);
        }

        while mask != 0 {
            self.square();
            if power_exponent & mask != 0 {
                self.multiply_by_u32(base as u32);
            }
            mask >>= 1;
        }

        self.shift_left(shifts * power_exponent);
    }

    pub fn add_u64(&mut self, operand: u64) {
        if operand == 0 {
            return;
        }
        self.add_bignum(&Bignum::from_u64(operand));
    }

    pub fn add_bignum(&mut self, other: &Bignum) {
        debug_assert!(self.is_clamped());
        debug_assert!(other.is_clamped());

        // Either operand may be the longer one, and either way the sum
        // may need one extra carry bigit:
        //   aaaaaaaaaaa 0000       aaaaaaaaaa 0000
        //     bbbbb 00000000     bbbbbbbbb 0000000
        self.align(other);
        self.ensure_capacity(1 + self.bigit_length().max(other.bigit_length()) - self.exponent);

        let mut bigit_pos = other.exponent - self.exponent;
        for i in self.used_bigits..bigit_pos {
            self.bigits[i] = 0;
        }
        let mut carry: Chunk = 0;
        for &bigit in &other.bigits[..other.used_bigits] {
            let my = self.raw_bigit_or_zero(bigit_pos);
            let sum = my + bigit + carry;
            self.bigits[bigit_pos] = sum & BIGIT_MASK;
            carry = sum >> BIGIT_SIZE;
            bigit_pos += 1;
        }
        while carry != 0 {
            let my = self.raw_bigit_or_zero(bigit_pos);
            let sum = my + carry;
            self.bigits[bigit_pos] = sum & BIGIT_MASK;
            carry = sum >> BIGIT_SIZE;
            bigit_pos += 1;
        }
        self.used_bigits = self.used_bigits.max(bigit_pos);
        debug_assert!(self.is_clamped());
    }

    /// `self -= other`. Requires `self >= other`.
    pub fn subtract_bignum(&mut self, other: &Bignum) {
        debug_assert!(self.is_clamped());
        debug_assert!(other.is_clamped());
        debug_assert!(Bignum::less_equal(other, self));

        self.align(other);
        let offset = other.exponent - self.exponent;
        let mut borrow: Chunk = 0;
        let mut i = 0;
        while i < other.used_bigits {
            let difference = self.bigits[i + offset]
                .wrapping_sub(other.bigits[i])
                .wrapping_sub(borrow);
            self.bigits[i + offset] = difference & BIGIT_MASK;
            borrow = difference >> (CHUNK_SIZE - 1);
            i += 1;
        }
        while borrow != 0 {
            let difference = self.bigits[i + offset].wrapping_sub(borrow);
            self.bigits[i + offset] = difference & BIGIT_MASK;
            borrow = difference >> (CHUNK_SIZE - 1);
            i += 1;
        }
        self.clamp();
    }

    pub fn shift_left(&mut self, shift_amount: i32) {
        debug_assert!(shift_amount >= 0);
        if self.used_bigits == 0 {
            return;
        }
        self.exponent += shift_amount as usize / BIGIT_SIZE as usize;
        let local_shift = shift_amount as u32 % BIGIT_SIZE;
        self.ensure_capacity(self.used_bigits + 1);
        self.bigits_shift_left(local_shift);
    }

    pub fn multiply_by_u32(&mut self, factor: u32) {
        if factor == 1 {
            return;
        }
        if factor == 0 {
            self.zero();
            return;
        }
        // A bigit times a u32 plus a carry stays below 2^60.
        let mut carry: DoubleChunk = 0;
        for bigit in &mut self.bigits[..self.used_bigits] {
            let product = factor as DoubleChunk * *bigit as DoubleChunk + carry;
            *bigit = (product & BIGIT_MASK as DoubleChunk) as Chunk;
            carry = product >> BIGIT_SIZE;
        }
        self.push_carry(carry as u128);
    }

    pub fn multiply_by_u64(&mut self, factor: u64) {
        if factor == 1 {
            return;
        }
        if factor == 0 {
            self.zero();
            return;
        }
        let mut carry: u128 = 0;
        for bigit in &mut self.bigits[..self.used_bigits] {
            let product = factor as u128 * *bigit as u128 + carry;
            *bigit = (product & BIGIT_MASK as u128) as Chunk;
            carry = product >> BIGIT_SIZE;
        }
        self.push_carry(carry);
    }

    /// Multiplies by `10^exponent`, as `5^exponent` followed by a shift.
    pub fn multiply_by_power_of_ten(&mut self, exponent: i32) {
        debug_assert!(exponent >= 0);
        if exponent == 0 || self.used_bigits == 0 {
            return;
        }
        let mut remaining_exponent = exponent;
        while remaining_exponent >= 27 {
            self.multiply_by_u64(FIVE_27);
            remaining_exponent -= 27;
        }
        while remaining_exponent >= 13 {
            self.multiply_by_u32(FIVE_13);
            remaining_exponent -= 13;
        }
        if remaining_exponent > 0 {
            self.multiply_by_u32(FIVE_1_TO_12[remaining_exponent as usize - 1]);
        }
        self.shift_left(exponent);
    }

    pub fn times_10(&mut self) {
        self.multiply_by_u32(10);
    }

    /// Replaces `self` with `self * self` (Comba multiplication: every
    /// column of partial products is summed before carrying).
    pub fn square(&mut self) {
        debug_assert!(self.is_clamped());
        let used = self.used_bigits;
        let product_length = 2 * used;
        self.ensure_capacity(product_length);
        // Each column sums at most `used` products of two bigits; the
        // accumulator has 2 * (32 - 28) bits of headroom for that.
        debug_assert!(used < 1 << (2 * (CHUNK_SIZE - BIGIT_SIZE)));

        let source = self.bigits;
        let mut accumulator: DoubleChunk = 0;
        for i in 0..product_length {
            let low = (i + 1).saturating_sub(used);
            let high = i.min(used - 1);
            for j in low..=high {
                accumulator += source[j] as DoubleChunk * source[i - j] as DoubleChunk;
            }
            self.bigits[i] = (accumulator & BIGIT_MASK as DoubleChunk) as Chunk;
            accumulator >>= BIGIT_SIZE;
        }
        debug_assert_eq!(accumulator, 0);

        self.used_bigits = product_length;
        self.exponent *= 2;
        self.clamp();
    }

    /// Divides `self` by `other`, leaving the remainder in `self` and
    /// returning the quotient.
    ///
    /// Meant for small quotients (digit generation stays below 10); the
    /// cost grows with the quotient. `other` must be non-zero.
    pub fn divide_modulo_int_bignum(&mut self, other: &Bignum) -> u16 {
        debug_assert!(self.is_clamped());
        debug_assert!(other.is_clamped());
        debug_assert!(other.used_bigits > 0);

        // Also covers self == 0.
        if self.bigit_length() < other.bigit_length() {
            return 0;
        }

        self.align(other);

        let mut result: u16 = 0;

        // Subtract multiples of other until both have the same length.
        while self.bigit_length() > other.bigit_length() {
            debug_assert!(other.bigits[other.used_bigits - 1] >= (1 << BIGIT_SIZE) / 16);
            debug_assert!(self.bigits[self.used_bigits - 1] < 0x10000);
            // e.g. self = 23 and other = 9: remove 2 multiples.
            let top = self.bigits[self.used_bigits - 1];
            result += top as u16;
            self.subtract_times(other, top);
        }

        debug_assert_eq!(self.bigit_length(), other.bigit_length());

        let this_bigit = self.bigits[self.used_bigits - 1];
        let other_bigit = other.bigits[other.used_bigits - 1];

        if other.used_bigits == 1 {
            let quotient = this_bigit / other_bigit;
            self.bigits[self.used_bigits - 1] = this_bigit - other_bigit * quotient;
            debug_assert!(quotient < 0x10000);
            result += quotient as u16;
            self.clamp();
            return result;
        }

        let division_estimate = this_bigit / (other_bigit + 1);
        debug_assert!(division_estimate < 0x10000);
        result += division_estimate as u16;
        self.subtract_times(other, division_estimate);

        if other_bigit * (division_estimate + 1) > this_bigit {
            // Even with other's lower bigits all zero, one more
            // subtraction would overshoot.
            return result;
        }

        while Bignum::less_equal(other, self) {
            self.subtract_bignum(other);
            result += 1;
        }
        result
    }

    pub fn compare(a: &Bignum, b: &Bignum) -> Ordering {
        debug_assert!(a.is_clamped());
        debug_assert!(b.is_clamped());
        let bigit_length_a = a.bigit_length();
        let bigit_length_b = b.bigit_length();
        match bigit_length_a.cmp(&bigit_length_b) {
            Ordering::Equal => {}
            ordering => return ordering,
        }
        for i in (a.exponent.min(b.exponent)..bigit_length_a).rev() {
            match a.bigit_or_zero(i).cmp(&b.bigit_or_zero(i)) {
                Ordering::Equal => {}
                ordering => return ordering,
            }
        }
        Ordering::Equal
    }

    pub fn equal(a: &Bignum, b: &Bignum) -> bool {
        Bignum::compare(a, b) == Ordering::Equal
    }

    pub fn less_equal(a: &Bignum, b: &Bignum) -> bool {
        Bignum::compare(a, b) != Ordering::Greater
    }

    pub fn less(a: &Bignum, b: &Bignum) -> bool {
        Bignum::compare(a, b) == Ordering::Less
    }

    /// Compares `a + b` with `c` without computing the sum.
    pub fn plus_compare(a: &Bignum, b: &Bignum, c: &Bignum) -> Ordering {
        debug_assert!(a.is_clamped());
        debug_assert!(b.is_clamped());
        debug_assert!(c.is_clamped());
        if a.bigit_length() < b.bigit_length() {
            return Bignum::plus_compare(b, a, c);
        }
        if a.bigit_length() + 1 < c.bigit_length() {
            return Ordering::Less;
        }
        if a.bigit_length() > c.bigit_length() {
            return Ordering::Greater;
        }
        // If a's implicit zero bigits cover all of b, the sum is no longer
        // than a, and therefore shorter than c.
        if a.exponent >= b.bigit_length() && a.bigit_length() < c.bigit_length() {
            return Ordering::Less;
        }

        let mut borrow: Chunk = 0;
        // Below the smallest exponent every bigit is zero.
        let min_exponent = a.exponent.min(b.exponent).min(c.exponent);
        for i in (min_exponent..c.bigit_length()).rev() {
            let chunk_a = a.bigit_or_zero(i);
            let chunk_b = b.bigit_or_zero(i);
            let chunk_c = c.bigit_or_zero(i);
            let sum = chunk_a + chunk_b;
            if sum > chunk_c + borrow {
                return Ordering::Greater;
            }
            borrow = chunk_c + borrow - sum;
            if borrow > 1 {
                return Ordering::Less;
            }
            borrow <<= BIGIT_SIZE;
        }
        if borrow == 0 {
            Ordering::Equal
        } else {
            Ordering::Less
        }
    }

    pub fn plus_equal(a: &Bignum, b: &Bignum, c: &Bignum) -> bool {
        Bignum::plus_compare(a, b, c) == Ordering::Equal
    }

    pub fn plus_less_equal(a: &Bignum, b: &Bignum, c: &Bignum) -> bool {
        Bignum::plus_compare(a, b, c) != Ordering::Greater
    }

    pub fn plus_less(a: &Bignum, b: &Bignum, c: &Bignum) -> bool {
        Bignum::plus_compare(a, b, c) == Ordering::Less
    }

    fn zero(&mut self) {
        self.used_bigits = 0;
        self.exponent = 0;
    }

    fn ensure_capacity(&self, size: usize) {
        assert!(size <= BIGIT_CAPACITY, "bignum capacity exceeded");
    }

    fn is_clamped(&self) -> bool {
        self.used_bigits == 0 || self.bigits[self.used_bigits - 1] != 0
    }

    /// Drops leading zero bigits.
    fn clamp(&mut self) {
        while self.used_bigits > 0 && self.bigits[self.used_bigits - 1] == 0 {
            self.used_bigits -= 1;
        }
        if self.used_bigits == 0 {
            self.exponent = 0;
        }
    }

    /// Makes `self.exponent <= other.exponent` by materializing implicit
    /// zero bigits. The value does not change.
    fn align(&mut self, other: &Bignum) {
        if self.exponent > other.exponent {
            let zero_bigits = self.exponent - other.exponent;
            self.ensure_capacity(self.used_bigits + zero_bigits);
            self.bigits.copy_within(0..self.used_bigits, zero_bigits);
            self.bigits[..zero_bigits].fill(0);
            self.used_bigits += zero_bigits;
            self.exponent -= zero_bigits;
        }
    }

    /// Number of bigits including the implicit zeros.
    fn bigit_length(&self) -> usize {
        self.used_bigits + self.exponent
    }

    /// Bigit at absolute position `index`, counting implicit zeros.
    fn bigit_or_zero(&self, index: usize) -> Chunk {
        if index >= self.bigit_length() || index < self.exponent {
            return 0;
        }
        self.bigits[index - self.exponent]
    }

    fn raw_bigit_or_zero(&self, index: usize) -> Chunk {
        if index < self.used_bigits {
            self.bigits[index]
        } else {
            0
        }
    }

    fn bigits_shift_left(&mut self, shift_amount: u32) {
        debug_assert!(shift_amount < BIGIT_SIZE);
        let mut carry: Chunk = 0;
        for bigit in &mut self.bigits[..self.used_bigits] {
            let new_carry = *bigit >> (BIGIT_SIZE - shift_amount);
            *bigit = ((*bigit << shift_amount) + carry) & BIGIT_MASK;
            carry = new_carry;
        }
        if carry != 0 {
            self.bigits[self.used_bigits] = carry;
            self.used_bigits += 1;
        }
    }

    fn push_carry(&mut self, mut carry: u128) {
        while carry != 0 {
            self.ensure_capacity(self.used_bigits + 1);
            self.bigits[self.used_bigits] = (carry & BIGIT_MASK as u128) as Chunk;
            self.used_bigits += 1;
            carry >>= BIGIT_SIZE;
        }
    }

    /// `self -= factor * other`. Requires `self.exponent <= other.exponent`
    /// and a non-negative result.
    fn subtract_times(&mut self, other: &Bignum, factor: Chunk) {
        debug_assert!(self.exponent <= other.exponent);
        if factor < 3 {
            for _ in 0..factor {
                self.subtract_bignum(other);
            }
            return;
        }
        let mut borrow: Chunk = 0;
        let exponent_diff = other.exponent - self.exponent;
        for i in 0..other.used_bigits {
            let product = factor as DoubleChunk * other.bigits[i] as DoubleChunk;
            let remove = borrow as DoubleChunk + product;
            let difference = self.bigits[i + exponent_diff]
                .wrapping_sub((remove & BIGIT_MASK as DoubleChunk) as Chunk);
            self.bigits[i + exponent_diff] = difference & BIGIT_MASK;
            borrow = (difference >> (CHUNK_SIZE - 1)) + (remove >> BIGIT_SIZE) as Chunk;
        }
        for i in other.used_bigits + exponent_diff..self.used_bigits {
            if borrow == 0 {
                break;
            }
            let difference = self.bigits[i].wrapping_sub(borrow);
            self.bigits[i] = difference & BIGIT_MASK;
            borrow = difference >> (CHUNK_SIZE - 1);
        }
        self.clamp();
    }
}

fn read_u64(digits: &[u8]) -> u64 {
    digits
        .iter()
        .fold(0, |acc, &c| acc * 10 + (c - b'0') as u64)
}

fn hex_char_value(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => 10 + c - b'a',
        b'A'..=b'F' => 10 + c - b'A',
        _ => {
            debug_assert!(false, "not a hex digit: {c}");
            0
        }
    }
}

impl fmt::UpperHex for Bignum {
    /// Writes the value in upper-case hex without leading zeros.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_assert!(self.is_clamped());
        if self.used_bigits == 0 {
            return f.write_str("0");
        }
        // Each bigit is exactly seven hex digits.
        write!(f, "{:X}", self.bigits[self.used_bigits - 1])?;
        for bigit in self.bigits[..self.used_bigits - 1].iter().rev() {
            write!(f, "{bigit:07X}")?;
        }
        for _ in 0..self.exponent {
            f.write_str("0000000")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Bignum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bignum(0x{self:X})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hex(bignum: &Bignum) -> String {
        format!("{bignum:X}")
    }

    fn from_hex(value: &str) -> Bignum {
        let mut bignum = Bignum::new();
        bignum.assign_hex_string(value.as_bytes());
        bignum
    }

    fn from_decimal(value: &str) -> Bignum {
        let mut bignum = Bignum::new();
        bignum.assign_decimal_string(value.as_bytes());
        bignum
    }

    fn from_u128(value: u128) -> Bignum {
        from_hex(&format!("{value:X}"))
    }

    #[test]
    fn assign() {
        let mut bignum = Bignum::new();
        assert_eq!(hex(&bignum), "0");
        bignum.assign_u16(0);
        assert_eq!(hex(&bignum), "0");
        bignum.assign_u16(0xA);
        assert_eq!(hex(&bignum), "A");
        bignum.assign_u16(0x20);
        assert_eq!(hex(&bignum), "20");
        bignum.assign_u64(0);
        assert_eq!(hex(&bignum), "0");
        bignum.assign_u64(0xFFFF_FFFF_FFFF_FFFF);
        assert_eq!(hex(&bignum), "FFFFFFFFFFFFFFFF");
        bignum.assign_u64(0x1234_5678_9ABC_DEF0);
        assert_eq!(hex(&bignum), "123456789ABCDEF0");

        let mut copy = Bignum::new();
        copy.assign_bignum(&bignum);
        assert_eq!(hex(&copy), "123456789ABCDEF0");
    }

    #[test]
    fn assign_hex_string() {
        assert_eq!(hex(&from_hex("0")), "0");
        assert_eq!(hex(&from_hex("123456789ABCDEF0")), "123456789ABCDEF0");
        assert_eq!(hex(&from_hex("fedcba98")), "FEDCBA98");
        assert_eq!(
            hex(&from_hex("000000000000000000000000000001")),
            "1"
        );
        assert_eq!(
            hex(&from_hex("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF")),
            "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF"
        );
    }

    #[test]
    fn assign_decimal_string() {
        assert_eq!(hex(&from_decimal("0")), "0");
        assert_eq!(hex(&from_decimal("1")), "1");
        assert_eq!(hex(&from_decimal("1234567890")), "499602D2");
        assert_eq!(
            hex(&from_decimal("12345678901234567890")),
            "AB54A98CEB1F0AD2"
        );
        assert_eq!(
            hex(&from_decimal("100000000000000000000000000000000000000000000")),
            "47BF19673DF52E37F2410011D100000000000"
        );
    }

    #[test]
    fn shift_left() {
        let mut bignum = from_hex("0");
        bignum.shift_left(100);
        assert_eq!(hex(&bignum), "0");

        let mut bignum = from_hex("1");
        bignum.shift_left(1);
        assert_eq!(hex(&bignum), "2");
        bignum.shift_left(4);
        assert_eq!(hex(&bignum), "20");
        bignum.shift_left(28);
        assert_eq!(hex(&bignum), "200000000");

        let mut bignum = from_hex("123456789ABCDEF");
        bignum.shift_left(64);
        assert_eq!(hex(&bignum), "123456789ABCDEF0000000000000000");
        bignum.shift_left(1);
        assert_eq!(hex(&bignum), "2468ACF13579BDE0000000000000000");
    }

    #[test]
    fn add() {
        let mut bignum = from_hex("0");
        bignum.add_u64(0xA);
        assert_eq!(hex(&bignum), "A");

        let mut bignum = from_hex("FFFFFFF");
        bignum.add_u64(1);
        assert_eq!(hex(&bignum), "10000000");

        let mut bignum = from_hex("10000000000000000000000000000000000000000000");
        bignum.add_u64(0xFFFF);
        assert_eq!(hex(&bignum), "1000000000000000000000000000000000000000FFFF");

        let mut bignum = from_hex("1");
        bignum.shift_left(100);
        let mut other = from_hex("1");
        other.shift_left(48);
        bignum.add_bignum(&other);
        assert_eq!(hex(&bignum), "10000000000001000000000000");

        let mut other = from_hex("1");
        other.shift_left(100);
        let mut bignum = from_hex("F");
        bignum.add_bignum(&other);
        assert_eq!(hex(&bignum), "1000000000000000000000000F");
    }

    #[test]
    fn subtract() {
        let mut bignum = from_hex("10000000");
        bignum.subtract_bignum(&from_hex("1"));
        assert_eq!(hex(&bignum), "FFFFFFF");

        let mut bignum = from_hex("1");
        bignum.shift_left(100);
        let mut other = from_hex("1");
        other.shift_left(50);
        bignum.subtract_bignum(&other);
        assert_eq!(hex(&bignum), "FFFFFFFFFFFFC000000000000");

        let mut bignum = from_hex("1000000000001");
        bignum.subtract_bignum(&from_hex("1000000000001"));
        assert_eq!(hex(&bignum), "0");
        assert!(bignum.is_zero());
    }

    #[test]
    fn multiply_by_small_factors() {
        let mut bignum = from_hex("0");
        bignum.multiply_by_u32(0x25);
        assert_eq!(hex(&bignum), "0");

        let mut bignum = from_hex("2");
        bignum.multiply_by_u32(0x5);
        assert_eq!(hex(&bignum), "A");

        let mut bignum = from_hex("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF");
        bignum.multiply_by_u32(0xFFFF_FFFF);
        assert_eq!(hex(&bignum), "FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFFFF00000001");

        let mut bignum = from_hex("1234567ABCD");
        bignum.multiply_by_u64(0);
        assert_eq!(hex(&bignum), "0");

        let mut bignum = from_hex("FFFFFFFFFFFFFFFF");
        bignum.multiply_by_u64(0xFFFF_FFFF_FFFF_FFFF);
        assert_eq!(hex(&bignum), "FFFFFFFFFFFFFFFE0000000000000001");

        let mut bignum = from_hex("1");
        bignum.shift_left(100);
        bignum.multiply_by_u64(0x10);
        assert_eq!(hex(&bignum), "100000000000000000000000000");
    }

    #[test]
    fn multiply_by_power_of_ten() {
        let mut bignum = from_decimal("1");
        bignum.multiply_by_power_of_ten(1);
        assert_eq!(hex(&bignum), "A");

        let mut bignum = from_decimal("1");
        bignum.multiply_by_power_of_ten(27);
        assert_eq!(hex(&from_decimal("1000000000000000000000000000")), hex(&bignum));

        let mut bignum = from_decimal("7");
        bignum.multiply_by_power_of_ten(100);
        let mut expected = String::from("7");
        expected.extend(core::iter::repeat_n('0', 100));
        assert_eq!(hex(&bignum), hex(&from_decimal(&expected)));

        let mut bignum = from_decimal("0");
        bignum.multiply_by_power_of_ten(5);
        assert_eq!(hex(&bignum), "0");
    }

    #[test]
    fn square() {
        let mut bignum = from_hex("FFFFFFFFFFFFFFFF");
        bignum.square();
        assert_eq!(hex(&bignum), "FFFFFFFFFFFFFFFE0000000000000001");

        let mut bignum = from_hex("1");
        bignum.shift_left(60);
        bignum.square();
        assert_eq!(hex(&bignum), "1000000000000000000000000000000");
    }

    #[test]
    fn assign_power_u16() {
        let mut bignum = Bignum::new();
        bignum.assign_power_u16(1, 0);
        assert_eq!(hex(&bignum), "1");
        bignum.assign_power_u16(1, 10);
        assert_eq!(hex(&bignum), "1");
        bignum.assign_power_u16(2, 0);
        assert_eq!(hex(&bignum), "1");
        bignum.assign_power_u16(2, 1);
        assert_eq!(hex(&bignum), "2");
        bignum.assign_power_u16(2, 10);
        assert_eq!(hex(&bignum), "400");
        bignum.assign_power_u16(16, 4);
        assert_eq!(hex(&bignum), "10000");
        bignum.assign_power_u16(10, 20);
        assert_eq!(hex(&bignum), "56BC75E2D63100000");
        bignum.assign_power_u16(5, 30);
        assert_eq!(hex(&bignum), "327CB2734119D3B7A9");

        let mut expected = String::from("1");
        expected.extend(core::iter::repeat_n('0', 300));
        bignum.assign_power_u16(10, 300);
        assert_eq!(hex(&bignum), hex(&from_decimal(&expected)));
    }

    #[test]
    fn divide_modulo() {
        let mut bignum = from_decimal("23");
        let other = from_decimal("9");
        assert_eq!(bignum.divide_modulo_int_bignum(&other), 2);
        assert_eq!(hex(&bignum), "5");

        let mut bignum = from_decimal("3");
        assert_eq!(bignum.divide_modulo_int_bignum(&from_decimal("7")), 0);
        assert_eq!(hex(&bignum), "3");

        // Remainders are exact for multi-bigit divisors too.
        let mut divisor = from_hex("1234567890ABCDEF");
        divisor.shift_left(200);
        let mut bignum = divisor.clone();
        bignum.multiply_by_u32(9);
        bignum.add_u64(0xFFFF);
        assert_eq!(bignum.divide_modulo_int_bignum(&divisor), 9);
        assert_eq!(hex(&bignum), "FFFF");

        let mut bignum = from_hex("0");
        assert_eq!(bignum.divide_modulo_int_bignum(&from_hex("5")), 0);
    }

    #[test]
    fn compare() {
        let a = from_hex("1");
        let b = from_hex("2");
        assert_eq!(Bignum::compare(&a, &b), Ordering::Less);
        assert_eq!(Bignum::compare(&b, &a), Ordering::Greater);
        assert!(Bignum::equal(&a, &from_hex("1")));
        assert!(Bignum::less_equal(&a, &a));
        assert!(!Bignum::less(&a, &a));

        // Same value, different bigit layout.
        let mut shifted = from_hex("1");
        shifted.shift_left(56);
        let plain = from_hex("100000000000000");
        assert_eq!(Bignum::compare(&shifted, &plain), Ordering::Equal);
        let mut plain = plain;
        plain.add_u64(1);
        assert_eq!(Bignum::compare(&shifted, &plain), Ordering::Less);
    }

    #[test]
    fn plus_compare() {
        let a = from_hex("1");
        let b = from_hex("0");
        let c = from_hex("1");
        assert_eq!(Bignum::plus_compare(&a, &b, &c), Ordering::Equal);
        assert!(Bignum::plus_equal(&a, &b, &c));

        let a = from_hex("FFFFFFF");
        let b = from_hex("1");
        let c = from_hex("10000000");
        assert_eq!(Bignum::plus_compare(&a, &b, &c), Ordering::Equal);
        assert!(Bignum::plus_less_equal(&a, &b, &c));
        assert!(!Bignum::plus_less(&a, &b, &c));

        let mut a = from_hex("12345");
        a.shift_left(200);
        let b = from_hex("1");
        let mut c = from_hex("12345");
        c.shift_left(200);
        assert_eq!(Bignum::plus_compare(&a, &b, &c), Ordering::Greater);
        c.add_u64(1);
        assert_eq!(Bignum::plus_compare(&a, &b, &c), Ordering::Equal);
        c.add_u64(1);
        assert_eq!(Bignum::plus_compare(&a, &b, &c), Ordering::Less);
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn capacity_is_enforced() {
        let mut bignum = from_hex("FFFFFFF");
        for _ in 0..8 {
            bignum.square();
        }
    }

    proptest! {
        #[test]
        fn add_matches_u128(a in 0u128..(1 << 126), b in 0u128..(1 << 126)) {
            let mut bignum = from_u128(a);
            bignum.add_bignum(&from_u128(b));
            prop_assert_eq!(hex(&bignum), format!("{:X}", a + b));
        }

        #[test]
        fn subtract_matches_u128(a in any::<u128>(), b in any::<u128>()) {
            let (big, small) = if a >= b { (a, b) } else { (b, a) };
            let mut bignum = from_u128(big);
            bignum.subtract_bignum(&from_u128(small));
            prop_assert_eq!(hex(&bignum), format!("{:X}", big - small));
        }

        #[test]
        fn multiply_matches_u128(a in any::<u64>(), b in any::<u64>()) {
            let mut bignum = Bignum::from_u64(a);
            bignum.multiply_by_u64(b);
            prop_assert_eq!(hex(&bignum), format!("{:X}", a as u128 * b as u128));

            let mut bignum = Bignum::from_u64(a);
            bignum.multiply_by_u32(b as u32);
            prop_assert_eq!(hex(&bignum), format!("{:X}", a as u128 * (b as u32) as u128));
        }

        #[test]
        fn square_matches_u128(a in any::<u64>()) {
            let mut bignum = Bignum::from_u64(a);
            bignum.square();
            prop_assert_eq!(hex(&bignum), format!("{:X}", a as u128 * a as u128));
        }

        #[test]
        fn shift_matches_u128(a in any::<u64>(), shift in 0i32..64) {
            let mut bignum = Bignum::from_u64(a);
            bignum.shift_left(shift);
            prop_assert_eq!(hex(&bignum), format!("{:X}", (a as u128) << shift));
        }

        #[test]
        fn compare_matches_u128(a in any::<u128>(), b in any::<u128>(), shift in 0i32..100) {
            prop_assert_eq!(Bignum::compare(&from_u128(a), &from_u128(b)), a.cmp(&b));

            // Exercise differing exponents as well.
            let mut shifted_a = from_u128(a);
            shifted_a.shift_left(shift);
            let mut shifted_b = from_u128(b);
            shifted_b.shift_left(shift);
            prop_assert_eq!(Bignum::compare(&shifted_a, &shifted_b), a.cmp(&b));
        }

        #[test]
        fn plus_compare_matches_u128(a in 0u128..(1 << 126), b in 0u128..(1 << 126), c in 0u128..(1 << 127)) {
            prop_assert_eq!(
                Bignum::plus_compare(&from_u128(a), &from_u128(b), &from_u128(c)),
                (a + b).cmp(&c)
            );
        }

        #[test]
        fn divide_matches_u128(q in 0u32..10, divisor in 1u128..(1 << 120), remainder_seed in any::<u128>()) {
            let remainder = remainder_seed % divisor;
            let mut bignum = from_u128(divisor * q as u128 + remainder);
            prop_assert_eq!(bignum.divide_modulo_int_bignum(&from_u128(divisor)) as u32, q);
            prop_assert_eq!(hex(&bignum), format!("{remainder:X}"));
        }

        #[test]
        fn decimal_string_matches_u128(a in any::<u128>()) {
            prop_assert_eq!(hex(&from_decimal(&format!("{a}"))), format!("{a:X}"));
        }
    }
}
