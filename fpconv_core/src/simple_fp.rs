//! A tiny software floating point type: a 64-bit significand and a binary
//! exponent, with no sign and no hidden bit.
//!
//! Operations do not normalize their results; callers call
//! [`SimpleFp::normalize`] when they need the top bit set.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleFp {
    significand: u64,
    exponent: i32,
}

impl SimpleFp {
    pub const SIGNIFICAND_SIZE: i32 = 64;

    const MSB: u64 = 0x8000_0000_0000_0000;

    pub const fn new(significand: u64, exponent: i32) -> Self {
        Self {
            significand,
            exponent,
        }
    }

    pub fn significand(&self) -> u64 {
        self.significand
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    pub fn set_significand(&mut self, significand: u64) {
        self.significand = significand;
    }

    pub fn set_exponent(&mut self, exponent: i32) {
        self.exponent = exponent;
    }

    /// `self - other`. Both operands must have the same exponent and the
    /// result must not be negative.
    pub fn subtract(&mut self, other: &SimpleFp) {
        debug_assert_eq!(self.exponent, other.exponent);
        debug_assert!(self.significand >= other.significand);
        self.significand -= other.significand;
    }

    pub fn minus(a: &SimpleFp, b: &SimpleFp) -> SimpleFp {
        let mut result = *a;
        result.subtract(b);
        result
    }

    /// Keeps the upper 64 bits of the 128-bit product, rounded half up on
    /// the discarded half. The result is not normalized.
    pub fn multiply(&mut self, other: &SimpleFp) {
        const M32: u64 = 0xFFFF_FFFF;
        let a = self.significand >> 32;
        let b = self.significand & M32;
        let c = other.significand >> 32;
        let d = other.significand & M32;
        let ac = a * c;
        let bc = b * c;
        let ad = a * d;
        let bd = b * d;
        // Rounding: add 1/2 of the discarded low word before dropping it
        let tmp = (bd >> 32) + (ad & M32) + (bc & M32) + (1u64 << 31);
        self.significand = ac + (ad >> 32) + (bc >> 32) + (tmp >> 32);
        self.exponent += other.exponent + 64;
    }

    pub fn times(a: &SimpleFp, b: &SimpleFp) -> SimpleFp {
        let mut result = *a;
        result.multiply(b);
        result
    }

    pub fn normalize(&mut self) {
        debug_assert!(self.significand != 0);
        let mut significand = self.significand;
        let mut exponent = self.exponent;

        // Most callers start within a few bits of normalized, so take big
        // steps first.
        const TEN_MS_BITS: u64 = 0xFFC0_0000_0000_0000;
        while significand & TEN_MS_BITS == 0 {
            significand <<= 10;
            exponent -= 10;
        }
        while significand & Self::MSB == 0 {
            significand <<= 1;
            exponent -= 1;
        }
        self.significand = significand;
        self.exponent = exponent;
    }

    pub fn normalized(&self) -> SimpleFp {
        let mut result = *self;
        result.normalize();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtract() {
        let mut a = SimpleFp::new(3, 0);
        let b = SimpleFp::new(1, 0);
        let diff = SimpleFp::minus(&a, &b);
        assert_eq!(diff.significand(), 2);
        assert_eq!(diff.exponent(), 0);
        a.subtract(&b);
        assert_eq!(a, diff);
    }

    #[test]
    fn multiply() {
        let a = SimpleFp::new(3, 0);
        let b = SimpleFp::new(2, 0);
        let product = SimpleFp::times(&a, &b);
        assert_eq!(product.significand(), 0);
        assert_eq!(product.exponent(), 64);

        let a = SimpleFp::new(0x8000_0000_0000_0000, 11);
        let b = SimpleFp::new(2, 13);
        let product = SimpleFp::times(&a, &b);
        assert_eq!(product.significand(), 1);
        assert_eq!(product.exponent(), 11 + 13 + 64);

        // Test rounding.
        let a = SimpleFp::new(0x8000_0000_0000_0001, 11);
        let b = SimpleFp::new(1, 13);
        let product = SimpleFp::times(&a, &b);
        assert_eq!(product.significand(), 1);
        assert_eq!(product.exponent(), 11 + 13 + 64);

        let a = SimpleFp::new(0x7FFF_FFFF_FFFF_FFFF, 11);
        let b = SimpleFp::new(1, 13);
        let product = SimpleFp::times(&a, &b);
        assert_eq!(product.significand(), 0);
        assert_eq!(product.exponent(), 11 + 13 + 64);

        // Halfway cases are allowed to round either way, so don't check them.
        let a = SimpleFp::new(0xFFFF_FFFF_FFFF_FFFF, 11);
        let b = SimpleFp::new(0xFFFF_FFFF_FFFF_FFFF, 13);
        // 128bit result: 0xFFFFFFFFFFFFFFFE0000000000000001
        let product = SimpleFp::times(&a, &b);
        assert_eq!(product.significand(), 0xFFFF_FFFF_FFFF_FFFE);
        assert_eq!(product.exponent(), 11 + 13 + 64);
    }

    #[test]
    fn normalize() {
        let v = SimpleFp::new(1, 0).normalized();
        assert_eq!(v.significand(), 0x8000_0000_0000_0000);
        assert_eq!(v.exponent(), -63);

        let v = SimpleFp::new(0x0010_0000_0000_0000, 5).normalized();
        assert_eq!(v.significand(), 0x8000_0000_0000_0000);
        assert_eq!(v.exponent(), 5 - 11);

        let v = SimpleFp::new(0x8000_0000_0000_0000, 7).normalized();
        assert_eq!(v, SimpleFp::new(0x8000_0000_0000_0000, 7));
    }
}
