//! Bit-level views of IEEE-754 binary64 and binary32 values.

use crate::simple_fp::SimpleFp;

/// A binary64 value, viewed through its bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Double(u64);

impl Double {
    pub const SIGN_MASK: u64 = 0x8000_0000_0000_0000;
    pub const EXPONENT_MASK: u64 = 0x7FF0_0000_0000_0000;
    pub const SIGNIFICAND_MASK: u64 = 0x000F_FFFF_FFFF_FFFF;
    pub const HIDDEN_BIT: u64 = 0x0010_0000_0000_0000;
    /// Excludes the hidden bit.
    pub const PHYSICAL_SIGNIFICAND_SIZE: i32 = 52;
    /// Includes the hidden bit.
    pub const SIGNIFICAND_SIZE: i32 = 53;
    pub const MAX_SIGNIFICAND: u64 = 0x001F_FFFF_FFFF_FFFF;

    const EXPONENT_BIAS: i32 = 0x3FF + Self::PHYSICAL_SIGNIFICAND_SIZE;
    const DENORMAL_EXPONENT: i32 = -Self::EXPONENT_BIAS + 1;
    const MAX_EXPONENT: i32 = 0x7FF - Self::EXPONENT_BIAS;
    const INFINITY: u64 = 0x7FF0_0000_0000_0000;
    const NAN: u64 = 0x7FF8_0000_0000_0000;

    pub fn new(value: f64) -> Self {
        Self(value.to_bits())
    }

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The double closest to `fp`, truncating bits that don't fit.
    /// Overflows to infinity and underflows to zero.
    pub fn from_simple_fp(fp: SimpleFp) -> Self {
        Self(Self::simple_fp_to_bits(fp))
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    pub fn value(&self) -> f64 {
        f64::from_bits(self.0)
    }

    /// The value as an un-normalized `SimpleFp`. Not defined for special
    /// values or negative numbers.
    pub fn to_simple_fp(&self) -> SimpleFp {
        debug_assert!(self.sign() > 0);
        debug_assert!(!self.is_special());
        SimpleFp::new(self.significand(), self.exponent())
    }

    pub fn to_normalized_simple_fp(&self) -> SimpleFp {
        debug_assert!(self.value() > 0.0);
        let mut significand = self.significand();
        let mut exponent = self.exponent();

        // The current value could be a denormal.
        while significand & Self::HIDDEN_BIT == 0 {
            significand <<= 1;
            exponent -= 1;
        }
        // Do the final shifts in one go.
        significand <<= SimpleFp::SIGNIFICAND_SIZE - Self::SIGNIFICAND_SIZE;
        exponent -= SimpleFp::SIGNIFICAND_SIZE - Self::SIGNIFICAND_SIZE;
        SimpleFp::new(significand, exponent)
    }

    pub fn next_double(&self) -> f64 {
        if self.0 == Self::INFINITY {
            return f64::INFINITY;
        }
        if self.sign() < 0 && self.significand() == 0 {
            // -0.0
            return 0.0;
        }
        if self.sign() < 0 {
            f64::from_bits(self.0 - 1)
        } else {
            f64::from_bits(self.0 + 1)
        }
    }

    pub fn previous_double(&self) -> f64 {
        if self.0 == (Self::INFINITY | Self::SIGN_MASK) {
            return f64::NEG_INFINITY;
        }
        if self.sign() < 0 {
            f64::from_bits(self.0 + 1)
        } else {
            if self.significand() == 0 {
                return -0.0;
            }
            f64::from_bits(self.0 - 1)
        }
    }

    pub fn exponent(&self) -> i32 {
        if self.is_denormal() {
            return Self::DENORMAL_EXPONENT;
        }
        let biased_e = ((self.0 & Self::EXPONENT_MASK) >> Self::PHYSICAL_SIGNIFICAND_SIZE) as i32;
        biased_e - Self::EXPONENT_BIAS
    }

    pub fn significand(&self) -> u64 {
        let significand = self.0 & Self::SIGNIFICAND_MASK;
        if !self.is_denormal() {
            significand + Self::HIDDEN_BIT
        } else {
            significand
        }
    }

    /// True for denormals and zero.
    pub fn is_denormal(&self) -> bool {
        self.0 & Self::EXPONENT_MASK == 0
    }

    /// True for NaN and the infinities.
    pub fn is_special(&self) -> bool {
        self.0 & Self::EXPONENT_MASK == Self::EXPONENT_MASK
    }

    pub fn is_nan(&self) -> bool {
        self.is_special() && self.0 & Self::SIGNIFICAND_MASK != 0
    }

    pub fn is_infinite(&self) -> bool {
        self.is_special() && self.0 & Self::SIGNIFICAND_MASK == 0
    }

    pub fn sign(&self) -> i32 {
        if self.0 & Self::SIGN_MASK == 0 { 1 } else { -1 }
    }

    /// The midpoint between this value and its successor. Precondition:
    /// the value is positive.
    pub fn upper_boundary(&self) -> SimpleFp {
        debug_assert!(self.sign() > 0);
        SimpleFp::new(self.significand() * 2 + 1, self.exponent() - 1)
    }

    /// The midpoints to both neighbours, as `(lower, upper)`. The upper
    /// boundary is normalized and the lower one shares its exponent.
    /// Precondition: the value is positive.
    pub fn normalized_boundaries(&self) -> (SimpleFp, SimpleFp) {
        debug_assert!(self.value() > 0.0);
        boundaries(
            self.to_simple_fp(),
            self.lower_boundary_is_closer(),
        )
    }

    /// At a binade boundary the predecessor is half an ulp away instead of
    /// a full one. The smallest normal is the exception: the denormals below
    /// it use the same spacing.
    pub fn lower_boundary_is_closer(&self) -> bool {
        let physical_significand_is_zero = self.0 & Self::SIGNIFICAND_MASK == 0;
        physical_significand_is_zero && self.exponent() != Self::DENORMAL_EXPONENT
    }

    /// How many significand bits a double with a normalized significand at
    /// `order_of_magnitude` (i.e. `2^order_of_magnitude`) can hold.
    pub fn significand_size_for_order_of_magnitude(order_of_magnitude: i32) -> i32 {
        if order_of_magnitude >= Self::DENORMAL_EXPONENT + Self::SIGNIFICAND_SIZE {
            return Self::SIGNIFICAND_SIZE;
        }
        if order_of_magnitude <= Self::DENORMAL_EXPONENT {
            return 0;
        }
        order_of_magnitude - Self::DENORMAL_EXPONENT
    }

    pub fn infinity() -> f64 {
        f64::from_bits(Self::INFINITY)
    }

    pub fn nan() -> f64 {
        f64::from_bits(Self::NAN)
    }

    fn simple_fp_to_bits(fp: SimpleFp) -> u64 {
        let mut significand = fp.significand();
        let mut exponent = fp.exponent();
        while significand > Self::HIDDEN_BIT + Self::SIGNIFICAND_MASK {
            significand >>= 1;
            exponent += 1;
        }
        if exponent >= Self::MAX_EXPONENT {
            return Self::INFINITY;
        }
        if exponent < Self::DENORMAL_EXPONENT {
            return 0;
        }
        while exponent > Self::DENORMAL_EXPONENT && significand & Self::HIDDEN_BIT == 0 {
            significand <<= 1;
            exponent -= 1;
        }
        let biased_exponent =
            if exponent == Self::DENORMAL_EXPONENT && significand & Self::HIDDEN_BIT == 0 {
                0
            } else {
                (exponent + Self::EXPONENT_BIAS) as u64
            };
        (significand & Self::SIGNIFICAND_MASK) | (biased_exponent << Self::PHYSICAL_SIGNIFICAND_SIZE)
    }
}

/// A binary32 value, viewed through its bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Single(u32);

impl Single {
    pub const SIGN_MASK: u32 = 0x8000_0000;
    pub const EXPONENT_MASK: u32 = 0x7F80_0000;
    pub const SIGNIFICAND_MASK: u32 = 0x007F_FFFF;
    pub const HIDDEN_BIT: u32 = 0x0080_0000;
    pub const PHYSICAL_SIGNIFICAND_SIZE: i32 = 23;
    pub const SIGNIFICAND_SIZE: i32 = 24;

    const EXPONENT_BIAS: i32 = 0x7F + Self::PHYSICAL_SIGNIFICAND_SIZE;
    const DENORMAL_EXPONENT: i32 = -Self::EXPONENT_BIAS + 1;
    const INFINITY: u32 = 0x7F80_0000;
    const NAN: u32 = 0x7FC0_0000;

    pub fn new(value: f32) -> Self {
        Self(value.to_bits())
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn value(&self) -> f32 {
        f32::from_bits(self.0)
    }

    pub fn to_simple_fp(&self) -> SimpleFp {
        debug_assert!(self.sign() > 0);
        debug_assert!(!self.is_special());
        SimpleFp::new(self.significand() as u64, self.exponent())
    }

    pub fn exponent(&self) -> i32 {
        if self.is_denormal() {
            return Self::DENORMAL_EXPONENT;
        }
        let biased_e = ((self.0 & Self::EXPONENT_MASK) >> Self::PHYSICAL_SIGNIFICAND_SIZE) as i32;
        biased_e - Self::EXPONENT_BIAS
    }

    pub fn significand(&self) -> u32 {
        let significand = self.0 & Self::SIGNIFICAND_MASK;
        if !self.is_denormal() {
            significand + Self::HIDDEN_BIT
        } else {
            significand
        }
    }

    pub fn is_denormal(&self) -> bool {
        self.0 & Self::EXPONENT_MASK == 0
    }

    pub fn is_special(&self) -> bool {
        self.0 & Self::EXPONENT_MASK == Self::EXPONENT_MASK
    }

    pub fn is_nan(&self) -> bool {
        self.is_special() && self.0 & Self::SIGNIFICAND_MASK != 0
    }

    pub fn is_infinite(&self) -> bool {
        self.is_special() && self.0 & Self::SIGNIFICAND_MASK == 0
    }

    pub fn sign(&self) -> i32 {
        if self.0 & Self::SIGN_MASK == 0 { 1 } else { -1 }
    }

    pub fn upper_boundary(&self) -> SimpleFp {
        debug_assert!(self.sign() > 0);
        SimpleFp::new(self.significand() as u64 * 2 + 1, self.exponent() - 1)
    }

    pub fn normalized_boundaries(&self) -> (SimpleFp, SimpleFp) {
        debug_assert!(self.value() > 0.0);
        boundaries(
            self.to_simple_fp(),
            self.lower_boundary_is_closer(),
        )
    }

    pub fn lower_boundary_is_closer(&self) -> bool {
        let physical_significand_is_zero = self.0 & Self::SIGNIFICAND_MASK == 0;
        physical_significand_is_zero && self.exponent() != Self::DENORMAL_EXPONENT
    }

    pub fn infinity() -> f32 {
        f32::from_bits(Self::INFINITY)
    }

    pub fn nan() -> f32 {
        f32::from_bits(Self::NAN)
    }
}

fn boundaries(v: SimpleFp, lower_boundary_is_closer: bool) -> (SimpleFp, SimpleFp) {
    let m_plus = SimpleFp::new((v.significand() << 1) + 1, v.exponent() - 1).normalized();
    let mut m_minus = if lower_boundary_is_closer {
        SimpleFp::new((v.significand() << 2) - 1, v.exponent() - 2)
    } else {
        SimpleFp::new((v.significand() << 1) - 1, v.exponent() - 1)
    };
    m_minus.set_significand(m_minus.significand() << (m_minus.exponent() - m_plus.exponent()));
    m_minus.set_exponent(m_plus.exponent());
    (m_minus, m_plus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint64_conversions() {
        let ordered = 0x0123_4567_89AB_CDEFu64;
        let fp = Double::from_bits(ordered).to_simple_fp();
        assert_eq!(fp.exponent(), 0x12 - 0x3FF - 52);
        assert_eq!(fp.significand(), 0x0013_4567_89AB_CDEF);

        let min_double64 = 0x0000_0000_0000_0001u64;
        let fp = Double::from_bits(min_double64).to_simple_fp();
        assert_eq!(fp.exponent(), -0x3FF - 52 + 1);
        assert_eq!(fp.significand(), 1);

        let max_double64 = 0x7FEF_FFFF_FFFF_FFFFu64;
        let fp = Double::from_bits(max_double64).to_simple_fp();
        assert_eq!(fp.exponent(), 0x7FE - 0x3FF - 52);
        assert_eq!(fp.significand(), 0x001F_FFFF_FFFF_FFFF);
    }

    #[test]
    fn uint32_conversions() {
        let ordered = 0x0123_4567u32;
        let fp = Single::from_bits(ordered).to_simple_fp();
        assert_eq!(fp.exponent(), 0x2 - 0x7F - 23);
        assert_eq!(fp.significand(), 0x00A3_4567);

        let fp = Single::from_bits(1).to_simple_fp();
        assert_eq!(fp.exponent(), -0x7F - 23 + 1);
        assert_eq!(fp.significand(), 1);

        let fp = Single::from_bits(0x7F7F_FFFF).to_simple_fp();
        assert_eq!(fp.exponent(), 0xFE - 0x7F - 23);
        assert_eq!(fp.significand(), 0x00FF_FFFF);
    }

    #[test]
    fn normalized_simple_fp() {
        let fp = Double::from_bits(0x0123_4567_89AB_CDEF).to_normalized_simple_fp();
        assert_eq!(fp.exponent(), 0x12 - 0x3FF - 52 - 11);
        assert_eq!(fp.significand(), 0x0013_4567_89AB_CDEF << 11);

        let fp = Double::from_bits(1).to_normalized_simple_fp();
        assert_eq!(fp.exponent(), -0x3FF - 52 + 1 - 63);
        assert_eq!(fp.significand(), 0x8000_0000_0000_0000);

        let fp = Double::from_bits(0x7FEF_FFFF_FFFF_FFFF).to_normalized_simple_fp();
        assert_eq!(fp.exponent(), 0x7FE - 0x3FF - 52 - 11);
        assert_eq!(fp.significand(), 0xFFFF_FFFF_FFFF_F800);
    }

    #[test]
    fn special_values() {
        assert!(Double::new(f64::INFINITY).is_infinite());
        assert!(Double::new(f64::NEG_INFINITY).is_infinite());
        assert!(!Double::new(f64::NAN).is_infinite());
        assert!(!Double::new(0.0).is_infinite());
        assert!(!Double::new(1.0).is_infinite());

        assert!(Double::new(f64::NAN).is_nan());
        assert!(!Double::new(f64::INFINITY).is_nan());
        assert!(!Double::new(0.0).is_nan());
        assert!(Double::new(Double::nan()).is_nan());
        assert_eq!(Double::infinity(), f64::INFINITY);

        assert!(Double::new(f64::NAN).is_special());
        assert!(Double::new(f64::INFINITY).is_special());
        assert!(!Double::new(f64::MAX).is_special());

        assert!(Single::new(f32::INFINITY).is_infinite());
        assert!(Single::new(f32::NAN).is_nan());
        assert!(Single::new(Single::nan()).is_nan());
        assert!(!Single::new(f32::MAX).is_special());
        assert_eq!(Single::infinity(), f32::INFINITY);
    }

    #[test]
    fn denormal() {
        assert!(Double::from_bits(0x000F_FFFF_FFFF_FFFF).is_denormal());
        assert!(!Double::from_bits(0x0010_0000_0000_0000).is_denormal());
        assert!(Double::new(0.0).is_denormal());

        assert!(Single::from_bits(0x007F_FFFF).is_denormal());
        assert!(!Single::from_bits(0x0080_0000).is_denormal());
    }

    #[test]
    fn sign() {
        assert_eq!(Double::new(1.0).sign(), 1);
        assert_eq!(Double::new(f64::INFINITY).sign(), 1);
        assert_eq!(Double::new(f64::NEG_INFINITY).sign(), -1);
        assert_eq!(Double::new(0.0).sign(), 1);
        assert_eq!(Double::new(-0.0).sign(), -1);
        assert_eq!(Double::from_bits(1).sign(), 1);
        assert_eq!(Double::from_bits(0x8000_0000_0000_0001).sign(), -1);

        assert_eq!(Single::new(-1.0).sign(), -1);
        assert_eq!(Single::new(0.0).sign(), 1);
    }

    #[test]
    fn lower_boundary_is_closer() {
        assert!(Double::new(1.0).lower_boundary_is_closer());
        assert!(Double::new(2.0).lower_boundary_is_closer());
        assert!(!Double::new(1.5).lower_boundary_is_closer());

        // The smallest normal shares its spacing with the denormals.
        assert!(!Double::from_bits(0x0010_0000_0000_0000).lower_boundary_is_closer());
        assert!(Double::from_bits(0x0020_0000_0000_0000).lower_boundary_is_closer());
        assert!(!Double::from_bits(1).lower_boundary_is_closer());

        assert!(Single::new(1.0).lower_boundary_is_closer());
        assert!(!Single::from_bits(0x0080_0000).lower_boundary_is_closer());
        assert!(!Single::from_bits(1).lower_boundary_is_closer());
    }

    #[test]
    fn normalized_boundaries() {
        let (minus, plus) = Double::new(1.5).normalized_boundaries();
        assert_eq!(minus.exponent(), plus.exponent());
        // 1.5 does not have a significand of the form 2^p (for some p).
        // Therefore its boundaries are at the same distance.
        assert_eq!(
            Double::new(1.5).to_normalized_simple_fp().significand() - minus.significand(),
            plus.significand() - Double::new(1.5).to_normalized_simple_fp().significand()
        );
        assert_eq!(
            1 << 10,
            Double::new(1.5).to_normalized_simple_fp().significand() - minus.significand()
        );

        let (minus, plus) = Double::new(1.0).normalized_boundaries();
        assert_eq!(minus.exponent(), plus.exponent());
        let v = Double::new(1.0).to_normalized_simple_fp();
        // 1.0 does have a significand of the form 2^p (for some p).
        // Therefore its lower boundary is twice as close as the upper boundary.
        assert!(plus.significand() - v.significand() > v.significand() - minus.significand());
        assert_eq!(1 << 9, v.significand() - minus.significand());
        assert_eq!(1 << 10, plus.significand() - v.significand());

        let (minus, plus) = Double::from_bits(1).normalized_boundaries();
        let v = Double::from_bits(1).to_normalized_simple_fp();
        assert_eq!(minus.exponent(), plus.exponent());
        assert_eq!(plus.significand() - v.significand(), v.significand() - minus.significand());
        // Denormals have their boundaries much closer.
        assert_eq!(1u64 << 62, plus.significand() - v.significand());

        let smallest_normal64 = Double::from_bits(0x0010_0000_0000_0000);
        let (minus, plus) = smallest_normal64.normalized_boundaries();
        let v = smallest_normal64.to_normalized_simple_fp();
        assert_eq!(minus.exponent(), plus.exponent());
        // Even though the significand is of the form 2^p (for some p), its
        // boundaries are at the same distance.
        assert_eq!(plus.significand() - v.significand(), v.significand() - minus.significand());
        assert_eq!(1 << 10, plus.significand() - v.significand());

        let largest_denormal64 = Double::from_bits(0x000F_FFFF_FFFF_FFFF);
        let (minus, plus) = largest_denormal64.normalized_boundaries();
        let v = largest_denormal64.to_normalized_simple_fp();
        assert_eq!(plus.significand() - v.significand(), v.significand() - minus.significand());
        assert_eq!(1 << 11, plus.significand() - v.significand());

        let max_double64 = Double::from_bits(0x7FEF_FFFF_FFFF_FFFF);
        let (minus, plus) = max_double64.normalized_boundaries();
        let v = max_double64.to_normalized_simple_fp();
        assert_eq!(plus.significand() - v.significand(), v.significand() - minus.significand());
        assert_eq!(1 << 10, plus.significand() - v.significand());
    }

    #[test]
    fn normalized_boundaries_single() {
        let (minus, plus) = Single::new(1.5).normalized_boundaries();
        let v = Single::new(1.5).to_simple_fp().normalized();
        assert_eq!(minus.exponent(), plus.exponent());
        assert_eq!(plus.significand() - v.significand(), v.significand() - minus.significand());
        assert_eq!(1u64 << 39, v.significand() - minus.significand());

        let (minus, plus) = Single::new(1.0).normalized_boundaries();
        let v = Single::new(1.0).to_simple_fp().normalized();
        assert_eq!(1u64 << 38, v.significand() - minus.significand());
        assert_eq!(1u64 << 39, plus.significand() - v.significand());
    }

    #[test]
    fn next_and_previous() {
        assert_eq!(Double::new(0.0).next_double(), f64::from_bits(1));
        assert_eq!(Double::new(-0.0).next_double(), 0.0);
        assert_eq!(Double::new(-f64::from_bits(1)).next_double(), -0.0);
        assert_eq!(Double::new(f64::MAX).next_double(), f64::INFINITY);
        assert_eq!(Double::new(f64::INFINITY).next_double(), f64::INFINITY);

        assert_eq!(Double::new(f64::from_bits(1)).previous_double(), 0.0);
        assert_eq!(Double::new(0.0).previous_double(), -0.0);
        assert_eq!(Double::new(-0.0).previous_double(), -f64::from_bits(1));
        assert_eq!(Double::new(f64::INFINITY).previous_double(), f64::MAX);
        assert_eq!(Double::new(f64::NEG_INFINITY).previous_double(), f64::NEG_INFINITY);
        assert_eq!(Double::new(1.0).previous_double(), f64::from_bits(0x3FEF_FFFF_FFFF_FFFF));
    }

    #[test]
    fn from_simple_fp() {
        assert_eq!(Double::from_simple_fp(SimpleFp::new(1, 0)).value(), 1.0);
        assert_eq!(
            Double::from_simple_fp(SimpleFp::new(0x8000_0000_0000_0000, -63)).value(),
            1.0
        );
        // Bits beyond the significand are truncated.
        assert_eq!(
            Double::from_simple_fp(SimpleFp::new(0xFFFF_FFFF_FFFF_FFFF, -64)).value(),
            f64::from_bits(0x3FEF_FFFF_FFFF_FFFF)
        );
        assert_eq!(Double::from_simple_fp(SimpleFp::new(1, -1074)).bits(), 1);
        assert_eq!(Double::from_simple_fp(SimpleFp::new(1, -1075)).value(), 0.0);
        assert_eq!(Double::from_simple_fp(SimpleFp::new(1, 1024)).value(), f64::INFINITY);
        assert_eq!(
            Double::from_simple_fp(SimpleFp::new(Double::MAX_SIGNIFICAND, 971)).value(),
            f64::MAX
        );
    }

    #[test]
    fn significand_size_for_order_of_magnitude() {
        assert_eq!(Double::significand_size_for_order_of_magnitude(0), 53);
        assert_eq!(Double::significand_size_for_order_of_magnitude(-1021), 53);
        assert_eq!(Double::significand_size_for_order_of_magnitude(-1022), 52);
        assert_eq!(Double::significand_size_for_order_of_magnitude(-1073), 1);
        assert_eq!(Double::significand_size_for_order_of_magnitude(-1074), 0);
        assert_eq!(Double::significand_size_for_order_of_magnitude(-2000), 0);
    }
}
