//! Precomputed powers of ten as normalized `SimpleFp`s.
//!
//! Entries are spaced [`DECIMAL_EXPONENT_DISTANCE`] decimal exponents apart,
//! each rounded to nearest (so every entry is within half an ulp of the
//! exact power).

use crate::simple_fp::SimpleFp;

#[derive(Debug, Clone, Copy)]
struct CachedPower {
    significand: u64,
    binary_exponent: i16,
    decimal_exponent: i16,
}

/*
Generated with:

from fractions import Fraction
for k in range(-348, 341, 8):
    v = Fraction(10) ** k
    e = v.numerator.bit_length() - v.denominator.bit_length() - 64
    while v / Fraction(2) ** e >= 2 ** 64: e += 1
    while v / Fraction(2) ** e < 2 ** 63: e -= 1
    q = v / Fraction(2) ** e
    f = int(q) + (q - int(q) >= Fraction(1, 2))
    print(f, e, k)
*/
#[rustfmt::skip]
static CACHED_POWERS: [CachedPower; 87] = [
    CachedPower { significand: 0xfa8fd5a0081c0288, binary_exponent: -1220, decimal_exponent: -348 },
    CachedPower { significand: 0xbaaee17fa23ebf76, binary_exponent: -1193, decimal_exponent: -340 },
    CachedPower { significand: 0x8b16fb203055ac76, binary_exponent: -1166, decimal_exponent: -332 },
    CachedPower { significand: 0xcf42894a5dce35ea, binary_exponent: -1140, decimal_exponent: -324 },
    CachedPower { significand: 0x9a6bb0aa55653b2d, binary_exponent: -1113, decimal_exponent: -316 },
    CachedPower { significand: 0xe61acf033d1a45df, binary_exponent: -1087, decimal_exponent: -308 },
    CachedPower { significand: 0xab70fe17c79ac6ca, binary_exponent: -1060, decimal_exponent: -300 },
    CachedPower { significand: 0xff77b1fcbebcdc4f, binary_exponent: -1034, decimal_exponent: -292 },
    CachedPower { significand: 0xbe5691ef416bd60c, binary_exponent: -1007, decimal_exponent: -284 },
    CachedPower { significand: 0x8dd01fad907ffc3c, binary_exponent: -980, decimal_exponent: -276 },
    CachedPower { significand: 0xd3515c2831559a83, binary_exponent: -954, decimal_exponent: -268 },
    CachedPower { significand: 0x9d71ac8fada6c9b5, binary_exponent: -927, decimal_exponent: -260 },
    CachedPower { significand: 0xea9c227723ee8bcb, binary_exponent: -901, decimal_exponent: -252 },
    CachedPower { significand: 0xaecc49914078536d, binary_exponent: -874, decimal_exponent: -244 },
    CachedPower { significand: 0x823c12795db6ce57, binary_exponent: -847, decimal_exponent: -236 },
    CachedPower { significand: 0xc21094364dfb5637, binary_exponent: -821, decimal_exponent: -228 },
    CachedPower { significand: 0x9096ea6f3848984f, binary_exponent: -794, decimal_exponent: -220 },
    CachedPower { significand: 0xd77485cb25823ac7, binary_exponent: -768, decimal_exponent: -212 },
    CachedPower { significand: 0xa086cfcd97bf97f4, binary_exponent: -741, decimal_exponent: -204 },
    CachedPower { significand: 0xef340a98172aace5, binary_exponent: -715, decimal_exponent: -196 },
    CachedPower { significand: 0xb23867fb2a35b28e, binary_exponent: -688, decimal_exponent: -188 },
    CachedPower { significand: 0x84c8d4dfd2c63f3b, binary_exponent: -661, decimal_exponent: -180 },
    CachedPower { significand: 0xc5dd44271ad3cdba, binary_exponent: -635, decimal_exponent: -172 },
    CachedPower { significand: 0x936b9fcebb25c996, binary_exponent: -608, decimal_exponent: -164 },
    CachedPower { significand: 0xdbac6c247d62a584, binary_exponent: -582, decimal_exponent: -156 },
    CachedPower { significand: 0xa3ab66580d5fdaf6, binary_exponent: -555, decimal_exponent: -148 },
    CachedPower { significand: 0xf3e2f893dec3f126, binary_exponent: -529, decimal_exponent: -140 },
    CachedPower { significand: 0xb5b5ada8aaff80b8, binary_exponent: -502, decimal_exponent: -132 },
    CachedPower { significand: 0x87625f056c7c4a8b, binary_exponent: -475, decimal_exponent: -124 },
    CachedPower { significand: 0xc9bcff6034c13053, binary_exponent: -449, decimal_exponent: -116 },
    CachedPower { significand: 0x964e858c91ba2655, binary_exponent: -422, decimal_exponent: -108 },
    CachedPower { significand: 0xdff9772470297ebd, binary_exponent: -396, decimal_exponent: -100 },
    CachedPower { significand: 0xa6dfbd9fb8e5b88f, binary_exponent: -369, decimal_exponent: -92 },
    CachedPower { significand: 0xf8a95fcf88747d94, binary_exponent: -343, decimal_exponent: -84 },
    CachedPower { significand: 0xb94470938fa89bcf, binary_exponent: -316, decimal_exponent: -76 },
    CachedPower { significand: 0x8a08f0f8bf0f156b, binary_exponent: -289, decimal_exponent: -68 },
    CachedPower { significand: 0xcdb02555653131b6, binary_exponent: -263, decimal_exponent: -60 },
    CachedPower { significand: 0x993fe2c6d07b7fac, binary_exponent: -236, decimal_exponent: -52 },
    CachedPower { significand: 0xe45c10c42a2b3b06, binary_exponent: -210, decimal_exponent: -44 },
    CachedPower { significand: 0xaa242499697392d3, binary_exponent: -183, decimal_exponent: -36 },
    CachedPower { significand: 0xfd87b5f28300ca0e, binary_exponent: -157, decimal_exponent: -28 },
    CachedPower { significand: 0xbce5086492111aeb, binary_exponent: -130, decimal_exponent: -20 },
    CachedPower { significand: 0x8cbccc096f5088cc, binary_exponent: -103, decimal_exponent: -12 },
    CachedPower { significand: 0xd1b71758e219652c, binary_exponent: -77, decimal_exponent: -4 },
    CachedPower { significand: 0x9c40000000000000, binary_exponent: -50, decimal_exponent: 4 },
    CachedPower { significand: 0xe8d4a51000000000, binary_exponent: -24, decimal_exponent: 12 },
    CachedPower { significand: 0xad78ebc5ac620000, binary_exponent: 3, decimal_exponent: 20 },
    CachedPower { significand: 0x813f3978f8940984, binary_exponent: 30, decimal_exponent: 28 },
    CachedPower { significand: 0xc097ce7bc90715b3, binary_exponent: 56, decimal_exponent: 36 },
    CachedPower { significand: 0x8f7e32ce7bea5c70, binary_exponent: 83, decimal_exponent: 44 },
    CachedPower { significand: 0xd5d238a4abe98068, binary_exponent: 109, decimal_exponent: 52 },
    CachedPower { significand: 0x9f4f2726179a2245, binary_exponent: 136, decimal_exponent: 60 },
    CachedPower { significand: 0xed63a231d4c4fb27, binary_exponent: 162, decimal_exponent: 68 },
    CachedPower { significand: 0xb0de65388cc8ada8, binary_exponent: 189, decimal_exponent: 76 },
    CachedPower { significand: 0x83c7088e1aab65db, binary_exponent: 216, decimal_exponent: 84 },
    CachedPower { significand: 0xc45d1df942711d9a, binary_exponent: 242, decimal_exponent: 92 },
    CachedPower { significand: 0x924d692ca61be758, binary_exponent: 269, decimal_exponent: 100 },
    CachedPower { significand: 0xda01ee641a708dea, binary_exponent: 295, decimal_exponent: 108 },
    CachedPower { significand: 0xa26da3999aef774a, binary_exponent: 322, decimal_exponent: 116 },
    CachedPower { significand: 0xf209787bb47d6b85, binary_exponent: 348, decimal_exponent: 124 },
    CachedPower { significand: 0xb454e4a179dd1877, binary_exponent: 375, decimal_exponent: 132 },
    CachedPower { significand: 0x865b86925b9bc5c2, binary_exponent: 402, decimal_exponent: 140 },
    CachedPower { significand: 0xc83553c5c8965d3d, binary_exponent: 428, decimal_exponent: 148 },
    CachedPower { significand: 0x952ab45cfa97a0b3, binary_exponent: 455, decimal_exponent: 156 },
    CachedPower { significand: 0xde469fbd99a05fe3, binary_exponent: 481, decimal_exponent: 164 },
    CachedPower { significand: 0xa59bc234db398c25, binary_exponent: 508, decimal_exponent: 172 },
    CachedPower { significand: 0xf6c69a72a3989f5c, binary_exponent: 534, decimal_exponent: 180 },
    CachedPower { significand: 0xb7dcbf5354e9bece, binary_exponent: 561, decimal_exponent: 188 },
    CachedPower { significand: 0x88fcf317f22241e2, binary_exponent: 588, decimal_exponent: 196 },
    CachedPower { significand: 0xcc20ce9bd35c78a5, binary_exponent: 614, decimal_exponent: 204 },
    CachedPower { significand: 0x98165af37b2153df, binary_exponent: 641, decimal_exponent: 212 },
    CachedPower { significand: 0xe2a0b5dc971f303a, binary_exponent: 667, decimal_exponent: 220 },
    CachedPower { significand: 0xa8d9d1535ce3b396, binary_exponent: 694, decimal_exponent: 228 },
    CachedPower { significand: 0xfb9b7cd9a4a7443c, binary_exponent: 720, decimal_exponent: 236 },
    CachedPower { significand: 0xbb764c4ca7a44410, binary_exponent: 747, decimal_exponent: 244 },
    CachedPower { significand: 0x8bab8eefb6409c1a, binary_exponent: 774, decimal_exponent: 252 },
    CachedPower { significand: 0xd01fef10a657842c, binary_exponent: 800, decimal_exponent: 260 },
    CachedPower { significand: 0x9b10a4e5e9913129, binary_exponent: 827, decimal_exponent: 268 },
    CachedPower { significand: 0xe7109bfba19c0c9d, binary_exponent: 853, decimal_exponent: 276 },
    CachedPower { significand: 0xac2820d9623bf429, binary_exponent: 880, decimal_exponent: 284 },
    CachedPower { significand: 0x80444b5e7aa7cf85, binary_exponent: 907, decimal_exponent: 292 },
    CachedPower { significand: 0xbf21e44003acdd2d, binary_exponent: 933, decimal_exponent: 300 },
    CachedPower { significand: 0x8e679c2f5e44ff8f, binary_exponent: 960, decimal_exponent: 308 },
    CachedPower { significand: 0xd433179d9c8cb841, binary_exponent: 986, decimal_exponent: 316 },
    CachedPower { significand: 0x9e19db92b4e31ba9, binary_exponent: 1013, decimal_exponent: 324 },
    CachedPower { significand: 0xeb96bf6ebadf77d9, binary_exponent: 1039, decimal_exponent: 332 },
    CachedPower { significand: 0xaf87023b9bf0ee6b, binary_exponent: 1066, decimal_exponent: 340 },
];

const CACHED_POWERS_OFFSET: i32 = 348; // -1 * the first decimal_exponent.

/// Difference between two consecutive decimal exponents in the table.
pub const DECIMAL_EXPONENT_DISTANCE: i32 = 8;
/// Decimal exponent of the first entry.
pub const MIN_DECIMAL_EXPONENT: i32 = -348;
/// Decimal exponent of the last entry.
pub const MAX_DECIMAL_EXPONENT: i32 = 340;

fn to_simple_fp(power: &CachedPower) -> SimpleFp {
    SimpleFp::new(power.significand, power.binary_exponent as i32)
}

/// Returns a cached power of ten `10^k` together with `k`, such that its
/// binary exponent lies in `[min_exponent, max_exponent]`.
///
/// The range must be at least as wide as the binary distance between two
/// table entries (28 bits is always enough).
pub fn get_cached_power_for_binary_exponent_range(
    min_exponent: i32,
    max_exponent: i32,
) -> (SimpleFp, i32) {
    // Binary exponents grow with the index, so the first entry at or above
    // min_exponent is the candidate.
    let index = CACHED_POWERS.partition_point(|p| (p.binary_exponent as i32) < min_exponent);
    debug_assert!(index < CACHED_POWERS.len());
    let cached_power = &CACHED_POWERS[index];
    debug_assert!(min_exponent <= cached_power.binary_exponent as i32);
    debug_assert!(cached_power.binary_exponent as i32 <= max_exponent);
    (
        to_simple_fp(cached_power),
        cached_power.decimal_exponent as i32,
    )
}

/// Returns the cached power `10^found_exponent` with the largest
/// `found_exponent <= requested_exponent`, as `(power, found_exponent)`.
/// `requested_exponent - found_exponent` is always below
/// [`DECIMAL_EXPONENT_DISTANCE`].
pub fn get_cached_power_for_decimal_exponent(requested_exponent: i32) -> (SimpleFp, i32) {
    debug_assert!(MIN_DECIMAL_EXPONENT <= requested_exponent);
    debug_assert!(requested_exponent < MAX_DECIMAL_EXPONENT + DECIMAL_EXPONENT_DISTANCE);
    let index = (requested_exponent + CACHED_POWERS_OFFSET) / DECIMAL_EXPONENT_DISTANCE;
    let cached_power = &CACHED_POWERS[index as usize];
    let found_exponent = cached_power.decimal_exponent as i32;
    debug_assert!(found_exponent <= requested_exponent);
    debug_assert!(requested_exponent < found_exponent + DECIMAL_EXPONENT_DISTANCE);
    (to_simple_fp(cached_power), found_exponent)
}
