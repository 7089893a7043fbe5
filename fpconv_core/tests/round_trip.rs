use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fpconv_core::bignum_dtoa::{BignumDtoaMode, bignum_dtoa};
use fpconv_core::fast_dtoa::{FastDtoaMode, fast_dtoa};
use fpconv_core::{DIGITS_BUFFER_SIZE, DtoaMode, double_to_ascii, str_to_double, str_to_float};

const ITERATIONS: usize = 20_000;

fn random_finite_double(rng: &mut StdRng) -> f64 {
    loop {
        let v = f64::from_bits(rng.random::<u64>() & !(1 << 63));
        if v.is_finite() && v != 0.0 {
            return v;
        }
    }
}

fn shortest(v: f64) -> (Vec<u8>, i32) {
    let mut buffer = [0u8; DIGITS_BUFFER_SIZE];
    let (_, digits) = double_to_ascii(v, DtoaMode::Shortest, 0, &mut buffer);
    (buffer[..digits.length].to_vec(), digits.point)
}

#[test]
fn shortest_digits_read_back() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..ITERATIONS {
        let v = random_finite_double(&mut rng);
        let (digits, point) = shortest(v);
        let exponent = point - digits.len() as i32;
        assert_eq!(str_to_double(&digits, exponent).to_bits(), v.to_bits(), "{v:e}");
    }
}

#[test]
fn shortest_digits_cannot_be_shortened() {
    let mut rng = StdRng::seed_from_u64(0xd1617);
    for _ in 0..ITERATIONS {
        let v = random_finite_double(&mut rng);
        let (digits, point) = shortest(v);
        if digits.len() < 2 {
            continue;
        }
        // Neither neighbour of the shortened string may read back as v.
        let exponent = point - digits.len() as i32 + 1;
        let mut shorter = digits[..digits.len() - 1].to_vec();
        assert_ne!(str_to_double(&shorter, exponent), v, "{v:e}");
        let mut i = shorter.len();
        while i > 0 && shorter[i - 1] == b'9' {
            shorter[i - 1] = b'0';
            i -= 1;
        }
        if i == 0 {
            shorter.insert(0, b'1');
        } else {
            shorter[i - 1] += 1;
        }
        assert_ne!(str_to_double(&shorter, exponent), v, "{v:e}");
    }
}

#[test]
fn fast_and_exact_generators_agree() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut fast_buffer = [0u8; DIGITS_BUFFER_SIZE];
    let mut exact_buffer = [0u8; DIGITS_BUFFER_SIZE];
    for _ in 0..ITERATIONS {
        let v = random_finite_double(&mut rng);
        if let Some(fast) = fast_dtoa(v, FastDtoaMode::Shortest, 0, &mut fast_buffer) {
            let exact = bignum_dtoa(v, BignumDtoaMode::Shortest, 0, &mut exact_buffer);
            assert_eq!(fast, exact, "{v:e}");
            assert_eq!(fast_buffer[..fast.length], exact_buffer[..exact.length], "{v:e}");
        }

        let requested_digits = rng.random_range(1..=17);
        if let Some(fast) = fast_dtoa(v, FastDtoaMode::Precision, requested_digits, &mut fast_buffer) {
            let exact = bignum_dtoa(v, BignumDtoaMode::Precision, requested_digits, &mut exact_buffer);
            assert_eq!(fast, exact, "{v:e} with {requested_digits} digits");
            assert_eq!(fast_buffer[..fast.length], exact_buffer[..exact.length], "{v:e}");
        }
    }
}

#[test]
fn fixed_digits_agree_with_exact_generator() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut buffer = [0u8; DIGITS_BUFFER_SIZE];
    let mut exact_buffer = [0u8; DIGITS_BUFFER_SIZE];
    for _ in 0..ITERATIONS {
        let v: f64 = rng.random_range(0.0..1e12) * if rng.random() { 1.0 } else { 1e-12 };
        if v == 0.0 {
            continue;
        }
        let fractional_count = rng.random_range(0..=20);
        let (_, fast) = double_to_ascii(v, DtoaMode::Fixed, fractional_count, &mut buffer);
        let mut exact = bignum_dtoa(v, BignumDtoaMode::Fixed, fractional_count, &mut exact_buffer);
        while exact.length > 0 && exact_buffer[exact.length - 1] == b'0' {
            exact.length -= 1;
        }
        assert_eq!(buffer[..fast.length], exact_buffer[..exact.length], "{v:e}, {fractional_count}");
        if fast.length > 0 {
            assert_eq!(fast.point, exact.point, "{v:e}, {fractional_count}");
        }
    }
}

#[test]
fn precision_digits_round_to_the_shortest_digits() {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut buffer = [0u8; DIGITS_BUFFER_SIZE];
    for _ in 0..ITERATIONS / 4 {
        let v = random_finite_double(&mut rng);
        let (digits, point) = shortest(v);
        let (_, precise) = double_to_ascii(v, DtoaMode::Precision, digits.len() as i32, &mut buffer);
        assert_eq!(precise.point, point, "{v:e}");
        assert_eq!(buffer[..precise.length], digits[..], "{v:e}");
    }
}

#[test]
fn single_shortest_digits_read_back() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut buffer = [0u8; DIGITS_BUFFER_SIZE];
    for _ in 0..ITERATIONS {
        let f = f32::from_bits(rng.random::<u32>() & !(1 << 31));
        if !f.is_finite() || f == 0.0 {
            continue;
        }
        let (_, digits) = double_to_ascii(f as f64, DtoaMode::ShortestSingle, 0, &mut buffer);
        assert!(digits.length <= 9);
        let exponent = digits.point - digits.length as i32;
        assert_eq!(str_to_float(&buffer[..digits.length], exponent).to_bits(), f.to_bits(), "{f:e}");
    }
}
