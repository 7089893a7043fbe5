//! Conversion between IEEE-754 binary floating point and decimal digits.
//!
//! Binary to decimal:
//! - [`fast_dtoa`] (Grisu3) produces shortest or fixed-count digits using
//!   64-bit arithmetic, and gives up when it cannot prove the result;
//! - [`fixed_dtoa`] handles a fixed number of places after the point with
//!   64/128-bit integers;
//! - [`bignum_dtoa`] is exact and never gives up;
//! - [`dtoa::double_to_ascii`] tries the fast path first.
//!
//! Decimal to binary: [`strtod::str_to_double`] and [`strtod::str_to_float`]
//! return the correctly rounded nearest value.
//!
//! All digit output uses the same convention: `buffer[..length]` holds the
//! digits `d`, and the value is `0.d * 10^point`.
//!
//! Nothing here allocates. Sign handling, special values and formatting are
//! left to the caller (see the `fpconv` crate).

#![cfg_attr(not(test), no_std)]

pub mod bignum;
pub mod bignum_dtoa;
pub mod cached_powers;
pub mod dtoa;
pub mod fast_dtoa;
pub mod fixed_dtoa;
pub mod ieee;
pub mod simple_fp;
pub mod strtod;

pub use crate::dtoa::{DtoaMode, double_to_ascii};
pub use crate::strtod::{str_to_double, str_to_float};

/// Length and decimal point of a digit string written into a caller's
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Digits {
    pub length: usize,
    pub point: i32,
}

/// Buffer size sufficient for any shortest or precision (up to 120 digits)
/// conversion, and for fixed conversions of values below 10^60 with up to
/// 100 digits after the point.
pub const DIGITS_BUFFER_SIZE: usize = 200;
