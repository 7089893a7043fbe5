//! Text conversions for `f64` and `f32` built on [`fpconv_core`].
//!
//! [`DoubleToStringConverter`] writes shortest round-trip, fixed,
//! exponential and precision notations; [`StringToDoubleConverter`] reads
//! decimal, hexadecimal and octal input back, rounding correctly.
//!
//! ```
//! use fpconv::{DoubleToStringConverter, StringToDoubleConverter};
//!
//! let mut out = String::new();
//! DoubleToStringConverter::ecma_script().to_shortest(0.1 + 0.2, &mut out)?;
//! assert_eq!(out, "0.30000000000000004");
//!
//! let (value, _) = StringToDoubleConverter::default().string_to_double(out.as_bytes())?;
//! assert_eq!(value, 0.1 + 0.2);
//! # Ok::<(), fpconv::Error>(())
//! ```

pub mod double_to_string;
pub mod errors;
pub mod string_to_double;

pub use crate::double_to_string::{DoubleToStringConverter, DtoaFlags};
pub use crate::errors::{Error, FormatError, ParseError, Result};
pub use crate::string_to_double::{StringToDoubleConverter, StrtodFlags};
