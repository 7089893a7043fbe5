//! Table-driven checks of `fpconv_core` against vectors computed with exact
//! arithmetic (see `vectors/generate.py`).

use anyhow::{Context, Result, bail, ensure};

use fpconv_core::{DIGITS_BUFFER_SIZE, DtoaMode, double_to_ascii, str_to_double, str_to_float};

include!(concat!(env!("OUT_DIR"), "/vector_files.rs"));

/// Runs every case in a vector file, stopping at the first mismatch.
pub fn check_file(name: &str, contents: &str) -> Result<()> {
    let check: fn(&[&str]) -> Result<()> = match name {
        "shortest" => check_shortest,
        "shortest_single" => check_shortest_single,
        "precision" => check_precision,
        "fixed" => check_fixed,
        "strtod" => check_strtod,
        _ => bail!("Unknown vector file {name}.txt"),
    };

    let mut cases = 0;
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        check(&fields).with_context(|| format!("{name}.txt:{}: {line}", index + 1))?;
        cases += 1;
    }
    ensure!(cases > 0, "{name}.txt has no cases");
    Ok(())
}

fn field<'a>(fields: &[&'a str], index: usize) -> Result<&'a str> {
    fields
        .get(index)
        .copied()
        .with_context(|| format!("Missing field {}", index + 1))
}

fn hex_u64(text: &str) -> Result<u64> {
    u64::from_str_radix(text, 16).with_context(|| format!("Bad bit pattern {text:?}"))
}

fn int(text: &str) -> Result<i32> {
    text.parse()
        .with_context(|| format!("Bad integer {text:?}"))
}

fn digits(v: f64, mode: DtoaMode, requested_digits: i32) -> (String, i32) {
    let mut buffer = [0u8; DIGITS_BUFFER_SIZE];
    let (_, digits) = double_to_ascii(v, mode, requested_digits, &mut buffer);
    let text = String::from_utf8_lossy(&buffer[..digits.length]).into_owned();
    (text, digits.point)
}

fn expect_digits(actual: (String, i32), digits: &str, point: &str) -> Result<()> {
    let digits = if digits == "-" { "" } else { digits };
    let expected = (digits.to_owned(), int(point)?);
    ensure!(
        actual == expected,
        "got {:?} point {}, expected {:?} point {}",
        actual.0,
        actual.1,
        expected.0,
        expected.1
    );
    Ok(())
}

fn check_shortest(fields: &[&str]) -> Result<()> {
    let v = f64::from_bits(hex_u64(field(fields, 0)?)?);
    expect_digits(
        digits(v, DtoaMode::Shortest, 0),
        field(fields, 1)?,
        field(fields, 2)?,
    )
}

fn check_shortest_single(fields: &[&str]) -> Result<()> {
    let bits = u32::from_str_radix(field(fields, 0)?, 16).context("Bad bit pattern")?;
    let v = f32::from_bits(bits) as f64;
    expect_digits(
        digits(v, DtoaMode::ShortestSingle, 0),
        field(fields, 1)?,
        field(fields, 2)?,
    )
}

fn check_precision(fields: &[&str]) -> Result<()> {
    let v = f64::from_bits(hex_u64(field(fields, 0)?)?);
    let requested = int(field(fields, 1)?)?;
    expect_digits(
        digits(v, DtoaMode::Precision, requested),
        field(fields, 2)?,
        field(fields, 3)?,
    )
}

fn check_fixed(fields: &[&str]) -> Result<()> {
    let v = f64::from_bits(hex_u64(field(fields, 0)?)?);
    let requested = int(field(fields, 1)?)?;
    expect_digits(
        digits(v, DtoaMode::Fixed, requested),
        field(fields, 2)?,
        field(fields, 3)?,
    )
}

fn check_strtod(fields: &[&str]) -> Result<()> {
    let digits = field(fields, 0)?;
    let exponent = int(field(fields, 1)?)?;
    let double_bits = hex_u64(field(fields, 2)?)?;
    let float_bits = u32::from_str_radix(field(fields, 3)?, 16).context("Bad bit pattern")?;
    ensure!(
        !digits.is_empty() && digits.bytes().all(|c| c.is_ascii_digit()),
        "Bad digit string"
    );

    let double = str_to_double(digits.as_bytes(), exponent);
    ensure!(
        double.to_bits() == double_bits,
        "f64: got {:016x} ({double:e}), expected {double_bits:016x}",
        double.to_bits()
    );
    let float = str_to_float(digits.as_bytes(), exponent);
    ensure!(
        float.to_bits() == float_bits,
        "f32: got {:08x} ({float:e}), expected {float_bits:08x}",
        float.to_bits()
    );
    Ok(())
}
