//! Command-line front end: formats numbers in the various notations, and
//! shows the raw digits the conversion engine produces.

use anyhow::{Context, Result, bail};
use clap::Parser;
use fpconv::{DoubleToStringConverter, StringToDoubleConverter, StrtodFlags};
use fpconv_core::{DIGITS_BUFFER_SIZE, DtoaMode, double_to_ascii};
use log::debug;
use tracing_subscriber::filter::LevelFilter;

#[derive(clap::Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log the conversion paths taken
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Shortest representation that reads back as the same value
    Shortest {
        /// Round-trip through f32 instead of f64
        #[arg(short, long)]
        single: bool,
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },
    /// Fixed number of digits after the decimal point
    Fixed {
        #[arg(short, long)]
        digits: i32,
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },
    /// Exponential notation, with shortest digits unless --digits is given
    Exponential {
        #[arg(short, long)]
        digits: Option<i32>,
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },
    /// Fixed number of significant digits
    Precision {
        #[arg(short, long)]
        digits: i32,
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },
    /// Raw digit string and decimal point
    Digits {
        #[arg(short, long, value_enum, default_value_t = Mode::Shortest)]
        mode: Mode,
        #[arg(short, long, default_value_t = 0)]
        digits: i32,
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },
    /// Parse text and show the value and its bit pattern
    Parse {
        #[arg(required = true, allow_hyphen_values = true)]
        texts: Vec<String>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Mode {
    Shortest,
    Single,
    Fixed,
    Precision,
}

impl From<Mode> for DtoaMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Shortest => DtoaMode::Shortest,
            Mode::Single => DtoaMode::ShortestSingle,
            Mode::Fixed => DtoaMode::Fixed,
            Mode::Precision => DtoaMode::Precision,
        }
    }
}

fn reader() -> StringToDoubleConverter {
    StringToDoubleConverter {
        flags: StrtodFlags::ALLOW_LEADING_SPACES
            | StrtodFlags::ALLOW_TRAILING_SPACES
            | StrtodFlags::ALLOW_HEX
            | StrtodFlags::ALLOW_HEX_FLOATS
            | StrtodFlags::ALLOW_CASE_INSENSITIVITY,
        infinity_symbol: Some("infinity".to_owned()),
        ..StringToDoubleConverter::default()
    }
}

fn parse_value(reader: &StringToDoubleConverter, text: &str) -> Result<f64> {
    // Accept both "inf" and "infinity".
    let (value, _) = reader
        .string_to_double(text.as_bytes())
        .or_else(|_| {
            let short = StringToDoubleConverter {
                infinity_symbol: Some("inf".to_owned()),
                ..reader.clone()
            };
            short.string_to_double(text.as_bytes())
        })
        .with_context(|| format!("Parsing {text:?}"))?;
    debug!("{text:?} -> {value:e}");
    Ok(value)
}

fn format_each(
    values: &[String],
    mut format: impl FnMut(f64, &mut String) -> fpconv::Result<()>,
) -> Result<()> {
    let reader = reader();
    for text in values {
        let value = parse_value(&reader, text)?;
        let mut out = String::new();
        format(value, &mut out).with_context(|| format!("Formatting {text:?}"))?;
        println!("{out}");
    }
    Ok(())
}

fn print_digits(values: &[String], mode: Mode, requested_digits: i32) -> Result<()> {
    let reader = reader();
    for text in values {
        let value = parse_value(&reader, text)?;
        if !value.is_finite() {
            bail!("{text:?} is not finite");
        }
        if matches!(mode, Mode::Single) && (value as f32) as f64 != value {
            bail!("{text:?} is not exactly representable as an f32");
        }
        if matches!(mode, Mode::Fixed | Mode::Precision) && !(0..=100).contains(&requested_digits) {
            bail!("--digits must be between 0 and 100");
        }
        if matches!(mode, Mode::Fixed) && value.abs() >= 1e60 {
            bail!("{text:?} is too large for fixed mode");
        }

        let mut buffer = [0u8; DIGITS_BUFFER_SIZE];
        let (negative, digits) = double_to_ascii(value, mode.into(), requested_digits, &mut buffer);
        let digit_str = String::from_utf8_lossy(&buffer[..digits.length]);
        let sign = if negative { "-" } else { "" };
        println!("{sign}{digit_str} point={}", digits.point);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_max_level(if cli.verbose {
            LevelFilter::TRACE
        } else {
            LevelFilter::WARN
        })
        .init();

    let writer = DoubleToStringConverter::default();
    match cli.command {
        Command::Shortest { single, values } => format_each(&values, |value, out| {
            if single {
                writer.to_shortest_single(value as f32, out)?;
            } else {
                writer.to_shortest(value, out)?;
            }
            Ok(())
        }),
        Command::Fixed { digits, values } => format_each(&values, |value, out| {
            Ok(writer.to_fixed(value, digits, out)?)
        }),
        Command::Exponential { digits, values } => format_each(&values, |value, out| {
            Ok(writer.to_exponential(value, digits, out)?)
        }),
        Command::Precision { digits, values } => format_each(&values, |value, out| {
            Ok(writer.to_precision(value, digits, out)?)
        }),
        Command::Digits {
            mode,
            digits,
            values,
        } => print_digits(&values, mode, digits),
        Command::Parse { texts } => {
            let reader = reader();
            for text in &texts {
                let value = parse_value(&reader, text)?;
                let mut out = String::new();
                writer.to_shortest(value, &mut out)?;
                println!("{out} {:#018x}", value.to_bits());
            }
            Ok(())
        }
    }
}
