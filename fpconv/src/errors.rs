#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("no symbol configured for {0}")]
    NoSymbol(&'static str),
    #[error("requested {requested} digits, expected {min} to {max}")]
    DigitsOutOfRange { requested: i32, min: i32, max: i32 },
    #[error("value {0:e} is too large for fixed notation")]
    TooLargeForFixed(f64),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unexpected character at offset {0}")]
    Junk(usize),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("format error: {0}")]
    Format(#[from] FormatError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
