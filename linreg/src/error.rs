use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used in the entire linreg module.
pub type Result<T> = std::result::Result<T, LinregErr>;

/// The linreg module's error type.
#[derive(Debug)]
pub enum LinregErr {
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    NoColumns,
    NoPartials,
    PartialMismatch {
        index: usize,
        got: usize,
        expected: usize,
    },
    InterceptMismatch {
        index: usize,
    },
    RankDeficient {
        column: usize,
    },
    NonFinite {
        what: &'static str,
    },
    InvalidFormat(String),
    Json(serde_json::Error),
    Io(io::Error),
}

impl Display for LinregErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinregErr::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch between {a} and {b}, got {got} and expected {expected}"
            ),
            LinregErr::NoColumns => f.write_str("the table has no columns"),
            LinregErr::NoPartials => f.write_str("there are no partial results to merge"),
            LinregErr::PartialMismatch {
                index,
                got,
                expected,
            } => write!(
                f,
                "partial result {index} has {got} coefficients, expected {expected}"
            ),
            LinregErr::InterceptMismatch { index } => write!(
                f,
                "partial result {index} was computed with a different intercept setting"
            ),
            LinregErr::RankDeficient { column } => write!(
                f,
                "the system is rank deficient, coefficient {column} can't be determined"
            ),
            LinregErr::NonFinite { what } => write!(f, "the {what} hold NaN or infinite values"),
            LinregErr::InvalidFormat(msg) => write!(f, "invalid serialized model: {msg}"),
            LinregErr::Json(e) => write!(f, "json error: {e}"),
            LinregErr::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for LinregErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LinregErr::Json(e) => Some(e),
            LinregErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LinregErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for LinregErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
