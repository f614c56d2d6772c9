/// Error types for the hydro loaders
use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for loading and deriving streamflow statistics
#[derive(Error, Debug)]
pub enum HydroError {
    /// Input file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Input structure or date format was not recognized
    #[error("Failed to parse {origin} (line {line}): {kind}")]
    Parse {
        origin: String,
        line: usize,
        kind: ParseErrorKind,
    },

    /// CSV reader rejected the input
    #[error("Failed to parse CSV in {origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },

    /// Requested metric column is not in the table
    #[error("Unknown metric column: {0}")]
    UnknownMetric(String),
}

/// What was wrong with a row that failed to parse
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("expected {expected} columns, found {found}")]
    ColumnCount { expected: String, found: usize },

    #[error("unrecognized date `{0}`")]
    Date(String),

    #[error("duplicate date {0}")]
    DuplicateDate(NaiveDate),

    #[error("duplicate period {date} for station {station}")]
    DuplicatePeriod { station: String, date: NaiveDate },

    #[error("missing column `{0}`")]
    MissingColumn(String),

    #[error("invalid number `{value}` in column `{column}`")]
    Number { column: String, value: String },

    #[error("no header row")]
    MissingHeader,
}

impl HydroError {
    pub(crate) fn parse(origin: &str, line: usize, kind: ParseErrorKind) -> Self {
        HydroError::Parse {
            origin: origin.to_string(),
            line,
            kind,
        }
    }

    /// The structural failure, if this is a parse error.
    pub fn parse_kind(&self) -> Option<&ParseErrorKind> {
        match self {
            HydroError::Parse { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

/// Type alias for Results using HydroError
pub type Result<T> = std::result::Result<T, HydroError>;
