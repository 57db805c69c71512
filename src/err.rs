use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the programmatic mapping API.
///
/// Malformed hwdb entries are never reported through this type, see
/// [`crate::Mapping::add_from_string`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to grow mapping table: {source}")]
    Allocation {
        #[from]
        source: TryReserveError,
    },

    #[error("event type {event_type:#x} is out of range (max {max:#x})")]
    InvalidEventType { event_type: u16, max: u16 },
}

/// Reasons a `<TYPE>_<CODE>` / value pair could not be turned into a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("invalid key `{key}`: missing `_` between type and code")]
    MissingSeparator { key: String },

    #[error("empty type in mapping")]
    EmptyType,

    #[error("empty code in mapping")]
    EmptyCode,

    #[error("invalid hex number `{token}` in mapping")]
    InvalidHex { token: String },

    #[error("integer overflow `{token}` in mapping")]
    Overflow { token: String },

    #[error("type too big ({value:#x} > {max:#x}) in mapping")]
    EventTypeTooBig { value: u16, max: u16 },

    #[error("unknown event type `{name}` in mapping")]
    UnknownEventType { name: String },

    #[error("unknown code `{name}` for event type {event_type:#x} in mapping")]
    UnknownCode { event_type: u16, name: String },
}

#[derive(Debug, Error)]
pub enum HwdbError {
    #[error("failed to read hwdb source `{}`: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid hwdb glob `{pattern}`: {source}")]
    InvalidDirectoryGlob {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("line {line}: property without a preceding match")]
    PropertyWithoutMatch { line: usize },

    #[error("line {line}: property `{text}` is missing `=`")]
    MissingAssignment { line: usize, text: String },

    #[error("line {line}: empty property key")]
    EmptyKey { line: usize },

    #[error("line {line}: invalid match pattern `{pattern}`: {source}")]
    InvalidMatch {
        line: usize,
        pattern: String,
        source: glob::PatternError,
    },

    #[error("in `{}`: {source}", path.display())]
    InFile {
        path: PathBuf,
        source: Box<HwdbError>,
    },
}
