use std::fmt;
use std::path::PathBuf;

use snafu::Snafu;

use crate::parser::RecordError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Where in the input a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// 1-based line number, known when lines are read one after another.
    Line(u64),
    /// Byte offset of the start of the line, used by the sharded reader.
    Offset(u64),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Line(line) => write!(f, "line {line}"),
            Position::Offset(offset) => write!(f, "byte offset {offset}"),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Usage: one-billion-rows <FILE>"))]
    Usage,

    #[snafu(display("cannot access {}", path.display()))]
    FileAccess { path: PathBuf, source: std::io::Error },

    #[snafu(display("failed to read line {line} of {}", path.display()))]
    Read {
        path: PathBuf,
        line: u64,
        source: std::io::Error,
    },

    #[snafu(display("input at {at} is not valid UTF-8"))]
    InvalidUtf8 {
        at: Position,
        source: std::str::Utf8Error,
    },

    #[snafu(display("malformed record at {at}: {record:?}"))]
    MalformedRecord {
        at: Position,
        record: String,
        source: RecordError,
    },

    #[snafu(display("failed to serialize result"))]
    Serialize { source: serde_json::Error },

    #[snafu(display("failed to write result"))]
    Output { source: std::io::Error },

    #[snafu(display("invalid value {value:?} for {name}"))]
    Config { name: &'static str, value: String },

    #[snafu(display("failed to start worker threads"))]
    ThreadPool {
        source: rayon::ThreadPoolBuildError,
    },
}
