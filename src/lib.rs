//! Per-station min/mean/max over a `<station>;<temperature>` measurements file.
//!
//! Lines come from a [`LineSource`], are parsed by [`parse_record`], folded
//! into an [`AggregateTable`] and finally rendered by [`write_json`] as one
//! JSON object whose keys keep the order in which stations first appeared.
//! Any unreadable file or malformed line aborts the run before anything is
//! written.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod format;
pub mod logger;
pub mod parallel;
pub mod parser;
pub mod source;

use std::io::Write;
use std::time::Instant;

use snafu::ResultExt;

pub use aggregator::{AggregateTable, StationStats};
pub use config::{Config, Execution};
pub use error::{Error, Position, Result};
pub use format::{to_json_string, write_json};
pub use parser::{parse_record, Reading, RecordError};
pub use source::{Line, LineSource};

use error::MalformedRecordSnafu;

/// Folds every line into a fresh table, stopping at the first error.
pub fn aggregate_lines<I>(lines: I) -> Result<AggregateTable>
where
    I: IntoIterator<Item = Result<Line>>,
{
    let mut table = AggregateTable::new();
    for line in lines {
        let line = line?;
        let reading = parse_record(&line.text).context(MalformedRecordSnafu {
            at: Position::Line(line.number),
            record: line.text.as_str(),
        })?;
        table.record(reading);
    }
    Ok(table)
}

pub fn aggregate(config: &Config) -> Result<AggregateTable> {
    let start = Instant::now();
    let table = match config.execution {
        Execution::Sequential => {
            log::debug!("{}: sequential scan", config.path.display());
            aggregate_lines(LineSource::open(&config.path)?)?
        }
        Execution::Parallel(shards) => {
            log::debug!("{}: parallel scan, {} shards", config.path.display(), shards);
            parallel::aggregate(&config.path, shards)?
        }
    };
    log::info!(
        "{}: {} lines, {} stations in {:?}",
        config.path.display(),
        table.readings(),
        table.len(),
        start.elapsed()
    );
    Ok(table)
}

/// Aggregates the configured file and writes the JSON result to `out`.
/// Nothing is written unless the whole file aggregated cleanly.
pub fn run<W: Write>(config: &Config, out: W) -> Result<()> {
    let table = aggregate(config)?;
    write_json(&table, out)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn aggregate_str(input: &str) -> Result<AggregateTable> {
        aggregate_lines(LineSource::new("memory", Cursor::new(input.as_bytes().to_vec())))
    }

    #[test]
    fn hamburg_before_palermo() {
        let table = aggregate_str("Hamburg;12.0\nHamburg;14.0\nPalermo;30.0\n").unwrap();
        assert_eq!(
            to_json_string(&table).unwrap(),
            r#"{"Hamburg":"12.0/13.0/14.0","Palermo":"30.0/30.0/30.0"}"#
        );
    }

    #[test]
    fn malformed_line_stops_the_fold() {
        let err = aggregate_str("Hamburg;12.0\nBadLineNoDelimiter\nPalermo;30.0\n").unwrap_err();
        match err {
            Error::MalformedRecord { at, record, source } => {
                assert_eq!(at, Position::Line(2));
                assert_eq!(record, "BadLineNoDelimiter");
                assert_eq!(source, RecordError::MissingDelimiter);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn negative_readings_become_minimum() {
        let table = aggregate_str("Oslo;2.0\nOslo;-5.3\nOslo;0.3\n").unwrap();
        assert_eq!(
            to_json_string(&table).unwrap(),
            r#"{"Oslo":"-5.3/-1.0/2.0"}"#
        );
    }

    #[test]
    fn run_writes_nothing_on_failure() {
        let config = Config {
            path: "/definitely/not/here/measurements.txt".into(),
            execution: Execution::Sequential,
            log_level: log::LevelFilter::Off,
        };
        let mut out = Vec::new();
        assert!(matches!(run(&config, &mut out), Err(Error::FileAccess { .. })));
        assert!(out.is_empty());
    }
}
