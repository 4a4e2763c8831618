//! Renders an [`AggregateTable`] as a single-line JSON object.
//!
//! Keys appear in first-seen order and every value is `"<min>/<mean>/<max>"`.
//! Station names go through `serde_json`'s string escaping, which escapes only
//! `"`, `\` and control characters and leaves all other text as is.

use std::io::Write;

use serde::ser::{Serialize, SerializeMap, Serializer};
use snafu::ResultExt;

use crate::aggregator::{AggregateTable, StationStats};
use crate::error::{OutputSnafu, Result, SerializeSnafu};

struct Report<'a>(&'a AggregateTable);

struct Summary<'a>(&'a StationStats);

impl Serialize for Report<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (station, stats) in self.0.iter() {
            map.serialize_entry(station, &Summary(stats))?;
        }
        map.end()
    }
}

impl Serialize for Summary<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self.0)
    }
}

/// Writes the table followed by a newline and flushes `out`.
pub fn write_json<W: Write>(table: &AggregateTable, mut out: W) -> Result<()> {
    serde_json::to_writer(&mut out, &Report(table)).context(SerializeSnafu)?;
    out.write_all(b"\n").context(OutputSnafu)?;
    out.flush().context(OutputSnafu)
}

pub fn to_json_string(table: &AggregateTable) -> Result<String> {
    serde_json::to_string(&Report(table)).context(SerializeSnafu)
}
