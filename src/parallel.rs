//! Sharded ingestion over a memory-mapped file.
//!
//! The file is cut into contiguous byte ranges that end on line boundaries.
//! Each range is folded into its own [`AggregateTable`] on a rayon pool and
//! the partial tables are merged in file order. Since [`AggregateTable::merge`]
//! appends unseen stations in the incoming table's own order, the result has
//! the same first-seen order as a sequential scan.

use std::fs::File;
use std::num::NonZeroUsize;
use std::path::Path;

use memmap2::Mmap;
use rayon::prelude::*;
use snafu::ResultExt;

use crate::aggregator::AggregateTable;
use crate::error::{
    FileAccessSnafu, InvalidUtf8Snafu, MalformedRecordSnafu, Position, Result, ThreadPoolSnafu,
};
use crate::parser::parse_record;

const MAX_THREADS_PER_CORE: usize = 4;

pub fn aggregate(path: &Path, shards: NonZeroUsize) -> Result<AggregateTable> {
    let file = File::open(path).context(FileAccessSnafu { path })?;
    let len = file.metadata().context(FileAccessSnafu { path })?.len();
    if len == 0 {
        return Ok(AggregateTable::new());
    }
    // SAFETY: the mapping is read-only and lives only for this call; the
    // input file is not expected to change while it is being aggregated.
    let mmap = unsafe { Mmap::map(&file) }.context(FileAccessSnafu { path })?;

    let bounds = shard_bounds(&mmap, shards.get());
    log::debug!(
        "{}: {} bytes in {} shards {:?}",
        path.display(),
        mmap.len(),
        bounds.len(),
        bounds
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(pool_size(bounds.len()))
        .build()
        .context(ThreadPoolSnafu)?;
    let tables = pool.install(|| {
        bounds
            .par_iter()
            .map(|&(start, end)| aggregate_shard(&mmap[start..end], start))
            .collect::<Result<Vec<_>>>()
    })?;

    let mut result = AggregateTable::new();
    for table in tables {
        result.merge(table);
    }
    Ok(result)
}

/// Threads for `shards` ranges: never more than there are ranges, nor more
/// than a few per available core.
fn pool_size(shards: usize) -> usize {
    let cores = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
    shards.clamp(1, cores * MAX_THREADS_PER_CORE)
}

/// Splits `data` into at most `shards` non-empty `(start, end)` ranges. Every
/// range but the last ends just after a `\n`.
pub fn shard_bounds(data: &[u8], shards: usize) -> Vec<(usize, usize)> {
    let chunk_size = data.len() / shards.max(1);
    let mut starts = vec![0];
    for shard in 1..shards {
        let start = line_start_after(data, shard * chunk_size);
        if start > starts[starts.len() - 1] && start < data.len() {
            starts.push(start);
        }
    }
    starts.push(data.len());
    starts
        .windows(2)
        .map(|pair| (pair[0], pair[1]))
        .filter(|&(start, end)| start < end)
        .collect()
}

/// Index just past the first `\n` at or after `position`, or `data.len()`.
#[inline]
fn line_start_after(data: &[u8], position: usize) -> usize {
    data[position..]
        .iter()
        .position(|&x| x == b'\n')
        .map(|x| position + x + 1)
        .unwrap_or(data.len())
}

/// Folds one shard. `base` is the shard's offset in the file, for error positions.
fn aggregate_shard(shard: &[u8], base: usize) -> Result<AggregateTable> {
    let mut table = AggregateTable::new();
    let mut offset = base;
    for piece in shard.split_inclusive(|&b| b == b'\n') {
        let at = Position::Offset(offset as u64);
        offset += piece.len();
        // same terminators as BufRead::lines: "\n" or "\r\n"
        let raw = match piece.strip_suffix(b"\n") {
            Some(line) => line.strip_suffix(b"\r").unwrap_or(line),
            None => piece,
        };
        let line = std::str::from_utf8(raw).context(InvalidUtf8Snafu { at })?;
        let reading = parse_record(line).context(MalformedRecordSnafu { at, record: line })?;
        table.record(reading);
    }
    Ok(table)
}
