use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use snafu::ResultExt;

use crate::error::{FileAccessSnafu, ReadSnafu, Result};

/// A line of input with its terminator stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based.
    pub number: u64,
    pub text: String,
}

/// Lazily yields the lines of a reader one at a time; nothing beyond the
/// reader's buffer is held in memory. The file handle is released when the
/// source is dropped, whether or not it was read to the end.
pub struct LineSource<R> {
    path: PathBuf,
    lines: Lines<R>,
    number: u64,
}

impl LineSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).context(FileAccessSnafu { path })?;
        Ok(Self::new(path, BufReader::new(file)))
    }
}

impl<R: BufRead> LineSource<R> {
    /// `path` only labels errors.
    pub fn new(path: impl Into<PathBuf>, reader: R) -> Self {
        Self {
            path: path.into(),
            lines: reader.lines(),
            number: 0,
        }
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        self.number += 1;
        let number = self.number;
        Some(
            line.map(|text| Line { number, text })
                .context(ReadSnafu {
                    path: &self.path,
                    line: number,
                }),
        )
    }
}
