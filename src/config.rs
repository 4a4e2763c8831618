use std::num::NonZeroUsize;
use std::path::PathBuf;

use log::LevelFilter;
use snafu::ensure;

use crate::error::{ConfigSnafu, Result, UsageSnafu};

pub const THREADS_VAR: &str = "ONEBRC_THREADS";
pub const LOG_VAR: &str = "ONEBRC_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// One pass over the file on the calling thread.
    Sequential,
    /// Memory-mapped file split into this many shards, one rayon task each.
    Parallel(NonZeroUsize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub path: PathBuf,
    pub execution: Execution,
    pub log_level: LevelFilter,
}

impl Config {
    /// `args` includes the program name in first position, like
    /// [`std::env::args`]. `env` looks up environment variables.
    pub fn from_args<I, F>(args: I, env: F) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let args: Vec<String> = args.into_iter().skip(1).collect();
        ensure!(args.len() == 1, UsageSnafu);
        let path = PathBuf::from(&args[0]);

        let execution = match env(THREADS_VAR) {
            None => Execution::Sequential,
            Some(value) => parse_execution(&value)?,
        };
        let log_level = match env(LOG_VAR) {
            None => LevelFilter::Warn,
            Some(value) => parse_log_level(&value)?,
        };

        Ok(Self {
            path,
            execution,
            log_level,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_args(std::env::args(), |name| std::env::var(name).ok())
    }
}

fn parse_execution(value: &str) -> Result<Execution> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Execution::Sequential);
    }
    if value.eq_ignore_ascii_case("auto") {
        let threads = std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
        return Ok(Execution::Parallel(threads));
    }
    value
        .parse::<NonZeroUsize>()
        .map(Execution::Parallel)
        .map_err(|_| {
            ConfigSnafu {
                name: THREADS_VAR,
                value,
            }
            .build()
        })
}

fn parse_log_level(value: &str) -> Result<LevelFilter> {
    value.trim().parse::<LevelFilter>().map_err(|_| {
        ConfigSnafu {
            name: LOG_VAR,
            value,
        }
        .build()
    })
}
