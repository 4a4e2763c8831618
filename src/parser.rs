use snafu::{ensure, OptionExt, Snafu};

pub const DELIMITER: char = ';';

/// One `<station>;<temperature>` line, borrowed from the line it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading<'a> {
    pub station: &'a str,
    pub temperature: f64,
}

#[derive(Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum RecordError {
    #[snafu(display("no ';' delimiter"))]
    MissingDelimiter,

    #[snafu(display("temperature {value:?} is not a number"))]
    InvalidTemperature { value: String },

    #[snafu(display("temperature {value:?} is not finite"))]
    NonFiniteTemperature { value: String },
}

/// Splits at the first delimiter. The station name is taken verbatim, everything
/// after the delimiter must be a single number.
pub fn parse_record(line: &str) -> Result<Reading<'_>, RecordError> {
    let (station, value) = line.split_once(DELIMITER).context(MissingDelimiterSnafu)?;
    let temperature = fast_float::parse::<f64, _>(value)
        .ok()
        .context(InvalidTemperatureSnafu { value })?;
    ensure!(temperature.is_finite(), NonFiniteTemperatureSnafu { value });
    Ok(Reading {
        station,
        temperature,
    })
}
