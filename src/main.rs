use std::io::{stdout, BufWriter};

use anyhow::Context;
use one_billion_rows::{logger, Config, Error};

fn main() -> anyhow::Result<()> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(usage @ Error::Usage) => {
            println!("{usage}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    logger::init(config.log_level).context("failed to install logger")?;

    let out = BufWriter::new(stdout().lock());
    one_billion_rows::run(&config, out)?;
    Ok(())
}
