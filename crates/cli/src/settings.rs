//! Layered configuration loading.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, then `CRYPTOSTAT__SECTION__KEY` environment variables.

use anyhow::{Context, Result};
use config::{Environment, File};
use cryptostat_core::Config;
use std::path::Path;

/// Default file looked up in the working directory when none is given.
const DEFAULT_FILE: &str = "cryptostat";

const ENV_PREFIX: &str = "CRYPTOSTAT";

pub fn load(path: Option<&Path>) -> Result<Config> {
    dotenvy::dotenv().ok();
    build(path, Environment::with_prefix(ENV_PREFIX))
}

fn build(path: Option<&Path>, env: Environment) -> Result<Config> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_FILE).required(false),
    };

    let settings = config::Config::builder()
        .add_source(file)
        .add_source(env.separator("__").try_parsing(true))
        .build()
        .context("failed to read configuration")?;

    let config: Config = settings
        .try_deserialize()
        .context("invalid configuration")?;
    config.validate()?;

    Ok(config)
}
