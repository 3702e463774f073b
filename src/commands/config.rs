//! Implementation of the `wikiwym config` command.
//!
//! Values are addressed with dotted keys such as `render.toc_max_depth`. Only
//! the keys of [`WikiwymConfig`] are accepted, so a misspelled key is an error
//! instead of a silently ignored table entry.

use anyhow::{Context, Result, anyhow, bail};
use std::path::{Path, PathBuf};

use crate::config::{CONFIG_FILENAME, WikiwymConfig, find_config_file};

/// Every key `config get`/`config set` understand, in listing order.
pub const KEYS: &[&str] = &[
    "wikiwym.version",
    "render.disable_warnings",
    "render.toc_max_depth",
    "render.standalone",
    "build.source",
    "build.output",
    "build.extension",
];

/// Find the config file by walking up from current directory.
pub fn find_config_path() -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    find_config_file(&cwd).ok_or_else(|| {
        anyhow!(
            "No {} found in current directory or any parent directory (run `wikiwym init`)",
            CONFIG_FILENAME
        )
    })
}

/// Print one config value.
pub fn get(key: &str) -> Result<()> {
    let config = WikiwymConfig::load(find_config_path()?)?;
    println!("{}", value_of(&config, key)?);
    Ok(())
}

/// Set a config value and save the file.
pub fn set(key: &str, value: &str) -> Result<()> {
    set_in(&find_config_path()?, key, value)
}

/// Print every config value as `key = value`.
pub fn list() -> Result<()> {
    let config = WikiwymConfig::load(find_config_path()?)?;
    for key in KEYS {
        println!("{key} = {}", value_of(&config, key)?);
    }
    Ok(())
}

/// Print the path to the config file.
pub fn path() -> Result<()> {
    println!("{}", find_config_path()?.display());
    Ok(())
}

/// Set `key` in the config file at `path`. Nothing is written if the result
/// would not validate.
fn set_in(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = WikiwymConfig::load(path)?;
    assign(&mut config, key, value)?;
    config
        .validate()
        .with_context(|| format!("Refusing to set {key} = {value}"))?;
    config.save(path)?;
    log::debug!("set {key} in {}", path.display());
    Ok(())
}

fn value_of(config: &WikiwymConfig, key: &str) -> Result<String> {
    let value = match key {
        "wikiwym.version" => config.wikiwym.version.clone(),
        "render.disable_warnings" => config.render.disable_warnings.to_string(),
        "render.toc_max_depth" => config.render.toc_max_depth.to_string(),
        "render.standalone" => config.render.standalone.to_string(),
        "build.source" => config.build.source.display().to_string(),
        "build.output" => config.build.output.display().to_string(),
        "build.extension" => config.build.extension.clone(),
        _ => return Err(unknown_key(key)),
    };
    Ok(value)
}

fn assign(config: &mut WikiwymConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "wikiwym.version" => config.wikiwym.version = value.to_string(),
        "render.disable_warnings" => config.render.disable_warnings = parse_bool(key, value)?,
        "render.toc_max_depth" => {
            config.render.toc_max_depth = value
                .parse()
                .with_context(|| format!("{key} expects a number, got '{value}'"))?;
        }
        "render.standalone" => config.render.standalone = parse_bool(key, value)?,
        "build.source" => config.build.source = PathBuf::from(value),
        "build.output" => config.build.output = PathBuf::from(value),
        "build.extension" => config.build.extension = value.trim_start_matches('.').to_string(),
        _ => return Err(unknown_key(key)),
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("{key} expects true or false, got '{value}'"),
    }
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow!(
        "Unknown config key '{}' (expected one of: {})",
        key,
        KEYS.join(", ")
    )
}
