//! Configuration file handling for wikiwym.
//!
//! This module defines the `.wikiwym.toml` configuration schema and provides
//! functions for discovering, loading, validating, and saving it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::wiki::{DEFAULT_TOC_DEPTH, ParserOptions};

/// The default configuration filename.
pub const CONFIG_FILENAME: &str = ".wikiwym.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WikiwymConfig {
    /// Tool metadata.
    #[serde(default)]
    pub wikiwym: WikiwymSection,
    /// Rendering settings shared by every command.
    #[serde(default)]
    pub render: RenderSection,
    /// Settings for `wikiwym build`.
    #[serde(default)]
    pub build: BuildSection,
}

/// Tool metadata section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WikiwymSection {
    /// Configuration schema version.
    pub version: String,
}

/// Rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderSection {
    /// Suppress the visible warning on malformed markup.
    #[serde(default)]
    pub disable_warnings: bool,
    /// Heading depth listed by `<wiki:toc/>` without `max_depth`, and by
    /// `wikiwym toc` without `--max-depth`.
    #[serde(default = "default_toc_max_depth")]
    pub toc_max_depth: usize,
    /// Wrap rendered fragments in `<html><body>`.
    #[serde(default)]
    pub standalone: bool,
}

/// Site build settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildSection {
    /// Directory holding the wiki pages.
    #[serde(default = "default_source")]
    pub source: PathBuf,
    /// Directory the HTML pages are written to.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// File extension of wiki pages, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_toc_max_depth() -> usize {
    DEFAULT_TOC_DEPTH
}

fn default_source() -> PathBuf {
    PathBuf::from("wiki")
}

fn default_output() -> PathBuf {
    PathBuf::from("site")
}

fn default_extension() -> String {
    "wiki".to_string()
}

impl Default for WikiwymSection {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
        }
    }
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            disable_warnings: false,
            toc_max_depth: default_toc_max_depth(),
            standalone: false,
        }
    }
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            source: default_source(),
            output: default_output(),
            extension: default_extension(),
        }
    }
}

impl RenderSection {
    /// Parser options derived from these settings.
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            disable_warnings: self.disable_warnings,
            toc_depth: self.toc_max_depth,
        }
    }
}

impl WikiwymConfig {
    /// Load configuration from a file path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: WikiwymConfig =
            toml::from_str(content).context("failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Find the config file in `start` or one of its parents and load it.
    ///
    /// Returns the defaults and no path when there is no config file.
    pub fn discover(start: &Path) -> Result<(Self, Option<PathBuf>)> {
        match find_config_file(start) {
            Some(path) => {
                log::debug!("using config from {}", path.display());
                Ok((Self::load(&path)?, Some(path)))
            }
            None => {
                log::debug!("no {CONFIG_FILENAME} found, using defaults");
                Ok((Self::default(), None))
            }
        }
    }

    /// [`discover`](Self::discover) starting from the current directory.
    pub fn discover_from_cwd() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::discover(&cwd)?.0)
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.wikiwym.version.is_empty() {
            anyhow::bail!("wikiwym.version cannot be empty");
        }

        if !(1..=6).contains(&self.render.toc_max_depth) {
            anyhow::bail!("render.toc_max_depth must be between 1 and 6");
        }

        if self.build.source.as_os_str().is_empty() {
            anyhow::bail!("build.source cannot be empty");
        }

        if self.build.output.as_os_str().is_empty() {
            anyhow::bail!("build.output cannot be empty");
        }

        if self.build.extension.is_empty() {
            anyhow::bail!("build.extension cannot be empty");
        }

        Ok(())
    }
}

/// Walk up from `start` looking for [`CONFIG_FILENAME`].
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|path| path.is_file())
}
