//! Implementation of the `wikiwym init` command.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::PathBuf;

use crate::config::CONFIG_FILENAME;

/// Default content for the .wikiwym.toml configuration file.
fn default_config() -> &'static str {
    r#"# wikiwym configuration file

[wikiwym]
version = "0.1"

[render]
# Leave malformed markup without the red warning annotation
disable_warnings = false

# Deepest heading level listed by <wiki:toc/> and `wikiwym toc`
toc_max_depth = 3

# Wrap rendered pages in <html><body>
standalone = false

[build]
# Directory holding wiki pages
source = "wiki"

# Directory the HTML site is written to
output = "site"

# Extension of wiki page files
extension = "wiki"
"#
}

/// Arguments for the init command.
#[derive(Default)]
pub struct InitArgs {
    /// Overwrite an existing config file
    pub force: bool,
    /// Working directory (for testing; uses current dir if None)
    pub working_dir: Option<PathBuf>,
}

/// Execute the init command.
pub fn run(args: InitArgs) -> Result<()> {
    let base = args.working_dir.unwrap_or_else(|| PathBuf::from("."));
    let config_path = base.join(CONFIG_FILENAME);

    if config_path.exists() && !args.force {
        bail!("Project already initialized ({CONFIG_FILENAME} exists). Use --force to overwrite.");
    }

    fs::write(&config_path, default_config())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {CONFIG_FILENAME}");
    println!();
    println!("Next steps:");
    println!("  wikiwym render <page>.wiki   - Render a page to HTML");
    println!("  wikiwym build                - Render every page under wiki/");

    Ok(())
}
