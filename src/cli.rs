use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Google Code Wiki to HTML converter
#[derive(Parser)]
#[command(name = "wikiwym")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render a wiki page to HTML
    Render {
        /// Wiki file to render (reads stdin when omitted or "-")
        input: Option<PathBuf>,

        /// Write HTML to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave malformed markup unannotated
        #[arg(long)]
        no_warnings: bool,

        /// Wrap the fragment in <html><body>
        #[arg(long)]
        standalone: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the table of contents of a wiki page
    Toc {
        /// Wiki file to read (reads stdin when omitted or "-")
        input: Option<PathBuf>,

        /// Deepest heading level to list [default: render.toc_max_depth]
        #[arg(long)]
        max_depth: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Render every wiki page in a directory to standalone HTML
    Build {
        /// Directory holding wiki pages [default: build.source]
        #[arg(long)]
        source: Option<PathBuf>,

        /// Directory to write HTML pages to [default: build.output]
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Create a .wikiwym.toml in the current directory
    Init(InitCommand),

    /// View or modify wikiwym configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args)]
pub struct InitCommand {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Get a config value
    Get {
        /// The key to get (e.g., render.toc_max_depth, build.source)
        key: String,
    },

    /// Set a config value
    Set {
        /// The key to set (e.g., render.toc_max_depth, build.source)
        key: String,
        /// The value to set
        value: String,
    },

    /// List all config values
    List,

    /// Print path to config file
    Path,
}

/// Output format for `render` and `toc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// HTML
    #[default]
    Text,
    /// JSON with the HTML and the heading list
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn render_flags_parse() {
        let cli = Cli::try_parse_from([
            "wikiwym",
            "render",
            "page.wiki",
            "-o",
            "page.html",
            "--no-warnings",
            "--standalone",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Command::Render {
                input,
                output,
                no_warnings,
                standalone,
                format,
            } => {
                assert_eq!(input, Some(PathBuf::from("page.wiki")));
                assert_eq!(output, Some(PathBuf::from("page.html")));
                assert!(no_warnings);
                assert!(standalone);
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn toc_depth_is_optional() {
        let cli = Cli::try_parse_from(["wikiwym", "toc"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Toc {
                input: None,
                max_depth: None,
                format: OutputFormat::Text
            }
        ));
    }
}
