//! Implementation of the `wikiwym toc` command.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::config::WikiwymConfig;
use crate::document::WikiDocument;
use crate::wiki::{DEFAULT_TOC_DEPTH, WikiParser};

/// Arguments for the toc command.
#[derive(Debug, Default)]
pub struct TocArgs {
    /// Wiki file to read; stdin when `None` or `-`.
    pub input: Option<PathBuf>,
    /// Deepest level listed; falls back to `render.toc_max_depth`.
    pub max_depth: Option<usize>,
    pub format: OutputFormat,
}

/// Execute the toc command.
pub fn execute(args: TocArgs) -> Result<()> {
    let config = WikiwymConfig::discover_from_cwd()?;
    let doc = WikiDocument::load(args.input.as_deref())?;
    print!("{}", table_of_contents(&doc, &args, &config)?);
    Ok(())
}

/// Build the table of contents for a document.
///
/// Text output is the flat `<ul>` HTML; JSON output lists the headings up to
/// the requested depth.
pub fn table_of_contents(
    doc: &WikiDocument,
    args: &TocArgs,
    config: &WikiwymConfig,
) -> Result<String> {
    let depth = match args.max_depth.unwrap_or(config.render.toc_max_depth) {
        0 => DEFAULT_TOC_DEPTH,
        depth => depth,
    };
    let mut parser = WikiParser::new(config.render.parser_options());
    parser.parse(&doc.content);

    match args.format {
        OutputFormat::Text => Ok(format!("{}\n", parser.render_toc(depth))),
        OutputFormat::Json => {
            let listed: Vec<_> = parser
                .headings()
                .iter()
                .filter(|heading| usize::from(heading.level) <= depth)
                .collect();
            let json =
                serde_json::to_string_pretty(&listed).context("failed to serialize headings")?;
            Ok(format!("{json}\n"))
        }
    }
}
