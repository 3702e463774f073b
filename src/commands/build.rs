//! Build a static HTML site from a directory of wiki pages.
//!
//! This module implements the `wikiwym build` command which renders every
//! wiki page under the source directory to a standalone HTML page at the same
//! relative path under the output directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::WikiwymConfig;
use crate::document::{WikiDocument, standalone_page};
use crate::wiki::{ParserOptions, WikiParser};

/// Arguments for the `wikiwym build` command.
pub struct BuildArgs {
    /// Directory holding wiki pages; falls back to `build.source`.
    pub source: Option<PathBuf>,
    /// Output directory for the built site; falls back to `build.output`.
    pub output: Option<PathBuf>,
}

/// Summary of a site build.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// HTML pages written, relative to the output directory.
    pub pages: Vec<PathBuf>,
}

/// Execute the `wikiwym build` command.
pub fn execute(args: BuildArgs) -> Result<()> {
    let config = WikiwymConfig::discover_from_cwd()?;
    let source = args.source.unwrap_or(config.build.source);
    let output = args.output.unwrap_or(config.build.output);

    if !source.is_dir() {
        anyhow::bail!("source directory '{}' does not exist", source.display());
    }

    let report = build_site(
        &source,
        &output,
        &config.build.extension,
        &config.render.parser_options(),
    )?;

    println!(
        "Built {} page{} at: {}",
        report.pages.len(),
        if report.pages.len() == 1 { "" } else { "s" },
        output.display()
    );

    Ok(())
}

/// Render every `*.{extension}` file under `source` into `output`.
pub fn build_site(
    source: &Path,
    output: &Path,
    extension: &str,
    options: &ParserOptions,
) -> Result<BuildReport> {
    fs::create_dir_all(output)
        .with_context(|| format!("failed to create output directory: {}", output.display()))?;

    let mut parser = WikiParser::new(options.clone());
    let mut report = BuildReport::default();
    render_dir(source, source, output, extension, &mut parser, &mut report)?;
    report.pages.sort();
    Ok(report)
}

/// Recursively render wiki pages in a directory.
fn render_dir(
    dir: &Path,
    source_root: &Path,
    output_root: &Path,
    extension: &str,
    parser: &mut WikiParser,
    report: &mut BuildReport,
) -> Result<()> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();

        // The output directory may live inside the source tree.
        if path == output_root {
            continue;
        }

        if path.is_dir() {
            render_dir(&path, source_root, output_root, extension, parser, report)?;
        } else if path.extension().is_some_and(|ext| ext == extension) {
            let relative = path
                .strip_prefix(source_root)
                .unwrap_or(path.as_path())
                .with_extension("html");
            render_page(&path, &output_root.join(&relative), parser)?;
            report.pages.push(relative);
        }
    }

    Ok(())
}

/// Render one wiki page to a standalone HTML file.
fn render_page(source: &Path, dest: &Path, parser: &mut WikiParser) -> Result<()> {
    let doc = WikiDocument::read(source)?;
    let rendered = parser.render(&doc.content);
    let title = doc.title(&rendered.headings);
    let page = standalone_page(title.as_deref(), &rendered.html);

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    fs::write(dest, page).with_context(|| format!("failed to write {}", dest.display()))?;
    log::debug!("rendered {} -> {}", source.display(), dest.display());

    Ok(())
}
