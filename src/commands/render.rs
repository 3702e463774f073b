//! Implementation of the `wikiwym render` command.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::config::WikiwymConfig;
use crate::document::{WikiDocument, standalone_page};
use crate::wiki::{Rendered, WikiParser};

/// Arguments for the render command.
#[derive(Debug, Default)]
pub struct RenderArgs {
    /// Wiki file to render; stdin when `None` or `-`.
    pub input: Option<PathBuf>,
    /// Destination file; stdout when `None`.
    pub output: Option<PathBuf>,
    /// Suppress warning annotations regardless of config.
    pub no_warnings: bool,
    /// Wrap in `<html><body>` regardless of config.
    pub standalone: bool,
    pub format: OutputFormat,
}

/// Execute the render command.
pub fn execute(args: RenderArgs) -> Result<()> {
    let config = WikiwymConfig::discover_from_cwd()?;
    let doc = WikiDocument::load(args.input.as_deref())?;
    let output = render_document(&doc, &args, &config)?;

    match &args.output {
        Some(path) => std::fs::write(path, &output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{output}"),
    }

    Ok(())
}

/// Render a document to the requested output format.
pub fn render_document(
    doc: &WikiDocument,
    args: &RenderArgs,
    config: &WikiwymConfig,
) -> Result<String> {
    let mut options = config.render.parser_options();
    options.disable_warnings |= args.no_warnings;
    let standalone = args.standalone || config.render.standalone;

    let mut parser = WikiParser::new(options);
    let Rendered { html, headings } = parser.render(&doc.content);
    let html = if standalone {
        standalone_page(doc.title(&headings).as_deref(), &html)
    } else {
        format!("{html}\n")
    };

    match args.format {
        OutputFormat::Text => Ok(html),
        OutputFormat::Json => {
            let rendered = Rendered { html, headings };
            let json =
                serde_json::to_string_pretty(&rendered).context("failed to serialize output")?;
            Ok(format!("{json}\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn doc(text: &str) -> WikiDocument {
        WikiDocument::from_reader(Cursor::new(text.to_string())).unwrap()
    }

    #[test]
    fn renders_fragment() {
        let out = render_document(
            &doc("*bold*"),
            &RenderArgs::default(),
            &WikiwymConfig::default(),
        )
        .unwrap();
        assert_eq!(out, "<strong>bold</strong>\n");
    }

    #[test]
    fn no_warnings_flag_overrides_config() {
        let args = RenderArgs {
            no_warnings: true,
            ..Default::default()
        };
        let out = render_document(&doc("*open"), &args, &WikiwymConfig::default()).unwrap();
        assert_eq!(out, "*open\n");

        let out = render_document(
            &doc("*open"),
            &RenderArgs::default(),
            &WikiwymConfig::default(),
        )
        .unwrap();
        assert!(out.contains("WIKI PARSE WARNING"));
    }

    #[test]
    fn config_can_disable_warnings() {
        let mut config = WikiwymConfig::default();
        config.render.disable_warnings = true;
        let out = render_document(&doc("*open"), &RenderArgs::default(), &config).unwrap();
        assert_eq!(out, "*open\n");
    }

    #[test]
    fn configured_toc_depth_applies_to_directive() {
        let mut config = WikiwymConfig::default();
        config.render.toc_max_depth = 1;
        let out = render_document(
            &doc("<wiki:toc/>\n=A=\n==B=="),
            &RenderArgs::default(),
            &config,
        )
        .unwrap();
        assert!(out.starts_with("<ul><li><a href=\"#A\">A</a></li></ul>\n"));
    }

    #[test]
    fn standalone_wraps_and_titles() {
        let args = RenderArgs {
            standalone: true,
            ..Default::default()
        };
        let out = render_document(&doc("=Guide=\ntext"), &args, &WikiwymConfig::default())
            .unwrap();
        assert!(out.starts_with("<html>\n<head><title>Guide</title></head>\n<body>\n"));
        assert!(out.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn json_includes_headings() {
        let args = RenderArgs {
            format: OutputFormat::Json,
            ..Default::default()
        };
        let out = render_document(
            &doc("=Intro=\n==Usage Notes=="),
            &args,
            &WikiwymConfig::default(),
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value["html"].as_str().unwrap().contains("<h1>"));
        assert_eq!(value["headings"][1]["level"], 2);
        assert_eq!(value["headings"][1]["anchor"], "Usage_Notes");
        assert_eq!(value["headings"][1]["line"], 1);
    }
}
