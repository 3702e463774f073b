//! Google Code Wiki markup to HTML.
//!
//! [`WikiParser::parse`] runs three passes over the document lines:
//!
//! 1. classification: block runs (tables, code, lists, blockquotes) are found
//!    and their lines marked so inline markup never crosses them;
//! 2. inline: every other line is rewritten by the [`InlineScanner`];
//! 3. emission: block runs are rendered by their handlers, blank lines are
//!    collapsed into paragraph breaks, and the lines are joined.
//!
//! A final step replaces the first `<wiki:toc/>` directive with the table of
//! contents built from the headings seen along the way.

mod block;
mod heading;
mod inline;
mod link;

pub use block::{BlockHandler, BlockKind, CELL_OPEN, Sink, Step, escape_code, run_block};
pub use heading::{DEFAULT_TOC_DEPTH, Heading, HeadingRegistry, anchor_for};
pub use inline::InlineScanner;
pub use link::{is_image, resolve_link};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Emitted between paragraphs separated by blank lines.
const PARAGRAPH_BREAK: &str = "<br><br>";

/// Per-instance parser settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserOptions {
    /// Suppress the visible annotation on malformed markup. The literal
    /// fallback text is still emitted.
    #[serde(default)]
    pub disable_warnings: bool,
    /// Depth of a `<wiki:toc/>` directive that does not set `max_depth`.
    #[serde(default = "default_toc_depth")]
    pub toc_depth: usize,
}

fn default_toc_depth() -> usize {
    DEFAULT_TOC_DEPTH
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            disable_warnings: false,
            toc_depth: DEFAULT_TOC_DEPTH,
        }
    }
}

impl ParserOptions {
    /// The inline annotation for malformed markup, or nothing when disabled.
    pub fn warning(&self, message: &str) -> String {
        if self.disable_warnings {
            return String::new();
        }
        format!(
            "<span style=\"color:red; background-color:yellow;\">WIKI PARSE WARNING: {message}</span>"
        )
    }
}

/// HTML for one document together with its headings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub html: String,
    pub headings: Vec<Heading>,
}

/// A run of lines owned by one block construct.
#[derive(Debug, Clone, Copy)]
struct BlockRun {
    kind: BlockKind,
    start: usize,
    len: usize,
}

/// Converts Google Code Wiki documents to HTML fragments.
///
/// An instance may be reused for any number of documents; the heading list is
/// reset at the start of each [`parse`](Self::parse) and kept until the next.
#[derive(Debug, Clone, Default)]
pub struct WikiParser {
    options: ParserOptions,
    headings: HeadingRegistry,
}

impl WikiParser {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            headings: HeadingRegistry::new(),
        }
    }

    /// Convert a whole document to an HTML fragment (no `<html>`/`<body>`).
    pub fn parse(&mut self, text: &str) -> String {
        self.headings.reset();

        let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
        let runs = classify(&lines);
        log::debug!(
            "parsing {} lines, {} block runs",
            lines.len(),
            runs.len()
        );

        let mut owned = vec![false; lines.len()];
        for run in &runs {
            owned[run.start..run.start + run.len].fill(true);
        }

        let mut out = {
            let mut scanner = InlineScanner::recording(&self.options, &mut self.headings);

            for (index, line) in lines.iter_mut().enumerate() {
                if owned[index] {
                    continue;
                }
                scanner.at_line(index);
                *line = scanner.scan(line);
            }

            emit(&lines, &runs, &mut scanner)
        };

        self.headings.sort_by_line();
        self.substitute_toc(&mut out);
        out.join("\n")
    }

    /// Like [`parse`](Self::parse), also returning the document's headings.
    pub fn render(&mut self, text: &str) -> Rendered {
        let html = self.parse(text);
        Rendered {
            html,
            headings: self.headings.headings().to_vec(),
        }
    }

    /// Scan a single line of inline markup. Matched headers are recorded.
    pub fn scan_inline(&mut self, text: &str) -> String {
        InlineScanner::recording(&self.options, &mut self.headings).scan(text)
    }

    /// Headings of the most recently parsed document, in document order.
    pub fn headings(&self) -> &[Heading] {
        self.headings.headings()
    }

    /// Flat table of contents for the most recently parsed document.
    pub fn render_toc(&self, max_depth: usize) -> String {
        self.headings.render_toc(max_depth, &self.options)
    }

    /// Replace the first TOC directive in the output. Later ones are left as-is.
    fn substitute_toc(&self, out: &mut [String]) {
        for line in out.iter_mut() {
            let Some((range, depth)) = toc_directive().captures(line).and_then(|caps| {
                let whole = caps.get(0)?;
                let depth = caps
                    .get(2)
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(self.options.toc_depth);
                Some((whole.range(), depth))
            }) else {
                continue;
            };

            log::debug!("substituting table of contents (max depth {depth})");
            let toc = self.render_toc(depth);
            line.replace_range(range, &toc);
            break;
        }
    }
}

/// Parse `text` with default options.
pub fn parse(text: &str) -> String {
    WikiParser::default().parse(text)
}

/// Find every block run, trying kinds in priority order on each unowned line.
fn classify<S: AsRef<str>>(lines: &[S]) -> Vec<BlockRun> {
    let mut runs = Vec::new();
    let mut cursor = 0;

    while cursor < lines.len() {
        let Some(kind) = BlockKind::classify(lines[cursor].as_ref()) else {
            cursor += 1;
            continue;
        };
        let len = run_block(kind, lines, cursor, &mut Sink::Discard);
        debug_assert!(len > 0, "a matching line always starts a run");
        log::trace!("{kind:?} block at line {} spans {len} lines", cursor + 1);
        runs.push(BlockRun {
            kind,
            start: cursor,
            len: len.max(1),
        });
        cursor += len.max(1);
    }

    runs
}

/// Render block runs and interleave the already-scanned lines.
fn emit(lines: &[String], runs: &[BlockRun], scanner: &mut InlineScanner<'_>) -> Vec<String> {
    let mut out = Vec::new();
    let mut runs = runs.iter().peekable();
    let mut pending_break = false;
    // Nothing emitted yet, so leading blank lines produce no break.
    let mut after_structure = true;
    let mut cursor = 0;

    while cursor < lines.len() {
        if let Some(run) = runs.next_if(|run| run.start == cursor) {
            if pending_break && !after_structure {
                out.push(PARAGRAPH_BREAK.to_string());
            }
            pending_break = false;

            let mut sink = Sink::collect(scanner);
            let len = run_block(run.kind, lines, cursor, &mut sink);
            debug_assert_eq!(len, run.len, "emission must consume the classified run");
            let html = sink.into_html();
            if !html.is_empty() {
                out.push(html);
            }
            after_structure = true;
            cursor += run.len;
            continue;
        }

        let line = &lines[cursor];
        cursor += 1;

        if line.trim().is_empty() {
            pending_break = true;
            continue;
        }
        if pending_break && !after_structure {
            out.push(PARAGRAPH_BREAK.to_string());
        }
        pending_break = false;
        after_structure = closes_structure(line);
        out.push(line.clone());
    }

    out
}

/// Whether an emitted line ends with (or contains) a structural element, after
/// which blank lines do not add a paragraph break.
fn closes_structure(line: &str) -> bool {
    const CLOSERS: [&str; 5] = ["</table", "</ul", "</ol", "</pre", "</blockquote"];

    let heading = line
        .match_indices("<h")
        .any(|(pos, _)| line[pos + 2..].starts_with(|c: char| ('1'..='6').contains(&c)));
    heading || CLOSERS.iter().any(|closer| line.contains(closer))
}

fn toc_directive() -> &'static Regex {
    static TOC: OnceLock<Regex> = OnceLock::new();
    TOC.get_or_init(|| {
        Regex::new(r#"<wiki:toc\s*(max_depth=["']?(\d+)["']?)?[^>]*>([^<]*</wiki[^>]+>)?"#)
            .expect("toc directive regex should compile")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> WikiParser {
        WikiParser::new(ParserOptions {
            disable_warnings: true,
            ..Default::default()
        })
    }

    #[test]
    fn empty_document_is_empty() {
        assert_eq!(parse(""), "");
        assert_eq!(parse("\n\n"), "");
    }

    #[test]
    fn single_line_is_inline_scanned() {
        assert_eq!(parse("*bold*"), "<strong>bold</strong>");
        assert_eq!(parse("`*not bold*`"), "<tt>*not bold*</tt>");
    }

    #[test]
    fn lines_are_joined_with_newlines() {
        assert_eq!(parse("one\ntwo"), "one\ntwo");
        assert_eq!(parse("one\r\ntwo\r\n"), "one\ntwo");
    }

    #[test]
    fn blank_lines_collapse_to_one_break() {
        assert_eq!(parse("one\n\n\n\ntwo"), "one\n<br><br>\ntwo");
    }

    #[test]
    fn leading_and_trailing_blank_lines_emit_nothing() {
        assert_eq!(parse("\n\none\n\n"), "one");
    }

    #[test]
    fn no_break_after_heading_or_block() {
        assert_eq!(
            parse("=Title=\n\nbody"),
            "<h1><a name=\"Title\"></a>Title</h1>\nbody"
        );
        assert_eq!(
            parse("  * a\n\nbody"),
            "<ul><li>a</li></ul>\nbody"
        );
    }

    #[test]
    fn break_before_block_after_paragraph() {
        assert_eq!(
            parse("text\n\n|| a ||"),
            format!("text\n<br><br>\n<table><tr>{CELL_OPEN}a</td></tr></table>")
        );
    }

    #[test]
    fn block_lines_are_not_inline_scanned_across_cells() {
        assert_eq!(
            quiet().parse("|| *a || b* ||"),
            format!("<table><tr>{CELL_OPEN}*a</td>{CELL_OPEN}b*</td></tr></table>")
        );
    }

    #[test]
    fn adjacent_lists_of_different_kinds_split() {
        assert_eq!(
            parse("  # one\n  * two"),
            "<ol><li>one</li></ol>\n<ul><li>two</li></ul>"
        );
    }

    #[test]
    fn code_block_content_is_left_alone() {
        let html = quiet().parse("{{{\n  print(\"*must not be bolded!*\");\n}}}");
        assert_eq!(
            html,
            "<pre class=\"prettyprint\">  print(\"*must not be bolded!*\");</pre>"
        );
    }

    #[test]
    fn headings_are_reset_between_documents() {
        let mut parser = WikiParser::default();
        parser.parse("=One=\n==Two==");
        assert_eq!(parser.headings().len(), 2);
        parser.parse("plain");
        assert!(parser.headings().is_empty());
    }

    #[test]
    fn headings_inside_blocks_keep_document_order() {
        let mut parser = quiet();
        parser.parse("|| =In Table= ||\n=After=");
        let texts: Vec<&str> = parser.headings().iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, ["In Table", "After"]);
    }

    #[test]
    fn toc_directive_is_replaced() {
        let html = parse("<wiki:toc max_depth=\"2\"/>\n=One=\n==Two==\n===Three===");
        let first = html.lines().next().unwrap_or_default();
        assert_eq!(
            first,
            "<ul><li><a href=\"#One\">One</a></li><li><a href=\"#Two\">Two</a></li></ul>"
        );
    }

    #[test]
    fn toc_defaults_to_depth_three() {
        let html = parse("<wiki:toc/>\n=A=\n====D====\n===C===");
        assert!(html.starts_with("<ul><li><a href=\"#A\">A</a></li><li><a href=\"#C\">C</a></li></ul>"));
    }

    #[test]
    fn bare_toc_directive_uses_configured_depth() {
        let mut parser = WikiParser::new(ParserOptions {
            toc_depth: 1,
            ..Default::default()
        });
        let html = parser.parse("<wiki:toc/>\n=A=\n==B==");
        assert!(html.starts_with("<ul><li><a href=\"#A\">A</a></li></ul>\n"));

        let html = parser.parse("<wiki:toc max_depth=\"2\"/>\n=A=\n==B==");
        assert!(html.starts_with("<ul><li><a href=\"#A\">A</a></li><li><a href=\"#B\">B</a></li></ul>"));
    }

    #[test]
    fn only_first_toc_directive_is_honored() {
        let html = parse("<wiki:toc/>\n=A=\n<wiki:toc/>");
        assert!(html.starts_with("<ul>"));
        assert!(html.ends_with("<wiki:toc/>"));
    }

    #[test]
    fn render_returns_headings() {
        let rendered = WikiParser::default().render("=Intro=\ntext\n==Usage Notes==");
        assert_eq!(rendered.headings.len(), 2);
        assert_eq!(rendered.headings[1].anchor, "Usage_Notes");
        assert_eq!(rendered.headings[1].line, 2);
        assert!(rendered.html.contains("<h2>"));
    }

    #[test]
    fn scan_inline_records_headings() {
        let mut parser = WikiParser::default();
        assert_eq!(parser.scan_inline("_x_"), "<em>x</em>");
        parser.scan_inline("==Side==");
        assert_eq!(parser.render_toc(3), "<ul><li><a href=\"#Side\">Side</a></li></ul>");
    }

    #[test]
    fn warnings_render_unless_disabled() {
        assert!(parse("*open").contains("WIKI PARSE WARNING"));
        assert_eq!(quiet().parse("*open"), "*open");
    }

    #[test]
    fn closes_structure_detects_closers() {
        assert!(closes_structure("<h3><a name=\"x\"></a>x</h3>"));
        assert!(closes_structure("text</pre> more"));
        assert!(!closes_structure("<hr/>"));
        assert!(!closes_structure("<html>"));
    }
}
