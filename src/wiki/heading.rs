//! Heading bookkeeping and the flat table of contents.
//!
//! Headings are recorded by the inline scanner as header lines are matched and
//! rendered into a `<ul>` when a `<wiki:toc/>` directive is resolved.

use serde::Serialize;

use super::ParserOptions;
use super::inline::InlineScanner;

/// Depth used when a TOC directive carries no (or a zero) `max_depth`.
pub const DEFAULT_TOC_DEPTH: usize = 3;

/// A heading found while scanning a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Heading level, 1 through 6.
    pub level: u8,
    /// Raw heading text, before inline markup is applied.
    pub text: String,
    /// Normalized anchor name used for `<a name>` and TOC links.
    pub anchor: String,
    /// Source line the heading came from (0-indexed).
    pub line: usize,
}

/// Ordered list of headings recorded during one parse.
#[derive(Debug, Clone, Default)]
pub struct HeadingRegistry {
    headings: Vec<Heading>,
}

impl HeadingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every heading from the previous document.
    pub fn reset(&mut self) {
        self.headings.clear();
    }

    /// Record a heading and return it.
    pub fn record(&mut self, level: u8, text: &str, line: usize) -> &Heading {
        self.headings.push(Heading {
            level,
            text: text.to_string(),
            anchor: anchor_for(text),
            line,
        });
        &self.headings[self.headings.len() - 1]
    }

    /// All recorded headings.
    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    /// Restore document order after block contents were scanned in a later pass.
    pub(crate) fn sort_by_line(&mut self) {
        self.headings.sort_by_key(|heading| heading.line);
    }

    /// Render a flat `<ul>` linking every heading at or above `max_depth`.
    ///
    /// Nesting by level is not attempted: every entry is a sibling `<li>`.
    pub fn render_toc(&self, max_depth: usize, options: &ParserOptions) -> String {
        let depth = if max_depth == 0 {
            DEFAULT_TOC_DEPTH
        } else {
            max_depth
        };
        let mut scanner = InlineScanner::new(options);

        let mut out = String::from("<ul>");
        for heading in self
            .headings
            .iter()
            .filter(|heading| usize::from(heading.level) <= depth)
        {
            out.push_str(&format!(
                "<li><a href=\"#{}\">{}</a></li>",
                heading.anchor,
                scanner.scan(&heading.text)
            ));
        }
        out.push_str("</ul>");
        out
    }
}

/// Normalize heading text into an anchor name.
///
/// Whitespace runs collapse to a single `_`; double quotes and backticks are dropped.
pub fn anchor_for(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| !matches!(c, '"' | '`'))
        .collect()
}
