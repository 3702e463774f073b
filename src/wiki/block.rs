//! Block-level constructs: tables, code fences, lists and blockquotes.
//!
//! Each construct is a [`BlockHandler`] fed one line at a time. The same
//! [`run_block`] loop drives the handler for the classification pass (output
//! discarded) and the emission pass, so both consume exactly the same lines.

use super::inline::InlineScanner;

/// The block constructs, in the priority order lines are tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Table,
    Code,
    OrderedList,
    UnorderedList,
    Blockquote,
}

impl BlockKind {
    pub const ALL: [BlockKind; 5] = [
        BlockKind::Table,
        BlockKind::Code,
        BlockKind::OrderedList,
        BlockKind::UnorderedList,
        BlockKind::Blockquote,
    ];

    /// The first kind whose opening predicate matches `line`.
    pub fn classify(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.opens(line))
    }

    /// Whether `line` can open a block of this kind.
    pub fn opens(self, line: &str) -> bool {
        match self {
            BlockKind::Table => is_table_row(line),
            BlockKind::Code => code_opener(line).is_some(),
            BlockKind::OrderedList => list_item(line, '#').is_some(),
            BlockKind::UnorderedList => list_item(line, '*').is_some(),
            BlockKind::Blockquote => is_quote_line(line),
        }
    }

    /// A fresh, closed handler for this kind.
    pub fn handler(self) -> BlockHandler {
        match self {
            BlockKind::Table => BlockHandler::Table { rows: 0 },
            BlockKind::Code => BlockHandler::Code {
                open: false,
                content_lines: 0,
            },
            BlockKind::OrderedList => BlockHandler::List {
                marker: '#',
                tag: "ol",
                items: 0,
            },
            BlockKind::UnorderedList => BlockHandler::List {
                marker: '*',
                tag: "ul",
                items: 0,
            },
            BlockKind::Blockquote => BlockHandler::Blockquote { lines: 0 },
        }
    }
}

/// Outcome of feeding one line to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Line consumed; the next line should be offered too.
    Continue,
    /// Line consumed and the block is closed.
    Closed,
    /// Line not consumed and the block is closed; the caller retries the line.
    Rejected,
}

/// Per-run state of one block construct.
///
/// The counters track how many rows, items or lines are open. A handler is
/// closed when its counter is zero, and every close resets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockHandler {
    Table {
        rows: usize,
    },
    Code {
        open: bool,
        content_lines: usize,
    },
    List {
        marker: char,
        tag: &'static str,
        items: usize,
    },
    Blockquote {
        lines: usize,
    },
}

impl BlockHandler {
    pub fn is_open(&self) -> bool {
        match self {
            BlockHandler::Table { rows } => *rows > 0,
            BlockHandler::Code { open, .. } => *open,
            BlockHandler::List { items, .. } => *items > 0,
            BlockHandler::Blockquote { lines } => *lines > 0,
        }
    }

    pub fn consume_line(&mut self, line: &str, sink: &mut Sink<'_, '_>) -> Step {
        match self {
            BlockHandler::Table { rows } => {
                if !is_table_row(line) {
                    self.finish(sink);
                    return Step::Rejected;
                }
                let cells = table_cells(line);
                if cells.is_empty() {
                    self.finish(sink);
                    return Step::Closed;
                }
                if *rows == 0 {
                    sink.push("<table>");
                }
                *rows += 1;
                sink.push("<tr>");
                for cell in cells {
                    sink.push(CELL_OPEN);
                    sink.push_inline(cell);
                    sink.push("</td>");
                }
                sink.push("</tr>");
                Step::Continue
            }
            BlockHandler::Code {
                open,
                content_lines,
            } => {
                if !*open {
                    let Some(rest) = code_opener(line) else {
                        return Step::Rejected;
                    };
                    *open = true;
                    sink.push("<pre class=\"prettyprint\">");
                    if !rest.trim().is_empty() {
                        push_code(sink, content_lines, rest);
                    }
                    return Step::Continue;
                }

                match line.find("}}}") {
                    Some(pos) => {
                        let (before, after) = (&line[..pos], &line[pos + 3..]);
                        if !before.trim().is_empty() {
                            push_code(sink, content_lines, before);
                        }
                        self.finish(sink);
                        if !after.trim().is_empty() {
                            sink.push_inline(after);
                        }
                        Step::Closed
                    }
                    None => {
                        push_code(sink, content_lines, line);
                        Step::Continue
                    }
                }
            }
            BlockHandler::List { marker, tag, items } => {
                let Some(item) = list_item(line, *marker) else {
                    self.finish(sink);
                    return Step::Rejected;
                };
                if *items == 0 {
                    sink.push(&format!("<{tag}>"));
                }
                *items += 1;
                sink.push("<li>");
                sink.push_inline(item);
                sink.push("</li>");
                Step::Continue
            }
            BlockHandler::Blockquote { lines } => {
                if !is_quote_line(line) {
                    self.finish(sink);
                    return Step::Rejected;
                }
                if *lines == 0 {
                    sink.push("<blockquote>");
                } else {
                    sink.push("\n");
                }
                *lines += 1;
                sink.push_inline(line.trim_start());
                Step::Continue
            }
        }
    }

    /// Emit the closing tag if the block is open, and reset the handler.
    pub fn finish(&mut self, sink: &mut Sink<'_, '_>) {
        if !self.is_open() {
            return;
        }
        match self {
            BlockHandler::Table { rows } => {
                sink.push("</table>");
                *rows = 0;
            }
            BlockHandler::Code {
                open,
                content_lines,
            } => {
                sink.push("</pre>");
                *open = false;
                *content_lines = 0;
            }
            BlockHandler::List { tag, items, .. } => {
                sink.push(&format!("</{tag}>"));
                *items = 0;
            }
            BlockHandler::Blockquote { lines } => {
                sink.push("</blockquote>");
                *lines = 0;
            }
        }
    }
}

/// Opening tag for table cells, styled like Google Code rendered them.
pub const CELL_OPEN: &str = "<td style=\"border: 1px solid #aaa; padding: 5px;\">";

/// Destination for the fragments a handler emits.
pub enum Sink<'s, 'a> {
    /// Classification only: nothing is rendered and no headings are recorded.
    Discard,
    Collect {
        scanner: &'s mut InlineScanner<'a>,
        html: String,
    },
}

impl<'s, 'a> Sink<'s, 'a> {
    pub fn collect(scanner: &'s mut InlineScanner<'a>) -> Self {
        Sink::Collect {
            scanner,
            html: String::new(),
        }
    }

    fn push(&mut self, fragment: &str) {
        if let Sink::Collect { html, .. } = self {
            html.push_str(fragment);
        }
    }

    fn push_inline(&mut self, text: &str) {
        if let Sink::Collect { scanner, html } = self {
            let rendered = scanner.scan(text);
            html.push_str(&rendered);
        }
    }

    fn at_line(&mut self, line: usize) {
        if let Sink::Collect { scanner, .. } = self {
            scanner.at_line(line);
        }
    }

    /// The rendered HTML; empty for a discarding sink.
    pub fn into_html(self) -> String {
        match self {
            Sink::Discard => String::new(),
            Sink::Collect { html, .. } => html,
        }
    }
}

/// Drive a handler of `kind` over `lines` from `start` and return how many
/// lines it consumed. A block still open at end-of-input is closed here.
pub fn run_block<S: AsRef<str>>(
    kind: BlockKind,
    lines: &[S],
    start: usize,
    sink: &mut Sink<'_, '_>,
) -> usize {
    let mut handler = kind.handler();
    let mut cursor = start;

    while let Some(line) = lines.get(cursor) {
        sink.at_line(cursor);
        match handler.consume_line(line.as_ref(), sink) {
            Step::Continue => cursor += 1,
            Step::Closed => return cursor + 1 - start,
            Step::Rejected => return cursor - start,
        }
    }

    handler.finish(sink);
    cursor - start
}

fn is_table_row(line: &str) -> bool {
    line.trim_start().starts_with("||")
}

/// Cells of a table row, trimmed, without the empty edges around the outer `||`.
fn table_cells(line: &str) -> Vec<&str> {
    let mut cells: Vec<&str> = line.trim_start().split("||").skip(1).collect();
    if cells.last().is_some_and(|cell| cell.trim().is_empty()) {
        cells.pop();
    }
    cells.into_iter().map(str::trim).collect()
}

/// Text after `{{{` on a line that opens a multi-line code block.
fn code_opener(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("{{{")?;
    (!rest.contains("}}}")).then_some(rest)
}

/// Item text of an indented list line using `marker`.
fn list_item(line: &str, marker: char) -> Option<&str> {
    let body = line.trim_start();
    if body.len() == line.len() {
        return None;
    }
    let rest = body.strip_prefix(marker)?;
    let item = rest.trim_start();
    if item.len() == rest.len() {
        return None;
    }
    Some(item.trim_end())
}

fn is_quote_line(line: &str) -> bool {
    line.starts_with(char::is_whitespace)
        && !line.trim().is_empty()
        && !is_table_row(line)
        && code_opener(line).is_none()
        && list_item(line, '#').is_none()
        && list_item(line, '*').is_none()
}

fn push_code(sink: &mut Sink<'_, '_>, content_lines: &mut usize, text: &str) {
    if *content_lines > 0 {
        sink.push("\n");
    }
    *content_lines += 1;
    sink.push(&escape_code(text));
}

/// Escape `<` and `&` for a `<pre>` block. An `&` that already starts a
/// character reference is left alone, so escaping twice changes nothing.
pub fn escape_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (pos, c) in text.char_indices() {
        match c {
            '<' => out.push_str("&lt;"),
            '&' if starts_entity(&text[pos + 1..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

fn starts_entity(rest: &str) -> bool {
    let Some(end) = rest.find(';') else {
        return false;
    };
    let name = &rest[..end];
    if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some(digits) = name.strip_prefix('#') {
        return !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());
    }
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}
