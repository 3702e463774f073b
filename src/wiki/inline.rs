//! Single-line inline markup scanner.
//!
//! A line is first checked for whole-line forms (headers, `#summary`/`#labels`
//! directives, horizontal rules), then walked character by character. Paired
//! emphasis markers recurse into the scanner with the captured text, so every
//! recursive call sees a strictly shorter string.

use regex::Regex;
use std::sync::OnceLock;

use super::ParserOptions;
use super::heading::{HeadingRegistry, anchor_for};
use super::link::resolve_link;

/// Scans single lines of wiki text into HTML.
///
/// A scanner built with [`InlineScanner::recording`] appends every matched
/// header to the registry it borrows; one built with [`InlineScanner::new`]
/// only renders.
pub struct InlineScanner<'a> {
    options: &'a ParserOptions,
    headings: Option<&'a mut HeadingRegistry>,
    line: usize,
}

enum Rewrite {
    /// Opaque directive output, nothing left to scan.
    Done(String),
    Line(String),
}

impl<'a> InlineScanner<'a> {
    pub fn new(options: &'a ParserOptions) -> Self {
        Self {
            options,
            headings: None,
            line: 0,
        }
    }

    pub fn recording(options: &'a ParserOptions, headings: &'a mut HeadingRegistry) -> Self {
        Self {
            options,
            headings: Some(headings),
            line: 0,
        }
    }

    /// Set the source line that recorded headings are attributed to.
    pub fn at_line(&mut self, line: usize) {
        self.line = line;
    }

    /// Convert one line of wiki text to HTML. Empty input yields an empty string.
    pub fn scan(&mut self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let line = match self.rewrite_header(text) {
            Rewrite::Done(html) => return html,
            Rewrite::Line(line) => line,
        };
        let mut line = expand_aliases(&line);

        if let Some(rest) = strip_rule(&line) {
            if rest.trim().is_empty() {
                return "<hr/>".to_string();
            }
            line = format!("<hr/>{rest}");
        }

        self.scan_spans(&line)
    }

    fn rewrite_header(&mut self, text: &str) -> Rewrite {
        for (level, pattern) in header_patterns() {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let (Some(whole), Some(title)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let title = title.as_str();
            let anchor = match self.headings.as_deref_mut() {
                Some(registry) => registry.record(*level, title, self.line).anchor.clone(),
                None => anchor_for(title),
            };
            return Rewrite::Line(format!(
                "<h{level}><a name=\"{anchor}\"></a>{title}</h{level}>{}",
                &text[whole.end()..]
            ));
        }

        if let Some(caps) = directive_pattern().captures(text) {
            let class = caps[1].to_ascii_lowercase();
            return Rewrite::Done(format!("<p class=\"{class}\">{}</p>", &caps[2]));
        }

        Rewrite::Line(text.to_string())
    }

    fn scan_spans(&mut self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        // Warnings for unterminated markers follow the text they failed to capture.
        let mut trailing = String::new();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            i = match ch {
                '`' => self.verbatim(&chars, i, &mut out),
                '<' => self.markup(&chars, i, &mut out),
                '[' => self.bracket(&chars, i, &mut out, &mut trailing),
                '!' => unlink(&chars, i, &mut out),
                // `_` inside a word (file_name) never opens emphasis.
                '_' if i > 0 && is_word_char(chars[i - 1]) => {
                    out.push(ch);
                    i + 1
                }
                '*' | '_' | '^' => self.emphasis(&chars, i, &mut out, &mut trailing),
                '~' | ',' => self.doubled(&chars, i, &mut out, &mut trailing),
                _ => {
                    out.push(ch);
                    i + 1
                }
            };
        }

        out.push_str(&trailing);
        out
    }

    /// `` `text` ``: copied as-is apart from `<`.
    fn verbatim(&self, chars: &[char], start: usize, out: &mut String) -> usize {
        let close = find(chars, start + 1, '`');
        let stop = close.unwrap_or(chars.len());

        out.push_str("<tt>");
        for &c in &chars[start + 1..stop] {
            if c == '<' {
                out.push_str("&lt;");
            } else {
                out.push(c);
            }
        }
        if close.is_none() {
            self.warn(out, "unterminated backtick!");
        }
        out.push_str("</tt>");

        close.map_or(chars.len(), |close| close + 1)
    }

    /// Raw HTML passes through untouched; a stray `<` is escaped.
    fn markup(&self, chars: &[char], start: usize, out: &mut String) -> usize {
        let opens_tag = chars
            .get(start + 1)
            .is_some_and(|c| c.is_ascii_alphabetic() || *c == '/');
        if !opens_tag {
            out.push_str("&lt;");
            return start + 1;
        }

        match find(chars, start + 1, '>') {
            Some(close) => {
                out.extend(&chars[start..=close]);
                close + 1
            }
            None => {
                out.extend(&chars[start..]);
                self.warn(out, "unterminated less-than!");
                chars.len()
            }
        }
    }

    fn bracket(
        &self,
        chars: &[char],
        start: usize,
        out: &mut String,
        trailing: &mut String,
    ) -> usize {
        if !chars.get(start + 1).is_some_and(|c| c.is_ascii_alphabetic()) {
            out.push('[');
            return start + 1;
        }

        let Some(close) = find(chars, start + 1, ']') else {
            out.push('[');
            self.warn(trailing, "unterminated '['!");
            return start + 1;
        };

        let body: String = chars[start + 1..close].iter().collect();
        let (target, label) = split_link(&body);
        out.push_str(&resolve_link(target, label));
        close + 1
    }

    /// `*bold*`, `_emphasis_`, `^superscript^`.
    fn emphasis(
        &mut self,
        chars: &[char],
        start: usize,
        out: &mut String,
        trailing: &mut String,
    ) -> usize {
        let marker = chars[start];
        let tag = tag_for(marker);

        match find(chars, start + 1, marker) {
            Some(close) if close > start + 1 => {
                let inner: String = chars[start + 1..close].iter().collect();
                let html = self.scan(&inner);
                out.push_str(&format!("<{tag}>{html}</{tag}>"));
                close + 1
            }
            Some(close) => {
                out.push(marker);
                out.push(marker);
                self.warn(out, &format!("empty '{marker}{marker}'!"));
                close + 1
            }
            None => {
                out.push(marker);
                self.warn(trailing, &format!("unterminated '{marker}'!"));
                start + 1
            }
        }
    }

    /// `~~strike~~` and `,,subscript,,`; a single marker is plain text.
    fn doubled(
        &mut self,
        chars: &[char],
        start: usize,
        out: &mut String,
        trailing: &mut String,
    ) -> usize {
        let marker = chars[start];
        if chars.get(start + 1) != Some(&marker) {
            out.push(marker);
            return start + 1;
        }

        let body_start = start + 2;
        let close = (body_start..chars.len().saturating_sub(1))
            .find(|&x| chars[x] == marker && chars[x + 1] == marker);

        match close {
            Some(close) => {
                let tag = tag_for(marker);
                let inner: String = chars[body_start..close].iter().collect();
                let html = self.scan(&inner);
                out.push_str(&format!("<{tag}>{html}</{tag}>"));
                close + 2
            }
            None => {
                out.push(marker);
                out.push(marker);
                self.warn(trailing, &format!("mis-terminated '{marker}{marker}'!"));
                body_start
            }
        }
    }

    fn warn(&self, out: &mut String, message: &str) {
        log::trace!("line {}: {}", self.line + 1, message);
        out.push_str(&self.options.warning(message));
    }
}

/// `!WikiWord` renders the word without linking; any other `!` is literal.
fn unlink(chars: &[char], start: usize, out: &mut String) -> usize {
    let word_end = chars[start + 1..]
        .iter()
        .position(|c| !is_word_char(*c))
        .map_or(chars.len(), |offset| start + 1 + offset);
    let word = &chars[start + 1..word_end];

    if is_wiki_word(word) {
        out.extend(word);
        word_end
    } else {
        out.push('!');
        start + 1
    }
}

fn header_patterns() -> &'static [(u8, Regex)] {
    static HEADERS: OnceLock<Vec<(u8, Regex)>> = OnceLock::new();
    HEADERS.get_or_init(|| {
        (1..=6u8)
            .rev()
            .map(|level| {
                let pattern = format!(r"^\s*={{{level}}}\s*([^<>=]+?)\s*={{{level}}}");
                let regex = Regex::new(&pattern).expect("header regex should compile");
                (level, regex)
            })
            .collect()
    })
}

fn directive_pattern() -> &'static Regex {
    static DIRECTIVE: OnceLock<Regex> = OnceLock::new();
    DIRECTIVE.get_or_init(|| {
        Regex::new(r"(?i)^#(summary|labels)\s+(.*)$").expect("directive regex should compile")
    })
}

/// Rewrite single-line `{{{text}}}` spans into backticks, leftmost first,
/// until none remain.
fn expand_aliases(line: &str) -> String {
    let mut line = line.to_string();
    let mut from = 0;

    while let Some(offset) = line[from..].find("{{{") {
        let open = from + offset;
        let body_start = open + 3;
        match line[body_start..].find('}') {
            Some(len) if len > 0 && line[body_start + len..].starts_with("}}}") => {
                let body = line[body_start..body_start + len].to_string();
                line.replace_range(open..body_start + len + 3, &format!("`{body}`"));
                from = open;
            }
            _ => from = open + 1,
        }
    }

    line
}

/// If the line opens with four or more hyphens, return what follows them.
fn strip_rule(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let dashes = trimmed.len() - trimmed.trim_start_matches('-').len();
    (dashes >= 4).then(|| &trimmed[dashes..])
}

/// Split a bracket body on its first whitespace run into target and label.
fn split_link(body: &str) -> (&str, Option<&str>) {
    match body.find(char::is_whitespace) {
        Some(pos) => {
            let label = body[pos..].trim();
            (&body[..pos], (!label.is_empty()).then_some(label))
        }
        None => (body, None),
    }
}

fn find(chars: &[char], from: usize, target: char) -> Option<usize> {
    chars
        .get(from..)?
        .iter()
        .position(|&c| c == target)
        .map(|offset| from + offset)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_wiki_word(word: &[char]) -> bool {
    word.len() >= 2 && word[0].is_ascii_uppercase()
}

fn tag_for(marker: char) -> &'static str {
    match marker {
        '*' => "strong",
        '_' => "em",
        '^' => "sup",
        '~' => "strike",
        _ => "sub",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> ParserOptions {
        ParserOptions {
            disable_warnings: true,
            ..Default::default()
        }
    }

    fn scan(text: &str) -> String {
        let options = quiet();
        InlineScanner::new(&options).scan(text)
    }

    fn scan_loud(text: &str) -> String {
        let options = ParserOptions::default();
        InlineScanner::new(&options).scan(text)
    }

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(scan(""), "");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(scan("just some words."), "just some words.");
        assert_eq!(scan("  leading space"), "  leading space");
    }

    #[test]
    fn emphasis_markers() {
        assert_eq!(scan("*bold*"), "<strong>bold</strong>");
        assert_eq!(scan("_it_"), "<em>it</em>");
        assert_eq!(scan("x^2^"), "x<sup>2</sup>");
        assert_eq!(scan("~~gone~~"), "<strike>gone</strike>");
        assert_eq!(scan("H,,2,,O"), "H<sub>2</sub>O");
    }

    #[test]
    fn nested_emphasis_recurses() {
        assert_eq!(scan("*_both_*"), "<strong><em>both</em></strong>");
        assert_eq!(
            scan("~~a *b* c~~"),
            "<strike>a <strong>b</strong> c</strike>"
        );
    }

    #[test]
    fn underscore_inside_word_is_literal() {
        assert_eq!(scan("file_name_here"), "file_name_here");
        assert_eq!(scan("a _b_"), "a <em>b</em>");
    }

    #[test]
    fn unterminated_emphasis_is_literal() {
        assert_eq!(scan("*unterminated"), "*unterminated");
        assert_eq!(scan("2 * 3"), "2 * 3");
    }

    #[test]
    fn unterminated_emphasis_warns_after_the_line() {
        let html = scan_loud("*open _it_");
        assert!(html.starts_with("*open <em>it</em><span"));
        assert!(html.ends_with("WIKI PARSE WARNING: unterminated '*'!</span>"));
    }

    #[test]
    fn unterminated_bracket_and_doubled_warn_after_the_line() {
        let html = scan_loud("[Open link");
        assert!(html.starts_with("[Open link<span"));
        assert!(html.ends_with("unterminated '['!</span>"));

        let html = scan_loud("~~gone for good");
        assert!(html.starts_with("~~gone for good<span"));
        assert!(html.ends_with("mis-terminated '~~'!</span>"));
    }

    #[test]
    fn nested_unterminated_marker_warns_inside_its_span() {
        let html = scan_loud("*a _b* c");
        assert!(html.starts_with("<strong>a _b<span"));
        assert!(html.ends_with("</span></strong> c"));
    }

    #[test]
    fn empty_emphasis_is_literal() {
        assert_eq!(scan("**"), "**");
        assert!(scan_loud("**").contains("empty '**'!"));
    }

    #[test]
    fn single_tilde_and_comma_are_literal() {
        assert_eq!(scan("~1, 2, 3"), "~1, 2, 3");
    }

    #[test]
    fn misterminated_doubled_marker_restores_prefix() {
        assert_eq!(scan(",,sub,"), ",,sub,");
        assert!(scan_loud("~~open").contains("mis-terminated '~~'!"));
    }

    #[test]
    fn backticks_are_verbatim() {
        assert_eq!(scan("`*not bold*`"), "<tt>*not bold*</tt>");
        assert_eq!(scan("`a < b`"), "<tt>a &lt; b</tt>");
    }

    #[test]
    fn unterminated_backtick_closes_tt() {
        assert_eq!(scan("`open code"), "<tt>open code</tt>");
        let html = scan_loud("`open");
        assert!(html.contains("unterminated backtick!"));
        assert!(html.ends_with("</tt>"));
    }

    #[test]
    fn triple_braces_alias_backticks() {
        assert_eq!(scan("{{{*x*}}}"), "<tt>*x*</tt>");
        assert_eq!(
            scan("{{{a}}} and {{{b}}}"),
            "<tt>a</tt> and <tt>b</tt>"
        );
    }

    #[test]
    fn alias_expansion_handles_leading_brace() {
        assert_eq!(expand_aliases("{{{{x}}}"), "`{x`");
        assert_eq!(expand_aliases("{{{}}}"), "{{{}}}");
        assert_eq!(expand_aliases("{{{ open"), "{{{ open");
    }

    #[test]
    fn html_passes_through() {
        assert_eq!(
            scan("some <a href=\"x\">inlined HTML</a>."),
            "some <a href=\"x\">inlined HTML</a>."
        );
    }

    #[test]
    fn stray_less_than_is_escaped() {
        assert_eq!(scan("1 < 2"), "1 &lt; 2");
        assert_eq!(scan("end <"), "end &lt;");
    }

    #[test]
    fn unterminated_tag_warns() {
        assert_eq!(scan("<b unterminated"), "<b unterminated");
        assert!(scan_loud("<b").contains("unterminated less-than!"));
    }

    #[test]
    fn bracket_links() {
        assert_eq!(scan("[WikiPage]"), "<a href=\"WikiPage\">WikiPage</a>");
        assert_eq!(
            scan("see [http://x.org the site]."),
            "see <a href=\"http://x.org\">the site</a>."
        );
        assert_eq!(
            scan("[http://example.com/a.png]"),
            "<img src=\"http://example.com/a.png\" />"
        );
    }

    #[test]
    fn bracket_needs_letter() {
        assert_eq!(scan("[1] and [ x]"), "[1] and [ x]");
    }

    #[test]
    fn unterminated_bracket_is_literal() {
        assert_eq!(scan("[Open *b*"), "[Open <strong>b</strong>");
        assert!(scan_loud("[Open").contains("unterminated '['!"));
    }

    #[test]
    fn bang_unlinks_wiki_words() {
        assert_eq!(scan("A !UnlinkedWikiWord here"), "A UnlinkedWikiWord here");
        assert_eq!(scan("a ! by itself"), "a ! by itself");
        assert_eq!(scan("!non-wikid"), "!non-wikid");
        assert_eq!(scan("wow!"), "wow!");
    }

    #[test]
    fn headers_record_into_registry() {
        let options = quiet();
        let mut registry = HeadingRegistry::new();
        let html = {
            let mut scanner = InlineScanner::recording(&options, &mut registry);
            scanner.at_line(4);
            scanner.scan("== Build  Steps ==")
        };
        assert_eq!(html, "<h2><a name=\"Build_Steps\"></a>Build  Steps</h2>");
        assert_eq!(registry.headings().len(), 1);
        assert_eq!(registry.headings()[0].level, 2);
        assert_eq!(registry.headings()[0].line, 4);
    }

    #[test]
    fn header_levels_six_to_one() {
        assert_eq!(scan("=a="), "<h1><a name=\"a\"></a>a</h1>");
        assert_eq!(scan("======f======"), "<h6><a name=\"f\"></a>f</h6>");
        assert!(scan("===c===").starts_with("<h3>"));
    }

    #[test]
    fn header_content_is_scanned() {
        assert_eq!(
            scan("=hi, `world`!="),
            "<h1><a name=\"hi,_world!\"></a>hi, <tt>world</tt>!</h1>"
        );
    }

    #[test]
    fn header_trailing_text_is_kept() {
        assert_eq!(scan("=T= *x*"), "<h1><a name=\"T\"></a>T</h1> <strong>x</strong>");
    }

    #[test]
    fn non_recording_scanner_leaves_registry_alone() {
        let options = quiet();
        let mut scanner = InlineScanner::new(&options);
        assert!(scanner.scan("=x=").starts_with("<h1>"));
        assert!(scanner.headings.is_none());
    }

    #[test]
    fn directives_are_opaque() {
        assert_eq!(
            scan("#summary A *short* summary"),
            "<p class=\"summary\">A *short* summary</p>"
        );
        assert_eq!(scan("#Labels Featured"), "<p class=\"labels\">Featured</p>");
    }

    #[test]
    fn horizontal_rules() {
        assert_eq!(scan("----"), "<hr/>");
        assert_eq!(scan("---------  "), "<hr/>");
        assert_eq!(scan("---- *after*"), "<hr/> <strong>after</strong>");
        assert_eq!(scan("---"), "---");
    }
}
