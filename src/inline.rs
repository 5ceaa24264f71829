//! Inline parsing: code spans, emphasis, links, images and raw HTML
//!
//! Scans left to right over a `char` buffer. Every `try_parse_*` helper
//! returns the node plus the index just past it, or `None` when the
//! construct doesn't match, in which case the opening characters are kept
//! as literal text.

use crate::ast::Inline;
use crate::parser::MAX_NESTING_DEPTH;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Parse the inline content of a text-bearing block
pub(crate) fn parse_inline(text: &str) -> Vec<Inline> {
    let chars: Vec<char> = text.chars().collect();
    InlineScanner::new(&chars, 0).parse()
}

/// One run of inline text. The contents of emphasis, strikethrough and
/// link labels are scanned by a fresh scanner one level deeper.
struct InlineScanner<'a> {
    chars: &'a [char],
    depth: usize,
    /// `(delimiter, run length, index)`: a closer search passing this index
    /// is known to reach the end without a match
    dead_ends: HashSet<(char, usize, usize)>,
    /// Matching `]` for every `[` a label search has walked over
    label_ends: HashMap<usize, Option<usize>>,
}

impl<'a> InlineScanner<'a> {
    fn new(chars: &'a [char], depth: usize) -> Self {
        InlineScanner {
            chars,
            depth,
            dead_ends: HashSet::new(),
            label_ends: HashMap::new(),
        }
    }

    fn nested(&self, start: usize, end: usize) -> Vec<Inline> {
        InlineScanner::new(&self.chars[start..end], self.depth + 1).parse()
    }

    fn parse(&mut self) -> Vec<Inline> {
        let chars = self.chars;
        let mut nodes = Vec::new();
        let mut text = String::new();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '\\' => {
                    match chars.get(i + 1) {
                        // Backslash at end of line is a hard break
                        Some('\n') => {
                            flush_text(&mut nodes, &mut text);
                            nodes.push(Inline::HardBreak);
                            i = skip_spaces(chars, i + 2);
                        }
                        Some(&next) if next.is_ascii_punctuation() => {
                            text.push(next);
                            i += 2;
                        }
                        _ => {
                            text.push('\\');
                            i += 1;
                        }
                    }
                }
                '`' => {
                    if let Some((node, next)) = try_parse_code_span(chars, i) {
                        flush_text(&mut nodes, &mut text);
                        nodes.push(node);
                        i = next;
                    } else {
                        // Unmatched backtick run stays literal as a whole
                        let run = run_length(chars, i, '`');
                        text.extend(std::iter::repeat_n('`', run));
                        i += run;
                    }
                }
                '*' | '_' | '~' => {
                    let delimiter = chars[i];
                    let run = run_length(chars, i, delimiter);
                    let parsed = if delimiter == '~' {
                        self.try_parse_strikethrough(i)
                    } else {
                        self.try_parse_emphasis(i)
                    };
                    if let Some((surplus, node, next)) = parsed {
                        text.extend(std::iter::repeat_n(delimiter, surplus));
                        flush_text(&mut nodes, &mut text);
                        nodes.push(node);
                        i = next;
                    } else {
                        trace!(delimiter = %delimiter, run, "unmatched delimiter run kept literal");
                        text.extend(std::iter::repeat_n(delimiter, run));
                        i += run;
                    }
                }
                '!' if chars.get(i + 1) == Some(&'[') => {
                    if let Some((node, next)) = self.try_parse_image(i) {
                        flush_text(&mut nodes, &mut text);
                        nodes.push(node);
                        i = next;
                    } else {
                        text.push('!');
                        i += 1;
                    }
                }
                '[' => {
                    if let Some((node, next)) = self.try_parse_link(i) {
                        flush_text(&mut nodes, &mut text);
                        nodes.push(node);
                        i = next;
                    } else {
                        text.push('[');
                        i += 1;
                    }
                }
                '<' => {
                    let parsed =
                        try_parse_autolink(chars, i).or_else(|| try_parse_html_inline(chars, i));
                    if let Some((node, next)) = parsed {
                        flush_text(&mut nodes, &mut text);
                        nodes.push(node);
                        i = next;
                    } else {
                        text.push('<');
                        i += 1;
                    }
                }
                '\n' => {
                    // Two or more trailing spaces turn the newline into a hard break
                    let trailing = text.len() - text.trim_end_matches(' ').len();
                    text.truncate(text.len() - trailing);
                    flush_text(&mut nodes, &mut text);
                    if trailing >= 2 {
                        nodes.push(Inline::HardBreak);
                    } else {
                        nodes.push(Inline::SoftBreak);
                    }
                    i = skip_spaces(chars, i + 1);
                }
                c => {
                    text.push(c);
                    i += 1;
                }
            }
        }

        flush_text(&mut nodes, &mut text);
        nodes
    }

    /// Try to open emphasis at a `*` or `_` run.
    ///
    /// Returns the count of surplus opener characters to emit literally
    /// before the node, the node itself, and the index past the closer.
    fn try_parse_emphasis(&mut self, start: usize) -> Option<(usize, Inline, usize)> {
        let chars = self.chars;
        let delimiter = chars[start];
        let run = run_length(chars, start, delimiter);
        let after = start + run;

        if self.depth >= MAX_NESTING_DEPTH {
            return None;
        }
        // Opener must be left-flanking
        if after >= chars.len() || chars[after].is_whitespace() {
            return None;
        }
        // Intraword underscores never open emphasis
        if delimiter == '_' && start > 0 && chars[start - 1].is_alphanumeric() {
            return None;
        }

        for count in (1..=run.min(3)).rev() {
            if let Some(close) = self.find_closer(after, delimiter, count) {
                let inner = self.nested(after, close);
                let node = match count {
                    3 => Inline::Strong(vec![Inline::Emphasis(inner)]),
                    2 => Inline::Strong(inner),
                    _ => Inline::Emphasis(inner),
                };
                return Some((run - count, node, close + count));
            }
        }

        None
    }

    fn try_parse_strikethrough(&mut self, start: usize) -> Option<(usize, Inline, usize)> {
        let chars = self.chars;
        let after = start + 2;
        if self.depth >= MAX_NESTING_DEPTH
            || run_length(chars, start, '~') != 2
            || after >= chars.len()
            || chars[after].is_whitespace()
        {
            return None;
        }

        let close = self.find_closer(after, '~', 2)?;
        let inner = self.nested(after, close);
        Some((0, Inline::Strikethrough(inner), close + 2))
    }

    /// Find a closing delimiter run of exactly `count` characters.
    ///
    /// Escaped characters and code spans are skipped so their contents never
    /// close emphasis opened outside them. Past the first index the walk
    /// depends only on position, so indices of a failed walk are remembered
    /// and later searches stop when they reach one.
    fn find_closer(&mut self, from: usize, delimiter: char, count: usize) -> Option<usize> {
        let chars = self.chars;
        let mut walked = Vec::new();
        let mut i = from;

        while i < chars.len() {
            if i > from {
                if self.dead_ends.contains(&(delimiter, count, i)) {
                    break;
                }
                walked.push(i);
            }

            let c = chars[i];
            if c == '\\' {
                i += 2;
            } else if c == '`' {
                i = match try_parse_code_span(chars, i) {
                    Some((_, next)) => next,
                    None => i + run_length(chars, i, '`'),
                };
            } else if c == delimiter {
                let run = run_length(chars, i, delimiter);
                let right_flanking = i > from && !chars[i - 1].is_whitespace();
                let word_boundary = delimiter != '_'
                    || chars.get(i + run).is_none_or(|next| !next.is_alphanumeric());
                if run == count && right_flanking && word_boundary {
                    return Some(i);
                }
                i += run;
            } else {
                i += 1;
            }
        }

        self.dead_ends
            .extend(walked.into_iter().map(|index| (delimiter, count, index)));
        None
    }

    /// Index of the `]` matching the `[` at `start`.
    ///
    /// Every `[` passed on the way is resolved too, so a later search from
    /// one of them is a lookup, and a search reaching one skips over it.
    fn find_label_end(&mut self, start: usize) -> Option<usize> {
        if let Some(&known) = self.label_ends.get(&start) {
            return known;
        }

        let chars = self.chars;
        let mut open = Vec::new();
        let mut i = start;

        while i < chars.len() {
            match chars[i] {
                '\\' => i += 1,
                '`' => {
                    if let Some((_, next)) = try_parse_code_span(chars, i) {
                        i = next;
                        continue;
                    }
                }
                '[' => {
                    if i > start
                        && let Some(&known) = self.label_ends.get(&i)
                    {
                        match known {
                            Some(end) => {
                                i = end + 1;
                                continue;
                            }
                            // Unclosed inside means unclosed here as well
                            None => break,
                        }
                    }
                    open.push(i);
                }
                ']' => {
                    if let Some(opener) = open.pop() {
                        self.label_ends.insert(opener, Some(i));
                        if open.is_empty() {
                            return Some(i);
                        }
                    }
                }
                _ => {}
            }
            i += 1;
        }

        for opener in open {
            self.label_ends.insert(opener, None);
        }
        None
    }

    fn try_parse_link(&mut self, start: usize) -> Option<(Inline, usize)> {
        if self.depth >= MAX_NESTING_DEPTH {
            return None;
        }

        let chars = self.chars;
        let label_end = self.find_label_end(start)?;
        if chars.get(label_end + 1) != Some(&'(') {
            return None;
        }

        let (destination, title, next) = parse_link_target(chars, label_end + 2)?;
        let children = self.nested(start + 1, label_end);

        Some((
            Inline::Link {
                destination,
                title,
                children,
            },
            next,
        ))
    }

    fn try_parse_image(&mut self, start: usize) -> Option<(Inline, usize)> {
        // Image syntax is a link preceded by '!'
        let (link, next) = self.try_parse_link(start + 1)?;
        match link {
            Inline::Link {
                destination,
                title,
                children,
            } => {
                let alt = children.iter().map(Inline::plain_text).collect();
                Some((
                    Inline::Image {
                        destination,
                        title,
                        alt,
                    },
                    next,
                ))
            }
            _ => None,
        }
    }
}

fn flush_text(nodes: &mut Vec<Inline>, text: &mut String) {
    if !text.is_empty() {
        nodes.push(Inline::Text(std::mem::take(text)));
    }
}

fn run_length(chars: &[char], start: usize, ch: char) -> usize {
    chars[start..].iter().take_while(|&&c| c == ch).count()
}

fn skip_spaces(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && (chars[i] == ' ' || chars[i] == '\t') {
        i += 1;
    }
    i
}

fn try_parse_code_span(chars: &[char], start: usize) -> Option<(Inline, usize)> {
    let backtick_count = run_length(chars, start, '`');
    let content_start = start + backtick_count;
    let mut j = content_start;

    // Look for a closing run of exactly the same length
    while j < chars.len() {
        if chars[j] == '`' {
            let close_start = j;
            let close_count = run_length(chars, j, '`');
            j += close_count;

            if close_count == backtick_count {
                let mut content: String = chars[content_start..close_start].iter().collect();
                content = content.replace('\n', " ");

                // Strip one leading and trailing space if both present and content isn't all spaces
                if content.len() > 2
                    && content.starts_with(' ')
                    && content.ends_with(' ')
                    && !content.trim().is_empty()
                {
                    content = content[1..content.len() - 1].to_string();
                }

                return Some((Inline::Code(content), j));
            }
        } else {
            j += 1;
        }
    }

    None
}

/// Parse `destination "title")` following the opening parenthesis
fn parse_link_target(chars: &[char], start: usize) -> Option<(String, Option<String>, usize)> {
    let mut i = start;

    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }

    // Destination: either <...> or a run without whitespace and with balanced parens
    let destination = if chars.get(i) == Some(&'<') {
        i += 1;
        let dest_start = i;
        while i < chars.len() && chars[i] != '>' {
            if chars[i] == '\n' || chars[i] == '<' {
                return None;
            }
            if chars[i] == '\\' {
                i += 1;
            }
            i += 1;
        }
        if i >= chars.len() {
            return None; // Unclosed angle bracket
        }
        let raw: String = chars[dest_start..i].iter().collect();
        i += 1;
        raw
    } else {
        let dest_start = i;
        let mut paren_depth = 0;
        while i < chars.len() {
            let c = chars[i];
            if c == '(' {
                paren_depth += 1;
            } else if c == ')' {
                if paren_depth == 0 {
                    break;
                }
                paren_depth -= 1;
            } else if c == '\\' && i + 1 < chars.len() {
                i += 1;
            } else if c.is_whitespace() || c.is_control() {
                break;
            }
            i += 1;
        }
        if paren_depth != 0 {
            return None;
        }
        chars[dest_start..i].iter().collect()
    };

    let before_space = i;
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }

    // Optional title, which must be separated from the destination
    let mut title = None;
    if i > before_space
        && let Some(&open) = chars.get(i)
        && matches!(open, '"' | '\'' | '(')
    {
        let close = if open == '(' { ')' } else { open };
        i += 1;
        let title_start = i;
        while i < chars.len() && chars[i] != close {
            if chars[i] == '\\' {
                i += 1;
            }
            i += 1;
        }
        if i >= chars.len() {
            return None; // Unclosed title
        }
        let raw: String = chars[title_start..i].iter().collect();
        title = Some(unescape(&raw));
        i += 1;

        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
    }

    if chars.get(i) != Some(&')') {
        return None;
    }

    Some((unescape(&destination), title, i + 1))
}

/// Resolve backslash escapes of ASCII punctuation
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && next.is_ascii_punctuation()
        {
            out.push(next);
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

/// `<scheme:rest>` becomes a link to itself
fn try_parse_autolink(chars: &[char], start: usize) -> Option<(Inline, usize)> {
    let mut i = start + 1;
    let scheme_start = i;

    if !chars.get(i)?.is_ascii_alphabetic() {
        return None;
    }
    while i < chars.len()
        && (chars[i].is_ascii_alphanumeric() || matches!(chars[i], '+' | '.' | '-'))
    {
        i += 1;
    }
    let scheme_len = i - scheme_start;
    if !(2..=32).contains(&scheme_len) || chars.get(i) != Some(&':') {
        return None;
    }

    while i < chars.len() && chars[i] != '>' {
        if chars[i] == '<' || chars[i].is_whitespace() || chars[i].is_control() {
            return None;
        }
        i += 1;
    }
    if i >= chars.len() {
        return None;
    }

    let url: String = chars[start + 1..i].iter().collect();
    Some((
        Inline::Link {
            destination: url.clone(),
            title: None,
            children: vec![Inline::Text(url)],
        },
        i + 1,
    ))
}

/// Open tags, closing tags and comments pass through untouched
fn try_parse_html_inline(chars: &[char], start: usize) -> Option<(Inline, usize)> {
    let mut i = start + 1;

    // Comment: <!-- ... -->
    if chars[i..].starts_with(&['!', '-', '-']) {
        i += 3;
        while i + 2 < chars.len() {
            if chars[i..].starts_with(&['-', '-', '>']) {
                let html: String = chars[start..i + 3].iter().collect();
                return Some((Inline::HtmlInline(html), i + 3));
            }
            i += 1;
        }
        return None;
    }

    if chars.get(i) == Some(&'/') {
        i += 1;
    }

    // Tag name must start with an ASCII letter
    if !chars.get(i)?.is_ascii_alphabetic() {
        return None;
    }
    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '-') {
        i += 1;
    }
    match chars.get(i) {
        Some(c) if c.is_whitespace() || *c == '/' || *c == '>' => {}
        _ => return None,
    }

    // Attributes: scan to the closing '>' outside quotes
    let mut quote: Option<char> = None;
    while i < chars.len() {
        let c = chars[i];
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '<' => return None,
                '>' => {
                    let html: String = chars[start..=i].iter().collect();
                    return Some((Inline::HtmlInline(html), i + 1));
                }
                _ => {}
            },
        }
        i += 1;
    }

    None
}
