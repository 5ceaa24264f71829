//! Block-level Markdown parser
//!
//! Splits the input into lines and recognizes block constructs with
//! lookahead. Every `parse_*` helper takes the remaining lines and returns
//! the block plus the number of lines it consumed. Inline content is handed
//! to [`crate::inline`].

use crate::ast::{
    Alignment, Block, Checkbox, Document, Inline, ListItem, Table, TableCell, TableRow,
};
use crate::inline::parse_inline;
use tracing::{debug, trace};

/// Tags that open a raw HTML block when they start a line
const HTML_BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "center", "details", "dialog", "dd",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "main", "menu",
    "nav", "ol", "p", "pre", "script", "section", "style", "summary", "table", "tbody", "td",
    "textarea", "tfoot", "th", "thead", "tr", "ul",
];

/// Deepest block or inline nesting that is still parsed structurally.
/// Markers past this depth are kept as literal text.
pub(crate) const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Default, Clone, Copy)]
pub struct Parser;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ListType {
    Bullet,
    Ordered(u32), // Start number
}

impl ListType {
    /// Bullet and numbered items never share a list
    fn is_compatible(&self, other: &ListType) -> bool {
        matches!(
            (self, other),
            (ListType::Bullet, ListType::Bullet) | (ListType::Ordered(_), ListType::Ordered(_))
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct ListMarker {
    list_type: ListType,
    indent: usize, // Spaces before the marker
    width: usize,  // Marker plus the single space after it, in bytes
}

impl Parser {
    pub fn new() -> Self {
        Parser
    }

    /// Parse Markdown source into a document tree. Never fails.
    pub fn parse(&self, input: &str) -> Document {
        let lines: Vec<&str> = input.lines().collect();
        let children = self.parse_blocks(&lines, false, 0);
        debug!(lines = lines.len(), blocks = children.len(), "parsed document");
        Document::new(children)
    }

    /// Parse a run of lines into blocks.
    ///
    /// `in_quote` enables the block-quote rule where an empty line between
    /// two paragraph lines is a hard break rather than a paragraph boundary.
    /// At `MAX_NESTING_DEPTH` quotes and lists no longer open and their
    /// markers fall through to paragraph text.
    fn parse_blocks(&self, lines: &[&str], in_quote: bool, depth: usize) -> Vec<Block> {
        let nested = depth < MAX_NESTING_DEPTH;
        let mut blocks = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];

            // Blank lines are skipped
            if line.trim().is_empty() {
                i += 1;
            }
            // Fenced code first, its content is never parsed
            else if let Some((fence_char, fence_len, indent)) = self.is_fenced_code_start(line) {
                trace!(line = i, "fenced code block");
                let (code_block, lines_consumed) =
                    self.parse_fenced_code_block(&lines[i..], fence_char, fence_len, indent);
                blocks.push(code_block);
                i += lines_consumed;
            } else if let Some(heading) = self.parse_atx_heading(line) {
                blocks.push(heading);
                i += 1;
            }
            // Thematic break before lists, `* * *` is not a list item
            else if self.is_thematic_break(line) {
                blocks.push(Block::ThematicBreak);
                i += 1;
            } else if nested && self.is_blockquote_start(line) {
                trace!(line = i, "block quote");
                let (blockquote, lines_consumed) = self.parse_blockquote(&lines[i..], depth);
                blocks.push(blockquote);
                i += lines_consumed;
            } else if self.is_html_block_start(line) {
                trace!(line = i, "html block");
                let (html_block, lines_consumed) = self.parse_html_block(&lines[i..]);
                blocks.push(html_block);
                i += lines_consumed;
            } else if let Some(marker) = self.is_list_start(line).filter(|_| nested) {
                trace!(line = i, list_type = ?marker.list_type, "list");
                let (list, lines_consumed) =
                    self.parse_list(&lines[i..], marker.list_type, depth);
                blocks.push(list);
                i += lines_consumed;
            } else if let Some((table, lines_consumed)) = self.try_parse_table(&lines[i..]) {
                trace!(line = i, rows = lines_consumed, "table");
                blocks.push(table);
                i += lines_consumed;
            } else {
                let (paragraph, lines_consumed) = self.parse_paragraph(&lines[i..], in_quote);
                blocks.push(paragraph);
                i += lines_consumed;
            }
        }

        blocks
    }

    /// Check if a line starts a fenced code block
    /// Returns Some((fence_char, fence_length, indent)) if it does
    fn is_fenced_code_start(&self, line: &str) -> Option<(char, usize, usize)> {
        let indent = count_leading_spaces(line);
        if indent >= 4 {
            return None;
        }

        let after_indent = trim_indent(line);
        let fence_char = after_indent.chars().next()?;
        if fence_char != '`' && fence_char != '~' {
            return None;
        }

        let fence_len = after_indent
            .chars()
            .take_while(|&c| c == fence_char)
            .count();
        if fence_len < 3 {
            return None;
        }

        // An info string after a backtick fence can't contain backticks,
        // otherwise ``` ``` on one line would open a fence
        if fence_char == '`' && after_indent[fence_len..].contains('`') {
            return None;
        }

        Some((fence_char, fence_len, indent))
    }

    fn parse_fenced_code_block(
        &self,
        lines: &[&str],
        fence_char: char,
        fence_len: usize,
        fence_indent: usize,
    ) -> (Block, usize) {
        let info = trim_indent(lines[0])[fence_len..].trim();
        // Only the first word becomes the language class
        let language = info.split_whitespace().next().map(str::to_string);

        let mut code_lines = Vec::new();
        let mut i = 1;
        let mut closed = false;

        while i < lines.len() {
            let line = lines[i];
            i += 1;
            if self.is_closing_fence(line, fence_char, fence_len) {
                closed = true;
                break;
            }
            code_lines.push(remove_indent(line, fence_indent));
        }

        if !closed {
            debug!("unclosed code fence runs to end of input");
        }

        let literal = if code_lines.is_empty() {
            String::new()
        } else {
            code_lines.join("\n") + "\n"
        };

        (Block::CodeBlock { language, literal }, i)
    }

    fn is_closing_fence(&self, line: &str, fence_char: char, min_fence_len: usize) -> bool {
        if count_leading_spaces(line) >= 4 {
            return false;
        }

        let after_indent = trim_indent(line);
        let fence_len = after_indent
            .chars()
            .take_while(|&c| c == fence_char)
            .count();

        // Only whitespace may follow the closing fence
        fence_len >= min_fence_len && after_indent[fence_len..].trim().is_empty()
    }

    fn parse_atx_heading(&self, line: &str) -> Option<Block> {
        if count_leading_spaces(line) >= 4 {
            return None;
        }

        let trimmed = trim_indent(line);
        let hash_count = trimmed.chars().take_while(|&c| c == '#').count();
        if hash_count == 0 || hash_count > 6 {
            return None;
        }

        // Hashes must be followed by whitespace or end of line
        let after_hashes = &trimmed[hash_count..];
        if !after_hashes.is_empty() && !after_hashes.starts_with([' ', '\t']) {
            return None;
        }

        let mut text = after_hashes.trim();

        // A closing run of # is stripped when preceded by whitespace
        let without_hashes = text.trim_end_matches('#');
        if without_hashes.is_empty() {
            text = "";
        } else if without_hashes.ends_with([' ', '\t']) {
            text = without_hashes.trim_end();
        }

        Some(Block::Heading {
            level: hash_count as u8,
            children: parse_inline(text),
        })
    }

    fn is_thematic_break(&self, line: &str) -> bool {
        if count_leading_spaces(line) >= 4 {
            return false;
        }

        // Three or more of one marker character, spaces allowed in between
        let chars_only: Vec<char> = line.chars().filter(|c| !matches!(c, ' ' | '\t')).collect();
        if chars_only.len() < 3 {
            return false;
        }

        match chars_only[0] {
            c @ ('-' | '_' | '*') => chars_only.iter().all(|&x| x == c),
            _ => false,
        }
    }

    fn is_blockquote_start(&self, line: &str) -> bool {
        count_leading_spaces(line) < 4 && trim_indent(line).starts_with('>')
    }

    /// Parse a maximal run of `>` lines and recurse into the dequoted text
    fn parse_blockquote(&self, lines: &[&str], depth: usize) -> (Block, usize) {
        let quote_lines: Vec<&str> = lines
            .iter()
            .take_while(|line| self.is_blockquote_start(line))
            .map(|line| strip_blockquote_marker(line))
            .collect();

        let children = self.parse_blocks(&quote_lines, true, depth + 1);
        (Block::BlockQuote(children), quote_lines.len())
    }

    /// A line opening with a block-level tag, a comment or a declaration
    fn is_html_block_start(&self, line: &str) -> bool {
        if count_leading_spaces(line) >= 4 {
            return false;
        }

        let Some(rest) = trim_indent(line).strip_prefix('<') else {
            return false;
        };

        if rest.starts_with("!--") {
            return true;
        }
        if let Some(declaration) = rest.strip_prefix('!') {
            return declaration.starts_with(|c: char| c.is_ascii_alphabetic());
        }

        let rest = rest.strip_prefix('/').unwrap_or(rest);
        let name_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        let name = rest[..name_len].to_ascii_lowercase();
        let after_name = &rest[name_len..];

        HTML_BLOCK_TAGS.contains(&name.as_str())
            && (after_name.is_empty()
                || after_name.starts_with([' ', '\t', '>'])
                || after_name.starts_with("/>"))
    }

    /// Raw HTML runs up to the next blank line
    fn parse_html_block(&self, lines: &[&str]) -> (Block, usize) {
        let html_lines: Vec<&str> = lines
            .iter()
            .take_while(|line| !line.trim().is_empty())
            .copied()
            .collect();

        (Block::HtmlBlock(html_lines.join("\n")), html_lines.len())
    }

    fn is_list_start(&self, line: &str) -> Option<ListMarker> {
        let indent = count_leading_spaces(line);
        if indent > 3 {
            return None;
        }

        let trimmed = trim_indent(line);
        let indent = line.len() - trimmed.len();

        // Unordered marker: -, +, * followed by whitespace or end of line
        if trimmed.starts_with(['-', '+', '*']) {
            let after = &trimmed[1..];
            if after.is_empty() {
                return Some(ListMarker {
                    list_type: ListType::Bullet,
                    indent,
                    width: 1,
                });
            }
            if after.starts_with([' ', '\t']) {
                return Some(ListMarker {
                    list_type: ListType::Bullet,
                    indent,
                    width: 2,
                });
            }
            return None;
        }

        // Ordered marker: 1-9 digits followed by '.'
        let digit_count = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
        if digit_count == 0 || digit_count > 9 {
            return None;
        }
        let after = trimmed[digit_count..].strip_prefix('.')?;
        if !after.is_empty() && !after.starts_with([' ', '\t']) {
            return None;
        }

        let start = trimmed[..digit_count].parse::<u32>().ok()?;
        Some(ListMarker {
            list_type: ListType::Ordered(start),
            indent,
            width: digit_count + if after.is_empty() { 1 } else { 2 },
        })
    }

    /// Parse consecutive items of one list type
    fn parse_list(&self, lines: &[&str], list_type: ListType, depth: usize) -> (Block, usize) {
        let mut items = Vec::new();
        let mut tight = true;
        let mut i = 0;

        while i < lines.len() {
            let Some(marker) = self.list_item_at(lines[i], &list_type) else {
                break;
            };

            let (item, lines_consumed, had_blank) =
                self.parse_list_item(&lines[i..], &marker, depth);
            items.push(item);
            i += lines_consumed;
            if had_blank {
                tight = false;
            }

            // Blank lines keep the list open only if another item follows
            let mut j = i;
            while j < lines.len() && lines[j].trim().is_empty() {
                j += 1;
            }
            if j > i {
                if j < lines.len() && self.list_item_at(lines[j], &list_type).is_some() {
                    tight = false;
                    i = j;
                } else {
                    break;
                }
            }
        }

        let list = match list_type {
            ListType::Bullet => Block::UnorderedList { tight, items },
            ListType::Ordered(start) => Block::OrderedList {
                start,
                tight,
                items,
            },
        };

        (list, i)
    }

    /// A list item marker compatible with the current list
    fn list_item_at(&self, line: &str, list_type: &ListType) -> Option<ListMarker> {
        if self.is_thematic_break(line) {
            return None;
        }
        self.is_list_start(line)
            .filter(|marker| marker.list_type.is_compatible(list_type))
    }

    /// Parse one item: its marker line plus indented continuation lines.
    /// Returns the item, lines consumed, and whether it contained a blank line
    /// between blocks.
    fn parse_list_item(
        &self,
        lines: &[&str],
        marker: &ListMarker,
        depth: usize,
    ) -> (ListItem, usize, bool) {
        let content_offset = marker.indent + marker.width;
        let first_line = lines[0];
        let first_text = first_line.get(content_offset..).unwrap_or("");
        let (checkbox, first_text) = strip_task_checkbox(first_text);

        let mut item_lines = vec![first_text.to_string()];
        let mut had_blank = false;
        let mut i = 1;
        let continuation_indent = marker.indent + 2;

        while i < lines.len() {
            let line = lines[i];

            if line.trim().is_empty() {
                // A blank line stays inside the item only if indented content follows
                let mut j = i;
                while j < lines.len() && lines[j].trim().is_empty() {
                    j += 1;
                }
                if j < lines.len() && count_leading_spaces(lines[j]) >= continuation_indent {
                    item_lines.extend(std::iter::repeat_n(String::new(), j - i));
                    had_blank = true;
                    i = j;
                    continue;
                }
                break;
            }

            let leading = count_leading_spaces(line);
            if leading < continuation_indent {
                break;
            }
            item_lines.push(remove_indent(line, leading.min(content_offset)));
            i += 1;
        }

        let item_refs: Vec<&str> = item_lines.iter().map(String::as_str).collect();
        let children = self.parse_blocks(&item_refs, false, depth + 1);

        (ListItem { checkbox, children }, i, had_blank)
    }

    /// Header row, alignment separator, then body rows.
    /// Returns None when the separator doesn't match, so the lines fall
    /// through to paragraph handling.
    fn try_parse_table(&self, lines: &[&str]) -> Option<(Block, usize)> {
        if lines.len() < 2 || !lines[0].contains('|') {
            return None;
        }

        let alignments = parse_table_separator(lines[1])?;
        let header = split_table_row(lines[0]);
        if header.len() != alignments.len() {
            debug!(
                header = header.len(),
                separator = alignments.len(),
                "table column count mismatch, treating as paragraph"
            );
            return None;
        }

        let columns = alignments.len();
        let head = build_table_row(header, columns);
        let mut body = Vec::new();
        let mut i = 2;

        while i < lines.len() {
            let line = lines[i];
            if line.trim().is_empty() || !line.contains('|') || self.starts_block(line) {
                break;
            }
            body.push(build_table_row(split_table_row(line), columns));
            i += 1;
        }

        Some((
            Block::Table(Table {
                alignments,
                head,
                body,
            }),
            i,
        ))
    }

    fn starts_block(&self, line: &str) -> bool {
        self.is_fenced_code_start(line).is_some()
            || self.parse_atx_heading(line).is_some()
            || self.is_thematic_break(line)
            || self.is_blockquote_start(line)
            || self.is_html_block_start(line)
            || self
                .is_list_start(line)
                .is_some_and(|marker| !is_empty_list_item(line, &marker))
    }

    /// Whether line `i` would end a paragraph running above it
    fn interrupts_paragraph(&self, lines: &[&str], i: usize) -> bool {
        let line = lines[i];
        if self.starts_block(line) {
            return true;
        }

        // A table header followed by a valid separator also starts a block
        line.contains('|')
            && lines
                .get(i + 1)
                .and_then(|next| parse_table_separator(next))
                .is_some_and(|alignments| split_table_row(line).len() == alignments.len())
    }

    /// Collect paragraph lines up to a blank line or a block start
    fn parse_paragraph(&self, lines: &[&str], in_quote: bool) -> (Block, usize) {
        // Segments are separated by empty quote lines and joined by hard breaks
        let mut segments: Vec<Vec<&str>> = vec![Vec::new()];
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];

            if line.trim().is_empty() {
                let continues = in_quote
                    && i + 1 < lines.len()
                    && !lines[i + 1].trim().is_empty()
                    && !self.interrupts_paragraph(lines, i + 1);
                if !continues {
                    break;
                }
                segments.push(Vec::new());
                i += 1;
                continue;
            }

            // The first line already failed every block check
            if i > 0 && !lines[i - 1].trim().is_empty() && self.interrupts_paragraph(lines, i) {
                break;
            }

            if let Some(segment) = segments.last_mut() {
                segment.push(line);
            }
            i += 1;
        }

        let mut children = Vec::new();
        for (index, segment) in segments.iter().enumerate() {
            if index > 0 {
                children.push(Inline::HardBreak);
            }
            children.extend(parse_inline(&paragraph_text(segment)));
        }

        (Block::Paragraph(children), i)
    }
}

/// Join paragraph lines, trimming leading whitespace per line and trailing
/// whitespace at the end, keeping trailing spaces that mark hard breaks.
fn paragraph_text(lines: &[&str]) -> String {
    let trimmed: Vec<&str> = lines.iter().map(|line| trim_indent(line)).collect();
    trimmed.join("\n").trim_end().to_string()
}

/// Count leading spaces in a line (tabs count as spaces to next multiple of 4)
fn count_leading_spaces(line: &str) -> usize {
    let mut count = 0;
    for ch in line.chars() {
        match ch {
            ' ' => count += 1,
            '\t' => count += 4 - (count % 4),
            _ => break,
        }
    }
    count
}

/// Strip leading spaces and tabs. Other Unicode whitespace is content.
fn trim_indent(line: &str) -> &str {
    line.trim_start_matches([' ', '\t'])
}

/// Remove up to `columns` columns of leading whitespace
fn remove_indent(line: &str, columns: usize) -> String {
    let mut removed = 0;
    for (byte_index, ch) in line.char_indices() {
        if removed >= columns {
            return line[byte_index..].to_string();
        }
        match ch {
            ' ' => removed += 1,
            '\t' => {
                let width = 4 - (removed % 4);
                if removed + width > columns {
                    // Partially consumed tab becomes the leftover spaces
                    let leftover = removed + width - columns;
                    return " ".repeat(leftover) + &line[byte_index + 1..];
                }
                removed += width;
            }
            _ => return line[byte_index..].to_string(),
        }
    }
    String::new()
}

/// Strip `>` and one optional following space
fn strip_blockquote_marker(line: &str) -> &str {
    let after_indent = trim_indent(line);
    let after_marker = after_indent.strip_prefix('>').unwrap_or(after_indent);
    after_marker
        .strip_prefix([' ', '\t'])
        .unwrap_or(after_marker)
}

fn is_empty_list_item(line: &str, marker: &ListMarker) -> bool {
    line.get(marker.indent + marker.width..)
        .is_none_or(|rest| rest.trim().is_empty())
}

/// `[ ]`, `[x]` or `[X]` at the start of item text
fn strip_task_checkbox(text: &str) -> (Option<Checkbox>, &str) {
    let trimmed = trim_indent(text);
    let checkbox = if trimmed.starts_with("[ ]") {
        Checkbox::Unchecked
    } else if trimmed.starts_with("[x]") || trimmed.starts_with("[X]") {
        Checkbox::Checked
    } else {
        return (None, text);
    };

    let rest = &trimmed[3..];
    if rest.is_empty() {
        return (Some(checkbox), rest);
    }
    match rest.strip_prefix([' ', '\t']) {
        Some(content) => (Some(checkbox), content),
        None => (None, text),
    }
}

/// Parse a separator line like `| --- | :---: | ---: |` into alignments
fn parse_table_separator(line: &str) -> Option<Vec<Alignment>> {
    let trimmed = line.trim();
    if !trimmed.contains('|') || count_leading_spaces(line) >= 4 {
        return None;
    }

    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    if inner.trim().is_empty() {
        return None;
    }

    inner
        .split('|')
        .map(|cell| {
            let c = cell.trim();
            let left = c.starts_with(':');
            let right = c.len() > 1 && c.ends_with(':');
            let dashes = c
                .strip_prefix(':')
                .unwrap_or(c)
                .strip_suffix(if right { ":" } else { "" })?;
            if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
                return None;
            }
            Some(match (left, right) {
                (true, true) => Alignment::Center,
                (true, false) => Alignment::Left,
                (false, true) => Alignment::Right,
                (false, false) => Alignment::None,
            })
        })
        .collect()
}

/// Split a row on unescaped pipes, trimming each cell.
/// Escaped pipes stay escaped for the inline parser to resolve.
fn split_table_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = if inner.ends_with('|') && !inner.ends_with("\\|") {
        &inner[..inner.len() - 1]
    } else {
        inner
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'|') {
            current.push_str("\\|");
            chars.next();
        } else if c == '|' {
            cells.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    cells.push(current.trim().to_string());
    cells
}

/// Pad or truncate to the column count and resolve each cell's column index
fn build_table_row(mut cells: Vec<String>, columns: usize) -> TableRow {
    cells.resize(columns, String::new());
    TableRow {
        cells: cells
            .iter()
            .enumerate()
            .map(|(column, text)| TableCell {
                column,
                children: parse_inline(text),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Vec<Block> {
        Parser::new().parse(input).children
    }

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn empty_input_is_empty_document() {
        assert!(Parser::new().parse("").is_empty());
        assert!(Parser::new().parse("\n\n  \n").is_empty());
    }

    #[test]
    fn heading_levels_and_closing_hashes() {
        assert_eq!(
            parse("### Title ###"),
            vec![Block::Heading {
                level: 3,
                children: vec![text("Title")],
            }]
        );
        assert_eq!(
            parse("# C#"),
            vec![Block::Heading {
                level: 1,
                children: vec![text("C#")],
            }]
        );
        assert_eq!(parse("####### seven"), vec![Block::Paragraph(vec![text("####### seven")])]);
        assert_eq!(parse("#nospace"), vec![Block::Paragraph(vec![text("#nospace")])]);
    }

    #[test]
    fn fenced_code_is_verbatim() {
        assert_eq!(
            parse("```rust extra\nlet x = *y*;\n\n# not a heading\n```\nafter"),
            vec![
                Block::CodeBlock {
                    language: Some("rust".to_string()),
                    literal: "let x = *y*;\n\n# not a heading\n".to_string(),
                },
                Block::Paragraph(vec![text("after")]),
            ]
        );
    }

    #[test]
    fn unclosed_fence_runs_to_end() {
        assert_eq!(
            parse("~~~\na\nb"),
            vec![Block::CodeBlock {
                language: None,
                literal: "a\nb\n".to_string(),
            }]
        );
    }

    #[test]
    fn thematic_breaks() {
        assert_eq!(
            parse("---\n***\n_ _ _"),
            vec![Block::ThematicBreak, Block::ThematicBreak, Block::ThematicBreak]
        );
        assert_eq!(parse("-*-"), vec![Block::Paragraph(vec![text("-*-")])]);
    }

    #[test]
    fn blockquote_recurses_and_empty_line_breaks() {
        assert_eq!(
            parse("> # Quote\n> one\n>\n> two"),
            vec![Block::BlockQuote(vec![
                Block::Heading {
                    level: 1,
                    children: vec![text("Quote")],
                },
                Block::Paragraph(vec![text("one"), Inline::HardBreak, text("two")]),
            ])]
        );
    }

    #[test]
    fn nested_blockquote() {
        assert_eq!(
            parse("> > deep"),
            vec![Block::BlockQuote(vec![Block::BlockQuote(vec![
                Block::Paragraph(vec![text("deep")])
            ])])]
        );
    }

    #[test]
    fn html_block_passthrough() {
        assert_eq!(
            parse("<div class=\"x\">\n*raw*\n</div>\n\npara"),
            vec![
                Block::HtmlBlock("<div class=\"x\">\n*raw*\n</div>".to_string()),
                Block::Paragraph(vec![text("para")]),
            ]
        );
        // Inline tags don't open a block
        assert_eq!(
            parse("<span>hi</span>"),
            vec![Block::Paragraph(vec![
                Inline::HtmlInline("<span>".to_string()),
                text("hi"),
                Inline::HtmlInline("</span>".to_string()),
            ])]
        );
    }

    #[test]
    fn ordered_list_keeps_start() {
        let blocks = parse("5. five\n6. six");
        match &blocks[..] {
            [Block::OrderedList { start, tight, items }] => {
                assert_eq!(*start, 5);
                assert!(*tight);
                assert_eq!(items.len(), 2);
            }
            other => panic!("unexpected blocks: {other:?}"),
        }
    }

    #[test]
    fn switching_marker_kind_starts_new_list() {
        let blocks = parse("- a\n+ b\n1. c");
        assert_eq!(blocks.len(), 2);
        assert!(matches!(&blocks[0], Block::UnorderedList { items, .. } if items.len() == 2));
        assert!(matches!(&blocks[1], Block::OrderedList { start: 1, .. }));
    }

    #[test]
    fn task_list_items() {
        assert_eq!(
            parse("- [x] done\n- [ ] todo\n- [y] plain"),
            vec![Block::UnorderedList {
                tight: true,
                items: vec![
                    ListItem {
                        checkbox: Some(Checkbox::Checked),
                        children: vec![Block::Paragraph(vec![text("done")])],
                    },
                    ListItem {
                        checkbox: Some(Checkbox::Unchecked),
                        children: vec![Block::Paragraph(vec![text("todo")])],
                    },
                    ListItem {
                        checkbox: None,
                        children: vec![Block::Paragraph(vec![text("[y] plain")])],
                    },
                ],
            }]
        );
    }

    #[test]
    fn nested_list_by_indentation() {
        assert_eq!(
            parse("- a\n  - b\n- c"),
            vec![Block::UnorderedList {
                tight: true,
                items: vec![
                    ListItem {
                        checkbox: None,
                        children: vec![
                            Block::Paragraph(vec![text("a")]),
                            Block::UnorderedList {
                                tight: true,
                                items: vec![ListItem {
                                    checkbox: None,
                                    children: vec![Block::Paragraph(vec![text("b")])],
                                }],
                            },
                        ],
                    },
                    ListItem {
                        checkbox: None,
                        children: vec![Block::Paragraph(vec![text("c")])],
                    },
                ],
            }]
        );
    }

    #[test]
    fn blank_line_between_items_makes_list_loose() {
        let blocks = parse("- a\n\n- b\n\nafter");
        assert!(matches!(&blocks[0], Block::UnorderedList { tight: false, items } if items.len() == 2));
        assert_eq!(blocks[1], Block::Paragraph(vec![text("after")]));
    }

    #[test]
    fn table_with_alignment() {
        let blocks = parse("| A | B | C |\n|:---|:---:|---:|\n| 1 | 2 | 3 |\n| 4 | 5 |");
        let [Block::Table(table)] = &blocks[..] else {
            panic!("expected a table, got {blocks:?}");
        };
        assert_eq!(
            table.alignments,
            vec![Alignment::Left, Alignment::Center, Alignment::Right]
        );
        assert_eq!(table.head.cells.len(), 3);
        assert_eq!(table.body.len(), 2);
        // Short rows are padded, columns follow position
        let last = &table.body[1];
        assert_eq!(last.cells.len(), 3);
        assert_eq!(last.cells[2].column, 2);
        assert!(last.cells[2].children.is_empty());
    }

    #[test]
    fn table_escaped_pipe_stays_in_cell() {
        let blocks = parse("| a |\n|---|\n| x \\| y |");
        let [Block::Table(table)] = &blocks[..] else {
            panic!("expected a table, got {blocks:?}");
        };
        assert_eq!(table.body[0].cells[0].children, vec![text("x | y")]);
    }

    #[test]
    fn bad_separator_is_not_a_table() {
        assert_eq!(
            parse("| a | b |\n| -x- | --- |"),
            vec![Block::Paragraph(vec![
                text("| a | b |"),
                Inline::SoftBreak,
                text("| -x- | --- |"),
            ])]
        );
        // Column count must match the header
        assert!(matches!(&parse("| a | b |\n| --- |")[..], [Block::Paragraph(_)]));
    }

    #[test]
    fn paragraph_soft_breaks_and_interruption() {
        assert_eq!(
            parse("one\ntwo\n# three"),
            vec![
                Block::Paragraph(vec![text("one"), Inline::SoftBreak, text("two")]),
                Block::Heading {
                    level: 1,
                    children: vec![text("three")],
                },
            ]
        );
    }

    #[test]
    fn separator_helpers() {
        assert_eq!(
            parse_table_separator("|---|:-:|"),
            Some(vec![Alignment::None, Alignment::Center])
        );
        assert_eq!(parse_table_separator("|:|"), None);
        assert_eq!(parse_table_separator("---"), None);
        assert_eq!(split_table_row("a | b |"), vec!["a", "b"]);
        assert_eq!(remove_indent("\tx", 2), "  x");
    }

    /// Count single-child quote/list levels down to the innermost blocks
    fn innermost(mut blocks: &[Block]) -> (usize, &[Block]) {
        let mut depth = 0;
        loop {
            match blocks {
                [Block::BlockQuote(children)] => blocks = children.as_slice(),
                [Block::UnorderedList { items, .. }] if items.len() == 1 => {
                    blocks = items[0].children.as_slice()
                }
                _ => return (depth, blocks),
            }
            depth += 1;
        }
    }

    #[test]
    fn deep_blockquote_stops_at_nesting_limit() {
        let input = format!("{} x", ">".repeat(100_000));
        let blocks = parse(&input);
        let (depth, inner) = innermost(&blocks);
        assert_eq!(depth, MAX_NESTING_DEPTH);
        let literal = format!("{} x", ">".repeat(100_000 - MAX_NESTING_DEPTH));
        assert_eq!(inner, &[Block::Paragraph(vec![text(&literal)])]);
    }

    #[test]
    fn deep_list_stops_at_nesting_limit() {
        let input = format!("{}x", "- ".repeat(100_000));
        let blocks = parse(&input);
        let (depth, inner) = innermost(&blocks);
        assert_eq!(depth, MAX_NESTING_DEPTH);
        let literal = format!("{}x", "- ".repeat(100_000 - MAX_NESTING_DEPTH));
        assert_eq!(inner, &[Block::Paragraph(vec![text(&literal)])]);
    }

    #[test]
    fn deep_quote_list_mix_stops_at_nesting_limit() {
        let input = format!("{}x", "> - ".repeat(50_000));
        let blocks = parse(&input);
        let (depth, inner) = innermost(&blocks);
        assert_eq!(depth, MAX_NESTING_DEPTH);
        assert!(matches!(inner, [Block::Paragraph(_)]));
    }

    #[test]
    fn only_spaces_and_tabs_indent() {
        for line in ["\u{a0}- x", "\u{a0}> x", "\u{a0}# x", "\u{a0}```"] {
            assert_eq!(parse(line), vec![Block::Paragraph(vec![text(line)])], "{line:?}");
        }
        let spaced = "\u{a0}-\u{a0}-\u{a0}-";
        assert_eq!(parse(spaced), vec![Block::Paragraph(vec![text(spaced)])]);
        assert!(matches!(&parse("   - x")[..], [Block::UnorderedList { .. }]));
    }
}
