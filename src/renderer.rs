//! HTML renderer for Markdown documents
//!
//! Blocks are separated by a single newline and the output carries no
//! trailing newline, so `# Title` renders to exactly `<h1>Title</h1>`.

use crate::ast::{Alignment, Block, Checkbox, Document, Inline, ListItem, Table, TableRow};
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        HtmlRenderer
    }

    pub fn render(&self, document: &Document) -> String {
        let html = render_blocks(&document.children);
        debug!(
            blocks = document.children.len(),
            bytes = html.len(),
            "rendered document"
        );
        html
    }
}

fn render_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Paragraph(children) => format!("<p>{}</p>", render_inlines(children)),
        Block::Heading { level, children } => {
            format!("<h{}>{}</h{}>", level, render_inlines(children), level)
        }
        Block::BlockQuote(children) => {
            wrap_lines("<blockquote>", &render_blocks(children), "</blockquote>")
        }
        Block::CodeBlock { language, literal } => match language {
            Some(language) => format!(
                "<pre><code class=\"language-{}\">{}</code></pre>",
                escape_html(language),
                escape_html(literal)
            ),
            None => format!("<pre><code>{}</code></pre>", escape_html(literal)),
        },
        Block::ThematicBreak => "<hr>".to_string(),
        Block::UnorderedList { tight, items } => {
            wrap_lines("<ul>", &render_items(items, *tight), "</ul>")
        }
        Block::OrderedList {
            start,
            tight,
            items,
        } => {
            let open = if *start == 1 {
                "<ol>".to_string()
            } else {
                format!("<ol start=\"{}\">", start)
            };
            wrap_lines(&open, &render_items(items, *tight), "</ol>")
        }
        Block::HtmlBlock(html) => html.clone(),
        Block::Table(table) => render_table(table),
    }
}

/// Put block content on its own lines between the tags, unless empty
fn wrap_lines(open: &str, content: &str, close: &str) -> String {
    if content.is_empty() {
        format!("{}{}", open, close)
    } else {
        format!("{}\n{}\n{}", open, content, close)
    }
}

fn render_items(items: &[ListItem], tight: bool) -> String {
    items
        .iter()
        .map(|item| render_list_item(item, tight))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_list_item(item: &ListItem, tight: bool) -> String {
    // Tight lists show paragraph content without <p> tags
    let content = item
        .children
        .iter()
        .map(|child| match child {
            Block::Paragraph(children) if tight => render_inlines(children),
            other => render_block(other),
        })
        .collect::<Vec<_>>()
        .join("\n");

    match item.checkbox {
        Some(checkbox) => {
            let checked = if checkbox == Checkbox::Checked {
                " checked"
            } else {
                ""
            };
            let separator = if content.is_empty() { "" } else { " " };
            format!(
                "<li class=\"task-list-item\"><input type=\"checkbox\" disabled{}>{}{}</li>",
                checked, separator, content
            )
        }
        None => format!("<li>{}</li>", content),
    }
}

fn render_table(table: &Table) -> String {
    let mut html = String::from("<table>\n<thead>\n");
    html.push_str(&render_table_row(table, &table.head, "th"));
    html.push_str("\n</thead>");

    // No <tbody> at all for a header-only table
    if !table.body.is_empty() {
        let rows: Vec<String> = table
            .body
            .iter()
            .map(|row| render_table_row(table, row, "td"))
            .collect();
        html.push_str("\n<tbody>\n");
        html.push_str(&rows.join("\n"));
        html.push_str("\n</tbody>");
    }

    html.push_str("\n</table>");
    html
}

/// Render a row; `tag` comes from whether the row is in the head or body.
/// Cells past the table's column count are dropped.
fn render_table_row(table: &Table, row: &TableRow, tag: &str) -> String {
    let cells: Vec<String> = row
        .cells
        .iter()
        .take(table.column_count())
        .map(|cell| {
            format!(
                "<{}{}>{}</{}>",
                tag,
                alignment_style(table.alignment_of(cell.column)),
                render_inlines(&cell.children),
                tag
            )
        })
        .collect();
    wrap_lines("<tr>", &cells.join("\n"), "</tr>")
}

fn alignment_style(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::None => "",
        Alignment::Left => " style=\"text-align: left;\"",
        Alignment::Center => " style=\"text-align: center;\"",
        Alignment::Right => " style=\"text-align: right;\"",
    }
}

fn render_inlines(nodes: &[Inline]) -> String {
    nodes.iter().map(render_inline).collect()
}

fn render_inline(node: &Inline) -> String {
    match node {
        Inline::Text(text) => escape_html(text),
        Inline::Code(code) => format!("<code>{}</code>", escape_html(code)),
        Inline::Emphasis(children) => format!("<em>{}</em>", render_inlines(children)),
        Inline::Strong(children) => format!("<strong>{}</strong>", render_inlines(children)),
        Inline::Strikethrough(children) => format!("<del>{}</del>", render_inlines(children)),
        Inline::Link {
            destination,
            title,
            children,
        } => format!(
            "<a href=\"{}\"{}>{}</a>",
            escape_html(destination),
            title_attribute(title.as_deref()),
            render_inlines(children)
        ),
        Inline::Image {
            destination,
            title,
            alt,
        } => format!(
            "<img src=\"{}\" alt=\"{}\"{}>",
            escape_html(destination),
            escape_html(alt),
            title_attribute(title.as_deref())
        ),
        Inline::SoftBreak => "\n".to_string(),
        Inline::HardBreak => "<br>\n".to_string(),
        Inline::HtmlInline(html) => html.clone(),
    }
}

fn title_attribute(title: Option<&str>) -> String {
    title
        .map(|title| format!(" title=\"{}\"", escape_html(title)))
        .unwrap_or_default()
}

/// Escape the five HTML-significant characters
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
