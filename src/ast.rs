/// AST node types for Markdown documents
use serde::{Deserialize, Serialize};

/// Root of a parsed document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub children: Vec<Block>,
}

impl Document {
    pub fn new(children: Vec<Block>) -> Self {
        Document { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Paragraph(Vec<Inline>),
    Heading {
        level: u8, // Always 1..=6
        children: Vec<Inline>,
    },
    BlockQuote(Vec<Block>),
    CodeBlock {
        language: Option<String>,
        literal: String, // Verbatim, escaped only when rendered
    },
    ThematicBreak,
    // List nodes
    UnorderedList {
        tight: bool, // Tight lists don't add <p> tags in items
        items: Vec<ListItem>,
    },
    OrderedList {
        start: u32,
        tight: bool,
        items: Vec<ListItem>,
    },
    HtmlBlock(String), // Raw HTML block (passed through unchanged)
    // GFM extension nodes
    Table(Table),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub checkbox: Option<Checkbox>, // Present for task-list items
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Checkbox {
    Checked,
    Unchecked,
}

/// A GFM table.
///
/// Cells of `head` render as `<th>`, cells of `body` as `<td>`. Column
/// alignment lives here once per column; cells refer to it by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub alignments: Vec<Alignment>,
    pub head: TableRow,
    pub body: Vec<TableRow>,
}

impl Table {
    pub fn column_count(&self) -> usize {
        self.alignments.len()
    }

    /// Alignment of the given column, `Alignment::None` when out of range
    pub fn alignment_of(&self, column: usize) -> Alignment {
        self.alignments
            .get(column)
            .copied()
            .unwrap_or(Alignment::None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub column: usize, // Ordinal position within the row
    pub children: Vec<Inline>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    None,
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inline {
    Text(String),        // Unescaped literal text
    Code(String),        // Inline code span
    Emphasis(Vec<Inline>),      // <em> tag
    Strong(Vec<Inline>),        // <strong> tag
    Strikethrough(Vec<Inline>), // <del> tag
    Link {
        destination: String,
        title: Option<String>,
        children: Vec<Inline>,
    },
    Image {
        destination: String,
        title: Option<String>,
        alt: String,
    },
    SoftBreak,          // Plain newline
    HardBreak,          // <br> tag
    HtmlInline(String), // Raw HTML inline (passed through unchanged)
}

impl Inline {
    /// Flatten to the text a reader would see, dropping all markup
    pub fn plain_text(&self) -> String {
        match self {
            Inline::Text(text) | Inline::Code(text) => text.clone(),
            Inline::Emphasis(children)
            | Inline::Strong(children)
            | Inline::Strikethrough(children)
            | Inline::Link { children, .. } => children.iter().map(Inline::plain_text).collect(),
            Inline::Image { alt, .. } => alt.clone(),
            Inline::SoftBreak | Inline::HardBreak => "\n".to_string(),
            Inline::HtmlInline(_) => String::new(),
        }
    }
}
