//! A GitHub-flavored Markdown to HTML converter

pub mod ast;
pub mod error;
mod inline;
pub mod page;
pub mod parser;
pub mod renderer;

pub use ast::Document;
pub use page::{DEFAULT_STYLESHEET, OutputMode, markdown_to_document, markdown_to_preview};
pub use parser::Parser;
pub use renderer::{HtmlRenderer, escape_html};

/// Parse markdown text into a document tree
pub fn parse(markdown: &str) -> Document {
    Parser::new().parse(markdown)
}

/// Parse markdown text and render to HTML
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new();
    let ast = parser.parse(markdown);
    let renderer = HtmlRenderer::new();
    renderer.render(&ast)
}
