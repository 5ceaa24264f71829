//! Full HTML page output: the rendered body wrapped with a stylesheet

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::markdown_to_html;

/// Light/dark stylesheet used by the preview page
pub const DEFAULT_STYLESHEET: &str = include_str!("assets/preview.css");

/// What a conversion produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Body fragment only
    #[default]
    Html,
    /// Standalone document with an embedded stylesheet
    HtmlCss,
}

impl OutputMode {
    /// Convert `markdown` for this mode. `stylesheet` is only used by
    /// [`OutputMode::HtmlCss`] and is embedded as-is.
    pub fn render(self, markdown: &str, stylesheet: &str) -> String {
        match self {
            OutputMode::Html => markdown_to_html(markdown),
            OutputMode::HtmlCss => markdown_to_document(markdown, stylesheet),
        }
    }
}

/// Wrap the rendered body in a complete HTML document.
///
/// The stylesheet is opaque: it is neither parsed nor escaped.
pub fn markdown_to_document(markdown: &str, stylesheet: &str) -> String {
    wrap_document(&markdown_to_html(markdown), stylesheet)
}

/// Full document styled with [`DEFAULT_STYLESHEET`]
pub fn markdown_to_preview(markdown: &str) -> String {
    markdown_to_document(markdown, DEFAULT_STYLESHEET)
}

fn wrap_document(body: &str, stylesheet: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"UTF-8\"><style>{}</style></head><body>{}</body></html>",
        stylesheet, body
    )
}
