//! Markup to structured plain text.
//!
//! The traversal is deliberately flat: every `h1`..`h6`, `p` and `li` element is
//! visited once in document order and rendered from its own subtree, so text
//! inside nested matches appears once per matching ancestor unless
//! [`TextExtractor::with_dedupe_nested`] is enabled.

use crate::error::{HtmlTxtError, Result};
use scraper::{ElementRef, Html, Node};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Elements whose text is never rendered.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "template", "noscript"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    ListItem,
}

impl BlockKind {
    fn from_tag(name: &str) -> Option<Self> {
        match name {
            "h1" => Some(BlockKind::Heading(1)),
            "h2" => Some(BlockKind::Heading(2)),
            "h3" => Some(BlockKind::Heading(3)),
            "h4" => Some(BlockKind::Heading(4)),
            "h5" => Some(BlockKind::Heading(5)),
            "h6" => Some(BlockKind::Heading(6)),
            "p" => Some(BlockKind::Paragraph),
            "li" => Some(BlockKind::ListItem),
            _ => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, BlockKind::Heading(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub kind: BlockKind,
    /// Visible text as found in the document; headings are upper-cased on render.
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    title: Option<String>,
    blocks: Vec<TextBlock>,
}

impl ExtractedText {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.blocks.is_empty()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref title) = self.title {
            write!(f, "{}\n\n", title)?;
        }

        for block in &self.blocks {
            if block.kind.is_heading() {
                write!(f, "\n{}\n", block.text.to_uppercase())?;
            } else {
                writeln!(f, "{}", block.text)?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextExtractor {
    dedupe_nested: bool,
}

impl TextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dedupe_nested(mut self, dedupe: bool) -> Self {
        self.dedupe_nested = dedupe;
        self
    }

    /// Reads and extracts one file, returning the text and the number of bytes read.
    pub fn extract_file(&self, path: &Path) -> Result<(ExtractedText, u64)> {
        let bytes = std::fs::read(path)?;
        let size = bytes.len() as u64;

        let text = self.extract_bytes(&bytes).map_err(|e| match e {
            HtmlTxtError::Decode { .. } => HtmlTxtError::Decode {
                path: path.display().to_string(),
            },
            other => other,
        })?;

        Ok((text, size))
    }

    /// Extracts from raw bytes, which must be UTF-8. A leading BOM is ignored.
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<ExtractedText> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let markup = std::str::from_utf8(bytes).map_err(|e| HtmlTxtError::Decode {
            path: format!("<input> ({})", e),
        })?;

        Ok(self.extract_str(markup))
    }

    pub fn extract_str(&self, markup: &str) -> ExtractedText {
        let document = Html::parse_document(markup);
        self.extract_document(&document)
    }

    pub fn extract_document(&self, document: &Html) -> ExtractedText {
        let elements = || {
            document
                .tree
                .root()
                .descendants()
                .filter_map(ElementRef::wrap)
        };

        let title = elements()
            .find(|el| el.value().name() == "title")
            .map(|el| el.text().collect::<String>());

        let blocks = elements()
            .filter_map(|el| BlockKind::from_tag(el.value().name()).map(|kind| (el, kind)))
            .filter(|(el, _)| !self.dedupe_nested || !has_matching_ancestor(el))
            .map(|(el, kind)| TextBlock {
                kind,
                text: visible_text(el),
            })
            .collect();

        ExtractedText { title, blocks }
    }
}

/// Joins the stripped, non-empty text nodes under `element` with single spaces.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut pieces = Vec::new();
    collect_text(element, &mut pieces);
    pieces.join(" ")
}

fn collect_text<'a>(element: ElementRef<'a>, pieces: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    pieces.push(trimmed);
                }
            }
            Node::Element(el) if HIDDEN_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, pieces);
                }
            }
            _ => {}
        }
    }
}

fn has_matching_ancestor(element: &ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|el| BlockKind::from_tag(el.name()).is_some())
    })
}
