//! # quire-render
//!
//! Read-only manuscript preview: a pure function from the ordered section
//! collection to a sequence of sanitized rendered blocks, one per section.
//!
//! No side effects, no network, no caching — recomputation is linear in
//! total content size and bounded by realistic document sizes, so callers
//! re-render on every store mutation.
//!
//! All section content is treated as untrusted input, including the user's
//! own prior input: bodies pass through the sanitizing markdown pipeline in
//! [`markdown`], and headings are HTML-escaped.

pub mod markdown;

use serde::Serialize;

use quire_types::{Section, SectionId};

pub use markdown::{escape_html, render_markdown};

/// One rendered section: heading plus sanitized body HTML.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PreviewBlock {
    /// The section this block was rendered from.
    pub section_id: SectionId,
    /// Section name, HTML-escaped, ready for a heading element.
    pub heading: String,
    /// Sanitized HTML body.
    pub body_html: String,
}

/// The rendered manuscript preview, blocks in display order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub blocks: Vec<PreviewBlock>,
}

impl Preview {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Assemble the whole preview as one HTML fragment.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<div class=\"manuscript\">\n");
        for block in &self.blocks {
            out.push_str("<section class=\"manuscript-section\">\n<h4>");
            out.push_str(&block.heading);
            out.push_str("</h4>\n<div class=\"manuscript-body\">");
            out.push_str(&block.body_html);
            out.push_str("</div>\n</section>\n");
        }
        out.push_str("</div>\n");
        out
    }
}

/// Render the ordered section collection into preview blocks.
///
/// Sections are rendered in the order given — the store hands them over
/// already sorted by their `order` field.
pub fn render_preview(sections: &[Section]) -> Preview {
    Preview {
        blocks: sections
            .iter()
            .map(|section| PreviewBlock {
                section_id: section.id,
                heading: escape_html(&section.name),
                body_html: render_markdown(&section.content),
            })
            .collect(),
    }
}

// ============================================================================
// Tests
// ============================================================================
