//! Markdown → sanitized HTML conversion.
//!
//! Uses pulldown-cmark (the same parser as rustdoc) with two event-level
//! rewrites, since section content is untrusted input regardless of origin:
//!
//! - Raw HTML events (block and inline) are demoted to text, so the HTML
//!   serializer escapes them instead of passing them through. `<script>` in
//!   content comes out as inert `&lt;script&gt;`.
//! - Link and image destinations with a scheme other than http(s)/mailto
//!   are blanked, killing `javascript:` and `data:` URLs while leaving the
//!   visible text intact. Relative destinations are allowed.
//!
//! Structural and text-formatting markdown (headings, emphasis, lists,
//! block quotes, code) renders normally.

use pulldown_cmark::{CowStr, Event, Parser, Tag, html};

/// Render untrusted markdown content to sanitized HTML.
pub fn render_markdown(content: &str) -> String {
    let events = Parser::new(content).map(sanitize_event);
    let mut out = String::with_capacity(content.len() + content.len() / 2);
    html::push_html(&mut out, events);
    out
}

/// Rewrite a single parser event per the sanitization rules.
fn sanitize_event(event: Event<'_>) -> Event<'_> {
    match event {
        // Demote raw HTML to text; the serializer escapes text events.
        Event::Html(raw) => Event::Text(raw),
        Event::InlineHtml(raw) => Event::Text(raw),

        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),

        other => other,
    }
}

/// Pass a destination URL through, or blank it if its scheme is unsafe.
fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&url) {
        url
    } else {
        CowStr::Borrowed("")
    }
}

/// Allow relative destinations and the http, https, and mailto schemes.
fn is_safe_url(url: &str) -> bool {
    let Some(colon) = url.find(':') else {
        // No scheme at all — relative path or fragment.
        return true;
    };
    // A slash, query, or fragment before the colon means the colon is not
    // a scheme separator ("./a:b", "?q=a:b").
    if url[..colon]
        .contains(|c| matches!(c, '/' | '?' | '#'))
    {
        return true;
    }
    let scheme = &url[..colon];
    scheme.eq_ignore_ascii_case("http")
        || scheme.eq_ignore_ascii_case("https")
        || scheme.eq_ignore_ascii_case("mailto")
}

/// Escape text for direct inclusion in HTML (headings, attribute-free
/// contexts).
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
