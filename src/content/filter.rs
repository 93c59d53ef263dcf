//! Text sanitizers.
//!
//! Two depths of filtering, both idempotent on their own output:
//! - `sanitize_html`: allows a known-safe subset of tags, strips the rest
//! - `sanitize_plain_text`: strips all markup and collapses whitespace

use ammonia::Builder;

/// Sanitize HTML input using ammonia with default settings.
///
/// Strips dangerous elements like `<script>`, event handlers, and
/// other XSS vectors while preserving safe formatting tags.
pub fn sanitize_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Reduce input to plain text: all tags removed, entities normalized,
/// runs of whitespace collapsed to single spaces, ends trimmed.
pub fn sanitize_plain_text(input: &str) -> String {
    let stripped = Builder::empty().clean(input).to_string();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
