//! Inline formatting passes.
//!
//! Each pass is an independent, greedy regex substitution. Patterns never
//! cross a newline, so every rule applies per line, but within a line the
//! match runs from the first marker to the last one. Spans do not nest.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static BOLD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.+)\*").expect("invalid bold regex"));

static ITALIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b_(.+)_\b").expect("invalid italic regex"));

static MONOSPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`(.*)`").expect("invalid monospace regex"));

static BLOCKQUOTE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^>(.+)").expect("invalid blockquote regex"));

/// `*text*` to `<b>text</b>`.
pub(crate) fn bold(text: &str) -> String {
    BOLD_PATTERN.replace_all(text, "<b>${1}</b>").into_owned()
}

/// `_text_` at word boundaries to `<i>text</i>`.
pub(crate) fn italic(text: &str) -> String {
    ITALIC_PATTERN.replace_all(text, "<i>${1}</i>").into_owned()
}

/// `` `text` `` to `<s fontfamily="...">text</s>`.
pub(crate) fn monospace(text: &str, font_family: &str) -> String {
    MONOSPACE_PATTERN
        .replace_all(text, |caps: &Captures| {
            format!(r#"<s fontfamily="{font_family}">{}</s>"#, &caps[1])
        })
        .into_owned()
}

/// Lines starting with `>` to `<blockquote>...</blockquote>`.
///
/// The `>` itself is dropped; whatever follows it, leading space included,
/// ends up inside the tag.
pub(crate) fn blockquote(text: &str) -> String {
    BLOCKQUOTE_PATTERN
        .replace_all(text, "<blockquote>${1}</blockquote>")
        .into_owned()
}

/// Newlines to `<br>`, except right after a closing blockquote tag.
pub(crate) fn line_breaks(text: &str) -> String {
    text.replace("</blockquote>\n", "</blockquote>")
        .replace('\n', "<br>")
}

/// Run every formatting pass in order.
pub(crate) fn apply_all(text: &str, mono_font_family: &str) -> String {
    let text = bold(text);
    let text = italic(&text);
    let text = monospace(&text, mono_font_family);
    let text = blockquote(&text);
    line_breaks(&text)
}
