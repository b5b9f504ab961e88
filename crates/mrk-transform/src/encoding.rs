//! Encoding normalization applied before any rewriting.
//!
//! Slack escapes `&`, `<` and `>` in message text as HTML entities. The
//! [`EntityEncoder`] decodes them (and other common entities) so the
//! reference and blockquote passes see the raw markers.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Named, decimal and hexadecimal entities.
static ENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]*);")
        .expect("invalid entity regex")
});

/// Normalizes raw message text before transformation.
pub trait Encoder: Send + Sync {
    /// Return the normalized text.
    fn encode(&self, text: &str) -> String;
}

/// [`Encoder`] that returns its input unchanged.
pub struct IdentityEncoder;

impl Encoder for IdentityEncoder {
    fn encode(&self, text: &str) -> String {
        text.to_owned()
    }
}

/// Default [`Encoder`]: decodes HTML entities, expands tabs and optionally
/// restricts the text to Latin-1.
#[derive(Debug, Clone)]
pub struct EntityEncoder {
    tab_width: usize,
    latin1: bool,
}

impl Default for EntityEncoder {
    fn default() -> Self {
        Self {
            tab_width: 4,
            latin1: false,
        }
    }
}

impl EntityEncoder {
    /// Create an encoder with the default settings (4-space tabs, full Unicode).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of spaces that replace each tab character.
    #[must_use]
    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    /// Replace characters outside Latin-1 with `?`.
    ///
    /// Needed when the generated document only embeds the core PDF fonts.
    #[must_use]
    pub fn with_latin1(mut self, latin1: bool) -> Self {
        self.latin1 = latin1;
        self
    }
}

impl Encoder for EntityEncoder {
    fn encode(&self, text: &str) -> String {
        let decoded = decode_entities(text);
        let expanded = decoded.replace('\t', &" ".repeat(self.tab_width));
        if self.latin1 {
            expanded
                .chars()
                .map(|c| if u32::from(c) > 0xFF { '?' } else { c })
                .collect()
        } else {
            expanded
        }
    }
}

/// Replace HTML entities with the characters they stand for.
///
/// Unknown named entities and invalid code points are left as-is.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }
    ENTITY_PATTERN
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity.strip_prefix('#') {
                Some(numeric) => decode_numeric(numeric),
                None => named_entity(entity).and_then(|s| s.chars().next()),
            };
            decoded.map_or_else(|| caps[0].to_owned(), String::from)
        })
        .into_owned()
}

fn decode_numeric(numeric: &str) -> Option<char> {
    let code = match numeric.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => numeric.parse().ok()?,
    };
    char::from_u32(code)
}

/// Map an HTML entity name to its character.
fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        // Escapes Slack applies to message text
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",

        // Typography
        "nbsp" => "\u{00a0}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "bull" => "\u{2022}",
        "hellip" => "\u{2026}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",

        // Symbols
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "deg" => "\u{00b0}",
        "times" => "\u{00d7}",
        "euro" => "\u{20ac}",
        "pound" => "\u{00a3}",

        _ => return None,
    })
}
