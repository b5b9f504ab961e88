//! Classification of angle-bracket references.
//!
//! Slack encodes mentions, dates and links as `<...>` tokens. The inner
//! content is parsed into a [`Reference`] first and resolved afterwards, so
//! the prefix priority lives in one place ([`Reference::parse`]).

use std::sync::LazyLock;

use regex::Regex;

/// Strict user group pattern: `S` followed by uppercase letters or digits.
static USERGROUP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!subteam\^(S[A-Z0-9]+)").expect("invalid usergroup regex"));

/// Broadcast mentions Slack understands natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialMention {
    /// `<!here>`
    Here,
    /// `<!channel>`
    Channel,
    /// `<!everyone>`
    Everyone,
}

impl SpecialMention {
    fn from_id(id: &str) -> Option<Self> {
        match id {
            "here" => Some(Self::Here),
            "channel" => Some(Self::Channel),
            "everyone" => Some(Self::Everyone),
            _ => None,
        }
    }

    /// Display text, including the `@`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Here => "@here",
            Self::Channel => "@channel",
            Self::Everyone => "@everyone",
        }
    }
}

/// A classified `<...>` token.
///
/// Borrowed from the text being transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference<'a> {
    /// `<@U...>` or `<@W...>`.
    User { id: &'a str },
    /// `<#C...>`.
    Channel { id: &'a str },
    /// `<!subteam^S...>`. `id` is `None` when the group ID is malformed.
    Usergroup { id: Option<&'a str> },
    /// `<!date^...>`. `raw` is the segment after the first `^`, if any.
    Date { raw: Option<&'a str> },
    /// `<!here>`, `<!channel>`, `<!everyone>`.
    Special(SpecialMention),
    /// Any other `<!...>`.
    UnknownSpecial { id: &'a str },
    /// Everything else is treated as a link.
    Link { url: &'a str, text: &'a str },
}

impl<'a> Reference<'a> {
    /// Classify the inner content of a `<...>` token.
    ///
    /// Checked in priority order: user, channel, user group, date, special
    /// mention, unknown special, link.
    #[must_use]
    pub fn parse(inner: &'a str) -> Self {
        let id = lookup_id(inner);

        if inner.starts_with("@U") || inner.starts_with("@W") {
            Self::User { id }
        } else if inner.starts_with("#C") {
            Self::Channel { id }
        } else if inner.starts_with("!subteam^") {
            let id = USERGROUP_PATTERN
                .captures(inner)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str());
            Self::Usergroup { id }
        } else if inner.starts_with("!date") {
            Self::Date {
                raw: inner.split('^').nth(1),
            }
        } else if inner.starts_with('!') {
            match SpecialMention::from_id(id) {
                Some(mention) => Self::Special(mention),
                None => Self::UnknownSpecial { id },
            }
        } else {
            match inner.split_once('|') {
                Some((url, text)) => Self::Link { url, text },
                None => Self::Link {
                    url: inner,
                    text: inner,
                },
            }
        }
    }

    /// Whether the resolved text is wrapped in `<b>`.
    ///
    /// Mentions are bold; dates and links are not.
    #[must_use]
    pub fn is_bold(&self) -> bool {
        !matches!(self, Self::Date { .. } | Self::Link { .. })
    }
}

/// Inner content without its sigil, cut at the first `|`.
///
/// `@U024BE7LH|alice` gives `U024BE7LH`.
fn lookup_id(inner: &str) -> &str {
    let mut chars = inner.chars();
    chars.next();
    let rest = chars.as_str();
    rest.split_once('|').map_or(rest, |(id, _)| id)
}
