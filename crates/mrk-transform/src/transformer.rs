//! The mrkdwn rewriter.

use std::sync::LazyLock;

use mrk_directory::{Directory, NullDirectory};
use regex::{Captures, Regex};

use crate::date::{ChronoDateFormatter, DATE_FALLBACK, DateFormatter};
use crate::encoding::{Encoder, EntityEncoder};
use crate::format;
use crate::reference::Reference;

/// Any `<...>` token, non-greedy so adjacent tokens stay separate.
static REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(.*?)>").expect("invalid reference regex"));

/// Monospace font family used when none is configured.
pub const DEFAULT_MONO_FONT_FAMILY: &str = "NotoSansMono";

/// Converts Slack mrkdwn into restricted HTML.
///
/// Collaborators are injected and only ever read, so a transformer can be
/// shared across threads.
///
/// # Example
///
/// ```
/// use mrk_directory::NameDirectory;
/// use mrk_transform::MessageTransformer;
///
/// let directory = NameDirectory::new().with_user("U024BE7LH", "alice");
/// let transformer = MessageTransformer::new(directory).with_mono_font_family("Courier");
///
/// assert_eq!(
///     transformer.transform("hi <@U024BE7LH>, see `make`", true),
///     r#"hi <b>@alice</b>, see <s fontfamily="Courier">make</s>"#
/// );
/// ```
pub struct MessageTransformer {
    directory: Box<dyn Directory>,
    encoder: Box<dyn Encoder>,
    dates: Box<dyn DateFormatter>,
    mono_font_family: String,
}

impl Default for MessageTransformer {
    fn default() -> Self {
        Self::new(NullDirectory)
    }
}

impl MessageTransformer {
    /// Create a transformer over `directory` with the default encoder, date
    /// formatter and monospace font.
    #[must_use]
    pub fn new(directory: impl Directory + 'static) -> Self {
        Self {
            directory: Box::new(directory),
            encoder: Box::new(EntityEncoder::default()),
            dates: Box::new(ChronoDateFormatter::default()),
            mono_font_family: DEFAULT_MONO_FONT_FAMILY.to_owned(),
        }
    }

    /// Replace the encoding normalizer.
    #[must_use]
    pub fn with_encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoder = Box::new(encoder);
        self
    }

    /// Replace the date formatter.
    #[must_use]
    pub fn with_date_formatter(mut self, dates: impl DateFormatter + 'static) -> Self {
        self.dates = Box::new(dates);
        self
    }

    /// Set the font family emitted for monospace spans.
    #[must_use]
    pub fn with_mono_font_family(mut self, font_family: impl Into<String>) -> Self {
        self.mono_font_family = font_family.into();
        self
    }

    /// The injected directory.
    pub fn directory(&self) -> &dyn Directory {
        self.directory.as_ref()
    }

    /// The injected date formatter.
    pub fn dates(&self) -> &dyn DateFormatter {
        self.dates.as_ref()
    }

    /// Encoding normalization only.
    pub fn encode(&self, text: &str) -> String {
        self.encoder.encode(text)
    }

    /// Transform `text`.
    ///
    /// Encoding normalization always runs. When `apply_formatting` is set,
    /// references are resolved and the formatting passes run afterwards.
    /// Never fails: unresolvable references become placeholder text.
    pub fn transform(&self, text: &str, apply_formatting: bool) -> String {
        let encoded = self.encoder.encode(text);
        if !apply_formatting {
            return encoded;
        }

        let resolved = REFERENCE_PATTERN.replace_all(&encoded, |caps: &Captures| {
            self.resolve(Reference::parse(&caps[1]))
        });
        format::apply_all(&resolved, &self.mono_font_family)
    }

    /// Render a single classified reference.
    pub fn resolve(&self, reference: Reference<'_>) -> String {
        let text = match reference {
            Reference::User { id } => match self.directory.user_name(id) {
                Some(name) => format!("@{name}"),
                None => {
                    tracing::debug!(id, "Unknown user");
                    format!("@user_{id}")
                }
            },
            Reference::Channel { id } => match self.directory.channel_name(id) {
                Some(name) => format!("#{name}"),
                None => {
                    tracing::debug!(id, "Unknown channel");
                    format!("#channel_{id}")
                }
            },
            Reference::Usergroup { id: Some(id) } => match self.directory.usergroup_name(id) {
                Some(name) => format!("@{name}"),
                None => {
                    tracing::debug!(id, "Unknown user group");
                    format!("@usergroup_{id}")
                }
            },
            Reference::Usergroup { id: None } => {
                tracing::debug!("Malformed user group reference");
                "@usergroup_unknown".to_owned()
            }
            Reference::Date { raw: Some(raw) } => self.dates.format_datetime(raw),
            Reference::Date { raw: None } => DATE_FALLBACK.to_owned(),
            Reference::Special(mention) => mention.as_str().to_owned(),
            Reference::UnknownSpecial { id } => {
                tracing::debug!(id, "Unknown special mention");
                format!("@special_{id}")
            }
            Reference::Link { url, text } => format!(r#"<a href="{url}">{text}</a>"#),
        };

        if reference.is_bold() {
            format!("<b>{text}</b>")
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use mrk_directory::NameDirectory;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::encoding::IdentityEncoder;

    struct FixedDates;

    impl DateFormatter for FixedDates {
        fn format_datetime(&self, raw: &str) -> String {
            if raw == "1609459200" {
                "2021-01-01".to_owned()
            } else {
                format!("date({raw})")
            }
        }
    }

    fn transformer() -> MessageTransformer {
        let directory = NameDirectory::new()
            .with_user("U123", "alice")
            .with_user("W456", "bob")
            .with_channel("C123", "general")
            .with_usergroup("SABCDEF", "oncall");
        MessageTransformer::new(directory)
            .with_date_formatter(FixedDates)
            .with_mono_font_family("Courier")
    }

    fn fmt(text: &str) -> String {
        transformer().transform(text, true)
    }

    #[test]
    fn test_plain_mode_only_encodes() {
        let t = transformer();
        assert_eq!(t.transform("*bold* _it_ `x`\n> q", false), "*bold* _it_ `x`\n> q");
        assert_eq!(t.transform("a &amp; b", false), "a & b");
    }

    #[test]
    fn test_plain_mode_leaves_references() {
        let t = transformer().with_encoder(IdentityEncoder);
        assert_eq!(t.transform("<@U123>", false), "<@U123>");
    }

    #[test]
    fn test_user_mentions() {
        assert_eq!(fmt("<@U123>"), "<b>@alice</b>");
        assert_eq!(fmt("<@W456>"), "<b>@bob</b>");
        assert_eq!(fmt("<@U999>"), "<b>@user_U999</b>");
    }

    #[test]
    fn test_user_mention_display_suffix_ignored() {
        assert_eq!(fmt("<@U123|someone>"), "<b>@alice</b>");
        assert_eq!(fmt("<@U999|someone>"), "<b>@user_U999</b>");
    }

    #[test]
    fn test_channel_mentions() {
        assert_eq!(fmt("<#C123>"), "<b>#general</b>");
        assert_eq!(fmt("<#C999>"), "<b>#channel_C999</b>");
        assert_eq!(fmt("<#C123|old-name>"), "<b>#general</b>");
    }

    #[test]
    fn test_usergroup_mentions() {
        assert_eq!(fmt("<!subteam^SABCDEF>"), "<b>@oncall</b>");
        assert_eq!(fmt("<!subteam^SZZZ|@ops>"), "<b>@usergroup_SZZZ</b>");
        assert_eq!(fmt("<!subteam^>"), "<b>@usergroup_unknown</b>");
    }

    #[test]
    fn test_dates() {
        assert_eq!(fmt("<!date^1609459200>"), "2021-01-01");
        assert_eq!(fmt("<!date^1609459200^{date_short}|Jan 1>"), "2021-01-01");
        assert_eq!(fmt("<!date>"), "(failed to parse date)");
    }

    #[test]
    fn test_dates_with_chrono_formatter() {
        let t = MessageTransformer::default();
        assert_eq!(t.transform("<!date^1609459200>", true), "2021-01-01 00:00");
    }

    #[test]
    fn test_special_mentions() {
        assert_eq!(fmt("<!here>"), "<b>@here</b>");
        assert_eq!(fmt("<!channel>"), "<b>@channel</b>");
        assert_eq!(fmt("<!everyone>"), "<b>@everyone</b>");
        assert_eq!(fmt("<!here|here>"), "<b>@here</b>");
        assert_eq!(fmt("<!foo>"), "<b>@special_foo</b>");
    }

    #[test]
    fn test_links() {
        assert_eq!(
            fmt("<http://x.com|click here>"),
            r#"<a href="http://x.com">click here</a>"#
        );
        assert_eq!(
            fmt("<http://x.com>"),
            r#"<a href="http://x.com">http://x.com</a>"#
        );
        assert_eq!(
            fmt("<mailto:a@b.c|a@b.c>"),
            r#"<a href="mailto:a@b.c">a@b.c</a>"#
        );
    }

    #[test]
    fn test_adjacent_references() {
        assert_eq!(
            fmt("<@U123><#C123> and <!here>"),
            "<b>@alice</b><b>#general</b> and <b>@here</b>"
        );
    }

    #[test]
    fn test_escaped_references_resolve() {
        assert_eq!(fmt("&lt;@U123&gt; hi"), "<b>@alice</b> hi");
    }

    #[test]
    fn test_formatting() {
        assert_eq!(fmt("*bold text*"), "<b>bold text</b>");
        assert_eq!(fmt("`code`"), r#"<s fontfamily="Courier">code</s>"#);
        assert_eq!(fmt("an _italic_ word"), "an <i>italic</i> word");
        assert_eq!(fmt("> quoted"), "<blockquote> quoted</blockquote>");
    }

    #[test]
    fn test_escaped_blockquote() {
        assert_eq!(fmt("&gt; quoted"), "<blockquote> quoted</blockquote>");
    }

    #[test]
    fn test_blockquote_not_followed_by_break() {
        assert_eq!(
            fmt("> quoted\nafter"),
            "<blockquote> quoted</blockquote>after"
        );
        assert_eq!(
            fmt("before\n> quoted\n\nafter"),
            "before<br><blockquote> quoted</blockquote><br>after"
        );
    }

    #[test]
    fn test_newlines() {
        assert_eq!(fmt("line 1\nline 2\n"), "line 1<br>line 2<br>");
    }

    #[test]
    fn test_mention_inside_bold() {
        assert_eq!(fmt("*ping <@U123>*"), "<b>ping <b>@alice</b></b>");
    }

    #[test]
    fn test_link_with_underscores_is_not_italic() {
        assert_eq!(
            fmt("<http://x.com/a_b_c>"),
            r#"<a href="http://x.com/a_b_c">http://x.com/a_b_c</a>"#
        );
    }

    #[test]
    fn test_fallbacks_never_empty() {
        let t = MessageTransformer::default();
        for input in ["<@U1>", "<#C1>", "<!subteam^S1>", "<!subteam^>", "<!date>", "<!x>"] {
            let out = t.transform(input, true);
            assert!(!out.is_empty(), "{input} produced empty output");
            assert!(!out.contains(input), "{input} was not rewritten");
        }
    }

    #[test]
    fn test_transformer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MessageTransformer>();
    }
}
