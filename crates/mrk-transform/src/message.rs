//! Rendering of whole Slack messages.
//!
//! A message carries more than its `text`: an author, a timestamp, legacy
//! attachments whose parts opt into mrkdwn individually through
//! `mrkdwn_in`, Block Kit sections, reactions and shared files.
//! [`render_message`] applies the transformer to each part with the right
//! formatting flag.

use serde::{Deserialize, Serialize};

use crate::transformer::MessageTransformer;

/// Body written for a message that has no resolvable author.
pub const UNPROCESSABLE_MESSAGE: &str = "[Can not process this message]";

/// A Slack message as returned by `conversations.history`.
///
/// Only the fields needed for rendering are modelled; others are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Message {
    pub ts: Option<String>,
    pub user: Option<String>,
    pub bot_id: Option<String>,
    pub username: Option<String>,
    pub subtype: Option<String>,
    /// Comment of a `file_comment` message; carries its author.
    pub comment: Option<Comment>,
    pub text: Option<String>,
    /// Whether `text` is mrkdwn. Slack omits it when true.
    pub mrkdwn: Option<bool>,
    pub attachments: Vec<Attachment>,
    pub blocks: Vec<Block>,
    pub reactions: Vec<Reaction>,
    pub files: Vec<File>,
}

/// Comment attached to a `file_comment` message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub user: Option<String>,
}

/// Legacy secondary attachment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Attachment {
    pub pretext: Option<String>,
    pub author_name: Option<String>,
    pub title: Option<String>,
    pub title_link: Option<String>,
    pub text: Option<String>,
    pub fields: Vec<Field>,
    pub footer: Option<String>,
    pub ts: Option<serde_json::Value>,
    pub image_url: Option<String>,
    pub actions: Vec<Action>,
    /// Names of the parts that contain mrkdwn: `pretext`, `title`, `text`,
    /// `fields`.
    pub mrkdwn_in: Vec<String>,
}

/// Attachment field (a title/value pair).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Field {
    pub title: Option<String>,
    pub value: Option<String>,
}

/// Interactive attachment button.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Action {
    pub text: Option<String>,
}

/// Block Kit layout block. Only `section` blocks are rendered.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<TextObject>,
    pub fields: Vec<TextObject>,
}

/// Block Kit text object, `mrkdwn` or `plain_text`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl TextObject {
    fn is_mrkdwn(&self) -> bool {
        self.kind == "mrkdwn"
    }
}

/// Emoji reaction with the users who added it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Reaction {
    pub name: String,
    pub count: u64,
    pub users: Vec<String>,
}

/// Shared file metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct File {
    pub name: Option<String>,
    pub pretty_type: Option<String>,
}

/// Who wrote a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub is_bot: bool,
}

/// Message ready to embed in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    pub author: Option<Author>,
    /// Time of day the message was posted.
    pub time: Option<String>,
    /// Transformed message body. `None` for an empty message.
    pub html: Option<String>,
    pub reactions: Vec<RenderedReaction>,
    /// One `[type file: <b>name</b>]` line per shared file.
    pub files: Vec<String>,
    pub attachments: Vec<RenderedAttachment>,
    /// Section texts and section fields, in order.
    pub blocks: Vec<String>,
}

/// Reaction header and the bold names of its users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedReaction {
    /// `[name] (count):`
    pub label: String,
    pub users: String,
}

/// Attachment with every part transformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedAttachment {
    pub pretext: Option<String>,
    pub author_name: Option<String>,
    /// Bold title, linked when the attachment has a `title_link`.
    pub title: Option<String>,
    pub text: Option<String>,
    pub fields: Vec<RenderedField>,
    pub footer: Option<String>,
    /// `<a href="...">[Image]</a>` for an attached image.
    pub image: Option<String>,
    /// `[label]` per action button.
    pub actions: Vec<String>,
}

/// Transformed attachment field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedField {
    pub title: String,
    pub value: String,
}

impl Attachment {
    fn mrkdwn_in(&self, part: &str) -> bool {
        self.mrkdwn_in.iter().any(|p| p == part)
    }
}

/// Render a message with `transformer`.
///
/// A message without an author (neither user, bot nor file comment
/// author) is replaced by [`UNPROCESSABLE_MESSAGE`].
pub fn render_message(transformer: &MessageTransformer, message: &Message) -> RenderedMessage {
    let Some(author) = resolve_author(transformer, message) else {
        tracing::warn!(
            ts = message.ts.as_deref().unwrap_or_default(),
            "Can not process message"
        );
        return RenderedMessage {
            html: Some(UNPROCESSABLE_MESSAGE.to_owned()),
            ..RenderedMessage::default()
        };
    };

    let html = message
        .text
        .as_deref()
        .filter(|text| !text.is_empty())
        .map(|text| transformer.transform(text, message.mrkdwn.unwrap_or(true)));

    RenderedMessage {
        author: Some(author),
        time: message
            .ts
            .as_deref()
            .map(|ts| transformer.dates().format_time(ts)),
        html,
        reactions: message
            .reactions
            .iter()
            .map(|reaction| render_reaction(transformer, reaction))
            .collect(),
        files: message.files.iter().map(render_file).collect(),
        attachments: message
            .attachments
            .iter()
            .map(|attachment| render_attachment(transformer, attachment))
            .collect(),
        blocks: render_blocks(transformer, &message.blocks),
    }
}

/// Directory name of `id`, or `unknown_user_{id}`.
fn user_name(transformer: &MessageTransformer, id: &str) -> String {
    transformer.directory().user_name(id).map_or_else(
        || {
            tracing::debug!(user = id, "Unknown user");
            format!("unknown_user_{id}")
        },
        str::to_owned,
    )
}

/// Users are looked up in the directory; bots use their posted username;
/// file comments are attributed to the comment's author.
fn resolve_author(transformer: &MessageTransformer, message: &Message) -> Option<Author> {
    if let Some(user) = &message.user {
        return Some(Author {
            id: user.clone(),
            name: user_name(transformer, user),
            is_bot: false,
        });
    }

    if let Some(bot_id) = &message.bot_id {
        let name = message.username.as_deref().map_or_else(
            || format!("unknown_bot_{bot_id}"),
            |username| transformer.encode(username),
        );
        return Some(Author {
            id: bot_id.clone(),
            name,
            is_bot: true,
        });
    }

    if message.subtype.as_deref() == Some("file_comment") {
        let user = message.comment.as_ref()?.user.as_ref()?;
        return Some(Author {
            id: user.clone(),
            name: user_name(transformer, user),
            is_bot: false,
        });
    }

    None
}

fn render_reaction(transformer: &MessageTransformer, reaction: &Reaction) -> RenderedReaction {
    let users: Vec<String> = reaction
        .users
        .iter()
        .map(|user| format!("<b>{}</b>", user_name(transformer, user)))
        .collect();
    RenderedReaction {
        label: format!("[{}] ({}):", reaction.name, reaction.count),
        users: users.join(", "),
    }
}

fn render_file(file: &File) -> String {
    format!(
        "[{} file: <b>{}</b>]",
        file.pretty_type.as_deref().unwrap_or_default(),
        file.name.as_deref().unwrap_or_default()
    )
}

fn render_blocks(transformer: &MessageTransformer, blocks: &[Block]) -> Vec<String> {
    let render = |text: &TextObject| transformer.transform(&text.text, text.is_mrkdwn());
    blocks
        .iter()
        .filter(|block| block.kind == "section")
        .flat_map(|block| block.text.iter().chain(&block.fields))
        .map(render)
        .collect()
}

fn render_attachment(
    transformer: &MessageTransformer,
    attachment: &Attachment,
) -> RenderedAttachment {
    let plain = |text: Option<&str>| text.map(|t| transformer.transform(t, false));
    let marked = |text: Option<&str>, part: &str| {
        text.map(|t| transformer.transform(t, attachment.mrkdwn_in(part)))
    };

    let title = marked(attachment.title.as_deref(), "title").map(|title| {
        match &attachment.title_link {
            Some(link) => format!(r#"<b><a href="{link}">{title}</a></b>"#),
            None => format!("<b>{title}</b>"),
        }
    });

    let footer = plain(attachment.footer.as_deref()).map(|footer| {
        match attachment.ts.as_ref().and_then(timestamp_string) {
            Some(ts) => format!("{footer}|{}", transformer.dates().format_datetime(&ts)),
            None => footer,
        }
    });

    let fields_mrkdwn = attachment.mrkdwn_in("fields");
    let fields = attachment
        .fields
        .iter()
        .map(|field| RenderedField {
            title: field
                .title
                .as_deref()
                .map(|t| transformer.transform(t, false))
                .unwrap_or_default(),
            value: field
                .value
                .as_deref()
                .map(|v| transformer.transform(v, fields_mrkdwn))
                .unwrap_or_default(),
        })
        .collect();

    RenderedAttachment {
        pretext: marked(attachment.pretext.as_deref(), "pretext"),
        author_name: plain(attachment.author_name.as_deref()),
        title,
        text: marked(attachment.text.as_deref(), "text"),
        fields,
        footer,
        image: attachment
            .image_url
            .as_ref()
            .map(|url| format!(r#"<a href="{url}">[Image]</a>"#)),
        actions: attachment
            .actions
            .iter()
            .map(|action| {
                let text = action.text.as_deref().unwrap_or_default();
                format!("[{}]", transformer.transform(text, false))
            })
            .collect(),
    }
}

/// Attachment `ts` is a number in some payloads and a string in others.
fn timestamp_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use mrk_directory::NameDirectory;
    use pretty_assertions::assert_eq;

    use super::*;

    fn transformer() -> MessageTransformer {
        MessageTransformer::new(NameDirectory::new().with_user("U1", "alice"))
            .with_mono_font_family("Courier")
    }

    fn parse(json: &str) -> Message {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_user_message() {
        let message = parse(r#"{"ts": "1609459200.000200", "user": "U1", "text": "hi *all*"}"#);
        let rendered = render_message(&transformer(), &message);

        assert_eq!(
            rendered.author,
            Some(Author {
                id: "U1".to_owned(),
                name: "alice".to_owned(),
                is_bot: false
            })
        );
        assert_eq!(rendered.time.as_deref(), Some("00:00"));
        assert_eq!(rendered.html.as_deref(), Some("hi <b>all</b>"));
    }

    #[test]
    fn test_unknown_user() {
        let message = parse(r#"{"user": "U9", "text": "x"}"#);
        let author = render_message(&transformer(), &message).author.unwrap();
        assert_eq!(author.name, "unknown_user_U9");
    }

    #[test]
    fn test_bot_authors() {
        let named = parse(r#"{"bot_id": "B1", "username": "deploy &amp; ci"}"#);
        let anonymous = parse(r#"{"bot_id": "B2"}"#);

        let named = render_message(&transformer(), &named).author.unwrap();
        let anonymous = render_message(&transformer(), &anonymous).author.unwrap();

        assert_eq!(named.name, "deploy & ci");
        assert!(named.is_bot);
        assert_eq!(anonymous.name, "unknown_bot_B2");
    }

    #[test]
    fn test_no_author() {
        let message = parse(
            r#"{"ts": "1609459200.000200", "subtype": "channel_join", "text": "joined",
                "reactions": [{"name": "wave", "count": 1, "users": ["U1"]}]}"#,
        );
        let rendered = render_message(&transformer(), &message);

        assert_eq!(
            rendered,
            RenderedMessage {
                html: Some(UNPROCESSABLE_MESSAGE.to_owned()),
                ..RenderedMessage::default()
            }
        );
    }

    #[test]
    fn test_file_comment_author() {
        let known =
            parse(r#"{"subtype": "file_comment", "comment": {"user": "U1"}, "text": "nice"}"#);
        let unknown = parse(r#"{"subtype": "file_comment", "comment": {"user": "U7"}}"#);
        let anonymous = parse(r#"{"subtype": "file_comment", "comment": {}}"#);

        assert_eq!(
            render_message(&transformer(), &known).author,
            Some(Author {
                id: "U1".to_owned(),
                name: "alice".to_owned(),
                is_bot: false
            })
        );
        assert_eq!(
            render_message(&transformer(), &unknown).author.unwrap().name,
            "unknown_user_U7"
        );
        assert_eq!(render_message(&transformer(), &anonymous).author, None);
    }

    #[test]
    fn test_other_subtype_without_user_has_no_author() {
        let message = parse(r#"{"subtype": "file_share", "comment": {"user": "U1"}}"#);
        assert_eq!(render_message(&transformer(), &message).author, None);
    }

    #[test]
    fn test_reactions() {
        let message = parse(
            r#"{"user": "U1", "text": "x", "reactions": [
                {"name": "+1", "count": 2, "users": ["U1", "U9"]}
            ]}"#,
        );
        let rendered = render_message(&transformer(), &message);

        assert_eq!(
            rendered.reactions,
            vec![RenderedReaction {
                label: "[+1] (2):".to_owned(),
                users: "<b>alice</b>, <b>unknown_user_U9</b>".to_owned(),
            }]
        );
    }

    #[test]
    fn test_files() {
        let message = parse(
            r#"{"user": "U1", "files": [
                {"name": "report.pdf", "pretty_type": "PDF"},
                {"name": "notes"}
            ]}"#,
        );
        let rendered = render_message(&transformer(), &message);

        assert_eq!(
            rendered.files,
            vec!["[PDF file: <b>report.pdf</b>]", "[ file: <b>notes</b>]"]
        );
    }

    #[test]
    fn test_section_blocks() {
        let message = parse(
            r#"{"user": "U1", "blocks": [
                {"type": "section", "text": {"type": "mrkdwn", "text": "*hi* <!here>"},
                 "fields": [{"type": "plain_text", "text": "*raw*"},
                            {"type": "mrkdwn", "text": "_it_"}]},
                {"type": "divider"},
                {"type": "section", "text": {"type": "plain_text", "text": "<!here>"}}
            ]}"#,
        );
        let rendered = render_message(&transformer(), &message);

        assert_eq!(rendered.html, None);
        assert_eq!(
            rendered.blocks,
            vec![
                "<b>hi</b> <b>@here</b>",
                "*raw*",
                "<i>it</i>",
                "<!here>",
            ]
        );
    }

    #[test]
    fn test_attachment_title_mrkdwn() {
        let message = parse(
            r#"{"user": "U1", "attachments": [
                {"title": "*T*", "mrkdwn_in": ["title"]},
                {"title": "*T*", "title_link": "https://example.com", "mrkdwn_in": ["title"]}
            ]}"#,
        );
        let rendered = render_message(&transformer(), &message);

        assert_eq!(rendered.attachments[0].title.as_deref(), Some("<b><b>T</b></b>"));
        assert_eq!(
            rendered.attachments[1].title.as_deref(),
            Some(r#"<b><a href="https://example.com"><b>T</b></a></b>"#)
        );
    }

    #[test]
    fn test_attachment_image_and_actions() {
        let message = parse(
            r#"{"user": "U1", "attachments": [{
                "image_url": "https://example.com/a.png",
                "actions": [{"text": "*Approve*"}, {"text": "Deny &amp; close"}]
            }]}"#,
        );
        let attachment = &render_message(&transformer(), &message).attachments[0];

        assert_eq!(
            attachment.image.as_deref(),
            Some(r#"<a href="https://example.com/a.png">[Image]</a>"#)
        );
        assert_eq!(attachment.actions, vec!["[*Approve*]", "[Deny & close]"]);
    }

    #[test]
    fn test_mrkdwn_disabled() {
        let message = parse(r#"{"user": "U1", "text": "*raw*", "mrkdwn": false}"#);
        assert_eq!(
            render_message(&transformer(), &message).html.as_deref(),
            Some("*raw*")
        );
    }

    #[test]
    fn test_empty_text() {
        let message = parse(r#"{"user": "U1", "text": ""}"#);
        assert_eq!(render_message(&transformer(), &message).html, None);
    }

    #[test]
    fn test_attachment_mrkdwn_in() {
        let message = parse(
            r#"{
                "user": "U1",
                "attachments": [{
                    "pretext": "*pre*",
                    "title": "*Title*",
                    "title_link": "https://example.com",
                    "text": "*body* <@U1>",
                    "fields": [{"title": "*Env*", "value": "`prod`"}],
                    "mrkdwn_in": ["text", "fields"]
                }]
            }"#,
        );
        let rendered = render_message(&transformer(), &message);
        let attachment = &rendered.attachments[0];

        assert_eq!(attachment.pretext.as_deref(), Some("*pre*"));
        assert_eq!(
            attachment.title.as_deref(),
            Some(r#"<b><a href="https://example.com">*Title*</a></b>"#)
        );
        assert_eq!(attachment.text.as_deref(), Some("<b>body</b> <b>@alice</b>"));
        assert_eq!(
            attachment.fields,
            vec![RenderedField {
                title: "*Env*".to_owned(),
                value: r#"<s fontfamily="Courier">prod</s>"#.to_owned(),
            }]
        );
    }

    #[test]
    fn test_attachment_footer_with_ts() {
        let message = parse(
            r#"{"user": "U1", "attachments": [
                {"footer": "GitHub", "ts": 1609459200},
                {"footer": "Jira", "ts": "1609459200"},
                {"footer": "plain"}
            ]}"#,
        );
        let rendered = render_message(&transformer(), &message);
        let footers: Vec<_> = rendered
            .attachments
            .iter()
            .map(|a| a.footer.as_deref().unwrap())
            .collect();

        assert_eq!(
            footers,
            vec!["GitHub|2021-01-01 00:00", "Jira|2021-01-01 00:00", "plain"]
        );
    }

    #[test]
    fn test_serialize_rendered() {
        let message = parse(r#"{"user": "U1", "text": "hi"}"#);
        let json = serde_json::to_value(render_message(&transformer(), &message)).unwrap();

        assert_eq!(json["author"]["name"], "alice");
        assert_eq!(json["html"], "hi");
        assert_eq!(json["time"], serde_json::Value::Null);
    }
}
