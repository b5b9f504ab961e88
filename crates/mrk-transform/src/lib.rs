//! Slack mrkdwn to restricted HTML.
//!
//! This crate converts message text written in Slack's mrkdwn dialect into
//! the small HTML vocabulary understood by simple document writers:
//! `<b>`, `<i>`, `<s fontfamily="...">`, `<blockquote>`, `<a href="...">`
//! and `<br>`.
//!
//! # Pipeline
//!
//! 1. Encoding normalization ([`Encoder`], always applied)
//! 2. Reference resolution: `<@U...>`, `<#C...>`, `<!subteam^...>`,
//!    `<!date^...>`, `<!here>` and links, classified by [`Reference`]
//! 3. Bold, italic, monospace and blockquote passes
//! 4. Newlines to `<br>`
//!
//! Steps 2 to 4 only run when formatting is requested. The rewrites are
//! flat and greedy; this is not a markup parser.
//!
//! # Collaborators
//!
//! - [`Directory`](mrk_directory::Directory): ID to name lookups
//! - [`DateFormatter`]: date token rendering ([`ChronoDateFormatter`])
//! - [`Encoder`]: text normalization ([`EntityEncoder`])

mod date;
mod encoding;
mod format;
pub mod message;
mod reference;
mod transformer;

pub use date::{ChronoDateFormatter, DATE_FALLBACK, DateFormatError, DateFormatter};
pub use encoding::{Encoder, EntityEncoder, IdentityEncoder, decode_entities};
pub use message::{Message, RenderedMessage, UNPROCESSABLE_MESSAGE, render_message};
pub use reference::{Reference, SpecialMention};
pub use transformer::{DEFAULT_MONO_FONT_FAMILY, MessageTransformer};
