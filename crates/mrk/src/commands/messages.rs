//! `mrk messages` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use mrk_transform::{Message, RenderedMessage, render_message};
use serde::Deserialize;

use super::{TransformerArgs, read_input};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the messages command.
#[derive(Args)]
pub(crate) struct MessagesArgs {
    /// JSON file with a message array or a `conversations.history` response
    /// (default: stdin).
    file: Option<PathBuf>,

    /// Pretty-print the output JSON.
    #[arg(long)]
    pretty: bool,

    #[command(flatten)]
    pub common: TransformerArgs,
}

/// Accepted input shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum MessagesInput {
    List(Vec<Message>),
    History { messages: Vec<Message> },
}

impl MessagesInput {
    fn into_messages(self) -> Vec<Message> {
        match self {
            Self::List(messages) | Self::History { messages } => messages,
        }
    }
}

impl MessagesArgs {
    /// Execute the messages command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the input is not valid
    /// message JSON.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let transformer = self.common.transformer()?;
        let messages = parse_messages(&read_input(self.file.as_deref())?)?;

        if messages.is_empty() {
            output.warning("No messages found in input");
        }

        let rendered: Vec<RenderedMessage> = messages
            .iter()
            .map(|message| render_message(&transformer, message))
            .collect();
        tracing::info!(count = rendered.len(), "Rendered messages");

        let mut stdout = std::io::stdout().lock();
        if self.pretty {
            serde_json::to_writer_pretty(&mut stdout, &rendered)?;
        } else {
            serde_json::to_writer(&mut stdout, &rendered)?;
        }
        writeln!(stdout)?;
        Ok(())
    }
}

fn parse_messages(json: &str) -> Result<Vec<Message>, CliError> {
    let input: MessagesInput = serde_json::from_str(json)?;
    Ok(input.into_messages())
}
