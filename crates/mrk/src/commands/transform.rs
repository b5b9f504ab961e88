//! `mrk transform` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use super::{TransformerArgs, read_input};
use crate::error::CliError;

/// The final line ending of a text file is not part of the message.
fn strip_final_newline(input: &str) -> &str {
    input
        .strip_suffix("\r\n")
        .or_else(|| input.strip_suffix('\n'))
        .unwrap_or(input)
}

/// Arguments for the transform command.
#[derive(Args)]
pub(crate) struct TransformArgs {
    /// Text file to convert (default: stdin).
    file: Option<PathBuf>,

    /// Only normalize encoding; leave references and markup untouched.
    #[arg(long)]
    plain: bool,

    #[command(flatten)]
    pub common: TransformerArgs,
}

impl TransformArgs {
    /// Execute the transform command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the input cannot be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let transformer = self.common.transformer()?;
        let input = read_input(self.file.as_deref())?;
        let text = strip_final_newline(&input);

        let html = transformer.transform(text, !self.plain);
        tracing::info!(bytes_in = text.len(), bytes_out = html.len(), "Transformed text");

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{html}")?;
        Ok(())
    }
}
