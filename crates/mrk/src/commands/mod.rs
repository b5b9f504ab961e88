//! CLI command implementations.

pub(crate) mod messages;
pub(crate) mod transform;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use mrk_config::{CliSettings, Config};
use mrk_directory::NameDirectory;
use mrk_transform::{ChronoDateFormatter, EntityEncoder, MessageTransformer};

use crate::error::CliError;

pub(crate) use messages::MessagesArgs;
pub(crate) use transform::TransformArgs;

/// Options shared by every command that builds a transformer.
#[derive(Args)]
pub(crate) struct TransformerArgs {
    /// Path to configuration file (default: auto-discover mrk.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON export with user, channel and user group names (overrides config).
    #[arg(short, long, env = "MRK_DIRECTORY")]
    directory: Option<PathBuf>,

    /// Font family for monospace spans (overrides config).
    #[arg(long)]
    font: Option<String>,

    /// UTC offset for dates, e.g. +02:00 (overrides config).
    #[arg(long, allow_hyphen_values = true)]
    utc_offset: Option<String>,

    /// Enable verbose output (log unresolved references).
    #[arg(short, long)]
    pub verbose: bool,
}

impl TransformerArgs {
    /// Load configuration with command line overrides applied.
    fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            mono_font_family: self.font.clone(),
            directory_path: self.directory.clone(),
            utc_offset: self.utc_offset.clone(),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }

    /// Load configuration and build a transformer from it.
    pub(crate) fn transformer(&self) -> Result<MessageTransformer, CliError> {
        let config = self.load_config()?;
        build_transformer(&config)
    }
}

/// Build a transformer from loaded configuration.
///
/// Without a configured directory every reference falls back to its
/// placeholder.
pub(crate) fn build_transformer(config: &Config) -> Result<MessageTransformer, CliError> {
    let dates = ChronoDateFormatter::new(
        &config.dates.format,
        &config.dates.time_format,
        config.dates.utc_offset_seconds()?,
    )?;
    let encoder = EntityEncoder::new()
        .with_tab_width(config.encoding.tab_width)
        .with_latin1(config.encoding.latin1);

    let transformer = match &config.directory_resolved.path {
        Some(path) => MessageTransformer::new(NameDirectory::load(path)?),
        None => MessageTransformer::default(),
    };

    Ok(transformer
        .with_encoder(encoder)
        .with_date_formatter(dates)
        .with_mono_font_family(config.format.mono_font_family.clone()))
}

/// Read a file, or stdin when `path` is `None` or `-`.
pub(crate) fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}
