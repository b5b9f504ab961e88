//! Configuration management for mrk.
//!
//! Parses `mrk.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `format.mono_font_family`
//! - `directory.path` (also expands a leading `~`)

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the monospace font family.
    pub mono_font_family: Option<String>,
    /// Override the name directory export.
    pub directory_path: Option<PathBuf>,
    /// Override the UTC offset used for dates (`+HH:MM`).
    pub utc_offset: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mrk.toml";

/// Largest accepted tab width.
const MAX_TAB_WIDTH: usize = 16;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Formatting configuration.
    pub format: FormatConfig,
    /// Date rendering configuration.
    pub dates: DatesConfig,
    /// Encoding normalization configuration.
    pub encoding: EncodingConfig,
    /// Directory configuration (path is a relative string from TOML).
    directory: DirectoryConfigRaw,

    /// Resolved directory configuration (set after loading).
    #[serde(skip)]
    pub directory_resolved: DirectoryConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Formatting configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Font family emitted in `<s fontfamily="...">` monospace spans.
    pub mono_font_family: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            mono_font_family: "NotoSansMono".to_owned(),
        }
    }
}

/// Date rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatesConfig {
    /// strftime pattern for `<!date^...>` tokens and attachment footers.
    pub format: String,
    /// strftime pattern for message times.
    pub time_format: String,
    /// Offset from UTC, as `+HH:MM` or `-HH:MM`.
    pub utc_offset: String,
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self {
            format: "%Y-%m-%d %H:%M".to_owned(),
            time_format: "%H:%M".to_owned(),
            utc_offset: "+00:00".to_owned(),
        }
    }
}

impl DatesConfig {
    /// UTC offset in seconds east of UTC.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the offset is malformed.
    pub fn utc_offset_seconds(&self) -> Result<i32, ConfigError> {
        parse_utc_offset(&self.utc_offset).ok_or_else(|| {
            ConfigError::Validation(format!(
                "dates.utc_offset must look like +HH:MM, got {:?}",
                self.utc_offset
            ))
        })
    }
}

/// Encoding normalization configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Replace characters outside Latin-1 with `?`.
    pub latin1: bool,
    /// Spaces per tab character.
    pub tab_width: usize,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            latin1: false,
            tab_width: 4,
        }
    }
}

/// Raw directory configuration as parsed from TOML (path as string).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DirectoryConfigRaw {
    path: Option<String>,
}

/// Resolved directory configuration with an absolute path.
#[derive(Debug, Default)]
pub struct DirectoryConfig {
    /// JSON export with user, channel and user group names.
    ///
    /// If `None`, every reference resolves to its fallback.
    pub path: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`directory.path`").
        field: String,
        /// Error message (e.g., "${`SLACK_EXPORT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Parse `+HH:MM` / `-HH:MM` into seconds east of UTC.
///
/// Hours must be below 24 and minutes below 60.
fn parse_utc_offset(value: &str) -> Option<i32> {
    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mrk.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the settings are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(font) = &settings.mono_font_family {
            self.format.mono_font_family.clone_from(font);
        }
        if let Some(path) = &settings.directory_path {
            self.directory_resolved.path = Some(path.clone());
        }
        if let Some(offset) = &settings.utc_offset {
            self.dates.utc_offset.clone_from(offset);
        }
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI settings
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.format.mono_font_family, "format.mono_font_family")?;
        if self.format.mono_font_family.contains('"') {
            return Err(ConfigError::Validation(
                "format.mono_font_family cannot contain quotes".to_owned(),
            ));
        }

        require_non_empty(&self.dates.format, "dates.format")?;
        require_non_empty(&self.dates.time_format, "dates.time_format")?;
        self.dates.utc_offset_seconds()?;

        if self.encoding.tab_width > MAX_TAB_WIDTH {
            return Err(ConfigError::Validation(format!(
                "encoding.tab_width cannot exceed {MAX_TAB_WIDTH}"
            )));
        }

        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.format.mono_font_family =
            expand::expand_env(&self.format.mono_font_family, "format.mono_font_family")?;

        if let Some(ref path) = self.directory.path {
            self.directory.path = Some(expand::expand_path(path, "directory.path")?);
        }

        Ok(())
    }

    /// Resolve the directory path relative to the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.directory_resolved = DirectoryConfig {
            path: self.directory.path.as_deref().map(|p| config_dir.join(p)),
        };
    }
}
