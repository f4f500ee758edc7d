//! TOML Configuration File Support
//!
//! Reporter options can come from a TOML file at
//! `$XDG_CONFIG_HOME/herald/herald.toml`, from environment variables or from
//! the caller directly.
//!
//! # Configuration Priority
//!
//! Values are applied with the following priority (highest first):
//! 1. CLI arguments / programmatic overrides ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [spinner]
//! style = "dots"          # dots | line | arc | simple_dots
//! frames = ["-", "+"]     # custom glyphs, overrides style
//! interval_ms = 80
//!
//! [display]
//! color = true
//! ```
//!
//! # Environment
//!
//! - `HERALD_SPINNER`: spinner style name
//! - `HERALD_TICK_MS`: tick interval in milliseconds
//! - `NO_COLOR`: any non-empty value disables color

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spinner::{Spinner, SpinnerStyle};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Spinner section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinnerToml {
    /// Built-in style name
    pub style: Option<String>,

    /// Custom glyphs (override `style`)
    pub frames: Option<Vec<String>>,

    /// Tick interval in milliseconds
    pub interval_ms: Option<u64>,
}

/// Display section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToml {
    /// Whether to color status lines
    pub color: Option<bool>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeraldToml {
    /// Spinner configuration section
    pub spinner: SpinnerToml,

    /// Display configuration section
    pub display: DisplayToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved reporter options
///
/// Use [`load_config`] to resolve file and environment sources, or build one
/// directly with the `with_*` methods.
#[derive(Clone, Debug)]
pub struct ReporterConfig {
    /// Built-in spinner style, used when no custom frames are set
    pub spinner_style: SpinnerStyle,

    /// Custom spinner glyphs
    pub spinner_frames: Option<Vec<String>>,

    /// Tick interval; `None` uses the spinner's native interval
    pub tick_interval: Option<Duration>,

    /// Whether to color status lines
    pub color: bool,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            spinner_style: SpinnerStyle::default(),
            spinner_frames: None,
            tick_interval: None,
            color: true,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ReporterConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a built-in spinner style
    #[must_use]
    pub fn with_spinner_style(mut self, style: SpinnerStyle) -> Self {
        self.spinner_style = style;
        self.spinner_frames = None;
        self
    }

    /// Use custom spinner glyphs
    #[must_use]
    pub fn with_spinner_frames<I, S>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spinner_frames = Some(frames.into_iter().map(Into::into).collect());
        self
    }

    /// Override the tick interval
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = Some(interval);
        self
    }

    /// Enable or disable color
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Build the spinner these options describe
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for an empty glyph table or a
    /// zero interval.
    pub fn spinner(&self) -> Result<Spinner, ConfigError> {
        match &self.spinner_frames {
            Some(frames) => Spinner::custom(frames.iter().cloned(), self.tick_interval),
            None => Spinner::custom(
                self.spinner_style.frames().iter().copied(),
                Some(
                    self.tick_interval
                        .unwrap_or_else(|| self.spinner_style.interval()),
                ),
            ),
        }
    }

    /// Check the options without building anything
    ///
    /// # Errors
    ///
    /// Same conditions as [`spinner`](Self::spinner).
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spinner().map(|_| ())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/herald/herald.toml` or
/// `~/.config/herald/herald.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("herald").join("herald.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// resulting options are invalid. A missing config file is not an error.
pub fn load_config() -> Result<ReporterConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if the resulting options are invalid.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ReporterConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration using `env` to look up environment variables
///
/// # Errors
///
/// See [`load_config_from_path`].
pub fn load_config_with_env<F>(
    path: Option<PathBuf>,
    env: F,
) -> Result<ReporterConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ReporterConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: HeraldToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ReporterConfig, toml: &HeraldToml) -> Result<(), ConfigError> {
    if let Some(ref style) = toml.spinner.style {
        config.spinner_style = style.parse()?;
    }
    if let Some(ref frames) = toml.spinner.frames {
        config.spinner_frames = Some(frames.clone());
    }
    if let Some(ms) = toml.spinner.interval_ms {
        config.tick_interval = Some(Duration::from_millis(ms));
    }
    if let Some(color) = toml.display.color {
        config.color = color;
    }
    Ok(())
}

/// Apply environment variable overrides
///
/// Unparseable values are logged and ignored.
fn apply_env_config<F>(config: &mut ReporterConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(style) = env("HERALD_SPINNER") {
        match style.parse::<SpinnerStyle>() {
            Ok(style) => {
                config.spinner_style = style;
                config.spinner_frames = None;
                config.source = ConfigSource::Env;
            }
            Err(e) => tracing::warn!(value = %style, error = %e, "Ignoring HERALD_SPINNER"),
        }
    }
    if let Some(tick) = env("HERALD_TICK_MS") {
        match tick.parse::<u64>() {
            Ok(ms) => {
                config.tick_interval = Some(Duration::from_millis(ms));
                config.source = ConfigSource::Env;
            }
            Err(e) => tracing::warn!(value = %tick, error = %e, "Ignoring HERALD_TICK_MS"),
        }
    }
    if env("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        config.color = false;
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Spinner style override
    pub spinner_style: Option<SpinnerStyle>,

    /// Custom glyphs override
    pub spinner_frames: Option<Vec<String>>,

    /// Tick interval override (milliseconds)
    pub tick_interval_ms: Option<u64>,

    /// Color override
    pub color: Option<bool>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set spinner style override
    #[must_use]
    pub fn with_spinner_style(mut self, style: SpinnerStyle) -> Self {
        self.spinner_style = Some(style);
        self
    }

    /// Set custom glyphs override
    #[must_use]
    pub fn with_spinner_frames(mut self, frames: Vec<String>) -> Self {
        self.spinner_frames = Some(frames);
        self
    }

    /// Set tick interval override
    #[must_use]
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = Some(ms);
        self
    }

    /// Set color override
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = Some(color);
        self
    }

    /// Apply overrides to a configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the result is invalid.
    pub fn apply(&self, config: &mut ReporterConfig) -> Result<(), ConfigError> {
        if self.spinner_style.is_some()
            || self.spinner_frames.is_some()
            || self.tick_interval_ms.is_some()
            || self.color.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(style) = self.spinner_style {
            config.spinner_style = style;
            config.spinner_frames = None;
        }

        if let Some(ref frames) = self.spinner_frames {
            config.spinner_frames = Some(frames.clone());
        }

        if let Some(ms) = self.tick_interval_ms {
            config.tick_interval = Some(Duration::from_millis(ms));
        }

        if let Some(color) = self.color {
            config.color = color;
        }

        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
