//! Spinner Clock
//!
//! Cycles through a table of glyphs at a fixed tick interval. The emitter asks
//! for one glyph per rendered frame and waits [`Spinner::interval`] between
//! animation-driven frames.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::ConfigError;

/// Tick interval used for custom glyph tables that don't specify one
pub const DEFAULT_CUSTOM_INTERVAL: Duration = Duration::from_millis(50);

/// Built-in glyph tables
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpinnerStyle {
    /// Braille dots
    Dots,
    /// `- \ | /`, safe for legacy consoles
    Line,
    /// Quarter-circle arcs
    Arc,
    /// Growing ellipsis
    SimpleDots,
}

impl SpinnerStyle {
    /// Glyphs for this style
    #[must_use]
    pub fn frames(self) -> &'static [&'static str] {
        match self {
            Self::Dots => &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
            Self::Line => &["-", "\\", "|", "/"],
            Self::Arc => &["◜", "◠", "◝", "◞", "◡", "◟"],
            Self::SimpleDots => &[".  ", ".. ", "...", "   "],
        }
    }

    /// Native tick interval for this style
    #[must_use]
    pub fn interval(self) -> Duration {
        match self {
            Self::Dots => Duration::from_millis(80),
            Self::Line => Duration::from_millis(130),
            Self::Arc => Duration::from_millis(100),
            Self::SimpleDots => Duration::from_millis(400),
        }
    }

    /// Config/CLI name of the style
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Dots => "dots",
            Self::Line => "line",
            Self::Arc => "arc",
            Self::SimpleDots => "simple_dots",
        }
    }
}

impl Default for SpinnerStyle {
    fn default() -> Self {
        // Legacy Windows consoles can't draw braille
        if cfg!(windows) {
            Self::Line
        } else {
            Self::Dots
        }
    }
}

impl fmt::Display for SpinnerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpinnerStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "dots" => Ok(Self::Dots),
            "line" => Ok(Self::Line),
            "arc" => Ok(Self::Arc),
            "simple_dots" | "simpledots" => Ok(Self::SimpleDots),
            other => Err(ConfigError::ValidationError(format!(
                "unknown spinner style '{other}'"
            ))),
        }
    }
}

/// Cyclic animation clock
#[derive(Clone, Debug)]
pub struct Spinner {
    frames: Vec<String>,
    interval: Duration,
    index: usize,
}

impl Spinner {
    /// Create a spinner from a built-in style
    #[must_use]
    pub fn from_style(style: SpinnerStyle) -> Self {
        Self {
            frames: style.frames().iter().map(|f| (*f).to_string()).collect(),
            interval: style.interval(),
            index: 0,
        }
    }

    /// Create a spinner from custom glyphs
    ///
    /// `interval` falls back to [`DEFAULT_CUSTOM_INTERVAL`].
    pub fn custom<I, S>(frames: I, interval: Option<Duration>) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let frames: Vec<String> = frames.into_iter().map(Into::into).collect();
        if frames.is_empty() {
            return Err(ConfigError::ValidationError(
                "spinner must define at least one frame".to_string(),
            ));
        }

        let interval = interval.unwrap_or(DEFAULT_CUSTOM_INTERVAL);
        if interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "spinner interval must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            frames,
            interval,
            index: 0,
        })
    }

    /// Advance one step and return the glyph at the new position
    pub fn next(&mut self) -> &str {
        self.index = (self.index + 1) % self.frames.len();
        &self.frames[self.index]
    }

    /// Delay between animation-driven frames
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of glyphs in the cycle
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; construction rejects empty tables
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::from_style(SpinnerStyle::default())
    }
}
