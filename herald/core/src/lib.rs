//! Herald Core - Live Terminal Progress for Concurrent Async Tasks
//!
//! Register named tasks backed by futures, and herald redraws a compact block
//! on the terminal: settled tasks first (in the order they settled, with a
//! check or cross mark), then a blank line, then every pending task behind a
//! spinner glyph. The output is pull-driven; frames are only produced when
//! the consumer asks for one, never faster than the spinner interval.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Reporter                             │
//! │   add() / register()        close()         frames() / pipe()│
//! └──────┬──────────────────────────┬─────────────────┬──────────┘
//!        │ Settler                  │                 │
//!        ▼                          ▼                 ▼
//! ┌──────────────┐  snapshot  ┌─────────────┐   ┌──────────────┐
//! │ TaskRegistry │◀───────────│ FrameStream │──▶│ FrameRenderer│
//! │ pending      │            │ tick timer  │   │ + Decorator  │
//! │ settled      │            │ Spinner     │   │ + Symbols    │
//! └──────────────┘            └──────┬──────┘   └──────────────┘
//!                                    │ Frame { erase, text }
//!                                    ▼
//!                              consumer / writer
//! ```
//!
//! # Key Types
//!
//! - [`Reporter`]: Session handle; register tasks, close, take the output
//! - [`TaskRegistry`]: Pending and settled tasks plus the closed flag
//! - [`FrameStream`]: Pull-driven stream of rendered frames
//! - [`FrameRenderer`]: Pure snapshot-to-text rendering
//! - [`Spinner`]: Cycling glyph sequence and its tick interval
//!
//! # Quick Start
//!
//! ```ignore
//! use herald_core::Reporter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), herald_core::ReporterError> {
//!     let reporter = Reporter::default();
//!
//!     reporter.add("Query database", async { Ok::<_, String>(()) })?;
//!     reporter.add("Download S3 file", async { Err::<(), _>("Network error") })?;
//!     reporter.close();
//!
//!     reporter.pipe(tokio::io::stderr()).await
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod emitter;
pub mod error;
pub mod registry;
pub mod render;
pub mod reporter;
pub mod spinner;
pub mod term;

// Re-exports for convenience
pub use emitter::FrameStream;
pub use error::{ReporterError, Result, SubscriptionFault};
pub use registry::{Outcome, RegistrySnapshot, Settler, Task, TaskId, TaskRegistry, TaskStatus};
pub use render::{Frame, FrameRenderer};
pub use reporter::{Reporter, TaskHandle};
pub use spinner::{Spinner, SpinnerStyle};

// Terminal exports
pub use term::{erase_lines, AnsiDecorator, Decorator, PlainDecorator, Symbols, Tag};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, HeraldToml, ReporterConfig,
};
