//! Frame Renderer
//!
//! Turns a registry snapshot and the current spinner glyph into the text block
//! shown on screen, prefixed with the sequence that erases the previous block.
//!
//! ```text
//!  ✖ Download S3 file - Network error      <- settled, settlement order
//!  ✔ Start EC2 instance
//!                                           <- only when both groups exist
//!  ⠹ Query database                         <- pending, registration order
//! ```

use std::fmt;
use std::sync::Arc;

use crate::registry::{RegistrySnapshot, Task, TaskStatus};
use crate::term::{erase_lines, AnsiDecorator, Decorator, Symbols, Tag};

/// One rendered snapshot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Erases the previously displayed block
    pub erase: String,
    /// The block itself, always newline-terminated
    pub text: String,
    /// Lines in `text`, used to size the next erase
    pub line_count: usize,
}

impl Frame {
    /// Bytes to write: erase sequence followed by the block
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.erase.len() + self.text.len());
        bytes.extend_from_slice(self.erase.as_bytes());
        bytes.extend_from_slice(self.text.as_bytes());
        bytes
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.erase, self.text)
    }
}

/// Stateless renderer; the caller carries the previous line count
#[derive(Clone)]
pub struct FrameRenderer {
    decorator: Arc<dyn Decorator>,
    symbols: Symbols,
}

impl FrameRenderer {
    /// Create a renderer with the given decoration and symbols
    #[must_use]
    pub fn new(decorator: Arc<dyn Decorator>, symbols: Symbols) -> Self {
        Self { decorator, symbols }
    }

    /// Render `snapshot`, erasing `prev_line_count` lines first
    #[must_use]
    pub fn render(
        &self,
        snapshot: &RegistrySnapshot,
        glyph: &str,
        prev_line_count: usize,
    ) -> Frame {
        let settled: Vec<String> = snapshot
            .settled
            .iter()
            .map(|task| self.settled_line(task, glyph))
            .collect();

        let pending: Vec<String> = snapshot
            .pending
            .iter()
            .map(|task| {
                self.decorator
                    .decorate(&format!(" {glyph} {}", task.name), Tag::Pending)
            })
            .collect();

        let separator = if settled.is_empty() || pending.is_empty() {
            ""
        } else {
            "\n\n"
        };

        let mut text = settled.join("\n");
        text.push_str(separator);
        text.push_str(&pending.join("\n"));
        text.push('\n');

        let line_count = text.matches('\n').count();

        Frame {
            erase: erase_lines(prev_line_count),
            text,
            line_count,
        }
    }

    fn settled_line(&self, task: &Task, glyph: &str) -> String {
        match &task.status {
            TaskStatus::Succeeded => self.decorator.decorate(
                &format!(" {} {}", self.symbols.tick, task.name),
                Tag::Success,
            ),
            TaskStatus::Failed { reason } => self.decorator.decorate(
                &format!(" {} {} - {reason}", self.symbols.cross, task.name),
                Tag::Failure,
            ),
            // Never claim an outcome that wasn't reported
            TaskStatus::Pending => self
                .decorator
                .decorate(&format!(" {glyph} {}", task.name), Tag::Pending),
        }
    }
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new(Arc::new(AnsiDecorator), Symbols::default())
    }
}

impl fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("symbols", &self.symbols)
            .finish_non_exhaustive()
    }
}
