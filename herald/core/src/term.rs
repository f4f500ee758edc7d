//! Terminal Collaborators
//!
//! The bits of terminal knowledge the renderer needs: status symbols, color
//! decoration and the control sequence that erases a previously drawn block.
//! All of them are pure string transforms; nothing here touches a tty.

use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::style::{style, Color, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::Command;

/// Semantic tag attached to a rendered line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Settled successfully
    Success,
    /// Settled with a failure
    Failure,
    /// Still waiting
    Pending,
}

/// Decorates text according to its tag
pub trait Decorator: Send + Sync {
    /// Return `text` decorated for `tag`
    fn decorate(&self, text: &str, tag: Tag) -> String;
}

/// ANSI colors: green success, red failure, cyan pending
#[derive(Clone, Copy, Debug, Default)]
pub struct AnsiDecorator;

impl Decorator for AnsiDecorator {
    fn decorate(&self, text: &str, tag: Tag) -> String {
        let color = match tag {
            Tag::Success => Color::Green,
            Tag::Failure => Color::Red,
            Tag::Pending => Color::Cyan,
        };
        style(text).with(color).to_string()
    }
}

/// Leaves text untouched (`NO_COLOR`, pipes, tests)
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainDecorator;

impl Decorator for PlainDecorator {
    fn decorate(&self, text: &str, _tag: Tag) -> String {
        text.to_string()
    }
}

/// Markers for settled lines
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Symbols {
    /// Success marker
    pub tick: &'static str,
    /// Failure marker
    pub cross: &'static str,
}

impl Symbols {
    /// Heavy check and cross marks
    pub const UNICODE: Self = Self {
        tick: "✔",
        cross: "✖",
    };

    /// Fallback for consoles with poor glyph coverage
    pub const FALLBACK: Self = Self {
        tick: "√",
        cross: "×",
    };
}

impl Default for Symbols {
    fn default() -> Self {
        if cfg!(windows) {
            Self::FALLBACK
        } else {
            Self::UNICODE
        }
    }
}

/// Control sequence erasing the `line_count` lines above the cursor
///
/// Expects the cursor on the row just below the block, which is where it is
/// left after writing newline-terminated text. The cursor ends up at column 0
/// of the block's first row. Zero lines erase nothing.
#[must_use]
pub fn erase_lines(line_count: usize) -> String {
    let mut out = String::new();
    if line_count == 0 {
        return out;
    }

    push_ansi(&mut out, MoveToColumn(0));
    push_ansi(&mut out, Clear(ClearType::CurrentLine));
    for _ in 0..line_count {
        push_ansi(&mut out, MoveUp(1));
        push_ansi(&mut out, Clear(ClearType::CurrentLine));
    }
    out
}

fn push_ansi(out: &mut String, command: impl Command) {
    // Formatting into a String is infallible
    let _ = command.write_ansi(out);
}

/// Strip ANSI escape sequences, leaving printable text
#[cfg(test)]
pub(crate) fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            // CSI parameters run until a final byte in '@'..='~'
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erase_zero_lines_is_empty() {
        assert_eq!(erase_lines(0), "");
    }

    #[test]
    fn test_erase_clears_each_line_and_the_cursor_row() {
        let seq = erase_lines(3);
        assert_eq!(seq.matches("\u{1b}[2K").count(), 4);
        assert_eq!(seq.matches("\u{1b}[1A").count(), 3);
        assert!(seq.starts_with("\u{1b}[1G"));
        assert_eq!(strip_ansi(&seq), "");
    }

    #[test]
    fn test_plain_decorator_is_identity() {
        assert_eq!(PlainDecorator.decorate(" ✔ A", Tag::Success), " ✔ A");
    }

    #[test]
    fn test_ansi_decorator_preserves_text() {
        for tag in [Tag::Success, Tag::Failure, Tag::Pending] {
            let decorated = AnsiDecorator.decorate("hello", tag);
            assert_eq!(strip_ansi(&decorated), "hello");
        }
    }

    #[test]
    fn test_strip_ansi_keeps_plain_text() {
        assert_eq!(strip_ansi("a\u{1b}[31mb\u{1b}[0mc\n"), "abc\n");
    }
}
