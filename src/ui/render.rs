//! Rendering contract and the default terminal renderer.
//!
//! Assistant messages go to stdout; prompts, status and diagnostics go to
//! stderr so piped output only carries what the assistant said.

use crossterm::style::{Color, Stylize};
use std::io::{self, Write};

const LABEL_ASSISTANT: &str = "AI:";
const LABEL_WARNING: &str = "warning:";
const LABEL_ERROR: &str = "error:";
const GLYPH_SECTION: &str = "•";
const GLYPH_APPROVAL_BAR: &str = "│";
const INDENT: &str = "  ";

/// Injectable rendering interface used by the session.
///
/// Tests substitute a recording sink without coupling to the terminal.
pub trait RenderSink: Send + Sync {
    /// Render an input prompt such as `You: ` without a trailing newline.
    fn prompt(&self, label: &str);
    /// Render one assistant message destined for stdout.
    fn assistant_message(&self, content: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
    /// Render a titled section header.
    fn section(&self, title: &str);
    /// Render one key/value row under a section.
    fn field(&self, key: &str, value: &str);
    /// Render an indented detail line.
    fn detail(&self, text: &str);
    /// Render the description of an action awaiting approval.
    fn approval_block(&self, text: &str);
}

/// Writes styled output with crossterm.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn color(&self) -> bool {
        self.color
    }
}

impl RenderSink for Renderer {
    fn prompt(&self, label: &str) {
        if self.color {
            eprint!("\n{}", label.with(Color::Green).bold());
        } else {
            eprint!("\n{label}");
        }
        let _ = io::stderr().flush();
    }

    fn assistant_message(&self, content: &str) {
        let mut out = io::stdout().lock();
        let result = if self.color {
            writeln!(
                out,
                "\n{} {}",
                LABEL_ASSISTANT.with(Color::Cyan).bold(),
                content.trim_end()
            )
        } else {
            writeln!(out, "\n{LABEL_ASSISTANT} {}", content.trim_end())
        };
        // A closed stdout is not worth aborting the session over.
        let _ = result.and_then(|()| out.flush());
    }

    fn warn(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", LABEL_WARNING.with(Color::Yellow).bold());
        } else {
            eprintln!("{LABEL_WARNING} {msg}");
        }
    }

    fn error(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", LABEL_ERROR.with(Color::Red).bold());
        } else {
            eprintln!("{LABEL_ERROR} {msg}");
        }
    }

    fn section(&self, title: &str) {
        if self.color {
            eprintln!(
                "{} {}",
                GLYPH_SECTION.with(Color::DarkGrey),
                title.with(Color::White).bold()
            );
        } else {
            eprintln!("{title}:");
        }
    }

    fn field(&self, key: &str, value: &str) {
        if self.color {
            eprintln!(
                "{INDENT}{} {}",
                format!("{key}:").with(Color::DarkGrey),
                value.with(Color::White)
            );
        } else {
            eprintln!("{INDENT}{key}: {value}");
        }
    }

    fn detail(&self, text: &str) {
        if self.color {
            eprintln!("{INDENT}{}", text.with(Color::Grey));
        } else {
            eprintln!("{INDENT}{text}");
        }
    }

    fn approval_block(&self, text: &str) {
        eprintln!();
        for line in text.lines() {
            if self.color {
                eprintln!(
                    "{} {}",
                    GLYPH_APPROVAL_BAR.with(Color::Yellow),
                    line.with(Color::Yellow)
                );
            } else {
                eprintln!("{GLYPH_APPROVAL_BAR} {line}");
            }
        }
    }
}
