//! Colored terminal output for CLI commands.
//!
//! Uses `termcolor`; colors are dropped when `NO_COLOR` is set or the stream is
//! not a terminal.

use std::io::{IsTerminal, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Writes progress, success and warning lines for a CLI run.
#[derive(Debug, Clone, Copy)]
pub struct OutputManager {
    verbose: bool,
    stdout_color: ColorChoice,
    stderr_color: ColorChoice,
}

fn color_choice(is_terminal: bool) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() || !is_terminal {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

impl OutputManager {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            stdout_color: color_choice(std::io::stdout().is_terminal()),
            stderr_color: color_choice(std::io::stderr().is_terminal()),
        }
    }

    fn write_line(
        &self,
        mut stream: StandardStream,
        prefix: &str,
        color: Option<Color>,
        bold: bool,
        message: &str,
    ) -> std::io::Result<()> {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        stream.set_color(&spec)?;
        write!(stream, "{}", prefix)?;
        stream.reset()?;
        writeln!(stream, "{}", message)
    }

    /// Bold section header.
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        let mut stream = StandardStream::stdout(self.stdout_color);
        stream.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(stream, "{}", title)?;
        stream.reset()
    }

    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.write_line(
            StandardStream::stdout(self.stdout_color),
            "→ ",
            Some(Color::Cyan),
            false,
            message,
        )
    }

    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.write_line(
            StandardStream::stdout(self.stdout_color),
            "✓ ",
            Some(Color::Green),
            true,
            message,
        )
    }

    /// Warnings go to stderr.
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.write_line(
            StandardStream::stderr(self.stderr_color),
            "warning: ",
            Some(Color::Yellow),
            true,
            message,
        )
    }

    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        let mut stream = StandardStream::stdout(self.stdout_color);
        writeln!(stream, "  {}", message)
    }

    /// Plain line, only in verbose mode.
    pub fn verbose(&self, message: &str) -> std::io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        let mut stream = StandardStream::stdout(self.stdout_color);
        stream.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(stream, "{}", message)?;
        stream.reset()
    }

    /// Plain line.
    pub fn println(&self, message: &str) -> std::io::Result<()> {
        let mut stream = StandardStream::stdout(self.stdout_color);
        writeln!(stream, "{}", message)
    }
}
