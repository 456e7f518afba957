//! Terminal rendering of diagnostics.

use crate::{Diagnostic, Severity};
use ced_ir::Span;
use std::io::{self, Write};

/// ANSI color codes.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m";
    pub const WARNING: &str = "\x1b[1;33m";
    pub const NOTE: &str = "\x1b[1;36m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
}

/// Color output mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Use colors when the output is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Sink for rendered diagnostics.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);
    fn flush(&mut self);
}

/// Human-readable emitter with optional source snippets.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
    source: Option<String>,
    file_path: Option<String>,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            source: None,
            file_path: None,
        }
    }

    /// Attach the translation unit's source for snippet rendering.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    fn color(&self, code: &'static str) -> &'static str {
        if self.colors {
            code
        } else {
            ""
        }
    }

    fn severity_color(&self, severity: Severity) -> &'static str {
        match severity {
            Severity::Error => self.color(colors::ERROR),
            Severity::Warning => self.color(colors::WARNING),
            Severity::Note => self.color(colors::NOTE),
        }
    }

    fn render(&mut self, diag: &Diagnostic) -> io::Result<()> {
        let sev = self.severity_color(diag.severity);
        let bold = self.color(colors::BOLD);
        let reset = self.color(colors::RESET);

        writeln!(
            self.writer,
            "{sev}{}[{}]{reset}{bold}: {}{reset}",
            diag.severity, diag.code, diag.message
        )?;

        for label in &diag.labels {
            self.render_label(label.span, &label.message)?;
        }

        for note in &diag.notes {
            let note_color = self.color(colors::NOTE);
            writeln!(self.writer, "  {note_color}note{reset}: {note}")?;
        }
        Ok(())
    }

    fn render_label(&mut self, span: Span, message: &str) -> io::Result<()> {
        let Some(source) = self.source.clone() else {
            let reset = self.color(colors::RESET);
            let bold = self.color(colors::BOLD);
            return writeln!(
                self.writer,
                "  {bold}-->{reset} offset {}: {message}",
                span.start
            );
        };

        let (line_no, col_no, line_text) = locate(&source, span.start);
        let path = self.file_path.as_deref().unwrap_or("<input>");
        let bold = self.color(colors::BOLD);
        let reset = self.color(colors::RESET);

        writeln!(
            self.writer,
            "  {bold}-->{reset} {path}:{line_no}:{col_no}"
        )?;
        writeln!(self.writer, "   |")?;
        writeln!(self.writer, "{line_no:>3}| {line_text}")?;

        // Underline width and padding are measured in characters, matching
        // the column, so multibyte lines keep the caret aligned.
        let start = (span.start as usize).min(source.len());
        let end = (span.end as usize).min(source.len());
        let span_chars = source
            .get(start..end)
            .map_or(0, |text| text.chars().take_while(|c| *c != '\n').count());
        let line_chars = line_text.chars().count();
        let width = span_chars.clamp(1, line_chars.saturating_sub(col_no - 1).max(1));
        let sev = self.color(colors::ERROR);
        writeln!(
            self.writer,
            "   | {}{sev}{}{reset} {message}",
            " ".repeat(col_no - 1),
            "^".repeat(width)
        )?;
        Ok(())
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        // Rendering failure (closed pipe) is not worth surfacing.
        let _ = self.render(diagnostic);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

/// 1-based line and column of `offset`, plus the text of its line. The
/// column counts characters, not bytes.
fn locate(source: &str, offset: u32) -> (usize, usize, String) {
    let offset = (offset as usize).min(source.len());
    let before = &source[..offset];
    let line_no = before.bytes().filter(|&b| b == b'\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let col_no = source[line_start..offset].chars().count() + 1;
    let line_end = source[line_start..]
        .find('\n')
        .map_or(source.len(), |i| line_start + i);
    (line_no, col_no, source[line_start..line_end].to_owned())
}
