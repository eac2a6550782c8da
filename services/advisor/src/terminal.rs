//! Line-oriented terminal rendering of the display surface, plus line input.

use advisor_core::{Banner, DisplaySurface};
use std::fmt;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::warn;

/// Writes pages, banners, and the typed answer to any `Write` sink.
///
/// The answer region is a single growing line: a replacement that extends
/// what is already shown only prints the new suffix, anything else starts a
/// fresh line. Any other output closes the region.
pub struct TerminalSurface<W: Write + Send> {
    out: W,
    answer: String,
    ask_enabled: bool,
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            answer: String::new(),
            ask_enabled: false,
        }
    }

    pub fn ask_enabled(&self) -> bool {
        self.ask_enabled
    }

    /// Shows an input prompt without a trailing newline.
    pub fn prompt(&mut self, label: &str) {
        self.close_answer();
        self.emit(format_args!("{label} "));
    }

    /// Prints a numbered listing of picker options.
    pub fn options(&mut self, options: &[String]) {
        self.close_answer();
        for (i, option) in options.iter().enumerate() {
            self.emit(format_args!("{:>4}. {}\n", i + 1, option));
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn close_answer(&mut self) {
        if !self.answer.is_empty() {
            self.answer.clear();
            self.emit(format_args!("\n"));
        }
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args).and_then(|_| self.out.flush()) {
            warn!(error = %e, "Failed to write to terminal");
        }
    }
}

impl<W: Write + Send> DisplaySurface for TerminalSurface<W> {
    fn title(&mut self, title: &str) {
        self.close_answer();
        let rule = "=".repeat(title.chars().count());
        self.emit(format_args!("\n{title}\n{rule}\n"));
    }

    fn text(&mut self, text: &str) {
        self.close_answer();
        self.emit(format_args!("{text}\n"));
    }

    fn banner(&mut self, banner: Banner) {
        self.close_answer();
        match banner {
            Banner::Success(message) => self.emit(format_args!("[ok] {message}\n")),
            Banner::Error(message) => self.emit(format_args!("[error] {message}\n")),
        }
    }

    fn progress(&mut self, message: &str) {
        self.close_answer();
        self.emit(format_args!("... {message}\n"));
    }

    fn set_ask_enabled(&mut self, enabled: bool) {
        self.ask_enabled = enabled;
    }

    fn replace_answer(&mut self, content: &str) {
        if let Some(suffix) = content
            .strip_prefix(self.answer.as_str())
            .filter(|_| !self.answer.is_empty())
        {
            let suffix = suffix.to_string();
            self.emit(format_args!("{suffix}"));
        } else {
            self.close_answer();
            self.emit(format_args!("{content}"));
        }
        self.answer = content.to_string();
    }
}

/// Reads trimmed lines from an async reader. `None` means end of input.
pub struct LineInput<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    pub async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim_end_matches('\r').to_string()))
    }
}
