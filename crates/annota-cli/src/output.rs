//! Colored console output for dispatch reports.
//!
//! Uses `termcolor` for cross-platform colored terminal output.
//! Respects `NO_COLOR` environment variable and `--color` flag.

use std::io::{self, Write};

use annota_engine::{describe_outcome, DispatchEntry, DispatchReport, Reporter, Summary};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Styled output writer.
pub struct StyledOutput<W: WriteColor = StandardStream> {
    out: W,
}

impl StyledOutput<StandardStream> {
    /// Styled stdout with the given color choice.
    pub fn stdout(choice: ColorChoice) -> Self {
        Self::from_writer(StandardStream::stdout(choice))
    }
}

impl<W: WriteColor> StyledOutput<W> {
    /// Wrap any color-capable writer.
    pub fn from_writer(out: W) -> Self {
        Self { out }
    }

    /// Get the writer back.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write text with a specific color and style.
    pub fn write_styled(&mut self, text: &str, color: Option<Color>, bold: bool) -> io::Result<()> {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        self.out.set_color(&spec)?;
        write!(self.out, "{}", text)?;
        self.out.reset()
    }

    /// Green bold text.
    pub fn success(&mut self, text: &str) -> io::Result<()> {
        self.write_styled(text, Some(Color::Green), true)
    }

    /// Red bold text.
    pub fn error(&mut self, text: &str) -> io::Result<()> {
        self.write_styled(text, Some(Color::Red), true)
    }

    /// Yellow bold text.
    pub fn warning(&mut self, text: &str) -> io::Result<()> {
        self.write_styled(text, Some(Color::Yellow), true)
    }

    /// Dim/gray text.
    pub fn dim(&mut self, text: &str) -> io::Result<()> {
        self.write_styled(text, Some(Color::White), false)
    }

    /// Bold text.
    pub fn bold(&mut self, text: &str) -> io::Result<()> {
        self.write_styled(text, None, true)
    }

    /// Plain text (no color).
    pub fn plain(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{}", text)
    }

    /// Newline.
    pub fn newline(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// Flush.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn badge(&mut self, label: &str, bg: Color, fg: Color) -> io::Result<()> {
        let mut spec = ColorSpec::new();
        spec.set_bg(Some(bg)).set_fg(Some(fg)).set_bold(true);
        self.out.set_color(&spec)?;
        write!(self.out, " {} ", label)?;
        self.out.reset()
    }

    /// " PASS " badge (green background, white text).
    pub fn pass_badge(&mut self) -> io::Result<()> {
        self.badge("PASS", Color::Green, Color::White)
    }

    /// " FAIL " badge (red background, white text).
    pub fn fail_badge(&mut self) -> io::Result<()> {
        self.badge("FAIL", Color::Red, Color::White)
    }

    /// " ERR  " badge (yellow background, black text).
    pub fn err_badge(&mut self) -> io::Result<()> {
        self.badge("ERR ", Color::Yellow, Color::Black)
    }
}

// ── Console reporter ─────────────────────────────────────────────────────

/// Renders reports with badges and a colored summary.
pub struct ConsoleReporter<W: WriteColor = StandardStream> {
    out: StyledOutput<W>,
}

impl<W: WriteColor> ConsoleReporter<W> {
    pub fn new(out: StyledOutput<W>) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: WriteColor> Reporter for ConsoleReporter<W> {
    fn report(&mut self, report: &DispatchReport) -> io::Result<()> {
        self.out.bold(&report.class)?;
        self.out.newline()?;

        if report.is_empty() {
            self.out.dim("  (no annotated elements)")?;
            self.out.newline()?;
        }

        for entry in &report.entries {
            self.out.plain("  ")?;
            match entry {
                DispatchEntry::Outcome(record) => {
                    if record.verdict {
                        self.out.pass_badge()?;
                    } else {
                        self.out.fail_badge()?;
                    }
                    self.out.plain(" ")?;
                    self.out.plain(&describe_outcome(record))?;
                }
                DispatchEntry::Failed(failure) => {
                    self.out.err_badge()?;
                    self.out.plain(" ")?;
                    self.out.error(&failure.error.to_string())?;
                }
            }
            self.out.newline()?;
        }

        if !report.completed {
            self.out.warning("  stopped after first error")?;
            self.out.newline()?;
        }
        self.out.newline()
    }

    fn finish(&mut self, summary: &Summary) -> io::Result<()> {
        self.out.dim("──────────────────────────────────────────")?;
        self.out.newline()?;

        self.out.bold("Elements: ")?;
        if summary.errors > 0 {
            self.out.warning(&format!("{} errors", summary.errors))?;
            self.out.plain(", ")?;
        }
        if summary.failed > 0 {
            self.out.error(&format!("{} failed", summary.failed))?;
            self.out.plain(", ")?;
        }
        if summary.passed > 0 {
            self.out.success(&format!("{} passed", summary.passed))?;
            self.out.plain(", ")?;
        }
        self.out.bold(&format!("{} total", summary.total()))?;
        self.out.newline()?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annota_engine::{DispatchError, ElementFailure};
    use termcolor::NoColor;

    fn render(report: &DispatchReport) -> String {
        let mut reporter = ConsoleReporter::new(StyledOutput::from_writer(NoColor::new(Vec::new())));
        reporter.report(report).unwrap();
        reporter.finish(&Summary::of(report)).unwrap();
        String::from_utf8(reporter.into_inner().into_inner()).unwrap()
    }

    #[test]
    fn test_console_reporter_error_entry() {
        let report = DispatchReport {
            class: "Service".to_string(),
            entries: vec![DispatchEntry::Failed(ElementFailure {
                element: "status".to_string(),
                error: DispatchError::ElementExecution {
                    element: "status".to_string(),
                    message: "connection refused".to_string(),
                },
            })],
            completed: false,
        };

        let text = render(&report);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Service");
        assert_eq!(
            lines[1],
            "   ERR   Element 'status' failed during execution: connection refused"
        );
        assert_eq!(lines[2], "  stopped after first error");
        assert!(text.contains("Elements: 1 errors, 1 total"));
    }

    #[test]
    fn test_console_reporter_empty() {
        let report = DispatchReport {
            class: "Plain".to_string(),
            entries: Vec::new(),
            completed: true,
        };
        let text = render(&report);
        assert!(text.starts_with("Plain\n  (no annotated elements)\n"));
        assert!(text.contains("Elements: 0 total"));
    }

    #[test]
    fn test_resolve_color_choice_flag() {
        if std::env::var_os("NO_COLOR").is_some() {
            return;
        }
        assert_eq!(resolve_color_choice(Some("never")), ColorChoice::Never);
        assert_eq!(resolve_color_choice(Some("always")), ColorChoice::Always);
        assert_eq!(resolve_color_choice(None), ColorChoice::Auto);
    }
}
