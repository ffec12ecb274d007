//! Rendering and aggregating dispatch reports
//!
//! The engine never prints. A [`Reporter`] receives finished
//! [`DispatchReport`]s and renders them; [`Summary`] folds any number of
//! reports into pass/fail counts.

use std::io::{self, Write};

use serde::Serialize;

use crate::dispatch::{DispatchEntry, DispatchReport, OutcomeRecord};

/// Consumes dispatch reports
pub trait Reporter {
    /// Render one report
    fn report(&mut self, report: &DispatchReport) -> io::Result<()>;

    /// Called once after the last report
    fn finish(&mut self, _summary: &Summary) -> io::Result<()> {
        Ok(())
    }
}

/// Pass/fail counts over one or more reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Outcomes with a true verdict
    pub passed: usize,
    /// Outcomes with a false verdict
    pub failed: usize,
    /// Elements that could not be checked
    pub errors: usize,
    /// Reports cut short by fail-fast
    pub incomplete: usize,
}

impl Summary {
    /// Summarize a single report
    pub fn of(report: &DispatchReport) -> Self {
        let mut summary = Self::default();
        summary.add(report);
        summary
    }

    /// Fold a report into the counts
    pub fn add(&mut self, report: &DispatchReport) {
        for entry in &report.entries {
            match entry {
                DispatchEntry::Outcome(record) if record.verdict => self.passed += 1,
                DispatchEntry::Outcome(_) => self.failed += 1,
                DispatchEntry::Failed(_) => self.errors += 1,
            }
        }
        if !report.completed {
            self.incomplete += 1;
        }
    }

    /// Total number of entries seen
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errors
    }

    /// True when nothing failed, errored or was cut short
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0 && self.incomplete == 0
    }
}

// ============================================================================
// Plain text
// ============================================================================

/// Line-oriented plain text renderer
pub struct TextReporter<W: Write> {
    out: W,
}

impl<W: Write> TextReporter<W> {
    /// Render into `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Get the writer back
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// One-line description of an outcome, shared by the text renderers
pub fn describe_outcome(record: &OutcomeRecord) -> String {
    let mut line = format!(
        "{} {}: expected {}, got {} ({})",
        record.kind, record.element, record.expected, record.actual, record.value
    );
    if let Some(diagnostic) = &record.diagnostic {
        line.push_str(" - ");
        line.push_str(diagnostic);
    }
    line
}

impl<W: Write> Reporter for TextReporter<W> {
    fn report(&mut self, report: &DispatchReport) -> io::Result<()> {
        writeln!(self.out, "{}", report.class)?;
        if report.is_empty() {
            writeln!(self.out, "  (no annotated elements)")?;
        }
        for entry in &report.entries {
            match entry {
                DispatchEntry::Outcome(record) => {
                    let badge = if record.verdict { "PASS" } else { "FAIL" };
                    writeln!(self.out, "  {} {}", badge, describe_outcome(record))?;
                }
                DispatchEntry::Failed(failure) => {
                    writeln!(self.out, "  ERR  {}", failure.error)?;
                }
            }
        }
        if !report.completed {
            writeln!(self.out, "  (stopped after first error)")?;
        }
        Ok(())
    }

    fn finish(&mut self, summary: &Summary) -> io::Result<()> {
        writeln!(
            self.out,
            "{} passed, {} failed, {} errors",
            summary.passed, summary.failed, summary.errors
        )
    }
}

// ============================================================================
// JSON
// ============================================================================

/// Writes one JSON document per report, then the summary
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    /// Render into `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Get the writer back
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// JSON form of a report
pub fn report_to_json(report: &DispatchReport) -> serde_json::Value {
    let entries: Vec<serde_json::Value> = report
        .entries
        .iter()
        .map(|entry| match entry {
            DispatchEntry::Outcome(record) => {
                let status = if record.verdict { "pass" } else { "fail" };
                serde_json::json!({ "status": status, "outcome": record })
            }
            DispatchEntry::Failed(failure) => serde_json::json!({
                "status": "error",
                "element": failure.element,
                "error": {
                    "kind": failure.error.kind(),
                    "message": failure.error.to_string(),
                },
            }),
        })
        .collect();

    serde_json::json!({
        "class": report.class,
        "completed": report.completed,
        "entries": entries,
    })
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, report: &DispatchReport) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, &report_to_json(report))?;
        writeln!(self.out)
    }

    fn finish(&mut self, summary: &Summary) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, &serde_json::json!({ "summary": summary }))?;
        writeln!(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ElementFailure;
    use crate::error::DispatchError;
    use crate::reflect::{AnnotationKind, ElementKind};
    use crate::value::Value;

    fn record(element: &str, verdict: bool) -> OutcomeRecord {
        OutcomeRecord {
            element: element.to_string(),
            kind: ElementKind::Method,
            annotation: AnnotationKind::ExpectedType,
            expected: "string".to_string(),
            value: if verdict { Value::from("hi") } else { Value::Int(42) },
            actual: if verdict { "string" } else { "int" }.to_string(),
            verdict,
            diagnostic: None,
        }
    }

    fn mixed_report() -> DispatchReport {
        DispatchReport {
            class: "Greeter".to_string(),
            entries: vec![
                DispatchEntry::Outcome(record("message", true)),
                DispatchEntry::Outcome(record("number", false)),
                DispatchEntry::Failed(ElementFailure {
                    element: "broken".to_string(),
                    error: DispatchError::ElementExecution {
                        element: "broken".to_string(),
                        message: "disk on fire".to_string(),
                    },
                }),
            ],
            completed: true,
        }
    }

    #[test]
    fn test_summary() {
        let summary = Summary::of(&mixed_report());
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.total(), 3);
        assert!(!summary.is_success());
        assert!(Summary::default().is_success());
    }

    #[test]
    fn test_summary_counts_incomplete() {
        let mut report = mixed_report();
        report.entries.truncate(1);
        report.completed = false;
        let summary = Summary::of(&report);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.incomplete, 1);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_text_reporter() {
        let report = mixed_report();
        let mut reporter = TextReporter::new(Vec::new());
        reporter.report(&report).unwrap();
        reporter.finish(&Summary::of(&report)).unwrap();
        let text = String::from_utf8(reporter.into_inner()).unwrap();

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Greeter");
        assert_eq!(
            lines[1],
            "  PASS method message: expected string, got string (\"hi\")"
        );
        assert_eq!(lines[2], "  FAIL method number: expected string, got int (42)");
        assert_eq!(
            lines[3],
            "  ERR  Element 'broken' failed during execution: disk on fire"
        );
        assert_eq!(lines[4], "1 passed, 1 failed, 1 errors");
    }

    #[test]
    fn test_text_reporter_empty() {
        let report = DispatchReport {
            class: "Plain".to_string(),
            entries: Vec::new(),
            completed: true,
        };
        let mut reporter = TextReporter::new(Vec::new());
        reporter.report(&report).unwrap();
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(text, "Plain\n  (no annotated elements)\n");
    }

    #[test]
    fn test_describe_outcome_with_diagnostic() {
        let mut r = record("age", false);
        r.diagnostic = Some("Type mismatch: expected number, got null".to_string());
        assert!(describe_outcome(&r).ends_with(" - Type mismatch: expected number, got null"));
    }

    #[test]
    fn test_json_reporter() {
        let report = mixed_report();
        let json = report_to_json(&report);
        assert_eq!(json["class"], "Greeter");
        assert_eq!(json["entries"][0]["status"], "pass");
        assert_eq!(json["entries"][0]["outcome"]["element"], "message");
        assert_eq!(json["entries"][0]["outcome"]["kind"], "method");
        assert_eq!(json["entries"][0]["outcome"]["annotation"], "expected-type");
        assert_eq!(json["entries"][1]["outcome"]["value"], 42);
        assert_eq!(json["entries"][2]["status"], "error");
        assert_eq!(json["entries"][2]["error"]["kind"], "element_execution");

        let mut reporter = JsonReporter::new(Vec::new());
        reporter.report(&report).unwrap();
        reporter.finish(&Summary::of(&report)).unwrap();
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let summary: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(summary["summary"]["passed"], 1);
    }
}
