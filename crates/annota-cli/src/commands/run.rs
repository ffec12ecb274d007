//! `annota run`: dispatch over the demo targets and report.

use std::io;
use std::panic;
use std::path::PathBuf;

use annota_engine::{
    DispatchEngine, DispatchOptions, DispatchReport, JsonReporter, Reporter, Summary,
};
use anyhow::Context;
use clap::ValueEnum;

use crate::demos::{self, Demo};
use crate::output::{self, ConsoleReporter, StyledOutput};

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Colored, human-readable
    Text,
    /// One JSON document per line
    Json,
}

/// Arguments for the run command.
pub struct RunArgs {
    pub demo: Demo,
    pub format: Format,
    pub config: Option<PathBuf>,
    pub color: String,
}

pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    let options = match &args.config {
        Some(path) => DispatchOptions::from_file(path)
            .with_context(|| format!("failed to load options from {}", path.display()))?,
        None => DispatchOptions::default(),
    };
    tracing::debug!(?options, "dispatch options");

    let engine = DispatchEngine::new(options);
    let run = || demos::run(&engine, args.demo);
    let reports = if engine.options().dispatch.catch_panics {
        with_quiet_panics(run)
    } else {
        run()
    }
    .context("invalid demo class definition")?;

    let summary = match args.format {
        Format::Json => {
            let stdout = io::stdout();
            emit(&mut JsonReporter::new(stdout.lock()), &reports)?
        }
        Format::Text => {
            let choice = output::resolve_color_choice(Some(&args.color));
            emit(&mut ConsoleReporter::new(StyledOutput::stdout(choice)), &reports)?
        }
    };

    if !summary.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

/// Run `f` with a panic hook that logs at debug level instead of printing
///
/// Only used while every panic is caught by the engine and recorded in the
/// report. The previous hook is restored afterwards.
fn with_quiet_panics<R>(f: impl FnOnce() -> R) -> R {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|info| {
        tracing::debug!(%info, "panic recorded in dispatch report");
    }));
    let result = f();
    panic::set_hook(previous);
    result
}

/// Feed every report to `reporter` and return the summary
fn emit(reporter: &mut dyn Reporter, reports: &[DispatchReport]) -> io::Result<Summary> {
    let mut summary = Summary::default();
    for report in reports {
        reporter.report(report)?;
        summary.add(report);
    }
    reporter.finish(&summary)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use annota_engine::TextReporter;

    #[test]
    fn test_emit_summarizes_all_reports() {
        let reports = demos::run(&DispatchEngine::default(), Demo::All).unwrap();
        let mut reporter = TextReporter::new(Vec::new());
        let summary = emit(&mut reporter, &reports).unwrap();

        assert_eq!(summary.passed, 5);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.errors, 0);
        assert!(!summary.is_success());

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.ends_with("5 passed, 3 failed, 0 errors\n"));
    }

    #[test]
    fn test_quiet_panics_returns_result() {
        let value = with_quiet_panics(|| {
            let caught = panic::catch_unwind(|| -> i32 { panic!("recorded") });
            assert!(caught.is_err());
            7
        });
        assert_eq!(value, 7);
    }

    #[test]
    fn test_options_file_changes_engine() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dispatch]\nfail_fast = true").unwrap();
        let options = DispatchOptions::from_file(file.path()).unwrap();
        assert!(DispatchEngine::new(options).options().dispatch.fail_fast);
    }
}
