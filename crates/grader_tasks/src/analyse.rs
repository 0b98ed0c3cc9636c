//! The `analyse` task: count lines of a source package.

use std::io::Write;

use grader_core::{Completion, Reporter};
use grader_runner::RunConfig;
use tracing::info;

use crate::context::TaskContext;
use crate::error::TaskResult;
use crate::setup::{run_setup, SetupOptions};

pub const ANALYSE_LABEL: &str = "Analysing the source package:";

#[derive(Debug, Clone, Default)]
pub struct AnalyseOptions {
    /// File or directory handed to the line counter; empty means none.
    pub package: String,
    pub skip_setup: bool,
}

/// Run the line counter on `options.package` and print its report verbatim.
///
/// Returns the captured report. Lines the tool wrote to stderr turn the
/// outcome into a warning.
pub fn analyse<W: Write>(
    ctx: &TaskContext<'_>,
    reporter: &mut Reporter<W>,
    options: &AnalyseOptions,
) -> TaskResult<String> {
    reporter.introduce(ANALYSE_LABEL, |reporter| -> TaskResult<Completion<String>> {
        if !options.skip_setup {
            run_setup(ctx, reporter, SetupOptions::default())?;
        }

        let analyse = &ctx.config().analyse;
        let spec = analyse.command(&options.package);
        info!("Analysing package '{}'", options.package);
        let result = ctx.run(&spec, &RunConfig::default().timeout(analyse.timeout_seconds))?;

        reporter.raw(&result.stdout);
        let warnings = result.stderr_lines();
        Ok(Completion::from_warnings(result.stdout, warnings))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskConfig;
    use grader_core::OutputStyle;
    use grader_runner::{MockResponse, MockRunner};

    #[test]
    fn test_skip_setup_runs_only_cloc() {
        let runner = MockRunner::new().add_response(MockResponse::success("<results/>\n"));
        let config = TaskConfig::default();
        let ctx = TaskContext::new(&runner, &config);
        let mut reporter = Reporter::new(Vec::new(), OutputStyle::plain());

        let options = AnalyseOptions {
            package: "lib".to_string(),
            skip_setup: true,
        };
        let report = analyse(&ctx, &mut reporter, &options).unwrap();

        assert_eq!(report, "<results/>\n");
        assert_eq!(runner.commands(), vec![vec!["cloc", "--xml", "lib"]]);
    }

    #[test]
    fn test_stderr_becomes_warning() {
        let runner = MockRunner::new()
            .add_response(MockResponse::success("<results/>").with_stderr("1 file ignored.\n"));
        let config = TaskConfig::default();
        let ctx = TaskContext::new(&runner, &config);
        let mut reporter = Reporter::new(Vec::new(), OutputStyle::plain());

        let options = AnalyseOptions {
            package: String::new(),
            skip_setup: true,
        };
        analyse(&ctx, &mut reporter, &options).unwrap();

        assert_eq!(runner.commands(), vec![vec!["cloc", "--xml"]]);
        let printed = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(printed.contains("  NOTE    1 file ignored."));
        assert!(printed.contains(" WARNING  Analysing the source package: "));
    }
}
