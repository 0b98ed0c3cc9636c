//! The `setup` task: install the tools the other tasks need.

use std::io::Write;

use grader_core::{Completion, Reporter};
use grader_runner::RunConfig;
use tracing::info;

use crate::config::SetupStep;
use crate::context::TaskContext;
use crate::error::TaskResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct SetupOptions {
    /// Run steps even when their check program is already installed.
    pub force: bool,
}

/// What happened to one setup step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Ran,
    Skipped,
}

/// Run every configured step in its own bracket, stopping at the first failure.
pub fn run_setup<W: Write>(
    ctx: &TaskContext<'_>,
    reporter: &mut Reporter<W>,
    options: SetupOptions,
) -> TaskResult<Vec<StepOutcome>> {
    let steps = &ctx.config().setup;
    info!("Running {} setup step(s)", steps.len());

    let mut outcomes = Vec::with_capacity(steps.len());
    for step in steps {
        let outcome = reporter.introduce(&step.label, |_| run_step(ctx, step, options))?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn run_step(
    ctx: &TaskContext<'_>,
    step: &SetupStep,
    options: SetupOptions,
) -> TaskResult<Completion<StepOutcome>> {
    if !options.force {
        if let Some(program) = step.check.as_deref() {
            if ctx.runner().is_available(program) {
                info!("{} is already installed", program);
                return Ok(Completion::warned(
                    StepOutcome::Skipped,
                    [format!("{} already installed, skipped", program)],
                ));
            }
        }
    }

    let spec = step.command_spec()?;
    let run_config = RunConfig::default()
        .timeout(step.timeout_seconds)
        .stream_logs(step.stream_output);
    ctx.run(&spec, &run_config)?;
    Ok(Completion::clean(StepOutcome::Ran))
}
