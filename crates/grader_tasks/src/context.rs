//! Shared state handed to every task.

use grader_runner::{CommandRunner, CommandSpec, ExecutionResult, RunConfig};
use tracing::debug;

use crate::config::TaskConfig;
use crate::error::TaskResult;

/// The runner and configuration a task executes with.
#[derive(Clone, Copy)]
pub struct TaskContext<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a TaskConfig,
}

impl<'a> TaskContext<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a TaskConfig) -> Self {
        Self { runner, config }
    }

    pub fn runner(&self) -> &'a dyn CommandRunner {
        self.runner
    }

    pub fn config(&self) -> &'a TaskConfig {
        self.config
    }

    /// Run a command and require a zero exit code.
    pub fn run(&self, spec: &CommandSpec, run_config: &RunConfig) -> TaskResult<ExecutionResult> {
        debug!("Running `{}`", spec);
        let result = self.runner.run(spec, run_config)?.into_checked()?;
        debug!("`{}` finished in {}ms", result.command, result.duration_ms);
        Ok(result)
    }
}
