//! Setup command - Install the tools the other tasks need.

use anyhow::Result;
use clap::Args;
use tracing::info;

use grader_tasks::{run_setup, SetupOptions, StepOutcome};

use super::Session;

#[derive(Args)]
pub struct SetupArgs {
    /// Run every step, even when its tool is already installed
    #[arg(long)]
    force: bool,
}

pub fn execute(args: SetupArgs, session: &Session) -> Result<()> {
    let ctx = session.context();
    let mut reporter = session.reporter();

    let outcomes = run_setup(&ctx, &mut reporter, SetupOptions { force: args.force })?;

    let skipped = outcomes
        .iter()
        .filter(|o| **o == StepOutcome::Skipped)
        .count();
    info!(
        "Setup finished: {} step(s) run, {} skipped",
        outcomes.len() - skipped,
        skipped
    );
    Ok(())
}
