//! Analyse command - Count lines of code in a source package.

use anyhow::Result;
use clap::Args;

use grader_tasks::{analyse, AnalyseOptions};

use super::Session;

#[derive(Args)]
pub struct AnalyseArgs {
    /// Source file or package handed to cloc
    package: Option<String>,

    /// Do not run the setup steps first
    #[arg(long)]
    skip_setup: bool,
}

pub fn execute(args: AnalyseArgs, session: &Session) -> Result<()> {
    let ctx = session.context();
    let mut reporter = session.reporter();

    let options = AnalyseOptions {
        package: args.package.unwrap_or_default(),
        skip_setup: args.skip_setup,
    };
    analyse(&ctx, &mut reporter, &options)?;
    Ok(())
}
