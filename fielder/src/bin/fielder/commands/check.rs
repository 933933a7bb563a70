use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use fielder::InsertionPolicy;

use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::session::{RunReport, Session};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Check Annotations",
        commands: &[
            "fielder check                        # Check the configured scan paths",
            "fielder check src/models             # Check one directory",
            "fielder check --output json src      # Machine-readable diagnostics",
        ],
    },
    ExampleGroup {
        title: "Strict Mode",
        commands: &["fielder check --deny-warnings      # Fail on skipped fields too"],
    },
];

#[derive(Args)]
pub struct CheckArgs {
    /// Files or directories to scan (defaults to the configured scan paths)
    pub paths: Vec<PathBuf>,

    /// Where synthesized fields are placed: prepend or declaration-order
    #[arg(long)]
    pub insertion: Option<InsertionPolicy>,

    /// Treat warnings as errors
    #[arg(long)]
    pub deny_warnings: bool,
}

pub fn handle_check(args: CheckArgs, config: Option<&Path>, output: &OutputManager) -> Result<()> {
    let session = Session::open(config)?;
    if let Some(path) = &session.config_path {
        output.verbose(&format!("Using {}", path.display()));
    }

    let files = session.collect_files(&args.paths)?;
    if files.is_empty() {
        output.warning("No Rust files found.");
        return Ok(());
    }
    output.verbose(&format!("Checking {} file(s)", files.len()));

    let outcomes = session.run(&files, session.policy(args.insertion))?;
    let report = RunReport::new(outcomes.into_iter().map(|outcome| outcome.report).collect());

    output.display(&report)?;
    super::conclude(&report, args.deny_warnings || session.config.fielder.deny_warnings, output)
}
