use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use fielder::InsertionPolicy;

use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::session::{FileOutcome, RunReport, Session};
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Preview",
        commands: &["fielder inject src                   # List the fields that would be added"],
    },
    ExampleGroup {
        title: "Rewrite",
        commands: &[
            "fielder inject --write src                     # Rewrite sources in place",
            "fielder inject --out-dir generated src         # Write rewritten copies elsewhere",
            "fielder inject --insertion declaration-order   # Keep annotation order",
        ],
    },
];

#[derive(Args)]
pub struct InjectArgs {
    /// Files or directories to scan (defaults to the configured scan paths)
    pub paths: Vec<PathBuf>,

    /// Rewrite changed files in place
    #[arg(long, conflicts_with = "out_dir")]
    pub write: bool,

    /// Write every scanned file, rewritten or not, below this directory
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Where synthesized fields are placed: prepend or declaration-order
    #[arg(long)]
    pub insertion: Option<InsertionPolicy>,

    /// Treat warnings as errors
    #[arg(long)]
    pub deny_warnings: bool,
}

pub fn handle_inject(args: InjectArgs, config: Option<&Path>, output: &OutputManager) -> Result<()> {
    let session = Session::open(config)?;
    let policy = session.policy(args.insertion);
    if let Some(path) = &session.config_path {
        output.verbose(&format!("Using {}", path.display()));
    }
    output.verbose(&format!("Insertion policy: {policy}"));

    let files = session.collect_files(&args.paths)?;
    if files.is_empty() {
        output.warning("No Rust files found.");
        return Ok(());
    }

    let outcomes = session.run(&files, policy)?;

    if let Some(out_dir) = &args.out_dir {
        output.heading("Writing");
        for outcome in &outcomes {
            let target = mirrored(out_dir, Path::new(&outcome.report.path));
            write_outcome(outcome, &target)?;
            output.indented(ICONS.file, &target.display().to_string());
        }
    } else if args.write {
        output.heading("Rewriting");
        for outcome in outcomes.iter().filter(|outcome| outcome.rendered.is_some()) {
            write_outcome(outcome, &outcome.source_path)?;
            output.indented(ICONS.file, &outcome.report.path);
        }
    } else {
        output.heading("Pending injections");
        for outcome in &outcomes {
            if outcome.report.injected.is_empty() {
                continue;
            }
            output.key_value("file", &outcome.report.path);
            for field in &outcome.report.injected {
                output.indented(ICONS.field, &format!("{}.{}: {}", field.type_name, field.field, field.ty));
            }
        }
        output.info("Dry run: pass --write or --out-dir to apply.");
    }

    let report = RunReport::new(outcomes.into_iter().map(|outcome| outcome.report).collect());
    output.display(&report)?;
    super::conclude(&report, args.deny_warnings || session.config.fielder.deny_warnings, output)
}

/// `path` below `out_dir`, dropping root and parent components so nothing
/// lands outside it.
fn mirrored(out_dir: &Path, path: &Path) -> PathBuf {
    path.components()
        .filter(|component| matches!(component, Component::Normal(_)))
        .fold(out_dir.to_path_buf(), |target, component| target.join(component))
}

fn write_outcome(outcome: &FileOutcome, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    match &outcome.rendered {
        Some(rendered) => std::fs::write(target, rendered),
        None => std::fs::copy(&outcome.source_path, target).map(|_| ()),
    }
    .with_context(|| format!("Failed to write file: {}", target.display()))
}
