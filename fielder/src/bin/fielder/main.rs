mod commands;
mod examples;
mod output;
mod session;
mod theme;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use commands::{
    check::{CheckArgs, handle_check},
    inject::{InjectArgs, handle_inject},
};
use examples::command_examples;
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::THEME;

const ENVIRONMENT_HELP: &str = "Environment Variables:
  RUST_LOG  Log filter for engine tracing (e.g. fielder=debug)
  NO_COLOR  Disable colored output

Tip: Use 'fielder <command> --help' to view examples for each command.";

#[derive(Parser)]
#[command(name = "fielder")]
#[command(version)]
#[command(
    about = "Compile-time field injection for Rust structs",
    long_about = r#"Reads #[fielder(...)] and #[add_fields(...)] annotations and adds the
requested fields to struct declarations:

• Each field is checked before it is added (struct kind, duplicates, constructors)
• Failures are reported per field and never stop the rest of the round
• Struct literals get the new fields via Default; struct patterns gain `..`

Commands:
  check     Report what injection would do, without writing
  inject    Add the requested fields to sources
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (defaults to the nearest fielder.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse arguments with themed help and per-command examples.
    fn parse_themed() -> Self {
        let mut command = Cli::command()
            .styles(THEME.help_styles())
            .after_long_help(ENVIRONMENT_HELP);
        for example in command_examples() {
            command = command.mut_subcommand(example.name, |sub| sub.after_long_help(example.render()));
        }
        Cli::from_arg_matches(&command.get_matches()).unwrap_or_else(|err| err.exit())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Report what injection would do, without writing
    Check(CheckArgs),

    /// Add the requested fields to sources
    Inject(InjectArgs),
}

fn main() {
    env_logger::init();

    let cli = Cli::parse_themed();

    if let Err(err) = execute(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<()> {
    let global_options = GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };

    let output = OutputManager::new(global_options);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Check(args) => handle_check(args, config, &output),
        Commands::Inject(args) => handle_inject(args, config, &output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_insertion_policy_is_parsed() {
        let cli = Cli::try_parse_from(["fielder", "check", "--insertion", "declaration-order", "src"]).unwrap();
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.insertion, Some(fielder::InsertionPolicy::DeclarationOrder));
    }
}
