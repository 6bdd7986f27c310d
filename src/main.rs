mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::{error, Level};

#[derive(Parser, Debug)]
#[command(version, about = "Rank protein pharmacophore models against query ligands")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity of the program:
    /// -v for debug and -vv for trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Screen query ligands against a directory of pharmacophore models.
    /// Results are written grouped by query name in alphabetical order,
    /// not in the order queries appear in the ligand table
    Screen(cli::screen::Args),
    /// Score one ligand table against one pharmacophore model and show the assignment
    Score(cli::score::Args),
    /// Summarize a screening result table
    Analyze(cli::analyze::Args),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let result = match &cli.command {
        Commands::Screen(args) => cli::screen::run(args),
        Commands::Score(args) => cli::score::run(args),
        Commands::Analyze(args) => cli::analyze::run(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
