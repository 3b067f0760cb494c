mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{export, import_table, replay, ExportArgs, ImportTableArgs, ReplayArgs};

/// Folio CLI - block document tooling
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editor internals (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a document JSON file as HTML
    Export(ExportArgs),

    /// Turn a markdown table into a document, or insert it into one
    ImportTable(ImportTableArgs),

    /// Apply a list of JSON actions to a document
    Replay(ReplayArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();

    match cli.command {
        Command::Export(args) => export(args, &cwd),
        Command::ImportTable(args) => import_table(args, &cwd),
        Command::Replay(args) => replay(args, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
