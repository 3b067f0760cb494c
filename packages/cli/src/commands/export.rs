use super::{read_input, write_output};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use folio_compiler_html::compile_to_html;
use folio_document::Snapshot;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Document JSON file (`-` for stdin)
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit compact HTML instead of pretty printing
    #[arg(long)]
    pub compact: bool,

    /// Emit `data-node-id` attributes
    #[arg(long)]
    pub ids: bool,
}

pub fn export(args: ExportArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut options = config.html;
    if args.compact {
        options.pretty = false;
    }
    if args.ids {
        options.include_ids = true;
    }

    let snapshot = Snapshot::from_json(&read_input(&args.input)?)?;
    let html = compile_to_html(snapshot.root(), &options)?;
    tracing::info!(nodes = snapshot.node_count(), bytes = html.len(), "exported document");

    write_output(args.output.as_deref(), &html)
}
