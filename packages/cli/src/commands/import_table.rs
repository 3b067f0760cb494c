use super::{read_input, write_output};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use folio_compiler_html::parse_markdown_table;
use folio_document::{ContainerNode, IdGenerator, Snapshot};
use folio_editor::EditorSession;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ImportTableArgs {
    /// Markdown file holding one table (`-` for stdin)
    pub input: PathBuf,

    /// Insert into this document instead of creating a new one
    #[arg(long)]
    pub into: Option<PathBuf>,

    /// Insert after this node (defaults to the end of the document)
    #[arg(long, requires = "into")]
    pub after: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn import_table(args: ImportTableArgs, cwd: &str) -> Result<()> {
    let markdown = read_input(&args.input)?;

    let snapshot = match &args.into {
        Some(path) => {
            let config = Config::load(cwd)?;
            let snapshot = Snapshot::from_json(&read_input(path)?)?;
            let mut session = EditorSession::from_snapshot(snapshot, config.editor_config());

            if !session.import_markdown_table(&markdown, args.after.as_deref())? {
                return Err(anyhow!(
                    "Cannot insert after '{}': no such node",
                    args.after.as_deref().unwrap_or_default()
                ));
            }
            session.snapshot().clone()
        }
        None => {
            let mut ids = IdGenerator::new("root");
            let table = parse_markdown_table(&markdown, &mut ids)?;
            Snapshot::new(ContainerNode::new("root").with_children(vec![table]))
        }
    };

    eprintln!("{} Imported table ({} nodes)", "📋".green(), snapshot.node_count());
    write_output(args.output.as_deref(), &snapshot.to_json_pretty()?)
}
