use super::{read_input, write_output};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use folio_document::Snapshot;
use folio_editor::{Action, EditorSession};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Document JSON file
    pub document: PathBuf,

    /// JSON array of actions to apply in order (`-` for stdin)
    pub actions: PathBuf,

    /// Undo this many steps after replaying
    #[arg(long, default_value_t = 0)]
    pub undo: usize,

    /// Emit HTML instead of document JSON
    #[arg(long)]
    pub html: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn replay(args: ReplayArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let snapshot = Snapshot::from_json(&read_input(&args.document)?)?;
    let actions: Vec<Action> = serde_json::from_str(&read_input(&args.actions)?)
        .with_context(|| format!("Invalid action list in {}", args.actions.display()))?;

    let mut session = EditorSession::from_snapshot(snapshot, config.editor_config());

    let mut applied = 0;
    for (index, action) in actions.into_iter().enumerate() {
        let name = action.name();
        if session.dispatch(action)? {
            applied += 1;
        } else {
            eprintln!("  {} action #{} ({}) had no effect", "⚠️".yellow(), index, name);
        }
    }

    let mut undone = 0;
    while undone < args.undo && session.undo()? {
        undone += 1;
    }

    eprintln!(
        "{} Applied {} actions, undid {}",
        "✅".green(),
        applied,
        undone
    );

    let content = if args.html {
        session.serialize()?
    } else {
        session.snapshot().to_json_pretty()?
    };
    write_output(args.output.as_deref(), &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_replay_with_undo() {
        let dir = tempfile::tempdir().unwrap();
        let document = dir.path().join("doc.json");
        let actions = dir.path().join("actions.json");
        let output = dir.path().join("out.json");

        fs::write(
            &document,
            r#"{ "kind": "container", "id": "root", "children": [
                { "kind": "text", "id": "a", "type": "p", "content": "One" },
                { "kind": "text", "id": "b", "type": "p", "content": "Two" }
            ] }"#,
        )
        .unwrap();
        fs::write(
            &actions,
            r#"[
                { "type": "convertType", "nodeId": "a", "newType": "h1" },
                { "type": "delete", "nodeId": "b" },
                { "type": "delete", "nodeId": "missing" }
            ]"#,
        )
        .unwrap();

        replay(
            ReplayArgs {
                document,
                actions,
                undo: 1,
                html: false,
                output: Some(output.clone()),
            },
            &dir.path().display().to_string(),
        )
        .unwrap();

        let result = Snapshot::from_json(&fs::read_to_string(output).unwrap()).unwrap();
        assert!(result.find("b").is_some());
        assert_eq!(
            result.find("a").and_then(|n| n.as_text()).map(|t| t.element_type.as_str()),
            Some("h1")
        );
    }
}
