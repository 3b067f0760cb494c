pub mod export;
pub mod import_table;
pub mod replay;

pub use export::{export, ExportArgs};
pub use import_table::{import_table, ImportTableArgs};
pub use replay::{replay, ReplayArgs};

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Read a file, or stdin when the path is `-`
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }
    fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}

/// Write to a file, or stdout when no path is given
pub(crate) fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content).with_context(|| format!("Cannot write {}", path.display()))?;
            eprintln!("  {} {}", "✓".green(), path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
