use folio_compiler_html::CompileOptions;
use folio_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Folio configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Undo levels kept while replaying (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Replace flex groups left with one child by that child
    #[serde(default)]
    pub unwrap_single_child_flex: bool,

    /// HTML output options
    #[serde(default)]
    pub html: CompileOptions,
}

fn default_history_limit() -> usize {
    100
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Editor settings derived from this config
    pub fn editor_config(&self) -> EditorConfig {
        EditorConfig {
            history_limit: self.history_limit,
            unwrap_single_child_flex: self.unwrap_single_child_flex,
            read_only: false,
            html: self.html.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            unwrap_single_child_flex: false,
            html: CompileOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "historyLimit": 20,
            "unwrapSingleChildFlex": true,
            "html": { "pretty": false, "includeIds": true }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.history_limit, 20);
        assert!(config.unwrap_single_child_flex);
        assert!(!config.html.pretty);
        assert!(config.html.include_ids);
        assert_eq!(config.html.indent, "  ");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.history_limit, 100);
        assert!(!config.unwrap_single_child_flex);
        assert!(config.html.pretty);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        assert_eq!(Config::load(&cwd).unwrap().history_limit, 100);

        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "historyLimit": 3 }"#).unwrap();
        let config = Config::load(&cwd).unwrap();
        assert_eq!(config.history_limit, 3);
        assert_eq!(config.editor_config().history_limit, 3);
    }
}
