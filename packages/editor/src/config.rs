use folio_compiler_html::CompileOptions;
use serde::{Deserialize, Serialize};

/// Editor behaviour knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Undo levels kept (0 = unlimited)
    pub history_limit: usize,

    /// Replace flex groups left with one child by that child
    pub unwrap_single_child_flex: bool,

    pub read_only: bool,

    /// Options used by `serialize`
    pub html: CompileOptions,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            unwrap_single_child_flex: false,
            read_only: false,
            html: CompileOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{ "historyLimit": 5, "html": { "pretty": false } }"#).unwrap();
        assert_eq!(config.history_limit, 5);
        assert!(!config.unwrap_single_child_flex);
        assert!(!config.html.pretty);
        assert_eq!(config.html.indent, "  ");
    }
}
