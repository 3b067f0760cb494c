use folio_compiler_html::{compile_to_html, parse_markdown_table, CompileOptions};
use folio_document::{IdGenerator, Snapshot};
use folio_editor::{Action, EditorConfig, EditorSession};
use std::fmt::Display;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(kind: &str, err: impl Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", kind, err))
}

/// One editing session, driven by JSON actions from the host
#[wasm_bindgen]
pub struct WasmEditor {
    session: EditorSession,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Open a document from its JSON tree; `config_json` may be empty
    #[wasm_bindgen(constructor)]
    pub fn new(document_json: &str, config_json: &str) -> Result<WasmEditor, JsValue> {
        let snapshot = Snapshot::from_json(document_json).map_err(|e| js_error("Document error", e))?;
        let config: EditorConfig = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            serde_json::from_str(config_json).map_err(|e| js_error("Config error", e))?
        };

        Ok(WasmEditor {
            session: EditorSession::from_snapshot(snapshot, config),
        })
    }

    /// Apply one action; returns whether the document changed
    pub fn dispatch(&mut self, action_json: &str) -> Result<bool, JsValue> {
        let action: Action = serde_json::from_str(action_json).map_err(|e| js_error("Invalid action", e))?;
        self.session.dispatch(action).map_err(|e| js_error("Editor error", e))
    }

    pub fn undo(&mut self) -> Result<bool, JsValue> {
        self.session.undo().map_err(|e| js_error("Editor error", e))
    }

    pub fn redo(&mut self) -> Result<bool, JsValue> {
        self.session.redo().map_err(|e| js_error("Editor error", e))
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    /// HTML for the current document
    pub fn serialize(&self) -> Result<String, JsValue> {
        self.session.serialize().map_err(|e| js_error("Compile error", e))
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.session.to_json().map_err(|e| js_error("Serialization error", e))
    }

    #[wasm_bindgen(js_name = setReadOnly)]
    pub fn set_read_only(&mut self, read_only: bool) {
        self.session.set_read_only(read_only);
    }

    #[wasm_bindgen(js_name = isReadOnly)]
    pub fn is_read_only(&self) -> bool {
        self.session.is_read_only()
    }

    /// Toolbar state as JSON, or `undefined` when the node is not text
    #[wasm_bindgen(js_name = selectionInfo)]
    pub fn selection_info(&self, node_id: &str, start: usize, end: usize) -> Result<Option<String>, JsValue> {
        self.session
            .selection_info(node_id, start, end)
            .map(|info| serde_json::to_string(&info))
            .transpose()
            .map_err(|e| js_error("Serialization error", e))
    }

    /// Insert a markdown table after `anchor_id` (or at the end when empty)
    #[wasm_bindgen(js_name = importMarkdownTable)]
    pub fn import_markdown_table(&mut self, markdown: &str, anchor_id: &str) -> Result<bool, JsValue> {
        let anchor = (!anchor_id.is_empty()).then_some(anchor_id);
        self.session
            .import_markdown_table(markdown, anchor)
            .map_err(|e| js_error("Import error", e))
    }
}

/// Parse a markdown table into a node subtree, returned as JSON
#[wasm_bindgen(js_name = parseMarkdownTable)]
pub fn parse_markdown_table_js(markdown: &str, root_id: &str) -> Result<String, JsValue> {
    let mut ids = IdGenerator::new(root_id);
    let table = parse_markdown_table(markdown, &mut ids).map_err(|e| js_error("Markdown error", e))?;
    serde_json::to_string(&table).map_err(|e| js_error("Serialization error", e))
}

/// Render a document JSON tree as HTML without opening a session
#[wasm_bindgen(js_name = compileToHtml)]
pub fn compile_to_html_js(document_json: &str, pretty: bool) -> Result<String, JsValue> {
    let snapshot = Snapshot::from_json(document_json).map_err(|e| js_error("Document error", e))?;
    let options = CompileOptions {
        pretty,
        ..CompileOptions::default()
    };
    compile_to_html(snapshot.root(), &options).map_err(|e| js_error("Compile error", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "kind": "container",
        "id": "root",
        "children": [
            { "kind": "text", "id": "a", "type": "p", "content": "Hello world" }
        ]
    }"#;

    #[test]
    fn test_dispatch_and_undo() {
        let mut editor = WasmEditor::new(DOCUMENT, "").unwrap();
        let changed = editor
            .dispatch(r#"{ "type": "toggleFormat", "selection": { "nodeId": "a", "start": 0, "end": 5 }, "format": "bold" }"#)
            .unwrap();
        assert!(changed);
        assert!(editor.serialize().unwrap().contains("<strong>Hello</strong>"));

        assert!(editor.undo().unwrap());
        assert!(editor.can_redo());
        assert!(!editor.serialize().unwrap().contains("<strong>"));
    }

    #[test]
    fn test_selection_info_json() {
        let editor = WasmEditor::new(DOCUMENT, r#"{ "historyLimit": 10 }"#).unwrap();
        let info = editor.selection_info("a", 0, 5).unwrap().unwrap();
        assert!(info.contains(r#""nodeId":"a""#));
        assert!(editor.selection_info("missing", 0, 0).unwrap().is_none());
    }

    #[test]
    fn test_parse_markdown_table() {
        let json = parse_markdown_table_js("| a | b |\n|---|---|\n| 1 | 2 |", "doc").unwrap();
        assert!(json.contains(r#""type":"th""#));
        assert!(json.contains(r#""content":"2""#));
    }

    #[test]
    fn test_compile_to_html() {
        let html = compile_to_html_js(DOCUMENT, false).unwrap();
        assert_eq!(html, "<p>Hello world</p>");
    }
}
