use crate::inline::{escape_html, render_inline};
use folio_document::{keys, ContainerNode, ElementType, Node, StructuralNode, StructuralType, TextNode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during HTML compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Document root must be a container, found '{0}'")]
    RootNotContainer(String),

    #[error("Invalid structure at '{id}': {reason}")]
    InvalidStructure { id: String, reason: String },
}

/// Options for HTML compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
    /// Emit `data-node-id` on every element that maps to a node
    pub include_ids: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
            include_ids: false,
        }
    }
}

impl CompileOptions {
    /// Single-line output with node ids, as an editable surface consumes it
    pub fn surface() -> Self {
        Self {
            pretty: false,
            indent: String::new(),
            include_ids: true,
        }
    }
}

struct Context<'a> {
    options: &'a CompileOptions,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(options: &'a CompileOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    /// ` data-node-id="..."` when ids are enabled
    fn id_attr(&self, id: &str) -> String {
        if self.options.include_ids {
            format!(" data-node-id=\"{}\"", escape_html(id))
        } else {
            String::new()
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Compile a whole document to HTML. The root container contributes only its
/// children.
pub fn compile_to_html(root: &Node, options: &CompileOptions) -> Result<String, CompileError> {
    let Node::Container(container) = root else {
        return Err(CompileError::RootNotContainer(root.id().to_string()));
    };

    let mut ctx = Context::new(options);
    for child in &container.children {
        compile_node_into(child, &mut ctx)?;
    }

    tracing::debug!(
        root = %container.id,
        blocks = container.children.len(),
        bytes = ctx.buffer.len(),
        "compiled document"
    );
    Ok(ctx.get_output())
}

/// Compile one block (and its subtree)
pub fn compile_node(node: &Node, options: &CompileOptions) -> Result<String, CompileError> {
    let mut ctx = Context::new(options);
    compile_node_into(node, &mut ctx)?;
    Ok(ctx.get_output())
}

fn compile_node_into(node: &Node, ctx: &mut Context) -> Result<(), CompileError> {
    match node {
        Node::Container(container) => compile_container(container, ctx),
        Node::Structural(structural) => compile_structural(structural, ctx),
        Node::Text(text) => {
            compile_text(text, ctx);
            Ok(())
        }
    }
}

fn compile_children(children: &[Node], ctx: &mut Context) -> Result<(), CompileError> {
    ctx.indent();
    for child in children {
        compile_node_into(child, ctx)?;
    }
    ctx.dedent();
    Ok(())
}

fn compile_container(container: &ContainerNode, ctx: &mut Context) -> Result<(), CompileError> {
    let id = ctx.id_attr(&container.id);
    let style = style_attr(container.attributes.get_str(keys::BACKGROUND_COLOR));

    let (tag, extra) = if let Some(list) = container.list_type() {
        (list.as_str(), String::new())
    } else if container.is_flex() {
        ("div", " data-layout=\"flex\"".to_string())
    } else if container.is_table_wrapper() {
        ("div", " class=\"table-wrapper\"".to_string())
    } else {
        ("div", String::new())
    };

    ctx.add_line(&format!("<{}{}{}{}>", tag, id, extra, style));
    compile_children(&container.children, ctx)?;
    ctx.add_line(&format!("</{}>", tag));
    Ok(())
}

fn compile_structural(node: &StructuralNode, ctx: &mut Context) -> Result<(), CompileError> {
    if node.structural_type == StructuralType::Tr {
        if let Some(bad) = node
            .children
            .iter()
            .find(|c| !matches!(c, Node::Text(t) if t.element_type.is_cell()))
        {
            return Err(CompileError::InvalidStructure {
                id: node.id.clone(),
                reason: format!("row child '{}' is not a th/td cell", bad.id()),
            });
        }
    }

    let tag = node.structural_type.as_str();
    ctx.add_line(&format!("<{}{}>", tag, ctx.id_attr(&node.id)));
    compile_children(&node.children, ctx)?;
    ctx.add_line(&format!("</{}>", tag));
    Ok(())
}

fn style_attr(background: Option<&str>) -> String {
    match background {
        Some(color) => format!(" style=\"background-color: {}\"", escape_html(color)),
        None => String::new(),
    }
}

fn placeholder_state(text: &TextNode) -> &'static str {
    if text.attributes.is_loading() {
        "loading"
    } else if text.attributes.has_error() {
        "error"
    } else {
        "upload-handler-required"
    }
}

fn compile_text(text: &TextNode, ctx: &mut Context) {
    let attrs = format!(
        "{}{}",
        ctx.id_attr(&text.id),
        style_attr(text.attributes.get_str(keys::BACKGROUND_COLOR))
    );

    if text.is_placeholder() {
        ctx.add_line(&format!(
            "<div{} class=\"media-placeholder\" data-media=\"{}\" data-state=\"{}\"></div>",
            attrs,
            text.element_type,
            placeholder_state(text)
        ));
        return;
    }

    let src = text
        .attributes
        .get_str(keys::SRC)
        .map(|s| format!(" src=\"{}\"", escape_html(s)))
        .unwrap_or_default();

    match text.element_type {
        ElementType::Img => {
            let alt = text.attributes.get_str(keys::ALT).unwrap_or("");
            ctx.add_line(&format!("<img{}{} alt=\"{}\">", attrs, src, escape_html(alt)));
        }
        ElementType::Video => {
            ctx.add_line(&format!("<video{}{} controls></video>", attrs, src));
        }
        ElementType::Code => {
            ctx.add_line(&format!("<pre{}><code>{}</code></pre>", attrs, render_inline(&text.body)));
        }
        other => {
            let tag = other.as_str();
            ctx.add_line(&format!("<{}{}>{}</{}>", tag, attrs, render_inline(&text.body), tag));
        }
    }
}
