//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Document error: {0}")]
    Document(#[from] folio_document::DocumentError),

    #[error("Compile error: {0}")]
    Compile(#[from] folio_compiler_html::CompileError),

    #[error("Markdown error: {0}")]
    Markdown(#[from] folio_compiler_html::MarkdownError),

    #[error("Upload error: {0}")]
    Upload(#[from] crate::upload::UploadError),

    #[error("Document is read-only")]
    ReadOnly,
}
