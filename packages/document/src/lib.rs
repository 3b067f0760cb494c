//! # Folio Document
//!
//! Tree model shared by every Folio package.
//!
//! ```text
//! Container (root)
//!  ├── Text p / h1..h6 / blockquote / code / img / video
//!  ├── Container listType=ul|ol
//!  │    └── Text li
//!  ├── Container layoutType=flex
//!  │    └── Text img | video
//!  └── Container (table wrapper)
//!       └── Structural table
//!            ├── thead > tr > Text th
//!            └── tbody > tr > Text td
//! ```
//!
//! The model has no editing logic beyond lookups and run normalization; the
//! reducer lives in `folio-editor`.

pub mod attributes;
pub mod error;
pub mod id_generator;
pub mod inline;
pub mod node;
pub mod selection;
pub mod snapshot;
pub mod table;
pub mod tree;
pub mod visitor;

pub use attributes::{keys, AttrValue, Attributes};
pub use error::{DocumentError, DocumentResult};
pub use id_generator::{get_document_seed, IdGenerator};
pub use inline::{InlineRun, Line, TextBody};
pub use node::{ContainerNode, ElementType, ListType, Node, StructuralNode, StructuralType, TextNode};
pub use selection::{Format, Formats, RunAttribute, SelectionInfo, SelectionRange};
pub use snapshot::Snapshot;
pub use table::{build_table, table_content, TableContent};
pub use visitor::Visitor;
