//! Requirements publishing
//!
//! Renders a tree of requirement documents into plain text, Markdown, HTML
//! or PDF, with cross-document links, an index page and a traceability
//! matrix.

pub mod domain;
pub use domain::{Document, Item, Settings, Tree};

/// Rendering and writing of published output.
pub mod publish;
pub use publish::{PublishOptions, Publishable, Publisher};

/// Loading requirement trees from disk.
pub mod storage;
pub use storage::load_tree;
