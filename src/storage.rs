//! Loading requirement trees from disk.
//!
//! The publisher itself works on an in-memory [`Tree`](crate::domain::Tree).
//! This module provides the on-disk input format: a single YAML manifest
//! holding every document and item.

mod manifest;
pub use manifest::{load_tree, parse_tree, LoadError};
