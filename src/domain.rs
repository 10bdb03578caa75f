//! Domain models for publishing requirements.
//!
//! This module contains the read-only object graph the publisher consumes:
//! items, documents, the tree of documents, and the settings that control
//! rendering.

mod category;
pub use category::{Category, TEST_PREFIX};

mod document;
pub use document::Document;

/// Item types and borrowed item views.
pub mod item;
pub use item::{ExternalRef, Item, ItemView, Reference};

/// Item level parsing and formatting.
pub mod level;
pub use level::{Level, ParseLevelError};

mod settings;
pub use settings::Settings;

/// The document tree and reverse link index.
pub mod tree;
pub use tree::{LinkIndex, Related, TraceRow, Tree};

mod uid;
pub use uid::{InvalidUidError, Uid};
