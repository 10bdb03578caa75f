//! Rendering of items, documents and trees into published formats.
//!
//! The entry point is [`Publisher`]. It resolves a [`Format`] through
//! [`check`], renders each document with the matching line generator, and
//! for whole trees writes the index page, traceability matrix and CSV.

use std::{io, path::PathBuf};

mod assets;
mod attributes;
mod context;
mod convert;
mod format;
mod html;
mod index;
/// Link classification and per-format link syntax.
pub mod links;
mod markdown;
/// Traceability matrix construction.
pub mod matrix;
mod pdf_engine;
mod publisher;
mod target;
mod template;
mod text;
/// Diagram rendering for fenced UML blocks.
pub mod uml;

pub use assets::ASSETS_DIR;
pub use attributes::{is_implemented, RiskRating};
pub use context::{PublishOptions, RenderContext};
pub use convert::markdown_to_html;
pub use format::{check, Format, Lines};
pub use matrix::{Matrix, MatrixRow, TestResults};
pub use pdf_engine::{CommandPdfEngine, PdfEngine};
pub use publisher::Publisher;
pub use target::Publishable;
pub use uml::{DiagramError, DiagramRenderer, KrokiRenderer};

/// File name of the generated index page.
pub const INDEX: &str = "index.html";
/// File name of the generated traceability matrix.
pub const MATRIX: &str = "traceability.csv";
/// File name of the combined PDF.
pub const PDF: &str = "index.pdf";
/// Page template used when none is requested.
pub const DEFAULT_TEMPLATE: &str = "sidebar";

/// Errors raised while publishing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested output extension has no renderer.
    #[error("unknown publish format: {ext} (options: {options})")]
    UnsupportedFormat {
        /// The rejected extension.
        ext: String,
        /// The supported extensions, comma separated.
        options: String,
    },

    /// A page template could not be found or rendered.
    #[error("problem rendering the template '{template}'")]
    Template {
        /// The template identifier.
        template: String,
        /// The underlying template error.
        #[source]
        source: minijinja::Error,
    },

    /// The test results file could not be parsed.
    #[error("failed to parse test results in {}", path.display())]
    Results {
        /// The results file.
        path: PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The PDF conversion step failed.
    #[error("PDF conversion failed: {0}")]
    Pdf(String),

    /// The search index could not be serialised.
    #[error("failed to serialise the search index")]
    Json(#[from] serde_json::Error),

    /// Reading or writing output failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}
