use crate::{
    domain::{LinkIndex, Settings},
    publish::{uml::DiagramRenderer, DEFAULT_TEMPLATE},
};

/// Caller options for a single publish call.
///
/// `None` means "pick the default for this kind of object": linkify is on
/// for whole trees rendered to HTML or Markdown, the index page is written
/// for whole trees rendered to HTML, and the matrix for any whole tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    /// Output extension. When absent, the path's extension is used, falling
    /// back to `.html`.
    pub ext: Option<String>,
    /// Turn item references into hyperlinks.
    pub linkify: Option<bool>,
    /// Write `index.html` next to published documents.
    pub index: Option<bool>,
    /// Include the traceability matrix with the index.
    pub matrix: Option<bool>,
    /// Page template identifier for HTML output.
    pub template: Option<String>,
    /// Include a table of contents in HTML pages.
    pub toc: bool,
    /// Maximum line width for text output.
    pub width: usize,
    /// Indentation of wrapped text output.
    pub indent: usize,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            ext: None,
            linkify: None,
            index: None,
            matrix: None,
            template: None,
            toc: true,
            width: 79,
            indent: 8,
        }
    }
}

impl PublishOptions {
    /// The page template to use.
    #[must_use]
    pub fn template(&self) -> &str {
        self.template.as_deref().unwrap_or(DEFAULT_TEMPLATE)
    }
}

/// Everything a renderer needs besides the items themselves.
///
/// Built once per output file and copied into every line generator.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    /// Active settings.
    pub settings: &'a Settings,
    /// Link lookups for the tree being published.
    pub index: &'a LinkIndex<'a>,
    /// Renders fenced UML blocks during HTML conversion.
    pub diagrams: &'a dyn DiagramRenderer,
    /// Emit hyperlinks and anchors.
    pub linkify: bool,
    /// Emit a table of contents with HTML pages.
    pub toc: bool,
    /// Page template identifier.
    pub template: &'a str,
    /// Maximum text line width.
    pub width: usize,
    /// Text indentation.
    pub indent: usize,
    /// 1-based position of the document in a combined PDF.
    pub document_number: usize,
}

impl<'a> RenderContext<'a> {
    /// A context with default options.
    #[must_use]
    pub fn new(
        settings: &'a Settings,
        index: &'a LinkIndex<'a>,
        diagrams: &'a dyn DiagramRenderer,
    ) -> Self {
        let options = PublishOptions::default();
        Self {
            settings,
            index,
            diagrams,
            linkify: false,
            toc: options.toc,
            template: DEFAULT_TEMPLATE,
            width: options.width,
            indent: options.indent,
            document_number: 1,
        }
    }

    /// Toggle hyperlinks.
    #[must_use]
    pub const fn with_linkify(mut self, linkify: bool) -> Self {
        self.linkify = linkify;
        self
    }

    /// Apply the caller's toc, template and text layout options.
    #[must_use]
    pub fn with_options(mut self, options: &'a PublishOptions) -> Self {
        self.toc = options.toc;
        self.template = options.template();
        self.width = options.width;
        self.indent = options.indent;
        self
    }

    /// Set the document position used for PDF numbering.
    #[must_use]
    pub const fn with_document_number(mut self, document_number: usize) -> Self {
        self.document_number = document_number;
        self
    }
}

impl std::fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("linkify", &self.linkify)
            .field("toc", &self.toc)
            .field("template", &self.template)
            .field("width", &self.width)
            .field("indent", &self.indent)
            .field("document_number", &self.document_number)
            .finish_non_exhaustive()
    }
}
