use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use html_escape::encode_text;
use tracing::{debug, info, instrument, warn};

use crate::{
    domain::{LinkIndex, Settings, Tree, TEST_PREFIX},
    publish::{
        assets::{self, ASSETS_DIR, PDF_STYLESHEET},
        check,
        convert::markdown_to_html,
        index::{write_csv, write_lines, IndexPage},
        markdown,
        matrix::{self, Matrix},
        pdf_engine::{CommandPdfEngine, PdfEngine},
        template,
        uml::{DiagramRenderer, KrokiRenderer},
        Error, Format, Lines, Publishable, PublishOptions, RenderContext, MATRIX, PDF,
    },
};

const PAGE_BREAK: &str = "<div style=\"clear: both; page-break-after: always;\"> </div>";

/// Publishes items, documents and trees from one requirement tree.
///
/// The publisher indexes the tree once, so every object handed to it must
/// come from that tree for links to resolve.
pub struct Publisher<'a> {
    tree: &'a Tree,
    settings: &'a Settings,
    index: LinkIndex<'a>,
    diagrams: Box<dyn DiagramRenderer + 'a>,
    pdf: Box<dyn PdfEngine + 'a>,
}

impl fmt::Debug for Publisher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("documents", &self.tree.documents().len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<'a> Publisher<'a> {
    /// Create a publisher that renders diagrams with the configured Kroki
    /// server and converts PDFs with the configured command.
    #[must_use]
    pub fn new(tree: &'a Tree, settings: &'a Settings) -> Self {
        let diagrams = KrokiRenderer::new(
            settings.uml_server.as_str(),
            Duration::from_secs(settings.uml_timeout_secs),
        )
        .with_cache_dir(std::env::temp_dir().join("reqpub-uml"));
        Self {
            tree,
            settings,
            index: LinkIndex::new(tree),
            diagrams: Box::new(diagrams),
            pdf: Box::new(CommandPdfEngine::new(settings.pdf_command.as_str())),
        }
    }

    /// Replace the diagram renderer.
    #[must_use]
    pub fn with_diagram_renderer(mut self, diagrams: impl DiagramRenderer + 'a) -> Self {
        self.diagrams = Box::new(diagrams);
        self
    }

    /// Replace the PDF engine.
    #[must_use]
    pub fn with_pdf_engine(mut self, pdf: impl PdfEngine + 'a) -> Self {
        self.pdf = Box::new(pdf);
        self
    }

    /// The tree being published.
    #[must_use]
    pub const fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// Link lookups over the tree.
    #[must_use]
    pub const fn index(&self) -> &LinkIndex<'a> {
        &self.index
    }

    fn context<'s>(&'s self, linkify: bool, options: &'s PublishOptions) -> RenderContext<'s> {
        RenderContext::new(self.settings, &self.index, &*self.diagrams)
            .with_linkify(linkify)
            .with_options(options)
    }

    /// Render an object into lines of the format for `ext`.
    ///
    /// Links are only generated when `options.linkify` is `Some(true)`.
    ///
    /// # Errors
    ///
    /// Returns an error if `ext` is not supported or a page template fails.
    pub fn publish_lines<'s>(
        &'s self,
        obj: &Publishable<'s>,
        ext: &str,
        options: &'s PublishOptions,
    ) -> Result<Lines<'s>, Error> {
        let format = check(ext)?;
        let linkify = options.linkify.unwrap_or(false);
        format.lines(obj, self.context(linkify, options))
    }

    /// Publish an object to `path`.
    ///
    /// A tree is published into the directory `path`, one file per document
    /// named `{prefix}{ext}`, plus `index.html` and `traceability.csv` for
    /// HTML. Anything else is published to the file `path`. Assets are
    /// written to an `assets` directory alongside the output, replacing its
    /// previous contents.
    ///
    /// Returns the published path, or `None` if there was nothing to
    /// publish.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is not supported or any output cannot
    /// be rendered or written.
    #[instrument(skip_all, fields(obj = %obj, path = %path.display()))]
    pub fn publish(
        &self,
        obj: &Publishable<'_>,
        path: &Path,
        options: &PublishOptions,
    ) -> Result<Option<PathBuf>, Error> {
        let ext = resolve_ext(path, options.ext.as_deref());
        let format = check(&ext)?;
        let is_tree = obj.is_tree();
        let linkify = options
            .linkify
            .unwrap_or(is_tree && matches!(format, Format::Html | Format::Markdown));
        let write_index = options.index.unwrap_or(is_tree && format == Format::Html);
        let write_matrix = options.matrix.unwrap_or(is_tree);
        debug!(%format, linkify, write_index, write_matrix, "resolved publish options");

        if obj.is_empty() {
            warn!("nothing to publish");
            return Ok(None);
        }

        let dir = if is_tree {
            path.to_path_buf()
        } else {
            parent_dir(path).to_path_buf()
        };
        let assets_dir = dir.join(ASSETS_DIR);
        assets::reset_dir(&assets_dir)?;
        assets::copy_bundle(&assets_dir)?;

        let count = if format == Format::Pdf {
            self.publish_pdf(obj, path, &dir, &assets_dir, options)?
        } else {
            let ctx = self.context(linkify, options);
            let mut count = 0;
            for (target, output) in targets(obj, path, format) {
                if let Some(document) = target.document() {
                    assets::copy_document_assets(document, &assets_dir)?;
                }
                info!("publishing to {}...", output.display());
                write_lines(&output, format.lines(&target, ctx)?)?;
                count += 1;
            }
            count
        };

        if count == 0 {
            warn!("nothing to publish");
            return Ok(None);
        }

        if let Publishable::Tree(tree) = *obj {
            if write_index {
                self.write_index(tree, &dir)?;
            }
            if write_index && write_matrix {
                write_csv(&dir.join(MATRIX), tree, &self.index)?;
            }
        }

        info!("published {count} file(s) to {}", path.display());
        Ok(Some(path.to_path_buf()))
    }

    fn write_index(&self, tree: &Tree, dir: &Path) -> Result<(), Error> {
        let results = matrix::load_results(self.settings.result_file.as_deref())?;
        let matrix = Matrix::build(tree, &self.index, &results);
        IndexPage {
            tree,
            index: &self.index,
            settings: self.settings,
            matrix: &matrix,
        }
        .write(dir)?;
        Ok(())
    }

    /// Render every document into one Markdown file with a title page and a
    /// table of contents, then convert it to PDF.
    ///
    /// Test documents are left out of whole-tree PDFs.
    fn publish_pdf(
        &self,
        obj: &Publishable<'_>,
        path: &Path,
        dir: &Path,
        assets_dir: &Path,
        options: &PublishOptions,
    ) -> Result<usize, Error> {
        let linkify = options.linkify == Some(true);
        let sections: Vec<Publishable<'_>> = match *obj {
            Publishable::Tree(tree) => tree
                .sorted_documents()
                .into_iter()
                .filter(|document| document.prefix() != TEST_PREFIX)
                .map(Publishable::Document)
                .collect(),
            _ => vec![obj.clone()],
        };
        if sections.is_empty() {
            return Ok(0);
        }

        let settings = self.settings;
        let mut contents = vec!["### Table of Contents".to_string(), String::new()];
        let mut body = Vec::new();
        for (position, section) in sections.iter().enumerate() {
            let number = position + 1;
            if let Some(document) = section.document() {
                assets::copy_document_assets(document, assets_dir)?;
            }
            contents.extend(markdown::pdf_contents(section.items(), number));
            let ctx = self
                .context(linkify, options)
                .with_document_number(number);
            body.extend(Format::Pdf.lines(section, ctx)?);
            body.push(PAGE_BREAK.to_string());
            body.push(String::new());
        }

        let mut lines = vec![
            format!(
                "<H1 style=\"text-align: center;\">{}</H1>",
                encode_text(&settings.title)
            ),
            String::new(),
            format!(
                "<H3 style=\"text-align: center;\">{}</H3>",
                encode_text(&settings.version)
            ),
            String::new(),
            PAGE_BREAK.to_string(),
            String::new(),
        ];
        lines.extend(contents);
        lines.push(String::new());
        lines.push(PAGE_BREAK.to_string());
        lines.push(String::new());
        lines.extend(body);

        let markdown_path = dir.join("index.md");
        info!("publishing to {}...", markdown_path.display());
        let text = lines.join("\n");
        write_lines(&markdown_path, [text.clone()])?;

        let pdf_path = if obj.is_tree() {
            dir.join(PDF)
        } else {
            path.to_path_buf()
        };
        info!("converting to {}...", pdf_path.display());
        let html = template::render_pdf(
            &settings.full_title(),
            markdown_to_html(&text, &*self.diagrams),
        )?;
        self.pdf
            .convert(&html, &assets_dir.join(PDF_STYLESHEET), dir, &pdf_path)?;

        Ok(sections.len())
    }
}

/// The output extension: explicit, else the path's, else `.html`.
fn resolve_ext(path: &Path, ext: Option<&str>) -> String {
    ext.map_or_else(
        || {
            path.extension().map_or_else(
                || Format::Html.extension().to_string(),
                |ext| format!(".{}", ext.to_string_lossy()),
            )
        },
        str::to_string,
    )
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Pair each publishable unit with its output file.
fn targets<'o>(
    obj: &Publishable<'o>,
    path: &Path,
    format: Format,
) -> Vec<(Publishable<'o>, PathBuf)> {
    match *obj {
        Publishable::Tree(tree) => tree
            .documents()
            .iter()
            .map(|document| {
                let file = format!("{}{}", document.prefix(), format.extension());
                (Publishable::Document(document), path.join(file))
            })
            .collect(),
        _ => vec![(obj.clone(), path.to_path_buf())],
    }
}
