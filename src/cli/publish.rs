use std::path::PathBuf;

use anyhow::Context;
use reqpub::{PublishOptions, Publishable, Publisher, Settings};
use tracing::instrument;

use crate::cli::{parse_ext, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Publish {
    /// The YAML manifest describing the requirement tree.
    manifest: PathBuf,

    /// Where to publish.
    ///
    /// A directory when publishing the whole tree, or a file when publishing
    /// a single document.
    path: PathBuf,

    /// Publish only the document with this prefix.
    #[arg(short, long)]
    document: Option<String>,

    /// Output format (.txt, .md, .html or .pdf).
    ///
    /// Defaults to the extension of PATH, or .html.
    #[arg(short, long, value_parser = parse_ext)]
    ext: Option<String>,

    /// Always turn item references into hyperlinks.
    #[arg(long, conflicts_with = "no_linkify")]
    linkify: bool,

    /// Never turn item references into hyperlinks.
    #[arg(long)]
    no_linkify: bool,

    /// Skip writing index.html.
    #[arg(long)]
    no_index: bool,

    /// Skip the traceability matrix and CSV.
    #[arg(long)]
    no_matrix: bool,

    /// Leave the table of contents out of HTML pages.
    #[arg(long)]
    no_toc: bool,

    /// Page template for HTML output (sidebar, plain).
    #[arg(long)]
    template: Option<String>,

    /// Maximum line width for text output.
    #[arg(long, default_value_t = 79)]
    width: usize,
}

impl Publish {
    #[instrument(skip(settings))]
    pub fn run(self, settings: &Settings) -> anyhow::Result<()> {
        let tree = reqpub::load_tree(&self.manifest)
            .with_context(|| format!("failed to load {}", self.manifest.display()))?;
        let publisher = Publisher::new(&tree, settings);

        let obj: Publishable<'_> = match &self.document {
            Some(prefix) => tree
                .document(prefix)
                .with_context(|| format!("no document with prefix {prefix}"))?
                .into(),
            None => (&tree).into(),
        };

        match publisher.publish(&obj, &self.path, &self.options())? {
            Some(path) => println!("{}", format!("published {}", path.display()).success()),
            None => println!("{}", "nothing to publish".warning()),
        }
        Ok(())
    }

    fn options(&self) -> PublishOptions {
        let linkify = if self.linkify {
            Some(true)
        } else if self.no_linkify {
            Some(false)
        } else {
            None
        };

        PublishOptions {
            ext: self.ext.clone(),
            linkify,
            index: self.no_index.then_some(false),
            matrix: self.no_matrix.then_some(false),
            template: self.template.clone(),
            toc: !self.no_toc,
            width: self.width,
            ..PublishOptions::default()
        }
    }
}
