use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Context;
use reqpub::{domain::ItemView, PublishOptions, Publishable, Publisher, Settings, Tree};
use tracing::instrument;

use crate::cli::parse_ext;

#[derive(Debug, clap::Parser)]
pub struct Print {
    /// The YAML manifest describing the requirement tree.
    manifest: PathBuf,

    /// Print only the document with this prefix.
    #[arg(short, long, conflicts_with = "item")]
    document: Option<String>,

    /// Print only these items (comma separated uids).
    #[arg(short, long, value_delimiter = ',')]
    item: Vec<String>,

    /// Output format (.txt, .md, .html or .pdf).
    #[arg(short, long, default_value = ".txt", value_parser = parse_ext)]
    ext: String,

    /// Turn item references into hyperlinks.
    #[arg(long)]
    linkify: bool,

    /// Maximum line width for text output.
    #[arg(long, default_value_t = 79)]
    width: usize,
}

impl Print {
    #[instrument(skip(settings))]
    pub fn run(self, settings: &Settings) -> anyhow::Result<()> {
        let tree = reqpub::load_tree(&self.manifest)
            .with_context(|| format!("failed to load {}", self.manifest.display()))?;
        let publisher = Publisher::new(&tree, settings);
        let obj = self.select(&tree)?;
        let options = PublishOptions {
            linkify: Some(self.linkify),
            width: self.width,
            ..PublishOptions::default()
        };

        let mut stdout = io::stdout().lock();
        for line in publisher.publish_lines(&obj, &self.ext, &options)? {
            writeln!(stdout, "{line}")?;
        }
        Ok(())
    }

    fn select<'a>(&self, tree: &'a Tree) -> anyhow::Result<Publishable<'a>> {
        if let Some(prefix) = &self.document {
            let document = tree
                .document(prefix)
                .with_context(|| format!("no document with prefix {prefix}"))?;
            return Ok(document.into());
        }

        let mut items: Vec<ItemView<'a>> = self
            .item
            .iter()
            .map(|uid| tree.find(uid).with_context(|| format!("no item {uid}")))
            .collect::<anyhow::Result<_>>()?;
        Ok(match items.len() {
            0 => tree.into(),
            1 => items.remove(0).into(),
            _ => Publishable::Items(items),
        })
    }
}
