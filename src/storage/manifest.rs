use std::{
    collections::{BTreeMap, HashSet},
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_yaml::Value;
use tracing::{debug, info};

use crate::domain::{
    Document, ExternalRef, InvalidUidError, Item, Level, ParseLevelError, Reference, Tree, Uid,
};

/// Errors that can occur when loading a requirement tree.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The manifest could not be read.
    #[error("failed to read manifest: {0}")]
    Io(#[from] io::Error),

    /// The manifest is not valid YAML, or does not match the expected shape.
    #[error("failed to parse manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An item's level could not be parsed.
    #[error("invalid level for {uid}: {source}")]
    Level {
        /// The item with the bad level.
        uid: String,
        /// The underlying parse failure.
        source: ParseLevelError,
    },

    /// An item or link has an empty uid.
    #[error(transparent)]
    Uid(#[from] InvalidUidError),

    /// Two items share a uid.
    #[error("duplicate uid: {0}")]
    DuplicateUid(String),
}

/// Load a tree from a YAML manifest on disk.
///
/// Relative asset directories are resolved against the manifest's directory.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not describe a valid
/// tree.
pub fn load_tree(path: &Path) -> Result<Tree, LoadError> {
    info!("loading {}", path.display());
    let yaml = fs::read_to_string(path)?;
    let root = path.parent().unwrap_or_else(|| Path::new(""));
    build(serde_yaml::from_str(&yaml)?, root)
}

/// Parse a tree from YAML text.
///
/// Asset directories are kept exactly as written.
///
/// # Errors
///
/// Returns an error if the YAML does not describe a valid tree.
pub fn parse_tree(yaml: &str) -> Result<Tree, LoadError> {
    build(serde_yaml::from_str(yaml)?, Path::new(""))
}

fn build(manifest: Manifest, root: &Path) -> Result<Tree, LoadError> {
    let mut seen = HashSet::new();
    let mut documents = Vec::with_capacity(manifest.documents.len());

    for spec in manifest.documents {
        let mut document = Document::new(spec.prefix, spec.name).with_publish(spec.publish);
        if let Some(parent) = spec.parent {
            document = document.with_parent(parent);
        }
        if let Some(assets) = spec.assets {
            document = document.with_assets(root.join(assets));
        }
        for item in spec.items {
            let item = item.into_item()?;
            if !seen.insert(item.uid().to_string()) {
                return Err(LoadError::DuplicateUid(item.uid().to_string()));
            }
            document.insert(item);
        }
        debug!("loaded {} items into {}", document.len(), document.prefix());
        documents.push(document);
    }

    Ok(Tree::new(documents))
}

#[derive(Debug, Deserialize)]
#[serde(from = "ManifestVersion")]
struct Manifest {
    documents: Vec<DocumentSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "_version")]
enum ManifestVersion {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        documents: Vec<DocumentSpec>,
    },
}

impl From<ManifestVersion> for Manifest {
    fn from(version: ManifestVersion) -> Self {
        match version {
            ManifestVersion::V1 { documents } => Self { documents },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocumentSpec {
    prefix: String,
    name: String,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    publish: Vec<String>,
    #[serde(default)]
    assets: Option<PathBuf>,
    #[serde(default)]
    items: Vec<ItemSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ItemSpec {
    uid: String,
    level: LevelSpec,
    #[serde(default)]
    heading: bool,
    #[serde(default)]
    header: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default, rename = "ref")]
    keyword: Option<String>,
    #[serde(default)]
    ref_location: Option<ReferenceSpec>,
    #[serde(default)]
    references: Vec<ReferenceSpec>,
    #[serde(default)]
    links: Vec<String>,
    #[serde(default)]
    stakeholder: Option<String>,
    #[serde(default)]
    data: BTreeMap<String, Value>,
}

/// Levels may be written as `1.2` (a YAML number) or `"1.2.0"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LevelSpec {
    Integer(u32),
    Float(f64),
    Text(String),
}

impl LevelSpec {
    fn text(&self) -> String {
        match self {
            Self::Integer(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReferenceSpec {
    path: String,
    #[serde(default)]
    line: Option<usize>,
}

impl From<ReferenceSpec> for Reference {
    fn from(spec: ReferenceSpec) -> Self {
        Self {
            path: spec.path,
            line: spec.line,
        }
    }
}

impl ItemSpec {
    fn into_item(self) -> Result<Item, LoadError> {
        let uid = Uid::new(self.uid)?;
        let level: Level = self
            .level
            .text()
            .parse()
            .map_err(|source| LoadError::Level {
                uid: uid.to_string(),
                source,
            })?;
        let links = self
            .links
            .into_iter()
            .map(Uid::new)
            .collect::<Result<Vec<_>, _>>()?;

        let mut item = Item::new(uid, level)
            .with_heading(self.heading)
            .with_text(self.text)
            .with_links(links)
            .with_references(self.references.into_iter().map(Reference::from).collect());
        if let Some(header) = self.header {
            item = item.with_header(header);
        }
        if let Some(keyword) = self.keyword {
            item = item.with_ref(ExternalRef {
                keyword,
                location: self.ref_location.map(Reference::from),
            });
        }
        if let Some(stakeholder) = self.stakeholder {
            item = item.with_stakeholder(Uid::new(stakeholder)?);
        }
        for (name, value) in self.data {
            item = item.with_attribute(name, value);
        }
        Ok(item)
    }
}
