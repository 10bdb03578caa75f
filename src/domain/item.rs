use std::{collections::BTreeMap, ops::Deref};

use serde_yaml::Value;

use crate::domain::{Category, Document, Level, Uid};

/// A single requirement record, or a section heading.
///
/// Items are built by whatever loads the requirement tree and are never
/// modified while publishing.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    uid: Uid,
    level: Level,
    heading: bool,
    header: Option<String>,
    text: String,
    reference: Option<ExternalRef>,
    references: Vec<Reference>,
    links: Vec<Uid>,
    stakeholder: Option<Uid>,
    data: BTreeMap<String, Value>,
}

/// A pointer from an item into a file outside the requirement tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Path of the referenced file, relative to the project root.
    pub path: String,
    /// Line within the file, if the reference was resolved to one.
    pub line: Option<usize>,
}

/// A keyword reference, optionally resolved to a location.
///
/// The keyword is searched for in the project by an external reference
/// checker. When that checker has run, `location` holds where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRef {
    /// The raw keyword as written on the item.
    pub keyword: String,
    /// Where the keyword was found.
    pub location: Option<Reference>,
}

impl Item {
    /// Create an item with empty text and no relationships.
    #[must_use]
    pub const fn new(uid: Uid, level: Level) -> Self {
        Self {
            uid,
            level,
            heading: false,
            header: None,
            text: String::new(),
            reference: None,
            references: Vec::new(),
            links: Vec::new(),
            stakeholder: None,
            data: BTreeMap::new(),
        }
    }

    /// Mark the item as a section heading.
    #[must_use]
    pub fn with_heading(mut self, heading: bool) -> Self {
        self.heading = heading;
        self
    }

    /// Set the short title shown in place of the uid.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Set the body text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the keyword reference.
    #[must_use]
    pub fn with_ref(mut self, reference: ExternalRef) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Set the file references.
    #[must_use]
    pub fn with_references(mut self, references: Vec<Reference>) -> Self {
        self.references = references;
        self
    }

    /// Set the parent links.
    #[must_use]
    pub fn with_links(mut self, links: Vec<Uid>) -> Self {
        self.links = links;
        self
    }

    /// Set the stakeholder.
    #[must_use]
    pub fn with_stakeholder(mut self, stakeholder: Uid) -> Self {
        self.stakeholder = Some(stakeholder);
        self
    }

    /// Set a custom attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    /// The item's unique identifier.
    #[must_use]
    pub const fn uid(&self) -> &Uid {
        &self.uid
    }

    /// The item's position within its document.
    #[must_use]
    pub const fn level(&self) -> &Level {
        &self.level
    }

    /// The number of segments in the item's level.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.level.depth()
    }

    /// Whether this item is a section heading rather than a requirement.
    #[must_use]
    pub const fn is_heading(&self) -> bool {
        self.heading
    }

    /// The optional short title.
    #[must_use]
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref().filter(|header| !header.is_empty())
    }

    /// The body text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The first line of the text, used as a heading title.
    #[must_use]
    pub fn heading_line(&self) -> &str {
        self.text.lines().next().unwrap_or_default()
    }

    /// The keyword reference.
    #[must_use]
    pub const fn reference(&self) -> Option<&ExternalRef> {
        self.reference.as_ref()
    }

    /// The file references.
    #[must_use]
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// The uids of the items this item depends on.
    #[must_use]
    pub fn links(&self) -> &[Uid] {
        &self.links
    }

    /// The uid of the stakeholder item.
    #[must_use]
    pub const fn stakeholder(&self) -> Option<&Uid> {
        self.stakeholder.as_ref()
    }

    /// Look up a custom attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// All custom attributes.
    #[must_use]
    pub const fn data(&self) -> &BTreeMap<String, Value> {
        &self.data
    }

    /// The category implied by the uid.
    #[must_use]
    pub fn category(&self) -> Category {
        Category::of(&self.uid)
    }
}

/// A borrowed item together with the document that owns it.
#[derive(Debug, Clone, Copy)]
pub struct ItemView<'a> {
    /// The item.
    pub item: &'a Item,
    /// The document the item belongs to.
    pub document: &'a Document,
}

impl<'a> ItemView<'a> {
    /// The owning document's prefix.
    #[must_use]
    pub fn prefix(&self) -> &'a str {
        self.document.prefix()
    }

    /// The uid as a string slice with the view's lifetime.
    #[must_use]
    pub fn uid_str(&self) -> &'a str {
        self.item.uid.as_str()
    }
}

impl Deref for ItemView<'_> {
    type Target = Item;

    fn deref(&self) -> &Self::Target {
        self.item
    }
}

impl PartialEq for ItemView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.item.uid == other.item.uid
    }
}

impl Eq for ItemView<'_> {}
