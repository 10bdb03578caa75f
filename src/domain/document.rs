use std::path::{Path, PathBuf};

use crate::domain::{Item, ItemView};

/// An ordered collection of items sharing a prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    prefix: String,
    name: String,
    parent: Option<String>,
    items: Vec<Item>,
    publish: Vec<String>,
    assets: Option<PathBuf>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
            parent: None,
            items: Vec::new(),
            publish: Vec::new(),
            assets: None,
        }
    }

    /// Set the prefix of the parent document in the tree.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the attributes shown in each item's attribute table.
    #[must_use]
    pub fn with_publish(mut self, publish: Vec<String>) -> Self {
        self.publish = publish;
        self
    }

    /// Set the directory of assets published alongside this document.
    #[must_use]
    pub fn with_assets(mut self, assets: impl Into<PathBuf>) -> Self {
        self.assets = Some(assets.into());
        self
    }

    /// Add an item, keeping items in level order.
    pub fn insert(&mut self, item: Item) {
        let index = self
            .items
            .partition_point(|existing| existing.level() <= item.level());
        self.items.insert(index, item);
    }

    /// Builder form of [`Document::insert`].
    #[must_use]
    pub fn with_item(mut self, item: Item) -> Self {
        self.insert(item);
        self
    }

    /// The document prefix, e.g. `REQ`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parent document's prefix, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Attribute names to publish.
    #[must_use]
    pub fn publish(&self) -> &[String] {
        &self.publish
    }

    /// The document's private asset directory.
    #[must_use]
    pub fn assets(&self) -> Option<&Path> {
        self.assets.as_deref()
    }

    /// Number of items, headings included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the document has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in level order, each paired with this document.
    pub fn items(&self) -> impl Iterator<Item = ItemView<'_>> + '_ {
        self.items.iter().map(move |item| ItemView {
            item,
            document: self,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use crate::domain::Item;

    fn item(uid: &str, level: &str) -> Item {
        Item::new(uid.parse().unwrap(), level.parse().unwrap())
    }

    #[test]
    fn items_are_kept_in_level_order() {
        let document = Document::new("REQ", "Requirements")
            .with_item(item("REQ3", "2.1"))
            .with_item(item("REQ1", "1.0"))
            .with_item(item("REQ2", "1.2"));

        let uids: Vec<_> = document.items().map(|view| view.uid_str()).collect();
        assert_eq!(uids, ["REQ1", "REQ2", "REQ3"]);
    }

    #[test]
    fn equal_levels_keep_insertion_order() {
        let document = Document::new("REQ", "Requirements")
            .with_item(item("REQ1", "1.1"))
            .with_item(item("REQ2", "1.1"));

        let uids: Vec<_> = document.items().map(|view| view.uid_str()).collect();
        assert_eq!(uids, ["REQ1", "REQ2"]);
    }
}
