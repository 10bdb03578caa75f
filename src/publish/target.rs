use std::{fmt, iter};

use crate::domain::{Document, ItemView, Tree};

/// Something that can be published.
#[derive(Debug, Clone)]
pub enum Publishable<'a> {
    /// A single item.
    Item(ItemView<'a>),
    /// An ordered selection of items.
    Items(Vec<ItemView<'a>>),
    /// One document.
    Document(&'a Document),
    /// Every document in a tree.
    Tree(&'a Tree),
}

impl<'a> Publishable<'a> {
    /// The items to render, in document order.
    ///
    /// A tree yields its documents' items in storage order.
    #[must_use]
    pub fn items(&self) -> Box<dyn Iterator<Item = ItemView<'a>> + 'a> {
        match self {
            Self::Item(item) => Box::new(iter::once(*item)),
            Self::Items(items) => Box::new(items.clone().into_iter()),
            Self::Document(document) => Box::new(document.items()),
            Self::Tree(tree) => Box::new(tree.items()),
        }
    }

    /// Whether this is a whole tree.
    #[must_use]
    pub const fn is_tree(&self) -> bool {
        matches!(self, Self::Tree(_))
    }

    /// Whether there is nothing to render.
    ///
    /// Documents always count as publishable, even with no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Item(_) | Self::Document(_) => false,
            Self::Items(items) => items.is_empty(),
            Self::Tree(tree) => tree.is_empty(),
        }
    }

    /// The document behind this object, if it is one.
    #[must_use]
    pub const fn document(&self) -> Option<&'a Document> {
        match self {
            Self::Document(document) => Some(document),
            _ => None,
        }
    }
}

impl fmt::Display for Publishable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(item) => write!(f, "item {}", item.uid()),
            Self::Items(items) => write!(f, "{} items", items.len()),
            Self::Document(document) => write!(f, "document {}", document.prefix()),
            Self::Tree(tree) => write!(f, "tree of {} documents", tree.documents().len()),
        }
    }
}

impl<'a> From<ItemView<'a>> for Publishable<'a> {
    fn from(item: ItemView<'a>) -> Self {
        Self::Item(item)
    }
}

impl<'a> From<&'a Document> for Publishable<'a> {
    fn from(document: &'a Document) -> Self {
        Self::Document(document)
    }
}

impl<'a> From<&'a Tree> for Publishable<'a> {
    fn from(tree: &'a Tree) -> Self {
        Self::Tree(tree)
    }
}
