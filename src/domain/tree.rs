//! The tree of documents and the link queries publishing needs.
//!
//! The [`Tree`] owns documents in tree order. Cross-document queries (parent
//! items, child items, items sharing a stakeholder) go through a
//! [`LinkIndex`], built once and queried per item.

use std::collections::{BTreeMap, HashMap};

use petgraph::{graphmap::DiGraphMap, Direction};
use tracing::{debug, instrument};

use crate::domain::{Document, ItemView};

/// The full set of documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    documents: Vec<Document>,
}

/// One traceability slice: a slot per document in tree order.
pub type TraceRow<'a> = Vec<Option<ItemView<'a>>>;

impl Tree {
    /// Create a tree from documents in tree order.
    #[must_use]
    pub const fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Append a document.
    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Documents in tree order.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Documents sorted by prefix.
    #[must_use]
    pub fn sorted_documents(&self) -> Vec<&Document> {
        let mut documents: Vec<_> = self.documents.iter().collect();
        documents.sort_by(|a, b| a.prefix().cmp(b.prefix()));
        documents
    }

    /// Look up a document by prefix.
    #[must_use]
    pub fn document(&self, prefix: &str) -> Option<&Document> {
        self.documents.iter().find(|document| document.prefix() == prefix)
    }

    /// Whether the tree has no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Every item of every document, in tree order.
    pub fn items(&self) -> impl Iterator<Item = ItemView<'_>> + '_ {
        self.documents.iter().flat_map(Document::items)
    }

    /// Find an item by uid.
    #[must_use]
    pub fn find(&self, uid: &str) -> Option<ItemView<'_>> {
        self.items().find(|item| item.uid_str() == uid)
    }

    /// Draw the document hierarchy with box-drawing connectors.
    ///
    /// ```text
    /// REQ
    /// │
    /// ├── TUT
    /// │   │
    /// │   └── HLT
    /// │
    /// └── LLT
    /// ```
    #[must_use]
    pub fn draw(&self) -> String {
        let roots = self.sorted_documents().into_iter().filter(|document| {
            document
                .parent()
                .is_none_or(|parent| self.document(parent).is_none())
        });

        roots
            .map(|root| self.draw_lines(root, 0).join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn draw_lines(&self, document: &Document, depth: usize) -> Vec<String> {
        let mut lines = vec![document.prefix().to_string()];
        // guard against parent cycles in malformed input
        if depth > self.documents.len() {
            return lines;
        }

        let children: Vec<_> = self
            .sorted_documents()
            .into_iter()
            .filter(|child| child.parent() == Some(document.prefix()))
            .collect();

        for (index, child) in children.iter().enumerate() {
            let last = index + 1 == children.len();
            let (branch, continuation) = if last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            lines.push("│".to_string());
            for (line_no, line) in self.draw_lines(child, depth + 1).into_iter().enumerate() {
                let lead = if line_no == 0 { branch } else { continuation };
                lines.push(format!("{lead}{line}").trim_end().to_string());
            }
        }

        lines
    }

    /// Collect traceability slices across documents.
    ///
    /// Every non-heading item contributes the chains reachable by walking
    /// only upwards through its parents and only downwards through its
    /// children. Each row has one slot per document in tree order. Rows are
    /// de-duplicated and sorted by uid, with empty slots after filled ones.
    ///
    /// `index` must have been built from this tree.
    #[instrument(level = "debug", skip_all)]
    #[must_use]
    pub fn traceability<'a>(&'a self, index: &LinkIndex<'a>) -> Vec<TraceRow<'a>> {
        let slots: HashMap<&str, usize> = self
            .documents
            .iter()
            .enumerate()
            .map(|(slot, document)| (document.prefix(), slot))
            .collect();

        let mut rows = BTreeMap::new();
        for item in self.items().filter(|item| !item.is_heading()) {
            let walker = RowWalker {
                index,
                slots: &slots,
            };
            walker.walk(
                item,
                Walk::Both,
                vec![None; self.documents.len()],
                &mut Vec::new(),
                &mut rows,
            );
        }

        debug!(rows = rows.len(), "collected traceability rows");
        rows.into_values().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    Both,
    Up,
    Down,
}

struct RowWalker<'i, 'a> {
    index: &'i LinkIndex<'a>,
    slots: &'i HashMap<&'a str, usize>,
}

type RowKey<'a> = Vec<(bool, &'a str)>;

impl<'a> RowWalker<'_, 'a> {
    fn walk(
        &self,
        item: ItemView<'a>,
        walk: Walk,
        mut row: TraceRow<'a>,
        path: &mut Vec<&'a str>,
        rows: &mut BTreeMap<RowKey<'a>, TraceRow<'a>>,
    ) {
        if let Some(&slot) = self.slots.get(item.prefix()) {
            row[slot] = Some(item);
        }
        path.push(item.uid_str());

        let mut found = false;
        if matches!(walk, Walk::Both | Walk::Up) {
            for parent in self.index.parent_items(item) {
                if path.contains(&parent.uid_str()) {
                    continue;
                }
                found = true;
                self.walk(parent, Walk::Up, row.clone(), path, rows);
            }
        }
        if matches!(walk, Walk::Both | Walk::Down) {
            for child in self.index.children(item.uid_str()) {
                if path.contains(&child.uid_str()) {
                    continue;
                }
                found = true;
                self.walk(child, Walk::Down, row.clone(), path, rows);
            }
        }

        path.pop();
        if !found {
            let key = row
                .iter()
                .map(|slot| slot.map_or((true, ""), |item| (false, item.uid_str())))
                .collect();
            rows.entry(key).or_insert(row);
        }
    }
}

/// A related item, which may not exist in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Related<'a> {
    /// The uid resolved to an item.
    Item(ItemView<'a>),
    /// A dangling uid.
    Unknown(&'a str),
}

impl<'a> Related<'a> {
    /// The related uid.
    #[must_use]
    pub fn uid(&self) -> &'a str {
        match self {
            Self::Item(item) => item.uid_str(),
            Self::Unknown(uid) => uid,
        }
    }

    /// The resolved item, if any.
    #[must_use]
    pub const fn item(&self) -> Option<ItemView<'a>> {
        match self {
            Self::Item(item) => Some(*item),
            Self::Unknown(_) => None,
        }
    }
}

/// Reverse lookups over a [`Tree`].
///
/// Nodes are uids, edges point from child to parent. Incoming edges are
/// therefore children, which makes "who links to me" a neighbour query
/// instead of a scan over every item.
#[derive(Debug)]
pub struct LinkIndex<'a> {
    items: HashMap<&'a str, ItemView<'a>>,
    graph: DiGraphMap<&'a str, ()>,
    stakeholders: HashMap<&'a str, Vec<ItemView<'a>>>,
}

impl<'a> LinkIndex<'a> {
    /// Index every item in the tree.
    #[must_use]
    pub fn new(tree: &'a Tree) -> Self {
        let mut items = HashMap::new();
        let mut graph = DiGraphMap::new();
        let mut stakeholders: HashMap<&'a str, Vec<ItemView<'a>>> = HashMap::new();

        for item in tree.items() {
            let uid = item.uid_str();
            items.insert(uid, item);
            graph.add_node(uid);
            for parent in item.item.links() {
                graph.add_edge(uid, parent.as_str(), ());
            }
            if let Some(stakeholder) = item.item.stakeholder() {
                stakeholders
                    .entry(stakeholder.as_str())
                    .or_default()
                    .push(item);
            }
        }

        Self {
            items,
            graph,
            stakeholders,
        }
    }

    /// Find an item by uid.
    #[must_use]
    pub fn find(&self, uid: &str) -> Option<ItemView<'a>> {
        self.items.get(uid).copied()
    }

    /// Resolve a uid, keeping it when it does not exist.
    #[must_use]
    pub fn resolve(&self, uid: &'a str) -> Related<'a> {
        self.find(uid).map_or(Related::Unknown(uid), Related::Item)
    }

    /// The item's parent links in link order, dangling links included.
    #[must_use]
    pub fn parents(&self, item: ItemView<'a>) -> Vec<Related<'a>> {
        item.item
            .links()
            .iter()
            .map(|uid| self.resolve(uid.as_str()))
            .collect()
    }

    /// The item's parents that exist in the tree.
    pub fn parent_items(&self, item: ItemView<'a>) -> impl Iterator<Item = ItemView<'a>> + '_ {
        item.item
            .links()
            .iter()
            .filter_map(|uid| self.find(uid.as_str()))
    }

    /// Items in any document that link to `uid`, sorted by uid.
    #[must_use]
    pub fn children(&self, uid: &str) -> Vec<ItemView<'a>> {
        if !self.graph.contains_node(uid) {
            return Vec::new();
        }
        let mut children: Vec<_> = self
            .graph
            .neighbors_directed(uid, Direction::Incoming)
            .filter_map(|child| self.find(child))
            .collect();
        children.sort_by(|a, b| a.uid().cmp(b.uid()));
        children
    }

    /// The item's stakeholder.
    #[must_use]
    pub fn stakeholder(&self, item: ItemView<'a>) -> Option<Related<'a>> {
        item.item
            .stakeholder()
            .map(|uid| self.resolve(uid.as_str()))
    }

    /// Items naming `uid` as their stakeholder.
    #[must_use]
    pub fn stakeholder_items(&self, uid: &str) -> &[ItemView<'a>] {
        self.stakeholders
            .get(uid)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Item;

    fn item(uid: &str, level: &str, links: &[&str]) -> Item {
        Item::new(uid.parse().unwrap(), level.parse().unwrap())
            .with_links(links.iter().map(|link| link.parse().unwrap()).collect())
    }

    fn sample_tree() -> Tree {
        Tree::new(vec![
            Document::new("REQ", "Requirements")
                .with_item(item("REQ1", "1.0", &[]))
                .with_item(item("REQ2", "1.1", &[])),
            Document::new("TST", "Tests")
                .with_parent("REQ")
                .with_item(item("TEST1", "1.0", &["REQ1"]))
                .with_item(item("TEST2", "1.1", &["REQ1", "MISSING9"])),
        ])
    }

    fn uids(items: &[ItemView<'_>]) -> Vec<String> {
        items.iter().map(|item| item.uid().to_string()).collect()
    }

    #[test]
    fn children_are_found_across_documents() {
        let tree = sample_tree();
        let index = LinkIndex::new(&tree);

        assert_eq!(uids(&index.children("REQ1")), ["TEST1", "TEST2"]);
        assert!(index.children("REQ2").is_empty());
        assert!(index.children("NOPE").is_empty());
    }

    #[test]
    fn dangling_parents_are_kept_as_unknown() {
        let tree = sample_tree();
        let index = LinkIndex::new(&tree);
        let test2 = index.find("TEST2").unwrap();

        let parents = index.parents(test2);
        assert_eq!(parents.len(), 2);
        assert!(parents[0].item().is_some());
        assert_eq!(parents[1], Related::Unknown("MISSING9"));
        assert_eq!(index.parent_items(test2).count(), 1);
    }

    #[test]
    fn stakeholder_items_are_indexed() {
        let tree = Tree::new(vec![
            Document::new("ROLE", "Roles").with_item(item("ROLE1", "1.0", &[])),
            Document::new("REQ", "Requirements").with_item(
                item("REQ1", "1.0", &[]).with_stakeholder("ROLE1".parse().unwrap()),
            ),
        ]);
        let index = LinkIndex::new(&tree);

        assert_eq!(uids(index.stakeholder_items("ROLE1")), ["REQ1"]);
        let req1 = index.find("REQ1").unwrap();
        assert_eq!(index.stakeholder(req1).map(|s| s.uid()), Some("ROLE1"));
    }

    #[test]
    fn traceability_rows_follow_links() {
        let tree = sample_tree();
        let index = LinkIndex::new(&tree);
        let rows: Vec<Vec<Option<String>>> = tree
            .traceability(&index)
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|slot| slot.map(|item| item.uid().to_string()))
                    .collect()
            })
            .collect();

        assert_eq!(
            rows,
            vec![
                vec![Some("REQ1".to_string()), Some("TEST1".to_string())],
                vec![Some("REQ1".to_string()), Some("TEST2".to_string())],
                vec![Some("REQ2".to_string()), None],
            ]
        );
    }

    #[test]
    fn traceability_survives_cycles() {
        let tree = Tree::new(vec![Document::new("REQ", "Requirements")
            .with_item(item("REQ1", "1.0", &["REQ2"]))
            .with_item(item("REQ2", "1.1", &["REQ1"]))]);

        let index = LinkIndex::new(&tree);

        assert!(!tree.traceability(&index).is_empty());
    }

    #[test]
    fn draws_document_hierarchy() {
        let tree = Tree::new(vec![
            Document::new("REQ", "Requirements"),
            Document::new("TUT", "Tutorial").with_parent("REQ"),
            Document::new("HLT", "High level tests").with_parent("TUT"),
            Document::new("LLT", "Low level tests").with_parent("REQ"),
        ]);

        let expected = "REQ\n│\n├── LLT\n│\n└── TUT\n    │\n    └── HLT";
        assert_eq!(tree.draw(), expected);
    }

    #[test]
    fn empty_tree_draws_nothing() {
        assert_eq!(Tree::default().draw(), "");
    }
}
