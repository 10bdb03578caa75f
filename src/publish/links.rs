use html_escape::encode_quoted_attribute;

use crate::domain::{Category, ItemView, LinkIndex, Related};

/// How a group of links relates to the item being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Items this item links to.
    Parent,
    /// Items linking to this item.
    Child,
    /// Items naming this item as their stakeholder.
    Stakeholder,
}

/// The bucket a linked item is grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bucket {
    /// Plain requirements, and anything without a more specific bucket.
    Requirement,
    /// `USECASE*` items.
    UseCase,
    /// `TEST*` items.
    Test,
    /// `RISK*` items.
    Risk,
}

impl Bucket {
    /// The bucket for a uid.
    #[must_use]
    pub fn of(uid: &str) -> Self {
        match Category::of(uid) {
            Category::UseCase => Self::UseCase,
            Category::Test => Self::Test,
            Category::Risk => Self::Risk,
            Category::Requirement | Category::Role | Category::Head => Self::Requirement,
        }
    }

    /// The section label for this bucket.
    ///
    /// `owner` is the category of the item being rendered. When child links
    /// are disabled the requirement bucket of parent links is labelled
    /// plainly as `Links:`.
    #[must_use]
    pub const fn label(self, direction: Direction, owner: Category, child_links: bool) -> &'static str {
        match (direction, self) {
            (Direction::Parent, Self::Requirement) => match owner {
                _ if !child_links => "Links:",
                Category::Test => "Requirements:",
                _ => "Parent links:",
            },
            (Direction::Child, Self::Requirement) => match owner {
                Category::UseCase => "Requirements:",
                Category::Risk => "Requirements for mitigating the risk:",
                _ => "Child links:",
            },
            (Direction::Parent | Direction::Child, Self::UseCase) => "Use cases:",
            (Direction::Parent | Direction::Child, Self::Test) => "Tests:",
            (Direction::Parent | Direction::Child, Self::Risk) => "Risks:",
            (Direction::Stakeholder, Self::Requirement) => "Requirements linked to stakeholder:",
            (Direction::Stakeholder, Self::UseCase) => "Use cases linked to stakeholder:",
            (Direction::Stakeholder, Self::Test) => "Tests linked to stakeholder:",
            (Direction::Stakeholder, Self::Risk) => "Risks linked to stakeholder:",
        }
    }
}

/// Surface syntax for a rendered link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSyntax {
    /// Bare uids.
    Plain,
    /// Markdown links to the item's page anchor.
    Markdown,
    /// HTML anchors.
    Html,
}

/// A labelled group of links, ready to be wrapped by a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSection {
    /// The section label, including its trailing colon.
    pub label: &'static str,
    /// The rendered links, comma separated.
    pub links: String,
}

/// Group related items into buckets and render each non-empty bucket.
///
/// Buckets appear in a fixed order (requirements, use cases, tests, risks)
/// and links within a bucket are sorted by uid.
#[must_use]
pub fn sections<'a>(
    owner: ItemView<'a>,
    direction: Direction,
    related: impl IntoIterator<Item = Related<'a>>,
    syntax: LinkSyntax,
    linkify: bool,
    child_links: bool,
) -> Vec<LinkSection> {
    let mut buckets: Vec<(Bucket, Related<'a>)> = related
        .into_iter()
        .map(|related| (Bucket::of(related.uid()), related))
        .collect();
    buckets.sort_by(|(a, x), (b, y)| a.cmp(b).then_with(|| x.uid().cmp(y.uid())));

    let mut sections: Vec<LinkSection> = Vec::new();
    let mut current: Option<Bucket> = None;
    for (bucket, related) in buckets {
        let link = format_link(related, syntax, linkify);
        match sections.last_mut() {
            Some(section) if current == Some(bucket) => {
                section.links.push_str(", ");
                section.links.push_str(&link);
            }
            _ => {
                current = Some(bucket);
                sections.push(LinkSection {
                    label: bucket.label(direction, owner.category(), child_links),
                    links: link,
                });
            }
        }
    }
    sections
}

/// Every link section for an item: parents, then (when enabled) children and
/// stakeholder-derived items.
#[must_use]
pub fn all_sections<'a>(
    item: ItemView<'a>,
    index: &LinkIndex<'a>,
    syntax: LinkSyntax,
    linkify: bool,
    child_links: bool,
) -> Vec<LinkSection> {
    let mut all = sections(
        item,
        Direction::Parent,
        index.parents(item),
        syntax,
        linkify,
        child_links,
    );
    if child_links {
        all.extend(sections(
            item,
            Direction::Child,
            index.children(item.uid_str()).into_iter().map(Related::Item),
            syntax,
            linkify,
            child_links,
        ));
        all.extend(sections(
            item,
            Direction::Stakeholder,
            index
                .stakeholder_items(item.uid_str())
                .iter()
                .copied()
                .map(Related::Item),
            syntax,
            linkify,
            child_links,
        ));
    }
    all
}

/// Render one related item in the requested syntax.
///
/// Dangling uids and non-linkified output are shown as the bare uid.
#[must_use]
pub fn format_link(related: Related<'_>, syntax: LinkSyntax, linkify: bool) -> String {
    let Some(item) = related.item().filter(|_| linkify) else {
        return related.uid().to_string();
    };
    let uid = item.uid_str();
    let prefix = item.prefix();
    let title = link_title(item);
    match syntax {
        LinkSyntax::Plain => uid.to_string(),
        LinkSyntax::Markdown => {
            let text = item.header().unwrap_or(uid);
            format!("[{text}]({prefix}.html#{uid} \"{title}\")")
        }
        LinkSyntax::Html => {
            let text = item
                .header()
                .map_or_else(|| uid.to_string(), |header| format!("{uid} {header}"));
            format!("<a href=\"{prefix}.html#{uid}\" title=\"{title}\">{text}</a>")
        }
    }
}

/// An HTML anchor to an item, labelled with its uid.
#[must_use]
pub fn anchor(item: ItemView<'_>) -> String {
    format!(
        "<a title=\"{}\" href=\"{}.html#{}\">{}</a>",
        link_title(item),
        item.prefix(),
        item.uid_str(),
        item.uid_str()
    )
}

/// The hover title for a link: the item's text, escaped for an attribute,
/// with line breaks folded into double spaces.
fn link_title(item: ItemView<'_>) -> String {
    encode_quoted_attribute(item.text()).replace('\n', "  ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;
    use crate::domain::{Document, Item, Tree};

    fn item(uid: &str) -> Item {
        Item::new(uid.parse().unwrap(), "1.0".parse().unwrap())
    }

    fn tree() -> Tree {
        Tree::new(vec![
            Document::new("REQ", "Requirements")
                .with_item(
                    item("REQ1")
                        .with_text("Do \"X\"\nquickly")
                        .with_links(vec!["USECASE1".parse().unwrap(), "GONE9".parse().unwrap()]),
                )
                .with_item(item("REQ2").with_header("Second")),
            Document::new("USECASE", "Use cases").with_item(item("USECASE1")),
            Document::new("TEST", "Tests").with_item(
                item("TEST1").with_links(vec!["REQ1".parse().unwrap(), "REQ2".parse().unwrap()]),
            ),
        ])
    }

    #[test_case(Direction::Parent, Bucket::Requirement, Category::Requirement, true, "Parent links:")]
    #[test_case(Direction::Parent, Bucket::Requirement, Category::Test, true, "Requirements:")]
    #[test_case(Direction::Parent, Bucket::Requirement, Category::Requirement, false, "Links:")]
    #[test_case(Direction::Parent, Bucket::UseCase, Category::Requirement, true, "Use cases:")]
    #[test_case(Direction::Child, Bucket::Requirement, Category::Requirement, true, "Child links:")]
    #[test_case(Direction::Child, Bucket::Requirement, Category::UseCase, true, "Requirements:")]
    #[test_case(Direction::Child, Bucket::Requirement, Category::Risk, true, "Requirements for mitigating the risk:")]
    #[test_case(Direction::Child, Bucket::Test, Category::Requirement, true, "Tests:")]
    #[test_case(Direction::Stakeholder, Bucket::Risk, Category::Role, true, "Risks linked to stakeholder:")]
    fn labels(direction: Direction, bucket: Bucket, owner: Category, child_links: bool, expected: &str) {
        assert_eq!(bucket.label(direction, owner, child_links), expected);
    }

    #[test]
    fn parent_sections_group_by_bucket() {
        let tree = tree();
        let index = LinkIndex::new(&tree);
        let req1 = index.find("REQ1").unwrap();

        let sections = all_sections(req1, &index, LinkSyntax::Plain, false, true);

        assert_eq!(
            sections,
            vec![
                LinkSection {
                    label: "Parent links:",
                    links: "GONE9".to_string(),
                },
                LinkSection {
                    label: "Use cases:",
                    links: "USECASE1".to_string(),
                },
                LinkSection {
                    label: "Tests:",
                    links: "TEST1".to_string(),
                },
            ]
        );
    }

    #[test]
    fn child_sections_hidden_when_disabled() {
        let tree = tree();
        let index = LinkIndex::new(&tree);
        let req2 = index.find("REQ2").unwrap();

        assert!(all_sections(req2, &index, LinkSyntax::Plain, false, false).is_empty());
    }

    #[test]
    fn markdown_link_escapes_title() {
        let tree = tree();
        let index = LinkIndex::new(&tree);
        let req1 = index.resolve("REQ1");

        assert_eq!(
            format_link(req1, LinkSyntax::Markdown, true),
            "[REQ1](REQ.html#REQ1 \"Do &quot;X&quot;  quickly\")"
        );
    }

    #[test]
    fn html_link_includes_header() {
        let tree = tree();
        let index = LinkIndex::new(&tree);
        let req2 = index.resolve("REQ2");

        assert_eq!(
            format_link(req2, LinkSyntax::Html, true),
            "<a href=\"REQ.html#REQ2\" title=\"\">REQ2 Second</a>"
        );
    }

    #[test]
    fn dangling_and_plain_links_are_bare_uids() {
        let tree = tree();
        let index = LinkIndex::new(&tree);

        assert_eq!(format_link(index.resolve("GONE9"), LinkSyntax::Html, true), "GONE9");
        assert_eq!(format_link(index.resolve("REQ2"), LinkSyntax::Markdown, false), "REQ2");
    }
}
