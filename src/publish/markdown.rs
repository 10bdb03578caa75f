use crate::{
    domain::{Category, ItemView, Reference, Settings},
    publish::{
        attributes,
        links::{self, LinkSyntax},
        RenderContext,
    },
};

/// Which Markdown dialect to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Markdown published as-is.
    Standard,
    /// Markdown converted to HTML.
    ///
    /// Every heading carries its uid anchor, so tables of contents and links
    /// from other pages resolve whether or not this page links out.
    Html,
    /// Markdown destined for the combined PDF.
    ///
    /// Levels are renumbered with the document's position, and unless
    /// linkify was asked for, anchors are dropped and the priority moves
    /// next to the uid.
    Pdf {
        /// 1-based position of the document in the PDF.
        document: usize,
    },
}

/// Render items as Markdown.
pub fn lines<'a>(
    items: impl Iterator<Item = ItemView<'a>> + 'a,
    ctx: RenderContext<'a>,
    flavor: Flavor,
) -> impl Iterator<Item = String> + 'a {
    items.flat_map(move |item| item_lines(item, ctx, flavor))
}

fn item_lines(item: ItemView<'_>, ctx: RenderContext<'_>, flavor: Flavor) -> Vec<String> {
    let settings = ctx.settings;
    let linkify = ctx.linkify;
    let pdf = matches!(flavor, Flavor::Pdf { .. });
    let inline_priority = pdf && !linkify;
    let hashes = "#".repeat(item.depth());
    let level = match flavor {
        Flavor::Standard | Flavor::Html => item.level().label(),
        Flavor::Pdf { document } => item.level().renumbered(document),
    };
    let anchor = if linkify || flavor == Flavor::Html {
        format!(" {{#{}}}", item.uid())
    } else {
        String::new()
    };
    let mut out = Vec::new();

    if item.is_heading() {
        let mut text = item.text().lines();
        let title = text.next().unwrap_or_default();
        out.push(if settings.publish_heading_levels {
            format!("{hashes} {level} {title}{anchor}")
        } else {
            format!("{hashes} {title}{anchor}")
        });
        out.extend(text.map(str::to_string));
        out.push(String::new());
        return out;
    }

    let mut label = heading_label(item, settings);
    if inline_priority {
        if let Some(priority) = attributes::priority(item) {
            label.push_str(&format!(" <small>({priority})</small>"));
        }
    }
    out.push(if settings.publish_body_levels {
        format!("{hashes} {level} {label}{anchor}")
    } else {
        format!("{hashes} {label}{anchor}")
    });

    out.extend(attributes::risk_table(item));

    if !item.text().is_empty() {
        out.push(String::new());
        out.extend(item.text().lines().map(str::to_string));
    }

    if let Some(reference) = item.reference() {
        let shown = match &reference.location {
            Some(location) if settings.check_ref => location_text(location),
            _ => format!("'{}'", reference.keyword),
        };
        out.push(String::new());
        out.push(format!("> {shown}"));
    }

    if !item.references().is_empty() {
        out.push(String::new());
        out.extend(item.references().iter().map(|reference| {
            if settings.check_ref {
                format!("> {}", location_text(reference))
            } else {
                format!("> '{}'", unix_path(&reference.path))
            }
        }));
    }

    if let Some(stakeholder) = ctx.index.stakeholder(item) {
        out.push(String::new());
        out.push(label_links(
            "Stakeholder:",
            &links::format_link(stakeholder, LinkSyntax::Markdown, linkify),
            linkify,
        ));
    }

    if !inline_priority {
        if let Some(priority) = attributes::priority(item) {
            out.push(String::new());
            out.push(format!("Priority: {priority}"));
        }
    }

    let issues = attributes::jira_issues(item);
    if !issues.is_empty() {
        let jira_url = settings.jira_url.trim_end_matches('/');
        let issues = issues
            .iter()
            .map(|key| format!("[{key}]({jira_url}/browse/{key})"))
            .collect::<Vec<_>>()
            .join(", ");
        out.push(String::new());
        out.push(label_links("Jira issues:", &issues, linkify));
    }

    for section in links::all_sections(
        item,
        ctx.index,
        LinkSyntax::Markdown,
        linkify,
        settings.publish_child_links,
    ) {
        out.push(String::new());
        out.push(label_links(section.label, &section.links, linkify));
    }

    let published = attributes::published(item);
    if !published.is_empty() {
        out.push(String::new());
        out.push("| Attribute | Value |".to_string());
        out.push("| --------- | ----- |".to_string());
        out.extend(
            published
                .into_iter()
                .map(|(name, value)| format!("| {name} | {value} |")),
        );
        out.push(String::new());
    }

    out.push(String::new());
    out
}

/// The heading text for a non-heading item.
///
/// With headers enabled the header leads, the uid follows in small print,
/// and an implemented badge is appended when the attribute is set.
fn heading_label(item: ItemView<'_>, settings: &Settings) -> String {
    let uid = item.uid();
    if !settings.enable_headers {
        return uid.to_string();
    }
    let mut label = match item.header() {
        Some(header) if item.category() == Category::Head => header.to_string(),
        Some(header) => format!("{header} <small>{uid}</small>"),
        None => uid.to_string(),
    };
    if let Some(implemented) = attributes::implemented(item) {
        label.push(' ');
        label.push_str(&attributes::implemented_badge(implemented));
    }
    label
}

fn label_links(label: &str, links: &str, linkify: bool) -> String {
    if linkify {
        format!("*{label}* {links}")
    } else {
        format!("*{label} {links}*")
    }
}

fn location_text(reference: &Reference) -> String {
    let path = unix_path(&reference.path);
    match reference.line {
        Some(line) => format!("`{path}` (line {line})"),
        None => format!("`{path}`"),
    }
}

fn unix_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// The title shown for an item in a table of contents.
fn toc_title<'a>(item: &'a ItemView<'_>) -> &'a str {
    if item.is_heading() {
        item.heading_line()
    } else {
        item.header().unwrap_or_else(|| item.uid().as_str())
    }
}

/// A Markdown table of contents for the given items.
///
/// Top-level entries are bulleted with ` * `, deeper entries are indented
/// four spaces per level.
pub fn table_of_contents<'a>(
    items: impl Iterator<Item = ItemView<'a>>,
    settings: &Settings,
    linkify: bool,
) -> String {
    let mut toc = String::from("### Table of Contents\n\n");
    for item in items {
        let depth = item.depth();
        let bullet = if depth <= 1 {
            " * ".to_string()
        } else {
            format!("{}* ", "    ".repeat(depth - 1))
        };
        let title = toc_title(&item);
        let label = if settings.publish_heading_levels {
            format!("{} {title}", item.level().label())
        } else {
            title.to_string()
        };
        if linkify {
            toc.push_str(&format!("{bullet}[{label}](#{})\n", item.uid()));
        } else {
            toc.push_str(&format!("{bullet}{label}\n"));
        }
    }
    toc
}

/// Table of contents entries for the top-level items of one document in a
/// combined PDF.
pub fn pdf_contents<'a>(items: impl Iterator<Item = ItemView<'a>>, document: usize) -> Vec<String> {
    items
        .filter(|item| item.depth() == 1)
        .map(|item| {
            format!(
                " * {} {}",
                item.level().renumbered(document),
                toc_title(&item)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_yaml::Value;

    use super::*;
    use crate::{
        domain::{Document, Item, LinkIndex, Tree},
        publish::uml::tests::NoDiagrams,
    };

    fn item(uid: &str, level: &str) -> Item {
        Item::new(uid.parse().unwrap(), level.parse().unwrap())
    }

    fn tree() -> Tree {
        Tree::new(vec![
            Document::new("REQ", "Requirements")
                .with_item(item("REQ1", "1.0").with_heading(true).with_text("Intro"))
                .with_item(
                    item("REQ2", "1.1")
                        .with_header("Speed")
                        .with_text("Go fast")
                        .with_attribute("prio", 2)
                        .with_attribute("implemented", true),
                ),
            Document::new("TST", "Tests")
                .with_parent("REQ")
                .with_item(item("TST1", "1.0").with_links(vec!["REQ2".parse().unwrap()])),
        ])
    }

    fn render(tree: &Tree, settings: &Settings, linkify: bool, flavor: Flavor) -> Vec<String> {
        let index = LinkIndex::new(tree);
        let ctx = RenderContext::new(settings, &index, &NoDiagrams).with_linkify(linkify);
        let document = tree.document("REQ").unwrap();
        lines(document.items(), ctx, flavor).collect()
    }

    #[test]
    fn standard_linkified() {
        let lines = render(&tree(), &Settings::default(), true, Flavor::Standard);

        assert_eq!(
            lines,
            vec![
                "# 1.0 Intro {#REQ1}",
                "",
                "## 1.1 Speed <small>REQ2</small> <small><span class=\"label label-success\" title=\"Implemented\">✓</span></small> {#REQ2}",
                "",
                "Go fast",
                "",
                "Priority: 2",
                "",
                "*Child links:* [TST1](TST.html#TST1 \"\")",
                "",
            ]
        );
    }

    #[test]
    fn plain_without_headers() {
        let settings = Settings {
            enable_headers: false,
            publish_body_levels: false,
            ..Settings::default()
        };

        let lines = render(&tree(), &settings, false, Flavor::Standard);

        assert_eq!(lines[2], "## REQ2");
        assert_eq!(lines[8], "*Child links: TST1*");
    }

    #[test]
    fn pdf_renumbers_and_inlines_priority() {
        let lines = render(&tree(), &Settings::default(), false, Flavor::Pdf { document: 3 });

        assert_eq!(lines[0], "# 3 Intro");
        assert!(
            lines[2].starts_with("## 3.1 Speed <small>REQ2</small>"),
            "{}",
            lines[2]
        );
        assert!(lines[2].ends_with("<small>(2)</small>"), "{}", lines[2]);
        assert!(!lines.iter().any(|line| line.starts_with("Priority:")));
    }

    #[test]
    fn toc_nests_by_depth() {
        let tree = tree();
        let document = tree.document("REQ").unwrap();

        let toc = table_of_contents(document.items(), &Settings::default(), true);

        assert_eq!(
            toc,
            "### Table of Contents\n\n * [1.0 Intro](#REQ1)\n    * [1.1 Speed](#REQ2)\n"
        );
    }

    #[test]
    fn pdf_contents_lists_top_level_only() {
        let tree = tree();
        let document = tree.document("REQ").unwrap();

        assert_eq!(pdf_contents(document.items(), 2), vec![" * 2 Intro"]);
    }

    fn stakeholder_tree() -> Tree {
        let jira: Value = serde_yaml::from_str("[ABC-1, ABC-2]").unwrap();
        Tree::new(vec![
            Document::new("ROLE", "Roles").with_item(item("ROLE1", "1.0")),
            Document::new("REQ", "Requirements").with_item(
                item("REQ1", "1.0")
                    .with_text("Do X")
                    .with_stakeholder("ROLE1".parse().unwrap())
                    .with_attribute("jira", jira)
                    .with_references(vec![
                        Reference {
                            path: "src/a.rs".to_string(),
                            line: Some(3),
                        },
                        Reference {
                            path: "tests\\b.rs".to_string(),
                            line: None,
                        },
                    ]),
            ),
        ])
    }

    fn render_item(tree: &Tree, settings: &Settings, uid: &str, linkify: bool) -> Vec<String> {
        let index = LinkIndex::new(tree);
        let ctx = RenderContext::new(settings, &index, &NoDiagrams).with_linkify(linkify);
        let item = index.find(uid).unwrap();
        lines(std::iter::once(item), ctx, Flavor::Standard).collect()
    }

    #[test]
    fn stakeholder_jira_and_references() {
        let settings = Settings {
            jira_url: "https://jira.example.com/".to_string(),
            ..Settings::default()
        };

        let lines = render_item(&stakeholder_tree(), &settings, "REQ1", false);

        assert_eq!(
            lines,
            vec![
                "# 1.0 REQ1",
                "",
                "Do X",
                "",
                "> 'src/a.rs'",
                "> 'tests/b.rs'",
                "",
                "*Stakeholder: ROLE1*",
                "",
                "*Jira issues: [ABC-1](https://jira.example.com/browse/ABC-1), [ABC-2](https://jira.example.com/browse/ABC-2)*",
                "",
            ]
        );
    }

    #[test]
    fn checked_references_show_locations() {
        let settings = Settings {
            check_ref: true,
            ..Settings::default()
        };

        let lines = render_item(&stakeholder_tree(), &settings, "REQ1", true);

        assert_eq!(lines[4], "> `src/a.rs` (line 3)");
        assert_eq!(lines[5], "> `tests/b.rs`");
        assert_eq!(lines[7], "*Stakeholder:* [ROLE1](ROLE.html#ROLE1 \"\")");
    }

    #[test]
    fn stakeholder_derived_links() {
        let lines = render_item(&stakeholder_tree(), &Settings::default(), "ROLE1", true);

        assert_eq!(
            lines,
            vec![
                "# 1.0 ROLE1 {#ROLE1}",
                "",
                "*Requirements linked to stakeholder:* [REQ1](REQ.html#REQ1 \"Do X\")",
                "",
            ]
        );
    }

    #[test]
    fn stakeholder_derived_links_follow_child_link_toggle() {
        let settings = Settings {
            publish_child_links: false,
            ..Settings::default()
        };

        let lines = render_item(&stakeholder_tree(), &settings, "ROLE1", false);

        assert_eq!(lines, vec!["# 1.0 ROLE1", ""]);
    }
}
