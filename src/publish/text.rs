use crate::{
    domain::{ItemView, Reference},
    publish::{
        attributes,
        links::{self, LinkSyntax},
        RenderContext,
    },
};

/// Render items as wrapped plain text.
pub fn lines<'a>(
    items: impl Iterator<Item = ItemView<'a>> + 'a,
    ctx: RenderContext<'a>,
) -> impl Iterator<Item = String> + 'a {
    items.flat_map(move |item| item_lines(item, ctx))
}

fn item_lines(item: ItemView<'_>, ctx: RenderContext<'_>) -> Vec<String> {
    let settings = ctx.settings;
    let indent = ctx.indent;
    let level = item.level().label();
    let mut out = Vec::new();
    let fill = |text: &str| wrap(text, ctx.width, indent);

    if item.is_heading() {
        let mut text = item.text().lines();
        let title = text.next().unwrap_or_default();
        out.push(if settings.publish_heading_levels {
            format!("{level:<indent$}{title}")
        } else {
            title.to_string()
        });
        out.extend(text.map(str::to_string));
        out.push(String::new());
        return out;
    }

    let mut identity = item.uid().to_string();
    if let Some(header) = item.header() {
        identity = format!("{identity} {header}");
    }
    out.push(if settings.publish_body_levels {
        format!("{level:<indent$}{identity}")
    } else {
        identity
    });

    if !item.text().is_empty() {
        out.push(String::new());
        for line in item.text().lines() {
            let wrapped = fill(line);
            if wrapped.is_empty() {
                out.push(String::new());
            }
            out.extend(wrapped);
        }
    }

    if let Some(reference) = item.reference() {
        let shown = match &reference.location {
            Some(location) if settings.check_ref => location_text(location),
            _ => format!("'{}'", reference.keyword),
        };
        out.push(String::new());
        out.extend(fill(&format!("Reference: {shown}")));
    }

    if !item.references().is_empty() {
        let shown = item
            .references()
            .iter()
            .map(|reference| {
                if settings.check_ref {
                    location_text(reference)
                } else {
                    format!("'{}'", unix_path(&reference.path))
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        out.push(String::new());
        out.extend(fill(&format!("Reference: {shown}")));
    }

    if let Some(stakeholder) = ctx.index.stakeholder(item) {
        out.push(String::new());
        out.extend(fill(&format!("Stakeholder: {}", stakeholder.uid())));
    }

    if let Some(priority) = attributes::priority(item) {
        out.push(String::new());
        out.extend(fill(&format!("Priority: {priority}")));
    }

    if let Some(implemented) = attributes::implemented_text(item) {
        out.push(String::new());
        out.extend(fill(&format!("Implemented: {implemented}")));
    }

    let issues = attributes::jira_issues(item);
    if !issues.is_empty() {
        out.push(String::new());
        out.extend(fill(&format!("Jira issues: {}", issues.join(", "))));
    }

    for section in links::all_sections(
        item,
        ctx.index,
        LinkSyntax::Plain,
        false,
        settings.publish_child_links,
    ) {
        out.push(String::new());
        out.extend(fill(&format!("{} {}", section.label, section.links)));
    }

    let published = attributes::published(item);
    if !published.is_empty() {
        out.push(String::new());
        for (name, value) in published {
            out.extend(fill(&format!("{name}: {value}")));
        }
    }

    out.push(String::new());
    out
}

fn location_text(reference: &Reference) -> String {
    let path = unix_path(&reference.path);
    match reference.line {
        Some(line) => format!("{path} (line {line})"),
        None => path,
    }
}

fn unix_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Greedily fill lines of at most `width` characters, each indented by
/// `indent` spaces.
///
/// Runs of whitespace collapse to a single space. Words longer than the
/// available width are split. Blank input produces no lines.
pub fn wrap(text: &str, width: usize, indent: usize) -> Vec<String> {
    let available = width.saturating_sub(indent).max(1);
    let pad = " ".repeat(indent);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word = word;
        let mut len = word.chars().count();

        while len > available {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let split = word
                .char_indices()
                .nth(available)
                .map_or(word.len(), |(index, _)| index);
            lines.push(word[..split].to_string());
            word = &word[split..];
            len -= available;
        }

        if current_len == 0 {
            current.push_str(word);
            current_len = len;
        } else if current_len + 1 + len <= available {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + len;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            current_len = len;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }

    lines.into_iter().map(|line| format!("{pad}{line}")).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_yaml::Value;

    use super::*;
    use crate::{
        domain::{Document, ExternalRef, Item, LinkIndex, Settings, Tree},
        publish::{uml::tests::NoDiagrams, Publishable},
    };

    fn item(uid: &str, level: &str) -> Item {
        Item::new(uid.parse().unwrap(), level.parse().unwrap())
    }

    fn render(tree: &Tree, settings: &Settings) -> Vec<String> {
        let index = LinkIndex::new(tree);
        let ctx = RenderContext::new(settings, &index, &NoDiagrams);
        lines(Publishable::Tree(tree).items(), ctx).collect()
    }

    #[test]
    fn single_item() {
        let tree = Tree::new(vec![
            Document::new("REQ", "Requirements").with_item(item("REQ1", "1.0").with_text("Do X")),
        ]);

        let lines = render(&tree, &Settings::default());

        assert_eq!(lines, vec!["1.0     REQ1", "", "        Do X", ""]);
    }

    #[test]
    fn heading_keeps_remaining_lines_verbatim() {
        let tree = Tree::new(vec![Document::new("REQ", "Requirements").with_item(
            item("REQ1", "2.0")
                .with_heading(true)
                .with_text("Overview\nSecond line"),
        )]);

        let lines = render(&tree, &Settings::default());

        assert_eq!(lines, vec!["2.0     Overview", "Second line", ""]);
    }

    #[test]
    fn links_references_and_levels() {
        let tree = Tree::new(vec![
            Document::new("REQ", "Requirements")
                .with_item(
                    item("REQ1", "1.1")
                        .with_header("Start")
                        .with_ref(ExternalRef {
                            keyword: "start()".to_string(),
                            location: Some(Reference {
                                path: "src/main.c".to_string(),
                                line: Some(12),
                            }),
                        }),
                ),
            Document::new("TST", "Tests")
                .with_parent("REQ")
                .with_item(item("TST1", "1.1").with_links(vec!["REQ1".parse().unwrap()])),
        ]);
        let settings = Settings {
            publish_body_levels: false,
            check_ref: true,
            ..Settings::default()
        };

        let lines = render(&tree, &settings);

        assert_eq!(
            lines,
            vec![
                "REQ1 Start",
                "",
                "        Reference: src/main.c (line 12)",
                "",
                "        Child links: TST1",
                "",
                "TST1",
                "",
                "        Parent links: REQ1",
                "",
            ]
        );
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

    #[test]
    fn stakeholders_jira_and_checked_references() {
        let settings = Settings {
            check_ref: true,
            jira_url: "https://jira.example.com/".to_string(),
            ..Settings::default()
        };

        let lines = render(&stakeholder_tree(), &settings);

        assert_eq!(
            lines,
            vec![
                "1.0     ROLE1",
                "",
                "        Requirements linked to stakeholder: REQ1",
                "",
                "1.0     REQ1",
                "",
                "        Do X",
                "",
                "        Reference: src/a.rs (line 3), tests/b.rs",
                "",
                "        Stakeholder: ROLE1",
                "",
                "        Jira issues: ABC-1, ABC-2",
                "",
            ]
        );
    }

    #[test]
    fn unchecked_references_are_quoted_paths() {
        let lines = render(&stakeholder_tree(), &Settings::default());

        assert!(
            lines.contains(&"        Reference: 'src/a.rs', 'tests/b.rs'".to_string()),
            "{lines:?}"
        );
    }

    #[test]
    fn wrap_fills_to_width() {
        let wrapped = wrap("aaa bbb ccc ddd", 10, 2);
        assert_eq!(wrapped, vec!["  aaa bbb", "  ccc ddd"]);
    }

    #[test]
    fn wrap_splits_long_words() {
        let wrapped = wrap("abcdefghij", 6, 2);
        assert_eq!(wrapped, vec!["  abcd", "  efgh", "  ij"]);
    }

    #[test]
    fn wrap_blank_is_empty() {
        assert!(wrap("   ", 79, 8).is_empty());
    }
}
