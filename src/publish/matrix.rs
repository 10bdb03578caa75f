use std::{
    collections::{BTreeMap, HashSet},
    fs, io,
    path::Path,
};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    domain::{Category, ItemView, LinkIndex, Tree},
    publish::{attributes, links, Error},
};

/// One recorded run of a test.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestRun {
    /// Outcome, for example `passed`, `failure`, `error` or `skipped`.
    pub status: String,
}

/// Test runs keyed by test uid.
pub type TestResults = BTreeMap<String, Vec<TestRun>>;

/// Read test results from a YAML file.
///
/// No path, or a path that does not exist, gives empty results.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_results(path: Option<&Path>) -> Result<TestResults, Error> {
    let Some(path) = path else {
        return Ok(TestResults::new());
    };
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("test result file {} not found", path.display());
            return Ok(TestResults::new());
        }
        Err(e) => return Err(e.into()),
    };
    if content.trim().is_empty() {
        return Ok(TestResults::new());
    }
    serde_yaml::from_str(&content).map_err(|source| Error::Results {
        path: path.to_path_buf(),
        source,
    })
}

/// The count of runs of a test with one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    /// The run status.
    pub status: String,
    /// How many runs had it.
    pub count: usize,
}

impl Badge {
    /// The badge as an HTML label.
    #[must_use]
    pub fn html(&self) -> String {
        let count = self.count;
        let (class, title, mark) = match self.status.as_str() {
            "passed" => ("label-success", "Passed", "✓"),
            "error" => ("label-danger", "Error", "!"),
            "failure" => ("label-danger", "Failed", "✗"),
            "skipped" => ("label-default", "skipped", "-"),
            other => ("label-default", other, "?"),
        };
        format!("<span class=\"label {class}\" title=\"{count} {title}\">{mark}  {count}</span>")
    }
}

/// Per-status counts for one test, sorted by status name.
fn badges(results: &TestResults, uid: &str) -> Vec<Badge> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for run in results.get(uid).into_iter().flatten() {
        *counts.entry(run.status.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(status, count)| Badge {
            status: status.to_string(),
            count,
        })
        .collect()
}

/// One row of the traceability matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow<'a> {
    /// The use case or risk, if the requirement has one.
    pub use_case: Option<ItemView<'a>>,
    /// The requirement, absent for tests linked to no requirement.
    pub requirement: Option<ItemView<'a>>,
    /// The test, absent for requirements without tests.
    pub test: Option<ItemView<'a>>,
    /// Result badges for the test.
    pub results: Vec<Badge>,
}

/// Row spans for the grouped columns of a row.
///
/// `None` means the cell is covered by a span from an earlier row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpans {
    /// Span of the use-case cell.
    pub use_case: Option<usize>,
    /// Span of the requirement cell.
    pub requirement: Option<usize>,
}

/// The use case → requirement → test matrix shown on the index page.
#[derive(Debug, Clone, Default)]
pub struct Matrix<'a> {
    rows: Vec<MatrixRow<'a>>,
}

#[derive(Default)]
struct UseCaseGroup<'a> {
    use_case: Option<ItemView<'a>>,
    requirements: Vec<ItemView<'a>>,
}

impl<'a> Matrix<'a> {
    /// Build the matrix for a tree.
    ///
    /// Requirements are grouped under every use case or risk they link to,
    /// or under "no use case". Tests linked to no requirement are listed
    /// under "no use case, no requirement". Groups are ordered with the
    /// empty group first, then by uid.
    #[must_use]
    pub fn build(tree: &'a Tree, index: &LinkIndex<'a>, results: &TestResults) -> Self {
        let mut groups: BTreeMap<Option<&'a str>, UseCaseGroup<'a>> = BTreeMap::new();
        let mut tests: BTreeMap<&'a str, ItemView<'a>> = BTreeMap::new();
        let mut linked_tests: HashSet<&'a str> = HashSet::new();

        for document in tree.sorted_documents() {
            for item in document.items() {
                let category = item.category();
                if category == Category::Test {
                    tests.insert(item.uid_str(), item);
                }
                if category.is_use_case_or_risk() {
                    groups.entry(Some(item.uid_str())).or_default().use_case = Some(item);
                }
                if category.is_structural() || item.is_heading() {
                    continue;
                }

                let mut grouped = false;
                for parent in index.parent_items(item) {
                    if parent.category().is_use_case_or_risk() {
                        let group = groups.entry(Some(parent.uid_str())).or_default();
                        group.use_case = Some(parent);
                        group.requirements.push(item);
                        grouped = true;
                    }
                }
                if !grouped {
                    groups.entry(None).or_default().requirements.push(item);
                }
                for child in index.children(item.uid_str()) {
                    if child.category() == Category::Test {
                        linked_tests.insert(child.uid_str());
                    }
                }
            }
        }

        let unlinked: Vec<ItemView<'a>> = tests
            .iter()
            .filter(|(uid, _)| !linked_tests.contains(*uid))
            .map(|(_, test)| *test)
            .collect();
        if !unlinked.is_empty() {
            groups.entry(None).or_default();
        }

        let mut rows = Vec::new();
        for (key, mut group) in groups {
            if key.is_none() {
                rows.extend(unlinked.iter().map(|test| MatrixRow {
                    use_case: None,
                    requirement: None,
                    test: Some(*test),
                    results: badges(results, test.uid_str()),
                }));
            } else if group.requirements.is_empty() {
                rows.push(MatrixRow {
                    use_case: group.use_case,
                    requirement: None,
                    test: None,
                    results: Vec::new(),
                });
            }

            group.requirements.sort_by(|a, b| a.uid().cmp(b.uid()));
            group.requirements.dedup();
            for requirement in group.requirements {
                let tests: Vec<_> = index
                    .children(requirement.uid_str())
                    .into_iter()
                    .filter(|child| child.category() == Category::Test)
                    .collect();
                if tests.is_empty() {
                    rows.push(MatrixRow {
                        use_case: group.use_case,
                        requirement: Some(requirement),
                        test: None,
                        results: Vec::new(),
                    });
                }
                rows.extend(tests.into_iter().map(|test| MatrixRow {
                    use_case: group.use_case,
                    requirement: Some(requirement),
                    test: Some(test),
                    results: badges(results, test.uid_str()),
                }));
            }
        }

        debug!("traceability matrix has {} rows", rows.len());
        Self { rows }
    }

    /// The matrix rows, in display order.
    #[must_use]
    pub fn rows(&self) -> &[MatrixRow<'a>] {
        &self.rows
    }

    /// Row spans for merging repeated use-case and requirement cells.
    ///
    /// The use-case spans always add up to the number of rows.
    #[must_use]
    pub fn spans(&self) -> Vec<RowSpans> {
        let rows = &self.rows;
        let run = |start: usize, same: &dyn Fn(&MatrixRow<'a>) -> bool| {
            rows[start..].iter().take_while(|row| same(row)).count()
        };
        (0..rows.len())
            .map(|i| {
                let row = &rows[i];
                let previous = i.checked_sub(1).map(|p| &rows[p]);
                let new_use_case = previous.is_none_or(|p| p.use_case != row.use_case);
                let new_requirement =
                    new_use_case || previous.is_none_or(|p| p.requirement != row.requirement);
                RowSpans {
                    use_case: new_use_case
                        .then(|| run(i, &|other| other.use_case == row.use_case)),
                    requirement: new_requirement.then(|| {
                        run(i, &|other| {
                            other.use_case == row.use_case && other.requirement == row.requirement
                        })
                    }),
                }
            })
            .collect()
    }

    /// The matrix as an HTML table, one element per line.
    #[must_use]
    pub fn html_lines(&self) -> Vec<String> {
        let mut lines = vec![
            "<table class=\"matrix\">".to_string(),
            "<thead>".to_string(),
            "<tr><th>Use case / Risk</th><th>Requirements</th><th>Test cases</th><th>Test result</th></tr>"
                .to_string(),
            "</thead>".to_string(),
            "<tbody>".to_string(),
        ];
        for (row, spans) in self.rows.iter().zip(self.spans()) {
            lines.push("<tr>".to_string());
            if let Some(span) = spans.use_case {
                let cell = row
                    .use_case
                    .map_or_else(|| "No use case".to_string(), links::anchor);
                lines.push(format!("<td rowspan=\"{span}\">{cell}</td>"));
            }
            if let Some(span) = spans.requirement {
                let cell = row.requirement.map_or_else(
                    || "No requirement".to_string(),
                    |requirement| {
                        let mut cell = links::anchor(requirement);
                        if let Some(implemented) = attributes::implemented(requirement) {
                            cell.push_str("&nbsp;&nbsp;");
                            cell.push_str(&attributes::implemented_badge(implemented));
                        }
                        cell
                    },
                );
                lines.push(format!("<td rowspan=\"{span}\">{cell}</td>"));
            }
            let test = row
                .test
                .map_or_else(|| "No test case".to_string(), links::anchor);
            let results = row
                .results
                .iter()
                .map(Badge::html)
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(format!("<td>{test}</td>"));
            lines.push(format!("<td>{results}</td>"));
            lines.push("</tr>".to_string());
        }
        lines.push("</tbody>".to_string());
        lines.push("</table>".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::{Document, Item};

    fn item(uid: &str, level: &str, links: &[&str]) -> Item {
        Item::new(uid.parse().unwrap(), level.parse().unwrap())
            .with_links(links.iter().map(|uid| uid.parse().unwrap()).collect())
    }

    fn uids(row: &MatrixRow<'_>) -> (Option<String>, Option<String>, Option<String>) {
        let uid = |item: Option<ItemView<'_>>| item.map(|item| item.uid().to_string());
        (uid(row.use_case), uid(row.requirement), uid(row.test))
    }

    #[test]
    fn single_linked_test_gives_one_row() {
        let tree = Tree::new(vec![
            Document::new("REQ", "Requirements").with_item(item("REQ1", "1.0", &[])),
            Document::new("TEST", "Tests").with_item(item("TEST1", "1.0", &["REQ1"])),
        ]);
        let index = LinkIndex::new(&tree);

        let matrix = Matrix::build(&tree, &index, &TestResults::new());

        assert_eq!(matrix.rows().len(), 1);
        assert_eq!(
            uids(&matrix.rows()[0]),
            (None, Some("REQ1".to_string()), Some("TEST1".to_string()))
        );
    }

    fn full_tree() -> Tree {
        Tree::new(vec![
            Document::new("USECASE", "Use cases")
                .with_item(item("USECASE1", "1.0", &[]))
                .with_item(item("USECASE2", "2.0", &[])),
            Document::new("REQ", "Requirements")
                .with_item(item("REQ1", "1.0", &["USECASE1"]))
                .with_item(item("REQ2", "2.0", &["USECASE1"]))
                .with_item(item("REQ3", "3.0", &[])),
            Document::new("TEST", "Tests")
                .with_item(item("TEST1", "1.0", &["REQ1"]))
                .with_item(item("TEST2", "2.0", &["REQ1"]))
                .with_item(item("TEST3", "3.0", &[])),
        ])
    }

    #[test]
    fn rows_group_by_use_case_with_empty_group_first() {
        let tree = full_tree();
        let index = LinkIndex::new(&tree);

        let matrix = Matrix::build(&tree, &index, &TestResults::new());
        let rows: Vec<_> = matrix.rows().iter().map(uids).collect();

        let some = |uid: &str| Some(uid.to_string());
        assert_eq!(
            rows,
            vec![
                (None, None, some("TEST3")),
                (None, some("REQ3"), None),
                (some("USECASE1"), some("REQ1"), some("TEST1")),
                (some("USECASE1"), some("REQ1"), some("TEST2")),
                (some("USECASE1"), some("REQ2"), None),
                (some("USECASE2"), None, None),
            ]
        );
    }

    #[test]
    fn spans_cover_every_row() {
        let tree = full_tree();
        let index = LinkIndex::new(&tree);
        let matrix = Matrix::build(&tree, &index, &TestResults::new());

        let spans = matrix.spans();

        let use_case_total: usize = spans.iter().filter_map(|s| s.use_case).sum();
        let requirement_total: usize = spans.iter().filter_map(|s| s.requirement).sum();
        assert_eq!(use_case_total, matrix.rows().len());
        assert_eq!(requirement_total, matrix.rows().len());
        assert_eq!(spans[2].use_case, Some(3));
        assert_eq!(spans[2].requirement, Some(2));
        assert_eq!(spans[3].use_case, None);
        assert_eq!(spans[3].requirement, None);
    }

    #[test]
    fn badges_count_and_sort_statuses() {
        let mut results = TestResults::new();
        results.insert(
            "TEST1".to_string(),
            ["passed", "failure", "passed"]
                .into_iter()
                .map(|status| TestRun {
                    status: status.to_string(),
                })
                .collect(),
        );

        let badges = badges(&results, "TEST1");

        assert_eq!(
            badges.iter().map(Badge::html).collect::<Vec<_>>(),
            vec![
                "<span class=\"label label-danger\" title=\"1 Failed\">✗  1</span>",
                "<span class=\"label label-success\" title=\"2 Passed\">✓  2</span>",
            ]
        );
    }

    #[test]
    fn html_table_merges_cells() {
        let tree = full_tree();
        let index = LinkIndex::new(&tree);
        let matrix = Matrix::build(&tree, &index, &TestResults::new());

        let html = matrix.html_lines().join("\n");

        assert!(html.contains("<td rowspan=\"3\"><a title=\"\" href=\"USECASE.html#USECASE1\">USECASE1</a></td>"), "{html}");
        assert!(html.contains("<td rowspan=\"1\">No requirement</td>"), "{html}");
        assert!(html.contains("<td>No test case</td>"), "{html}");
        assert_eq!(html.matches("<tr>").count(), 7);
    }

    #[test]
    fn results_file_is_optional() {
        let tmp = tempfile::tempdir().unwrap();

        assert!(load_results(None).unwrap().is_empty());
        assert!(load_results(Some(&tmp.path().join("missing.yml"))).unwrap().is_empty());
    }

    #[test]
    fn results_file_is_parsed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"TEST1:\n  - status: passed\n    duration: 0.2\n  - status: error\n")
            .unwrap();

        let results = load_results(Some(file.path())).unwrap();

        assert_eq!(results["TEST1"].len(), 2);
        assert_eq!(results["TEST1"][1].status, "error");
    }

    #[test]
    fn malformed_results_are_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"TEST1: [status: [").unwrap();

        assert!(matches!(
            load_results(Some(file.path())),
            Err(Error::Results { .. })
        ));
    }
}
