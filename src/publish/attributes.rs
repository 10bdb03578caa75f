//! Interpretation of well-known custom attributes.
//!
//! Attribute values are free-form YAML, so everything here reads them
//! leniently: anything that cannot be understood is treated as absent.

use serde_yaml::Value;

use crate::domain::ItemView;

/// Attribute holding the implementation status.
pub const IMPLEMENTED: &str = "implemented";
/// Attribute holding the priority.
pub const PRIORITY: &str = "prio";
/// Attribute holding Jira issue keys.
pub const JIRA: &str = "jira";
/// Attribute holding the risk rating before mitigation.
pub const RISK_RATING: &str = "risk-rating";
/// Attribute holding the risk rating after mitigation.
pub const RESIDUAL_RISK_RATING: &str = "residual-risk-rating";

const NOT_IMPLEMENTED: [&str; 6] = ["False", "", "false", "''", "\"\"", "0"];

/// Classify an `implemented` value.
///
/// A missing value, booleans that are false, zero, and empty or quoted-empty
/// strings all mean "not implemented".
#[must_use]
pub fn is_implemented(value: Option<&Value>) -> bool {
    value.is_some_and(|value| !NOT_IMPLEMENTED.contains(&display(value).trim()))
}

/// The implemented status to badge, if the attribute is set to something.
#[must_use]
pub fn implemented(item: ItemView<'_>) -> Option<bool> {
    let value = item.attribute(IMPLEMENTED)?;
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        _ => Some(is_implemented(Some(value))),
    }
}

/// The HTML badge for an implemented status.
#[must_use]
pub fn implemented_badge(implemented: bool) -> String {
    let (class, title, mark) = if implemented {
        ("label-success", "Implemented", "✓")
    } else {
        ("label-danger", "Not implemented", "✗")
    };
    format!("<small><span class=\"label {class}\" title=\"{title}\">{mark}</span></small>")
}

/// Render a YAML value for display.
#[must_use]
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => if *b { "True" } else { "False" }.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(values) => values.iter().map(display).collect::<Vec<_>>().join(", "),
        Value::Mapping(mapping) => mapping
            .iter()
            .map(|(key, value)| format!("{}: {}", display(key), display(value)))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Tagged(tagged) => display(&tagged.value),
    }
}

/// Whether a value counts as set.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(values) => !values.is_empty(),
        Value::Mapping(mapping) => !mapping.is_empty(),
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

fn truthy<'a>(item: &'a ItemView<'_>, name: &str) -> Option<&'a Value> {
    item.item.attribute(name).filter(|value| is_truthy(value))
}

/// The priority, if set.
#[must_use]
pub fn priority(item: ItemView<'_>) -> Option<String> {
    truthy(&item, PRIORITY).map(|value| display(value).trim().to_string())
}

/// The `implemented` value as text, if set.
#[must_use]
pub fn implemented_text(item: ItemView<'_>) -> Option<String> {
    truthy(&item, IMPLEMENTED).map(display)
}

/// Jira issue keys, in attribute order.
#[must_use]
pub fn jira_issues(item: ItemView<'_>) -> Vec<String> {
    match truthy(&item, JIRA) {
        Some(Value::Sequence(values)) => values
            .iter()
            .map(display)
            .filter(|key| !key.is_empty())
            .collect(),
        Some(value) => vec![display(value)],
        None => Vec::new(),
    }
}

/// A risk rating on the detectability, probability and severity scales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskRating {
    /// How likely the failure is to be detected.
    pub detectability: String,
    /// How likely the failure is to occur.
    pub probability: String,
    /// How bad the failure would be.
    pub severity: String,
}

impl RiskRating {
    /// Read a rating from an attribute mapping.
    ///
    /// Missing scales are shown as `-`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let mapping = value.as_mapping()?;
        let scale = |name: &str| {
            mapping
                .get(name)
                .map(display)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "-".to_string())
        };
        Some(Self {
            detectability: scale("detectability"),
            probability: scale("probability"),
            severity: scale("severity"),
        })
    }

    /// The risk priority number: the product of the three scales.
    ///
    /// Returns `None` if any scale is not an integer.
    #[must_use]
    pub fn rpn(&self) -> Option<i64> {
        let d: i64 = self.detectability.trim().parse().ok()?;
        let p: i64 = self.probability.trim().parse().ok()?;
        let s: i64 = self.severity.trim().parse().ok()?;
        d.checked_mul(p)?.checked_mul(s)
    }

    fn row(&self, label: &str) -> String {
        let rpn = self.rpn().map_or_else(|| "-".to_string(), |rpn| rpn.to_string());
        format!(
            "__{label}__ | {} | {} | {} | __{rpn}__",
            self.detectability, self.probability, self.severity
        )
    }
}

/// The Markdown risk table, or nothing if the item carries no rating.
#[must_use]
pub fn risk_table(item: ItemView<'_>) -> Vec<String> {
    let Some(before) = truthy(&item, RISK_RATING).and_then(RiskRating::from_value) else {
        return Vec::new();
    };
    let mut lines = vec![
        String::new(),
        "&nbsp; | Detectability | Probability | Severity | Risk Priority Number".to_string(),
        "------ | ------------- | ----------- | -------- | --------------------".to_string(),
        before.row("Before mitigation"),
    ];
    if let Some(after) = truthy(&item, RESIDUAL_RISK_RATING).and_then(RiskRating::from_value) {
        lines.push(after.row("After mitigation"));
    }
    lines.push(String::new());
    lines
}

/// The attributes the owning document chose to publish, with values.
///
/// Unset attributes are left out.
#[must_use]
pub fn published<'a>(item: ItemView<'a>) -> Vec<(&'a str, String)> {
    item.document
        .publish()
        .iter()
        .filter_map(|name| {
            item.item
                .attribute(name)
                .filter(|value| is_truthy(value))
                .map(|value| (name.as_str(), display(value)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;
    use crate::domain::{Document, Item};

    #[test_case(Value::Bool(false); "false")]
    #[test_case(Value::from(""); "empty")]
    #[test_case(Value::from("false"); "lowercase false")]
    #[test_case(Value::from("False"); "capitalised false")]
    #[test_case(Value::from("''"); "quoted single")]
    #[test_case(Value::from("\"\""); "quoted double")]
    #[test_case(Value::from("0"); "zero string")]
    #[test_case(Value::from(0); "zero")]
    #[test_case(Value::Null; "null")]
    fn not_implemented(value: Value) {
        assert!(!is_implemented(Some(&value)));
    }

    #[test_case(Value::Bool(true); "true")]
    #[test_case(Value::from("yes"); "text")]
    #[test_case(Value::from(1); "one")]
    #[test_case(Value::from("None"); "the word none")]
    fn implemented_values(value: Value) {
        assert!(is_implemented(Some(&value)));
    }

    #[test]
    fn absent_is_not_implemented() {
        assert!(!is_implemented(None));
    }

    fn with_item<T>(item: Item, document: Document, check: impl FnOnce(ItemView<'_>) -> T) -> T {
        let item = ItemView {
            item: &item,
            document: &document,
        };
        check(item)
    }

    fn item() -> Item {
        Item::new("RISK1".parse().unwrap(), "1.1".parse().unwrap())
    }

    #[test]
    fn badge_only_for_set_values() {
        let document = Document::new("RISK", "Risks");
        assert_eq!(with_item(item(), document.clone(), implemented), None);
        assert_eq!(
            with_item(item().with_attribute(IMPLEMENTED, ""), document.clone(), implemented),
            None
        );
        assert_eq!(
            with_item(item().with_attribute(IMPLEMENTED, false), document, implemented),
            Some(false)
        );
    }

    #[test]
    fn badge_markup() {
        assert_eq!(
            implemented_badge(true),
            "<small><span class=\"label label-success\" title=\"Implemented\">✓</span></small>"
        );
        assert_eq!(
            implemented_badge(false),
            "<small><span class=\"label label-danger\" title=\"Not implemented\">✗</span></small>"
        );
    }

    #[test]
    fn risk_table_with_residual() {
        let rating: Value =
            serde_yaml::from_str("{detectability: 2, probability: 3, severity: 4}").unwrap();
        let residual: Value =
            serde_yaml::from_str("{detectability: 1, probability: 1, severity: 4}").unwrap();
        let item = item()
            .with_attribute(RISK_RATING, rating)
            .with_attribute(RESIDUAL_RISK_RATING, residual);

        let lines = with_item(item, Document::new("RISK", "Risks"), risk_table);

        assert_eq!(
            lines,
            vec![
                "",
                "&nbsp; | Detectability | Probability | Severity | Risk Priority Number",
                "------ | ------------- | ----------- | -------- | --------------------",
                "__Before mitigation__ | 2 | 3 | 4 | __24__",
                "__After mitigation__ | 1 | 1 | 4 | __4__",
                "",
            ]
        );
    }

    #[test]
    fn incomplete_rating_has_no_rpn() {
        let rating: Value = serde_yaml::from_str("{detectability: 2, severity: high}").unwrap();
        let rating = RiskRating::from_value(&rating).unwrap();

        assert_eq!(rating.probability, "-");
        assert_eq!(rating.rpn(), None);
    }

    #[test]
    fn published_attributes_follow_document_order() {
        let document = Document::new("RISK", "Risks").with_publish(vec![
            "owner".to_string(),
            "missing".to_string(),
            "tags".to_string(),
        ]);
        let tags: Value = serde_yaml::from_str("[a, b]").unwrap();
        let item = item().with_attribute("tags", tags).with_attribute("owner", "QA");

        let published = with_item(item, document, |item| {
            published(item)
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect::<Vec<_>>()
        });

        assert_eq!(
            published,
            vec![
                ("owner".to_string(), "QA".to_string()),
                ("tags".to_string(), "a, b".to_string()),
            ]
        );
    }

    #[test]
    fn jira_keys_from_list_or_scalar() {
        let document = Document::new("RISK", "Risks");
        let keys: Value = serde_yaml::from_str("[ABC-1, ABC-2]").unwrap();

        assert_eq!(
            with_item(item().with_attribute(JIRA, keys), document.clone(), jira_issues),
            vec!["ABC-1", "ABC-2"]
        );
        assert_eq!(
            with_item(item().with_attribute(JIRA, "ABC-3"), document, jira_issues),
            vec!["ABC-3"]
        );
    }
}
