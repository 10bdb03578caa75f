use std::{fmt, str::FromStr};

/// The hierarchical position of an item within its document.
///
/// Levels are dot-separated positive integers (`1`, `1.2`, `2.3.1`). A
/// trailing `.0` segment marks a heading level (`1.2.0`) and does not count
/// towards the depth. A single-segment level always displays with a `.0`
/// suffix, so `1` and `1.0` are the same level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Level {
    parts: Vec<u32>,
    heading: bool,
}

impl Level {
    /// Build a level from its segments.
    ///
    /// # Errors
    ///
    /// Returns an error if `parts` is empty.
    pub fn new(parts: Vec<u32>, heading: bool) -> Result<Self, ParseLevelError> {
        if parts.is_empty() {
            return Err(ParseLevelError(String::new()));
        }
        Ok(Self { parts, heading })
    }

    /// The number of segments in this level.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.parts.len()
    }

    /// The level's segments, without any heading marker.
    #[must_use]
    pub fn parts(&self) -> &[u32] {
        &self.parts
    }

    /// Whether the level carries the trailing `.0` heading marker.
    #[must_use]
    pub const fn is_heading(&self) -> bool {
        self.heading
    }

    /// The label used in rendered output.
    ///
    /// Top-level labels keep their `.0` (`1.0`), deeper heading labels drop
    /// it (`1.2.0` becomes `1.2`).
    #[must_use]
    pub fn label(&self) -> String {
        let text = self.to_string();
        if text.len() > 3 {
            if let Some(stripped) = text.strip_suffix(".0") {
                return stripped.to_string();
            }
        }
        text
    }

    /// The label with the leading segment replaced by a document number.
    ///
    /// Used when several documents are concatenated into one output and
    /// need distinct, sequential top-level numbers. The `.0` suffix is
    /// dropped entirely.
    #[must_use]
    pub fn renumbered(&self, document: usize) -> String {
        let label = self.label();
        let rest = label.find('.').map_or("", |index| &label[index..]);
        let renumbered = format!("{document}{rest}");
        match renumbered.strip_suffix(".0") {
            Some(stripped) => stripped.to_string(),
            None => renumbered,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .parts
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".");
        if self.heading || self.parts.len() == 1 {
            write!(f, "{joined}.0")
        } else {
            f.write_str(&joined)
        }
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s
            .trim()
            .split('.')
            .map(|segment| segment.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseLevelError(s.to_string()))?;

        let heading = parts.len() > 1 && parts.last() == Some(&0);
        // `1.0` is the top-level item `1`, not a heading marker on its own
        while parts.len() > 1 && parts.last() == Some(&0) {
            parts.pop();
        }
        if parts.iter().any(|&part| part == 0) {
            return Err(ParseLevelError(s.to_string()));
        }

        Ok(Self {
            heading: heading && parts.len() > 1,
            parts,
        })
    }
}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.parts
            .cmp(&other.parts)
            .then(self.heading.cmp(&other.heading))
    }
}

/// Error returned when a level string is not dot-separated positive
/// integers.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid level '{0}': expected dot-separated positive integers")]
pub struct ParseLevelError(String);

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::Level;

    fn level(s: &str) -> Level {
        s.parse().unwrap()
    }

    #[test_case("1", "1.0", 1)]
    #[test_case("1.0", "1.0", 1)]
    #[test_case("1.2", "1.2", 2)]
    #[test_case("1.2.0", "1.2.0", 2)]
    #[test_case("2.3.4", "2.3.4", 3)]
    fn display_and_depth(input: &str, display: &str, depth: usize) {
        let level = level(input);
        assert_eq!(level.to_string(), display);
        assert_eq!(level.depth(), depth);
    }

    #[test_case("1.0", "1.0")]
    #[test_case("1.2.0", "1.2")]
    #[test_case("1.2", "1.2")]
    #[test_case("3.1.0", "3.1")]
    fn label_keeps_top_level_zero(input: &str, expected: &str) {
        assert_eq!(level(input).label(), expected);
    }

    #[test_case("1.0", 3, "3")]
    #[test_case("1.2", 2, "2.2")]
    #[test_case("4.2.0", 1, "1.2")]
    #[test_case("12.5", 2, "2.5"; "multi digit leading segment")]
    fn renumbers_leading_segment(input: &str, document: usize, expected: &str) {
        assert_eq!(level(input).renumbered(document), expected);
    }

    #[test]
    fn orders_by_segments() {
        let mut levels = vec![level("1.10"), level("1.2"), level("1.0"), level("2")];
        levels.sort();
        let labels: Vec<_> = levels.iter().map(Level::label).collect();
        assert_eq!(labels, ["1.0", "1.2", "1.10", "2.0"]);
    }

    #[test]
    fn rejects_garbage() {
        assert!("one".parse::<Level>().is_err());
        assert!("1..2".parse::<Level>().is_err());
        assert!("0.1".parse::<Level>().is_err());
    }
}
