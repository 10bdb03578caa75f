//! Item categories derived from uid spelling.
//!
//! Categories are not stored on items. They follow a naming convention on
//! the uid prefix, matched case-sensitively. This is the only place that
//! convention is encoded.

/// The uid prefix marking test cases.
pub const TEST_PREFIX: &str = "TEST";

/// The role an item plays in traceability, as implied by its uid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Anything not matching another convention.
    Requirement,
    /// `USECASE*`
    UseCase,
    /// `TEST*`
    Test,
    /// `RISK*`
    Risk,
    /// `ROLE*` stakeholder roles.
    Role,
    /// `HEAD*` headline-only items.
    Head,
}

impl Category {
    /// Classify a uid.
    #[must_use]
    pub fn of(uid: &str) -> Self {
        if uid.starts_with(TEST_PREFIX) {
            Self::Test
        } else if uid.starts_with("USECASE") {
            Self::UseCase
        } else if uid.starts_with("RISK") {
            Self::Risk
        } else if uid.starts_with("ROLE") {
            Self::Role
        } else if uid.starts_with("HEAD") {
            Self::Head
        } else {
            Self::Requirement
        }
    }

    /// Whether the item can sit in the requirement tier of the traceability
    /// matrix.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        !matches!(self, Self::Requirement)
    }

    /// Whether the item roots a row group in the traceability matrix.
    #[must_use]
    pub const fn is_use_case_or_risk(self) -> bool {
        matches!(self, Self::UseCase | Self::Risk)
    }
}
