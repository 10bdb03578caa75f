use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

/// The unique identifier of an item, e.g. `REQ001` or `TEST-LOGIN-3`.
///
/// A uid is any non-empty string without whitespace. Its leading letters
/// also carry the item's [`Category`](crate::domain::Category).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uid(NonEmptyString);

impl Uid {
    /// Creates a new `Uid` from a string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUidError` if the string is empty or contains
    /// whitespace.
    pub fn new(s: String) -> Result<Self, InvalidUidError> {
        if s.chars().any(char::is_whitespace) {
            return Err(InvalidUidError(s));
        }
        let non_empty = NonEmptyString::new(s).map_err(InvalidUidError)?;
        Ok(Self(non_empty))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for Uid {
    type Error = InvalidUidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Uid {
    type Error = InvalidUidError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl FromStr for Uid {
    type Err = InvalidUidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for Uid {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a uid is empty or contains whitespace.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid uid '{0}': must be non-empty and contain no whitespace")]
pub struct InvalidUidError(String);
