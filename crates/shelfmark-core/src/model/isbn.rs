use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Pattern the `books.isbn` CHECK clause uses. Digit count of the
/// hyphenated form is checked separately.
pub const ISBN_PATTERN: &str =
    r"^([0-9]{9}[0-9X]|[0-9]{13}|97[89]-[0-9]{1,5}-[0-9]{1,7}-[0-9]{1,6}-[0-9])$";

#[allow(clippy::unwrap_used)]
static ISBN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(ISBN_PATTERN).unwrap());

/// An International Standard Book Number in ISBN-10, ISBN-13 or hyphenated
/// ISBN-13 form.
///
/// Only the shape is validated; check digits are not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Isbn(String);

impl Isbn {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let hyphenated = trimmed.contains('-');
        let digits = trimmed.chars().filter(char::is_ascii_alphanumeric).count();
        if ISBN_RE.is_match(trimmed) && (!hyphenated || digits == 13) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(Error::InvalidFormat {
                field: "isbn",
                value: raw.to_string(),
            })
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ISBN with hyphens removed.
    #[must_use]
    pub fn compact(&self) -> String {
        self.0.chars().filter(|c| *c != '-').collect()
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Isbn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Isbn {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Isbn> for String {
    fn from(isbn: Isbn) -> Self {
        isbn.0
    }
}
