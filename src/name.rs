//! A validated display name shared by accounts, categories, goals, budgets and families.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::Error;

/// The maximum number of user-perceived characters in a name.
pub const MAX_NAME_LENGTH: usize = 64;

/// A trimmed, non-empty name of at most [MAX_NAME_LENGTH] characters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Name(String);

impl Name {
    /// Create a name.
    ///
    /// Length is counted in grapheme clusters so that names with accents or
    /// emoji are not penalised.
    ///
    /// # Errors
    ///
    /// This function will return an:
    /// - [Error::EmptyName] if `name` is empty after trimming whitespace,
    /// - [Error::NameTooLong] if `name` is longer than [MAX_NAME_LENGTH].
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        if name.graphemes(true).count() > MAX_NAME_LENGTH {
            return Err(Error::NameTooLong(MAX_NAME_LENGTH));
        }

        Ok(Self(name.to_string()))
    }

    /// Create a name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Name::new(s)
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
