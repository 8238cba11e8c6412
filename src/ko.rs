//! KO identifiers: `K` followed by exactly five digits.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid KO identifier: {0:?}")]
pub struct InvalidKo(pub String);

/// An opaque KEGG Orthology identifier, e.g. `K00844`.
///
/// Equality, hashing, and ordering are all on the underlying string, which
/// gives the lexicographic tie-break that the evaluator's path selection
/// relies on (spec step 4).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ko(String);

impl Ko {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates and builds a `Ko` without going through `FromStr`, useful
    /// when the caller already owns a `String`.
    pub fn new(s: String) -> Result<Self, InvalidKo> {
        if is_valid_ko(&s) {
            Ok(Ko(s))
        } else {
            Err(InvalidKo(s))
        }
    }
}

fn is_valid_ko(s: &str) -> bool {
    let mut chars = s.chars();
    if chars.next() != Some('K') {
        return false;
    }
    let rest: &str = &s[1..];
    rest.len() == 5 && rest.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for Ko {
    type Err = InvalidKo;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ko::new(s.to_string())
    }
}

impl fmt::Display for Ko {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ko {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
