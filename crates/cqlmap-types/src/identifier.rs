use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};
use thiserror::Error as ThisError;

///
/// InvalidIdentifier
///
/// Rejection raised when text cannot form a physical identifier.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum InvalidIdentifier {
    #[error("identifier must not be empty")]
    Empty,

    #[error("unquoted identifier '{text}' must start with a letter and contain only letters, digits, and underscores")]
    Malformed { text: String },
}

///
/// CqlIdentifier
///
/// Physical identifier for tables, structured types, and columns.
/// Unquoted identifiers fold to lowercase; quoted identifiers preserve
/// case and render inside double quotes with embedded quotes doubled.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct CqlIdentifier {
    text: String,
    quoted: bool,
}

impl CqlIdentifier {
    /// Build an unquoted identifier, folding to lowercase.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidIdentifier> {
        let name = name.into();

        if name.is_empty() {
            return Err(InvalidIdentifier::Empty);
        }
        if !is_unquoted_safe(&name) {
            return Err(InvalidIdentifier::Malformed { text: name });
        }

        Ok(Self {
            text: name.to_lowercase(),
            quoted: false,
        })
    }

    /// Build a quoted identifier, preserving case.
    pub fn quoted(name: impl Into<String>) -> Result<Self, InvalidIdentifier> {
        let name = name.into();

        if name.is_empty() {
            return Err(InvalidIdentifier::Empty);
        }

        Ok(Self {
            text: name,
            quoted: true,
        })
    }

    /// Build with an explicit quoting flag.
    pub fn with_quoting(name: impl Into<String>, quote: bool) -> Result<Self, InvalidIdentifier> {
        if quote {
            Self::quoted(name)
        } else {
            Self::new(name)
        }
    }

    /// The raw text without quoting applied.
    ///
    /// Force-quote toggles re-derive an identifier from this text.
    #[must_use]
    pub fn unquoted_text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn is_quoted(&self) -> bool {
        self.quoted
    }
}

impl Display for CqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.text.replace('"', "\"\""))
        } else {
            write!(f, "{}", self.text)
        }
    }
}

impl FromStr for CqlIdentifier {
    type Err = InvalidIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(inner) = s.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
            Self::quoted(inner.replace("\"\"", "\""))
        } else {
            Self::new(s)
        }
    }
}

// Unquoted identifiers are restricted to the store's bare-word grammar.
fn is_unquoted_safe(text: &str) -> bool {
    let mut chars = text.chars();

    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn unquoted_folds_to_lowercase() {
        let id = CqlIdentifier::new("PersonTable").unwrap();
        assert_eq!(id.unquoted_text(), "persontable");
        assert!(!id.is_quoted());
        assert_eq!(id.to_string(), "persontable");
    }

    #[test]
    fn quoted_preserves_case() {
        let id = CqlIdentifier::quoted("PersonTable").unwrap();
        assert_eq!(id.unquoted_text(), "PersonTable");
        assert!(id.is_quoted());
        assert_eq!(id.to_string(), "\"PersonTable\"");
    }

    #[test]
    fn quoted_escapes_embedded_quotes() {
        let id = CqlIdentifier::quoted("a\"b").unwrap();
        assert_eq!(id.to_string(), "\"a\"\"b\"");
    }

    #[test]
    fn empty_identifier_is_rejected() {
        assert_eq!(CqlIdentifier::new(""), Err(InvalidIdentifier::Empty));
        assert_eq!(CqlIdentifier::quoted(""), Err(InvalidIdentifier::Empty));
    }

    #[test]
    fn malformed_unquoted_is_rejected() {
        assert!(CqlIdentifier::new("1abc").is_err());
        assert!(CqlIdentifier::new("a-b").is_err());
        assert!(CqlIdentifier::new("a b").is_err());
    }

    #[test]
    fn from_str_round_trips_both_forms() {
        let unquoted: CqlIdentifier = "person".parse().unwrap();
        assert_eq!(unquoted, CqlIdentifier::new("person").unwrap());

        let quoted: CqlIdentifier = "\"Person\"".parse().unwrap();
        assert_eq!(quoted, CqlIdentifier::quoted("Person").unwrap());

        let escaped: CqlIdentifier = "\"a\"\"b\"".parse().unwrap();
        assert_eq!(escaped.unquoted_text(), "a\"b");
    }

    #[test]
    fn equality_distinguishes_quoting() {
        let unquoted = CqlIdentifier::new("person").unwrap();
        let quoted = CqlIdentifier::quoted("person").unwrap();
        assert_ne!(unquoted, quoted);
    }

    proptest! {
        #[test]
        fn unquoted_never_renders_quotes(name in "[a-zA-Z][a-zA-Z0-9_]{0,24}") {
            let id = CqlIdentifier::new(name.clone()).unwrap();
            prop_assert!(!id.to_string().contains('"'));
            prop_assert_eq!(id.unquoted_text(), name.to_lowercase());
        }
    }
}
