//! Prefixed names.
//!
//! A [`QName`] is the `prefix:local` spelling a concrete syntax uses to
//! abbreviate an IRI. Splitting happens here; expanding the prefix against
//! a prefix → IRI mapping is the caller's job.

use std::fmt;

use crate::error::Error;

/// Whether `text` is shaped like a name segment: a letter or `_` followed
/// by letters, digits, `_`, `-` or `.`.
fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// A prefixed name, split into prefix and local part.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QName {
    prefix: String,
    local: String,
}

impl QName {
    /// Split `text` into a QName.
    ///
    /// Fails with [`Error::InvalidQName`] unless `text` contains exactly one
    /// `:` and both sides are non-empty identifier-shaped segments.
    pub fn new(text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidQName { text: text.into() };
        let (prefix, local) = text.split_once(':').ok_or_else(invalid)?;
        if local.contains(':') || !is_identifier(prefix) || !is_identifier(local) {
            return Err(invalid());
        }
        Ok(Self {
            prefix: prefix.to_string(),
            local: local.to_string(),
        })
    }

    /// The part before the separator.
    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The part after the separator.
    #[inline]
    pub fn local(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_the_single_separator() {
        let q = QName::new("q:name").unwrap();
        assert_eq!(q.prefix(), "q");
        assert_eq!(q.local(), "name");
        assert_eq!(q.to_string(), "q:name");
    }

    #[test]
    fn rejects_missing_extra_or_empty_parts() {
        for bad in ["qname", "q::name", "a:b:c", ":name", "q:", ":", ""] {
            assert!(
                matches!(QName::new(bad), Err(Error::InvalidQName { .. })),
                "{bad:?} should not split",
            );
        }
    }

    #[test]
    fn rejects_non_identifier_segments() {
        assert!(QName::new("1a:b").is_err());
        assert!(QName::new("a:b c").is_err());
    }
}
