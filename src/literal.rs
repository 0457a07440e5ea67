//! Typed literal values.
//!
//! A [`Literal`] pairs a value string with the IRI of its datatype. The
//! typed constructors only attach semantics; they never validate the value
//! against the datatype's lexical space — `integer("twelve")` is accepted
//! and it is the caller's job to canonicalize values first.

use std::fmt;

use crate::locator::Locator;
use crate::vocab::xsd;

/// An immutable (value, datatype IRI) pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    value: String,
    datatype: Locator,
}

impl Literal {
    /// A literal with an arbitrary caller-supplied datatype.
    pub fn new<S: Into<String>>(value: S, datatype: Locator) -> Self {
        Self {
            value: value.into(),
            datatype,
        }
    }

    /// An `xsd:string` literal.
    pub fn string<S: Into<String>>(value: S) -> Self {
        Self::new(value, xsd::STRING.clone())
    }

    /// An `xsd:anyURI` literal holding the locator's reference.
    pub fn iri(value: &Locator) -> Self {
        Self::new(value.as_str(), xsd::ANY_URI.clone())
    }

    /// An `xsd:integer` literal.
    pub fn integer<S: Into<String>>(value: S) -> Self {
        Self::new(value, xsd::INTEGER.clone())
    }

    /// An `xsd:decimal` literal.
    pub fn decimal<S: Into<String>>(value: S) -> Self {
        Self::new(value, xsd::DECIMAL.clone())
    }

    /// An `xsd:date` literal.
    pub fn date<S: Into<String>>(value: S) -> Self {
        Self::new(value, xsd::DATE.clone())
    }

    /// An `xsd:dateTime` literal.
    pub fn date_time<S: Into<String>>(value: S) -> Self {
        Self::new(value, xsd::DATE_TIME.clone())
    }

    /// The value string.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The datatype IRI.
    #[inline]
    pub fn datatype(&self) -> &Locator {
        &self.datatype
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}^^<{}>", self.value, self.datatype)
    }
}
