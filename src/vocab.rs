//! Common datatype vocabularies.

use std::sync::LazyLock;

use crate::locator::Locator;

/// XML Schema datatypes attached by the typed [`crate::literal::Literal`]
/// constructors.
pub mod xsd {
    use super::*;

    /// The XSD namespace IRI.
    pub const NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

    /// xsd:string
    pub static STRING: LazyLock<Locator> =
        LazyLock::new(|| Locator::new_unchecked(format!("{NAMESPACE}string")));

    /// xsd:anyURI
    pub static ANY_URI: LazyLock<Locator> =
        LazyLock::new(|| Locator::new_unchecked(format!("{NAMESPACE}anyURI")));

    /// xsd:integer
    pub static INTEGER: LazyLock<Locator> =
        LazyLock::new(|| Locator::new_unchecked(format!("{NAMESPACE}integer")));

    /// xsd:decimal
    pub static DECIMAL: LazyLock<Locator> =
        LazyLock::new(|| Locator::new_unchecked(format!("{NAMESPACE}decimal")));

    /// xsd:date
    pub static DATE: LazyLock<Locator> =
        LazyLock::new(|| Locator::new_unchecked(format!("{NAMESPACE}date")));

    /// xsd:dateTime
    pub static DATE_TIME: LazyLock<Locator> =
        LazyLock::new(|| Locator::new_unchecked(format!("{NAMESPACE}dateTime")));
}
