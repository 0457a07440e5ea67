//! Defines the crate error taxonomy and source locations.

use std::fmt;

use serde::Deserialize;

/// Row/column location within a source document (1-indexed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Location {
    /// 1-indexed row number in the input stream.
    pub(crate) line: u32,
    /// 1-indexed column number in the input stream.
    pub(crate) column: u32,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    ///
    /// Used when a precise position is not yet available at error creation time.
    pub const UNKNOWN: Self = Self { line: 0, column: 0 };

    /// Create a new location record.
    ///
    /// Arguments:
    /// - `line`: 1-indexed line.
    /// - `column`: 1-indexed column.
    pub(crate) const fn new(line: usize, column: usize) -> Self {
        // 4 billion lines is larger than any document worth parsing, and this
        // is error reporting only.
        Self {
            line: line as u32,
            column: column as u32,
        }
    }

    /// 1-indexed line number.
    #[inline]
    pub fn line(&self) -> u64 {
        self.line as u64
    }

    /// 1-indexed column number.
    #[inline]
    pub fn column(&self) -> u64 {
        self.column as u64
    }

    #[inline]
    pub(crate) fn is_known(&self) -> bool {
        self != &Location::UNKNOWN
    }
}

/// Error type covering every failure the ingestion core can produce.
///
/// Variants fall into the groups below; none of them is ever retried
/// internally.
/// - Usage violations raised before any I/O: [`Error::Argument`],
///   [`Error::Configuration`].
/// - Value-construction failures from the shared utilities:
///   [`Error::MalformedReference`], [`Error::InvalidQName`].
/// - Lexical failures with position context: [`Error::UnterminatedToken`],
///   [`Error::UnexpectedCharacter`].
/// - Grammar violations detected by a concrete parser: [`Error::Syntax`].
/// - I/O failures from the underlying stream, passed through: [`Error::Io`].
#[derive(Debug)]
pub enum Error {
    /// Programmer-usage violation (null-equivalent argument, missing base IRI).
    Argument {
        msg: String,
    },
    /// Deserializer used without required setup (no handler, no resolver).
    Configuration {
        msg: String,
    },
    /// A reference could not be parsed as an IRI.
    MalformedReference {
        reference: String,
    },
    /// Text does not split into `prefix:local` with both parts non-empty.
    InvalidQName {
        text: String,
    },
    /// The stream ended inside a string or data block.
    UnterminatedToken {
        what: &'static str,
        location: Location,
    },
    /// The scanner met a character no token can start with.
    UnexpectedCharacter {
        ch: char,
        location: Location,
    },
    /// Format-level grammar violation; aborts the current parse.
    Syntax {
        msg: String,
        location: Location,
    },
    /// Unexpected I/O error from the underlying stream.
    Io {
        cause: std::io::Error,
    },
}

impl Error {
    /// Construct a `Syntax` error with no known location.
    ///
    /// Called by:
    /// - Concrete parsers for grammar violations before the offending
    ///   token position is attached.
    pub(crate) fn syntax<S: Into<String>>(msg: S) -> Self {
        Error::Syntax {
            msg: msg.into(),
            location: Location::UNKNOWN,
        }
    }

    /// Construct an `Argument` error.
    pub(crate) fn argument<S: Into<String>>(msg: S) -> Self {
        Error::Argument { msg: msg.into() }
    }

    /// Construct a `Configuration` error.
    pub(crate) fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration { msg: msg.into() }
    }

    /// Attach/override a concrete location to this error and return it.
    ///
    /// Only variants that carry positions are updated; value and usage
    /// errors pass through untouched.
    pub(crate) fn with_location(mut self, set_location: Location) -> Self {
        match &mut self {
            Error::UnterminatedToken { location, .. }
            | Error::UnexpectedCharacter { location, .. }
            | Error::Syntax { location, .. } => {
                *location = set_location;
            }
            Error::Argument { .. }
            | Error::Configuration { .. }
            | Error::MalformedReference { .. }
            | Error::InvalidQName { .. }
            | Error::Io { .. } => {}
        }
        self
    }

    /// If the error has a known location, return it.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::UnterminatedToken { location, .. }
            | Error::UnexpectedCharacter { location, .. }
            | Error::Syntax { location, .. } => {
                if location.is_known() {
                    Some(*location)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Whether this error aborts a parse as a format-level failure.
    ///
    /// Lexical failures count: they propagate up through the parser with the
    /// same abort semantics as a grammar violation.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Error::Syntax { .. }
                | Error::UnterminatedToken { .. }
                | Error::UnexpectedCharacter { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Argument { msg } => write!(f, "invalid argument: {msg}"),
            Error::Configuration { msg } => write!(f, "invalid configuration: {msg}"),
            Error::MalformedReference { reference } => {
                write!(f, "malformed IRI reference: {reference:?}")
            }
            Error::InvalidQName { text } => write!(f, "invalid QName: {text:?}"),
            Error::UnterminatedToken { what, location } => {
                fmt_with_location(f, &format!("unterminated {what}"), location)
            }
            Error::UnexpectedCharacter { ch, location } => {
                fmt_with_location(f, &format!("unexpected character {ch:?}"), location)
            }
            Error::Syntax { msg, location } => fmt_with_location(f, msg, location),
            Error::Io { cause } => write!(f, "IO error: {cause}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { cause } => Some(cause),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(cause: std::io::Error) -> Self {
        Error::Io { cause }
    }
}

/// Print a message optionally suffixed with "at line X, column Y".
fn fmt_with_location(f: &mut fmt::Formatter<'_>, msg: &str, location: &Location) -> fmt::Result {
    if location.is_known() {
        write!(
            f,
            "{msg} at line {}, column {}",
            location.line, location.column
        )
    } else {
        write!(f, "{msg}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_attaches_to_position_bearing_variants() {
        let err = Error::syntax("topic block not closed").with_location(Location::new(3, 14));
        assert_eq!(err.location(), Some(Location::new(3, 14)));
        assert_eq!(
            err.to_string(),
            "topic block not closed at line 3, column 14"
        );
    }

    #[test]
    fn location_does_not_attach_to_value_errors() {
        let err = Error::MalformedReference {
            reference: " ".into(),
        }
        .with_location(Location::new(1, 1));
        assert_eq!(err.location(), None);
    }

    #[test]
    fn unknown_location_is_not_printed() {
        let err = Error::syntax("dangling role");
        assert_eq!(err.to_string(), "dangling role");
    }

    #[test]
    fn syntax_classification_covers_lexical_failures() {
        assert!(
            Error::UnterminatedToken {
                what: "string",
                location: Location::UNKNOWN,
            }
            .is_syntax()
        );
        assert!(
            Error::UnexpectedCharacter {
                ch: '!',
                location: Location::UNKNOWN,
            }
            .is_syntax()
        );
        assert!(!Error::argument("source must have a base locator").is_syntax());
    }
}
