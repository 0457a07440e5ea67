//! IRI locators and reference resolution.
//!
//! A [`Locator`] wraps one IRI reference string. Resolution follows the
//! RFC 3986 reference-resolution rules (absolute references win, fragment
//! references replace the base fragment, relative paths merge against the
//! base path) without performing any normalization of the resolved text:
//! no case folding, no default-port removal, no percent-decoding. Two
//! locators are equal exactly when their reference strings are equal.
//!
//! Resolution is pure string work; no I/O happens here.

use std::fmt;

use crate::error::Error;

/// Characters that can never occur in an IRI reference.
///
/// This is the excluded set of RFC 3986 §2 plus ASCII control characters;
/// anything else is accepted verbatim, including non-ASCII.
fn is_forbidden(ch: char) -> bool {
    ch.is_ascii_control()
        || matches!(
            ch,
            ' ' | '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`'
        )
}

/// An IRI reference, resolved or resolvable.
///
/// The reference string is never empty. Equality and hashing are by the
/// reference string alone.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Locator {
    reference: String,
}

impl Locator {
    /// Create a locator from a reference string.
    ///
    /// Fails with [`Error::MalformedReference`] when the string is empty or
    /// contains characters that cannot occur in an IRI.
    pub fn new<S: Into<String>>(reference: S) -> Result<Self, Error> {
        let reference = reference.into();
        if reference.is_empty() || reference.chars().any(is_forbidden) {
            return Err(Error::MalformedReference { reference });
        }
        Ok(Self { reference })
    }

    /// Create a locator from a reference known to be well-formed.
    ///
    /// Used for compile-time vocabulary constants; external input must go
    /// through [`Locator::new`].
    pub fn new_unchecked<S: Into<String>>(reference: S) -> Self {
        Self {
            reference: reference.into(),
        }
    }

    /// The reference string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.reference
    }

    /// The reference string, giving up the locator.
    #[inline]
    pub fn into_string(self) -> String {
        self.reference
    }

    /// Resolve a reference against this locator.
    ///
    /// - An absolute reference (one with a scheme) is returned as-is; the
    ///   base plays no part.
    /// - A reference starting with `#` replaces the base's fragment.
    /// - Anything else is merged against the base's path with the base's
    ///   scheme and authority retained.
    pub fn resolve(&self, reference: &str) -> Result<Locator, Error> {
        if reference.is_empty() {
            // Same-document reference.
            return Ok(self.clone());
        }
        if scheme_end(reference).is_some() {
            return Locator::new(reference);
        }
        let base = Parts::of(&self.reference);
        let resolved = if let Some(fragment) = reference.strip_prefix('#') {
            format!("{}#{}", base.without_fragment(), fragment)
        } else if let Some(rest) = reference.strip_prefix("//") {
            match base.scheme {
                Some(scheme) => format!("{scheme}://{rest}"),
                None => reference.to_string(),
            }
        } else if let Some(query) = reference.strip_prefix('?') {
            format!("{}?{}", base.without_query(), query)
        } else if reference.starts_with('/') {
            format!("{}{}", base.root(), remove_dot_segments(reference))
        } else {
            let merged = merge_paths(&base, reference);
            format!("{}{}", base.root(), remove_dot_segments(&merged))
        };
        Locator::new(resolved)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}

/// Byte offset just past the scheme's `:`, when the reference has a scheme.
///
/// A scheme is an ASCII letter followed by letters, digits, `+`, `-` or `.`,
/// terminated by `:`. A colon inside the path (after `/`, `?` or `#`) does
/// not count.
fn scheme_end(reference: &str) -> Option<usize> {
    let mut chars = reference.char_indices();
    match chars.next() {
        Some((_, first)) if first.is_ascii_alphabetic() => {}
        _ => return None,
    }
    for (idx, ch) in chars {
        match ch {
            ':' => return Some(idx + 1),
            c if c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.') => {}
            _ => return None,
        }
    }
    None
}

/// The components of a reference, borrowed from the original string.
struct Parts<'a> {
    scheme: Option<&'a str>,
    /// Authority including the leading `//`, empty when absent.
    authority: &'a str,
    path: &'a str,
    /// Query including the leading `?`, empty when absent.
    query: &'a str,
}

impl<'a> Parts<'a> {
    fn of(reference: &'a str) -> Self {
        let (scheme, rest) = match scheme_end(reference) {
            Some(end) => (Some(&reference[..end - 1]), &reference[end..]),
            None => (None, reference),
        };
        // Strip fragment first; it never participates in path merging.
        let rest = match rest.find('#') {
            Some(pos) => &rest[..pos],
            None => rest,
        };
        let (authority, rest) = if rest.starts_with("//") {
            let end = rest[2..]
                .find(['/', '?'])
                .map(|p| p + 2)
                .unwrap_or(rest.len());
            (&rest[..end], &rest[end..])
        } else {
            ("", rest)
        };
        let (path, query) = match rest.find('?') {
            Some(pos) => (&rest[..pos], &rest[pos..]),
            None => (rest, ""),
        };
        Self {
            scheme,
            authority,
            path,
            query,
        }
    }

    /// Scheme and authority, the part a relative path can never change.
    fn root(&self) -> String {
        match self.scheme {
            Some(scheme) => format!("{scheme}:{}", self.authority),
            None => self.authority.to_string(),
        }
    }

    fn without_fragment(&self) -> String {
        format!("{}{}{}", self.root(), self.path, self.query)
    }

    fn without_query(&self) -> String {
        format!("{}{}", self.root(), self.path)
    }
}

/// RFC 3986 §5.3 path merge: the base path with its last segment dropped,
/// then the relative path appended.
fn merge_paths(base: &Parts<'_>, relative: &str) -> String {
    if !base.authority.is_empty() && base.path.is_empty() {
        return format!("/{relative}");
    }
    match base.path.rfind('/') {
        Some(pos) => format!("{}{relative}", &base.path[..=pos]),
        None => relative.to_string(),
    }
}

/// RFC 3986 §5.2.4 dot-segment removal.
fn remove_dot_segments(path: &str) -> String {
    let mut input = path.to_string();
    let mut output = String::new();
    while !input.is_empty() {
        if input.starts_with("../") {
            input.drain(..3);
        } else if input.starts_with("./") {
            input.drain(..2);
        } else if input.starts_with("/./") {
            input.replace_range(..3, "/");
        } else if input == "/." {
            input.replace_range(.., "/");
        } else if input.starts_with("/../") {
            input.replace_range(..4, "/");
            pop_segment(&mut output);
        } else if input == "/.." {
            input.replace_range(.., "/");
            pop_segment(&mut output);
        } else if input == "." || input == ".." {
            input.clear();
        } else {
            // Move one segment (the leading `/` plus everything up to the
            // next `/`) from input to output.
            let start = usize::from(input.starts_with('/'));
            let end = match input[start..].find('/') {
                Some(pos) => pos + start,
                None => input.len(),
            };
            output.push_str(&input[..end]);
            input.drain(..end);
        }
    }
    output
}

/// Drop the last `/segment` of `output`, if any.
fn pop_segment(output: &mut String) {
    match output.rfind('/') {
        Some(pos) => output.truncate(pos),
        None => output.clear(),
    }
}
