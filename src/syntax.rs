//! Syntax descriptors.
//!
//! Every concrete notation is described by a stable identifier plus its
//! file-extension and MIME-type aliases. Lookups are case-insensitive and
//! take a caller-supplied default for the no-match case.

/// Descriptor of one concrete syntax.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Syntax {
    name: &'static str,
    extensions: &'static [&'static str],
    mime_types: &'static [&'static str],
}

/// Linear Topic Map notation.
pub const LTM: Syntax = Syntax::new("LTM", &["ltm"], &["text/x-ltm"]);

/// XML Topic Maps.
pub const XTM: Syntax = Syntax::new("XTM", &["xtm"], &["application/x-tm+xtm", "application/xml"]);

/// Compact Topic Maps notation.
pub const CTM: Syntax = Syntax::new("CTM", &["ctm", "tmcl"], &["application/x-tm+ctm"]);

/// JSON Topic Maps.
pub const JTM: Syntax = Syntax::new("JTM", &["jtm"], &["application/x-tm+jtm", "application/json"]);

/// TM/XML.
pub const TMXML: Syntax = Syntax::new("TM/XML", &["tmx", "xml"], &["application/x-tm+tmxml"]);

/// The descriptors this crate knows out of the box. Registering a factory
/// for a syntax outside this list is fine; these only feed the alias
/// lookups below.
pub const BUILTIN: &[Syntax] = &[LTM, XTM, CTM, JTM, TMXML];

impl Syntax {
    /// Describe a syntax. Aliases are matched case-insensitively.
    pub const fn new(
        name: &'static str,
        extensions: &'static [&'static str],
        mime_types: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            extensions,
            mime_types,
        }
    }

    /// The stable identifier this syntax registers and looks up under.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// File-extension aliases, primary first.
    #[inline]
    pub fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    /// MIME-type aliases, primary first.
    #[inline]
    pub fn mime_types(&self) -> &'static [&'static str] {
        self.mime_types
    }

    /// Find a builtin syntax by file extension, or return `default`.
    pub fn for_extension(extension: &str, default: Option<Syntax>) -> Option<Syntax> {
        BUILTIN
            .iter()
            .find(|syntax| {
                syntax
                    .extensions
                    .iter()
                    .any(|ext| ext.eq_ignore_ascii_case(extension))
            })
            .copied()
            .or(default)
    }

    /// Find a builtin syntax by MIME type, or return `default`.
    pub fn for_mime_type(mime_type: &str, default: Option<Syntax>) -> Option<Syntax> {
        BUILTIN
            .iter()
            .find(|syntax| {
                syntax
                    .mime_types
                    .iter()
                    .any(|mt| mt.eq_ignore_ascii_case(mime_type))
            })
            .copied()
            .or(default)
    }
}

impl std::fmt::Display for Syntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(Syntax::for_extension("ltm", None), Some(LTM));
        assert_eq!(Syntax::for_extension("LTM", None), Some(LTM));
        assert_eq!(Syntax::for_extension("Xtm", None), Some(XTM));
        assert_eq!(Syntax::for_extension("nope", None), None);
        assert_eq!(Syntax::for_extension("nope", Some(CTM)), Some(CTM));
    }

    #[test]
    fn mime_lookup_is_case_insensitive() {
        assert_eq!(Syntax::for_mime_type("TEXT/X-LTM", None), Some(LTM));
        assert_eq!(
            Syntax::for_mime_type("application/x-tm+jtm", None),
            Some(JTM)
        );
        assert_eq!(Syntax::for_mime_type("text/plain", Some(LTM)), Some(LTM));
        assert_eq!(Syntax::for_mime_type("text/plain", None), None);
    }

    #[test]
    fn secondary_aliases_resolve() {
        assert_eq!(Syntax::for_extension("tmcl", None), Some(CTM));
        assert_eq!(Syntax::for_mime_type("application/json", None), Some(JTM));
    }
}
