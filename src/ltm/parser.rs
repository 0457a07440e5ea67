//! Parser for the linear topic map notation.
//!
//! Consumes the token stream of [`LtmLexer`] and emits map-construction
//! events. All references leave this module resolved: plain identifiers
//! become item identifiers under the document IRI, prefixed names expand
//! against the `#PREFIX` environment, and `@"…"` references become subject
//! identifiers; the deserializer's IRI context gets the final word on
//! every resolved locator.

use std::rc::Rc;

use ahash::AHashMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::deserializer::{Deserializer, IriContext, SourceResolver};
use crate::error::{Error, Location};
use crate::handler::{HandlerRef, NodeRef};
use crate::literal::Literal;
use crate::locator::Locator;
use crate::ltm::lexer::{LtmLexer, TokenKind};
use crate::ltm::{LtmDeserializer, PROPERTY_IGNORE_MERGEMAP};
use crate::qname::QName;

/// The version this parser understands.
const LTM_VERSION: &str = "1.3";

/// Everything one parse of one document needs.
pub(crate) struct LtmParser<'a> {
    lexer: LtmLexer<'a>,
    handler: HandlerRef,
    /// Resolution base; `#BASEURI` rebinds it.
    doc_iri: Locator,
    prefixes: AHashMap<String, Locator>,
    iri_context: IriContext,
    resolver: Option<Rc<dyn SourceResolver>>,
    ignore_mergemap: bool,
    /// Document IRIs of enclosing parses, for include-cycle detection.
    include_stack: Vec<String>,
    /// One-token lookahead.
    current: Option<TokenKind>,
    value: &'a str,
    location: Location,
}

impl<'a> LtmParser<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        source: &'a str,
        doc_iri: Locator,
        handler: HandlerRef,
        iri_context: IriContext,
        resolver: Option<Rc<dyn SourceResolver>>,
        ignore_mergemap: bool,
        include_stack: Vec<String>,
    ) -> Self {
        Self {
            lexer: LtmLexer::new(source),
            handler,
            doc_iri,
            prefixes: AHashMap::new(),
            iri_context,
            resolver,
            ignore_mergemap,
            include_stack,
            current: None,
            value: "",
            location: Location::UNKNOWN,
        }
    }

    /// Parse the whole document.
    pub(crate) fn run(&mut self) -> Result<(), Error> {
        self.next()?;
        // An `@"encoding"` head is legal before anything else; the source
        // layer has already decoded the stream, so the name is only checked
        // for shape here.
        if self.current == Some(TokenKind::At) {
            self.next()?;
            self.expect_value(TokenKind::String, "encoding name")?;
        }
        while let Some(kind) = self.current {
            match kind {
                TokenKind::DirVersion => self.dir_version()?,
                TokenKind::DirTopicMap => self.dir_topicmap()?,
                TokenKind::DirBaseUri => self.dir_baseuri()?,
                TokenKind::DirPrefix => self.dir_prefix()?,
                TokenKind::DirInclude => self.dir_include()?,
                TokenKind::DirMergeMap => self.dir_mergemap()?,
                TokenKind::LBracket => self.topic()?,
                TokenKind::LCurly => self.occurrence()?,
                TokenKind::Ident | TokenKind::QName | TokenKind::At => self.association()?,
                _ => {
                    return Err(self.unexpected("a directive, topic, occurrence or association"));
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    fn next(&mut self) -> Result<(), Error> {
        if self.lexer.advance()? {
            self.current = self.lexer.token();
            self.value = self.lexer.value();
            self.location = self.lexer.location();
        } else {
            self.current = None;
            self.value = "";
        }
        Ok(())
    }

    fn unexpected(&self, expected: &str) -> Error {
        let found = match self.current {
            Some(_) => format!("{:?}", self.value),
            None => "end of input".to_string(),
        };
        Error::syntax(format!("expected {expected}, found {found}")).with_location(self.location)
    }

    /// Consume the current token, which must be of `kind`, and return its
    /// text.
    fn expect_value(&mut self, kind: TokenKind, expected: &str) -> Result<&'a str, Error> {
        if self.current != Some(kind) {
            return Err(self.unexpected(expected));
        }
        let value = self.value;
        self.next()?;
        Ok(value)
    }

    fn eat(&mut self, kind: TokenKind) -> Result<bool, Error> {
        if self.current == Some(kind) {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    // ------------------------------------------------------------------
    // Reference resolution
    // ------------------------------------------------------------------

    fn resolve(&self, reference: &str) -> Result<Locator, Error> {
        let resolved = self
            .doc_iri
            .resolve(reference)
            .map_err(|err| match err {
                Error::MalformedReference { reference } => {
                    Error::syntax(format!("malformed IRI reference {reference:?}"))
                        .with_location(self.location)
                }
                other => other,
            })?;
        Ok(self.iri_context.apply(resolved))
    }

    /// An identifier becomes an item identifier under the document IRI.
    fn topic_by_id(&self, id: &str) -> Result<NodeRef, Error> {
        Ok(NodeRef::ItemIdentifier(self.resolve(&format!("#{id}"))?))
    }

    /// A prefixed name becomes a subject identifier: the prefix binding
    /// with the local part appended.
    fn topic_by_qname(&self, text: &str) -> Result<NodeRef, Error> {
        let qname = QName::new(text).map_err(|err| match err {
            Error::InvalidQName { text } => {
                Error::syntax(format!("invalid prefixed name {text:?}"))
                    .with_location(self.location)
            }
            other => other,
        })?;
        let binding = self.prefixes.get(qname.prefix()).ok_or_else(|| {
            Error::syntax(format!("undeclared prefix {:?}", qname.prefix()))
                .with_location(self.location)
        })?;
        let expanded = Locator::new(format!("{}{}", binding.as_str(), qname.local()))?;
        Ok(NodeRef::SubjectIdentifier(self.iri_context.apply(expanded)))
    }

    /// One topic reference: `id`, `prefix:local` or `@"iri"`.
    fn topic_ref(&mut self) -> Result<NodeRef, Error> {
        match self.current {
            Some(TokenKind::Ident) => {
                let node = self.topic_by_id(self.value)?;
                self.next()?;
                Ok(node)
            }
            Some(TokenKind::QName) => {
                let node = self.topic_by_qname(self.value)?;
                self.next()?;
                Ok(node)
            }
            Some(TokenKind::At) => {
                self.next()?;
                let iri = self.expect_value(TokenKind::String, "a subject identifier IRI")?;
                Ok(NodeRef::SubjectIdentifier(self.resolve(iri)?))
            }
            _ => Err(self.unexpected("a topic reference")),
        }
    }

    // ------------------------------------------------------------------
    // Directives
    // ------------------------------------------------------------------

    fn dir_version(&mut self) -> Result<(), Error> {
        self.next()?;
        let location = self.location;
        let version = self.expect_value(TokenKind::String, "a version string")?;
        if version != LTM_VERSION {
            return Err(
                Error::syntax(format!("unsupported version {version:?}")).with_location(location)
            );
        }
        Ok(())
    }

    fn dir_topicmap(&mut self) -> Result<(), Error> {
        self.next()?;
        let reified = self.eat(TokenKind::Tilde)?;
        let node = self.topic_ref()?;
        // The map boundary belongs to the top-level parse; a subordinate
        // document cannot re-reify it.
        if reified && self.include_stack.is_empty() {
            let mut handler = self.handler.borrow_mut();
            handler.start_reifier();
            handler.node_ref(&node);
            handler.end_reifier();
        }
        Ok(())
    }

    fn dir_baseuri(&mut self) -> Result<(), Error> {
        self.next()?;
        let iri = self.expect_value(TokenKind::String, "a base IRI")?;
        self.doc_iri = self.resolve(iri)?;
        trace!(base = %self.doc_iri, "base IRI rebound");
        Ok(())
    }

    fn dir_prefix(&mut self) -> Result<(), Error> {
        self.next()?;
        let name = self.expect_value(TokenKind::Ident, "a prefix name")?;
        if !self.eat(TokenKind::At)? {
            return Err(self.unexpected("`@` before the prefix IRI"));
        }
        let iri = self.expect_value(TokenKind::String, "the prefix IRI")?;
        let binding = self.resolve(iri)?;
        self.prefixes.insert(name.to_string(), binding);
        Ok(())
    }

    fn dir_include(&mut self) -> Result<(), Error> {
        self.next()?;
        let location = self.location;
        let iri = self.expect_value(TokenKind::String, "the IRI to include")?;
        let target = self.resolve(iri)?;
        self.subordinate_parse(&target, location)
    }

    fn dir_mergemap(&mut self) -> Result<(), Error> {
        self.next()?;
        let location = self.location;
        let iri = self.expect_value(TokenKind::String, "the IRI to merge")?;
        let target = self.resolve(iri)?;
        // An optional second string names the merged document's syntax.
        let syntax = if self.current == Some(TokenKind::String) {
            self.expect_value(TokenKind::String, "a syntax name")?
        } else {
            "ltm"
        };
        if self.ignore_mergemap {
            trace!(target = %target, "merge directive suppressed");
            return Ok(());
        }
        if !syntax.eq_ignore_ascii_case("ltm") {
            return Err(
                Error::syntax(format!("cannot merge {syntax:?} documents")).with_location(location)
            );
        }
        self.subordinate_parse(&target, location)
    }

    /// Parse the document at `target` with a fresh subordinate instance
    /// sharing this parse's handler. The subordinate emits no boundary
    /// events and the nested stream is its own to release.
    fn subordinate_parse(&mut self, target: &Locator, location: Location) -> Result<(), Error> {
        if self.include_stack.iter().any(|seen| seen == target.as_str())
            || target == &self.doc_iri
        {
            return Err(
                Error::syntax(format!("circular inclusion of <{target}>")).with_location(location)
            );
        }
        let Some(resolver) = self.resolver.clone() else {
            return Err(Error::configuration(
                "inclusion requires a source resolver",
            ));
        };
        let nested = resolver.resolve(target)?;
        let mut child = LtmDeserializer::new();
        child.set_handler(self.handler.clone());
        child.set_subordinate(true);
        child.set_resolver(resolver);
        child.set_iri_context(self.iri_context.clone());
        if self.ignore_mergemap {
            child.set_property(PROPERTY_IGNORE_MERGEMAP, true.into());
        }
        child.include_stack = self.include_stack.clone();
        child.include_stack.push(self.doc_iri.as_str().to_string());
        trace!(target = %target, "subordinate parse");
        child.parse(nested)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// `[id : type… = "name"… @"subjid"… %"subjloc"…]`
    fn topic(&mut self) -> Result<(), Error> {
        self.next()?;
        let node = self.topic_ref()?;
        self.handler.borrow_mut().start_node(&node);
        let result = self.topic_tail();
        self.handler.borrow_mut().end_node();
        result
    }

    fn topic_tail(&mut self) -> Result<(), Error> {
        if self.eat(TokenKind::Colon)? {
            self.handler.borrow_mut().start_isa();
            loop {
                let kind = self.topic_ref()?;
                self.handler.borrow_mut().node_ref(&kind);
                if !matches!(
                    self.current,
                    Some(TokenKind::Ident | TokenKind::QName | TokenKind::At)
                ) {
                    break;
                }
            }
            self.handler.borrow_mut().end_isa();
        }
        while self.eat(TokenKind::Eq)? {
            self.name()?;
        }
        loop {
            if self.eat(TokenKind::At)? {
                let iri = self.expect_value(TokenKind::String, "a subject identifier IRI")?;
                let resolved = self.resolve(iri)?;
                self.handler.borrow_mut().subject_identifier(&resolved);
            } else if self.eat(TokenKind::Percent)? {
                let iri = self.expect_value(TokenKind::String, "a subject locator IRI")?;
                let resolved = self.resolve(iri)?;
                self.handler.borrow_mut().subject_locator(&resolved);
            } else {
                break;
            }
        }
        if self.current != Some(TokenKind::RBracket) {
            return Err(self.unexpected("`]` closing the topic"));
        }
        self.next()?;
        Ok(())
    }

    /// After the `=`: `"base" (; "variant")* (/ theme…)? (~ reifier)?`
    fn name(&mut self) -> Result<(), Error> {
        let text = self.expect_value(TokenKind::String, "a name string")?;
        let mut handler = self.handler.borrow_mut();
        handler.start_name();
        handler.value(&Literal::string(text));
        drop(handler);
        while self.eat(TokenKind::Semi)? {
            // Sort and display names are variants of the base name.
            let variant = self.expect_value(TokenKind::String, "a variant string")?;
            let mut handler = self.handler.borrow_mut();
            handler.start_variant();
            handler.value(&Literal::string(variant));
            handler.end_variant();
        }
        self.scope()?;
        self.reifier()?;
        self.handler.borrow_mut().end_name();
        Ok(())
    }

    /// `{topic, type, "iri" | [[data]]} (/ theme…)? (~ reifier)?`
    fn occurrence(&mut self) -> Result<(), Error> {
        self.next()?;
        let node = self.topic_ref()?;
        self.handler.borrow_mut().start_node(&node);
        let result = self.occurrence_tail();
        self.handler.borrow_mut().end_node();
        result
    }

    fn occurrence_tail(&mut self) -> Result<(), Error> {
        if !self.eat(TokenKind::Comma)? {
            return Err(self.unexpected("`,` after the occurrence topic"));
        }
        let occurrence_type = self.topic_ref()?;
        if !self.eat(TokenKind::Comma)? {
            return Err(self.unexpected("`,` after the occurrence type"));
        }
        let literal = match self.current {
            Some(TokenKind::String) => {
                let iri = self.value;
                let resolved = self.resolve(iri)?;
                self.next()?;
                Literal::iri(&resolved)
            }
            Some(TokenKind::Data) => {
                let data = self.value;
                self.next()?;
                Literal::string(data)
            }
            _ => return Err(self.unexpected("an occurrence resource")),
        };
        let mut handler = self.handler.borrow_mut();
        handler.start_occurrence();
        handler.start_type();
        handler.node_ref(&occurrence_type);
        handler.end_type();
        handler.value(&literal);
        drop(handler);
        if self.current != Some(TokenKind::RCurly) {
            return Err(self.unexpected("`}` closing the occurrence"));
        }
        self.next()?;
        self.scope()?;
        self.reifier()?;
        self.handler.borrow_mut().end_occurrence();
        Ok(())
    }

    /// `type(player : role, …) (/ theme…)? (~ reifier)?`
    fn association(&mut self) -> Result<(), Error> {
        let association_type = self.topic_ref()?;
        if self.current != Some(TokenKind::LParen) {
            return Err(self.unexpected("`(` opening the association"));
        }
        self.next()?;
        let mut handler = self.handler.borrow_mut();
        handler.start_association();
        handler.start_type();
        handler.node_ref(&association_type);
        handler.end_type();
        drop(handler);
        loop {
            self.role()?;
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        if self.current != Some(TokenKind::RParen) {
            return Err(self.unexpected("`)` closing the association"));
        }
        self.next()?;
        self.scope()?;
        self.reifier()?;
        self.handler.borrow_mut().end_association();
        Ok(())
    }

    fn role(&mut self) -> Result<(), Error> {
        let player = self.topic_ref()?;
        let mut handler = self.handler.borrow_mut();
        handler.start_role();
        handler.start_player();
        handler.node_ref(&player);
        handler.end_player();
        drop(handler);
        if self.eat(TokenKind::Colon)? {
            let role_type = self.topic_ref()?;
            let mut handler = self.handler.borrow_mut();
            handler.start_type();
            handler.node_ref(&role_type);
            handler.end_type();
        }
        self.handler.borrow_mut().end_role();
        Ok(())
    }

    /// `/ theme…` — themes until something else shows up.
    fn scope(&mut self) -> Result<(), Error> {
        if !self.eat(TokenKind::Slash)? {
            return Ok(());
        }
        self.handler.borrow_mut().start_scope();
        let mut themes: SmallVec<[NodeRef; 4]> = SmallVec::new();
        loop {
            themes.push(self.topic_ref()?);
            if !matches!(
                self.current,
                Some(TokenKind::Ident | TokenKind::QName | TokenKind::At)
            ) {
                break;
            }
        }
        let mut handler = self.handler.borrow_mut();
        for theme in &themes {
            handler.node_ref(theme);
        }
        handler.end_scope();
        Ok(())
    }

    /// `~ reifier`
    fn reifier(&mut self) -> Result<(), Error> {
        if !self.eat(TokenKind::Tilde)? {
            return Ok(());
        }
        let node = self.topic_ref()?;
        let mut handler = self.handler.borrow_mut();
        handler.start_reifier();
        handler.node_ref(&node);
        handler.end_reifier();
        Ok(())
    }
}
