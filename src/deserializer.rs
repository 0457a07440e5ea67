//! The deserializer lifecycle every concrete parser implements.
//!
//! One parse session moves `Idle → Parsing → Done` (or `Failed`). The
//! lifecycle plumbing — handler bookkeeping, subordinate-parse suppression,
//! boundary events, the property bag and the IRI context — lives in
//! [`DeserializerBase`], which concrete parsers hold as a field; the
//! [`Deserializer`] trait is the surface callers program against.
//!
//! Boundary discipline: unless the instance is subordinate, `start_map` is
//! emitted before any format work and `end_map` is emitted on *every* exit
//! from the parsing state — including the failing ones — so the handler
//! always gets a chance to finalize. A subordinate instance emits neither
//! and never owns the stream; its parent does.

use std::rc::Rc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::handler::HandlerRef;
use crate::locator::Locator;
use crate::source::Source;

/// A value in the string-keyed property bag.
///
/// Unset keys read as absent, never as an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl PropertyValue {
    /// The boolean inside, if this is a boolean property.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The string inside, if this is a string property.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

/// Per-deserializer mapping used to customize reference resolution: a
/// resolved reference that appears as a key is replaced by the mapped
/// locator before it reaches the handler.
#[derive(Clone, Debug, Default)]
pub struct IriContext {
    map: AHashMap<String, Locator>,
}

impl IriContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The replacement for `reference`, if one was registered.
    pub fn get(&self, reference: &str) -> Option<&Locator> {
        self.map.get(reference)
    }

    /// Register a replacement. The last registration for a reference wins.
    pub fn set<S: Into<String>>(&mut self, reference: S, replacement: Locator) {
        self.map.insert(reference.into(), replacement);
    }

    pub fn remove(&mut self, reference: &str) -> Option<Locator> {
        self.map.remove(reference)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Apply this context to a resolved locator.
    pub(crate) fn apply(&self, resolved: Locator) -> Locator {
        match self.map.get(resolved.as_str()) {
            Some(replacement) => replacement.clone(),
            None => resolved,
        }
    }
}

/// The acquisition seam for nested parses: maps an IRI to a fresh
/// [`Source`]. Implementations live outside the core (filesystem, archive,
/// test fixtures); the core never performs acquisition itself.
pub trait SourceResolver {
    fn resolve(&self, iri: &Locator) -> Result<Source, Error>;
}

/// Where an instance is within its single parse session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseState {
    Idle,
    Parsing,
    Done,
    Failed,
}

/// One parse session over one [`Source`].
///
/// The handler must be attached before [`Deserializer::parse`]; it is
/// released when the session ends, so a second parse requires attaching a
/// handler again.
pub trait Deserializer {
    /// Attach the handler that will receive the event stream.
    fn set_handler(&mut self, handler: HandlerRef);

    /// Mark this instance as driven by an enclosing parse. A subordinate
    /// instance emits no boundary events and does not own the stream.
    fn set_subordinate(&mut self, subordinate: bool);

    fn is_subordinate(&self) -> bool;

    /// Run the parse session.
    ///
    /// Fails with [`Error::Configuration`] when no handler is attached or
    /// the instance is already parsing; every other failure comes from the
    /// format logic or the stream. The source's stream is released on all
    /// exit paths.
    fn parse(&mut self, source: Source) -> Result<(), Error>;

    /// Read a format-specific property. Unset keys are `None`.
    fn property(&self, key: &str) -> Option<&PropertyValue>;

    /// Set a format-specific property.
    fn set_property(&mut self, key: &str, value: PropertyValue);

    fn iri_context(&self) -> &IriContext;

    fn set_iri_context(&mut self, context: IriContext);
}

/// Lifecycle state owned by every concrete deserializer.
///
/// Concrete parsers embed one of these and route the [`Deserializer`]
/// methods to it; [`DeserializerBase::run_parse`] wraps the format logic
/// with the boundary/cleanup discipline.
pub struct DeserializerBase {
    handler: Option<HandlerRef>,
    subordinate: bool,
    state: ParseState,
    properties: AHashMap<String, PropertyValue>,
    iri_context: IriContext,
    resolver: Option<Rc<dyn SourceResolver>>,
}

impl DeserializerBase {
    pub fn new() -> Self {
        Self {
            handler: None,
            subordinate: false,
            state: ParseState::Idle,
            properties: AHashMap::new(),
            iri_context: IriContext::new(),
            resolver: None,
        }
    }

    pub fn set_handler(&mut self, handler: HandlerRef) {
        self.handler = Some(handler);
        // A finished instance becomes usable again once it has a handler.
        if matches!(self.state, ParseState::Done | ParseState::Failed) {
            self.state = ParseState::Idle;
        }
    }

    pub fn set_subordinate(&mut self, subordinate: bool) {
        self.subordinate = subordinate;
    }

    pub fn is_subordinate(&self) -> bool {
        self.subordinate
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn set_property(&mut self, key: &str, value: PropertyValue) {
        self.properties.insert(key.to_string(), value);
    }

    pub fn iri_context(&self) -> &IriContext {
        &self.iri_context
    }

    pub fn set_iri_context(&mut self, context: IriContext) {
        self.iri_context = context;
    }

    /// The acquisition seam used by inclusion directives, if configured.
    pub fn resolver(&self) -> Option<Rc<dyn SourceResolver>> {
        self.resolver.clone()
    }

    pub fn set_resolver(&mut self, resolver: Rc<dyn SourceResolver>) {
        self.resolver = Some(resolver);
    }

    /// Run one parse session around the given format logic.
    ///
    /// Handles the whole lifecycle: precondition checks, the `Idle →
    /// Parsing` transition, the boundary events (suppressed when
    /// subordinate), the `Parsing → Done/Failed` transition, and handler
    /// release. The format callback receives the source and the handler
    /// handle; dropping the source inside it is what releases the stream,
    /// on success and failure alike.
    pub fn run_parse<F>(&mut self, source: Source, format: F) -> Result<(), Error>
    where
        F: FnOnce(Source, &HandlerRef) -> Result<(), Error>,
    {
        if self.state == ParseState::Parsing {
            return Err(Error::configuration("parse is already running"));
        }
        let handler = self
            .handler
            .take()
            .ok_or_else(|| Error::configuration("no handler attached"))?;
        self.state = ParseState::Parsing;
        debug!(subordinate = self.subordinate, "parse started");
        if !self.subordinate {
            handler.borrow_mut().start_map();
        }
        let result = format(source, &handler);
        // The boundary closes even after a failure so the handler can
        // finalize; subordinate parses leave the boundary to their parent.
        if !self.subordinate {
            handler.borrow_mut().end_map();
        }
        self.state = if result.is_ok() {
            ParseState::Done
        } else {
            ParseState::Failed
        };
        debug!(state = ?self.state, "parse finished");
        result
    }
}

impl Default for DeserializerBase {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DeserializerBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeserializerBase")
            .field("handler", &self.handler.is_some())
            .field("subordinate", &self.subordinate)
            .field("state", &self.state)
            .field("properties", &self.properties)
            .field("iri_context", &self.iri_context)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::MapHandler;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Boundaries {
        starts: usize,
        ends: usize,
    }

    impl MapHandler for Boundaries {
        fn start_map(&mut self) {
            self.starts += 1;
        }

        fn end_map(&mut self) {
            self.ends += 1;
        }
    }

    fn source() -> Source {
        Source::from_text("", Locator::new("http://example.org/").unwrap())
    }

    #[test]
    fn parse_without_handler_is_a_configuration_error() {
        let mut base = DeserializerBase::new();
        let result = base.run_parse(source(), |_, _| Ok(()));
        assert!(matches!(result, Err(Error::Configuration { .. })));
        assert_eq!(base.state(), ParseState::Idle);
    }

    #[test]
    fn boundaries_fire_once_around_the_format_logic() {
        let handler = Rc::new(RefCell::new(Boundaries::default()));
        let mut base = DeserializerBase::new();
        base.set_handler(handler.clone());
        let probe = handler.clone();
        base.run_parse(source(), move |_, _| {
            let b = probe.borrow();
            assert_eq!((b.starts, b.ends), (1, 0));
            Ok(())
        })
        .unwrap();
        let b = handler.borrow();
        assert_eq!((b.starts, b.ends), (1, 1));
        assert_eq!(base.state(), ParseState::Done);
    }

    #[test]
    fn end_map_is_emitted_even_on_failure() {
        let handler = Rc::new(RefCell::new(Boundaries::default()));
        let mut base = DeserializerBase::new();
        base.set_handler(handler.clone());
        let result = base.run_parse(source(), |_, _| Err(Error::syntax("boom")));
        assert!(result.is_err());
        let b = handler.borrow();
        assert_eq!((b.starts, b.ends), (1, 1));
        assert_eq!(base.state(), ParseState::Failed);
    }

    #[test]
    fn subordinate_emits_no_boundaries() {
        let handler = Rc::new(RefCell::new(Boundaries::default()));
        let mut base = DeserializerBase::new();
        base.set_handler(handler.clone());
        base.set_subordinate(true);
        base.run_parse(source(), |_, _| Ok(())).unwrap();
        let b = handler.borrow();
        assert_eq!((b.starts, b.ends), (0, 0));
    }

    #[test]
    fn handler_is_released_after_the_session() {
        let handler = Rc::new(RefCell::new(Boundaries::default()));
        let mut base = DeserializerBase::new();
        base.set_handler(handler.clone());
        base.run_parse(source(), |_, _| Ok(())).unwrap();
        // Second parse without a fresh handler must fail.
        let result = base.run_parse(source(), |_, _| Ok(()));
        assert!(matches!(result, Err(Error::Configuration { .. })));
        // Re-attaching makes the instance usable again.
        base.set_handler(handler);
        base.run_parse(source(), |_, _| Ok(())).unwrap();
    }

    #[test]
    fn property_bag_reads_unset_keys_as_absent() {
        let mut base = DeserializerBase::new();
        assert!(base.property("validate").is_none());
        base.set_property("validate", PropertyValue::from(true));
        assert_eq!(
            base.property("validate").and_then(PropertyValue::as_bool),
            Some(true)
        );
    }

    #[test]
    fn iri_context_rewrites_exact_references() {
        let mut ctx = IriContext::new();
        ctx.set(
            "http://example.org/old",
            Locator::new("http://example.org/new").unwrap(),
        );
        let rewritten = ctx.apply(Locator::new("http://example.org/old").unwrap());
        assert_eq!(rewritten.as_str(), "http://example.org/new");
        let untouched = ctx.apply(Locator::new("http://example.org/other").unwrap());
        assert_eq!(untouched.as_str(), "http://example.org/other");
    }
}
