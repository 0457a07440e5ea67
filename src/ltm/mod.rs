//! The linear topic map notation (LTM) deserializer.
//!
//! This is the worked exemplar of the deserializer contract: a hand-rolled
//! scanner ([`lexer`]) under a recursive-descent parser ([`parser`]) that
//! emits map-construction events through the shared lifecycle plumbing.

pub mod lexer;
mod parser;

use std::rc::Rc;

use crate::deserializer::{
    Deserializer, DeserializerBase, IriContext, PropertyValue, SourceResolver,
};
use crate::error::Error;
use crate::handler::HandlerRef;
use crate::registry::DeserializerFactory;
use crate::source::Source;
use crate::syntax::{self, Syntax};

use parser::LtmParser;

/// Boolean property: when set, `#MERGEMAP` directives are consumed and
/// ignored instead of triggering a subordinate parse.
pub const PROPERTY_IGNORE_MERGEMAP: &str = "mergemap.ignore";

/// One LTM parse session.
pub struct LtmDeserializer {
    base: DeserializerBase,
    /// Document IRIs of enclosing parses; non-empty only on subordinate
    /// instances created for `#INCLUDE`/`#MERGEMAP`.
    pub(crate) include_stack: Vec<String>,
}

impl LtmDeserializer {
    pub fn new() -> Self {
        Self {
            base: DeserializerBase::new(),
            include_stack: Vec::new(),
        }
    }

    /// Configure the acquisition seam used by `#INCLUDE` and `#MERGEMAP`.
    /// Without one, those directives fail with a configuration error.
    pub fn set_resolver(&mut self, resolver: Rc<dyn SourceResolver>) {
        self.base.set_resolver(resolver);
    }
}

impl Default for LtmDeserializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deserializer for LtmDeserializer {
    fn set_handler(&mut self, handler: HandlerRef) {
        self.base.set_handler(handler);
    }

    fn set_subordinate(&mut self, subordinate: bool) {
        self.base.set_subordinate(subordinate);
    }

    fn is_subordinate(&self) -> bool {
        self.base.is_subordinate()
    }

    fn parse(&mut self, source: Source) -> Result<(), Error> {
        // Fresh parser/lexer state per session; nothing lexical survives
        // into a later parse of this instance.
        let iri_context = self.base.iri_context().clone();
        let resolver = self.base.resolver();
        let ignore_mergemap = self
            .base
            .property(PROPERTY_IGNORE_MERGEMAP)
            .and_then(PropertyValue::as_bool)
            .unwrap_or(false);
        let include_stack = self.include_stack.clone();
        self.base.run_parse(source, move |source, handler| {
            let (text, doc_iri) = source.into_text()?;
            let mut parser = LtmParser::new(
                &text,
                doc_iri,
                handler.clone(),
                iri_context,
                resolver,
                ignore_mergemap,
                include_stack,
            );
            parser.run()
        })
    }

    fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.base.property(key)
    }

    fn set_property(&mut self, key: &str, value: PropertyValue) {
        self.base.set_property(key, value);
    }

    fn iri_context(&self) -> &IriContext {
        self.base.iri_context()
    }

    fn set_iri_context(&mut self, context: IriContext) {
        self.base.set_iri_context(context);
    }
}

/// Stateless factory producing fresh [`LtmDeserializer`] instances.
pub struct LtmFactory;

impl DeserializerFactory for LtmFactory {
    fn syntax(&self) -> Syntax {
        syntax::LTM
    }

    fn create(&self) -> Box<dyn Deserializer> {
        Box::new(LtmDeserializer::new())
    }
}
