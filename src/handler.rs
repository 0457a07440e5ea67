//! The map-construction event contract.
//!
//! Every concrete parser emits the same ordered callback surface while it is
//! parsing; the event vocabulary is syntax-agnostic. All values arriving
//! here are already resolved — locators are absolute, literals carry their
//! datatype — so a handler never sees raw syntax.
//!
//! Every method has an empty default body: a handler implements exactly the
//! events it cares about, SAX-style.

use std::cell::RefCell;
use std::rc::Rc;

use crate::literal::Literal;
use crate::locator::Locator;

/// How a parser refers to a node it may or may not have seen yet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeRef {
    /// By a subject identifier.
    SubjectIdentifier(Locator),
    /// By a subject locator (the subject *is* the resource).
    SubjectLocator(Locator),
    /// By an item identifier within the map being built.
    ItemIdentifier(Locator),
}

impl NodeRef {
    /// The locator inside the reference, whichever kind it is.
    pub fn locator(&self) -> &Locator {
        match self {
            NodeRef::SubjectIdentifier(loc)
            | NodeRef::SubjectLocator(loc)
            | NodeRef::ItemIdentifier(loc) => loc,
        }
    }
}

/// Shared handle under which a parse (and its subordinate parses) drive one
/// handler.
pub type HandlerRef = Rc<RefCell<dyn MapHandler>>;

/// Receiver of map-construction events.
///
/// Boundary events `start_map`/`end_map` arrive exactly once per top-level
/// parse, in that order, with every other event strictly between them.
/// Nested constructs arrive as balanced `start_*`/`end_*` pairs.
#[allow(unused_variables)]
pub trait MapHandler {
    /// The document boundary opens. Not emitted by subordinate parses.
    fn start_map(&mut self) {}

    /// The document boundary closes. Emitted during cleanup even when the
    /// parse failed, so the handler can finalize; not emitted by
    /// subordinate parses.
    fn end_map(&mut self) {}

    /// A node declaration opens, introduced by `node`.
    fn start_node(&mut self, node: &NodeRef) {}

    fn end_node(&mut self) {}

    /// Assert a subject identifier on the node in scope.
    fn subject_identifier(&mut self, iri: &Locator) {}

    /// Assert a subject locator on the node in scope.
    fn subject_locator(&mut self, iri: &Locator) {}

    /// Assert an item identifier on the node in scope.
    fn item_identifier(&mut self, iri: &Locator) {}

    /// A type-instance assertion opens; the type arrives via [`MapHandler::node_ref`].
    fn start_isa(&mut self) {}

    fn end_isa(&mut self) {}

    /// A name assertion opens.
    fn start_name(&mut self) {}

    fn end_name(&mut self) {}

    /// A name-variant assertion opens, within the enclosing name.
    fn start_variant(&mut self) {}

    fn end_variant(&mut self) {}

    /// An occurrence assertion opens.
    fn start_occurrence(&mut self) {}

    fn end_occurrence(&mut self) {}

    /// An association assertion opens.
    fn start_association(&mut self) {}

    fn end_association(&mut self) {}

    /// A role opens, within the enclosing association.
    fn start_role(&mut self) {}

    fn end_role(&mut self) {}

    /// The player of the role in scope follows as one [`MapHandler::node_ref`].
    fn start_player(&mut self) {}

    fn end_player(&mut self) {}

    /// The type of the statement in scope follows as one [`MapHandler::node_ref`].
    fn start_type(&mut self) {}

    fn end_type(&mut self) {}

    /// The scope of the statement in scope opens; each theme arrives via
    /// [`MapHandler::node_ref`].
    fn start_scope(&mut self) {}

    fn end_scope(&mut self) {}

    /// The reifier of the statement in scope follows as one [`MapHandler::node_ref`].
    fn start_reifier(&mut self) {}

    fn end_reifier(&mut self) {}

    /// A node reference within the innermost open `start_*` context.
    fn node_ref(&mut self, node: &NodeRef) {}

    /// The value of the name, variant or occurrence in scope.
    fn value(&mut self, literal: &Literal) {}
}
