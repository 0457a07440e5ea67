//! Shared test support: a handler that records the event stream as data.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use tmio::{Literal, Locator, MapHandler, NodeRef};

/// One recorded callback.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    StartMap,
    EndMap,
    StartNode(NodeRef),
    EndNode,
    SubjectIdentifier(String),
    SubjectLocator(String),
    ItemIdentifier(String),
    StartIsa,
    EndIsa,
    StartName,
    EndName,
    StartVariant,
    EndVariant,
    StartOccurrence,
    EndOccurrence,
    StartAssociation,
    EndAssociation,
    StartRole,
    EndRole,
    StartPlayer,
    EndPlayer,
    StartType,
    EndType,
    StartScope,
    EndScope,
    StartReifier,
    EndReifier,
    Ref(NodeRef),
    /// Value and datatype IRI.
    Value(String, String),
}

#[derive(Default)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl MapHandler for Recorder {
    fn start_map(&mut self) {
        self.events.push(Event::StartMap);
    }

    fn end_map(&mut self) {
        self.events.push(Event::EndMap);
    }

    fn start_node(&mut self, node: &NodeRef) {
        self.events.push(Event::StartNode(node.clone()));
    }

    fn end_node(&mut self) {
        self.events.push(Event::EndNode);
    }

    fn subject_identifier(&mut self, iri: &Locator) {
        self.events
            .push(Event::SubjectIdentifier(iri.as_str().to_string()));
    }

    fn subject_locator(&mut self, iri: &Locator) {
        self.events
            .push(Event::SubjectLocator(iri.as_str().to_string()));
    }

    fn item_identifier(&mut self, iri: &Locator) {
        self.events
            .push(Event::ItemIdentifier(iri.as_str().to_string()));
    }

    fn start_isa(&mut self) {
        self.events.push(Event::StartIsa);
    }

    fn end_isa(&mut self) {
        self.events.push(Event::EndIsa);
    }

    fn start_name(&mut self) {
        self.events.push(Event::StartName);
    }

    fn end_name(&mut self) {
        self.events.push(Event::EndName);
    }

    fn start_variant(&mut self) {
        self.events.push(Event::StartVariant);
    }

    fn end_variant(&mut self) {
        self.events.push(Event::EndVariant);
    }

    fn start_occurrence(&mut self) {
        self.events.push(Event::StartOccurrence);
    }

    fn end_occurrence(&mut self) {
        self.events.push(Event::EndOccurrence);
    }

    fn start_association(&mut self) {
        self.events.push(Event::StartAssociation);
    }

    fn end_association(&mut self) {
        self.events.push(Event::EndAssociation);
    }

    fn start_role(&mut self) {
        self.events.push(Event::StartRole);
    }

    fn end_role(&mut self) {
        self.events.push(Event::EndRole);
    }

    fn start_player(&mut self) {
        self.events.push(Event::StartPlayer);
    }

    fn end_player(&mut self) {
        self.events.push(Event::EndPlayer);
    }

    fn start_type(&mut self) {
        self.events.push(Event::StartType);
    }

    fn end_type(&mut self) {
        self.events.push(Event::EndType);
    }

    fn start_scope(&mut self) {
        self.events.push(Event::StartScope);
    }

    fn end_scope(&mut self) {
        self.events.push(Event::EndScope);
    }

    fn start_reifier(&mut self) {
        self.events.push(Event::StartReifier);
    }

    fn end_reifier(&mut self) {
        self.events.push(Event::EndReifier);
    }

    fn node_ref(&mut self, node: &NodeRef) {
        self.events.push(Event::Ref(node.clone()));
    }

    fn value(&mut self, literal: &Literal) {
        self.events.push(Event::Value(
            literal.value().to_string(),
            literal.datatype().as_str().to_string(),
        ));
    }
}

pub fn recorder() -> Rc<RefCell<Recorder>> {
    Rc::new(RefCell::new(Recorder::default()))
}

/// Item identifier under `http://example.org/map.ltm`.
#[allow(dead_code)]
pub fn item(id: &str) -> NodeRef {
    NodeRef::ItemIdentifier(Locator::new(format!("http://example.org/map.ltm#{id}")).unwrap())
}

#[allow(dead_code)]
pub fn subject(iri: &str) -> NodeRef {
    NodeRef::SubjectIdentifier(Locator::new(iri).unwrap())
}
