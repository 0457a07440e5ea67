//! Syntax-independent topic map ingestion.
//!
//! Documents written in any of several concrete notations that describe
//! the same abstract map of typed nodes, names, associations and
//! occurrences are turned into one stream of construction events, emitted
//! to a caller-supplied [`MapHandler`]. The concrete syntax is picked at
//! runtime — by file extension, MIME type or explicitly — through a
//! pluggable [`SyntaxRegistry`].
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use tmio::{Deserializer, Locator, MapHandler, Source, SyntaxRegistry, syntax};
//!
//! #[derive(Default)]
//! struct Counter {
//!     nodes: usize,
//! }
//!
//! impl MapHandler for Counter {
//!     fn start_node(&mut self, _node: &tmio::NodeRef) {
//!         self.nodes += 1;
//!     }
//! }
//!
//! let registry = SyntaxRegistry::with_builtins();
//! let mut reader = registry.create(&syntax::LTM).expect("LTM is builtin");
//!
//! let handler = Rc::new(RefCell::new(Counter::default()));
//! reader.set_handler(handler.clone());
//!
//! let base = Locator::new("http://example.org/opera.ltm").unwrap();
//! let source = Source::from_text("[puccini : composer]", base);
//! reader.parse(source).unwrap();
//!
//! assert_eq!(handler.borrow().nodes, 1);
//! ```

pub mod deserializer;
pub mod error;
pub mod handler;
pub mod literal;
pub mod locator;
pub mod ltm;
pub mod qname;
pub mod registry;
pub mod source;
pub mod syntax;
pub mod vocab;

pub use deserializer::{Deserializer, DeserializerBase, IriContext, PropertyValue, SourceResolver};
pub use error::{Error, Location};
pub use handler::{HandlerRef, MapHandler, NodeRef};
pub use literal::Literal;
pub use locator::Locator;
pub use qname::QName;
pub use registry::{DeserializerFactory, SyntaxRegistry};
pub use source::{BomReader, Source};
pub use syntax::Syntax;
