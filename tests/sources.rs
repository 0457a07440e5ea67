//! Byte sources end to end: signature detection feeding a real parse.

mod common;

use std::io::Cursor;

use tmio::ltm::LtmDeserializer;
use tmio::{Deserializer, Locator, Source};

use common::{Event, item, recorder};

const BASE: &str = "http://example.org/map.ltm";

fn parse_bytes(bytes: Vec<u8>, encoding: Option<&str>) -> Vec<Event> {
    let handler = recorder();
    let mut reader = LtmDeserializer::new();
    reader.set_handler(handler.clone());
    let mut source = Source::from_reader(Cursor::new(bytes), Locator::new(BASE).unwrap());
    if let Some(encoding) = encoding {
        source = source.with_encoding(encoding);
    }
    reader.parse(source).unwrap();
    let events = handler.borrow().events.clone();
    events
}

#[test]
fn utf8_signature_is_invisible_to_the_parser() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(b"[puccini]");
    let events = parse_bytes(bytes, None);
    assert!(events.contains(&Event::StartNode(item("puccini"))));
}

#[test]
fn utf16le_signature_selects_the_decoder() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "[puccini]".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let events = parse_bytes(bytes, None);
    assert!(events.contains(&Event::StartNode(item("puccini"))));
}

#[test]
fn caller_hint_applies_to_unsigned_streams() {
    let mut bytes = Vec::new();
    for unit in "[puccini]".encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    let events = parse_bytes(bytes, Some("UTF-16BE"));
    assert!(events.contains(&Event::StartNode(item("puccini"))));
}

#[test]
fn plain_bytes_default_to_utf8() {
    let events = parse_bytes(b"[verdi]".to_vec(), None);
    assert!(events.contains(&Event::StartNode(item("verdi"))));
}
