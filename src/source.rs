//! Parse input: one stream plus the base locator it resolves against.
//!
//! A [`Source`] bundles exactly one input — decoded text or raw bytes —
//! with a mandatory base [`Locator`] and an optional encoding override.
//! Byte inputs pass through [`BomReader`], which sniffs the Unicode
//! signature (UTF-8, UTF-16BE/LE, UTF-32BE/LE), reports what it found and
//! strips the signature bytes; everything after the signature reaches the
//! parser byte-for-byte. Decoding to UTF-8 is done by `encoding_rs` for
//! everything the Encoding Standard covers, with a small in-crate routine
//! for UTF-32.

use std::io::Read;

use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::error::Error;
use crate::locator::Locator;

/// A byte reader that detects and strips a leading Unicode signature.
///
/// Up to four bytes are peeked at construction time. Peeked bytes that turn
/// out not to be part of a signature are served back before the underlying
/// reader, so streams shorter than four bytes come through untouched.
pub struct BomReader<R: Read> {
    inner: R,
    /// Bytes peeked past the signature, not yet served.
    pending: [u8; 4],
    pending_len: usize,
    pending_pos: usize,
    encoding: Option<&'static str>,
}

impl<R: Read> BomReader<R> {
    /// Wrap `inner`, consuming its signature if one is present.
    pub fn new(mut inner: R) -> std::io::Result<Self> {
        let mut head = [0u8; 4];
        let mut len = 0;
        // A single read may legally return fewer bytes than asked for.
        while len < 4 {
            let n = inner.read(&mut head[len..])?;
            if n == 0 {
                break;
            }
            len += n;
        }
        let (encoding, sig_len) = detect_signature(&head[..len]);
        let mut pending = [0u8; 4];
        let pending_len = len - sig_len;
        pending[..pending_len].copy_from_slice(&head[sig_len..len]);
        Ok(Self {
            inner,
            pending,
            pending_len,
            pending_pos: 0,
            encoding,
        })
    }

    /// The encoding named by the detected signature, if any.
    pub fn encoding(&self) -> Option<&'static str> {
        self.encoding
    }
}

impl<R: Read> Read for BomReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.pending_pos < self.pending_len {
            let available = &self.pending[self.pending_pos..self.pending_len];
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            self.pending_pos += n;
            return Ok(n);
        }
        self.inner.read(buf)
    }
}

/// Match `head` against the known Unicode signatures.
///
/// Returns the encoding name and the signature length in bytes. UTF-32LE
/// must be checked before UTF-16LE: `FF FE 00 00` starts with `FF FE`.
fn detect_signature(head: &[u8]) -> (Option<&'static str>, usize) {
    if head.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        (Some("UTF-32BE"), 4)
    } else if head.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        (Some("UTF-32LE"), 4)
    } else if head.starts_with(&[0xEF, 0xBB, 0xBF]) {
        (Some("UTF-8"), 3)
    } else if head.starts_with(&[0xFE, 0xFF]) {
        (Some("UTF-16BE"), 2)
    } else if head.starts_with(&[0xFF, 0xFE]) {
        (Some("UTF-16LE"), 2)
    } else {
        (None, 0)
    }
}

/// The stream kinds a source can hold. Exactly one is active.
enum Input {
    /// Already-decoded text.
    Text(String),
    /// Raw bytes of unknown or caller-hinted encoding.
    Bytes(Box<dyn Read>),
}

/// Parse input: one stream, a mandatory base locator, an optional encoding
/// override consulted when a byte stream carries no signature.
pub struct Source {
    input: Input,
    base: Locator,
    encoding: Option<String>,
}

impl Source {
    /// A source over already-decoded text.
    pub fn from_text<S: Into<String>>(text: S, base: Locator) -> Self {
        Self {
            input: Input::Text(text.into()),
            base,
            encoding: None,
        }
    }

    /// A source over a raw byte stream.
    pub fn from_reader<R: Read + 'static>(reader: R, base: Locator) -> Self {
        Self {
            input: Input::Bytes(Box::new(reader)),
            base,
            encoding: None,
        }
    }

    /// Set the encoding to assume when the stream carries no signature.
    pub fn with_encoding<S: Into<String>>(mut self, encoding: S) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// The base locator references in this source resolve against.
    #[inline]
    pub fn base(&self) -> &Locator {
        &self.base
    }

    /// The caller-supplied encoding override, if any.
    #[inline]
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// Consume the source, decoding the stream to text.
    ///
    /// Precedence for byte streams: detected signature, then the caller
    /// override, then UTF-8. Returns the text together with the base
    /// locator. Dropping the reader on every path is what closes the
    /// underlying stream.
    pub(crate) fn into_text(self) -> Result<(String, Locator), Error> {
        match self.input {
            Input::Text(text) => {
                // A decoded stream may still start with a signature
                // character; it is not document content.
                let text = match text.strip_prefix('\u{FEFF}') {
                    Some(stripped) => stripped.to_string(),
                    None => text,
                };
                Ok((text, self.base))
            }
            Input::Bytes(reader) => {
                let bom = BomReader::new(reader)?;
                let label = bom
                    .encoding()
                    .map(str::to_string)
                    .or(self.encoding)
                    .unwrap_or_else(|| "UTF-8".to_string());
                let text = decode(bom, &label)?;
                Ok((text, self.base))
            }
        }
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field(
                "input",
                &match &self.input {
                    Input::Text(_) => "text",
                    Input::Bytes(_) => "bytes",
                },
            )
            .field("base", &self.base)
            .field("encoding", &self.encoding)
            .finish()
    }
}

/// Decode `reader` (already past any signature) from `label` to a string.
fn decode<R: Read>(mut reader: R, label: &str) -> Result<String, Error> {
    if label.eq_ignore_ascii_case("UTF-32BE") || label.eq_ignore_ascii_case("UTF-32LE") {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        return decode_utf32(&bytes, label.eq_ignore_ascii_case("UTF-32BE"));
    }
    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| Error::argument(format!("unknown encoding {label:?}")))?;
    let mut decoder = DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding))
        // The signature was already consumed by BomReader.
        .bom_sniffing(false)
        .build(reader);
    let mut text = String::new();
    decoder.read_to_string(&mut text)?;
    Ok(text)
}

/// UTF-32 is not part of the Encoding Standard, so `encoding_rs` cannot
/// decode it; the four-byte units are simple enough to handle here.
fn decode_utf32(bytes: &[u8], big_endian: bool) -> Result<String, Error> {
    if bytes.len() % 4 != 0 {
        return Err(Error::Io {
            cause: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "UTF-32 stream length is not a multiple of four",
            ),
        });
    }
    let mut text = String::with_capacity(bytes.len() / 4);
    for unit in bytes.chunks_exact(4) {
        let code = if big_endian {
            u32::from_be_bytes([unit[0], unit[1], unit[2], unit[3]])
        } else {
            u32::from_le_bytes([unit[0], unit[1], unit[2], unit[3]])
        };
        let ch = char::from_u32(code).ok_or_else(|| Error::Io {
            cause: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid UTF-32 code unit {code:#x}"),
            ),
        })?;
        text.push(ch);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all<R: Read>(mut reader: R) -> Vec<u8> {
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        out
    }

    fn base() -> Locator {
        Locator::new("http://example.org/map.ltm").unwrap()
    }

    #[test]
    fn detects_and_strips_each_signature() {
        let cases: [(&[u8], &str, &[u8]); 5] = [
            (&[0xEF, 0xBB, 0xBF, b'x'], "UTF-8", b"x"),
            (&[0xFE, 0xFF, 0x00, 0x78], "UTF-16BE", &[0x00, 0x78]),
            (&[0xFF, 0xFE, 0x78, 0x00], "UTF-16LE", &[0x78, 0x00]),
            (
                &[0x00, 0x00, 0xFE, 0xFF, 0x00, 0x00, 0x00, 0x78],
                "UTF-32BE",
                &[0x00, 0x00, 0x00, 0x78],
            ),
            (
                &[0xFF, 0xFE, 0x00, 0x00, 0x78, 0x00, 0x00, 0x00],
                "UTF-32LE",
                &[0x78, 0x00, 0x00, 0x00],
            ),
        ];
        for (input, expected_encoding, expected_rest) in cases {
            let bom = BomReader::new(Cursor::new(input.to_vec())).unwrap();
            assert_eq!(bom.encoding(), Some(expected_encoding));
            assert_eq!(read_all(bom), expected_rest);
        }
    }

    #[test]
    fn unsigned_stream_passes_through_byte_for_byte() {
        let bom = BomReader::new(Cursor::new(b"[topic]".to_vec())).unwrap();
        assert_eq!(bom.encoding(), None);
        assert_eq!(read_all(bom), b"[topic]");
    }

    #[test]
    fn short_streams_survive_peeking() {
        for input in [&b""[..], &b"a"[..], &b"ab"[..], &b"abc"[..]] {
            let bom = BomReader::new(Cursor::new(input.to_vec())).unwrap();
            assert_eq!(bom.encoding(), None);
            assert_eq!(read_all(bom), input);
        }
        // A lone FF FE is a complete UTF-16LE signature and nothing else.
        let bom = BomReader::new(Cursor::new(vec![0xFF, 0xFE])).unwrap();
        assert_eq!(bom.encoding(), Some("UTF-16LE"));
        assert_eq!(read_all(bom), b"");
    }

    #[test]
    fn utf16le_stream_decodes() {
        let mut bytes = vec![0xFF, 0xFE];
        for ch in "[x]".encode_utf16() {
            bytes.extend_from_slice(&ch.to_le_bytes());
        }
        let source = Source::from_reader(Cursor::new(bytes), base());
        let (text, _) = source.into_text().unwrap();
        assert_eq!(text, "[x]");
    }

    #[test]
    fn utf32be_stream_decodes() {
        let mut bytes = vec![0x00, 0x00, 0xFE, 0xFF];
        for ch in "[x]".chars() {
            bytes.extend_from_slice(&(ch as u32).to_be_bytes());
        }
        let source = Source::from_reader(Cursor::new(bytes), base());
        let (text, _) = source.into_text().unwrap();
        assert_eq!(text, "[x]");
    }

    #[test]
    fn encoding_override_applies_without_signature() {
        let mut bytes = Vec::new();
        for ch in "[ä]".encode_utf16() {
            bytes.extend_from_slice(&ch.to_be_bytes());
        }
        let source = Source::from_reader(Cursor::new(bytes), base()).with_encoding("UTF-16BE");
        let (text, _) = source.into_text().unwrap();
        assert_eq!(text, "[ä]");
    }

    #[test]
    fn signature_wins_over_override() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("[x]".as_bytes());
        let source = Source::from_reader(Cursor::new(bytes), base()).with_encoding("UTF-16LE");
        let (text, _) = source.into_text().unwrap();
        assert_eq!(text, "[x]");
    }

    #[test]
    fn text_source_drops_leading_signature_char() {
        let source = Source::from_text("\u{FEFF}[x]", base());
        let (text, _) = source.into_text().unwrap();
        assert_eq!(text, "[x]");
    }

    #[test]
    fn unknown_override_is_an_argument_error() {
        let source = Source::from_reader(Cursor::new(b"x".to_vec()), base())
            .with_encoding("EBCDIC-FANTASY");
        assert!(matches!(source.into_text(), Err(Error::Argument { .. })));
    }
}
