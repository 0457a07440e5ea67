//! Hand-rolled scanner for the linear topic map notation.
//!
//! The scanner is pull-based: [`LtmLexer::advance`] reports whether another
//! token exists, [`LtmLexer::token`]/[`LtmLexer::value`] expose the token
//! most recently produced. It is not restartable; a new input needs a new
//! lexer.
//!
//! The two lexically hard spots of the notation are handled here so no
//! caller ever sees escape processing:
//! - Quoted strings use quote doubling: `""` inside a string is content,
//!   kept verbatim in the token text, and does not terminate the string.
//! - Data blocks `[[ … ]]` nest on single brackets: a lone `[` opens one
//!   level, a lone `]` closes one, and the block only ends at `]]` seen at
//!   nesting level zero. The token text is the raw span between the
//!   markers.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{Error, Location};

/// Kind of token produced by the scanner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// `#PREFIX`
    DirPrefix,
    /// `#VERSION`
    DirVersion,
    /// `#TOPICMAP`
    DirTopicMap,
    /// `#MERGEMAP`
    DirMergeMap,
    /// `#INCLUDE`
    DirInclude,
    /// `#BASEURI`
    DirBaseUri,
    /// An identifier that is not a directive keyword.
    Ident,
    /// A `prefix:local` run written without whitespace.
    QName,
    /// A quoted string; the token value is the text between the quotes,
    /// doubled quotes kept.
    String,
    /// A `[[ … ]]` block; the token value is the raw content.
    Data,
    LBracket,
    RBracket,
    LCurly,
    RCurly,
    LParen,
    RParen,
    Colon,
    Comma,
    Eq,
    At,
    Tilde,
    Percent,
    Slash,
    Semi,
}

/// The reserved directive names, matched exactly.
fn directive_kind(name: &str) -> Option<TokenKind> {
    match name {
        "PREFIX" => Some(TokenKind::DirPrefix),
        "VERSION" => Some(TokenKind::DirVersion),
        "TOPICMAP" => Some(TokenKind::DirTopicMap),
        "MERGEMAP" => Some(TokenKind::DirMergeMap),
        "INCLUDE" => Some(TokenKind::DirInclude),
        "BASEURI" => Some(TokenKind::DirBaseUri),
        _ => None,
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.')
}

/// Pull-based scanner over one document.
pub struct LtmLexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    /// Byte offset of the next unconsumed character.
    pos: usize,
    /// 1-indexed position of the next unconsumed character.
    line: usize,
    column: usize,
    /// Most recently produced token.
    kind: Option<TokenKind>,
    value: &'a str,
    location: Location,
}

impl<'a> LtmLexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            pos: 0,
            line: 1,
            column: 1,
            kind: None,
            value: "",
            location: Location::UNKNOWN,
        }
    }

    /// The kind of the most recently produced token.
    pub fn token(&self) -> Option<TokenKind> {
        self.kind
    }

    /// The (already-stripped) text of the most recently produced token.
    pub fn value(&self) -> &'a str {
        self.value
    }

    /// Where the most recently produced token started.
    pub fn location(&self) -> Location {
        self.location
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn bump(&mut self) -> Option<char> {
        let (pos, ch) = self.chars.next()?;
        self.pos = pos + ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Position of the next unconsumed character.
    fn here(&self) -> Location {
        Location::new(self.line, self.column)
    }

    /// Produce the next token, if any.
    ///
    /// Returns `Ok(true)` when a token was produced (visible through
    /// [`LtmLexer::token`]/[`LtmLexer::value`]), `Ok(false)` at end of
    /// input, or the lexical failure that stopped the scan.
    pub fn advance(&mut self) -> Result<bool, Error> {
        self.skip_blank()?;
        let start_location = self.here();
        let start = self.pos;
        let Some(ch) = self.bump() else {
            return Ok(false);
        };
        let kind = match ch {
            '#' => self.scan_directive(start, start_location)?,
            '"' => self.scan_string(start_location)?,
            '[' => {
                if self.peek() == Some('[') {
                    self.bump();
                    self.scan_data(start_location)?
                } else {
                    self.punct(TokenKind::LBracket, start)
                }
            }
            ']' => self.punct(TokenKind::RBracket, start),
            '{' => self.punct(TokenKind::LCurly, start),
            '}' => self.punct(TokenKind::RCurly, start),
            '(' => self.punct(TokenKind::LParen, start),
            ')' => self.punct(TokenKind::RParen, start),
            ':' => self.punct(TokenKind::Colon, start),
            ',' => self.punct(TokenKind::Comma, start),
            '=' => self.punct(TokenKind::Eq, start),
            '@' => self.punct(TokenKind::At, start),
            '~' => self.punct(TokenKind::Tilde, start),
            '%' => self.punct(TokenKind::Percent, start),
            ';' => self.punct(TokenKind::Semi, start),
            '/' => self.punct(TokenKind::Slash, start),
            c if is_ident_start(c) => self.scan_name(start),
            c => {
                return Err(Error::UnexpectedCharacter {
                    ch: c,
                    location: start_location,
                });
            }
        };
        self.kind = Some(kind);
        self.location = start_location;
        Ok(true)
    }

    /// Skip whitespace and `/* … */` comments. A `/` not followed by `*`
    /// is left for the token scan (it is scope punctuation).
    fn skip_blank(&mut self) -> Result<(), Error> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    // Only a comment when `/*` — peek past the slash.
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    if ahead.peek().map(|(_, c)| *c) != Some('*') {
                        return Ok(());
                    }
                    let comment_start = self.here();
                    self.bump();
                    self.bump();
                    let mut closed = false;
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek() == Some('/') {
                            self.bump();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        return Err(Error::UnterminatedToken {
                            what: "comment",
                            location: comment_start,
                        });
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn punct(&mut self, kind: TokenKind, start: usize) -> TokenKind {
        self.value = &self.source[start..self.pos];
        kind
    }

    /// After the opening `#`: the directive name must exactly match one of
    /// the reserved keywords.
    fn scan_directive(&mut self, start: usize, location: Location) -> Result<TokenKind, Error> {
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.bump();
        }
        let name = &self.source[start + 1..self.pos];
        match directive_kind(name) {
            Some(kind) => {
                self.value = &self.source[start..self.pos];
                Ok(kind)
            }
            None => Err(Error::UnexpectedCharacter { ch: '#', location }),
        }
    }

    /// An identifier run; `prefix:local` written without whitespace becomes
    /// one QName token for the shared splitting utility to take apart.
    fn scan_name(&mut self, start: usize) -> TokenKind {
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        if self.peek() == Some(':') {
            // Join into a QName only when an identifier follows directly;
            // `topic :` keeps its colon as punctuation.
            let mut ahead = self.chars.clone();
            ahead.next();
            if ahead.peek().is_some_and(|(_, c)| is_ident_start(*c)) {
                self.bump();
                while self.peek().is_some_and(is_ident_char) {
                    self.bump();
                }
                self.value = &self.source[start..self.pos];
                return TokenKind::QName;
            }
        }
        self.value = &self.source[start..self.pos];
        TokenKind::Ident
    }

    /// After the opening quote. A `"` immediately followed by another `"`
    /// is content and stays doubled in the token text.
    fn scan_string(&mut self, start_location: Location) -> Result<TokenKind, Error> {
        let content_start = self.pos;
        loop {
            let quote_pos = self.pos;
            match self.bump() {
                Some('"') => {
                    if self.peek() == Some('"') {
                        self.bump();
                        continue;
                    }
                    self.value = &self.source[content_start..quote_pos];
                    return Ok(TokenKind::String);
                }
                Some(_) => {}
                None => {
                    return Err(Error::UnterminatedToken {
                        what: "string",
                        location: start_location,
                    });
                }
            }
        }
    }

    /// After the opening `[[`. Tracks single-bracket nesting; the block
    /// ends at the first `]]` seen at nesting level zero.
    fn scan_data(&mut self, start_location: Location) -> Result<TokenKind, Error> {
        let content_start = self.pos;
        let mut depth = 0usize;
        loop {
            let ch_pos = self.pos;
            match self.bump() {
                Some('[') => depth += 1,
                Some(']') => {
                    if depth == 0 && self.peek() == Some(']') {
                        self.bump();
                        self.value = &self.source[content_start..ch_pos];
                        return Ok(TokenKind::Data);
                    }
                    depth = depth.saturating_sub(1);
                }
                Some(_) => {}
                None => {
                    return Err(Error::UnterminatedToken {
                        what: "data block",
                        location: start_location,
                    });
                }
            }
        }
    }
}
