//! This lexer tokenizes g1 assembly.
//!
//! At every position the token patterns are tried in a fixed order and the
//! first one that matches wins. Label declarations must be tried before bare
//! names, otherwise `foo:` would lex as the name `foo` followed by a stray colon.
//! Runs of spaces and tabs are skipped. Anything else is a lex error.
//!
//! The lexer works on raw bytes. Every token other than a comment is ASCII,
//! so comments may hold bytes that are not valid UTF-8.
use regex::bytes::Regex;

use super::error::{AsmError, Position};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TokenKind {
    MetaVariable,
    Integer,
    Address,
    LabelDeclaration,
    Name,
    Comment,
    Newline,
}

/// Token patterns in priority order.
const TOKEN_PATTERNS: [(TokenKind, &str); 7] = [
    (TokenKind::MetaVariable,     r"^#[A-Za-z]+"),
    (TokenKind::Integer,          r"^-?[0-9]+"),
    (TokenKind::Address,          r"^\$[0-9]+"),
    (TokenKind::LabelDeclaration, r"^[A-Za-z0-9_]+:"),
    (TokenKind::Name,             r"^[A-Za-z_][A-Za-z0-9_]*"),
    (TokenKind::Comment,          r"^;(?-u:[^\r\n])*"),
    (TokenKind::Newline,          r"^\r?\n"),
];

const SKIP_PATTERN: &str = r"^[ \t]+";

/// A classified slice of the source. Lines and columns are 0-based.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub bytes: &'src [u8],
    pub start: usize,
    pub line: usize,
    pub column: usize,
}

impl<'src> Token<'src> {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The token's source text. Comments that are not valid UTF-8 read as empty.
    pub fn text(&self) -> &'src str {
        std::str::from_utf8(self.bytes).unwrap_or("")
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

/// Lazily walks a source buffer, yielding one token per call to `next`.
///
/// After the end of input or the first error the lexer yields `None` forever.
pub struct Lexer<'src> {
    source: &'src [u8],
    patterns: Vec<(TokenKind, Regex)>,
    skip: Regex,
    offset: usize,
    line: usize,
    column: usize,
    done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new<S: AsRef<[u8]> + ?Sized>(source: &'src S) -> Self {
        let source = source.as_ref();
        let patterns = TOKEN_PATTERNS
            .iter()
            .map(|(kind, pattern)| (*kind, Regex::new(pattern).expect("token patterns are valid regexes")))
            .collect();

        Lexer {
            source,
            patterns,
            skip: Regex::new(SKIP_PATTERN).expect("skip pattern is a valid regex"),
            offset: 0,
            line: 0,
            column: 0,
            done: false,
        }
    }

    /// Current cursor position.
    pub fn cursor(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn match_token(&self, rest: &'src [u8]) -> Option<Token<'src>> {
        for (kind, re) in self.patterns.iter() {
            if let Some(m) = re.find(rest) {
                return Some(Token {
                    kind: *kind,
                    bytes: &rest[..m.end()],
                    start: self.offset,
                    line: self.line,
                    column: self.column,
                });
            }
        }
        None
    }

    fn advance(&mut self, len: usize, newline: bool) {
        self.offset += len;
        if newline {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += len;
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token<'src>, AsmError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done || self.offset >= self.source.len() {
                self.done = true;
                return None;
            }

            let rest = &self.source[self.offset..];
            if let Some(tok) = self.match_token(rest) {
                self.advance(tok.len(), tok.kind == TokenKind::Newline);
                trace!("lexed {:?} {:?} at {}", tok.kind, tok.text(), tok.position());
                return Some(Ok(tok));
            }

            match self.skip.find(rest) {
                Some(m) => self.advance(m.end(), false),
                None => {
                    self.done = true;
                    return Some(Err(AsmError::Lex(self.cursor())));
                }
            }
        }
    }
}
