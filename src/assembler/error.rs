//! Errors produced while assembling a g1 source file.
//!
//! Every error is fatal: the assembler stops at the first one and
//! reports it with a 1-based line and column.
use std::fmt;
use std::io;

/// A 0-based location in the source buffer.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

#[derive(Debug)]
pub enum AsmError {
    /// No token pattern matches the source at this position.
    Lex(Position),
    /// A token appeared somewhere it is not allowed.
    Syntax(Position, String),
    /// Unknown names, duplicate or undefined labels, bad values.
    Semantic(Position, String),
    Io(io::Error),
}

impl AsmError {
    pub fn syntax<S: Into<String>>(pos: Position, msg: S) -> Self {
        AsmError::Syntax(pos, msg.into())
    }

    pub fn semantic<S: Into<String>>(pos: Position, msg: S) -> Self {
        AsmError::Semantic(pos, msg.into())
    }

    /// Source position of the error, if it has one.
    pub fn position(&self) -> Option<Position> {
        use AsmError::*;
        match self {
            Lex(pos) | Syntax(pos, _) | Semantic(pos, _) => Some(*pos),
            Io(_) => None,
        }
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use AsmError::*;
        match self {
            Lex(pos) => write!(f, "{}: lex error: unrecognized token", pos),
            Syntax(pos, msg) => write!(f, "{}: syntax error: {}", pos, msg),
            Semantic(pos, msg) => write!(f, "{}: semantic error: {}", pos, msg),
            Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for AsmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AsmError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AsmError {
    fn from(err: io::Error) -> Self {
        AsmError::Io(err)
    }
}
