//! The Parser module drives the two assembler passes over the token stream.
//!
//! The first pass reads the header, records every label and collects the
//! instructions with their arguments still unresolved. The second pass runs
//! only once every label is known, so forward references resolve the same
//! way backward ones do.
use super::ast::*;
use super::error::AsmError;
use super::lexer::{Lexer, Token, TokenKind};
use super::symbols::SymbolTable;

/// Meta variables are only accepted while in the header.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum State {
    Header,
    Body,
}

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    state: State,
    meta: MetaVars,
    instructions: Vec<Instruction<'src>>,
    labels: SymbolTable,
}

impl<'src> Parser<'src> {
    pub fn new<S: AsRef<[u8]> + ?Sized>(source: &'src S) -> Self {
        Parser {
            lexer: Lexer::new(source),
            state: State::Header,
            meta: MetaVars::default(),
            instructions: Vec::with_capacity(32),
            labels: SymbolTable::new(),
        }
    }

    /// Run both passes, consuming the parser and returning the resolved program.
    pub fn run(mut self) -> Result<Program, AsmError> {
        self.index()?;
        debug!("pass 1 done: {} instruction(s), {} label(s)", self.instructions.len(), self.labels.len());

        let start_label = self.labels.get("start").unwrap_or(-1);
        let tick_label = self.labels.get("tick").unwrap_or(-1);
        if start_label == -1 {
            info!("no `start` label declared");
        }
        if tick_label == -1 {
            info!("no `tick` label declared");
        }

        let instructions = self.resolve()?;
        debug!("pass 2 done");

        Ok(Program {
            meta: self.meta,
            start_label,
            tick_label,
            instructions,
        })
    }

    /// First pass: read the header, declare labels and collect instructions.
    fn index(&mut self) -> Result<(), AsmError> {
        while let Some(tok) = self.consume()? {
            match tok.kind {
                TokenKind::MetaVariable => self.meta_variable(tok)?,
                TokenKind::LabelDeclaration => self.label(tok)?,
                TokenKind::Name => {
                    let ins = self.instruction(tok)?;
                    self.instructions.push(ins);
                },
                TokenKind::Integer | TokenKind::Address => {
                    return Err(AsmError::syntax(tok.position(), "value outside instruction"));
                },
                TokenKind::Comment | TokenKind::Newline => {},
            }
        }
        Ok(())
    }

    fn meta_variable(&mut self, tok: Token<'src>) -> Result<(), AsmError> {
        if self.state != State::Header {
            return Err(AsmError::syntax(tok.position(), "meta variable outside header"));
        }

        let name = &tok.text()[1..];
        let var = match MetaVar::from_name(name) {
            Some(var) => var,
            None => return Err(AsmError::semantic(tok.position(), format!("unrecognized meta variable `{}`", name))),
        };

        let value_tok = match self.consume()? {
            Some(v) if v.kind == TokenKind::Integer => v,
            Some(v) => {
                return Err(AsmError::syntax(v.position(), format!("expected an integer value for `#{}`", var)));
            },
            None => {
                return Err(AsmError::syntax(tok.position(), format!("expected an integer value for `#{}`, got EOF", var)));
            },
        };

        let value = parse_integer(&value_tok, value_tok.text())?;
        debug!("meta variable {} = {}", var, value);
        self.meta.set(var, value);
        Ok(())
    }

    fn label(&mut self, tok: Token<'src>) -> Result<(), AsmError> {
        self.state = State::Body;

        let name = &tok.text()[..tok.len() - 1];
        if self.labels.contains(name) {
            return Err(AsmError::semantic(tok.position(), format!("label `{}` declared more than once", name)));
        }

        let index = self.instructions.len() as i32;
        debug!("label `{}` -> instruction {}", name, index);
        self.labels.insert(name, index);
        Ok(())
    }

    /// Reads a mnemonic and exactly as many arguments as its opcode takes.
    fn instruction(&mut self, tok: Token<'src>) -> Result<Instruction<'src>, AsmError> {
        self.state = State::Body;

        let opcode = match Opcode::from_mnemonic(tok.text()) {
            Some(op) => op,
            None => return Err(AsmError::semantic(tok.position(), format!("unrecognized instruction `{}`", tok.text()))),
        };

        let mut ins = Instruction::new(opcode);
        for slot in ins.args.iter_mut().take(opcode.arity()) {
            let arg = match self.consume()? {
                Some(arg) => arg,
                None => {
                    return Err(AsmError::syntax(
                        tok.position(),
                        format!("`{}` takes {} argument(s), got EOF", opcode, opcode.arity()),
                    ));
                },
            };

            match arg.kind {
                TokenKind::Integer | TokenKind::Address | TokenKind::Name => *slot = Some(arg),
                _ => {
                    return Err(AsmError::syntax(
                        arg.position(),
                        "expected integer, address, or name for instruction argument",
                    ));
                },
            }
        }
        Ok(ins)
    }

    /// Second pass: resolve every argument of every instruction, in order.
    fn resolve(&self) -> Result<Vec<ResolvedInstruction>, AsmError> {
        let mut out = Vec::with_capacity(self.instructions.len());
        for ins in self.instructions.iter() {
            let args = ins
                .arguments()
                .map(|tok| self.argument(tok))
                .collect::<Result<Vec<Argument>, AsmError>>()?;
            out.push(ResolvedInstruction { opcode: ins.opcode, args });
        }
        Ok(out)
    }

    fn argument(&self, tok: &Token<'src>) -> Result<Argument, AsmError> {
        match tok.kind {
            TokenKind::Integer => Ok(Argument::Literal(parse_integer(tok, tok.text())?)),
            TokenKind::Address => Ok(Argument::Address(parse_integer(tok, &tok.text()[1..])?)),
            TokenKind::Name => match self.labels.get(tok.text()) {
                Some(index) => Ok(Argument::Literal(index)),
                None => Err(AsmError::semantic(tok.position(), format!("undefined label reference `{}`", tok.text()))),
            },
            _ => Err(AsmError::semantic(tok.position(), "invalid argument type")),
        }
    }

    /// Pulls the next token off the lexer.
    /// Returns None if no tokens are left.
    #[inline]
    fn consume(&mut self) -> Result<Option<Token<'src>>, AsmError> {
        self.lexer.next().transpose()
    }
}

/// Parses the digits of `tok` as an i32.
fn parse_integer(tok: &Token, digits: &str) -> Result<i32, AsmError> {
    digits
        .parse::<i32>()
        .map_err(|_| AsmError::semantic(tok.position(), format!("`{}` does not fit in a 32-bit integer", tok.text())))
}
