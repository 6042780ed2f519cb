//! Instructions and header configuration for g1 bytecode.
//!
//! A source file is a header of meta variable directives followed by
//! labels and instructions. Comments start with a semicolon and run to
//! the end of the line.
//!
//! ```nasm
//! #width 64          ; header: memory, width, height, tickrate
//! #height 32
//!
//! start:
//!     mov $0 10      ; $N is a memory address, bare integers are literals
//! tick:
//!     add $0 $0 1
//!     jmp tick 0     ; label names resolve to instruction indices
//! ```
use std::fmt;

use super::lexer::Token;

/// Every mnemonic in opcode order.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Opcode {
    Mov,
    Movp,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Less,
    Equal,
    Not,
    Jmp,
    Color,
    Point,
    Line,
    Rect,
    Log,
    Getp,
}

/// The most arguments any opcode takes.
pub const MAX_ARGS: usize = 4;

const OPCODES: [Opcode; 17] = {
    use Opcode::*;
    [Mov, Movp, Add, Sub, Mul, Div, Mod, Less, Equal, Not, Jmp, Color, Point, Line, Rect, Log, Getp]
};

impl Opcode {
    /// Looks up a mnemonic. Mnemonics are case-sensitive.
    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        OPCODES.iter().copied().find(|op| op.mnemonic() == name)
    }

    pub fn mnemonic(&self) -> &'static str {
        use Opcode::*;
        match self {
            Mov   => "mov",
            Movp  => "movp",
            Add   => "add",
            Sub   => "sub",
            Mul   => "mul",
            Div   => "div",
            Mod   => "mod",
            Less  => "less",
            Equal => "equal",
            Not   => "not",
            Jmp   => "jmp",
            Color => "color",
            Point => "point",
            Line  => "line",
            Rect  => "rect",
            Log   => "log",
            Getp  => "getp",
        }
    }

    /// Number of arguments the opcode takes.
    pub fn arity(&self) -> usize {
        use Opcode::*;
        match self {
            Log => 1,
            Mov | Movp | Not | Jmp | Color => 2,
            Add | Sub | Mul | Div | Mod | Less | Equal | Point | Getp => 3,
            Line | Rect => 4,
        }
    }

    /// The opcode byte written to the output.
    pub fn to_u8(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Header directives, in header order.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum MetaVar {
    Memory,
    Width,
    Height,
    Tickrate,
}

impl MetaVar {
    /// Looks up a directive name without its leading `#`.
    pub fn from_name(name: &str) -> Option<MetaVar> {
        use MetaVar::*;
        match name {
            "memory"   => Some(Memory),
            "width"    => Some(Width),
            "height"   => Some(Height),
            "tickrate" => Some(Tickrate),
            _ => None,
        }
    }
}

impl fmt::Display for MetaVar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use MetaVar::*;
        let name = match self {
            Memory   => "memory",
            Width    => "width",
            Height   => "height",
            Tickrate => "tickrate",
        };
        write!(f, "{}", name)
    }
}

pub const DEFAULT_MEMORY: i32 = 128;
pub const DEFAULT_WIDTH: i32 = 100;
pub const DEFAULT_HEIGHT: i32 = 100;
pub const DEFAULT_TICKRATE: i32 = 60;

/// Global VM configuration set by the header.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct MetaVars {
    pub memory: i32,
    pub width: i32,
    pub height: i32,
    pub tickrate: i32,
}

impl Default for MetaVars {
    fn default() -> Self {
        MetaVars {
            memory: DEFAULT_MEMORY,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tickrate: DEFAULT_TICKRATE,
        }
    }
}

impl MetaVars {
    pub fn set(&mut self, var: MetaVar, value: i32) {
        use MetaVar::*;
        match var {
            Memory   => self.memory = value,
            Width    => self.width = value,
            Height   => self.height = value,
            Tickrate => self.tickrate = value,
        }
    }
}

/// An instruction as read in the first pass, arguments still unresolved.
///
/// Only the first `opcode.arity()` slots of `args` are filled.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Instruction<'src> {
    pub opcode: Opcode,
    pub args: [Option<Token<'src>>; MAX_ARGS],
}

impl<'src> Instruction<'src> {
    pub fn new(opcode: Opcode) -> Self {
        Instruction { opcode, args: [None; MAX_ARGS] }
    }

    /// The raw argument tokens, in order.
    pub fn arguments(&self) -> impl Iterator<Item = &Token<'src>> + '_ {
        self.args.iter().take(self.opcode.arity()).flatten()
    }
}

/// A resolved instruction argument.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Argument {
    /// An immediate value. Label references resolve to literals.
    Literal(i32),
    /// A `$N` memory reference.
    Address(i32),
}

impl Argument {
    /// The argument kind byte written to the output.
    pub fn kind(&self) -> u8 {
        match self {
            Argument::Literal(_) => 0,
            Argument::Address(_) => 1,
        }
    }

    pub fn value(&self) -> i32 {
        match self {
            Argument::Literal(v) | Argument::Address(v) => *v,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Argument::Literal(v) => write!(f, "{}", v),
            Argument::Address(v) => write!(f, "${}", v),
        }
    }
}

/// An instruction with every argument resolved, ready to be encoded.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ResolvedInstruction {
    pub opcode: Opcode,
    pub args: Vec<Argument>,
}

impl fmt::Display for ResolvedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for arg in self.args.iter() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl ResolvedInstruction {
    /// Encodes the instruction: the opcode byte, then a kind byte and a
    /// big-endian i32 for each argument.
    pub fn assemble(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.args.len() * 5);
        out.push(self.opcode.to_u8());
        for arg in self.args.iter() {
            out.push(arg.kind());
            out.extend_from_slice(&arg.value().to_be_bytes());
        }
        out
    }
}

/// A fully resolved program.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Program {
    pub meta: MetaVars,
    /// Instruction index of the `start` label, or -1.
    pub start_label: i32,
    /// Instruction index of the `tick` label, or -1.
    pub tick_label: i32,
    pub instructions: Vec<ResolvedInstruction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_table() {
        let expect: [(&str, u8, usize); 17] = [
            ("mov", 0, 2), ("movp", 1, 2),
            ("add", 2, 3), ("sub", 3, 3), ("mul", 4, 3), ("div", 5, 3), ("mod", 6, 3),
            ("less", 7, 3), ("equal", 8, 3), ("not", 9, 2),
            ("jmp", 10, 2),
            ("color", 11, 2), ("point", 12, 3), ("line", 13, 4), ("rect", 14, 4),
            ("log", 15, 1), ("getp", 16, 3),
        ];
        for (name, code, arity) in expect.iter() {
            let op = Opcode::from_mnemonic(name).unwrap();
            assert_eq!(op.to_u8(), *code);
            assert_eq!(op.arity(), *arity);
            assert_eq!(op.mnemonic(), *name);
            assert!(op.arity() <= MAX_ARGS);
        }

        assert_eq!(Opcode::from_mnemonic("MOV"), None);
        assert_eq!(Opcode::from_mnemonic("nop"), None);
        assert_eq!(Opcode::from_mnemonic(""), None);
    }

    #[test]
    fn test_meta_vars() {
        let mut meta = MetaVars::default();
        assert_eq!(meta, MetaVars { memory: 128, width: 100, height: 100, tickrate: 60 });

        meta.set(MetaVar::from_name("tickrate").unwrap(), 30);
        meta.set(MetaVar::from_name("memory").unwrap(), 4096);
        assert_eq!(meta, MetaVars { memory: 4096, width: 100, height: 100, tickrate: 30 });

        assert_eq!(MetaVar::from_name("Width"), None);
        assert_eq!(MetaVar::from_name("depth"), None);
    }

    #[test]
    fn test_assemble() {
        let ins = ResolvedInstruction {
            opcode: Opcode::Add,
            args: vec![Argument::Address(1), Argument::Literal(-2), Argument::Literal(0x01020304)],
        };
        assert_eq!(ins.assemble(), vec![
            2,
            1, 0, 0, 0, 1,
            0, 0xFF, 0xFF, 0xFF, 0xFE,
            0, 1, 2, 3, 4,
        ]);
        assert_eq!(ins.to_string(), "add $1 -2 16909060");
    }
}
