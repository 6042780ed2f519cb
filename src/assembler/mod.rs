//! The Assembler module is in charge of taking a
//! g1 source file and producing a bytecode image.
//!
//! It does this with a regex tokenizer over the raw
//! source bytes, a two-pass parser that indexes every
//! label before resolving any reference, and a binary
//! emitter that encodes the whole image in memory. The
//! image only exists once every pass has succeeded.

pub mod ast;
pub mod emitter;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod symbols;

use self::ast::Program;
use self::error::AsmError;

/// Parses and resolves `source` without encoding it.
pub fn parse<S: AsRef<[u8]> + ?Sized>(source: &S) -> Result<Program, AsmError> {
    parser::Parser::new(source).run()
}

/// Encodes a resolved program into a complete bytecode image.
pub fn encode(program: &Program) -> Result<Vec<u8>, AsmError> {
    let mut image = Vec::with_capacity(emitter::HEADER_LEN + program.instructions.len() * 21 + 4);
    emitter::emit(program, &mut image)?;
    Ok(image)
}

/// Assembles `source` into a complete bytecode image.
///
/// Nothing is returned unless every pass succeeds, so callers never
/// see a partially encoded program.
pub fn assemble<S: AsRef<[u8]> + ?Sized>(source: &S) -> Result<Vec<u8>, AsmError> {
    encode(&parse(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::error::Position;

    const EXAMPLE: &str = "#tickrate 30
start:
mov 1 2
tick:
add 1 2 3
jmp start 0
";

    #[test]
    fn test_example_image() {
        let image = assemble(EXAMPLE).unwrap();

        let mut expect: Vec<u8> = vec![
            b'g', b'1',
            0, 0, 0, 128,     // memory
            0, 100,           // width
            0, 100,           // height
            0, 30,            // tickrate
            0, 0, 0, 1,       // tick
            0, 0, 0, 0,       // start
            0, 0, 0, 3,       // instruction count
        ];
        expect.extend_from_slice(&[0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 2]);
        expect.extend_from_slice(&[2, 0, 0, 0, 0, 1, 0, 0, 0, 0, 2, 0, 0, 0, 0, 3]);
        expect.extend_from_slice(&[10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        expect.extend_from_slice(&[0, 0, 0, 0]);

        assert_eq!(image, expect);
    }

    #[test]
    fn test_idempotent() {
        assert_eq!(assemble(EXAMPLE).unwrap(), assemble(EXAMPLE).unwrap());
    }

    #[test]
    fn test_instruction_count() {
        let source = "#width 320\n#height 240\ncolor 255 0\npoint 1 2 3\nrect 0 0 10 10\ngetp $0 1 2\n";
        let image = assemble(source).unwrap();

        assert_eq!(&image[6..8], &320u16.to_be_bytes());
        assert_eq!(&image[8..10], &240u16.to_be_bytes());
        assert_eq!(&image[12..16], &(-1i32).to_be_bytes());
        assert_eq!(&image[16..20], &(-1i32).to_be_bytes());
        assert_eq!(&image[20..24], &4u32.to_be_bytes());
        assert_eq!(image.len(), emitter::HEADER_LEN + 11 + 16 + 21 + 16 + 4);
    }

    #[test]
    fn test_non_utf8_comment() {
        let source: &[u8] = b"start:\nmov 1 2 ; caf\xe9\n";
        let image = assemble(source).unwrap();
        assert_eq!(&image[16..20], &0i32.to_be_bytes());
        assert_eq!(&image[20..24], &1u32.to_be_bytes());
        assert_eq!(&image[24..35], &[0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 2]);
    }

    #[test]
    fn test_no_image_on_error() {
        // The undefined label comes after a valid instruction; nothing is produced.
        match assemble("mov 1 2\njmp missing 0\n") {
            Err(err) => assert_eq!(err.position(), Some(Position::new(1, 4))),
            Ok(image) => panic!("expected an error, got {} bytes", image.len()),
        }
    }
}
