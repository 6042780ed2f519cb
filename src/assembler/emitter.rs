//! Serializes a resolved program to the g1 bytecode format.
//!
//! All integers are big-endian.
//!
//! | Offset | Field             | Type |
//! |--------|-------------------|------|
//! | 0      | magic `g1`        | 2 bytes |
//! | 2      | memory            | i32 |
//! | 6      | width             | u16 |
//! | 8      | height            | u16 |
//! | 10     | tickrate          | u16 |
//! | 12     | tick label        | i32 |
//! | 16     | start label       | i32 |
//! | 20     | instruction count | u32 |
//! | 24     | instructions      | opcode u8, then (kind u8, value i32) per argument |
//! | end    | data length       | u32, always 0 |
use std::io::Write;

use super::ast::Program;
use super::error::AsmError;

pub const MAGIC: &[u8; 2] = b"g1";

/// Byte length of everything before the first instruction.
pub const HEADER_LEN: usize = 24;

/// Writes `program` to `out`, returning the number of bytes written.
///
/// `encode` hands this an in-memory buffer; the output file is only
/// created from that buffer once encoding has succeeded.
pub fn emit<W: Write>(program: &Program, out: &mut W) -> Result<usize, AsmError> {
    let meta = &program.meta;
    let mut written = 0;

    written += put(out, MAGIC)?;
    written += put(out, &meta.memory.to_be_bytes())?;
    // Viewport and tick rate are truncated to 16 bits.
    written += put(out, &(meta.width as u16).to_be_bytes())?;
    written += put(out, &(meta.height as u16).to_be_bytes())?;
    written += put(out, &(meta.tickrate as u16).to_be_bytes())?;
    written += put(out, &program.tick_label.to_be_bytes())?;
    written += put(out, &program.start_label.to_be_bytes())?;
    written += put(out, &(program.instructions.len() as u32).to_be_bytes())?;

    for ins in program.instructions.iter() {
        written += put(out, &ins.assemble())?;
    }

    // Data segments are not supported yet; always zero length.
    written += put(out, &0u32.to_be_bytes())?;

    trace!("emitted {} byte(s)", written);
    Ok(written)
}

fn put<W: Write>(out: &mut W, bytes: &[u8]) -> Result<usize, AsmError> {
    out.write_all(bytes)?;
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::ast::*;
    use std::io;

    fn empty_program() -> Program {
        Program {
            meta: MetaVars::default(),
            start_label: -1,
            tick_label: -1,
            instructions: Vec::new(),
        }
    }

    #[test]
    fn test_empty_program() {
        let mut out = Vec::new();
        let len = emit(&empty_program(), &mut out).unwrap();

        assert_eq!(len, HEADER_LEN + 4);
        assert_eq!(out, vec![
            b'g', b'1',
            0, 0, 0, 128,
            0, 100,
            0, 100,
            0, 60,
            0xFF, 0xFF, 0xFF, 0xFF,
            0xFF, 0xFF, 0xFF, 0xFF,
            0, 0, 0, 0,
            0, 0, 0, 0,
        ]);
    }

    #[test]
    fn test_header_fields() {
        let mut program = empty_program();
        program.meta = MetaVars { memory: 0x01020304, width: 640, height: 480, tickrate: 0x1_0005 };
        program.tick_label = 7;
        program.start_label = 2;

        let mut out = Vec::new();
        emit(&program, &mut out).unwrap();

        assert_eq!(&out[0..2], b"g1");
        assert_eq!(&out[2..6], &[1, 2, 3, 4]);
        assert_eq!(&out[6..8], &[0x02, 0x80]);
        assert_eq!(&out[8..10], &[0x01, 0xE0]);
        assert_eq!(&out[10..12], &[0x00, 0x05]);
        assert_eq!(&out[12..16], &[0, 0, 0, 7]);
        assert_eq!(&out[16..20], &[0, 0, 0, 2]);
    }

    #[test]
    fn test_instructions() {
        let mut program = empty_program();
        program.instructions = vec![
            ResolvedInstruction { opcode: Opcode::Log, args: vec![Argument::Address(3)] },
            ResolvedInstruction { opcode: Opcode::Not, args: vec![Argument::Literal(1), Argument::Address(2)] },
        ];

        let mut out = Vec::new();
        let len = emit(&program, &mut out).unwrap();

        assert_eq!(len, HEADER_LEN + 6 + 11 + 4);
        assert_eq!(&out[20..24], &[0, 0, 0, 2]);
        assert_eq!(&out[24..], &[
            15, 1, 0, 0, 0, 3,
            9, 0, 0, 0, 0, 1, 1, 0, 0, 0, 2,
            0, 0, 0, 0,
        ]);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure() {
        match emit(&empty_program(), &mut FailingWriter) {
            Err(AsmError::Io(err)) => assert_eq!(err.to_string(), "no space left"),
            other => panic!("expected an io error, got {:?}", other),
        }
    }
}
