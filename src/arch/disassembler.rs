//! Lazy instruction streams

use crate::arch::Architecture;
use crate::memory::ByteReader;
use std::iter::FusedIterator;

/// A forward-only stream of instructions decoded from a reader.
///
/// The stream ends at the first position where no complete instruction can
/// be decoded, and stays ended. To look at earlier instructions again, decode
/// a fresh stream from a saved address.
pub struct Disassembler<'a, AR>
where
    AR: Architecture,
{
    arch: AR,
    rdr: ByteReader<'a>,
    exhausted: bool,
}

impl<'a, AR> Disassembler<'a, AR>
where
    AR: Architecture,
{
    pub fn new(arch: AR, rdr: ByteReader<'a>) -> Self {
        Disassembler {
            arch,
            rdr,
            exhausted: false,
        }
    }

    /// The reader, positioned after the last decoded instruction.
    pub fn reader(&self) -> &ByteReader<'a> {
        &self.rdr
    }
}

impl<'a, AR> Iterator for Disassembler<'a, AR>
where
    AR: Architecture,
{
    type Item = AR::Instruction;

    fn next(&mut self) -> Option<AR::Instruction> {
        if self.exhausted {
            return None;
        }

        let instr = self.arch.disassemble(&mut self.rdr);
        if instr.is_none() {
            self.exhausted = true;
        }

        instr
    }
}

impl<'a, AR> FusedIterator for Disassembler<'a, AR> where AR: Architecture {}
