//! An 8-bit Z80 derivative created by Toshiba for embedded controllers

mod dis;
mod instr;
mod opcode;
mod rewrite;
mod table;
mod types;

pub use dis::decode;
pub use instr::Instruction;
pub use opcode::Opcode;
pub use rewrite::rewrite;
pub use table::{
    DecodeRule, DecodeTable, Format, FormatError, Outer, Page, Step, TableBuilder, Tables,
    TLCS90_TABLES,
};
pub use types::*;

use crate::analysis::Diagnostics;
use crate::arch::{ArchName, Architecture};
use crate::ir::{Class, Emitter, Frame};
use crate::memory::{ByteReader, Endianness, Width};
use crate::reg::{RegisterPair, State};

/// Byte registers that also address as word registers. The flags half of
/// AF is never tracked as a register value.
static REGISTER_PAIRS: [RegisterPair; 4] = [
    RegisterPair {
        pair: "BC",
        high: "B",
        low: "C",
    },
    RegisterPair {
        pair: "DE",
        high: "D",
        low: "E",
    },
    RegisterPair {
        pair: "HL",
        high: "H",
        low: "L",
    },
    RegisterPair {
        pair: "AF",
        high: "A",
        low: "F",
    },
];

/// The TLCS-90 architecture.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tlcs90();

impl Architecture for Tlcs90 {
    type Instruction = Instruction;

    fn name(&self) -> ArchName {
        ArchName::Tlcs90
    }

    fn endianness(&self) -> Endianness {
        Endianness::LittleEndian
    }

    fn pointer_width(&self) -> Width {
        Width::Word16
    }

    fn register_pairs(&self) -> &'static [RegisterPair] {
        &REGISTER_PAIRS
    }

    fn disassemble(&self, rdr: &mut ByteReader<'_>) -> Option<Instruction> {
        decode(&TLCS90_TABLES, rdr)
    }

    fn rewrite(
        &self,
        instr: &Instruction,
        m: &mut Emitter,
        state: &State,
        frame: &mut Frame,
        host: &dyn Diagnostics,
    ) -> Class {
        rewrite(instr, m, state, frame, host)
    }
}
