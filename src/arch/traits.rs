//! Architecture trait

use crate::analysis::Diagnostics;
use crate::arch::ArchName;
use crate::ir::{Class, Emitter, Frame};
use crate::memory::{ByteReader, Endianness, Pointer, Width};
use crate::reg::{RegisterPair, State};
use std::fmt::{Debug, Display};

/// A decoded machine instruction.
pub trait MachineInstruction: Clone + Debug + Display + PartialEq + Send + Sync {
    /// The address the instruction was decoded from.
    fn address(&self) -> Pointer;

    /// The number of bytes the instruction occupies, including any prefixes.
    fn length(&self) -> usize;

    /// The instruction's mnemonic.
    fn mnemonic(&self) -> &'static str;

    /// Determine if the instruction was decoded from a byte sequence that is
    /// not a valid encoding.
    fn is_invalid(&self) -> bool;
}

/// Trait which represents all of the analysis methods an architecture
/// must provide in order to be supported.
///
/// Architectures are expected to be zero-sized handles: all decode tables
/// are static, and every method is reentrant so that any number of scan
/// workers may share one value.
pub trait Architecture: Copy + Debug + Send + Sync + 'static {
    /// The type which represents a decoded instruction.
    type Instruction: MachineInstruction;

    fn name(&self) -> ArchName;

    /// The byte order of multi-byte values in memory.
    fn endianness(&self) -> Endianness;

    /// The width of a pointer stored in memory.
    fn pointer_width(&self) -> Width;

    /// Word registers that overlap pairs of byte registers.
    fn register_pairs(&self) -> &'static [RegisterPair] {
        &[]
    }

    /// Decode one instruction from the reader.
    ///
    /// On success, the reader is left just past the instruction. If the
    /// reader runs out of bytes partway through an instruction, this yields
    /// `None` and leaves the reader where the instruction started. Byte
    /// sequences that are not valid instructions decode successfully, as an
    /// instruction that reports `is_invalid`.
    fn disassemble(&self, rdr: &mut ByteReader<'_>) -> Option<Self::Instruction>;

    /// Lower an instruction into IR statements.
    ///
    /// Statements are appended to `m`; identifiers come from `frame`. The
    /// returned class describes the instruction's effect on control flow.
    /// Instructions without a lowering must report an error to `host` and
    /// yield `Class::Invalid`.
    fn rewrite(
        &self,
        instr: &Self::Instruction,
        m: &mut Emitter,
        state: &State,
        frame: &mut Frame,
        host: &dyn Diagnostics,
    ) -> Class;
}
