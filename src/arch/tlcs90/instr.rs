//! Decoded TLCS-90 instructions

use crate::arch::tlcs90::{Opcode, Operand};
use crate::arch::MachineInstruction;
use crate::memory::{Pointer, Width};
use std::fmt;

/// A single decoded TLCS-90 instruction.
///
/// Instructions are created once per decode and never modified afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Instruction {
    address: Pointer,
    length: usize,
    opcode: Opcode,
    op1: Option<Operand>,
    op2: Option<Operand>,
    width: Option<Width>,
}

impl Instruction {
    pub(crate) fn new(
        address: Pointer,
        length: usize,
        opcode: Opcode,
        operands: [Option<Operand>; 2],
        width: Option<Width>,
    ) -> Self {
        let [op1, op2] = operands;

        Instruction {
            address,
            length,
            opcode,
            op1,
            op2,
            width,
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn op1(&self) -> Option<&Operand> {
        self.op1.as_ref()
    }

    pub fn op2(&self) -> Option<&Operand> {
        self.op2.as_ref()
    }

    pub fn operands(&self) -> impl Iterator<Item = &Operand> {
        self.op1.iter().chain(self.op2.iter())
    }

    /// The data width the instruction operates on, if its operands reveal it.
    pub fn width(&self) -> Option<Width> {
        self.width
    }
}

impl MachineInstruction for Instruction {
    fn address(&self) -> Pointer {
        self.address
    }

    fn length(&self) -> usize {
        self.length
    }

    fn mnemonic(&self) -> &'static str {
        self.opcode.mnemonic()
    }

    fn is_invalid(&self) -> bool {
        self.opcode == Opcode::Invalid
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;

        for (i, op) in self.operands().enumerate() {
            if i == 0 {
                write!(f, "\t{}", op)?;
            } else {
                write!(f, ",{}", op)?;
            }
        }

        Ok(())
    }
}
