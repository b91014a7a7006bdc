//! Types used in modeling the TLCS-90

use crate::memory::{Pointer, Width};
use std::fmt;

/// Enumeration of all architectural TLCS-90 registers.
///
/// Register pairs are listed separately from their halves, since
/// instructions name them directly. `AFPrime` is the alternate accumulator
/// and flags, only reachable through `ex AF,AF'`.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Register {
    B,
    C,
    D,
    E,
    H,
    L,
    A,
    BC,
    DE,
    HL,
    IX,
    IY,
    SP,
    AF,
    AFPrime,
}

impl Register {
    pub fn width(self) -> Width {
        use Register::*;

        match self {
            B | C | D | E | H | L | A => Width::Byte,
            _ => Width::Word16,
        }
    }

    pub fn name(self) -> &'static str {
        use Register::*;

        match self {
            B => "B",
            C => "C",
            D => "D",
            E => "E",
            H => "H",
            L => "L",
            A => "A",
            BC => "BC",
            DE => "DE",
            HL => "HL",
            IX => "IX",
            IY => "IY",
            SP => "SP",
            AF => "AF",
            AFPrime => "AF'",
        }
    }

    /// Decode the byte register selected by the low three bits of an opcode.
    pub fn from_byte_field(bits: u8) -> Option<Self> {
        BYTE_REGS[(bits & 0x07) as usize]
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// TLCS-90 instruction encoding uses this 3-bit enumeration to encode byte
/// registers. Slot 7 is unassigned.
static BYTE_REGS: [Option<Register>; 8] = [
    Some(Register::B),
    Some(Register::C),
    Some(Register::D),
    Some(Register::E),
    Some(Register::H),
    Some(Register::L),
    Some(Register::A),
    None,
];

/// Condition codes, as encoded in the low four bits of conditional jumps.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum Condition {
    F,
    LT,
    LE,
    ULE,
    OV,
    MI,
    Z,
    C,
    T,
    GE,
    GT,
    UGT,
    NOV,
    PL,
    NZ,
    NC,
}

impl Condition {
    pub fn from_bits(bits: u8) -> Self {
        use Condition::*;

        match bits & 0x0F {
            0x0 => F,
            0x1 => LT,
            0x2 => LE,
            0x3 => ULE,
            0x4 => OV,
            0x5 => MI,
            0x6 => Z,
            0x7 => C,
            0x8 => T,
            0x9 => GE,
            0xA => GT,
            0xB => UGT,
            0xC => NOV,
            0xD => PL,
            0xE => NZ,
            _ => NC,
        }
    }

    pub fn name(self) -> &'static str {
        use Condition::*;

        match self {
            F => "F",
            LT => "LT",
            LE => "LE",
            ULE => "ULE",
            OV => "OV",
            MI => "MI",
            Z => "Z",
            C => "C",
            T => "T",
            GE => "GE",
            GT => "GT",
            UGT => "UGT",
            NOV => "NOV",
            PL => "PL",
            NZ => "NZ",
            NC => "NC",
        }
    }

    /// The flags this condition reads, named the way flag groups are.
    pub fn flags(self) -> &'static str {
        use Condition::*;

        match self {
            F | T => "",
            LT | GE => "SV",
            LE | GT => "SZV",
            ULE | UGT => "ZC",
            OV | NOV => "V",
            MI | PL => "S",
            Z | NZ => "Z",
            C | NC => "C",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single TLCS-90 instruction operand.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    Register(Register),
    Immediate {
        value: u64,
        width: Width,
    },

    /// A memory location at a fixed address.
    Absolute {
        address: Pointer,
        width: Width,
    },

    /// A memory location addressed by `base + index + displacement`.
    Indirect {
        base: Register,
        index: Option<Register>,
        displacement: i8,
        width: Width,
    },

    /// The destination of a jump or call.
    Target(Pointer),
    Condition(Condition),
}

impl Operand {
    pub fn width(&self) -> Option<Width> {
        match self {
            Operand::Register(r) => Some(r.width()),
            Operand::Immediate { width, .. }
            | Operand::Absolute { width, .. }
            | Operand::Indirect { width, .. } => Some(*width),
            Operand::Target(_) => Some(Width::Word16),
            Operand::Condition(_) => None,
        }
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, Operand::Absolute { .. } | Operand::Indirect { .. })
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(r) => write!(f, "{}", r),
            Operand::Immediate { value, width } => {
                write!(f, "{:0w$X}h", value, w = width.bytes() * 2)
            }
            Operand::Absolute { address, .. } => write!(f, "({:04X}h)", address),
            Operand::Indirect {
                base,
                index: Some(index),
                ..
            } => write!(f, "({}+{})", base, index),
            Operand::Indirect {
                base,
                displacement: 0,
                ..
            } => write!(f, "({})", base),
            Operand::Indirect {
                base, displacement, ..
            } if *displacement < 0 => write!(f, "({}-{:02X}h)", base, -(*displacement as i16)),
            Operand::Indirect {
                base, displacement, ..
            } => write!(f, "({}+{:02X}h)", base, displacement),
            Operand::Target(ptr) => write!(f, "{:04X}h", ptr),
            Operand::Condition(cc) => write!(f, "{}", cc),
        }
    }
}
