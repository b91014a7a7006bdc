//! TLCS-90 disassembler

use crate::arch::tlcs90::table::{DecodeRule, Format, Outer, Step, Tables};
use crate::arch::tlcs90::{Condition, Instruction, Opcode, Operand, Register};
use crate::memory::{ByteReader, Endianness, Pointer, Result, Width};

/// The base of the direct page addressed by `(n)` operands.
const DIRECT_PAGE: u64 = 0xFF00;

/// An operand slot left empty by an inner decode, waiting for the memory
/// operand its prefix read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct PendingPatch {
    slot: usize,
    width: Width,
}

/// The result of interpreting one operand format.
struct Decoded {
    opcode: Opcode,
    operands: [Option<Operand>; 2],
    width: Option<Width>,
    patch: Option<PendingPatch>,
}

impl Decoded {
    fn invalid() -> Self {
        Decoded {
            opcode: Opcode::Invalid,
            operands: [None, None],
            width: None,
            patch: None,
        }
    }
}

/// A memory location read by an extended prefix.
#[derive(Copy, Clone, Debug)]
enum Location {
    Absolute(Pointer),
    Indirect {
        base: Register,
        index: Option<Register>,
        displacement: i8,
    },
}

impl Location {
    fn operand(self, width: Width) -> Operand {
        match self {
            Location::Absolute(address) => Operand::Absolute { address, width },
            Location::Indirect {
                base,
                index,
                displacement,
            } => Operand::Indirect {
                base,
                index,
                displacement,
                width,
            },
        }
    }
}

/// The registers selected by a register prefix byte.
#[derive(Copy, Clone, Debug)]
struct Prefix {
    byte: Register,
    word: Option<Register>,
}

/// Decode one instruction with the given tables.
///
/// If the reader runs out partway through an instruction, the reader is
/// restored to where the instruction began and no instruction is produced.
pub fn decode(tables: &Tables, rdr: &mut ByteReader<'_>) -> Option<Instruction> {
    let start = rdr.offset();
    let address = rdr.address();

    match decode_primary(tables, rdr) {
        Ok(decoded) => Some(Instruction::new(
            address,
            rdr.offset() - start,
            decoded.opcode,
            decoded.operands,
            decoded.width,
        )),
        Err(_) => {
            rdr.set_offset(start);
            None
        }
    }
}

fn decode_primary(tables: &Tables, rdr: &mut ByteReader<'_>) -> Result<Decoded> {
    let opcode = rdr.read_u8()?;

    match tables.primary.lookup(opcode) {
        DecodeRule::Invalid => Ok(Decoded::invalid()),
        DecodeRule::Simple { opcode: op, format } => decode_format(opcode, *op, format, None, rdr),
        DecodeRule::Extended { page, outer } => {
            let location = read_outer(*outer, rdr)?;
            let inner = rdr.read_u8()?;

            match tables.page(*page).lookup(inner) {
                DecodeRule::Simple { opcode: op, format } => {
                    let decoded = decode_format(inner, *op, format, None, rdr)?;

                    Ok(backpatch(decoded, location))
                }
                _ => Ok(Decoded::invalid()),
            }
        }
        DecodeRule::RegisterPrefix { byte, word } => {
            let inner = rdr.read_u8()?;
            let prefix = Prefix {
                byte: *byte,
                word: *word,
            };

            match tables.register.lookup(inner) {
                DecodeRule::Simple { opcode: op, format } => {
                    decode_format(inner, *op, format, Some(prefix), rdr)
                }
                _ => Ok(Decoded::invalid()),
            }
        }
    }
}

/// Read the memory operand that precedes the second opcode byte of an
/// extended instruction.
fn read_outer(outer: Outer, rdr: &mut ByteReader<'_>) -> Result<Location> {
    Ok(match outer {
        Outer::Indirect(base) => Location::Indirect {
            base,
            index: None,
            displacement: 0,
        },
        Outer::Absolute => Location::Absolute(Pointer::new(rdr.read_le::<u16>()? as u64)),
        Outer::Direct => Location::Absolute(Pointer::new(DIRECT_PAGE + rdr.read_u8()? as u64)),
        Outer::Indexed(base) => Location::Indirect {
            base,
            index: None,
            displacement: rdr.read_le::<i8>()?,
        },
        Outer::HlPlusA => Location::Indirect {
            base: Register::HL,
            index: Some(Register::A),
            displacement: 0,
        },
    })
}

/// Substitute the prefix's memory operand into the slot the inner decode
/// left open.
fn backpatch(mut decoded: Decoded, location: Location) -> Decoded {
    let patch = match decoded.patch.take() {
        Some(patch) => patch,
        None => return Decoded::invalid(),
    };

    match decoded.operands.get_mut(patch.slot) {
        Some(slot) => *slot = Some(location.operand(patch.width)),
        None => return Decoded::invalid(),
    }

    decoded.width = Some(patch.width);

    decoded
}

/// Interpret an operand format against the instruction stream.
///
/// Register, condition, and bit fields come from `opcode_byte`, the byte the
/// rule was looked up with.
fn decode_format(
    opcode_byte: u8,
    opcode: Opcode,
    format: &Format,
    prefix: Option<Prefix>,
    rdr: &mut ByteReader<'_>,
) -> Result<Decoded> {
    let mut operands = [None, None];
    let mut width = None;
    let mut patch_slot = None;

    for (slot, step) in format.steps().iter().enumerate() {
        let operand = match *step {
            Step::Fixed(reg) => {
                width = Some(reg.width());
                Operand::Register(reg)
            }
            Step::LowRegister => match Register::from_byte_field(opcode_byte) {
                Some(reg) => {
                    width = Some(Width::Byte);
                    Operand::Register(reg)
                }
                None => return Ok(Decoded::invalid()),
            },
            Step::Immediate(w) => {
                width = Some(w);
                Operand::Immediate {
                    value: rdr.read_uint_with(w, Endianness::LittleEndian)?,
                    width: w,
                }
            }
            Step::Absolute(w) => Operand::Target(Pointer::new(
                rdr.read_uint_with(w, Endianness::LittleEndian)?,
            )),
            Step::Relative(w) => {
                let displacement =
                    w.sign_extend(rdr.read_uint_with(w, Endianness::LittleEndian)?);
                let target = rdr.address().as_pointer().wrapping_add(displacement as u64);

                Operand::Target(Pointer::new(target & Width::Word16.mask()))
            }
            Step::Direct(w) => {
                width = Some(w);
                Operand::Absolute {
                    address: Pointer::new(DIRECT_PAGE + rdr.read_u8()? as u64),
                    width: w,
                }
            }
            Step::Condition => Operand::Condition(Condition::from_bits(opcode_byte)),
            Step::BitIndex => Operand::Immediate {
                value: (opcode_byte & 0x07) as u64,
                width: Width::Byte,
            },
            Step::Backpatch => {
                patch_slot = Some(slot);
                continue;
            }
            Step::PrefixByte => match prefix {
                Some(prefix) => {
                    width = Some(Width::Byte);
                    Operand::Register(prefix.byte)
                }
                None => return Ok(Decoded::invalid()),
            },
            Step::PrefixWord => match prefix.and_then(|p| p.word) {
                Some(reg) => {
                    width = Some(Width::Word16);
                    Operand::Register(reg)
                }
                None => return Ok(Decoded::invalid()),
            },
        };

        if let Some(dst) = operands.get_mut(slot) {
            *dst = Some(operand);
        }
    }

    Ok(Decoded {
        opcode,
        operands,
        width,
        patch: patch_slot.map(|slot| PendingPatch {
            slot,
            width: width.unwrap_or(Width::Byte),
        }),
    })
}
