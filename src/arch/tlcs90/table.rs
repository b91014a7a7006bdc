//! TLCS-90 decode tables
//!
//! Each page is a flat table of 256 `DecodeRule`s indexed by opcode byte.
//! Simple rules carry an operand format string in a small mini-language; each
//! character (or character pair) produces one operand:
//!
//!  * `a` `A` `B` `D` `H` `X` `Y` `S` `Q` - the registers A, AF, BC, DE, HL,
//!    IX, IY, SP, and AF'
//!  * `r` - the byte register in the low three bits of the opcode
//!  * `Ib` `Iw` - an immediate byte or word
//!  * `Jb` `Jw` - an absolute jump target
//!  * `jb` `jw` - a jump target relative to the end of the instruction
//!  * `Mb` `Mw` - a byte or word in the direct page at `FF00h`
//!  * `c` - the condition code in the low four bits of the opcode
//!  * `i` - the bit index in the low three bits of the opcode
//!  * `x` - the memory operand of an extended page, filled in by the prefix
//!  * `g` `G` - the byte or word register named by a register prefix
//!
//! Commas separate operands and are otherwise ignored.

use crate::arch::tlcs90::{Opcode, Register};
use crate::memory::Width;
use std::ops::RangeInclusive;
use thiserror::Error;

/// The decode tables an opcode byte can be looked up in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Page {
    /// The first opcode byte of every instruction.
    Primary,

    /// The second opcode byte after a source memory prefix.
    Source,

    /// The second opcode byte after a destination memory prefix.
    Destination,

    /// The second opcode byte after a register prefix.
    Register,
}

impl Page {
    fn is_extended(self) -> bool {
        matches!(self, Page::Source | Page::Destination)
    }
}

/// Configuration errors in a decode table.
///
/// These indicate mistakes in the table itself and are never caused by the
/// program being decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown encoding '{code}' in format \"{format}\"")]
    UnknownEncoding { code: char, format: String },

    #[error("encoding '{code}' in format \"{format}\" needs a size of 'b' or 'w'")]
    BadSize { code: char, format: String },

    #[error("format \"{0}\" has more than two operands")]
    TooManyOperands(String),

    #[error("encoding '{code}' in format \"{format}\" is not valid on this page")]
    MisplacedEncoding { code: char, format: String },

    #[error("format \"{format}\" must have exactly one placeholder, found {found}")]
    Backpatch { format: String, found: usize },

    #[error("opcode {byte:02X} is defined twice on the {page:?} page")]
    DuplicateEntry { page: Page, byte: u8 },

    #[error("prefix {byte:02X} can only be placed on the primary page, not {page:?}")]
    MisplacedPrefix { page: Page, byte: u8 },
}

/// One operand-producing step of a format string.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Fixed(Register),
    LowRegister,
    Immediate(Width),
    Absolute(Width),
    Relative(Width),
    Direct(Width),
    Condition,
    BitIndex,
    Backpatch,
    PrefixByte,
    PrefixWord,
}

impl Step {
    /// The number of bytes this step reads from the instruction stream.
    fn encoded_length(self) -> usize {
        match self {
            Step::Immediate(w) | Step::Absolute(w) | Step::Relative(w) => w.bytes(),
            Step::Direct(_) => 1,
            _ => 0,
        }
    }
}

/// A parsed operand format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Format {
    steps: Vec<Step>,
}

impl Format {
    /// Parse a format string for a rule on the given page.
    pub fn parse(format: &str, page: Page) -> Result<Self, FormatError> {
        let mut steps = Vec::new();
        let mut chars = format.chars();

        while let Some(code) = chars.next() {
            let step = match code {
                ',' => continue,
                'a' => Step::Fixed(Register::A),
                'A' => Step::Fixed(Register::AF),
                'B' => Step::Fixed(Register::BC),
                'D' => Step::Fixed(Register::DE),
                'H' => Step::Fixed(Register::HL),
                'X' => Step::Fixed(Register::IX),
                'Y' => Step::Fixed(Register::IY),
                'S' => Step::Fixed(Register::SP),
                'Q' => Step::Fixed(Register::AFPrime),
                'r' => Step::LowRegister,
                'c' => Step::Condition,
                'i' => Step::BitIndex,
                'x' if page.is_extended() => Step::Backpatch,
                'g' if page == Page::Register => Step::PrefixByte,
                'G' if page == Page::Register => Step::PrefixWord,
                'x' | 'g' | 'G' => {
                    return Err(FormatError::MisplacedEncoding {
                        code,
                        format: format.to_string(),
                    })
                }
                'I' | 'J' | 'j' | 'M' => {
                    let width = match chars.next() {
                        Some('b') => Width::Byte,
                        Some('w') => Width::Word16,
                        _ => {
                            return Err(FormatError::BadSize {
                                code,
                                format: format.to_string(),
                            })
                        }
                    };

                    match code {
                        'I' => Step::Immediate(width),
                        'J' => Step::Absolute(width),
                        'j' => Step::Relative(width),
                        _ => Step::Direct(width),
                    }
                }
                _ => {
                    return Err(FormatError::UnknownEncoding {
                        code,
                        format: format.to_string(),
                    })
                }
            };

            steps.push(step);

            if steps.len() > 2 {
                return Err(FormatError::TooManyOperands(format.to_string()));
            }
        }

        if page.is_extended() {
            let found = steps.iter().filter(|s| **s == Step::Backpatch).count();
            if found != 1 {
                return Err(FormatError::Backpatch {
                    format: format.to_string(),
                    found,
                });
            }
        }

        Ok(Format { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    fn encoded_length(&self) -> usize {
        self.steps.iter().map(|s| s.encoded_length()).sum()
    }
}

/// The memory operand read by an extended prefix before its second opcode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outer {
    /// `(rr)`, with no extra bytes.
    Indirect(Register),

    /// `(nn)`, a 16-bit absolute address.
    Absolute,

    /// `(n)`, an address in the direct page.
    Direct,

    /// `(rr+d)`, with a signed displacement byte.
    Indexed(Register),

    /// `(HL+A)`.
    HlPlusA,
}

impl Outer {
    fn encoded_length(self) -> usize {
        match self {
            Outer::Absolute => 2,
            Outer::Direct | Outer::Indexed(_) => 1,
            Outer::Indirect(_) | Outer::HlPlusA => 0,
        }
    }
}

/// How to decode one opcode byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeRule {
    /// The byte is not a valid opcode.
    Invalid,

    Simple { opcode: Opcode, format: Format },

    /// Read a memory operand, then decode a second opcode byte on `page`
    /// and substitute the memory operand for its placeholder.
    Extended { page: Page, outer: Outer },

    /// Decode a second opcode byte on the register page, where `g` and `G`
    /// name these registers.
    RegisterPrefix {
        byte: Register,
        word: Option<Register>,
    },
}

impl DecodeRule {
    /// An estimate of the length of instructions decoded by this rule.
    ///
    /// Extended rules do not count the operands of their second opcode byte,
    /// so the true length of a decoded instruction may be larger.
    pub fn base_length(&self) -> usize {
        match self {
            DecodeRule::Invalid => 1,
            DecodeRule::Simple { format, .. } => 1 + format.encoded_length(),
            DecodeRule::Extended { outer, .. } => 2 + outer.encoded_length(),
            DecodeRule::RegisterPrefix { .. } => 2,
        }
    }
}

/// A total map from opcode byte to decode rule.
#[derive(Clone, Debug)]
pub struct DecodeTable {
    page: Page,
    rules: Vec<DecodeRule>,
}

impl DecodeTable {
    pub fn page(&self) -> Page {
        self.page
    }

    pub fn lookup(&self, byte: u8) -> &DecodeRule {
        &self.rules[byte as usize]
    }
}

/// Assembles a `DecodeTable` from ranges of opcode bytes.
///
/// Bytes that are never given a rule decode as invalid.
pub struct TableBuilder {
    page: Page,
    rules: Vec<Option<DecodeRule>>,
}

impl TableBuilder {
    pub fn new(page: Page) -> Self {
        TableBuilder {
            page,
            rules: vec![None; 256],
        }
    }

    fn insert(mut self, bytes: RangeInclusive<u8>, rule: DecodeRule) -> Result<Self, FormatError> {
        for byte in bytes {
            let slot = &mut self.rules[byte as usize];
            if slot.is_some() {
                return Err(FormatError::DuplicateEntry {
                    page: self.page,
                    byte,
                });
            }

            *slot = Some(rule.clone());
        }

        Ok(self)
    }

    /// Give every byte in `bytes` the same simple rule.
    pub fn rule(
        self,
        bytes: RangeInclusive<u8>,
        opcode: Opcode,
        format: &str,
    ) -> Result<Self, FormatError> {
        let rule = match opcode {
            Opcode::Invalid => DecodeRule::Invalid,
            _ => DecodeRule::Simple {
                opcode,
                format: Format::parse(format, self.page)?,
            },
        };

        self.insert(bytes, rule)
    }

    pub fn op(self, byte: u8, opcode: Opcode, format: &str) -> Result<Self, FormatError> {
        self.rule(byte..=byte, opcode, format)
    }

    /// Give consecutive bytes starting at `base` one opcode each.
    pub fn row(self, base: u8, opcodes: &[Opcode], format: &str) -> Result<Self, FormatError> {
        opcodes
            .iter()
            .zip(base..=0xFF)
            .try_fold(self, |table, (opcode, byte)| table.op(byte, *opcode, format))
    }

    /// Give consecutive bytes starting at `base` the same opcode, substituting
    /// each character of `codes` for `#` in the format. A `-` leaves its byte
    /// invalid.
    pub fn pairs(
        self,
        base: u8,
        opcode: Opcode,
        codes: &str,
        format: &str,
    ) -> Result<Self, FormatError> {
        codes
            .chars()
            .zip(base..=0xFF)
            .filter(|(code, _)| *code != '-')
            .try_fold(self, |table, (code, byte)| {
                table.op(byte, opcode, &format.replace('#', &code.to_string()))
            })
    }

    pub fn extended(self, byte: u8, page: Page, outer: Outer) -> Result<Self, FormatError> {
        if self.page != Page::Primary || !page.is_extended() {
            return Err(FormatError::MisplacedPrefix {
                page: self.page,
                byte,
            });
        }

        self.insert(byte..=byte, DecodeRule::Extended { page, outer })
    }

    pub fn register_prefix(
        self,
        byte: u8,
        byte_reg: Register,
        word_reg: Option<Register>,
    ) -> Result<Self, FormatError> {
        if self.page != Page::Primary {
            return Err(FormatError::MisplacedPrefix {
                page: self.page,
                byte,
            });
        }

        self.insert(
            byte..=byte,
            DecodeRule::RegisterPrefix {
                byte: byte_reg,
                word: word_reg,
            },
        )
    }

    pub fn build(self) -> DecodeTable {
        DecodeTable {
            page: self.page,
            rules: self
                .rules
                .into_iter()
                .map(|r| r.unwrap_or(DecodeRule::Invalid))
                .collect(),
        }
    }
}

/// The complete set of pages an instruction can be decoded from.
#[derive(Clone, Debug)]
pub struct Tables {
    pub primary: DecodeTable,
    pub source: DecodeTable,
    pub destination: DecodeTable,
    pub register: DecodeTable,
}

impl Tables {
    pub fn page(&self, page: Page) -> &DecodeTable {
        match page {
            Page::Primary => &self.primary,
            Page::Source => &self.source,
            Page::Destination => &self.destination,
            Page::Register => &self.register,
        }
    }

    /// Build the TLCS-90 instruction set.
    pub fn tlcs90() -> Result<Self, FormatError> {
        Ok(Tables {
            primary: primary_page()?.build(),
            source: source_page()?.build(),
            destination: destination_page()?.build(),
            register: register_page()?.build(),
        })
    }
}

lazy_static! {
    /// The TLCS-90 decode tables.
    pub static ref TLCS90_TABLES: Tables = match Tables::tlcs90() {
        Ok(tables) => tables,
        Err(e) => panic!("TLCS-90 decode table is malformed: {}", e),
    };
}

/// The eight ALU operations, in encoding order.
static ALU_OPS: [Opcode; 8] = [
    Opcode::Add,
    Opcode::Adc,
    Opcode::Sub,
    Opcode::Sbc,
    Opcode::And,
    Opcode::Xor,
    Opcode::Or,
    Opcode::Cp,
];

/// The eight rotate and shift operations, in encoding order.
static SHIFT_OPS: [Opcode; 8] = [
    Opcode::Rlc,
    Opcode::Rrc,
    Opcode::Rl,
    Opcode::Rr,
    Opcode::Sla,
    Opcode::Sra,
    Opcode::Sll,
    Opcode::Srl,
];

/// Register pairs in the order most word instructions encode them.
const PAIRS: &str = "BDH-XYS";

/// Register pairs in the order `push` and `pop` encode them.
const STACK_PAIRS: &str = "BDH-XYA";

fn primary_page() -> Result<TableBuilder, FormatError> {
    use Opcode::*;

    TableBuilder::new(Page::Primary)
        .op(0x00, Nop, "")?
        .op(0x01, Halt, "")?
        .op(0x02, Di, "")?
        .op(0x03, Ei, "")?
        .op(0x07, Incx, "Mb")?
        .op(0x08, Ex, "D,H")?
        .op(0x09, Ex, "A,Q")?
        .op(0x0A, Exx, "")?
        .op(0x0B, Daa, "a")?
        .op(0x0C, Rcf, "")?
        .op(0x0D, Scf, "")?
        .op(0x0E, Ccf, "")?
        .op(0x0F, Decx, "Mb")?
        .op(0x10, Cpl, "a")?
        .op(0x11, Neg, "a")?
        .op(0x12, Mul, "H,Mb")?
        .op(0x13, Div, "H,Mb")?
        .op(0x14, Add, "X,Iw")?
        .op(0x15, Add, "Y,Iw")?
        .op(0x16, Add, "S,Iw")?
        .op(0x17, Ldar, "H,jw")?
        .op(0x18, Djnz, "jb")?
        .op(0x19, Djnz, "B,jb")?
        .op(0x1A, Jp, "Jw")?
        .op(0x1B, Jrl, "jw")?
        .op(0x1C, Call, "Jw")?
        .op(0x1D, Callr, "jw")?
        .op(0x1E, Ret, "")?
        .op(0x1F, Reti, "")?
        .rule(0x20..=0x26, Ld, "a,r")?
        .op(0x27, Ld, "a,Mb")?
        .rule(0x28..=0x2E, Ld, "r,a")?
        .op(0x2F, Ld, "Mb,a")?
        .rule(0x30..=0x36, Ld, "r,Ib")?
        .op(0x37, Ld, "Mb,Ib")?
        .pairs(0x38, Ld, PAIRS, "#,Iw")?
        .op(0x3F, Ldw, "Mw,Iw")?
        .pairs(0x40, Ld, PAIRS, "H,#")?
        .op(0x47, Ld, "H,Mw")?
        .pairs(0x48, Ld, PAIRS, "#,H")?
        .op(0x4F, Ld, "Mw,H")?
        .pairs(0x50, Push, STACK_PAIRS, "#")?
        .pairs(0x58, Pop, STACK_PAIRS, "#")?
        .row(0x60, &ALU_OPS, "a,Mb")?
        .row(0x68, &ALU_OPS, "a,Ib")?
        .row(0x70, &ALU_OPS, "H,Mw")?
        .row(0x78, &ALU_OPS, "H,Iw")?
        .rule(0x80..=0x86, Inc, "r")?
        .op(0x87, Inc, "Mb")?
        .rule(0x88..=0x8E, Dec, "r")?
        .op(0x8F, Dec, "Mb")?
        .pairs(0x90, Inc, PAIRS, "#")?
        .pairs(0x98, Dec, PAIRS, "#")?
        .row(0xA0, &SHIFT_OPS, "a")?
        .rule(0xA8..=0xAF, Bit, "i,Mb")?
        .rule(0xB0..=0xB7, Res, "i,Mb")?
        .rule(0xB8..=0xBF, Set, "i,Mb")?
        .rule(0xC0..=0xC7, Jr, "c,jb")?
        .op(0xC8, Jr, "jb")?
        .rule(0xC9..=0xCF, Jr, "c,jb")?
        .extended(0xE0, Page::Source, Outer::Indirect(Register::BC))?
        .extended(0xE1, Page::Source, Outer::Indirect(Register::DE))?
        .extended(0xE2, Page::Source, Outer::Indirect(Register::HL))?
        .extended(0xE3, Page::Source, Outer::Absolute)?
        .extended(0xE4, Page::Source, Outer::Indirect(Register::IX))?
        .extended(0xE5, Page::Source, Outer::Indirect(Register::IY))?
        .extended(0xE6, Page::Source, Outer::Indirect(Register::SP))?
        .extended(0xE7, Page::Source, Outer::Direct)?
        .extended(0xE8, Page::Destination, Outer::Indirect(Register::BC))?
        .extended(0xE9, Page::Destination, Outer::Indirect(Register::DE))?
        .extended(0xEA, Page::Destination, Outer::Indirect(Register::HL))?
        .extended(0xEB, Page::Destination, Outer::Absolute)?
        .extended(0xEC, Page::Destination, Outer::Indirect(Register::IX))?
        .extended(0xED, Page::Destination, Outer::Indirect(Register::IY))?
        .extended(0xEE, Page::Destination, Outer::Indirect(Register::SP))?
        .extended(0xEF, Page::Destination, Outer::Direct)?
        .extended(0xF0, Page::Source, Outer::Indexed(Register::IX))?
        .extended(0xF1, Page::Source, Outer::Indexed(Register::IY))?
        .extended(0xF2, Page::Source, Outer::Indexed(Register::SP))?
        .extended(0xF3, Page::Source, Outer::HlPlusA)?
        .extended(0xF4, Page::Destination, Outer::Indexed(Register::IX))?
        .extended(0xF5, Page::Destination, Outer::Indexed(Register::IY))?
        .extended(0xF6, Page::Destination, Outer::Indexed(Register::SP))?
        .extended(0xF7, Page::Destination, Outer::HlPlusA)?
        .register_prefix(0xF8, Register::B, Some(Register::BC))?
        .register_prefix(0xF9, Register::C, Some(Register::DE))?
        .register_prefix(0xFA, Register::D, Some(Register::HL))?
        .register_prefix(0xFB, Register::E, None)?
        .register_prefix(0xFC, Register::H, Some(Register::IX))?
        .register_prefix(0xFD, Register::L, Some(Register::IY))?
        .register_prefix(0xFE, Register::A, Some(Register::SP))?
        .op(0xFF, Swi, "")
}

fn source_page() -> Result<TableBuilder, FormatError> {
    use Opcode::*;

    TableBuilder::new(Page::Source)
        .rule(0x28..=0x2E, Ld, "r,x")?
        .pairs(0x48, Ld, PAIRS, "#,x")?
        .row(0x60, &ALU_OPS, "a,x")?
        .row(0x70, &ALU_OPS, "H,x")?
        .op(0x87, Inc, "x")?
        .op(0x8F, Dec, "x")?
        .row(0xA0, &SHIFT_OPS, "x")?
        .rule(0xA8..=0xAF, Bit, "i,x")?
        .rule(0xB0..=0xB7, Res, "i,x")?
        .rule(0xB8..=0xBF, Set, "i,x")
}

fn destination_page() -> Result<TableBuilder, FormatError> {
    use Opcode::*;

    TableBuilder::new(Page::Destination)
        .rule(0x20..=0x26, Ld, "x,r")?
        .pairs(0x28, Ld, PAIRS, "x,#")?
        .op(0x37, Ld, "x,Ib")?
        .op(0x3F, Ldw, "x,Iw")?
        .row(0x68, &ALU_OPS, "x,Ib")
}

fn register_page() -> Result<TableBuilder, FormatError> {
    use Opcode::*;

    TableBuilder::new(Page::Register)
        .op(0x12, Mul, "H,g")?
        .op(0x13, Div, "H,g")?
        .rule(0x30..=0x36, Ld, "r,g")?
        .pairs(0x38, Ld, PAIRS, "#,G")?
        .row(0x60, &ALU_OPS, "a,g")?
        .row(0x70, &ALU_OPS, "H,G")?
        .row(0xA0, &SHIFT_OPS, "g")?
        .rule(0xA8..=0xAF, Bit, "i,g")?
        .rule(0xB0..=0xB7, Res, "i,g")?
        .rule(0xB8..=0xBF, Set, "i,g")
}
