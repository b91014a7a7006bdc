//! TLCS-90 mnemonics

use std::fmt;

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum Opcode {
    Invalid,
    Nop,
    Halt,
    Di,
    Ei,
    Incx,
    Decx,
    Ex,
    Exx,
    Daa,
    Rcf,
    Scf,
    Ccf,
    Cpl,
    Neg,
    Mul,
    Div,
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
    Ldar,
    Djnz,
    Jp,
    Jr,
    Jrl,
    Call,
    Callr,
    Ret,
    Reti,
    Swi,
    Ld,
    Ldw,
    Push,
    Pop,
    Inc,
    Dec,
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Sll,
    Srl,
    Bit,
    Res,
    Set,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;

        match self {
            Invalid => "invalid",
            Nop => "nop",
            Halt => "halt",
            Di => "di",
            Ei => "ei",
            Incx => "incx",
            Decx => "decx",
            Ex => "ex",
            Exx => "exx",
            Daa => "daa",
            Rcf => "rcf",
            Scf => "scf",
            Ccf => "ccf",
            Cpl => "cpl",
            Neg => "neg",
            Mul => "mul",
            Div => "div",
            Add => "add",
            Adc => "adc",
            Sub => "sub",
            Sbc => "sbc",
            And => "and",
            Xor => "xor",
            Or => "or",
            Cp => "cp",
            Ldar => "ldar",
            Djnz => "djnz",
            Jp => "jp",
            Jr => "jr",
            Jrl => "jrl",
            Call => "call",
            Callr => "callr",
            Ret => "ret",
            Reti => "reti",
            Swi => "swi",
            Ld => "ld",
            Ldw => "ldw",
            Push => "push",
            Pop => "pop",
            Inc => "inc",
            Dec => "dec",
            Rlc => "rlc",
            Rrc => "rrc",
            Rl => "rl",
            Rr => "rr",
            Sla => "sla",
            Sra => "sra",
            Sll => "sll",
            Srl => "srl",
            Bit => "bit",
            Res => "res",
            Set => "set",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}
