//! IR expressions

use crate::memory::{Pointer, Width};
use std::fmt;

/// What kind of storage an identifier names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Storage {
    /// An architectural register.
    Register,

    /// A group of condition flags, named after the flags it holds.
    Flags,

    /// A temporary local to a single cluster.
    Temporary,
}

/// A named storage location in the frame.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identifier {
    name: String,
    width: Width,
    storage: Storage,
}

impl Identifier {
    pub fn new(name: &str, width: Width, storage: Storage) -> Self {
        Identifier {
            name: name.to_string(),
            width,
            storage,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> Width {
        self.width
    }

    pub fn storage(&self) -> Storage {
        self.storage
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    UMul,
    UDiv,
    URem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Sar,
    Eq,
    Ne,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinaryOp::*;

        let symbol = match self {
            Add => "+",
            Sub => "-",
            UMul => "*u",
            UDiv => "/u",
            URem => "%u",
            And => "&",
            Or => "|",
            Xor => "^",
            Shl => "<<",
            Shr => ">>u",
            Sar => ">>",
            Eq => "==",
            Ne => "!=",
        };

        write!(f, "{}", symbol)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Two's-complement negation.
    Neg,

    /// Bitwise complement.
    Comp,

    /// Logical negation.
    Not,

    /// The condition flags a value would produce.
    Cond,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Comp => write!(f, "~"),
            UnaryOp::Not => write!(f, "!"),
            UnaryOp::Cond => write!(f, "cond"),
        }
    }
}

/// An IR expression.
///
/// Expressions are trees; they own their operands and are cheap enough to
/// clone for the sizes produced by a single instruction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expression {
    Id(Identifier),
    Const {
        value: u64,
        width: Width,
    },

    /// A code or data address.
    Addr(Pointer),

    /// A memory access at the effective address `ea`.
    Mem {
        ea: Box<Expression>,
        width: Width,
    },
    Binary {
        op: BinaryOp,
        width: Width,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Unary {
        op: UnaryOp,
        width: Width,
        operand: Box<Expression>,
    },

    /// Test a condition code against a flag group.
    Test(String, Identifier),

    /// An operation with no direct IR equivalent.
    Intrinsic {
        name: &'static str,
        width: Width,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn constant(value: u64, width: Width) -> Self {
        Expression::Const {
            value: value & width.mask(),
            width,
        }
    }

    pub fn mem(ea: Expression, width: Width) -> Self {
        Expression::Mem {
            ea: Box::new(ea),
            width,
        }
    }

    pub fn binary(op: BinaryOp, width: Width, lhs: Expression, rhs: Expression) -> Self {
        Expression::Binary {
            op,
            width,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn unary(op: UnaryOp, width: Width, operand: Expression) -> Self {
        Expression::Unary {
            op,
            width,
            operand: Box::new(operand),
        }
    }

    pub fn intrinsic(name: &'static str, width: Width, args: Vec<Expression>) -> Self {
        Expression::Intrinsic { name, width, args }
    }

    /// The width of the value this expression produces.
    ///
    /// Addresses and tests have no inherent width and report `None`.
    pub fn width(&self) -> Option<Width> {
        match self {
            Expression::Id(id) => Some(id.width()),
            Expression::Const { width, .. }
            | Expression::Mem { width, .. }
            | Expression::Binary { width, .. }
            | Expression::Unary { width, .. }
            | Expression::Intrinsic { width, .. } => Some(*width),
            Expression::Addr(_) | Expression::Test(_, _) => None,
        }
    }

    /// The static address this expression evaluates to, if any.
    pub fn as_address(&self) -> Option<Pointer> {
        match self {
            Expression::Addr(ptr) => Some(*ptr),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Expression::Id(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Id(id) => write!(f, "{}", id),
            Expression::Const { value, width } => {
                write!(f, "0x{:0w$X}", value, w = width.bytes() * 2)
            }
            Expression::Addr(ptr) => write!(f, "{}", ptr),
            Expression::Mem { ea, width } => write!(f, "Mem{}[{}]", width.bits(), ea),
            Expression::Binary { op, lhs, rhs, .. } => write!(f, "{} {} {}", lhs, op, rhs),
            Expression::Unary {
                op: UnaryOp::Cond,
                operand,
                ..
            } => write!(f, "cond({})", operand),
            Expression::Unary { op, operand, .. } => write!(f, "{}{}", op, operand),
            Expression::Test(cc, flags) => write!(f, "Test({},{})", cc, flags),
            Expression::Intrinsic { name, args, .. } => {
                write!(f, "{}(", name)?;

                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }

                    write!(f, "{}", arg)?;
                }

                write!(f, ")")
            }
        }
    }
}
