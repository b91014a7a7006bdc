//! IR statements and clusters

use crate::ir::Expression;
use crate::memory::Pointer;
use std::fmt;

/// A single IR statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Statement {
    Nop,

    /// Store `src` into `dst`, which is an identifier or a memory access.
    Assign {
        dst: Expression,
        src: Expression,
    },

    /// Unconditionally continue execution at `target`.
    Goto(Expression),

    /// Continue execution at `target` if `condition` holds.
    Branch {
        condition: Expression,
        target: Pointer,
    },

    /// Call the subroutine at the given address.
    Call(Expression),
    Return,

    /// Evaluate an expression for its effects on the machine.
    SideEffect(Expression),

    /// The instruction could not be lowered.
    Invalid,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Nop => write!(f, "nop"),
            Statement::Assign { dst, src } => write!(f, "{} = {}", dst, src),
            Statement::Goto(target) => write!(f, "goto {}", target),
            Statement::Branch { condition, target } => {
                write!(f, "if ({}) branch {}", condition, target)
            }
            Statement::Call(target) => write!(f, "call {}", target),
            Statement::Return => write!(f, "return"),
            Statement::SideEffect(e) => write!(f, "{}", e),
            Statement::Invalid => write!(f, "<invalid>"),
        }
    }
}

/// The effect a cluster has on control flow.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Class {
    /// Execution continues with the next instruction.
    Linear,

    /// Execution either continues with the next instruction or transfers
    /// elsewhere.
    ConditionalTransfer,

    /// Execution never continues with the next instruction.
    Transfer,

    /// Execution transfers to a subroutine and is expected to return.
    Call,

    /// The instruction is not valid code, or could not be lowered.
    Invalid,
}

impl Class {
    pub fn is_linear(self) -> bool {
        self == Class::Linear
    }

    /// A one-letter tag used when printing clusters.
    pub fn tag(self) -> char {
        match self {
            Class::Linear => 'L',
            Class::ConditionalTransfer => 'C',
            Class::Transfer => 'T',
            Class::Call => 'S',
            Class::Invalid => 'I',
        }
    }
}

/// The IR produced for exactly one machine instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cluster {
    address: Pointer,
    length: usize,
    class: Class,
    statements: Vec<Statement>,
}

impl Cluster {
    pub fn new(address: Pointer, length: usize, class: Class, statements: Vec<Statement>) -> Self {
        Cluster {
            address,
            length,
            class,
            statements,
        }
    }

    pub fn address(&self) -> Pointer {
        self.address
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// The address of the instruction following this one.
    pub fn fallthrough(&self) -> Pointer {
        self.address + self.length
    }

    pub fn class(&self) -> Class {
        self.class
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Every statically known address this cluster transfers control to,
    /// in statement order.
    pub fn static_targets(&self) -> impl Iterator<Item = Pointer> + '_ {
        self.statements.iter().filter_map(|s| match s {
            Statement::Goto(target) | Statement::Call(target) => target.as_address(),
            Statement::Branch { target, .. } => Some(*target),
            _ => None,
        })
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}): {} {} statement(s)",
            self.address,
            self.length,
            self.class.tag(),
            self.statements.len()
        )?;

        for stmt in self.statements.iter() {
            write!(f, "\n    {}", stmt)?;
        }

        Ok(())
    }
}
