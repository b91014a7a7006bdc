//! A model of program state.

use crate::ir::{BinaryOp, Cluster, Expression, Statement, Storage};
use std::collections::HashMap;

/// A word register whose halves are also addressable as byte registers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegisterPair {
    pub pair: &'static str,
    pub high: &'static str,
    pub low: &'static str,
}

/// Represents a bundle of known register values.
///
/// Registers are named by their IR identifiers. A register with no entry is
/// unknown. The only way to change state is to `apply` a cluster: assignments
/// of values computable from known registers record them, any other
/// assignment forgets the register, and calls forget everything.
///
/// Writes through a register pair or either of its halves keep the other
/// view consistent: the overlapping registers are recomputed when the new
/// value is known and forgotten otherwise.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct State {
    registers: HashMap<String, u64>,
    pairs: &'static [RegisterPair],
}

impl State {
    pub fn new() -> Self {
        State::default()
    }

    /// Declare which registers overlap.
    pub fn with_pairs(mut self, pairs: &'static [RegisterPair]) -> Self {
        self.pairs = pairs;
        self
    }

    pub fn pairs(&self) -> &'static [RegisterPair] {
        self.pairs
    }

    pub fn get_register(&self, name: &str) -> Option<u64> {
        self.registers.get(name).copied()
    }

    pub fn set_register(&mut self, name: &str, value: u64) {
        self.registers.insert(name.to_string(), value);
    }

    pub fn forget_register(&mut self, name: &str) {
        self.registers.remove(name);
    }

    pub fn clear(&mut self) {
        self.registers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Compute the value of an expression from known register state.
    ///
    /// Memory contents are never assumed, so any expression that reads memory
    /// evaluates to `None`.
    pub fn evaluate(&self, expr: &Expression) -> Option<u64> {
        match expr {
            Expression::Const { value, .. } => Some(*value),
            Expression::Addr(ptr) => Some(ptr.as_pointer()),
            Expression::Id(id) if id.storage() == Storage::Register => {
                self.get_register(id.name())
            }
            Expression::Binary {
                op,
                width,
                lhs,
                rhs,
            } => {
                let lhs = self.evaluate(lhs)?;
                let rhs = self.evaluate(rhs)?;
                let value = match op {
                    BinaryOp::Add => lhs.wrapping_add(rhs),
                    BinaryOp::Sub => lhs.wrapping_sub(rhs),
                    BinaryOp::And => lhs & rhs,
                    BinaryOp::Or => lhs | rhs,
                    BinaryOp::Xor => lhs ^ rhs,
                    _ => return None,
                };

                Some(value & width.mask())
            }
            _ => None,
        }
    }

    /// Record a register write, along with its effect on overlapping
    /// registers.
    fn assign(&mut self, name: &str, value: Option<u64>) {
        match value {
            Some(value) => self.set_register(name, value),
            None => self.forget_register(name),
        }

        for pair in self.pairs {
            if pair.pair == name {
                match value {
                    Some(value) => {
                        self.set_register(pair.high, (value >> 8) & 0xFF);
                        self.set_register(pair.low, value & 0xFF);
                    }
                    None => {
                        self.forget_register(pair.high);
                        self.forget_register(pair.low);
                    }
                }
            } else if pair.high == name || pair.low == name {
                match (self.get_register(pair.high), self.get_register(pair.low)) {
                    (Some(high), Some(low)) => self.set_register(pair.pair, (high << 8) | low),
                    _ => self.forget_register(pair.pair),
                }
            }
        }
    }

    /// Update the state with the effects of a cluster.
    pub fn apply(&mut self, cluster: &Cluster) {
        for stmt in cluster.statements() {
            match stmt {
                Statement::Assign {
                    dst: Expression::Id(id),
                    src,
                } if id.storage() == Storage::Register => {
                    let value = self.evaluate(src).map(|v| v & id.width().mask());
                    self.assign(id.name(), value);
                }
                Statement::Call(_) => self.clear(),
                _ => {}
            }
        }
    }
}
