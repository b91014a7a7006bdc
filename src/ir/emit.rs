//! Statement emitter

use crate::ir::{Expression, Statement};
use crate::memory::Pointer;

/// Collects the statements lowered for a single instruction.
#[derive(Default, Debug)]
pub struct Emitter {
    statements: Vec<Statement>,
}

impl Emitter {
    pub fn new() -> Self {
        Emitter::default()
    }

    pub fn emit(&mut self, stmt: Statement) {
        self.statements.push(stmt);
    }

    pub fn nop(&mut self) {
        self.emit(Statement::Nop);
    }

    pub fn assign(&mut self, dst: Expression, src: Expression) {
        self.emit(Statement::Assign { dst, src });
    }

    pub fn goto(&mut self, target: Expression) {
        self.emit(Statement::Goto(target));
    }

    pub fn branch(&mut self, condition: Expression, target: Pointer) {
        self.emit(Statement::Branch { condition, target });
    }

    pub fn call(&mut self, target: Expression) {
        self.emit(Statement::Call(target));
    }

    pub fn ret(&mut self) {
        self.emit(Statement::Return);
    }

    pub fn side_effect(&mut self, e: Expression) {
        self.emit(Statement::SideEffect(e));
    }

    pub fn invalid(&mut self) {
        self.emit(Statement::Invalid);
    }

    /// Move every statement of `other` onto the end of this emitter.
    pub fn append(&mut self, mut other: Emitter) {
        self.statements.append(&mut other.statements);
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }
}
