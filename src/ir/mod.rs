//! A low-level intermediate representation of machine code.
//!
//! Every decoded instruction is lowered into exactly one `Cluster`: a short
//! list of `Statement`s tagged with the instruction's effect on control flow.
//! Instructions that cannot be lowered still produce a cluster, of class
//! `Invalid`, so consumers never lose track of instruction boundaries.

mod emit;
mod expr;
mod frame;
mod rewriter;
mod stmt;

pub use emit::Emitter;
pub use expr::{BinaryOp, Expression, Identifier, Storage, UnaryOp};
pub use frame::Frame;
pub use rewriter::Rewriter;
pub use stmt::{Class, Cluster, Statement};
