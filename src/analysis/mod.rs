//! Tools for analysis of program code and data

mod block;
pub mod data;
mod diagnostics;
mod error;
mod reference;

pub use block::Block;
pub use data::GlobalDataInterpreter;
pub use diagnostics::{Diagnostic, DiagnosticLog, Diagnostics, LogDiagnostics, Severity};
pub use error::{Error, Result};
pub use reference::{Reference, ReferenceKind};

#[cfg(test)]
mod tests;
