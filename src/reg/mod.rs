//! Types which model architectural register state.

mod state;

pub use state::{RegisterPair, State};

#[cfg(test)]
mod tests;
