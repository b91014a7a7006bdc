//! Project file structures

mod error;
mod program;
mod repr;

pub use error::{Error, Result};
pub use program::{Program, Region, RegionKind, UserGlobal, UserProcedure};
pub use repr::Project;

#[cfg(test)]
mod tests;
