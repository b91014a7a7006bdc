//! A set of types which allow analysis to model memory correctly.

mod behavior;
mod cptr;
mod endianness;
mod error;
mod reader;
mod region;

pub use behavior::Behavior;
pub use cptr::Pointer;
pub use endianness::{Endianness, Width};
pub use error::{Error, Result};
pub use reader::ByteReader;
pub use region::{AddressOracle, Memory};

#[cfg(test)]
mod tests;
