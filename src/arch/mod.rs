//! Implementations of processor architectures that can be scanned.
//!
//! Each architecture is implemented as a child module to this one, and
//! provides a zero-sized type implementing `Architecture`. That type decodes
//! instructions from a `ByteReader` and lowers them into IR clusters; the
//! scanner and the CLI are generic over it.
//!
//! To add an architecture, give it a variant in `ArchName` and an arm in the
//! `with_architecture!` macro.

#[macro_use]
mod macros;

mod disassembler;
mod traits;

pub mod tlcs90;

pub use disassembler::Disassembler;
pub use traits::{Architecture, MachineInstruction};

use serde::Serialize;
use std::{fmt, str};

/// Enumeration of all architectures that ship with the scanner.
#[derive(Copy, Clone, Serialize, Debug, PartialEq, Eq)]
pub enum ArchName {
    Tlcs90,
}

impl str::FromStr for ArchName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "tlcs90" => Ok(ArchName::Tlcs90),
            "tlcs-90" => Ok(ArchName::Tlcs90),
            "tmp90" => Ok(ArchName::Tlcs90),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ArchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchName::Tlcs90 => write!(f, "tlcs90"),
        }
    }
}

derive_deserialize_from_str!(ArchName, "valid architecture name");
