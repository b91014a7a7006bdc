//! Error type for analysis

use crate::analysis::data;
use crate::memory::Pointer;
use std::result;
use thiserror::Error;

/// Reasons a single work item could not be fully processed.
///
/// None of these stop a scan; they are reported and the scan moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The program image ended partway through an instruction.
    #[error("{at}: ran out of bytes partway through an instruction")]
    Incomplete { at: Pointer },

    /// The bytes at this location are not a valid instruction.
    #[error("{at}: invalid instruction")]
    InvalidInstruction { at: Pointer },

    /// The instruction decoded, but could not be lowered.
    #[error("{at}: `{mnemonic}` is not implemented")]
    NotImplemented { at: Pointer, mnemonic: &'static str },

    /// The location has no readable contents.
    #[error("{at}: not readable memory")]
    Unmapped { at: Pointer },

    /// A new item would overlap one that was already discovered.
    #[error("{at}: overlaps the item at {existing}")]
    Overlap { at: Pointer, existing: Pointer },

    /// A reference leads somewhere that cannot be the start of an item, such
    /// as the middle of an instruction.
    #[error("{at}: {reason}")]
    Inconsistent { at: Pointer, reason: String },

    #[error(transparent)]
    Data(#[from] data::Error),
}

impl Error {
    /// The address the error was detected at.
    pub fn address(&self) -> Pointer {
        match self {
            Error::Incomplete { at }
            | Error::InvalidInstruction { at }
            | Error::NotImplemented { at, .. }
            | Error::Unmapped { at }
            | Error::Overlap { at, .. }
            | Error::Inconsistent { at, .. } => *at,
            Error::Data(e) => e.address(),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
