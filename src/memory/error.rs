//! Error type for memory access

use crate::memory::Pointer;
use std::result;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A read needed more bytes than the region holds past the cursor.
    #[error("short read at {at}: wanted {wanted} byte(s), {available} available")]
    ShortRead {
        at: Pointer,
        wanted: usize,
        available: usize,
    },

    /// The requested integer type cannot be assembled from memory units.
    #[error("cannot read a {size}-byte value at {at}")]
    Unrepresentable { at: Pointer, size: usize },

    /// The pointer does not resolve to any readable region.
    #[error("{0} does not resolve to readable memory")]
    Unmapped(Pointer),
}

pub type Result<T> = result::Result<T, Error>;
