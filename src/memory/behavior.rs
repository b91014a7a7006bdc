//! Special-purpose types for modeling memory behavior

/// Indicates the semantics of a given memory region.
///
/// The Behavior of a memory area bounds what analysises are considered
/// meaningful for a program.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Behavior {
    /// Memory behavior corresponds to regions which obey the semantics of
    /// normal memory devices with known contents (e.g. ROM, or a loaded
    /// executable segment).
    ///
    /// Reads return the contents of the program image, and execution is
    /// semantically valid.
    Memory,

    /// Uninitialized behavior corresponds to regions that exist on the bus but
    /// whose contents are not part of the program image, such as RAM.
    ///
    /// Pointers into these regions are valid, but nothing can be read out of
    /// them statically.
    Uninitialized,

    /// MappedIO behavior corresponds to regions which do not obey memory
    /// semantics. Pointers into them are valid, reads are not.
    MappedIO,

    /// Invalid behavior corresponds to regions which do not respond at all.
    /// Pointers into an invalid region are treated as dangling.
    Invalid,
}

impl Behavior {
    /// Determine if pointers into a region of this behavior name something.
    pub fn is_mapped(self) -> bool {
        !matches!(self, Behavior::Invalid)
    }

    /// Determine if the contents of a region of this behavior are known.
    pub fn is_readable(self) -> bool {
        matches!(self, Behavior::Memory)
    }
}
