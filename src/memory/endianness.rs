//! Types to represent endianness and integer widths.

/// Indicates the byte (or memory unit) order when reading words from memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endianness {
    /// Words are stored in memory least significant byte first.
    ///
    /// This is "backwards" compared to how English writes numbers.
    LittleEndian,

    /// Words are stored in memory most significant byte first.
    ///
    /// This is the same order as how English writes numbers.
    BigEndian,
}

impl Endianness {
    /// Assemble an integer out of a run of bytes in this byte order.
    pub fn assemble(self, bytes: &[u8]) -> u64 {
        match self {
            Endianness::LittleEndian => bytes
                .iter()
                .rev()
                .fold(0, |sum, b| (sum << 8) | *b as u64),
            Endianness::BigEndian => bytes.iter().fold(0, |sum, b| (sum << 8) | *b as u64),
        }
    }
}

/// The width of a fixed-size integer as stored in memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Width {
    Byte,
    Word16,
    Word32,
    Word64,
}

impl Width {
    /// Select the width that is exactly `bytes` long.
    pub fn from_bytes(bytes: usize) -> Option<Self> {
        match bytes {
            1 => Some(Width::Byte),
            2 => Some(Width::Word16),
            4 => Some(Width::Word32),
            8 => Some(Width::Word64),
            _ => None,
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            Width::Byte => 1,
            Width::Word16 => 2,
            Width::Word32 => 4,
            Width::Word64 => 8,
        }
    }

    pub fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }

    /// A mask covering every bit of a value of this width.
    pub fn mask(self) -> u64 {
        match self {
            Width::Word64 => u64::MAX,
            _ => (1 << self.bits()) - 1,
        }
    }

    /// Interpret the low bits of `value` as a two's-complement number of this
    /// width.
    pub fn sign_extend(self, value: u64) -> i64 {
        let shift = 64 - self.bits();

        ((value << shift) as i64) >> shift
    }
}
