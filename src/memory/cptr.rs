//! Linear pointers into the memory of the program under analysis.

use serde::{Serialize, Serializer};
use std::fmt;
use std::num::ParseIntError;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// An address in the memory of the program under analysis.
///
/// Pointers are linear: two pointers can be subtracted to yield a signed
/// offset, and offsets can be added back on. Architectures narrower than 64
/// bits never construct pointers outside of their own address space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pointer(u64);

impl Pointer {
    pub const fn new(pointer: u64) -> Self {
        Pointer(pointer)
    }

    /// Obtain the raw pointer value.
    pub fn as_pointer(self) -> u64 {
        self.0
    }

    /// Move the pointer by a signed offset, failing if it would leave the
    /// 64-bit address space.
    pub fn checked_offset(self, offset: i64) -> Option<Self> {
        if offset < 0 {
            self.0.checked_sub(offset.unsigned_abs()).map(Pointer)
        } else {
            self.0.checked_add(offset as u64).map(Pointer)
        }
    }

}

impl From<u64> for Pointer {
    fn from(pointer: u64) -> Self {
        Pointer(pointer)
    }
}

impl From<u16> for Pointer {
    fn from(pointer: u16) -> Self {
        Pointer(pointer as u64)
    }
}

impl From<Pointer> for u64 {
    fn from(ptr: Pointer) -> Self {
        ptr.0
    }
}

impl Add<usize> for Pointer {
    type Output = Pointer;

    fn add(self, rhs: usize) -> Self::Output {
        Pointer(self.0.wrapping_add(rhs as u64))
    }
}

impl AddAssign<usize> for Pointer {
    fn add_assign(&mut self, rhs: usize) {
        self.0 = self.0.wrapping_add(rhs as u64);
    }
}

impl Sub for Pointer {
    type Output = i64;

    fn sub(self, rhs: Self) -> Self::Output {
        self.0.wrapping_sub(rhs.0) as i64
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

impl fmt::UpperHex for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Pointers are written in hexadecimal, optionally prefixed with `0x` or `$`.
impl FromStr for Pointer {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .or_else(|| s.strip_prefix('$'))
            .unwrap_or(s);

        u64::from_str_radix(digits, 16).map(Pointer)
    }
}

derive_deserialize_from_str!(Pointer, "valid hexadecimal address");

impl Serialize for Pointer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&format_args!("0x{:04X}", self.0))
    }
}
