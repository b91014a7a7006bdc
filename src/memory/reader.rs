//! Cursor type for reading program images

use crate::memory::{Endianness, Error, Pointer, Result, Width};
use num_traits::FromPrimitive;

/// A cursor over the contents of a single memory region.
///
/// The reader tracks both the architectural pointer of the cursor and its
/// linear offset into the region. Reads never cross the end of the region:
/// a read that would is reported as `Error::ShortRead` and leaves the cursor
/// where it was.
///
/// Readers are cheap to clone, and every work item that reads memory owns its
/// own copy.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    base: Pointer,
    offset: usize,
    endianness: Endianness,
}

impl<'a> ByteReader<'a> {
    /// Create a reader over `data`, which is mapped starting at `base`.
    pub fn new(data: &'a [u8], base: Pointer, endianness: Endianness) -> Self {
        ByteReader {
            data,
            base,
            offset: 0,
            endianness,
        }
    }

    /// The pointer the next read will start from.
    pub fn address(&self) -> Pointer {
        self.base + self.offset
    }

    /// The pointer at the start of the region this reader walks.
    pub fn base(&self) -> Pointer {
        self.base
    }

    /// The linear offset of the cursor from the start of the region.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Reposition the cursor.
    ///
    /// Offsets past the end of the region are permitted; subsequent reads
    /// will simply fail.
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// How many bytes remain between the cursor and the end of the region.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Read a run of raw bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self
            .data
            .get(self.offset..self.offset.saturating_add(count))
            .ok_or(Error::ShortRead {
                at: self.address(),
                wanted: count,
                available: self.remaining(),
            })?;
        self.offset += count;

        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read an unsigned integer of the given width in the reader's byte order.
    pub fn read_uint(&mut self, width: Width) -> Result<u64> {
        let endianness = self.endianness;
        self.read_uint_with(width, endianness)
    }

    /// Read an unsigned integer of the given width in a specific byte order.
    pub fn read_uint_with(&mut self, width: Width, endianness: Endianness) -> Result<u64> {
        let bytes = self.read_bytes(width.bytes())?;

        Ok(endianness.assemble(bytes))
    }

    /// Read a little-endian integer of any primitive type.
    pub fn read_le<T>(&mut self) -> Result<T>
    where
        T: FromPrimitive,
    {
        self.read_primitive(Endianness::LittleEndian)
    }

    fn read_primitive<T>(&mut self, endianness: Endianness) -> Result<T>
    where
        T: FromPrimitive,
    {
        let at = self.address();
        let size = std::mem::size_of::<T>();
        let width = Width::from_bytes(size).ok_or(Error::Unrepresentable { at, size })?;
        let value = self.read_uint_with(width, endianness)?;

        // Signed types reject values above their maximum, so reinterpret those.
        T::from_u64(value)
            .or_else(|| T::from_i64(width.sign_extend(value)))
            .ok_or(Error::Unrepresentable { at, size })
    }
}
