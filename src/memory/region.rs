//! A special-purpose type for modeling the memory map of a program.

use crate::memory::{Behavior, ByteReader, Endianness, Error, Pointer, Result};
use std::io;

/// Anything that can decide whether a pointer names a location that exists in
/// the program under analysis.
///
/// Analyses consult this before chasing a pointer they found in data or code,
/// so that garbage values do not pollute the discovery queue.
pub trait AddressOracle {
    fn is_mapped(&self, ptr: Pointer) -> bool;
}

/// Models a region of memory visible to the program under analysis.
struct Region {
    start: Pointer,
    length: usize,
    behavior: Behavior,

    /// The contents of the region, if it is backed by the program image.
    image: Option<Vec<u8>>,
}

impl Region {
    fn is_ptr_within(&self, ptr: Pointer) -> bool {
        self.start <= ptr && ((ptr - self.start) as u64) < self.length as u64
    }
}

/// The memory map of the program under analysis.
///
/// Regions are searched in the order they were installed; the first region
/// containing a pointer decides what that pointer means.
pub struct Memory {
    views: Vec<Region>,
    endianness: Endianness,
}

impl Memory {
    pub fn new(endianness: Endianness) -> Self {
        Memory {
            views: Vec::new(),
            endianness,
        }
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Install a region whose contents are known, such as ROM or a loaded
    /// executable segment.
    pub fn install_rom_image(&mut self, start: Pointer, image: Vec<u8>) {
        self.views.push(Region {
            start,
            length: image.len(),
            behavior: Behavior::Memory,
            image: Some(image),
        });
    }

    /// Install a region by reading its contents from a file.
    pub fn install_rom<F>(&mut self, start: Pointer, file: &mut F) -> io::Result<()>
    where
        F: io::Read,
    {
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        self.install_rom_image(start, data);

        Ok(())
    }

    /// Install a region that exists but whose contents are unknown.
    pub fn install_ram(&mut self, start: Pointer, length: usize) {
        self.install_mem(start, length, Behavior::Uninitialized);
    }

    pub fn install_io(&mut self, start: Pointer, length: usize) {
        self.install_mem(start, length, Behavior::MappedIO);
    }

    pub fn install_openbus(&mut self, start: Pointer, length: usize) {
        self.install_mem(start, length, Behavior::Invalid);
    }

    pub fn install_mem(&mut self, start: Pointer, length: usize, behavior: Behavior) {
        self.views.push(Region {
            start,
            length,
            behavior,
            image: None,
        });
    }

    fn region(&self, ptr: Pointer) -> Option<&Region> {
        self.views.iter().find(|view| view.is_ptr_within(ptr))
    }

    /// Determine the behavior of the memory at a given pointer.
    pub fn behavior(&self, ptr: Pointer) -> Behavior {
        self.region(ptr)
            .map(|view| view.behavior)
            .unwrap_or(Behavior::Invalid)
    }

    /// Create a reader positioned at `ptr`.
    ///
    /// The reader covers the whole region containing `ptr`, so callers may
    /// move backwards within it.
    pub fn reader_at(&self, ptr: Pointer) -> Result<ByteReader<'_>> {
        let view = self.region(ptr).ok_or(Error::Unmapped(ptr))?;
        let image = match (&view.image, view.behavior.is_readable()) {
            (Some(image), true) => image,
            _ => return Err(Error::Unmapped(ptr)),
        };

        let mut reader = ByteReader::new(image, view.start, self.endianness);
        reader.set_offset((ptr - view.start) as usize);

        Ok(reader)
    }

    /// Read a single byte of the program image.
    pub fn read_unit(&self, ptr: Pointer) -> Option<u8> {
        self.reader_at(ptr).and_then(|mut r| r.read_u8()).ok()
    }

    /// Construct a memory map with a single little-endian ROM region.
    #[cfg(test)]
    pub fn test_rom(start: u64, data: Vec<u8>) -> Self {
        let mut bus = Memory::new(Endianness::LittleEndian);
        bus.install_rom_image(Pointer::new(start), data);

        bus
    }
}

impl AddressOracle for Memory {
    fn is_mapped(&self, ptr: Pointer) -> bool {
        self.behavior(ptr).is_mapped()
    }
}
