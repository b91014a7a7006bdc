//! Analysis sections (e.g. blocks)

use crate::memory::Pointer;
use std::collections::BTreeSet;

/// Represents a sequence of instructions with the following properties:
///
/// 1. The sequence of instructions are executed in sequence.
/// 2. Control flow does not diverge within the block.
/// 3. At the end of a block, execution diverges to zero or more other
///    locations, one of which may be the next instruction in sequence.
///
/// Effectively, it is a run of instructions with no jumps.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Block {
    /// The start pointer of the block.
    start: Pointer,

    /// The offset to the end of the block.
    length: usize,

    /// A list of offsets known to be the start of instructions within the
    /// block.
    ///
    /// Offsets beyond the length of the block are never kept.
    instr_offsets: BTreeSet<usize>,
}

impl Block {
    pub fn from_parts(start: Pointer, length: usize) -> Self {
        Block {
            start,
            length,
            instr_offsets: BTreeSet::new(),
        }
    }

    pub fn start(&self) -> Pointer {
        self.start
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// The pointer just past the end of the block.
    pub fn end(&self) -> Pointer {
        self.start + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn is_ptr_within_block(&self, ptr: Pointer) -> bool {
        self.start <= ptr && ((ptr - self.start) as u64) < self.length as u64
    }

    /// Determine if an instruction starts exactly at `ptr`.
    pub fn is_instruction_start(&self, ptr: Pointer) -> bool {
        self.is_ptr_within_block(ptr) && self.instr_offsets.contains(&((ptr - self.start) as usize))
    }

    /// Given a pointer, return the instruction it may be part of.
    pub fn align_to_instruction(&self, ptr: Pointer) -> Option<Pointer> {
        if !self.is_ptr_within_block(ptr) {
            return None;
        }

        let block_offset = (ptr - self.start) as usize;

        self.instr_offsets
            .range(..=block_offset)
            .next_back()
            .map(|offset| self.start + *offset)
    }

    /// Append an instruction of `length` bytes to the end of the block.
    pub fn push_instruction(&mut self, length: usize) {
        self.instr_offsets.insert(self.length);
        self.length += length;
    }

    /// Mark an instruction at a given address.
    ///
    /// If the given pointer is outside the bounds of the block, it will not be
    /// added to this block.
    pub fn mark_instr_at(&mut self, instr_ptr: Pointer) {
        if self.is_ptr_within_block(instr_ptr) {
            self.instr_offsets
                .insert((instr_ptr - self.start) as usize);
        }
    }

    /// Iterate the list of instruction offsets within this block.
    pub fn instr_offsets(&self) -> impl '_ + Iterator<Item = usize> {
        self.instr_offsets.iter().copied()
    }

    /// Iterate the addresses of every instruction within this block.
    pub fn instructions(&self) -> impl '_ + Iterator<Item = Pointer> {
        let start = self.start;

        self.instr_offsets.iter().map(move |o| start + *o)
    }

    /// Reduce the length of this block, and produce a new block with a smaller
    /// size.
    ///
    /// The lower half of the block will be this block, modified inline. The
    /// upper half will be returned. This function yields `None` if the new
    /// size requested is not shorter than the current block, and no change
    /// occurs.
    pub fn split_block(&mut self, new_size: usize) -> Option<Self> {
        if new_size >= self.length {
            return None;
        }

        let mut new_block = Block::from_parts(self.start + new_size, self.length - new_size);
        new_block.instr_offsets = self
            .instr_offsets
            .iter()
            .filter_map(|o| o.checked_sub(new_size))
            .collect();

        self.truncate(new_size);

        Some(new_block)
    }

    /// Shorten the block, discarding any instructions past the new end.
    pub fn truncate(&mut self, new_size: usize) {
        if new_size < self.length {
            self.length = new_size;
            self.instr_offsets = self
                .instr_offsets
                .iter()
                .copied()
                .filter(|o| *o < new_size)
                .collect();
        }
    }
}
