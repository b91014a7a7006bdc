//! The image map: which ranges of the program are code, and which are data

use crate::analysis::{Block, Error, Result};
use crate::memory::Pointer;
use crate::types::TypeDescriptor;
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

/// A range of memory known to hold a typed value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataItem {
    start: Pointer,
    length: usize,
    ty: TypeDescriptor,
}

impl DataItem {
    pub fn new(start: Pointer, length: usize, ty: TypeDescriptor) -> Self {
        DataItem { start, length, ty }
    }

    pub fn start(&self) -> Pointer {
        self.start
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }
}

/// One classified range of the image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    Code(Block),
    Data(DataItem),
}

impl Item {
    pub fn start(&self) -> Pointer {
        match self {
            Item::Code(block) => block.start(),
            Item::Data(data) => data.start(),
        }
    }

    pub fn length(&self) -> usize {
        match self {
            Item::Code(block) => block.length(),
            Item::Data(data) => data.length(),
        }
    }

    pub fn end(&self) -> Pointer {
        self.start() + self.length()
    }

    pub fn is_ptr_within(&self, ptr: Pointer) -> bool {
        self.start() <= ptr && ((ptr - self.start()) as u64) < self.length() as u64
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Item::Code(block) => Some(block),
            Item::Data(_) => None,
        }
    }

    pub fn as_data(&self) -> Option<&DataItem> {
        match self {
            Item::Code(_) => None,
            Item::Data(data) => Some(data),
        }
    }
}

/// What a code reference lands on, once the map has been consulted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Landing {
    /// Nothing has claimed the address yet.
    Free,

    /// The address already starts a block.
    BlockStart,

    /// The address was an instruction boundary in the middle of a block,
    /// which has now been split in two.
    Split,
}

/// Ordered, non-overlapping code blocks and data items, keyed by start.
///
/// Empty items are never stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageMap {
    items: BTreeMap<Pointer, Item>,
}

impl ImageMap {
    pub fn new() -> Self {
        ImageMap::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.items.values().filter_map(Item::as_block)
    }

    pub fn data_items(&self) -> impl Iterator<Item = &DataItem> {
        self.items.values().filter_map(Item::as_data)
    }

    /// Find the item that contains `ptr`.
    pub fn item_at(&self, ptr: Pointer) -> Option<&Item> {
        self.items
            .range(..=ptr)
            .next_back()
            .map(|(_, item)| item)
            .filter(|item| item.is_ptr_within(ptr))
    }

    /// The start of the first item strictly after `ptr`.
    pub fn next_item_start(&self, ptr: Pointer) -> Option<Pointer> {
        self.items
            .range((Excluded(ptr), Unbounded))
            .next()
            .map(|(start, _)| *start)
    }

    /// Determine if no item touches any byte of the given range.
    pub fn is_free(&self, start: Pointer, length: usize) -> bool {
        if self.item_at(start).is_some() {
            return false;
        }

        match self.next_item_start(start) {
            Some(next) => ((next - start) as u64) >= length as u64,
            None => true,
        }
    }

    fn check_free(&self, start: Pointer, length: usize) -> Result<()> {
        if let Some(item) = self.item_at(start) {
            return Err(Error::Overlap {
                at: start,
                existing: item.start(),
            });
        }

        match self.next_item_start(start) {
            Some(next) if ((next - start) as u64) < length as u64 => Err(Error::Overlap {
                at: start,
                existing: next,
            }),
            _ => Ok(()),
        }
    }

    pub fn insert_block(&mut self, block: Block) -> Result<()> {
        if block.is_empty() {
            return Ok(());
        }

        self.check_free(block.start(), block.length())?;
        self.items.insert(block.start(), Item::Code(block));

        Ok(())
    }

    pub fn insert_data(&mut self, data: DataItem) -> Result<()> {
        if data.length() == 0 {
            return Ok(());
        }

        self.check_free(data.start(), data.length())?;
        self.items.insert(data.start(), Item::Data(data));

        Ok(())
    }

    /// Split the block containing `ptr` so that a new block starts there.
    ///
    /// Yields `false` if there is no block to split, or `ptr` is already the
    /// start of one. Pointers into data, or into the middle of an
    /// instruction, are inconsistent and cannot be split.
    pub fn split_block(&mut self, ptr: Pointer) -> Result<bool> {
        let start = match self.item_at(ptr) {
            None => return Ok(false),
            Some(Item::Data(data)) => {
                return Err(Error::Inconsistent {
                    at: ptr,
                    reason: format!("code reference into data at {}", data.start()),
                })
            }
            Some(Item::Code(block)) if block.start() == ptr => return Ok(false),
            Some(Item::Code(block)) if !block.is_instruction_start(ptr) => {
                return Err(Error::Inconsistent {
                    at: ptr,
                    reason: format!(
                        "code reference into the middle of an instruction in block {}",
                        block.start()
                    ),
                })
            }
            Some(item) => item.start(),
        };

        let upper = match self.items.get_mut(&start) {
            Some(Item::Code(block)) => block.split_block((ptr - start) as usize),
            _ => None,
        };

        match upper {
            Some(upper) => {
                self.items.insert(ptr, Item::Code(upper));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Classify a code reference to `ptr`, splitting a block if it lands on
    /// one of its inner instruction boundaries.
    pub fn land_code(&mut self, ptr: Pointer) -> Result<Landing> {
        match self.item_at(ptr) {
            None => Ok(Landing::Free),
            Some(item) if item.start() == ptr && item.as_block().is_some() => {
                Ok(Landing::BlockStart)
            }
            Some(_) => {
                if self.split_block(ptr)? {
                    Ok(Landing::Split)
                } else {
                    Err(Error::Inconsistent {
                        at: ptr,
                        reason: "code reference into data".to_string(),
                    })
                }
            }
        }
    }
}
