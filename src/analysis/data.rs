//! Interpretation of typed global data

use crate::analysis::{Diagnostics, ReferenceKind};
use crate::memory::{self, AddressOracle, ByteReader, Endianness, Pointer, Width};
use crate::queue::WorkItem;
use crate::types::TypeDescriptor;
use std::result;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The data ran past the end of its memory region.
    #[error("data is truncated: {0}")]
    ShortRead(#[from] memory::Error),

    /// The type cannot be interpreted as data.
    #[error("{at}: cannot interpret a {kind} type as data")]
    Unsupported { at: Pointer, kind: &'static str },
}

impl Error {
    /// Determine if this error indicates a mistake in the type descriptor,
    /// rather than a problem with the program image.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Unsupported { .. })
    }

    pub fn address(&self) -> Pointer {
        match self {
            Error::ShortRead(memory::Error::ShortRead { at, .. })
            | Error::ShortRead(memory::Error::Unrepresentable { at, .. })
            | Error::ShortRead(memory::Error::Unmapped(at))
            | Error::Unsupported { at, .. } => *at,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Walks a type descriptor over a program image, collecting the code and data
/// that the typed value points to.
///
/// The interpreter owns its reader; after `interpret`, the reader sits just
/// past the value.
pub struct GlobalDataInterpreter<'a, 'h> {
    rdr: ByteReader<'a>,
    oracle: &'a dyn AddressOracle,
    host: &'h dyn Diagnostics,
    pointer_width: Width,
    endianness: Endianness,
    discovered: Vec<WorkItem>,
}

impl<'a, 'h> GlobalDataInterpreter<'a, 'h> {
    pub fn new(
        rdr: ByteReader<'a>,
        oracle: &'a dyn AddressOracle,
        host: &'h dyn Diagnostics,
        pointer_width: Width,
        endianness: Endianness,
    ) -> Self {
        GlobalDataInterpreter {
            rdr,
            oracle,
            host,
            pointer_width,
            endianness,
            discovered: Vec::new(),
        }
    }

    pub fn reader(&self) -> &ByteReader<'a> {
        &self.rdr
    }

    /// Work items found so far, in the order they were found.
    pub fn discovered(&self) -> &[WorkItem] {
        &self.discovered
    }

    pub fn into_discovered(self) -> Vec<WorkItem> {
        self.discovered
    }

    /// Interpret one value of type `ty` at the reader's cursor.
    pub fn interpret(&mut self, ty: &TypeDescriptor) -> Result<()> {
        match ty {
            TypeDescriptor::Primitive { size, .. } => {
                self.rdr.read_bytes(*size)?;
            }
            TypeDescriptor::Array { length: 0, .. } => {
                self.host
                    .warn(self.rdr.address(), "arrays must have a non-zero length");
            }
            TypeDescriptor::Array { element, length } => {
                for _ in 0..*length {
                    let before = self.rdr.offset();
                    self.interpret(element)?;

                    // Elements that occupy no bytes would all land in one place.
                    if self.rdr.offset() == before {
                        break;
                    }
                }
            }
            TypeDescriptor::Struct { size, fields, .. } => {
                let base = self.rdr.offset();
                let mut furthest = base;

                for field in fields {
                    self.rdr.set_offset(base + field.offset);
                    self.interpret(&field.ty)?;

                    furthest = furthest.max(self.rdr.offset());
                }

                self.rdr.set_offset(match size {
                    Some(size) => base + size,
                    None => furthest,
                });
            }
            TypeDescriptor::Pointer(pointee) => {
                let at = self.rdr.address();
                let value = self
                    .rdr
                    .read_uint_with(self.pointer_width, self.endianness)?;
                let target = Pointer::new(value);

                if self.oracle.is_mapped(target) {
                    self.discovered.push(WorkItem::GlobalData {
                        at: target,
                        ty: (**pointee).clone(),
                        from: Some(at),
                    });
                } else {
                    self.host.warn(
                        at,
                        &format!("pointer to {} leads outside of mapped memory", target),
                    );
                }
            }
            TypeDescriptor::Function(signature) => {
                self.discovered.push(WorkItem::Procedure {
                    at: self.rdr.address(),
                    kind: ReferenceKind::Subroutine,
                    signature: Some(signature.clone()),
                    from: None,
                });
            }
            TypeDescriptor::Reference { referent, .. } => self.interpret(referent)?,
            TypeDescriptor::Unknown | TypeDescriptor::Void => {}
            unsupported => {
                return Err(Error::Unsupported {
                    at: self.rdr.address(),
                    kind: unsupported.kind(),
                })
            }
        }

        Ok(())
    }
}
