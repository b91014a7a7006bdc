//! Queue command type

use crate::analysis::ReferenceKind;
use crate::memory::Pointer;
use crate::types::{Signature, TypeDescriptor};

/// A unit of discovery work for the scanner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkItem {
    /// Decode code starting at `at`.
    Procedure {
        at: Pointer,

        /// How the code was reached; subroutines and entry points are
        /// recorded as procedures.
        kind: ReferenceKind,
        signature: Option<Signature>,

        /// The instruction or data that referred to this code, if any.
        from: Option<Pointer>,
    },

    /// Interpret memory at `at` as a value of type `ty`.
    GlobalData {
        at: Pointer,
        ty: TypeDescriptor,
        from: Option<Pointer>,
    },
}

impl WorkItem {
    pub fn at(&self) -> Pointer {
        match self {
            WorkItem::Procedure { at, .. } | WorkItem::GlobalData { at, .. } => *at,
        }
    }

    pub fn from(&self) -> Option<Pointer> {
        match self {
            WorkItem::Procedure { from, .. } | WorkItem::GlobalData { from, .. } => *from,
        }
    }

    /// The kind of reference that discovered this item.
    pub fn kind(&self) -> ReferenceKind {
        match self {
            WorkItem::Procedure { kind, .. } => *kind,
            WorkItem::GlobalData { .. } => ReferenceKind::Data,
        }
    }

    pub fn key(&self) -> WorkKey {
        match self {
            WorkItem::Procedure { at, .. } => WorkKey::Code(*at),
            WorkItem::GlobalData { at, ty, .. } => WorkKey::Data(*at, ty.clone()),
        }
    }
}

/// Identifies work items that would do the same work.
///
/// Code is decoded the same way no matter how it was reached, so code keys
/// carry only the address.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WorkKey {
    Code(Pointer),
    Data(Pointer, TypeDescriptor),
}

/// Where a work item is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Unvisited,
    Queued,
    Processed,
}
