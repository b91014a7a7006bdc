//! Implementation of core database type

use crate::analysis::{Reference, ReferenceKind};
use crate::database::ImageMap;
use crate::memory::Pointer;
use crate::types::{Signature, TypeDescriptor};
use std::collections::{BTreeMap, HashSet};

/// A procedure the scan has found, or was told about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Procedure {
    at: Pointer,
    kind: ReferenceKind,
    signature: Option<Signature>,
}

impl Procedure {
    pub fn at(&self) -> Pointer {
        self.at
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }
}

/// A global variable the scan has found, or was told about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Global {
    at: Pointer,
    ty: TypeDescriptor,
}

impl Global {
    pub fn at(&self) -> Pointer {
        self.at
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }
}

/// A repository of information obtained from the program under analysis.
#[derive(Clone, Debug, Default)]
pub struct Database {
    /// Classification of the program image.
    map: ImageMap,

    procedures: BTreeMap<Pointer, Procedure>,

    globals: BTreeMap<Pointer, Global>,

    /// A list of all cross-references in the program.
    xrefs: Vec<Reference>,

    /// A list of crossreferences sorted by source address.
    xref_source_index: BTreeMap<Pointer, HashSet<usize>>,

    /// A list of crossreferences sorted by target address.
    xref_target_index: BTreeMap<Pointer, HashSet<usize>>,
}

impl Database {
    pub fn new() -> Self {
        Database::default()
    }

    pub fn map(&self) -> &ImageMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut ImageMap {
        &mut self.map
    }

    /// Record a procedure.
    ///
    /// Entry points stay entry points, and a known signature is never
    /// replaced by an unknown one.
    pub fn insert_procedure(
        &mut self,
        at: Pointer,
        kind: ReferenceKind,
        signature: Option<Signature>,
    ) {
        let proc = self.procedures.entry(at).or_insert(Procedure {
            at,
            kind,
            signature: None,
        });

        if kind == ReferenceKind::Entrypoint {
            proc.kind = kind;
        }

        if signature.is_some() {
            proc.signature = signature;
        }
    }

    pub fn procedure(&self, at: Pointer) -> Option<&Procedure> {
        self.procedures.get(&at)
    }

    pub fn procedures(&self) -> impl Iterator<Item = &Procedure> {
        self.procedures.values()
    }

    /// Record a global; a later type for the same address replaces the
    /// earlier one.
    pub fn insert_global(&mut self, at: Pointer, ty: TypeDescriptor) {
        self.globals.insert(at, Global { at, ty });
    }

    pub fn global(&self, at: Pointer) -> Option<&Global> {
        self.globals.get(&at)
    }

    pub fn globals(&self) -> impl Iterator<Item = &Global> {
        self.globals.values()
    }

    /// Record a crossreference, unless an identical one already exists.
    pub fn insert_crossreference(&mut self, myref: Reference) {
        let id = self.xrefs.len();
        let source_bucket = self
            .xref_source_index
            .entry(myref.as_source())
            .or_insert_with(HashSet::new);

        for other_id in source_bucket.iter() {
            if let Some(other) = self.xrefs.get(*other_id) {
                if other.as_target() == myref.as_target() && other.kind() == myref.kind() {
                    return;
                }
            }
        }

        source_bucket.insert(id);
        if let Some(target) = myref.as_target() {
            self.xref_target_index
                .entry(target)
                .or_insert_with(HashSet::new)
                .insert(id);
        }

        self.xrefs.push(myref);
    }

    pub fn xref(&self, xref_id: usize) -> Option<&Reference> {
        self.xrefs.get(xref_id)
    }

    pub fn xrefs(&self) -> impl Iterator<Item = &Reference> {
        self.xrefs.iter()
    }

    /// Given a memory range, return all xref IDs originating from it.
    pub fn find_xrefs_from(
        &self,
        from_start: Pointer,
        from_length: usize,
    ) -> impl Iterator<Item = usize> + '_ {
        let from_end = from_start + from_length;

        self.xref_source_index
            .range(from_start..from_end)
            .flat_map(|(_, v)| v.iter())
            .copied()
    }

    /// Given a memory range, return all xref IDs targeting it.
    pub fn find_xrefs_to(
        &self,
        to_start: Pointer,
        to_length: usize,
    ) -> impl Iterator<Item = usize> + '_ {
        let to_end = to_start + to_length;

        self.xref_target_index
            .range(to_start..to_end)
            .flat_map(|(_, v)| v.iter())
            .copied()
    }
}
