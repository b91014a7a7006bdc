//! Storage for the identifiers a procedure's IR refers to.

use crate::ir::{Identifier, Storage};
use crate::memory::Width;
use std::collections::HashMap;

/// The set of registers, flag groups, and temporaries referenced by IR.
///
/// Identifiers are interned by name, so asking for the same register twice
/// yields equal identifiers.
#[derive(Default, Debug)]
pub struct Frame {
    identifiers: Vec<Identifier>,
    by_name: HashMap<String, usize>,
    temporaries: usize,
}

impl Frame {
    pub fn new() -> Self {
        Frame::default()
    }

    fn ensure(&mut self, name: &str, width: Width, storage: Storage) -> Identifier {
        if let Some(index) = self.by_name.get(name) {
            return self.identifiers[*index].clone();
        }

        let id = Identifier::new(name, width, storage);

        self.by_name.insert(name.to_string(), self.identifiers.len());
        self.identifiers.push(id.clone());

        id
    }

    pub fn ensure_register(&mut self, name: &str, width: Width) -> Identifier {
        self.ensure(name, width, Storage::Register)
    }

    /// Obtain the identifier for a group of flags, named by concatenating the
    /// names of its members (e.g. `SZHVC`).
    pub fn ensure_flags(&mut self, group: &str) -> Identifier {
        self.ensure(group, Width::Byte, Storage::Flags)
    }

    pub fn create_temporary(&mut self, width: Width) -> Identifier {
        self.temporaries += 1;

        let name = format!("v{}", self.temporaries);

        self.ensure(&name, width, Storage::Temporary)
    }

    pub fn identifier(&self, name: &str) -> Option<&Identifier> {
        self.by_name.get(name).map(|i| &self.identifiers[*i])
    }

    pub fn iter_identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.identifiers.iter()
    }
}
