//! Types needed to analyze references

use crate::memory::Pointer;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    Unknown,
    Data,
    Code,
    Subroutine,

    /// A location execution starts from, named by the user.
    Entrypoint,
}

impl ReferenceKind {
    /// Determine if the target of a reference of this kind is code.
    pub fn is_code(self) -> bool {
        matches!(
            self,
            ReferenceKind::Code | ReferenceKind::Subroutine | ReferenceKind::Entrypoint
        )
    }

    /// Determine if the target of a reference of this kind starts a
    /// procedure.
    pub fn is_procedure(self) -> bool {
        matches!(self, ReferenceKind::Subroutine | ReferenceKind::Entrypoint)
    }
}

impl Display for ReferenceKind {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ReferenceKind::Unknown => write!(f, "UNK"),
            ReferenceKind::Data => write!(f, "DAT"),
            ReferenceKind::Code => write!(f, "LOC"),
            ReferenceKind::Subroutine => write!(f, "FUN"),
            ReferenceKind::Entrypoint => write!(f, "ENT"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    from: Pointer,
    to: Option<Pointer>,
    kind: ReferenceKind,
}

impl Reference {
    pub fn new_static_ref(from: Pointer, to: Pointer, kind: ReferenceKind) -> Self {
        Reference {
            from,
            to: Some(to),
            kind,
        }
    }

    pub fn new_dyn_ref(from: Pointer, kind: ReferenceKind) -> Self {
        Reference {
            from,
            to: None,
            kind,
        }
    }

    pub fn as_source(&self) -> Pointer {
        self.from
    }

    pub fn as_target(&self) -> Option<Pointer> {
        self.to
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    pub fn is_dynamic(&self) -> bool {
        self.to.is_none()
    }
}
