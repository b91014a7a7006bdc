//! Descriptions of the data types stored in a program image.
//!
//! Type descriptors are supplied by the user (through the project file) or by
//! whatever pass discovered them. The scanner only reads them.

use crate::memory::Width;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The interpretation of a primitive value's bits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Raw bits of no particular meaning.
    Bits,
    Signed,
    Unsigned,
    Boolean,
    Character,
    Real,
}

/// A field within a structure.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,

    /// The offset of this field from the start of its structure.
    ///
    /// Fields do not have to be listed in offset order, and may leave gaps.
    pub offset: usize,

    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

/// The signature of a procedure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub ret: Option<Box<TypeDescriptor>>,

    #[serde(default)]
    pub params: Vec<TypeDescriptor>,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn(")?;

        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }

            write!(f, "{}", param)?;
        }

        write!(f, ")")?;

        if let Some(ret) = &self.ret {
            write!(f, " -> {}", ret)?;
        }

        Ok(())
    }
}

/// A recursive description of a data type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescriptor {
    Primitive {
        domain: Domain,
        size: usize,
    },
    Pointer(Box<TypeDescriptor>),
    Array {
        element: Box<TypeDescriptor>,
        length: usize,
    },
    Struct {
        name: String,

        /// The size of the structure, if it is longer than its fields.
        #[serde(default)]
        size: Option<usize>,
        fields: Vec<Field>,
    },
    Function(Signature),

    /// A named alias of another type.
    Reference {
        name: String,
        referent: Box<TypeDescriptor>,
    },
    Unknown,
    Void,
    Class(String),
    Enum(String),
    Union(String),
    String,
    Code,
    MemberPointer,
    TypeVariable(String),
}

impl TypeDescriptor {
    pub fn byte() -> Self {
        TypeDescriptor::Primitive {
            domain: Domain::Unsigned,
            size: 1,
        }
    }

    pub fn word() -> Self {
        TypeDescriptor::Primitive {
            domain: Domain::Unsigned,
            size: 2,
        }
    }

    pub fn pointer_to(pointee: TypeDescriptor) -> Self {
        TypeDescriptor::Pointer(Box::new(pointee))
    }

    pub fn array_of(element: TypeDescriptor, length: usize) -> Self {
        TypeDescriptor::Array {
            element: Box::new(element),
            length,
        }
    }

    /// A short name for the kind of type this is.
    pub fn kind(&self) -> &'static str {
        match self {
            TypeDescriptor::Primitive { .. } => "primitive",
            TypeDescriptor::Pointer(_) => "pointer",
            TypeDescriptor::Array { .. } => "array",
            TypeDescriptor::Struct { .. } => "struct",
            TypeDescriptor::Function(_) => "function",
            TypeDescriptor::Reference { .. } => "reference",
            TypeDescriptor::Unknown => "unknown",
            TypeDescriptor::Void => "void",
            TypeDescriptor::Class(_) => "class",
            TypeDescriptor::Enum(_) => "enum",
            TypeDescriptor::Union(_) => "union",
            TypeDescriptor::String => "string",
            TypeDescriptor::Code => "code",
            TypeDescriptor::MemberPointer => "member pointer",
            TypeDescriptor::TypeVariable(_) => "type variable",
        }
    }

    /// The number of bytes a value of this type occupies in memory.
    ///
    /// Yields `None` for types with no fixed in-memory size, including code.
    pub fn size_of(&self, pointer_width: Width) -> Option<usize> {
        match self {
            TypeDescriptor::Primitive { size, .. } => Some(*size),
            TypeDescriptor::Pointer(_) => Some(pointer_width.bytes()),
            TypeDescriptor::Array { element, length } => {
                element.size_of(pointer_width)?.checked_mul(*length)
            }
            TypeDescriptor::Struct {
                size: Some(size), ..
            } => Some(*size),
            TypeDescriptor::Struct { fields, .. } => {
                fields.iter().try_fold(0, |end, field| {
                    let field_end = field.offset.checked_add(field.ty.size_of(pointer_width)?)?;

                    Some(end.max(field_end))
                })
            }
            TypeDescriptor::Reference { referent, .. } => referent.size_of(pointer_width),
            TypeDescriptor::Void => Some(0),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Primitive { domain, size } => {
                let prefix = match domain {
                    Domain::Bits => "b",
                    Domain::Signed => "i",
                    Domain::Unsigned => "u",
                    Domain::Boolean => "bool",
                    Domain::Character => "char",
                    Domain::Real => "f",
                };

                write!(f, "{}{}", prefix, size * 8)
            }
            TypeDescriptor::Pointer(pointee) => write!(f, "*{}", pointee),
            TypeDescriptor::Array { element, length } => write!(f, "{}[{}]", element, length),
            TypeDescriptor::Struct { name, .. } => write!(f, "struct {}", name),
            TypeDescriptor::Function(sig) => write!(f, "{}", sig),
            TypeDescriptor::Reference { name, .. } => write!(f, "{}", name),
            TypeDescriptor::Class(name)
            | TypeDescriptor::Enum(name)
            | TypeDescriptor::Union(name)
            | TypeDescriptor::TypeVariable(name) => write!(f, "{} {}", self.kind(), name),
            _ => write!(f, "{}", self.kind()),
        }
    }
}
