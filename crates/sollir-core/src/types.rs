use serde::{Deserialize, Serialize};
use std::fmt;

/// Target-side representation of a value type.
///
/// Only value types reach the function-body generator: reference types are
/// laid out by the module component and appear here as `String` handles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Bool,
    Uint(u16),
    Int(u16),
    Address,
    Bytes(u8),
    String,
}

impl Type {
    pub fn size_bytes(&self) -> usize {
        match self {
            Type::Bool => 1,
            Type::Uint(bits) | Type::Int(bits) => (*bits as usize + 7) / 8,
            Type::Address => 20,
            Type::Bytes(n) => *n as usize,
            Type::String => 32,
        }
    }

    pub fn bits(&self) -> Option<u16> {
        match self {
            Type::Bool => Some(1),
            Type::Uint(bits) | Type::Int(bits) => Some(*bits),
            Type::Address => Some(160),
            Type::Bytes(n) => Some(*n as u16 * 8),
            Type::String => None,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Type::Int(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Uint(_) | Type::Int(_))
    }

    pub fn is_value_type(&self) -> bool {
        !matches!(self, Type::String)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Uint(bits) => write!(f, "uint{}", bits),
            Type::Int(bits) => write!(f, "int{}", bits),
            Type::Address => write!(f, "address"),
            Type::Bytes(n) => write!(f, "bytes{}", n),
            Type::String => write!(f, "string"),
        }
    }
}
