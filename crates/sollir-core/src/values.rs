use crate::types::Type;
use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

/// An SSA operand. Locals are not values: they live in slots and are read
/// and written through `Load`/`Store`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Temp(TempId),
    Param(ParamId),
    Constant(Constant),
}

impl Value {
    pub fn is_constant(&self) -> bool {
        matches!(self, Value::Constant(_))
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Value::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_temp(&self) -> Option<TempId> {
        match self {
            Value::Temp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn bool(value: bool) -> Self {
        Value::Constant(Constant::Bool(value))
    }

    pub fn uint(value: u64, bits: u16) -> Self {
        Value::Constant(Constant::Uint(BigUint::from(value), bits))
    }

    pub fn int(value: i64, bits: u16) -> Self {
        Value::Constant(Constant::Int(BigInt::from(value), bits))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Value::Constant(Constant::String(value.into()))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Temp(t) => write!(f, "{}", t),
            Value::Param(p) => write!(f, "{}", p),
            Value::Constant(c) => write!(f, "{}", c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TempId(pub u32);

impl std::fmt::Display for TempId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamId(pub u32);

impl std::fmt::Display for ParamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Bool(bool),
    Uint(BigUint, u16),
    Int(BigInt, u16),
    Address([u8; 20]),
    Bytes(Vec<u8>),
    String(String),
}

impl Constant {
    pub fn zero(ty: &Type) -> Self {
        match ty {
            Type::Bool => Constant::Bool(false),
            Type::Uint(bits) => Constant::Uint(BigUint::from(0u32), *bits),
            Type::Int(bits) => Constant::Int(BigInt::from(0), *bits),
            Type::Address => Constant::Address([0; 20]),
            Type::Bytes(n) => Constant::Bytes(vec![0; *n as usize]),
            Type::String => Constant::String(String::new()),
        }
    }

    pub fn one(ty: &Type) -> Option<Self> {
        match ty {
            Type::Bool => Some(Constant::Bool(true)),
            Type::Uint(bits) => Some(Constant::Uint(BigUint::from(1u32), *bits)),
            Type::Int(bits) => Some(Constant::Int(BigInt::from(1), *bits)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Constant::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Constant::Uint(val, _) => val.to_i64(),
            Constant::Int(val, _) => val.to_i64(),
            Constant::Bool(b) => Some(if *b { 1 } else { 0 }),
            _ => None,
        }
    }
}

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Uint(val, bits) => write!(f, "{}u{}", val, bits),
            Constant::Int(val, bits) => write!(f, "{}i{}", val, bits),
            Constant::Address(addr) => write!(f, "0x{}", hex::encode(addr)),
            Constant::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Constant::String(s) => write!(f, "{:?}", s),
        }
    }
}

pub(crate) mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}
