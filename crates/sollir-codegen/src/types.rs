use crate::ast::TypeName;
use crate::errors::{CodegenError, Result};
use sollir_core::Type;
use std::collections::HashMap;

/// Source type to IR type mapping, filled once for every elementary type
/// the language accepts. Lookups never mutate, so one cache is shared by all
/// functions of a module.
#[derive(Debug, Clone)]
pub struct TypeCache {
    lowered: HashMap<TypeName, Type>,
}

impl TypeCache {
    pub fn new() -> Self {
        let mut lowered = HashMap::new();
        lowered.insert(TypeName::Bool, Type::Bool);
        lowered.insert(TypeName::Address, Type::Address);
        lowered.insert(TypeName::String, Type::String);

        for bits in (8..=256).step_by(8) {
            lowered.insert(TypeName::Uint(bits), Type::Uint(bits));
            lowered.insert(TypeName::Int(bits), Type::Int(bits));
        }
        for n in 1..=32u8 {
            lowered.insert(TypeName::FixedBytes(n), Type::Bytes(n));
        }

        Self { lowered }
    }

    /// `Ok(None)` for the unit type, which has no runtime representation.
    pub fn lower(&self, ty: &TypeName) -> Result<Option<Type>> {
        if *ty == TypeName::Unit {
            return Ok(None);
        }
        self.lowered
            .get(ty)
            .cloned()
            .map(Some)
            .ok_or_else(|| CodegenError::UnsupportedType(ty.to_string()))
    }

    /// Like [`lower`](Self::lower) for positions that must hold a value.
    pub fn lower_value(&self, ty: &TypeName) -> Result<Type> {
        self.lower(ty)?
            .ok_or_else(|| CodegenError::NoValue(ty.to_string()))
    }
}

impl Default for TypeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elementary_types_lower() {
        let cache = TypeCache::new();
        assert_eq!(cache.lower(&TypeName::Uint(64)), Ok(Some(Type::Uint(64))));
        assert_eq!(cache.lower(&TypeName::FixedBytes(4)), Ok(Some(Type::Bytes(4))));
        assert_eq!(cache.lower(&TypeName::Unit), Ok(None));
    }

    #[test]
    fn odd_widths_are_rejected() {
        let cache = TypeCache::new();
        assert_eq!(
            cache.lower(&TypeName::Uint(7)),
            Err(CodegenError::UnsupportedType("uint7".to_string()))
        );
        assert!(cache.lower(&TypeName::FixedBytes(33)).is_err());
        assert_eq!(
            cache.lower_value(&TypeName::Unit),
            Err(CodegenError::NoValue("()".to_string()))
        );
    }
}
