use crate::ast::{DeclId, VarDecl};
use crate::errors::{CodegenError, Result};
use sollir_core::{FunctionBuilder, LocalId, Type};
use std::collections::HashMap;

/// Declaration identity to storage slot. Keyed by [`DeclId`], never by name,
/// so shadowing and reuse of a name in sibling scopes need no special care.
#[derive(Debug, Default)]
pub struct LocalDeclMap {
    slots: HashMap<DeclId, LocalId>,
}

impl LocalDeclMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh slot for `var` in the function being built.
    pub fn declare(
        &mut self,
        builder: &mut FunctionBuilder<'_>,
        var: &VarDecl,
        ty: Type,
    ) -> Result<LocalId> {
        if self.slots.contains_key(&var.id) {
            return Err(CodegenError::DuplicateDeclaration {
                id: var.id,
                name: var.name.clone(),
            });
        }
        let slot = builder.add_local(&var.name, ty);
        self.slots.insert(var.id, slot);
        Ok(slot)
    }

    pub fn resolve(&self, id: DeclId) -> Result<LocalId> {
        self.slots
            .get(&id)
            .copied()
            .ok_or(CodegenError::UnboundVariable(id))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TypeName;
    use sollir_core::{Function, FunctionSignature};

    #[test]
    fn same_name_distinct_identity_gets_distinct_slots() {
        let mut function = Function::new(FunctionSignature::new("f"));
        let mut builder = FunctionBuilder::new(&mut function);
        let mut map = LocalDeclMap::new();

        let first = VarDecl::new(1, "x", TypeName::Uint(256));
        let second = VarDecl::new(2, "x", TypeName::Uint(256));
        let a = map.declare(&mut builder, &first, Type::Uint(256)).unwrap();
        let b = map.declare(&mut builder, &second, Type::Uint(256)).unwrap();

        assert_ne!(a, b);
        assert_eq!(map.resolve(first.id), Ok(a));
        assert_eq!(map.resolve(second.id), Ok(b));
        assert_eq!(function.body.locals.len(), 2);
    }

    #[test]
    fn redeclaration_and_unbound_use_fail() {
        let mut function = Function::new(FunctionSignature::new("f"));
        let mut builder = FunctionBuilder::new(&mut function);
        let mut map = LocalDeclMap::new();
        let x = VarDecl::new(7, "x", TypeName::Bool);

        map.declare(&mut builder, &x, Type::Bool).unwrap();
        assert!(matches!(
            map.declare(&mut builder, &x, Type::Bool),
            Err(CodegenError::DuplicateDeclaration { .. })
        ));
        assert_eq!(
            map.resolve(DeclId(8)),
            Err(CodegenError::UnboundVariable(DeclId(8)))
        );
    }
}
