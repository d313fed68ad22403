use crate::ast::FunctionDecl;
use crate::errors::{CodegenError, Result};
use crate::loops::BreakContinueStack;
use crate::module::CodeGenModule;
use crate::scope::LocalDeclMap;
use rayon::prelude::*;
use sollir_core::{
    BlockId, Constant, Function, FunctionBuilder, LocalId, ParamId, Type, Value,
};
use std::borrow::Borrow;
use tracing::{debug, trace};

/// Per-function lowering state. Statement, expression and abort lowering
/// live in their own modules as further `impl` blocks on this type.
pub struct FunctionCodegen<'m, 'f> {
    pub(crate) module: &'m CodeGenModule,
    pub(crate) builder: FunctionBuilder<'f>,
    pub(crate) locals: LocalDeclMap,
    pub(crate) loops: BreakContinueStack,
    pub(crate) exit_block: BlockId,
    pub(crate) return_slot: Option<(LocalId, Type)>,
}

impl<'m, 'f> FunctionCodegen<'m, 'f> {
    /// Sets up the exit protocol and spills parameters into local slots.
    fn start(
        module: &'m CodeGenModule,
        decl: &FunctionDecl,
        function: &'f mut Function,
    ) -> Result<Self> {
        let return_type = function.signature.returns.clone();
        let mut builder = FunctionBuilder::new(function);
        let exit_block = builder.create_block("return");

        let return_slot = match return_type {
            Some(ty) => {
                let slot = builder.add_local("retval", ty.clone());
                builder.store(slot, Value::Constant(Constant::zero(&ty)))?;
                Some((slot, ty))
            }
            None => None,
        };

        let mut cg = Self {
            module,
            builder,
            locals: LocalDeclMap::new(),
            loops: BreakContinueStack::new(),
            exit_block,
            return_slot,
        };

        for (index, param) in decl.params.iter().enumerate() {
            let ty = module.types().lower_value(&param.ty)?;
            let slot = cg.locals.declare(&mut cg.builder, param, ty)?;
            cg.builder
                .store(slot, Value::Param(ParamId(index as u32)))?;
        }

        Ok(cg)
    }

    /// Closes the graph: falls through into the exit block, emits the single
    /// return, then flags (and at `-O1` and above drops) unreachable blocks.
    fn finish(mut self) -> Result<()> {
        if !self.builder.is_terminated() {
            self.builder.jump(self.exit_block)?;
        }

        self.switch_to(self.exit_block)?;
        let value = match &self.return_slot {
            Some((slot, _)) => Some(self.builder.load(*slot)?),
            None => None,
        };
        self.builder.ret(value)?;

        let prune = self.module.options().opt_level.prunes_unreachable();
        let body = &mut self.builder.function_mut().body;
        body.move_block_to_end(self.exit_block)?;
        let unreachable = body.mark_reachability();
        if prune && unreachable > 0 {
            let removed = body.remove_unreachable_blocks();
            debug!(target: "codegen", removed = removed.len(), "pruned unreachable blocks");
        }
        body.verify()?;
        Ok(())
    }

    pub(crate) fn switch_to(&mut self, block: BlockId) -> Result<()> {
        trace!(target: "codegen", %block, "switch");
        self.builder.switch_to_block(block)?;
        Ok(())
    }

    /// Gives following code a block to land in when the current one has
    /// already been closed by a return, break, continue or revert.
    pub(crate) fn ensure_insertion_point(&mut self) -> Result<()> {
        if self.builder.is_terminated() {
            let fresh = self.builder.create_block("unreachable");
            self.switch_to(fresh)?;
        }
        Ok(())
    }

    /// Jumps to `target` unless the current block is already closed.
    pub(crate) fn jump_if_open(&mut self, target: BlockId) -> Result<()> {
        if !self.builder.is_terminated() {
            self.builder.jump(target)?;
        }
        Ok(())
    }
}

/// Lowers the body of `decl` into `function`, which must come from
/// [`CodeGenModule::declare_function`] and must not have been lowered yet.
pub fn generate(
    module: &CodeGenModule,
    decl: &FunctionDecl,
    function: &mut Function,
) -> Result<()> {
    if !function.body.is_empty() {
        return Err(CodegenError::FunctionAlreadyLowered(decl.name.clone()));
    }
    debug!(target: "codegen", function = %decl.name, params = decl.params.len(), "lowering");

    lower_body(module, decl, function).map_err(|e| e.in_function(&decl.name))?;

    debug!(
        target: "codegen",
        function = %decl.name,
        blocks = function.body.blocks.len(),
        locals = function.body.locals.len(),
        "lowered"
    );
    Ok(())
}

fn lower_body(module: &CodeGenModule, decl: &FunctionDecl, function: &mut Function) -> Result<()> {
    let mut cg = FunctionCodegen::start(module, decl, function)?;
    for stmt in &decl.body {
        cg.emit_stmt(stmt)?;
    }
    cg.finish()
}

/// Declares and lowers every function of a unit. Functions are independent,
/// so they are lowered in parallel; the result keeps declaration order and
/// the reported error is the one from the earliest failing declaration.
pub fn generate_module<D>(module: &CodeGenModule, decls: &[D]) -> Result<Vec<Function>>
where
    D: Borrow<FunctionDecl> + Sync,
{
    let lowered: Vec<Result<Function>> = decls
        .par_iter()
        .map(|decl| {
            let decl: &FunctionDecl = Borrow::borrow(decl);
            let mut function = module
                .declare_function(decl)
                .map_err(|e| e.in_function(&decl.name))?;
            generate(module, decl, &mut function)?;
            Ok(function)
        })
        .collect();
    lowered.into_iter().collect()
}
