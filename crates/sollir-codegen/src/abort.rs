/*!
Lowering of the abort builtins.

`require(cond[, message])` reverts with the optional message, `assert(cond)`
raises a panic and `revert([message])` reverts unconditionally. The checks
split the current block: the continuation is where lowering carries on, the
failure block ends in the abort terminator.
*/

use crate::ast::Expr;
use crate::errors::{CodegenError, Result};
use crate::function::FunctionCodegen;
use tracing::trace;

impl FunctionCodegen<'_, '_> {
    pub(crate) fn emit_call_require(&mut self, args: &[Expr]) -> Result<()> {
        let (cond, message) = match args {
            [cond] => (cond, None),
            [cond, message] => (cond, Some(message)),
            _ => return Err(arity("require", "1 or 2", args.len())),
        };

        let cont_bb = self.builder.create_block("require.cont");
        let fail_bb = self.builder.create_block("require.fail");
        self.emit_branch_on_bool_expr(cond, cont_bb, fail_bb)?;

        // The message is only evaluated on the failing path.
        self.switch_to(fail_bb)?;
        let reason = match message {
            Some(m) => Some(self.emit_rvalue(m)?),
            None => None,
        };
        if !self.builder.is_terminated() {
            self.builder.revert(reason)?;
        }

        trace!(target: "codegen", cont = %cont_bb, fail = %fail_bb, "require");
        self.switch_to(cont_bb)
    }

    pub(crate) fn emit_call_assert(&mut self, args: &[Expr]) -> Result<()> {
        let cond = match args {
            [cond] => cond,
            _ => return Err(arity("assert", "1", args.len())),
        };

        let cont_bb = self.builder.create_block("assert.cont");
        let fail_bb = self.builder.create_block("assert.fail");
        self.emit_branch_on_bool_expr(cond, cont_bb, fail_bb)?;

        self.switch_to(fail_bb)?;
        self.builder.panic()?;

        self.switch_to(cont_bb)
    }

    /// Unconditional revert. Code after it lands in a fresh block that
    /// nothing jumps to.
    pub(crate) fn emit_call_revert(&mut self, args: &[Expr]) -> Result<()> {
        let reason = match args {
            [] => None,
            [message] => Some(self.emit_rvalue(message)?),
            _ => return Err(arity("revert", "0 or 1", args.len())),
        };
        if !self.builder.is_terminated() {
            self.builder.revert(reason)?;
        }

        let dead = self.builder.create_block("unreachable");
        self.switch_to(dead)
    }
}

fn arity(name: &str, expected: &'static str, got: usize) -> CodegenError {
    CodegenError::BuiltinArity {
        name: name.to_string(),
        expected,
        got,
    }
}
