use crate::ast::{Expr, Stmt, VarDecl};
use crate::errors::{CodegenError, Result};
use crate::function::FunctionCodegen;
use sollir_core::{Constant, Value};

impl FunctionCodegen<'_, '_> {
    pub(crate) fn emit_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        self.ensure_insertion_point()?;

        match stmt {
            Stmt::Block { stmts } => {
                for s in stmts {
                    self.emit_stmt(s)?;
                }
                Ok(())
            }
            Stmt::Decl { var, init } => self.emit_decl(var, init.as_ref()),
            Stmt::Expr { expr } => {
                self.emit_expr(expr)?;
                Ok(())
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => self.emit_if(cond, then_branch, else_branch.as_deref()),
            Stmt::While { cond, body } => self.emit_while(cond, body),
            Stmt::DoWhile { body, cond } => self.emit_do_while(body, cond),
            Stmt::For {
                init,
                cond,
                post,
                body,
            } => self.emit_for(init.as_deref(), cond.as_ref(), post.as_ref(), body),
            Stmt::Break => {
                let target = self.loops.current_break_target()?;
                self.builder.jump(target)?;
                Ok(())
            }
            Stmt::Continue => {
                let target = self.loops.current_continue_target()?;
                self.builder.jump(target)?;
                Ok(())
            }
            Stmt::Return { value } => self.emit_return(value.as_ref()),
            Stmt::Emit { event, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.emit_rvalue(arg)?);
                }
                self.module.emit_event(&mut self.builder, event, values)
            }
        }
    }

    fn emit_decl(&mut self, var: &VarDecl, init: Option<&Expr>) -> Result<()> {
        let ty = self.module.types().lower_value(&var.ty)?;
        let slot = self.locals.declare(&mut self.builder, var, ty.clone())?;
        let value = match init {
            Some(expr) => self.emit_rvalue(expr)?,
            None => Value::Constant(Constant::zero(&ty)),
        };
        self.builder.store(slot, value)?;
        Ok(())
    }

    fn emit_if(&mut self, cond: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) -> Result<()> {
        let then_bb = self.builder.create_block("if.then");
        let else_bb = else_branch.map(|_| self.builder.create_block("if.else"));
        let end_bb = self.builder.create_block("if.end");

        self.emit_branch_on_bool_expr(cond, then_bb, else_bb.unwrap_or(end_bb))?;

        self.switch_to(then_bb)?;
        self.emit_stmt(then_branch)?;
        self.jump_if_open(end_bb)?;

        if let (Some(else_bb), Some(else_branch)) = (else_bb, else_branch) {
            self.switch_to(else_bb)?;
            self.emit_stmt(else_branch)?;
            self.jump_if_open(end_bb)?;
        }

        self.switch_to(end_bb)
    }

    fn emit_while(&mut self, cond: &Expr, body: &Stmt) -> Result<()> {
        let cond_bb = self.builder.create_block("while.cond");
        let body_bb = self.builder.create_block("while.body");
        let end_bb = self.builder.create_block("while.end");

        self.builder.jump(cond_bb)?;
        self.switch_to(cond_bb)?;
        self.emit_branch_on_bool_expr(cond, body_bb, end_bb)?;

        self.switch_to(body_bb)?;
        self.loops.enter_loop(end_bb, cond_bb);
        self.emit_stmt(body)?;
        self.loops.exit_loop()?;
        self.jump_if_open(cond_bb)?;

        self.switch_to(end_bb)
    }

    fn emit_do_while(&mut self, body: &Stmt, cond: &Expr) -> Result<()> {
        let body_bb = self.builder.create_block("do.body");
        let cond_bb = self.builder.create_block("do.cond");
        let end_bb = self.builder.create_block("do.end");

        self.builder.jump(body_bb)?;
        self.switch_to(body_bb)?;
        self.loops.enter_loop(end_bb, cond_bb);
        self.emit_stmt(body)?;
        self.loops.exit_loop()?;
        self.jump_if_open(cond_bb)?;

        self.switch_to(cond_bb)?;
        self.emit_branch_on_bool_expr(cond, body_bb, end_bb)?;

        self.switch_to(end_bb)
    }

    fn emit_for(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        post: Option<&Expr>,
        body: &Stmt,
    ) -> Result<()> {
        if let Some(init) = init {
            self.emit_stmt(init)?;
        }

        let cond_bb = self.builder.create_block("for.cond");
        let body_bb = self.builder.create_block("for.body");
        let inc_bb = self.builder.create_block("for.inc");
        let end_bb = self.builder.create_block("for.end");

        self.builder.jump(cond_bb)?;
        self.switch_to(cond_bb)?;
        match cond {
            Some(cond) => self.emit_branch_on_bool_expr(cond, body_bb, end_bb)?,
            None => self.builder.jump(body_bb)?,
        }

        self.switch_to(body_bb)?;
        self.loops.enter_loop(end_bb, inc_bb);
        self.emit_stmt(body)?;
        self.loops.exit_loop()?;
        self.jump_if_open(inc_bb)?;

        self.switch_to(inc_bb)?;
        if let Some(post) = post {
            self.emit_expr(post)?;
        }
        self.jump_if_open(cond_bb)?;

        self.switch_to(end_bb)
    }

    fn emit_return(&mut self, value: Option<&Expr>) -> Result<()> {
        match (value, self.return_slot.clone()) {
            (Some(expr), Some((slot, _))) => {
                let v = self.emit_rvalue(expr)?;
                self.builder.store(slot, v)?;
            }
            (None, None) => {}
            (Some(_), None) => {
                return Err(CodegenError::ReturnMismatch(
                    "value returned from a function without return type".to_string(),
                ))
            }
            (None, Some((_, ty))) => {
                return Err(CodegenError::ReturnMismatch(format!(
                    "missing return value of type {}",
                    ty
                )))
            }
        }
        self.builder.jump(self.exit_block)?;
        Ok(())
    }
}
