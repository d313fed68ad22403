use crate::ast::{BinaryOp, Expr, ExprKind, Literal, TypeName, UnaryOp};
use crate::errors::{CodegenError, Result};
use crate::function::FunctionCodegen;
use num_bigint::{BigInt, Sign};
use num_traits::{One, Zero};
use sollir_core::{
    BlockId, Constant, ContextVariable, FunctionBuilder, LocalId, Type, Value,
};

/// Result of lowering an expression: a value, or the slot of an assignable
/// location that still has to be loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprValue {
    Value(Value),
    Address(LocalId, Type),
    /// Calls to functions without a return value.
    Void,
}

impl ExprValue {
    pub fn load(self, builder: &mut FunctionBuilder<'_>) -> Result<Value> {
        match self {
            ExprValue::Value(v) => Ok(v),
            ExprValue::Address(slot, _) => Ok(builder.load(slot)?),
            ExprValue::Void => Err(CodegenError::NoValue(TypeName::Unit.to_string())),
        }
    }
}

impl FunctionCodegen<'_, '_> {
    pub(crate) fn emit_rvalue(&mut self, expr: &Expr) -> Result<Value> {
        let lowered = self.emit_expr(expr)?;
        lowered.load(&mut self.builder)
    }

    pub(crate) fn emit_expr(&mut self, expr: &Expr) -> Result<ExprValue> {
        match &expr.kind {
            ExprKind::Literal { value } => {
                let ty = self.module.types().lower_value(&expr.ty)?;
                Ok(ExprValue::Value(lower_literal(value, &ty)?))
            }
            ExprKind::Var { decl } => {
                let slot = self.locals.resolve(*decl)?;
                let ty = self.builder.local_type(slot)?;
                Ok(ExprValue::Address(slot, ty))
            }
            ExprKind::Unary { op, operand } => {
                let ty = self.module.types().lower_value(&operand.ty)?;
                let v = self.emit_rvalue(operand)?;
                let result = match op {
                    UnaryOp::Not => self.builder.not(v, Type::Bool)?,
                    UnaryOp::BitNot => self.builder.not(v, ty)?,
                    UnaryOp::Neg => {
                        let zero = Value::Constant(Constant::zero(&ty));
                        self.builder.sub(zero, v, ty)?
                    }
                };
                Ok(ExprValue::Value(result))
            }
            ExprKind::Binary { op, left, right } if op.is_logical() => {
                self.emit_logical(*op, left, right).map(ExprValue::Value)
            }
            ExprKind::Binary { op, left, right } => {
                let ty = self.module.types().lower_value(&left.ty)?;
                let l = self.emit_rvalue(left)?;
                let r = self.emit_rvalue(right)?;
                self.emit_binary_op(*op, l, r, ty).map(ExprValue::Value)
            }
            ExprKind::Assign { op, target, value } => {
                let (slot, ty) = match self.emit_expr(target)? {
                    ExprValue::Address(slot, ty) => (slot, ty),
                    _ => return Err(CodegenError::NotAssignable),
                };
                let mut v = self.emit_rvalue(value)?;
                if let Some(op) = op {
                    let current = self.builder.load(slot)?;
                    v = self.emit_binary_op(*op, current, v, ty)?;
                }
                self.builder.store(slot, v.clone())?;
                Ok(ExprValue::Value(v))
            }
            ExprKind::Call { callee, args } => match callee.as_str() {
                "require" => self.emit_call_require(args).map(|_| ExprValue::Void),
                "assert" => self.emit_call_assert(args).map(|_| ExprValue::Void),
                "revert" => self.emit_call_revert(args).map(|_| ExprValue::Void),
                "gasleft" if args.is_empty() => self
                    .builder
                    .get_context(ContextVariable::GasLeft)
                    .map(ExprValue::Value)
                    .map_err(Into::into),
                _ => self.emit_call(callee, args, &expr.ty),
            },
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                let ty = self.module.types().lower_value(&expr.ty)?;
                self.emit_conditional(cond, then_expr, else_expr, &ty)
                    .map(ExprValue::Value)
            }
            ExprKind::Context { var } => Ok(ExprValue::Value(self.builder.get_context(*var)?)),
        }
    }

    fn emit_binary_op(&mut self, op: BinaryOp, l: Value, r: Value, ty: Type) -> Result<Value> {
        let b = &mut self.builder;
        let v = match op {
            BinaryOp::Add => b.add(l, r, ty)?,
            BinaryOp::Sub => b.sub(l, r, ty)?,
            BinaryOp::Mul => b.mul(l, r, ty)?,
            BinaryOp::Div => b.div(l, r, ty)?,
            BinaryOp::Mod => b.mod_(l, r, ty)?,
            BinaryOp::Exp => b.pow(l, r, ty)?,
            BinaryOp::BitAnd | BinaryOp::And => b.and(l, r)?,
            BinaryOp::BitOr | BinaryOp::Or => b.or(l, r)?,
            BinaryOp::BitXor => b.xor(l, r)?,
            BinaryOp::Shl => b.shl(l, r, ty)?,
            BinaryOp::Shr => b.shr(l, r, ty)?,
            BinaryOp::Eq => b.eq(l, r)?,
            BinaryOp::Ne => b.ne(l, r)?,
            BinaryOp::Lt => b.lt(l, r)?,
            BinaryOp::Gt => b.gt(l, r)?,
            BinaryOp::Le => b.le(l, r)?,
            BinaryOp::Ge => b.ge(l, r)?,
        };
        Ok(v)
    }

    /// `&&` and `||` as values. The right operand is only evaluated in its
    /// own block, and the result is merged with a phi.
    fn emit_logical(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Value> {
        let is_and = op == BinaryOp::And;
        let (rhs_label, end_label) = if is_and {
            ("land.rhs", "land.end")
        } else {
            ("lor.rhs", "lor.end")
        };

        let lhs = self.emit_rvalue(left)?;
        let lhs_block = self.builder.current_block();
        let rhs_bb = self.builder.create_block(rhs_label);
        let end_bb = self.builder.create_block(end_label);

        if is_and {
            self.builder.branch(lhs, rhs_bb, end_bb)?;
        } else {
            self.builder.branch(lhs, end_bb, rhs_bb)?;
        }

        self.switch_to(rhs_bb)?;
        let rhs = self.emit_rvalue(right)?;
        let mut incoming = vec![(lhs_block, Value::bool(!is_and))];
        if !self.builder.is_terminated() {
            incoming.push((self.builder.current_block(), rhs));
            self.builder.jump(end_bb)?;
        }

        self.switch_to(end_bb)?;
        Ok(self.builder.phi(incoming)?)
    }

    /// Lowers `cond` straight into control flow: `true_bb` is taken when it
    /// holds, `false_bb` otherwise. Leaves the current block terminated.
    pub(crate) fn emit_branch_on_bool_expr(
        &mut self,
        cond: &Expr,
        true_bb: BlockId,
        false_bb: BlockId,
    ) -> Result<()> {
        match &cond.kind {
            ExprKind::Literal {
                value: Literal::Bool(b),
            } => {
                self.builder.jump(if *b { true_bb } else { false_bb })?;
                Ok(())
            }
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => self.emit_branch_on_bool_expr(operand, false_bb, true_bb),
            ExprKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                let rhs_bb = self.builder.create_block("land.rhs");
                self.emit_branch_on_bool_expr(left, rhs_bb, false_bb)?;
                self.switch_to(rhs_bb)?;
                self.emit_branch_on_bool_expr(right, true_bb, false_bb)
            }
            ExprKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                let rhs_bb = self.builder.create_block("lor.rhs");
                self.emit_branch_on_bool_expr(left, true_bb, rhs_bb)?;
                self.switch_to(rhs_bb)?;
                self.emit_branch_on_bool_expr(right, true_bb, false_bb)
            }
            _ => {
                let v = self.emit_rvalue(cond)?;
                match v.as_constant().and_then(|c| c.as_bool()) {
                    Some(b) => self.builder.jump(if b { true_bb } else { false_bb })?,
                    None => self.builder.branch(v, true_bb, false_bb)?,
                }
                Ok(())
            }
        }
    }

    fn emit_conditional(
        &mut self,
        cond: &Expr,
        then_expr: &Expr,
        else_expr: &Expr,
        ty: &Type,
    ) -> Result<Value> {
        let true_bb = self.builder.create_block("cond.true");
        let false_bb = self.builder.create_block("cond.false");
        let end_bb = self.builder.create_block("cond.end");

        self.emit_branch_on_bool_expr(cond, true_bb, false_bb)?;

        let mut incoming = Vec::with_capacity(2);
        for (block, arm) in [(true_bb, then_expr), (false_bb, else_expr)] {
            self.switch_to(block)?;
            let v = self.emit_rvalue(arm)?;
            if !self.builder.is_terminated() {
                incoming.push((self.builder.current_block(), v));
                self.builder.jump(end_bb)?;
            }
        }

        self.switch_to(end_bb)?;
        if incoming.is_empty() {
            return Ok(Value::Constant(Constant::zero(ty)));
        }
        Ok(self.builder.phi(incoming)?)
    }

    fn emit_call(&mut self, callee: &str, args: &[Expr], ty: &TypeName) -> Result<ExprValue> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.emit_rvalue(arg)?);
        }
        let returns_value = self.module.types().lower(ty)?.is_some();
        let result = self.builder.call(callee, values, returns_value)?;
        Ok(result.map(ExprValue::Value).unwrap_or(ExprValue::Void))
    }
}

/// Turns a literal into a constant of type `ty`, rejecting values that do
/// not fit.
pub(crate) fn lower_literal(literal: &Literal, ty: &Type) -> Result<Value> {
    let constant = match (literal, ty) {
        (Literal::Bool(b), Type::Bool) => Constant::Bool(*b),
        (Literal::String(s), Type::String) => Constant::String(s.clone()),
        (Literal::Address(text), Type::Address) => Constant::Address(parse_address(text)?),
        (Literal::Number(digits), _) => {
            let n: BigInt = digits
                .trim()
                .parse()
                .map_err(|_| CodegenError::InvalidLiteral(format!("`{}` is not a number", digits)))?;
            number_constant(n, ty, digits)?
        }
        (other, ty) => {
            return Err(CodegenError::InvalidLiteral(format!(
                "{:?} cannot have type {}",
                other, ty
            )))
        }
    };
    Ok(Value::Constant(constant))
}

fn number_constant(n: BigInt, ty: &Type, text: &str) -> Result<Constant> {
    let out_of_range =
        || CodegenError::InvalidLiteral(format!("{} does not fit in {}", text, ty));

    match ty {
        Type::Uint(bits) => {
            let limit = BigInt::one() << *bits as usize;
            if n.sign() == Sign::Minus || n >= limit {
                return Err(out_of_range());
            }
            n.to_biguint()
                .map(|v| Constant::Uint(v, *bits))
                .ok_or_else(out_of_range)
        }
        Type::Int(bits) => {
            let half = BigInt::one() << (*bits as usize - 1);
            if n >= half || n < -half {
                return Err(out_of_range());
            }
            Ok(Constant::Int(n, *bits))
        }
        Type::Bytes(width) => {
            let limit = BigInt::one() << (*width as usize * 8);
            if n.sign() == Sign::Minus || n >= limit {
                return Err(out_of_range());
            }
            let (_, raw) = n.to_bytes_be();
            let mut out = vec![0u8; *width as usize];
            if !n.is_zero() {
                let offset = out.len() - raw.len();
                out[offset..].copy_from_slice(&raw);
            }
            Ok(Constant::Bytes(out))
        }
        _ => Err(CodegenError::InvalidLiteral(format!(
            "number literal cannot have type {}",
            ty
        ))),
    }
}

fn parse_address(text: &str) -> Result<[u8; 20]> {
    let hex = text.strip_prefix("0x").unwrap_or(text);
    if hex.len() != 40 || !hex.is_ascii() {
        return Err(CodegenError::InvalidLiteral(format!(
            "`{}` is not a 20-byte address",
            text
        )));
    }

    let mut out = [0u8; 20];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16).map_err(|_| {
            CodegenError::InvalidLiteral(format!("`{}` is not a hex address", text))
        })?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn number_literals_respect_width() {
        let v = lower_literal(&Literal::Number("255".into()), &Type::Uint(8)).unwrap();
        assert_eq!(v, Value::Constant(Constant::Uint(BigUint::from(255u32), 8)));
        assert!(lower_literal(&Literal::Number("256".into()), &Type::Uint(8)).is_err());
        assert!(lower_literal(&Literal::Number("-1".into()), &Type::Uint(256)).is_err());

        let v = lower_literal(&Literal::Number("-128".into()), &Type::Int(8)).unwrap();
        assert_eq!(v, Value::int(-128, 8));
        assert!(lower_literal(&Literal::Number("128".into()), &Type::Int(8)).is_err());
    }

    #[test]
    fn number_literals_fill_fixed_bytes() {
        let v = lower_literal(&Literal::Number("258".into()), &Type::Bytes(4)).unwrap();
        assert_eq!(v, Value::Constant(Constant::Bytes(vec![0, 0, 1, 2])));
    }

    #[test]
    fn address_literals_need_forty_hex_digits() {
        let text = format!("0x{}", "ab".repeat(20));
        let v = lower_literal(&Literal::Address(text), &Type::Address).unwrap();
        assert_eq!(v, Value::Constant(Constant::Address([0xab; 20])));
        assert!(lower_literal(&Literal::Address("0x12".into()), &Type::Address).is_err());
        assert!(lower_literal(&Literal::Address("zz".repeat(20)), &Type::Address).is_err());
    }

    #[test]
    fn mistyped_literals_are_rejected() {
        assert!(lower_literal(&Literal::Bool(true), &Type::Uint(256)).is_err());
        assert!(lower_literal(&Literal::String("x".into()), &Type::Bool).is_err());
    }
}
