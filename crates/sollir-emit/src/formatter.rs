use sollir_core::{BlockId, Constant, Instruction, Terminator, Type, Value};

/// Text forms of the pieces that make up a block: types, operands,
/// instructions and terminators.
pub struct IRFormatter;

impl IRFormatter {
    pub fn format_type(ty: &Type) -> String {
        match ty {
            Type::Bool => "i1".to_string(),
            Type::Uint(bits) | Type::Int(bits) => format!("i{}", bits),
            Type::Address => "i160".to_string(),
            Type::Bytes(n) => format!("bytes{}", n),
            Type::String => "string".to_string(),
        }
    }

    fn is_signed(ty: &Type) -> bool {
        matches!(ty, Type::Int(_))
    }

    pub fn format_constant(c: &Constant) -> String {
        match c {
            Constant::Bool(b) => format!("iconst.i1 {}", u8::from(*b)),
            Constant::Uint(val, bits) => format!("iconst.i{} {}", bits, val),
            Constant::Int(val, bits) => format!("iconst.i{} {}", bits, val),
            Constant::Address(addr) => format!("iconst.i160 0x{}", hex(addr)),
            Constant::Bytes(bytes) => format!("bconst 0x{}", hex(bytes)),
            Constant::String(s) => format!("sconst {:?}", s),
        }
    }

    pub fn format_value(value: &Value) -> String {
        match value {
            Value::Constant(c) => Self::format_constant(c),
            other => other.to_string(),
        }
    }

    fn format_values(values: &[Value]) -> String {
        values
            .iter()
            .map(Self::format_value)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn format_instruction(inst: &Instruction) -> String {
        let v = Self::format_value;
        match inst {
            Instruction::Add {
                result,
                left,
                right,
                ty,
            } => Self::binary(result, "iadd", ty, left, right),
            Instruction::Sub {
                result,
                left,
                right,
                ty,
            } => Self::binary(result, "isub", ty, left, right),
            Instruction::Mul {
                result,
                left,
                right,
                ty,
            } => Self::binary(result, "imul", ty, left, right),
            Instruction::Div {
                result,
                left,
                right,
                ty,
            } => {
                let op = if Self::is_signed(ty) { "sdiv" } else { "udiv" };
                Self::binary(result, op, ty, left, right)
            }
            Instruction::Mod {
                result,
                left,
                right,
                ty,
            } => {
                let op = if Self::is_signed(ty) { "srem" } else { "urem" };
                Self::binary(result, op, ty, left, right)
            }
            Instruction::Pow {
                result,
                base,
                exp,
                ty,
            } => Self::binary(result, "ipow", ty, base, exp),
            Instruction::And {
                result,
                left,
                right,
            } => format!("{} = band {}, {}", result, v(left), v(right)),
            Instruction::Or {
                result,
                left,
                right,
            } => format!("{} = bor {}, {}", result, v(left), v(right)),
            Instruction::Xor {
                result,
                left,
                right,
            } => format!("{} = bxor {}, {}", result, v(left), v(right)),
            Instruction::Not {
                result,
                operand,
                ty,
            } => format!("{} = bnot.{} {}", result, Self::format_type(ty), v(operand)),
            Instruction::Shl {
                result,
                value,
                shift,
                ty,
            } => Self::binary(result, "ishl", ty, value, shift),
            Instruction::Shr {
                result,
                value,
                shift,
                ty,
            } => {
                let op = if Self::is_signed(ty) { "sshr" } else { "ushr" };
                Self::binary(result, op, ty, value, shift)
            }
            Instruction::Eq {
                result,
                left,
                right,
            } => Self::compare(result, "eq", left, right),
            Instruction::Ne {
                result,
                left,
                right,
            } => Self::compare(result, "ne", left, right),
            Instruction::Lt {
                result,
                left,
                right,
            } => Self::compare(result, "lt", left, right),
            Instruction::Gt {
                result,
                left,
                right,
            } => Self::compare(result, "gt", left, right),
            Instruction::Le {
                result,
                left,
                right,
            } => Self::compare(result, "le", left, right),
            Instruction::Ge {
                result,
                left,
                right,
            } => Self::compare(result, "ge", left, right),
            Instruction::Load { result, local } => format!("{} = load {}", result, local),
            Instruction::Store { local, value } => format!("store {}, {}", local, v(value)),
            Instruction::Call {
                result,
                callee,
                args,
            } => {
                let call = format!("call %{}({})", callee, Self::format_values(args));
                match result {
                    Some(r) => format!("{} = {}", r, call),
                    None => call,
                }
            }
            Instruction::GetContext { result, var } => format!("{} = context {}", result, var),
            Instruction::EmitEvent {
                event,
                topics,
                data,
            } => format!(
                "log {} [{}] ({})",
                event,
                Self::format_values(topics),
                Self::format_values(data)
            ),
            Instruction::Phi { result, values } => {
                let incoming = values
                    .iter()
                    .map(|(block, value)| format!("[{}: {}]", block, v(value)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} = phi {}", result, incoming)
            }
        }
    }

    pub fn format_terminator(term: &Terminator) -> String {
        match term {
            Terminator::Jump(target) => format!("jump {}", target),
            Terminator::Branch {
                condition,
                then_block,
                else_block,
            } => format!(
                "brif {}, {}, {}",
                Self::format_value(condition),
                then_block,
                else_block
            ),
            Terminator::Return(None) => "return".to_string(),
            Terminator::Return(Some(value)) => format!("return {}", Self::format_value(value)),
            Terminator::Revert(None) => "revert".to_string(),
            Terminator::Revert(Some(reason)) => format!("revert {}", Self::format_value(reason)),
            Terminator::Panic => "panic".to_string(),
            Terminator::Invalid => "<unterminated>".to_string(),
        }
    }

    pub fn format_block_ref(block: BlockId, label: &str) -> String {
        format!("{}: ; {}", block, label)
    }

    fn binary(result: &Value, op: &str, ty: &Type, left: &Value, right: &Value) -> String {
        format!(
            "{} = {}.{} {}, {}",
            result,
            op,
            Self::format_type(ty),
            Self::format_value(left),
            Self::format_value(right)
        )
    }

    fn compare(result: &Value, cond: &str, left: &Value, right: &Value) -> String {
        format!(
            "{} = icmp {} {}, {}",
            result,
            cond,
            Self::format_value(left),
            Self::format_value(right)
        )
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sollir_core::{LocalId, TempId};

    #[test]
    fn test_typed_arithmetic() {
        let inst = Instruction::Div {
            result: Value::Temp(TempId(3)),
            left: Value::Temp(TempId(1)),
            right: Value::int(2, 64),
            ty: Type::Int(64),
        };
        assert_eq!(
            IRFormatter::format_instruction(&inst),
            "t3 = sdiv.i64 t1, iconst.i64 2"
        );
    }

    #[test]
    fn test_memory_and_terminators() {
        let store = Instruction::Store {
            local: LocalId(0),
            value: Value::bool(true),
        };
        assert_eq!(IRFormatter::format_instruction(&store), "store l0, iconst.i1 1");

        let term = Terminator::Revert(Some(Value::string("neg")));
        assert_eq!(IRFormatter::format_terminator(&term), "revert sconst \"neg\"");
        assert_eq!(IRFormatter::format_terminator(&Terminator::Panic), "panic");
    }

    #[test]
    fn test_phi_lists_incoming_blocks() {
        let inst = Instruction::Phi {
            result: Value::Temp(TempId(4)),
            values: vec![
                (BlockId(1), Value::bool(false)),
                (BlockId(2), Value::Temp(TempId(3))),
            ],
        };
        assert_eq!(
            IRFormatter::format_instruction(&inst),
            "t4 = phi [block1: iconst.i1 0], [block2: t3]"
        );
    }
}
