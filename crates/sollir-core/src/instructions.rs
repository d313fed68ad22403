use crate::block::BlockId;
use crate::contract::EventId;
use crate::function::LocalId;
use crate::types::Type;
use crate::values::Value;
use serde::{Deserialize, Serialize};

/// Non-terminating instructions. Control transfer lives in
/// [`Terminator`](crate::block::Terminator), so a block's instruction list is
/// always straight-line code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Instruction {
    Add {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    Sub {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    Mul {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    Div {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    Mod {
        result: Value,
        left: Value,
        right: Value,
        ty: Type,
    },
    Pow {
        result: Value,
        base: Value,
        exp: Value,
        ty: Type,
    },

    And {
        result: Value,
        left: Value,
        right: Value,
    },
    Or {
        result: Value,
        left: Value,
        right: Value,
    },
    Xor {
        result: Value,
        left: Value,
        right: Value,
    },
    Not {
        result: Value,
        operand: Value,
        ty: Type,
    },
    Shl {
        result: Value,
        value: Value,
        shift: Value,
        ty: Type,
    },
    Shr {
        result: Value,
        value: Value,
        shift: Value,
        ty: Type,
    },

    Eq {
        result: Value,
        left: Value,
        right: Value,
    },
    Ne {
        result: Value,
        left: Value,
        right: Value,
    },
    Lt {
        result: Value,
        left: Value,
        right: Value,
    },
    Gt {
        result: Value,
        left: Value,
        right: Value,
    },
    Le {
        result: Value,
        left: Value,
        right: Value,
    },
    Ge {
        result: Value,
        left: Value,
        right: Value,
    },

    Load {
        result: Value,
        local: LocalId,
    },
    Store {
        local: LocalId,
        value: Value,
    },

    Call {
        result: Option<Value>,
        callee: String,
        args: Vec<Value>,
    },

    GetContext {
        result: Value,
        var: ContextVariable,
    },

    EmitEvent {
        event: EventId,
        topics: Vec<Value>,
        data: Vec<Value>,
    },

    Phi {
        result: Value,
        values: Vec<(BlockId, Value)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextVariable {
    MsgSender,
    MsgValue,
    BlockNumber,
    BlockTimestamp,
    TxOrigin,
    GasLeft,
}

impl ContextVariable {
    pub fn ty(&self) -> Type {
        match self {
            ContextVariable::MsgSender | ContextVariable::TxOrigin => Type::Address,
            _ => Type::Uint(256),
        }
    }
}

impl std::fmt::Display for ContextVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ContextVariable::MsgSender => "msg.sender",
            ContextVariable::MsgValue => "msg.value",
            ContextVariable::BlockNumber => "block.number",
            ContextVariable::BlockTimestamp => "block.timestamp",
            ContextVariable::TxOrigin => "tx.origin",
            ContextVariable::GasLeft => "gasleft",
        };
        f.write_str(name)
    }
}

impl Instruction {
    pub fn result(&self) -> Option<&Value> {
        match self {
            Instruction::Add { result, .. }
            | Instruction::Sub { result, .. }
            | Instruction::Mul { result, .. }
            | Instruction::Div { result, .. }
            | Instruction::Mod { result, .. }
            | Instruction::Pow { result, .. }
            | Instruction::And { result, .. }
            | Instruction::Or { result, .. }
            | Instruction::Xor { result, .. }
            | Instruction::Not { result, .. }
            | Instruction::Shl { result, .. }
            | Instruction::Shr { result, .. }
            | Instruction::Eq { result, .. }
            | Instruction::Ne { result, .. }
            | Instruction::Lt { result, .. }
            | Instruction::Gt { result, .. }
            | Instruction::Le { result, .. }
            | Instruction::Ge { result, .. }
            | Instruction::Load { result, .. }
            | Instruction::GetContext { result, .. }
            | Instruction::Phi { result, .. } => Some(result),
            Instruction::Call { result, .. } => result.as_ref(),
            Instruction::Store { .. } | Instruction::EmitEvent { .. } => None,
        }
    }
}
