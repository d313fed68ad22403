use crate::{
    block::{BlockId, Terminator},
    contract::EventId,
    function::{Function, LocalId},
    instructions::{ContextVariable, Instruction},
    types::Type,
    values::{TempId, Value},
    IrError, Result,
};

/// Cursor over the body of one function.
///
/// The builder always has a current block. Instructions and terminators go
/// to that block, and nothing may be added to a block after its terminator
/// has been set.
pub struct FunctionBuilder<'f> {
    function: &'f mut Function,
    current_block: BlockId,
    next_temp: u32,
}

impl<'f> FunctionBuilder<'f> {
    pub fn new(function: &'f mut Function) -> Self {
        let current_block = function.body.entry_block;
        let next_temp = function
            .body
            .blocks
            .values()
            .flat_map(|b| &b.instructions)
            .filter_map(|inst| inst.result().and_then(|v| v.as_temp()))
            .map(|t| t.0 + 1)
            .max()
            .unwrap_or(0);

        Self {
            function,
            current_block,
            next_temp,
        }
    }

    pub fn function(&self) -> &Function {
        &*self.function
    }

    pub fn function_mut(&mut self) -> &mut Function {
        &mut *self.function
    }

    pub fn entry_block(&self) -> BlockId {
        self.function.body.entry_block
    }

    pub fn create_block(&mut self, label: &str) -> BlockId {
        self.function.body.create_block(label)
    }

    pub fn current_block(&self) -> BlockId {
        self.current_block
    }

    pub fn switch_to_block(&mut self, block: BlockId) -> Result<()> {
        if !self.function.body.blocks.contains_key(&block) {
            return Err(IrError::UnknownBlock(block));
        }
        self.current_block = block;
        Ok(())
    }

    pub fn is_terminated(&self) -> bool {
        self.function
            .body
            .get_block(self.current_block)
            .map(|b| b.is_terminated())
            .unwrap_or(false)
    }

    pub fn add_local(&mut self, name: &str, ty: Type) -> LocalId {
        self.function.body.add_local(name, ty)
    }

    pub fn local_type(&self, local: LocalId) -> Result<Type> {
        self.function
            .body
            .local(local)
            .map(|l| l.var_type.clone())
            .ok_or(IrError::UnknownLocal(local))
    }

    pub fn new_temp(&mut self) -> Value {
        let id = TempId(self.next_temp);
        self.next_temp += 1;
        Value::Temp(id)
    }

    pub fn add(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        self.push_with_result(|result| Instruction::Add {
            result,
            left,
            right,
            ty,
        })
    }

    pub fn sub(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        self.push_with_result(|result| Instruction::Sub {
            result,
            left,
            right,
            ty,
        })
    }

    pub fn mul(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        self.push_with_result(|result| Instruction::Mul {
            result,
            left,
            right,
            ty,
        })
    }

    pub fn div(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        self.push_with_result(|result| Instruction::Div {
            result,
            left,
            right,
            ty,
        })
    }

    pub fn mod_(&mut self, left: Value, right: Value, ty: Type) -> Result<Value> {
        self.push_with_result(|result| Instruction::Mod {
            result,
            left,
            right,
            ty,
        })
    }

    pub fn pow(&mut self, base: Value, exp: Value, ty: Type) -> Result<Value> {
        self.push_with_result(|result| Instruction::Pow {
            result,
            base,
            exp,
            ty,
        })
    }

    pub fn and(&mut self, left: Value, right: Value) -> Result<Value> {
        self.push_with_result(|result| Instruction::And {
            result,
            left,
            right,
        })
    }

    pub fn or(&mut self, left: Value, right: Value) -> Result<Value> {
        self.push_with_result(|result| Instruction::Or {
            result,
            left,
            right,
        })
    }

    pub fn xor(&mut self, left: Value, right: Value) -> Result<Value> {
        self.push_with_result(|result| Instruction::Xor {
            result,
            left,
            right,
        })
    }

    pub fn not(&mut self, operand: Value, ty: Type) -> Result<Value> {
        self.push_with_result(|result| Instruction::Not {
            result,
            operand,
            ty,
        })
    }

    pub fn shl(&mut self, value: Value, shift: Value, ty: Type) -> Result<Value> {
        self.push_with_result(|result| Instruction::Shl {
            result,
            value,
            shift,
            ty,
        })
    }

    pub fn shr(&mut self, value: Value, shift: Value, ty: Type) -> Result<Value> {
        self.push_with_result(|result| Instruction::Shr {
            result,
            value,
            shift,
            ty,
        })
    }

    pub fn eq(&mut self, left: Value, right: Value) -> Result<Value> {
        self.push_with_result(|result| Instruction::Eq {
            result,
            left,
            right,
        })
    }

    pub fn ne(&mut self, left: Value, right: Value) -> Result<Value> {
        self.push_with_result(|result| Instruction::Ne {
            result,
            left,
            right,
        })
    }

    pub fn lt(&mut self, left: Value, right: Value) -> Result<Value> {
        self.push_with_result(|result| Instruction::Lt {
            result,
            left,
            right,
        })
    }

    pub fn gt(&mut self, left: Value, right: Value) -> Result<Value> {
        self.push_with_result(|result| Instruction::Gt {
            result,
            left,
            right,
        })
    }

    pub fn le(&mut self, left: Value, right: Value) -> Result<Value> {
        self.push_with_result(|result| Instruction::Le {
            result,
            left,
            right,
        })
    }

    pub fn ge(&mut self, left: Value, right: Value) -> Result<Value> {
        self.push_with_result(|result| Instruction::Ge {
            result,
            left,
            right,
        })
    }

    pub fn load(&mut self, local: LocalId) -> Result<Value> {
        self.push_with_result(|result| Instruction::Load { result, local })
    }

    pub fn store(&mut self, local: LocalId, value: Value) -> Result<()> {
        self.push_instruction(Instruction::Store { local, value })
    }

    /// Emits a call. `returns_value` decides whether the call gets a result
    /// temporary.
    pub fn call(
        &mut self,
        callee: &str,
        args: Vec<Value>,
        returns_value: bool,
    ) -> Result<Option<Value>> {
        let result = returns_value.then(|| self.new_temp());
        self.push_instruction(Instruction::Call {
            result: result.clone(),
            callee: callee.to_string(),
            args,
        })?;
        Ok(result)
    }

    pub fn get_context(&mut self, var: ContextVariable) -> Result<Value> {
        self.push_with_result(|result| Instruction::GetContext { result, var })
    }

    pub fn emit_event(&mut self, event: EventId, topics: Vec<Value>, data: Vec<Value>) -> Result<()> {
        self.push_instruction(Instruction::EmitEvent {
            event,
            topics,
            data,
        })
    }

    pub fn phi(&mut self, values: Vec<(BlockId, Value)>) -> Result<Value> {
        self.push_with_result(|result| Instruction::Phi { result, values })
    }

    pub fn jump(&mut self, target: BlockId) -> Result<()> {
        self.set_terminator(Terminator::Jump(target))
    }

    pub fn branch(&mut self, condition: Value, then_block: BlockId, else_block: BlockId) -> Result<()> {
        self.set_terminator(Terminator::Branch {
            condition,
            then_block,
            else_block,
        })
    }

    pub fn ret(&mut self, value: Option<Value>) -> Result<()> {
        self.set_terminator(Terminator::Return(value))
    }

    pub fn revert(&mut self, reason: Option<Value>) -> Result<()> {
        self.set_terminator(Terminator::Revert(reason))
    }

    pub fn panic(&mut self) -> Result<()> {
        self.set_terminator(Terminator::Panic)
    }

    fn push_with_result(&mut self, make: impl FnOnce(Value) -> Instruction) -> Result<Value> {
        let result = self.new_temp();
        self.push_instruction(make(result.clone()))?;
        Ok(result)
    }

    fn push_instruction(&mut self, inst: Instruction) -> Result<()> {
        let block_id = self.current_block;
        let block = self
            .function
            .body
            .get_block_mut(block_id)
            .ok_or(IrError::UnknownBlock(block_id))?;

        if block.is_terminated() {
            return Err(IrError::BlockTerminated(block_id));
        }
        block.instructions.push(inst);
        Ok(())
    }

    fn set_terminator(&mut self, term: Terminator) -> Result<()> {
        let block_id = self.current_block;
        let block = self
            .function
            .body
            .get_block_mut(block_id)
            .ok_or(IrError::UnknownBlock(block_id))?;

        if block.is_terminated() {
            return Err(IrError::BlockTerminated(block_id));
        }
        block.terminator = term;
        Ok(())
    }
}
