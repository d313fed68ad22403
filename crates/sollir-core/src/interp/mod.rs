/*! Reference interpreter for generated function bodies.
 *
 * Executes one function block by block so tests can observe what a lowered body actually does:
 * which value it returns, whether it reverts or panics, which blocks it passes through, and
 * which events and calls it produces. Integer arithmetic wraps at the operand width. Division
 * or remainder by zero ends the run with a panic.
 */

mod arith;

use crate::{
    block::{BlockId, Terminator},
    contract::EventId,
    function::{Function, LocalId},
    instructions::{ContextVariable, Instruction},
    values::{Constant, ParamId, TempId, Value},
};
use arith::BinOp;
use std::collections::HashMap;
use thiserror::Error;

pub const DEFAULT_STEP_LIMIT: usize = 100_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpError {
    #[error("expected {expected} arguments, got {got}")]
    ArityMismatch { expected: usize, got: usize },
    #[error("use of undefined value {0}")]
    UndefinedValue(String),
    #[error("load from {0} before any store")]
    UninitializedLocal(LocalId),
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("phi in {block} has no input for predecessor {pred:?}")]
    MissingPhiInput { block: BlockId, pred: Option<BlockId> },
    #[error("call to {0} produced no result")]
    MissingCallResult(String),
    #[error("{0} has no terminator")]
    UnterminatedBlock(BlockId),
    #[error("jump to unknown {0}")]
    UnknownBlock(BlockId),
    #[error("step limit of {0} exceeded")]
    StepLimitExceeded(usize),
}

/// Internal control signal: either a hard error or an `assert`-style panic
/// raised by an instruction.
#[derive(Debug)]
pub(crate) enum Fault {
    Panic,
    Error(InterpError),
}

impl From<InterpError> for Fault {
    fn from(err: InterpError) -> Self {
        Fault::Error(err)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Returned(Option<Constant>),
    Reverted(Option<Constant>),
    Panicked,
}

impl Outcome {
    pub fn returned(&self) -> Option<&Constant> {
        match self {
            Outcome::Returned(v) => v.as_ref(),
            _ => None,
        }
    }

    pub fn is_revert(&self) -> bool {
        matches!(self, Outcome::Reverted(_))
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Outcome::Panicked)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmittedEvent {
    pub event: EventId,
    pub topics: Vec<Constant>,
    pub data: Vec<Constant>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub callee: String,
    pub args: Vec<Constant>,
}

/// Everything observable about one run.
#[derive(Debug, Clone)]
pub struct Execution {
    pub outcome: Outcome,
    /// Labels of the blocks entered, in order.
    pub trace: Vec<String>,
    pub events: Vec<EmittedEvent>,
    pub calls: Vec<RecordedCall>,
    pub steps: usize,
}

impl Execution {
    pub fn visited(&self, label: &str) -> bool {
        self.trace.iter().any(|l| l == label)
    }

    pub fn visits(&self, label: &str) -> usize {
        self.trace.iter().filter(|l| *l == label).count()
    }
}

type CallHandler<'f> = Box<dyn FnMut(&str, &[Constant]) -> Option<Constant> + 'f>;

pub struct Interpreter<'f> {
    function: &'f Function,
    context: HashMap<ContextVariable, Constant>,
    step_limit: usize,
    on_call: CallHandler<'f>,
}

impl<'f> Interpreter<'f> {
    pub fn new(function: &'f Function) -> Self {
        Self {
            function,
            context: HashMap::new(),
            step_limit: DEFAULT_STEP_LIMIT,
            on_call: Box::new(|_, _| None),
        }
    }

    pub fn with_context(mut self, var: ContextVariable, value: Constant) -> Self {
        self.context.insert(var, value);
        self
    }

    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    /// Installs the handler that answers `call` instructions. Every call is
    /// recorded whether or not the handler returns a value.
    pub fn with_call_handler(
        mut self,
        handler: impl FnMut(&str, &[Constant]) -> Option<Constant> + 'f,
    ) -> Self {
        self.on_call = Box::new(handler);
        self
    }

    pub fn run(&mut self, args: &[Constant]) -> Result<Execution, InterpError> {
        let function = self.function;
        let expected = function.signature.params.len();
        if args.len() != expected {
            return Err(InterpError::ArityMismatch {
                expected,
                got: args.len(),
            });
        }

        let mut frame = Frame {
            args,
            temps: HashMap::new(),
            slots: vec![None; function.body.locals.len()],
        };
        let mut exec = Execution {
            outcome: Outcome::Returned(None),
            trace: Vec::new(),
            events: Vec::new(),
            calls: Vec::new(),
            steps: 0,
        };

        let mut pred: Option<BlockId> = None;
        let mut current = function.body.entry_block;

        loop {
            let block = function
                .body
                .get_block(current)
                .ok_or(InterpError::UnknownBlock(current))?;
            exec.trace.push(block.label.clone());

            for inst in &block.instructions {
                self.tick(&mut exec)?;
                match self.step(inst, current, pred, &mut frame, &mut exec) {
                    Ok(()) => {}
                    Err(Fault::Panic) => {
                        exec.outcome = Outcome::Panicked;
                        return Ok(exec);
                    }
                    Err(Fault::Error(err)) => return Err(err),
                }
            }

            self.tick(&mut exec)?;
            let next = match &block.terminator {
                Terminator::Jump(target) => *target,
                Terminator::Branch {
                    condition,
                    then_block,
                    else_block,
                } => {
                    if arith::truthy(&frame.get(condition)?)? {
                        *then_block
                    } else {
                        *else_block
                    }
                }
                Terminator::Return(value) => {
                    exec.outcome = Outcome::Returned(frame.get_opt(value.as_ref())?);
                    return Ok(exec);
                }
                Terminator::Revert(reason) => {
                    exec.outcome = Outcome::Reverted(frame.get_opt(reason.as_ref())?);
                    return Ok(exec);
                }
                Terminator::Panic => {
                    exec.outcome = Outcome::Panicked;
                    return Ok(exec);
                }
                Terminator::Invalid => return Err(InterpError::UnterminatedBlock(current)),
            };

            pred = Some(current);
            current = next;
        }
    }

    fn tick(&self, exec: &mut Execution) -> Result<(), InterpError> {
        exec.steps += 1;
        if exec.steps > self.step_limit {
            return Err(InterpError::StepLimitExceeded(self.step_limit));
        }
        Ok(())
    }

    fn step(
        &mut self,
        inst: &Instruction,
        block: BlockId,
        pred: Option<BlockId>,
        frame: &mut Frame<'_>,
        exec: &mut Execution,
    ) -> Result<(), Fault> {
        match inst {
            Instruction::Add {
                result,
                left,
                right,
                ty,
            } => frame.binary(BinOp::Add, result, left, right, ty),
            Instruction::Sub {
                result,
                left,
                right,
                ty,
            } => frame.binary(BinOp::Sub, result, left, right, ty),
            Instruction::Mul {
                result,
                left,
                right,
                ty,
            } => frame.binary(BinOp::Mul, result, left, right, ty),
            Instruction::Div {
                result,
                left,
                right,
                ty,
            } => frame.binary(BinOp::Div, result, left, right, ty),
            Instruction::Mod {
                result,
                left,
                right,
                ty,
            } => frame.binary(BinOp::Mod, result, left, right, ty),
            Instruction::Pow {
                result,
                base,
                exp,
                ty,
            } => frame.binary(BinOp::Pow, result, base, exp, ty),
            Instruction::Shl {
                result,
                value,
                shift,
                ty,
            } => frame.binary(BinOp::Shl, result, value, shift, ty),
            Instruction::Shr {
                result,
                value,
                shift,
                ty,
            } => frame.binary(BinOp::Shr, result, value, shift, ty),

            Instruction::And {
                result,
                left,
                right,
            }
            | Instruction::Or {
                result,
                left,
                right,
            }
            | Instruction::Xor {
                result,
                left,
                right,
            } => {
                let op = match inst {
                    Instruction::And { .. } => BinOp::And,
                    Instruction::Or { .. } => BinOp::Or,
                    _ => BinOp::Xor,
                };
                let l = frame.get(left)?;
                let ty = constant_type(&l);
                frame.binary(op, result, left, right, &ty)
            }
            Instruction::Not {
                result,
                operand,
                ty,
            } => {
                let v = arith::not(ty, &frame.get(operand)?)?;
                frame.define(result, v)
            }

            Instruction::Eq {
                result,
                left,
                right,
            } => {
                let eq = arith::equal(&frame.get(left)?, &frame.get(right)?)?;
                frame.define(result, Constant::Bool(eq))
            }
            Instruction::Ne {
                result,
                left,
                right,
            } => {
                let eq = arith::equal(&frame.get(left)?, &frame.get(right)?)?;
                frame.define(result, Constant::Bool(!eq))
            }
            Instruction::Lt {
                result,
                left,
                right,
            }
            | Instruction::Gt {
                result,
                left,
                right,
            }
            | Instruction::Le {
                result,
                left,
                right,
            }
            | Instruction::Ge {
                result,
                left,
                right,
            } => {
                let ord = arith::compare(&frame.get(left)?, &frame.get(right)?)?;
                let holds = match inst {
                    Instruction::Lt { .. } => ord.is_lt(),
                    Instruction::Gt { .. } => ord.is_gt(),
                    Instruction::Le { .. } => ord.is_le(),
                    _ => ord.is_ge(),
                };
                frame.define(result, Constant::Bool(holds))
            }

            Instruction::Load { result, local } => {
                let v = frame
                    .slots
                    .get(local.0 as usize)
                    .cloned()
                    .flatten()
                    .ok_or(InterpError::UninitializedLocal(*local))?;
                frame.define(result, v)
            }
            Instruction::Store { local, value } => {
                let v = frame.get(value)?;
                let slot = frame
                    .slots
                    .get_mut(local.0 as usize)
                    .ok_or_else(|| InterpError::UndefinedValue(local.to_string()))?;
                *slot = Some(v);
                Ok(())
            }

            Instruction::Call {
                result,
                callee,
                args,
            } => {
                let args = args
                    .iter()
                    .map(|a| frame.get(a))
                    .collect::<Result<Vec<_>, _>>()?;
                let answer = (self.on_call)(callee.as_str(), &args);
                exec.calls.push(RecordedCall {
                    callee: callee.clone(),
                    args,
                });
                match (result, answer) {
                    (Some(result), Some(v)) => frame.define(result, v),
                    (Some(_), None) => Err(InterpError::MissingCallResult(callee.clone()).into()),
                    (None, _) => Ok(()),
                }
            }

            Instruction::GetContext { result, var } => {
                let v = self
                    .context
                    .get(var)
                    .cloned()
                    .unwrap_or_else(|| Constant::zero(&var.ty()));
                frame.define(result, v)
            }

            Instruction::EmitEvent {
                event,
                topics,
                data,
            } => {
                let topics = topics
                    .iter()
                    .map(|v| frame.get(v))
                    .collect::<Result<Vec<_>, _>>()?;
                let data = data
                    .iter()
                    .map(|v| frame.get(v))
                    .collect::<Result<Vec<_>, _>>()?;
                exec.events.push(EmittedEvent {
                    event: *event,
                    topics,
                    data,
                });
                Ok(())
            }

            Instruction::Phi { result, values } => {
                let incoming = values
                    .iter()
                    .find(|(from, _)| Some(*from) == pred)
                    .map(|(_, v)| v)
                    .ok_or(InterpError::MissingPhiInput { block, pred })?;
                let v = frame.get(incoming)?;
                frame.define(result, v)
            }
        }
    }
}

struct Frame<'a> {
    args: &'a [Constant],
    temps: HashMap<TempId, Constant>,
    slots: Vec<Option<Constant>>,
}

impl Frame<'_> {
    fn get(&self, value: &Value) -> Result<Constant, InterpError> {
        match value {
            Value::Constant(c) => Ok(c.clone()),
            Value::Temp(t) => self
                .temps
                .get(t)
                .cloned()
                .ok_or_else(|| InterpError::UndefinedValue(t.to_string())),
            Value::Param(ParamId(index)) => self
                .args
                .get(*index as usize)
                .cloned()
                .ok_or_else(|| InterpError::UndefinedValue(value.to_string())),
        }
    }

    fn get_opt(&self, value: Option<&Value>) -> Result<Option<Constant>, InterpError> {
        value.map(|v| self.get(v)).transpose()
    }

    fn define(&mut self, result: &Value, value: Constant) -> Result<(), Fault> {
        match result {
            Value::Temp(t) => {
                self.temps.insert(*t, value);
                Ok(())
            }
            other => Err(InterpError::TypeMismatch(format!("{} is not a temporary", other)).into()),
        }
    }

    fn binary(
        &mut self,
        op: BinOp,
        result: &Value,
        left: &Value,
        right: &Value,
        ty: &crate::types::Type,
    ) -> Result<(), Fault> {
        let v = arith::binary(op, ty, &self.get(left)?, &self.get(right)?)?;
        self.define(result, v)
    }
}

fn constant_type(c: &Constant) -> crate::types::Type {
    use crate::types::Type;
    match c {
        Constant::Bool(_) => Type::Bool,
        Constant::Uint(_, bits) => Type::Uint(*bits),
        Constant::Int(_, bits) => Type::Int(*bits),
        Constant::Address(_) => Type::Address,
        Constant::Bytes(b) => Type::Bytes(b.len() as u8),
        Constant::String(_) => Type::String,
    }
}
