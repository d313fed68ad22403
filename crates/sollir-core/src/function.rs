use crate::block::{BasicBlock, BlockId};
use crate::types::Type;
use crate::values::ParamId;
use crate::{IrError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub signature: FunctionSignature,
    pub visibility: Visibility,
    pub mutability: Mutability,
    pub body: FunctionBody,
}

impl Function {
    pub fn new(signature: FunctionSignature) -> Self {
        Self {
            signature,
            visibility: Visibility::Public,
            mutability: Mutability::NonPayable,
            body: FunctionBody::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn entry_block(&self) -> BlockId {
        self.body.entry_block()
    }

    pub fn param(&self, index: usize) -> Option<(ParamId, &Parameter)> {
        self.signature
            .params
            .get(index)
            .map(|p| (ParamId(index as u32), p))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<Parameter>,
    pub returns: Option<Type>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: None,
        }
    }

    /// Canonical `name(type,...)` form used for selectors and diagnostics.
    pub fn canonical(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| p.param_type.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({})", self.name, params)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: Type,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: Type) -> Self {
        Self {
            name: name.into(),
            param_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    External,
    Internal,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

/// Block graph of one function. Blocks keep creation order, which is also
/// the order the emitter prints them in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionBody {
    pub entry_block: BlockId,
    pub blocks: IndexMap<BlockId, BasicBlock>,
    pub locals: Vec<LocalVariable>,
    next_block_id: u32,
}

impl FunctionBody {
    pub fn new() -> Self {
        let entry_block = BlockId(0);
        let mut blocks = IndexMap::new();
        blocks.insert(entry_block, BasicBlock::new(entry_block, "entry"));

        Self {
            entry_block,
            blocks,
            locals: Vec::new(),
            next_block_id: 1,
        }
    }

    pub fn create_block(&mut self, label: &str) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        self.blocks.insert(id, BasicBlock::new(id, label));
        id
    }

    pub fn get_block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(&id)
    }

    pub fn get_block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(&id)
    }

    pub fn entry_block(&self) -> BlockId {
        self.entry_block
    }

    /// Moves `id` after every other block without renumbering it.
    pub fn move_block_to_end(&mut self, id: BlockId) -> Result<()> {
        let block = self
            .blocks
            .shift_remove(&id)
            .ok_or(IrError::UnknownBlock(id))?;
        self.blocks.insert(id, block);
        Ok(())
    }

    pub fn add_local(&mut self, name: impl Into<String>, var_type: Type) -> LocalId {
        let id = LocalId(self.locals.len() as u32);
        self.locals.push(LocalVariable {
            id,
            name: name.into(),
            var_type,
        });
        id
    }

    pub fn local(&self, id: LocalId) -> Option<&LocalVariable> {
        self.locals.get(id.0 as usize)
    }

    /// True while nothing has been generated into the body.
    pub fn is_empty(&self) -> bool {
        self.blocks.len() == 1
            && self.locals.is_empty()
            && self
                .blocks
                .get(&self.entry_block)
                .map(|b| b.instructions.is_empty() && !b.is_terminated())
                .unwrap_or(true)
    }

    /// Flags every block with whether entry can reach it.
    pub fn mark_reachability(&mut self) -> usize {
        crate::analysis::mark_reachability(self)
    }

    pub fn remove_unreachable_blocks(&mut self) -> Vec<BlockId> {
        crate::analysis::remove_unreachable_blocks(self)
    }

    /// Checks the structural invariants of a finished graph: every block is
    /// terminated, every branch target exists, and every temporary is
    /// defined exactly once.
    pub fn verify(&self) -> Result<()> {
        let mut defined = HashSet::new();

        for (id, block) in &self.blocks {
            if !block.is_terminated() {
                return Err(IrError::UnterminatedBlock(*id));
            }

            for succ in block.successors() {
                if !self.blocks.contains_key(&succ) {
                    return Err(IrError::UnknownBlock(succ));
                }
            }

            for inst in &block.instructions {
                if let Some(temp) = inst.result().and_then(|v| v.as_temp()) {
                    if !defined.insert(temp) {
                        return Err(IrError::InvalidInstruction(format!(
                            "{} is defined more than once",
                            temp
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for FunctionBody {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalVariable {
    pub id: LocalId,
    pub name: String,
    pub var_type: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalId(pub u32);

impl std::fmt::Display for LocalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "l{}", self.0)
    }
}
