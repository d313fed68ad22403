/*! Block-graph IR for contract function bodies.
 *
 * Function bodies are lowered into basic blocks of straight-line instructions, each closed by
 * exactly one terminator. This crate owns that representation, the cursor builder that produces
 * it, the reachability queries run over it, and a small interpreter that executes it.
 */

pub mod analysis;
pub mod block;
pub mod builder;
pub mod contract;
pub mod function;
pub mod instructions;
pub mod interp;
pub mod types;
pub mod values;

pub use block::{BasicBlock, BlockId, BlockMetadata, Terminator};
pub use builder::FunctionBuilder;
pub use contract::{Contract, EventDefinition, EventId, EventParameter};
pub use function::{
    Function, FunctionBody, FunctionSignature, LocalId, LocalVariable, Mutability, Parameter,
    Visibility,
};
pub use instructions::{ContextVariable, Instruction};
pub use types::Type;
pub use values::{Constant, ParamId, TempId, Value};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    #[error("Invalid instruction: {0}")]
    InvalidInstruction(String),
    #[error("Block already terminated: {0}")]
    BlockTerminated(BlockId),
    #[error("Block has no terminator: {0}")]
    UnterminatedBlock(BlockId),
    #[error("Unknown block: {0}")]
    UnknownBlock(BlockId),
    #[error("Unknown local: {0}")]
    UnknownLocal(LocalId),
}

pub type Result<T> = std::result::Result<T, IrError>;

#[cfg(test)]
mod tests;
