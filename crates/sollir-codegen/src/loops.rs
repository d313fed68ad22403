use crate::errors::{CodegenError, Result};
use sollir_core::BlockId;

/// Jump targets of one enclosing loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakContinue {
    pub break_block: BlockId,
    pub continue_block: BlockId,
}

/// Innermost loop last. `break` and `continue` always use the top entry.
#[derive(Debug, Default)]
pub struct BreakContinueStack {
    stack: Vec<BreakContinue>,
}

impl BreakContinueStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_loop(&mut self, break_block: BlockId, continue_block: BlockId) {
        self.stack.push(BreakContinue {
            break_block,
            continue_block,
        });
    }

    pub fn exit_loop(&mut self) -> Result<BreakContinue> {
        self.stack
            .pop()
            .ok_or(CodegenError::NoEnclosingLoop("exit_loop"))
    }

    pub fn current_break_target(&self) -> Result<BlockId> {
        self.stack
            .last()
            .map(|bc| bc.break_block)
            .ok_or(CodegenError::NoEnclosingLoop("break"))
    }

    pub fn current_continue_target(&self) -> Result<BlockId> {
        self.stack
            .last()
            .map(|bc| bc.continue_block)
            .ok_or(CodegenError::NoEnclosingLoop("continue"))
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn innermost_loop_wins() {
        let mut loops = BreakContinueStack::new();
        loops.enter_loop(BlockId(1), BlockId(2));
        loops.enter_loop(BlockId(3), BlockId(4));

        assert_eq!(loops.current_break_target(), Ok(BlockId(3)));
        assert_eq!(loops.current_continue_target(), Ok(BlockId(4)));

        loops.exit_loop().unwrap();
        assert_eq!(loops.current_break_target(), Ok(BlockId(1)));
        assert_eq!(loops.depth(), 1);
    }

    #[test]
    fn empty_stack_is_an_error() {
        let mut loops = BreakContinueStack::new();
        assert_eq!(
            loops.current_break_target(),
            Err(CodegenError::NoEnclosingLoop("break"))
        );
        assert_eq!(
            loops.current_continue_target(),
            Err(CodegenError::NoEnclosingLoop("continue"))
        );
        assert!(loops.exit_loop().is_err());
    }
}
