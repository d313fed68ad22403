use crate::block::BlockId;
use crate::function::FunctionBody;
use crate::instructions::Instruction;
use std::collections::{HashMap, HashSet, VecDeque};

/// Edge view of a function body, computed once from the terminators.
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    pub edges: HashMap<BlockId, Vec<BlockId>>,
    pub reverse_edges: HashMap<BlockId, Vec<BlockId>>,
    pub entry: BlockId,
}

impl ControlFlowGraph {
    pub fn from_function(body: &FunctionBody) -> Self {
        let mut edges = HashMap::new();
        let mut reverse_edges = HashMap::new();

        for (block_id, block) in &body.blocks {
            let successors = block.terminator.successors();
            for &succ in &successors {
                reverse_edges
                    .entry(succ)
                    .or_insert_with(Vec::new)
                    .push(*block_id);
            }
            edges.insert(*block_id, successors);
        }

        Self {
            edges,
            reverse_edges,
            entry: body.entry_block,
        }
    }

    pub fn predecessors(&self, block: BlockId) -> &[BlockId] {
        self.reverse_edges
            .get(&block)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn successors(&self, block: BlockId) -> &[BlockId] {
        self.edges.get(&block).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn is_reachable(&self, block: BlockId) -> bool {
        self.reachable_blocks().contains(&block)
    }

    pub fn reachable_blocks(&self) -> HashSet<BlockId> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(self.entry);

        while let Some(current) = queue.pop_front() {
            if visited.insert(current) {
                for &succ in self.successors(current) {
                    queue.push_back(succ);
                }
            }
        }

        visited
    }
}

/// Records on every block whether it can be reached from entry. Returns the
/// number of unreachable blocks.
pub fn mark_reachability(body: &mut FunctionBody) -> usize {
    let reachable = ControlFlowGraph::from_function(body).reachable_blocks();
    let mut unreachable = 0;

    for (id, block) in body.blocks.iter_mut() {
        block.metadata.is_reachable = reachable.contains(id);
        if !block.metadata.is_reachable {
            unreachable += 1;
        }
    }

    unreachable
}

/// Drops blocks that cannot be reached from entry, along with phi inputs
/// that name them. Returns the ids that were removed, in creation order.
pub fn remove_unreachable_blocks(body: &mut FunctionBody) -> Vec<BlockId> {
    let reachable = ControlFlowGraph::from_function(body).reachable_blocks();
    let removed: Vec<BlockId> = body
        .blocks
        .keys()
        .filter(|id| !reachable.contains(id))
        .copied()
        .collect();

    if removed.is_empty() {
        return removed;
    }

    body.blocks.retain(|id, _| reachable.contains(id));

    for block in body.blocks.values_mut() {
        for inst in &mut block.instructions {
            if let Instruction::Phi { values, .. } = inst {
                values.retain(|(pred, _)| reachable.contains(pred));
            }
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FunctionBuilder;
    use crate::function::{Function, FunctionSignature};
    use crate::values::Value;

    fn diamond_with_orphan() -> Function {
        let mut func = Function::new(FunctionSignature::new("f"));
        let mut b = FunctionBuilder::new(&mut func);
        let then_bb = b.create_block("if.then");
        let else_bb = b.create_block("if.else");
        let end = b.create_block("if.end");
        let orphan = b.create_block("unreachable");

        b.branch(Value::bool(true), then_bb, else_bb).unwrap();
        b.switch_to_block(then_bb).unwrap();
        b.jump(end).unwrap();
        b.switch_to_block(else_bb).unwrap();
        b.jump(end).unwrap();
        b.switch_to_block(orphan).unwrap();
        b.jump(end).unwrap();
        b.switch_to_block(end).unwrap();
        b.ret(None).unwrap();
        func
    }

    #[test]
    fn predecessors_follow_terminators() {
        let func = diamond_with_orphan();
        let cfg = ControlFlowGraph::from_function(&func.body);
        let mut preds = cfg.predecessors(BlockId(3)).to_vec();
        preds.sort();
        assert_eq!(preds, vec![BlockId(1), BlockId(2), BlockId(4)]);
        assert_eq!(cfg.successors(BlockId(0)), &[BlockId(1), BlockId(2)]);
    }

    #[test]
    fn orphan_is_marked_and_removed() {
        let mut func = diamond_with_orphan();
        assert_eq!(mark_reachability(&mut func.body), 1);
        assert!(!func.body.blocks[&BlockId(4)].metadata.is_reachable);
        assert!(func.body.blocks[&BlockId(3)].metadata.is_reachable);

        let removed = remove_unreachable_blocks(&mut func.body);
        assert_eq!(removed, vec![BlockId(4)]);
        assert_eq!(func.body.blocks.len(), 4);
        func.body.verify().unwrap();
    }

    #[test]
    fn phi_inputs_from_removed_blocks_are_dropped() {
        let mut func = Function::new(FunctionSignature::new("f"));
        let mut b = FunctionBuilder::new(&mut func);
        let join = b.create_block("join");
        let dead = b.create_block("dead");
        let entry = b.entry_block();

        b.jump(join).unwrap();
        b.switch_to_block(dead).unwrap();
        b.jump(join).unwrap();
        b.switch_to_block(join).unwrap();
        let v = b
            .phi(vec![(entry, Value::bool(true)), (dead, Value::bool(false))])
            .unwrap();
        b.ret(Some(v)).unwrap();

        remove_unreachable_blocks(&mut func.body);
        match &func.body.blocks[&join].instructions[0] {
            Instruction::Phi { values, .. } => assert_eq!(values.len(), 1),
            other => panic!("expected phi, got {:?}", other),
        }
    }
}
