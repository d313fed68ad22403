/*! Graph queries over generated function bodies.
 *
 * Lowering creates a fresh block after every statement that leaves the current one, so a body
 * can hold blocks nothing jumps to. These helpers find them, flag them, and prune them when the
 * optimisation level asks for it.
 */

pub mod cfg;

pub use cfg::{mark_reachability, remove_unreachable_blocks, ControlFlowGraph};
