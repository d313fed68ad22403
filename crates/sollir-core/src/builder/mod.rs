/*! Cursor-style construction of block graphs.
 *
 * Lowering code never touches blocks directly. It asks the builder for new blocks, points the
 * cursor at one, and appends instructions and a single terminator. The builder refuses to write
 * past a terminator, which is what keeps every block well formed.
 */

pub mod function_builder;

pub use function_builder::FunctionBuilder;
