/*! Unified interface for SOLLIR function-body lowering.
 *
 * Single import for the IR, the lowering engine and the emitters. Hand it a typed source unit and
 * get back a contract of block graphs, or its text form.
 */

pub use sollir_codegen as codegen;
pub use sollir_core as ir;
pub use sollir_emit as emit;

pub use sollir_core::{
    block::{BasicBlock, BlockId, Terminator},
    contract::Contract,
    function::{Function, Mutability, Visibility},
    instructions::Instruction,
    interp::Interpreter,
    types::Type,
    values::Value,
};

pub use sollir_codegen::{compile_unit, CodegenError, CodegenOptions, SourceUnit};
pub use sollir_emit::{EmitterConfig, SollirEmitter};

/// Lowers `unit` and renders it with the default emitter settings.
pub fn compile_to_text(unit: &SourceUnit, options: CodegenOptions) -> anyhow::Result<String> {
    let contract = compile_unit(unit, options)?;
    SollirEmitter::default().render(&contract)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sollir_codegen::ast::{build, TypeName};

    #[test]
    fn test_compile_to_text() {
        let unit = SourceUnit {
            contract: "Empty".to_string(),
            events: vec![],
            functions: vec![build::function("noop", vec![], TypeName::Unit, vec![])],
        };
        let text = compile_to_text(&unit, CodegenOptions::default()).unwrap();
        assert!(text.contains("function %noop() public {"));
        assert!(text.contains("block1: ; return"));
    }
}
