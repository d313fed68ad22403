/*! Lowering tests.
 *
 * Each test builds a small typed function, lowers it, checks the shape of the resulting graph and
 * runs it through the interpreter to check what it computes.
 */

mod expression_tests;

use crate::ast::FunctionDecl;
use crate::{generate, CodeGenModule, CodegenOptions};
use num_bigint::{BigInt, BigUint};
use sollir_core::{
    interp::{Execution, Interpreter},
    Constant, Function, Terminator,
};

pub(crate) fn lower(decl: &FunctionDecl) -> Function {
    lower_with(decl, CodegenOptions::default())
}

pub(crate) fn lower_with(decl: &FunctionDecl, options: CodegenOptions) -> Function {
    let module = CodeGenModule::new("Test", options);
    let mut function = module.declare_function(decl).unwrap();
    generate(&module, decl, &mut function).unwrap();
    function
}

pub(crate) fn try_lower(decl: &FunctionDecl) -> crate::Result<Function> {
    let module = CodeGenModule::new("Test", CodegenOptions::default());
    let mut function = module.declare_function(decl)?;
    generate(&module, decl, &mut function)?;
    Ok(function)
}

pub(crate) fn run(function: &Function, args: &[Constant]) -> Execution {
    Interpreter::new(function).run(args).unwrap()
}

pub(crate) fn returned_int(exec: &Execution) -> i64 {
    exec.outcome
        .returned()
        .and_then(|c| c.as_int())
        .unwrap_or_else(|| panic!("expected an integer return, got {:?}", exec.outcome))
}

pub(crate) fn labels(function: &Function) -> Vec<&str> {
    function
        .body
        .blocks
        .values()
        .map(|b| b.label.as_str())
        .collect()
}

pub(crate) fn has_block(function: &Function, label: &str) -> bool {
    labels(function).contains(&label)
}

pub(crate) fn unreachable_labels(function: &Function) -> Vec<&str> {
    function
        .body
        .blocks
        .values()
        .filter(|b| !b.metadata.is_reachable)
        .map(|b| b.label.as_str())
        .collect()
}

pub(crate) fn return_count(function: &Function) -> usize {
    function
        .body
        .blocks
        .values()
        .filter(|b| matches!(b.terminator, Terminator::Return(_)))
        .count()
}

pub(crate) fn uint(v: u64) -> Constant {
    Constant::Uint(BigUint::from(v), 256)
}

pub(crate) fn int(v: i64) -> Constant {
    Constant::Int(BigInt::from(v), 256)
}
