/*! Lower typed contract function bodies into SOLLIR block graphs.
 *
 * Input is a resolved, typed syntax tree: every variable reference points at a unique declaration
 * and every expression carries its type. Each function body becomes a graph of basic blocks with a
 * single exit block that performs the only `return`. Locals live in slots accessed through explicit
 * loads and stores, `&&`/`||` and `?:` short-circuit through real control flow, and `require`,
 * `assert` and `revert` become revert or panic terminators.
 *
 * ```
 * use sollir_codegen::{ast::build, generate_module, CodeGenModule, CodegenOptions};
 * use sollir_codegen::ast::{TypeName, VarDecl};
 *
 * let x = VarDecl::new(0, "x", TypeName::Uint(256));
 * let f = build::function(
 *     "double",
 *     vec![x.clone()],
 *     TypeName::Uint(256),
 *     vec![build::ret(Some(build::binary(
 *         sollir_codegen::ast::BinaryOp::Mul,
 *         build::var(&x),
 *         build::lit_uint(2),
 *     )))],
 * );
 *
 * let module = CodeGenModule::new("Math", CodegenOptions::default());
 * let functions = generate_module(&module, &[f]).unwrap();
 * assert_eq!(functions[0].name(), "double");
 * ```
 */

mod abort;
pub mod ast;
pub mod errors;
pub mod expr;
pub mod function;
pub mod loops;
pub mod module;
pub mod options;
pub mod scope;
mod stmt;
pub mod types;

pub use ast::{DeclId, FunctionDecl, SourceUnit};
pub use errors::{CodegenError, Result};
pub use expr::ExprValue;
pub use function::{generate, generate_module, FunctionCodegen};
pub use loops::{BreakContinue, BreakContinueStack};
pub use module::CodeGenModule;
pub use options::{CodegenOptions, DeployPlatform, OptLevel, Target};
pub use scope::LocalDeclMap;
pub use types::TypeCache;

/// Lowers a whole source unit into a contract: events first, then every
/// function in declaration order. With `runtime` set the constructor is left
/// out, since it only runs at deployment.
pub fn compile_unit(unit: &SourceUnit, options: CodegenOptions) -> Result<sollir_core::Contract> {
    let module = CodeGenModule::from_source(unit, options)?;
    let decls: Vec<&FunctionDecl> = unit
        .functions
        .iter()
        .filter(|f| !(options.runtime && f.name == CONSTRUCTOR))
        .collect();
    let functions = generate_module(&module, &decls)?;
    module.into_contract(functions)
}

pub const CONSTRUCTOR: &str = "constructor";

#[cfg(test)]
mod tests;
