use crate::ast::DeclId;
use sollir_core::IrError;
use thiserror::Error;

/// Invariant violations raised while lowering. Failures of the source
/// program (`require`, `assert`, `revert`) are not errors: they become
/// terminators in the generated graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodegenError {
    #[error("variable `{name}` ({id}) is declared twice")]
    DuplicateDeclaration { id: DeclId, name: String },

    #[error("use of {0} before its declaration")]
    UnboundVariable(DeclId),

    #[error("`{0}` outside of a loop")]
    NoEnclosingLoop(&'static str),

    #[error("return mismatch: {0}")]
    ReturnMismatch(String),

    #[error("`{name}` takes {expected} argument(s), got {got}")]
    BuiltinArity {
        name: String,
        expected: &'static str,
        got: usize,
    },

    #[error("event `{name}` takes {expected} argument(s), got {got}")]
    EventArity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("function `{0}` is defined twice")]
    DuplicateFunction(String),

    #[error("function `{0}` already has a body")]
    FunctionAlreadyLowered(String),

    #[error("unknown event `{0}`")]
    UnknownEvent(String),

    #[error("unsupported type `{0}`")]
    UnsupportedType(String),

    #[error("invalid literal: {0}")]
    InvalidLiteral(String),

    #[error("expression is not assignable")]
    NotAssignable,

    #[error("expression of type `{0}` used as a value")]
    NoValue(String),

    #[error("in function `{function}`: {source}")]
    InFunction {
        function: String,
        #[source]
        source: Box<CodegenError>,
    },

    #[error("IR builder error: {0}")]
    Ir(#[from] IrError),
}

impl CodegenError {
    pub fn in_function(self, function: &str) -> Self {
        match self {
            already @ CodegenError::InFunction { .. } => already,
            other => CodegenError::InFunction {
                function: function.to_string(),
                source: Box::new(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, CodegenError>;
