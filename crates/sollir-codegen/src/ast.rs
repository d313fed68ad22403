/*! Typed syntax tree consumed by function-body lowering.
 *
 * The tree arrives after semantic analysis: every expression carries its resolved type and every
 * variable reference points at the declaration it binds to. Nothing here is looked up by name
 * except calls and events, which the module resolves.
 */

use serde::{Deserialize, Serialize};
use sollir_core::{ContextVariable, Mutability, Visibility};
use std::fmt;
use std::str::FromStr;

/// Identity of a variable declaration. Two declarations with the same name in
/// different scopes have different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclId(pub u32);

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decl#{}", self.0)
    }
}

/// Source-level type as written after semantic analysis. Serialised in its
/// Solidity spelling (`uint256`, `bytes32`, ...), with `()` for "no value".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeName {
    Bool,
    Uint(u16),
    Int(u16),
    Address,
    FixedBytes(u8),
    String,
    #[default]
    Unit,
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Bool => write!(f, "bool"),
            TypeName::Uint(bits) => write!(f, "uint{}", bits),
            TypeName::Int(bits) => write!(f, "int{}", bits),
            TypeName::Address => write!(f, "address"),
            TypeName::FixedBytes(n) => write!(f, "bytes{}", n),
            TypeName::String => write!(f, "string"),
            TypeName::Unit => write!(f, "()"),
        }
    }
}

impl FromStr for TypeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let width = |digits: &str| -> Result<u16, String> {
            digits
                .parse::<u16>()
                .map_err(|_| format!("bad width in type `{}`", s))
        };

        match s {
            "bool" => Ok(TypeName::Bool),
            "address" => Ok(TypeName::Address),
            "string" => Ok(TypeName::String),
            "uint" => Ok(TypeName::Uint(256)),
            "int" => Ok(TypeName::Int(256)),
            "()" | "" => Ok(TypeName::Unit),
            _ => {
                if let Some(bits) = s.strip_prefix("uint") {
                    Ok(TypeName::Uint(width(bits)?))
                } else if let Some(bits) = s.strip_prefix("int") {
                    Ok(TypeName::Int(width(bits)?))
                } else if let Some(n) = s.strip_prefix("bytes") {
                    Ok(TypeName::FixedBytes(width(n)? as u8))
                } else {
                    Err(format!("unknown type `{}`", s))
                }
            }
        }
    }
}

impl TryFrom<String> for TypeName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeName> for String {
    fn from(ty: TypeName) -> Self {
        ty.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub id: DeclId,
    pub name: String,
    pub ty: TypeName,
}

impl VarDecl {
    pub fn new(id: u32, name: impl Into<String>, ty: TypeName) -> Self {
        Self {
            id: DeclId(id),
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<VarDecl>,
    #[serde(default)]
    pub returns: TypeName,
    pub body: Vec<Stmt>,
    #[serde(default = "default_visibility")]
    pub visibility: Visibility,
    #[serde(default = "default_mutability")]
    pub mutability: Mutability,
}

fn default_visibility() -> Visibility {
    Visibility::Public
}

fn default_mutability() -> Mutability {
    Mutability::NonPayable
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<EventParam>,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventParam {
    pub name: String,
    pub ty: TypeName,
    #[serde(default)]
    pub indexed: bool,
}

/// One contract's worth of input for the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceUnit {
    pub contract: String,
    #[serde(default)]
    pub events: Vec<EventDecl>,
    pub functions: Vec<FunctionDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Stmt {
    Block {
        stmts: Vec<Stmt>,
    },
    Decl {
        var: VarDecl,
        #[serde(default)]
        init: Option<Expr>,
    },
    Expr {
        expr: Expr,
    },
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        #[serde(default)]
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        #[serde(default)]
        init: Option<Box<Stmt>>,
        #[serde(default)]
        cond: Option<Expr>,
        #[serde(default)]
        post: Option<Expr>,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Return {
        #[serde(default)]
        value: Option<Expr>,
    },
    Emit {
        event: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(default)]
    pub ty: TypeName,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum ExprKind {
    Literal {
        value: Literal,
    },
    Var {
        decl: DeclId,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        #[serde(default)]
        op: Option<BinaryOp>,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Call {
        callee: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Context {
        var: ContextVariable,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Bool(bool),
    /// Decimal digits, optionally with a leading `-`.
    Number(String),
    String(String),
    /// Hex digits, with or without `0x`.
    Address(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Not,
    BitNot,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge
        )
    }
}

/// Terse constructors for hand-written trees, mostly used by tests and
/// embedders that build input programmatically.
pub mod build {
    use super::*;

    pub fn lit_bool(value: bool) -> Expr {
        Expr {
            ty: TypeName::Bool,
            kind: ExprKind::Literal {
                value: Literal::Bool(value),
            },
        }
    }

    pub fn lit_uint(value: u64) -> Expr {
        lit_num(value.to_string(), TypeName::Uint(256))
    }

    pub fn lit_int(value: i64) -> Expr {
        lit_num(value.to_string(), TypeName::Int(256))
    }

    pub fn lit_num(digits: impl Into<String>, ty: TypeName) -> Expr {
        Expr {
            ty,
            kind: ExprKind::Literal {
                value: Literal::Number(digits.into()),
            },
        }
    }

    pub fn lit_str(value: &str) -> Expr {
        Expr {
            ty: TypeName::String,
            kind: ExprKind::Literal {
                value: Literal::String(value.to_string()),
            },
        }
    }

    pub fn var(decl: &VarDecl) -> Expr {
        Expr {
            ty: decl.ty.clone(),
            kind: ExprKind::Var { decl: decl.id },
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr {
            ty: operand.ty.clone(),
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        let ty = if op.is_logical() || op.is_comparison() {
            TypeName::Bool
        } else {
            left.ty.clone()
        };
        Expr {
            ty,
            kind: ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Expr {
        assign_op(None, target, value)
    }

    pub fn assign_op(op: Option<BinaryOp>, target: Expr, value: Expr) -> Expr {
        Expr {
            ty: target.ty.clone(),
            kind: ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
        }
    }

    pub fn call(callee: &str, args: Vec<Expr>, ty: TypeName) -> Expr {
        Expr {
            ty,
            kind: ExprKind::Call {
                callee: callee.to_string(),
                args,
            },
        }
    }

    pub fn conditional(cond: Expr, then_expr: Expr, else_expr: Expr) -> Expr {
        Expr {
            ty: then_expr.ty.clone(),
            kind: ExprKind::Conditional {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
        }
    }

    pub fn context(var: ContextVariable, ty: TypeName) -> Expr {
        Expr {
            ty,
            kind: ExprKind::Context { var },
        }
    }

    pub fn block(stmts: Vec<Stmt>) -> Stmt {
        Stmt::Block { stmts }
    }

    pub fn decl(var: &VarDecl, init: Option<Expr>) -> Stmt {
        Stmt::Decl {
            var: var.clone(),
            init,
        }
    }

    pub fn expr(expr: Expr) -> Stmt {
        Stmt::Expr { expr }
    }

    pub fn if_(cond: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
        Stmt::If {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        }
    }

    pub fn while_(cond: Expr, body: Stmt) -> Stmt {
        Stmt::While {
            cond,
            body: Box::new(body),
        }
    }

    pub fn do_while(body: Stmt, cond: Expr) -> Stmt {
        Stmt::DoWhile {
            body: Box::new(body),
            cond,
        }
    }

    pub fn for_(init: Option<Stmt>, cond: Option<Expr>, post: Option<Expr>, body: Stmt) -> Stmt {
        Stmt::For {
            init: init.map(Box::new),
            cond,
            post,
            body: Box::new(body),
        }
    }

    pub fn ret(value: Option<Expr>) -> Stmt {
        Stmt::Return { value }
    }

    pub fn emit(event: &str, args: Vec<Expr>) -> Stmt {
        Stmt::Emit {
            event: event.to_string(),
            args,
        }
    }

    pub fn function(name: &str, params: Vec<VarDecl>, returns: TypeName, body: Vec<Stmt>) -> FunctionDecl {
        FunctionDecl {
            name: name.to_string(),
            params,
            returns,
            body,
            visibility: Visibility::Public,
            mutability: Mutability::NonPayable,
        }
    }
}
