use super::*;
use crate::ast::build::*;
use crate::ast::{BinaryOp, TypeName, UnaryOp, VarDecl};
use crate::errors::CodegenError;
use pretty_assertions::assert_eq;
use sollir_core::{ContextVariable, Instruction};
use std::cell::RefCell;

#[test]
fn test_and_skips_right_operand() {
    // function f(bool a) returns (bool) { return a && b(); }
    let a = VarDecl::new(0, "a", TypeName::Bool);
    let decl = function(
        "f",
        vec![a.clone()],
        TypeName::Bool,
        vec![ret(Some(binary(
            BinaryOp::And,
            var(&a),
            call("b", vec![], TypeName::Bool),
        )))],
    );
    let f = lower(&decl);
    assert!(has_block(&f, "land.rhs"));
    assert!(has_block(&f, "land.end"));

    let exec = Interpreter::new(&f)
        .with_call_handler(|_, _| Some(Constant::Bool(true)))
        .run(&[Constant::Bool(false)])
        .unwrap();
    assert!(exec.calls.is_empty());
    assert_eq!(exec.outcome.returned(), Some(&Constant::Bool(false)));

    let exec = Interpreter::new(&f)
        .with_call_handler(|_, _| Some(Constant::Bool(true)))
        .run(&[Constant::Bool(true)])
        .unwrap();
    assert_eq!(exec.calls.len(), 1);
    assert_eq!(exec.calls[0].callee, "b");
    assert_eq!(exec.outcome.returned(), Some(&Constant::Bool(true)));
}

#[test]
fn test_or_skips_right_operand() {
    // bool r = a || b(); return r;
    let a = VarDecl::new(0, "a", TypeName::Bool);
    let r = VarDecl::new(1, "r", TypeName::Bool);
    let decl = function(
        "f",
        vec![a.clone()],
        TypeName::Bool,
        vec![
            decl(
                &r,
                Some(binary(
                    BinaryOp::Or,
                    var(&a),
                    call("b", vec![], TypeName::Bool),
                )),
            ),
            ret(Some(var(&r))),
        ],
    );
    let f = lower(&decl);

    let exec = Interpreter::new(&f)
        .with_call_handler(|_, _| Some(Constant::Bool(false)))
        .run(&[Constant::Bool(true)])
        .unwrap();
    assert!(exec.calls.is_empty());
    assert_eq!(exec.outcome.returned(), Some(&Constant::Bool(true)));

    let exec = Interpreter::new(&f)
        .with_call_handler(|_, _| Some(Constant::Bool(false)))
        .run(&[Constant::Bool(false)])
        .unwrap();
    assert_eq!(exec.calls.len(), 1);
    assert_eq!(exec.outcome.returned(), Some(&Constant::Bool(false)));
}

#[test]
fn test_condition_short_circuits_without_phi() {
    // if (a > 1 && b()) return 1; return 0;
    let a = VarDecl::new(0, "a", TypeName::Uint(256));
    let decl = function(
        "f",
        vec![a.clone()],
        TypeName::Uint(256),
        vec![
            if_(
                binary(
                    BinaryOp::And,
                    binary(BinaryOp::Gt, var(&a), lit_uint(1)),
                    call("b", vec![], TypeName::Bool),
                ),
                ret(Some(lit_uint(1))),
                None,
            ),
            ret(Some(lit_uint(0))),
        ],
    );
    let f = lower(&decl);

    let phis = f
        .body
        .blocks
        .values()
        .flat_map(|b| &b.instructions)
        .filter(|i| matches!(i, Instruction::Phi { .. }))
        .count();
    assert_eq!(phis, 0);

    let calls = RefCell::new(0);
    let exec = Interpreter::new(&f)
        .with_call_handler(|_, _| {
            *calls.borrow_mut() += 1;
            Some(Constant::Bool(true))
        })
        .run(&[uint(0)])
        .unwrap();
    assert_eq!(returned_int(&exec), 0);
    assert_eq!(*calls.borrow(), 0);

    let exec = Interpreter::new(&f)
        .with_call_handler(|_, _| Some(Constant::Bool(true)))
        .run(&[uint(2)])
        .unwrap();
    assert_eq!(returned_int(&exec), 1);
}

#[test]
fn test_negated_condition_swaps_targets() {
    // if (!(a == 0)) return 1; return 2;
    let a = VarDecl::new(0, "a", TypeName::Uint(256));
    let decl = function(
        "f",
        vec![a.clone()],
        TypeName::Uint(256),
        vec![
            if_(
                unary(UnaryOp::Not, binary(BinaryOp::Eq, var(&a), lit_uint(0))),
                ret(Some(lit_uint(1))),
                None,
            ),
            ret(Some(lit_uint(2))),
        ],
    );
    let f = lower(&decl);
    assert_eq!(returned_int(&run(&f, &[uint(7)])), 1);
    assert_eq!(returned_int(&run(&f, &[uint(0)])), 2);
}

#[test]
fn test_conditional_expression() {
    // return a > 5 ? 10 : 20;
    let a = VarDecl::new(0, "a", TypeName::Uint(256));
    let decl = function(
        "f",
        vec![a.clone()],
        TypeName::Uint(256),
        vec![ret(Some(conditional(
            binary(BinaryOp::Gt, var(&a), lit_uint(5)),
            lit_uint(10),
            lit_uint(20),
        )))],
    );
    let f = lower(&decl);
    assert!(has_block(&f, "cond.true"));
    assert!(has_block(&f, "cond.false"));
    assert!(has_block(&f, "cond.end"));

    let exec = run(&f, &[uint(6)]);
    assert_eq!(returned_int(&exec), 10);
    assert!(!exec.visited("cond.false"));
    assert_eq!(returned_int(&run(&f, &[uint(5)])), 20);
}

#[test]
fn test_compound_assignment_yields_stored_value() {
    // uint x = 1; return x += 2;
    let x = VarDecl::new(0, "x", TypeName::Uint(256));
    let decl = function(
        "f",
        vec![],
        TypeName::Uint(256),
        vec![
            decl(&x, Some(lit_uint(1))),
            ret(Some(assign_op(Some(BinaryOp::Add), var(&x), lit_uint(2)))),
        ],
    );
    assert_eq!(returned_int(&run(&lower(&decl), &[])), 3);
}

#[test]
fn test_signed_negation_and_wrapping() {
    // function f(int8 a) returns (int8) { return -a; }
    let a = VarDecl::new(0, "a", TypeName::Int(8));
    let decl = function(
        "f",
        vec![a.clone()],
        TypeName::Int(8),
        vec![ret(Some(unary(UnaryOp::Neg, var(&a))))],
    );
    let f = lower(&decl);
    let arg = |v: i64| Constant::Int(num_bigint::BigInt::from(v), 8);
    assert_eq!(returned_int(&run(&f, &[arg(5)])), -5);
    assert_eq!(returned_int(&run(&f, &[arg(-128)])), -128);
}

#[test]
fn test_context_reads() {
    let decl = function(
        "f",
        vec![],
        TypeName::Uint(256),
        vec![ret(Some(binary(
            BinaryOp::Add,
            context(ContextVariable::BlockNumber, TypeName::Uint(256)),
            call("gasleft", vec![], TypeName::Uint(256)),
        )))],
    );
    let f = lower(&decl);
    let exec = Interpreter::new(&f)
        .with_context(ContextVariable::BlockNumber, uint(100))
        .with_context(ContextVariable::GasLeft, uint(7))
        .run(&[])
        .unwrap();
    assert_eq!(returned_int(&exec), 107);
    assert!(exec.calls.is_empty());
}

#[test]
fn test_call_arguments_and_result() {
    // return add3(a, 2);
    let a = VarDecl::new(0, "a", TypeName::Uint(256));
    let decl = function(
        "f",
        vec![a.clone()],
        TypeName::Uint(256),
        vec![ret(Some(call(
            "add3",
            vec![var(&a), lit_uint(2)],
            TypeName::Uint(256),
        )))],
    );
    let f = lower(&decl);
    let exec = Interpreter::new(&f)
        .with_call_handler(|_, args| {
            let sum: i64 = args.iter().filter_map(|c| c.as_int()).sum();
            Some(uint(sum as u64 + 3))
        })
        .run(&[uint(4)])
        .unwrap();
    assert_eq!(returned_int(&exec), 9);
    assert_eq!(exec.calls[0].args, vec![uint(4), uint(2)]);
}

#[test]
fn test_call_arguments_evaluated_left_to_right() {
    // sink(g(), h());
    let decl = function(
        "f",
        vec![],
        TypeName::Unit,
        vec![expr(call(
            "sink",
            vec![
                call("g", vec![], TypeName::Uint(256)),
                call("h", vec![], TypeName::Uint(256)),
            ],
            TypeName::Unit,
        ))],
    );
    let f = lower(&decl);

    let entry = &f.body.blocks[&f.body.entry_block];
    let lowered: Vec<_> = entry
        .instructions
        .iter()
        .filter_map(|i| match i {
            Instruction::Call { callee, .. } => Some(callee.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(lowered, vec!["g", "h", "sink"]);

    let exec = Interpreter::new(&f)
        .with_call_handler(|callee, _| match callee {
            "g" => Some(uint(1)),
            "h" => Some(uint(2)),
            _ => None,
        })
        .run(&[])
        .unwrap();
    let order: Vec<_> = exec.calls.iter().map(|c| c.callee.as_str()).collect();
    assert_eq!(order, vec!["g", "h", "sink"]);
    assert_eq!(exec.calls[2].args, vec![uint(1), uint(2)]);
}

#[test]
fn test_void_call_used_as_value() {
    let x = VarDecl::new(0, "x", TypeName::Uint(256));
    let decl = function(
        "f",
        vec![],
        TypeName::Unit,
        vec![decl(&x, Some(call("g", vec![], TypeName::Unit)))],
    );
    match try_lower(&decl) {
        Err(CodegenError::InFunction { source, .. }) => {
            assert!(matches!(*source, CodegenError::NoValue(_)));
        }
        other => panic!("expected NoValue, got {:?}", other),
    }
}

#[test]
fn test_assigning_to_a_literal() {
    let decl = function(
        "f",
        vec![],
        TypeName::Unit,
        vec![expr(assign(lit_uint(1), lit_uint(2)))],
    );
    match try_lower(&decl) {
        Err(CodegenError::InFunction { source, .. }) => {
            assert_eq!(*source, CodegenError::NotAssignable);
        }
        other => panic!("expected NotAssignable, got {:?}", other),
    }
}

#[test]
fn test_unbound_variable() {
    let ghost = VarDecl::new(9, "ghost", TypeName::Uint(256));
    let decl = function(
        "f",
        vec![],
        TypeName::Uint(256),
        vec![ret(Some(var(&ghost)))],
    );
    match try_lower(&decl) {
        Err(CodegenError::InFunction { source, .. }) => {
            assert_eq!(*source, CodegenError::UnboundVariable(ghost.id));
        }
        other => panic!("expected UnboundVariable, got {:?}", other),
    }
}
