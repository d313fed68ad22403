use crate::analysis::{mark_reachability, ControlFlowGraph};
use crate::builder::FunctionBuilder;
use crate::function::{Function, FunctionSignature, Parameter};
use crate::interp::{Interpreter, Outcome};
use crate::types::Type;
use crate::values::{Constant, ParamId, Value};
use num_bigint::BigUint;
use pretty_assertions::assert_eq;

fn uint(v: u64) -> Constant {
    Constant::Uint(BigUint::from(v), 256)
}

fn signature(name: &str, params: &[&str], returns: Option<Type>) -> FunctionSignature {
    let mut sig = FunctionSignature::new(name);
    sig.params = params
        .iter()
        .map(|p| Parameter::new(*p, Type::Uint(256)))
        .collect();
    sig.returns = returns;
    sig
}

#[test]
fn test_if_else() {
    let mut func = Function::new(signature("if_else", &["x"], Some(Type::Uint(256))));
    let mut b = FunctionBuilder::new(&mut func);
    let x = Value::Param(ParamId(0));
    let ret = b.add_local("retval", Type::Uint(256));

    let then_bb = b.create_block("if.then");
    let else_bb = b.create_block("if.else");
    let end = b.create_block("if.end");

    let cond = b.gt(x.clone(), Value::uint(100, 256)).unwrap();
    b.branch(cond, then_bb, else_bb).unwrap();

    b.switch_to_block(then_bb).unwrap();
    let doubled = b.mul(x.clone(), Value::uint(2, 256), Type::Uint(256)).unwrap();
    b.store(ret, doubled).unwrap();
    b.jump(end).unwrap();

    b.switch_to_block(else_bb).unwrap();
    let halved = b.div(x, Value::uint(2, 256), Type::Uint(256)).unwrap();
    b.store(ret, halved).unwrap();
    b.jump(end).unwrap();

    b.switch_to_block(end).unwrap();
    let v = b.load(ret).unwrap();
    b.ret(Some(v)).unwrap();

    func.body.verify().unwrap();

    let exec = Interpreter::new(&func).run(&[uint(200)]).unwrap();
    assert_eq!(exec.outcome, Outcome::Returned(Some(uint(400))));
    let exec = Interpreter::new(&func).run(&[uint(10)]).unwrap();
    assert_eq!(exec.outcome, Outcome::Returned(Some(uint(5))));
    assert_eq!(exec.trace, vec!["entry", "if.else", "if.end"]);
}

#[test]
fn test_loop() {
    let mut func = Function::new(signature("sum_to_n", &["n"], Some(Type::Uint(256))));
    let mut b = FunctionBuilder::new(&mut func);
    let n = Value::Param(ParamId(0));
    let i = b.add_local("i", Type::Uint(256));
    let sum = b.add_local("sum", Type::Uint(256));

    let cond_bb = b.create_block("while.cond");
    let body_bb = b.create_block("while.body");
    let end_bb = b.create_block("while.end");

    b.store(i, Value::uint(0, 256)).unwrap();
    b.store(sum, Value::uint(0, 256)).unwrap();
    b.jump(cond_bb).unwrap();

    b.switch_to_block(cond_bb).unwrap();
    let iv = b.load(i).unwrap();
    let more = b.lt(iv, n).unwrap();
    b.branch(more, body_bb, end_bb).unwrap();

    b.switch_to_block(body_bb).unwrap();
    let iv = b.load(i).unwrap();
    let sv = b.load(sum).unwrap();
    let sv = b.add(sv, iv.clone(), Type::Uint(256)).unwrap();
    b.store(sum, sv).unwrap();
    let iv = b.add(iv, Value::uint(1, 256), Type::Uint(256)).unwrap();
    b.store(i, iv).unwrap();
    b.jump(cond_bb).unwrap();

    b.switch_to_block(end_bb).unwrap();
    let sv = b.load(sum).unwrap();
    b.ret(Some(sv)).unwrap();

    func.body.verify().unwrap();

    let cfg = ControlFlowGraph::from_function(&func.body);
    assert_eq!(cfg.predecessors(cond_bb).len(), 2);

    let exec = Interpreter::new(&func).run(&[uint(5)]).unwrap();
    assert_eq!(exec.outcome.returned(), Some(&uint(10)));
    assert_eq!(exec.visits("while.body"), 5);
    assert_eq!(exec.visits("while.cond"), 6);
}

#[test]
fn test_require_style_revert() {
    let mut func = Function::new(signature("safe_divide", &["num", "den"], Some(Type::Uint(256))));
    let mut b = FunctionBuilder::new(&mut func);
    let num = Value::Param(ParamId(0));
    let den = Value::Param(ParamId(1));

    let cont = b.create_block("require.cont");
    let fail = b.create_block("require.fail");

    let ok = b.ne(den.clone(), Value::uint(0, 256)).unwrap();
    b.branch(ok, cont, fail).unwrap();

    b.switch_to_block(fail).unwrap();
    b.revert(Some(Value::string("Division by zero"))).unwrap();

    b.switch_to_block(cont).unwrap();
    let q = b.div(num, den, Type::Uint(256)).unwrap();
    b.ret(Some(q)).unwrap();

    let exec = Interpreter::new(&func).run(&[uint(9), uint(0)]).unwrap();
    assert_eq!(
        exec.outcome,
        Outcome::Reverted(Some(Constant::String("Division by zero".into())))
    );

    let exec = Interpreter::new(&func).run(&[uint(9), uint(3)]).unwrap();
    assert_eq!(exec.outcome.returned(), Some(&uint(3)));
}

#[test]
fn test_block_after_return_is_unreachable() {
    let mut func = Function::new(signature("early", &[], None));
    let mut b = FunctionBuilder::new(&mut func);
    let dead = b.create_block("unreachable");
    b.ret(None).unwrap();
    b.switch_to_block(dead).unwrap();
    b.ret(None).unwrap();

    assert_eq!(mark_reachability(&mut func.body), 1);
    assert!(!func.body.blocks[&dead].metadata.is_reachable);

    let exec = Interpreter::new(&func).run(&[]).unwrap();
    assert!(!exec.visited("unreachable"));
}
