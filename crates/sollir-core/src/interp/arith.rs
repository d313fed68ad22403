use super::{Fault, InterpError};
use crate::types::Type;
use crate::values::Constant;
use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

/// Evaluates a binary operation at the width of `ty`. Integer results wrap.
/// Division and remainder by zero fault with a panic.
pub(crate) fn binary(op: BinOp, ty: &Type, a: &Constant, b: &Constant) -> Result<Constant, Fault> {
    if let (Type::Bool, Constant::Bool(x), Constant::Bool(y)) = (ty, a, b) {
        return match op {
            BinOp::And => Ok(Constant::Bool(*x && *y)),
            BinOp::Or => Ok(Constant::Bool(*x || *y)),
            BinOp::Xor => Ok(Constant::Bool(*x ^ *y)),
            _ => Err(mismatch(format!("{:?} on bool", op)).into()),
        };
    }

    let bits = ty
        .bits()
        .ok_or_else(|| mismatch(format!("{:?} on {}", op, ty)))?;
    let x = to_bigint(a)?;
    let y = to_bigint(b)?;

    let raw = match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        BinOp::Div => {
            if y.is_zero() {
                return Err(Fault::Panic);
            }
            x / y
        }
        BinOp::Mod => {
            if y.is_zero() {
                return Err(Fault::Panic);
            }
            x % y
        }
        BinOp::Pow => {
            if y.is_negative() {
                return Err(mismatch("negative exponent".to_string()).into());
            }
            x.modpow(&y, &modulus(bits))
        }
        BinOp::And => x & y,
        BinOp::Or => x | y,
        BinOp::Xor => x ^ y,
        BinOp::Shl | BinOp::Shr => {
            let shift = y.to_usize().filter(|s| *s < bits as usize);
            match (op, shift) {
                (BinOp::Shl, Some(s)) => x << s,
                (BinOp::Shr, Some(s)) => x >> s,
                (BinOp::Shr, None) if x.is_negative() => -BigInt::one(),
                _ => BigInt::zero(),
            }
        }
    };

    from_bigint(raw, ty).map_err(Fault::from)
}

pub(crate) fn not(ty: &Type, a: &Constant) -> Result<Constant, InterpError> {
    match (ty, a) {
        (_, Constant::Bool(b)) => Ok(Constant::Bool(!b)),
        _ => from_bigint(-to_bigint(a)? - 1, ty),
    }
}

pub(crate) fn equal(a: &Constant, b: &Constant) -> Result<bool, InterpError> {
    match (a, b) {
        (Constant::String(x), Constant::String(y)) => Ok(x == y),
        (Constant::Bool(x), Constant::Bool(y)) => Ok(x == y),
        _ => Ok(compare(a, b)? == Ordering::Equal),
    }
}

pub(crate) fn compare(a: &Constant, b: &Constant) -> Result<Ordering, InterpError> {
    Ok(to_bigint(a)?.cmp(&to_bigint(b)?))
}

pub(crate) fn truthy(c: &Constant) -> Result<bool, InterpError> {
    match c {
        Constant::Bool(b) => Ok(*b),
        other => Ok(!to_bigint(other)?.is_zero()),
    }
}

fn to_bigint(c: &Constant) -> Result<BigInt, InterpError> {
    match c {
        Constant::Uint(v, _) => Ok(BigInt::from(v.clone())),
        Constant::Int(v, _) => Ok(v.clone()),
        Constant::Bool(b) => Ok(BigInt::from(*b as u8)),
        Constant::Address(bytes) => Ok(BigInt::from_bytes_be(Sign::Plus, bytes)),
        Constant::Bytes(bytes) => Ok(BigInt::from_bytes_be(Sign::Plus, bytes)),
        Constant::String(_) => Err(mismatch("string used as a number".to_string())),
    }
}

fn from_bigint(x: BigInt, ty: &Type) -> Result<Constant, InterpError> {
    match ty {
        Type::Bool => Ok(Constant::Bool(!x.is_zero())),
        Type::Uint(bits) => Ok(Constant::Uint(wrap_unsigned(x, *bits), *bits)),
        Type::Int(bits) => {
            let m = modulus(*bits);
            let half = &m >> 1usize;
            let r = BigInt::from(wrap_unsigned(x, *bits));
            let signed = if r >= half { r - m } else { r };
            Ok(Constant::Int(signed, *bits))
        }
        Type::Address => Ok(Constant::Address(be_bytes::<20>(x, 160))),
        Type::Bytes(n) => {
            let bits = *n as u16 * 8;
            let (_, raw) = BigInt::from(wrap_unsigned(x, bits)).to_bytes_be();
            let mut out = vec![0u8; *n as usize];
            let offset = out.len().saturating_sub(raw.len());
            out[offset..].copy_from_slice(&raw[raw.len().saturating_sub(*n as usize)..]);
            Ok(Constant::Bytes(out))
        }
        Type::String => Err(mismatch("arithmetic on string".to_string())),
    }
}

fn wrap_unsigned(x: BigInt, bits: u16) -> num_bigint::BigUint {
    let m = modulus(bits);
    let r = ((x % &m) + &m) % &m;
    r.to_biguint().unwrap_or_default()
}

fn be_bytes<const N: usize>(x: BigInt, bits: u16) -> [u8; N] {
    let (_, raw) = BigInt::from(wrap_unsigned(x, bits)).to_bytes_be();
    let mut out = [0u8; N];
    let take = raw.len().min(N);
    out[N - take..].copy_from_slice(&raw[raw.len() - take..]);
    out
}

fn modulus(bits: u16) -> BigInt {
    BigInt::one() << bits as usize
}

fn mismatch(msg: String) -> InterpError {
    InterpError::TypeMismatch(msg)
}
