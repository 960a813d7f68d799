//! Exact constant values and Go's constant arithmetic.
//!
//! Integer constants are held as `i128`, which covers every typed Go
//! integer and untyped values far beyond 64 bits. Untyped arithmetic that
//! leaves that range is reported as an overflow.

use super::types::{BasicKind, Type};
use crate::go_parser::ast::{BinaryOp, UnaryOp};
use std::fmt;

/// Errors are plain messages; the resolver attaches the source position.
pub type OpResult<T> = std::result::Result<T, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    /// A constant of an imported package; its value is not loaded.
    External { package: String, name: String },
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Bool(b) => write!(f, "{}", b),
            ConstValue::Int(v) => write!(f, "{}", v),
            ConstValue::Float(v) => write!(f, "{}", v),
            ConstValue::Str(s) => write!(f, "{:?}", s),
            ConstValue::External { package, name } => write!(f, "{}.{}", package, name),
        }
    }
}

/// A typed (or untyped) constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub value: ConstValue,
    pub ty: Type,
}

impl Constant {
    pub fn new(value: ConstValue, ty: Type) -> Self {
        Self { value, ty }
    }

    pub fn untyped_int(value: i128) -> Self {
        Self::new(ConstValue::Int(value), Type::untyped_int())
    }

    pub fn untyped_bool(value: bool) -> Self {
        Self::new(ConstValue::Bool(value), Type::untyped_bool())
    }

    pub fn int_value(&self) -> Option<i128> {
        match self.value {
            ConstValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self.value, ConstValue::External { .. })
    }

    fn describe(&self) -> String {
        if self.ty.is_untyped() {
            format!("{} ({} constant)", self.value, self.ty)
        } else {
            format!("{} (constant of type {})", self.value, self.ty)
        }
    }
}

/// Value of an integer literal, accepting `_` separators and all of Go's
/// radix prefixes, including legacy `0777` octal.
pub fn parse_int_literal(text: &str) -> Option<i128> {
    let clean: String = text.chars().filter(|c| *c != '_').collect();
    let lower = clean.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (&lower[1..], 8)
    } else {
        (lower.as_str(), 10)
    };
    i128::from_str_radix(digits, radix).ok()
}

/// Value of a floating-point literal, decimal or hexadecimal.
pub fn parse_float_literal(text: &str) -> Option<f64> {
    let clean: String = text.chars().filter(|c| *c != '_').collect();
    let lower = clean.to_ascii_lowercase();
    let Some(hex) = lower.strip_prefix("0x") else {
        return lower.parse::<f64>().ok();
    };

    let (mantissa, exponent) = match hex.split_once('p') {
        Some((m, e)) => (m, e.parse::<i32>().ok()?),
        None => (hex, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mut value = 0f64;
    for c in int_part.chars().chain(frac_part.chars()) {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let scale = exponent - 4 * frac_part.len() as i32;
    Some(value * 2f64.powi(scale))
}

/// Explicit conversion `T(x)`.
pub fn convert(x: Constant, target: &Type) -> OpResult<Constant> {
    if x.is_external() {
        return Ok(Constant::new(x.value, target.clone()));
    }
    match target.underlying() {
        Type::Opaque(_) => Ok(Constant::new(x.value, target.clone())),
        Type::Composite(_) | Type::Named { .. } => Err(format!(
            "cannot convert {} to type {}",
            x.describe(),
            target
        )),
        Type::Basic(kind) => {
            let from_integer = x.ty.basic().is_some_and(|k| k.is_integer());
            let value = coerce(&x, *kind, target, from_integer)?;
            Ok(Constant::new(value, target.clone()))
        }
    }
}

/// Implicit conversion of a constant used where a value of `target` is
/// expected: a typed declaration, or the other operand of a binary
/// operation. Typed constants must already have the target type.
pub fn assign(x: Constant, target: &Type) -> OpResult<Constant> {
    if x.is_external() {
        return Ok(Constant::new(x.value, target.clone()));
    }
    if !x.ty.is_untyped() {
        if x.ty == *target {
            return Ok(x);
        }
        return Err(format!("cannot use {} as {} value", x.describe(), target));
    }
    match target.underlying() {
        Type::Opaque(_) => Ok(Constant::new(x.value, target.clone())),
        Type::Basic(kind) => {
            let source = x.ty.basic().unwrap_or(BasicKind::UntypedInt);
            let compatible = (source.is_numeric() && kind.is_numeric())
                || (source.is_string() && kind.is_string())
                || (source.is_bool() && kind.is_bool());
            if !compatible {
                return Err(format!("cannot use {} as {} value", x.describe(), target));
            }
            let value = coerce(&x, *kind, target, false)?;
            Ok(Constant::new(value, target.clone()))
        }
        _ => Err(format!("cannot use {} as {} value", x.describe(), target)),
    }
}

fn coerce(x: &Constant, kind: BasicKind, target: &Type, from_integer: bool) -> OpResult<ConstValue> {
    let fail = || format!("cannot convert {} to type {}", x.describe(), target);
    if kind.is_integer() {
        let value = match &x.value {
            ConstValue::Int(v) => *v,
            ConstValue::Float(f) if f.fract() == 0.0 && f.abs() < 1.7e38 => *f as i128,
            ConstValue::Float(_) => return Err(format!("{} (truncated)", fail())),
            _ => return Err(fail()),
        };
        return check_int_range(value, kind, target).map(ConstValue::Int);
    }
    if kind.is_float() {
        let value = match &x.value {
            ConstValue::Int(v) => *v as f64,
            ConstValue::Float(f) => *f,
            _ => return Err(fail()),
        };
        return round_float(value, kind, target).map(ConstValue::Float);
    }
    if kind.is_complex() {
        return Err(format!("complex constant of type {} is not supported", target));
    }
    if kind.is_string() {
        return match &x.value {
            ConstValue::Str(s) => Ok(ConstValue::Str(s.clone())),
            ConstValue::Int(v) if from_integer => {
                let ch = u32::try_from(*v)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or('\u{FFFD}');
                Ok(ConstValue::Str(ch.to_string()))
            }
            _ => Err(fail()),
        };
    }
    match &x.value {
        ConstValue::Bool(b) if kind.is_bool() => Ok(ConstValue::Bool(*b)),
        _ => Err(fail()),
    }
}

fn check_int_range(value: i128, kind: BasicKind, ty: &Type) -> OpResult<i128> {
    match kind.int_range() {
        Some((lo, hi)) if value < lo || value > hi => {
            Err(format!("constant {} overflows {}", value, ty))
        }
        _ => Ok(value),
    }
}

fn round_float(value: f64, kind: BasicKind, ty: &Type) -> OpResult<f64> {
    let rounded = if kind == BasicKind::Float32 {
        value as f32 as f64
    } else {
        value
    };
    if rounded.is_finite() {
        Ok(rounded)
    } else {
        Err(format!("constant {} overflows {}", value, ty))
    }
}

/// Range-check the result of an operation against its type.
fn finish(value: ConstValue, ty: Type) -> OpResult<Constant> {
    let value = match (value, ty.basic()) {
        (ConstValue::Int(v), Some(kind)) => ConstValue::Int(check_int_range(v, kind, &ty)?),
        (ConstValue::Float(f), Some(kind)) => ConstValue::Float(round_float(f, kind, &ty)?),
        (value, _) => value,
    };
    Ok(Constant::new(value, ty))
}

fn overflow() -> String {
    "constant overflow".to_string()
}

pub fn unary(op: UnaryOp, x: Constant) -> OpResult<Constant> {
    if x.is_external() {
        return Ok(x);
    }
    let kind = x.ty.basic();
    let not_defined = |x: &Constant| {
        format!(
            "invalid operation: operator {} not defined on {}",
            unary_symbol(op),
            x.describe()
        )
    };
    let value = match (op, &x.value) {
        (UnaryOp::Plus, ConstValue::Int(_) | ConstValue::Float(_)) => x.value.clone(),
        (UnaryOp::Neg, ConstValue::Int(v)) => ConstValue::Int(v.checked_neg().ok_or_else(overflow)?),
        (UnaryOp::Neg, ConstValue::Float(v)) => ConstValue::Float(-v),
        (UnaryOp::Not, ConstValue::Bool(b)) => ConstValue::Bool(!b),
        (UnaryOp::Complement, ConstValue::Int(v)) => match kind {
            Some(k) if k.is_unsigned() => {
                let (_, mask) = k.int_range().ok_or_else(|| not_defined(&x))?;
                ConstValue::Int(mask ^ v)
            }
            _ => ConstValue::Int(!v),
        },
        (UnaryOp::Deref | UnaryOp::Addr | UnaryOp::Recv, _) => {
            return Err(format!("{}{} is not constant", unary_symbol(op), x.value));
        }
        _ => return Err(not_defined(&x)),
    };
    finish(value, x.ty)
}

fn unary_symbol(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Plus => "+",
        UnaryOp::Neg => "-",
        UnaryOp::Not => "!",
        UnaryOp::Complement => "^",
        UnaryOp::Deref => "*",
        UnaryOp::Addr => "&",
        UnaryOp::Recv => "<-",
    }
}

pub fn binary(op: BinaryOp, x: Constant, y: Constant) -> OpResult<Constant> {
    if x.is_external() || y.is_external() {
        let (external, other) = if x.is_external() { (x, y) } else { (y, x) };
        let ty = if op.is_comparison() {
            Type::untyped_bool()
        } else if !other.is_external() && !other.ty.is_untyped() {
            other.ty
        } else {
            external.ty
        };
        return Ok(Constant::new(external.value, ty));
    }
    if op.is_shift() {
        return shift(op, x, y);
    }

    let (x, y) = match_types(x, y)?;
    if op.is_comparison() {
        return compare(op, &x, &y).map(Constant::untyped_bool);
    }

    let not_defined = || {
        format!(
            "invalid operation: operator {} not defined on {}",
            op.as_str(),
            x.describe()
        )
    };
    let value = match (&x.value, &y.value) {
        (ConstValue::Int(a), ConstValue::Int(b)) => {
            let (a, b) = (*a, *b);
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Sub => a.checked_sub(b),
                BinaryOp::Mul => a.checked_mul(b),
                BinaryOp::Div | BinaryOp::Rem if b == 0 => {
                    return Err("invalid operation: division by zero".to_string());
                }
                BinaryOp::Div => a.checked_div(b),
                BinaryOp::Rem => a.checked_rem(b),
                BinaryOp::And => Some(a & b),
                BinaryOp::Or => Some(a | b),
                BinaryOp::Xor => Some(a ^ b),
                BinaryOp::AndNot => Some(a & !b),
                _ => return Err(not_defined()),
            };
            ConstValue::Int(result.ok_or_else(overflow)?)
        }
        (ConstValue::Float(a), ConstValue::Float(b)) => {
            let (a, b) = (*a, *b);
            ConstValue::Float(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div if b == 0.0 => {
                    return Err("invalid operation: division by zero".to_string());
                }
                BinaryOp::Div => a / b,
                _ => return Err(not_defined()),
            })
        }
        (ConstValue::Str(a), ConstValue::Str(b)) if op == BinaryOp::Add => {
            ConstValue::Str(format!("{}{}", a, b))
        }
        (ConstValue::Bool(a), ConstValue::Bool(b)) => match op {
            BinaryOp::LogicalAnd => ConstValue::Bool(*a && *b),
            BinaryOp::LogicalOr => ConstValue::Bool(*a || *b),
            _ => return Err(not_defined()),
        },
        _ => return Err(not_defined()),
    };
    finish(value, x.ty)
}

/// Bring both operands to a common type.
fn match_types(x: Constant, y: Constant) -> OpResult<(Constant, Constant)> {
    match (x.ty.is_untyped(), y.ty.is_untyped()) {
        (false, false) if x.ty != y.ty => Err(format!(
            "invalid operation: mismatched types {} and {}",
            x.ty, y.ty
        )),
        (false, false) => Ok((x, y)),
        (true, false) => {
            let ty = y.ty.clone();
            Ok((assign(x, &ty)?, y))
        }
        (false, true) => {
            let ty = x.ty.clone();
            Ok((x, assign(y, &ty)?))
        }
        (true, true) => {
            let (kx, ky) = (
                x.ty.basic().unwrap_or(BasicKind::UntypedInt),
                y.ty.basic().unwrap_or(BasicKind::UntypedInt),
            );
            if kx.is_numeric() && ky.is_numeric() {
                let kind = if kx.untyped_rank() >= ky.untyped_rank() { kx } else { ky };
                let ty = Type::Basic(kind);
                Ok((promote(x, &ty), promote(y, &ty)))
            } else if kx == ky {
                Ok((x, y))
            } else {
                Err(format!(
                    "invalid operation: mismatched types {} and {}",
                    x.ty, y.ty
                ))
            }
        }
    }
}

fn promote(x: Constant, ty: &Type) -> Constant {
    let value = match (x.value, ty.basic()) {
        (ConstValue::Int(v), Some(BasicKind::UntypedFloat)) => ConstValue::Float(v as f64),
        (value, _) => value,
    };
    Constant::new(value, ty.clone())
}

fn compare(op: BinaryOp, x: &Constant, y: &Constant) -> OpResult<bool> {
    use std::cmp::Ordering;
    let ordering = match (&x.value, &y.value) {
        (ConstValue::Int(a), ConstValue::Int(b)) => a.partial_cmp(b),
        (ConstValue::Float(a), ConstValue::Float(b)) => a.partial_cmp(b),
        (ConstValue::Str(a), ConstValue::Str(b)) => a.partial_cmp(b),
        (ConstValue::Bool(a), ConstValue::Bool(b)) => {
            return match op {
                BinaryOp::Eq => Ok(a == b),
                BinaryOp::Ne => Ok(a != b),
                _ => Err(format!(
                    "invalid operation: operator {} not defined on {}",
                    op.as_str(),
                    x.describe()
                )),
            };
        }
        _ => None,
    };
    let ordering = ordering.ok_or_else(|| {
        format!(
            "invalid operation: cannot compare {} and {}",
            x.describe(),
            y.describe()
        )
    })?;
    Ok(match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::Ne => ordering != Ordering::Equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        _ => ordering != Ordering::Less,
    })
}

fn shift(op: BinaryOp, x: Constant, y: Constant) -> OpResult<Constant> {
    let count = match (&y.value, y.ty.basic()) {
        (ConstValue::Int(v), _) => *v,
        (ConstValue::Float(f), Some(BasicKind::UntypedFloat)) if f.fract() == 0.0 => *f as i128,
        _ => return Err(format!("invalid shift count {}", y.describe())),
    };
    if count < 0 {
        return Err(format!("invalid shift count {} (negative)", y.value));
    }

    let (value, ty) = match (&x.value, x.ty.is_untyped()) {
        (ConstValue::Int(v), _) => (*v, x.ty.clone()),
        (ConstValue::Float(f), true) if f.fract() == 0.0 && f.abs() < 1.7e38 => {
            (*f as i128, Type::untyped_int())
        }
        _ => {
            return Err(format!(
                "invalid operation: shifted operand {} must be integer",
                x.describe()
            ));
        }
    };

    let result = match op {
        BinaryOp::Shl if value == 0 => 0,
        BinaryOp::Shl => {
            if count >= 127 {
                return Err(overflow());
            }
            let shifted = value << count;
            if shifted >> count != value {
                return Err(overflow());
            }
            shifted
        }
        _ if count >= 127 => {
            if value < 0 {
                -1
            } else {
                0
            }
        }
        _ => value >> count,
    };
    finish(ConstValue::Int(result), ty)
}
