//! Scalar operator semantics.
//!
//! Integer arithmetic wraps (as released optimized C does), mixed
//! int/double operands promote to double, and integer division or
//! remainder by zero faults. Floating division by zero yields infinity,
//! matching IEEE semantics rather than faulting.

use ced_ir::{BinaryOp, Span, UnaryOp};
use ced_rt::{Fault, FaultKind, Value};

pub fn binary(op: BinaryOp, lhs: &Value, rhs: &Value, span: Span) -> Result<Value, Fault> {
    use BinaryOp::*;

    // String concatenation and comparisons.
    if let (Value::Str(a), Value::Str(b)) = (lhs, rhs) {
        return match op {
            Add => Ok(Value::string(format!("{a}{b}"))),
            Eq => Ok(Value::Bool(a == b)),
            NotEq => Ok(Value::Bool(a != b)),
            Lt => Ok(Value::Bool(a < b)),
            LtEq => Ok(Value::Bool(a <= b)),
            Gt => Ok(Value::Bool(a > b)),
            GtEq => Ok(Value::Bool(a >= b)),
            _ => Err(type_mismatch(op, lhs, rhs, span)),
        };
    }

    // Identity / null comparisons.
    if matches!(op, Eq | NotEq) {
        if let Some(result) = identity_compare(op, lhs, rhs) {
            return Ok(result);
        }
    }

    // Pure-integer operations.
    if let (Some(a), Some(b)) = (lhs.as_int(), rhs.as_int()) {
        if !matches!(lhs, Value::Double(_)) && !matches!(rhs, Value::Double(_)) {
            return int_binary(op, a, b, span).map_err(|k| {
                Fault::new(k, format!("integer {} by zero", op.symbol()), span)
            });
        }
    }

    // Numeric with promotion to double.
    if let (Some(a), Some(b)) = (lhs.as_double(), rhs.as_double()) {
        return double_binary(op, a, b).ok_or_else(|| type_mismatch(op, lhs, rhs, span));
    }

    Err(type_mismatch(op, lhs, rhs, span))
}

fn identity_compare(op: BinaryOp, lhs: &Value, rhs: &Value) -> Option<Value> {
    let equal = match (lhs, rhs) {
        (Value::Null, Value::Null) => true,
        (Value::Null, Value::Object(_) | Value::Array(_))
        | (Value::Object(_) | Value::Array(_), Value::Null) => false,
        (Value::Object(_), Value::Object(_)) | (Value::Array(_), Value::Array(_)) => {
            lhs == rhs
        }
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => return None,
    };
    Some(Value::Bool(if op == BinaryOp::Eq { equal } else { !equal }))
}

fn int_binary(op: BinaryOp, a: i64, b: i64, _span: Span) -> Result<Value, FaultKind> {
    use BinaryOp::*;
    let value = match op {
        Add => Value::Int(a.wrapping_add(b)),
        Sub => Value::Int(a.wrapping_sub(b)),
        Mul => Value::Int(a.wrapping_mul(b)),
        Div => {
            if b == 0 {
                return Err(FaultKind::Arithmetic);
            }
            Value::Int(a.wrapping_div(b))
        }
        Mod => {
            if b == 0 {
                return Err(FaultKind::Arithmetic);
            }
            Value::Int(a.wrapping_rem(b))
        }
        Shl => Value::Int(a.wrapping_shl(b as u32)),
        Shr => Value::Int(a.wrapping_shr(b as u32)),
        BitAnd => Value::Int(a & b),
        BitOr => Value::Int(a | b),
        BitXor => Value::Int(a ^ b),
        Lt => Value::Bool(a < b),
        LtEq => Value::Bool(a <= b),
        Gt => Value::Bool(a > b),
        GtEq => Value::Bool(a >= b),
        Eq => Value::Bool(a == b),
        NotEq => Value::Bool(a != b),
        And => Value::Bool(a != 0 && b != 0),
        Or => Value::Bool(a != 0 || b != 0),
    };
    Ok(value)
}

fn double_binary(op: BinaryOp, a: f64, b: f64) -> Option<Value> {
    use BinaryOp::*;
    let value = match op {
        Add => Value::Double(a + b),
        Sub => Value::Double(a - b),
        Mul => Value::Double(a * b),
        Div => Value::Double(a / b),
        Mod => Value::Double(a % b),
        Lt => Value::Bool(a < b),
        LtEq => Value::Bool(a <= b),
        Gt => Value::Bool(a > b),
        GtEq => Value::Bool(a >= b),
        Eq => Value::Bool(a == b),
        NotEq => Value::Bool(a != b),
        And => Value::Bool(a != 0.0 && b != 0.0),
        Or => Value::Bool(a != 0.0 || b != 0.0),
        // Bit operations never apply to floating point.
        Shl | Shr | BitAnd | BitOr | BitXor => return None,
    };
    Some(value)
}

pub fn unary(op: UnaryOp, operand: &Value, span: Span) -> Result<Value, Fault> {
    match (op, operand) {
        (UnaryOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
        (UnaryOp::Neg, Value::Double(d)) => Ok(Value::Double(-d)),
        (UnaryOp::Not, v) => match v.truthy() {
            Some(b) => Ok(Value::Bool(!b)),
            None => Err(Fault::new(
                FaultKind::TypeMismatch,
                format!("`!` does not apply to {}", v.type_name()),
                span,
            )),
        },
        (UnaryOp::BitNot, Value::Int(n)) => Ok(Value::Int(!n)),
        (UnaryOp::BitNot, Value::Char(c)) => Ok(Value::Int(!(*c as i64))),
        _ => Err(Fault::new(
            FaultKind::TypeMismatch,
            format!(
                "unary `{}` does not apply to {}",
                unary_symbol(op),
                operand.type_name()
            ),
            span,
        )),
    }
}

fn unary_symbol(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Neg => "-",
        UnaryOp::Not => "!",
        UnaryOp::BitNot => "~",
        UnaryOp::Deref => "*",
        UnaryOp::AddrOf => "&",
    }
}

fn type_mismatch(op: BinaryOp, lhs: &Value, rhs: &Value, span: Span) -> Fault {
    Fault::new(
        FaultKind::TypeMismatch,
        format!(
            "`{}` does not apply to {} and {}",
            op.symbol(),
            lhs.type_name(),
            rhs.type_name()
        ),
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn int_arithmetic() {
        let v = binary(BinaryOp::Add, &Value::Int(2), &Value::Int(3), Span::DUMMY).unwrap();
        assert_eq!(v, Value::Int(5));
        let v = binary(BinaryOp::Div, &Value::Int(7), &Value::Int(2), Span::DUMMY).unwrap();
        assert_eq!(v, Value::Int(3));
    }

    #[test]
    fn division_by_zero_faults() {
        let fault =
            binary(BinaryOp::Div, &Value::Int(1), &Value::Int(0), Span::DUMMY).unwrap_err();
        assert_eq!(fault.kind, FaultKind::Arithmetic);
        let fault =
            binary(BinaryOp::Mod, &Value::Int(1), &Value::Int(0), Span::DUMMY).unwrap_err();
        assert_eq!(fault.kind, FaultKind::Arithmetic);
    }

    #[test]
    fn mixed_operands_promote_to_double() {
        let v = binary(BinaryOp::Add, &Value::Int(1), &Value::Double(0.5), Span::DUMMY)
            .unwrap();
        assert_eq!(v, Value::Double(1.5));
        // Float division by zero is IEEE, not a fault.
        let v = binary(
            BinaryOp::Div,
            &Value::Double(1.0),
            &Value::Double(0.0),
            Span::DUMMY,
        )
        .unwrap();
        assert_eq!(v, Value::Double(f64::INFINITY));
    }

    #[test]
    fn string_concat_and_compare() {
        let v = binary(
            BinaryOp::Add,
            &Value::string("ab"),
            &Value::string("cd"),
            Span::DUMMY,
        )
        .unwrap();
        assert_eq!(v, Value::string("abcd"));
        let v = binary(
            BinaryOp::Eq,
            &Value::string("x"),
            &Value::string("x"),
            Span::DUMMY,
        )
        .unwrap();
        assert_eq!(v, Value::Bool(true));
    }

    #[test]
    fn null_comparison() {
        let obj = Value::object(ced_rt::ObjectData::new(ced_ir::Name::EMPTY));
        let v = binary(BinaryOp::Eq, &obj, &Value::Null, Span::DUMMY).unwrap();
        assert_eq!(v, Value::Bool(false));
        let v = binary(BinaryOp::NotEq, &obj, &Value::Null, Span::DUMMY).unwrap();
        assert_eq!(v, Value::Bool(true));
    }

    #[test]
    fn bitwise_on_doubles_is_a_type_mismatch() {
        let fault = binary(
            BinaryOp::BitAnd,
            &Value::Double(1.0),
            &Value::Int(1),
            Span::DUMMY,
        )
        .unwrap_err();
        assert_eq!(fault.kind, FaultKind::TypeMismatch);
    }
}
