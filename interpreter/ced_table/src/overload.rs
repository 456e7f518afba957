//! Overload selection.
//!
//! Arity filters first, then each argument is ranked against its parameter:
//! 0 exact, 1 promotion, 2 conversion. A candidate wins only if it beats
//! every other viable candidate (no worse in any argument, strictly better
//! in one); anything less decisive is ambiguous.

use crate::OverloadError;
use ced_ir::{Name, Param, TypeRef};
use ced_rt::Value;

pub const RANK_EXACT: u8 = 0;
pub const RANK_PROMOTION: u8 = 1;
pub const RANK_CONVERSION: u8 = 2;

/// Context the ranker needs from the caller.
pub struct RankContext<'a> {
    /// Whether the first class transitively derives from the second.
    pub is_base_of: &'a dyn Fn(Name, Name) -> bool,
    /// The interned name of the builtin `string` type.
    pub string_type: Name,
}

impl<'a> RankContext<'a> {
    fn upcast(&self, derived: Name, base: Name) -> bool {
        (self.is_base_of)(base, derived)
    }
}

/// Rank one argument against a parameter type, or `None` when no
/// conversion exists.
pub fn rank_argument(value: &Value, ty: &TypeRef, ctx: &RankContext<'_>) -> Option<u8> {
    match (value, ty) {
        // References bind like their referent.
        (_, TypeRef::Reference(inner)) => rank_argument(value, inner, ctx),

        (Value::Int(_), TypeRef::Int)
        | (Value::Double(_), TypeRef::Double)
        | (Value::Bool(_), TypeRef::Bool)
        | (Value::Char(_), TypeRef::Char) => Some(RANK_EXACT),

        (Value::Str(_), TypeRef::Named(n)) if *n == ctx.string_type => Some(RANK_EXACT),
        (Value::Str(_), TypeRef::Pointer(inner)) if **inner == TypeRef::Char => {
            Some(RANK_EXACT)
        }

        (Value::Null, TypeRef::Pointer(_)) => Some(RANK_EXACT),

        (Value::Object(obj), TypeRef::Named(n) | TypeRef::Template(n, _)) => {
            rank_class(obj.borrow().class, *n, ctx)
        }
        (Value::Object(obj), TypeRef::Pointer(inner)) => {
            let class = obj.borrow().class;
            inner.class_name().and_then(|n| rank_class(class, n, ctx))
        }

        (Value::Array(_), TypeRef::Array(..)) => Some(RANK_EXACT),
        // Array-to-pointer decay.
        (Value::Array(_), TypeRef::Pointer(_)) => Some(RANK_PROMOTION),

        // Standard promotions.
        (Value::Int(_), TypeRef::Double) | (Value::Char(_), TypeRef::Int) => {
            Some(RANK_PROMOTION)
        }

        // Everything else the C family still allows, reluctantly.
        (Value::Bool(_), TypeRef::Int | TypeRef::Double)
        | (Value::Int(_), TypeRef::Bool | TypeRef::Char)
        | (Value::Double(_), TypeRef::Int | TypeRef::Bool)
        | (Value::Char(_), TypeRef::Double | TypeRef::Bool) => Some(RANK_CONVERSION),

        _ => None,
    }
}

fn rank_class(actual: Name, expected: Name, ctx: &RankContext<'_>) -> Option<u8> {
    if actual == expected {
        Some(RANK_EXACT)
    } else if ctx.upcast(actual, expected) {
        Some(RANK_CONVERSION)
    } else {
        None
    }
}

/// Picks the best candidate for `args`, returning its index.
pub fn select_overload(
    candidates: &[&[Param]],
    args: &[Value],
    ctx: &RankContext<'_>,
) -> Result<usize, OverloadError> {
    let mut viable: Vec<(usize, Vec<u8>)> = Vec::new();
    for (idx, params) in candidates.iter().enumerate() {
        if params.len() != args.len() {
            continue;
        }
        let ranks: Option<Vec<u8>> = args
            .iter()
            .zip(params.iter())
            .map(|(arg, param)| rank_argument(arg, &param.ty, ctx))
            .collect();
        if let Some(ranks) = ranks {
            viable.push((idx, ranks));
        }
    }

    match viable.len() {
        0 => Err(OverloadError::NoViable),
        1 => Ok(viable[0].0),
        _ => {
            for (idx, ranks) in &viable {
                let wins_all = viable
                    .iter()
                    .filter(|(other, _)| other != idx)
                    .all(|(_, other_ranks)| beats(ranks, other_ranks));
                if wins_all {
                    return Ok(*idx);
                }
            }
            Err(OverloadError::Ambiguous(
                viable.into_iter().map(|(idx, _)| idx).collect(),
            ))
        }
    }
}

/// No worse in any argument, strictly better in at least one.
fn beats(a: &[u8], b: &[u8]) -> bool {
    a.iter().zip(b).all(|(x, y)| x <= y) && a.iter().zip(b).any(|(x, y)| x < y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ced_ir::{Span, StringInterner};
    use pretty_assertions::assert_eq;

    fn param(ty: TypeRef) -> Param {
        Param {
            name: ced_ir::Name::EMPTY,
            ty,
            span: Span::DUMMY,
        }
    }

    fn ctx(interner: &StringInterner) -> RankContext<'_> {
        RankContext {
            is_base_of: &|_, _| false,
            string_type: interner.intern("string"),
        }
    }

    #[test]
    fn exact_beats_promotion() {
        let interner = StringInterner::new();
        let int_params = [param(TypeRef::Int)];
        let dbl_params = [param(TypeRef::Double)];
        let candidates: Vec<&[Param]> = vec![&dbl_params, &int_params];

        let picked =
            select_overload(&candidates, &[Value::Int(1)], &ctx(&interner)).unwrap();
        assert_eq!(picked, 1);
    }

    #[test]
    fn arity_filters_candidates() {
        let interner = StringInterner::new();
        let one = [param(TypeRef::Int)];
        let two = [param(TypeRef::Int), param(TypeRef::Int)];
        let candidates: Vec<&[Param]> = vec![&one, &two];

        let picked = select_overload(
            &candidates,
            &[Value::Int(1), Value::Int(2)],
            &ctx(&interner),
        )
        .unwrap();
        assert_eq!(picked, 1);
    }

    #[test]
    fn equal_conversions_are_ambiguous() {
        let interner = StringInterner::new();
        // double(1) needs a conversion either way: to int or to bool.
        let int_params = [param(TypeRef::Int)];
        let bool_params = [param(TypeRef::Bool)];
        let candidates: Vec<&[Param]> = vec![&int_params, &bool_params];

        let err =
            select_overload(&candidates, &[Value::Double(1.5)], &ctx(&interner)).unwrap_err();
        assert_eq!(err, OverloadError::Ambiguous(vec![0, 1]));
    }

    #[test]
    fn no_viable_candidate() {
        let interner = StringInterner::new();
        let int_params = [param(TypeRef::Int)];
        let candidates: Vec<&[Param]> = vec![&int_params];

        let err =
            select_overload(&candidates, &[Value::string("s")], &ctx(&interner)).unwrap_err();
        assert_eq!(err, OverloadError::NoViable);
    }

    #[test]
    fn mixed_ranks_must_dominate() {
        let interner = StringInterner::new();
        // f(int, double) vs f(double, int) with (int, int) arguments:
        // each wins one slot, so neither dominates.
        let a = [param(TypeRef::Int), param(TypeRef::Double)];
        let b = [param(TypeRef::Double), param(TypeRef::Int)];
        let candidates: Vec<&[Param]> = vec![&a, &b];

        let err = select_overload(
            &candidates,
            &[Value::Int(1), Value::Int(2)],
            &ctx(&interner),
        )
        .unwrap_err();
        assert!(matches!(err, OverloadError::Ambiguous(_)));
    }
}
