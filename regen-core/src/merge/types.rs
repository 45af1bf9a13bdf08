//! Structural equality of type expressions.
//!
//! Named types compare by printed name only; there is no notion of
//! compatible or aliased types, so a renamed-but-equivalent type is reported
//! as a change.

use crate::types::TypeExpr;

/// Printed form of an absent return type.
pub const NIL_TYPE: &str = "()";

/// Outcome of comparing two type expressions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeComparison {
    pub equal: bool,
    /// Canonical printed form of the previous type
    pub prev: String,
    /// Canonical printed form of the next type
    pub next: String,
}

/// Compare two type expressions structurally.
pub fn compare_types(prev: &TypeExpr, next: &TypeExpr) -> TypeComparison {
    TypeComparison {
        equal: types_equal(prev, next),
        prev: prev.to_string(),
        next: next.to_string(),
    }
}

/// Compare optional return types; an absent type prints as `()`.
pub fn compare_return_types(prev: Option<&TypeExpr>, next: Option<&TypeExpr>) -> TypeComparison {
    let print = |t: Option<&TypeExpr>| t.map_or_else(|| NIL_TYPE.to_string(), |t| t.to_string());
    TypeComparison {
        equal: optional_types_equal(prev, next),
        prev: print(prev),
        next: print(next),
    }
}

/// Equality of optional types; two absent types are equal.
pub fn optional_types_equal(prev: Option<&TypeExpr>, next: Option<&TypeExpr>) -> bool {
    match (prev, next) {
        (Some(prev), Some(next)) => types_equal(prev, next),
        (None, None) => true,
        _ => false,
    }
}

/// Recursive structural equality.
pub fn types_equal(prev: &TypeExpr, next: &TypeExpr) -> bool {
    match (prev, next) {
        (TypeExpr::Named(a), TypeExpr::Named(b)) => a == b,
        (TypeExpr::Optional(a), TypeExpr::Optional(b)) => types_equal(a, b),
        (TypeExpr::List(a), TypeExpr::List(b)) => types_equal(a, b),
        (
            TypeExpr::Stream {
                item: prev_item,
                completion: prev_completion,
            },
            TypeExpr::Stream {
                item: next_item,
                completion: next_completion,
            },
        ) => {
            types_equal(prev_item, next_item)
                && optional_types_equal(prev_completion.as_deref(), next_completion.as_deref())
        }
        _ => false,
    }
}
