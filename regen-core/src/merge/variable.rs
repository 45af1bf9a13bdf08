//! Parameter and field comparison.
//!
//! Parameters and fields share the same comparable surface (name, type,
//! default value), so both go through the [`Variable`] trait.

use crate::merge::types::{compare_types, types_equal, TypeComparison};
use crate::types::{Field, Parameter, TypeExpr};

/// A named, typed slot with an optional default value.
pub trait Variable {
    fn name(&self) -> &str;
    fn type_expr(&self) -> &TypeExpr;
    fn default_value(&self) -> Option<&str>;
}

impl Variable for Parameter {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_expr(&self) -> &TypeExpr {
        &self.type_expr
    }

    fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }
}

impl Variable for Field {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_expr(&self) -> &TypeExpr {
        &self.type_expr
    }

    fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }
}

/// Detail of a matched variable pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableComparison {
    pub name: String,
    pub types: TypeComparison,
    /// Default value of the previous variable, if it had one
    pub prev_default: Option<String>,
    /// Previous had a default and next does not
    pub default_removed: bool,
}

impl VariableComparison {
    pub fn type_changed(&self) -> bool {
        !self.types.equal
    }
}

/// Identity: names are equal.
pub fn matches<V: Variable>(prev: &V, next: &V) -> bool {
    prev.name() == next.name()
}

/// Matched, type-equal, and defaults both absent or textually equal.
pub fn equal<V: Variable>(prev: &V, next: &V) -> bool {
    matches(prev, next)
        && types_equal(prev.type_expr(), next.type_expr())
        && prev.default_value() == next.default_value()
}

pub fn default_value_removed<V: Variable>(prev: &V, next: &V) -> bool {
    prev.default_value().is_some() && next.default_value().is_none()
}

/// Compare a pair; `None` when the names differ.
pub fn compare_variables<V: Variable>(prev: &V, next: &V) -> Option<VariableComparison> {
    if !matches(prev, next) {
        return None;
    }

    Some(VariableComparison {
        name: next.name().to_string(),
        types: compare_types(prev.type_expr(), next.type_expr()),
        prev_default: prev.default_value().map(str::to_string),
        default_removed: default_value_removed(prev, next),
    })
}
