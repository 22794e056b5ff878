//! Variable resolution seam between expressions and their host.

use crate::error::ExprError;
use crate::value::Value;

/// A named value exposed for quantified expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: Value,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Resolves references for an expression during evaluation.
///
/// A reference is written `name` (no namespace) or `ns:name`. What a
/// namespace means is entirely up to the scope; returning `None` makes the
/// evaluation fail with [`ExprError::Unresolved`].
pub trait Scope {
    /// Resolves `name` within `namespace`.
    fn resolve_variable(&self, name: &str, namespace: Option<&str>) -> Option<Value>;

    /// Returns every variable whose name matches `pattern`.
    fn all_variables(&self, pattern: &str) -> Result<Vec<Variable>, ExprError>;
}
