//! Expression error types.

use thiserror::Error;

/// Errors from parsing or evaluating a condition expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("syntax error at position {position}: {reason}")]
    Syntax { position: usize, reason: String },

    #[error("unresolved reference: {}", display_reference(.namespace, .name))]
    Unresolved {
        namespace: Option<String>,
        name: String,
    },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("scope error: {0}")]
    Scope(String),
}

impl ExprError {
    /// Returns true if this error was raised while parsing rather than evaluating.
    pub fn is_syntax(&self) -> bool {
        matches!(self, ExprError::Syntax { .. })
    }
}

fn display_reference(namespace: &Option<String>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{}:{}", ns, name),
        None => name.to_string(),
    }
}
