//! Core error types.

use thiserror::Error;
use varstate_expr::ExprError;

/// Errors from the state model.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("no such variable '{variable}' in complex state '{state}'")]
    UnknownVariable { variable: String, state: String },

    #[error("cannot set variable '{variable}' to '{value}' in complex state '{state}' (invalid value)")]
    InvalidValue {
        variable: String,
        value: String,
        state: String,
    },

    #[error("syntax error in state condition '{condition}': {source}")]
    SyntaxError {
        condition: String,
        source: ExprError,
    },

    #[error("evaluation of state condition '{condition}' failed: {source}")]
    ConditionEvaluationFailed {
        condition: String,
        source: ExprError,
    },

    #[error("cannot persist complex state '{state}' with sub state delegates")]
    UnsupportedPersistence { state: String },

    #[error("invalid variable pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("cannot restore {actual} values into a complex state with {expected} variables")]
    TooManyValues { expected: usize, actual: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl StateError {
    /// Returns an error code suitable for display in tooling.
    pub fn error_code(&self) -> &'static str {
        match self {
            StateError::UnknownVariable { .. } => "UNKNOWN_VARIABLE",
            StateError::InvalidValue { .. } => "INVALID_VALUE",
            StateError::SyntaxError { .. } => "SYNTAX_ERROR",
            StateError::ConditionEvaluationFailed { .. } => "CONDITION_EVALUATION_FAILED",
            StateError::UnsupportedPersistence { .. } => "UNSUPPORTED_PERSISTENCE",
            StateError::InvalidPattern { .. } => "BAD_REQUEST",
            StateError::TooManyValues { .. } => "BAD_REQUEST",
            StateError::Json(_) => "BAD_REQUEST",
            StateError::Yaml(_) => "BAD_REQUEST",
        }
    }
}
