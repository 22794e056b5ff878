//! Condition matching against complex states.
//!
//! A condition is an expression of the `varstate-expr` language evaluated
//! against a complex state. The state is exposed through these namespaces:
//!
//! - no namespace: `red` is true iff the state's `main` variable is `red`
//! - `LHS:name` - current value of variable (or dotted path) `name`
//! - `RHS:name` - the literal text `name`
//! - `any("pattern")` / `all("pattern")` range over the top-level variables
//!
//! Examples:
//! - `red || green`
//! - `LHS:mode == RHS:edit && LHS:panel.visibility != RHS:closed`
//! - `any("panel_.*") == "open"`

use crate::complex::{ComplexState, MAIN};
use crate::error::StateError;
use crate::state::State;
use std::fmt;
use varstate_expr::{Expr, ExprError, Scope, Value, Variable};

/// Pull-based provider of condition text.
pub trait TextSource {
    fn read(&self) -> String;
}

impl<F> TextSource for F
where
    F: Fn() -> String,
{
    fn read(&self) -> String {
        self()
    }
}

/// Tests whether complex states satisfy a textual condition.
///
/// The parsed expression is cached. A volatile source is re-read and
/// re-parsed before every match; otherwise the cache is kept until
/// [`ConditionMatcher::reparse`] is called.
pub struct ConditionMatcher {
    condition: Option<String>,
    source: Option<Box<dyn TextSource>>,
    volatile: bool,
    expression: Option<Expr>,
}

impl ConditionMatcher {
    /// Creates a matcher for a fixed condition, parsing it immediately.
    pub fn new(condition: impl Into<String>) -> Result<Self, StateError> {
        let mut matcher = Self {
            condition: Some(condition.into()),
            source: None,
            volatile: false,
            expression: None,
        };
        matcher.expression = Some(matcher.parse()?);
        Ok(matcher)
    }

    /// Creates a matcher whose condition is read from `source` on first use.
    pub fn from_source(source: impl TextSource + 'static) -> Self {
        Self {
            condition: None,
            source: Some(Box::new(source)),
            volatile: false,
            expression: None,
        }
    }

    /// Creates a matcher that re-reads and re-parses `source` on every match.
    pub fn volatile(source: impl TextSource + 'static) -> Self {
        Self {
            volatile: true,
            ..Self::from_source(source)
        }
    }

    /// Evaluates `condition` once against `state`.
    pub fn check(condition: &str, state: &State) -> Result<bool, StateError> {
        Self::new(condition)?.matches(state)
    }

    /// Returns the condition text, if it has been read yet.
    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn is_volatile(&self) -> bool {
        self.volatile
    }

    pub fn is_parsed(&self) -> bool {
        self.expression.is_some()
    }

    /// Re-reads the source (if any) and parses the condition again.
    pub fn reparse(&mut self) -> Result<(), StateError> {
        if let Some(source) = &self.source {
            self.condition = Some(source.read());
        }
        self.expression = Some(self.parse()?);
        Ok(())
    }

    /// Parses the condition, reading the source first if the condition is
    /// not known yet or the matcher is volatile.
    fn parse(&mut self) -> Result<Expr, StateError> {
        if self.condition.is_none() || self.volatile {
            if let Some(source) = &self.source {
                self.condition = Some(source.read());
            }
        }

        let condition = self.condition.as_deref().unwrap_or_default();
        let expression = varstate_expr::parse(condition).map_err(|source| {
            StateError::SyntaxError {
                condition: condition.to_string(),
                source,
            }
        })?;

        tracing::debug!(condition, "parsed state condition");
        Ok(expression)
    }

    /// Tests `state` against the condition.
    ///
    /// Simple states are not variable-addressable and never match.
    pub fn matches(&mut self, state: &State) -> Result<bool, StateError> {
        match state {
            State::Complex(complex) => self.matches_complex(complex),
            State::Simple(_) => Ok(false),
        }
    }

    /// Tests a complex state against the condition.
    pub fn matches_complex(&mut self, state: &ComplexState) -> Result<bool, StateError> {
        let expression = match self.expression.take() {
            Some(expression) if !self.volatile => expression,
            _ => self.parse()?,
        };

        let result = expression
            .is_true(&StateScope { state })
            .map_err(|source| StateError::ConditionEvaluationFailed {
                condition: self.condition.clone().unwrap_or_default(),
                source,
            });
        self.expression = Some(expression);
        result
    }
}

impl fmt::Debug for ConditionMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionMatcher")
            .field("condition", &self.condition)
            .field("has_source", &self.source.is_some())
            .field("volatile", &self.volatile)
            .field("expression", &self.expression)
            .finish()
    }
}

impl fmt::Display for ConditionMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[StateCondition: '{}']",
            self.condition.as_deref().unwrap_or_default()
        )
    }
}

/// Exposes a complex state to expression evaluation.
struct StateScope<'a> {
    state: &'a ComplexState,
}

impl Scope for StateScope<'_> {
    fn resolve_variable(&self, name: &str, namespace: Option<&str>) -> Option<Value> {
        tracing::trace!(name, namespace, "resolving condition reference");
        match namespace {
            None | Some("") => Some(Value::Bool(self.state.try_get(MAIN) == Some(name))),
            Some("LHS") => Some(Value::from(self.state.try_get(name))),
            Some("RHS") => Some(Value::from(name)),
            Some(_) => None,
        }
    }

    fn all_variables(&self, pattern: &str) -> Result<Vec<Variable>, ExprError> {
        let matching = self
            .state
            .get_matching(Some(pattern))
            .map_err(|e| ExprError::Scope(e.to_string()))?;

        Ok(matching
            .into_iter()
            .map(|(name, value)| Variable::new(name, value))
            .collect())
    }
}
