//! Complex states: validated variables plus named sub-states.
//!
//! A complex state holds one value slot per variable of its specification.
//! Variables are read with [`ComplexState::get`] and written with
//! [`ComplexState::set`], which validates against the variable's domain.
//! Sub-states are addressed with dotted paths: `panel.visibility` reads
//! `visibility` inside the sub-state bound as `panel`.
//!
//! The composite identifier lists `name=value` for each variable followed by
//! `name[child]` for each sub-state:
//!
//! ```text
//! color=red,mode=edit,panel[visibility=open]
//! ```

use crate::error::StateError;
use crate::specification::{split_fields, StateSpecification};
use crate::state::State;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Dotted-path name under which an opaque sub-state exposes its identifier.
pub const MAIN: &str = "main";

/// A state made of named, validated variables and optional sub-states.
#[derive(Debug, Clone)]
pub struct ComplexState {
    specification: Arc<StateSpecification>,
    values: Vec<Option<String>>,
    descriptions: Vec<Option<String>>,
    sub_states: Vec<(String, State)>,
}

impl ComplexState {
    /// Creates a state with the specification's initial values.
    pub fn new(specification: Arc<StateSpecification>) -> Result<Self, StateError> {
        Self::with_values(specification, std::iter::empty::<Option<String>>())
    }

    /// Creates a state with explicit values, position by position.
    ///
    /// A `None` (or missing) position falls back to the variable's initial
    /// value. Every applied value is validated. Values beyond the number of
    /// variables are ignored.
    pub fn with_values<I, S>(
        specification: Arc<StateSpecification>,
        values: I,
    ) -> Result<Self, StateError>
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let len = specification.len();
        let mut state = Self {
            specification,
            values: vec![None; len],
            descriptions: vec![None; len],
            sub_states: Vec::new(),
        };

        let mut values = values.into_iter();
        for index in 0..len {
            let explicit = values.next().flatten().map(Into::into);
            let value =
                explicit.or_else(|| state.specification.variables()[index].initial.clone());
            if let Some(value) = value {
                state.assign(index, value)?;
            }
        }

        Ok(state)
    }

    /// Creates a state from definition strings and values.
    ///
    /// Without definitions, variables are named by position.
    pub fn from_definitions<D, V>(
        definitions: Option<&[D]>,
        values: Option<&[V]>,
    ) -> Result<Self, StateError>
    where
        D: AsRef<str>,
        V: AsRef<str>,
    {
        let specification = Arc::new(StateSpecification::compute(definitions, values));
        let values = values
            .unwrap_or_default()
            .iter()
            .map(|v| Some(v.as_ref().to_string()));
        Self::with_values(specification, values)
    }

    /// Creates a state from the all-in-one form `definitions#values`.
    ///
    /// Definitions and values are both `;`-separated, e.g.
    /// `color:red/Like a rose,green/As hope#red`. Anything after a second
    /// `#` is ignored.
    pub fn parse(all_in_one: &str) -> Result<Self, StateError> {
        let mut parts = all_in_one.split('#');
        let definitions = parts.next().unwrap_or_default();
        let values = parts.next().unwrap_or_default();

        let definitions = (!definitions.is_empty()).then(|| split_fields(definitions, ';'));
        let values = (!values.is_empty()).then(|| split_fields(values, ';'));

        Self::from_definitions(definitions.as_deref(), values.as_deref())
    }

    /// Binds a sub-state under `name`.
    pub fn with_sub_state(mut self, name: impl Into<String>, state: impl Into<State>) -> Self {
        self.sub_states.push((name.into(), state.into()));
        self
    }

    /// Replaces all sub-state bindings.
    pub fn set_sub_states(&mut self, sub_states: Vec<(String, State)>) {
        self.sub_states = sub_states;
    }

    pub fn clear_sub_states(&mut self) {
        self.sub_states.clear();
    }

    pub fn sub_states(&self) -> &[(String, State)] {
        &self.sub_states
    }

    /// Returns the first sub-state bound under `name`.
    pub fn sub_state(&self, name: &str) -> Option<&State> {
        self.sub_states
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    pub fn sub_state_mut(&mut self, name: &str) -> Option<&mut State> {
        self.sub_states
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    pub fn specification(&self) -> &Arc<StateSpecification> {
        &self.specification
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.specification.names()
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn descriptions(&self) -> &[Option<String>] {
        &self.descriptions
    }

    /// Resolves a variable or dotted path.
    ///
    /// The outer `None` means nothing is addressed by `variable`; the inner
    /// `None` means the variable exists but holds no value.
    fn lookup(&self, variable: &str) -> Option<Option<&str>> {
        match variable.split_once('.') {
            None => self
                .specification
                .index_of(variable)
                .map(|i| self.values[i].as_deref()),
            Some((namespace, rest)) => match self.sub_state(namespace)? {
                State::Complex(child) => child.lookup(rest),
                State::Simple(child) if rest == MAIN => Some(Some(child.id())),
                State::Simple(_) => None,
            },
        }
    }

    /// Returns the current value of a variable or dotted path, or `None` if
    /// nothing resolves.
    pub fn try_get(&self, variable: &str) -> Option<&str> {
        self.lookup(variable).flatten()
    }

    /// Returns the current value of a variable or dotted path.
    ///
    /// Fails with [`StateError::UnknownVariable`] if nothing is addressed.
    /// A declared variable that was never assigned yields `Ok(None)`.
    pub fn get(&self, variable: &str) -> Result<Option<&str>, StateError> {
        self.lookup(variable)
            .ok_or_else(|| self.unknown_variable(variable))
    }

    /// Assigns a value to a top-level variable after validating it against
    /// the variable's domain.
    pub fn set(&mut self, variable: &str, value: impl Into<String>) -> Result<(), StateError> {
        let index = self
            .specification
            .index_of(variable)
            .ok_or_else(|| self.unknown_variable(variable))?;
        self.assign(index, value.into())
    }

    pub(crate) fn assign(&mut self, index: usize, value: String) -> Result<(), StateError> {
        let description = self.validate(index, &value)?;
        self.store(index, Some(value), description);
        Ok(())
    }

    /// Checks `value` against the domain of the variable at `index` and
    /// returns its resolved description.
    pub(crate) fn validate(
        &self,
        index: usize,
        value: &str,
    ) -> Result<Option<String>, StateError> {
        let variable = &self.specification.variables()[index];
        let Some(domain) = &variable.domain else {
            return Ok(None);
        };

        domain.describe(&variable.name, value).map(Some).ok_or_else(|| {
            tracing::warn!(
                variable = %variable.name,
                value = %value,
                "rejected value outside domain"
            );
            StateError::InvalidValue {
                variable: variable.name.clone(),
                value: value.to_string(),
                state: self.id(),
            }
        })
    }

    /// Writes a slot that has already been validated. `None` unsets it.
    pub(crate) fn store(
        &mut self,
        index: usize,
        value: Option<String>,
        description: Option<String>,
    ) {
        tracing::debug!(
            variable = %self.specification.variables()[index].name,
            value = value.as_deref().unwrap_or_default(),
            "set state variable"
        );
        self.values[index] = value;
        self.descriptions[index] = description;
    }

    /// Returns all top-level `(name, value)` pairs whose name matches
    /// `pattern` as a whole, in declaration order. `None` matches all.
    pub fn get_matching(
        &self,
        pattern: Option<&str>,
    ) -> Result<Vec<(&str, Option<&str>)>, StateError> {
        let regex = pattern
            .map(|p| {
                Regex::new(&format!("^(?:{})$", p)).map_err(|e| StateError::InvalidPattern {
                    pattern: p.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(self
            .specification
            .names()
            .zip(&self.values)
            .filter(|(name, _)| regex.as_ref().map_or(true, |r| r.is_match(name)))
            .map(|(name, value)| (name, value.as_deref()))
            .collect())
    }

    /// Composite identifier, e.g. `color=red,panel[visibility=open]`.
    pub fn id(&self) -> String {
        self.compose(
            |name, value, _| format!("{}={}", name, value.unwrap_or_default()),
            State::id,
        )
    }

    /// Composite description, e.g. `Like a rose,panel[Visible]`.
    ///
    /// Variables without a domain description render as `name=value`.
    pub fn description(&self) -> String {
        self.compose(
            |name, value, description| match description {
                Some(description) => description.to_string(),
                None => format!("{}={}", name, value.unwrap_or_default()),
            },
            State::description,
        )
    }

    fn compose(
        &self,
        own: impl Fn(&str, Option<&str>, Option<&str>) -> String,
        child: impl Fn(&State) -> String,
    ) -> String {
        let variables = self
            .specification
            .names()
            .zip(self.values.iter().zip(&self.descriptions))
            .map(|(name, (value, description))| {
                own(name, value.as_deref(), description.as_deref())
            });
        let sub_states = self
            .sub_states
            .iter()
            .map(|(name, state)| format!("{}[{}]", name, child(state)));

        variables.chain(sub_states).collect::<Vec<_>>().join(",")
    }

    fn unknown_variable(&self, variable: &str) -> StateError {
        StateError::UnknownVariable {
            variable: variable.to_string(),
            state: self.id(),
        }
    }
}

/// Structural equality: variable names, values and sub-states.
///
/// The specification object itself is not compared, and neither is the
/// description text, which is derived from the values.
impl PartialEq for ComplexState {
    fn eq(&self, other: &Self) -> bool {
        self.specification.names().eq(other.specification.names())
            && self.values == other.values
            && self.sub_states == other.sub_states
    }
}

impl fmt::Display for ComplexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[State: '{}']", self.id())
    }
}
