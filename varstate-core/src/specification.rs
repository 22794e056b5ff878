//! State specifications.
//!
//! A specification declares the variables of a complex state using a compact
//! text grammar:
//!
//! ```text
//! definitions := def (';' def)*
//! def         := name [':' domain [':' initial]]
//! domain      := pair (',' pair)*
//! pair        := value ['/' description]
//! ```
//!
//! Examples:
//! - `mystate`
//! - `color:red,green,blue`
//! - `color:red/Like a rose,green/As hope,blue/Like beautiful eyes:red`
//!
//! Specifications are immutable once built and are shared between states
//! through an `Arc`.

use crate::domain::ValueDomain;
use crate::error::StateError;
use serde::{Deserialize, Serialize};

/// Splits `text` on `separator`, dropping trailing empty fields.
pub(crate) fn split_fields(text: &str, separator: char) -> Vec<&str> {
    let mut fields: Vec<&str> = text.split(separator).collect();
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

/// Declaration of a single variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSpec {
    /// Variable name.
    pub name: String,

    /// Legal values; `None` accepts any value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<ValueDomain>,

    /// Value assigned when a state is created without an explicit one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
}

impl VariableSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: None,
            initial: None,
        }
    }

    pub fn with_domain(mut self, domain: ValueDomain) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn with_initial(mut self, initial: impl Into<String>) -> Self {
        self.initial = Some(initial.into());
        self
    }

    /// Parses a single `name[:domain[:initial]]` definition.
    ///
    /// Empty domain or initial fields count as absent.
    pub fn parse(definition: &str) -> Self {
        let fields = split_fields(definition, ':');
        let mut spec = Self::new(fields.first().copied().unwrap_or_default());

        if let Some(domain) = fields.get(1).filter(|d| !d.is_empty()) {
            spec.domain = Some(ValueDomain::parse(domain));
        }
        if let Some(initial) = fields.get(2).filter(|i| !i.is_empty()) {
            spec.initial = Some(initial.to_string());
        }

        spec
    }
}

/// Validated variable declarations shared by complex states.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateSpecification {
    variables: Vec<VariableSpec>,
}

impl StateSpecification {
    pub fn new(variables: Vec<VariableSpec>) -> Self {
        Self { variables }
    }

    /// Builds a specification from definition strings, or, when none are
    /// given, from reference values whose positions become variable names.
    ///
    /// Reference values are not validated here; that happens when they are
    /// assigned to a state.
    pub fn compute<D, V>(definitions: Option<&[D]>, reference_values: Option<&[V]>) -> Self
    where
        D: AsRef<str>,
        V: AsRef<str>,
    {
        match definitions {
            Some(definitions) => Self::from_definitions(definitions),
            None => Self::positional(reference_values.map_or(0, <[V]>::len)),
        }
    }

    /// Parses one definition per element.
    pub fn from_definitions<D: AsRef<str>>(definitions: &[D]) -> Self {
        let spec = Self {
            variables: definitions
                .iter()
                .map(|d| VariableSpec::parse(d.as_ref()))
                .collect(),
        };
        tracing::debug!(variables = spec.len(), "parsed state specification");
        spec
    }

    /// Parses `;`-separated definitions.
    pub fn parse(text: &str) -> Self {
        Self::from_definitions(&split_fields(text, ';'))
    }

    /// Unconstrained variables named `0`, `1`, ... `count - 1`.
    pub fn positional(count: usize) -> Self {
        Self {
            variables: (0..count).map(|i| VariableSpec::new(i.to_string())).collect(),
        }
    }

    pub fn variables(&self) -> &[VariableSpec] {
        &self.variables
    }

    pub fn variable(&self, index: usize) -> Option<&VariableSpec> {
        self.variables.get(index)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }

    /// Index of the first variable named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Returns the specification as JSON.
    pub fn to_json(&self) -> Result<serde_json::Value, StateError> {
        Ok(serde_json::to_value(self)?)
    }
}
