//! State kinds.

use crate::complex::ComplexState;
use std::fmt;

/// A state without variables: an identifier and an optional description.
#[derive(Debug, Clone, Eq)]
pub struct SimpleState {
    id: String,
    description: Option<String>,
}

impl SimpleState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
        }
    }

    pub fn with_description(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: Some(description.into()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Returns the description, falling back to the identifier.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.id)
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }
}

impl PartialEq for SimpleState {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.description() == other.description()
    }
}

/// Any state that can be bound as a sub-state.
///
/// Only complex states are variable-addressable; a simple state is opaque
/// and exposes nothing but its identifier (as `main`) to dotted paths.
#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Simple(SimpleState),
    Complex(ComplexState),
}

impl State {
    pub fn id(&self) -> String {
        match self {
            State::Simple(s) => s.id().to_string(),
            State::Complex(c) => c.id(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            State::Simple(s) => s.description().to_string(),
            State::Complex(c) => c.description(),
        }
    }

    pub fn as_complex(&self) -> Option<&ComplexState> {
        match self {
            State::Complex(c) => Some(c),
            State::Simple(_) => None,
        }
    }

    pub fn as_complex_mut(&mut self) -> Option<&mut ComplexState> {
        match self {
            State::Complex(c) => Some(c),
            State::Simple(_) => None,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, State::Complex(_))
    }
}

impl From<SimpleState> for State {
    fn from(s: SimpleState) -> Self {
        State::Simple(s)
    }
}

impl From<ComplexState> for State {
    fn from(c: ComplexState) -> Self {
        State::Complex(c)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[State: '{}']", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_falls_back_to_id() {
        let state = SimpleState::new("idle");
        assert_eq!(state.description(), "idle");

        let state = SimpleState::with_description("idle", "Waiting for input");
        assert_eq!(state.description(), "Waiting for input");
    }

    #[test]
    fn test_simple_equality_uses_resolved_description() {
        assert_eq!(SimpleState::new("a"), SimpleState::with_description("a", "a"));
        assert_ne!(SimpleState::new("a"), SimpleState::with_description("a", "b"));
        assert_ne!(SimpleState::new("a"), SimpleState::new("b"));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = SimpleState::new("a");
        let mut copy = original.clone();
        copy.set_id("b");
        copy.set_description(Some("changed".to_string()));
        assert_eq!(original.id(), "a");
        assert_eq!(original.description(), "a");
    }

    #[test]
    fn test_state_variants() {
        let simple: State = SimpleState::new("X").into();
        assert!(!simple.is_complex());
        assert!(simple.as_complex().is_none());
        assert_eq!(simple.id(), "X");
        assert_eq!(simple.to_string(), "[State: 'X']");

        let complex: State = ComplexState::parse("color:red,green#green").unwrap().into();
        assert!(complex.is_complex());
        assert_eq!(complex.id(), "color=green");
        assert_ne!(simple, complex);
    }

    #[test]
    fn test_simple_never_equals_complex() {
        let simple: State = SimpleState::new("0=x").into();
        let complex: State = ComplexState::parse("#x").unwrap().into();
        assert_eq!(simple.id(), complex.id());
        assert_ne!(simple, complex);
    }
}
