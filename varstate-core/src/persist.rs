//! Compact persisted form of complex states.
//!
//! The persisted form is the comma-joined list of top-level values in
//! declaration order. An unset slot is written as an empty field and an
//! empty field restores as an unset slot.
//!
//! Values are not escaped, so a value containing a comma does not survive a
//! round trip. An explicitly empty value is indistinguishable from an unset
//! slot and restores as unset; for a single-variable state it persists as
//! the empty form, which restores nothing. States with sub-states cannot be
//! persisted.

use crate::complex::ComplexState;
use crate::error::StateError;
use crate::specification::StateSpecification;
use std::sync::Arc;

impl ComplexState {
    /// Returns the persisted form of the top-level values.
    pub fn serialize(&self) -> Result<String, StateError> {
        if !self.sub_states().is_empty() {
            return Err(StateError::UnsupportedPersistence { state: self.id() });
        }

        Ok(self
            .values()
            .iter()
            .map(|v| v.as_deref().unwrap_or_default())
            .collect::<Vec<_>>()
            .join(","))
    }

    /// Restores top-level values from their persisted form.
    ///
    /// Values are assigned positionally through the same validation as
    /// [`ComplexState::set`]; empty fields unset their slot. Every field is
    /// validated before any slot changes, so a failed restore leaves the
    /// state untouched. Empty input leaves the state untouched too.
    pub fn deserialize(&mut self, persisted: &str) -> Result<&mut Self, StateError> {
        if persisted.is_empty() {
            return Ok(self);
        }

        let fields: Vec<&str> = persisted.split(',').collect();
        if fields.len() > self.values().len() {
            return Err(StateError::TooManyValues {
                expected: self.values().len(),
                actual: fields.len(),
            });
        }

        let slots = fields
            .into_iter()
            .enumerate()
            .map(|(index, field)| match field {
                "" => Ok((index, None, None)),
                value => {
                    let description = self.validate(index, value)?;
                    Ok((index, Some(value.to_string()), description))
                }
            })
            .collect::<Result<Vec<_>, StateError>>()?;

        for (index, value, description) in slots {
            self.store(index, value, description);
        }

        tracing::debug!(state = %self.id(), "restored persisted state");
        Ok(self)
    }

    /// Creates a state from a specification and a persisted form.
    pub fn restore(
        specification: Arc<StateSpecification>,
        persisted: &str,
    ) -> Result<Self, StateError> {
        let mut state = Self::new(specification)?;
        state.deserialize(persisted)?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SimpleState;
    use proptest::prelude::*;

    fn spec() -> Arc<StateSpecification> {
        Arc::new(StateSpecification::parse(
            "main:red,green,blue:red;mode:edit,view:view;note",
        ))
    }

    #[test]
    fn test_serialize() {
        let mut state = ComplexState::new(spec()).unwrap();
        assert_eq!(state.serialize().unwrap(), "red,view,");

        state.set("note", "hello").unwrap();
        assert_eq!(state.serialize().unwrap(), "red,view,hello");
    }

    #[test]
    fn test_roundtrip() {
        let mut state = ComplexState::new(spec()).unwrap();
        state.set("main", "blue").unwrap();
        state.set("mode", "edit").unwrap();
        state.set("note", "x").unwrap();

        let persisted = state.serialize().unwrap();
        let restored = ComplexState::restore(spec(), &persisted).unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.description(), state.description());
    }

    #[test]
    fn test_deserialize_empty_is_noop() {
        let mut state = ComplexState::new(spec()).unwrap();
        let before = state.clone();
        state.deserialize("").unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn test_deserialize_partial() {
        let mut state = ComplexState::new(spec()).unwrap();
        state.deserialize("green").unwrap();
        assert_eq!(state.id(), "main=green,mode=view,note=");
    }

    #[test]
    fn test_deserialize_validates() {
        let mut state = ComplexState::new(spec()).unwrap();
        let err = state.deserialize("red,fly").unwrap_err();
        assert!(matches!(err, StateError::InvalidValue { ref variable, .. } if variable == "mode"));
    }

    #[test]
    fn test_failed_deserialize_leaves_state_untouched() {
        let mut state = ComplexState::new(spec()).unwrap();
        let before = state.clone();

        assert!(state.deserialize("blue,fly,x").is_err());
        assert_eq!(state, before);
        assert_eq!(state.try_get("main"), Some("red"));
    }

    #[test]
    fn test_unset_slot_with_domain_roundtrip() {
        let spec = Arc::new(StateSpecification::parse("main:red,green;mode:edit,view:view"));
        let state = ComplexState::new(spec.clone()).unwrap();

        let persisted = state.serialize().unwrap();
        assert_eq!(persisted, ",view");

        let restored = ComplexState::restore(spec, &persisted).unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.get("main").unwrap(), None);
    }

    #[test]
    fn test_empty_field_unsets_slot() {
        let spec = Arc::new(StateSpecification::parse("a;note::x"));
        let mut state = ComplexState::new(spec.clone()).unwrap();
        state.set("a", "1").unwrap();
        state.set("note", "").unwrap();

        let persisted = state.serialize().unwrap();
        assert_eq!(persisted, "1,");

        let restored = ComplexState::restore(spec, &persisted).unwrap();
        assert_eq!(restored.id(), "a=1,note=");
        assert_eq!(restored.try_get("note"), None);
    }

    #[test]
    fn test_deserialize_too_many_values() {
        let mut state = ComplexState::new(spec()).unwrap();
        let err = state.deserialize("red,edit,a,b").unwrap_err();
        assert!(matches!(
            err,
            StateError::TooManyValues {
                expected: 3,
                actual: 4
            }
        ));
    }

    #[test]
    fn test_sub_states_not_persistable() {
        let state = ComplexState::new(spec())
            .unwrap()
            .with_sub_state("panel", SimpleState::new("open"));
        let err = state.serialize().unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_PERSISTENCE");
    }

    #[test]
    fn test_comma_in_value_breaks_roundtrip() {
        let mut state = ComplexState::parse("a;b").unwrap();
        state.set("a", "x,y").unwrap();
        state.set("b", "z").unwrap();
        let persisted = state.serialize().unwrap();
        assert_eq!(persisted, "x,y,z");

        let err = ComplexState::restore(state.specification().clone(), &persisted).unwrap_err();
        assert!(matches!(err, StateError::TooManyValues { expected: 2, actual: 3 }));

        let restored = ComplexState::restore(state.specification().clone(), "x,y").unwrap();
        assert_eq!(restored.try_get("a"), Some("x"));
        assert_eq!(restored.try_get("b"), Some("y"));
    }

    proptest! {
        #[test]
        fn roundtrip_restores_values(
            main in prop::option::of(prop::sample::select(vec!["red", "green", "blue"])),
            mode in prop::option::of(prop::sample::select(vec!["edit", "view"])),
            note in prop::option::of("[a-z0-9 ]{1,12}"),
        ) {
            let spec = Arc::new(StateSpecification::parse("main:red,green,blue;mode:edit,view;note"));
            let mut state = ComplexState::new(spec.clone()).unwrap();
            if let Some(main) = main {
                state.set("main", main).unwrap();
            }
            if let Some(mode) = mode {
                state.set("mode", mode).unwrap();
            }
            if let Some(note) = &note {
                state.set("note", note.clone()).unwrap();
            }

            let persisted = state.serialize().unwrap();
            let restored = ComplexState::restore(spec, &persisted).unwrap();
            prop_assert_eq!(restored.try_get("main"), main);
            prop_assert_eq!(restored.try_get("mode"), mode);
            prop_assert_eq!(restored.try_get("note"), note.as_deref());
            prop_assert_eq!(restored, state);
        }

        #[test]
        fn set_succeeds_iff_in_domain(value in "[a-z]{1,6}") {
            let mut state = ComplexState::new(spec()).unwrap();
            let allowed = ["red", "green", "blue"].contains(&value.as_str());
            let result = state.set("main", value.clone());
            prop_assert_eq!(result.is_ok(), allowed);
            if !allowed {
                let is_invalid_value = matches!(result, Err(StateError::InvalidValue { .. }));
                prop_assert!(is_invalid_value);
            }
        }
    }
}
