//! Display equipment lookup.
//!
//! A display layer attaches equipment records (icons, labels, styles, ...)
//! to the values of one designated "visible" variable. The map is owned and
//! populated by that layer; this module only resolves the current value of
//! the visible variable and looks it up.
//!
//! ```yaml
//! visible: [mode]
//! equipments:
//!   edit: [{icon: pencil}]
//!   view: [{icon: eye}]
//! ```

use crate::complex::{ComplexState, MAIN};
use crate::error::StateError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Equipment records keyed by the value of a visible variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentMap<T> {
    /// Visible variables; only the first one is used. Empty means `main`.
    #[serde(default, rename = "visible")]
    visible_variables: Vec<String>,

    /// Equipment records per variable value.
    #[serde(default = "BTreeMap::new")]
    equipments: BTreeMap<String, Vec<T>>,
}

impl<T> Default for EquipmentMap<T> {
    fn default() -> Self {
        Self {
            visible_variables: Vec::new(),
            equipments: BTreeMap::new(),
        }
    }
}

impl<T> EquipmentMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_visible_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visible_variables = variables.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the equipment records shown while the visible variable is `value`.
    pub fn insert(&mut self, value: impl Into<String>, equipments: Vec<T>) {
        self.equipments.insert(value.into(), equipments);
    }

    /// Returns the variable (or dotted path) whose value selects equipment.
    pub fn visible_variable(&self) -> &str {
        self.visible_variables
            .first()
            .map(String::as_str)
            .unwrap_or(MAIN)
    }

    /// Returns the equipment for the state's current visible value.
    pub fn lookup(&self, state: &ComplexState) -> Option<&[T]> {
        let value = state.try_get(self.visible_variable())?;
        self.equipments.get(value).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.equipments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equipments.is_empty()
    }
}

impl<T: DeserializeOwned> EquipmentMap<T> {
    pub fn from_yaml(text: &str) -> Result<Self, StateError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self, StateError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SimpleState;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Icon {
        icon: String,
    }

    fn icon(name: &str) -> Icon {
        Icon {
            icon: name.to_string(),
        }
    }

    #[test]
    fn test_defaults_to_main() {
        let mut map = EquipmentMap::new();
        map.insert("red", vec![icon("rose")]);
        assert_eq!(map.visible_variable(), "main");

        let mut state = ComplexState::parse("main:red,green#red").unwrap();
        assert_eq!(map.lookup(&state), Some(&[icon("rose")][..]));

        state.set("main", "green").unwrap();
        assert_eq!(map.lookup(&state), None);
    }

    #[test]
    fn test_first_visible_variable_wins() {
        let mut map = EquipmentMap::new().with_visible_variables(["mode", "main"]);
        map.insert("edit", vec![icon("pencil")]);
        map.insert("red", vec![icon("rose")]);

        let state = ComplexState::parse("main:red;mode:edit,view#red;edit").unwrap();
        assert_eq!(map.lookup(&state), Some(&[icon("pencil")][..]));
    }

    #[test]
    fn test_visible_variable_in_sub_state() {
        let mut map = EquipmentMap::new().with_visible_variables(["status.main"]);
        map.insert("busy", vec![icon("spinner")]);

        let state = ComplexState::parse("#x")
            .unwrap()
            .with_sub_state("status", SimpleState::new("busy"));
        assert_eq!(map.lookup(&state), Some(&[icon("spinner")][..]));
    }

    #[test]
    fn test_unresolved_visible_variable() {
        let mut map: EquipmentMap<Icon> = EquipmentMap::new();
        map.insert("red", vec![icon("rose")]);
        let state = ComplexState::parse("color:red#red").unwrap();
        assert_eq!(map.lookup(&state), None);
    }

    #[test]
    fn test_from_yaml() {
        let map: EquipmentMap<Icon> = EquipmentMap::from_yaml(
            r#"
visible: [mode]
equipments:
  edit:
    - icon: pencil
    - icon: cursor
  view:
    - icon: eye
"#,
        )
        .unwrap();

        assert_eq!(map.visible_variable(), "mode");
        assert_eq!(map.len(), 2);

        let state = ComplexState::parse("mode:edit,view#edit").unwrap();
        assert_eq!(
            map.lookup(&state),
            Some(&[icon("pencil"), icon("cursor")][..])
        );
    }

    #[test]
    fn test_from_json() {
        let map: EquipmentMap<String> =
            EquipmentMap::from_json(r#"{"equipments": {"red": ["Rose"]}}"#).unwrap();
        assert_eq!(map.visible_variable(), "main");
        let state = ComplexState::parse("main#red").unwrap();
        assert_eq!(map.lookup(&state), Some(&["Rose".to_string()][..]));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = EquipmentMap::<Icon>::from_yaml("equipments: [").unwrap_err();
        assert!(matches!(err, StateError::Yaml(_)));
    }
}
