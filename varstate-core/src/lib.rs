//! # varstate-core
//!
//! State model for varstate.
//!
//! This crate provides:
//! - Variable specifications with validated value domains
//! - Simple and complex states with dotted-path sub-state delegation
//! - Compact persistence of top-level values
//! - Condition matching against complex states
//! - Display equipment lookup keyed by a visible variable

pub mod complex;
pub mod condition;
pub mod domain;
pub mod equipment;
pub mod error;
pub mod persist;
pub mod specification;
pub mod state;

pub use complex::ComplexState;
pub use condition::{ConditionMatcher, TextSource};
pub use domain::{DomainValue, ValueDomain};
pub use equipment::EquipmentMap;
pub use error::StateError;
pub use specification::{StateSpecification, VariableSpec};
pub use state::{SimpleState, State};
