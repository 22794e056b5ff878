//! # varstate-expr
//!
//! Condition expression language for varstate.
//!
//! This crate provides:
//! - A recursive descent parser for boolean conditions
//! - Namespaced variable references resolved through a [`Scope`]
//! - Quantified tests (`any`/`all`) over the variables a scope exposes

pub mod error;
pub mod expr;
pub mod scope;
pub mod value;

pub use error::ExprError;
pub use expr::{parse, CompareOp, Expr, Operand, Quantifier};
pub use scope::{Scope, Variable};
pub use value::Value;
