//! Core values, facts, handles, and errors for Larder.
//!
//! This crate provides:
//! - [`Value`] - Scalar values held in fact fields and bindings
//! - [`Fact`] and [`FactKind`] - Typed working-memory records
//! - [`FactId`] - Store-assigned fact handles
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod fact;
pub mod handle;
pub mod types;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use fact::{DemandLevel, Fact, FactKind, fields};
pub use handle::FactId;
pub use types::ValueType;
pub use value::Value;
