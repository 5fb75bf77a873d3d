//! Working-memory fact store for Larder.
//!
//! This crate provides:
//! - [`FactStore`] - Live facts with per-kind indexing and lazy queries
//! - [`FactSnapshot`] - Owned copies of the live fact set

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod snapshot;
pub mod store;

pub use snapshot::FactSnapshot;
pub use store::{DuplicatePolicy, FactQuery, FactQueryIter, FactStore, FieldConstraint};
