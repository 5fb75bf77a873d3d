//! Larder - Forward-chaining production rules over typed facts
//!
//! This crate re-exports all layers of the Larder system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: larder_inventory   — Inventory rule set, sample catalogue, CLI, export
//! Layer 2: larder_engine      — Matcher, rule registry, agenda, execution loop
//! Layer 1: larder_storage     — Fact store with per-kind indexing
//! Layer 0: larder_foundation  — Core types (Value, Fact, FactId, Error)
//! ```

pub use larder_engine as engine;
pub use larder_foundation as foundation;
pub use larder_inventory as inventory;
pub use larder_storage as storage;
