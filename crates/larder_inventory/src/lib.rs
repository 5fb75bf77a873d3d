//! Inventory expert system built on the Larder rule engine.
//!
//! This crate provides:
//! - [`rules`] - The inventory rule set
//! - [`sample`] - The sample product catalogue and pending orders
//! - [`reliability`] - The supplier reliability boundary
//! - [`export`] - `MessagePack` export of final fact sets

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod export;
pub mod reliability;
pub mod rules;
pub mod sample;

pub use reliability::{ReliabilityModel, SupplierProfile, assert_reliability};
pub use rules::{inventory_registry, inventory_rules, names};
pub use sample::{CATALOGUE, CatalogueEntry, ORDERS, load_sample, sample_facts};

use larder_engine::{Engine, EngineConfig};
use larder_foundation::Result;

/// Creates an engine with the inventory rules and the sample catalogue
/// loaded.
///
/// # Errors
/// Returns an error if the rule set fails validation or the catalogue
/// cannot be loaded.
pub fn sample_engine(config: EngineConfig) -> Result<Engine> {
    let mut engine = Engine::new(inventory_registry()?, config);
    load_sample(&mut engine)?;
    Ok(engine)
}
