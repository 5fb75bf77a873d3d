//! The sample catalogue: eight products and five pending orders.

use larder_engine::Engine;
use larder_foundation::{DemandLevel, Fact, FactId, Result};
use tracing::debug;

/// One catalogue row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogueEntry {
    /// Product name.
    pub name: &'static str,
    /// Units on hand.
    pub stock: i64,
    /// Demand label as written in the catalogue.
    pub demand: &'static str,
    /// Supplier name.
    pub supplier: &'static str,
    /// Category name.
    pub category: &'static str,
}

impl CatalogueEntry {
    /// Builds the Product, Stock, Demand, Supplier, and Category facts for
    /// this row.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the demand label is not recognised.
    pub fn facts(&self) -> Result<[Fact; 5]> {
        let level: DemandLevel = self.demand.parse()?;
        Ok([
            Fact::product(self.name),
            Fact::stock(self.name, self.stock),
            Fact::demand(self.name, level),
            Fact::supplier(self.name, self.supplier),
            Fact::category(self.name, self.category),
        ])
    }
}

const fn entry(
    name: &'static str,
    stock: i64,
    demand: &'static str,
    supplier: &'static str,
    category: &'static str,
) -> CatalogueEntry {
    CatalogueEntry {
        name,
        stock,
        demand,
        supplier,
        category,
    }
}

/// The product catalogue.
pub const CATALOGUE: [CatalogueEntry; 8] = [
    entry("Leche", 4, "Alta", "ProveedorX", "Perecedero"),
    entry("Arroz", 60, "Baja", "ProveedorY", "NoPerecedero"),
    entry("Pan", 0, "Alta", "ProveedorX", "Perecedero"),
    entry("Aceite", 12, "Media", "ProveedorZ", "NoPerecedero"),
    entry("Huevos", 8, "Alta", "ProveedorX", "Perecedero"),
    entry("Medicamentos", 5, "Alta", "ProveedorPrincipal", "Crítico"),
    entry("Azúcar", 3, "Media", "ProveedorSecundario", "NoPerecedero"),
    entry("Sal", 55, "Baja", "ProveedorY", "NoPerecedero"),
];

/// Pending orders as (product, quantity).
pub const ORDERS: [(&str, i64); 5] = [
    ("Leche", 10),
    ("Arroz", 5),
    ("Pan", 8),
    ("Medicamentos", 12),
    ("Huevos", 20),
];

/// Returns every sample fact in load order: each catalogue row's facts,
/// then the orders.
///
/// # Errors
/// Returns `InvalidInput` if a demand label is not recognised.
pub fn sample_facts() -> Result<Vec<Fact>> {
    let mut facts = Vec::with_capacity(CATALOGUE.len() * 5 + ORDERS.len());
    for entry in &CATALOGUE {
        facts.extend(entry.facts()?);
    }
    facts.extend(
        ORDERS
            .iter()
            .map(|(product, quantity)| Fact::order(product, *quantity)),
    );
    Ok(facts)
}

/// Asserts the sample facts into an engine.
///
/// # Errors
/// Returns `DuplicateFact` under a strict configuration if the engine
/// already holds any of them.
pub fn load_sample(engine: &mut Engine) -> Result<Vec<FactId>> {
    let facts = sample_facts()?;
    let ids = facts
        .into_iter()
        .map(|fact| engine.assert(fact))
        .collect::<Result<Vec<_>>>()?;
    debug!(facts = ids.len(), "sample catalogue loaded");
    Ok(ids)
}
