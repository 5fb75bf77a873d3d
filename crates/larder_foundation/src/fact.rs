//! Typed facts held in working memory.
//!
//! A [`Fact`] is an immutable record of one [`FactKind`] with named scalar
//! fields. Facts carry no identity of their own; the store assigns a
//! [`FactId`](crate::FactId) when a fact is asserted.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::Value;

/// Well-known field names used by the fact constructors.
pub mod fields {
    /// Product name a fact refers to.
    pub const PRODUCT: &str = "product";
    /// Integer quantity (stock level or ordered amount).
    pub const QUANTITY: &str = "quantity";
    /// Demand level label.
    pub const LEVEL: &str = "level";
    /// Name of a product, supplier, or category.
    pub const NAME: &str = "name";
    /// Reliability score in `[0, 10]`.
    pub const SCORE: &str = "score";
}

// =============================================================================
// Fact Kind
// =============================================================================

/// The closed set of fact kinds the engine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FactKind {
    /// A known product.
    Product,
    /// Current stock level of a product.
    Stock,
    /// Demand level of a product.
    Demand,
    /// A supplier of a product.
    Supplier,
    /// A pending order for a product.
    Order,
    /// A category a product belongs to.
    Category,
    /// Reliability score of a supplier.
    SupplierReliability,
}

impl FactKind {
    /// Every fact kind, in declaration order.
    pub const ALL: [FactKind; 7] = [
        Self::Product,
        Self::Stock,
        Self::Demand,
        Self::Supplier,
        Self::Order,
        Self::Category,
        Self::SupplierReliability,
    ];

    /// Returns the kind's name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::Stock => "Stock",
            Self::Demand => "Demand",
            Self::Supplier => "Supplier",
            Self::Order => "Order",
            Self::Category => "Category",
            Self::SupplierReliability => "SupplierReliability",
        }
    }
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_input(format!("unknown fact kind: {s}")))
    }
}

// =============================================================================
// Demand Level
// =============================================================================

/// Demand level of a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DemandLevel {
    /// Low demand ("Baja" in the source catalogue).
    Low,
    /// Medium demand ("Media").
    Medium,
    /// High demand ("Alta").
    High,
}

impl DemandLevel {
    /// Returns the canonical label stored in `Demand` facts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for DemandLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemandLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "baja" => Ok(Self::Low),
            "medium" | "media" => Ok(Self::Medium),
            "high" | "alta" => Ok(Self::High),
            _ => Err(Error::invalid_input(format!("unknown demand level: {s}"))),
        }
    }
}

impl From<DemandLevel> for Value {
    fn from(level: DemandLevel) -> Self {
        Value::from(level.as_str())
    }
}

// =============================================================================
// Fact
// =============================================================================

/// An immutable typed record in working memory.
///
/// Cloning is O(1); fields live in a persistent ordered map.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fact {
    kind: FactKind,
    fields: im::OrdMap<Arc<str>, Value>,
}

impl Fact {
    /// Creates a fact of the given kind with no fields.
    #[must_use]
    pub fn new(kind: FactKind) -> Self {
        Self {
            kind,
            fields: im::OrdMap::new(),
        }
    }

    /// Returns this fact with a field set.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// `Product{name}`
    #[must_use]
    pub fn product(name: &str) -> Self {
        Self::new(FactKind::Product).with_field(fields::NAME, name)
    }

    /// `Stock{product, quantity}`
    #[must_use]
    pub fn stock(product: &str, quantity: i64) -> Self {
        Self::new(FactKind::Stock)
            .with_field(fields::PRODUCT, product)
            .with_field(fields::QUANTITY, quantity)
    }

    /// `Demand{product, level}`
    #[must_use]
    pub fn demand(product: &str, level: DemandLevel) -> Self {
        Self::new(FactKind::Demand)
            .with_field(fields::PRODUCT, product)
            .with_field(fields::LEVEL, level)
    }

    /// `Supplier{product, name}`
    #[must_use]
    pub fn supplier(product: &str, name: &str) -> Self {
        Self::new(FactKind::Supplier)
            .with_field(fields::PRODUCT, product)
            .with_field(fields::NAME, name)
    }

    /// `Order{product, quantity}`
    #[must_use]
    pub fn order(product: &str, quantity: i64) -> Self {
        Self::new(FactKind::Order)
            .with_field(fields::PRODUCT, product)
            .with_field(fields::QUANTITY, quantity)
    }

    /// `Category{product, name}`
    #[must_use]
    pub fn category(product: &str, name: &str) -> Self {
        Self::new(FactKind::Category)
            .with_field(fields::PRODUCT, product)
            .with_field(fields::NAME, name)
    }

    /// `SupplierReliability{name, score}`
    #[must_use]
    pub fn supplier_reliability(name: &str, score: f64) -> Self {
        Self::new(FactKind::SupplierReliability)
            .with_field(fields::NAME, name)
            .with_field(fields::SCORE, score)
    }

    /// Returns the fact's kind.
    #[must_use]
    pub fn kind(&self) -> FactKind {
        self.kind
    }

    /// Returns a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns a field value, or a `MissingField` error.
    ///
    /// # Errors
    /// Returns an error if the fact has no such field.
    pub fn require(&self, field: &str) -> Result<&Value> {
        self.get(field)
            .ok_or_else(|| Error::missing_field(self.kind, field))
    }

    /// Returns true if the field is present and equal to `value`.
    #[must_use]
    pub fn field_equals(&self, field: &str, value: &Value) -> bool {
        self.get(field) == Some(value)
    }

    /// Iterates fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the fact has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Debug for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind)?;
        for (i, (name, value)) in self.fields().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value:?}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
