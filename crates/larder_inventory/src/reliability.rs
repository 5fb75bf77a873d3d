//! Supplier reliability scoring.
//!
//! The scoring model lives outside this crate. Callers plug one in through
//! [`ReliabilityModel`]; this module validates its inputs, clamps its
//! output, and turns the score into a `SupplierReliability` fact.

use larder_engine::Engine;
use larder_foundation::{Error, Fact, FactId, Result};
use tracing::debug;

/// Largest accepted delivery delay, in days.
pub const MAX_DELAY_DAYS: u8 = 15;
/// Largest accepted quality rating.
pub const MAX_QUALITY: u8 = 10;
/// Upper bound of a reliability score.
pub const MAX_SCORE: f64 = 10.0;

/// Maps a supplier's delay and quality to a reliability score in `0..=10`.
pub trait ReliabilityModel {
    /// Scores a supplier.
    fn reliability(&self, delay_days: u8, quality: u8) -> f64;
}

impl<F> ReliabilityModel for F
where
    F: Fn(u8, u8) -> f64,
{
    fn reliability(&self, delay_days: u8, quality: u8) -> f64 {
        self(delay_days, quality)
    }
}

/// Observed performance of one supplier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupplierProfile {
    /// Supplier name.
    pub name: String,
    /// Average delivery delay in days, `0..=15`.
    pub delay_days: u8,
    /// Quality rating, `0..=10`.
    pub quality: u8,
}

impl SupplierProfile {
    /// Creates a validated profile.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the name is empty or a rating is out of range.
    pub fn new(name: impl Into<String>, delay_days: u8, quality: u8) -> Result<Self> {
        let profile = Self {
            name: name.into(),
            delay_days,
            quality,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Checks the profile's ranges.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the name is empty or a rating is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::invalid_input("supplier name is empty"));
        }
        if self.delay_days > MAX_DELAY_DAYS {
            return Err(Error::invalid_input(format!(
                "delay of {} days for {} is outside 0..={MAX_DELAY_DAYS}",
                self.delay_days, self.name
            )));
        }
        if self.quality > MAX_QUALITY {
            return Err(Error::invalid_input(format!(
                "quality {} for {} is outside 0..={MAX_QUALITY}",
                self.quality, self.name
            )));
        }
        Ok(())
    }

    /// Scores this profile, clamping the model output to `0..=10`.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the profile is out of range or the model
    /// returns NaN.
    pub fn score<M: ReliabilityModel + ?Sized>(&self, model: &M) -> Result<f64> {
        self.validate()?;
        let raw = model.reliability(self.delay_days, self.quality);
        if raw.is_nan() {
            return Err(Error::invalid_input(format!(
                "reliability model returned NaN for {}",
                self.name
            )));
        }
        Ok(raw.clamp(0.0, MAX_SCORE))
    }

    /// Scores this profile and builds its `SupplierReliability` fact.
    ///
    /// # Errors
    /// See [`score`](Self::score).
    pub fn to_fact<M: ReliabilityModel + ?Sized>(&self, model: &M) -> Result<Fact> {
        Ok(Fact::supplier_reliability(&self.name, self.score(model)?))
    }
}

/// Scores each profile and asserts the resulting facts.
///
/// Nothing is asserted unless every profile scores and every fact is
/// accepted. If an assert fails part way, the facts already asserted by
/// this call are retracted again.
///
/// # Errors
/// Returns the first scoring error, or `DuplicateFact` under a strict
/// configuration.
pub fn assert_reliability<M: ReliabilityModel + ?Sized>(
    engine: &mut Engine,
    model: &M,
    profiles: &[SupplierProfile],
) -> Result<Vec<FactId>> {
    let facts = profiles
        .iter()
        .map(|p| p.to_fact(model))
        .collect::<Result<Vec<_>>>()?;

    let mut ids = Vec::with_capacity(facts.len());
    for fact in facts {
        match engine.assert(fact) {
            Ok(id) => ids.push(id),
            Err(err) => {
                for id in ids {
                    engine.retract(id)?;
                }
                debug!(error = %err, "reliability facts rolled back");
                return Err(err);
            }
        }
    }
    debug!(suppliers = ids.len(), "reliability facts asserted");
    Ok(ids)
}
