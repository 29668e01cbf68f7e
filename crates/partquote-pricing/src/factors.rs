//! Operator-maintained adjustment factors.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::PricingError;

/// One operator-editable price multiplier, e.g. a rush surcharge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentFactor {
    /// Unique name.
    pub name: String,
    /// Multiplier; must be positive.
    pub value: f64,
    /// Inactive rows are kept but not applied.
    #[serde(default = "default_active", alias = "is_active")]
    pub active: bool,
    /// Shown next to the factor in a quote breakdown.
    #[serde(default)]
    pub description: String,
}

fn default_active() -> bool {
    true
}

impl AdjustmentFactor {
    /// An active factor without description.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            active: true,
            description: String::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set whether the factor is applied.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// An ordered, validated copy of the factor rows taken for one quote.
///
/// Names are unique and every value is positive and finite. Active factors
/// apply in the order they were registered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AdjustmentFactor>", into = "Vec<AdjustmentFactor>")]
pub struct FactorSnapshot {
    factors: Vec<AdjustmentFactor>,
}

impl FactorSnapshot {
    /// Validate `factors` into a snapshot.
    pub fn new(factors: Vec<AdjustmentFactor>) -> Result<Self, PricingError> {
        let mut names = HashSet::new();
        for factor in &factors {
            if !factor.value.is_finite() || factor.value <= 0.0 {
                return Err(PricingError::InvalidFactorValue {
                    name: factor.name.clone(),
                    value: factor.value,
                });
            }
            if !names.insert(factor.name.as_str()) {
                return Err(PricingError::DuplicateFactor(factor.name.clone()));
            }
        }
        Ok(Self { factors })
    }

    /// A snapshot with no factors.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every row, active or not, in registration order.
    pub fn factors(&self) -> &[AdjustmentFactor] {
        &self.factors
    }

    /// Active rows in registration order.
    pub fn active(&self) -> impl Iterator<Item = &AdjustmentFactor> {
        self.factors.iter().filter(|f| f.active)
    }

    /// Product of the active values; 1.0 when there are none.
    pub fn product(&self) -> f64 {
        self.active().map(|f| f.value).product()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// True when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

impl TryFrom<Vec<AdjustmentFactor>> for FactorSnapshot {
    type Error = PricingError;

    fn try_from(factors: Vec<AdjustmentFactor>) -> Result<Self, Self::Error> {
        Self::new(factors)
    }
}

impl From<FactorSnapshot> for Vec<AdjustmentFactor> {
    fn from(snapshot: FactorSnapshot) -> Self {
        snapshot.factors
    }
}
