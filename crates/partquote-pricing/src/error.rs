//! Error types for pricing configuration.

use thiserror::Error;

/// Errors raised while building a factor snapshot.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Two factor rows share a name.
    #[error("duplicate adjustment factor '{0}'")]
    DuplicateFactor(String),

    /// A factor value is zero, negative or not finite.
    #[error("adjustment factor '{name}' has invalid value {value}; expected a positive finite number")]
    InvalidFactorValue {
        /// Factor name.
        name: String,
        /// The rejected value.
        value: f64,
    },
}
