#![warn(missing_docs)]

//! Quotes and design-for-manufacturing advice for measured parts.
//!
//! [`price`] turns a [`FeatureRecord`](partquote_analysis::FeatureRecord),
//! a process, a material and a quantity into a [`Quote`] with the full list
//! of multipliers that went into it. Operator-maintained adjustment factors
//! are passed in as a [`FactorSnapshot`] taken per quote. [`advise`] lists
//! geometry that is likely to raise cost.

mod advisor;
mod book;
mod engine;
mod error;
mod factors;
mod grade;

pub use advisor::{advise, Advisory, DfmFeature, Severity};
pub use book::{
    base_price, material_multiplier, quantity_discount, Material, Process, DEFAULT_BASE_PRICE,
    DEFAULT_MATERIAL_MULTIPLIER, MIN_QUANTITY_DISCOUNT,
};
pub use engine::{
    model_subfactors, price, AppliedFactor, Quote, ASPECT_RATIO_LIMIT, CORNER_RADIUS_LIMIT_MM,
    PRICE_BAND, TOOL_DIAMETER_LIMIT_MM,
};
pub use error::PricingError;
pub use factors::{AdjustmentFactor, FactorSnapshot};
pub use grade::DifficultyGrade;
