#![warn(missing_docs)]

//! partquote: instant quotes for machined parts.
//!
//! Three entry points cover the whole flow:
//!
//! - [`analyze_model`] measures a STEP, IGES, STL or OBJ file,
//! - [`compute_quote`] prices the measured part,
//! - [`generate_advisory`] lists geometry likely to raise cost.
//!
//! # Example
//!
//! ```rust,no_run
//! use partquote::{analyze_model, compute_quote, generate_advisory, FactorSnapshot};
//!
//! let features = analyze_model("bracket.step").unwrap();
//! let quote = compute_quote("milling", "aluminum", 10, &features, &FactorSnapshot::empty());
//! println!("{:.2} each", quote.presented().final_price);
//! for advisory in generate_advisory(&features) {
//!     println!("{:?}: {}", advisory.severity, advisory.title);
//! }
//! ```
//!
//! [`Analyzer`] takes an explicit [`EngineConfig`] or [`BackendRegistry`]
//! for callers that need to choose backends or set a timeout.

use std::path::Path;
use std::sync::OnceLock;

pub use partquote_analysis::{
    AnalysisBackend, AnalysisError, AnalysisReport, Analyzer, BackendFailure, BackendKind,
    BackendRegistry, Capability, EngineConfig, FailureKind, FeatureRecord, LoadFailure,
    ModelFormat, ModelHandle,
};
pub use partquote_pricing::{
    Advisory, AdjustmentFactor, AppliedFactor, DfmFeature, DifficultyGrade, FactorSnapshot,
    Material, PricingError, Process, Quote, Severity,
};

/// Analyzer with the default configuration, built on first use.
fn default_analyzer() -> &'static Analyzer {
    static ANALYZER: OnceLock<Analyzer> = OnceLock::new();
    ANALYZER.get_or_init(Analyzer::default)
}

/// Measure a model file with every built-in backend enabled.
///
/// Fails only when `path` is not a file; unreadable or unsupported files
/// give a record with whatever could be measured, possibly nothing.
pub fn analyze_model(path: impl AsRef<Path>) -> Result<FeatureRecord, AnalysisError> {
    default_analyzer().analyze_features(path.as_ref())
}

/// Price a part. Same inputs, same quote.
pub fn compute_quote(
    processing_type: &str,
    material: &str,
    quantity: u32,
    features: &FeatureRecord,
    factors: &FactorSnapshot,
) -> Quote {
    partquote_pricing::price(processing_type, material, quantity, features, factors)
}

/// Design-for-manufacturing advice, warnings first.
pub fn generate_advisory(features: &FeatureRecord) -> Vec<Advisory> {
    partquote_pricing::advise(features)
}
