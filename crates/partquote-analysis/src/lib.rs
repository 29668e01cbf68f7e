#![warn(missing_docs)]

//! Feature extraction and manufacturability estimation for part models.
//!
//! A model file is read by one of several backends of decreasing
//! capability: a boundary-representation kernel for STEP and IGES, a mesh
//! kernel for STL and OBJ, a bare STL triangle reader, and a file-size
//! estimate as the last resort. The [`Coordinator`] tries them in rank
//! order and merges what they measured into one [`FeatureRecord`] whose
//! fields are all optional.
//!
//! ```no_run
//! use std::path::Path;
//! use partquote_analysis::Analyzer;
//!
//! let analyzer = Analyzer::default();
//! let report = analyzer.analyze(Path::new("bracket.step")).unwrap();
//! println!("{:?} via {:?}", report.features.volume_cm3, report.backend);
//! ```

mod analyzer;
mod backend;
mod config;
mod coordinator;
mod error;
mod features;
mod loader;
mod manufacturability;
mod model;
mod record;
mod registry;

pub use analyzer::Analyzer;
pub use backend::{
    AnalysisBackend, BestEffortBackend, Capability, MeshKernelBackend, StepKernelBackend,
    StlMinimalBackend,
};
pub use config::{BackendKind, EngineConfig};
pub use coordinator::{AnalysisReport, Coordinator};
pub use error::{AnalysisError, BackendFailure, ComputationFailure, FailureKind, LoadFailure};
pub use features::{aspect_ratio, complexity_bucket, extract, DEFAULT_SOLID_COMPLEXITY};
pub use loader::load;
pub use manufacturability::{
    estimate, estimate_welded, machining_difficulty, DEFAULT_WELD_TOLERANCE_MM,
    SHARP_EDGE_ANGLE_DEG,
};
pub use model::{ModelFormat, ModelHandle};
pub use record::FeatureRecord;
pub use registry::BackendRegistry;
