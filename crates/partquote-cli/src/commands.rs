//! Subcommand implementations. Each returns the JSON value to print.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use partquote::{
    compute_quote, generate_advisory, Advisory, AnalysisReport, Analyzer, DifficultyGrade,
    FactorSnapshot, FeatureRecord, Quote,
};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

/// Largest model file accepted, in bytes.
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Reject files the engine should never see.
pub fn check_upload(path: &Path) -> Result<()> {
    let metadata =
        fs::metadata(path).with_context(|| format!("cannot open {}", path.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a file", path.display());
    }
    if metadata.len() > MAX_UPLOAD_BYTES {
        bail!(
            "{} is {} bytes; the limit is {} bytes",
            path.display(),
            metadata.len(),
            MAX_UPLOAD_BYTES
        );
    }
    Ok(())
}

fn analyze_checked(analyzer: &Analyzer, path: &Path) -> Result<AnalysisReport> {
    check_upload(path)?;
    analyzer
        .analyze(path)
        .with_context(|| format!("cannot analyse {}", path.display()))
}

/// Features, or the full report with backend failures.
pub fn analyze(analyzer: &Analyzer, path: &Path, report: bool) -> Result<serde_json::Value> {
    let analysis = analyze_checked(analyzer, path)?;
    let value = if report {
        serde_json::to_value(&analysis)?
    } else {
        serde_json::to_value(&analysis.features)?
    };
    Ok(value)
}

/// Everything a customer sees for one part.
#[derive(Debug, Serialize)]
pub struct QuoteOutput {
    /// Measured features.
    pub features: FeatureRecord,
    /// Coarse difficulty grade, when counts were measured.
    pub grade: Option<DifficultyGrade>,
    /// The price.
    pub quote: Quote,
    /// DFM advice.
    pub advisory: Vec<Advisory>,
}

/// Request parameters of `quote`.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    /// Processing type name.
    pub process: String,
    /// Material name.
    pub material: String,
    /// Part count.
    pub quantity: u32,
    /// Keep full precision instead of rounding to cents.
    pub raw: bool,
}

/// Analyse, price and advise.
pub fn quote(
    analyzer: &Analyzer,
    path: &Path,
    request: &QuoteRequest,
    snapshot: &FactorSnapshot,
) -> Result<QuoteOutput> {
    let features = analyze_checked(analyzer, path)?.features;
    let quote = compute_quote(
        &request.process,
        &request.material,
        request.quantity,
        &features,
        snapshot,
    );
    info!(
        path = %path.display(),
        final_price = quote.final_price,
        "quoted part"
    );
    Ok(QuoteOutput {
        grade: DifficultyGrade::of(&features),
        advisory: generate_advisory(&features),
        quote: if request.raw { quote } else { quote.presented() },
        features,
    })
}

/// Advice only.
pub fn advise(analyzer: &Analyzer, path: &Path) -> Result<Vec<Advisory>> {
    let features = analyze_checked(analyzer, path)?.features;
    Ok(generate_advisory(&features))
}

/// One line of `batch` output.
#[derive(Debug, Serialize)]
pub struct BatchEntry {
    /// Input path.
    pub path: PathBuf,
    /// Features, when the file could be analysed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureRecord>,
    /// Backend that produced the features.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    /// Why the file was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Analyse `paths` in parallel; output order follows input order.
pub fn batch(analyzer: &Analyzer, paths: &[PathBuf]) -> Vec<BatchEntry> {
    paths
        .par_iter()
        .map(|path| match analyze_checked(analyzer, path) {
            Ok(report) => BatchEntry {
                path: path.clone(),
                features: Some(report.features),
                backend: report.backend,
                error: None,
            },
            Err(e) => BatchEntry {
                path: path.clone(),
                features: None,
                backend: None,
                error: Some(format!("{e:#}")),
            },
        })
        .collect()
}
