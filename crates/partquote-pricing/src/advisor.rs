//! Design-for-manufacturing advice from measured features.

use partquote_analysis::FeatureRecord;
use serde::Serialize;

/// How urgent an advisory is. Warnings sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Likely to raise cost or risk noticeably.
    Warning,
    /// Worth knowing.
    Info,
}

/// The feature an advisory is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DfmFeature {
    /// Minimum internal corner radius.
    CornerRadius,
    /// Minimum tool diameter.
    ToolDiameter,
    /// Bounding-box aspect ratio.
    AspectRatio,
    /// Complexity score.
    Complexity,
    /// Machining difficulty.
    Difficulty,
}

/// One piece of advice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    /// Warning or info.
    pub severity: Severity,
    /// What it is about.
    pub feature: DfmFeature,
    /// Short headline.
    pub title: String,
    /// What was measured.
    pub description: String,
    /// What the designer could change.
    pub suggestion: String,
}

impl Advisory {
    fn new(
        severity: Severity,
        feature: DfmFeature,
        title: &str,
        description: String,
        suggestion: &str,
    ) -> Self {
        Self {
            severity,
            feature,
            title: title.to_string(),
            description,
            suggestion: suggestion.to_string(),
        }
    }
}

/// Advice for `features`, warnings first and otherwise in rule order.
///
/// Features that were not measured produce no advice.
pub fn advise(features: &FeatureRecord) -> Vec<Advisory> {
    let mut advice = Vec::new();

    if let Some(r) = features.min_corner_radius_mm() {
        let description = format!("The smallest internal corner radius is {r:.2} mm.");
        if r < 0.5 {
            advice.push(Advisory::new(
                Severity::Warning,
                DfmFeature::CornerRadius,
                "Very small corner radius",
                description,
                "Increase internal corner radii to at least 1 mm so standard end mills can reach them.",
            ));
        } else if r < 1.0 {
            advice.push(Advisory::new(
                Severity::Info,
                DfmFeature::CornerRadius,
                "Small corner radius",
                description,
                "Radii of 1 mm or more allow faster, sturdier tools.",
            ));
        }
    }

    if let Some(d) = features.min_tool_diameter_mm() {
        let description = format!("The part needs a cutter of {d:.2} mm diameter.");
        if d < 1.0 {
            advice.push(Advisory::new(
                Severity::Warning,
                DfmFeature::ToolDiameter,
                "Micro tooling required",
                description,
                "Open up narrow slots and pockets so a cutter of 2 mm or more fits.",
            ));
        } else if d < 2.0 {
            advice.push(Advisory::new(
                Severity::Info,
                DfmFeature::ToolDiameter,
                "Small tooling required",
                description,
                "Wider features let the shop use larger, faster cutters.",
            ));
        }
    }

    if let Some(ar) = features.max_aspect_ratio.filter(|&ar| ar > 5.0) {
        advice.push(Advisory::new(
            Severity::Warning,
            DfmFeature::AspectRatio,
            "Long, slender part",
            format!("The bounding box aspect ratio is {ar:.1}."),
            "Add ribs or thicken the part to reduce deflection and chatter during machining.",
        ));
    }

    if let Some(c) = features.complexity_score {
        let description = format!("The complexity score is {c:.1}.");
        if c > 8.0 {
            advice.push(Advisory::new(
                Severity::Warning,
                DfmFeature::Complexity,
                "Very complex geometry",
                description,
                "Simplify cosmetic detail or split the part into simpler components.",
            ));
        } else if c > 5.0 {
            advice.push(Advisory::new(
                Severity::Info,
                DfmFeature::Complexity,
                "Complex geometry",
                description,
                "Removing non-functional detail shortens programming and cycle time.",
            ));
        }
    }

    if let Some(d) = features.machining_difficulty() {
        let description = format!("The machining difficulty is {d:.1}.");
        if d > 8.0 {
            advice.push(Advisory::new(
                Severity::Warning,
                DfmFeature::Difficulty,
                "Very difficult to machine",
                description,
                "Review small radii, deep features and undercuts with the shop before ordering.",
            ));
        } else if d > 5.0 {
            advice.push(Advisory::new(
                Severity::Info,
                DfmFeature::Difficulty,
                "Difficult to machine",
                description,
                "Fewer setups and larger radii bring the difficulty down.",
            ));
        }
    }

    // Stable, so rule order survives within each severity.
    advice.sort_by_key(|a| a.severity);
    advice
}
