//! Coarse difficulty grade from feature counts.

use std::fmt;

use partquote_analysis::FeatureRecord;
use serde::Serialize;

const CURVED_WEIGHT: u32 = 2;
const SHARP_WEIGHT: u32 = 1;
const HOLE_WEIGHT: u32 = 3;
const UNDERCUT_WEIGHT: u32 = 5;

/// Shop-floor grade of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyGrade {
    /// Score below 10.
    Easy,
    /// Score below 30.
    Medium,
    /// Score below 60.
    Hard,
    /// Anything above.
    VeryHard,
}

impl DifficultyGrade {
    /// Weighted feature score: curved ×2, sharp ×1, holes ×3, undercuts ×5.
    ///
    /// Absent counts contribute nothing; `None` when all four are absent.
    pub fn score(features: &FeatureRecord) -> Option<u32> {
        let weighted = [
            (features.curved_surface_count, CURVED_WEIGHT),
            (features.sharp_edge_count, SHARP_WEIGHT),
            (features.hole_count, HOLE_WEIGHT),
            (features.undercut_count, UNDERCUT_WEIGHT),
        ];
        if weighted.iter().all(|(count, _)| count.is_none()) {
            return None;
        }
        Some(
            weighted
                .iter()
                .map(|(count, weight)| count.unwrap_or(0).saturating_mul(*weight))
                .fold(0u32, u32::saturating_add),
        )
    }

    /// Grade for a score.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=9 => DifficultyGrade::Easy,
            10..=29 => DifficultyGrade::Medium,
            30..=59 => DifficultyGrade::Hard,
            _ => DifficultyGrade::VeryHard,
        }
    }

    /// Grade of `features`, if any count was measured.
    pub fn of(features: &FeatureRecord) -> Option<Self> {
        Self::score(features).map(Self::from_score)
    }
}

impl fmt::Display for DifficultyGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DifficultyGrade::Easy => "easy",
            DifficultyGrade::Medium => "medium",
            DifficultyGrade::Hard => "hard",
            DifficultyGrade::VeryHard => "very hard",
        };
        f.write_str(s)
    }
}
