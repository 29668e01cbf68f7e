//! The pricing formula.
//!
//! ```text
//! final = base × material × quantity discount × model factor × adjustment
//! ```
//!
//! The model factor is a product of sub-factors, one per feature. A
//! feature that was not measured contributes 1.0, never a penalty.

use partquote_analysis::FeatureRecord;
use serde::Serialize;
use tracing::debug;

use crate::book::{base_price, material_multiplier, quantity_discount, Material};
use crate::factors::FactorSnapshot;

/// Below this corner radius (mm) small tooling costs extra.
pub const CORNER_RADIUS_LIMIT_MM: f64 = 2.0;
/// Below this tool diameter (mm) small tooling costs extra.
pub const TOOL_DIAMETER_LIMIT_MM: f64 = 3.0;
/// Above this aspect ratio fixturing costs extra.
pub const ASPECT_RATIO_LIMIT: f64 = 3.0;
/// Half width of the quoted price band, as a fraction.
pub const PRICE_BAND: f64 = 0.1;

/// One multiplier that went into a quote, with the reason it applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedFactor {
    /// Sub-factor or adjustment factor name.
    pub name: String,
    /// Multiplier.
    pub value: f64,
    /// Human-readable justification.
    pub reason: String,
}

impl AppliedFactor {
    fn new(name: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            reason: reason.into(),
        }
    }
}

/// A priced request. Values keep full precision; see [`Quote::presented`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    /// Processing type as requested.
    pub processing_type: String,
    /// Material as requested.
    pub material: String,
    /// Part count; zero is priced as one.
    pub quantity: u32,
    /// Base price of the process.
    pub base_price: f64,
    /// Material multiplier.
    pub material_multiplier: f64,
    /// Quantity discount factor in `[0.8, 1]`.
    pub quantity_discount: f64,
    /// Product of the feature sub-factors.
    pub model_factor: f64,
    /// Product of the active adjustment factors.
    pub adjustment_factor: f64,
    /// Unit price.
    pub final_price: f64,
    /// Lower end of the quoted band.
    pub price_low: f64,
    /// Upper end of the quoted band.
    pub price_high: f64,
    /// Every sub-factor and adjustment that applied, in application order.
    pub applied_factors: Vec<AppliedFactor>,
    /// Part weight from volume and material density, when both are known.
    pub estimated_weight_g: Option<f64>,
    /// Unit price times quantity.
    pub order_total: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Quote {
    /// Copy with every value rounded to two decimals, for display.
    pub fn presented(&self) -> Quote {
        Quote {
            processing_type: self.processing_type.clone(),
            material: self.material.clone(),
            quantity: self.quantity,
            base_price: round2(self.base_price),
            material_multiplier: round2(self.material_multiplier),
            quantity_discount: round2(self.quantity_discount),
            model_factor: round2(self.model_factor),
            adjustment_factor: round2(self.adjustment_factor),
            final_price: round2(self.final_price),
            price_low: round2(self.price_low),
            price_high: round2(self.price_high),
            applied_factors: self
                .applied_factors
                .iter()
                .map(|f| AppliedFactor {
                    value: round2(f.value),
                    ..f.clone()
                })
                .collect(),
            estimated_weight_g: self.estimated_weight_g.map(round2),
            order_total: round2(self.order_total),
        }
    }
}

/// Feature sub-factors that apply to `features`, in a fixed order.
pub fn model_subfactors(features: &FeatureRecord) -> Vec<AppliedFactor> {
    let mut applied = Vec::new();

    if let Some(v) = features.volume_cm3 {
        applied.push(AppliedFactor::new(
            "volume",
            1.0 + v.max(1.0).log10() / 10.0,
            format!("part volume {v:.2} cm³"),
        ));
    }
    if let Some(a) = features.surface_area_cm2 {
        applied.push(AppliedFactor::new(
            "surface_area",
            1.0 + a.max(1.0).log10() / 10.0,
            format!("surface area {a:.2} cm²"),
        ));
    }
    if let Some(c) = features.complexity_score {
        applied.push(AppliedFactor::new(
            "complexity",
            1.0 + c / 10.0,
            format!("complexity score {c:.1}"),
        ));
    }
    if let Some(d) = features.machining_difficulty() {
        applied.push(AppliedFactor::new(
            "difficulty",
            1.0 + d / 5.0,
            format!("machining difficulty {d:.1} of 5"),
        ));
    }
    if let Some(r) = features.min_corner_radius_mm().filter(|&r| r < CORNER_RADIUS_LIMIT_MM) {
        applied.push(AppliedFactor::new(
            "corner_radius",
            1.0 + (CORNER_RADIUS_LIMIT_MM - r) / CORNER_RADIUS_LIMIT_MM,
            format!("internal corner radius {r:.2} mm is below {CORNER_RADIUS_LIMIT_MM} mm"),
        ));
    }
    if let Some(d) = features.min_tool_diameter_mm().filter(|&d| d < TOOL_DIAMETER_LIMIT_MM) {
        applied.push(AppliedFactor::new(
            "tool_diameter",
            1.0 + (TOOL_DIAMETER_LIMIT_MM - d) / TOOL_DIAMETER_LIMIT_MM,
            format!("needs a {d:.2} mm tool, below {TOOL_DIAMETER_LIMIT_MM} mm"),
        ));
    }
    if let Some(ar) = features.max_aspect_ratio.filter(|&ar| ar > ASPECT_RATIO_LIMIT) {
        applied.push(AppliedFactor::new(
            "aspect_ratio",
            1.0 + (ar - ASPECT_RATIO_LIMIT) / 10.0,
            format!("aspect ratio {ar:.2} exceeds {ASPECT_RATIO_LIMIT}"),
        ));
    }
    applied
}

/// Price one request.
///
/// Pure: the same inputs always give the same quote. Unknown processing
/// types and materials price at the defaults.
pub fn price(
    processing_type: &str,
    material: &str,
    quantity: u32,
    features: &FeatureRecord,
    snapshot: &FactorSnapshot,
) -> Quote {
    let base = base_price(processing_type);
    let material_mult = material_multiplier(material);
    let discount = quantity_discount(quantity);

    let mut applied = model_subfactors(features);
    let model_factor: f64 = applied.iter().map(|f| f.value).product();

    let adjustment_factor = snapshot.product();
    for factor in snapshot.active() {
        let reason = if factor.description.is_empty() {
            "adjustment factor".to_string()
        } else {
            factor.description.clone()
        };
        applied.push(AppliedFactor::new(factor.name.clone(), factor.value, reason));
    }

    let final_price = base * material_mult * discount * model_factor * adjustment_factor;
    let estimated_weight_g = features
        .volume_cm3
        .zip(Material::parse(material).and_then(Material::density_g_per_cm3))
        .map(|(v, rho)| v * rho);

    debug!(
        processing_type,
        material,
        quantity,
        model_factor,
        adjustment_factor,
        final_price,
        "priced request"
    );

    Quote {
        processing_type: processing_type.to_string(),
        material: material.to_string(),
        quantity,
        base_price: base,
        material_multiplier: material_mult,
        quantity_discount: discount,
        model_factor,
        adjustment_factor,
        final_price,
        price_low: final_price * (1.0 - PRICE_BAND),
        price_high: final_price * (1.0 + PRICE_BAND),
        applied_factors: applied,
        estimated_weight_g,
        order_total: final_price * f64::from(quantity.max(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::AdjustmentFactor;
    use approx::assert_relative_eq;

    fn quote(features: &FeatureRecord) -> Quote {
        price("milling", "aluminum", 1, features, &FactorSnapshot::empty())
    }

    #[test]
    fn test_empty_record_milling_aluminum() {
        let q = quote(&FeatureRecord::empty());
        assert_eq!(q.base_price, 100.0);
        assert_eq!(q.material_multiplier, 1.0);
        assert_eq!(q.quantity_discount, 1.0);
        assert_eq!(q.model_factor, 1.0);
        assert_eq!(q.adjustment_factor, 1.0);
        assert!(q.applied_factors.is_empty());
        assert_eq!(q.estimated_weight_g, None);

        let shown = q.presented();
        assert_eq!(shown.final_price, 100.00);
        assert_eq!(shown.price_low, 90.00);
        assert_eq!(shown.price_high, 110.00);
        assert_eq!(shown.order_total, 100.00);
    }

    #[test]
    fn test_full_formula() {
        let mut features = FeatureRecord::empty();
        features.volume_cm3 = Some(100.0);
        features.surface_area_cm2 = Some(10.0);
        features.complexity_score = Some(3.0);
        features.max_aspect_ratio = Some(5.0);
        features.set_corner_radius(Some(1.0));
        features.set_machining_difficulty(Some(2.5));
        let snapshot = FactorSnapshot::new(vec![
            AdjustmentFactor::new("rush", 1.25).with_description("Expedited lead time"),
            AdjustmentFactor::new("promo", 0.5).with_active(false),
        ])
        .unwrap();

        let q = price("cnc_turning", "steel", 11, &features, &snapshot);
        // volume 1.2, area 1.1, complexity 1.3, difficulty 1.5,
        // radius 1.5, tool (d = 2) 4/3, aspect 1.2
        let model = 1.2 * 1.1 * 1.3 * 1.5 * 1.5 * (4.0 / 3.0) * 1.2;
        assert_relative_eq!(q.model_factor, model, max_relative = 1e-12);
        assert_relative_eq!(q.adjustment_factor, 1.25);
        assert_eq!(q.adjustment_factor, snapshot.product());
        let expected = 80.0 * 1.5 * (100.0 / 110.0) * model * 1.25;
        assert_relative_eq!(q.final_price, expected, max_relative = 1e-12);
        assert_relative_eq!(q.price_low, expected * 0.9, max_relative = 1e-12);
        assert_relative_eq!(q.order_total, expected * 11.0, max_relative = 1e-12);
        assert_relative_eq!(q.estimated_weight_g.unwrap(), 785.0, max_relative = 1e-12);

        let names: Vec<_> = q.applied_factors.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "volume",
                "surface_area",
                "complexity",
                "difficulty",
                "corner_radius",
                "tool_diameter",
                "aspect_ratio",
                "rush"
            ]
        );
        assert_eq!(q.applied_factors[7].reason, "Expedited lead time");
    }

    #[test]
    fn test_thresholds_skip_large_values() {
        let mut features = FeatureRecord::empty();
        features.max_aspect_ratio = Some(3.0);
        features.set_corner_radius(Some(2.0));
        let q = quote(&features);
        assert!(q.applied_factors.is_empty());
        assert_eq!(q.model_factor, 1.0);
    }

    #[test]
    fn test_tiny_volume_is_neutral() {
        let mut features = FeatureRecord::empty();
        features.volume_cm3 = Some(0.2);
        assert_eq!(quote(&features).model_factor, 1.0);
    }

    #[test]
    fn test_monotone_in_complexity_difficulty_and_volume() {
        let mut previous = 0.0;
        for step in 0..=40 {
            let c = 1.0 + f64::from(step) * 0.1;
            let mut features = FeatureRecord::empty();
            features.complexity_score = Some(c);
            let p = quote(&features).final_price;
            assert!(p >= previous);
            previous = p;
        }

        previous = 0.0;
        for step in 0..=50 {
            let mut features = FeatureRecord::empty();
            features.set_machining_difficulty(Some(f64::from(step) * 0.12));
            let p = quote(&features).final_price;
            assert!(p >= previous);
            previous = p;
        }

        previous = 0.0;
        for v in [0.0, 0.5, 1.0, 2.0, 10.0, 250.0, 1e4, 1e7] {
            let mut features = FeatureRecord::empty();
            features.volume_cm3 = Some(v);
            let p = quote(&features).final_price;
            assert!(p >= previous);
            previous = p;
        }
    }

    #[test]
    fn test_quote_is_deterministic() {
        let mut features = FeatureRecord::empty();
        features.volume_cm3 = Some(12.3);
        features.complexity_score = Some(2.0);
        features.set_corner_radius(Some(0.4));
        let snapshot = FactorSnapshot::new(vec![AdjustmentFactor::new("rush", 1.3)]).unwrap();
        let a = price("milling", "stainless_steel", 7, &features, &snapshot);
        let b = price("milling", "stainless_steel", 7, &features, &snapshot);
        assert_eq!(a, b);
        assert_eq!(a.final_price.to_bits(), b.final_price.to_bits());
    }

    #[test]
    fn test_unknown_type_and_material() {
        let q = price("edm", "unobtainium", 0, &FeatureRecord::empty(), &FactorSnapshot::empty());
        assert_eq!(q.base_price, 100.0);
        assert_eq!(q.material_multiplier, 1.0);
        assert_eq!(q.quantity_discount, 1.0);
        assert_eq!(q.processing_type, "edm");
        assert_eq!(q.order_total, q.final_price);
    }

    #[test]
    fn test_presented_rounds_factors() {
        let mut features = FeatureRecord::empty();
        features.volume_cm3 = Some(7.0);
        let shown = price("printing", "plastic", 3, &features, &FactorSnapshot::empty()).presented();
        let volume = &shown.applied_factors[0];
        assert_eq!(volume.value, 1.08);
        assert_eq!(shown.estimated_weight_g, Some(8.4));
        assert_eq!(shown.final_price, (shown.final_price * 100.0).round() / 100.0);
    }
}
