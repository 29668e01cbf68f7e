//! Fixed price tables: base price per process, material multipliers and
//! densities, quantity discount.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Base price for a processing type nobody recognises.
pub const DEFAULT_BASE_PRICE: f64 = 100.0;

/// Multiplier for an unrecognised material.
pub const DEFAULT_MATERIAL_MULTIPLIER: f64 = 1.0;

/// Lowest quantity discount factor.
pub const MIN_QUANTITY_DISCOUNT: f64 = 0.8;

/// Normalise a user-supplied key: trimmed, lower case, `-` and spaces as `_`.
fn normalize(name: &str) -> String {
    name.trim()
        .to_ascii_lowercase()
        .replace(['-', ' '], "_")
}

/// Manufacturing process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Process {
    /// CNC milling.
    Milling,
    /// CNC turning.
    Turning,
    /// Additive manufacturing.
    Printing,
}

impl Process {
    /// Parse a process name, accepting the `cnc_` and `3d_` spellings.
    pub fn parse(name: &str) -> Option<Self> {
        match normalize(name).as_str() {
            "milling" | "cnc_milling" => Some(Process::Milling),
            "turning" | "cnc_turning" => Some(Process::Turning),
            "printing" | "3d_printing" => Some(Process::Printing),
            _ => None,
        }
    }

    /// Base price before any multiplier.
    pub fn base_price(self) -> f64 {
        match self {
            Process::Milling => 100.0,
            Process::Turning => 80.0,
            Process::Printing => 50.0,
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Process::Milling => "milling",
            Process::Turning => "turning",
            Process::Printing => "printing",
        };
        f.write_str(s)
    }
}

/// Stock material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    /// Aluminium alloys.
    Aluminum,
    /// Carbon and alloy steel.
    Steel,
    /// Stainless steel.
    StainlessSteel,
    /// Engineering plastics.
    Plastic,
    /// Anything the shop quotes on request.
    Other,
}

impl Material {
    /// Parse a material name.
    pub fn parse(name: &str) -> Option<Self> {
        match normalize(name).as_str() {
            "aluminum" | "aluminium" => Some(Material::Aluminum),
            "steel" => Some(Material::Steel),
            "stainless_steel" | "stainless" => Some(Material::StainlessSteel),
            "plastic" => Some(Material::Plastic),
            "other" => Some(Material::Other),
            _ => None,
        }
    }

    /// Price multiplier relative to aluminium.
    pub fn multiplier(self) -> f64 {
        match self {
            Material::Aluminum => 1.0,
            Material::Steel => 1.5,
            Material::StainlessSteel => 1.8,
            Material::Plastic => 0.8,
            Material::Other => 1.2,
        }
    }

    /// Density in g/cm³; unknown for [`Material::Other`].
    pub fn density_g_per_cm3(self) -> Option<f64> {
        match self {
            Material::Aluminum => Some(2.70),
            Material::Steel => Some(7.85),
            Material::StainlessSteel => Some(8.00),
            Material::Plastic => Some(1.20),
            Material::Other => None,
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Material::Aluminum => "aluminum",
            Material::Steel => "steel",
            Material::StainlessSteel => "stainless_steel",
            Material::Plastic => "plastic",
            Material::Other => "other",
        };
        f.write_str(s)
    }
}

/// Base price for a processing type name; unknown names get the default.
pub fn base_price(processing_type: &str) -> f64 {
    Process::parse(processing_type).map_or(DEFAULT_BASE_PRICE, Process::base_price)
}

/// Multiplier for a material name; unknown names get 1.0.
pub fn material_multiplier(material: &str) -> f64 {
    Material::parse(material).map_or(DEFAULT_MATERIAL_MULTIPLIER, Material::multiplier)
}

/// `max(0.8, 100 / (quantity + 99))`, with a quantity of zero read as one.
pub fn quantity_discount(quantity: u32) -> f64 {
    let q = f64::from(quantity.max(1));
    (100.0 / (q + 99.0)).max(MIN_QUANTITY_DISCOUNT)
}
