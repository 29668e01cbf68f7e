//! TOML configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use partquote::{AdjustmentFactor, EngineConfig, FactorSnapshot};
use serde::Deserialize;

/// Contents of a `partquote.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Backend selection and limits.
    pub engine: EngineConfig,
    /// Adjustment factor rows, in application order.
    #[serde(rename = "factor")]
    pub factors: Vec<AdjustmentFactor>,
}

impl CliConfig {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// The configuration at `path`, or the defaults when there is none.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Parse configuration text.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Validated factor snapshot.
    pub fn snapshot(&self) -> Result<FactorSnapshot> {
        FactorSnapshot::new(self.factors.clone()).context("invalid adjustment factors")
    }
}
