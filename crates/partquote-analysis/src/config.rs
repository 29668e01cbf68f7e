//! Engine configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::manufacturability::DEFAULT_WELD_TOLERANCE_MM;

/// The built-in backends, by configuration name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// STEP / IGES boundary-rep reader.
    StepKernel,
    /// STL / OBJ reader with welding.
    MeshKernel,
    /// Raw STL triangle list.
    StlMinimal,
    /// File-size complexity only.
    BestEffort,
}

impl BackendKind {
    /// Every backend, richest first.
    pub const ALL: [BackendKind; 4] = [
        BackendKind::StepKernel,
        BackendKind::MeshKernel,
        BackendKind::StlMinimal,
        BackendKind::BestEffort,
    ];

    /// Configuration name, also the backend's reported name.
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::StepKernel => "step-kernel",
            BackendKind::MeshKernel => "mesh-kernel",
            BackendKind::StlMinimal => "stl-minimal",
            BackendKind::BestEffort => "best-effort",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("unknown backend '{s}'"))
    }
}

/// Settings for building a backend registry and running the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Enabled backends in rank order.
    pub backends: Vec<BackendKind>,
    /// Per-backend time limit; `None` waits indefinitely.
    pub backend_timeout_ms: Option<u64>,
    /// Vertex weld tolerance for mesh adjacency, mm.
    pub weld_tolerance_mm: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backends: BackendKind::ALL.to_vec(),
            backend_timeout_ms: None,
            weld_tolerance_mm: DEFAULT_WELD_TOLERANCE_MM,
        }
    }
}

impl EngineConfig {
    /// The per-backend timeout as a duration.
    pub fn backend_timeout(&self) -> Option<Duration> {
        self.backend_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_all_backends() {
        let config = EngineConfig::default();
        assert_eq!(config.backends.len(), 4);
        assert_eq!(config.backend_timeout(), None);
        assert_eq!(config.weld_tolerance_mm, 1e-6);
    }

    #[test]
    fn test_backend_names_round_trip() {
        for kind in BackendKind::ALL {
            assert_eq!(kind.name().parse::<BackendKind>(), Ok(kind));
        }
        assert!("opencascade".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"backends": ["mesh-kernel"], "backend_timeout_ms": 250}"#)
                .unwrap();
        assert_eq!(config.backends, vec![BackendKind::MeshKernel]);
        assert_eq!(config.backend_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.weld_tolerance_mm, 1e-6);
        assert!(serde_json::from_str::<EngineConfig>(r#"{"backend": []}"#).is_err());
    }
}
