use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::InvalidRecord;

/// Engine configuration, read from `<root>/.seatwise/config.toml`.
///
/// Every field has a default so a missing file, a missing table, or a
/// missing key all resolve to the same values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub geometry: GeometryConfig,
    #[serde(default)]
    pub planning: PlanningConfig,
}

/// Table body sizes and clearance margins, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    #[serde(default = "default_round_diameter")]
    pub round_diameter: f64,
    #[serde(default = "default_round_clearance")]
    pub round_clearance: f64,
    #[serde(default = "default_square_side")]
    pub square_side: f64,
    #[serde(default = "default_square_clearance")]
    pub square_clearance: f64,
    #[serde(default = "default_rect_depth")]
    pub rect_depth: f64,
    #[serde(default = "default_rect_seat_pitch")]
    pub rect_seat_pitch: f64,
    #[serde(default = "default_rect_min_length")]
    pub rect_min_length: f64,
    #[serde(default = "default_rect_clearance")]
    pub rect_clearance: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            round_diameter: default_round_diameter(),
            round_clearance: default_round_clearance(),
            square_side: default_square_side(),
            square_clearance: default_square_clearance(),
            rect_depth: default_rect_depth(),
            rect_seat_pitch: default_rect_seat_pitch(),
            rect_min_length: default_rect_min_length(),
            rect_clearance: default_rect_clearance(),
        }
    }
}

impl GeometryConfig {
    /// Reject sizes that would make footprints degenerate or inverted.
    ///
    /// Every layout checks its geometry with this before placing anything.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRecord::Geometry`] naming the first offending key.
    pub fn validate(&self) -> Result<(), InvalidRecord> {
        let sizes = [
            ("round_diameter", self.round_diameter),
            ("square_side", self.square_side),
            ("rect_depth", self.rect_depth),
            ("rect_seat_pitch", self.rect_seat_pitch),
            ("rect_min_length", self.rect_min_length),
        ];
        for (key, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                return Err(InvalidRecord::Geometry {
                    key,
                    expected: "a positive number",
                    value,
                });
            }
        }

        let margins = [
            ("round_clearance", self.round_clearance),
            ("square_clearance", self.square_clearance),
            ("rect_clearance", self.rect_clearance),
        ];
        for (key, value) in margins {
            if !(value.is_finite() && value >= 0.0) {
                return Err(InvalidRecord::Geometry {
                    key,
                    expected: "zero or positive",
                    value,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Re-read and retry once when a write loses an optimistic-concurrency race.
    #[serde(default = "default_true")]
    pub retry_on_stale: bool,
    /// Fall back to tables hosting a parent or child when no sibling is seated.
    #[serde(default = "default_true")]
    pub suggest_from_kin: bool,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            retry_on_stale: default_true(),
            suggest_from_kin: default_true(),
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_round_diameter() -> f64 {
    1.8
}

const fn default_round_clearance() -> f64 {
    0.6
}

const fn default_square_side() -> f64 {
    1.6
}

const fn default_square_clearance() -> f64 {
    0.5
}

const fn default_rect_depth() -> f64 {
    0.9
}

const fn default_rect_seat_pitch() -> f64 {
    0.6
}

const fn default_rect_min_length() -> f64 {
    1.2
}

const fn default_rect_clearance() -> f64 {
    0.5
}

/// Path of the project config file under `root`.
#[must_use]
pub fn config_path(root: &Path) -> PathBuf {
    root.join(".seatwise/config.toml")
}

/// Load `<root>/.seatwise/config.toml`, or defaults when it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_config(root: &Path) -> Result<EngineConfig> {
    let path = config_path(root);
    if !path.exists() {
        return Ok(EngineConfig::default());
    }
    load_config_file(&path)
}

/// Load and validate a config file at an explicit path.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_config_file(path: &Path) -> Result<EngineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str::<EngineConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    config
        .geometry
        .validate()
        .with_context(|| format!("Invalid geometry in {}", path.display()))?;

    Ok(config)
}

/// Resolve the effective config: an explicit override path (typically from
/// `SEATWISE_CONFIG`) wins over the project file.
///
/// # Errors
///
/// Returns an error if the selected file cannot be loaded.
pub fn resolve_config(root: &Path, override_path: Option<&Path>) -> Result<EngineConfig> {
    match override_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config override");
            load_config_file(path)
        }
        None => load_config(root),
    }
}
