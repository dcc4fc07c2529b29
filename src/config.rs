//! Drift engine configuration.
//!
//! Defaults reproduce the standard setup: 10 PSI bins, 20 JSD bins, a 1e-6
//! probability floor, and PSI risk bands at 0.1 / 0.25. A YAML file can
//! override any subset:
//!
//! ```yaml
//! bins: 12
//! exclude_columns: [label]
//! thresholds:
//!   psi_high: 0.3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// PSI at or above this value is at least medium risk.
pub const PSI_MEDIUM_THRESHOLD: f64 = 0.1;
/// PSI strictly above this value is high risk.
pub const PSI_HIGH_THRESHOLD: f64 = 0.25;
/// JSD at or above this value is at least medium risk.
pub const JSD_MEDIUM_THRESHOLD: f64 = 0.05;
/// JSD strictly above this value is high risk.
pub const JSD_HIGH_THRESHOLD: f64 = 0.1;
/// Equal-width bins for numeric PSI.
pub const DEFAULT_BINS: usize = 10;
/// Equal-width bins for numeric JSD.
pub const DEFAULT_JSD_BINS: usize = 20;
/// Floor applied to bin fractions before taking PSI logarithms.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Risk band boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskThresholds {
    /// Lower bound (inclusive) of the medium PSI band.
    pub psi_medium: f64,
    /// Upper bound (inclusive) of the medium PSI band.
    pub psi_high: f64,
    /// Lower bound (inclusive) of the medium JSD band.
    pub jsd_medium: f64,
    /// Upper bound (inclusive) of the medium JSD band.
    pub jsd_high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            psi_medium: PSI_MEDIUM_THRESHOLD,
            psi_high: PSI_HIGH_THRESHOLD,
            jsd_medium: JSD_MEDIUM_THRESHOLD,
            jsd_high: JSD_HIGH_THRESHOLD,
        }
    }
}

impl RiskThresholds {
    /// Check that each band is ordered and non-negative.
    ///
    /// # Errors
    ///
    /// Returns an invalid-config error describing the first bad band.
    pub fn validate(&self) -> Result<()> {
        check_band("psi", self.psi_medium, self.psi_high)?;
        check_band("jsd", self.jsd_medium, self.jsd_high)
    }
}

fn check_band(name: &str, medium: f64, high: f64) -> Result<()> {
    if !(medium.is_finite() && high.is_finite()) || medium < 0.0 {
        return Err(Error::invalid_config(format!(
            "{name} thresholds must be finite and non-negative"
        )));
    }
    if medium > high {
        return Err(Error::invalid_config(format!(
            "{name}_medium ({medium}) must not exceed {name}_high ({high})"
        )));
    }
    Ok(())
}

/// Settings for a drift comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriftConfig {
    /// Equal-width bins over the baseline range for numeric PSI.
    pub bins: usize,
    /// Equal-width bins over the joint range for numeric JSD.
    pub jsd_bins: usize,
    /// Floor for PSI bin fractions.
    pub epsilon: f64,
    /// Threads used to score features; 1 scores sequentially.
    pub workers: usize,
    /// Shared columns that are never scored (e.g. a label column).
    pub exclude_columns: Vec<String>,
    /// Risk band boundaries.
    pub thresholds: RiskThresholds,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            jsd_bins: DEFAULT_JSD_BINS,
            epsilon: DEFAULT_EPSILON,
            workers: 1,
            exclude_columns: Vec::new(),
            thresholds: RiskThresholds::default(),
        }
    }
}

impl DriftConfig {
    /// Parse a configuration from YAML text. Missing keys keep defaults.
    ///
    /// # Errors
    ///
    /// Returns a YAML error for malformed input or unknown keys, and an
    /// invalid-config error if the values fail [`DriftConfig::validate`].
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, plus the errors of
    /// [`DriftConfig::from_yaml_str`].
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
        Self::from_yaml_str(&yaml)
    }

    /// Check every setting.
    ///
    /// # Errors
    ///
    /// Returns an invalid-config error for zero bins or workers, an epsilon
    /// outside (0, 1), or bad thresholds.
    pub fn validate(&self) -> Result<()> {
        if self.bins == 0 {
            return Err(Error::invalid_config("bins must be at least 1"));
        }
        if self.jsd_bins == 0 {
            return Err(Error::invalid_config("jsd_bins must be at least 1"));
        }
        if !(self.epsilon > 0.0 && self.epsilon < 1.0) {
            return Err(Error::invalid_config(format!(
                "epsilon must be in (0, 1), got {}",
                self.epsilon
            )));
        }
        if self.workers == 0 {
            return Err(Error::invalid_config("workers must be at least 1"));
        }
        self.thresholds.validate()
    }
}
