//! Code for loading and validating build configuration.
use crate::error::ConfigurationError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::fs;
use std::path::Path;

/// The file name for the optional per-case configuration file
const CONFIG_FILE_NAME: &str = "scuc.toml";

/// Default number of cost-curve segments
fn default_segments() -> usize {
    2
}

/// Default load-mismatch penalty
fn default_penalty() -> f64 {
    1e6
}

/// How to derive a generator's initial state when no prior commitment history
/// is available.
///
/// The original tooling silently fell back to an all-zero history matrix; we
/// treat the choice as an explicit policy instead.
#[derive(Debug, Clone, Copy, PartialEq, SerializeLabeledStringEnum, DeserializeLabeledStringEnum)]
pub enum InitialStatePolicy {
    /// Assume the unit switched into its declared initial status one period
    /// before the horizon (state = +1 or -1)
    #[string = "just_switched"]
    JustSwitched,
    /// Assume the unit has been off for the whole horizon length
    #[string = "full_history_off"]
    FullHistoryOff,
}

impl Default for InitialStatePolicy {
    fn default() -> Self {
        InitialStatePolicy::JustSwitched
    }
}

/// Options controlling how the unit-commitment model is formulated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Express network constraints via a PTDF matrix instead of angle variables
    pub use_ptdf: bool,
    /// Number of linear segments in each generator's cost curve (breakpoints = segments + 1)
    pub segments: usize,
    /// System reserve requirement as a fraction of total demand
    pub reserve_factor: f64,
    /// Use the piecewise linearisation of quadratic cost curves; when false,
    /// quadratics are rendered as tangent cuts at the sampled points
    pub linearized_cost_curve: bool,
    /// Round PTDF entries to this many decimal places
    pub ptdf_precision: Option<u32>,
    /// Zero out PTDF entries with magnitude below this tolerance
    pub ptdf_tolerance: Option<f64>,
    /// Objective penalty applied to each MW of load-generation mismatch
    pub penalty: f64,
    /// Fallback when a generator has no prior commitment history
    pub initial_state_policy: InitialStatePolicy,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            use_ptdf: false,
            segments: default_segments(),
            reserve_factor: 0.0,
            linearized_cost_curve: true,
            ptdf_precision: None,
            ptdf_tolerance: None,
            penalty: default_penalty(),
            initial_state_policy: InitialStatePolicy::default(),
        }
    }
}

impl BuildConfig {
    /// Check every option value, rejecting the configuration before any model
    /// building starts.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.segments < 1 {
            return Err(ConfigurationError(format!(
                "segments must be at least 1, got {}",
                self.segments
            )));
        }
        if self.reserve_factor < 0.0 || !self.reserve_factor.is_finite() {
            return Err(ConfigurationError(format!(
                "reserve_factor must be non-negative, got {}",
                self.reserve_factor
            )));
        }
        if self.penalty <= 0.0 || !self.penalty.is_finite() {
            return Err(ConfigurationError(format!(
                "penalty must be positive, got {}",
                self.penalty
            )));
        }
        if let Some(tolerance) = self.ptdf_tolerance
            && tolerance < 0.0
        {
            return Err(ConfigurationError(format!(
                "ptdf_tolerance must be non-negative, got {tolerance}"
            )));
        }

        Ok(())
    }

    /// Read the configuration from `scuc.toml` in the given case directory.
    ///
    /// If the file is not present, default values are used.
    pub fn load_from_dir<P: AsRef<Path>>(case_dir: P) -> Result<BuildConfig> {
        let file_path = case_dir.as_ref().join(CONFIG_FILE_NAME);
        if !file_path.is_file() {
            return Ok(BuildConfig::default());
        }

        let contents = fs::read_to_string(&file_path)
            .with_context(|| format!("Could not read {}", file_path.display()))?;
        let config: BuildConfig = toml::from_str(&contents)
            .with_context(|| format!("Could not parse {}", file_path.display()))?;

        Ok(config)
    }
}

/// Options passed to the solver adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Wall-clock limit in seconds (None = no limit)
    pub time_limit: Option<f64>,
    /// Relative MIP gap at which the solve terminates
    pub mip_gap: f64,
    /// Whether to compute locational marginal prices with a pricing run after
    /// the MIP solve
    pub compute_duals: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            time_limit: None,
            mip_gap: 0.01,
            compute_duals: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_validate_default() {
        assert!(BuildConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = BuildConfig {
            segments: 0,
            ..BuildConfig::default()
        };
        assert!(config.validate().is_err());

        let config = BuildConfig {
            reserve_factor: -0.1,
            ..BuildConfig::default()
        };
        assert!(config.validate().is_err());

        let config = BuildConfig {
            penalty: 0.0,
            ..BuildConfig::default()
        };
        assert!(config.validate().is_err());

        let config = BuildConfig {
            ptdf_tolerance: Some(-1e-6),
            ..BuildConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_dir_no_file() {
        let dir = tempdir().unwrap();
        assert_eq!(
            BuildConfig::load_from_dir(dir.path()).unwrap(),
            BuildConfig::default()
        );
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(CONFIG_FILE_NAME)).unwrap();
            writeln!(file, "segments = 4\nreserve_factor = 0.1").unwrap();
        }

        let config = BuildConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.segments, 4);
        assert_eq!(config.reserve_factor, 0.1);
        assert!(!config.use_ptdf);
    }
}
