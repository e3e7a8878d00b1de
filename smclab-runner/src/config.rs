//! Typed TOML configuration for detection, simulation, and validation.
//!
//! Every section and field is optional; omitted values take the documented
//! defaults of the corresponding config struct.
//!
//! ```toml
//! [structure]
//! swing_strength = 5
//! displacement_multiplier = 1.2
//!
//! [fvg]
//! min_gap_pips = 5.0
//! max_age_bars = 50
//! fill_percentage_threshold = 50.0
//! pip_value = 0.0001
//!
//! [monte_carlo]
//! n_simulations = 10000
//! initial_capital = 10000.0
//! seed = 42
//!
//! [validation]
//! alpha = 0.05
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use smclab_core::{FvgConfig, StructureConfig};

use crate::monte_carlo::MonteCarloConfig;
use crate::validation::ValidationConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// All tunables of one toolkit session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmcConfig {
    pub structure: StructureConfig,
    pub fvg: FvgConfig,
    pub monte_carlo: MonteCarloConfig,
    pub validation: ValidationConfig,
}

impl SmcConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.structure;
        if s.swing_strength == 0 {
            return Err(invalid("structure.swing_strength", "must be at least 1"));
        }
        non_negative("structure.displacement_multiplier", s.displacement_multiplier)?;

        let f = &self.fvg;
        non_negative("fvg.min_gap_pips", f.min_gap_pips)?;
        non_negative("fvg.pip_value", f.pip_value)?;
        let threshold = f.fill_percentage_threshold;
        if !(threshold.is_finite() && threshold > 0.0 && threshold <= 100.0) {
            return Err(invalid(
                "fvg.fill_percentage_threshold",
                format!("must be in (0, 100], got {threshold}"),
            ));
        }

        let mc = &self.monte_carlo;
        if mc.n_simulations == 0 {
            return Err(invalid("monte_carlo.n_simulations", "must be at least 1"));
        }
        if !(mc.initial_capital.is_finite() && mc.initial_capital > 0.0) {
            return Err(invalid(
                "monte_carlo.initial_capital",
                format!("must be positive, got {}", mc.initial_capital),
            ));
        }
        if mc.threads == Some(0) {
            return Err(invalid("monte_carlo.threads", "must be at least 1 when set"));
        }

        let alpha = self.validation.alpha;
        if !(alpha.is_finite() && alpha > 0.0 && alpha < 1.0) {
            return Err(invalid(
                "validation.alpha",
                format!("must be in (0, 1), got {alpha}"),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(
            field,
            format!("must be finite and non-negative, got {value}"),
        ))
    }
}
