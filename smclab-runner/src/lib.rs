//! SMC Lab Runner: risk simulation and statistical validation of trade PnLs.
//!
//! - Monte Carlo reshuffling of a trade list into equity-path distributions
//! - Six-test significance validation of a return series
//! - Shared descriptive statistics and trade metrics
//! - Typed TOML configuration for the whole toolkit
//! - JSON report persistence and console rendering

pub mod config;
pub mod metrics;
pub mod monte_carlo;
pub mod report;
pub mod stats;
pub mod validation;

pub use config::{ConfigError, SmcConfig};
pub use monte_carlo::{
    run_monte_carlo, MonteCarloConfig, MonteCarloError, MonteCarloResults, MonteCarloSimulator,
    RiskAssessment, RiskRating,
};
pub use report::{MonteCarloReport, ReportError, ValidationReport};
pub use validation::{
    SignificanceTest, StatisticalValidation, StatisticalValidator, ValidationConfig,
};
