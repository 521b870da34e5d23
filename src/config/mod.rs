pub mod toml_config;

pub use toml_config::{EvalConfig, EvaluationConfig, ServiceConfig};

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "geoeval")]
#[command(about = "Evaluate a deferred geospatial computation against a remote service")]
pub struct CliConfig {
    /// Evaluation endpoint; ignored when --config is given
    #[arg(long, default_value = "http://localhost:8080/evaluate")]
    pub endpoint: String,

    /// TOML configuration file overriding --endpoint
    #[arg(long)]
    pub config: Option<String>,

    /// JSON file holding the expression to evaluate
    #[arg(long)]
    pub expression: String,

    /// Total attempt ceiling for capacity-limited retries
    #[arg(long, default_value = "4")]
    pub max_attempts: u32,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.config.is_none() {
            validate_url("endpoint", &self.endpoint)?;
        }
        validate_positive_number("max_attempts", self.max_attempts as usize, 1)?;
        Ok(())
    }
}
