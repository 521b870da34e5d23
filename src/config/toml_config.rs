use crate::core::evaluator::DEFAULT_MAX_ATTEMPTS;
use crate::utils::error::{EvalError, Result};
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    pub service: ServiceConfig,
    pub evaluation: Option<EvaluationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub max_attempts: Option<u32>,
}

impl EvalConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EvalError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| EvalError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Resolve `${VAR}` placeholders from the environment; unknown variables
    /// are left in place.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn max_attempts(&self) -> u32 {
        self.evaluation
            .as_ref()
            .and_then(|evaluation| evaluation.max_attempts)
            .unwrap_or(DEFAULT_MAX_ATTEMPTS)
    }
}

impl Validate for EvalConfig {
    fn validate(&self) -> Result<()> {
        validate_url("service.endpoint", &self.service.endpoint)?;

        if let Some(evaluation) = &self.evaluation {
            if let Some(max_attempts) = evaluation.max_attempts {
                validate_positive_number("evaluation.max_attempts", max_attempts as usize, 1)?;
            }
        }

        Ok(())
    }
}
