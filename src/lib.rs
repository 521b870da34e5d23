pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::HttpComputeService;
pub use crate::config::EvalConfig;
pub use crate::core::evaluator::{Evaluation, DEFAULT_MAX_ATTEMPTS};
pub use crate::domain::model::{Expression, Geometry, Reducer};
pub use crate::domain::ports::ComputeService;
pub use crate::utils::error::{EvalError, Result};
