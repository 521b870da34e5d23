pub mod evaluator;
pub mod extract;
pub mod series;

pub use crate::domain::model::{Expression, Geometry, Reducer};
pub use crate::domain::ports::ComputeService;
pub use crate::utils::error::Result;
