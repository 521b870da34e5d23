use crate::domain::model::Expression;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Remote computation service, injected into every helper so tests can
/// substitute a scripted double.
#[async_trait]
pub trait ComputeService: Send + Sync {
    /// Evaluate a deferred computation now and return its structured value.
    async fn get_info(&self, expr: &Expression) -> Result<Value>;
}
