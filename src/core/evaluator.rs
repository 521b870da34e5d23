use crate::domain::model::Expression;
use crate::domain::ports::ComputeService;
use crate::utils::error::{EvalError, Result};
use serde_json::Value;
use std::time::Duration;

/// Error-message fragment the service emits when a computation runs out of
/// memory. Only failures carrying this exact text are treated as transient.
pub const CAPACITY_EXCEEDED_SIGNATURE: &str = "Earth Engine memory capacity exceeded";

pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Outcome of a retried evaluation.
///
/// `Exhausted` carries whatever the last attempt produced (possibly null) so a
/// caller can tell an empty-but-valid result apart from exhausted retries.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Completed(Value),
    Exhausted(Value),
}

impl Evaluation {
    pub fn value(&self) -> &Value {
        match self {
            Evaluation::Completed(value) | Evaluation::Exhausted(value) => value,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Evaluation::Completed(value) | Evaluation::Exhausted(value) => value,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Evaluation::Exhausted(_))
    }
}

/// Delay before the retry that follows attempt `attempt` (1-indexed): grows
/// quadratically, 1s, 4s, 9s, ...
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(u64::from(attempt) * u64::from(attempt))
}

fn is_capacity_exceeded(err: &EvalError) -> bool {
    err.to_string().contains(CAPACITY_EXCEEDED_SIGNATURE)
}

fn is_empty_result(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Number(_) | Value::Bool(_) => false,
    }
}

/// Evaluate `expr`, retrying capacity-limited failures with quadratic backoff.
///
/// Makes up to `max_attempts` total attempts (a ceiling of 0 still makes one).
/// A non-empty result completes immediately. An empty result (`null`, `{}`,
/// `[]`, `""`) is retried without delay. A failure whose message carries
/// [`CAPACITY_EXCEEDED_SIGNATURE`] is logged and retried after `attempt^2`
/// seconds; any other failure propagates unchanged on the spot. When the
/// ceiling is reached the last value is returned as [`Evaluation::Exhausted`]
/// rather than an error.
pub async fn get_info<S>(service: &S, expr: &Expression, max_attempts: u32) -> Result<Evaluation>
where
    S: ComputeService + ?Sized,
{
    let max_attempts = max_attempts.max(1);
    let mut last = Value::Null;

    for attempt in 1..=max_attempts {
        match service.get_info(expr).await {
            Ok(value) => {
                if !is_empty_result(&value) {
                    return Ok(Evaluation::Completed(value));
                }
                last = value;
            }
            Err(err) if is_capacity_exceeded(&err) => {
                tracing::info!("Resending query ({}/{})", attempt, max_attempts);
                tracing::debug!("{}", err);
                if attempt < max_attempts {
                    tokio::time::sleep(backoff_delay(attempt)).await;
                }
            }
            Err(err) => return Err(err),
        }
    }

    Ok(Evaluation::Exhausted(last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Clone)]
    enum Scripted {
        Value(Value),
        CapacityError,
        FatalError(&'static str),
    }

    struct ScriptedService {
        script: Mutex<VecDeque<Scripted>>,
        calls: AtomicUsize,
    }

    impl ScriptedService {
        fn new(script: Vec<Scripted>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ComputeService for ScriptedService {
        async fn get_info(&self, _expr: &Expression) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted service ran out of responses");
            match step {
                Scripted::Value(value) => Ok(value),
                Scripted::CapacityError => Err(EvalError::ServiceError {
                    message: format!("Computation failed: {}.", CAPACITY_EXCEEDED_SIGNATURE),
                }),
                Scripted::FatalError(message) => Err(EvalError::ServiceError {
                    message: message.to_string(),
                }),
            }
        }
    }

    fn expr() -> Expression {
        Expression::constant_image("NDVI", 0.5)
    }

    #[test]
    fn backoff_is_quadratic() {
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
        assert_eq!(backoff_delay(3), Duration::from_secs(9));
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_propagates_without_retry_or_sleep() {
        let service = ScriptedService::new(vec![Scripted::FatalError("Computation timed out.")]);
        let started = Instant::now();

        let err = get_info(&service, &expr(), 4).await.unwrap_err();

        assert!(err.to_string().contains("Computation timed out."));
        assert_eq!(service.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_errors_back_off_then_succeed() {
        let service = ScriptedService::new(vec![
            Scripted::CapacityError,
            Scripted::CapacityError,
            Scripted::Value(json!({"NDVI": 0.5})),
        ]);
        let started = Instant::now();

        let result = get_info(&service, &expr(), 4).await.unwrap();

        assert_eq!(result, Evaluation::Completed(json!({"NDVI": 0.5})));
        assert_eq!(service.calls(), 3);
        // 1s after the first failure, 4s after the second
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_last_value_instead_of_failing() {
        let service = ScriptedService::new(vec![Scripted::CapacityError; 4]);
        let started = Instant::now();

        let result = get_info(&service, &expr(), 4).await.unwrap();

        assert_eq!(result, Evaluation::Exhausted(Value::Null));
        assert!(result.is_exhausted());
        assert_eq!(service.calls(), 4);
        // three backoffs, none after the final attempt
        assert_eq!(started.elapsed(), Duration::from_secs(1 + 4 + 9));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_results_retry_without_backoff() {
        let service = ScriptedService::new(vec![
            Scripted::Value(json!({})),
            Scripted::Value(json!({"NDVI": 0.25})),
        ]);
        let started = Instant::now();

        let result = get_info(&service, &expr(), 4).await.unwrap();

        assert_eq!(result, Evaluation::Completed(json!({"NDVI": 0.25})));
        assert_eq!(service.calls(), 2);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn exhausted_empty_result_is_kept() {
        let service = ScriptedService::new(vec![Scripted::Value(json!({})); 2]);

        let result = get_info(&service, &expr(), 2).await.unwrap();

        assert_eq!(result, Evaluation::Exhausted(json!({})));
    }

    #[tokio::test]
    async fn zero_ceiling_still_attempts_once() {
        let service = ScriptedService::new(vec![Scripted::Value(json!({"NDVI": 1.0}))]);

        let result = get_info(&service, &expr(), 0).await.unwrap();

        assert_eq!(result, Evaluation::Completed(json!({"NDVI": 1.0})));
        assert_eq!(service.calls(), 1);
    }

    #[test]
    fn scalar_zero_and_false_are_not_empty() {
        assert!(is_empty_result(&Value::Null));
        assert!(is_empty_result(&json!({})));
        assert!(is_empty_result(&json!([])));
        assert!(is_empty_result(&json!("")));
        assert!(!is_empty_result(&json!(0)));
        assert!(!is_empty_result(&json!(false)));
        assert!(!is_empty_result(&json!({"NDVI": 0.5})));
    }
}
