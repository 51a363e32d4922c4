//! Validates and invokes tool calls with bounded concurrency and a
//! per-call deadline.

use crate::error::{Result, ToolError};
use crate::tools::{DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_CONCURRENCY, ExecutedToolCall, ToolCall, ToolRegistry};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Executes tool calls against a [`ToolRegistry`].
///
/// At most [`ToolExecutor::max_concurrency`] calls run inside their tool
/// body at once; excess calls queue on a semaphore permit. Every call gets
/// [`ToolExecutor::timeout`] to complete, independent of the caller's own
/// deadline. Validation and domain failures are conveyed in-band as
/// `ExecutedToolCall { success: false, .. }`; only an unknown tool name
/// surfaces as a hard error, since calling one at all is an infrastructure
/// mistake (a denied or absent tool), not a tool failure.
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
}

impl ToolExecutor {
    /// Creates an executor over `registry` with the default concurrency cap
    /// and call timeout.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self::with_limits(registry, DEFAULT_MAX_CONCURRENCY, DEFAULT_CALL_TIMEOUT)
    }

    /// Creates an executor with an explicit concurrency cap and timeout.
    #[must_use]
    pub fn with_limits(registry: Arc<ToolRegistry>, max_concurrency: usize, timeout: Duration) -> Self {
        Self {
            registry,
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
            timeout,
        }
    }

    /// Executes a single tool call.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] if `call.name` is not registered
    /// or not enabled. All other failures (validation, domain errors,
    /// timeout) are reported in-band via the returned
    /// [`ExecutedToolCall::success`] flag.
    pub async fn execute(&self, call: ToolCall) -> Result<ExecutedToolCall> {
        let Some(tool) = self.registry.get(&call.name) else {
            return Err(ToolError::UnknownTool { name: call.name }.into());
        };

        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| ToolError::RegistryClosed)?;

        let start = Instant::now();

        if let Err(message) = tool.validate(&call.arguments) {
            drop(permit);
            return Ok(ExecutedToolCall {
                call,
                result: None,
                error: Some(message),
                success: false,
                elapsed: start.elapsed(),
            });
        }

        let arguments = call.arguments.clone();
        let outcome = tokio::time::timeout(self.timeout, tool.execute(arguments)).await;
        drop(permit);
        let elapsed = start.elapsed();

        let executed = match outcome {
            Ok(Ok(data)) => ExecutedToolCall {
                call,
                result: Some(data),
                error: None,
                success: true,
                elapsed,
            },
            Ok(Err(message)) => ExecutedToolCall {
                call,
                result: None,
                error: Some(message),
                success: false,
                elapsed,
            },
            Err(_) => ExecutedToolCall {
                call: call.clone(),
                result: None,
                error: Some(format!(
                    "tool '{}' timed out after {}ms",
                    call.name,
                    self.timeout.as_millis()
                )),
                success: false,
                elapsed,
            },
        };

        Ok(executed)
    }

    /// Executes every call in `calls` concurrently (bounded by the
    /// executor's concurrency cap), returning results in the same order as
    /// the input — emission order, not completion order. A call naming an
    /// unknown tool is recorded as a failed [`ExecutedToolCall`] rather than
    /// aborting the batch.
    pub async fn execute_many(&self, calls: Vec<ToolCall>) -> Vec<ExecutedToolCall> {
        let futures = calls.into_iter().map(|call| async move {
            match self.execute(call.clone()).await {
                Ok(executed) => executed,
                Err(err) => ExecutedToolCall {
                    call,
                    result: None,
                    error: Some(err.to_string()),
                    success: false,
                    elapsed: Duration::ZERO,
                },
            }
        });

        futures_util::future::join_all(futures).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Tool;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::time::Duration as StdDuration;

    struct Slow;

    #[async_trait]
    impl Tool for Slow {
        fn name(&self) -> &str {
            "slow"
        }
        fn description(&self) -> &str {
            "sleeps then returns"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        fn validate(&self, _arguments: &HashMap<String, Value>) -> Result<(), String> {
            Ok(())
        }
        async fn execute(&self, _arguments: HashMap<String, Value>) -> Result<Value, String> {
            tokio::time::sleep(StdDuration::from_millis(20)).await;
            Ok(json!({"done": true}))
        }
    }

    struct Rejecting;

    #[async_trait]
    impl Tool for Rejecting {
        fn name(&self) -> &str {
            "rejecting"
        }
        fn description(&self) -> &str {
            "always fails validation"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        fn validate(&self, _arguments: &HashMap<String, Value>) -> Result<(), String> {
            Err("missing required field".to_string())
        }
        async fn execute(&self, _arguments: HashMap<String, Value>) -> Result<Value, String> {
            Ok(json!({}))
        }
    }

    struct Failing;

    #[async_trait]
    impl Tool for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn description(&self) -> &str {
            "always fails its body"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        fn validate(&self, _arguments: &HashMap<String, Value>) -> Result<(), String> {
            Ok(())
        }
        async fn execute(&self, _arguments: HashMap<String, Value>) -> Result<Value, String> {
            Err("domain failure".to_string())
        }
    }

    fn call(name: &str) -> ToolCall {
        ToolCall {
            id: format!("call_{name}"),
            name: name.to_string(),
            arguments: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_a_hard_error() {
        let registry = Arc::new(ToolRegistry::new());
        let executor = ToolExecutor::new(registry);
        let result = executor.execute(call("nope")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn validation_failure_is_conveyed_in_band() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Rejecting), true);
        let executor = ToolExecutor::new(Arc::new(registry));
        let executed = executor.execute(call("rejecting")).await.unwrap();
        assert!(!executed.success);
        assert!(executed.error.unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn domain_failure_is_conveyed_in_band() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Failing), true);
        let executor = ToolExecutor::new(Arc::new(registry));
        let executed = executor.execute(call("failing")).await.unwrap();
        assert!(!executed.success);
        assert_eq!(executed.error.unwrap(), "domain failure");
    }

    #[tokio::test]
    async fn timeout_is_conveyed_in_band_not_as_an_error() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Slow), true);
        let executor = ToolExecutor::with_limits(Arc::new(registry), 1, StdDuration::from_millis(1));
        let executed = executor.execute(call("slow")).await.unwrap();
        assert!(!executed.success);
        assert!(executed.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn execute_many_preserves_emission_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Slow), true);
        registry.register(Arc::new(Failing), true);
        let executor = ToolExecutor::new(Arc::new(registry));
        let calls = vec![call("slow"), call("failing"), call("slow")];
        let results = executor.execute_many(calls).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].call.name, "slow");
        assert_eq!(results[1].call.name, "failing");
        assert_eq!(results[2].call.name, "slow");
    }

    #[tokio::test]
    async fn at_most_max_concurrency_calls_run_at_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct Counting {
            current: Arc<AtomicUsize>,
            peak: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl Tool for Counting {
            fn name(&self) -> &str {
                "counting"
            }
            fn description(&self) -> &str {
                "tracks concurrent invocations"
            }
            fn parameters(&self) -> Value {
                json!({"type": "object", "properties": {}})
            }
            fn validate(&self, _arguments: &HashMap<String, Value>) -> Result<(), String> {
                Ok(())
            }
            async fn execute(&self, _arguments: HashMap<String, Value>) -> Result<Value, String> {
                let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(StdDuration::from_millis(15)).await;
                self.current.fetch_sub(1, Ordering::SeqCst);
                Ok(json!({}))
            }
        }

        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry.register(
            Arc::new(Counting {
                current: Arc::clone(&current),
                peak: Arc::clone(&peak),
            }),
            true,
        );
        let executor = ToolExecutor::with_limits(Arc::new(registry), 2, StdDuration::from_secs(5));
        let calls: Vec<ToolCall> = (0..6).map(|_| call("counting")).collect();
        executor.execute_many(calls).await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }
}
