//! Hook dispatch: named extension points invoked for their results

use super::callback::{Callback, CallbackTable};
use serde_json::Value;
use tracing::{debug, error};

/// A hook callback produces a JSON value
pub type HookCallback = Callback<Value>;

/// Named, ordered hook callback lists
#[derive(Default)]
pub struct HookRegistry {
    table: CallbackTable<Value>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback to the named hook. The same callback may be
    /// registered more than once and then runs once per registration.
    pub fn register(&mut self, hook_name: impl Into<String>, callback: HookCallback) {
        let hook_name = hook_name.into();
        debug!("Registered hook: {hook_name}");
        self.table.push(hook_name, callback);
    }

    /// Remove the first registration of `callback`. Unknown hooks and
    /// callbacks are a no-op.
    pub fn unregister(&mut self, hook_name: &str, callback: &HookCallback) -> bool {
        let removed = self.table.remove_first(hook_name, callback);
        if removed {
            debug!("Unregistered hook: {hook_name}");
        }
        removed
    }

    /// Invoke every callback for `hook_name` in registration order and
    /// collect the successful results.
    ///
    /// Callbacks run one at a time; async callbacks are awaited before the
    /// next one starts. A failing or panicking callback is logged and left
    /// out of the results without stopping the others.
    pub async fn trigger(&self, hook_name: &str, args: &[Value]) -> Vec<Value> {
        let callbacks = self.table.get(hook_name);
        let mut results = Vec::with_capacity(callbacks.len());

        for callback in callbacks {
            match callback.invoke(args).await {
                Ok(value) => results.push(value),
                Err(e) => error!("Hook execution failed {hook_name}: {e}"),
            }
        }

        results
    }

    /// Number of registrations for a hook
    pub fn count(&self, hook_name: &str) -> usize {
        self.table.count(hook_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::CallbackError;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_test::traced_test;

    fn sum() -> HookCallback {
        HookCallback::blocking(|args: &[Value]| {
            Ok(json!(args.iter().filter_map(Value::as_i64).sum::<i64>()))
        })
    }

    fn product() -> HookCallback {
        HookCallback::from_async(|args: Vec<Value>| async move {
            Ok(json!(args.iter().filter_map(Value::as_i64).product::<i64>()))
        })
    }

    #[tokio::test]
    async fn test_trigger_collects_in_registration_order() {
        let mut hooks = HookRegistry::new();
        hooks.register("x", sum());
        hooks.register("x", product());

        let results = hooks.trigger("x", &[json!(3), json!(4)]).await;
        assert_eq!(results, vec![json!(7), json!(12)]);
    }

    #[tokio::test]
    async fn test_trigger_unknown_hook_is_empty() {
        let hooks = HookRegistry::new();
        assert!(hooks.trigger("missing", &[]).await.is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failing_callback_is_isolated() {
        let mut hooks = HookRegistry::new();
        hooks.register(
            "x",
            HookCallback::blocking(|_: &[Value]| Err(CallbackError::failed("bad input"))),
        );
        hooks.register("x", sum());

        let results = hooks.trigger("x", &[json!(1), json!(2)]).await;
        assert_eq!(results, vec![json!(3)]);
        assert!(logs_contain("Hook execution failed x"));
        assert!(logs_contain("bad input"));
    }

    #[tokio::test]
    async fn test_panicking_callback_is_isolated() {
        let mut hooks = HookRegistry::new();
        hooks.register(
            "x",
            HookCallback::from_async(|args: Vec<Value>| async move {
                if args.len() < 10 {
                    panic!("not enough args");
                }
                Ok(Value::Null)
            }),
        );
        hooks.register("x", sum());

        let results = hooks.trigger("x", &[json!(5)]).await;
        assert_eq!(results, vec![json!(5)]);
    }

    #[tokio::test]
    async fn test_duplicate_registration_runs_twice() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = {
            let calls = Arc::clone(&calls);
            HookCallback::blocking(move |_: &[Value]| {
                Ok(json!(calls.fetch_add(1, Ordering::SeqCst)))
            })
        };

        let mut hooks = HookRegistry::new();
        hooks.register("x", counter.clone());
        hooks.register("x", counter.clone());

        assert_eq!(hooks.trigger("x", &[]).await, vec![json!(0), json!(1)]);

        assert!(hooks.unregister("x", &counter));
        assert_eq!(hooks.count("x"), 1);
        assert_eq!(hooks.trigger("x", &[]).await, vec![json!(2)]);
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let mut hooks = HookRegistry::new();
        assert!(!hooks.unregister("missing", &sum()));

        hooks.register("x", sum());
        assert!(!hooks.unregister("x", &sum()));
        assert_eq!(hooks.count("x"), 1);
    }
}
