//! Event dispatch: named notifications whose handler results are discarded
//!
//! Kept separate from [`HookRegistry`](super::HookRegistry): a name
//! registered as a hook is invisible here and vice versa.

use super::callback::{Callback, CallbackTable};
use serde_json::Value;
use tracing::{debug, error};

/// An event handler runs for its side effects only
pub type EventHandler = Callback<()>;

/// Named, ordered event handler lists
#[derive(Default)]
pub struct EventBus {
    table: CallbackTable<()>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, event_name: impl Into<String>, handler: EventHandler) {
        let event_name = event_name.into();
        debug!("Registered event handler: {event_name}");
        self.table.push(event_name, handler);
    }

    pub fn unregister(&mut self, event_name: &str, handler: &EventHandler) -> bool {
        self.table.remove_first(event_name, handler)
    }

    /// Run every handler for `event_name`, sequentially and in registration
    /// order. Failures are logged; the remaining handlers still run.
    pub async fn emit(&self, event_name: &str, args: &[Value]) {
        for handler in self.table.get(event_name) {
            if let Err(e) = handler.invoke(args).await {
                error!("Event handler failed {event_name}: {e}");
            }
        }
    }

    pub fn count(&self, event_name: &str) -> usize {
        self.table.count(event_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::CallbackError;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tracing_test::traced_test;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> EventHandler {
        let log = Arc::clone(log);
        EventHandler::blocking(move |args: &[Value]| {
            log.lock().unwrap().push(format!("{tag}:{}", args.len()));
            Ok(())
        })
    }

    #[tokio::test]
    #[traced_test]
    async fn test_emit_runs_all_handlers_despite_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();

        bus.register("started", recorder(&log, "first"));
        bus.register(
            "started",
            EventHandler::blocking(|_: &[Value]| Err(CallbackError::failed("disk full"))),
        );
        let async_log = Arc::clone(&log);
        bus.register(
            "started",
            EventHandler::from_async(move |args: Vec<Value>| {
                let log = Arc::clone(&async_log);
                async move {
                    tokio::task::yield_now().await;
                    log.lock().unwrap().push(format!("async:{}", args.len()));
                    Ok(())
                }
            }),
        );

        bus.emit("started", &[json!("host")]).await;

        assert_eq!(*log.lock().unwrap(), vec!["first:1", "async:1"]);
        assert!(logs_contain("Event handler failed started"));
    }

    #[tokio::test]
    async fn test_emit_unknown_event_is_noop() {
        let bus = EventBus::new();
        bus.emit("nobody-listens", &[json!(1)]).await;
        assert_eq!(bus.count("nobody-listens"), 0);
    }

    #[test]
    fn test_unregister_handler() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = recorder(&log, "h");
        let mut bus = EventBus::new();
        bus.register("e", handler.clone());

        assert!(bus.unregister("e", &handler));
        assert!(!bus.unregister("e", &handler));
        assert_eq!(bus.count("e"), 0);
    }
}
