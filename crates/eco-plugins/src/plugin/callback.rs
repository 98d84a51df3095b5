//! Callback handles shared by hook and event dispatch
//!
//! A [`Callback`] wraps either a blocking closure or a closure returning a
//! future. Dispatchers invoke both kinds through [`Callback::invoke`], which
//! awaits async callbacks in place and turns panics into
//! [`CallbackError::Panicked`] so one misbehaving callback cannot take the
//! rest of a dispatch down with it.

use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

/// Error reported by (or on behalf of) a hook or event callback
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallbackError {
    #[error("callback failed: {0}")]
    Failed(String),

    #[error("callback panicked: {0}")]
    Panicked(String),
}

impl CallbackError {
    pub fn failed(message: impl Into<String>) -> Self {
        CallbackError::Failed(message.into())
    }
}

type BlockingFn<T> = dyn Fn(&[Value]) -> Result<T, CallbackError> + Send + Sync;

type AsyncFn<T> = dyn Fn(Vec<Value>) -> Pin<Box<dyn Future<Output = Result<T, CallbackError>> + Send>>
    + Send
    + Sync;

enum CallbackKind<T> {
    Blocking(Arc<BlockingFn<T>>),
    Async(Arc<AsyncFn<T>>),
}

impl<T> Clone for CallbackKind<T> {
    fn clone(&self) -> Self {
        match self {
            CallbackKind::Blocking(f) => CallbackKind::Blocking(Arc::clone(f)),
            CallbackKind::Async(f) => CallbackKind::Async(Arc::clone(f)),
        }
    }
}

/// A registered callback handle.
///
/// Clones share identity: registering a clone twice registers the same
/// callback twice, and unregistering with any clone matches it.
pub struct Callback<T> {
    kind: CallbackKind<T>,
}

impl<T> Clone for Callback<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            CallbackKind::Blocking(_) => "blocking",
            CallbackKind::Async(_) => "async",
        };
        f.debug_struct("Callback").field("kind", &kind).finish()
    }
}

impl<T: Send + 'static> Callback<T> {
    /// Wrap a closure that runs to completion synchronously.
    pub fn blocking<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<T, CallbackError> + Send + Sync + 'static,
    {
        Self {
            kind: CallbackKind::Blocking(Arc::new(f)),
        }
    }

    /// Wrap a closure returning a future; it is awaited before the next
    /// callback runs.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CallbackError>> + Send + 'static,
    {
        Self {
            kind: CallbackKind::Async(Arc::new(move |args| Box::pin(f(args)))),
        }
    }

    pub fn is_async(&self) -> bool {
        matches!(self.kind, CallbackKind::Async(_))
    }

    /// Whether `other` is a clone of this handle.
    pub fn same_as(&self, other: &Callback<T>) -> bool {
        match (&self.kind, &other.kind) {
            (CallbackKind::Blocking(a), CallbackKind::Blocking(b)) => Arc::ptr_eq(a, b),
            (CallbackKind::Async(a), CallbackKind::Async(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Run the callback, catching panics.
    pub async fn invoke(&self, args: &[Value]) -> Result<T, CallbackError> {
        match &self.kind {
            CallbackKind::Blocking(f) => {
                std::panic::catch_unwind(AssertUnwindSafe(|| f(args)))
                    .unwrap_or_else(|payload| Err(CallbackError::Panicked(panic_message(payload))))
            }
            CallbackKind::Async(f) => {
                let fut = match std::panic::catch_unwind(AssertUnwindSafe(|| f(args.to_vec()))) {
                    Ok(fut) => fut,
                    Err(payload) => return Err(CallbackError::Panicked(panic_message(payload))),
                };
                AssertUnwindSafe(fut)
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| Err(CallbackError::Panicked(panic_message(payload))))
            }
        }
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Named, ordered callback lists. Duplicates are allowed.
pub(crate) struct CallbackTable<T> {
    entries: HashMap<String, Vec<Callback<T>>>,
}

impl<T: Send + 'static> CallbackTable<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub(crate) fn push(&mut self, name: String, callback: Callback<T>) {
        self.entries.entry(name).or_default().push(callback);
    }

    /// Remove the first entry matching `callback`. Returns whether one was removed.
    pub(crate) fn remove_first(&mut self, name: &str, callback: &Callback<T>) -> bool {
        let Some(list) = self.entries.get_mut(name) else {
            return false;
        };
        match list.iter().position(|c| c.same_as(callback)) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn get(&self, name: &str) -> &[Callback<T>] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn count(&self, name: &str) -> usize {
        self.get(name).len()
    }
}

impl<T: Send + 'static> Default for CallbackTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
