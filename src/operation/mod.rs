//! Tracked execution of single backend calls.
//!
//! [`Operation`] turns an asynchronous backend call into a
//! `{data, is_loading, error}` state triple plus an `execute`/`reset`
//! control surface. The caller renders the state; the wrapper owns the
//! error-shape and notification decisions.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ApiError;
use crate::notify::{Notifier, TracingNotifier};
use crate::BoxFuture;

/// Success message used when a success notification is requested without
/// a caller-provided message.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation completed successfully";

type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;
type CallFn<A, T> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;

/// State triple owned by one [`Operation`] instance.
///
/// After a call settles, at most one of `data`/`error` is set and
/// `is_loading` is false.
#[derive(Debug, Clone)]
pub struct OperationState<T> {
    /// Last successful result, if any.
    pub data: Option<T>,
    /// True strictly between invocation start and settling.
    pub is_loading: bool,
    /// Normalized message from the most recent failure.
    pub error: Option<String>,
}

impl<T> Default for OperationState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }
}

/// Per-instance configuration for notifications and side-effect hooks.
pub struct OperationOptions<T> {
    /// Emit a success notification after each successful call.
    pub show_success_toast: bool,
    /// Emit an error notification after each failed call (default true).
    /// Session-expiry errors are suppressed regardless of this flag.
    pub show_error_toast: bool,
    /// Message for the success notification.
    pub success_message: Option<String>,
    /// Invoked with the result after each successful call.
    pub on_success: Option<SuccessCallback<T>>,
    /// Invoked with the normalized message after each failed call.
    pub on_error: Option<ErrorCallback>,
}

impl<T> Default for OperationOptions<T> {
    fn default() -> Self {
        Self {
            show_success_toast: false,
            show_error_toast: true,
            success_message: None,
            on_success: None,
            on_error: None,
        }
    }
}

/// Wraps an asynchronous backend call with tracked state.
///
/// Each instance owns its state exclusively. Concurrent `execute` calls on
/// one instance are each tracked independently by timing: last write wins
/// on the shared triple, so callers invoking repeatedly without awaiting
/// risk state from an earlier call overwriting a later one. That is
/// accepted, documented behavior.
pub struct Operation<A, T> {
    call: CallFn<A, T>,
    options: OperationOptions<T>,
    notifier: Arc<dyn Notifier>,
    state: Arc<Mutex<OperationState<T>>>,
}

impl<A, T> Operation<A, T>
where
    T: Clone + Send + 'static,
{
    /// Wrap a backend call with default options and the tracing notifier.
    pub fn new<F, Fut>(call: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        Self {
            call: Arc::new(move |args| Box::pin(call(args))),
            options: OperationOptions::default(),
            notifier: Arc::new(TracingNotifier),
            state: Arc::new(Mutex::new(OperationState::default())),
        }
    }

    pub fn with_options(mut self, options: OperationOptions<T>) -> Self {
        self.options = options;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Run the wrapped call once.
    ///
    /// Prior `data` stays visible while the call is in flight; `error` is
    /// cleared up front. The original error is returned to the caller so
    /// call sites can still branch on it. No retries.
    pub async fn execute(&self, args: A) -> Result<T, ApiError> {
        {
            let mut state = self.state.lock();
            state.is_loading = true;
            state.error = None;
        }

        match (self.call)(args).await {
            Ok(value) => {
                {
                    let mut state = self.state.lock();
                    state.data = Some(value.clone());
                    state.is_loading = false;
                    state.error = None;
                }
                if self.options.show_success_toast {
                    let message = self
                        .options
                        .success_message
                        .as_deref()
                        .unwrap_or(DEFAULT_SUCCESS_MESSAGE);
                    self.notifier.success(message);
                }
                if let Some(on_success) = &self.options.on_success {
                    on_success(&value);
                }
                Ok(value)
            }
            Err(err) => {
                let message = err.message();
                {
                    let mut state = self.state.lock();
                    state.data = None;
                    state.is_loading = false;
                    state.error = Some(message.clone());
                }
                if self.options.show_error_toast && !err.suppress_notification() {
                    self.notifier.error(&message);
                }
                if let Some(on_error) = &self.options.on_error {
                    on_error(&message);
                }
                Err(err)
            }
        }
    }

    /// Restore the initial triple. Has no effect on any in-flight call.
    pub fn reset(&self) {
        *self.state.lock() = OperationState::default();
    }

    /// Clone of the current state triple.
    pub fn snapshot(&self) -> OperationState<T> {
        self.state.lock().clone()
    }

    pub fn data(&self) -> Option<T> {
        self.state.lock().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }
}
