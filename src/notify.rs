//! User-facing notification capability.
//!
//! Transient success/error notifications are fire-and-forget side effects
//! owned by whatever surface hosts this layer. The primitives take the
//! capability as an injected trait object so they stay testable without a
//! real presentation layer.

/// Sink for transient user-facing notifications.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default sink that records notifications in the log stream.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(message = %message, "success notification");
    }

    fn error(&self, message: &str) {
        tracing::warn!(message = %message, "error notification");
    }
}
