/// User-facing messages (toasts, banners) raised by the orchestrator.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

/// Logs messages instead of showing them. Default for headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::warn!(notice = message, "form submission rejected");
    }
}
