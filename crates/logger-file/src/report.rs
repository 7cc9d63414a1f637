//! Error reporting hook for failures on the write path

use crate::error::Error;

/// Receives failures the drain loop swallows so the host can react.
///
/// Reporting must not block; it runs on the drain task.
pub trait ErrorReporter: Send + Sync + 'static {
    /// Called once per failed open, write or flush
    fn report(&self, error: &Error);
}

impl<F> ErrorReporter for F
where
    F: Fn(&Error) + Send + Sync + 'static,
{
    fn report(&self, error: &Error) {
        self(error);
    }
}

/// Reporter that emits a `tracing` error event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &Error) {
        tracing::error!("log file sink error: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_closure_reporter() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter: Arc<dyn ErrorReporter> =
            Arc::new(move |e: &Error| sink.lock().push(e.to_string()));

        reporter.report(&Error::MissingPath);

        assert_eq!(*seen.lock(), vec!["no log file path configured".to_string()]);
    }

    #[test]
    fn test_tracing_reporter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TracingReporter>();

        TracingReporter.report(&Error::MissingPath);
    }
}
