//! Error classification and the user-facing error handler.

/// Short, stable name for an error variant.
///
/// Used by [`crate::ErrorHandler`] to build user-facing messages that never
/// leak the underlying error text.
pub trait ErrorKind {
    /// Variant name, e.g. `"Config"` or `"StoreUnavailable"`.
    fn kind(&self) -> &'static str;
}

/// Centralized handler that logs an error and produces a sanitized message
/// for the end user.
#[derive(Debug, Clone)]
pub struct ErrorHandler {
    component: String,
}

impl ErrorHandler {
    /// Create a handler that tags its log lines with `component`.
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// Log the error and return a message safe to show to the user.
    pub fn handle<E>(&self, err: &E) -> String
    where
        E: ErrorKind + std::fmt::Display + ?Sized,
    {
        let kind = err.kind();
        tracing::error!(
            component = %self.component,
            kind = kind,
            "{kind}: {}",
            crate::util::sanitize_for_log(&err.to_string())
        );
        format!("An error occurred: {kind}. Please try again later.")
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new("chatmem")
    }
}
