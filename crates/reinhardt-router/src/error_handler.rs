//! Pluggable error reporting.
//!
//! Everything the navigation pipeline catches is funneled through one
//! [`ErrorHandler`]. Plugins may replace it to change formatting or forward
//! errors to a reporting service.

use crate::events::ErrorContext;

/// Receives errors and diagnostics from the router.
pub trait ErrorHandler {
	/// Reports a failed transition.
	fn handle(&self, context: &ErrorContext);

	/// Reports a recoverable problem, such as a failed unmount.
	fn warn(&self, message: &str);

	/// Reports an informational diagnostic.
	fn log(&self, message: &str);
}

/// Default handler forwarding to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorHandler;

impl ErrorHandler for TracingErrorHandler {
	fn handle(&self, context: &ErrorContext) {
		tracing::error!(
			error = %context.error,
			requested = context.target.as_deref().unwrap_or(""),
			to = context.to.as_ref().map(|l| l.full_path.as_str()).unwrap_or(""),
			from = context.from.as_ref().map(|l| l.full_path.as_str()).unwrap_or(""),
			"Navigation failed"
		);
	}

	fn warn(&self, message: &str) {
		tracing::warn!("{}", message);
	}

	fn log(&self, message: &str) {
		tracing::info!("{}", message);
	}
}
