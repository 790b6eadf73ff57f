//! Error types for client-side routing.
//!
//! Errors fall into four families:
//!
//! - **Configuration** errors are returned synchronously while building the
//!   router or editing the route catalog.
//! - **Resolution** errors abort the current transition only; the previous
//!   view stays mounted.
//! - **Not found** is reported through the `error` event instead of being
//!   returned to the caller of `navigate()`.
//! - **Unmount** errors are logged and swallowed by the engine.

use thiserror::Error;

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Error type for router operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RouterError {
	/// Invalid router configuration.
	#[error("Invalid router configuration: {0}")]
	InvalidConfig(String),

	/// Unknown routing mode.
	#[error("Invalid router mode '{0}': expected one of hash, history, query")]
	InvalidMode(String),

	/// The configured mount selector did not resolve to a container.
	#[error("Mount point not found: {0}")]
	MissingMountPoint(String),

	/// A route path pattern could not be parsed.
	#[error("Invalid route pattern '{pattern}': {reason}")]
	InvalidPattern {
		/// The offending pattern.
		pattern: String,
		/// Why parsing failed.
		reason: String,
	},

	/// No route matched and no wildcard route is registered.
	#[error("Route not found: {0}")]
	NotFound(String),

	/// A route with the same path is already registered.
	#[error("Route already registered: {0}")]
	DuplicateRoute(String),

	/// Invalid route name.
	#[error("Invalid route name: {0}")]
	InvalidRouteName(String),

	/// Missing parameter for reverse URL.
	#[error("Missing parameter: {0}")]
	MissingParameter(String),

	/// A component name has no registration.
	#[error("Component not registered: {0}")]
	ComponentNotRegistered(String),

	/// A component definition has no template.
	#[error("Component '{0}' has no template")]
	MissingTemplate(String),

	/// A lazy component loader failed.
	#[error("Failed to load component: {0}")]
	LazyLoad(String),

	/// The matched route resolved to no page component.
	#[error("Route '{0}' has no page component")]
	MissingPageComponent(String),

	/// A guard failed while deciding a transition.
	#[error("Navigation guard failed: {0}")]
	Guard(String),

	/// Mounting a component failed.
	#[error("Render failed: {0}")]
	Render(String),

	/// Unmounting a component failed.
	#[error("Unmount failed: {0}")]
	Unmount(String),

	/// The history backend rejected an operation.
	#[error("History operation failed: {0}")]
	History(String),

	/// A redirect chain exceeded the configured depth.
	#[error("Redirect limit of {limit} exceeded while navigating to {target}")]
	RedirectLimit {
		/// Configured maximum depth.
		limit: usize,
		/// The redirect target that was refused.
		target: String,
	},

	/// A plugin with the same name is already installed.
	#[error("Plugin already installed: {0}")]
	DuplicatePlugin(String),

	/// No plugin with the given name is installed.
	#[error("Plugin not found: {0}")]
	PluginNotFound(String),

	/// A plugin failed during install or destroy.
	#[error("Plugin '{name}' failed: {message}")]
	Plugin {
		/// Plugin name.
		name: String,
		/// Error message.
		message: String,
	},
}

impl RouterError {
	/// Returns `true` for errors raised while resolving components.
	pub fn is_resolution_error(&self) -> bool {
		matches!(
			self,
			Self::ComponentNotRegistered(_)
				| Self::MissingTemplate(_)
				| Self::LazyLoad(_)
				| Self::MissingPageComponent(_)
		)
	}

	/// Returns `true` for setup-time configuration errors.
	pub fn is_configuration_error(&self) -> bool {
		matches!(
			self,
			Self::InvalidConfig(_)
				| Self::InvalidMode(_)
				| Self::MissingMountPoint(_)
				| Self::InvalidPattern { .. }
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_router_error_display() {
		assert_eq!(
			RouterError::NotFound("/missing".to_string()).to_string(),
			"Route not found: /missing"
		);
		assert_eq!(
			RouterError::InvalidRouteName("test".to_string()).to_string(),
			"Invalid route name: test"
		);
	}

	#[rstest]
	fn test_invalid_pattern_display() {
		let err = RouterError::InvalidPattern {
			pattern: "/users/:".to_string(),
			reason: "empty parameter name".to_string(),
		};
		assert!(err.to_string().contains("/users/:"));
		assert!(err.to_string().contains("empty parameter name"));
	}

	#[rstest]
	#[case(RouterError::ComponentNotRegistered("Home".into()), true)]
	#[case(RouterError::MissingTemplate("Home".into()), true)]
	#[case(RouterError::LazyLoad("network".into()), true)]
	#[case(RouterError::NotFound("/x".into()), false)]
	#[case(RouterError::Guard("boom".into()), false)]
	fn test_resolution_error_classification(#[case] err: RouterError, #[case] expected: bool) {
		assert_eq!(err.is_resolution_error(), expected);
	}

	#[rstest]
	fn test_configuration_error_classification() {
		assert!(RouterError::InvalidMode("tree".into()).is_configuration_error());
		assert!(!RouterError::Render("x".into()).is_configuration_error());
	}
}
