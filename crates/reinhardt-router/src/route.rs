//! Route definitions and compiled catalog entries.

use crate::component::ComponentSource;
use crate::error::RouterResult;
use crate::guard::Guard;
use crate::location::RouteLocation;
use crate::matcher::{RoutePattern, normalize_path};
use serde_json::{Map, Value};
use std::fmt;
use std::rc::Rc;

/// Opaque route metadata, carried through to [`RouteLocation::meta`].
pub type Meta = Map<String, Value>;

/// Synchronous per-route hook run after a transition, with `(to, from)`.
pub type RouteHook = Rc<dyn Fn(&RouteLocation, Option<&RouteLocation>)>;

/// A user-supplied route.
///
/// ```
/// use reinhardt_router::{Component, RouteDefinition};
///
/// let route = RouteDefinition::new("/users/:id", "UserPage")
/// 	.name("user")
/// 	.layout(Component::new("Shell").template("<div id=\"router-view\"></div>"))
/// 	.meta("requiresAuth", true);
///
/// assert_eq!(route.path(), "/users/:id");
/// assert_eq!(route.route_name(), Some("user"));
/// ```
#[derive(Clone)]
pub struct RouteDefinition {
	path: String,
	component: ComponentSource,
	layout: Option<ComponentSource>,
	name: Option<String>,
	meta: Meta,
	before_enter: Option<Guard>,
	before_leave: Option<Guard>,
	after_enter: Option<RouteHook>,
	after_leave: Option<RouteHook>,
}

impl RouteDefinition {
	/// Creates a route rendering `component` at `path`.
	pub fn new(path: impl Into<String>, component: impl Into<ComponentSource>) -> Self {
		Self {
			path: path.into(),
			component: component.into(),
			layout: None,
			name: None,
			meta: Meta::new(),
			before_enter: None,
			before_leave: None,
			after_enter: None,
			after_leave: None,
		}
	}

	/// Sets the route name used for named navigation.
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Overrides the router's global layout for this route.
	pub fn layout(mut self, layout: impl Into<ComponentSource>) -> Self {
		self.layout = Some(layout.into());
		self
	}

	/// Adds a metadata entry.
	pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.meta.insert(key.into(), value.into());
		self
	}

	/// Replaces the whole metadata map.
	pub fn with_meta(mut self, meta: Meta) -> Self {
		self.meta = meta;
		self
	}

	/// Guard run when entering this route.
	pub fn before_enter(mut self, guard: Guard) -> Self {
		self.before_enter = Some(guard);
		self
	}

	/// Guard run when leaving this route.
	pub fn before_leave(mut self, guard: Guard) -> Self {
		self.before_leave = Some(guard);
		self
	}

	/// Hook run after this route has been entered and rendered.
	pub fn after_enter<F>(mut self, hook: F) -> Self
	where
		F: Fn(&RouteLocation, Option<&RouteLocation>) + 'static,
	{
		self.after_enter = Some(Rc::new(hook));
		self
	}

	/// Hook run after this route has been left.
	pub fn after_leave<F>(mut self, hook: F) -> Self
	where
		F: Fn(&RouteLocation, Option<&RouteLocation>) + 'static,
	{
		self.after_leave = Some(Rc::new(hook));
		self
	}

	/// Returns the path pattern.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Returns the route name.
	pub fn route_name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Returns the page component.
	pub fn component(&self) -> &ComponentSource {
		&self.component
	}

	/// Returns the route-level layout.
	pub fn layout_source(&self) -> Option<&ComponentSource> {
		self.layout.as_ref()
	}

	/// Returns the metadata.
	pub fn meta_map(&self) -> &Meta {
		&self.meta
	}
}

impl fmt::Debug for RouteDefinition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteDefinition")
			.field("path", &self.path)
			.field("name", &self.name)
			.field("component", &self.component)
			.field("layout", &self.layout)
			.field("meta", &self.meta)
			.field("before_enter", &self.before_enter.is_some())
			.field("before_leave", &self.before_leave.is_some())
			.finish()
	}
}

/// A catalog entry: a definition plus its compiled pattern.
pub struct RouteRecord {
	definition: RouteDefinition,
	pattern: RoutePattern,
	key: String,
}

impl RouteRecord {
	/// Compiles a definition.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPattern`](crate::RouterError::InvalidPattern)
	/// for malformed paths.
	pub fn compile(definition: RouteDefinition) -> RouterResult<Self> {
		let pattern = RoutePattern::parse(definition.path())?;
		let key = if pattern.is_catch_all() {
			pattern.pattern().to_string()
		} else {
			normalize_path(pattern.pattern())
		};
		Ok(Self {
			definition,
			pattern,
			key,
		})
	}

	/// Returns the path pattern as written.
	pub fn path(&self) -> &str {
		self.definition.path()
	}

	/// Normalized path used to detect duplicates.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Returns the compiled pattern.
	pub fn pattern(&self) -> &RoutePattern {
		&self.pattern
	}

	/// Returns the route name.
	pub fn name(&self) -> Option<&str> {
		self.definition.route_name()
	}

	/// Returns the metadata.
	pub fn meta(&self) -> &Meta {
		self.definition.meta_map()
	}

	/// Returns the original definition.
	pub fn definition(&self) -> &RouteDefinition {
		&self.definition
	}

	/// Returns the page component source.
	pub fn component(&self) -> &ComponentSource {
		self.definition.component()
	}

	/// Returns the route-level layout source.
	pub fn layout(&self) -> Option<&ComponentSource> {
		self.definition.layout_source()
	}

	pub(crate) fn before_enter(&self) -> Option<&Guard> {
		self.definition.before_enter.as_ref()
	}

	pub(crate) fn before_leave(&self) -> Option<&Guard> {
		self.definition.before_leave.as_ref()
	}

	pub(crate) fn after_enter(&self) -> Option<&RouteHook> {
		self.definition.after_enter.as_ref()
	}

	pub(crate) fn after_leave(&self) -> Option<&RouteHook> {
		self.definition.after_leave.as_ref()
	}
}

impl fmt::Debug for RouteRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteRecord")
			.field("path", &self.path())
			.field("name", &self.name())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::component::Component;
	use crate::error::RouterError;
	use rstest::rstest;

	#[rstest]
	fn test_compile_valid_route() {
		let record = RouteRecord::compile(
			RouteDefinition::new("/users/:id/", Component::new("User").template("<p></p>"))
				.name("user")
				.meta("title", "User"),
		)
		.unwrap();

		assert_eq!(record.path(), "/users/:id/");
		assert_eq!(record.key(), "/users/:id");
		assert_eq!(record.name(), Some("user"));
		assert_eq!(record.meta().get("title"), Some(&Value::from("User")));
	}

	#[rstest]
	fn test_compile_rejects_malformed() {
		let err = RouteRecord::compile(RouteDefinition::new("/users/:", "User")).unwrap_err();

		assert!(matches!(err, RouterError::InvalidPattern { .. }));
	}

	#[rstest]
	fn test_catch_all_key() {
		let record = RouteRecord::compile(RouteDefinition::new("*", "NotFound")).unwrap();

		assert_eq!(record.key(), "*");
		assert!(record.pattern().is_catch_all());
	}
}
