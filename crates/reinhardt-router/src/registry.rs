//! The live route catalog.

use crate::error::{RouterError, RouterResult};
use crate::location::{NavigationTarget, Query, RouteLocation, split_path_and_query};
use crate::matcher::{RouteMatch, match_path, normalize_path};
use crate::route::{RouteDefinition, RouteRecord};
use std::rc::Rc;

/// Ordered catalog of compiled routes.
///
/// Order is significant: the first matching route wins.
#[derive(Debug, Default)]
pub struct RouteRegistry {
	routes: Vec<Rc<RouteRecord>>,
}

impl RouteRegistry {
	/// Creates an empty catalog.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a catalog in the given order.
	///
	/// Unparsable paths and duplicates are logged and skipped so one bad
	/// definition cannot take the whole catalog down.
	pub fn from_definitions(definitions: impl IntoIterator<Item = RouteDefinition>) -> Self {
		let mut registry = Self::new();
		for definition in definitions {
			let path = definition.path().to_string();
			match RouteRecord::compile(definition) {
				Ok(record) if registry.contains_key(record.key()) => {
					tracing::warn!(path = %path, "Skipping duplicate route");
				}
				Ok(record) => registry.routes.push(Rc::new(record)),
				Err(e) => {
					tracing::error!(path = %path, error = %e, "Skipping route with invalid path");
				}
			}
		}
		registry
	}

	fn contains_key(&self, key: &str) -> bool {
		self.routes.iter().any(|r| r.key() == key)
	}

	/// Adds a route in front of the first wildcard route.
	///
	/// Wildcard routes themselves are appended.
	///
	/// # Errors
	///
	/// - [`RouterError::InvalidPattern`] for malformed paths
	/// - [`RouterError::DuplicateRoute`] when the path is already registered
	pub fn add(&mut self, definition: RouteDefinition) -> RouterResult<Rc<RouteRecord>> {
		let record = Rc::new(RouteRecord::compile(definition)?);
		if self.contains_key(record.key()) {
			return Err(RouterError::DuplicateRoute(record.path().to_string()));
		}

		let position = if record.pattern().has_wildcard() {
			self.routes.len()
		} else {
			self.routes
				.iter()
				.position(|r| r.pattern().has_wildcard())
				.unwrap_or(self.routes.len())
		};
		self.routes.insert(position, Rc::clone(&record));
		Ok(record)
	}

	/// Removes the route registered at `path`.
	pub fn remove(&mut self, path: &str) -> Option<Rc<RouteRecord>> {
		let key = route_key(path);
		let index = self.routes.iter().position(|r| r.key() == key)?;
		Some(self.routes.remove(index))
	}

	/// Returns whether a route is registered at `path`.
	pub fn has(&self, path: &str) -> bool {
		self.contains_key(&route_key(path))
	}

	/// Looks a route up by path, then by name.
	pub fn get(&self, path_or_name: &str) -> Option<Rc<RouteRecord>> {
		let key = route_key(path_or_name);
		self.routes
			.iter()
			.find(|r| r.key() == key)
			.or_else(|| self.routes.iter().find(|r| r.name() == Some(path_or_name)))
			.cloned()
	}

	/// Looks a route up by name.
	pub fn get_by_name(&self, name: &str) -> Option<Rc<RouteRecord>> {
		self.routes.iter().find(|r| r.name() == Some(name)).cloned()
	}

	/// Returns the routes in match order.
	pub fn routes(&self) -> Vec<Rc<RouteRecord>> {
		self.routes.clone()
	}

	/// Returns the number of routes.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Returns whether the catalog is empty.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Matches a path (without query string).
	pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
		match_path(path, &self.routes)
	}

	/// Turns a navigation target into a location without navigating.
	///
	/// # Errors
	///
	/// - [`RouterError::NotFound`] when nothing matches and no `*` route exists
	/// - [`RouterError::InvalidRouteName`] for unknown route names
	/// - [`RouterError::MissingParameter`] when a named target lacks a parameter
	pub fn resolve(&self, target: &NavigationTarget) -> RouterResult<RouteLocation> {
		let (raw_path, mut query) = match (target.path(), target.name()) {
			(Some(path), _) => split_path_and_query(path),
			(None, Some(name)) => (self.reverse(name, target)?, Query::new()),
			(None, None) => return Err(RouterError::NotFound(target.to_string())),
		};
		query.extend(
			target
				.query_values()
				.iter()
				.map(|(k, v)| (k.clone(), v.clone())),
		);

		let path = normalize_path(&raw_path);
		let matched = self
			.match_path(&path)
			.ok_or_else(|| RouterError::NotFound(path.clone()))?;
		Ok(RouteLocation::new(
			&path,
			query,
			matched.params,
			Some(matched.route),
		))
	}

	fn reverse(&self, name: &str, target: &NavigationTarget) -> RouterResult<String> {
		let record = self
			.get_by_name(name)
			.ok_or_else(|| RouterError::InvalidRouteName(name.to_string()))?;
		record.pattern().reverse(target.params()).ok_or_else(|| {
			let missing: Vec<&str> = record
				.pattern()
				.param_names()
				.into_iter()
				.filter(|param| !target.params().contains_key(*param))
				.collect();
			RouterError::MissingParameter(format!("{} (route '{}')", missing.join(", "), name))
		})
	}
}

fn route_key(path: &str) -> String {
	if path == crate::matcher::WILDCARD_PATH {
		path.to_string()
	} else {
		normalize_path(path)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::component::Component;
	use rstest::{fixture, rstest};

	fn definition(path: &str) -> RouteDefinition {
		RouteDefinition::new(path, Component::new("Page").template("<p></p>"))
	}

	#[fixture]
	fn registry() -> RouteRegistry {
		RouteRegistry::from_definitions(vec![
			definition("/").name("home"),
			definition("/users/:id").name("user"),
			definition("*").name("not-found"),
		])
	}

	#[rstest]
	fn test_from_definitions_skips_invalid_and_duplicates() {
		// Arrange
		let definitions = vec![
			definition("/"),
			definition("/users/:"),
			definition("/about"),
			definition("/about/"),
		];

		// Act
		let registry = RouteRegistry::from_definitions(definitions);

		// Assert
		let paths: Vec<String> = registry.routes().iter().map(|r| r.path().to_string()).collect();
		assert_eq!(paths, vec!["/", "/about"]);
	}

	#[rstest]
	fn test_add_inserts_before_wildcard(mut registry: RouteRegistry) {
		registry.add(definition("/about")).unwrap();

		let paths: Vec<String> = registry.routes().iter().map(|r| r.path().to_string()).collect();
		assert_eq!(paths, vec!["/", "/users/:id", "/about", "*"]);
	}

	#[rstest]
	fn test_add_wildcard_appends(mut registry: RouteRegistry) {
		registry.add(definition("/docs/*")).unwrap();

		assert_eq!(registry.routes().last().unwrap().path(), "/docs/*");
	}

	#[rstest]
	fn test_add_rejects_duplicate(mut registry: RouteRegistry) {
		let err = registry.add(definition("/users/:id/")).unwrap_err();

		assert_eq!(err, RouterError::DuplicateRoute("/users/:id/".to_string()));
		assert_eq!(registry.len(), 3);
	}

	#[rstest]
	fn test_add_rejects_malformed(mut registry: RouteRegistry) {
		let err = registry.add(definition("about")).unwrap_err();

		assert!(matches!(err, RouterError::InvalidPattern { .. }));
	}

	#[rstest]
	fn test_remove_and_has(mut registry: RouteRegistry) {
		assert!(registry.has("/users/:id"));

		let removed = registry.remove("/users/:id").unwrap();

		assert_eq!(removed.name(), Some("user"));
		assert!(!registry.has("/users/:id"));
		assert!(registry.remove("/users/:id").is_none());
	}

	#[rstest]
	fn test_get_by_path_or_name(registry: RouteRegistry) {
		assert_eq!(registry.get("/users/:id").unwrap().name(), Some("user"));
		assert_eq!(registry.get("user").unwrap().path(), "/users/:id");
		assert!(registry.get("missing").is_none());
	}

	#[rstest]
	fn test_resolve_path_with_query(registry: RouteRegistry) {
		let location = registry
			.resolve(&NavigationTarget::from("/users/john%20doe?tab=posts").query("page", "2"))
			.unwrap();

		assert_eq!(location.path, "/users/john%20doe");
		assert_eq!(location.param("id"), Some("john doe"));
		assert_eq!(location.query_value("tab"), Some("posts"));
		assert_eq!(location.query_value("page"), Some("2"));
		assert_eq!(location.name.as_deref(), Some("user"));
		assert_eq!(location.full_path, "/users/john%20doe?page=2&tab=posts");
	}

	#[rstest]
	fn test_resolve_named(registry: RouteRegistry) {
		let location = registry
			.resolve(&NavigationTarget::named("user").param("id", "42"))
			.unwrap();

		assert_eq!(location.path, "/users/42");
		assert_eq!(location.param("id"), Some("42"));
	}

	#[rstest]
	fn test_resolve_named_missing_param(registry: RouteRegistry) {
		let err = registry.resolve(&NavigationTarget::named("user")).unwrap_err();

		assert!(matches!(err, RouterError::MissingParameter(message) if message.contains("id")));
	}

	#[rstest]
	fn test_resolve_unknown_name(registry: RouteRegistry) {
		let err = registry.resolve(&NavigationTarget::named("ghost")).unwrap_err();

		assert_eq!(err, RouterError::InvalidRouteName("ghost".to_string()));
	}

	#[rstest]
	fn test_resolve_falls_back_to_catch_all(registry: RouteRegistry) {
		let location = registry.resolve(&"/nowhere/else".into()).unwrap();

		assert_eq!(location.name.as_deref(), Some("not-found"));
		assert_eq!(location.param("pathMatch"), Some("nowhere/else"));
	}

	#[rstest]
	fn test_resolve_not_found() {
		let registry = RouteRegistry::from_definitions(vec![definition("/")]);

		let err = registry.resolve(&"/missing".into()).unwrap_err();

		assert_eq!(err.to_string(), "Route not found: /missing");
	}
}
