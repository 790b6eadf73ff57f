//! Resolved locations and navigation targets.

use crate::matcher::{Params, normalize_path};
use crate::route::{Meta, RouteRecord};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Parsed query string.
pub type Query = BTreeMap<String, String>;

/// Splits `/path?query#fragment` into the raw path and its query map.
///
/// The fragment is discarded. Query values are form-decoded; malformed
/// query strings yield an empty map.
///
/// ```
/// use reinhardt_router::location::split_path_and_query;
///
/// let (path, query) = split_path_and_query("/search?q=rust%20lang&page=2#top");
/// assert_eq!(path, "/search");
/// assert_eq!(query.get("q").unwrap(), "rust lang");
/// assert_eq!(query.get("page").unwrap(), "2");
/// ```
pub fn split_path_and_query(input: &str) -> (String, Query) {
	let without_fragment = input.split('#').next().unwrap_or("");
	match without_fragment.split_once('?') {
		Some((path, search)) => (path.to_string(), parse_query(search)),
		None => (without_fragment.to_string(), Query::new()),
	}
}

/// Parses a query string (without the leading `?`).
pub fn parse_query(search: &str) -> Query {
	serde_urlencoded::from_str::<Vec<(String, String)>>(search)
		.map(|pairs| pairs.into_iter().collect())
		.unwrap_or_default()
}

/// Joins a normalized path and a query map into a full path.
pub fn build_full_path(path: &str, query: &Query) -> String {
	if query.is_empty() {
		return path.to_string();
	}
	match serde_urlencoded::to_string(query) {
		Ok(search) if !search.is_empty() => format!("{}?{}", path, search),
		_ => path.to_string(),
	}
}

/// The result of matching a concrete URL against the route catalog.
///
/// Locations are created fresh for every successful match and never mutated.
#[derive(Debug, Clone)]
pub struct RouteLocation {
	/// Normalized path without query string.
	pub path: String,
	/// Parsed query string.
	pub query: Query,
	/// Path plus serialized query string.
	pub full_path: String,
	/// Extracted, URL-decoded path parameters.
	pub params: Params,
	/// Metadata of the matched route.
	pub meta: Meta,
	/// Name of the matched route.
	pub name: Option<String>,
	/// The matched catalog entry.
	pub matched: Option<Rc<RouteRecord>>,
}

impl RouteLocation {
	/// Builds a location for a matched route.
	pub fn new(path: &str, query: Query, params: Params, matched: Option<Rc<RouteRecord>>) -> Self {
		let path = normalize_path(path);
		let full_path = build_full_path(&path, &query);
		let (meta, name) = matched
			.as_ref()
			.map(|record| (record.meta().clone(), record.name().map(str::to_string)))
			.unwrap_or_default();
		Self {
			path,
			query,
			full_path,
			params,
			meta,
			name,
			matched,
		}
	}

	/// Returns a parameter value.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	/// Returns a query value.
	pub fn query_value(&self, name: &str) -> Option<&str> {
		self.query.get(name).map(String::as_str)
	}

	/// Returns whether both locations point at the same path, params and query.
	pub fn is_same_destination(&self, other: &RouteLocation) -> bool {
		self.path == other.path && self.params == other.params && self.query == other.query
	}
}

/// Where a navigation should go.
///
/// Strings convert into path targets:
///
/// ```
/// use reinhardt_router::NavigationTarget;
///
/// let target: NavigationTarget = "/users/42?tab=posts".into();
/// assert_eq!(target.path(), Some("/users/42?tab=posts"));
///
/// let named = NavigationTarget::named("user").param("id", "42").replace();
/// assert_eq!(named.name(), Some("user"));
/// assert!(named.is_replace());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationTarget {
	path: Option<String>,
	name: Option<String>,
	params: Params,
	query: Query,
	replace: bool,
}

impl NavigationTarget {
	/// Returns the raw path (with optional query string) for path targets.
	pub fn path(&self) -> Option<&str> {
		self.path.as_deref()
	}

	/// Creates a path target.
	pub fn to_path(path: impl Into<String>) -> Self {
		Self {
			path: Some(path.into()),
			..Self::default()
		}
	}

	/// Creates a target for a named route.
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: Some(name.into()),
			..Self::default()
		}
	}

	/// Returns the route name for named targets.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Adds a path parameter (named targets).
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(key.into(), value.into());
		self
	}

	/// Returns the path parameters.
	pub fn params(&self) -> &Params {
		&self.params
	}

	/// Adds a query value. Explicit values override the path's query string.
	pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.insert(key.into(), value.into());
		self
	}

	/// Returns the explicit query values.
	pub fn query_values(&self) -> &Query {
		&self.query
	}

	/// Replaces the current history entry instead of pushing a new one.
	pub fn replace(mut self) -> Self {
		self.replace = true;
		self
	}

	/// Sets the replace flag.
	pub fn with_replace(mut self, replace: bool) -> Self {
		self.replace = replace;
		self
	}

	/// Returns whether the navigation replaces the current entry.
	pub fn is_replace(&self) -> bool {
		self.replace
	}
}

impl From<&str> for NavigationTarget {
	fn from(path: &str) -> Self {
		Self::to_path(path)
	}
}

impl From<String> for NavigationTarget {
	fn from(path: String) -> Self {
		Self::to_path(path)
	}
}

impl From<&String> for NavigationTarget {
	fn from(path: &String) -> Self {
		Self::to_path(path.clone())
	}
}

impl From<&RouteLocation> for NavigationTarget {
	fn from(location: &RouteLocation) -> Self {
		Self::to_path(location.full_path.clone())
	}
}

impl fmt::Display for NavigationTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match (&self.path, &self.name) {
			(Some(path), _) => write!(f, "{}", path),
			(None, Some(name)) => write!(f, "route '{}'", name),
			(None, None) => write!(f, "<empty target>"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_split_path_and_query_without_query() {
		let (path, query) = split_path_and_query("/about");

		assert_eq!(path, "/about");
		assert!(query.is_empty());
	}

	#[rstest]
	fn test_build_full_path_is_sorted() {
		let mut query = Query::new();
		query.insert("b".to_string(), "2".to_string());
		query.insert("a".to_string(), "x y".to_string());

		assert_eq!(build_full_path("/list", &query), "/list?a=x+y&b=2");
		assert_eq!(build_full_path("/list", &Query::new()), "/list");
	}

	#[rstest]
	fn test_location_new_normalizes() {
		let location = RouteLocation::new("//users/42/", Query::new(), Params::new(), None);

		assert_eq!(location.path, "/users/42");
		assert_eq!(location.full_path, "/users/42");
		assert!(location.name.is_none());
	}

	#[rstest]
	fn test_same_destination_compares_query() {
		let mut query = Query::new();
		query.insert("page".to_string(), "2".to_string());
		let a = RouteLocation::new("/list", Query::new(), Params::new(), None);
		let b = RouteLocation::new("/list/", Query::new(), Params::new(), None);
		let c = RouteLocation::new("/list", query, Params::new(), None);

		assert!(a.is_same_destination(&b));
		assert!(!a.is_same_destination(&c));
	}

	#[rstest]
	fn test_target_display() {
		assert_eq!(NavigationTarget::from("/a").to_string(), "/a");
		assert_eq!(NavigationTarget::named("home").to_string(), "route 'home'");
	}
}
