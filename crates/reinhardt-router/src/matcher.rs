//! Path pattern compilation and matching.
//!
//! Patterns are parsed once into an ordered list of [`Segment`]s:
//!
//! - `/users/` - static segments, matched literally (case-sensitive)
//! - `/users/:id` - `:name` binds one URL-decoded path segment
//! - `/docs/*` - a trailing `*` binds the decoded remainder as `pathMatch`
//! - `*` - the catch-all fallback route
//!
//! Matching walks segments pairwise. Catalog order decides between several
//! matching routes: the first full match wins.

use crate::error::{RouterError, RouterResult};
use crate::route::RouteRecord;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::LazyLock;

/// Extracted path parameters.
pub type Params = BTreeMap<String, String>;

/// Parameter name bound by a trailing wildcard.
pub const PATH_MATCH_PARAM: &str = "pathMatch";

/// Path of the catch-all fallback route.
pub const WILDCARD_PATH: &str = "*";

/// Maximum allowed length for a route pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of segments in a route pattern.
const MAX_PATTERN_SEGMENTS: usize = 32;

static PARAM_NAME: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("parameter name regex is valid")
});

/// One compiled piece of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	/// Literal text that must equal the path segment.
	Static(String),
	/// Named parameter bound to one path segment.
	Param(String),
	/// Trailing wildcard bound to the rest of the path.
	Wildcard,
}

/// Collapses repeated slashes and strips the trailing slash.
///
/// An empty path normalizes to `/`.
///
/// ```
/// use reinhardt_router::matcher::normalize_path;
///
/// assert_eq!(normalize_path("//users///42/"), "/users/42");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> String {
	let segments: Vec<&str> = split_segments(path);
	if segments.is_empty() {
		"/".to_string()
	} else {
		format!("/{}", segments.join("/"))
	}
}

fn split_segments(path: &str) -> Vec<&str> {
	path.split('/').filter(|s| !s.is_empty()).collect()
}

fn decode_segment(raw: &str) -> String {
	urlencoding::decode(raw)
		.map(|decoded| decoded.into_owned())
		.unwrap_or_else(|_| raw.to_string())
}

/// A compiled route path pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
	/// The original pattern string.
	pattern: String,
	/// Compiled segments in order.
	segments: Vec<Segment>,
}

impl RoutePattern {
	/// Parses a route pattern.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPattern`] if:
	/// - the pattern is empty or does not start with `/` (except `*`)
	/// - a parameter has no name (`/users/:`) or an invalid name
	/// - a parameter name is used twice
	/// - `*` appears anywhere but the last segment
	/// - the pattern exceeds 1024 bytes or 32 segments
	pub fn parse(pattern: &str) -> RouterResult<Self> {
		let invalid = |reason: String| RouterError::InvalidPattern {
			pattern: pattern.to_string(),
			reason,
		};

		if pattern.trim().is_empty() {
			return Err(invalid("pattern is empty".to_string()));
		}
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(invalid(format!(
				"pattern length {} exceeds maximum allowed length of {} bytes",
				pattern.len(),
				MAX_PATTERN_LENGTH
			)));
		}
		if pattern == WILDCARD_PATH {
			return Ok(Self {
				pattern: pattern.to_string(),
				segments: vec![Segment::Wildcard],
			});
		}
		if !pattern.starts_with('/') {
			return Err(invalid("pattern must start with '/'".to_string()));
		}

		let raw_segments = split_segments(pattern);
		if raw_segments.len() > MAX_PATTERN_SEGMENTS {
			return Err(invalid(format!(
				"pattern has {} segments, exceeding maximum of {}",
				raw_segments.len(),
				MAX_PATTERN_SEGMENTS
			)));
		}

		let last = raw_segments.len().saturating_sub(1);
		let mut segments = Vec::with_capacity(raw_segments.len());
		for (index, raw) in raw_segments.iter().enumerate() {
			if *raw == WILDCARD_PATH {
				if index != last {
					return Err(invalid("'*' is only allowed as the last segment".to_string()));
				}
				segments.push(Segment::Wildcard);
			} else if let Some(name) = raw.strip_prefix(':') {
				if name.is_empty() {
					return Err(invalid("parameter segment ':' has no name".to_string()));
				}
				if !PARAM_NAME.is_match(name) {
					return Err(invalid(format!("invalid parameter name '{}'", name)));
				}
				if segments
					.iter()
					.any(|s| matches!(s, Segment::Param(existing) if existing == name))
				{
					return Err(invalid(format!("duplicate parameter name '{}'", name)));
				}
				segments.push(Segment::Param(name.to_string()));
			} else {
				segments.push(Segment::Static((*raw).to_string()));
			}
		}

		Ok(Self {
			pattern: pattern.to_string(),
			segments,
		})
	}

	/// Returns the original pattern string.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Returns the compiled segments.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Returns the parameter names in order, including `pathMatch` for wildcards.
	pub fn param_names(&self) -> Vec<&str> {
		self.segments
			.iter()
			.filter_map(|s| match s {
				Segment::Param(name) => Some(name.as_str()),
				Segment::Wildcard => Some(PATH_MATCH_PARAM),
				Segment::Static(_) => None,
			})
			.collect()
	}

	/// Returns whether this is the catch-all `*` route.
	pub fn is_catch_all(&self) -> bool {
		self.pattern == WILDCARD_PATH
	}

	/// Returns whether the pattern ends in a wildcard.
	pub fn has_wildcard(&self) -> bool {
		matches!(self.segments.last(), Some(Segment::Wildcard))
	}

	/// Attempts to match a path (without query string) against this pattern.
	///
	/// Returns the extracted, URL-decoded parameters on success.
	pub fn matches(&self, path: &str) -> Option<Params> {
		let path_segments = split_segments(path);

		// Root matches only the empty pattern.
		if self.segments.is_empty() {
			return path_segments.is_empty().then(Params::new);
		}

		let fixed = if self.has_wildcard() {
			self.segments.len() - 1
		} else {
			self.segments.len()
		};
		if self.has_wildcard() {
			if path_segments.len() < fixed {
				return None;
			}
		} else if path_segments.len() != fixed {
			return None;
		}

		let mut params = Params::new();
		for (segment, raw) in self.segments[..fixed].iter().zip(path_segments.iter()) {
			match segment {
				Segment::Static(literal) => {
					if literal != raw {
						return None;
					}
				}
				Segment::Param(name) => {
					params.insert(name.clone(), decode_segment(raw));
				}
				Segment::Wildcard => unreachable!("wildcard is always the last segment"),
			}
		}

		if self.has_wildcard() {
			let rest: Vec<String> = path_segments[fixed..]
				.iter()
				.map(|s| decode_segment(s))
				.collect();
			params.insert(PATH_MATCH_PARAM.to_string(), rest.join("/"));
		}

		Some(params)
	}

	/// Generates a path from this pattern with the given parameters.
	///
	/// Returns `None` if a parameter is missing.
	pub fn reverse(&self, params: &Params) -> Option<String> {
		if self.is_catch_all() {
			let rest = params.get(PATH_MATCH_PARAM)?;
			return Some(normalize_path(&format!("/{}", rest)));
		}

		let mut parts = Vec::with_capacity(self.segments.len());
		for segment in &self.segments {
			match segment {
				Segment::Static(literal) => parts.push(literal.clone()),
				Segment::Param(name) => {
					parts.push(urlencoding::encode(params.get(name)?).into_owned())
				}
				Segment::Wildcard => {
					let rest = params.get(PATH_MATCH_PARAM)?;
					if !rest.is_empty() {
						parts.push(rest.clone());
					}
				}
			}
		}
		Some(normalize_path(&format!("/{}", parts.join("/"))))
	}
}

impl PartialEq for RoutePattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for RoutePattern {}

impl fmt::Display for RoutePattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

/// A route selected by [`match_path`].
#[derive(Debug, Clone)]
pub struct RouteMatch {
	/// The matched catalog entry.
	pub route: Rc<RouteRecord>,
	/// Extracted path parameters.
	pub params: Params,
}

/// Matches a concrete path against a catalog.
///
/// The first full match in catalog order wins. When nothing matches, the
/// route whose path is exactly `*` is used with `pathMatch` set to the
/// decoded remainder of the path. Returns `None` if neither exists.
pub fn match_path<'a, I>(path: &str, catalog: I) -> Option<RouteMatch>
where
	I: IntoIterator<Item = &'a Rc<RouteRecord>>,
{
	let mut fallback: Option<&Rc<RouteRecord>> = None;
	for route in catalog {
		if let Some(params) = route.pattern().matches(path) {
			return Some(RouteMatch {
				route: Rc::clone(route),
				params,
			});
		}
		if fallback.is_none() && route.pattern().is_catch_all() {
			fallback = Some(route);
		}
	}

	fallback.map(|route| {
		let rest: Vec<String> = split_segments(path)
			.into_iter()
			.map(decode_segment)
			.collect();
		let mut params = Params::new();
		params.insert(PATH_MATCH_PARAM.to_string(), rest.join("/"));
		RouteMatch {
			route: Rc::clone(route),
			params,
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::component::Component;
	use crate::route::RouteDefinition;
	use rstest::rstest;

	fn record(path: &str) -> Rc<RouteRecord> {
		Rc::new(
			RouteRecord::compile(RouteDefinition::new(
				path,
				Component::new("Page").template("<p></p>"),
			))
			.unwrap(),
		)
	}

	#[rstest]
	#[case("/", "/")]
	#[case("", "/")]
	#[case("/users/", "/users")]
	#[case("//users//42//", "/users/42")]
	fn test_normalize_path(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(normalize_path(input), expected);
	}

	#[rstest]
	fn test_parse_segments() {
		let pattern = RoutePattern::parse("/users/:id/posts/:post_id").unwrap();

		assert_eq!(
			pattern.segments(),
			&[
				Segment::Static("users".to_string()),
				Segment::Param("id".to_string()),
				Segment::Static("posts".to_string()),
				Segment::Param("post_id".to_string()),
			]
		);
		assert_eq!(pattern.param_names(), vec!["id", "post_id"]);
	}

	#[rstest]
	#[case("")]
	#[case("users")]
	#[case("/users/:")]
	#[case("/users/:1abc")]
	#[case("/a/:id/b/:id")]
	#[case("/files/*/edit")]
	fn test_parse_rejects_malformed(#[case] input: &str) {
		let err = RoutePattern::parse(input).unwrap_err();
		assert!(matches!(err, RouterError::InvalidPattern { .. }));
	}

	#[rstest]
	fn test_parse_rejects_excessive_length() {
		// Arrange
		let long_pattern = "/".to_string() + &"a".repeat(1025);

		// Act
		let result = RoutePattern::parse(&long_pattern);

		// Assert
		assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
	}

	#[rstest]
	fn test_parse_rejects_excessive_segments() {
		// Arrange
		let segments: Vec<&str> = (0..35).map(|_| "seg").collect();
		let pattern = format!("/{}", segments.join("/"));

		// Act
		let result = RoutePattern::parse(&pattern);

		// Assert
		assert!(result.is_err());
	}

	#[rstest]
	fn test_root_matches_only_root() {
		let pattern = RoutePattern::parse("/").unwrap();

		assert!(pattern.matches("/").is_some());
		assert!(pattern.matches("").is_some());
		assert!(pattern.matches("/about").is_none());
	}

	#[rstest]
	fn test_static_match_is_case_sensitive() {
		let pattern = RoutePattern::parse("/About").unwrap();

		assert!(pattern.matches("/About").is_some());
		assert!(pattern.matches("/about").is_none());
	}

	#[rstest]
	fn test_trailing_slash_is_ignored() {
		let pattern = RoutePattern::parse("/users/").unwrap();

		assert!(pattern.matches("/users").is_some());
		assert!(pattern.matches("/users/").is_some());
		assert!(pattern.matches("/users/1").is_none());
	}

	#[rstest]
	#[case("/users/42", "42")]
	#[case("/users/john%20doe", "john doe")]
	#[case("/users/%E3%81%82", "あ")]
	fn test_param_is_url_decoded(#[case] path: &str, #[case] expected: &str) {
		let pattern = RoutePattern::parse("/users/:id").unwrap();

		let params = pattern.matches(path).unwrap();

		assert_eq!(params.get("id").map(String::as_str), Some(expected));
	}

	#[rstest]
	fn test_segment_count_must_match() {
		let pattern = RoutePattern::parse("/users/:id").unwrap();

		assert!(pattern.matches("/users").is_none());
		assert!(pattern.matches("/users/42/edit").is_none());
	}

	#[rstest]
	fn test_trailing_wildcard_binds_remainder() {
		let pattern = RoutePattern::parse("/docs/*").unwrap();

		let params = pattern.matches("/docs/guide/intro%20page").unwrap();
		assert_eq!(params.get(PATH_MATCH_PARAM).unwrap(), "guide/intro page");

		let params = pattern.matches("/docs").unwrap();
		assert_eq!(params.get(PATH_MATCH_PARAM).unwrap(), "");

		assert!(pattern.matches("/blog/x").is_none());
	}

	#[rstest]
	fn test_reverse() {
		let pattern = RoutePattern::parse("/users/:id/posts/:post").unwrap();
		let mut params = Params::new();
		params.insert("id".to_string(), "john doe".to_string());
		params.insert("post".to_string(), "7".to_string());

		assert_eq!(
			pattern.reverse(&params),
			Some("/users/john%20doe/posts/7".to_string())
		);
	}

	#[rstest]
	fn test_reverse_missing_param() {
		let pattern = RoutePattern::parse("/users/:id").unwrap();
		assert_eq!(pattern.reverse(&Params::new()), None);
	}

	#[rstest]
	fn test_match_path_first_match_wins() {
		// Arrange
		let catalog = vec![record("/users/new"), record("/users/:id")];

		// Act
		let matched = match_path("/users/new", &catalog).unwrap();

		// Assert
		assert_eq!(matched.route.path(), "/users/new");
		assert!(matched.params.is_empty());
	}

	#[rstest]
	fn test_match_path_slash_wildcard_in_catalog_order() {
		let catalog = vec![record("/a"), record("/*")];

		let matched = match_path("/a", &catalog).unwrap();
		assert_eq!(matched.route.path(), "/a");

		let matched = match_path("/unknown", &catalog).unwrap();
		assert_eq!(matched.route.path(), "/*");
		assert_eq!(matched.params.get(PATH_MATCH_PARAM).unwrap(), "unknown");
	}

	#[rstest]
	fn test_match_path_catch_all_fallback() {
		let catalog = vec![record("*"), record("/")];

		let matched = match_path("/", &catalog).unwrap();
		assert_eq!(matched.route.path(), "*");

		let matched = match_path("/missing/page", &catalog).unwrap();
		assert_eq!(matched.route.path(), "*");
		assert_eq!(
			matched.params.get(PATH_MATCH_PARAM).unwrap(),
			"missing/page"
		);
	}

	#[rstest]
	fn test_match_path_not_found() {
		let catalog = vec![record("/")];
		assert!(match_path("/missing", &catalog).is_none());
	}
}
