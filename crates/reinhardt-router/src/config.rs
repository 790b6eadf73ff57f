//! Router configuration.
//!
//! [`RouterConfig`] carries the declarative options that can be loaded from
//! JSON. Code-level options (routes, guards, collaborators) are supplied
//! through [`RouterBuilder`](crate::RouterBuilder).
//!
//! ```
//! use reinhardt_router::{RouterConfig, RouterMode};
//!
//! let config = RouterConfig::from_json(r##"{"mode": "hash", "mount": "#app"}"##).unwrap();
//! assert_eq!(config.mode, RouterMode::Hash);
//! assert_eq!(config.url_for("/users/42"), "#/users/42");
//! ```

use crate::error::{RouterError, RouterResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default query parameter used by [`RouterMode::Query`].
pub const DEFAULT_QUERY_PARAM: &str = "route";

/// Default view slot selector inside layouts.
pub const DEFAULT_VIEW_SELECTOR: &str = "router-view";

/// Default maximum redirect chain depth.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// How the current location is encoded in the browser URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RouterMode {
	/// `#/path?query` in the URL fragment; listens to `hashchange`.
	Hash,
	/// `/path?query` via the History API; listens to `popstate`.
	#[default]
	History,
	/// `?route=<encoded path>` in the search string; listens to `popstate`.
	Query,
}

impl RouterMode {
	/// Returns the mode name.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Hash => "hash",
			Self::History => "history",
			Self::Query => "query",
		}
	}

	/// Returns the browser event this mode listens to.
	pub fn browser_event(&self) -> &'static str {
		match self {
			Self::Hash => "hashchange",
			Self::History | Self::Query => "popstate",
		}
	}
}

impl FromStr for RouterMode {
	type Err = RouterError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"hash" => Ok(Self::Hash),
			"history" => Ok(Self::History),
			"query" => Ok(Self::Query),
			other => Err(RouterError::InvalidMode(other.to_string())),
		}
	}
}

impl TryFrom<String> for RouterMode {
	type Error = RouterError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<RouterMode> for String {
	fn from(mode: RouterMode) -> Self {
		mode.as_str().to_string()
	}
}

impl fmt::Display for RouterMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

fn default_query_param() -> String {
	DEFAULT_QUERY_PARAM.to_string()
}

fn default_view_selector() -> String {
	DEFAULT_VIEW_SELECTOR.to_string()
}

fn default_auto_start() -> bool {
	true
}

fn default_max_redirects() -> usize {
	DEFAULT_MAX_REDIRECTS
}

/// Declarative router options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RouterConfig {
	/// URL encoding mode.
	#[serde(default)]
	pub mode: RouterMode,
	/// Search parameter holding the path in [`RouterMode::Query`].
	#[serde(default = "default_query_param")]
	pub query_param: String,
	/// CSS selector of the element the router renders into.
	pub mount: String,
	/// Selector convention for the view slot inside a layout.
	#[serde(default = "default_view_selector")]
	pub view_selector: String,
	/// Whether [`RouterBuilder::launch`](crate::RouterBuilder::launch) starts the router.
	#[serde(default = "default_auto_start")]
	pub auto_start: bool,
	/// Maximum depth of a redirect chain.
	#[serde(default = "default_max_redirects")]
	pub max_redirects: usize,
}

impl RouterConfig {
	/// Creates a configuration with defaults and the given mount selector.
	pub fn new(mount: impl Into<String>) -> Self {
		Self {
			mode: RouterMode::default(),
			query_param: default_query_param(),
			mount: mount.into(),
			view_selector: default_view_selector(),
			auto_start: default_auto_start(),
			max_redirects: default_max_redirects(),
		}
	}

	/// Parses and validates a JSON configuration document.
	pub fn from_json(json: &str) -> RouterResult<Self> {
		let config: Self =
			serde_json::from_str(json).map_err(|e| RouterError::InvalidConfig(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Sets the routing mode.
	pub fn with_mode(mut self, mode: RouterMode) -> Self {
		self.mode = mode;
		self
	}

	/// Sets the query parameter used in query mode.
	pub fn with_query_param(mut self, param: impl Into<String>) -> Self {
		self.query_param = param.into();
		self
	}

	/// Sets the layout view slot selector.
	pub fn with_view_selector(mut self, selector: impl Into<String>) -> Self {
		self.view_selector = selector.into();
		self
	}

	/// Sets the auto start flag.
	pub fn with_auto_start(mut self, auto_start: bool) -> Self {
		self.auto_start = auto_start;
		self
	}

	/// Sets the maximum redirect depth.
	pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
		self.max_redirects = max_redirects;
		self
	}

	/// Checks option invariants.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidConfig`] for an empty mount selector,
	/// an empty query parameter or an empty view selector.
	pub fn validate(&self) -> RouterResult<()> {
		if self.mount.trim().is_empty() {
			return Err(RouterError::InvalidConfig(
				"`mount` selector is required".to_string(),
			));
		}
		if self.mode == RouterMode::Query && self.query_param.trim().is_empty() {
			return Err(RouterError::InvalidConfig(
				"`queryParam` must not be empty in query mode".to_string(),
			));
		}
		if self.view_selector.trim().is_empty() {
			return Err(RouterError::InvalidConfig(
				"`viewSelector` must not be empty".to_string(),
			));
		}
		Ok(())
	}

	/// Encodes a full path (`/path?query`) as a URL for the history backend.
	pub fn url_for(&self, full_path: &str) -> String {
		match self.mode {
			RouterMode::History => full_path.to_string(),
			RouterMode::Hash => format!("#{}", full_path),
			RouterMode::Query => format!(
				"?{}={}",
				self.query_param,
				urlencoding::encode(full_path)
			),
		}
	}

	/// Extracts the full path (`/path?query`) from a history backend URL.
	pub fn path_from_url(&self, url: &str) -> String {
		let extracted = match self.mode {
			RouterMode::History => url.split('#').next().unwrap_or("").to_string(),
			RouterMode::Hash => url
				.split_once('#')
				.map(|(_, fragment)| fragment.to_string())
				.unwrap_or_default(),
			RouterMode::Query => {
				let without_fragment = url.split('#').next().unwrap_or("");
				without_fragment
					.split_once('?')
					.and_then(|(_, search)| {
						serde_urlencoded::from_str::<Vec<(String, String)>>(search).ok()
					})
					.and_then(|pairs| {
						pairs
							.into_iter()
							.find(|(key, _)| key == &self.query_param)
							.map(|(_, value)| value)
					})
					.unwrap_or_default()
			}
		};

		if extracted.is_empty() {
			"/".to_string()
		} else if extracted.starts_with('/') {
			extracted
		} else {
			format!("/{}", extracted)
		}
	}
}
