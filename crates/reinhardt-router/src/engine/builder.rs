//! Router construction.

use super::Router;
use crate::component::{Component, ComponentResolver, ComponentSource};
use crate::config::RouterConfig;
use crate::error::RouterResult;
use crate::error_handler::{ErrorHandler, TracingErrorHandler};
use crate::guard::Guard;
use crate::history::HistoryBackend;
use crate::plugin::RouterPlugin;
use crate::registry::RouteRegistry;
use crate::render::Renderer;
use crate::route::RouteDefinition;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Collects routes, collaborators and plugins for a [`Router`].
///
/// ```
/// use reinhardt_router::{Component, Guard, RouteDefinition, RouterBuilder, RouterConfig};
///
/// let router = RouterBuilder::new(RouterConfig::new("#app"))
/// 	.route(RouteDefinition::new("/", Component::new("Home").template("<h1>Home</h1>")))
/// 	.before_each(Guard::new(|_to, _from| true))
/// 	.build()
/// 	.unwrap();
///
/// assert!(router.has_route("/"));
/// ```
pub struct RouterBuilder {
	config: RouterConfig,
	routes: Vec<RouteDefinition>,
	layout: Option<ComponentSource>,
	guards: Vec<Guard>,
	components: Vec<Component>,
	history: Option<Rc<dyn HistoryBackend>>,
	renderer: Option<Rc<dyn Renderer>>,
	error_handler: Option<Rc<dyn ErrorHandler>>,
	plugins: Vec<(Rc<dyn RouterPlugin>, Value)>,
}

impl RouterBuilder {
	/// Starts a builder for `config`.
	pub fn new(config: RouterConfig) -> Self {
		Self {
			config,
			routes: Vec::new(),
			layout: None,
			guards: Vec::new(),
			components: Vec::new(),
			history: None,
			renderer: None,
			error_handler: None,
			plugins: Vec::new(),
		}
	}

	/// Adds a route.
	pub fn route(mut self, definition: RouteDefinition) -> Self {
		self.routes.push(definition);
		self
	}

	/// Adds several routes in order.
	pub fn routes(mut self, definitions: impl IntoIterator<Item = RouteDefinition>) -> Self {
		self.routes.extend(definitions);
		self
	}

	/// Sets the layout used by routes without their own.
	pub fn layout(mut self, layout: impl Into<ComponentSource>) -> Self {
		self.layout = Some(layout.into());
		self
	}

	/// Adds a global guard.
	pub fn before_each(mut self, guard: Guard) -> Self {
		self.guards.push(guard);
		self
	}

	/// Registers a component for name references.
	pub fn component(mut self, component: Component) -> Self {
		self.components.push(component);
		self
	}

	/// Sets the history backend.
	pub fn history(mut self, history: Rc<dyn HistoryBackend>) -> Self {
		self.history = Some(history);
		self
	}

	/// Sets the renderer.
	pub fn renderer(mut self, renderer: Rc<dyn Renderer>) -> Self {
		self.renderer = Some(renderer);
		self
	}

	/// Sets the error handler. Defaults to [`TracingErrorHandler`].
	pub fn error_handler(mut self, handler: Rc<dyn ErrorHandler>) -> Self {
		self.error_handler = Some(handler);
		self
	}

	/// Installs a plugin once the router is built.
	pub fn plugin<P>(mut self, plugin: P, options: Value) -> Self
	where
		P: RouterPlugin + 'static,
	{
		self.plugins.push((Rc::new(plugin), options));
		self
	}

	/// Builds the router without starting it.
	///
	/// Invalid route definitions are logged and skipped.
	///
	/// # Errors
	///
	/// - [`RouterError::InvalidConfig`](crate::RouterError::InvalidConfig) for a bad configuration
	/// - plugin install errors, see [`Router::use_plugin`]
	pub fn build(self) -> RouterResult<Router> {
		self.config.validate()?;

		let history = match self.history {
			Some(history) => history,
			None => default_history()?,
		};
		let renderer = match self.renderer {
			Some(renderer) => renderer,
			None => default_renderer()?,
		};

		let resolver = ComponentResolver::new();
		for component in self.components {
			resolver.register(component);
		}
		let registry = RouteRegistry::from_definitions(self.routes);
		tracing::debug!(routes = registry.len(), mode = %self.config.mode, "Building router");

		let router = Router::from_parts(
			self.config,
			registry,
			resolver,
			self.layout,
			history,
			renderer,
			self.error_handler
				.unwrap_or_else(|| Rc::new(TracingErrorHandler)),
		);
		for guard in self.guards {
			// Builder guards live as long as the router.
			let _ = router.before_each(guard);
		}
		for (plugin, options) in self.plugins {
			router.install_plugin(plugin, options)?;
		}
		Ok(router)
	}

	/// Builds the router and starts it when `auto_start` is set.
	pub async fn launch(self) -> RouterResult<Router> {
		let router = self.build()?;
		if router.config().auto_start {
			router.start().await;
		}
		Ok(router)
	}
}

#[cfg(not(target_arch = "wasm32"))]
fn default_history() -> RouterResult<Rc<dyn HistoryBackend>> {
	Ok(Rc::new(crate::history::MemoryHistory::default()))
}

#[cfg(target_arch = "wasm32")]
fn default_history() -> RouterResult<Rc<dyn HistoryBackend>> {
	Ok(Rc::new(crate::history::BrowserHistory::new()))
}

#[cfg(not(target_arch = "wasm32"))]
fn default_renderer() -> RouterResult<Rc<dyn Renderer>> {
	Ok(Rc::new(crate::render::MemoryRenderer::new()))
}

#[cfg(target_arch = "wasm32")]
fn default_renderer() -> RouterResult<Rc<dyn Renderer>> {
	Err(crate::error::RouterError::InvalidConfig(
		"a renderer is required in the browser".to_string(),
	))
}

impl fmt::Debug for RouterBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouterBuilder")
			.field("config", &self.config)
			.field("routes", &self.routes.len())
			.field("has_layout", &self.layout.is_some())
			.field("guards", &self.guards.len())
			.field("has_history", &self.history.is_some())
			.field("has_renderer", &self.renderer.is_some())
			.field("plugins", &self.plugins.len())
			.finish()
	}
}
