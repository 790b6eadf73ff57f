//! The navigation engine.
//!
//! [`Router`] owns the catalog, the reactive location state and the
//! collaborators, and runs every transition through the same pipeline:
//! guards, component resolution, unmount, commit, render, post hooks and
//! finally history synchronization.
//!
//! ## Overlapping navigations
//!
//! Every transition takes a navigation id. Until it unmounts the current
//! view, a transition whose id is no longer the latest stops at its next
//! checkpoint without side effects.
//!
//! Unmounting claims the render for the transition. From then on it only
//! steps aside when a newer transition unmounts after it, and that newer
//! transition renders in its place. Unmounting and mounting are serialized,
//! so two transitions never interleave their mounts. History is synced in
//! the same section as the mount, so the URL always names the rendered
//! location. Lifecycle listeners run outside the serialized sections and may
//! await navigations.

mod builder;
mod transition;

pub use builder::RouterBuilder;
pub(crate) use transition::NavigationType;

use crate::component::{Component, ComponentResolver, ComponentSource};
use crate::config::RouterConfig;
use crate::error::{RouterError, RouterResult};
use crate::error_handler::ErrorHandler;
use crate::events::{
	ErrorContext, EventBus, EventPayload, ListenerHandle, NavigationContext, RouteChange,
	RouterEvent,
};
use crate::guard::Guard;
use crate::history::{HistoryBackend, LocationListener, ScrollPosition};
use crate::location::{NavigationTarget, Query, RouteLocation};
use crate::matcher::Params;
use crate::plugin::{PluginHost, RouterApi, RouterPlugin};
use crate::registry::RouteRegistry;
use crate::render::{MountedComponent, Renderer};
use crate::route::{RouteDefinition, RouteRecord};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use reinhardt_reactive::{ReadSignal, Signal};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

/// Reactive location state. Written only by the engine.
pub(crate) struct RouterState {
	pub(crate) current_route: Signal<Option<Rc<RouteLocation>>>,
	pub(crate) previous_route: Signal<Option<Rc<RouteLocation>>>,
	pub(crate) current_params: Signal<Params>,
	pub(crate) current_query: Signal<Query>,
	pub(crate) current_layout: Signal<Option<Rc<MountedComponent>>>,
	pub(crate) current_view: Signal<Option<Rc<MountedComponent>>>,
	pub(crate) is_ready: Signal<bool>,
}

impl RouterState {
	fn new() -> Self {
		Self {
			current_route: Signal::new(None),
			previous_route: Signal::new(None),
			current_params: Signal::new(Params::new()),
			current_query: Signal::new(Query::new()),
			current_layout: Signal::new(None),
			current_view: Signal::new(None),
			is_ready: Signal::new(false),
		}
	}

	/// Publishes a new location. The route signal is written last so its
	/// watchers see matching params and query.
	pub(crate) fn commit(&self, to: &Rc<RouteLocation>, from: Option<Rc<RouteLocation>>) {
		self.previous_route.set(from);
		self.current_params.set(to.params.clone());
		self.current_query.set(to.query.clone());
		self.current_route.set(Some(Rc::clone(to)));
	}

	/// Puts the location signals back to what they were before `commit`.
	pub(crate) fn rollback(
		&self,
		current: Option<Rc<RouteLocation>>,
		previous: Option<Rc<RouteLocation>>,
	) {
		let (params, query) = current
			.as_ref()
			.map(|location| (location.params.clone(), location.query.clone()))
			.unwrap_or_default();
		self.previous_route.set(previous);
		self.current_params.set(params);
		self.current_query.set(query);
		self.current_route.set(current);
	}
}

/// Generation counter for overlapping transitions.
#[derive(Debug, Default)]
pub(crate) struct NavigationControl {
	id: Cell<u64>,
	render_owner: Cell<u64>,
	in_flight: Cell<usize>,
	programmatic_in_flight: Cell<usize>,
}

impl NavigationControl {
	pub(crate) fn begin(&self, programmatic: bool) -> u64 {
		let id = self.id.get() + 1;
		self.id.set(id);
		self.in_flight.set(self.in_flight.get() + 1);
		if programmatic {
			self.programmatic_in_flight
				.set(self.programmatic_in_flight.get() + 1);
		}
		id
	}

	pub(crate) fn finish(&self, programmatic: bool) {
		self.in_flight.set(self.in_flight.get().saturating_sub(1));
		if programmatic {
			self.programmatic_in_flight
				.set(self.programmatic_in_flight.get().saturating_sub(1));
		}
	}

	/// Supersedes every running transition without starting a new one.
	pub(crate) fn invalidate(&self) {
		self.id.set(self.id.get() + 1);
	}

	/// Returns whether other transitions run besides the caller's.
	pub(crate) fn has_concurrent(&self) -> bool {
		self.in_flight.get() > 1
	}

	/// Records `id` as the transition that last tore down the view.
	pub(crate) fn claim_render(&self, id: u64) {
		self.render_owner.set(id);
	}

	pub(crate) fn owns_render(&self, id: u64) -> bool {
		self.render_owner.get() == id
	}

	pub(crate) fn is_current(&self, id: u64) -> bool {
		self.id.get() == id
	}

	pub(crate) fn current(&self) -> u64 {
		self.id.get()
	}

	pub(crate) fn programmatic_in_flight(&self) -> bool {
		self.programmatic_in_flight.get() > 0
	}
}

pub(crate) struct RouterInner {
	pub(crate) config: RouterConfig,
	pub(crate) registry: RefCell<RouteRegistry>,
	pub(crate) resolver: ComponentResolver,
	pub(crate) layout: Option<ComponentSource>,
	pub(crate) guards: RefCell<Vec<(u64, Guard)>>,
	next_guard_id: Cell<u64>,
	pub(crate) events: Rc<EventBus>,
	pub(crate) plugins: RefCell<PluginHost>,
	pub(crate) state: RouterState,
	pub(crate) history: Rc<dyn HistoryBackend>,
	pub(crate) renderer: Rc<dyn Renderer>,
	pub(crate) error_handler: RefCell<Rc<dyn ErrorHandler>>,
	pub(crate) navigation: NavigationControl,
	pub(crate) scroll_positions: RefCell<HashMap<String, ScrollPosition>>,
	pub(crate) render_lock: futures::lock::Mutex<()>,
	pub(crate) mounted_layout_source: RefCell<Option<ComponentSource>>,
	started: Cell<bool>,
	destroyed: Cell<bool>,
}

impl RouterInner {
	pub(crate) fn add_guard(self: &Rc<Self>, guard: Guard) -> ListenerHandle {
		let id = self.next_guard_id.get();
		self.next_guard_id.set(id + 1);
		self.guards.borrow_mut().push((id, guard));

		let weak: Weak<Self> = Rc::downgrade(self);
		ListenerHandle::new(move || {
			weak.upgrade()
				.map(|inner| {
					let mut guards = inner.guards.borrow_mut();
					let before = guards.len();
					guards.retain(|(existing, _)| *existing != id);
					guards.len() != before
				})
				.unwrap_or(false)
		})
	}

	pub(crate) fn error_handler(&self) -> Rc<dyn ErrorHandler> {
		Rc::clone(&self.error_handler.borrow())
	}
}

/// A client-side router.
///
/// Cloning is cheap and yields a handle to the same router. All futures
/// returned by the router are `!Send` and run on the current thread.
///
/// ```
/// use reinhardt_router::{Component, RouteDefinition, Router, RouterConfig};
///
/// # futures::executor::block_on(async {
/// let router = Router::builder(RouterConfig::new("#app"))
/// 	.route(RouteDefinition::new("/", Component::new("Home").template("<h1>Home</h1>")))
/// 	.route(RouteDefinition::new("/about", Component::new("About").template("<h1>About</h1>")))
/// 	.build()
/// 	.unwrap();
///
/// assert!(router.start().await);
/// assert!(router.navigate("/about").await);
/// assert_eq!(router.current_route().get().unwrap().path, "/about");
/// # });
/// ```
#[derive(Clone)]
pub struct Router {
	inner: Rc<RouterInner>,
}

impl Router {
	/// Starts building a router.
	pub fn builder(config: RouterConfig) -> RouterBuilder {
		RouterBuilder::new(config)
	}

	#[allow(clippy::too_many_arguments)]
	pub(crate) fn from_parts(
		config: RouterConfig,
		registry: RouteRegistry,
		resolver: ComponentResolver,
		layout: Option<ComponentSource>,
		history: Rc<dyn HistoryBackend>,
		renderer: Rc<dyn Renderer>,
		error_handler: Rc<dyn ErrorHandler>,
	) -> Self {
		Self {
			inner: Rc::new(RouterInner {
				config,
				registry: RefCell::new(registry),
				resolver,
				layout,
				guards: RefCell::new(Vec::new()),
				next_guard_id: Cell::new(0),
				events: EventBus::new(),
				plugins: RefCell::new(PluginHost::default()),
				state: RouterState::new(),
				history,
				renderer,
				error_handler: RefCell::new(error_handler),
				navigation: NavigationControl::default(),
				scroll_positions: RefCell::new(HashMap::new()),
				render_lock: futures::lock::Mutex::new(()),
				mounted_layout_source: RefCell::new(None),
				started: Cell::new(false),
				destroyed: Cell::new(false),
			}),
		}
	}

	pub(crate) fn from_inner(inner: Rc<RouterInner>) -> Self {
		Self { inner }
	}

	pub(crate) fn downgrade(&self) -> Weak<RouterInner> {
		Rc::downgrade(&self.inner)
	}

	fn api(&self) -> RouterApi {
		RouterApi::new(self.downgrade())
	}

	/// Returns the configuration.
	pub fn config(&self) -> &RouterConfig {
		&self.inner.config
	}

	// State

	/// The current location.
	pub fn current_route(&self) -> ReadSignal<Option<Rc<RouteLocation>>> {
		self.inner.state.current_route.read_only()
	}

	/// The location before the last completed transition.
	pub fn previous_route(&self) -> ReadSignal<Option<Rc<RouteLocation>>> {
		self.inner.state.previous_route.read_only()
	}

	/// Parameters of the current location.
	pub fn current_params(&self) -> ReadSignal<Params> {
		self.inner.state.current_params.read_only()
	}

	/// Query of the current location.
	pub fn current_query(&self) -> ReadSignal<Query> {
		self.inner.state.current_query.read_only()
	}

	/// The mounted layout.
	pub fn current_layout(&self) -> ReadSignal<Option<Rc<MountedComponent>>> {
		self.inner.state.current_layout.read_only()
	}

	/// The mounted page.
	pub fn current_view(&self) -> ReadSignal<Option<Rc<MountedComponent>>> {
		self.inner.state.current_view.read_only()
	}

	/// Becomes `true` once the initial navigation of `start()` has finished.
	pub fn is_ready(&self) -> ReadSignal<bool> {
		self.inner.state.is_ready.read_only()
	}

	/// Id of the most recent transition.
	pub fn navigation_id(&self) -> u64 {
		self.inner.navigation.current()
	}

	/// Returns whether a programmatic navigation is in flight.
	pub fn is_navigating(&self) -> bool {
		self.inner.navigation.programmatic_in_flight()
	}

	/// Returns whether the router listens to the history backend.
	pub fn is_started(&self) -> bool {
		self.inner.started.get()
	}

	/// Scroll offset saved when `path` was last left.
	pub fn saved_scroll_position(&self, path: &str) -> Option<ScrollPosition> {
		self.inner.scroll_positions.borrow().get(path).copied()
	}

	// Navigation

	/// Navigates to a target.
	///
	/// Resolves to `true` when the target has been rendered (or was already
	/// current) and `false` when the transition was aborted, redirected,
	/// superseded or failed. Failures are reported through the error
	/// handler and the `error` event.
	pub async fn navigate(&self, target: impl Into<NavigationTarget>) -> bool {
		let target = target.into();
		let navigation_type = if target.is_replace() {
			NavigationType::Replace
		} else {
			NavigationType::Push
		};
		self.run_navigation(target, navigation_type, 0).await
	}

	/// Matches a target without navigating.
	pub fn resolve(&self, target: impl Into<NavigationTarget>) -> RouterResult<RouteLocation> {
		self.inner.registry.borrow().resolve(&target.into())
	}

	/// Moves one entry back in history.
	pub async fn back(&self) -> bool {
		self.go(-1).await
	}

	/// Moves one entry forward in history.
	pub async fn forward(&self) -> bool {
		self.go(1).await
	}

	/// Moves `delta` entries through history. The resulting location change
	/// is handled like a browser back/forward event.
	pub async fn go(&self, delta: isize) -> bool {
		let traversal = self.inner.history.go(delta);
		traversal.await
	}

	/// Entry point for browser location changes (`popstate`/`hashchange`).
	///
	/// Ignored while a programmatic navigation is in flight.
	pub fn handle_location_change(&self, url: impl Into<String>) -> LocalBoxFuture<'static, bool> {
		let url = url.into();
		if self.inner.navigation.programmatic_in_flight() {
			tracing::debug!(url = %url, "Ignoring browser navigation during programmatic navigation");
			return futures::future::ready(false).boxed_local();
		}
		let path = self.inner.config.path_from_url(&url);
		self.run_navigation(NavigationTarget::from(path), NavigationType::Pop, 0)
	}

	// Lifecycle

	/// Attaches to the history backend and navigates to its current
	/// location. Emits `ready` afterwards.
	pub async fn start(&self) -> bool {
		let inner = &self.inner;
		if inner.destroyed.get() {
			tracing::warn!("Cannot start a destroyed router");
			return false;
		}
		if inner.started.replace(true) {
			tracing::debug!("Router already started");
			return inner.state.is_ready.get();
		}

		let weak = self.downgrade();
		let listener: LocationListener = Rc::new(move |url: String| match weak.upgrade() {
			Some(inner) => Router::from_inner(inner).handle_location_change(url),
			None => futures::future::ready(false).boxed_local(),
		});
		if let Err(error) = inner.history.listen(inner.config.mode, listener) {
			self.report_error(ErrorContext::new(error)).await;
		}

		let initial = inner.config.path_from_url(&inner.history.location());
		tracing::info!(mode = %inner.config.mode, path = %initial, "Starting router");
		let navigated = self
			.run_navigation(NavigationTarget::from(initial), NavigationType::Initial, 0)
			.await;

		inner.state.is_ready.set(true);
		let current = inner.state.current_route.get();
		inner
			.events
			.emit(RouterEvent::Ready, EventPayload::Ready(current))
			.await;
		navigated
	}

	/// Detaches from the history backend. State and mounted views stay.
	pub fn stop(&self) {
		if self.inner.started.replace(false) {
			self.inner.history.unlisten();
			tracing::debug!("Router stopped");
		}
	}

	/// Stops the router, destroys plugins, unmounts views and drops all
	/// listeners and guards. A destroyed router cannot be restarted.
	pub fn destroy(&self) {
		let inner = &self.inner;
		if inner.destroyed.replace(true) {
			return;
		}
		inner.navigation.invalidate();
		self.stop();

		let installed = inner.plugins.borrow_mut().take_all();
		let api = self.api();
		for entry in installed.into_iter().rev() {
			if let Err(e) = entry.plugin.destroy(&api) {
				inner.error_handler().warn(&format!(
					"Plugin '{}' failed to destroy: {}",
					entry.plugin.name(),
					e
				));
			}
		}

		if let Some(view) = inner.state.current_view.get() {
			self.unmount_quietly(&view);
		}
		if let Some(layout) = inner.state.current_layout.get() {
			self.unmount_quietly(&layout);
		}
		inner.state.current_view.set(None);
		inner.state.current_layout.set(None);
		inner.state.is_ready.set(false);
		*inner.mounted_layout_source.borrow_mut() = None;

		inner.events.clear();
		inner.guards.borrow_mut().clear();
		tracing::info!("Router destroyed");
	}

	pub(crate) fn is_destroyed(&self) -> bool {
		self.inner.destroyed.get()
	}

	// Catalog

	/// Adds a route in front of any wildcard route.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPattern`] or [`RouterError::DuplicateRoute`];
	/// the catalog is left unchanged.
	pub fn add_route(&self, definition: RouteDefinition) -> RouterResult<RouteHandle> {
		let added = self.inner.registry.borrow_mut().add(definition);
		let record = match added {
			Ok(record) => record,
			Err(e) => {
				tracing::warn!(error = %e, "Rejected route");
				self.inner.error_handler().warn(&e.to_string());
				return Err(e);
			}
		};

		tracing::debug!(path = %record.path(), "Added route");
		self.inner.events.emit_now(
			RouterEvent::RouteAdded,
			EventPayload::Route(Rc::new(RouteChange {
				path: record.path().to_string(),
				name: record.name().map(str::to_string),
			})),
		);
		Ok(RouteHandle {
			router: self.downgrade(),
			path: record.path().to_string(),
		})
	}

	/// Removes a route by path or name.
	pub fn remove_route(&self, path_or_name: &str) -> bool {
		let removed = {
			let mut registry = self.inner.registry.borrow_mut();
			match registry.get(path_or_name) {
				Some(record) => registry.remove(record.path()),
				None => None,
			}
		};
		let Some(record) = removed else {
			return false;
		};

		tracing::debug!(path = %record.path(), "Removed route");
		self.inner.events.emit_now(
			RouterEvent::RouteRemoved,
			EventPayload::Route(Rc::new(RouteChange {
				path: record.path().to_string(),
				name: record.name().map(str::to_string),
			})),
		);
		true
	}

	/// Returns whether a route is registered at `path`.
	pub fn has_route(&self, path: &str) -> bool {
		self.inner.registry.borrow().has(path)
	}

	/// Looks a route up by path or name.
	pub fn get_route(&self, path_or_name: &str) -> Option<Rc<RouteRecord>> {
		self.inner.registry.borrow().get(path_or_name)
	}

	/// Returns all routes in match order.
	pub fn get_routes(&self) -> Vec<Rc<RouteRecord>> {
		self.inner.registry.borrow().routes()
	}

	/// Registers a component for [`ComponentSource::Named`] references.
	pub fn register_component(&self, component: Component) {
		self.inner.resolver.register(component);
	}

	// Guards and events

	/// Appends a global guard.
	pub fn before_each(&self, guard: Guard) -> ListenerHandle {
		self.inner.add_guard(guard)
	}

	/// Subscribes to any event.
	pub fn on<F>(&self, event: RouterEvent, listener: F) -> ListenerHandle
	where
		F: Fn(&EventPayload) + 'static,
	{
		self.inner.events.on(event, listener)
	}

	/// Subscribes an async listener to any event. The pipeline awaits it.
	pub fn on_async<F, Fut>(&self, event: RouterEvent, listener: F) -> ListenerHandle
	where
		F: Fn(EventPayload) -> Fut + 'static,
		Fut: Future<Output = ()> + 'static,
	{
		self.inner.events.on_async(event, listener)
	}

	/// Listens to `beforeEach`. The listener may cancel or redirect.
	pub fn on_before_each<F>(&self, listener: F) -> ListenerHandle
	where
		F: Fn(&NavigationContext) + 'static,
	{
		self.on(RouterEvent::BeforeEach, move |payload| {
			if let EventPayload::Navigation(context) = payload {
				listener(context);
			}
		})
	}

	/// Listens to `afterEnter` with `(to, from)`.
	pub fn on_after_enter<F>(&self, listener: F) -> ListenerHandle
	where
		F: Fn(&RouteLocation, Option<&RouteLocation>) + 'static,
	{
		self.on_transition(RouterEvent::AfterEnter, listener)
	}

	/// Listens to `afterLeave` with `(to, from)`.
	pub fn on_after_leave<F>(&self, listener: F) -> ListenerHandle
	where
		F: Fn(&RouteLocation, Option<&RouteLocation>) + 'static,
	{
		self.on_transition(RouterEvent::AfterLeave, listener)
	}

	/// Listens to `afterEach` with `(to, from)`.
	pub fn on_after_each<F>(&self, listener: F) -> ListenerHandle
	where
		F: Fn(&RouteLocation, Option<&RouteLocation>) + 'static,
	{
		self.on_transition(RouterEvent::AfterEach, listener)
	}

	/// Listens to `error`.
	pub fn on_error<F>(&self, listener: F) -> ListenerHandle
	where
		F: Fn(&ErrorContext) + 'static,
	{
		self.on(RouterEvent::Error, move |payload| {
			if let EventPayload::Error(context) = payload {
				listener(context);
			}
		})
	}

	fn on_transition<F>(&self, event: RouterEvent, listener: F) -> ListenerHandle
	where
		F: Fn(&RouteLocation, Option<&RouteLocation>) + 'static,
	{
		self.on(event, move |payload| {
			if let EventPayload::Transition(context) = payload {
				listener(&context.to, context.from.as_deref());
			}
		})
	}

	// Plugins and error handling

	/// Installs a plugin.
	///
	/// # Errors
	///
	/// - [`RouterError::DuplicatePlugin`] when the name is taken
	/// - [`RouterError::Plugin`] when `install` fails; the plugin is not kept
	pub fn use_plugin<P>(&self, plugin: P, options: Value) -> RouterResult<()>
	where
		P: RouterPlugin + 'static,
	{
		self.install_plugin(Rc::new(plugin), options)
	}

	/// Installs a shared plugin. See [`Router::use_plugin`].
	pub fn install_plugin(&self, plugin: Rc<dyn RouterPlugin>, options: Value) -> RouterResult<()> {
		let name = plugin.name().to_string();
		if self.inner.plugins.borrow().contains(&name) {
			tracing::warn!(plugin = %name, "Plugin already installed");
			return Err(RouterError::DuplicatePlugin(name));
		}

		plugin
			.install(&self.api(), &options)
			.map_err(|e| crate::plugin::plugin_error(&name, e))?;
		self.inner.plugins.borrow_mut().push(plugin, options);
		tracing::debug!(plugin = %name, "Installed plugin");
		Ok(())
	}

	/// Destroys and removes a plugin. Destroy errors are reported as warnings.
	///
	/// # Errors
	///
	/// Returns [`RouterError::PluginNotFound`] for unknown names.
	pub fn remove_plugin(&self, name: &str) -> RouterResult<()> {
		let removed = self.inner.plugins.borrow_mut().remove(name);
		let entry = removed.ok_or_else(|| RouterError::PluginNotFound(name.to_string()))?;
		if let Err(e) = entry.plugin.destroy(&self.api()) {
			self.inner
				.error_handler()
				.warn(&format!("Plugin '{}' failed to destroy: {}", name, e));
		}
		tracing::debug!(plugin = %name, "Removed plugin");
		Ok(())
	}

	/// Returns an installed plugin.
	pub fn get_plugin(&self, name: &str) -> Option<Rc<dyn RouterPlugin>> {
		self.inner.plugins.borrow().get(name)
	}

	/// Returns installed plugin names in installation order.
	pub fn get_plugins(&self) -> Vec<String> {
		self.inner.plugins.borrow().names()
	}

	/// Options a plugin was installed with.
	pub fn plugin_options(&self, name: &str) -> Option<Value> {
		self.inner.plugins.borrow().options(name)
	}

	/// Replaces the error handler.
	pub fn set_error_handler(&self, handler: Rc<dyn ErrorHandler>) {
		*self.inner.error_handler.borrow_mut() = handler;
	}

	/// Returns the error handler.
	pub fn error_handler(&self) -> Rc<dyn ErrorHandler> {
		self.inner.error_handler()
	}

	pub(crate) async fn report_error(&self, context: ErrorContext) {
		self.inner.error_handler().handle(&context);
		self.inner
			.events
			.emit(RouterEvent::Error, EventPayload::Error(Rc::new(context)))
			.await;
	}

	pub(crate) fn unmount_quietly(&self, mounted: &MountedComponent) {
		if let Err(e) = mounted.unmount() {
			tracing::warn!(component = %mounted.component().name(), error = %e, "Unmount failed");
			self.inner.error_handler().warn(&format!(
				"Failed to unmount '{}': {}",
				mounted.component().name(),
				e
			));
		}
	}
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("mode", &self.inner.config.mode)
			.field("mount", &self.inner.config.mount)
			.field("routes", &self.inner.registry.borrow().len())
			.field("navigation_id", &self.navigation_id())
			.field("started", &self.is_started())
			.finish()
	}
}

/// Returned by [`Router::add_route`]; removes the route again.
#[must_use = "dropping a RouteHandle keeps the route; call `remove` to remove it"]
pub struct RouteHandle {
	router: Weak<RouterInner>,
	path: String,
}

impl RouteHandle {
	/// The path pattern of the added route.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Removes the route. Returns `false` if it was already removed.
	pub fn remove(self) -> bool {
		self.router
			.upgrade()
			.map(|inner| Router::from_inner(inner).remove_route(&self.path))
			.unwrap_or(false)
	}
}

impl fmt::Debug for RouteHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteHandle").field("path", &self.path).finish()
	}
}
