//! Router plugins.
//!
//! A plugin receives a [`RouterApi`] on install and may subscribe to events,
//! add guards or replace the error handler. Plugins are destroyed in reverse
//! installation order when the router is destroyed.

use crate::config::RouterConfig;
use crate::engine::{Router, RouterInner};
use crate::error::{RouterError, RouterResult};
use crate::error_handler::ErrorHandler;
use crate::events::{EventPayload, ListenerHandle, RouterEvent};
use crate::guard::Guard;
use crate::history::ScrollPosition;
use crate::location::{NavigationTarget, RouteLocation};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

/// A router extension.
pub trait RouterPlugin {
	/// Unique plugin name.
	fn name(&self) -> &str;

	/// Called once when the plugin is installed.
	fn install(&self, router: &RouterApi, options: &Value) -> RouterResult<()>;

	/// Called when the plugin is removed or the router is destroyed.
	fn destroy(&self, _router: &RouterApi) -> RouterResult<()> {
		Ok(())
	}
}

/// The part of the router exposed to plugins.
///
/// Holds a weak reference: once the router is dropped every call becomes a
/// no-op.
#[derive(Clone)]
pub struct RouterApi {
	router: Weak<RouterInner>,
}

impl RouterApi {
	pub(crate) fn new(router: Weak<RouterInner>) -> Self {
		Self { router }
	}

	fn router(&self) -> Option<Router> {
		self.router.upgrade().map(Router::from_inner)
	}

	/// Returns whether the router is still alive.
	pub fn is_alive(&self) -> bool {
		self.router.strong_count() > 0
	}

	/// Subscribes to an event.
	pub fn on<F>(&self, event: RouterEvent, listener: F) -> ListenerHandle
	where
		F: Fn(&EventPayload) + 'static,
	{
		match self.router() {
			Some(router) => router.on(event, listener),
			None => ListenerHandle::inactive(),
		}
	}

	/// Subscribes an awaited listener to an event.
	pub fn on_async<F, Fut>(&self, event: RouterEvent, listener: F) -> ListenerHandle
	where
		F: Fn(EventPayload) -> Fut + 'static,
		Fut: Future<Output = ()> + 'static,
	{
		match self.router() {
			Some(router) => router.on_async(event, listener),
			None => ListenerHandle::inactive(),
		}
	}

	/// Adds a global guard.
	pub fn before_each(&self, guard: Guard) -> ListenerHandle {
		match self.router() {
			Some(router) => router.before_each(guard),
			None => ListenerHandle::inactive(),
		}
	}

	/// Starts a navigation.
	pub fn navigate(&self, target: impl Into<NavigationTarget>) -> LocalBoxFuture<'static, bool> {
		let target = target.into();
		match self.router() {
			Some(router) => async move { router.navigate(target).await }.boxed_local(),
			None => futures::future::ready(false).boxed_local(),
		}
	}

	/// The current location.
	pub fn current_route(&self) -> Option<Rc<RouteLocation>> {
		self.router()
			.and_then(|router| router.current_route().get())
	}

	/// Replaces the error handler.
	pub fn set_error_handler(&self, handler: Rc<dyn ErrorHandler>) {
		if let Some(router) = self.router() {
			router.set_error_handler(handler);
		}
	}

	/// Returns the error handler.
	pub fn error_handler(&self) -> Option<Rc<dyn ErrorHandler>> {
		self.router().map(|router| router.error_handler())
	}

	/// Scrolls the history backend's viewport.
	pub fn scroll_to(&self, position: ScrollPosition) {
		if let Some(inner) = self.router.upgrade() {
			inner.history.scroll_to(position);
		}
	}

	/// A copy of the router configuration.
	pub fn config(&self) -> Option<RouterConfig> {
		self.router.upgrade().map(|inner| inner.config.clone())
	}
}

impl fmt::Debug for RouterApi {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouterApi")
			.field("alive", &self.is_alive())
			.finish()
	}
}

pub(crate) fn plugin_error(name: &str, error: RouterError) -> RouterError {
	match error {
		RouterError::Plugin { .. } => error,
		other => RouterError::Plugin {
			name: name.to_string(),
			message: other.to_string(),
		},
	}
}

pub(crate) struct InstalledPlugin {
	pub(crate) plugin: Rc<dyn RouterPlugin>,
	pub(crate) options: Value,
}

/// Installed plugins in installation order.
#[derive(Default)]
pub(crate) struct PluginHost {
	installed: Vec<InstalledPlugin>,
}

impl PluginHost {
	pub(crate) fn contains(&self, name: &str) -> bool {
		self.installed.iter().any(|p| p.plugin.name() == name)
	}

	pub(crate) fn push(&mut self, plugin: Rc<dyn RouterPlugin>, options: Value) {
		self.installed.push(InstalledPlugin { plugin, options });
	}

	pub(crate) fn remove(&mut self, name: &str) -> Option<InstalledPlugin> {
		let index = self
			.installed
			.iter()
			.position(|p| p.plugin.name() == name)?;
		Some(self.installed.remove(index))
	}

	pub(crate) fn get(&self, name: &str) -> Option<Rc<dyn RouterPlugin>> {
		self.installed
			.iter()
			.find(|p| p.plugin.name() == name)
			.map(|p| Rc::clone(&p.plugin))
	}

	pub(crate) fn options(&self, name: &str) -> Option<Value> {
		self.installed
			.iter()
			.find(|p| p.plugin.name() == name)
			.map(|p| p.options.clone())
	}

	pub(crate) fn names(&self) -> Vec<String> {
		self.installed
			.iter()
			.map(|p| p.plugin.name().to_string())
			.collect()
	}

	pub(crate) fn take_all(&mut self) -> Vec<InstalledPlugin> {
		std::mem::take(&mut self.installed)
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ScrollRestorationOptions {
	#[serde(default = "default_reset_to_top")]
	reset_to_top: bool,
}

fn default_reset_to_top() -> bool {
	true
}

impl Default for ScrollRestorationOptions {
	fn default() -> Self {
		Self {
			reset_to_top: default_reset_to_top(),
		}
	}
}

/// Restores saved scroll offsets on back/forward and scrolls to the top on
/// other transitions.
///
/// Options: `{"resetToTop": bool}` (default `true`).
#[derive(Default)]
pub struct ScrollRestorationPlugin {
	subscription: RefCell<Option<ListenerHandle>>,
}

impl ScrollRestorationPlugin {
	/// Plugin name.
	pub const NAME: &'static str = "scroll-restoration";

	/// Creates the plugin.
	pub fn new() -> Self {
		Self::default()
	}
}

impl RouterPlugin for ScrollRestorationPlugin {
	fn name(&self) -> &str {
		Self::NAME
	}

	fn install(&self, router: &RouterApi, options: &Value) -> RouterResult<()> {
		let options = match options {
			Value::Null => ScrollRestorationOptions::default(),
			other => ScrollRestorationOptions::deserialize(other)
				.map_err(|e| RouterError::InvalidConfig(e.to_string()))?,
		};

		let api = router.clone();
		let reset_to_top = options.reset_to_top;
		let handle = router.on(RouterEvent::Scroll, move |payload| {
			let EventPayload::Scroll(context) = payload else {
				return;
			};
			match context.saved_position {
				Some(position) => api.scroll_to(position),
				None if reset_to_top => api.scroll_to(ScrollPosition::TOP),
				None => {}
			}
		});
		if let Some(previous) = self.subscription.borrow_mut().replace(handle) {
			let _ = previous.unsubscribe();
		}
		Ok(())
	}

	fn destroy(&self, _router: &RouterApi) -> RouterResult<()> {
		if let Some(handle) = self.subscription.borrow_mut().take() {
			let _ = handle.unsubscribe();
		}
		Ok(())
	}
}

impl fmt::Debug for ScrollRestorationPlugin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ScrollRestorationPlugin")
			.field("installed", &self.subscription.borrow().is_some())
			.finish()
	}
}
