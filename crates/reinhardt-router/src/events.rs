//! Lifecycle events and the ordered event bus.
//!
//! Every [`RouterEvent`] has an ordered listener list. Emitting an event
//! awaits each listener in registration order before moving on, so async
//! listeners observe the same phase ordering as synchronous ones.
//!
//! Phase payloads are shared [`Rc`] contexts. Listeners communicate back to
//! the engine through interior mutability (`cancel`, `redirect`).

use crate::component::{Component, ResolvedComponents};
use crate::error::RouterError;
use crate::history::ScrollPosition;
use crate::location::{NavigationTarget, RouteLocation};
use crate::render::MountedComponent;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

/// Lifecycle events, in the order a successful transition emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterEvent {
	/// The initial navigation after `start()` has finished.
	Ready,
	/// Before global guards; cancellable.
	BeforeEach,
	/// Before component resolution; cancellable.
	BeforeResolve,
	/// Components resolved.
	AfterResolve,
	/// The previous route has been left.
	AfterLeave,
	/// State committed, before mounting.
	BeforeRender,
	/// Layout and page mounted.
	AfterRender,
	/// Scroll policy hook.
	Scroll,
	/// The new route has been entered.
	AfterEnter,
	/// The transition completed.
	AfterEach,
	/// A transition failed.
	Error,
	/// A route was added to the catalog.
	RouteAdded,
	/// A route was removed from the catalog.
	RouteRemoved,
}

impl RouterEvent {
	/// All events.
	pub const ALL: [RouterEvent; 13] = [
		Self::Ready,
		Self::BeforeEach,
		Self::BeforeResolve,
		Self::AfterResolve,
		Self::AfterLeave,
		Self::BeforeRender,
		Self::AfterRender,
		Self::Scroll,
		Self::AfterEnter,
		Self::AfterEach,
		Self::Error,
		Self::RouteAdded,
		Self::RouteRemoved,
	];

	/// Returns the event name.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Ready => "ready",
			Self::BeforeEach => "beforeEach",
			Self::BeforeResolve => "beforeResolve",
			Self::AfterResolve => "afterResolve",
			Self::AfterLeave => "afterLeave",
			Self::BeforeRender => "beforeRender",
			Self::AfterRender => "afterRender",
			Self::Scroll => "scroll",
			Self::AfterEnter => "afterEnter",
			Self::AfterEach => "afterEach",
			Self::Error => "error",
			Self::RouteAdded => "routeAdded",
			Self::RouteRemoved => "routeRemoved",
		}
	}
}

impl fmt::Display for RouterEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Mutable context of the guard and resolve phases
/// (`beforeEach`, `beforeResolve`, `afterResolve`).
#[derive(Debug)]
pub struct NavigationContext {
	/// Destination.
	pub to: Rc<RouteLocation>,
	/// Current location, if any.
	pub from: Option<Rc<RouteLocation>>,
	cancelled: Cell<bool>,
	redirect_to: RefCell<Option<NavigationTarget>>,
	resolved: RefCell<Option<ResolvedComponents>>,
}

impl NavigationContext {
	/// Creates a context for one phase.
	pub fn new(to: Rc<RouteLocation>, from: Option<Rc<RouteLocation>>) -> Self {
		Self {
			to,
			from,
			cancelled: Cell::new(false),
			redirect_to: RefCell::new(None),
			resolved: RefCell::new(None),
		}
	}

	/// Aborts the transition.
	pub fn cancel(&self) {
		self.cancelled.set(true);
	}

	/// Returns whether a listener cancelled.
	pub fn is_cancelled(&self) -> bool {
		self.cancelled.get()
	}

	/// Aborts the transition and navigates to `target` instead.
	pub fn redirect(&self, target: impl Into<NavigationTarget>) {
		*self.redirect_to.borrow_mut() = Some(target.into());
	}

	/// Returns the redirect requested by a listener.
	pub fn redirect_target(&self) -> Option<NavigationTarget> {
		self.redirect_to.borrow().clone()
	}

	/// Components resolved for `to`, available from `afterResolve` on.
	pub fn resolved(&self) -> Option<ResolvedComponents> {
		self.resolved.borrow().clone()
	}

	pub(crate) fn set_resolved(&self, resolved: ResolvedComponents) {
		*self.resolved.borrow_mut() = Some(resolved);
	}
}

/// Context of `beforeRender` and `afterRender`.
#[derive(Debug)]
pub struct RenderContext {
	/// Destination.
	pub to: Rc<RouteLocation>,
	/// Previous location.
	pub from: Option<Rc<RouteLocation>>,
	/// Layout to render, if any.
	pub layout: Option<Rc<Component>>,
	/// Page to render.
	pub page: Rc<Component>,
	mounted_layout: RefCell<Option<Rc<MountedComponent>>>,
	mounted_view: RefCell<Option<Rc<MountedComponent>>>,
}

impl RenderContext {
	pub(crate) fn new(
		to: Rc<RouteLocation>,
		from: Option<Rc<RouteLocation>>,
		resolved: ResolvedComponents,
	) -> Self {
		Self {
			to,
			from,
			layout: resolved.layout,
			page: resolved.page,
			mounted_layout: RefCell::new(None),
			mounted_view: RefCell::new(None),
		}
	}

	/// The mounted layout, available in `afterRender`.
	pub fn mounted_layout(&self) -> Option<Rc<MountedComponent>> {
		self.mounted_layout.borrow().clone()
	}

	/// The mounted page, available in `afterRender`.
	pub fn mounted_view(&self) -> Option<Rc<MountedComponent>> {
		self.mounted_view.borrow().clone()
	}

	pub(crate) fn set_mounted(
		&self,
		layout: Option<Rc<MountedComponent>>,
		view: Option<Rc<MountedComponent>>,
	) {
		*self.mounted_layout.borrow_mut() = layout;
		*self.mounted_view.borrow_mut() = view;
	}
}

/// Context of the `scroll` event.
#[derive(Debug, Clone)]
pub struct ScrollContext {
	/// Destination.
	pub to: Rc<RouteLocation>,
	/// Previous location.
	pub from: Option<Rc<RouteLocation>>,
	/// Offset saved when `to` was last left, for back/forward transitions only.
	pub saved_position: Option<ScrollPosition>,
}

/// Context of `afterLeave`, `afterEnter` and `afterEach`.
#[derive(Debug, Clone)]
pub struct TransitionContext {
	/// Destination.
	pub to: Rc<RouteLocation>,
	/// Previous location.
	pub from: Option<Rc<RouteLocation>>,
}

/// Context of the `error` event.
#[derive(Debug, Clone)]
pub struct ErrorContext {
	/// What went wrong.
	pub error: RouterError,
	/// The requested target.
	pub target: Option<String>,
	/// The destination, if it resolved.
	pub to: Option<Rc<RouteLocation>>,
	/// The location at the time of failure.
	pub from: Option<Rc<RouteLocation>>,
}

impl ErrorContext {
	/// Creates a context without location information.
	pub fn new(error: RouterError) -> Self {
		Self {
			error,
			target: None,
			to: None,
			from: None,
		}
	}

	/// Returns the error message.
	pub fn message(&self) -> String {
		self.error.to_string()
	}
}

/// Payload of `routeAdded` and `routeRemoved`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteChange {
	/// Route path pattern.
	pub path: String,
	/// Route name.
	pub name: Option<String>,
}

/// Event payload delivered to listeners.
#[derive(Debug, Clone)]
pub enum EventPayload {
	/// `ready`, with the location after the initial navigation.
	Ready(Option<Rc<RouteLocation>>),
	/// `beforeEach`, `beforeResolve`, `afterResolve`.
	Navigation(Rc<NavigationContext>),
	/// `beforeRender`, `afterRender`.
	Render(Rc<RenderContext>),
	/// `scroll`.
	Scroll(Rc<ScrollContext>),
	/// `afterLeave`, `afterEnter`, `afterEach`.
	Transition(Rc<TransitionContext>),
	/// `error`.
	Error(Rc<ErrorContext>),
	/// `routeAdded`, `routeRemoved`.
	Route(Rc<RouteChange>),
}

/// An event listener.
pub type EventListener = Rc<dyn Fn(EventPayload) -> LocalBoxFuture<'static, ()>>;

/// Ordered per-event listener lists.
#[derive(Default)]
pub struct EventBus {
	listeners: RefCell<HashMap<RouterEvent, Vec<(u64, EventListener)>>>,
	next_id: Cell<u64>,
}

impl EventBus {
	/// Creates an empty bus.
	pub fn new() -> Rc<Self> {
		Rc::new(Self::default())
	}

	/// Appends a listener to `event`.
	pub fn subscribe(self: &Rc<Self>, event: RouterEvent, listener: EventListener) -> ListenerHandle {
		let id = self.next_id.get();
		self.next_id.set(id + 1);
		self.listeners
			.borrow_mut()
			.entry(event)
			.or_default()
			.push((id, listener));

		let weak: Weak<Self> = Rc::downgrade(self);
		ListenerHandle::new(move || {
			weak.upgrade()
				.map(|bus| bus.remove(event, id))
				.unwrap_or(false)
		})
	}

	/// Subscribes a synchronous listener.
	pub fn on<F>(self: &Rc<Self>, event: RouterEvent, listener: F) -> ListenerHandle
	where
		F: Fn(&EventPayload) + 'static,
	{
		self.subscribe(
			event,
			Rc::new(move |payload: EventPayload| {
				listener(&payload);
				futures::future::ready(()).boxed_local()
			}),
		)
	}

	/// Subscribes an asynchronous listener. Emission awaits it.
	pub fn on_async<F, Fut>(self: &Rc<Self>, event: RouterEvent, listener: F) -> ListenerHandle
	where
		F: Fn(EventPayload) -> Fut + 'static,
		Fut: Future<Output = ()> + 'static,
	{
		self.subscribe(
			event,
			Rc::new(move |payload: EventPayload| listener(payload).boxed_local()),
		)
	}

	fn remove(&self, event: RouterEvent, id: u64) -> bool {
		let mut listeners = self.listeners.borrow_mut();
		let Some(list) = listeners.get_mut(&event) else {
			return false;
		};
		let before = list.len();
		list.retain(|(existing, _)| *existing != id);
		list.len() != before
	}

	/// Returns the number of listeners for `event`.
	pub fn listener_count(&self, event: RouterEvent) -> usize {
		self.listeners
			.borrow()
			.get(&event)
			.map(Vec::len)
			.unwrap_or(0)
	}

	fn snapshot(&self, event: RouterEvent) -> Vec<EventListener> {
		self.listeners
			.borrow()
			.get(&event)
			.map(|list| list.iter().map(|(_, l)| Rc::clone(l)).collect())
			.unwrap_or_default()
	}

	/// Invokes every listener of `event` in order, awaiting each.
	///
	/// Listeners registered while the event is being emitted are not called
	/// for this emission.
	pub async fn emit(&self, event: RouterEvent, payload: EventPayload) {
		let listeners = self.snapshot(event);
		if !listeners.is_empty() {
			tracing::trace!(event = %event, listeners = listeners.len(), "Emitting router event");
		}
		for listener in listeners {
			listener(payload.clone()).await;
		}
	}

	/// Emits from synchronous code. Listeners that suspend are polled once
	/// and then dropped with a warning.
	pub fn emit_now(&self, event: RouterEvent, payload: EventPayload) {
		for listener in self.snapshot(event) {
			if listener(payload.clone()).now_or_never().is_none() {
				tracing::warn!(event = %event, "Async listener suspended during synchronous emit");
			}
		}
	}

	/// Removes every listener.
	pub fn clear(&self) {
		self.listeners.borrow_mut().clear();
	}
}

impl fmt::Debug for EventBus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let counts: HashMap<&'static str, usize> = self
			.listeners
			.borrow()
			.iter()
			.map(|(event, list)| (event.as_str(), list.len()))
			.collect();
		f.debug_struct("EventBus").field("listeners", &counts).finish()
	}
}

/// Removes a listener or guard registration.
#[must_use = "dropping a ListenerHandle keeps the registration; call `unsubscribe` to remove it"]
pub struct ListenerHandle {
	remove: Option<Box<dyn FnOnce() -> bool>>,
}

impl ListenerHandle {
	pub(crate) fn new(remove: impl FnOnce() -> bool + 'static) -> Self {
		Self {
			remove: Some(Box::new(remove)),
		}
	}

	/// A handle with nothing to remove.
	pub(crate) fn inactive() -> Self {
		Self { remove: None }
	}

	/// Removes the registration. Returns `false` if it was already gone.
	pub fn unsubscribe(mut self) -> bool {
		self.remove.take().map(|remove| remove()).unwrap_or(false)
	}
}

impl fmt::Debug for ListenerHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ListenerHandle")
			.field("active", &self.remove.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::location::Query;
	use crate::matcher::Params;
	use rstest::rstest;

	fn location(path: &str) -> Rc<RouteLocation> {
		Rc::new(RouteLocation::new(path, Query::new(), Params::new(), None))
	}

	fn recording(log: &Rc<RefCell<Vec<String>>>, label: &'static str) -> EventListener {
		let log = Rc::clone(log);
		Rc::new(move |_payload| {
			log.borrow_mut().push(label.to_string());
			futures::future::ready(()).boxed_local()
		})
	}

	#[rstest]
	#[tokio::test]
	async fn test_emit_in_registration_order() {
		// Arrange
		let bus = EventBus::new();
		let log = Rc::new(RefCell::new(Vec::new()));
		let _a = bus.subscribe(RouterEvent::AfterEach, recording(&log, "a"));
		let _b = bus.subscribe(RouterEvent::AfterEach, recording(&log, "b"));
		let _other = bus.subscribe(RouterEvent::Error, recording(&log, "error"));

		// Act
		bus.emit(
			RouterEvent::AfterEach,
			EventPayload::Transition(Rc::new(TransitionContext {
				to: location("/a"),
				from: None,
			})),
		)
		.await;

		// Assert
		assert_eq!(*log.borrow(), vec!["a", "b"]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_async_listeners_are_awaited_in_order() {
		// Arrange
		let bus = EventBus::new();
		let log = Rc::new(RefCell::new(Vec::new()));
		let slow_log = Rc::clone(&log);
		let _slow = bus.subscribe(
			RouterEvent::Scroll,
			Rc::new(move |_| {
				let log = Rc::clone(&slow_log);
				async move {
					tokio::task::yield_now().await;
					log.borrow_mut().push("slow".to_string());
				}
				.boxed_local()
			}),
		);
		let _fast = bus.subscribe(RouterEvent::Scroll, recording(&log, "fast"));

		// Act
		bus.emit(
			RouterEvent::Scroll,
			EventPayload::Scroll(Rc::new(ScrollContext {
				to: location("/"),
				from: None,
				saved_position: None,
			})),
		)
		.await;

		// Assert
		assert_eq!(*log.borrow(), vec!["slow", "fast"]);
	}

	#[rstest]
	fn test_unsubscribe_removes_listener() {
		let bus = EventBus::new();
		let log = Rc::new(RefCell::new(Vec::new()));
		let handle = bus.subscribe(RouterEvent::RouteAdded, recording(&log, "added"));

		assert!(handle.unsubscribe());
		bus.emit_now(
			RouterEvent::RouteAdded,
			EventPayload::Route(Rc::new(RouteChange {
				path: "/x".to_string(),
				name: None,
			})),
		);

		assert!(log.borrow().is_empty());
		assert_eq!(bus.listener_count(RouterEvent::RouteAdded), 0);
	}

	#[rstest]
	fn test_navigation_context_flags() {
		let ctx = NavigationContext::new(location("/a"), None);

		assert!(!ctx.is_cancelled());
		ctx.cancel();
		ctx.redirect("/login");

		assert!(ctx.is_cancelled());
		assert_eq!(ctx.redirect_target(), Some(NavigationTarget::from("/login")));
	}

	#[rstest]
	fn test_event_names() {
		assert_eq!(RouterEvent::BeforeEach.to_string(), "beforeEach");
		assert_eq!(RouterEvent::RouteRemoved.as_str(), "routeRemoved");
		assert_eq!(RouterEvent::ALL.len(), 13);
	}
}
