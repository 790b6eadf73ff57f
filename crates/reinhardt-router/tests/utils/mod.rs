//! Shared fixtures for router integration tests
//!
//! Every harness wires a [`Router`] to a [`MemoryHistory`] and a
//! [`MemoryRenderer`] so tests can inspect history entries and mounted markup.

#![allow(dead_code)]

use futures::channel::oneshot;
use reinhardt_router::events::EventPayload;
use reinhardt_router::render::MemoryContainer;
use reinhardt_router::{
	Component, ErrorContext, ErrorHandler, MemoryHistory, MemoryRenderer, RouteDefinition, Router,
	RouterConfig, RouterEvent,
};
use std::cell::RefCell;
use std::rc::Rc;

/// A router with inspectable collaborators.
pub struct Harness {
	pub router: Router,
	pub history: Rc<MemoryHistory>,
	pub renderer: Rc<MemoryRenderer>,
	pub errors: Rc<RecordingErrorHandler>,
}

/// A page rendering `<h1>{name}</h1>`.
pub fn page(name: &str) -> Component {
	Component::new(name).template(format!("<h1>{}</h1>", name))
}

/// `/`, `/about`, `/users/:id` and `/files/*`, without a catch-all.
pub fn standard_routes() -> Vec<RouteDefinition> {
	vec![
		RouteDefinition::new("/", page("Home")).name("home"),
		RouteDefinition::new("/about", page("About")).name("about"),
		RouteDefinition::new("/users/:id", page("User")).name("user"),
		RouteDefinition::new("/files/*", page("Files")).name("files"),
	]
}

pub fn harness() -> Harness {
	harness_with(RouterConfig::new("#app"), MemoryHistory::default(), standard_routes())
}

pub fn harness_with(
	config: RouterConfig,
	history: MemoryHistory,
	routes: Vec<RouteDefinition>,
) -> Harness {
	let history = Rc::new(history);
	let renderer = Rc::new(MemoryRenderer::new());
	let errors = Rc::new(RecordingErrorHandler::default());
	let router = Router::builder(config)
		.routes(routes)
		.history(history.clone())
		.renderer(renderer.clone())
		.error_handler(errors.clone())
		.build()
		.expect("router should build");
	Harness {
		router,
		history,
		renderer,
		errors,
	}
}

/// Error handler keeping every message.
#[derive(Default)]
pub struct RecordingErrorHandler {
	pub errors: RefCell<Vec<String>>,
	pub warnings: RefCell<Vec<String>>,
}

impl RecordingErrorHandler {
	pub fn errors(&self) -> Vec<String> {
		self.errors.borrow().clone()
	}

	pub fn warnings(&self) -> Vec<String> {
		self.warnings.borrow().clone()
	}
}

impl ErrorHandler for RecordingErrorHandler {
	fn handle(&self, context: &ErrorContext) {
		self.errors.borrow_mut().push(context.message());
	}

	fn warn(&self, message: &str) {
		self.warnings.borrow_mut().push(message.to_string());
	}

	fn log(&self, _message: &str) {}
}

/// Records the names of the given events in emission order.
pub fn record_events(router: &Router, events: &[RouterEvent]) -> Rc<RefCell<Vec<String>>> {
	let log = Rc::new(RefCell::new(Vec::new()));
	for event in events {
		let log = Rc::clone(&log);
		let name = event.as_str();
		let _ = router.on(*event, move |_payload: &EventPayload| {
			log.borrow_mut().push(name.to_string());
		});
	}
	log
}

/// Path of the current route.
pub fn current_path(router: &Router) -> Option<String> {
	router.current_route().get().map(|location| location.path.clone())
}

/// Markup of the container the current page is mounted in.
pub fn view_markup(router: &Router) -> Option<String> {
	let view = router.current_view().get()?;
	view.container()
		.as_any()
		.downcast_ref::<MemoryContainer>()
		.map(MemoryContainer::markup)
}

/// Parks the first emission of `event` until the returned sender fires or
/// is dropped.
pub fn hold_event(router: &Router, event: RouterEvent) -> oneshot::Sender<()> {
	let (release, gate) = oneshot::channel::<()>();
	let gate = Rc::new(RefCell::new(Some(gate)));
	let _ = router.on_async(event, move |_payload| {
		let gate = gate.borrow_mut().take();
		async move {
			if let Some(gate) = gate {
				let _ = gate.await;
			}
		}
	});
	release
}
