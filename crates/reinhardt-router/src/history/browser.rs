//! `window.history` backend for WebAssembly targets.

use super::{HistoryBackend, LocationListener, ScrollPosition};
use crate::config::RouterMode;
use crate::error::{RouterError, RouterResult};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use std::cell::RefCell;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Event, Window};

type EventClosure = Closure<dyn FnMut(Event)>;

fn window() -> RouterResult<Window> {
	web_sys::window().ok_or_else(|| RouterError::History("no global window".to_string()))
}

fn js_error(context: &str, value: JsValue) -> RouterError {
	RouterError::History(format!("{}: {:?}", context, value))
}

/// History backend driving the browser History API.
///
/// Listens to `hashchange` in hash mode and `popstate` otherwise.
#[derive(Default)]
pub struct BrowserHistory {
	listener: RefCell<Option<(&'static str, EventClosure)>>,
}

impl BrowserHistory {
	/// Creates a backend for the global window.
	pub fn new() -> Self {
		Self::default()
	}
}

impl HistoryBackend for BrowserHistory {
	fn location(&self) -> String {
		let Ok(window) = window() else {
			return "/".to_string();
		};
		let location = window.location();
		let pathname = location.pathname().unwrap_or_else(|_| "/".to_string());
		let search = location.search().unwrap_or_default();
		let hash = location.hash().unwrap_or_default();
		format!("{}{}{}", pathname, search, hash)
	}

	fn push(&self, url: &str) -> RouterResult<()> {
		window()?
			.history()
			.map_err(|e| js_error("history unavailable", e))?
			.push_state_with_url(&JsValue::NULL, "", Some(url))
			.map_err(|e| js_error("pushState failed", e))
	}

	fn replace(&self, url: &str) -> RouterResult<()> {
		window()?
			.history()
			.map_err(|e| js_error("history unavailable", e))?
			.replace_state_with_url(&JsValue::NULL, "", Some(url))
			.map_err(|e| js_error("replaceState failed", e))
	}

	fn go(&self, delta: isize) -> LocalBoxFuture<'static, bool> {
		// The resulting popstate reaches the router through the listener.
		let moved = window()
			.and_then(|w| w.history().map_err(|e| js_error("history unavailable", e)))
			.and_then(|h| {
				h.go_with_delta(delta as i32)
					.map_err(|e| js_error("history.go failed", e))
			});
		if let Err(e) = &moved {
			tracing::warn!(error = %e, "History traversal failed");
		}
		futures::future::ready(moved.is_ok()).boxed_local()
	}

	fn listen(&self, mode: RouterMode, listener: LocationListener) -> RouterResult<()> {
		self.unlisten();
		let window = window()?;
		let event = mode.browser_event();

		let handler = Closure::wrap(Box::new(move |_event: Event| {
			let url = web_sys::window()
				.map(|w| {
					let location = w.location();
					format!(
						"{}{}{}",
						location.pathname().unwrap_or_else(|_| "/".to_string()),
						location.search().unwrap_or_default(),
						location.hash().unwrap_or_default()
					)
				})
				.unwrap_or_else(|| "/".to_string());
			let transition = listener(url);
			wasm_bindgen_futures::spawn_local(async move {
				transition.await;
			});
		}) as Box<dyn FnMut(Event)>);

		window
			.add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())
			.map_err(|e| js_error("addEventListener failed", e))?;
		*self.listener.borrow_mut() = Some((event, handler));
		Ok(())
	}

	fn unlisten(&self) {
		let Some((event, handler)) = self.listener.borrow_mut().take() else {
			return;
		};
		let removed = window().and_then(|w| {
			w.remove_event_listener_with_callback(event, handler.as_ref().unchecked_ref())
				.map_err(|e| js_error("removeEventListener failed", e))
		});
		if let Err(e) = removed {
			tracing::warn!(event, error = %e, "Failed to detach history listener");
		}
	}

	fn scroll_position(&self) -> Option<ScrollPosition> {
		let window = window().ok()?;
		Some(ScrollPosition::new(
			window.scroll_x().ok()?,
			window.scroll_y().ok()?,
		))
	}

	fn scroll_to(&self, position: ScrollPosition) {
		if let Ok(window) = window() {
			window.scroll_to_with_x_and_y(position.x, position.y);
		}
	}
}
