//! History backends.
//!
//! A [`HistoryBackend`] owns the address bar: it reports the current URL,
//! pushes and replaces entries, traverses the stack and notifies the router
//! when the user moves through history.
//!
//! - [`MemoryHistory`] keeps entries in memory (tests, server-side rendering)
//! - `BrowserHistory` drives `window.history` on `wasm32`

mod memory;

#[cfg(target_arch = "wasm32")]
mod browser;

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserHistory;
pub use memory::MemoryHistory;

use crate::config::RouterMode;
use crate::error::RouterResult;
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// A scroll offset in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollPosition {
	/// Horizontal offset.
	pub x: f64,
	/// Vertical offset.
	pub y: f64,
}

impl ScrollPosition {
	/// The top-left corner.
	pub const TOP: ScrollPosition = ScrollPosition { x: 0.0, y: 0.0 };

	/// Creates a position.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Called with the new URL whenever the user traverses history.
///
/// The returned future resolves to whether the router accepted the change.
pub type LocationListener = Rc<dyn Fn(String) -> LocalBoxFuture<'static, bool>>;

/// The browser-history collaborator.
pub trait HistoryBackend {
	/// Returns the current URL (path, search and fragment).
	fn location(&self) -> String;

	/// Pushes a new entry.
	fn push(&self, url: &str) -> RouterResult<()>;

	/// Replaces the current entry.
	fn replace(&self, url: &str) -> RouterResult<()>;

	/// Moves `delta` entries through the stack.
	///
	/// Resolves to `false` when the move is impossible or the router rejected
	/// the resulting location.
	fn go(&self, delta: isize) -> LocalBoxFuture<'static, bool>;

	/// Starts reporting traversals for the given mode.
	fn listen(&self, mode: RouterMode, listener: LocationListener) -> RouterResult<()>;

	/// Stops reporting traversals.
	fn unlisten(&self);

	/// Current scroll offset, if the platform has one.
	fn scroll_position(&self) -> Option<ScrollPosition> {
		None
	}

	/// Scrolls the page.
	fn scroll_to(&self, _position: ScrollPosition) {}
}
