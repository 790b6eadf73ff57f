//! In-memory history stack.

use super::{HistoryBackend, LocationListener, ScrollPosition};
use crate::config::RouterMode;
use crate::error::RouterResult;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use std::cell::{Cell, RefCell};
use std::fmt;

/// History backend backed by a vector of URLs.
///
/// Traversals through [`HistoryBackend::go`] notify the listener the same
/// way `popstate` would. [`MemoryHistory::visit`] simulates the user
/// entering a URL (a `hashchange` in hash mode).
pub struct MemoryHistory {
	entries: RefCell<Vec<String>>,
	index: Cell<usize>,
	listener: RefCell<Option<LocationListener>>,
	mode: Cell<Option<RouterMode>>,
	scroll: Cell<Option<ScrollPosition>>,
	scroll_log: RefCell<Vec<ScrollPosition>>,
}

impl MemoryHistory {
	/// Creates a stack with one entry.
	pub fn new(initial_url: impl Into<String>) -> Self {
		Self {
			entries: RefCell::new(vec![initial_url.into()]),
			index: Cell::new(0),
			listener: RefCell::new(None),
			mode: Cell::new(None),
			scroll: Cell::new(None),
			scroll_log: RefCell::new(Vec::new()),
		}
	}

	/// Enables scroll tracking, starting at the given offset.
	pub fn with_scroll(self, position: ScrollPosition) -> Self {
		self.scroll.set(Some(position));
		self
	}

	/// Returns all entries.
	pub fn entries(&self) -> Vec<String> {
		self.entries.borrow().clone()
	}

	/// Returns the current index.
	pub fn index(&self) -> usize {
		self.index.get()
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	/// Returns whether the stack is empty. A stack always has one entry.
	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}

	/// Returns whether a listener is attached.
	pub fn is_listening(&self) -> bool {
		self.listener.borrow().is_some()
	}

	/// Returns the mode passed to `listen`.
	pub fn listening_mode(&self) -> Option<RouterMode> {
		self.mode.get()
	}

	/// Simulates the user scrolling.
	pub fn set_scroll(&self, position: ScrollPosition) {
		self.scroll.set(Some(position));
	}

	/// Every position passed to `scroll_to`, oldest first.
	pub fn scroll_log(&self) -> Vec<ScrollPosition> {
		self.scroll_log.borrow().clone()
	}

	/// Simulates the user entering `url`: pushes an entry and notifies the
	/// listener. Resolves to `true` without a listener.
	pub fn visit(&self, url: &str) -> LocalBoxFuture<'static, bool> {
		self.push_entry(url);
		self.notify(url.to_string())
	}

	fn push_entry(&self, url: &str) {
		let mut entries = self.entries.borrow_mut();
		entries.truncate(self.index.get() + 1);
		entries.push(url.to_string());
		self.index.set(entries.len() - 1);
	}

	fn notify(&self, url: String) -> LocalBoxFuture<'static, bool> {
		let listener = self.listener.borrow().clone();
		match listener {
			Some(listener) => listener(url),
			None => futures::future::ready(true).boxed_local(),
		}
	}
}

impl HistoryBackend for MemoryHistory {
	fn location(&self) -> String {
		self.entries
			.borrow()
			.get(self.index.get())
			.cloned()
			.unwrap_or_default()
	}

	fn push(&self, url: &str) -> RouterResult<()> {
		self.push_entry(url);
		Ok(())
	}

	fn replace(&self, url: &str) -> RouterResult<()> {
		let index = self.index.get();
		if let Some(entry) = self.entries.borrow_mut().get_mut(index) {
			*entry = url.to_string();
		}
		Ok(())
	}

	fn go(&self, delta: isize) -> LocalBoxFuture<'static, bool> {
		let len = self.len() as isize;
		let target = self.index.get() as isize + delta;
		if delta == 0 || target < 0 || target >= len {
			return futures::future::ready(false).boxed_local();
		}
		self.index.set(target as usize);
		self.notify(self.location())
	}

	fn listen(&self, mode: RouterMode, listener: LocationListener) -> RouterResult<()> {
		self.mode.set(Some(mode));
		*self.listener.borrow_mut() = Some(listener);
		Ok(())
	}

	fn unlisten(&self) {
		self.listener.borrow_mut().take();
		self.mode.set(None);
	}

	fn scroll_position(&self) -> Option<ScrollPosition> {
		self.scroll.get()
	}

	fn scroll_to(&self, position: ScrollPosition) {
		self.scroll.set(Some(position));
		self.scroll_log.borrow_mut().push(position);
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new("/")
	}
}

impl fmt::Debug for MemoryHistory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryHistory")
			.field("entries", &*self.entries.borrow())
			.field("index", &self.index.get())
			.field("listening", &self.is_listening())
			.finish()
	}
}
