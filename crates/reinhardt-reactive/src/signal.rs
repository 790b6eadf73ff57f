//! Signal - Observable Single-Value Cell
//!
//! `Signal<T>` holds one value and notifies registered watchers whenever the
//! value is replaced or updated in place.
//!
//! ## Key Features
//!
//! - **Shared Ownership**: Clones share the same underlying value via `Rc`.
//! - **Change Subscription**: [`Signal::watch`] registers a callback that runs
//!   after every write with the new value.
//! - **Read-only Views**: [`Signal::read_only`] hands out a [`ReadSignal`] that
//!   can observe but never write, so owners keep exclusive write access.
//!
//! ## Example
//!
//! ```
//! use reinhardt_reactive::Signal;
//!
//! let count = Signal::new(0);
//! let handle = count.watch(|value| println!("count is now {}", value));
//!
//! count.set(42);
//! count.update(|n| *n += 1);
//! assert_eq!(count.get(), 43);
//!
//! handle.unwatch();
//! ```

use core::cell::{Cell, RefCell};
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

extern crate alloc;
use alloc::rc::{Rc, Weak};

/// Unique identifier of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(u64);

impl SignalId {
	fn next() -> Self {
		static NEXT_ID: AtomicU64 = AtomicU64::new(1);
		Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
	}

	/// Returns the raw numeric id.
	pub fn as_u64(&self) -> u64 {
		self.0
	}
}

type Watcher<T> = Rc<dyn Fn(&T)>;

struct SignalInner<T: 'static> {
	id: SignalId,
	value: RefCell<T>,
	watchers: RefCell<Vec<(u64, Watcher<T>)>>,
	next_watcher: Cell<u64>,
}

impl<T: 'static> SignalInner<T> {
	fn remove_watcher(&self, watcher_id: u64) -> bool {
		let mut watchers = self.watchers.borrow_mut();
		let before = watchers.len();
		watchers.retain(|(id, _)| *id != watcher_id);
		watchers.len() != before
	}
}

/// A reactive cell holding a single value.
///
/// Writes are synchronous: by the time [`Signal::set`] returns, every watcher
/// registered at the time of the write has observed the new value.
pub struct Signal<T: 'static> {
	inner: Rc<SignalInner<T>>,
}

impl<T: 'static> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: 'static> Signal<T> {
	/// Create a new Signal with the given initial value
	pub fn new(value: T) -> Self {
		Self {
			inner: Rc::new(SignalInner {
				id: SignalId::next(),
				value: RefCell::new(value),
				watchers: RefCell::new(Vec::new()),
				next_watcher: Cell::new(0),
			}),
		}
	}

	/// Returns the identifier of this signal.
	pub fn id(&self) -> SignalId {
		self.inner.id
	}

	/// Get a clone of the current value.
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.inner.value.borrow().clone()
	}

	/// Borrow the current value for the duration of `f`.
	///
	/// `f` must not write to this signal.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.inner.value.borrow())
	}

	/// Replace the value and notify watchers.
	pub fn set(&self, value: T)
	where
		T: Clone,
	{
		*self.inner.value.borrow_mut() = value;
		self.notify();
	}

	/// Mutate the value in place and notify watchers once.
	pub fn update<F>(&self, f: F)
	where
		F: FnOnce(&mut T),
		T: Clone,
	{
		f(&mut *self.inner.value.borrow_mut());
		self.notify();
	}

	/// Register a callback invoked with the new value after each write.
	///
	/// The returned handle removes the watcher when [`WatchHandle::unwatch`]
	/// is called. Dropping the handle keeps the watcher registered.
	pub fn watch<F>(&self, callback: F) -> WatchHandle
	where
		F: Fn(&T) + 'static,
	{
		let watcher_id = self.inner.next_watcher.get();
		self.inner.next_watcher.set(watcher_id + 1);
		self.inner
			.watchers
			.borrow_mut()
			.push((watcher_id, Rc::new(callback)));

		let weak: Weak<SignalInner<T>> = Rc::downgrade(&self.inner);
		WatchHandle {
			remove: Some(Box::new(move || {
				weak.upgrade()
					.map(|inner| inner.remove_watcher(watcher_id))
					.unwrap_or(false)
			})),
		}
	}

	/// Returns the number of registered watchers.
	pub fn watcher_count(&self) -> usize {
		self.inner.watchers.borrow().len()
	}

	/// Returns a read-only view sharing this signal's value.
	pub fn read_only(&self) -> ReadSignal<T> {
		ReadSignal {
			signal: self.clone(),
		}
	}

	fn notify(&self)
	where
		T: Clone,
	{
		// Snapshot both the value and the watcher list so callbacks may read
		// or write this signal without hitting an outstanding borrow.
		let watchers: Vec<Watcher<T>> = self
			.inner
			.watchers
			.borrow()
			.iter()
			.map(|(_, w)| Rc::clone(w))
			.collect();
		if watchers.is_empty() {
			return;
		}
		let snapshot = self.get();
		for watcher in watchers {
			watcher(&snapshot);
		}
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("id", &self.inner.id)
			.field("value", &*self.inner.value.borrow())
			.field("watchers", &self.inner.watchers.borrow().len())
			.finish()
	}
}

/// Read-only view of a [`Signal`].
pub struct ReadSignal<T: 'static> {
	signal: Signal<T>,
}

impl<T: 'static> Clone for ReadSignal<T> {
	fn clone(&self) -> Self {
		Self {
			signal: self.signal.clone(),
		}
	}
}

impl<T: 'static> ReadSignal<T> {
	/// Returns the identifier of the underlying signal.
	pub fn id(&self) -> SignalId {
		self.signal.id()
	}

	/// Get a clone of the current value.
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.signal.get()
	}

	/// Borrow the current value for the duration of `f`.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		self.signal.with(f)
	}

	/// Register a change callback. See [`Signal::watch`].
	pub fn watch<F>(&self, callback: F) -> WatchHandle
	where
		F: Fn(&T) + 'static,
	{
		self.signal.watch(callback)
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for ReadSignal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ReadSignal").field(&self.signal).finish()
	}
}

/// Handle returned by [`Signal::watch`].
#[must_use = "dropping a WatchHandle keeps the watcher registered; call `unwatch` to remove it"]
pub struct WatchHandle {
	remove: Option<Box<dyn FnOnce() -> bool>>,
}

impl WatchHandle {
	/// Remove the watcher. Returns `false` if the signal is already gone.
	pub fn unwatch(mut self) -> bool {
		self.remove.take().map(|remove| remove()).unwrap_or(false)
	}
}

impl fmt::Debug for WatchHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WatchHandle")
			.field("active", &self.remove.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_signal_creation() {
		let signal = Signal::new(42);
		assert_eq!(signal.get(), 42);
	}

	#[rstest]
	fn test_signal_set_and_update() {
		let signal = Signal::new(0);

		signal.set(100);
		assert_eq!(signal.get(), 100);

		signal.update(|n| *n += 1);
		assert_eq!(signal.get(), 101);
	}

	#[rstest]
	fn test_signal_clone_shares_value() {
		let signal1 = Signal::new(String::from("a"));
		let signal2 = signal1.clone();

		signal1.set(String::from("b"));

		assert_eq!(signal2.get(), "b");
		assert_eq!(signal1.id(), signal2.id());
	}

	#[rstest]
	fn test_watch_receives_new_value() {
		// Arrange
		let signal = Signal::new(1);
		let seen = Rc::new(RefCell::new(Vec::new()));
		let seen_clone = Rc::clone(&seen);
		let _handle = signal.watch(move |v| seen_clone.borrow_mut().push(*v));

		// Act
		signal.set(2);
		signal.update(|n| *n *= 10);

		// Assert
		assert_eq!(*seen.borrow(), vec![2, 20]);
	}

	#[rstest]
	fn test_unwatch_stops_notifications() {
		// Arrange
		let signal = Signal::new(0);
		let calls = Rc::new(Cell::new(0));
		let calls_clone = Rc::clone(&calls);
		let handle = signal.watch(move |_| calls_clone.set(calls_clone.get() + 1));

		// Act
		signal.set(1);
		assert!(handle.unwatch());
		signal.set(2);

		// Assert
		assert_eq!(calls.get(), 1);
		assert_eq!(signal.watcher_count(), 0);
	}

	#[rstest]
	fn test_watcher_may_write_other_signal() {
		// Arrange
		let source = Signal::new(1);
		let mirror = Signal::new(0);
		let mirror_clone = mirror.clone();
		let _handle = source.watch(move |v| mirror_clone.set(*v * 2));

		// Act
		source.set(21);

		// Assert
		assert_eq!(mirror.get(), 42);
	}

	#[rstest]
	fn test_watcher_may_read_same_signal() {
		let signal = Signal::new(5);
		let reader = signal.clone();
		let observed = Rc::new(Cell::new(0));
		let observed_clone = Rc::clone(&observed);
		let _handle = signal.watch(move |_| observed_clone.set(reader.get()));

		signal.set(7);

		assert_eq!(observed.get(), 7);
	}

	#[rstest]
	fn test_read_only_view_observes_writes() {
		let signal = Signal::new("home");
		let view = signal.read_only();
		let seen = Rc::new(Cell::new(""));
		let seen_clone = Rc::clone(&seen);
		let _handle = view.watch(move |v| seen_clone.set(*v));

		signal.set("about");

		assert_eq!(view.get(), "about");
		assert_eq!(seen.get(), "about");
		assert_eq!(view.with(|v| v.len()), 5);
	}

	#[rstest]
	fn test_unwatch_after_signal_dropped() {
		let signal = Signal::new(0);
		let handle = signal.watch(|_| {});
		drop(signal);

		assert!(!handle.unwatch());
	}
}
