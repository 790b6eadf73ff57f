//! Mount collaborators.
//!
//! The router does not render markup itself. A [`Renderer`] finds the mount
//! point and mounts a component into a [`Container`], returning a
//! [`MountedComponent`] that owns the unmount capability.

mod memory;

pub use memory::{MemoryContainer, MemoryRenderer, RenderRecord};

use crate::component::{Component, Props};
use crate::error::RouterResult;
use futures::future::LocalBoxFuture;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a container.
pub type ContainerRef = Rc<dyn Container>;

/// An element components can be mounted into.
pub trait Container {
	/// Finds a descendant matching a CSS selector.
	fn query_selector(&self, selector: &str) -> Option<ContainerRef>;

	/// Human-readable label used in logs.
	fn describe(&self) -> String;

	/// Access to the concrete type for renderers.
	fn as_any(&self) -> &dyn Any;
}

type UnmountFn = Box<dyn FnOnce() -> RouterResult<()>>;

/// A component mounted into a container.
pub struct MountedComponent {
	container: ContainerRef,
	component: Rc<Component>,
	unmount: RefCell<Option<UnmountFn>>,
}

impl MountedComponent {
	/// Creates a handle.
	pub fn new<F>(container: ContainerRef, component: Rc<Component>, unmount: F) -> Self
	where
		F: FnOnce() -> RouterResult<()> + 'static,
	{
		Self {
			container,
			component,
			unmount: RefCell::new(Some(Box::new(unmount))),
		}
	}

	/// The container holding the component.
	pub fn container(&self) -> &ContainerRef {
		&self.container
	}

	/// The mounted component.
	pub fn component(&self) -> &Rc<Component> {
		&self.component
	}

	/// Returns whether `unmount` has already run.
	pub fn is_unmounted(&self) -> bool {
		self.unmount.borrow().is_none()
	}

	/// Tears the component down. Subsequent calls are no-ops.
	pub fn unmount(&self) -> RouterResult<()> {
		let unmount = self.unmount.borrow_mut().take();
		match unmount {
			Some(unmount) => unmount(),
			None => Ok(()),
		}
	}
}

impl fmt::Debug for MountedComponent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MountedComponent")
			.field("component", &self.component.name())
			.field("container", &self.container.describe())
			.field("unmounted", &self.is_unmounted())
			.finish()
	}
}

/// The mount collaborator.
pub trait Renderer {
	/// Resolves the configured mount selector.
	fn mount_point(&self, selector: &str) -> Option<ContainerRef>;

	/// Mounts `component` into `container`.
	fn mount(
		&self,
		container: ContainerRef,
		component: Rc<Component>,
		props: Props,
	) -> LocalBoxFuture<'static, RouterResult<MountedComponent>>;
}

/// Finds the view slot inside a mounted layout.
///
/// Tries `#selector`, `.selector`, `[data-selector]` and the bare selector,
/// falling back to the layout container itself.
pub fn resolve_view_slot(container: &ContainerRef, selector: &str) -> ContainerRef {
	let candidates = [
		format!("#{}", selector),
		format!(".{}", selector),
		format!("[data-{}]", selector),
		selector.to_string(),
	];
	candidates
		.iter()
		.find_map(|candidate| container.query_selector(candidate))
		.unwrap_or_else(|| Rc::clone(container))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn container(markup: &str) -> ContainerRef {
		let container = Rc::new(MemoryContainer::new("root"));
		container.set_markup(markup);
		container
	}

	#[rstest]
	#[case(r#"<main id="router-view"></main>"#, "#router-view")]
	#[case(r#"<main class="shell router-view"></main>"#, ".router-view")]
	#[case(r#"<main data-router-view></main>"#, "[data-router-view]")]
	#[case(r#"<router-view></router-view>"#, "router-view")]
	#[case(r#"<main></main>"#, "root")]
	fn test_resolve_view_slot(#[case] markup: &str, #[case] expected: &str) {
		let root = container(markup);

		let slot = resolve_view_slot(&root, "router-view");

		assert_eq!(slot.describe(), expected);
	}

	#[rstest]
	fn test_unmount_runs_once() {
		let calls = Rc::new(RefCell::new(0));
		let calls_clone = Rc::clone(&calls);
		let mounted = MountedComponent::new(
			container(""),
			Rc::new(Component::new("Page").template("")),
			move || {
				*calls_clone.borrow_mut() += 1;
				Ok(())
			},
		);

		mounted.unmount().unwrap();
		mounted.unmount().unwrap();

		assert_eq!(*calls.borrow(), 1);
		assert!(mounted.is_unmounted());
	}
}
