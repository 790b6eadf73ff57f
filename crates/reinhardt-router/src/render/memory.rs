//! Markup-string renderer for non-browser targets.

use super::{Container, ContainerRef, MountedComponent, Renderer};
use crate::component::{Component, Props};
use crate::error::{RouterError, RouterResult};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use regex::Regex;
use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// A container holding a markup string.
///
/// Selector lookups scan the markup for an element matching the selector
/// (`#id`, `.class`, `[attribute]` or a tag name) and return a child
/// container for it. Children are dropped when the markup is replaced.
pub struct MemoryContainer {
	label: String,
	markup: RefCell<String>,
	children: RefCell<HashMap<String, Rc<MemoryContainer>>>,
}

impl MemoryContainer {
	/// Creates an empty container.
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			markup: RefCell::new(String::new()),
			children: RefCell::new(HashMap::new()),
		}
	}

	/// Replaces the markup.
	pub fn set_markup(&self, markup: &str) {
		*self.markup.borrow_mut() = markup.to_string();
		self.children.borrow_mut().clear();
	}

	/// Clears the markup.
	pub fn clear(&self) {
		self.set_markup("");
	}

	/// Returns the markup.
	pub fn markup(&self) -> String {
		self.markup.borrow().clone()
	}

	/// Returns the child created for `selector`, if it was queried before.
	pub fn child(&self, selector: &str) -> Option<Rc<MemoryContainer>> {
		self.children.borrow().get(selector).cloned()
	}

	fn contains_match(&self, selector: &str) -> bool {
		let markup = self.markup.borrow();
		if let Some(id) = selector.strip_prefix('#') {
			attribute_values(&markup, "id").iter().any(|value| value == id)
		} else if let Some(class) = selector.strip_prefix('.') {
			attribute_values(&markup, "class")
				.iter()
				.any(|value| value.split_whitespace().any(|c| c == class))
		} else if let Some(attribute) = selector
			.strip_prefix('[')
			.and_then(|rest| rest.strip_suffix(']'))
		{
			pattern_matches(
				&format!(r"<[^>]*\s{}(\s|=|/?>)", regex::escape(attribute)),
				&markup,
			)
		} else {
			pattern_matches(&format!(r"<{}(\s|/?>)", regex::escape(selector)), &markup)
		}
	}
}

fn pattern_matches(pattern: &str, haystack: &str) -> bool {
	Regex::new(pattern)
		.map(|re| re.is_match(haystack))
		.unwrap_or(false)
}

fn attribute_values(markup: &str, attribute: &str) -> Vec<String> {
	let Ok(re) = Regex::new(&format!(
		r#"\s{}\s*=\s*["']([^"']*)["']"#,
		regex::escape(attribute)
	)) else {
		return Vec::new();
	};
	re.captures_iter(markup)
		.filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
		.collect()
}

impl Container for MemoryContainer {
	fn query_selector(&self, selector: &str) -> Option<ContainerRef> {
		if !self.contains_match(selector) {
			return None;
		}
		let child: Rc<MemoryContainer> = Rc::clone(
			&*self
				.children
				.borrow_mut()
				.entry(selector.to_string())
				.or_insert_with(|| Rc::new(MemoryContainer::new(selector))),
		);
		Some(child)
	}

	fn describe(&self) -> String {
		self.label.clone()
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

impl fmt::Debug for MemoryContainer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryContainer")
			.field("label", &self.label)
			.field("markup", &*self.markup.borrow())
			.finish()
	}
}

/// One mount or unmount performed by a [`MemoryRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderRecord {
	/// A component was mounted.
	Mounted {
		/// Component name.
		component: String,
		/// Container label.
		container: String,
	},
	/// A component was unmounted.
	Unmounted {
		/// Component name.
		component: String,
		/// Container label.
		container: String,
	},
}

/// Renderer writing component markup into [`MemoryContainer`]s.
pub struct MemoryRenderer {
	document: Rc<MemoryContainer>,
	records: Rc<RefCell<Vec<RenderRecord>>>,
	failing_mounts: RefCell<HashSet<String>>,
	failing_unmounts: Rc<RefCell<HashSet<String>>>,
}

impl MemoryRenderer {
	/// Creates a renderer whose document contains `<div id="app"></div>`.
	pub fn new() -> Self {
		Self::with_document(r#"<div id="app"></div>"#)
	}

	/// Creates a renderer with custom document markup.
	pub fn with_document(markup: &str) -> Self {
		let document = Rc::new(MemoryContainer::new("document"));
		document.set_markup(markup);
		Self {
			document,
			records: Rc::new(RefCell::new(Vec::new())),
			failing_mounts: RefCell::new(HashSet::new()),
			failing_unmounts: Rc::new(RefCell::new(HashSet::new())),
		}
	}

	/// Returns the document container.
	pub fn document(&self) -> &Rc<MemoryContainer> {
		&self.document
	}

	/// Returns the markup of the container at `selector`.
	pub fn rendered(&self, selector: &str) -> Option<String> {
		self.document
			.query_selector(selector)?
			.as_any()
			.downcast_ref::<MemoryContainer>()
			.map(MemoryContainer::markup)
	}

	/// Returns every mount and unmount, oldest first.
	pub fn records(&self) -> Vec<RenderRecord> {
		self.records.borrow().clone()
	}

	/// Forgets recorded mounts and unmounts.
	pub fn clear_records(&self) {
		self.records.borrow_mut().clear();
	}

	/// Counts mounts of a component.
	pub fn mount_count(&self, component: &str) -> usize {
		self.records
			.borrow()
			.iter()
			.filter(|r| matches!(r, RenderRecord::Mounted { component: c, .. } if c == component))
			.count()
	}

	/// Counts unmounts of a component.
	pub fn unmount_count(&self, component: &str) -> usize {
		self.records
			.borrow()
			.iter()
			.filter(|r| matches!(r, RenderRecord::Unmounted { component: c, .. } if c == component))
			.count()
	}

	/// Makes mounting `component` fail.
	pub fn fail_mount(&self, component: &str) {
		self.failing_mounts.borrow_mut().insert(component.to_string());
	}

	/// Makes unmounting `component` fail.
	pub fn fail_unmount(&self, component: &str) {
		self.failing_unmounts
			.borrow_mut()
			.insert(component.to_string());
	}
}

impl Default for MemoryRenderer {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for MemoryRenderer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryRenderer")
			.field("document", &self.document)
			.field("records", &self.records.borrow().len())
			.finish()
	}
}

impl Renderer for MemoryRenderer {
	fn mount_point(&self, selector: &str) -> Option<ContainerRef> {
		self.document.query_selector(selector)
	}

	fn mount(
		&self,
		container: ContainerRef,
		component: Rc<Component>,
		props: Props,
	) -> LocalBoxFuture<'static, RouterResult<MountedComponent>> {
		let result = self.mount_now(container, component, &props);
		futures::future::ready(result).boxed_local()
	}
}

impl MemoryRenderer {
	fn mount_now(
		&self,
		container: ContainerRef,
		component: Rc<Component>,
		props: &Props,
	) -> RouterResult<MountedComponent> {
		let name = component.name().to_string();
		if self.failing_mounts.borrow().contains(&name) {
			return Err(RouterError::Render(format!("mounting '{}' failed", name)));
		}
		let markup = component
			.render(props)
			.ok_or_else(|| RouterError::MissingTemplate(name.clone()))?;
		let target = container
			.as_any()
			.downcast_ref::<MemoryContainer>()
			.ok_or_else(|| {
				RouterError::Render(format!(
					"container '{}' is not a memory container",
					container.describe()
				))
			})?;
		target.set_markup(&markup);

		let label = container.describe();
		self.records.borrow_mut().push(RenderRecord::Mounted {
			component: name.clone(),
			container: label.clone(),
		});

		let records = Rc::clone(&self.records);
		let failing_unmounts = Rc::clone(&self.failing_unmounts);
		let unmount_target = Rc::clone(&container);
		let unmount = move || {
			if failing_unmounts.borrow().contains(&name) {
				return Err(RouterError::Unmount(format!("unmounting '{}' failed", name)));
			}
			if let Some(target) = unmount_target.as_any().downcast_ref::<MemoryContainer>() {
				target.clear();
			}
			records.borrow_mut().push(RenderRecord::Unmounted {
				component: name,
				container: label,
			});
			Ok(())
		};

		Ok(MountedComponent::new(container, component, unmount))
	}
}
