//! Component definitions and resolution.
//!
//! A route names its page (and optionally its layout) through a
//! [`ComponentSource`]:
//!
//! - [`ComponentSource::Named`] looks the component up in the
//!   [`ComponentRegistry`]
//! - [`ComponentSource::Inline`] is a ready definition
//! - [`ComponentSource::Factory`] is called on every resolution
//! - [`ComponentSource::Lazy`] loads a [`LazyModule`] once and caches its
//!   default export
//!
//! Every resolved component must carry a [`Template`].

use crate::error::{RouterError, RouterResult};
use crate::matcher::Params;
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Properties passed to a mounted page. Currently the route parameters.
pub type Props = Params;

/// Render function of a [`Template::Render`].
pub type RenderFn = Rc<dyn Fn(&Props) -> String>;

/// Markup source of a component.
#[derive(Clone)]
pub enum Template {
	/// Static markup.
	Markup(String),
	/// Markup computed from the props.
	Render(RenderFn),
}

impl Template {
	/// Produces markup for the given props.
	pub fn render(&self, props: &Props) -> String {
		match self {
			Self::Markup(markup) => markup.clone(),
			Self::Render(render) => render(props),
		}
	}
}

impl fmt::Debug for Template {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Markup(markup) => f.debug_tuple("Markup").field(markup).finish(),
			Self::Render(_) => f.write_str("Render(<fn>)"),
		}
	}
}

/// A renderable unit. Mounting and lifecycle are left to the
/// [`Renderer`](crate::render::Renderer).
#[derive(Debug, Clone)]
pub struct Component {
	name: String,
	template: Option<Template>,
}

impl Component {
	/// Creates a component without a template.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			template: None,
		}
	}

	/// Sets static markup.
	pub fn template(mut self, markup: impl Into<String>) -> Self {
		self.template = Some(Template::Markup(markup.into()));
		self
	}

	/// Sets a render function.
	pub fn render_with<F>(mut self, render: F) -> Self
	where
		F: Fn(&Props) -> String + 'static,
	{
		self.template = Some(Template::Render(Rc::new(render)));
		self
	}

	/// Returns the component name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the template, if any.
	pub fn template_ref(&self) -> Option<&Template> {
		self.template.as_ref()
	}

	/// Returns whether the component can be rendered.
	pub fn has_template(&self) -> bool {
		self.template.is_some()
	}

	/// Renders markup, or `None` without a template.
	pub fn render(&self, props: &Props) -> Option<String> {
		self.template.as_ref().map(|template| template.render(props))
	}
}

/// Output of a lazy loader.
///
/// Loaders that produce a bare [`Component`] convert through `From`, which
/// makes the component the default export.
#[derive(Debug, Clone, Default)]
pub struct LazyModule {
	default: Option<Component>,
	exports: BTreeMap<String, Component>,
}

impl LazyModule {
	/// Creates a module with no exports.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the default export.
	pub fn with_default(mut self, component: Component) -> Self {
		self.default = Some(component);
		self
	}

	/// Adds a named export.
	pub fn export(mut self, name: impl Into<String>, component: Component) -> Self {
		self.exports.insert(name.into(), component);
		self
	}

	/// Returns the default export.
	pub fn default_export(&self) -> Option<&Component> {
		self.default.as_ref()
	}

	/// Returns a named export.
	pub fn named_export(&self, name: &str) -> Option<&Component> {
		self.exports.get(name)
	}

	fn into_default(self) -> Option<Component> {
		self.default
	}
}

impl From<Component> for LazyModule {
	fn from(component: Component) -> Self {
		Self::new().with_default(component)
	}
}

type FactoryFn = dyn Fn() -> LocalBoxFuture<'static, RouterResult<Component>>;
type LoaderFn = dyn Fn() -> LocalBoxFuture<'static, RouterResult<LazyModule>>;

/// A component factory invoked on every resolution.
#[derive(Clone)]
pub struct ComponentFactory(Rc<FactoryFn>);

/// A lazy loader whose result is cached after the first success.
#[derive(Clone)]
pub struct LazyComponent {
	id: u64,
	loader: Rc<LoaderFn>,
}

impl LazyComponent {
	fn new(loader: Rc<LoaderFn>) -> Self {
		static NEXT_ID: AtomicU64 = AtomicU64::new(1);
		Self {
			id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
			loader,
		}
	}

	/// Returns the cache key of this loader.
	pub fn id(&self) -> u64 {
		self.id
	}
}

/// How a route refers to a component.
#[derive(Clone)]
pub enum ComponentSource {
	/// Name registered with the component registry.
	Named(String),
	/// A ready component definition.
	Inline(Rc<Component>),
	/// A factory called on every resolution.
	Factory(ComponentFactory),
	/// A lazily loaded module, cached after the first load.
	Lazy(LazyComponent),
}

impl ComponentSource {
	/// Refers to a registered component.
	pub fn named(name: impl Into<String>) -> Self {
		Self::Named(name.into())
	}

	/// Wraps a synchronous factory.
	pub fn factory<F>(factory: F) -> Self
	where
		F: Fn() -> Component + 'static,
	{
		Self::Factory(ComponentFactory(Rc::new(move || {
			futures::future::ready(Ok::<_, RouterError>(factory())).boxed_local()
		})))
	}

	/// Wraps an asynchronous factory.
	pub fn factory_async<F, Fut>(factory: F) -> Self
	where
		F: Fn() -> Fut + 'static,
		Fut: Future<Output = RouterResult<Component>> + 'static,
	{
		Self::Factory(ComponentFactory(Rc::new(move || factory().boxed_local())))
	}

	/// Wraps a lazy loader. The loader runs until it first succeeds.
	pub fn lazy<F, Fut, M>(loader: F) -> Self
	where
		F: Fn() -> Fut + 'static,
		Fut: Future<Output = RouterResult<M>> + 'static,
		LazyModule: From<M>,
		M: 'static,
	{
		Self::Lazy(LazyComponent::new(Rc::new(move || {
			loader()
				.map(|result| result.map(LazyModule::from))
				.boxed_local()
		})))
	}

	/// Returns whether both sources denote the same component.
	pub fn same_as(&self, other: &ComponentSource) -> bool {
		match (self, other) {
			(Self::Named(a), Self::Named(b)) => a == b,
			(Self::Inline(a), Self::Inline(b)) => Rc::ptr_eq(a, b),
			(Self::Factory(a), Self::Factory(b)) => Rc::ptr_eq(&a.0, &b.0),
			(Self::Lazy(a), Self::Lazy(b)) => a.id == b.id,
			_ => false,
		}
	}

	/// Short description used in logs and errors.
	pub fn describe(&self) -> String {
		match self {
			Self::Named(name) => name.clone(),
			Self::Inline(component) => component.name().to_string(),
			Self::Factory(_) => "<factory>".to_string(),
			Self::Lazy(lazy) => format!("<lazy #{}>", lazy.id),
		}
	}
}

impl fmt::Debug for ComponentSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
			Self::Inline(component) => f.debug_tuple("Inline").field(&component.name()).finish(),
			Self::Factory(_) => f.write_str("Factory"),
			Self::Lazy(lazy) => f.debug_tuple("Lazy").field(&lazy.id).finish(),
		}
	}
}

impl From<Component> for ComponentSource {
	fn from(component: Component) -> Self {
		Self::Inline(Rc::new(component))
	}
}

impl From<Rc<Component>> for ComponentSource {
	fn from(component: Rc<Component>) -> Self {
		Self::Inline(component)
	}
}

impl From<&str> for ComponentSource {
	fn from(name: &str) -> Self {
		Self::named(name)
	}
}

impl From<String> for ComponentSource {
	fn from(name: String) -> Self {
		Self::Named(name)
	}
}

/// Components registered by name.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
	components: HashMap<String, Rc<Component>>,
}

impl ComponentRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a component under its own name, replacing any previous one.
	pub fn register(&mut self, component: Component) -> Option<Rc<Component>> {
		self.components
			.insert(component.name().to_string(), Rc::new(component))
	}

	/// Removes a registration.
	pub fn unregister(&mut self, name: &str) -> Option<Rc<Component>> {
		self.components.remove(name)
	}

	/// Looks a component up.
	pub fn get(&self, name: &str) -> Option<Rc<Component>> {
		self.components.get(name).cloned()
	}

	/// Returns whether a name is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.components.contains_key(name)
	}

	/// Returns the number of registrations.
	pub fn len(&self) -> usize {
		self.components.len()
	}

	/// Returns whether the registry is empty.
	pub fn is_empty(&self) -> bool {
		self.components.is_empty()
	}
}

/// Layout and page of a route after resolution.
#[derive(Debug, Clone)]
pub struct ResolvedComponents {
	/// The effective layout, if any.
	pub layout: Option<Rc<Component>>,
	/// The page component.
	pub page: Rc<Component>,
}

/// Resolves [`ComponentSource`]s to validated components.
///
/// Cloning shares the registry and the lazy cache.
#[derive(Clone, Default)]
pub struct ComponentResolver {
	registry: Rc<RefCell<ComponentRegistry>>,
	lazy_cache: Rc<RefCell<HashMap<u64, Rc<Component>>>>,
}

impl ComponentResolver {
	/// Creates a resolver with an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a named component.
	pub fn register(&self, component: Component) {
		let name = component.name().to_string();
		if self.registry.borrow_mut().register(component).is_some() {
			tracing::debug!(component = %name, "Replaced component registration");
		}
	}

	/// Returns whether a name is registered.
	pub fn is_registered(&self, name: &str) -> bool {
		self.registry.borrow().contains(name)
	}

	/// Returns whether a lazy loader already has a cached result.
	pub fn is_cached(&self, lazy: &LazyComponent) -> bool {
		self.lazy_cache.borrow().contains_key(&lazy.id)
	}

	/// Resolves one source.
	///
	/// # Errors
	///
	/// - [`RouterError::ComponentNotRegistered`] for unknown names
	/// - [`RouterError::LazyLoad`] when a loader fails or yields no default export
	/// - [`RouterError::MissingTemplate`] when the result has no template
	pub fn resolve(&self, source: &ComponentSource) -> LocalBoxFuture<'static, RouterResult<Rc<Component>>> {
		let resolver = self.clone();
		let source = source.clone();
		async move {
			let component = match &source {
				ComponentSource::Named(name) => resolver
					.registry
					.borrow()
					.get(name)
					.ok_or_else(|| RouterError::ComponentNotRegistered(name.clone()))?,
				ComponentSource::Inline(component) => Rc::clone(component),
				ComponentSource::Factory(factory) => Rc::new((factory.0)().await?),
				ComponentSource::Lazy(lazy) => resolver.load_lazy(lazy).await?,
			};
			if !component.has_template() {
				return Err(RouterError::MissingTemplate(component.name().to_string()));
			}
			Ok(component)
		}
		.boxed_local()
	}

	async fn load_lazy(&self, lazy: &LazyComponent) -> RouterResult<Rc<Component>> {
		let cached = self.lazy_cache.borrow().get(&lazy.id).cloned();
		if let Some(component) = cached {
			return Ok(component);
		}

		let module = (lazy.loader)().await.map_err(|e| match e {
			RouterError::LazyLoad(_) => e,
			other => RouterError::LazyLoad(other.to_string()),
		})?;
		let component = module
			.into_default()
			.map(Rc::new)
			.ok_or_else(|| RouterError::LazyLoad("module has no default export".to_string()))?;

		tracing::debug!(component = %component.name(), "Loaded lazy component");
		self.lazy_cache
			.borrow_mut()
			.insert(lazy.id, Rc::clone(&component));
		Ok(component)
	}

	/// Resolves a route's layout and page concurrently.
	///
	/// A failing layout degrades to "no layout" with a warning; a failing
	/// page fails the whole resolution.
	pub async fn resolve_route(
		&self,
		route: &str,
		layout: Option<&ComponentSource>,
		page: Option<&ComponentSource>,
	) -> RouterResult<ResolvedComponents> {
		let page = page.ok_or_else(|| RouterError::MissingPageComponent(route.to_string()))?;
		let layout_future = async {
			match layout {
				Some(source) => Some(self.resolve(source).await),
				None => None,
			}
		};
		let (layout, page) = futures::join!(layout_future, self.resolve(page));

		let page = page?;
		let layout = match layout {
			Some(Ok(component)) => Some(component),
			Some(Err(e)) => {
				tracing::warn!(route = %route, error = %e, "Layout failed to resolve, rendering without layout");
				None
			}
			None => None,
		};
		Ok(ResolvedComponents { layout, page })
	}
}

impl fmt::Debug for ComponentResolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentResolver")
			.field("registered", &self.registry.borrow().len())
			.field("cached", &self.lazy_cache.borrow().len())
			.finish()
	}
}
