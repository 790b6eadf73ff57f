//! Reinhardt Router - client-side navigation for single page applications
//!
//! The router maps URL paths to components, runs navigation guards, resolves
//! components (including lazily loaded ones), mounts them through a
//! [`Renderer`] and keeps a [`HistoryBackend`] in sync.
//!
//! ## Modules
//!
//! - [`matcher`]: path patterns with `:param`, `:param?` and `*` segments
//! - [`registry`]: the ordered route catalog
//! - [`guard`]: guard outcomes and the guard pipeline
//! - [`component`]: component sources and async resolution
//! - [`engine`]: the [`Router`] and its transition pipeline
//! - [`plugin`]: plugin host and built-in plugins
//! - [`history`]: browser and in-memory history backends
//! - [`render`]: the mount collaborator
//!
//! ## Example
//!
//! ```
//! use reinhardt_router::{
//! 	Component, Guard, GuardOutcome, NavigationTarget, RouteDefinition, RouterBuilder,
//! 	RouterConfig, RouterMode,
//! };
//!
//! # futures::executor::block_on(async {
//! let config = RouterConfig::new("#app").with_mode(RouterMode::History);
//! let router = RouterBuilder::new(config)
//! 	.route(RouteDefinition::new("/", Component::new("Home").template("<h1>Home</h1>")).name("home"))
//! 	.route(
//! 		RouteDefinition::new(
//! 			"/users/:id",
//! 			Component::new("User").render_with(|props| format!("<h1>User {}</h1>", props["id"])),
//! 		)
//! 		.name("user"),
//! 	)
//! 	.route(
//! 		RouteDefinition::new("/admin", Component::new("Admin").template("<h1>Admin</h1>"))
//! 			.before_enter(Guard::new(|_to, _from| GuardOutcome::from("/"))),
//! 	)
//! 	.build()
//! 	.unwrap();
//!
//! assert!(router.start().await);
//! assert!(router.navigate(NavigationTarget::named("user").param("id", "7")).await);
//! assert_eq!(router.current_params().get().get("id").map(String::as_str), Some("7"));
//!
//! // Redirected by the guard
//! assert!(!router.navigate("/admin").await);
//! assert_eq!(router.current_route().get().unwrap().path, "/");
//! # });
//! ```

#![warn(missing_docs)]

pub mod component;
pub mod config;
pub mod engine;
pub mod error;
pub mod error_handler;
pub mod events;
pub mod guard;
pub mod history;
pub mod location;
pub mod matcher;
pub mod plugin;
pub mod registry;
pub mod render;
pub mod route;

pub use component::{
	Component, ComponentResolver, ComponentSource, LazyModule, Props, ResolvedComponents, Template,
};
pub use config::{RouterConfig, RouterMode};
pub use engine::{RouteHandle, Router, RouterBuilder};
pub use error::{RouterError, RouterResult};
pub use error_handler::{ErrorHandler, TracingErrorHandler};
pub use events::{
	ErrorContext, EventPayload, ListenerHandle, NavigationContext, RenderContext, RouteChange,
	RouterEvent, ScrollContext, TransitionContext,
};
pub use guard::{Guard, GuardOutcome};
pub use history::{HistoryBackend, MemoryHistory, ScrollPosition};
pub use location::{NavigationTarget, Query, RouteLocation};
pub use matcher::{Params, RoutePattern};
pub use plugin::{RouterApi, RouterPlugin, ScrollRestorationPlugin};
pub use registry::RouteRegistry;
pub use render::{Container, MemoryRenderer, MountedComponent, Renderer};
pub use route::{Meta, RouteDefinition, RouteRecord};

#[cfg(target_arch = "wasm32")]
pub use history::BrowserHistory;
