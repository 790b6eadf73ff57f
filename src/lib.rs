//! # Reinhardt SPA
//!
//! Client-side application routing for Reinhardt single page applications.
//!
//! ## Feature Flags
//!
//! - `reactive` - Observable values ([`Signal`], [`ReadSignal`])
//! - `router` - Navigation engine, history backends and plugin host
//! - `full` (default) - Everything above
//!
//! ## Quick Example
//!
//! ```rust
//! use reinhardt_spa::prelude::*;
//!
//! # futures::executor::block_on(async {
//! let router = RouterBuilder::new(RouterConfig::new("#app"))
//! 	.route(RouteDefinition::new("/", Component::new("Home").template("<h1>Home</h1>")))
//! 	.route(
//! 		RouteDefinition::new("/users/:id", Component::new("User").template("<h1>User</h1>"))
//! 			.name("user"),
//! 	)
//! 	.launch()
//! 	.await
//! 	.unwrap();
//!
//! router.navigate(NavigationTarget::named("user").param("id", "3")).await;
//! assert_eq!(router.current_params().get()["id"], "3");
//! # });
//! ```

#[cfg(feature = "router")]
pub mod router;

#[cfg(feature = "reactive")]
pub use reinhardt_reactive::{ReadSignal, Signal, WatchHandle};

#[cfg(feature = "router")]
pub use reinhardt_router::{
	Component, ComponentSource, Guard, GuardOutcome, NavigationTarget, RouteDefinition,
	RouteLocation, Router, RouterBuilder, RouterConfig, RouterError, RouterEvent, RouterMode,
	RouterResult,
};

/// Common imports for applications.
pub mod prelude {
	#[cfg(feature = "reactive")]
	pub use crate::{ReadSignal, Signal};

	#[cfg(feature = "router")]
	pub use crate::router::{
		Component, ComponentSource, Guard, GuardOutcome, NavigationTarget, RouteDefinition,
		Router, RouterBuilder, RouterConfig, RouterMode, RouterPlugin,
	};
}
