//! Navigation guards and the guard pipeline.
//!
//! A transition passes four stages in order, each able to short-circuit:
//!
//! 1. the cancellable `beforeEach` event
//! 2. global guards, in registration order
//! 3. `beforeLeave` of the route being left
//! 4. `beforeEnter` of the route being entered
//!
//! Guards are awaited one at a time and never run concurrently.

use crate::error::{RouterError, RouterResult};
use crate::events::{EventBus, EventPayload, NavigationContext, RouterEvent};
use crate::location::{NavigationTarget, RouteLocation};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

/// What a guard decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
	/// Let the transition proceed.
	Continue,
	/// Abort the transition.
	Abort,
	/// Abort and navigate to another target.
	Redirect(NavigationTarget),
}

impl From<bool> for GuardOutcome {
	fn from(allow: bool) -> Self {
		if allow { Self::Continue } else { Self::Abort }
	}
}

impl From<()> for GuardOutcome {
	fn from(_: ()) -> Self {
		Self::Continue
	}
}

impl From<&str> for GuardOutcome {
	fn from(path: &str) -> Self {
		Self::Redirect(path.into())
	}
}

impl From<String> for GuardOutcome {
	fn from(path: String) -> Self {
		Self::Redirect(path.into())
	}
}

impl From<NavigationTarget> for GuardOutcome {
	fn from(target: NavigationTarget) -> Self {
		Self::Redirect(target)
	}
}

type GuardFn =
	dyn Fn(Rc<RouteLocation>, Option<Rc<RouteLocation>>) -> LocalBoxFuture<'static, RouterResult<GuardOutcome>>;

/// A navigation guard receiving `(to, from)`.
///
/// ```
/// use reinhardt_router::{Guard, GuardOutcome};
///
/// let requires_auth = Guard::new(|to, _from| {
/// 	if to.meta.get("requiresAuth").is_some() {
/// 		GuardOutcome::from("/login")
/// 	} else {
/// 		GuardOutcome::Continue
/// 	}
/// });
/// # let _ = requires_auth;
/// ```
#[derive(Clone)]
pub struct Guard(Rc<GuardFn>);

impl Guard {
	/// Wraps a synchronous guard. Returning `bool`, `()`, a path or a
	/// [`NavigationTarget`] all convert into a [`GuardOutcome`].
	pub fn new<F, O>(guard: F) -> Self
	where
		F: Fn(&RouteLocation, Option<&RouteLocation>) -> O + 'static,
		O: Into<GuardOutcome>,
	{
		Self(Rc::new(
			move |to: Rc<RouteLocation>, from: Option<Rc<RouteLocation>>| {
				let outcome = guard(&to, from.as_deref()).into();
				futures::future::ready(Ok::<_, RouterError>(outcome)).boxed_local()
			},
		))
	}

	/// Wraps a synchronous guard that may fail.
	pub fn try_new<F>(guard: F) -> Self
	where
		F: Fn(&RouteLocation, Option<&RouteLocation>) -> RouterResult<GuardOutcome> + 'static,
	{
		Self(Rc::new(
			move |to: Rc<RouteLocation>, from: Option<Rc<RouteLocation>>| {
				futures::future::ready(guard(&to, from.as_deref())).boxed_local()
			},
		))
	}

	/// Wraps an asynchronous guard.
	pub fn from_async<F, Fut>(guard: F) -> Self
	where
		F: Fn(Rc<RouteLocation>, Option<Rc<RouteLocation>>) -> Fut + 'static,
		Fut: Future<Output = RouterResult<GuardOutcome>> + 'static,
	{
		Self(Rc::new(
			move |to: Rc<RouteLocation>, from: Option<Rc<RouteLocation>>| {
				guard(to, from).boxed_local()
			},
		))
	}

	/// Runs the guard.
	pub fn check(
		&self,
		to: Rc<RouteLocation>,
		from: Option<Rc<RouteLocation>>,
	) -> LocalBoxFuture<'static, RouterResult<GuardOutcome>> {
		(self.0)(to, from)
	}
}

impl fmt::Debug for Guard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Guard(<fn>)")
	}
}

/// Runs the guard stages for one transition.
pub(crate) struct GuardPipeline {
	events: Rc<EventBus>,
	global: Vec<Guard>,
}

impl GuardPipeline {
	pub(crate) fn new(events: Rc<EventBus>, global: Vec<Guard>) -> Self {
		Self { events, global }
	}

	/// Returns the first non-continue outcome, or `Continue`.
	///
	/// # Errors
	///
	/// A failing guard is reported as [`RouterError::Guard`].
	pub(crate) async fn run(
		&self,
		to: &Rc<RouteLocation>,
		from: Option<&Rc<RouteLocation>>,
	) -> RouterResult<GuardOutcome> {
		let context = Rc::new(NavigationContext::new(Rc::clone(to), from.cloned()));
		self.events
			.emit(RouterEvent::BeforeEach, EventPayload::Navigation(Rc::clone(&context)))
			.await;
		if context.is_cancelled() {
			tracing::debug!(to = %to.full_path, "beforeEach listener cancelled navigation");
			return Ok(GuardOutcome::Abort);
		}
		if let Some(target) = context.redirect_target() {
			tracing::debug!(to = %to.full_path, redirect = %target, "beforeEach listener redirected navigation");
			return Ok(GuardOutcome::Redirect(target));
		}

		for (index, guard) in self.global.iter().enumerate() {
			let outcome = Self::check(guard, to, from, "global").await?;
			if outcome != GuardOutcome::Continue {
				tracing::debug!(guard = index, outcome = ?outcome, "Global guard stopped navigation");
				return Ok(outcome);
			}
		}

		if let Some(guard) = from.and_then(|f| f.matched.as_ref()).and_then(|r| r.before_leave()) {
			let outcome = Self::check(guard, to, from, "beforeLeave").await?;
			if outcome != GuardOutcome::Continue {
				return Ok(outcome);
			}
		}

		if let Some(guard) = to.matched.as_ref().and_then(|r| r.before_enter()) {
			let outcome = Self::check(guard, to, from, "beforeEnter").await?;
			if outcome != GuardOutcome::Continue {
				return Ok(outcome);
			}
		}

		Ok(GuardOutcome::Continue)
	}

	async fn check(
		guard: &Guard,
		to: &Rc<RouteLocation>,
		from: Option<&Rc<RouteLocation>>,
		stage: &str,
	) -> RouterResult<GuardOutcome> {
		guard
			.check(Rc::clone(to), from.cloned())
			.await
			.map_err(|e| match e {
				RouterError::Guard(_) => e,
				other => RouterError::Guard(format!("{} guard: {}", stage, other)),
			})
	}
}
