//! The transition pipeline.

use super::Router;
use crate::error::RouterError;
use crate::events::{
	ErrorContext, EventPayload, NavigationContext, RenderContext, RouterEvent, ScrollContext,
	TransitionContext,
};
use crate::guard::{GuardOutcome, GuardPipeline};
use crate::location::{NavigationTarget, RouteLocation};
use crate::render::{MountedComponent, resolve_view_slot};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use tracing::Instrument;

/// How a transition was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NavigationType {
	/// `navigate()` adding a history entry.
	Push,
	/// `navigate()` replacing the current entry.
	Replace,
	/// The initial navigation of `start()`.
	Initial,
	/// A browser back/forward or hash change.
	Pop,
}

impl NavigationType {
	fn is_programmatic(self) -> bool {
		self != NavigationType::Pop
	}

	/// Redirects out of these transitions replace the history entry.
	fn redirects_replace(self) -> bool {
		self != NavigationType::Push
	}
}

#[derive(Debug)]
enum TransitionOutcome {
	Completed,
	Unchanged,
	Aborted,
	Superseded,
	Redirect(NavigationTarget),
}

struct TransitionError {
	error: RouterError,
	to: Option<Rc<RouteLocation>>,
}

impl TransitionError {
	fn new(error: RouterError, to: Option<&Rc<RouteLocation>>) -> Self {
		Self {
			error,
			to: to.cloned(),
		}
	}
}

type TransitionResult = Result<TransitionOutcome, TransitionError>;

impl Router {
	pub(crate) fn run_navigation(
		&self,
		target: NavigationTarget,
		navigation_type: NavigationType,
		depth: usize,
	) -> LocalBoxFuture<'static, bool> {
		let router = self.clone();
		async move {
			if router.is_destroyed() {
				tracing::warn!(to = %target, "Navigation on a destroyed router ignored");
				return false;
			}

			let inner = &router.inner;
			let programmatic = navigation_type.is_programmatic();
			let id = inner.navigation.begin(programmatic);
			let span = tracing::debug_span!("navigation", id, to = %target, kind = ?navigation_type);
			let result = router
				.transition(id, &target, navigation_type)
				.instrument(span)
				.await;
			inner.navigation.finish(programmatic);

			match result {
				Ok(TransitionOutcome::Completed) | Ok(TransitionOutcome::Unchanged) => true,
				Ok(TransitionOutcome::Superseded) => {
					tracing::debug!(id, to = %target, "Navigation superseded");
					false
				}
				Ok(TransitionOutcome::Aborted) => {
					tracing::debug!(id, to = %target, "Navigation aborted");
					router.restore_url(navigation_type);
					false
				}
				Ok(TransitionOutcome::Redirect(next)) => {
					if depth >= inner.config.max_redirects {
						let error = RouterError::RedirectLimit {
							limit: inner.config.max_redirects,
							target: next.to_string(),
						};
						router.fail(&target, TransitionError::new(error, None)).await;
						router.restore_url(navigation_type);
						return false;
					}
					tracing::debug!(from = %target, to = %next, "Redirecting");
					let replace = navigation_type.redirects_replace() || next.is_replace();
					let next_type = if replace {
						NavigationType::Replace
					} else {
						NavigationType::Push
					};
					router
						.run_navigation(next.with_replace(replace), next_type, depth + 1)
						.await;
					false
				}
				Err(error) => {
					router.fail(&target, error).await;
					router.restore_url(navigation_type);
					false
				}
			}
		}
		.boxed_local()
	}

	async fn fail(&self, target: &NavigationTarget, error: TransitionError) {
		let context = ErrorContext {
			error: error.error,
			target: Some(target.to_string()),
			to: error.to,
			from: self.inner.state.current_route.get(),
		};
		self.report_error(context).await;
	}

	/// Points the browser back at the committed location after a refused
	/// back/forward transition.
	fn restore_url(&self, navigation_type: NavigationType) {
		if navigation_type != NavigationType::Pop {
			return;
		}
		let Some(current) = self.inner.state.current_route.get() else {
			return;
		};
		let url = self.inner.config.url_for(&current.full_path);
		if let Err(e) = self.inner.history.replace(&url) {
			self.inner.error_handler().warn(&e.to_string());
		}
	}

	/// A newer transition has started, or the router was destroyed.
	fn is_superseded(&self, id: u64) -> bool {
		!self.inner.navigation.is_current(id) || self.is_destroyed()
	}

	/// A newer transition has torn down the view after this one did, or the
	/// router was destroyed. Checked once this transition has unmounted.
	fn lost_render(&self, id: u64) -> bool {
		!self.inner.navigation.owns_render(id) || self.is_destroyed()
	}

	async fn transition(
		&self,
		id: u64,
		target: &NavigationTarget,
		navigation_type: NavigationType,
	) -> TransitionResult {
		let inner = &self.inner;

		// Match
		let resolved = inner.registry.borrow().resolve(target);
		let to = Rc::new(resolved.map_err(|e| TransitionError::new(e, None))?);
		let from = inner.state.current_route.get();
		// While another transition runs, the committed route may be about to
		// change; the check is repeated inside the render section.
		if !inner.navigation.has_concurrent()
			&& is_same_destination(from.as_deref(), &to)
			&& inner.state.current_view.get().is_some()
		{
			tracing::debug!(path = %to.full_path, "Already at destination");
			return Ok(TransitionOutcome::Unchanged);
		}
		let Some(route) = to.matched.clone() else {
			return Err(TransitionError::new(
				RouterError::NotFound(to.path.clone()),
				Some(&to),
			));
		};

		// Guards
		let guards: Vec<_> = inner.guards.borrow().iter().map(|(_, g)| g.clone()).collect();
		let outcome = GuardPipeline::new(Rc::clone(&inner.events), guards)
			.run(&to, from.as_ref())
			.await
			.map_err(|e| TransitionError::new(e, Some(&to)))?;
		match outcome {
			GuardOutcome::Continue => {}
			GuardOutcome::Abort => return Ok(TransitionOutcome::Aborted),
			GuardOutcome::Redirect(next) => return Ok(TransitionOutcome::Redirect(next)),
		}
		if self.is_superseded(id) {
			return Ok(TransitionOutcome::Superseded);
		}

		if let (Some(from), Some(position)) = (&from, inner.history.scroll_position()) {
			inner
				.scroll_positions
				.borrow_mut()
				.insert(from.path.clone(), position);
		}

		// Resolve components
		let context = Rc::new(NavigationContext::new(Rc::clone(&to), from.clone()));
		inner
			.events
			.emit(RouterEvent::BeforeResolve, EventPayload::Navigation(Rc::clone(&context)))
			.await;
		if context.is_cancelled() {
			return Ok(TransitionOutcome::Aborted);
		}
		if let Some(next) = context.redirect_target() {
			return Ok(TransitionOutcome::Redirect(next));
		}

		let layout_source = route.layout().cloned().or_else(|| inner.layout.clone());
		let components = inner
			.resolver
			.resolve_route(route.path(), layout_source.as_ref(), Some(route.component()))
			.await
			.map_err(|e| TransitionError::new(e, Some(&to)))?;
		context.set_resolved(components.clone());
		inner
			.events
			.emit(RouterEvent::AfterResolve, EventPayload::Navigation(Rc::clone(&context)))
			.await;
		if self.is_superseded(id) {
			return Ok(TransitionOutcome::Superseded);
		}

		// Unmount
		let render_guard = inner.render_lock.lock().await;
		if self.is_superseded(id) {
			return Ok(TransitionOutcome::Superseded);
		}
		let committed = inner.state.current_route.get();
		let restoring = is_same_destination(committed.as_deref(), &to);
		if restoring && inner.state.current_view.get().is_some() {
			tracing::debug!(path = %to.full_path, "Already at destination");
			return Ok(TransitionOutcome::Unchanged);
		}
		// An abandoned transition may have left the committed route unrendered;
		// rendering it again keeps its original origin.
		let from = if restoring {
			inner.state.previous_route.get()
		} else {
			committed
		};
		let root = inner.renderer.mount_point(&inner.config.mount).ok_or_else(|| {
			TransitionError::new(
				RouterError::MissingMountPoint(inner.config.mount.clone()),
				Some(&to),
			)
		})?;

		let keep_layout = components.layout.is_some()
			&& inner.state.current_layout.get().is_some()
			&& matches!(
				(&*inner.mounted_layout_source.borrow(), &layout_source),
				(Some(mounted), Some(next)) if mounted.same_as(next)
			);
		inner.navigation.claim_render(id);
		self.unmount_previous(keep_layout);
		drop(render_guard);

		if let (false, Some(from)) = (restoring, &from) {
			if let Some(hook) = from.matched.as_ref().and_then(|r| r.after_leave()) {
				hook(&to, Some(from.as_ref()));
			}
		}
		let transition = Rc::new(TransitionContext {
			to: Rc::clone(&to),
			from: from.clone(),
		});
		inner
			.events
			.emit(RouterEvent::AfterLeave, EventPayload::Transition(Rc::clone(&transition)))
			.await;
		if self.lost_render(id) {
			return Ok(TransitionOutcome::Superseded);
		}

		// Commit
		let committed = inner.state.current_route.get();
		let previous = inner.state.previous_route.get();
		inner.state.commit(&to, from.clone());

		let render = Rc::new(RenderContext::new(
			Rc::clone(&to),
			from.clone(),
			components.clone(),
		));
		inner
			.events
			.emit(RouterEvent::BeforeRender, EventPayload::Render(Rc::clone(&render)))
			.await;

		// Render
		let render_guard = inner.render_lock.lock().await;
		if self.lost_render(id) {
			return Ok(TransitionOutcome::Superseded);
		}
		let layout = if keep_layout {
			inner.state.current_layout.get()
		} else {
			match &components.layout {
				Some(component) => {
					let mounted = inner
						.renderer
						.mount(Rc::clone(&root), Rc::clone(component), to.params.clone())
						.await;
					let mounted = match mounted {
						Ok(mounted) => Rc::new(mounted),
						Err(e) => {
							inner.state.rollback(committed, previous);
							return Err(TransitionError::new(e, Some(&to)));
						}
					};
					if self.is_destroyed() {
						self.unmount_quietly(&mounted);
						return Ok(TransitionOutcome::Superseded);
					}
					Some(mounted)
				}
				None => None,
			}
		};
		inner.state.current_layout.set(layout.clone());
		*inner.mounted_layout_source.borrow_mut() = if layout.is_some() {
			layout_source
		} else {
			None
		};

		let slot = match &layout {
			Some(layout) => resolve_view_slot(layout.container(), &inner.config.view_selector),
			None => root,
		};
		let mounted = inner
			.renderer
			.mount(slot, Rc::clone(&components.page), to.params.clone())
			.await;
		let view = match mounted {
			Ok(view) => Rc::new(view),
			Err(e) => {
				if !keep_layout {
					self.discard_layout();
				}
				inner.state.rollback(committed, previous);
				return Err(TransitionError::new(e, Some(&to)));
			}
		};
		if self.is_destroyed() {
			// destroy() already unmounted the published layout.
			self.unmount_quietly(&view);
			return Ok(TransitionOutcome::Superseded);
		}
		inner.state.current_view.set(Some(Rc::clone(&view)));
		render.set_mounted(layout, Some(view));
		self.sync_history(&to, navigation_type);
		drop(render_guard);

		inner
			.events
			.emit(RouterEvent::AfterRender, EventPayload::Render(render))
			.await;
		if self.lost_render(id) {
			return Ok(TransitionOutcome::Superseded);
		}

		// Post-render
		let saved_position = if navigation_type == NavigationType::Pop {
			inner.scroll_positions.borrow().get(&to.path).copied()
		} else {
			None
		};
		let scroll = Rc::new(ScrollContext {
			to: Rc::clone(&to),
			from: from.clone(),
			saved_position,
		});
		inner
			.events
			.emit(RouterEvent::Scroll, EventPayload::Scroll(scroll))
			.await;

		if let Some(hook) = route.after_enter() {
			hook(&to, from.as_deref());
		}
		inner
			.events
			.emit(RouterEvent::AfterEnter, EventPayload::Transition(Rc::clone(&transition)))
			.await;
		inner
			.events
			.emit(RouterEvent::AfterEach, EventPayload::Transition(transition))
			.await;
		if self.lost_render(id) {
			return Ok(TransitionOutcome::Superseded);
		}

		tracing::info!(path = %to.full_path, route = to.name.as_deref().unwrap_or(""), "Navigated");
		Ok(TransitionOutcome::Completed)
	}

	/// Tears down what the next render replaces.
	///
	/// A kept layout only loses its view. A replaced layout is unmounted
	/// together with the view inside it.
	fn unmount_previous(&self, keep_layout: bool) {
		let state = &self.inner.state;
		let layout = state.current_layout.get();
		match layout {
			Some(layout) if !keep_layout => {
				self.unmount_quietly(&layout);
				state.current_layout.set(None);
				*self.inner.mounted_layout_source.borrow_mut() = None;
			}
			_ => {
				if let Some(view) = state.current_view.get() {
					self.unmount_quietly(&view);
				}
			}
		}
		state.current_view.set(None::<Rc<MountedComponent>>);
	}

	/// Unmounts a freshly mounted layout whose page failed to mount.
	fn discard_layout(&self) {
		let state = &self.inner.state;
		if let Some(layout) = state.current_layout.get() {
			self.unmount_quietly(&layout);
		}
		state.current_layout.set(None);
		*self.inner.mounted_layout_source.borrow_mut() = None;
	}

	fn sync_history(&self, to: &RouteLocation, navigation_type: NavigationType) {
		let url = self.inner.config.url_for(&to.full_path);
		if self.inner.history.location() == url {
			return;
		}
		let result = match navigation_type {
			NavigationType::Push => self.inner.history.push(&url),
			NavigationType::Replace | NavigationType::Initial => self.inner.history.replace(&url),
			NavigationType::Pop => Ok(()),
		};
		if let Err(e) = result {
			tracing::warn!(url = %url, error = %e, "History update failed");
			self.inner.error_handler().warn(&e.to_string());
		}
	}
}

fn is_same_destination(current: Option<&RouteLocation>, to: &RouteLocation) -> bool {
	current.is_some_and(|current| current.is_same_destination(to))
}
