//! Integration tests for the navigation pipeline
//!
//! These tests verify:
//! 1. Static, parameterized, wildcard and named navigation
//! 2. Location state and history synchronization
//! 3. Event order of a completed transition
//! 4. Error reporting for unmatched paths
//! 5. Overlapping navigations

mod utils;

use futures::channel::oneshot;
use reinhardt_router::{
	Guard, GuardOutcome, HistoryBackend, NavigationTarget, RouteDefinition, RouterConfig,
	RouterError, RouterEvent,
};
use rstest::rstest;
use std::cell::RefCell;
use std::rc::Rc;
use utils::{
	Harness, current_path, harness, harness_with, hold_event, page, record_events, standard_routes,
	view_markup,
};

#[rstest]
#[tokio::test]
async fn test_start_renders_initial_location() {
	// Arrange
	let Harness {
		router,
		history,
		renderer,
		..
	} = harness();
	let ready = record_events(&router, &[RouterEvent::Ready]);

	// Act
	let navigated = router.start().await;

	// Assert
	assert!(navigated);
	assert!(router.is_ready().get());
	assert!(router.is_started());
	assert!(history.is_listening());
	assert_eq!(current_path(&router).as_deref(), Some("/"));
	assert_eq!(renderer.rendered("#app").as_deref(), Some("<h1>Home</h1>"));
	assert_eq!(*ready.borrow(), vec!["ready"]);
	assert_eq!(history.entries(), vec!["/"]);
}

#[rstest]
#[tokio::test]
async fn test_navigate_to_static_route() {
	// Arrange
	let Harness {
		router,
		history,
		renderer,
		..
	} = harness();
	router.start().await;

	// Act
	let navigated = router.navigate("/about").await;

	// Assert
	assert!(navigated);
	let current = router.current_route().get().unwrap();
	assert_eq!(current.path, "/about");
	assert_eq!(current.name.as_deref(), Some("about"));
	assert!(current.params.is_empty());
	assert_eq!(current_path_of_previous(&router).as_deref(), Some("/"));
	assert_eq!(history.entries(), vec!["/", "/about"]);
	assert_eq!(renderer.rendered("#app").as_deref(), Some("<h1>About</h1>"));
}

fn current_path_of_previous(router: &reinhardt_router::Router) -> Option<String> {
	router.previous_route().get().map(|location| location.path.clone())
}

#[rstest]
#[case("/users/42", "42")]
#[case("/users/john%20doe", "john doe")]
#[case("/users/caf%C3%A9", "café")]
#[tokio::test]
async fn test_params_are_decoded(#[case] path: &str, #[case] expected: &str) {
	let Harness { router, .. } = harness();
	router.start().await;

	assert!(router.navigate(path).await);

	assert_eq!(
		router.current_params().get().get("id").map(String::as_str),
		Some(expected)
	);
}

#[rstest]
#[tokio::test]
async fn test_wildcard_captures_remainder() {
	let Harness { router, .. } = harness();
	router.start().await;

	assert!(router.navigate("/files/docs/guide.md").await);

	let current = router.current_route().get().unwrap();
	assert_eq!(current.name.as_deref(), Some("files"));
	assert_eq!(current.param("pathMatch"), Some("docs/guide.md"));
}

#[rstest]
#[tokio::test]
async fn test_query_is_published() {
	let Harness { router, history, .. } = harness();
	router.start().await;

	assert!(router.navigate("/about?tab=team&page=2").await);

	let query = router.current_query().get();
	assert_eq!(query.get("tab").map(String::as_str), Some("team"));
	assert_eq!(query.get("page").map(String::as_str), Some("2"));
	assert_eq!(history.location(), "/about?page=2&tab=team");
}

#[rstest]
#[tokio::test]
async fn test_identical_navigation_is_a_no_op() {
	// Arrange
	let Harness {
		router,
		history,
		renderer,
		..
	} = harness();
	router.start().await;
	router.navigate("/about").await;
	let events = record_events(&router, &RouterEvent::ALL);

	// Act
	let navigated = router.navigate("/about").await;

	// Assert
	assert!(navigated);
	assert_eq!(renderer.mount_count("About"), 1);
	assert_eq!(history.len(), 2);
	assert!(events.borrow().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_navigate_by_name() {
	let Harness { router, .. } = harness();
	router.start().await;

	let navigated = router
		.navigate(NavigationTarget::named("user").param("id", "7").query("tab", "posts"))
		.await;

	assert!(navigated);
	let current = router.current_route().get().unwrap();
	assert_eq!(current.full_path, "/users/7?tab=posts");
}

#[rstest]
#[tokio::test]
async fn test_navigate_by_name_without_params_fails() {
	let Harness { router, errors, .. } = harness();
	router.start().await;

	let navigated = router.navigate(NavigationTarget::named("user")).await;

	assert!(!navigated);
	assert_eq!(current_path(&router).as_deref(), Some("/"));
	assert!(errors.errors()[0].starts_with("Missing parameter: id"));
}

#[rstest]
#[tokio::test]
async fn test_replace_keeps_history_length() {
	let Harness { router, history, .. } = harness();
	router.start().await;

	assert!(router.navigate(NavigationTarget::from("/about").replace()).await);

	assert_eq!(history.entries(), vec!["/about"]);
}

#[rstest]
#[tokio::test]
async fn test_resolve_does_not_navigate() {
	let Harness { router, .. } = harness();
	router.start().await;

	let location = router.resolve("/users/9").unwrap();

	assert_eq!(location.param("id"), Some("9"));
	assert_eq!(current_path(&router).as_deref(), Some("/"));
	assert_eq!(
		router.resolve("/missing").unwrap_err(),
		RouterError::NotFound("/missing".to_string())
	);
}

#[rstest]
#[tokio::test]
async fn test_after_each_reports_to_and_from_once() {
	// Arrange
	let Harness { router, .. } = harness();
	router.start().await;
	let seen = Rc::new(RefCell::new(Vec::new()));
	let seen_clone = Rc::clone(&seen);
	let _handle = router.on_after_each(move |to, from| {
		seen_clone
			.borrow_mut()
			.push((to.path.clone(), from.map(|f| f.path.clone())));
	});

	// Act
	router.navigate("/about").await;

	// Assert
	assert_eq!(
		*seen.borrow(),
		vec![("/about".to_string(), Some("/".to_string()))]
	);
}

#[rstest]
#[tokio::test]
async fn test_events_follow_pipeline_order() {
	// Arrange
	let hooks = Rc::new(RefCell::new(Vec::new()));
	let leave_log = Rc::clone(&hooks);
	let enter_log = Rc::clone(&hooks);
	let routes = vec![
		RouteDefinition::new("/", page("Home"))
			.after_leave(move |_to, _from| leave_log.borrow_mut().push("home:afterLeave")),
		RouteDefinition::new("/about", page("About"))
			.after_enter(move |_to, _from| enter_log.borrow_mut().push("about:afterEnter")),
	];
	let Harness { router, .. } = harness_with(
		RouterConfig::new("#app"),
		Default::default(),
		routes,
	);
	router.start().await;
	let events = record_events(&router, &RouterEvent::ALL);

	// Act
	router.navigate("/about").await;

	// Assert
	assert_eq!(
		*events.borrow(),
		vec![
			"beforeEach",
			"beforeResolve",
			"afterResolve",
			"afterLeave",
			"beforeRender",
			"afterRender",
			"scroll",
			"afterEnter",
			"afterEach",
		]
	);
	assert_eq!(*hooks.borrow(), vec!["home:afterLeave", "about:afterEnter"]);
}

#[rstest]
#[tokio::test]
async fn test_unmatched_path_reports_not_found() {
	// Arrange
	let Harness { router, history, errors, .. } = harness();
	router.start().await;
	let reported = Rc::new(RefCell::new(Vec::new()));
	let reported_clone = Rc::clone(&reported);
	let _handle = router.on_error(move |context| {
		reported_clone.borrow_mut().push(context.message());
	});

	// Act
	let navigated = router.navigate("/missing").await;

	// Assert
	assert!(!navigated);
	assert_eq!(current_path(&router).as_deref(), Some("/"));
	assert_eq!(*reported.borrow(), vec!["Route not found: /missing"]);
	assert_eq!(errors.errors(), vec!["Route not found: /missing"]);
	assert_eq!(history.entries(), vec!["/"]);
}

#[rstest]
#[tokio::test]
async fn test_catch_all_route_handles_unmatched_paths() {
	let mut routes = standard_routes();
	routes.push(RouteDefinition::new("*", page("NotFound")).name("not-found"));
	let Harness { router, .. } = harness_with(RouterConfig::new("#app"), Default::default(), routes);
	router.start().await;

	assert!(router.navigate("/nowhere/at/all").await);

	let current = router.current_route().get().unwrap();
	assert_eq!(current.name.as_deref(), Some("not-found"));
	assert_eq!(current.param("pathMatch"), Some("nowhere/at/all"));
}

#[rstest]
#[tokio::test]
async fn test_later_navigation_supersedes_earlier_one() {
	// Arrange
	let (release, gate) = oneshot::channel::<()>();
	let gate = Rc::new(RefCell::new(Some(gate)));
	let mut routes = standard_routes();
	routes.push(RouteDefinition::new("/slow", page("Slow")).before_enter(Guard::from_async(
		move |_to, _from| {
			let gate = gate.borrow_mut().take();
			async move {
				if let Some(gate) = gate {
					let _ = gate.await;
				}
				Ok::<_, RouterError>(GuardOutcome::Continue)
			}
		},
	)));
	let Harness {
		router,
		history,
		renderer,
		..
	} = harness_with(RouterConfig::new("#app"), Default::default(), routes);
	router.start().await;

	// Act
	let (slow, fast, _) = futures::join!(router.navigate("/slow"), router.navigate("/about"), async move {
		let _ = release.send(());
	});

	// Assert
	assert!(!slow);
	assert!(fast);
	assert_eq!(current_path(&router).as_deref(), Some("/about"));
	assert_eq!(renderer.mount_count("Slow"), 0);
	assert_eq!(history.entries(), vec!["/", "/about"]);
	assert_eq!(view_markup(&router).as_deref(), Some("<h1>About</h1>"));
}

#[rstest]
#[tokio::test]
async fn test_return_to_committed_route_while_leaving_it() {
	// Arrange
	let Harness {
		router,
		history,
		renderer,
		..
	} = harness();
	router.start().await;
	let release = hold_event(&router, RouterEvent::AfterLeave);

	// Act
	let (first, later) = futures::join!(router.navigate("/about"), async {
		let later = router.navigate("/").await;
		let _ = release.send(());
		later
	});

	// Assert
	assert!(!first);
	assert!(later);
	assert_eq!(current_path(&router).as_deref(), Some("/"));
	assert_eq!(view_markup(&router).as_deref(), Some("<h1>Home</h1>"));
	assert_eq!(renderer.mount_count("About"), 0);
	assert_eq!(history.entries(), vec!["/"]);
}

#[rstest]
#[tokio::test]
async fn test_later_navigation_wins_during_render() {
	// Arrange
	let Harness {
		router,
		history,
		renderer,
		..
	} = harness();
	router.start().await;
	let release = hold_event(&router, RouterEvent::BeforeRender);

	// Act
	let (first, later) = futures::join!(router.navigate("/about"), async {
		let later = router.navigate("/users/1").await;
		let _ = release.send(());
		later
	});

	// Assert
	assert!(!first);
	assert!(later);
	assert_eq!(current_path(&router).as_deref(), Some("/users/1"));
	assert_eq!(view_markup(&router).as_deref(), Some("<h1>User</h1>"));
	assert_eq!(renderer.mount_count("About"), 0);
	assert_eq!(history.entries(), vec!["/", "/users/1"]);
	assert_eq!(history.location(), "/users/1");
}

#[rstest]
#[tokio::test]
async fn test_aborted_later_navigation_leaves_earlier_render() {
	// Arrange
	let mut routes = standard_routes();
	routes.push(
		RouteDefinition::new("/locked", page("Locked")).before_enter(Guard::new(|_to, _from| false)),
	);
	let Harness { router, history, .. } =
		harness_with(RouterConfig::new("#app"), Default::default(), routes);
	router.start().await;
	let release = hold_event(&router, RouterEvent::AfterLeave);

	// Act
	let (first, later) = futures::join!(router.navigate("/about"), async {
		let later = router.navigate("/locked").await;
		let _ = release.send(());
		later
	});

	// Assert
	assert!(first);
	assert!(!later);
	assert_eq!(current_path(&router).as_deref(), Some("/about"));
	assert_eq!(view_markup(&router).as_deref(), Some("<h1>About</h1>"));
	assert_eq!(history.entries(), vec!["/", "/about"]);
}

#[rstest]
#[tokio::test]
async fn test_destroy_during_guard_discards_navigation() {
	// Arrange
	let (release, gate) = oneshot::channel::<()>();
	let gate = Rc::new(RefCell::new(Some(gate)));
	let mut routes = standard_routes();
	routes.push(RouteDefinition::new("/slow", page("Slow")).before_enter(Guard::from_async(
		move |_to, _from| {
			let gate = gate.borrow_mut().take();
			async move {
				if let Some(gate) = gate {
					let _ = gate.await;
				}
				Ok::<_, RouterError>(GuardOutcome::Continue)
			}
		},
	)));
	let Harness { router, renderer, .. } =
		harness_with(RouterConfig::new("#app"), Default::default(), routes);
	router.start().await;

	// Act
	let (navigated, _) = futures::join!(router.navigate("/slow"), async {
		router.destroy();
		let _ = release.send(());
	});

	// Assert
	assert!(!navigated);
	assert!(router.current_view().get().is_none());
	assert_eq!(renderer.mount_count("Slow"), 0);
}

#[rstest]
#[tokio::test]
async fn test_destroy_during_render_discards_navigation() {
	// Arrange
	let Harness { router, renderer, .. } = harness();
	router.start().await;
	let release = hold_event(&router, RouterEvent::BeforeRender);

	// Act
	let (navigated, _) = futures::join!(router.navigate("/about"), async {
		router.destroy();
		let _ = release.send(());
	});

	// Assert
	assert!(!navigated);
	assert!(router.current_view().get().is_none());
	assert_eq!(renderer.mount_count("About"), 0);
	assert_eq!(renderer.unmount_count("Home"), 1);
}

#[rstest]
#[tokio::test]
async fn test_destroyed_router_ignores_navigation() {
	let Harness {
		router,
		history,
		renderer,
		..
	} = harness();
	router.start().await;

	router.destroy();

	assert!(!router.navigate("/about").await);
	assert!(!history.is_listening());
	assert!(router.current_view().get().is_none());
	assert!(!router.is_ready().get());
	assert_eq!(renderer.unmount_count("Home"), 1);
	assert!(!router.start().await);
}
