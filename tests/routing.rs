//! Router resolution and the menu manager.

use std::cell::RefCell;
use std::rc::Rc;

use spark_menu::{
    Button, ClickKind, InteractionEvent, InteractionResult, MemoryPresenter, MenuError, MenuManager, RawInteraction, Router,
    RuntimeConfig, TickScheduler, ViewRuntime, ViewerId, Window, WindowType,
};

const VIEWER: ViewerId = ViewerId(11);

fn window(id: &str) -> Rc<Window> {
    let title = id.to_string();
    Window::builder(id)
        .rows(1)
        .title(move |_| title.clone())
        .construct(|cx| {
            cx.child(0, Button::builder("close").interact(|_, _| InteractionResult::cancel()).build())?;
            Ok(())
        })
        .build()
        .unwrap()
}

fn main_router() -> Rc<Router> {
    Router::builder("main")
        .entry("home")
        .route(Router::builder("home").window(window("home")))
        .route(
            Router::builder("a")
                .window(window("a"))
                .route(Router::builder("b").window(window("b"))),
        )
        .build()
        .unwrap()
}

fn setup() -> (Rc<TickScheduler>, MemoryPresenter, ViewRuntime) {
    let scheduler = Rc::new(TickScheduler::new());
    let presenter = MemoryPresenter::new();
    let rt = ViewRuntime::builder(VIEWER, scheduler.clone(), Rc::new(presenter.clone())).build();
    (scheduler, presenter, rt)
}

// =============================================================================
// Router
// =============================================================================

#[test]
fn test_router_opens_nested_window() {
    let (_scheduler, presenter, rt) = setup();
    let router = main_router();

    let opened = router.open(&rt, &["a", "b"]).unwrap();
    assert_eq!(opened.id(), "b");
    assert_eq!(presenter.surface(VIEWER).and_then(|surface| surface.window).map(|w| w.id).as_deref(), Some("b"));
    assert_eq!(presenter.title(VIEWER).as_deref(), Some("b"));
    assert!(rt.is_mounted("close"));
}

#[test]
fn test_missing_route_opens_nothing() {
    let (_scheduler, presenter, rt) = setup();
    let router = main_router();

    let result = router.open(&rt, &["a", "missing"]);
    assert!(matches!(
        result,
        Err(MenuError::RouteNotFound { ref segment, .. }) if segment == "missing"
    ));
    assert!(!presenter.is_open(VIEWER));
    assert_eq!(rt.root(), None);
}

#[test]
fn test_reopening_replaces_window() {
    let (_scheduler, presenter, rt) = setup();
    let router = main_router();

    router.open(&rt, &[]).unwrap();
    assert_eq!(rt.title().as_deref(), Some("home"));

    router.open(&rt, &["a"]).unwrap();
    assert_eq!(rt.title().as_deref(), Some("a"));
    assert_eq!(rt.component_count(), 2);
    assert_eq!(presenter.title(VIEWER).as_deref(), Some("a"));
}

#[test]
fn test_window_larger_than_config_rejected() {
    let presenter = MemoryPresenter::new();
    let config = RuntimeConfig::from_toml_str("max_rows = 2").unwrap();
    let rt = ViewRuntime::builder(VIEWER, Rc::new(TickScheduler::new()), Rc::new(presenter.clone()))
        .config(config)
        .build();

    let tall = Window::builder("tall").rows(4).build().unwrap();
    assert!(matches!(rt.open_window(tall), Err(MenuError::InvalidWindowSize { size: 36, .. })));

    let hopper = Window::builder("hopper").window_type(WindowType::Hopper).build().unwrap();
    rt.open_window(hopper).unwrap();
    assert_eq!(rt.window_size(), 5);
}

#[test]
fn test_router_callbacks_run_inner_first() {
    let (_scheduler, _presenter, rt) = setup();
    let calls = Rc::new(RefCell::new(Vec::new()));

    let (outer, inner, window_calls) = (calls.clone(), calls.clone(), calls.clone());
    let shop = Window::builder("shop")
        .rows(1)
        .interact(move |_, _| {
            window_calls.borrow_mut().push("window");
            InteractionResult::propagate()
        })
        .build()
        .unwrap();
    let router = Router::builder("main")
        .interact(move |_, _| {
            outer.borrow_mut().push("main");
            InteractionResult::cancel()
        })
        .route(Router::builder("shop").window(shop).interact(move |_, _| {
            inner.borrow_mut().push("shop");
            InteractionResult::propagate()
        }))
        .build()
        .unwrap();

    router.open(&rt, &["shop"]).unwrap();
    let result = rt.dispatch(&InteractionEvent::new(VIEWER, 3, ClickKind::Primary));
    assert!(result.is_cancelled());
    assert_eq!(*calls.borrow(), vec!["window", "shop", "main"]);

    // A window opened directly carries no router callbacks.
    calls.borrow_mut().clear();
    rt.open_window(window("plain")).unwrap();
    assert!(!rt.dispatch(&InteractionEvent::new(VIEWER, 3, ClickKind::Primary)).is_cancelled());
    assert!(calls.borrow().is_empty());
}

// =============================================================================
// Manager
// =============================================================================

#[test]
fn test_manager_open_dispatch_close() {
    let presenter = MemoryPresenter::new();
    let manager = MenuManager::new(Rc::new(TickScheduler::new()), Rc::new(presenter.clone()));
    manager.register(main_router()).unwrap();
    assert!(matches!(
        manager.register(main_router()),
        Err(MenuError::DuplicateRoute { ref route, .. }) if route == "main"
    ));

    let first = manager.open(VIEWER, "main", &["a"]).unwrap();
    assert_eq!(first.title().as_deref(), Some("a"));

    assert!(manager.dispatch(&RawInteraction::new(VIEWER, 0, ClickKind::Primary)).is_cancelled());
    assert!(!manager.dispatch(&RawInteraction::new(VIEWER, -999, ClickKind::Primary)).is_cancelled());
    assert!(!manager.dispatch(&RawInteraction::new(VIEWER, 40, ClickKind::Primary)).is_cancelled());
    assert!(!manager.dispatch(&RawInteraction::new(ViewerId(99), 0, ClickKind::Primary)).is_cancelled());

    let second = manager.open(VIEWER, "main", &["a", "b"]).unwrap();
    assert!(first.is_closed());
    assert!(!second.is_closed());
    assert_eq!(manager.open_count(), 1);

    assert!(manager.close(VIEWER));
    assert!(!manager.close(VIEWER));
    assert!(second.is_closed());
    assert!(!presenter.is_open(VIEWER));
}

#[test]
fn test_manager_open_errors() {
    let presenter = MemoryPresenter::new();
    let manager = MenuManager::new(Rc::new(TickScheduler::new()), Rc::new(presenter.clone()));
    manager.register(main_router()).unwrap();

    assert!(matches!(manager.open(VIEWER, "shop", &[]), Err(MenuError::UnknownMenu(ref name)) if name == "shop"));

    manager.open(VIEWER, "main", &[]).unwrap();
    assert_eq!(presenter.close_count(VIEWER), 0);
    assert!(manager.open(VIEWER, "main", &["nope"]).is_err());
    assert!(manager.runtime(VIEWER).is_none());
    assert!(!presenter.is_open(VIEWER));
    assert_eq!(presenter.close_count(VIEWER), 1);
}

#[test]
fn test_manager_keeps_viewers_apart() {
    let presenter = MemoryPresenter::new();
    let manager = MenuManager::new(Rc::new(TickScheduler::new()), Rc::new(presenter.clone()));
    manager.register(main_router()).unwrap();

    let alice = manager.open(ViewerId(1), "main", &["a"]).unwrap();
    let bob = manager.open(ViewerId(2), "main", &["a", "b"]).unwrap();
    assert_ne!(alice.id(), bob.id());
    assert_eq!(manager.open_count(), 2);

    manager.close_all();
    assert!(alice.is_closed() && bob.is_closed());
    assert_eq!(manager.open_count(), 0);
}
