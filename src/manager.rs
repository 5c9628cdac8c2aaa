//! Menu Manager - Named menus and one runtime per viewer.
//!
//! The manager owns the shared collaborators (config, scheduler, presenter,
//! content builder), a registry of root routers keyed by name, and the
//! dispatcher routing clicks to each viewer's runtime.
//!
//! # Lifecycle
//!
//! - `open` closes the viewer's current runtime, builds a fresh one and
//!   resolves the path on the named menu
//! - A failed open closes the fresh runtime again; the viewer is left with
//!   no menu
//! - `close` tears the viewer's runtime down synchronously
//!
//! # Example
//!
//! ```ignore
//! let manager = MenuManager::new(scheduler, Rc::new(presenter.clone()));
//! manager.register(main_router)?;
//!
//! let rt = manager.open(ViewerId(1), "main", &["settings"])?;
//! manager.dispatch(&RawInteraction::new(ViewerId(1), 4, ClickKind::Primary));
//! manager.close(ViewerId(1));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::config::RuntimeConfig;
use crate::dispatch::{Dispatcher, RawInteraction};
use crate::error::{MenuError, Result};
use crate::interaction::InteractionResult;
use crate::presentation::{BasicContentBuilder, ContentBuilder, Presenter};
use crate::router::Router;
use crate::runtime::ViewRuntime;
use crate::scheduler::Scheduler;
use crate::types::ViewerId;

pub struct MenuManager {
    config: RuntimeConfig,
    scheduler: Rc<dyn Scheduler>,
    presenter: Rc<dyn Presenter>,
    content: Rc<dyn ContentBuilder>,
    menus: RefCell<HashMap<String, Rc<Router>>>,
    dispatcher: Dispatcher,
}

impl MenuManager {
    pub fn new(scheduler: Rc<dyn Scheduler>, presenter: Rc<dyn Presenter>) -> Self {
        Self {
            config: RuntimeConfig::default(),
            scheduler,
            presenter,
            content: Rc::new(BasicContentBuilder),
            menus: RefCell::new(HashMap::new()),
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_content_builder(mut self, content: Rc<dyn ContentBuilder>) -> Self {
        self.content = content;
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Register a root router under its ID.
    pub fn register(&self, router: Rc<Router>) -> Result<()> {
        let mut menus = self.menus.borrow_mut();
        if menus.contains_key(router.id()) {
            return Err(MenuError::DuplicateRoute {
                route: router.id().to_string(),
                parent: "<manager>".to_string(),
            });
        }
        debug!(menu = %router.id(), "menu registered");
        menus.insert(router.id().to_string(), router);
        Ok(())
    }

    pub fn menu(&self, name: &str) -> Option<Rc<Router>> {
        self.menus.borrow().get(name).cloned()
    }

    /// Open `path` of menu `name` for `viewer`, replacing any open menu.
    pub fn open(&self, viewer: ViewerId, name: &str, path: &[&str]) -> Result<ViewRuntime> {
        let router = self
            .menu(name)
            .ok_or_else(|| MenuError::UnknownMenu(name.to_string()))?;
        self.close(viewer);

        let runtime = ViewRuntime::builder(viewer, self.scheduler.clone(), self.presenter.clone())
            .config(self.config.clone())
            .content_builder(self.content.clone())
            .build();

        if let Err(err) = router.open(&runtime, path) {
            warn!(viewer = %viewer, menu = %name, error = %err, "failed to open menu");
            runtime.close();
            return Err(err);
        }

        self.dispatcher.attach(runtime.clone());
        debug!(viewer = %viewer, menu = %name, "menu opened");
        Ok(runtime)
    }

    /// Close the viewer's menu. Returns false if none was open.
    pub fn close(&self, viewer: ViewerId) -> bool {
        let detached = self.dispatcher.detach(viewer);
        match detached {
            Some(runtime) => {
                runtime.close();
                true
            }
            None => false,
        }
    }

    /// Close every open menu.
    pub fn close_all(&self) {
        let viewers: Vec<ViewerId> = self.dispatcher.viewers();
        for viewer in viewers {
            self.close(viewer);
        }
    }

    pub fn runtime(&self, viewer: ViewerId) -> Option<ViewRuntime> {
        self.dispatcher.runtime(viewer)
    }

    pub fn open_count(&self) -> usize {
        self.dispatcher.len()
    }

    pub fn dispatch(&self, raw: &RawInteraction) -> InteractionResult {
        self.dispatcher.dispatch(raw)
    }
}
