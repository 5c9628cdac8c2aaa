//! Router - Navigation tree of menus.
//!
//! A router is a node with a stable ID, a map of child routes, an optional
//! window and an optional entry route. Paths are resolved one segment at a
//! time from the router `open` is called on.
//!
//! # Resolution
//!
//! - Every segment must name a child route, or `RouteNotFound`
//! - An empty path follows the entry route first, if there is one
//! - Once the path is consumed, a router with a window opens it; a router
//!   without one follows its entry route; with neither, `NoWindow`
//!
//! Nothing is opened unless the whole path resolves.
//!
//! # Interaction
//!
//! Router callbacks run for every click on the opened view, after the
//! component and window callbacks: the router owning the window first, then
//! its ancestors up to the root.
//!
//! # Example
//!
//! ```ignore
//! let router = Router::builder("main")
//!     .entry("counter")
//!     .route(Router::builder("counter").window(counter_window()?))
//!     .route(
//!         Router::builder("settings")
//!             .window(settings_window()?)
//!             .route(Router::builder("audio").window(audio_window()?)),
//!     )
//!     .build()?;
//!
//! router.open(&rt, &["settings", "audio"])?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::component::Window;
use crate::error::{MenuError, Result};
use crate::interaction::{InteractionCallback, InteractionEvent, InteractionResult};
use crate::runtime::ViewRuntime;

pub struct Router {
    id: String,
    parent: Weak<Router>,
    routes: HashMap<String, Rc<Router>>,
    order: Vec<String>,
    window: Option<Rc<Window>>,
    entry: Option<String>,
    interact: Vec<InteractionCallback>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("id", &self.id)
            .field("routes", &self.order)
            .field("window", &self.window.as_ref().map(|window| window.id()))
            .field("entry", &self.entry)
            .field("interact", &self.interact.len())
            .finish()
    }
}

impl Router {
    pub fn builder(id: impl Into<String>) -> RouterBuilder {
        RouterBuilder {
            id: id.into(),
            window: None,
            entry: None,
            routes: Vec::new(),
            interact: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Child route with this ID.
    pub fn sub_route(&self, id: &str) -> Option<Rc<Router>> {
        self.routes.get(id).cloned()
    }

    /// Parent router; `None` at the root.
    pub fn parent(&self) -> Option<Rc<Router>> {
        self.parent.upgrade()
    }

    pub fn window(&self) -> Option<&Rc<Window>> {
        self.window.as_ref()
    }

    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    /// Child route IDs in declaration order.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Full path of this router from the root, root excluded.
    pub fn path(&self) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = self.parent();
        if current.is_some() {
            path.push(self.id.clone());
        }
        while let Some(router) = current {
            current = router.parent();
            if current.is_some() {
                path.push(router.id.clone());
            }
        }
        path.reverse();
        path
    }

    /// Window `path` leads to, without opening it.
    pub fn resolve(&self, path: &[&str]) -> Result<Rc<Window>> {
        self.resolve_route(path).map(|(_, window)| window)
    }

    /// Router owning the window `path` leads to, and that window.
    fn resolve_route(&self, path: &[&str]) -> Result<(&Router, Rc<Window>)> {
        let joined = || path.join("/");
        let mut current = self;

        for segment in path {
            current = current.routes.get(*segment).ok_or_else(|| MenuError::RouteNotFound {
                segment: segment.to_string(),
                path: joined(),
            })?;
        }

        let mut follow_entry = path.is_empty();
        loop {
            if !follow_entry {
                if let Some(window) = &current.window {
                    return Ok((current, window.clone()));
                }
            }
            follow_entry = false;
            match &current.entry {
                Some(entry) => {
                    current = current.routes.get(entry).ok_or_else(|| MenuError::RouteNotFound {
                        segment: entry.clone(),
                        path: joined(),
                    })?;
                }
                None => {
                    let window = current.window.clone().ok_or_else(|| MenuError::NoWindow {
                        router: current.id.clone(),
                    })?;
                    return Ok((current, window));
                }
            }
        }
    }

    /// Resolve `path` and open the window on `rt`.
    pub fn open(&self, rt: &ViewRuntime, path: &[&str]) -> Result<Rc<Window>> {
        let (owner, window) = self.resolve_route(path)?;
        debug!(router = %self.id, path = %path.join("/"), window = %window.id(), "route resolved");
        rt.open_window_with(window.clone(), owner.interaction_chain())?;
        Ok(window)
    }

    /// Callbacks of this router followed by those of its ancestors.
    fn interaction_chain(&self) -> Vec<InteractionCallback> {
        let mut chain = self.interact.clone();
        let mut current = self.parent();
        while let Some(router) = current {
            chain.extend(router.interact.iter().cloned());
            current = router.parent();
        }
        chain
    }
}

/// Builder for [`Router`]. Children are built beneath their parent.
pub struct RouterBuilder {
    id: String,
    window: Option<Rc<Window>>,
    entry: Option<String>,
    routes: Vec<RouterBuilder>,
    interact: Vec<InteractionCallback>,
}

impl RouterBuilder {
    pub fn window(mut self, window: Rc<Window>) -> Self {
        self.window = Some(window);
        self
    }

    /// Route followed when this router is opened without further path.
    pub fn entry(mut self, route: impl Into<String>) -> Self {
        self.entry = Some(route.into());
        self
    }

    pub fn route(mut self, route: RouterBuilder) -> Self {
        self.routes.push(route);
        self
    }

    /// Add a callback run for clicks anywhere in the views this router opens.
    pub fn interact(
        mut self,
        callback: impl Fn(&ViewRuntime, &InteractionEvent) -> InteractionResult + 'static,
    ) -> Self {
        self.interact.push(Rc::new(callback));
        self
    }

    /// Build the tree. Fails if two siblings share an ID.
    pub fn build(self) -> Result<Rc<Router>> {
        self.validate()?;
        Ok(self.build_under(Weak::new()))
    }

    fn validate(&self) -> Result<()> {
        for (index, route) in self.routes.iter().enumerate() {
            if self.routes[..index].iter().any(|other| other.id == route.id) {
                return Err(MenuError::DuplicateRoute {
                    route: route.id.clone(),
                    parent: self.id.clone(),
                });
            }
            route.validate()?;
        }
        Ok(())
    }

    fn build_under(self, parent: Weak<Router>) -> Rc<Router> {
        Rc::new_cyclic(|this| {
            let order = self.routes.iter().map(|route| route.id.clone()).collect();
            let routes = self
                .routes
                .into_iter()
                .map(|route| (route.id.clone(), route.build_under(this.clone())))
                .collect();
            Router {
                id: self.id,
                parent,
                routes,
                order,
                window: self.window,
                entry: self.entry,
                interact: self.interact,
            }
        })
    }
}
