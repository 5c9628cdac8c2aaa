//! View Runtime - One opened view for one viewer.
//!
//! A `ViewRuntime` owns the signal graph, the component tree, the slot grid,
//! every scheduled task and the close hooks of one view. Handles are cheap
//! clones of one shared inner state.
//!
//! # Flush
//!
//! Writes mark subscribers dirty; [`ViewRuntime::flush`] drains them:
//!
//! 1. Recompute dirty memos, lowest node first
//! 2. Take every pending observer and run it in declaration order
//! 3. Repeat while observers were re-dirtied, up to `max_flush_iterations`
//!
//! Outside a batch, every write flushes immediately. Dispatch, interval tasks
//! and [`ViewRuntime::batch`] defer the flush to the end, so any number of
//! writes render each dependent once. A write made while a flush runs is
//! picked up by the running flush.
//!
//! # Example
//!
//! ```ignore
//! let scheduler = Rc::new(TickScheduler::new());
//! let presenter = MemoryPresenter::new();
//! let rt = ViewRuntime::builder(ViewerId(1), scheduler.clone(), Rc::new(presenter.clone())).build();
//!
//! router.open(&rt, &["settings"])?;
//! rt.dispatch(&InteractionEvent::new(ViewerId(1), 4, ClickKind::Primary));
//! rt.close();
//! ```

use std::any::{type_name, Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use tracing::{debug, error, warn};

use crate::component::Window;
use crate::config::RuntimeConfig;
use crate::engine::{ComponentState, ComponentTree, RenderCx, SlotGrid};
use crate::error::{MenuError, Result};
use crate::interaction::InteractionCallback;
use crate::presentation::{BasicContentBuilder, ContentBuilder, Presenter, WindowInfo};
use crate::reactive::graph::{Node, NodeId, NodeKind, ReadPlan, SignalGraph, StoreGetter};
use crate::reactive::{Effect, Memo, Signal, Tracker};
use crate::scheduler::{Scheduler, TaskFn, TaskHandle};
use crate::types::{ComponentId, RuntimeId, SlotContent, SlotIndex, ViewerId};

/// Callback run once when the runtime closes.
pub type CloseHook = Box<dyn FnOnce()>;

pub(crate) struct RuntimeInner {
    pub id: RuntimeId,
    pub viewer: ViewerId,
    pub config: RuntimeConfig,
    pub scheduler: Rc<dyn Scheduler>,
    pub presenter: Rc<dyn Presenter>,
    pub content: Rc<dyn ContentBuilder>,
    pub graph: RefCell<SignalGraph>,
    pub tree: RefCell<ComponentTree>,
    pub grid: RefCell<SlotGrid>,
    pub tasks: RefCell<BTreeSet<TaskHandle>>,
    pub close_hooks: RefCell<Vec<CloseHook>>,
    /// Window callbacks followed by router callbacks of the open view.
    pub view_handlers: RefCell<Vec<InteractionCallback>>,
    /// Set once a window was shown to the presenter.
    pub presented: Cell<bool>,
    pub batch_depth: Cell<usize>,
    pub flushing: Cell<bool>,
    pub closed: Cell<bool>,
}

impl Drop for RuntimeInner {
    fn drop(&mut self) {
        // Dropped without close: scheduled tasks hold only weak handles, but
        // the scheduler would keep polling them.
        for task in std::mem::take(self.tasks.get_mut()) {
            self.scheduler.cancel(task);
        }
    }
}

/// Handle to one opened view.
#[derive(Clone)]
pub struct ViewRuntime {
    pub(crate) inner: Rc<RuntimeInner>,
}

impl fmt::Debug for ViewRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRuntime")
            .field("id", &self.inner.id)
            .field("viewer", &self.inner.viewer)
            .field("closed", &self.inner.closed.get())
            .finish()
    }
}

/// Builder for [`ViewRuntime`].
pub struct RuntimeBuilder {
    viewer: ViewerId,
    config: RuntimeConfig,
    scheduler: Rc<dyn Scheduler>,
    presenter: Rc<dyn Presenter>,
    content: Rc<dyn ContentBuilder>,
}

impl RuntimeBuilder {
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn content_builder(mut self, content: Rc<dyn ContentBuilder>) -> Self {
        self.content = content;
        self
    }

    pub fn build(self) -> ViewRuntime {
        let id = RuntimeId::next();
        debug!(runtime = %id, viewer = %self.viewer, "runtime created");
        ViewRuntime {
            inner: Rc::new(RuntimeInner {
                id,
                viewer: self.viewer,
                config: self.config,
                scheduler: self.scheduler,
                presenter: self.presenter,
                content: self.content,
                graph: RefCell::new(SignalGraph::new()),
                tree: RefCell::new(ComponentTree::new()),
                grid: RefCell::new(SlotGrid::new(0, 0)),
                tasks: RefCell::new(BTreeSet::new()),
                close_hooks: RefCell::new(Vec::new()),
                view_handlers: RefCell::new(Vec::new()),
                presented: Cell::new(false),
                batch_depth: Cell::new(0),
                flushing: Cell::new(false),
                closed: Cell::new(false),
            }),
        }
    }
}

/// Restores a `Cell<bool>` / depth counter when dropped, unwinding included.
struct FlagGuard<'a>(&'a Cell<bool>);

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

struct DepthGuard<'a>(&'a Cell<usize>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

impl ViewRuntime {
    pub fn builder(
        viewer: ViewerId,
        scheduler: Rc<dyn Scheduler>,
        presenter: Rc<dyn Presenter>,
    ) -> RuntimeBuilder {
        RuntimeBuilder {
            viewer,
            config: RuntimeConfig::default(),
            scheduler,
            presenter,
            content: Rc::new(BasicContentBuilder),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<RuntimeInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(weak: &Weak<RuntimeInner>) -> Option<Self> {
        weak.upgrade().map(|inner| ViewRuntime { inner })
    }

    pub fn id(&self) -> RuntimeId {
        self.inner.id
    }

    pub fn viewer(&self) -> ViewerId {
        self.inner.viewer
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub fn content_builder(&self) -> &dyn ContentBuilder {
        self.inner.content.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }

    // =========================================================================
    // Signals
    // =========================================================================

    /// Signal named `name` in the root scope, created with `init` if missing.
    ///
    /// Panics if the name is taken by a signal of another type.
    pub fn create_signal<V: 'static>(&self, name: &str, init: V) -> Signal<V> {
        self.signal_in_scope(name, init, None)
    }

    /// Look a signal up by name.
    ///
    /// Panics if the signal exists with another value type.
    pub fn signal_by_name<V: 'static>(&self, name: &str) -> Option<Signal<V>> {
        let graph = self.inner.graph.borrow();
        let node = graph.lookup(name)?;
        check_type::<V>(&graph, node);
        Some(Signal::from_parts(self.inner.id, node))
    }

    /// Store in the root scope, reading and writing through `get` and `set`.
    pub fn create_store<V: 'static>(
        &self,
        name: &str,
        get: impl Fn() -> V + 'static,
        set: impl Fn(V) + 'static,
    ) -> Signal<V> {
        self.store_in_scope(name, get, set, None)
    }

    /// Memo in the root scope. Computed once now.
    pub fn create_memo<V: Clone + PartialEq + 'static>(
        &self,
        compute: impl Fn(&RenderCx<'_>) -> V + 'static,
    ) -> Memo<V> {
        self.memo_in_scope(compute, None)
    }

    /// Effect in the root scope. Runs once now.
    pub fn create_effect(&self, run: impl Fn(&RenderCx<'_>) + 'static) -> Effect {
        self.effect_in_scope(run, None)
    }

    pub(crate) fn signal_in_scope<V: 'static>(&self, name: &str, init: V, owner: Option<NodeId>) -> Signal<V> {
        if let Some(existing) = self.signal_by_name(name) {
            return existing;
        }
        let node = Node::new(NodeKind::Signal { value: Box::new(init) }, owner)
            .named(Some(name.to_string()))
            .typed::<V>();
        let id = self.inner.graph.borrow_mut().insert(node);
        Signal::from_parts(self.inner.id, id)
    }

    pub(crate) fn store_in_scope<V: 'static>(
        &self,
        name: &str,
        get: impl Fn() -> V + 'static,
        set: impl Fn(V) + 'static,
        owner: Option<NodeId>,
    ) -> Signal<V> {
        if let Some(existing) = self.signal_by_name(name) {
            return existing;
        }
        let getter: StoreGetter = Rc::new(move || Box::new(get()) as Box<dyn Any>);
        let setter = Rc::new(move |value: Box<dyn Any>| {
            if let Ok(value) = value.downcast::<V>() {
                set(*value);
            }
        });
        let node = Node::new(NodeKind::Store { get: getter, set: setter }, owner)
            .named(Some(name.to_string()))
            .typed::<V>();
        let id = self.inner.graph.borrow_mut().insert(node);
        Signal::from_parts(self.inner.id, id)
    }

    pub(crate) fn memo_in_scope<V: Clone + PartialEq + 'static>(
        &self,
        compute: impl Fn(&RenderCx<'_>) -> V + 'static,
        owner: Option<NodeId>,
    ) -> Memo<V> {
        fn same<V: PartialEq + 'static>(a: &dyn Any, b: &dyn Any) -> bool {
            matches!((a.downcast_ref::<V>(), b.downcast_ref::<V>()), (Some(a), Some(b)) if a == b)
        }
        fn erase<F: Fn(&RenderCx<'_>) -> Box<dyn Any> + 'static>(f: F) -> F {
            f
        }
        let compute = erase(move |cx| Box::new(compute(cx)) as Box<dyn Any>);
        let node = Node::new(
            NodeKind::Memo {
                value: None,
                compute: Rc::new(compute),
                same: same::<V>,
            },
            owner,
        )
        .typed::<V>();
        let id = self.inner.graph.borrow_mut().insert(node);
        self.run_memo(id);
        Memo::from_parts(self.inner.id, id)
    }

    pub(crate) fn effect_in_scope(&self, run: impl Fn(&RenderCx<'_>) + 'static, owner: Option<NodeId>) -> Effect {
        let node = Node::new(NodeKind::Effect { run: Rc::new(run) }, owner);
        let id = self.inner.graph.borrow_mut().insert(node);
        self.run_effect(id);
        Effect {
            node: id,
            runtime: self.inner.id,
        }
    }

    pub(crate) fn assert_owned(&self, runtime: RuntimeId) {
        if runtime != self.inner.id {
            panic!("signal of {} used with {}", runtime, self.inner.id);
        }
    }

    /// Panic unless `source` is owned by the observer's component, one of its
    /// ancestors, or the root scope.
    pub(crate) fn assert_visible(&self, observer: NodeId, source: NodeId) {
        let Some(source_owner) = self.scope_component(source) else {
            return;
        };
        let observer_owner = self.scope_component(observer);
        let visible = observer_owner
            .is_some_and(|observer| self.inner.tree.borrow().is_ancestor_or_self(source_owner, observer));
        if !visible {
            let graph = self.inner.graph.borrow();
            panic!(
                "signal `{}` belongs to component #{} and is not visible from `{}`",
                graph.display_name(source),
                source_owner.index(),
                graph.display_name(observer),
            );
        }
    }

    pub(crate) fn read_value<V: Clone + 'static>(&self, node: NodeId, tracker: Option<&Tracker>) -> V {
        if let Some(tracker) = tracker {
            self.assert_visible(tracker.observer(), node);
            tracker.record(node);
        }

        enum Deferred {
            Store(StoreGetter),
            Memo,
        }

        let deferred = {
            let graph = self.inner.graph.borrow();
            check_type::<V>(&graph, node);
            match graph.read_plan(node) {
                Some(ReadPlan::Stored(value)) => return downcast::<V>(&graph, node, value),
                Some(ReadPlan::Store(get)) => Deferred::Store(get),
                Some(ReadPlan::StaleMemo) => Deferred::Memo,
                None => panic!("signal `{}` is disposed or not readable", graph.display_name(node)),
            }
        };

        match deferred {
            Deferred::Store(get) => {
                let value = get();
                let graph = self.inner.graph.borrow();
                downcast::<V>(&graph, node, &*value)
            }
            Deferred::Memo => {
                self.run_memo(node);
                let graph = self.inner.graph.borrow();
                match graph.memo_value(node) {
                    Some(value) => downcast::<V>(&graph, node, value),
                    None => panic!("memo `{}` has no value", graph.display_name(node)),
                }
            }
        }
    }

    pub(crate) fn write_value<V: 'static>(&self, node: NodeId, value: V) {
        if self.is_closed() {
            debug!(node = node.0, "write after close ignored");
            return;
        }

        let setter = {
            let mut graph = self.inner.graph.borrow_mut();
            check_type::<V>(&graph, node);
            match graph.store_setter(node) {
                Some(setter) => Some((setter, Box::new(value) as Box<dyn Any>)),
                None => {
                    if !graph.write(node, Box::new(value)) {
                        panic!("signal `{}` is disposed or not writable", graph.display_name(node));
                    }
                    None
                }
            }
        };
        if let Some((setter, value)) = setter {
            setter(value);
        }

        self.inner.graph.borrow_mut().notify(node);
        self.flush();
    }

    pub(crate) fn dispose_node(&self, node: NodeId) {
        self.release_scope(node);
    }

    pub(crate) fn has_node(&self, node: NodeId) -> bool {
        self.inner.graph.borrow().contains(node)
    }

    pub(crate) fn mark_dirty(&self, node: NodeId) {
        self.inner.graph.borrow_mut().mark(node);
    }

    /// Number of live nodes in the signal graph.
    pub fn node_count(&self) -> usize {
        self.inner.graph.borrow().len()
    }

    // =========================================================================
    // Batching & Flush
    // =========================================================================

    /// Run `f` with flushing deferred until it returns.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        let depth = &self.inner.batch_depth;
        depth.set(depth.get() + 1);
        let result = {
            let _guard = DepthGuard(depth);
            f()
        };
        self.flush();
        result
    }

    /// Run every dirty observer until the graph is clean.
    ///
    /// No-op while batching, while another flush is running, or after close.
    pub fn flush(&self) {
        let inner = &self.inner;
        if inner.closed.get() || inner.flushing.get() || inner.batch_depth.get() > 0 {
            return;
        }
        inner.flushing.set(true);
        let _guard = FlagGuard(&inner.flushing);

        let mut iterations = 0;
        loop {
            loop {
                let memo = inner.graph.borrow().next_dirty_memo();
                let Some(memo) = memo else { break };
                self.run_memo(memo);
            }

            let pending = inner.graph.borrow_mut().take_pending();
            if pending.is_empty() {
                break;
            }
            iterations += 1;
            if iterations > inner.config.max_flush_iterations {
                warn!(
                    runtime = %inner.id,
                    limit = inner.config.max_flush_iterations,
                    "flush did not settle, dropping pending observers"
                );
                break;
            }

            for node in pending {
                if inner.closed.get() {
                    return;
                }
                self.run_observer(node);
            }
        }
    }

    fn run_observer(&self, node: NodeId) {
        use crate::reactive::graph::ObserverKind;

        let (is_effect, observer) = {
            let graph = self.inner.graph.borrow();
            (graph.effect_fn(node).is_some(), graph.observer_kind(node))
        };
        if is_effect {
            self.run_effect(node);
            return;
        }
        match observer {
            Some(ObserverKind::Render(id)) => self.render_component(id),
            Some(ObserverKind::Title(id)) => self.render_title(id),
            Some(ObserverKind::Conditional(id, index)) => self.evaluate_conditional(id, index),
            None => {}
        }
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    pub(crate) fn schedule_task(&self, interval: u64, delay: u64, task: TaskFn) -> TaskHandle {
        let handle = self.inner.scheduler.schedule_repeating(interval, delay, task);
        self.inner.tasks.borrow_mut().insert(handle);
        handle
    }

    pub(crate) fn cancel_task(&self, handle: TaskHandle) {
        self.inner.tasks.borrow_mut().remove(&handle);
        self.inner.scheduler.cancel(handle);
    }

    /// Drop the handle of a task that stopped itself.
    pub(crate) fn forget_task(&self, handle: TaskHandle, owner: Option<ComponentId>) {
        self.inner.tasks.borrow_mut().remove(&handle);
        if let Some(owner) = owner {
            self.with_node_mut(owner, |node| {
                node.tasks.retain(|task| *task != handle);
                if node.animation == Some(handle) {
                    node.animation = None;
                }
            });
        }
    }

    /// Number of tasks this runtime has scheduled that are still running.
    pub fn task_count(&self) -> usize {
        self.inner.tasks.borrow().len()
    }

    /// Number of task handles held by a mounted component.
    pub fn component_task_count(&self, id: ComponentId) -> usize {
        self.with_node(id, |node| node.tasks.len() + usize::from(node.animation.is_some()))
            .unwrap_or(0)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Replace the open window with `window` and render it.
    pub fn open_window(&self, window: Rc<Window>) -> Result<ComponentId> {
        self.open_window_with(window, Vec::new())
    }

    /// Open `window`, with `extra` interaction callbacks run after the
    /// window's own.
    pub(crate) fn open_window_with(&self, window: Rc<Window>, extra: Vec<InteractionCallback>) -> Result<ComponentId> {
        if self.is_closed() {
            return Err(MenuError::RuntimeClosed);
        }
        let window_type = window.window_type();
        if window_type.rows() > self.inner.config.max_rows {
            return Err(MenuError::InvalidWindowSize {
                window: window.id().to_string(),
                size: window_type.size(),
            });
        }

        let previous = self.inner.tree.borrow().root();
        if let Some(previous) = previous {
            self.unmount(previous);
        }
        self.inner.view_handlers.borrow_mut().clear();

        debug!(runtime = %self.inner.id, window = %window.id(), "opening window");
        self.inner
            .grid
            .borrow_mut()
            .resize(window_type.columns(), window_type.rows());
        self.inner.presenter.open_window(
            self.inner.viewer,
            &WindowInfo {
                id: window.id().to_string(),
                window_type,
            },
        );
        self.inner.presented.set(true);

        let mut handlers = window.interact.clone();
        handlers.extend(extra);
        let root = self.batch(|| self.mount_root(window))?;
        *self.inner.view_handlers.borrow_mut() = handlers;
        Ok(root)
    }

    /// Run `hook` when the runtime closes. Runs immediately if already closed.
    pub fn on_close(&self, hook: impl FnOnce() + 'static) {
        if self.is_closed() {
            hook();
            return;
        }
        self.inner.close_hooks.borrow_mut().push(Box::new(hook));
    }

    /// Tear everything down synchronously. Closing twice is a no-op.
    pub fn close(&self) {
        let inner = &self.inner;
        if inner.closed.replace(true) {
            return;
        }
        debug!(runtime = %inner.id, viewer = %inner.viewer, "closing runtime");

        let root = inner.tree.borrow().root();
        if let Some(root) = root {
            self.unmount(root);
        }

        let tasks = std::mem::take(&mut *inner.tasks.borrow_mut());
        for task in tasks {
            inner.scheduler.cancel(task);
        }

        let hooks = std::mem::take(&mut *inner.close_hooks.borrow_mut());
        for hook in hooks {
            if catch_unwind(AssertUnwindSafe(hook)).is_err() {
                error!(runtime = %inner.id, "close hook panicked");
            }
        }

        inner.graph.borrow_mut().clear();
        inner.view_handlers.borrow_mut().clear();
        if inner.presented.get() {
            inner.presenter.close_window(inner.viewer);
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Root window component.
    pub fn root(&self) -> Option<ComponentId> {
        self.inner.tree.borrow().root()
    }

    /// Leaf drawing into `slot`.
    pub fn component_at(&self, slot: SlotIndex) -> Option<ComponentId> {
        self.inner.grid.borrow().get(slot)
    }

    /// First mounted component with this ID.
    pub fn find_component(&self, id: &str) -> Option<ComponentId> {
        self.inner.tree.borrow().find(id)
    }

    pub fn is_mounted(&self, id: &str) -> bool {
        self.find_component(id).is_some()
    }

    /// Number of mounted components.
    pub fn component_count(&self) -> usize {
        self.inner.tree.borrow().len()
    }

    pub fn state(&self, id: ComponentId) -> Option<Rc<ComponentState>> {
        self.with_node(id, |node| node.state.clone())
    }

    /// Content currently shown in `slot`.
    pub fn slot_content(&self, slot: SlotIndex) -> Option<SlotContent> {
        let id = self.component_at(slot)?;
        self.state(id).and_then(|state| state.content())
    }

    /// Current window title.
    pub fn title(&self) -> Option<String> {
        let root = self.root()?;
        self.state(root).and_then(|state| state.title())
    }

    /// Number of slots of the open window.
    pub fn window_size(&self) -> usize {
        self.inner.grid.borrow().size()
    }
}

fn check_type<V: 'static>(graph: &SignalGraph, node: NodeId) {
    if let Some((type_id, held)) = graph.value_type(node) {
        if type_id != TypeId::of::<V>() {
            panic!(
                "signal `{}` holds `{}`, accessed as `{}`",
                graph.display_name(node),
                held,
                type_name::<V>()
            );
        }
    }
}

fn downcast<V: Clone + 'static>(graph: &SignalGraph, node: NodeId, value: &dyn Any) -> V {
    match value.downcast_ref::<V>() {
        Some(value) => value.clone(),
        None => panic!(
            "signal `{}` accessed as `{}` with a mismatched value",
            graph.display_name(node),
            type_name::<V>()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::MemoryPresenter;
    use crate::scheduler::TickScheduler;

    fn setup() -> ViewRuntime {
        ViewRuntime::builder(ViewerId(1), Rc::new(TickScheduler::new()), Rc::new(MemoryPresenter::new())).build()
    }

    #[test]
    fn test_signal_get_set() {
        let rt = setup();
        let count = rt.create_signal("count", 1i32);

        count.set(&rt, 5);
        assert_eq!(count.get(&rt), 5);

        count.update(&rt, |value| *value *= 2);
        assert_eq!(count.get_untracked(&rt), 10);
        assert_eq!(count.with(&rt, |value| value + 1), 11);
    }

    #[test]
    fn test_create_signal_is_idempotent() {
        let rt = setup();
        let a = rt.create_signal("count", 1i32);
        let b = rt.create_signal("count", 99i32);

        assert_eq!(a, b);
        assert_eq!(b.get(&rt), 1);
        assert_eq!(rt.signal_by_name::<i32>("count"), Some(a));
        assert_eq!(rt.signal_by_name::<i32>("missing"), None);
    }

    #[test]
    #[should_panic(expected = "accessed as")]
    fn test_type_mismatch_panics() {
        let rt = setup();
        rt.create_signal("count", 1i32);
        let _ = rt.signal_by_name::<String>("count");
    }

    #[test]
    #[should_panic(expected = "used with")]
    fn test_foreign_signal_panics() {
        let first = setup();
        let second = setup();
        let count = first.create_signal("count", 0u8);
        let _ = count.get(&second);
    }

    #[test]
    fn test_effect_reruns_on_change() {
        let rt = setup();
        let count = rt.create_signal("count", 0i32);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = seen.clone();
        let effect = rt.create_effect(move |cx| seen_clone.borrow_mut().push(count.get(cx)));

        count.set(&rt, 1);
        count.set(&rt, 2);
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);

        effect.dispose(&rt);
        count.set(&rt, 3);
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
        assert!(!effect.is_active(&rt));
    }

    #[test]
    fn test_batch_coalesces_effect_runs() {
        let rt = setup();
        let count = rt.create_signal("count", 0i32);
        let runs = Rc::new(Cell::new(0));

        let runs_clone = runs.clone();
        rt.create_effect(move |cx| {
            count.get(cx);
            runs_clone.set(runs_clone.get() + 1);
        });

        rt.batch(|| {
            count.set(&rt, 1);
            count.update(&rt, |c| *c += 1);
            count.set(&rt, 7);
        });
        assert_eq!(runs.get(), 2);
        assert_eq!(count.get(&rt), 7);
    }

    #[test]
    fn test_memo_notifies_only_on_change() {
        let rt = setup();
        let count = rt.create_signal("count", 1i32);
        let parity = rt.create_memo(move |cx| count.get(cx) % 2 == 0);
        let runs = Rc::new(Cell::new(0));

        let runs_clone = runs.clone();
        rt.create_effect(move |cx| {
            parity.get(cx);
            runs_clone.set(runs_clone.get() + 1);
        });

        count.set(&rt, 3);
        assert_eq!(runs.get(), 1);
        assert!(!parity.get(&rt));

        count.set(&rt, 4);
        assert_eq!(runs.get(), 2);
        assert!(parity.get(&rt));
    }

    #[test]
    fn test_effects_run_in_declaration_order() {
        let rt = setup();
        let count = rt.create_signal("count", 0i32);
        let order = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = order.clone();
            rt.create_effect(move |cx| {
                if count.get(cx) > 0 {
                    order.borrow_mut().push(label);
                }
            });
        }

        count.set(&rt, 1);
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_store_reads_and_writes_backing() {
        let rt = setup();
        let backing = Rc::new(Cell::new(4i32));

        let get = backing.clone();
        let set = backing.clone();
        let store = rt.create_store("stored", move || get.get(), move |value| set.set(value));

        assert_eq!(store.get(&rt), 4);
        store.update(&rt, |value| *value += 1);
        assert_eq!(backing.get(), 5);

        backing.set(9);
        assert_eq!(store.get(&rt), 9);
    }

    #[test]
    fn test_close_runs_hooks_once_and_ignores_writes() {
        let rt = setup();
        let count = rt.create_signal("count", 0i32);
        let closed = Rc::new(Cell::new(0));

        let closed_clone = closed.clone();
        rt.on_close(move || closed_clone.set(closed_clone.get() + 1));

        rt.close();
        rt.close();
        assert_eq!(closed.get(), 1);
        assert!(rt.is_closed());
        assert_eq!(rt.node_count(), 0);

        count.set(&rt, 1);
        assert_eq!(rt.signal_by_name::<i32>("count"), None);
    }

    #[test]
    fn test_effect_writing_signal_settles() {
        let rt = setup();
        let source = rt.create_signal("source", 0i32);
        let doubled = rt.create_signal("doubled", 0i32);

        rt.create_effect(move |cx| {
            let value = source.get(cx);
            doubled.set(cx, value * 2);
        });

        source.set(&rt, 21);
        assert_eq!(doubled.get(&rt), 42);
    }
}
