//! Construct phase context.
//!
//! A component's construct callback runs exactly once per mount. Everything
//! it declares (children, conditional children, signals, effects, interval
//! tasks, unmount hooks) is owned by that mounted instance and released with
//! it.
//!
//! # Example
//!
//! ```ignore
//! Window::builder("counter")
//!     .rows(1)
//!     .construct(|cx| {
//!         let count = cx.signal("count", 0i32);
//!         cx.child(4, counter_button(count))?;
//!         cx.render_when(move |cx| count.get(cx) != 0, 2, reset_button(count))?;
//!         cx.interval(20, move |rt| {
//!             count.update(rt, |c| *c += 1);
//!             TaskControl::Continue
//!         });
//!         Ok(())
//!     })
//!     .build()?;
//! ```

use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use tracing::error;

use super::tree::Conditional;
use super::RenderCx;
use crate::component::Component;
use crate::error::Result;
use crate::reactive::graph::{Node, NodeKind, ObserverKind};
use crate::reactive::{Effect, Memo, Signal, SignalContext, SignalRef};
use crate::runtime::ViewRuntime;
use crate::scheduler::{TaskControl, TaskFn, TaskHandle};
use crate::types::{ComponentId, SlotContent, SlotIndex};

/// Context handed to construct callbacks.
///
/// Reads through it are untracked.
pub struct ConstructCx<'a> {
    rt: &'a ViewRuntime,
    component: ComponentId,
}

impl SignalContext for ConstructCx<'_> {
    fn runtime(&self) -> &ViewRuntime {
        self.rt
    }
}

impl<'a> ConstructCx<'a> {
    pub(crate) fn new(rt: &'a ViewRuntime, component: ComponentId) -> Self {
        Self { rt, component }
    }

    /// The component being constructed.
    pub fn component(&self) -> ComponentId {
        self.component
    }

    /// Build slot content through the runtime's content builder.
    pub fn stack(&self, item: &str) -> SlotContent {
        self.rt.content_builder().create(item)
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Mount `component` at `slot`, relative to this component.
    ///
    /// The child's own construct runs before this returns. On error the
    /// child's subtree is rolled back and siblings are unaffected.
    pub fn child(&self, slot: SlotIndex, component: impl Into<Component>) -> Result<ComponentId> {
        self.rt.mount_child(self.component, slot, component.into())
    }

    /// Mount `component` at `slot` while `predicate` holds.
    ///
    /// The predicate is re-evaluated whenever what it read changes and
    /// whenever this component renders.
    pub fn render_when(
        &self,
        predicate: impl Fn(&RenderCx<'_>) -> bool + 'static,
        slot: SlotIndex,
        component: impl Into<Component>,
    ) -> Result<()> {
        let component = component.into();
        self.rt.child_rect(self.component, slot, &component, false)?;
        self.declare_conditional(Rc::new(predicate), (slot, component), None);
        Ok(())
    }

    /// Mount `then` while `predicate` holds and `otherwise` while it does not.
    pub fn render_when_else(
        &self,
        predicate: impl Fn(&RenderCx<'_>) -> bool + 'static,
        then: (SlotIndex, Component),
        otherwise: (SlotIndex, Component),
    ) -> Result<()> {
        self.rt.child_rect(self.component, then.0, &then.1, false)?;
        self.rt.child_rect(self.component, otherwise.0, &otherwise.1, false)?;
        self.declare_conditional(Rc::new(predicate), then, Some(otherwise));
        Ok(())
    }

    fn declare_conditional(
        &self,
        predicate: super::tree::PredicateFn,
        then_branch: (SlotIndex, Component),
        else_branch: Option<(SlotIndex, Component)>,
    ) {
        let rt = self.rt;
        let Some(scope) = rt.scope_of(self.component) else { return };

        let mut tree = rt.inner.tree.borrow_mut();
        let Some(node) = tree.get_mut(self.component) else { return };
        let index = node.conditionals.len();
        let observer = rt.inner.graph.borrow_mut().insert(Node::new(
            NodeKind::Observer(ObserverKind::Conditional(self.component, index)),
            Some(scope),
        ));
        node.conditionals.push(Conditional {
            node: observer,
            predicate,
            then_branch,
            else_branch,
            last: None,
            mounted: None,
        });
        drop(tree);
        rt.mark_dirty(observer);
    }

    // =========================================================================
    // Reactive State
    // =========================================================================

    /// Signal named `name`, created with `init` if it does not exist yet.
    ///
    /// A newly created signal is owned by this component.
    pub fn signal<V: 'static>(&self, name: &str, init: V) -> Signal<V> {
        let owner = self.rt.scope_of(self.component);
        self.rt.signal_in_scope(name, init, owner)
    }

    /// Store bridged to external state, owned by this component.
    pub fn store<V: 'static>(
        &self,
        name: &str,
        get: impl Fn() -> V + 'static,
        set: impl Fn(V) + 'static,
    ) -> Signal<V> {
        let owner = self.rt.scope_of(self.component);
        self.rt.store_in_scope(name, get, set, owner)
    }

    pub fn memo<V: Clone + PartialEq + 'static>(
        &self,
        compute: impl Fn(&RenderCx<'_>) -> V + 'static,
    ) -> Memo<V> {
        let owner = self.rt.scope_of(self.component);
        self.rt.memo_in_scope(compute, owner)
    }

    /// Effect owned by this component. Runs once now.
    pub fn effect(&self, run: impl Fn(&RenderCx<'_>) + 'static) -> Effect {
        let owner = self.rt.scope_of(self.component);
        self.rt.effect_in_scope(run, owner)
    }

    /// Re-render this component whenever `signal` changes.
    pub fn subscribe(&self, signal: impl Into<SignalRef>) {
        if let Some(scope) = self.rt.scope_of(self.component) {
            self.rt.pin_source(scope, &signal.into());
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Run `task` every `ticks` ticks until it returns `Stop` or the
    /// component unmounts.
    ///
    /// Writes made by the task are flushed in one pass. A panicking task is
    /// logged and keeps its schedule.
    pub fn interval(
        &self,
        ticks: u64,
        mut task: impl FnMut(&ViewRuntime) -> TaskControl + 'static,
    ) -> TaskHandle {
        let weak = self.rt.downgrade();
        let component = self.component;
        let own: Rc<Cell<Option<TaskHandle>>> = Rc::default();
        let own_handle = own.clone();
        let wrapper: TaskFn = Box::new(move || {
            let Some(rt) = ViewRuntime::upgrade(&weak) else {
                return TaskControl::Stop;
            };
            if rt.is_closed() {
                return TaskControl::Stop;
            }
            let outcome = rt.batch(|| catch_unwind(AssertUnwindSafe(|| task(&rt))));
            let control = outcome.unwrap_or_else(|_| {
                error!(component = component.index(), "interval task panicked");
                TaskControl::Continue
            });
            if let (TaskControl::Stop, Some(handle)) = (control, own_handle.get()) {
                rt.forget_task(handle, Some(component));
            }
            control
        });

        let delay = self.rt.config().interval_delay;
        let handle = self.rt.schedule_task(ticks, delay, wrapper);
        own.set(Some(handle));
        if let Some(node) = self.rt.inner.tree.borrow_mut().get_mut(self.component) {
            node.tasks.push(handle);
        }
        handle
    }

    /// Run `hook` when this component unmounts.
    pub fn on_unmount(&self, hook: impl FnOnce(&ViewRuntime) + 'static) {
        if let Some(node) = self.rt.inner.tree.borrow_mut().get_mut(self.component) {
            node.unmount_hooks.push(Box::new(hook));
        }
    }
}
