//! Render phase.
//!
//! Rendering recomputes one observer's output and never reshapes the tree,
//! with one exception: re-evaluating a conditional mounts or unmounts its
//! branch. Every render runs with a fresh [`Tracker`]; the reads it collects
//! replace the observer's previous sources once the callback returns.
//!
//! Observers:
//! - render (leaves) - icon content, written to every slot the leaf covers
//! - render (containers) - re-evaluates the container's conditionals
//! - title (windows) - title string
//! - conditional - predicate, mounting or unmounting the matching branch
//! - effect - user callback
//! - memo - cached value, dependents notified only on change

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{error, trace, warn};

use crate::component::Component;
use crate::reactive::graph::{MemoFn, NodeId};
use crate::reactive::{Signal, SignalContext, Tracker};
use crate::runtime::ViewRuntime;
use crate::types::{ComponentId, SlotContent};

/// Context handed to render, title, predicate, memo and effect callbacks.
///
/// Reads through it subscribe the running observer.
pub struct RenderCx<'a> {
    rt: &'a ViewRuntime,
    tracker: Tracker,
    component: Option<ComponentId>,
}

/// Context handed to effects.
pub type EffectCx<'a> = RenderCx<'a>;

impl SignalContext for RenderCx<'_> {
    fn runtime(&self) -> &ViewRuntime {
        self.rt
    }

    fn tracker(&self) -> Option<&Tracker> {
        Some(&self.tracker)
    }
}

impl<'a> RenderCx<'a> {
    pub(crate) fn new(rt: &'a ViewRuntime, observer: NodeId, component: Option<ComponentId>) -> Self {
        Self {
            rt,
            tracker: Tracker::new(observer),
            component,
        }
    }

    /// Component the running observer belongs to, if any.
    pub fn component(&self) -> Option<ComponentId> {
        self.component
    }

    /// Build slot content through the runtime's content builder.
    pub fn stack(&self, item: &str) -> SlotContent {
        self.rt.content_builder().create(item)
    }

    /// Look a signal up by name.
    ///
    /// Panics if the signal exists with another value type.
    pub fn signal<V: 'static>(&self, name: &str) -> Option<Signal<V>> {
        self.rt.signal_by_name(name)
    }

    fn commit(&self) {
        let reads = self.tracker.take();
        self.rt
            .inner
            .graph
            .borrow_mut()
            .set_sources(self.tracker.observer(), reads);
    }
}

impl ViewRuntime {
    // =========================================================================
    // Components
    // =========================================================================

    /// Render one component now.
    pub(crate) fn render_component(&self, id: ComponentId) {
        let Some((component, state, scope, rect, conditionals)) = self.with_node(id, |node| {
            (
                node.component.clone(),
                node.state.clone(),
                node.scope,
                node.rect,
                node.conditionals.iter().map(|c| c.node).collect::<Vec<_>>(),
            )
        }) else {
            return;
        };

        if component.is_leaf() {
            let content = match state.frame() {
                Some(frame) => Some(frame),
                None => match component.icon_fn() {
                    Some(icon) => {
                        let cx = RenderCx::new(self, scope, Some(id));
                        let result = catch_unwind(AssertUnwindSafe(|| icon(&cx)));
                        cx.commit();
                        match result {
                            Ok(content) => Some(content),
                            Err(_) => {
                                error!(component = %component.id(), "render panicked");
                                return;
                            }
                        }
                    }
                    None => None,
                },
            };

            if state.set_content(content.clone()) && !self.is_closed() {
                let columns = self.inner.grid.borrow().columns();
                for slot in rect.slots(columns) {
                    self.inner.presenter.set_slot(self.inner.viewer, slot, content.as_ref());
                }
            }
        }

        state.record_render();
        trace!(component = %component.id(), renders = state.render_count(), "rendered");

        for conditional in conditionals {
            self.mark_dirty(conditional);
        }
    }

    /// Recompute a window title.
    pub(crate) fn render_title(&self, id: ComponentId) {
        let Some((component, state, title_node)) =
            self.with_node(id, |node| (node.component.clone(), node.state.clone(), node.title))
        else {
            return;
        };
        let (Component::Window(window), Some(title_node)) = (&component, title_node) else {
            return;
        };
        let Some(title_fn) = window.title.clone() else { return };

        let cx = RenderCx::new(self, title_node, Some(id));
        let result = catch_unwind(AssertUnwindSafe(|| title_fn(&cx)));
        cx.commit();

        match result {
            Ok(title) => {
                if state.set_title(title.clone()) && !self.is_closed() {
                    trace!(window = %window.id(), %title, "title changed");
                    self.inner.presenter.set_title(self.inner.viewer, &title);
                }
            }
            Err(_) => error!(window = %window.id(), "title render panicked"),
        }
    }

    /// Re-evaluate a conditional and swap its mounted branch if needed.
    pub(crate) fn evaluate_conditional(&self, id: ComponentId, index: usize) {
        let Some(Some((observer, predicate))) = self.with_node(id, |node| {
            node.conditionals
                .get(index)
                .map(|conditional| (conditional.node, conditional.predicate.clone()))
        }) else {
            return;
        };

        let cx = RenderCx::new(self, observer, Some(id));
        let result = catch_unwind(AssertUnwindSafe(|| predicate(&cx)));
        cx.commit();
        let Ok(value) = result else {
            error!(component = id.index(), conditional = index, "predicate panicked");
            return;
        };

        // Record the new value and take what has to change.
        let swap = {
            let mut tree = self.inner.tree.borrow_mut();
            let Some(conditional) = tree.get_mut(id).and_then(|node| node.conditionals.get_mut(index)) else {
                return;
            };
            if conditional.last == Some(value) {
                None
            } else {
                conditional.last = Some(value);
                let branch = if value {
                    Some(conditional.then_branch.clone())
                } else {
                    conditional.else_branch.clone()
                };
                Some((conditional.mounted.take(), branch))
            }
        };
        let Some((previous, branch)) = swap else { return };

        if let Some(previous) = previous {
            self.unmount(previous);
            self.retry_rejected_conditionals(id, index);
        }
        let Some((slot, component)) = branch else { return };
        let mounted = self.mount_child(id, slot, component);

        let mut tree = self.inner.tree.borrow_mut();
        let Some(conditional) = tree.get_mut(id).and_then(|node| node.conditionals.get_mut(index)) else {
            return;
        };
        match mounted {
            Ok(child) => conditional.mounted = Some(child),
            Err(err) => {
                // Forget the value so the next evaluation tries again.
                conditional.last = None;
                warn!(component = id.index(), %err, "conditional child rejected");
            }
        }
    }

    /// Re-queue sibling conditionals whose branch was rejected, now that a
    /// slot under `id` has been freed.
    fn retry_rejected_conditionals(&self, id: ComponentId, freed_by: usize) {
        let rejected: Vec<NodeId> = self
            .with_node(id, |node| {
                node.conditionals
                    .iter()
                    .enumerate()
                    .filter(|(index, conditional)| *index != freed_by && conditional.last.is_none())
                    .map(|(_, conditional)| conditional.node)
                    .collect()
            })
            .unwrap_or_default();
        for node in rejected {
            self.mark_dirty(node);
        }
    }

    // =========================================================================
    // Effects & Memos
    // =========================================================================

    pub(crate) fn run_effect(&self, node: NodeId) {
        let run = self.inner.graph.borrow().effect_fn(node);
        let Some(run) = run else { return };

        let cx = RenderCx::new(self, node, self.scope_component(node));
        let result = catch_unwind(AssertUnwindSafe(|| run(&cx)));
        cx.commit();
        if result.is_err() {
            error!(effect = node.0, "effect panicked");
        }
    }

    /// Recompute a memo, notifying dependents if the value changed.
    pub(crate) fn run_memo(&self, node: NodeId) {
        let compute: Option<MemoFn> = self.inner.graph.borrow().memo_fn(node);
        let Some(compute) = compute else { return };

        let cx = RenderCx::new(self, node, self.scope_component(node));
        let result = catch_unwind(AssertUnwindSafe(|| compute(&cx)));
        cx.commit();

        let mut graph = self.inner.graph.borrow_mut();
        let value: Box<dyn Any> = match result {
            Ok(value) => value,
            Err(_) => {
                error!(memo = node.0, "memo panicked, keeping previous value");
                graph.keep_memo_value(node);
                return;
            }
        };
        if graph.set_memo_value(node, value) {
            graph.notify(node);
        }
    }
}
