//! End-to-end counter menu: clicks, conditional children, titles and state.

use std::cell::Cell;
use std::rc::Rc;

use spark_menu::{
    Button, ClickKind, Component, Group, Icon, InteractionEvent, InteractionResult, MemoryPresenter,
    StateFlags, TickScheduler, ViewRuntime, ViewerId, Window,
};

const VIEWER: ViewerId = ViewerId(7);

const COUNT_DOWN: usize = 0;
const RESET: usize = 2;
const COUNTER: usize = 4;
const COUNT_UP: usize = 8;

#[derive(Default)]
struct Lifecycle {
    constructs: Cell<u32>,
    unmounts: Cell<u32>,
}

fn setup() -> (MemoryPresenter, ViewRuntime) {
    let presenter = MemoryPresenter::new();
    let rt = ViewRuntime::builder(VIEWER, Rc::new(TickScheduler::new()), Rc::new(presenter.clone())).build();
    (presenter, rt)
}

fn counter_window(lifecycle: Rc<Lifecycle>) -> Rc<Window> {
    Window::builder("counter")
        .rows(1)
        .title(|cx| {
            let count = cx.signal::<i32>("count").map(|count| count.get(cx)).unwrap_or(0);
            format!("Count: {count}")
        })
        .title_signals(["count"])
        .construct(move |cx| {
            let count = cx.signal("count", 0i32);

            cx.child(
                COUNT_DOWN,
                Button::builder("count_down")
                    .icon(|cx| cx.stack("minecraft:red_concrete"))
                    .interact(move |rt, _| {
                        count.update(rt, |c| *c -= 1);
                        InteractionResult::cancel()
                    })
                    .build(),
            )?;

            let reset = Button::builder("reset")
                .icon(|cx| cx.stack("minecraft:barrier"))
                .interact(move |rt, _| {
                    count.set(rt, 0);
                    InteractionResult::cancel()
                })
                .build();
            let lifecycle = lifecycle.clone();
            let reset_group = Group::builder("reset_group", 1, 1)
                .construct(move |cx| {
                    lifecycle.constructs.set(lifecycle.constructs.get() + 1);
                    let lifecycle = lifecycle.clone();
                    cx.on_unmount(move |_| lifecycle.unmounts.set(lifecycle.unmounts.get() + 1));
                    cx.child(0, reset.clone())?;
                    Ok(())
                })
                .build();
            cx.render_when(move |cx| count.get(cx) != 0, RESET, reset_group)?;

            cx.child(
                COUNTER,
                Icon::builder("counter")
                    .icon(move |cx| {
                        let value = count.get(cx);
                        cx.stack("minecraft:paper").named(format!("Count: {value}"))
                    })
                    .build(),
            )?;

            cx.child(
                COUNT_UP,
                Button::builder("count_up")
                    .icon(|cx| cx.stack("minecraft:lime_concrete"))
                    .interact(move |rt, _| {
                        count.update(rt, |c| *c += 1);
                        InteractionResult::cancel()
                    })
                    .build(),
            )?;
            Ok(())
        })
        .build()
        .unwrap()
}

fn click(rt: &ViewRuntime, slot: usize) -> InteractionResult {
    rt.dispatch(&InteractionEvent::new(VIEWER, slot, ClickKind::Primary))
}

fn counter_name(presenter: &MemoryPresenter) -> Option<String> {
    presenter.slot(VIEWER, COUNTER).and_then(|content| content.name)
}

#[test]
fn test_counter_end_to_end() {
    let (presenter, rt) = setup();
    let lifecycle = Rc::new(Lifecycle::default());
    rt.open_window(counter_window(lifecycle.clone())).unwrap();

    assert_eq!(counter_name(&presenter).as_deref(), Some("Count: 0"));
    assert_eq!(presenter.title(VIEWER).as_deref(), Some("Count: 0"));
    assert!(!rt.is_mounted("reset"));
    assert_eq!(presenter.slot(VIEWER, RESET), None);

    for _ in 0..3 {
        assert!(click(&rt, COUNT_UP).is_cancelled());
    }

    assert_eq!(counter_name(&presenter).as_deref(), Some("Count: 3"));
    assert_eq!(rt.title().as_deref(), Some("Count: 3"));
    assert_eq!(presenter.title(VIEWER).as_deref(), Some("Count: 3"));
    assert!(rt.is_mounted("reset"));
    assert_eq!(
        presenter.slot(VIEWER, RESET).map(|content| content.item),
        Some("minecraft:barrier".to_string())
    );
    assert_eq!(lifecycle.constructs.get(), 1);

    assert!(click(&rt, RESET).is_cancelled());

    assert_eq!(counter_name(&presenter).as_deref(), Some("Count: 0"));
    assert!(!rt.is_mounted("reset"));
    assert_eq!(presenter.slot(VIEWER, RESET), None);
    assert_eq!(lifecycle.unmounts.get(), 1);
}

#[test]
fn test_count_down_goes_negative() {
    let (presenter, rt) = setup();
    rt.open_window(counter_window(Rc::default())).unwrap();

    click(&rt, COUNT_DOWN);
    click(&rt, COUNT_DOWN);

    assert_eq!(counter_name(&presenter).as_deref(), Some("Count: -2"));
    assert!(rt.is_mounted("reset"));
}

#[test]
fn test_render_when_mounts_on_each_transition() {
    let (_presenter, rt) = setup();
    let lifecycle = Rc::new(Lifecycle::default());
    rt.open_window(counter_window(lifecycle.clone())).unwrap();
    let count = rt.signal_by_name::<i32>("count").unwrap();

    count.set(&rt, 1);
    count.set(&rt, 2);
    assert_eq!(lifecycle.constructs.get(), 1);

    count.set(&rt, 0);
    count.set(&rt, 1);
    count.set(&rt, 0);

    assert_eq!(lifecycle.constructs.get(), 2);
    assert_eq!(lifecycle.unmounts.get(), 2);
    assert!(!rt.is_mounted("reset_group"));
}

#[test]
fn test_render_when_torn_down_on_close() {
    let (_presenter, rt) = setup();
    let lifecycle = Rc::new(Lifecycle::default());
    rt.open_window(counter_window(lifecycle.clone())).unwrap();
    let count = rt.signal_by_name::<i32>("count").unwrap();

    // false -> true -> false -> true
    count.set(&rt, 1);
    count.set(&rt, 0);
    count.set(&rt, 1);
    assert_eq!(lifecycle.constructs.get(), 2);
    assert_eq!(lifecycle.unmounts.get(), 1);

    rt.close();
    assert_eq!(lifecycle.constructs.get(), 2);
    assert_eq!(lifecycle.unmounts.get(), 2);
    assert_eq!(rt.component_count(), 0);
}

#[test]
fn test_interaction_on_empty_slot_propagates() {
    let (_presenter, rt) = setup();
    rt.open_window(counter_window(Rc::default())).unwrap();

    let result = click(&rt, 6);
    assert!(!result.is_cancelled());

    // Icons never handle clicks.
    assert!(!click(&rt, COUNTER).is_cancelled());
}

#[test]
fn test_state_identity_across_renders() {
    let (_presenter, rt) = setup();
    rt.open_window(counter_window(Rc::default())).unwrap();

    let id = rt.find_component("counter").unwrap();
    let before = rt.state(id).unwrap();
    let renders = before.render_count();

    rt.signal_by_name::<i32>("count").unwrap().set(&rt, 5);

    let after = rt.state(id).unwrap();
    assert!(Rc::ptr_eq(&before, &after));
    assert_eq!(after.render_count(), renders + 1);
    assert_eq!(after.content().and_then(|content| content.name).as_deref(), Some("Count: 5"));
}

#[test]
fn test_state_is_fresh_after_variant_swap() {
    let (_presenter, rt) = setup();
    let window = Window::builder("toggle")
        .rows(1)
        .construct(|cx| {
            let on = cx.signal("on", false);
            let lit: Component = Icon::builder("lit").icon(|cx| cx.stack("minecraft:glowstone")).build().into();
            let dark: Component = Icon::builder("dark").icon(|cx| cx.stack("minecraft:coal_block")).build().into();
            cx.render_when_else(move |cx| on.get(cx), (0, lit), (0, dark))?;
            Ok(())
        })
        .build()
        .unwrap();
    rt.open_window(window).unwrap();
    let on = rt.signal_by_name::<bool>("on").unwrap();

    let first_dark = rt.state(rt.find_component("dark").unwrap()).unwrap();
    assert_eq!(first_dark.render_count(), 1);
    assert!(!rt.is_mounted("lit"));

    on.set(&rt, true);
    assert!(rt.is_mounted("lit"));
    assert!(!rt.is_mounted("dark"));
    assert!(!first_dark.is_mounted());
    assert!(first_dark.flags().contains(StateFlags::UNMOUNTED));
    assert_eq!(rt.slot_content(0).map(|content| content.item).as_deref(), Some("minecraft:glowstone"));

    on.set(&rt, false);
    let second_dark = rt.state(rt.find_component("dark").unwrap()).unwrap();
    assert!(!Rc::ptr_eq(&first_dark, &second_dark));
    assert_eq!(second_dark.render_count(), 1);
    assert!(second_dark.is_mounted());
}

#[test]
fn test_conditional_retries_after_sibling_frees_slot() {
    let (presenter, rt) = setup();
    let window = Window::builder("shared_slot")
        .rows(1)
        .construct(|cx| {
            let on = cx.signal("on", false);
            cx.render_when(
                move |cx| on.get(cx),
                0,
                Icon::builder("lit").icon(|cx| cx.stack("minecraft:glowstone")).build(),
            )?;
            cx.render_when(
                move |cx| !on.get(cx),
                0,
                Icon::builder("dark").icon(|cx| cx.stack("minecraft:coal_block")).build(),
            )?;
            Ok(())
        })
        .build()
        .unwrap();
    rt.open_window(window).unwrap();
    let on = rt.signal_by_name::<bool>("on").unwrap();
    let shown = || presenter.slot(VIEWER, 0).map(|content| content.item);
    assert_eq!(shown().as_deref(), Some("minecraft:coal_block"));

    on.set(&rt, true);
    assert!(rt.is_mounted("lit"));
    assert!(!rt.is_mounted("dark"));
    assert_eq!(shown().as_deref(), Some("minecraft:glowstone"));

    on.set(&rt, false);
    assert!(!rt.is_mounted("lit"));
    assert!(rt.is_mounted("dark"));
    assert_eq!(shown().as_deref(), Some("minecraft:coal_block"));
}
