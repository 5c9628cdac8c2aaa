//! Batching law: any number of writes inside one batch or one dispatch
//! settle in one pass.

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use spark_menu::{
    Button, ClickKind, Icon, InteractionEvent, InteractionResult, MemoryPresenter, TickScheduler, ViewRuntime,
    ViewerId, Window,
};

const VIEWER: ViewerId = ViewerId(5);

fn setup() -> (MemoryPresenter, ViewRuntime) {
    let presenter = MemoryPresenter::new();
    let rt = ViewRuntime::builder(VIEWER, Rc::new(TickScheduler::new()), Rc::new(presenter.clone())).build();
    (presenter, rt)
}

proptest! {
    #[test]
    fn test_batched_writes_run_dependents_once(writes in prop::collection::vec(-50i32..50, 1..24)) {
        let (_presenter, rt) = setup();
        let value = rt.create_signal("value", 0i32);
        let doubled = rt.create_memo(move |cx| value.get(cx) * 2);
        let runs = Rc::new(Cell::new(0u32));
        let seen = Rc::new(Cell::new(0i32));

        let (runs_clone, seen_clone) = (runs.clone(), seen.clone());
        rt.create_effect(move |cx| {
            seen_clone.set(doubled.get(cx));
            runs_clone.set(runs_clone.get() + 1);
        });

        rt.batch(|| {
            for write in &writes {
                value.set(&rt, *write);
            }
        });

        let last = writes[writes.len() - 1];
        prop_assert_eq!(value.get(&rt), last);
        prop_assert_eq!(seen.get(), last * 2);
        prop_assert_eq!(runs.get(), if last == 0 { 1 } else { 2 });
    }

    #[test]
    fn test_batched_writes_render_slot_once(writes in prop::collection::vec(0u8..8, 1..24)) {
        let (presenter, rt) = setup();
        let window = Window::builder("law")
            .rows(1)
            .construct(|cx| {
                let amount = cx.signal("amount", 1u8);
                cx.child(
                    0,
                    Icon::builder("stack")
                        .icon(move |cx| cx.stack("minecraft:stone").amount(amount.get(cx)))
                        .build(),
                )?;
                Ok(())
            })
            .build()
            .unwrap();
        rt.open_window(window).unwrap();

        let amount = rt.signal_by_name::<u8>("amount").unwrap();
        let state = rt.state(rt.find_component("stack").unwrap()).unwrap();
        let renders = state.render_count();
        let slot_writes = presenter.slot_writes(VIEWER, 0);

        rt.batch(|| {
            for write in &writes {
                amount.set(&rt, *write);
            }
        });

        let last = writes[writes.len() - 1];
        prop_assert_eq!(state.render_count(), renders + 1);
        prop_assert_eq!(presenter.slot(VIEWER, 0).map(|content| content.amount), Some(last));
        let expected_writes = if last == 1 { slot_writes } else { slot_writes + 1 };
        prop_assert_eq!(presenter.slot_writes(VIEWER, 0), expected_writes);
    }
}

#[test]
fn test_dispatch_writes_render_once() {
    let (presenter, rt) = setup();
    let window = Window::builder("dispatch")
        .rows(1)
        .construct(|cx| {
            let amount = cx.signal("amount", 1u8);
            cx.child(
                0,
                Icon::builder("stack")
                    .icon(move |cx| cx.stack("minecraft:stone").amount(amount.get(cx)))
                    .build(),
            )?;
            cx.child(
                1,
                Button::builder("bump")
                    .interact(move |rt, _| {
                        amount.update(rt, |a| *a += 1);
                        amount.update(rt, |a| *a += 1);
                        InteractionResult::propagate()
                    })
                    .interact(move |rt, _| {
                        amount.set(rt, 9);
                        InteractionResult::cancel()
                    })
                    .build(),
            )?;
            Ok(())
        })
        .build()
        .unwrap();
    rt.open_window(window).unwrap();

    let state = rt.state(rt.find_component("stack").unwrap()).unwrap();
    let renders = state.render_count();
    let slot_writes = presenter.slot_writes(VIEWER, 0);

    let result = rt.dispatch(&InteractionEvent::new(VIEWER, 1, ClickKind::Primary));

    assert!(result.is_cancelled());
    assert_eq!(state.render_count(), renders + 1);
    assert_eq!(presenter.slot_writes(VIEWER, 0), slot_writes + 1);
    assert_eq!(presenter.slot(VIEWER, 0).map(|content| content.amount), Some(9));
}
