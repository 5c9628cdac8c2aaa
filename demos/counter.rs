//! Counter Example - Reactive buttons, conditional children and animation
//!
//! This example builds the classic counter menu:
//! - A counter icon showing the current value
//! - Count up / count down buttons
//! - A reset button mounted only while the count is non-zero
//! - A store-backed count shared across reopened menus
//! - An interval nudging the counter every 20 ticks
//!
//! Run with: cargo run --example counter

use std::rc::Rc;

use spark_menu::{
    logging, Animation, Button, ClickKind, Frame, Icon, InteractionResult, MemoryPresenter, MenuManager,
    RawInteraction, Router, SignalContext, Sound, StoreRegistry, TaskControl, TickScheduler, ViewerId, Window,
};

const VIEWER: ViewerId = ViewerId(1);

fn counter_window(registry: StoreRegistry<ViewerId, i32>) -> spark_menu::Result<Rc<Window>> {
    Window::builder("counter")
        .rows(1)
        .title(|cx| {
            let count = cx.signal::<i32>("count").map(|count| count.get(cx)).unwrap_or(0);
            format!("Counter ({count})")
        })
        .title_signals(["count"])
        .construct(move |cx| {
            let state = registry.entry(cx.runtime().viewer(), || 0);
            let (read, write) = (state.clone(), state);
            let count = cx.store("count", move || *read.borrow(), move |value| *write.borrow_mut() = value);

            cx.child(
                0,
                Button::builder("count_down")
                    .icon(|cx| cx.stack("minecraft:red_concrete").named("-1"))
                    .interact(move |rt, _| {
                        count.update(rt, |c| *c -= 1);
                        InteractionResult::cancel()
                    })
                    .build(),
            )?;

            cx.render_when(
                move |cx| count.get(cx) != 0,
                2,
                Button::builder("reset")
                    .icon(|cx| cx.stack("minecraft:barrier").named("Reset"))
                    .interact(move |rt, _| {
                        count.set(rt, 0);
                        InteractionResult::cancel()
                    })
                    .build(),
            )?;

            cx.child(
                4,
                Icon::builder("counter")
                    .icon(move |cx| {
                        let value = count.get(cx);
                        cx.stack("minecraft:paper")
                            .named(format!("Count: {value}"))
                            .amount(value.clamp(1, 64) as u8)
                    })
                    .build(),
            )?;

            cx.child(
                8,
                Button::builder("count_up")
                    .icon(|cx| cx.stack("minecraft:lime_concrete").named("+1"))
                    .interact(move |rt, _| {
                        count.update(rt, |c| *c += 1);
                        InteractionResult::cancel()
                    })
                    .sound(|_| Some(Sound::new("ui.button.click").pitch(1.2)))
                    .animation(Animation::new(vec![
                        Frame::new(1, "minecraft:cyan_concrete"),
                        Frame::new(1, "minecraft:lime_concrete"),
                    ]))
                    .build(),
            )?;

            cx.interval(20, move |rt| {
                count.update(rt, |c| *c += 1);
                TaskControl::Continue
            });
            Ok(())
        })
        .build()
}

fn print_row(presenter: &MemoryPresenter) {
    let row: Vec<String> = (0..9)
        .map(|slot| match presenter.slot(VIEWER, slot) {
            Some(content) => content.name.unwrap_or(content.item),
            None => ".".to_string(),
        })
        .collect();
    println!("  [{}]  title: {:?}", row.join(" | "), presenter.title(VIEWER).unwrap_or_default());
}

fn main() -> spark_menu::Result<()> {
    logging::init("spark_menu=debug");

    println!("=== spark-menu Counter Example ===\n");

    let scheduler = Rc::new(TickScheduler::new());
    let presenter = MemoryPresenter::new();
    let registry: StoreRegistry<ViewerId, i32> = StoreRegistry::new();

    let manager = MenuManager::new(scheduler.clone(), Rc::new(presenter.clone()));
    manager.register(
        Router::builder("main")
            .entry("counter")
            .route(Router::builder("counter").window(counter_window(registry.clone())?))
            .build()?,
    )?;

    let rt = manager.open(VIEWER, "main", &[])?;
    println!("Opened:");
    print_row(&presenter);

    let click = |slot: i32| manager.dispatch(&RawInteraction::new(VIEWER, slot, ClickKind::Primary));

    println!("\nCount up three times:");
    for _ in 0..3 {
        click(8);
    }
    print_row(&presenter);

    println!("\nAnimation frames on the count up button:");
    for _ in 0..3 {
        scheduler.tick();
        print_row(&presenter);
    }

    println!("\nTwenty ticks later:");
    scheduler.advance(20);
    print_row(&presenter);

    println!("\nReset:");
    click(2);
    print_row(&presenter);
    println!("  sounds played: {}", presenter.sounds(VIEWER).len());

    println!("\nClick outside the window:");
    let result = click(-999);
    println!("  cancelled: {}", result.is_cancelled());

    manager.close(VIEWER);
    println!("\nClosed: runtime closed = {}, open = {}", rt.is_closed(), presenter.is_open(VIEWER));
    println!("Stored count survives: {:?}", registry.get(&VIEWER).map(|state| *state.borrow()));

    Ok(())
}
