//! Property-based invariant tests for the pager state machine.
//!
//! Arbitrary interleavings of touch callbacks, frames, layout changes and
//! programmatic jumps must never:
//!
//! 1. produce a NaN or infinite translation or page position
//! 2. commit a page outside the configured bounds
//! 3. leave an idle pager off its page's rest translation
//! 4. notify the same page twice in a row

use std::time::Duration;

use infipage_core::{
    FailFlag, GestureEnd, GestureUpdate, PageChange, Pager, PagerConfig, PagerContext,
    SetPageOptions, TouchPoint, Viewport,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Begin,
    Move(f64),
    Update(f64, f64),
    End(f64, f64),
    Finalize,
    Frame(u64),
    Resize(f64),
    SetPage(i64, bool),
    Increment(bool),
    Decrement(bool),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Begin),
        (-900.0..900.0f64).prop_map(Op::Move),
        (-900.0..900.0f64, -60.0..60.0f64).prop_map(|(x, y)| Op::Update(x, y)),
        (-4000.0..4000.0f64, -900.0..900.0f64).prop_map(|(v, t)| Op::End(v, t)),
        Just(Op::Finalize),
        (1u64..250).prop_map(Op::Frame),
        prop_oneof![Just(0.0), 50.0..800.0f64].prop_map(Op::Resize),
        (-8i64..8, any::<bool>()).prop_map(|(i, a)| Op::SetPage(i, a)),
        any::<bool>().prop_map(Op::Increment),
        any::<bool>().prop_map(Op::Decrement),
    ]
}

fn config_strategy() -> impl Strategy<Value = PagerConfig> {
    (
        prop::option::of(-5i64..=0),
        prop::option::of(0i64..=5),
        prop_oneof![Just(0.0), Just(0.5), Just(1.0), 0.0..=1.0f64],
        0usize..4,
        -8i64..8,
    )
        .prop_map(|(min, max, bounce, buffer, initial)| {
            PagerConfig::default()
                .bounds(min, max)
                .bounce_pct(bounce)
                .page_buffer(buffer)
                .initial_index(initial)
        })
}

fn apply(pager: &mut Pager<()>, op: &Op) {
    let options = |animated: bool| SetPageOptions { animated };
    match *op {
        Op::Begin => pager.on_begin(0.0, 0.0),
        Op::Move(x) => {
            pager.on_touches_move(&[TouchPoint::new(0, x, 0.0)], &mut FailFlag::default());
        }
        Op::Update(x, y) => pager.on_update(GestureUpdate {
            translation_x: x,
            translation_y: y,
            velocity_x: 0.0,
            velocity_y: 0.0,
        }),
        Op::End(velocity, translation) => pager.on_end(GestureEnd {
            velocity_x: velocity,
            translation_x: translation,
            ..Default::default()
        }),
        Op::Finalize => pager.on_finalize(),
        Op::Frame(ms) => {
            pager.frame(Duration::from_millis(ms));
        }
        Op::Resize(width) => pager.set_viewport(Viewport::new(width, 400.0)),
        Op::SetPage(index, animated) => pager.set_page(index, options(animated)),
        Op::Increment(animated) => pager.increment_page(options(animated)),
        Op::Decrement(animated) => pager.decrement_page(options(animated)),
    }
}

fn run_to_rest(pager: &mut Pager<()>) {
    pager.on_end(GestureEnd::default());
    pager.on_finalize();
    for _ in 0..5000 {
        if !pager.frame(Duration::from_millis(16)) {
            break;
        }
    }
}

fn build(config: PagerConfig) -> Pager<()> {
    let mut pager = Pager::builder(config)
        .render_page(|_| ())
        .build(&PagerContext::root())
        .unwrap();
    pager.set_viewport(Viewport::new(300.0, 400.0));
    pager
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Numbers stay finite
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn translation_never_nan(
        config in config_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..80),
    ) {
        let mut pager = build(config);
        for op in &ops {
            apply(&mut pager, op);
            prop_assert!(pager.translation().is_finite(), "after {op:?}: {pager:?}");
            prop_assert!(pager.page_position().is_finite(), "after {op:?}: {pager:?}");
            for props in pager.visible_pages() {
                prop_assert!(props.focus.is_finite());
                prop_assert!(props.transform.translate_x.is_finite());
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Commits respect bounds
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn committed_page_within_bounds(
        config in config_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..80),
    ) {
        let bounds = config.page_bounds();
        let mut pager = build(config);
        prop_assert!(bounds.contains(pager.current_page()));
        for op in &ops {
            apply(&mut pager, op);
            prop_assert!(bounds.contains(pager.current_page()), "after {op:?}: {pager:?}");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Rest invariant
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn idle_pager_sits_on_rest_translation(
        config in config_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..60),
        width in 50.0..800.0f64,
    ) {
        let mut pager = build(config);
        for op in &ops {
            apply(&mut pager, op);
        }
        pager.set_viewport(Viewport::new(width, 400.0));
        run_to_rest(&mut pager);

        prop_assert!(pager.is_idle(), "{pager:?}");
        let expected = -(pager.current_page() as f64) * pager.page_size();
        prop_assert!(
            (pager.translation() - expected).abs() < 1e-6,
            "translation {} expected {} on page {}",
            pager.translation(),
            expected,
            pager.current_page()
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Notifications are transitions
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn notifications_chain_without_repeats(
        config in config_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..80),
    ) {
        let mut pager = build(config);
        let start = pager.current_page();
        let feed = pager.take_page_change_feed().unwrap();
        for op in &ops {
            apply(&mut pager, op);
        }
        let changes: Vec<PageChange> = feed.drain();
        let mut previous = start;
        for change in &changes {
            prop_assert_eq!(change.previous, previous);
            prop_assert_ne!(change.page, change.previous);
            previous = change.page;
        }
        prop_assert_eq!(previous, pager.current_page());
    }
}
