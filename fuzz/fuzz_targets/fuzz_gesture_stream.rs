#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use infipage_core::{
    FailFlag, GestureEnd, GestureUpdate, Orientation, Pager, PagerConfig, PagerContext,
    SetPageOptions, TouchPoint, Viewport,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    outer_vertical: bool,
    inner_vertical: bool,
    min: Option<i8>,
    span: Option<u8>,
    bounce: u8,
    buffer: u8,
    ops: Vec<Op>,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Begin { inner: bool, x: i16, y: i16 },
    Move { inner: bool, x: i16, y: i16 },
    Update { inner: bool, dx: i16, dy: i16, vx: i16, vy: i16 },
    End { inner: bool, vx: i16, vy: i16, dx: i16, dy: i16 },
    Finalize { inner: bool },
    Frame { ms: u8 },
    Layout { inner: bool, width: u16, height: u16 },
    SetPage { inner: bool, index: i8, animated: bool },
    Step { inner: bool, forward: bool, animated: bool },
    Disable { inner: bool, disabled: bool },
    Rearm,
}

fn orientation(vertical: bool) -> Orientation {
    if vertical {
        Orientation::Vertical
    } else {
        Orientation::Horizontal
    }
}

fuzz_target!(|input: Input| {
    let min = input.min.map(i64::from);
    let max = match (min, input.span) {
        (Some(min), Some(span)) => Some(min + i64::from(span % 16)),
        (None, Some(span)) => Some(i64::from(span % 16)),
        _ => None,
    };
    let config = |vertical: bool| {
        PagerConfig::default()
            .orientation(orientation(vertical))
            .bounds(min, max)
            .bounce_pct(f64::from(input.bounce) / 255.0)
            .page_buffer(usize::from(input.buffer % 4))
    };

    let ctx = PagerContext::root();
    let Ok(mut outer) = Pager::builder(config(input.outer_vertical))
        .render_page(|_| ())
        .build(&ctx)
    else {
        return;
    };
    let Ok(mut inner) = Pager::builder(config(input.inner_vertical))
        .render_page(|_| ())
        .build(&ctx.child())
    else {
        return;
    };
    outer.set_viewport(Viewport::new(320.0, 480.0));
    inner.set_viewport(Viewport::new(320.0, 480.0));

    for op in input.ops.iter().take(512) {
        match *op {
            Op::Begin { inner: pick, x, y } => {
                let pager = if pick { &mut inner } else { &mut outer };
                pager.on_begin(f64::from(x), f64::from(y));
            }
            Op::Move { inner: pick, x, y } => {
                let pager = if pick { &mut inner } else { &mut outer };
                let touches = [TouchPoint::new(0, f64::from(x), f64::from(y))];
                pager.on_touches_move(&touches, &mut FailFlag::default());
            }
            Op::Update { inner: pick, dx, dy, vx, vy } => {
                let pager = if pick { &mut inner } else { &mut outer };
                pager.on_update(GestureUpdate {
                    translation_x: f64::from(dx),
                    translation_y: f64::from(dy),
                    velocity_x: f64::from(vx) * 4.0,
                    velocity_y: f64::from(vy) * 4.0,
                });
            }
            Op::End { inner: pick, vx, vy, dx, dy } => {
                let pager = if pick { &mut inner } else { &mut outer };
                pager.on_end(GestureEnd {
                    velocity_x: f64::from(vx) * 4.0,
                    velocity_y: f64::from(vy) * 4.0,
                    translation_x: f64::from(dx),
                    translation_y: f64::from(dy),
                });
            }
            Op::Finalize { inner: pick } => {
                let pager = if pick { &mut inner } else { &mut outer };
                pager.on_finalize();
            }
            Op::Frame { ms } => {
                let dt = Duration::from_millis(u64::from(ms));
                outer.frame(dt);
                inner.frame(dt);
            }
            Op::Layout { inner: pick, width, height } => {
                let pager = if pick { &mut inner } else { &mut outer };
                pager.set_viewport(Viewport::new(f64::from(width), f64::from(height)));
            }
            Op::SetPage { inner: pick, index, animated } => {
                let pager = if pick { &mut inner } else { &mut outer };
                pager.set_page(i64::from(index), SetPageOptions { animated });
            }
            Op::Step { inner: pick, forward, animated } => {
                let pager = if pick { &mut inner } else { &mut outer };
                if forward {
                    pager.increment_page(SetPageOptions { animated });
                } else {
                    pager.decrement_page(SetPageOptions { animated });
                }
            }
            Op::Disable { inner: pick, disabled } => {
                let pager = if pick { &mut inner } else { &mut outer };
                pager.set_gestures_disabled(disabled);
            }
            Op::Rearm => {
                outer.rearm();
            }
        }

        for pager in [&outer, &inner] {
            assert!(pager.translation().is_finite(), "{pager:?}");
            assert!(pager.page_position().is_finite(), "{pager:?}");
            let bounds = pager.config().page_bounds();
            assert!(bounds.contains(pager.current_page()), "{pager:?}");
            for props in pager.visible_pages() {
                assert!(props.focus.is_finite(), "{pager:?}");
                assert!(bounds.contains(props.index), "{pager:?}");
            }
        }
    }
    outer.flush_page_changes();
    inner.flush_page_changes();
});
