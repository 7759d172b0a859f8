use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::rc::Rc;

use waterfall_foundation::{is_visible, ItemKey, MasonryLayoutState, ViewportState};
use waterfall_testing::{HeadlessSurface, MeasuredBox};
use waterfall_ui::{ColumnCount, Masonry, MasonryArgs};

fn bench_pack(c: &mut Criterion) {
    c.bench_function("pack_2000_items", |b| {
        b.iter(|| {
            let mut state: MasonryLayoutState<usize> = MasonryLayoutState::new();
            state.reset(4, 240.0, 16.0);
            for i in 0..2000usize {
                let height = 120.0 + (i % 7) as f32 * 40.0;
                state.commit(ItemKey(i as u64), i, height, i);
            }
            black_box(state.content_height())
        })
    });
}

fn bench_visibility_pass(c: &mut Criterion) {
    let mut state: MasonryLayoutState<usize> = MasonryLayoutState::new();
    state.reset(4, 240.0, 16.0);
    let mut spans = Vec::new();
    for i in 0..2000usize {
        let height = 120.0 + (i % 7) as f32 * 40.0;
        state.commit(ItemKey(i as u64), i, height, i);
        let placed = state.positioned(ItemKey(i as u64)).unwrap();
        spans.push((placed.y, placed.bottom));
    }
    let viewport = ViewportState {
        scroll_offset: 24_000.0,
        viewport_extent: 1080.0,
    };

    c.bench_function("visibility_scan_2000_items", |b| {
        b.iter(|| {
            let mut visible = 0usize;
            for &(top, bottom) in &spans {
                if is_visible(top, bottom, black_box(viewport), 800.0) {
                    visible += 1;
                }
            }
            black_box(visible)
        })
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    c.bench_function("measure_pipeline_500_items", |b| {
        b.iter(|| {
            let surface = HeadlessSurface::new();
            let masonry: Masonry<u64, _> = Masonry::new(
                MasonryArgs::new(
                    |item: &u64| *item,
                    |item, _slot| MeasuredBox::new(100.0 + (*item % 5) as f32 * 30.0),
                )
                .columns(ColumnCount::Fixed(4))
                .gutter(12.0)
                .pre_render_number(40),
                Rc::new(surface.clone()),
                None,
            );
            masonry.set_data((0..500u64).collect());
            masonry.handle_resize(1280.0, 0.0);
            surface.pump_to_idle();
            black_box(masonry.content_height())
        })
    });
}

criterion_group!(
    benches,
    bench_pack,
    bench_visibility_pass,
    bench_full_pipeline
);
criterion_main!(benches);
