//! Mock feed demo: an infinite-scrolling masonry driven against the
//! headless hosts, printing the packed layout as it grows.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use waterfall_testing::{HeadlessSurface, MeasuredBox, ScriptedScrollContainer};
use waterfall_ui::{ColumnCount, Masonry, MasonryArgs};

const PAGE_SIZE: u64 = 15;
const VIEWPORT: f32 = 900.0;

#[derive(Clone, Debug)]
struct FeedCard {
    id: u64,
    aspect_ratio: f32,
}

fn fetch_page(page: u64) -> Vec<FeedCard> {
    (0..PAGE_SIZE)
        .map(|i| {
            let id = page * PAGE_SIZE + i;
            FeedCard {
                id,
                aspect_ratio: 0.6 + (id % 7) as f32 * 0.15,
            }
        })
        .collect()
}

fn main() {
    env_logger::init();

    let surface = HeadlessSurface::new();
    let scroll = ScriptedScrollContainer::new(VIEWPORT);

    let load_more = Rc::new(Cell::new(false));
    let reach = Rc::clone(&load_more);

    let args = MasonryArgs::new(
        |card: &FeedCard| card.id,
        |card: &FeedCard, slot| {
            // Image box scaled by aspect ratio plus a caption line.
            MeasuredBox::new(slot.width * card.aspect_ratio + 48.0)
        },
    )
    .columns(ColumnCount::responsive(
        1,
        [
            (800.0, 2),
            (1100.0, 3),
            (1400.0, 4),
            (1700.0, 5),
            (2000.0, 6),
        ],
    ))
    .gutter(20.0)
    .pre_render_number(PAGE_SIZE as usize)
    .bottom_threshold(100.0)
    .on_reach_bottom(move || reach.set(true));

    let masonry = Masonry::new(
        args,
        Rc::new(surface.clone()),
        Some(Rc::new(scroll.clone())),
    );

    let mut data = fetch_page(0);
    masonry.set_data(data.clone());
    masonry.handle_resize(1440.0, 0.0);
    surface.pump_to_idle();
    scroll.set_content_extent(masonry.content_height());

    println!(
        "initial layout: {} cards in {} columns ({:.0}px wide), content {:.0}px tall",
        data.len(),
        masonry.column_heights().len(),
        masonry.col_width(),
        masonry.content_height()
    );

    // Scroll to the bottom repeatedly; each arrival pages in more cards.
    for _ in 0..4 {
        let target = (masonry.content_height() - VIEWPORT).max(0.0);
        scroll.scroll_to(target);
        masonry.handle_scroll();

        // A frame later the debounced trailing update settles.
        std::thread::sleep(Duration::from_millis(16));
        masonry.tick();

        if load_more.take() {
            let page = data.len() as u64 / PAGE_SIZE;
            data.extend(fetch_page(page));
            masonry.set_data(data.clone());
            surface.pump_to_idle();
            scroll.set_content_extent(masonry.content_height());
        }

        println!(
            "scrolled to {:.0}px: {}/{} cards mounted, content {:.0}px tall",
            masonry.viewport().scroll_offset,
            masonry.visible_items().len(),
            data.len(),
            masonry.content_height()
        );
    }

    let rendered = masonry.render_visible();
    println!("final render pass mounted {} cards", rendered.len());
}
