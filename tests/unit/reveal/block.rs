use super::*;
use crate::foundation::core::{Canvas, Rgba8Premul};

fn gradient(w: u32, h: u32) -> Surface {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[(x * 3) as u8, (y * 5) as u8, ((x + y) % 256) as u8, 255]);
        }
    }
    Surface::from_premul_rgba8(w, h, data).unwrap()
}

#[test]
fn step_count_follows_source_extent() {
    let src = Rect::new(0.0, 0.0, 50.0, 33.3);
    let dst = Rect::new(0.0, 0.0, 100.0, 66.6);
    assert_eq!(Sweep::new(src, dst, Direction::TopToBottom).steps(), 34);
    assert_eq!(Sweep::new(src, dst, Direction::LeftToRight).steps(), 50);
    assert_eq!(Sweep::new(src, dst, Direction::LeftToRight).len(), 50);
    let thin = Rect::new(0.0, 0.0, 0.4, 0.4);
    assert_eq!(Sweep::new(thin, thin, Direction::BottomToTop).steps(), 1);
}

#[test]
fn last_step_covers_the_full_block() {
    let src = Rect::new(10.0, 20.0, 13.7, 25.5);
    let dst = Rect::new(100.0, 200.0, 137.0, 255.0);
    for d in Direction::ALL {
        let last = Sweep::new(src, dst, d).last().unwrap();
        assert_eq!(last.ratio, 1.0);
        assert_eq!(last.src, src, "{d}");
        assert_eq!(last.dst, dst, "{d}");
    }
}

#[test]
fn top_to_bottom_grows_from_the_top_edge() {
    let src = Rect::new(0.0, 0.0, 4.0, 4.0);
    let dst = Rect::new(0.0, 0.0, 8.0, 8.0);
    let steps: Vec<_> = Sweep::new(src, dst, Direction::TopToBottom).collect();
    assert_eq!(steps.len(), 4);
    assert_eq!(steps[0].src, Rect::new(0.0, 0.0, 4.0, 1.0));
    assert_eq!(steps[0].dst, Rect::new(0.0, 0.0, 8.0, 2.0));
    assert_eq!(steps[1].ratio, 0.5);
}

#[test]
fn bottom_to_top_and_right_to_left_anchor_at_far_edge() {
    let src = Rect::new(0.0, 0.0, 4.0, 4.0);
    let dst = Rect::new(10.0, 10.0, 18.0, 18.0);
    let first = Sweep::new(src, dst, Direction::BottomToTop).next().unwrap();
    assert_eq!(first.src, Rect::new(0.0, 3.0, 4.0, 4.0));
    assert_eq!(first.dst, Rect::new(10.0, 16.0, 18.0, 18.0));

    let first = Sweep::new(src, dst, Direction::RightToLeft).next().unwrap();
    assert_eq!(first.src, Rect::new(3.0, 0.0, 4.0, 4.0));
    assert_eq!(first.dst, Rect::new(16.0, 10.0, 18.0, 18.0));
}

#[test]
fn ratios_increase_monotonically() {
    let src = Rect::new(0.0, 0.0, 9.5, 9.5);
    let dst = Rect::new(0.0, 0.0, 19.0, 19.0);
    let ratios: Vec<f64> = Sweep::new(src, dst, Direction::LeftToRight)
        .map(|s| s.ratio)
        .collect();
    assert!(ratios.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(*ratios.last().unwrap(), 1.0);
}

#[test]
fn swept_block_matches_one_shot_paint() {
    let image = gradient(30, 20);
    let frame = Canvas {
        width: 97,
        height: 71,
    };
    let grid = GridModel::new(30, 20, 3, 4, frame).unwrap();
    let bg = Rgba8Premul::opaque(255, 255, 255);

    for d in Direction::ALL {
        let r = BlockRevealRenderer::new(&grid, &image, d).unwrap();
        let mut swept = Surface::filled(frame.width, frame.height, bg).unwrap();
        let mut whole = swept.clone();
        for id in grid.blocks() {
            for step in r.sweep(id) {
                r.paint_step(&mut swept, id, &step);
            }
        }
        r.paint_all(&mut whole);
        assert_eq!(swept, whole, "{d}");
    }
}

#[test]
fn renderer_rejects_mismatched_image() {
    let image = gradient(10, 10);
    let grid = GridModel::new(
        20,
        10,
        1,
        1,
        Canvas {
            width: 10,
            height: 10,
        },
    )
    .unwrap();
    assert!(BlockRevealRenderer::new(&grid, &image, Direction::TopToBottom).is_err());
}

#[test]
fn translucent_image_sweeps_without_stacking() {
    let veil = Rgba8Premul::from_straight_rgba(255, 255, 255, 128);
    let image = Surface::filled(12, 9, veil).unwrap();
    let frame = Canvas {
        width: 24,
        height: 18,
    };
    let grid = GridModel::new(12, 9, 1, 2, frame).unwrap();

    for d in Direction::ALL {
        let r = BlockRevealRenderer::new(&grid, &image, d).unwrap();
        let mut swept = Surface::filled(frame.width, frame.height, veil).unwrap();
        for id in grid.blocks() {
            for step in r.sweep(id) {
                r.paint_step(&mut swept, id, &step);
            }
        }
        assert!(
            swept.data().chunks_exact(4).all(|px| px == veil.to_array()),
            "{d}"
        );

        let before = swept.clone();
        r.paint_all(&mut swept);
        assert_eq!(swept, before, "{d}");
    }
}
