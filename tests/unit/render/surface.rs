use super::*;

fn opaque(r: u8, g: u8, b: u8) -> Rgba8Premul {
    Rgba8Premul::opaque(r, g, b)
}

fn checker(w: u32, h: u32) -> Surface {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[(x * 10) as u8, (y * 10) as u8, 7, 255]);
        }
    }
    Surface::from_premul_rgba8(w, h, data).unwrap()
}

#[test]
fn zero_or_huge_dims_are_surface_errors() {
    assert!(matches!(
        Surface::new(0, 10),
        Err(SketchreelError::Surface(_))
    ));
    assert!(matches!(
        Surface::new(MAX_SURFACE_DIM + 1, 1),
        Err(SketchreelError::Surface(_))
    ));
    assert!(Surface::from_premul_rgba8(2, 2, vec![0; 3]).is_err());
}

#[test]
fn pixel_span_uses_pixel_centers() {
    assert_eq!(pixel_span(0.0, 1.0, 10), 0..1);
    assert_eq!(pixel_span(0.5, 2.5, 10), 0..2);
    assert_eq!(pixel_span(0.6, 2.4, 10), 1..2);
    assert_eq!(pixel_span(-5.0, 3.0, 2), 0..2);
    assert_eq!(pixel_span(4.0, 4.0, 10), 0..0);
    assert_eq!(pixel_span(f64::NAN, 4.0, 10), 0..4);
}

#[test]
fn adjacent_rects_tile_without_gaps_or_overlap() {
    let mut s = Surface::filled(10, 1, Rgba8Premul::transparent()).unwrap();
    let third = 10.0 / 3.0;
    let colors = [opaque(255, 0, 0), opaque(0, 255, 0), opaque(0, 0, 255)];
    for (i, c) in colors.iter().enumerate() {
        let x0 = third * i as f64;
        let x1 = third * (i + 1) as f64;
        s.fill_rect(Rect::new(x0, 0.0, x1, 1.0), *c);
    }
    for x in 0..10 {
        assert_eq!(s.pixel(x, 0).unwrap()[3], 255, "pixel {x} not covered");
    }
}

#[test]
fn draw_image_identity_copies_pixels() {
    let src = checker(4, 3);
    let mut dst = Surface::filled(4, 3, opaque(0, 0, 0)).unwrap();
    dst.draw_image(&src, src.rect(), dst.rect());
    assert_eq!(dst, src);
}

#[test]
fn draw_image_scales_with_nearest_sampling() {
    let src = checker(2, 2);
    let mut dst = Surface::filled(4, 4, opaque(0, 0, 0)).unwrap();
    dst.draw_image(&src, src.rect(), dst.rect());
    assert_eq!(dst.pixel(0, 0), src.pixel(0, 0));
    assert_eq!(dst.pixel(1, 1), src.pixel(0, 0));
    assert_eq!(dst.pixel(2, 0), src.pixel(1, 0));
    assert_eq!(dst.pixel(3, 3), src.pixel(1, 1));
}

#[test]
fn draw_image_window_matches_full_copy_inside_window() {
    let src = checker(8, 8);
    let mut full = Surface::filled(16, 16, opaque(0, 0, 0)).unwrap();
    full.draw_image(&src, src.rect(), full.rect());

    let mut part = Surface::filled(16, 16, opaque(0, 0, 0)).unwrap();
    part.draw_image(
        &src,
        Rect::new(0.0, 0.0, 3.0, 8.0),
        Rect::new(0.0, 0.0, 6.0, 16.0),
    );
    for y in 0..16 {
        for x in 0..6 {
            assert_eq!(part.pixel(x, y), full.pixel(x, y));
        }
        for x in 6..16 {
            assert_eq!(part.pixel(x, y), Some([0, 0, 0, 255]));
        }
    }
}

#[test]
fn draw_image_ignores_degenerate_rects() {
    let src = checker(2, 2);
    let mut dst = Surface::filled(2, 2, opaque(1, 1, 1)).unwrap();
    let before = dst.clone();
    dst.draw_image(&src, Rect::new(0.0, 0.0, 0.0, 2.0), dst.rect());
    dst.draw_image(&src, src.rect(), Rect::new(1.0, 1.0, 1.0, 1.0));
    dst.draw_image(&src, Rect::new(5.0, 5.0, 6.0, 6.0), dst.rect());
    assert_eq!(dst, before);
}

#[test]
fn flatten_over_makes_surface_opaque() {
    let mut s = Surface::from_premul_rgba8(1, 1, vec![0, 0, 0, 0]).unwrap();
    s.flatten_over(opaque(10, 20, 30));
    assert_eq!(s.pixel(0, 0), Some([10, 20, 30, 255]));
}

#[test]
fn draw_mask_modulates_color_and_clips() {
    let mut s = Surface::filled(3, 1, opaque(255, 255, 255)).unwrap();
    let mask = AlphaMask {
        width: 3,
        height: 1,
        coverage: vec![255, 0, 255],
    };
    s.draw_mask(1, 0, &mask, opaque(0, 0, 0));
    assert_eq!(s.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(s.pixel(1, 0), Some([0, 0, 0, 255]));
    assert_eq!(s.pixel(2, 0), Some([255, 255, 255, 255]));
}

#[test]
fn composite_handles_negative_offsets() {
    let src = Surface::filled(2, 2, opaque(9, 9, 9)).unwrap();
    let mut dst = Surface::filled(3, 3, opaque(0, 0, 0)).unwrap();
    dst.composite(&src, -1, -1);
    assert_eq!(dst.pixel(0, 0), Some([9, 9, 9, 255]));
    assert_eq!(dst.pixel(1, 0), Some([0, 0, 0, 255]));
    assert_eq!(dst.pixel(0, 1), Some([0, 0, 0, 255]));
}

#[test]
fn crop_extracts_region() {
    let src = checker(4, 4);
    let c = src.crop(Rect::new(1.0, 2.0, 3.0, 4.0)).unwrap();
    assert_eq!((c.width(), c.height()), (2, 2));
    assert_eq!(c.pixel(0, 0), src.pixel(1, 2));
    assert_eq!(c.pixel(1, 1), src.pixel(2, 3));
}

#[test]
fn clipped_draw_paints_pieces_identical_to_whole() {
    let src = checker(7, 5);
    let dst_rect = Rect::new(3.3, 1.7, 90.1, 41.9);
    let mut whole = Surface::filled(96, 48, opaque(9, 9, 9)).unwrap();
    whole.draw_image(&src, src.rect(), dst_rect);

    let mut pieces = Surface::filled(96, 48, opaque(9, 9, 9)).unwrap();
    let mut prev = dst_rect.x1;
    for k in (0..7).rev() {
        let x0 = dst_rect.x0 + dst_rect.width() * f64::from(k) / 7.0;
        pieces.draw_image_clipped(
            &src,
            src.rect(),
            dst_rect,
            Rect::new(x0, dst_rect.y0, prev, dst_rect.y1),
        );
        prev = x0;
    }
    assert_eq!(pieces, whole);
}

#[test]
fn copy_replaces_translucent_pixels_instead_of_stacking() {
    let half = Rgba8Premul::from_straight_rgba(255, 255, 255, 128);
    let src = Surface::filled(4, 4, half).unwrap();
    let dst_rect = Rect::new(0.0, 0.0, 8.0, 8.0);

    let mut once = Surface::new(8, 8).unwrap();
    once.copy_image_clipped(&src, src.rect(), dst_rect, dst_rect);

    let mut growing = Surface::new(8, 8).unwrap();
    for i in 1..=8 {
        let window = Rect::new(0.0, 0.0, 8.0, f64::from(i));
        growing.copy_image_clipped(&src, src.rect(), dst_rect, window);
    }
    growing.copy_image_clipped(&src, src.rect(), dst_rect, dst_rect);

    assert_eq!(growing, once);
    assert_eq!(growing.pixel(3, 0), Some(half.to_array()));
    assert_eq!(growing.pixel(3, 7), Some(half.to_array()));

    // Blending the same windows darkens the rows that were drawn most often.
    let mut blended = Surface::new(8, 8).unwrap();
    for i in 1..=8 {
        let window = Rect::new(0.0, 0.0, 8.0, f64::from(i));
        blended.draw_image_clipped(&src, src.rect(), dst_rect, window);
    }
    assert_ne!(blended.pixel(3, 0), blended.pixel(3, 7));
}
