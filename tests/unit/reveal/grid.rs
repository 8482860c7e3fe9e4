use super::*;

fn frame(w: u32, h: u32) -> Canvas {
    Canvas {
        width: w,
        height: h,
    }
}

#[test]
fn block_id_text_form_round_trips() {
    let id: BlockId = "1-0".parse().unwrap();
    assert_eq!(id, BlockId::new(1, 0));
    assert_eq!(id.to_string(), "1-0");
    assert_eq!(" 12-3 ".parse::<BlockId>().unwrap(), BlockId::new(12, 3));
}

#[test]
fn block_id_rejects_garbage() {
    for s in ["", "1", "1-", "-1", "a-b", "1-2-3", "1_2"] {
        assert!(
            matches!(s.parse::<BlockId>(), Err(SketchreelError::InvalidInput(_))),
            "{s:?}"
        );
    }
}

#[test]
fn rejects_zero_dimensions() {
    assert!(GridModel::new(10, 10, 0, 1, frame(10, 10)).is_err());
    assert!(GridModel::new(10, 10, 1, 0, frame(10, 10)).is_err());
    assert!(GridModel::new(0, 10, 1, 1, frame(10, 10)).is_err());
    assert!(GridModel::new(10, 10, 1, 1, frame(0, 10)).is_err());
}

#[test]
fn blocks_are_raster_order() {
    let g = GridModel::new(30, 20, 2, 3, frame(300, 200)).unwrap();
    let ids: Vec<String> = g.blocks().map(|b| b.to_string()).collect();
    assert_eq!(ids, ["0-0", "0-1", "0-2", "1-0", "1-1", "1-2"]);
    assert_eq!(g.len(), 6);
}

#[test]
fn source_rects_allow_fractional_blocks() {
    let g = GridModel::new(10, 10, 3, 3, frame(10, 10)).unwrap();
    let r = g.src_rect(BlockId::new(1, 2));
    assert!((r.x0 - 20.0 / 3.0).abs() < 1e-12);
    assert_eq!(r.x1, 10.0);
    assert!((r.height() - 10.0 / 3.0).abs() < 1e-12);
}

#[test]
fn wide_image_fits_width_and_centers_vertically() {
    let g = GridModel::new(200, 100, 1, 1, frame(400, 400)).unwrap();
    assert_eq!(g.fitted_rect(), Rect::new(0.0, 100.0, 400.0, 300.0));
}

#[test]
fn tall_image_is_height_limited_and_centered_horizontally() {
    let g = GridModel::new(100, 100, 2, 2, frame(1280, 720)).unwrap();
    assert_eq!(g.fitted_rect(), Rect::new(280.0, 0.0, 1000.0, 720.0));
    assert_eq!(g.dst_rect(BlockId::new(0, 0)), Rect::new(280.0, 0.0, 640.0, 360.0));
    assert_eq!(g.dst_rect(BlockId::new(1, 1)), Rect::new(640.0, 360.0, 1000.0, 720.0));
}

#[test]
fn destination_cells_tile_exactly_and_stay_in_frame() {
    let g = GridModel::new(97, 61, 7, 5, frame(333, 211)).unwrap();
    let f = g.frame();
    for id in g.blocks() {
        let d = g.dst_rect(id);
        assert!(d.x0 >= 0.0 && d.y0 >= 0.0);
        assert!(d.x1 <= f64::from(f.width) && d.y1 <= f64::from(f.height));
        if id.col + 1 < g.cols() {
            assert_eq!(d.x1, g.dst_rect(BlockId::new(id.row, id.col + 1)).x0);
        }
        if id.row + 1 < g.rows() {
            assert_eq!(d.y1, g.dst_rect(BlockId::new(id.row + 1, id.col)).y0);
        }
    }
    let last = g.dst_rect(BlockId::new(6, 4));
    assert_eq!(last.x1, g.fitted_rect().x1);
    assert_eq!(last.y1, g.fitted_rect().y1);
}
