use crate::foundation::error::{SketchreelError, SketchreelResult};
use crate::render::surface::{MAX_SURFACE_DIM, Surface};

/// Built-in cursor: a pen held by a hand, drawn with its nib at the bottom-left corner.
pub const DEFAULT_CURSOR_SVG: &str = include_str!("../../assets/hand.svg");

/// Rasterize `tree` stretched to exactly `width x height` pixels.
pub fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> SketchreelResult<Surface> {
    if width == 0 || height == 0 || width > MAX_SURFACE_DIM || height > MAX_SURFACE_DIM {
        return Err(SketchreelError::surface(format!(
            "invalid svg raster size {width}x{height}"
        )));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| SketchreelError::surface("failed to allocate svg pixmap"))?;

    let size = tree.size();
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    // tiny-skia pixmaps are premultiplied RGBA8, matching `Surface`.
    Surface::from_premul_rgba8(width, height, pixmap.data().to_vec())
}
