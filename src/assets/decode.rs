use crate::foundation::error::{SketchreelError, SketchreelResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::render::surface::Surface;

/// Decode raster bytes (any format `image` understands: BMP, PNG, JPEG, ...) into a
/// premultiplied surface at the image's native size.
pub fn decode_image(bytes: &[u8]) -> SketchreelResult<Surface> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| SketchreelError::decode(format!("failed to decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Surface::from_premul_rgba8(width, height, rgba8_premul)
}

pub fn parse_svg(bytes: &[u8]) -> SketchreelResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| SketchreelError::decode(format!("failed to parse svg: {e}")))
}
