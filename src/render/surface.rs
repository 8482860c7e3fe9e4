use std::ops::Range;

use crate::foundation::core::{Rect, Rgba8Premul};
use crate::foundation::error::{SketchreelError, SketchreelResult};
use crate::foundation::math::{mul_div255_u8, premul_over_px};
use crate::render::frame::FrameRGBA;

/// Largest width or height a surface may have.
pub const MAX_SURFACE_DIM: u32 = 16_384;

/// An 8-bit coverage mask, e.g. one rasterized glyph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlphaMask {
    pub width: u32,
    pub height: u32,
    /// Row-major coverage, one byte per pixel.
    pub coverage: Vec<u8>,
}

impl AlphaMask {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Owned premultiplied RGBA8 drawing surface.
///
/// All drawing uses pixel-center coverage: a pixel is touched when its center lies in the
/// half-open destination rectangle. Scaled image copies sample the nearest source pixel, so the
/// same source/destination pair always produces the same pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    frame: FrameRGBA,
}

impl Surface {
    /// Allocate a fully transparent surface.
    pub fn new(width: u32, height: u32) -> SketchreelResult<Self> {
        check_dims(width, height)?;
        Ok(Self {
            frame: FrameRGBA {
                width,
                height,
                data: vec![0u8; FrameRGBA::byte_len(width, height)],
                premultiplied: true,
            },
        })
    }

    /// Allocate a surface cleared to `color`.
    pub fn filled(width: u32, height: u32, color: Rgba8Premul) -> SketchreelResult<Self> {
        let mut s = Self::new(width, height)?;
        s.clear(color);
        Ok(s)
    }

    /// Wrap existing premultiplied RGBA8 bytes.
    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> SketchreelResult<Self> {
        check_dims(width, height)?;
        if data.len() != FrameRGBA::byte_len(width, height) {
            return Err(SketchreelError::surface(format!(
                "pixel buffer has {} bytes, expected {} for {width}x{height}",
                data.len(),
                FrameRGBA::byte_len(width, height)
            )));
        }
        Ok(Self {
            frame: FrameRGBA {
                width,
                height,
                data,
                premultiplied: true,
            },
        })
    }

    pub fn width(&self) -> u32 {
        self.frame.width
    }

    pub fn height(&self) -> u32 {
        self.frame.height
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width()), f64::from(self.height()))
    }

    pub fn data(&self) -> &[u8] {
        &self.frame.data
    }

    /// The current contents as a frame, borrowed for a sink.
    pub fn frame(&self) -> &FrameRGBA {
        &self.frame
    }

    pub fn into_frame(self) -> FrameRGBA {
        self.frame
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.frame.pixel(x, y)
    }

    pub fn clear(&mut self, color: Rgba8Premul) {
        let rgba = color.to_array();
        for px in self.frame.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Source-over fill of the pixels whose centers fall inside `rect`.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba8Premul) {
        let xs = pixel_span(rect.x0, rect.x1, self.width());
        let ys = pixel_span(rect.y0, rect.y1, self.height());
        let src = color.to_array();
        let stride = self.width() as usize;
        for y in ys {
            for x in xs.clone() {
                let i = (y * stride + x) * 4;
                blend_at(&mut self.frame.data, i, src);
            }
        }
    }

    /// Composite every pixel over `bg`, leaving an opaque surface when `bg` is opaque.
    pub fn flatten_over(&mut self, bg: Rgba8Premul) {
        let bg = bg.to_array();
        for px in self.frame.data.chunks_exact_mut(4) {
            let out = premul_over_px(bg, [px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&out);
        }
    }

    /// Copy the `src_rect` window of `src` scaled onto `dst_rect` of this surface (source-over).
    ///
    /// Each destination pixel samples the source pixel under the matching point of the
    /// source window, clamped to that window.
    pub fn draw_image(&mut self, src: &Surface, src_rect: Rect, dst_rect: Rect) {
        self.draw_image_clipped(src, src_rect, dst_rect, dst_rect);
    }

    /// Like [`Surface::draw_image`], but only pixels whose centers fall inside `clip` are
    /// written. The source-to-destination mapping is always the one of the full rectangles, so
    /// painting a rectangle piecewise yields the same pixels as painting it at once.
    pub fn draw_image_clipped(
        &mut self,
        src: &Surface,
        src_rect: Rect,
        dst_rect: Rect,
        clip: Rect,
    ) {
        self.blit_image(src, src_rect, dst_rect, clip, BlitMode::SourceOver);
    }

    /// Like [`Surface::draw_image_clipped`], but sampled pixels replace the destination instead
    /// of blending over it. Repeated copies of the same window leave the pixels unchanged, even
    /// when the source is translucent.
    pub fn copy_image_clipped(
        &mut self,
        src: &Surface,
        src_rect: Rect,
        dst_rect: Rect,
        clip: Rect,
    ) {
        self.blit_image(src, src_rect, dst_rect, clip, BlitMode::Copy);
    }

    fn blit_image(
        &mut self,
        src: &Surface,
        src_rect: Rect,
        dst_rect: Rect,
        clip: Rect,
        mode: BlitMode,
    ) {
        if !(dst_rect.width() > 0.0
            && dst_rect.height() > 0.0
            && src_rect.width() > 0.0
            && src_rect.height() > 0.0)
        {
            return;
        }

        let Some(cols) = clamp_source_span(src_rect.x0, src_rect.x1, src.width()) else {
            return;
        };
        let Some(rows) = clamp_source_span(src_rect.y0, src_rect.y1, src.height()) else {
            return;
        };

        let xs = intersect(
            pixel_span(dst_rect.x0, dst_rect.x1, self.width()),
            pixel_span(clip.x0, clip.x1, self.width()),
        );
        let ys = intersect(
            pixel_span(dst_rect.y0, dst_rect.y1, self.height()),
            pixel_span(clip.y0, clip.y1, self.height()),
        );
        if xs.is_empty() || ys.is_empty() {
            return;
        }

        let sx_scale = src_rect.width() / dst_rect.width();
        let sy_scale = src_rect.height() / dst_rect.height();
        let col_map: Vec<usize> = xs
            .clone()
            .map(|x| sample_index(x, dst_rect.x0, src_rect.x0, sx_scale, &cols))
            .collect();

        let dst_stride = self.width() as usize;
        let src_stride = src.width() as usize;
        for y in ys {
            let sy = sample_index(y, dst_rect.y0, src_rect.y0, sy_scale, &rows);
            let src_row = sy * src_stride;
            let dst_row = y * dst_stride;
            for (x, &sx) in xs.clone().zip(col_map.iter()) {
                let si = (src_row + sx) * 4;
                let s = &src.frame.data[si..si + 4];
                let di = (dst_row + x) * 4;
                match mode {
                    BlitMode::SourceOver => {
                        blend_at(&mut self.frame.data, di, [s[0], s[1], s[2], s[3]]);
                    }
                    BlitMode::Copy => self.frame.data[di..di + 4].copy_from_slice(s),
                }
            }
        }
    }

    /// Fill `mask` at integer offset `(x, y)` with `color`, modulated by coverage.
    pub fn draw_mask(&mut self, x: i32, y: i32, mask: &AlphaMask, color: Rgba8Premul) {
        if mask.is_empty() {
            return;
        }
        let [r, g, b, a] = color.to_array();
        self.for_each_overlap(x, y, mask.width, mask.height, |data, di, mi| {
            let c = u16::from(mask.coverage[mi]);
            if c == 0 {
                return;
            }
            let src = [
                mul_div255_u8(u16::from(r), c),
                mul_div255_u8(u16::from(g), c),
                mul_div255_u8(u16::from(b), c),
                mul_div255_u8(u16::from(a), c),
            ];
            blend_at(data, di, src);
        });
    }

    /// Source-over `src` at integer offset `(x, y)`.
    pub fn composite(&mut self, src: &Surface, x: i32, y: i32) {
        let src_data = &src.frame.data;
        self.for_each_overlap(x, y, src.width(), src.height(), |data, di, si| {
            let s = &src_data[si * 4..si * 4 + 4];
            blend_at(data, di, [s[0], s[1], s[2], s[3]]);
        });
    }

    /// Copy the pixels whose centers lie in `rect` into a new surface.
    pub fn crop(&self, rect: Rect) -> SketchreelResult<Surface> {
        let xs = pixel_span(rect.x0, rect.x1, self.width());
        let ys = pixel_span(rect.y0, rect.y1, self.height());
        let w = xs.len() as u32;
        let h = ys.len() as u32;
        let mut out = Vec::with_capacity(FrameRGBA::byte_len(w, h));
        let stride = self.width() as usize;
        for y in ys {
            let start = (y * stride + xs.start) * 4;
            let end = (y * stride + xs.end) * 4;
            out.extend_from_slice(&self.frame.data[start..end]);
        }
        Surface::from_premul_rgba8(w, h, out)
    }

    fn for_each_overlap(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        mut f: impl FnMut(&mut [u8], usize, usize),
    ) {
        let dst_w = i64::from(self.width());
        let dst_h = i64::from(self.height());
        let x0 = i64::from(x).max(0);
        let y0 = i64::from(y).max(0);
        let x1 = (i64::from(x) + i64::from(w)).min(dst_w);
        let y1 = (i64::from(y) + i64::from(h)).min(dst_h);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for dy in y0..y1 {
            let sy = (dy - i64::from(y)) as usize;
            for dx in x0..x1 {
                let sx = (dx - i64::from(x)) as usize;
                let di = ((dy * dst_w + dx) * 4) as usize;
                f(&mut self.frame.data, di, sy * (w as usize) + sx);
            }
        }
    }
}

#[derive(Clone, Copy)]
enum BlitMode {
    SourceOver,
    Copy,
}

fn check_dims(width: u32, height: u32) -> SketchreelResult<()> {
    if width == 0 || height == 0 {
        return Err(SketchreelError::surface(format!(
            "surface size must be non-zero, got {width}x{height}"
        )));
    }
    if width > MAX_SURFACE_DIM || height > MAX_SURFACE_DIM {
        return Err(SketchreelError::surface(format!(
            "surface size too large: {width}x{height} (max {MAX_SURFACE_DIM}x{MAX_SURFACE_DIM})"
        )));
    }
    Ok(())
}

fn blend_at(data: &mut [u8], i: usize, src: [u8; 4]) {
    let d = &mut data[i..i + 4];
    let out = premul_over_px([d[0], d[1], d[2], d[3]], src);
    d.copy_from_slice(&out);
}

/// Pixels `p` in `[0, limit)` with `a <= p + 0.5 < b`.
pub(crate) fn pixel_span(a: f64, b: f64, limit: u32) -> Range<usize> {
    let lo = (a - 0.5).ceil().max(0.0);
    let hi = (b - 0.5).ceil().min(f64::from(limit)).max(0.0);
    if !(lo < hi) {
        return 0..0;
    }
    (lo as usize)..(hi as usize)
}

fn intersect(a: Range<usize>, b: Range<usize>) -> Range<usize> {
    let lo = a.start.max(b.start);
    let hi = a.end.min(b.end);
    if lo < hi { lo..hi } else { 0..0 }
}

/// Inclusive source pixel range touched by `[a, b)`, clamped to the image.
fn clamp_source_span(a: f64, b: f64, limit: u32) -> Option<(usize, usize)> {
    let lo = a.floor().max(0.0);
    let hi = (b.ceil() - 1.0).min(f64::from(limit) - 1.0);
    if !(lo <= hi) {
        return None;
    }
    Some((lo as usize, hi as usize))
}

fn sample_index(
    p: usize,
    dst_origin: f64,
    src_origin: f64,
    scale: f64,
    span: &(usize, usize),
) -> usize {
    let u = src_origin + ((p as f64) + 0.5 - dst_origin) * scale;
    let i = u.floor().max(0.0) as usize;
    i.clamp(span.0, span.1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
