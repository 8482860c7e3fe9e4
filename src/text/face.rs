use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::error::{SketchreelError, SketchreelResult};
use crate::render::surface::AlphaMask;

/// A rasterized character plus its placement relative to the pen position on the baseline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub mask: AlphaMask,
    /// Horizontal offset of the mask's left edge from the pen position.
    pub left: i32,
    /// Vertical offset of the mask's top edge from the baseline (negative is above).
    pub top: i32,
}

/// Per-character measurement and rasterization, the text equivalent of a canvas font.
pub trait GlyphFace {
    /// Horizontal advance of `ch` in pixels.
    fn advance(&mut self, ch: char) -> SketchreelResult<f64>;

    /// Coverage mask for `ch`.
    fn glyph(&mut self, ch: char) -> SketchreelResult<Arc<GlyphBitmap>>;
}

/// Fixed-advance face drawing every visible character as a solid box.
///
/// Needs no font data, so layouts and frames are identical on every machine.
#[derive(Debug)]
pub struct BlockFace {
    advance: f64,
    box_w: u32,
    box_h: u32,
    cache: HashMap<bool, Arc<GlyphBitmap>>,
}

impl BlockFace {
    /// A face with `advance`-pixel cells and `ascent`-pixel tall boxes sitting on the baseline.
    pub fn new(advance: f64, ascent: u32) -> SketchreelResult<Self> {
        if !advance.is_finite() || advance <= 0.0 {
            return Err(SketchreelError::invalid_input(
                "block face advance must be finite and > 0",
            ));
        }
        Ok(Self {
            advance,
            box_w: ((advance * 0.75).floor() as u32).max(1),
            box_h: ascent.max(1),
            cache: HashMap::new(),
        })
    }
}

impl GlyphFace for BlockFace {
    fn advance(&mut self, ch: char) -> SketchreelResult<f64> {
        if ch == '\n' {
            return Ok(0.0);
        }
        Ok(self.advance)
    }

    fn glyph(&mut self, ch: char) -> SketchreelResult<Arc<GlyphBitmap>> {
        let visible = !ch.is_whitespace();
        let (w, h) = (self.box_w, self.box_h);
        let g = self.cache.entry(visible).or_insert_with(|| {
            if !visible {
                return Arc::new(GlyphBitmap::default());
            }
            Arc::new(GlyphBitmap {
                mask: AlphaMask {
                    width: w,
                    height: h,
                    coverage: vec![255; (w * h) as usize],
                },
                left: 0,
                top: -(h as i32),
            })
        });
        Ok(g.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/face.rs"]
mod tests;
