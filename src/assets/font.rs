use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{SketchreelError, SketchreelResult};
use crate::render::surface::AlphaMask;
use crate::text::face::{GlyphBitmap, GlyphFace};

/// Brush type for Parley layouts; glyphs are rasterized as coverage so the color is unused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct InkBrush;

#[derive(Clone, Debug)]
struct ShapedChar {
    glyphs: Vec<vello_cpu::Glyph>,
    advance: f64,
}

/// A font loaded from bytes, shaped with Parley and rasterized with `vello_cpu`.
pub struct FontFace {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<InkBrush>,
    family: String,
    font: vello_cpu::peniko::FontData,
    size_px: f32,
    shaped: HashMap<char, ShapedChar>,
    glyphs: HashMap<char, Arc<GlyphBitmap>>,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("size_px", &self.size_px)
            .finish_non_exhaustive()
    }
}

impl FontFace {
    /// Register `font_bytes` (face `index` of a collection) at `size_px`.
    pub fn from_bytes(font_bytes: Vec<u8>, index: u32, size_px: f32) -> SketchreelResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SketchreelError::invalid_input(
                "font size must be finite and > 0",
            ));
        }

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| SketchreelError::decode("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SketchreelError::decode("registered font family has no name"))?
            .to_string();

        let font =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), index);

        tracing::debug!(family = %family, size_px, "font face ready");
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font,
            size_px,
            shaped: HashMap::new(),
            glyphs: HashMap::new(),
        })
    }

    /// Load a font file from disk.
    pub fn from_file(path: &Path, size_px: f32) -> SketchreelResult<Self> {
        if !path.is_file() {
            return Err(SketchreelError::invalid_input(format!(
                "font file '{}' does not exist",
                path.display()
            )));
        }
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_bytes(bytes, 0, size_px)
    }

    /// Resolve `family` among installed system fonts, falling back to any sans-serif face and
    /// then to the first face found.
    pub fn from_system(family: &str, size_px: f32) -> SketchreelResult<Self> {
        let (bytes, index) = load_system_font(family)?;
        Self::from_bytes(bytes, index, size_px)
    }

    pub fn family_name(&self) -> &str {
        &self.family
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    fn shape(&mut self, ch: char) -> ShapedChar {
        if let Some(s) = self.shaped.get(&ch) {
            return s.clone();
        }

        let mut buf = [0u8; 4];
        let text: &str = ch.encode_utf8(&mut buf);
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
        let mut layout: parley::Layout<InkBrush> = builder.build(text);
        layout.break_all_lines(None);

        let mut glyphs = Vec::new();
        let mut advance = 0.0f64;
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                for g in run.glyphs() {
                    advance += f64::from(g.advance);
                    glyphs.push(vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: 0.0,
                    });
                }
            }
        }

        let shaped = ShapedChar { glyphs, advance };
        self.shaped.insert(ch, shaped.clone());
        shaped
    }

    fn rasterize(&self, shaped: &ShapedChar) -> SketchreelResult<GlyphBitmap> {
        if shaped.glyphs.is_empty() {
            return Ok(GlyphBitmap::default());
        }

        // Generous box: glyph outlines may overhang their advance and descend below the baseline.
        let size = f64::from(self.size_px);
        let pad = (size * 0.5).ceil();
        let baseline = (size * 1.5).ceil();
        let w = (shaped.advance + 2.0 * pad).ceil().max(1.0);
        let h = (size * 2.0).ceil().max(1.0);
        if w > f64::from(u16::MAX) || h > f64::from(u16::MAX) {
            return Err(SketchreelError::surface(format!(
                "glyph raster size too large: {w}x{h}"
            )));
        }
        let (w, h) = (w as u16, h as u16);

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        let glyphs = shaped.glyphs.iter().map(|g| vello_cpu::Glyph {
            id: g.id,
            x: g.x + pad as f32,
            y: baseline as f32,
        });
        ctx.glyph_run(&self.font)
            .font_size(self.size_px)
            .fill_glyphs(glyphs);
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        let coverage = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(|px| px[3])
            .collect();

        Ok(GlyphBitmap {
            mask: AlphaMask {
                width: u32::from(w),
                height: u32::from(h),
                coverage,
            },
            left: -(pad as i32),
            top: -(baseline as i32),
        })
    }
}

impl GlyphFace for FontFace {
    fn advance(&mut self, ch: char) -> SketchreelResult<f64> {
        if ch == '\n' {
            return Ok(0.0);
        }
        Ok(self.shape(ch).advance)
    }

    fn glyph(&mut self, ch: char) -> SketchreelResult<Arc<GlyphBitmap>> {
        if let Some(g) = self.glyphs.get(&ch) {
            return Ok(g.clone());
        }
        let g = if ch.is_whitespace() {
            Arc::new(GlyphBitmap::default())
        } else {
            let shaped = self.shape(ch);
            Arc::new(self.rasterize(&shaped)?)
        };
        self.glyphs.insert(ch, g.clone());
        Ok(g)
    }
}

/// Find `family` (or a fallback) among installed fonts; returns the font bytes and face index.
pub fn load_system_font(family: &str) -> SketchreelResult<(Vec<u8>, u32)> {
    use usvg::fontdb;

    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let families = [fontdb::Family::Name(family), fontdb::Family::SansSerif];
    let query = fontdb::Query {
        families: &families,
        ..Default::default()
    };
    let id = db
        .query(&query)
        .or_else(|| db.faces().next().map(|f| f.id))
        .ok_or_else(|| {
            SketchreelError::invalid_input(format!(
                "no system font matches \"{family}\" and no fallback font is installed"
            ))
        })?;

    db.with_face_data(id, |data, index| (data.to_vec(), index))
        .ok_or_else(|| {
            SketchreelError::decode(format!("failed to load font data for \"{family}\""))
        })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
