use std::path::PathBuf;
use std::time::Duration;

use crate::assets::color::ColorDef;
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{SketchreelError, SketchreelResult};
use crate::render::surface::Surface;
use crate::reveal::plan::RevealPlan;
use crate::session::stage::Stage;
use crate::text::face::GlyphFace;
use crate::text::layout::{CharGlyph, LayoutParams, layout_text};

/// "Breathing" pause after sentences.
///
/// After drawing a terminator, if at least `min_run` characters were drawn since the previous
/// pause, the frame is held for `pause_ms` and the count restarts.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SentencePause {
    pub enabled: bool,
    /// Characters that end a sentence.
    pub terminators: String,
    pub min_run: usize,
    pub pause_ms: u64,
}

impl SentencePause {
    pub const DEFAULT_TERMINATORS: &'static str = ".";
    pub const DEFAULT_MIN_RUN: usize = 4;
    pub const DEFAULT_PAUSE_MS: u64 = 5_000;

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    /// Whether drawing `ch` after `run` characters (including `ch`) triggers a pause.
    pub fn triggers(&self, ch: char, run: usize) -> bool {
        self.enabled && self.pause_ms > 0 && run >= self.min_run && self.terminators.contains(ch)
    }
}

impl Default for SentencePause {
    fn default() -> Self {
        Self {
            enabled: true,
            terminators: Self::DEFAULT_TERMINATORS.to_string(),
            min_run: Self::DEFAULT_MIN_RUN,
            pause_ms: Self::DEFAULT_PAUSE_MS,
        }
    }
}

/// Typography and cursor options of a text reveal.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextStyle {
    /// System font family, used when `font_path` is unset.
    pub font_family: String,
    pub font_path: Option<PathBuf>,
    pub font_size: f32,
    pub line_height: f64,
    pub margin: f64,
    pub color: ColorDef,
    pub show_cursor: bool,
    /// SVG file replacing the built-in pen cursor.
    pub cursor_path: Option<PathBuf>,
    pub cursor_size: u32,
    /// How far above the anchor's baseline the cursor's top edge sits.
    pub cursor_offset_y: f64,
    pub sentence_pause: SentencePause,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Comic Sans MS".to_string(),
            font_path: None,
            font_size: 24.0,
            line_height: 32.0,
            margin: 20.0,
            color: ColorDef::black(),
            show_cursor: true,
            cursor_path: None,
            cursor_size: 64,
            cursor_offset_y: 45.0,
            sentence_pause: SentencePause::default(),
        }
    }
}

impl TextStyle {
    pub fn validate(&self) -> SketchreelResult<()> {
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(SketchreelError::invalid_input("text_style.font_size must be > 0"));
        }
        if !(self.line_height.is_finite() && self.line_height > 0.0) {
            return Err(SketchreelError::invalid_input(
                "text_style.line_height must be > 0",
            ));
        }
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(SketchreelError::invalid_input("text_style.margin must be >= 0"));
        }
        if !self.cursor_offset_y.is_finite() {
            return Err(SketchreelError::invalid_input(
                "text_style.cursor_offset_y must be finite",
            ));
        }
        if self.show_cursor && self.cursor_size == 0 {
            return Err(SketchreelError::invalid_input(
                "text_style.cursor_size must be > 0",
            ));
        }
        Ok(())
    }
}

/// Advance `scroll` by whole lines until `line_y` sits no lower than two lines above the bottom.
pub fn scroll_for(line_y: f64, scroll: f64, canvas_height: f64, line_height: f64) -> f64 {
    let limit = canvas_height - 2.0 * line_height;
    let mut scroll = scroll;
    while line_y - scroll > limit {
        scroll += line_height;
    }
    scroll
}

/// Writes text one character per step, redrawing the page each frame with a cursor trailing the
/// next character.
pub struct TextStrokeRenderer<'f> {
    face: &'f mut dyn GlyphFace,
    glyphs: Vec<CharGlyph>,
    cursor: Option<Surface>,
    canvas: Canvas,
    ink: Rgba8Premul,
    background: Rgba8Premul,
    line_height: f64,
    cursor_offset_y: f64,
    pause: SentencePause,
}

impl std::fmt::Debug for TextStrokeRenderer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextStrokeRenderer")
            .field("glyphs", &self.glyphs.len())
            .field("canvas", &self.canvas)
            .field("cursor", &self.cursor.is_some())
            .finish_non_exhaustive()
    }
}

impl<'f> TextStrokeRenderer<'f> {
    /// Lay out `text` on `canvas` with `face`.
    pub fn new(
        face: &'f mut dyn GlyphFace,
        text: &str,
        style: &TextStyle,
        canvas: Canvas,
        background: Rgba8Premul,
        cursor: Option<Surface>,
    ) -> SketchreelResult<Self> {
        style.validate()?;
        let glyphs = layout_text(
            text,
            face,
            &LayoutParams {
                canvas_width: f64::from(canvas.width),
                margin: style.margin,
                line_height: style.line_height,
            },
        )?;
        Ok(Self {
            face,
            glyphs,
            cursor,
            canvas,
            ink: style.color.to_rgba8_premul(),
            background,
            line_height: style.line_height,
            cursor_offset_y: style.cursor_offset_y,
            pause: style.sentence_pause.clone(),
        })
    }

    pub fn glyphs(&self) -> &[CharGlyph] {
        &self.glyphs
    }

    pub fn plan(&self) -> RevealPlan<usize> {
        RevealPlan::for_chars(self.glyphs.len())
    }

    /// Where the cursor sits while character `i` is the last one drawn.
    pub fn cursor_anchor(&self, i: usize) -> Option<(f64, f64)> {
        if let Some(next) = self.glyphs.get(i + 1) {
            return Some((next.x, next.y));
        }
        let last = self.glyphs.get(i)?;
        Some((last.x + last.advance, last.y))
    }

    /// Clear the page and draw glyphs `0..=i` and the cursor, shifted up by `scroll`.
    pub fn paint_frame(
        &mut self,
        surface: &mut Surface,
        i: usize,
        scroll: f64,
    ) -> SketchreelResult<()> {
        surface.clear(self.background);

        let end = (i + 1).min(self.glyphs.len());
        for g in &self.glyphs[..end] {
            let baseline = g.y - scroll;
            if baseline + self.line_height < 0.0 {
                continue;
            }
            let bitmap = self.face.glyph(g.ch)?;
            if bitmap.mask.is_empty() {
                continue;
            }
            surface.draw_mask(
                g.x.round() as i32 + bitmap.left,
                baseline.round() as i32 + bitmap.top,
                &bitmap.mask,
                self.ink,
            );
        }

        if let (Some(cursor), Some((x, y))) = (self.cursor.as_ref(), self.cursor_anchor(i)) {
            let top = y - scroll - self.cursor_offset_y;
            surface.composite(cursor, x.round() as i32, top.round() as i32);
        }
        Ok(())
    }

    /// Present one frame per planned character, pausing after sentences.
    #[tracing::instrument(skip_all, fields(chars = plan.len()))]
    pub fn run(&mut self, plan: &RevealPlan<usize>, stage: &mut Stage<'_>) -> SketchreelResult<()> {
        let total = plan.len();
        let canvas_h = f64::from(self.canvas.height);
        let mut scroll = 0.0;
        let mut run = 0usize;

        for (k, &i) in plan.iter().enumerate() {
            let g = *self.glyphs.get(i).ok_or_else(|| {
                SketchreelError::invalid_input(format!("character index {i} out of range"))
            })?;
            scroll = scroll_for(g.y, scroll, canvas_h, self.line_height);
            self.paint_frame(stage.surface_mut(), i, scroll)?;
            stage.present_step()?;

            run += 1;
            if self.pause.triggers(g.ch, run) {
                tracing::trace!(index = i, "sentence pause");
                stage.present(self.pause.pause())?;
                run = 0;
            }
            stage.report(100.0 * (k + 1) as f64 / total as f64);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/stroke.rs"]
mod tests;
