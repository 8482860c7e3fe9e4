use crate::foundation::error::{SketchreelError, SketchreelResult};
use crate::text::face::GlyphFace;

/// A character and its pen position (baseline-left) on the unscrolled page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharGlyph {
    pub ch: char,
    pub x: f64,
    pub y: f64,
    pub advance: f64,
}

/// Page geometry for [`layout_text`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    pub canvas_width: f64,
    pub margin: f64,
    pub line_height: f64,
}

/// Place every character of `text`, wrapping greedily per character.
///
/// The first baseline is at `y = line_height`. A character that would cross
/// `canvas_width - margin` moves to a new line unless it is already first on its line; `'\n'`
/// occupies a position and then breaks the line.
pub fn layout_text(
    text: &str,
    face: &mut dyn GlyphFace,
    params: &LayoutParams,
) -> SketchreelResult<Vec<CharGlyph>> {
    if !(params.line_height.is_finite() && params.line_height > 0.0) {
        return Err(SketchreelError::invalid_input("line height must be > 0"));
    }
    if !(params.margin.is_finite() && params.margin >= 0.0) {
        return Err(SketchreelError::invalid_input("margin must be >= 0"));
    }

    let right = params.canvas_width - params.margin;
    let mut x = params.margin;
    let mut y = params.line_height;
    let mut line_empty = true;
    let mut out = Vec::with_capacity(text.chars().count());

    for ch in text.chars() {
        if ch == '\n' {
            out.push(CharGlyph {
                ch,
                x,
                y,
                advance: 0.0,
            });
            x = params.margin;
            y += params.line_height;
            line_empty = true;
            continue;
        }

        let advance = face.advance(ch)?;
        if !line_empty && x + advance > right {
            x = params.margin;
            y += params.line_height;
        }
        out.push(CharGlyph { ch, x, y, advance });
        x += advance;
        line_empty = false;
    }

    tracing::debug!(
        chars = out.len(),
        lines = out
            .last()
            .map(|g| (g.y / params.line_height).round() as u64)
            .unwrap_or(0),
        "text layout"
    );
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
