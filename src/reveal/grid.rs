use std::fmt;
use std::str::FromStr;

use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{SketchreelError, SketchreelResult};

/// One cell of a rows x cols partition, written `"<row>-<col>"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId {
    pub row: u32,
    pub col: u32,
}

impl BlockId {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

impl FromStr for BlockId {
    type Err = SketchreelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || SketchreelError::invalid_input(format!("invalid block id \"{s}\""));
        let (row, col) = s.trim().split_once('-').ok_or_else(bad)?;
        let row = row.parse::<u32>().map_err(|_| bad())?;
        let col = col.parse::<u32>().map_err(|_| bad())?;
        Ok(Self { row, col })
    }
}

/// Geometry of an image split into a grid and fitted into an output frame.
///
/// Source rectangles live in image pixel space; destination rectangles live in frame space and
/// cover the fitted image box. Both are derived from shared edge functions so neighbouring cells
/// tile without gaps or overlaps.
#[derive(Clone, Debug, PartialEq)]
pub struct GridModel {
    rows: u32,
    cols: u32,
    image_width: u32,
    image_height: u32,
    frame: Canvas,
    fitted: Rect,
}

impl GridModel {
    pub fn new(
        image_width: u32,
        image_height: u32,
        rows: u32,
        cols: u32,
        frame: Canvas,
    ) -> SketchreelResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(SketchreelError::invalid_input("rows and cols must be >= 1"));
        }
        if image_width == 0 || image_height == 0 {
            return Err(SketchreelError::invalid_input(
                "image width/height must be non-zero",
            ));
        }
        if frame.width == 0 || frame.height == 0 {
            return Err(SketchreelError::invalid_input(
                "frame width/height must be non-zero",
            ));
        }

        Ok(Self {
            rows,
            cols,
            image_width,
            image_height,
            frame,
            fitted: fit_centered(image_width, image_height, frame),
        })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn frame(&self) -> Canvas {
        self.frame
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    /// The frame-space box the whole image is drawn into.
    pub fn fitted_rect(&self) -> Rect {
        self.fitted
    }

    pub fn contains(&self, id: BlockId) -> bool {
        id.row < self.rows && id.col < self.cols
    }

    /// All blocks in raster (row-major) order.
    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| BlockId { row, col }))
    }

    /// Source rectangle of `id` in image pixels.
    pub fn src_rect(&self, id: BlockId) -> Rect {
        let w = f64::from(self.image_width);
        let h = f64::from(self.image_height);
        Rect::new(
            edge(0.0, w, id.col, self.cols),
            edge(0.0, h, id.row, self.rows),
            edge(0.0, w, id.col + 1, self.cols),
            edge(0.0, h, id.row + 1, self.rows),
        )
    }

    /// Destination rectangle of `id` in frame pixels.
    pub fn dst_rect(&self, id: BlockId) -> Rect {
        let f = self.fitted;
        Rect::new(
            edge(f.x0, f.width(), id.col, self.cols),
            edge(f.y0, f.height(), id.row, self.rows),
            edge(f.x0, f.width(), id.col + 1, self.cols),
            edge(f.y0, f.height(), id.row + 1, self.rows),
        )
    }
}

/// Position of the `i`-th of `n` equal divisions of `[origin, origin + extent]`.
fn edge(origin: f64, extent: f64, i: u32, n: u32) -> f64 {
    if i >= n {
        return origin + extent;
    }
    origin + extent * f64::from(i) / f64::from(n)
}

/// Aspect-preserving fit: full frame width first, limited by frame height, then centered.
fn fit_centered(image_width: u32, image_height: u32, frame: Canvas) -> Rect {
    let (iw, ih) = (f64::from(image_width), f64::from(image_height));
    let (fw, fh) = (f64::from(frame.width), f64::from(frame.height));

    let (w, h) = if ih * fw / iw <= fh {
        (fw, ih * fw / iw)
    } else {
        ((iw * fh / ih).min(fw), fh)
    };

    let x0 = ((fw - w) / 2.0).max(0.0);
    let y0 = ((fh - h) / 2.0).max(0.0);
    Rect::new(x0, y0, (x0 + w).min(fw), (y0 + h).min(fh))
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/grid.rs"]
mod tests;
