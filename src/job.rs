use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::assets::color::ColorDef;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{SketchreelError, SketchreelResult};
use crate::reveal::plan::{Direction, Selection};
use crate::text::stroke::TextStyle;

pub const DEFAULT_FPS: u32 = 30;
pub const DEFAULT_TAIL_MS: u64 = 1_000;
pub const DEFAULT_IMAGE_FRAME: Canvas = Canvas {
    width: 1280,
    height: 720,
};
pub const DEFAULT_TEXT_FRAME: Canvas = Canvas {
    width: 800,
    height: 600,
};

/// What a reveal draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Image,
    Text,
}

/// Raw caller parameters, as read from JSON or assembled by the CLI.
///
/// Everything is optional here; [`RevealRequest::validate`] fills defaults and rejects
/// inconsistent combinations.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealRequest {
    pub content_kind: Option<ContentKind>,
    pub image_path: Option<PathBuf>,
    /// In-memory image data; not part of the JSON form.
    #[serde(skip)]
    pub image_bytes: Option<Vec<u8>>,
    pub text: Option<String>,
    pub rows: Option<u32>,
    pub cols: Option<u32>,
    pub selection: Vec<String>,
    pub direction: Direction,
    pub fps: Option<u32>,
    pub frame_width: Option<u32>,
    pub frame_height: Option<u32>,
    pub background: Option<ColorDef>,
    pub tail_ms: Option<u64>,
    pub text_style: Option<TextStyle>,
}

impl RevealRequest {
    pub fn image_file(path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn image_bytes(bytes: Vec<u8>) -> Self {
        Self {
            image_bytes: Some(bytes),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn from_json_str(s: &str) -> SketchreelResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| SketchreelError::invalid_input(format!("invalid job JSON: {e}")))
    }

    /// Read a JSON job file. A relative `image_path` is resolved against the file's directory.
    pub fn from_json_file(path: &Path) -> SketchreelResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read job file '{}'", path.display()))?;
        let mut req = Self::from_json_str(&s)?;
        if let (Some(img), Some(dir)) = (req.image_path.as_mut(), path.parent())
            && img.is_relative()
        {
            *img = dir.join(&*img);
        }
        Ok(req)
    }

    fn inferred_kind(&self) -> SketchreelResult<ContentKind> {
        let has_image = self.image_path.is_some() || self.image_bytes.is_some();
        let has_text = self.text.is_some();
        let kind = match (has_image, has_text) {
            (true, true) => {
                return Err(SketchreelError::invalid_input(
                    "provide either an image or text, not both",
                ));
            }
            (false, false) => {
                return Err(SketchreelError::invalid_input(
                    "provide an image or text to reveal",
                ));
            }
            (true, false) => ContentKind::Image,
            (false, true) => ContentKind::Text,
        };
        if let Some(declared) = self.content_kind
            && declared != kind
        {
            return Err(SketchreelError::invalid_input(format!(
                "content_kind is {declared:?} but {kind:?} content was supplied"
            )));
        }
        Ok(kind)
    }

    /// Check every parameter and produce a fully populated job.
    pub fn validate(self) -> SketchreelResult<RevealJob> {
        let kind = self.inferred_kind()?;

        let fps = Fps::whole(self.fps.unwrap_or(DEFAULT_FPS))?;
        let default_frame = match kind {
            ContentKind::Image => DEFAULT_IMAGE_FRAME,
            ContentKind::Text => DEFAULT_TEXT_FRAME,
        };
        let canvas = Canvas {
            width: self.frame_width.unwrap_or(default_frame.width),
            height: self.frame_height.unwrap_or(default_frame.height),
        };
        if canvas.width == 0 || canvas.height == 0 {
            return Err(SketchreelError::invalid_input(
                "frame_width/frame_height must be >= 1",
            ));
        }
        let background = self.background.unwrap_or_else(ColorDef::white);
        let tail = Duration::from_millis(self.tail_ms.unwrap_or(DEFAULT_TAIL_MS));

        let content = match kind {
            ContentKind::Image => {
                let rows = self.rows.unwrap_or(1);
                let cols = self.cols.unwrap_or(1);
                if rows == 0 || cols == 0 {
                    return Err(SketchreelError::invalid_input("rows and cols must be >= 1"));
                }
                let source = match (self.image_bytes, self.image_path) {
                    (Some(bytes), _) => ImageSource::Bytes(bytes),
                    (None, Some(path)) => {
                        if !path.is_file() {
                            return Err(SketchreelError::invalid_input(format!(
                                "image file '{}' does not exist",
                                path.display()
                            )));
                        }
                        ImageSource::Path(path)
                    }
                    (None, None) => {
                        return Err(SketchreelError::invalid_input("missing image"));
                    }
                };
                JobContent::Image {
                    source,
                    rows,
                    cols,
                    selection: Selection::parse_lenient(&self.selection),
                    direction: self.direction,
                }
            }
            ContentKind::Text => {
                let text = self.text.unwrap_or_default();
                if text.trim().is_empty() {
                    return Err(SketchreelError::invalid_input("text must not be empty"));
                }
                let style = self.text_style.unwrap_or_default();
                style.validate()?;
                if let Some(p) = &style.font_path
                    && !p.is_file()
                {
                    return Err(SketchreelError::invalid_input(format!(
                        "font file '{}' does not exist",
                        p.display()
                    )));
                }
                JobContent::Text { text, style }
            }
        };

        Ok(RevealJob {
            content,
            fps,
            canvas,
            background,
            tail,
        })
    }
}

/// Where the image bytes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl ImageSource {
    pub fn load(&self) -> SketchreelResult<Vec<u8>> {
        match self {
            ImageSource::Path(p) => Ok(std::fs::read(p)
                .with_context(|| format!("read image '{}'", p.display()))?),
            ImageSource::Bytes(b) => Ok(b.clone()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum JobContent {
    Image {
        source: ImageSource,
        rows: u32,
        cols: u32,
        selection: Selection,
        direction: Direction,
    },
    Text {
        text: String,
        style: TextStyle,
    },
}

/// A validated reveal: every default resolved, every constraint checked.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealJob {
    pub content: JobContent,
    pub fps: Fps,
    pub canvas: Canvas,
    pub background: ColorDef,
    /// Idle time presented after the last step.
    pub tail: Duration,
}

impl RevealJob {
    pub fn kind(&self) -> ContentKind {
        match self.content {
            JobContent::Image { .. } => ContentKind::Image,
            JobContent::Text { .. } => ContentKind::Text,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/job.rs"]
mod tests;
