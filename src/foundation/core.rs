use std::time::Duration;

use crate::foundation::error::{SketchreelError, SketchreelResult};

pub use kurbo::{Point, Rect, Vec2};

/// Absolute 0-based frame index in output timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> SketchreelResult<Self> {
        if den == 0 {
            return Err(SketchreelError::invalid_input("fps den must be > 0"));
        }
        if num == 0 {
            return Err(SketchreelError::invalid_input("fps must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Whole frames per second.
    pub fn whole(fps: u32) -> SketchreelResult<Self> {
        Self::new(fps, 1)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame, rounded to the nearest nanosecond.
    ///
    /// This is the per-step wait of every reveal (`1000/fps` ms).
    pub fn frame_interval(self) -> Duration {
        let num = u128::from(self.num);
        let nanos = (u128::from(self.den) * 1_000_000_000 + num / 2) / num;
        Duration::from_nanos(nanos as u64)
    }

    /// Number of whole frames covering `elapsed`, rounded to nearest.
    pub fn frames_at(self, elapsed: Duration) -> u64 {
        let den = u128::from(self.den) * 1_000_000_000;
        let scaled = elapsed.as_nanos() * u128::from(self.num);
        ((scaled + den / 2) / den) as u64
    }

    /// Timeline duration of `frames` frames.
    pub fn frames_to_duration(self, frames: u64) -> Duration {
        let num = u128::from(self.num);
        let nanos = (u128::from(frames) * u128::from(self.den) * 1_000_000_000 + num / 2) / num;
        Duration::from_nanos(nanos as u64)
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// The full canvas as a rectangle anchored at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Opaque color from straight channels.
    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channels as `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
