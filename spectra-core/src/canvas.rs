//! # Canvas Module
//!
//! A small RGBA8 raster used as the rendering target for spectrum graphs.
//!
//! ## Features
//! - Row-major pixel buffer with the origin in the top-left corner
//! - Solid fills and axis-aligned rectangles
//! - Anti-aliased line segments with a smooth distance falloff
//! - Premultiplied alpha blending
//! - Horizontal and vertical concatenation of canvases
//! - PNG export through the `image` crate

use std::path::Path;

use image::{ImageFormat, RgbaImage};
use tracing::warn;

use crate::error::{Result, SpectraError};
use crate::math::{lerp_f32, smooth_step};

/// Pixels scanned around a segment's bounding box to catch its soft edge.
const LINE_PADDING: i64 = 4;

/// Distance from the segment at which line coverage reaches zero.
const LINE_FALLOFF: f32 = 2.0;

/// A single 8-bit RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Converts to premultiplied `[0, 1]` components.
    fn premultiplied(self) -> [f32; 4] {
        let a = f32::from(self.a) / 255.0;
        [
            f32::from(self.r) / 255.0 * a,
            f32::from(self.g) / 255.0 * a,
            f32::from(self.b) / 255.0 * a,
            a,
        ]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

/// Maps a `[0, 1]` component back to a byte.
///
/// Scales by 256 and clamps rather than rounding, so output stays
/// pixel-identical with previously rendered graphs.
fn to_channel(value: f32) -> u8 {
    (value * 256.0).clamp(0.0, 255.0) as u8
}

/// Composites `top` over `bottom` with coverage `alpha` in `[0, 1]`.
///
/// Both colors are premultiplied before interpolating, then the result is
/// un-premultiplied. A fully transparent result is transparent black.
pub fn alpha_blend(bottom: Rgba, top: Rgba, alpha: f32) -> Rgba {
    let below = bottom.premultiplied();
    let above = top.premultiplied();

    let mut blended = [0.0f32; 4];
    for (out, (b, t)) in blended.iter_mut().zip(below.iter().zip(above.iter())) {
        *out = lerp_f32(*b, *t, alpha);
    }

    if blended[3] > 0.0 {
        blended[0] /= blended[3];
        blended[1] /= blended[3];
        blended[2] /= blended[3];
    } else {
        blended = [0.0; 4];
    }

    Rgba::new(
        to_channel(blended[0]),
        to_channel(blended[1]),
        to_channel(blended[2]),
        to_channel(blended[3]),
    )
}

/// An owned RGBA raster.
///
/// The pixel buffer always holds exactly `width * height` entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl Canvas {
    /// Creates a canvas filled with opaque white.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Rgba::WHITE)
    }

    /// Creates a canvas filled with `color`.
    pub fn filled(width: usize, height: usize, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Reallocates to `width * height` and fills every pixel with `fill`.
    pub fn resize(&mut self, width: usize, height: usize, fill: Rgba) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, fill);
    }

    pub fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Fills the half-open rectangle `[x1, x2) x [y1, y2)`.
    ///
    /// # Panics
    /// If the rectangle reaches outside the canvas. Callers are expected to
    /// keep it in bounds.
    pub fn fill_rect(&mut self, x1: usize, x2: usize, y1: usize, y2: usize, color: Rgba) {
        if x2 <= x1 || y2 <= y1 {
            return;
        }
        assert!(x2 <= self.width, "rectangle column {x2} exceeds width {}", self.width);
        for y in y1..y2 {
            let row = y * self.width;
            self.pixels[row + x1..row + x2].fill(color);
        }
    }

    /// Draws an anti-aliased line segment from `(x1, y1)` to `(x2, y2)`.
    ///
    /// Only the segment's bounding box, padded by a few pixels and clipped to
    /// the canvas, is visited. Each pixel's coverage falls off smoothly with
    /// its distance to the nearest point on the segment, reaching zero two
    /// pixels away. A zero-length segment draws a single soft dot.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgba) {
        if self.is_empty() {
            return;
        }

        let (x1, y1, x2, y2) = (i64::from(x1), i64::from(y1), i64::from(x2), i64::from(y2));
        let start_x = (x1.min(x2) - LINE_PADDING).max(0);
        let start_y = (y1.min(y2) - LINE_PADDING).max(0);
        let end_x = (x1.max(x2) + LINE_PADDING).min(self.width as i64 - 1);
        let end_y = (y1.max(y2) + LINE_PADDING).min(self.height as i64 - 1);

        let mut dir_x = (x2 - x1) as f32;
        let mut dir_y = (y2 - y1) as f32;
        let length = (dir_x * dir_x + dir_y * dir_y).sqrt();
        if length > 0.0 {
            dir_x /= length;
            dir_y /= length;
        }

        for iy in start_y..=end_y {
            for ix in start_x..=end_x {
                // project onto the segment, clamped so the ends are capped
                let to_x = (ix - x1) as f32;
                let to_y = (iy - y1) as f32;
                let t = (to_x * dir_x + to_y * dir_y).clamp(0.0, length);
                let closest_x = x1 as f32 + t * dir_x;
                let closest_y = y1 as f32 + t * dir_y;

                let dx = ix as f32 - closest_x;
                let dy = iy as f32 - closest_y;
                let distance = (dx * dx + dy * dy).sqrt();

                let coverage = smooth_step(distance, LINE_FALLOFF, 0.0);
                if coverage > 0.0 {
                    let index = iy as usize * self.width + ix as usize;
                    self.pixels[index] = alpha_blend(self.pixels[index], color, coverage);
                }
            }
        }
    }

    /// Places `other` to the right of this canvas.
    ///
    /// Heights must match unless `allow_resize` is set, in which case the
    /// shorter canvas is padded with white at the bottom. On mismatch the
    /// canvas is left untouched and [`SpectraError::DimensionMismatch`] is
    /// returned.
    pub fn append_horizontal(&mut self, other: &Canvas, allow_resize: bool) -> Result<()> {
        if self.width == 0 && self.height == 0 {
            *self = other.clone();
            return Ok(());
        }
        if other.width == 0 && other.height == 0 {
            return Ok(());
        }

        let mut right = other.clone();
        if right.height != self.height {
            if !allow_resize {
                warn!(this = self.height, other = right.height, "append_horizontal height mismatch");
                return Err(SpectraError::DimensionMismatch {
                    axis: "height",
                    this: self.height,
                    other: right.height,
                });
            }
            let height = self.height.max(right.height);
            self.pad_to(self.width, height);
            right.pad_to(right.width, height);
        }

        let width = self.width + right.width;
        let mut pixels = Vec::with_capacity(width * self.height);
        for y in 0..self.height {
            pixels.extend_from_slice(&self.pixels[y * self.width..(y + 1) * self.width]);
            pixels.extend_from_slice(&right.pixels[y * right.width..(y + 1) * right.width]);
        }

        self.width = width;
        self.pixels = pixels;
        Ok(())
    }

    /// Places `other` below this canvas.
    ///
    /// Widths must match unless `allow_resize` is set, in which case the
    /// narrower canvas is padded with white on the right. On mismatch the
    /// canvas is left untouched and [`SpectraError::DimensionMismatch`] is
    /// returned.
    pub fn append_vertical(&mut self, other: &Canvas, allow_resize: bool) -> Result<()> {
        if self.width == 0 && self.height == 0 {
            *self = other.clone();
            return Ok(());
        }
        if other.width == 0 && other.height == 0 {
            return Ok(());
        }

        if other.width != self.width {
            if !allow_resize {
                warn!(this = self.width, other = other.width, "append_vertical width mismatch");
                return Err(SpectraError::DimensionMismatch {
                    axis: "width",
                    this: self.width,
                    other: other.width,
                });
            }
            let width = self.width.max(other.width);
            let mut bottom = other.clone();
            bottom.pad_to(width, bottom.height);
            self.pad_to(width, self.height);
            self.pixels.extend_from_slice(&bottom.pixels);
        } else {
            self.pixels.extend_from_slice(&other.pixels);
        }

        self.height += other.height;
        Ok(())
    }

    /// Grows the canvas to `width x height`, keeping existing pixels in the
    /// top-left corner and filling new area with white.
    fn pad_to(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        let mut padded = Canvas::new(width, height);
        for y in 0..self.height.min(height) {
            let columns = self.width.min(width);
            let src = y * self.width;
            let dst = y * width;
            padded.pixels[dst..dst + columns].copy_from_slice(&self.pixels[src..src + columns]);
        }
        *self = padded;
    }

    /// Returns the pixels as a contiguous RGBA8 buffer, row-major with a
    /// stride of `width * 4` bytes.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| [p.r, p.g, p.b, p.a])
            .collect()
    }

    /// Encodes the canvas as a PNG file at `path`.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if self.is_empty() {
            return Err(SpectraError::EmptyCanvas {
                width: self.width,
                height: self.height,
            });
        }
        let image = RgbaImage::from_raw(self.width as u32, self.height as u32, self.to_rgba_bytes())
            .ok_or(SpectraError::EmptyCanvas {
                width: self.width,
                height: self.height,
            })?;
        image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}
