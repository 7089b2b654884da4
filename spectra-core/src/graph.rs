//! # Graph Rendering Module
//!
//! Draws averaged spectra and raw sample positions onto a [`Canvas`].
//!
//! ## Features
//! - Light background grid with square cells
//! - Spectrum curve normalized to the image height
//! - Optional standard deviation envelope around the curve
//! - Number line plot of one trial's normalized samples

use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, Rgba};
use crate::fft::max_magnitude;

/// Number of grid rows drawn across the image height.
const GRID_DIVISIONS: usize = 8;

/// Colors and spacing used by the renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphStyle {
    pub background: [u8; 4],
    pub grid: [u8; 4],
    pub curve: [u8; 4],
    pub envelope: [u8; 4],
    pub axis: [u8; 4],
    /// Number line tick color at the first sample, as linear RGB.
    pub gradient_start: [f32; 3],
    /// Number line tick color at the last sample, as linear RGB.
    pub gradient_end: [f32; 3],
    /// Horizontal space left of and right of the number line axis.
    pub number_line_margin: usize,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            background: [255, 255, 255, 255],
            grid: [192, 192, 192, 255],
            curve: [64, 64, 64, 255],
            envelope: [128, 128, 128, 255],
            axis: [0, 0, 0, 255],
            gradient_start: [1.0, 0.25, 0.0],
            gradient_end: [0.0, 0.25, 1.0],
            number_line_margin: 16,
        }
    }
}

fn rgba([r, g, b, a]: [u8; 4]) -> Rgba {
    Rgba::new(r, g, b, a)
}

/// Renders a spectrum as a line graph.
///
/// Magnitudes are divided by the largest mean value (plus the largest
/// standard deviation when an envelope is drawn) so the whole plot fits the
/// frame. Larger magnitudes are drawn higher up.
///
/// # Arguments
/// * `mean` - Spectrum to plot, one point per bucket
/// * `std_dev` - Optional per-bucket standard deviation drawn as an envelope
/// * `width` / `height` - Output size in pixels
/// * `style` - Colors for grid, curve and envelope
pub fn render_spectrum(
    mean: &[f64],
    std_dev: Option<&[f64]>,
    width: usize,
    height: usize,
    style: &GraphStyle,
) -> Canvas {
    let mut canvas = Canvas::filled(width, height, rgba(style.background));
    draw_grid(&mut canvas, rgba(style.grid));

    if mean.is_empty() {
        return canvas;
    }

    let mut max = max_magnitude(mean);
    if let Some(std_dev) = std_dev {
        max += max_magnitude(std_dev);
    }
    // an all-zero spectrum draws a flat line on the bottom edge
    let scale = if max > 0.0 { 1.0 / max } else { 0.0 };

    let points: Vec<(i32, i32)> = mean
        .iter()
        .enumerate()
        .map(|(index, &magnitude)| {
            let x = index * width / mean.len();
            let y = height as f64 - magnitude * scale * height as f64;
            (x as i32, y as i32)
        })
        .collect();

    if let Some(std_dev) = std_dev {
        let offsets: Vec<i32> = std_dev
            .iter()
            .map(|&sd| (sd * scale * height as f64) as i32)
            .collect();
        let color = rgba(style.envelope);
        for (window, offset) in points.windows(2).zip(offsets.windows(2)) {
            let ((x0, y0), (x1, y1)) = (window[0], window[1]);
            canvas.draw_line(x0, y0 - offset[0], x1, y1 - offset[1], color);
            canvas.draw_line(x0, y0 + offset[0], x1, y1 + offset[1], color);
        }
    }

    let color = rgba(style.curve);
    for window in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (window[0], window[1]);
        canvas.draw_line(x0, y0, x1, y1, color);
    }

    canvas
}

/// Draws evenly spaced horizontal and vertical lines, `height / 8` apart.
fn draw_grid(canvas: &mut Canvas, color: Rgba) {
    let (width, height) = (canvas.width(), canvas.height());
    let spacing = height / GRID_DIVISIONS;
    if spacing == 0 || width == 0 {
        return;
    }

    let rows = height / spacing;
    for i in 1..rows {
        let y = i * spacing;
        canvas.fill_rect(0, width - 1, y, y + 1, color);
    }

    let columns = width / spacing;
    for i in 1..columns {
        let x = i * spacing;
        canvas.fill_rect(x, x + 1, 0, height - 1, color);
    }
}

/// Plots normalized samples on a horizontal number line.
///
/// The axis spans the width minus a margin on each side and is capped by two
/// tall end ticks. Each sample gets a short tick at its position, colored
/// along a gradient from the first sample to the last.
pub fn render_samples_1d(samples: &[f64], width: usize, height: usize, style: &GraphStyle) -> Canvas {
    let mut canvas = Canvas::filled(width, height, rgba(style.background));
    if canvas.is_empty() {
        return canvas;
    }

    let margin = style.number_line_margin.min(width / 4) as i32;
    let left = margin;
    let right = width as i32 - 1 - margin;
    let axis_y = (height / 2) as i32;
    let end_tick = (height / 4) as i32;
    let sample_tick = (height / 8).max(1) as i32;
    let axis = rgba(style.axis);

    canvas.draw_line(left, axis_y, right, axis_y, axis);
    canvas.draw_line(left, axis_y - end_tick, left, axis_y + end_tick, axis);
    canvas.draw_line(right, axis_y - end_tick, right, axis_y + end_tick, axis);

    let span = f64::from(right - left);
    let last = samples.len().saturating_sub(1).max(1) as f32;
    for (index, &sample) in samples.iter().enumerate() {
        let x = left + (sample.clamp(0.0, 1.0) * span).round() as i32;
        let color = gradient_color(style, index as f32 / last);
        canvas.draw_line(x, axis_y - sample_tick, x, axis_y + sample_tick, color);
    }

    canvas
}

/// Interpolates the style gradient at `t` and scales the result to unit
/// length, so every tick is equally saturated.
fn gradient_color(style: &GraphStyle, t: f32) -> Rgba {
    let mut rgb = [0.0f32; 3];
    for (out, (a, b)) in rgb
        .iter_mut()
        .zip(style.gradient_start.iter().zip(style.gradient_end.iter()))
    {
        *out = a * (1.0 - t) + b * t;
    }

    let length = rgb.iter().map(|c| c * c).sum::<f32>().sqrt();
    if length > 0.0 {
        for c in rgb.iter_mut() {
            *c /= length;
        }
    }

    let to_byte = |c: f32| (c * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba::opaque(to_byte(rgb[0]), to_byte(rgb[1]), to_byte(rgb[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn darkest_row(canvas: &Canvas, x: usize) -> usize {
        (0..canvas.height())
            .min_by_key(|&y| canvas.pixel(x, y).map(|p| p.r).unwrap_or(255))
            .unwrap()
    }

    #[test]
    fn test_grid_lines() {
        let style = GraphStyle::default();
        let canvas = render_spectrum(&[], None, 64, 32, &style);
        let grid = rgba(style.grid);
        // spacing is 32 / 8 = 4
        assert_eq!(canvas.pixel(10, 4), Some(grid));
        assert_eq!(canvas.pixel(4, 10), Some(grid));
        assert_eq!(canvas.pixel(5, 5), Some(Rgba::WHITE));
        // rectangles stop one short of the far edge
        assert_eq!(canvas.pixel(63, 4), Some(Rgba::WHITE));
    }

    #[test]
    fn test_tiny_canvas_skips_grid() {
        let canvas = render_spectrum(&[1.0, 2.0], None, 4, 4, &GraphStyle::default());
        assert_eq!(canvas.width(), 4);
        let empty = render_spectrum(&[1.0], None, 0, 0, &GraphStyle::default());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_peak_is_drawn_highest() {
        let mut spectrum = vec![1.0; 32];
        spectrum[16] = 4.0;
        let canvas = render_spectrum(&spectrum, None, 64, 64, &GraphStyle::default());
        let peak_row = darkest_row(&canvas, 32);
        let flat_row = darkest_row(&canvas, 4);
        assert!(peak_row < flat_row);
        // 4.0 normalizes to the top edge, 1.0 to three quarters down
        assert!(peak_row <= 1);
        assert!((flat_row as i64 - 48).abs() <= 1);
    }

    #[test]
    fn test_zero_spectrum_renders_without_nan() {
        let canvas = render_spectrum(&[0.0; 16], Some(&[0.0; 16]), 32, 32, &GraphStyle::default());
        assert!(canvas.pixels().iter().all(|p| p.a == 255));
        // flat curve hugs the bottom edge
        assert!(canvas.pixel(8, 31).unwrap().r < 255);
    }

    #[test]
    fn test_envelope_surrounds_curve() {
        let style = GraphStyle::default();
        let mean = vec![2.0; 16];
        let std_dev = vec![1.0; 16];
        let canvas = render_spectrum(&mean, Some(&std_dev), 64, 60, &style);
        // max = 2 + 1, curve at y = 60 - 40 = 20, envelope 20 px above and below
        let envelope = rgba(style.envelope);
        assert_eq!(canvas.pixel(30, 0), Some(envelope));
        assert_eq!(canvas.pixel(30, 40), Some(envelope));
        assert_eq!(canvas.pixel(30, 20), Some(rgba(style.curve)));
    }

    #[test]
    fn test_number_line_ticks() {
        let style = GraphStyle::default();
        let canvas = render_samples_1d(&[0.0, 0.5, 1.0], 100, 40, &style);
        assert_eq!((canvas.width(), canvas.height()), (100, 40));
        // end tick reaches well above the axis
        assert_eq!(canvas.pixel(16, 12), Some(rgba(style.axis)));
        // middle sample tick, colored from the gradient rather than the axis
        let mid = canvas.pixel(50, 17).unwrap();
        assert_ne!(mid, Rgba::WHITE);
        assert_ne!(mid, rgba(style.axis));
    }

    #[test]
    fn test_gradient_is_unit_length() {
        let style = GraphStyle::default();
        let start = gradient_color(&style, 0.0);
        assert_eq!(start, Rgba::opaque(247, 62, 0));
        let end = gradient_color(&style, 1.0);
        assert_eq!(end, Rgba::opaque(0, 62, 247));
    }
}
