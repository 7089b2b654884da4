//! Scalar helpers shared by the rasterizer and the statistics accumulator.

/// Clamps `value` into `[min_value, max_value]`.
///
/// Unlike `f64::clamp` this never panics on inverted bounds and maps NaN to
/// `max_value`, which keeps bucket indexing total.
pub fn clamp<T: PartialOrd>(value: T, min_value: T, max_value: T) -> T {
    if value <= min_value {
        min_value
    } else if value >= max_value {
        max_value
    } else if value > min_value && value < max_value {
        value
    } else {
        // NaN compares false against everything
        max_value
    }
}

/// Linear interpolation, written as `a*(1-t) + b*t` so that `t == 1` yields
/// `b` exactly.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Single precision variant of [`lerp`], used by pixel blending.
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Cubic Hermite step `3x² - 2x³` with `x = (value - min) / (max - min)`
/// clamped to `[0, 1]`. Passing `min > max` gives a falling edge.
pub fn smooth_step(value: f32, min: f32, max: f32) -> f32 {
    let x = ((value - min) / (max - min)).clamp(0.0, 1.0);
    3.0 * x * x - 2.0 * x * x * x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_bounds_and_nan() {
        assert_eq!(clamp(5.0, 0.0, 3.0), 3.0);
        assert_eq!(clamp(-1.0, 0.0, 3.0), 0.0);
        assert_eq!(clamp(1.5, 0.0, 3.0), 1.5);
        assert_eq!(clamp(f64::NAN, 0.0, 3.0), 3.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(2.0, 7.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 7.0, 1.0), 7.0);
        assert!((lerp_f32(0.0, 1.0, 0.25) - 0.25).abs() < 1e-7);
    }

    #[test]
    fn test_smooth_step_falloff() {
        // Coverage curve used by line drawing: full at 0, none at 2.
        assert_eq!(smooth_step(0.0, 2.0, 0.0), 1.0);
        assert_eq!(smooth_step(2.0, 2.0, 0.0), 0.0);
        assert_eq!(smooth_step(3.5, 2.0, 0.0), 0.0);
        assert!((smooth_step(1.0, 2.0, 0.0) - 0.5).abs() < 1e-6);
    }
}
