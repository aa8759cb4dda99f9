//! Bar gauge model: maps a value onto a fill fraction and a fill colour.
//!
//! Presentation only.  The colour is a linear blend from `color_min` (empty)
//! to `color_max` (full), driven by the ping-pong of `value / max_value` so
//! out-of-range ratios fold back into `[0, 1]` instead of extrapolating.

use bevy::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    value: f32,
    max_value: f32,
    color_min: LinearRgba,
    color_max: LinearRgba,
    fill_color: LinearRgba,
}

impl Gauge {
    pub fn new(color_min: Color, color_max: Color) -> Self {
        let color_min = color_min.to_linear();
        let color_max = color_max.to_linear();
        Self {
            value: 0.0,
            max_value: 1.0,
            color_min,
            color_max,
            fill_color: color_min,
        }
    }

    pub fn set_max_value(&mut self, max_value: f32) {
        self.max_value = max_value;
        self.value = self.value.clamp(0.0, self.max_value.max(0.0));
        self.recolor();
    }

    pub fn set_value(&mut self, value: f32) {
        self.set_value_without_color(value);
        self.recolor();
    }

    /// Move the fill without touching its colour.
    pub fn set_value_without_color(&mut self, value: f32) {
        self.value = value.clamp(0.0, self.max_value.max(0.0));
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn max_value(&self) -> f32 {
        self.max_value
    }

    pub fn fill_fraction(&self) -> f32 {
        if self.max_value <= 0.0 {
            return 0.0;
        }
        (self.value / self.max_value).clamp(0.0, 1.0)
    }

    pub fn fill_color(&self) -> Color {
        Color::LinearRgba(self.fill_color)
    }

    fn recolor(&mut self) {
        let t = if self.max_value > 0.0 {
            ping_pong(self.value / self.max_value, 1.0)
        } else {
            0.0
        };
        self.fill_color = lerp_rgba(self.color_min, self.color_max, t);
    }
}

/// Triangle wave over `[0, length]`: rises to `length`, then falls back.
pub fn ping_pong(t: f32, length: f32) -> f32 {
    if length <= 0.0 {
        return 0.0;
    }
    let period = length * 2.0;
    let m = t.rem_euclid(period);
    length - (m - length).abs()
}

fn lerp_rgba(a: LinearRgba, b: LinearRgba, t: f32) -> LinearRgba {
    LinearRgba::new(
        a.red + (b.red - a.red) * t,
        a.green + (b.green - a.green) * t,
        a.blue + (b.blue - a.blue) * t,
        a.alpha + (b.alpha - a.alpha) * t,
    )
}
