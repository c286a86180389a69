// Brush parameters the user controls between strokes.

use crate::config::BrushConfig;
use crate::types::StrokeMode;

#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    min_size: f32,
    max_size: f32,
    current_size: f32,
    erase: bool,
}

impl Brush {
    pub fn new(config: BrushConfig) -> Self {
        let mut brush = Self {
            min_size: 0.0,
            max_size: 0.0,
            current_size: 0.0,
            erase: false,
        };
        brush.set_range(config.min_size, config.max_size);
        brush
    }

    /// Reconfigure the size bounds; the current size resets to the middle of the range.
    pub fn set_range(&mut self, min: f32, max: f32) {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.min_size = min;
        self.max_size = max;
        self.current_size = (min + max) / 2.0;
    }

    /// Map a 0..=100 control value linearly onto the range. Out-of-range values are clamped.
    pub fn set_size_percent(&mut self, percent: f32) {
        let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
        self.current_size = self.min_size + (self.max_size - self.min_size) * percent / 100.0;
    }

    pub fn set_erase(&mut self, enabled: bool) {
        self.erase = enabled;
    }

    pub fn is_erase(&self) -> bool {
        self.erase
    }

    /// Mode applied to the next stroke.
    pub fn mode(&self) -> StrokeMode {
        if self.erase { StrokeMode::Erase } else { StrokeMode::Paint }
    }

    /// Diameter for the next stroke.
    pub fn size(&self) -> f32 {
        self.current_size
    }

    pub fn radius(&self) -> f32 {
        self.current_size / 2.0
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min_size, self.max_size)
    }
}
