//! Construction-time configuration for the engine.
//!
//! Everything the engine would otherwise read from display metrics is passed
//! in here explicitly.

/// Brush diameter bounds in editable-region pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushConfig {
    pub min_size: f32,
    pub max_size: f32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self { min_size: 20.0, max_size: 80.0 }
    }
}

/// Preview color of painted strokes on the edit layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerConfig {
    pub color: [u8; 3],
    pub alpha: u8,
}

impl Default for LayerConfig {
    fn default() -> Self {
        // red at 40%
        Self { color: [255, 0, 0], alpha: 102 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnifierConfig {
    /// Side of the square destination area on screen.
    pub size: f32,
    /// Scale applied to the sampled region.
    pub zoom: f32,
    /// Stroke width of the indicator rings.
    pub ring_width: f32,
}

impl MagnifierConfig {
    /// Half-extent of the source-space square that, zoomed, fills the magnifier.
    pub fn sample_radius(&self) -> f32 {
        self.size / (2.0 * self.zoom)
    }
}

impl Default for MagnifierConfig {
    fn default() -> Self {
        Self { size: 200.0, zoom: 2.0, ring_width: 3.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub brush: BrushConfig,
    pub layer: LayerConfig,
    pub magnifier: MagnifierConfig,
    /// Pointer moves smaller than this on both axes are dropped.
    pub jitter_threshold: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            brush: BrushConfig::default(),
            layer: LayerConfig::default(),
            magnifier: MagnifierConfig::default(),
            jitter_threshold: 4.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sample_radius_is_fifty() {
        assert_eq!(MagnifierConfig::default().sample_radius(), 50.0);
    }
}
