//! Edit layer compositing.
//!
//! The layer is a transparent RGBA buffer the size of the editable region.
//! Its contents are always derivable from the committed strokes: [`EditLayer::replay`]
//! rebuilds it from scratch, and the incremental path used during a drag is
//! reconciled with a full composite of the finished stroke at commit time.

use log::trace;
use tiny_skia::{BlendMode, Color, LineCap, LineJoin, Paint, Path, Pixmap, Transform};

use crate::config::LayerConfig;
use crate::history::Stroke;
use crate::types::StrokeMode;

/// How stroke pixels combine with what is already in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    /// Source overwrites destination; overlapping paint does not darken.
    Replace,
    /// Pixels under the stroke become fully transparent.
    Clear,
}

/// Everything needed to draw one stroke, passed by value to [`composite`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub color: [u8; 3],
    pub alpha: u8,
    pub blend: Blend,
    pub anti_alias: bool,
}

impl StrokeStyle {
    /// Translucent on-screen preview style.
    pub fn preview(stroke: &Stroke, layer: &LayerConfig) -> Self {
        let blend = match stroke.mode() {
            StrokeMode::Paint => Blend::Replace,
            StrokeMode::Erase => Blend::Clear,
        };
        Self {
            width: stroke.width(),
            color: layer.color,
            alpha: layer.alpha,
            blend,
            anti_alias: true,
        }
    }

    /// Opaque binary style: white for paint, black for erase, hard edges.
    pub fn mask(stroke: &Stroke) -> Self {
        let color = match stroke.mode() {
            StrokeMode::Paint => [255, 255, 255],
            StrokeMode::Erase => [0, 0, 0],
        };
        Self {
            width: stroke.width(),
            color,
            alpha: 255,
            blend: Blend::Replace,
            anti_alias: false,
        }
    }
}

/// Stroke `path` into `target` with round caps and bevel joins.
pub fn composite(target: &mut Pixmap, path: &Path, style: &StrokeStyle) {
    let mut paint = Paint::default();
    let [r, g, b] = style.color;
    paint.set_color_rgba8(r, g, b, style.alpha);
    paint.anti_alias = style.anti_alias;
    paint.blend_mode = match style.blend {
        Blend::Replace => BlendMode::Source,
        Blend::Clear => BlendMode::Clear,
    };

    let stroke = tiny_skia::Stroke {
        width: style.width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Bevel,
        ..Default::default()
    };
    target.stroke_path(path, &paint, &stroke, Transform::identity(), None);
}

pub struct EditLayer {
    pixmap: Pixmap,
    style: LayerConfig,
    // layer contents before the active stroke started
    checkpoint: Option<Pixmap>,
}

impl EditLayer {
    /// None when either dimension is zero.
    pub fn new(width: u32, height: u32, style: LayerConfig) -> Option<Self> {
        let pixmap = Pixmap::new(width, height)?;
        Some(Self { pixmap, style, checkpoint: None })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Rebuild from nothing by compositing `strokes` in order with their own mode and width.
    pub fn replay(&mut self, strokes: &[Stroke]) {
        self.pixmap.fill(Color::TRANSPARENT);
        self.checkpoint = None;
        for stroke in strokes {
            self.draw_whole(stroke);
        }
        trace!("edit layer replayed {} strokes", strokes.len());
    }

    /// Remember the current contents so the finished stroke can be drawn in one pass.
    pub fn begin_stroke(&mut self) {
        self.checkpoint = Some(self.pixmap.clone());
    }

    /// Draw only `stroke.segments()[from..]` on top of the current contents.
    pub fn draw_tail(&mut self, stroke: &Stroke, from: usize) {
        if let Some(path) = stroke.tail_path(from) {
            composite(&mut self.pixmap, &path, &StrokeStyle::preview(stroke, &self.style));
        }
    }

    /// Replace the incremental rendering of `stroke` with a single full composite,
    /// leaving the buffer exactly as a replay would.
    pub fn finish_stroke(&mut self, stroke: &Stroke) {
        match self.checkpoint.take() {
            Some(base) => {
                self.pixmap = base;
                self.draw_whole(stroke);
            }
            None => self.draw_tail(stroke, 0),
        }
    }

    fn draw_whole(&mut self, stroke: &Stroke) {
        if let Some(path) = stroke.path() {
            composite(&mut self.pixmap, &path, &StrokeStyle::preview(stroke, &self.style));
        }
    }
}
