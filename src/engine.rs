//! The mask-painting engine.
//!
//! [`BrushEngine`] owns the stroke history, the edit layer and the magnifier,
//! and is driven by a host that forwards pointer events and control calls in
//! arrival order. Every call is synchronous. Calls made in the wrong state
//! (undo with nothing to undo, moves without a press, queries before the
//! editable region exists) do nothing and return an empty result.

use image::{GrayImage, RgbaImage};
use log::{debug, trace, warn};
use tiny_skia::{Pixmap, PixmapPaint, Transform};

use crate::brush::Brush;
use crate::compositor::EditLayer;
use crate::config::EngineConfig;
use crate::history::History;
use crate::magnifier::{Magnifier, draw_ring};
use crate::mask;
use crate::smoother::StrokeSmoother;
use crate::types::{Point, pixmap_from_rgba};

pub struct BrushEngine {
    config: EngineConfig,
    brush: Brush,
    history: History,
    smoother: StrokeSmoother,
    layer: Option<EditLayer>,
    magnifier: Magnifier,
    origin: Option<Pixmap>,    // image as first loaded
    displayed: Option<Pixmap>, // image currently shown under the overlay
    touch: Option<Point>,      // Some while a gesture is active
    show_origin: bool,
}

impl BrushEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            brush: Brush::new(config.brush),
            history: History::new(),
            smoother: StrokeSmoother::new(config.jitter_threshold),
            layer: None,
            magnifier: Magnifier::new(config.magnifier),
            origin: None,
            displayed: None,
            touch: None,
            show_origin: false,
        }
    }

    /// Create the edit layer. Only the first call with a non-empty size has any effect.
    pub fn set_editable_region(&mut self, width: u32, height: u32) {
        if let Some(layer) = &self.layer {
            debug!(
                "editable region already {}x{}, ignoring {width}x{height}",
                layer.width(),
                layer.height()
            );
            return;
        }
        let Some(layer) = EditLayer::new(width, height, self.config.layer) else {
            debug!("editable region {width}x{height} is empty");
            return;
        };
        self.layer = Some(layer);
        debug!("edit layer initialised at {width}x{height}");

        if let Some(size) = self.magnifier.fit_to_width(width) {
            self.brush.set_range(size / 3.0, size / 2.0);
            debug!("magnifier fitted to {size}px, brush range {:?}", self.brush.range());
        }
        // strokes captured before the layer existed
        self.rebuild_layer();
    }

    /// Load a new picture; it becomes both the original and the displayed image.
    pub fn set_source_image(&mut self, image: &RgbaImage) {
        let Some(pixmap) = pixmap_from_rgba(image) else {
            warn!("ignoring empty source image");
            return;
        };
        self.origin = Some(pixmap.clone());
        self.displayed = Some(pixmap);
        self.magnifier.reset_source();
    }

    /// Replace what is shown under the overlay (e.g. an object-removal result),
    /// keeping the original for [`BrushEngine::set_show_origin`].
    pub fn set_result_image(&mut self, image: &RgbaImage) {
        let Some(pixmap) = pixmap_from_rgba(image) else {
            warn!("ignoring empty result image");
            return;
        };
        if self.origin.is_none() {
            self.origin = Some(pixmap.clone());
        }
        self.displayed = Some(pixmap);
        self.magnifier.reset_source();
    }

    pub fn set_show_origin(&mut self, show: bool) {
        self.show_origin = show;
    }

    pub fn set_brush_size_percent(&mut self, percent: f32) {
        self.brush.set_size_percent(percent);
    }

    pub fn set_brush_size_range(&mut self, min: f32, max: f32) {
        self.brush.set_range(min, max);
    }

    /// Applies to strokes started after this call.
    pub fn set_erase_mode(&mut self, enabled: bool) {
        self.brush.set_erase(enabled);
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        let p = Point::new(x, y);
        if self.history.active().is_some() {
            warn!("pointer down while a stroke is active; committing it first");
            self.commit_active();
        }

        self.history.begin_stroke(self.brush.mode(), self.brush.size());
        let start = self.smoother.begin(p);
        self.history.extend_active(start);
        if let Some(layer) = self.layer.as_mut() {
            layer.begin_stroke();
        }
        trace!("stroke begins at ({x}, {y}) as {:?}", self.brush.mode());

        self.touch = Some(p);
        self.update_magnifier(p);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.history.active().is_none() {
            return;
        }
        let p = Point::new(x, y);
        if let Some(segment) = self.smoother.advance(p) {
            self.history.extend_active(segment);
            if let (Some(layer), Some(stroke)) = (self.layer.as_mut(), self.history.active()) {
                layer.draw_tail(stroke, stroke.segments().len() - 1);
            }
            self.magnifier.invalidate();
            self.touch = Some(self.smoother.end());
        }
        self.update_magnifier(p);
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        if self.history.active().is_none() {
            return;
        }
        let end = self.smoother.finish(Point::new(x, y));
        self.history.extend_active(end);
        self.commit_active();
        self.touch = None;
        self.magnifier.hide();
    }

    pub fn is_gesture_active(&self) -> bool {
        self.touch.is_some()
    }

    /// No-op while a gesture is active.
    pub fn undo(&mut self) -> bool {
        if !self.history.undo() {
            return false;
        }
        debug!("undo, {} strokes remain", self.history.committed().len());
        self.rebuild_layer();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo() {
            return false;
        }
        debug!("redo, {} strokes committed", self.history.committed().len());
        self.rebuild_layer();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn magnifier(&self) -> &Magnifier {
        &self.magnifier
    }

    /// Current overlay buffer, or None before the editable region exists.
    pub fn edit_layer(&self) -> Option<&Pixmap> {
        self.layer.as_ref().map(EditLayer::pixmap)
    }

    /// Black/white selection mask of the committed strokes.
    pub fn mask_bitmap(&self) -> Option<GrayImage> {
        let layer = self.layer.as_ref()?;
        mask::extract(layer.width(), layer.height(), self.history.committed())
    }

    /// Displayed image with the overlay flattened on top, without indicators.
    pub fn preview_composite(&self) -> Option<Pixmap> {
        let layer = self.layer.as_ref()?;
        let mut out = Pixmap::new(layer.width(), layer.height())?;
        if let Some(image) = &self.displayed {
            self.draw_base(&mut out, image);
        }
        overlay(&mut out, layer);
        Some(out)
    }

    /// Paint the editor view: base image, overlay, touch ring, magnifier.
    pub fn draw(&mut self, canvas: &mut Pixmap) {
        if self.show_origin {
            if let Some(origin) = &self.origin {
                self.draw_base(canvas, origin);
            }
            return;
        }

        if let Some(image) = &self.displayed {
            self.draw_base(canvas, image);
        }
        if let Some(layer) = &self.layer {
            overlay(canvas, layer);
        }
        if let Some(touch) = self.touch {
            draw_ring(canvas, touch, self.brush.radius(), self.config.magnifier.ring_width);
        }
        if let (Some(image), Some(layer)) = (self.displayed.as_ref(), self.layer.as_ref()) {
            self.magnifier.render(canvas, image, layer.pixmap(), self.brush.radius());
        }
    }

    // Images are stretched over the editable region when one exists.
    fn draw_base(&self, canvas: &mut Pixmap, image: &Pixmap) {
        let transform = match &self.layer {
            Some(layer) => Transform::from_scale(
                layer.width() as f32 / image.width() as f32,
                layer.height() as f32 / image.height() as f32,
            ),
            None => Transform::identity(),
        };
        canvas.draw_pixmap(0, 0, image.as_ref(), &PixmapPaint::default(), transform, None);
    }

    fn commit_active(&mut self) {
        if let (Some(layer), Some(stroke)) = (self.layer.as_mut(), self.history.active()) {
            layer.finish_stroke(stroke);
        }
        self.history.commit_active();
        self.magnifier.invalidate();
    }

    // Replay committed strokes, then redraw the in-progress stroke (if any) on top.
    // The active case only arises when the region is created mid-gesture.
    fn rebuild_layer(&mut self) {
        if let Some(layer) = self.layer.as_mut() {
            layer.replay(self.history.committed());
            if let Some(active) = self.history.active() {
                layer.begin_stroke();
                layer.draw_tail(active, 0);
            }
        }
        self.magnifier.invalidate();
    }

    fn update_magnifier(&mut self, pointer: Point) {
        let region = match (&self.layer, &self.displayed) {
            (Some(layer), _) => (layer.width(), layer.height()),
            (None, Some(image)) => (image.width(), image.height()),
            (None, None) => (0, 0),
        };
        let image = self.displayed.as_ref().map(|i| (i.width(), i.height()));
        self.magnifier.update(pointer, region, image);
    }
}

fn overlay(canvas: &mut Pixmap, layer: &EditLayer) {
    canvas.draw_pixmap(
        0,
        0,
        layer.pixmap().as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}

impl Default for BrushEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_before_region_are_empty() {
        let engine = BrushEngine::default();
        assert!(engine.edit_layer().is_none());
        assert!(engine.mask_bitmap().is_none());
        assert!(engine.preview_composite().is_none());
    }

    #[test]
    fn region_is_initialised_once() {
        let mut engine = BrushEngine::default();
        engine.set_editable_region(0, 50);
        assert!(engine.edit_layer().is_none());
        engine.set_editable_region(120, 80);
        engine.set_editable_region(300, 300);
        let layer = engine.edit_layer().unwrap();
        assert_eq!((layer.width(), layer.height()), (120, 80));
    }

    #[test]
    fn narrow_region_shrinks_magnifier_and_brush() {
        let mut engine = BrushEngine::default();
        engine.set_editable_region(300, 300);
        assert_eq!(engine.magnifier().config().size, 100.0);
        let (min, max) = engine.brush().range();
        assert!((min - 100.0 / 3.0).abs() < 1e-4);
        assert_eq!(max, 50.0);
    }

    #[test]
    fn moves_and_ups_without_down_are_ignored() {
        let mut engine = BrushEngine::default();
        engine.set_editable_region(100, 100);
        engine.pointer_move(10.0, 10.0);
        engine.pointer_up(20.0, 20.0);
        assert!(!engine.can_undo());
        assert!(!engine.magnifier().is_shown());
    }

    #[test]
    fn strokes_before_region_are_replayed_into_it() {
        let mut engine = BrushEngine::default();
        engine.pointer_down(10.0, 20.0);
        engine.pointer_move(40.0, 20.0);
        engine.pointer_up(60.0, 20.0);
        engine.set_editable_region(100, 100);
        assert!(engine.edit_layer().unwrap().pixel(30, 20).unwrap().alpha() > 0);
    }

    #[test]
    fn down_during_active_stroke_commits_it() {
        let mut engine = BrushEngine::default();
        engine.set_editable_region(100, 100);
        engine.pointer_down(10.0, 10.0);
        engine.pointer_move(30.0, 10.0);
        engine.pointer_down(50.0, 50.0);
        assert_eq!(engine.history().committed().len(), 1);
        engine.pointer_up(50.0, 70.0);
        assert_eq!(engine.history().committed().len(), 2);
    }

    #[test]
    fn show_origin_draws_only_the_original() {
        let mut engine = BrushEngine::default();
        let mut source = RgbaImage::new(60, 60);
        source.pixels_mut().for_each(|p| *p = image::Rgba([0, 200, 0, 255]));
        let mut result = RgbaImage::new(60, 60);
        result.pixels_mut().for_each(|p| *p = image::Rgba([0, 0, 200, 255]));
        engine.set_source_image(&source);
        engine.set_result_image(&result);
        engine.set_editable_region(60, 60);
        engine.pointer_down(5.0, 30.0);
        engine.pointer_move(55.0, 30.0);

        let mut canvas = Pixmap::new(60, 60).unwrap();
        engine.set_show_origin(true);
        engine.draw(&mut canvas);
        let px = canvas.pixel(30, 30).unwrap();
        assert_eq!((px.red(), px.green(), px.blue()), (0, 200, 0));

        engine.set_show_origin(false);
        engine.draw(&mut canvas);
        let px = canvas.pixel(30, 50).unwrap();
        assert_eq!((px.red(), px.green(), px.blue()), (0, 0, 200));
    }
}
