// Magnifier: zoomed circular preview of the area under the pointer.
// Visual expectation: while dragging, a round loupe in a top corner shows the
// image and the painted overlay at 2x, with a ring for the brush footprint.
// It jumps to the other corner when the finger slides underneath it.

use log::trace;
use tiny_skia::{
    Color, FillRule, IntRect, Mask, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke,
    Transform,
};

use crate::config::MagnifierConfig;
use crate::types::Point;

/// Square screen area the magnifier is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestRect {
    pub left: f32,
    pub top: f32,
    pub size: f32,
}

impl DestRect {
    pub fn center(&self) -> Point {
        Point::new(self.left + self.size / 2.0, self.top + self.size / 2.0)
    }

    /// Inclusive on all edges.
    pub fn contains(&self, p: Point) -> bool {
        (self.left..=self.left + self.size).contains(&p.x)
            && (self.top..=self.top + self.size).contains(&p.y)
    }
}

/// Per-event geometry, recomputed on every pointer down/move.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnifierView {
    /// Pointer in editable-region (screen) space.
    pub pointer: Point,
    /// Pointer mapped into source-image space.
    pub source_point: Point,
    /// Clamped sampling square in source-image pixels.
    pub sample: IntRect,
    pub dest: DestRect,
    /// Source space to screen space: zoom about the sample center, then center on `dest`.
    pub transform: Transform,
    /// Source pixels per region pixel, horizontally and vertically.
    pub ratio: (f32, f32),
}

impl MagnifierView {
    pub fn to_screen(&self, p: Point) -> Point {
        let t = &self.transform;
        Point::new(t.sx * p.x + t.kx * p.y + t.tx, t.ky * p.x + t.sy * p.y + t.ty)
    }

    /// Half-axes of a region-space brush of `radius` once drawn in the loupe.
    /// An unevenly scaled source turns the circle into an ellipse.
    pub fn brush_radii(&self, radius: f32) -> (f32, f32) {
        (radius * self.ratio.0 * self.transform.sx, radius * self.ratio.1 * self.transform.sy)
    }
}

/// Source pixels per editable-region pixel on each axis.
pub fn ratios(image: (u32, u32), region: (u32, u32)) -> (f32, f32) {
    let axis = |img: u32, reg: u32| if reg == 0 { 1.0 } else { img as f32 / reg as f32 };
    (axis(image.0, region.0), axis(image.1, region.1))
}

/// Square of half-extent `radius` around `center`, shifted back inside the image
/// on each edge independently. Never extends past `image` in either direction.
pub fn sampling_rect(center: Point, radius: f32, image: (u32, u32)) -> Option<IntRect> {
    let side = (2.0 * radius).round().max(1.0) as i64;
    let clamp_axis = |c: f32, limit: u32| -> (i32, u32) {
        let len = side.min(limit as i64);
        let mut start = (c - radius).round() as i64;
        if start + len > limit as i64 {
            start = limit as i64 - len;
        }
        if start < 0 {
            start = 0;
        }
        (start as i32, len as u32)
    };
    let (x, w) = clamp_axis(center.x, image.0);
    let (y, h) = clamp_axis(center.y, image.1);
    IntRect::from_xywh(x, y, w, h)
}

/// Scale by `zoom` anchored at `anchor`, then translate `anchor` onto `dest_center`.
pub fn zoom_transform(anchor: Point, zoom: f32, dest_center: Point) -> Transform {
    Transform::from_translate(-anchor.x, -anchor.y)
        .post_scale(zoom, zoom)
        .post_translate(dest_center.x, dest_center.y)
}

/// Stroke a circle outline; used for the magnifier border and the brush rings.
pub fn draw_ring(canvas: &mut Pixmap, center: Point, radius: f32, width: f32) {
    draw_oval_ring(canvas, center, (radius, radius), width);
}

fn draw_oval_ring(canvas: &mut Pixmap, center: Point, radii: (f32, f32), width: f32) {
    let Some(path) = oval(center, radii) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(Color::WHITE);
    paint.anti_alias = true;
    let stroke = Stroke { width, ..Default::default() };
    canvas.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

fn oval(center: Point, (rx, ry): (f32, f32)) -> Option<Path> {
    if rx <= 0.0 || ry <= 0.0 {
        return None;
    }
    let bounds = Rect::from_ltrb(center.x - rx, center.y - ry, center.x + rx, center.y + ry)?;
    PathBuilder::from_oval(bounds)
}

pub struct Magnifier {
    config: MagnifierConfig,
    dest: DestRect,
    shown: bool,
    view: Option<MagnifierView>,
    // source image with the edit layer flattened on top, in source space
    composite: Option<Pixmap>,
    composite_stale: bool,
}

impl Magnifier {
    pub fn new(config: MagnifierConfig) -> Self {
        Self {
            config,
            dest: DestRect { left: 0.0, top: 0.0, size: config.size },
            shown: false,
            view: None,
            composite: None,
            composite_stale: true,
        }
    }

    pub fn config(&self) -> &MagnifierConfig {
        &self.config
    }

    /// Shrink to a third of the region width on narrow layouts.
    /// Returns the new size when it changed.
    pub fn fit_to_width(&mut self, width: u32) -> Option<f32> {
        let fitted = width as f32 / 3.0;
        if fitted >= self.config.size {
            return None;
        }
        self.config.size = fitted;
        self.dest = DestRect { left: 0.0, top: 0.0, size: fitted };
        Some(fitted)
    }

    /// Edit layer or displayed image changed; rebuild the composite before next render.
    pub fn invalidate(&mut self) {
        self.composite_stale = true;
    }

    /// New source image: drop the cached composite entirely.
    pub fn reset_source(&mut self) {
        self.composite = None;
        self.composite_stale = true;
        self.view = None;
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn view(&self) -> Option<&MagnifierView> {
        self.view.as_ref()
    }

    pub fn dest(&self) -> DestRect {
        self.dest
    }

    /// Show the magnifier for `pointer` (region space).
    /// `image` is the source size; without one only the placement is updated.
    pub fn update(&mut self, pointer: Point, region: (u32, u32), image: Option<(u32, u32)>) {
        self.shown = true;
        self.place(pointer, region.0);

        let Some(image) = image else {
            self.view = None;
            return;
        };
        let ratio = ratios(image, region);
        let source_point = Point::new(pointer.x * ratio.0, pointer.y * ratio.1);
        let Some(sample) = sampling_rect(source_point, self.config.sample_radius(), image) else {
            self.view = None;
            return;
        };
        let anchor = Point::new(
            sample.x() as f32 + sample.width() as f32 / 2.0,
            sample.y() as f32 + sample.height() as f32 / 2.0,
        );
        let transform = zoom_transform(anchor, self.config.zoom, self.dest.center());
        trace!("magnifier sample {:?} -> {:?}", sample, self.dest);
        self.view = Some(MagnifierView {
            pointer,
            source_point,
            sample,
            dest: self.dest,
            transform,
            ratio,
        });
    }

    pub fn hide(&mut self) {
        self.shown = false;
        self.view = None;
    }

    // Move out from under the finger: default corner is top-left, alternate is top-right.
    fn place(&mut self, pointer: Point, region_width: u32) {
        if !self.dest.contains(pointer) {
            return;
        }
        let size = self.dest.size;
        self.dest.left = if self.dest.left == 0.0 {
            (region_width as f32 - size).max(0.0)
        } else {
            0.0
        };
        self.dest.top = 0.0;
    }

    /// Draw the loupe onto `canvas` (region space). `image` and `layer` are the
    /// displayed source image and the edit layer; `brush_radius` is in region pixels.
    pub fn render(&mut self, canvas: &mut Pixmap, image: &Pixmap, layer: &Pixmap, brush_radius: f32) {
        if !self.shown {
            return;
        }
        let Some(view) = self.view.clone() else {
            return;
        };

        let composite = self.composite(image, layer, view.ratio);
        let Some(crop) = composite.clone_rect(view.sample) else {
            return;
        };

        let center = view.dest.center();
        let radius = view.dest.size / 2.0;
        let Some(clip) = circle_mask(canvas.width(), canvas.height(), center, radius) else {
            return;
        };
        // nearest keeps zoomed pixels crisp
        let paint = PixmapPaint::default();
        let to_screen = view
            .transform
            .pre_translate(view.sample.x() as f32, view.sample.y() as f32);
        canvas.draw_pixmap(0, 0, crop.as_ref(), &paint, to_screen, Some(&clip));

        let ring = self.config.ring_width;
        draw_ring(canvas, center, radius, ring);
        draw_oval_ring(
            canvas,
            view.to_screen(view.source_point),
            view.brush_radii(brush_radius),
            ring,
        );
    }

    fn composite(&mut self, image: &Pixmap, layer: &Pixmap, ratio: (f32, f32)) -> &Pixmap {
        if self.composite_stale || self.composite.is_none() {
            let mut flat = image.clone();
            flat.draw_pixmap(
                0,
                0,
                layer.as_ref(),
                &PixmapPaint::default(),
                Transform::from_scale(ratio.0, ratio.1),
                None,
            );
            self.composite = Some(flat);
            self.composite_stale = false;
        }
        self.composite.get_or_insert_with(|| image.clone())
    }
}

fn circle_mask(width: u32, height: u32, center: Point, radius: f32) -> Option<Mask> {
    let mut mask = Mask::new(width, height)?;
    let circle = PathBuilder::from_circle(center.x, center.y, radius)?;
    mask.fill_path(&circle, FillRule::Winding, true, Transform::identity());
    Some(mask)
}
