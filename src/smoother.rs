// Pointer smoothing: turns the raw pointer stream into path segments.
// Visual expectation: strokes follow the finger as soft curves instead of
// jagged polylines, and tiny hand tremors do not add geometry.

use crate::types::Point;

/// One piece of recorded stroke geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Start of the path; nothing is connected to it yet.
    MoveTo(Point),
    /// Quadratic curve from the previous endpoint.
    QuadTo { ctrl: Point, to: Point },
    /// Straight line from the previous endpoint.
    LineTo(Point),
}

impl Segment {
    /// Where the path ends after this segment.
    pub fn end(&self) -> Point {
        match *self {
            Segment::MoveTo(p) | Segment::LineTo(p) => p,
            Segment::QuadTo { to, .. } => to,
        }
    }
}

pub struct StrokeSmoother {
    threshold: f32,
    last_touch: Point, // last retained raw pointer position
    end: Point,        // where the emitted path currently ends
}

impl StrokeSmoother {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            last_touch: Point::default(),
            end: Point::default(),
        }
    }

    /// Pointer-down: start a fresh path at the exact touch point.
    pub fn begin(&mut self, p: Point) -> Segment {
        self.last_touch = p;
        self.end = p;
        Segment::MoveTo(p)
    }

    /// Pointer-move: None when the move is below the jitter threshold on both axes.
    /// Otherwise a curve controlled by the previous touch, ending halfway to the new one.
    pub fn advance(&mut self, p: Point) -> Option<Segment> {
        let dx = (p.x - self.last_touch.x).abs();
        let dy = (p.y - self.last_touch.y).abs();
        if dx < self.threshold && dy < self.threshold {
            return None;
        }
        let ctrl = self.last_touch;
        let to = ctrl.midpoint(p);
        self.last_touch = p;
        self.end = to;
        Some(Segment::QuadTo { ctrl, to })
    }

    /// Pointer-up: close the lag so the path ends exactly at the release point.
    pub fn finish(&mut self, p: Point) -> Segment {
        self.last_touch = p;
        self.end = p;
        Segment::LineTo(p)
    }

    /// Current endpoint of the smoothed path (drives the touch indicator).
    pub fn end(&self) -> Point {
        self.end
    }
}
