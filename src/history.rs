// Stroke records and the undo/redo store.
// The unit of history is one whole drag: undo removes a full stroke, redo brings it back.

use log::debug;
use tiny_skia::{Path, PathBuilder};

use crate::smoother::Segment;
use crate::types::{Point, StrokeMode};

/// One continuous drag: geometry plus the mode and width it was captured with.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    mode: StrokeMode,
    width: f32,
    segments: Vec<Segment>,
}

impl Stroke {
    pub fn new(mode: StrokeMode, width: f32) -> Self {
        Self { mode, width, segments: Vec::new() }
    }

    pub fn mode(&self) -> StrokeMode {
        self.mode
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The full path, or None while it has no drawable geometry.
    pub fn path(&self) -> Option<Path> {
        build_path(None, &self.segments)
    }

    /// Path covering only `segments[from..]`, starting at the endpoint before `from`.
    /// Used to composite just the newest part of an active stroke.
    pub fn tail_path(&self, from: usize) -> Option<Path> {
        if from == 0 {
            return self.path();
        }
        let start = self.segments.get(from - 1)?.end();
        build_path(Some(start), self.segments.get(from..)?)
    }
}

fn build_path(start: Option<Point>, segments: &[Segment]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    if let Some(p) = start {
        pb.move_to(p.x, p.y);
    }
    for seg in segments {
        match *seg {
            Segment::MoveTo(p) => pb.move_to(p.x, p.y),
            Segment::QuadTo { ctrl, to } => pb.quad_to(ctrl.x, ctrl.y, to.x, to.y),
            Segment::LineTo(p) => pb.line_to(p.x, p.y),
        }
    }
    pb.finish()
}

/// Committed strokes (oldest first), the redo buffer, and the in-progress stroke.
#[derive(Debug, Default)]
pub struct History {
    committed: Vec<Stroke>,
    undone: Vec<Stroke>,
    active: Option<Stroke>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new stroke. A fresh edit drops everything that could be redone.
    pub fn begin_stroke(&mut self, mode: StrokeMode, width: f32) {
        if !self.undone.is_empty() {
            debug!("new stroke discards {} redo entries", self.undone.len());
            self.undone.clear();
        }
        self.active = Some(Stroke::new(mode, width));
    }

    /// Append geometry to the active stroke; ignored when no stroke is active.
    pub fn extend_active(&mut self, segment: Segment) {
        if let Some(stroke) = self.active.as_mut() {
            stroke.segments.push(segment);
        }
    }

    /// Move the active stroke into the committed list. Returns false if none was active.
    pub fn commit_active(&mut self) -> bool {
        match self.active.take() {
            Some(stroke) => {
                self.committed.push(stroke);
                debug!("stroke committed, {} in history", self.committed.len());
                true
            }
            None => false,
        }
    }

    /// Refused while a stroke is active, as is [`History::redo`].
    pub fn undo(&mut self) -> bool {
        if self.active.is_some() {
            return false;
        }
        match self.committed.pop() {
            Some(stroke) => {
                self.undone.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Restores the most recently undone stroke as the newest committed one.
    pub fn redo(&mut self) -> bool {
        if self.active.is_some() {
            return false;
        }
        match self.undone.pop() {
            Some(stroke) => {
                self.committed.push(stroke);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.committed.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn committed(&self) -> &[Stroke] {
        &self.committed
    }

    pub fn active(&self) -> Option<&Stroke> {
        self.active.as_ref()
    }
}
