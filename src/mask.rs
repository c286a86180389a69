// Binary selection mask for downstream processing.
// Visual expectation: white wherever paint survives, black everywhere else,
// no matter how translucent the on-screen overlay looks.

use image::{GrayImage, Luma};
use tiny_skia::{Color, Pixmap};

use crate::compositor::{StrokeStyle, composite};
use crate::history::Stroke;

pub const MASK_ON: u8 = 255;
pub const MASK_OFF: u8 = 0;

/// Redraw `strokes` in order on black: paint in white, erase in black, hard edges.
/// None when the region has no pixels.
pub fn extract(width: u32, height: u32, strokes: &[Stroke]) -> Option<GrayImage> {
    let mut canvas = Pixmap::new(width, height)?;
    canvas.fill(Color::BLACK);
    for stroke in strokes {
        if let Some(path) = stroke.path() {
            composite(&mut canvas, &path, &StrokeStyle::mask(stroke));
        }
    }

    let mut out = GrayImage::new(width, height);
    for (dst, px) in out.pixels_mut().zip(canvas.pixels()) {
        // only opaque black or white was drawn; threshold anyway so the output stays binary
        let v = if px.red() >= 128 { MASK_ON } else { MASK_OFF };
        *dst = Luma([v]);
    }
    Some(out)
}
