// Core value types shared by the engine and the host window.

use image::RgbaImage;
use tiny_skia::{ColorU8, Pixmap};

/// A position in editable-region space (pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// How a stroke affects the edit layer. Fixed when the stroke begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeMode {
    Paint,
    Erase,
}

/// Packed framebuffer for minifb.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    /// Row-major, one 0x00RRGGBB word per pixel.
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    /// Flatten a rendered canvas into 0x00RRGGBB words (alpha dropped).
    pub fn from_pixmap(pixmap: &Pixmap) -> Self {
        let pixels = pixmap
            .pixels()
            .iter()
            .map(|px| {
                let c = px.demultiply();
                ((c.red() as u32) << 16) | ((c.green() as u32) << 8) | c.blue() as u32
            })
            .collect();
        Self {
            width: pixmap.width() as usize,
            height: pixmap.height() as usize,
            pixels,
        }
    }
}

/// Convert a decoded straight-alpha image into a premultiplied pixmap.
/// Returns None for zero-sized images.
pub fn pixmap_from_rgba(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Some(pixmap)
}

/// Convert a premultiplied pixmap back into a straight-alpha image for export.
pub fn rgba_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}
