//! Interactive mask painting over a raster image.
//!
//! A host forwards pointer events and control calls to [`BrushEngine`]; the
//! engine smooths the pointer stream into strokes, keeps an undoable stroke
//! history, composites a translucent overlay, drives a magnifier while a
//! gesture is active, and can export a strict black/white selection mask.

pub mod brush;
pub mod compositor;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod magnifier;
pub mod mask;
pub mod smoother;
pub mod types;

pub use config::{BrushConfig, EngineConfig, LayerConfig, MagnifierConfig};
pub use engine::BrushEngine;
pub use error::Error;
pub use types::{FrameBuffer, Point, StrokeMode};
