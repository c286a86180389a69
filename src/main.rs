// What you SEE now:
// • The chosen image fills the window.
// • Hold Left Mouse: paint a translucent red mask; a 2x loupe follows in a top corner.
// • E toggles erase, Z undo, Y redo, [ and ] shrink/grow the brush.
// • Hold O to peek at the original. S saves mask + preview PNGs. ESC quits.

mod draw;

use std::path::PathBuf;

use clap::Parser;
use log::info;
use mask_brush::types::rgba_from_pixmap;
use mask_brush::{BrushEngine, EngineConfig, Error, FrameBuffer, MagnifierConfig};
use minifb::Key;
use tiny_skia::{Color, Pixmap};

use draw::{Drawer, PointerEvent, PointerTracker};

/// Paint a black/white selection mask over an image.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Image to paint on
    image: PathBuf,
    /// Where `S` writes the black/white mask
    #[arg(long, default_value = "mask.png")]
    mask_out: PathBuf,
    /// Where `S` writes the image with the overlay flattened on top
    #[arg(long, default_value = "preview.png")]
    preview_out: PathBuf,
    /// Initial brush size, 0-100 across the brush range
    #[arg(long, default_value_t = 50.0)]
    brush_percent: f32,
    /// Smallest brush diameter in pixels
    #[arg(long)]
    min_brush: Option<f32>,
    /// Largest brush diameter in pixels
    #[arg(long)]
    max_brush: Option<f32>,
    /// Side of the magnifier in pixels
    #[arg(long, default_value_t = 200.0)]
    magnifier_size: f32,
    /// Magnifier zoom factor
    #[arg(long, default_value_t = 2.0)]
    zoom: f32,
}

const PERCENT_STEP: f32 = 10.0;

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::parse();

    /* --- Load the picture ---
       Visual: nothing yet; the window is sized to it below. */
    let source = image::open(&args.image)
        .map_err(|source| Error::ImageLoad { path: args.image.clone(), source })?
        .to_rgba8();
    let (w, h) = source.dimensions();
    if w == 0 || h == 0 {
        return Err(Error::EmptyImage(args.image));
    }
    info!("loaded {} ({w}x{h})", args.image.display());

    /* --- Engine setup ---
       Visual: image shows with no overlay; brush sized per --brush-percent. */
    let config = EngineConfig {
        magnifier: MagnifierConfig {
            size: args.magnifier_size,
            zoom: args.zoom,
            ..MagnifierConfig::default()
        },
        ..EngineConfig::default()
    };
    let mut engine = BrushEngine::new(config);
    engine.set_source_image(&source);
    engine.set_editable_region(w, h);
    if let (Some(min), Some(max)) = (args.min_brush, args.max_brush) {
        engine.set_brush_size_range(min, max);
    }
    let mut percent = args.brush_percent.clamp(0.0, 100.0);
    engine.set_brush_size_percent(percent);

    let mut drawer = Drawer::new("Mask Brush", w as usize, h as usize)?;
    let mut canvas = Pixmap::new(w, h).ok_or_else(|| Error::EmptyImage(args.image.clone()))?;
    let mut tracker = PointerTracker::default();
    let mut title = String::new();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Controls */
        if drawer.pressed_once(Key::E) {
            engine.set_erase_mode(!engine.brush().is_erase());
        }
        if drawer.pressed_once(Key::Z) {
            engine.undo();
        }
        if drawer.pressed_once(Key::Y) {
            engine.redo();
        }
        if drawer.pressed_once(Key::LeftBracket) {
            percent = (percent - PERCENT_STEP).max(0.0);
            engine.set_brush_size_percent(percent);
        }
        if drawer.pressed_once(Key::RightBracket) {
            percent = (percent + PERCENT_STEP).min(100.0);
            engine.set_brush_size_percent(percent);
        }
        if drawer.pressed_once(Key::S) {
            save_outputs(&engine, &args)?;
        }
        engine.set_show_origin(drawer.held(Key::O));

        /* 2) Pointer: one event per frame, in order */
        match tracker.poll(drawer.left_mouse_down(), drawer.mouse_pos()) {
            Some(PointerEvent::Down(x, y)) => engine.pointer_down(x, y),
            Some(PointerEvent::Move(x, y)) => engine.pointer_move(x, y),
            Some(PointerEvent::Up(x, y)) => engine.pointer_up(x, y),
            None => {}
        }

        /* 3) Render and present */
        canvas.fill(Color::WHITE);
        engine.draw(&mut canvas);
        drawer.present(&FrameBuffer::from_pixmap(&canvas))?;

        let status = status_line(&engine, percent);
        if status != title {
            drawer.set_title(&status);
            title = status;
        }
    }

    Ok(())
}

fn status_line(engine: &BrushEngine, percent: f32) -> String {
    let mode = if engine.brush().is_erase() { "ERASE" } else { "PAINT" };
    format!(
        "Mask Brush | {mode} | size {percent:.0}% ({:.0}px) | undo {} | redo {}",
        engine.brush().size(),
        if engine.can_undo() { "yes" } else { "no" },
        if engine.can_redo() { "yes" } else { "no" },
    )
}

fn save_outputs(engine: &BrushEngine, args: &Args) -> Result<(), Error> {
    if let Some(mask) = engine.mask_bitmap() {
        mask.save(&args.mask_out)
            .map_err(|source| Error::ImageSave { path: args.mask_out.clone(), source })?;
        info!("mask written to {}", args.mask_out.display());
    }
    if let Some(preview) = engine.preview_composite() {
        rgba_from_pixmap(&preview)
            .save(&args.preview_out)
            .map_err(|source| Error::ImageSave { path: args.preview_out.clone(), source })?;
        info!("preview written to {}", args.preview_out.display());
    }
    Ok(())
}
