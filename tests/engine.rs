use image::{Rgba, RgbaImage};
use mask_brush::magnifier::sampling_rect;
use mask_brush::{BrushEngine, EngineConfig, Point};
use tiny_skia::Pixmap;

fn layer_bytes(engine: &BrushEngine) -> Vec<u8> {
    engine.edit_layer().unwrap().data().to_vec()
}

fn drag(engine: &mut BrushEngine, points: &[(f32, f32)]) {
    let (first, rest) = points.split_first().unwrap();
    engine.pointer_down(first.0, first.1);
    for &(x, y) in rest {
        engine.pointer_move(x, y);
    }
    let last = points.last().unwrap();
    engine.pointer_up(last.0, last.1);
}

fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

#[test]
fn straight_stroke_undo_redo_scenario() {
    let mut engine = BrushEngine::default();
    engine.set_editable_region(200, 200);
    engine.set_brush_size_percent(50.0);

    drag(&mut engine, &[(50.0, 50.0), (60.0, 50.0)]);
    assert!(engine.can_undo());
    let painted = layer_bytes(&engine);
    assert!(painted.iter().any(|&b| b != 0));

    assert!(engine.undo());
    assert!(!engine.can_undo());
    assert!(engine.can_redo());
    assert!(layer_bytes(&engine).iter().all(|&b| b == 0));

    assert!(engine.redo());
    assert_eq!(layer_bytes(&engine), painted);
}

#[test]
fn undo_redo_is_symmetric_for_mixed_history() {
    let mut engine = BrushEngine::default();
    engine.set_editable_region(160, 120);
    drag(&mut engine, &[(10.0, 10.0), (40.0, 30.0), (80.0, 20.0), (120.0, 90.0)]);
    engine.set_erase_mode(true);
    drag(&mut engine, &[(60.0, 0.0), (62.0, 40.0), (70.0, 110.0)]);
    engine.set_erase_mode(false);
    engine.set_brush_size_percent(100.0);
    drag(&mut engine, &[(150.0, 5.0), (100.0, 60.0), (20.0, 100.0)]);

    let before = layer_bytes(&engine);
    engine.undo();
    assert_ne!(layer_bytes(&engine), before);
    engine.redo();
    assert_eq!(layer_bytes(&engine), before);

    engine.undo();
    engine.undo();
    engine.redo();
    engine.redo();
    assert_eq!(layer_bytes(&engine), before);
}

#[test]
fn new_stroke_after_undo_clears_redo() {
    let mut engine = BrushEngine::default();
    engine.set_editable_region(100, 100);
    drag(&mut engine, &[(10.0, 10.0), (50.0, 50.0)]);
    engine.undo();
    assert!(engine.can_redo());
    drag(&mut engine, &[(80.0, 10.0), (80.0, 60.0)]);
    assert!(!engine.can_redo());
    assert!(!engine.redo());
}

#[test]
fn undo_redo_on_empty_history_are_noops() {
    let mut engine = BrushEngine::default();
    engine.set_editable_region(50, 50);
    assert!(!engine.undo());
    assert!(!engine.redo());
    assert!(layer_bytes(&engine).iter().all(|&b| b == 0));
}

#[test]
fn replaying_history_twice_gives_identical_layers() {
    let strokes: &[&[(f32, f32)]] = &[
        &[(5.0, 5.0), (30.0, 12.0), (61.0, 40.0)],
        &[(70.0, 3.0), (20.0, 70.0)],
        &[(0.0, 40.0), (90.0, 41.0), (95.0, 80.0)],
    ];
    let run = || {
        let mut engine = BrushEngine::default();
        engine.set_editable_region(100, 90);
        for (i, s) in strokes.iter().enumerate() {
            engine.set_erase_mode(i == 1);
            drag(&mut engine, s);
        }
        engine
    };
    let a = run();
    let mut b = run();
    assert_eq!(layer_bytes(&a), layer_bytes(&b));
    // a full replay of the same history lands on the same bytes as the live path
    b.undo();
    b.redo();
    assert_eq!(layer_bytes(&a), layer_bytes(&b));
}

#[test]
fn jitter_below_threshold_adds_no_segments() {
    let mut engine = BrushEngine::default();
    engine.set_editable_region(100, 100);
    engine.pointer_down(20.0, 20.0);
    for (x, y) in [(21.0, 22.0), (23.5, 17.0), (17.0, 23.0), (20.0, 20.0)] {
        engine.pointer_move(x, y);
    }
    let stroke = engine.history().active().unwrap();
    assert_eq!(stroke.segments().len(), 1);

    engine.pointer_move(24.0, 20.0);
    assert_eq!(engine.history().active().unwrap().segments().len(), 2);
}

#[test]
fn committed_stroke_keeps_its_width_and_mode() {
    let mut engine = BrushEngine::default();
    engine.set_editable_region(100, 100);
    engine.set_brush_size_percent(0.0);
    let thin = engine.brush().size();
    drag(&mut engine, &[(10.0, 10.0), (50.0, 10.0)]);
    engine.set_brush_size_percent(100.0);
    engine.set_erase_mode(true);

    let first = &engine.history().committed()[0];
    assert_eq!(first.width(), thin);
    assert_eq!(first.mode(), mask_brush::StrokeMode::Paint);
}

#[test]
fn mask_is_binary_and_follows_paint_and_erase() {
    let mut engine = BrushEngine::default();
    engine.set_editable_region(120, 120);
    engine.set_brush_size_range(20.0, 20.0);
    drag(&mut engine, &[(10.0, 60.0), (40.0, 60.0), (110.0, 60.0)]);
    engine.set_brush_size_range(6.0, 6.0);
    engine.set_erase_mode(true);
    drag(&mut engine, &[(80.0, 0.0), (80.0, 50.0), (80.0, 119.0)]);

    let mask = engine.mask_bitmap().unwrap();
    assert_eq!(mask.dimensions(), (120, 120));
    assert!(mask.pixels().all(|p| p[0] == 0 || p[0] == 255));
    assert_eq!(mask.get_pixel(30, 60)[0], 255);
    assert_eq!(mask.get_pixel(80, 60)[0], 0);
    assert_eq!(mask.get_pixel(30, 5)[0], 0);
}

#[test]
fn brush_percent_is_clamped() {
    let mut a = BrushEngine::default();
    let mut b = BrushEngine::default();
    a.set_brush_size_percent(150.0);
    b.set_brush_size_percent(100.0);
    assert_eq!(a.brush(), b.brush());
    a.set_brush_size_percent(-10.0);
    b.set_brush_size_percent(0.0);
    assert_eq!(a.brush(), b.brush());
}

#[test]
fn magnifier_sample_never_leaves_image() {
    let (w, h) = (320, 240);
    let rect = sampling_rect(Point::new((w - 1) as f32, (h - 1) as f32), 50.0, (w, h)).unwrap();
    assert!(rect.right() <= w as i32);
    assert!(rect.bottom() <= h as i32);

    let mut engine = BrushEngine::new(EngineConfig::default());
    engine.set_source_image(&solid(w, h, [10, 10, 10, 255]));
    engine.set_editable_region(w, h);
    engine.pointer_down((w - 1) as f32, (h - 1) as f32);
    let view = engine.magnifier().view().unwrap();
    assert!(view.sample.right() <= w as i32);
    assert!(view.sample.bottom() <= h as i32);
    assert!(view.sample.x() >= 0 && view.sample.y() >= 0);
}

#[test]
fn magnifier_visible_only_during_gesture() {
    let mut engine = BrushEngine::default();
    engine.set_source_image(&solid(300, 300, [200, 200, 200, 255]));
    engine.set_editable_region(300, 300);
    assert!(!engine.magnifier().is_shown());
    engine.pointer_down(150.0, 150.0);
    assert!(engine.magnifier().is_shown());
    assert!(engine.is_gesture_active());
    engine.pointer_move(180.0, 150.0);
    assert!(engine.magnifier().is_shown());
    engine.pointer_up(190.0, 150.0);
    assert!(!engine.magnifier().is_shown());
    assert!(!engine.is_gesture_active());
}

#[test]
fn magnifier_maps_region_pointer_into_larger_source() {
    let mut engine = BrushEngine::default();
    engine.set_source_image(&solid(800, 600, [0, 0, 0, 255]));
    engine.set_editable_region(400, 300);
    engine.pointer_down(200.0, 150.0);
    let view = engine.magnifier().view().unwrap();
    assert_eq!(view.ratio, (2.0, 2.0));
    assert_eq!(view.source_point, Point::new(400.0, 300.0));
}

#[test]
fn preview_composite_flattens_image_and_overlay() {
    let mut engine = BrushEngine::default();
    assert!(engine.preview_composite().is_none());
    engine.set_source_image(&solid(100, 100, [0, 0, 255, 255]));
    engine.set_editable_region(100, 100);
    drag(&mut engine, &[(10.0, 50.0), (50.0, 50.0), (90.0, 50.0)]);

    let preview = engine.preview_composite().unwrap();
    let untouched = preview.pixel(50, 5).unwrap();
    assert_eq!((untouched.red(), untouched.blue(), untouched.alpha()), (0, 255, 255));
    let painted = preview.pixel(50, 50).unwrap();
    assert!(painted.red() > 0);
    assert_eq!(painted.alpha(), 255);
}

#[test]
fn draw_shows_touch_ring_only_while_dragging() {
    let mut engine = BrushEngine::default();
    engine.set_editable_region(300, 300);
    engine.set_brush_size_range(40.0, 40.0);
    // erasing an empty layer leaves it transparent, so only the ring can show up
    engine.set_erase_mode(true);

    let mut idle = Pixmap::new(300, 300).unwrap();
    engine.draw(&mut idle);
    assert!(idle.data().iter().all(|&b| b == 0));

    engine.pointer_down(150.0, 250.0);
    let mut active = Pixmap::new(300, 300).unwrap();
    engine.draw(&mut active);
    // ring of radius 20 around the touch point
    assert!(active.pixel(170, 250).unwrap().alpha() > 0);
    assert_eq!(active.pixel(150, 250).unwrap().alpha(), 0);

    engine.pointer_up(150.0, 250.0);
    let mut after = Pixmap::new(300, 300).unwrap();
    engine.draw(&mut after);
    assert!(after.data().iter().all(|&b| b == 0));
}

#[test]
fn undo_during_drag_is_refused() {
    let mut engine = BrushEngine::default();
    engine.set_editable_region(100, 100);
    drag(&mut engine, &[(10.0, 10.0), (90.0, 10.0)]);
    engine.pointer_down(10.0, 80.0);
    assert!(!engine.undo());
    engine.pointer_move(60.0, 80.0);
    engine.pointer_up(90.0, 80.0);

    assert!(!engine.can_redo());
    assert!(!engine.redo());
    assert_eq!(engine.history().committed().len(), 2);
    let layer = engine.edit_layer().unwrap();
    assert!(layer.pixel(50, 10).unwrap().alpha() > 0);
    assert!(layer.pixel(50, 80).unwrap().alpha() > 0);
}

#[test]
fn redo_during_drag_is_refused_and_new_stroke_clears_it() {
    let mut engine = BrushEngine::default();
    engine.set_editable_region(100, 100);
    drag(&mut engine, &[(10.0, 10.0), (90.0, 10.0)]);
    engine.undo();
    engine.pointer_down(10.0, 80.0);
    assert!(!engine.redo());
    engine.pointer_up(90.0, 80.0);

    assert!(!engine.can_redo());
    assert_eq!(engine.history().committed().len(), 1);
    assert_eq!(engine.edit_layer().unwrap().pixel(50, 10).unwrap().alpha(), 0);
}
