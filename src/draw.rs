// Window + input plumbing for the host application.
// Visual effects provided here:
// 1) A window that shows the image with the painted overlay.
// 2) Left mouse presses/drags/releases turned into pointer down/move/up events.

use mask_brush::{Error, FrameBuffer};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a window sized to the editable region.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Mouse position in window pixels, clamped to the window.
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Clamp)
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    pub fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    pub fn held(&self, key: Key) -> bool {
        self.window.is_key_down(key)
    }

    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(f32, f32),
    Move(f32, f32),
    Up(f32, f32),
}

/// Turns the polled button/position state into an ordered event stream.
#[derive(Default)]
pub struct PointerTracker {
    pressed: bool,
    last: Option<(f32, f32)>,
}

impl PointerTracker {
    pub fn poll(&mut self, button_down: bool, pos: Option<(f32, f32)>) -> Option<PointerEvent> {
        let event = match (self.pressed, button_down) {
            (false, true) => pos.map(|(x, y)| PointerEvent::Down(x, y)),
            (true, true) => match pos {
                Some((x, y)) if Some((x, y)) != self.last => Some(PointerEvent::Move(x, y)),
                _ => None,
            },
            // release where we last saw the pointer if it left the window
            (true, false) => pos.or(self.last).map(|(x, y)| PointerEvent::Up(x, y)),
            (false, false) => None,
        };
        match event {
            Some(PointerEvent::Down(..)) => self.pressed = true,
            Some(PointerEvent::Up(..)) => self.pressed = false,
            _ => {}
        }
        if pos.is_some() {
            self.last = pos;
        }
        event
    }
}
