//! # Input
//!
//! Turns raw pointer and keyboard events into normalized device coordinates
//! and a queue of discrete intents that the experience drains at the start
//! of each frame.
//!
//! Coordinates follow the usual NDC layout: x and y in -1..1, +y up.

use std::collections::VecDeque;

use cgmath::{InnerSpace, Vector2};
use log::debug;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{Key, NamedKey};

/// Maximum pointer travel (in NDC) between press and release that still counts as a click
pub const DEFAULT_DRAG_THRESHOLD: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Move(Vector2<f32>),
    Click(Vector2<f32>),
    Escape,
}

/// What the pointer should look like over the 3D view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Pointer,
}

/// The drawable area in window pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    /// Pixel position to NDC; `None` while the viewport has no area
    pub fn to_ndc(&self, x: f32, y: f32) -> Option<Vector2<f32>> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let nx = (x - self.left) / self.width * 2.0 - 1.0;
        let ny = -((y - self.top) / self.height * 2.0 - 1.0);
        Some(Vector2::new(nx, ny))
    }
}

#[derive(Debug, Clone)]
pub struct InputAdapter {
    viewport: Viewport,
    drag_threshold: f32,
    pointer: Option<Vector2<f32>>,
    cursor_px: Option<(f32, f32)>,
    down_at: Option<Vector2<f32>>,
    queue: VecDeque<Intent>,
}

impl InputAdapter {
    pub fn new(viewport: Viewport, drag_threshold: f32) -> Self {
        Self {
            viewport,
            drag_threshold,
            pointer: None,
            cursor_px: None,
            down_at: None,
            queue: VecDeque::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport.width = width as f32;
        self.viewport.height = height as f32;
    }

    /// Last known pointer position in NDC
    pub fn pointer(&self) -> Option<Vector2<f32>> {
        self.pointer
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.cursor_px = Some((x, y));
        if let Some(ndc) = self.viewport.to_ndc(x, y) {
            self.pointer = Some(ndc);
            self.queue.push_back(Intent::Move(ndc));
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.cursor_px = Some((x, y));
        if let Some(ndc) = self.viewport.to_ndc(x, y) {
            self.pointer = Some(ndc);
            self.down_at = Some(ndc);
        }
    }

    /// Emits a click unless the pointer travelled further than the drag threshold
    pub fn pointer_up(&mut self, x: f32, y: f32) {
        self.cursor_px = Some((x, y));
        let Some(ndc) = self.viewport.to_ndc(x, y) else {
            return;
        };
        self.pointer = Some(ndc);
        let Some(down) = self.down_at.take() else {
            return;
        };
        if (ndc - down).magnitude() > self.drag_threshold {
            debug!("[Input] drag ignored");
            return;
        }
        self.queue.push_back(Intent::Click(ndc));
    }

    pub fn escape(&mut self) {
        self.queue.push_back(Intent::Escape);
    }

    /// Feeds a window event through the adapter. Returns whether it was used.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(position.x as f32, position.y as f32);
                true
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let Some((x, y)) = self.cursor_px else {
                    return false;
                };
                match state {
                    ElementState::Pressed => self.pointer_down(x, y),
                    ElementState::Released => self.pointer_up(x, y),
                }
                true
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && !event.repeat
                    && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                self.escape();
                true
            }
            WindowEvent::Resized(size) => {
                self.resize(size.width, size.height);
                true
            }
            _ => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Takes every queued intent, oldest first
    pub fn drain(&mut self) -> Vec<Intent> {
        self.queue.drain(..).collect()
    }
}

impl Default for InputAdapter {
    fn default() -> Self {
        Self::new(Viewport::new(1200.0, 800.0), DEFAULT_DRAG_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::{PhysicalPosition, PhysicalSize};
    use winit::event::DeviceId;

    fn adapter() -> InputAdapter {
        InputAdapter::new(Viewport::new(200.0, 100.0), DEFAULT_DRAG_THRESHOLD)
    }

    #[test]
    fn test_pixel_to_ndc() {
        let viewport = Viewport::new(200.0, 100.0);
        assert_eq!(viewport.to_ndc(100.0, 50.0), Some(Vector2::new(0.0, 0.0)));
        assert_eq!(viewport.to_ndc(0.0, 0.0), Some(Vector2::new(-1.0, 1.0)));
        assert_eq!(viewport.to_ndc(200.0, 100.0), Some(Vector2::new(1.0, -1.0)));

        let offset = Viewport {
            left: 50.0,
            top: 10.0,
            width: 100.0,
            height: 100.0,
        };
        assert_eq!(offset.to_ndc(50.0, 10.0), Some(Vector2::new(-1.0, 1.0)));
        assert_eq!(Viewport::new(0.0, 100.0).to_ndc(1.0, 1.0), None);
    }

    #[test]
    fn test_click_versus_drag() {
        let mut input = adapter();
        input.pointer_down(100.0, 50.0);
        input.pointer_up(100.0, 50.0);
        assert_eq!(input.drain(), vec![Intent::Click(Vector2::new(0.0, 0.0))]);

        input.pointer_down(100.0, 50.0);
        input.pointer_up(110.0, 50.0);
        assert!(input.drain().is_empty());
    }

    #[test]
    fn test_release_without_press_is_not_a_click() {
        let mut input = adapter();
        input.pointer_up(100.0, 50.0);
        assert!(!input.has_pending());
    }

    #[test]
    fn test_intents_keep_order() {
        let mut input = adapter();
        input.pointer_moved(0.0, 0.0);
        input.escape();
        let intents = input.drain();
        assert_eq!(
            intents,
            vec![Intent::Move(Vector2::new(-1.0, 1.0)), Intent::Escape]
        );
        assert!(input.drain().is_empty());
        assert_eq!(input.pointer(), Some(Vector2::new(-1.0, 1.0)));
    }

    #[test]
    fn test_window_events() {
        let mut input = adapter();
        assert!(input.handle_window_event(&WindowEvent::Resized(PhysicalSize::new(400, 200))));
        assert_eq!(input.viewport().width, 400.0);

        // SAFETY: dummy device ids are only used to build synthetic events
        let device_id = unsafe { DeviceId::dummy() };
        input.handle_window_event(&WindowEvent::CursorMoved {
            device_id,
            position: PhysicalPosition::new(200.0, 100.0),
        });
        input.handle_window_event(&WindowEvent::MouseInput {
            device_id,
            state: ElementState::Pressed,
            button: MouseButton::Left,
        });
        input.handle_window_event(&WindowEvent::MouseInput {
            device_id,
            state: ElementState::Released,
            button: MouseButton::Left,
        });
        assert_eq!(
            input.drain(),
            vec![
                Intent::Move(Vector2::new(0.0, 0.0)),
                Intent::Click(Vector2::new(0.0, 0.0))
            ]
        );
    }
}
