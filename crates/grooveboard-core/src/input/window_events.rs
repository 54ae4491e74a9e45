//! Conversion from winit window events.

use super::{PointerEvent, PointerId};
use ::winit::event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent};
use kurbo::Point;

/// Turns winit cursor, button and touch events into [`PointerEvent`]s.
///
/// winit reports button presses without a position, so the adapter remembers
/// the last cursor location.
#[derive(Debug, Clone, Default)]
pub struct WindowEventAdapter {
    cursor: Point,
}

impl WindowEventAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate a window event; returns `None` for events that are not pointer input.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Point::new(position.x, position.y);
                Some(PointerEvent::Move {
                    pointer: PointerId::Mouse,
                    position: self.cursor,
                })
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => Some(match state {
                ElementState::Pressed => PointerEvent::Down {
                    pointer: PointerId::Mouse,
                    position: self.cursor,
                },
                ElementState::Released => PointerEvent::Up {
                    pointer: PointerId::Mouse,
                    position: self.cursor,
                },
            }),
            WindowEvent::CursorLeft { .. } => Some(PointerEvent::Leave {
                pointer: PointerId::Mouse,
            }),
            WindowEvent::Touch(touch) => Some(translate_touch(touch)),
            _ => None,
        }
    }
}

fn translate_touch(touch: &Touch) -> PointerEvent {
    let pointer = PointerId::Touch(touch.id);
    let position = Point::new(touch.location.x, touch.location.y);
    match touch.phase {
        TouchPhase::Started => PointerEvent::Down { pointer, position },
        TouchPhase::Moved => PointerEvent::Move { pointer, position },
        TouchPhase::Ended => PointerEvent::Up { pointer, position },
        TouchPhase::Cancelled => PointerEvent::Leave { pointer },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::winit::dpi::PhysicalPosition;
    use ::winit::event::DeviceId;

    fn device() -> DeviceId {
        // SAFETY: only used to build synthetic events, never passed to winit.
        unsafe { DeviceId::dummy() }
    }

    fn cursor_moved(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(x, y),
        }
    }

    fn mouse(state: ElementState, button: MouseButton) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button,
        }
    }

    fn touch(id: u64, phase: TouchPhase, x: f64, y: f64) -> WindowEvent {
        WindowEvent::Touch(Touch {
            device_id: device(),
            phase,
            location: PhysicalPosition::new(x, y),
            force: None,
            id,
        })
    }

    #[test]
    fn test_button_uses_last_cursor_position() {
        let mut adapter = WindowEventAdapter::new();
        assert_eq!(
            adapter.translate(&cursor_moved(12.0, 34.0)),
            Some(PointerEvent::Move { pointer: PointerId::Mouse, position: Point::new(12.0, 34.0) })
        );
        assert_eq!(
            adapter.translate(&mouse(ElementState::Pressed, MouseButton::Left)),
            Some(PointerEvent::Down { pointer: PointerId::Mouse, position: Point::new(12.0, 34.0) })
        );

        adapter.translate(&cursor_moved(56.0, 78.0));
        assert_eq!(
            adapter.translate(&mouse(ElementState::Released, MouseButton::Left)),
            Some(PointerEvent::Up { pointer: PointerId::Mouse, position: Point::new(56.0, 78.0) })
        );
    }

    #[test]
    fn test_other_buttons_are_ignored() {
        let mut adapter = WindowEventAdapter::new();
        assert_eq!(adapter.translate(&mouse(ElementState::Pressed, MouseButton::Right)), None);
        assert_eq!(adapter.translate(&WindowEvent::Focused(true)), None);
    }

    #[test]
    fn test_cursor_left_is_leave() {
        let mut adapter = WindowEventAdapter::new();
        let event = WindowEvent::CursorLeft { device_id: device() };
        assert_eq!(adapter.translate(&event), Some(PointerEvent::Leave { pointer: PointerId::Mouse }));
    }

    #[test]
    fn test_touch_phases() {
        let mut adapter = WindowEventAdapter::new();
        let pointer = PointerId::Touch(3);
        let position = Point::new(5.0, 6.0);

        assert_eq!(
            adapter.translate(&touch(3, TouchPhase::Started, 5.0, 6.0)),
            Some(PointerEvent::Down { pointer, position })
        );
        assert_eq!(
            adapter.translate(&touch(3, TouchPhase::Moved, 5.0, 6.0)),
            Some(PointerEvent::Move { pointer, position })
        );
        assert_eq!(
            adapter.translate(&touch(3, TouchPhase::Ended, 5.0, 6.0)),
            Some(PointerEvent::Up { pointer, position })
        );
        assert_eq!(
            adapter.translate(&touch(3, TouchPhase::Cancelled, 5.0, 6.0)),
            Some(PointerEvent::Leave { pointer })
        );
    }
}
