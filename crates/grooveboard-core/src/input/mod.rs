//! Pointer capture and the stroke gesture state machine.
//!
//! Mouse and touch input are unified into [`PointerEvent`]s in client
//! coordinates. [`InputCapture`] maps them onto the drawing surface, tracks a
//! single active gesture and reports what the session should do with it.

#[cfg(feature = "winit")]
mod window_events;

#[cfg(feature = "winit")]
pub use window_events::WindowEventAdapter;

use crate::geometry::Surface;
use crate::stroke::{DraftStroke, Stroke, Tool, ToolSettings};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Identifies the pointer behind an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

impl PointerId {
    pub fn is_touch(self) -> bool {
        matches!(self, PointerId::Touch(_))
    }
}

/// Pointer event type for unified mouse/touch handling.
///
/// Positions are client coordinates; [`InputCapture`] maps them to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { pointer: PointerId, position: Point },
    Move { pointer: PointerId, position: Point },
    Up { pointer: PointerId, position: Point },
    /// The pointer left the surface, or the platform cancelled the touch.
    Leave { pointer: PointerId },
}

impl PointerEvent {
    pub fn pointer(&self) -> PointerId {
        match *self {
            PointerEvent::Down { pointer, .. }
            | PointerEvent::Move { pointer, .. }
            | PointerEvent::Up { pointer, .. }
            | PointerEvent::Leave { pointer } => pointer,
        }
    }
}

/// Gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Drawing { tool: Tool, pointer: PointerId },
}

/// Work the session must carry out in response to an event.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureAction {
    /// Run the eraser at this board-space position.
    EraseAt(Point),
    /// Append this stroke to the active page and broadcast it.
    Commit(Stroke),
}

/// Result of feeding one event to [`InputCapture`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureResponse {
    pub action: Option<CaptureAction>,
    /// The host should suppress default scroll/zoom handling for this event.
    pub prevent_default: bool,
    /// The draft or cursor preview changed.
    pub needs_redraw: bool,
}

/// Translates pointer events into stroke lifecycle actions.
#[derive(Debug, Clone, Default)]
pub struct InputCapture {
    surface: Surface,
    state: CaptureState,
    draft: Option<DraftStroke>,
    cursor: Option<Point>,
}

impl InputCapture {
    /// Create a capture bound to a surface.
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            ..Self::default()
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.state != CaptureState::Idle
    }

    /// Whether the eraser is currently being dragged.
    pub fn is_erasing(&self) -> bool {
        matches!(self.state, CaptureState::Drawing { tool: Tool::Eraser, .. })
    }

    /// The in-progress stroke, if the pen is down.
    pub fn draft(&self) -> Option<&DraftStroke> {
        self.draft.as_ref()
    }

    /// Last pointer position over the surface, in board space.
    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    /// Process a pointer event.
    ///
    /// Presses outside the surface are ignored. Dragging the active pointer
    /// off the surface ends the gesture exactly like leaving it.
    pub fn handle(&mut self, event: PointerEvent, settings: &ToolSettings) -> CaptureResponse {
        let event = self.clip_to_surface(event);
        let mut response = CaptureResponse {
            prevent_default: event.pointer().is_touch(),
            ..CaptureResponse::default()
        };

        match (self.state, event) {
            (CaptureState::Idle, PointerEvent::Down { pointer, position }) => {
                if !self.surface.contains(position) {
                    response.prevent_default = false;
                    return response;
                }
                let point = self.surface.to_board(position);
                self.cursor = Some(point);
                self.state = CaptureState::Drawing {
                    tool: settings.tool,
                    pointer,
                };
                match settings.tool {
                    Tool::Pen => {
                        self.draft = Some(DraftStroke::begin(point, settings));
                    }
                    Tool::Eraser => {
                        response.action = Some(CaptureAction::EraseAt(point));
                    }
                }
                response.needs_redraw = true;
            }
            (CaptureState::Idle, PointerEvent::Move { pointer, position }) => {
                // Hover only tracks the mouse; a lifted finger has no cursor.
                if pointer == PointerId::Mouse {
                    self.cursor = Some(self.surface.to_board(position));
                    response.needs_redraw = true;
                }
            }
            (CaptureState::Idle, PointerEvent::Leave { pointer: PointerId::Mouse }) => {
                if self.cursor.take().is_some() {
                    response.needs_redraw = true;
                }
            }
            (CaptureState::Idle, _) => {}
            (CaptureState::Drawing { tool, pointer: active }, PointerEvent::Move { pointer, position })
                if pointer == active =>
            {
                let point = self.surface.to_board(position);
                self.cursor = Some(point);
                match tool {
                    Tool::Pen => {
                        if let Some(draft) = self.draft.as_mut() {
                            draft.add_point(point);
                        }
                    }
                    Tool::Eraser => {
                        response.action = Some(CaptureAction::EraseAt(point));
                    }
                }
                response.needs_redraw = true;
            }
            (CaptureState::Drawing { pointer: active, .. }, PointerEvent::Up { pointer, position })
                if pointer == active =>
            {
                self.cursor = self
                    .surface
                    .contains(position)
                    .then(|| self.surface.to_board(position));
                response.action = self.finish();
                response.needs_redraw = true;
            }
            (CaptureState::Drawing { pointer: active, .. }, PointerEvent::Leave { pointer })
                if pointer == active =>
            {
                self.cursor = None;
                response.action = self.finish();
                response.needs_redraw = true;
            }
            // Secondary touches (and stray events) while a gesture is active.
            (CaptureState::Drawing { .. }, _) => {}
        }

        response
    }

    /// Turn a move that is off the surface into a leave.
    fn clip_to_surface(&self, event: PointerEvent) -> PointerEvent {
        match event {
            PointerEvent::Move { pointer, position } if !self.surface.contains(position) => {
                PointerEvent::Leave { pointer }
            }
            other => other,
        }
    }

    /// End the current gesture, committing the draft if it is long enough.
    fn finish(&mut self) -> Option<CaptureAction> {
        self.state = CaptureState::Idle;
        let draft = self.draft.take()?;
        let len = draft.len();
        match draft.commit() {
            Some(stroke) => Some(CaptureAction::Commit(stroke)),
            None => {
                log::debug!("Discarding degenerate stroke with {} point(s)", len);
                None
            }
        }
    }
}
