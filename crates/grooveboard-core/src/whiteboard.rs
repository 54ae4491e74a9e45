//! The board session driven by the host event loop.

use crate::board::{Board, PageId, StoreResult};
use crate::collaboration::CollaborationManager;
use crate::config::WhiteboardConfig;
use crate::eraser::erase_near;
use crate::geometry::Surface;
use crate::input::{CaptureAction, CaptureResponse, InputCapture, PointerEvent};
use crate::stroke::{DraftStroke, Stroke, Tool, ToolSettings, is_valid_width};
use crate::sync::{
    BoardChange, ConnectionState, PlatformWebSocket, SyncError, SyncEvent, SyncResult, Transport,
};
use kurbo::{Point, Size};

/// Eraser outline shown under the pointer, in board space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraserCursor {
    pub center: Point,
    pub radius: f64,
    /// The eraser is being dragged (as opposed to hovering).
    pub active: bool,
}

/// One user's view of a shared board.
///
/// Owns the board, the gesture state machine, the toolbar settings and the
/// optional connection to the relay. Local mutations apply immediately and
/// are broadcast when a connection is up; otherwise they stay local.
pub struct Whiteboard {
    config: WhiteboardConfig,
    board: Board,
    input: InputCapture,
    settings: ToolSettings,
    collab: CollaborationManager,
    transport: Option<Box<dyn Transport>>,
    needs_redraw: bool,
}

impl Whiteboard {
    pub fn new(config: WhiteboardConfig) -> Self {
        Self {
            board: Board::new(),
            input: InputCapture::new(Surface::new(Point::ZERO, config.extent)),
            settings: config.tool_settings(),
            collab: CollaborationManager::new(),
            transport: None,
            needs_redraw: true,
            config,
        }
    }

    pub fn config(&self) -> &WhiteboardConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn collaboration(&self) -> &CollaborationManager {
        &self.collab
    }

    pub fn surface(&self) -> &Surface {
        self.input.surface()
    }

    /// The stroke being drawn, if any.
    pub fn draft(&self) -> Option<&DraftStroke> {
        self.input.draft()
    }

    /// Eraser outline to preview, when the eraser is selected and the pointer
    /// is over the surface.
    pub fn eraser_cursor(&self) -> Option<EraserCursor> {
        if self.settings.tool != Tool::Eraser {
            return None;
        }
        self.input.cursor().map(|center| EraserCursor {
            center,
            radius: self.settings.eraser_radius(),
            active: self.input.is_erasing(),
        })
    }

    /// Whether anything visible changed since the last call.
    pub fn take_needs_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Update the surface's on-screen placement (origin in client
    /// coordinates, size in pixels).
    pub fn set_surface_bounds(&mut self, origin: Point, size: Size) {
        self.input.surface_mut().set_bounds(origin, size);
        self.needs_redraw = true;
    }

    // --- Pointer input ---

    /// Feed a pointer event through the gesture state machine.
    ///
    /// The caller should suppress the platform's default handling when the
    /// response asks for it.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> CaptureResponse {
        let response = self.input.handle(event, &self.settings);
        match response.action.clone() {
            Some(CaptureAction::EraseAt(point)) => self.erase_at(point),
            Some(CaptureAction::Commit(stroke)) => self.commit(stroke),
            None => {}
        }
        self.needs_redraw |= response.needs_redraw;
        response
    }

    fn erase_at(&mut self, point: Point) {
        let index = self.board.active_index();
        let page = self.board.active_page();
        let page_id = page.id();
        let erasure = erase_near(point, page.strokes(), self.settings.eraser_radius());
        if !erasure.is_changed() {
            return;
        }
        if let Err(e) = self.board.replace_page(index, erasure.strokes) {
            log::error!("Failed to apply erase: {}", e);
            return;
        }
        self.needs_redraw = true;
        self.broadcast(page_id, BoardChange::StrokesErased(erasure.removed));
    }

    fn commit(&mut self, stroke: Stroke) {
        let index = self.board.active_index();
        let page_id = self.board.active_page().id();
        if let Err(e) = self.board.add_stroke(index, stroke.clone()) {
            log::error!("Failed to commit stroke: {}", e);
            return;
        }
        self.needs_redraw = true;
        self.broadcast(page_id, BoardChange::StrokeAdded(stroke));
    }

    // --- Toolbar ---

    pub fn set_tool(&mut self, tool: Tool) {
        self.settings.tool = tool;
        self.needs_redraw = true;
    }

    pub fn set_pen_color(&mut self, color: impl Into<String>) {
        self.settings.pen_color = color.into();
    }

    /// Set the pen width. Widths that are not positive numbers are ignored.
    pub fn set_pen_width(&mut self, width: f64) {
        if !is_valid_width(width) {
            log::warn!("Ignoring invalid pen width {}", width);
            return;
        }
        self.settings.pen_width = width;
    }

    /// Set the eraser diameter. Widths that are not positive numbers are ignored.
    pub fn set_eraser_width(&mut self, width: f64) {
        if !is_valid_width(width) {
            log::warn!("Ignoring invalid eraser width {}", width);
            return;
        }
        self.settings.eraser_width = width;
        self.needs_redraw = true;
    }

    /// Append a page, make it active and announce it. Returns its index.
    pub fn new_page(&mut self) -> usize {
        let index = self.board.add_page();
        let page_id = self.board.pages()[index].id();
        self.go_to_page(index);
        self.broadcast(page_id, BoardChange::PageAdded);
        index
    }

    pub fn next_page(&mut self) -> bool {
        let moved = self.board.next_page();
        self.needs_redraw |= moved;
        moved
    }

    pub fn previous_page(&mut self) -> bool {
        let moved = self.board.previous_page();
        self.needs_redraw |= moved;
        moved
    }

    /// Jump to a page by index.
    pub fn set_active_page(&mut self, index: usize) -> StoreResult<()> {
        self.board.set_active_page(index)?;
        self.needs_redraw = true;
        Ok(())
    }

    fn go_to_page(&mut self, index: usize) {
        if let Err(e) = self.set_active_page(index) {
            log::error!("Failed to switch page: {}", e);
        }
    }

    /// Remove every stroke on the active page and tell peers.
    pub fn clear_active_page(&mut self) {
        let index = self.board.active_index();
        let page_id = self.board.active_page().id();
        if let Err(e) = self.board.clear_page(index) {
            log::error!("Failed to clear page: {}", e);
            return;
        }
        self.needs_redraw = true;
        self.broadcast(page_id, BoardChange::PageCleared);
    }

    // --- Connection ---

    /// Connect to the configured relay and room.
    pub fn connect_default(&mut self) -> SyncResult<()> {
        let url = self.config.server_url.clone();
        let room = self.config.room.clone();
        self.connect(&url, &room)
    }

    /// Connect to a relay with the platform WebSocket client.
    pub fn connect(&mut self, url: &str, room: &str) -> SyncResult<()> {
        self.connect_with(Box::new(PlatformWebSocket::new()), url, room)
    }

    /// Connect through the given transport and join `room` once it is open.
    pub fn connect_with(&mut self, mut transport: Box<dyn Transport>, url: &str, room: &str) -> SyncResult<()> {
        self.disconnect();
        transport.connect(url)?;
        log::info!("Connecting to {} (room {})", url, room);
        self.collab.join_room(room);
        self.transport = Some(transport);
        Ok(())
    }

    /// Leave the room and close the connection.
    pub fn disconnect(&mut self) {
        let Some(mut transport) = self.transport.take() else {
            return;
        };
        self.collab.leave_room();
        Self::flush(transport.as_ref(), &mut self.collab);
        transport.disconnect();
        self.collab.handle_event(SyncEvent::Disconnected, &mut self.board);
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.transport
            .as_ref()
            .map_or(ConnectionState::Disconnected, |t| t.state())
    }

    /// Drain transport events, apply peers' changes and send queued messages.
    ///
    /// Call once per frame. Returns true if the board changed.
    pub fn pump(&mut self) -> bool {
        let Some(transport) = self.transport.as_mut() else {
            return false;
        };
        let mut changed = false;
        for event in transport.poll_events() {
            changed |= self.collab.handle_event(event, &mut self.board);
        }
        if let Some(transport) = self.transport.as_ref() {
            Self::flush(transport.as_ref(), &mut self.collab);
        }
        self.needs_redraw |= changed;
        changed
    }

    fn broadcast(&mut self, page: PageId, change: BoardChange) {
        match self.collab.broadcast(page, change) {
            Ok(_) => {}
            Err(SyncError::TransportUnavailable) => {
                log::debug!("Not connected; change stays local");
                return;
            }
            Err(e) => {
                log::warn!("Failed to broadcast change: {}", e);
                return;
            }
        }
        if let Some(transport) = self.transport.as_ref() {
            Self::flush(transport.as_ref(), &mut self.collab);
        }
    }

    fn flush(transport: &dyn Transport, collab: &mut CollaborationManager) {
        for msg in collab.take_outgoing() {
            if let Err(e) = transport.send(&msg) {
                log::warn!("Failed to send message: {}", e);
            }
        }
    }
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::new(WhiteboardConfig::default())
    }
}

impl Drop for Whiteboard {
    fn drop(&mut self) {
        self.disconnect();
    }
}
