//! GrooveBoard Core Library
//!
//! Platform-agnostic stroke model, eraser, input handling and sync protocol
//! for the GrooveBoard shared drawing board.

pub mod board;
pub mod collaboration;
pub mod config;
pub mod eraser;
pub mod geometry;
pub mod input;
pub mod stroke;
pub mod sync;
pub mod whiteboard;

pub use board::{Board, FIRST_PAGE_ID, Page, PageId, StoreError, StoreResult, Strokes};
pub use collaboration::CollaborationManager;
pub use config::WhiteboardConfig;
pub use eraser::{Erasure, erase_near};
pub use geometry::{Surface, distance_to_segment};
pub use input::{CaptureAction, CaptureResponse, CaptureState, InputCapture, PointerEvent, PointerId};
pub use stroke::{DraftStroke, MIN_STROKE_POINTS, Stroke, StrokeId, StrokeTool, Tool, ToolSettings, is_valid_width};
pub use sync::{
    BoardChange, BoardUpdate, ConnectionState, Origin, PlatformWebSocket, SyncError, SyncEvent,
    SyncResult, Transport,
};
pub use whiteboard::{EraserCursor, Whiteboard};
