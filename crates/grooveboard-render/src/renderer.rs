//! Renderer trait abstraction.

use grooveboard_core::{DraftStroke, EraserCursor, Stroke, Whiteboard};
use kurbo::{Affine, Point, Size};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Dash pattern of the idle eraser outline, in pixels.
pub const ERASER_IDLE_DASHES: [f64; 2] = [4.0, 2.0];

/// Eraser outline color: grey while hovering, red while erasing.
pub fn eraser_outline_color(active: bool) -> Color {
    if active {
        Color::from_rgba8(220, 38, 38, 179)
    } else {
        Color::from_rgba8(107, 114, 128, 179)
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// Committed strokes of the page being shown, back to front.
    pub strokes: &'a [Stroke],
    /// The stroke being drawn.
    pub draft: Option<&'a DraftStroke>,
    /// Eraser outline under the pointer.
    pub eraser_cursor: Option<EraserCursor>,
    /// Board space to surface pixels.
    pub board_transform: Affine,
    /// Viewport size in physical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Background color.
    pub background_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context for a bare stroke list.
    pub fn new(strokes: &'a [Stroke], viewport_size: Size) -> Self {
        Self {
            strokes,
            draft: None,
            eraser_cursor: None,
            board_transform: Affine::IDENTITY,
            viewport_size,
            scale_factor: 1.0,
            background_color: Color::WHITE,
        }
    }

    /// Capture everything a frame of `board` needs: the active page, the
    /// draft, the eraser preview and the surface mapping.
    pub fn from_whiteboard(board: &'a Whiteboard, viewport_size: Size) -> Self {
        Self::new(board.board().active_page().strokes(), viewport_size)
            .with_draft(board.draft())
            .with_eraser_cursor(board.eraser_cursor())
            .with_board_transform(board.surface().board_to_surface())
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_draft(mut self, draft: Option<&'a DraftStroke>) -> Self {
        self.draft = draft;
        self
    }

    pub fn with_eraser_cursor(mut self, cursor: Option<EraserCursor>) -> Self {
        self.eraser_cursor = cursor;
        self
    }

    pub fn with_board_transform(mut self, transform: Affine) -> Self {
        self.board_transform = transform;
        self
    }

    /// Board space to physical pixels.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale_factor) * self.board_transform
    }

    /// Average linear scale of [`Self::transform`], used for line widths and radii.
    pub fn pixel_scale(&self) -> f64 {
        self.transform().determinant().abs().sqrt()
    }

    /// Map a board-space point to physical pixels.
    pub fn to_pixels(&self, point: Point) -> Point {
        self.transform() * point
    }
}

/// Trait for rendering backends.
///
/// Implementations can use Vello, a canvas API, or other rendering engines.
pub trait Renderer: Send + Sync {
    /// Build the scene/command buffer for a frame.
    ///
    /// Paint order: background, committed strokes, the draft (once it has
    /// two points), then the eraser outline.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
