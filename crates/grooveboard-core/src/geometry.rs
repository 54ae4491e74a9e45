//! Geometry helpers shared by the eraser and input mapping.

use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Distance from `point` to the closest point on the segment `[start, end]`.
///
/// Projects `point` onto the line through the segment, clamps the projection
/// parameter to `[0, 1]` and measures to the clamped point. A zero-length
/// segment degenerates to the distance to `start`.
pub fn distance_to_segment(point: Point, start: Point, end: Point) -> f64 {
    let line_vec = end - start;
    let point_vec = point - start;

    let line_len_sq = line_vec.hypot2();
    if line_len_sq <= 0.0 {
        return point_vec.hypot();
    }

    let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let projection = start + line_vec * t;
    (point - projection).hypot()
}

/// Placement of the drawing surface inside the client (window) coordinate space.
///
/// Strokes are stored in a fixed logical board space; the surface maps client
/// coordinates into it so that resizing the surface never shifts stored points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Top-left corner of the surface's bounding box, in client coordinates.
    pub origin: Point,
    /// Current on-screen size of the surface.
    pub size: Size,
    /// Logical extent strokes are stored in.
    pub extent: Size,
}

impl Surface {
    /// Surface whose on-screen size equals its logical extent.
    pub fn new(origin: Point, extent: Size) -> Self {
        Self { origin, size: extent, extent }
    }

    /// Update the on-screen placement after a layout change.
    pub fn set_bounds(&mut self, origin: Point, size: Size) {
        self.origin = origin;
        self.size = size;
    }

    /// Whether a client-space position lies on the surface.
    ///
    /// All four edges count as inside.
    pub fn contains(&self, client: Point) -> bool {
        client.x >= self.origin.x
            && client.y >= self.origin.y
            && client.x <= self.origin.x + self.size.width
            && client.y <= self.origin.y + self.size.height
    }

    /// Per-axis factor from surface pixels to board units.
    fn scale(&self) -> Vec2 {
        let sx = if self.size.width > 0.0 { self.extent.width / self.size.width } else { 1.0 };
        let sy = if self.size.height > 0.0 { self.extent.height / self.size.height } else { 1.0 };
        Vec2::new(sx, sy)
    }

    /// Map a client-space position into board space.
    pub fn to_board(&self, client: Point) -> Point {
        let scale = self.scale();
        Point::new(
            (client.x - self.origin.x) * scale.x,
            (client.y - self.origin.y) * scale.y,
        )
    }

    /// Map a board-space position into surface-local pixels.
    pub fn to_surface(&self, board: Point) -> Point {
        let scale = self.scale();
        Point::new(board.x / scale.x, board.y / scale.y)
    }

    /// Affine transform from board space to surface-local pixels.
    pub fn board_to_surface(&self) -> kurbo::Affine {
        let scale = self.scale();
        kurbo::Affine::scale_non_uniform(1.0 / scale.x, 1.0 / scale.y)
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(Point::ZERO, Size::new(800.0, 600.0))
    }
}
