//! Freehand strokes and the tool settings they are drawn with.

use crate::geometry::distance_to_segment;
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for committed strokes.
pub type StrokeId = Uuid;

/// Minimum number of points a stroke needs to be committed.
pub const MIN_STROKE_POINTS: usize = 2;

/// Whether `width` can be used as a line or eraser width.
pub fn is_valid_width(width: f64) -> bool {
    width.is_finite() && width > 0.0
}

/// Tool that produced a committed stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeTool {
    #[default]
    Pen,
}

/// Tool currently selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
}

/// Settings owned by the toolbar; read when a gesture starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    pub tool: Tool,
    pub pen_color: String,
    pub pen_width: f64,
    /// Diameter of the eraser circle.
    pub eraser_width: f64,
}

impl ToolSettings {
    /// Hit radius used by the eraser (half the eraser circle's diameter).
    pub fn eraser_radius(&self) -> f64 {
        self.eraser_width / 2.0
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Pen,
            pen_color: "#000000".to_string(),
            pen_width: 4.0,
            eraser_width: 20.0,
        }
    }
}

/// A committed freehand stroke.
///
/// Points are held in a shared immutable slice: a stroke never changes after
/// it is committed, and cloning it is cheap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    id: StrokeId,
    tool: StrokeTool,
    points: Arc<[Point]>,
    color: String,
    width: f64,
}

impl Stroke {
    /// Build a stroke with a fresh id.
    ///
    /// Returns `None` for degenerate input (fewer than two points, or a width
    /// that is not a positive number), which is never committed.
    pub fn new(points: Vec<Point>, color: impl Into<String>, width: f64) -> Option<Self> {
        Self::with_id(Uuid::new_v4(), points, color, width)
    }

    /// Build a stroke with a known id.
    pub fn with_id(
        id: StrokeId,
        points: Vec<Point>,
        color: impl Into<String>,
        width: f64,
    ) -> Option<Self> {
        if points.len() < MIN_STROKE_POINTS || !is_valid_width(width) {
            return None;
        }
        Some(Self {
            id,
            tool: StrokeTool::Pen,
            points: points.into(),
            color: color.into(),
            width,
        })
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    pub fn tool(&self) -> StrokeTool {
        self.tool
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Whether the stroke satisfies the invariants [`Stroke::new`] enforces.
    ///
    /// Strokes decoded from the wire skip the constructor, so peers' strokes
    /// are checked with this before they are stored.
    pub fn is_well_formed(&self) -> bool {
        self.points.len() >= MIN_STROKE_POINTS && is_valid_width(self.width)
    }

    /// Whether any segment lies within `radius` plus half the stroke width of `point`.
    pub fn is_near(&self, point: Point, radius: f64) -> bool {
        let threshold = radius + self.width / 2.0;
        // Boundary counts as a hit, so no `Rect::contains` (half-open).
        let reach = self.bounds().inflate(threshold, threshold);
        if point.x < reach.x0 || point.x > reach.x1 || point.y < reach.y0 || point.y > reach.y1 {
            return false;
        }
        self.points
            .windows(2)
            .any(|segment| distance_to_segment(point, segment[0], segment[1]) <= threshold)
    }

    /// Axis-aligned bounds of the stroke's points.
    pub fn bounds(&self) -> Rect {
        polyline_bounds(&self.points)
    }

    /// The stroke as a polyline path.
    pub fn to_path(&self) -> BezPath {
        polyline_path(&self.points)
    }
}

/// The stroke being drawn, before it is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftStroke {
    points: Vec<Point>,
    color: String,
    width: f64,
}

impl DraftStroke {
    /// Open a draft seeded with its first point.
    pub fn begin(point: Point, settings: &ToolSettings) -> Self {
        Self {
            points: vec![point],
            color: settings.pen_color.clone(),
            width: settings.pen_width,
        }
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Turn the draft into a committed stroke, or `None` if it is degenerate.
    pub fn commit(self) -> Option<Stroke> {
        Stroke::new(self.points, self.color, self.width)
    }

    pub fn to_path(&self) -> BezPath {
        polyline_path(&self.points)
    }
}

fn polyline_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();

    let Some((first, rest)) = points.split_first() else {
        return path;
    };

    path.move_to(*first);
    for point in rest {
        path.line_to(*point);
    }

    path
}

fn polyline_bounds(points: &[Point]) -> Rect {
    if points.is_empty() {
        return Rect::ZERO;
    }

    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::new(min_x, min_y, max_x, max_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Stroke {
        Stroke::new(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
            "#000000",
            4.0,
        )
        .unwrap()
    }

    #[test]
    fn test_single_point_stroke_is_rejected() {
        assert!(Stroke::new(vec![Point::new(1.0, 1.0)], "#000000", 2.0).is_none());
        assert!(Stroke::new(Vec::new(), "#000000", 2.0).is_none());
    }

    #[test]
    fn test_width_must_be_positive() {
        let points = || vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0)];
        assert!(Stroke::new(points(), "#000000", 0.0).is_none());
        assert!(Stroke::new(points(), "#000000", -3.0).is_none());
        assert!(Stroke::new(points(), "#000000", f64::NAN).is_none());
        assert!(Stroke::new(points(), "#000000", f64::INFINITY).is_none());
        assert!(Stroke::new(points(), "#000000", 0.5).unwrap().is_well_formed());
    }

    #[test]
    fn test_decoded_stroke_is_checked() {
        let json = r##"{"id":"00000000-0000-0000-0000-000000000001","tool":"pen","points":[{"x":0.0,"y":0.0},{"x":1.0,"y":0.0}],"color":"#000","width":-1.0}"##;
        let stroke: Stroke = serde_json::from_str(json).unwrap();
        assert!(!stroke.is_well_formed());
    }

    #[test]
    fn test_stroke_ids_are_unique() {
        assert_ne!(sample().id(), sample().id());
    }

    #[test]
    fn test_is_near_includes_half_width() {
        let stroke = sample();
        // 6 units below the first segment: outside 5, inside 5 + 4/2.
        assert!(stroke.is_near(Point::new(5.0, -6.0), 5.0));
        assert!(!stroke.is_near(Point::new(5.0, -8.0), 5.0));
    }

    #[test]
    fn test_is_near_inside_bounds_but_off_the_line() {
        let stroke = sample();
        // Inside the corner's bounding box, far from both segments.
        assert!(!stroke.is_near(Point::new(2.0, 8.0), 1.0));
        // Outside the inflated bounds entirely.
        assert!(!stroke.is_near(Point::new(50.0, 50.0), 5.0));
        // Exactly on the inflated edge: 10 + 5 + 2.
        assert!(stroke.is_near(Point::new(17.0, 5.0), 5.0));
    }

    #[test]
    fn test_bounds() {
        let bounds = sample().bounds();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_draft_uses_settings_at_start() {
        let mut settings = ToolSettings::default();
        settings.pen_color = "#ff0000".to_string();
        settings.pen_width = 8.0;

        let mut draft = DraftStroke::begin(Point::new(1.0, 2.0), &settings);
        settings.pen_color = "#00ff00".to_string();
        draft.add_point(Point::new(3.0, 4.0));

        let stroke = draft.commit().unwrap();
        assert_eq!(stroke.color(), "#ff0000");
        assert_eq!(stroke.width(), 8.0);
        assert_eq!(stroke.points().len(), 2);
    }

    #[test]
    fn test_wire_shape() {
        let stroke = sample();
        let json = serde_json::to_value(&stroke).unwrap();
        assert_eq!(json["tool"], "pen");
        assert_eq!(json["color"], "#000000");
        assert_eq!(json["width"], 4.0);
        assert_eq!(json["points"][1]["x"], 10.0);
        assert_eq!(json["id"], stroke.id().to_string());

        let back: Stroke = serde_json::from_value(json).unwrap();
        assert_eq!(back, stroke);
    }
}
