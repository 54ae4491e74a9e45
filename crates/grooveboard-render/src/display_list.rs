//! Backend-neutral renderer producing flat drawing commands.
//!
//! Hosts without a GPU scene graph (a browser 2D canvas, a test harness)
//! replay the commands in order. All coordinates are physical pixels.

use crate::color::parse_color;
use crate::renderer::{ERASER_IDLE_DASHES, RenderContext, Renderer, eraser_outline_color};
use kurbo::{Point, Rect};
use peniko::Color;

/// One drawing operation.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Fill the whole viewport.
    Clear { rect: Rect, color: Color },
    /// Open polyline with round caps and joins.
    Polyline { points: Vec<Point>, color: Color, width: f64 },
    /// Circle outline, optionally dashed.
    Circle {
        center: Point,
        radius: f64,
        color: Color,
        width: f64,
        dashes: Option<[f64; 2]>,
    },
}

/// Renderer that records [`DrawCommand`]s.
#[derive(Debug, Default)]
pub struct DisplayListRenderer {
    commands: Vec<DrawCommand>,
}

impl DisplayListRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands of the last built frame.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    fn polyline(&mut self, ctx: &RenderContext, points: &[Point], color: &str, width: f64) {
        self.commands.push(DrawCommand::Polyline {
            points: points.iter().map(|&p| ctx.to_pixels(p)).collect(),
            color: parse_color(color),
            width: width * ctx.pixel_scale(),
        });
    }
}

impl Renderer for DisplayListRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear {
            rect: Rect::from_origin_size(Point::ZERO, ctx.viewport_size),
            color: self.background_color(ctx),
        });

        for stroke in ctx.strokes {
            self.polyline(ctx, stroke.points(), stroke.color(), stroke.width());
        }

        if let Some(draft) = ctx.draft.filter(|draft| draft.len() > 1) {
            self.polyline(ctx, draft.points(), draft.color(), draft.width());
        }

        if let Some(cursor) = ctx.eraser_cursor {
            self.commands.push(DrawCommand::Circle {
                center: ctx.to_pixels(cursor.center),
                radius: cursor.radius * ctx.pixel_scale(),
                color: eraser_outline_color(cursor.active),
                width: ctx.scale_factor,
                dashes: (!cursor.active).then_some(ERASER_IDLE_DASHES),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grooveboard_core::{PointerEvent, PointerId, Stroke, Tool, Whiteboard};
    use kurbo::Size;

    fn draw(board: &mut Whiteboard, from: Point, to: Point) {
        board.handle_pointer(PointerEvent::Down { pointer: PointerId::Mouse, position: from });
        board.handle_pointer(PointerEvent::Move { pointer: PointerId::Mouse, position: to });
        board.handle_pointer(PointerEvent::Up { pointer: PointerId::Mouse, position: to });
    }

    #[test]
    fn test_paint_order() {
        let mut board = Whiteboard::default();
        draw(&mut board, Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        board.set_pen_color("#ff0000");
        board.handle_pointer(PointerEvent::Down { pointer: PointerId::Mouse, position: Point::new(50.0, 50.0) });
        board.handle_pointer(PointerEvent::Move { pointer: PointerId::Mouse, position: Point::new(60.0, 50.0) });

        let mut renderer = DisplayListRenderer::new();
        renderer.build_scene(&RenderContext::from_whiteboard(&board, Size::new(800.0, 600.0)));

        let commands = renderer.commands();
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], DrawCommand::Clear { .. }));
        match &commands[2] {
            DrawCommand::Polyline { points, color, width } => {
                assert_eq!(points, &vec![Point::new(50.0, 50.0), Point::new(60.0, 50.0)]);
                assert_eq!(color.to_rgba8().r, 255);
                assert_eq!(*width, 4.0);
            }
            other => panic!("expected draft polyline, got {:?}", other),
        }
    }

    #[test]
    fn test_single_point_draft_is_not_painted() {
        let mut board = Whiteboard::default();
        board.handle_pointer(PointerEvent::Down { pointer: PointerId::Mouse, position: Point::new(5.0, 5.0) });

        let mut renderer = DisplayListRenderer::new();
        renderer.build_scene(&RenderContext::from_whiteboard(&board, Size::new(800.0, 600.0)));
        assert_eq!(renderer.commands().len(), 1);
    }

    #[test]
    fn test_eraser_outline_styles() {
        let mut board = Whiteboard::default();
        board.set_tool(Tool::Eraser);
        board.handle_pointer(PointerEvent::Move { pointer: PointerId::Mouse, position: Point::new(40.0, 30.0) });

        let mut renderer = DisplayListRenderer::new();
        renderer.build_scene(&RenderContext::from_whiteboard(&board, Size::new(800.0, 600.0)));
        match renderer.commands().last() {
            Some(DrawCommand::Circle { center, radius, dashes, .. }) => {
                assert_eq!(*center, Point::new(40.0, 30.0));
                assert_eq!(*radius, 10.0);
                assert!(dashes.is_some());
            }
            other => panic!("expected eraser outline, got {:?}", other),
        }

        board.handle_pointer(PointerEvent::Down { pointer: PointerId::Mouse, position: Point::new(40.0, 30.0) });
        renderer.build_scene(&RenderContext::from_whiteboard(&board, Size::new(800.0, 600.0)));
        match renderer.commands().last() {
            Some(DrawCommand::Circle { dashes, color, .. }) => {
                assert!(dashes.is_none());
                assert_eq!(color.to_rgba8().r, 220);
            }
            other => panic!("expected eraser outline, got {:?}", other),
        }
    }

    #[test]
    fn test_strokes_follow_surface_scale() {
        let stroke = Stroke::new(vec![Point::new(0.0, 0.0), Point::new(800.0, 600.0)], "#000000", 4.0).unwrap();
        let strokes = vec![stroke];
        let ctx = RenderContext::new(&strokes, Size::new(400.0, 300.0))
            .with_board_transform(kurbo::Affine::scale(0.5));

        let mut renderer = DisplayListRenderer::new();
        renderer.build_scene(&ctx);
        match &renderer.commands()[1] {
            DrawCommand::Polyline { points, width, .. } => {
                assert_eq!(points[1], Point::new(400.0, 300.0));
                assert_eq!(*width, 2.0);
            }
            other => panic!("expected polyline, got {:?}", other),
        }
    }
}
