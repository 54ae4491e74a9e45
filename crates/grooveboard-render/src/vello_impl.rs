//! Vello-based renderer implementation.

use crate::color::parse_color;
use crate::renderer::{ERASER_IDLE_DASHES, RenderContext, Renderer, eraser_outline_color};
use kurbo::{Affine, BezPath, Cap, Circle, Join, Point, Rect, Stroke};
use peniko::Fill;
use vello::Scene;

/// Vello-based renderer for GPU-accelerated 2D graphics.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Line style shared by committed strokes and the draft.
fn pen_style(width: f64) -> Stroke {
    Stroke::new(width).with_caps(Cap::Round).with_join(Join::Round)
}

impl VelloRenderer {
    /// Create a new Vello renderer.
    pub fn new() -> Self {
        Self { scene: Scene::new() }
    }

    /// Get the built scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the built scene, leaving an empty one.
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    fn render_polyline(&mut self, path: &BezPath, color: &str, width: f64, transform: Affine) {
        self.scene
            .stroke(&pen_style(width), transform, parse_color(color), None, path);
    }

    /// Eraser outline, drawn in pixel space so its line stays one pixel wide.
    fn render_eraser_cursor(&mut self, ctx: &RenderContext) {
        let Some(cursor) = ctx.eraser_cursor else {
            return;
        };
        let circle = Circle::new(ctx.to_pixels(cursor.center), cursor.radius * ctx.pixel_scale());
        let mut style = Stroke::new(ctx.scale_factor);
        if !cursor.active {
            let dashes = ERASER_IDLE_DASHES.map(|d| d * ctx.scale_factor);
            style = style.with_dashes(0.0, dashes);
        }
        self.scene.stroke(
            &style,
            Affine::IDENTITY,
            eraser_outline_color(cursor.active),
            None,
            &circle,
        );
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        // Clear the scene
        self.scene.reset();

        let viewport = Rect::from_origin_size(Point::ZERO, ctx.viewport_size);
        self.scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            self.background_color(ctx),
            None,
            &viewport,
        );

        let transform = ctx.transform();
        for stroke in ctx.strokes {
            self.render_polyline(&stroke.to_path(), stroke.color(), stroke.width(), transform);
        }

        if let Some(draft) = ctx.draft.filter(|draft| draft.len() > 1) {
            self.render_polyline(&draft.to_path(), draft.color(), draft.width(), transform);
        }

        self.render_eraser_cursor(ctx);
    }
}
