//! Proximity eraser.
//!
//! Erasing is a page-wide single-pass filter: a stroke touched anywhere by the
//! eraser is removed whole, never split.

use crate::board::Strokes;
use crate::stroke::StrokeId;
use kurbo::Point;
use std::sync::Arc;

/// Outcome of an eraser pass.
#[derive(Debug, Clone)]
pub struct Erasure {
    /// The page's strokes after the pass. Identical (same allocation) to the
    /// input when nothing was removed.
    pub strokes: Strokes,
    /// Ids of the removed strokes, in page order.
    pub removed: Vec<StrokeId>,
}

impl Erasure {
    /// Whether the pass removed anything.
    pub fn is_changed(&self) -> bool {
        !self.removed.is_empty()
    }
}

/// Remove every stroke with a segment within `eraser_radius + width / 2` of `pointer`.
pub fn erase_near(pointer: Point, strokes: &Strokes, eraser_radius: f64) -> Erasure {
    let removed: Vec<StrokeId> = strokes
        .iter()
        .filter(|stroke| stroke.is_near(pointer, eraser_radius))
        .map(|stroke| stroke.id())
        .collect();

    if removed.is_empty() {
        return Erasure {
            strokes: Arc::clone(strokes),
            removed,
        };
    }

    let kept: Strokes = strokes
        .iter()
        .filter(|stroke| !removed.contains(&stroke.id()))
        .cloned()
        .collect();

    log::debug!("Eraser at ({:.1}, {:.1}) removed {} stroke(s)", pointer.x, pointer.y, removed.len());

    Erasure {
        strokes: kept,
        removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Stroke;

    fn corner_stroke() -> Stroke {
        Stroke::new(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
            "#000000",
            4.0,
        )
        .unwrap()
    }

    fn page(strokes: Vec<Stroke>) -> Strokes {
        strokes.into()
    }

    #[test]
    fn test_erase_hit_on_segment() {
        let strokes = page(vec![corner_stroke()]);
        let result = erase_near(Point::new(10.0, 5.0), &strokes, 5.0);
        assert!(result.is_changed());
        assert!(result.strokes.is_empty());
        assert_eq!(result.removed, vec![strokes[0].id()]);
    }

    #[test]
    fn test_erase_miss_returns_same_collection() {
        let strokes = page(vec![corner_stroke()]);
        let result = erase_near(Point::new(30.0, 30.0), &strokes, 5.0);
        assert!(!result.is_changed());
        assert!(Arc::ptr_eq(&result.strokes, &strokes));
    }

    #[test]
    fn test_half_width_boundary() {
        // Horizontal stroke of width 4; eraser radius 5 reaches 7 units away.
        let stroke = Stroke::new(
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            "#000000",
            4.0,
        )
        .unwrap();
        let strokes = page(vec![stroke]);

        assert!(erase_near(Point::new(50.0, 7.0), &strokes, 5.0).is_changed());
        assert!(!erase_near(Point::new(50.0, 7.01), &strokes, 5.0).is_changed());
    }

    #[test]
    fn test_thick_strokes_are_easier_to_hit() {
        let thin = Stroke::new(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)], "#000", 2.0).unwrap();
        let thick = Stroke::new(vec![Point::new(0.0, 20.0), Point::new(100.0, 20.0)], "#000", 20.0).unwrap();
        let thick_id = thick.id();
        let strokes = page(vec![thin, thick]);

        // 13 units from the thick stroke's centre line, 7 from the thin one.
        let result = erase_near(Point::new(50.0, 7.0), &strokes, 5.0);
        assert_eq!(result.removed, vec![thick_id]);
        assert_eq!(result.strokes.len(), 1);
    }

    #[test]
    fn test_erase_removes_whole_stroke() {
        let long = Stroke::new(
            vec![Point::new(0.0, 0.0), Point::new(50.0, 0.0), Point::new(100.0, 0.0)],
            "#000000",
            2.0,
        )
        .unwrap();
        let strokes = page(vec![long]);
        let result = erase_near(Point::new(50.0, 0.0), &strokes, 1.0);
        assert!(result.strokes.is_empty());
    }

    #[test]
    fn test_erase_is_idempotent() {
        let keep = Stroke::new(vec![Point::new(200.0, 200.0), Point::new(210.0, 200.0)], "#000", 2.0).unwrap();
        let strokes = page(vec![corner_stroke(), keep]);

        let first = erase_near(Point::new(10.0, 5.0), &strokes, 5.0);
        let second = erase_near(Point::new(10.0, 5.0), &first.strokes, 5.0);

        assert_eq!(first.strokes.len(), 1);
        assert!(!second.is_changed());
        assert!(Arc::ptr_eq(&first.strokes, &second.strokes));
    }

    #[test]
    fn test_erase_preserves_order_of_survivors() {
        let a = Stroke::new(vec![Point::new(0.0, 100.0), Point::new(10.0, 100.0)], "#000", 2.0).unwrap();
        let b = corner_stroke();
        let c = Stroke::new(vec![Point::new(0.0, 200.0), Point::new(10.0, 200.0)], "#000", 2.0).unwrap();
        let (a_id, c_id) = (a.id(), c.id());
        let strokes = page(vec![a, b, c]);

        let result = erase_near(Point::new(10.0, 5.0), &strokes, 5.0);
        let ids: Vec<_> = result.strokes.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![a_id, c_id]);
    }
}
