// ABOUTME: Legacy display mode: a flat list of points drawn as separate line pairs.
// ABOUTME: No afterglow; the list is redrawn from scratch every frame until cleared.

use vcrt_core::Point;

/// Maximum number of points the list holds
pub const MAX_POINTS: usize = 65_536;

#[derive(Debug, Clone, Default)]
pub struct LegacyDisplay {
    points: Vec<Point>,
}

impl LegacyDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point. Returns false when the list is full and the point was dropped.
    pub fn add_point(&mut self, point: Point) -> bool {
        if self.points.len() >= MAX_POINTS {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Points taken two at a time; an odd trailing point is not drawn
    pub fn lines(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_points_into_lines() {
        let mut display = LegacyDisplay::new();
        for i in 0..5 {
            assert!(display.add_point(Point::new(i as f32, 0.0)));
        }
        let lines: Vec<_> = display.lines().collect();
        assert_eq!(
            lines,
            vec![
                (Point::new(0.0, 0.0), Point::new(1.0, 0.0)),
                (Point::new(2.0, 0.0), Point::new(3.0, 0.0)),
            ]
        );
    }

    #[test]
    fn clear_empties_list() {
        let mut display = LegacyDisplay::new();
        display.add_point(Point::ZERO);
        display.clear();
        assert!(display.is_empty());
        assert_eq!(display.lines().count(), 0);
    }

    #[test]
    fn drops_points_past_limit() {
        let mut display = LegacyDisplay::new();
        for _ in 0..MAX_POINTS {
            assert!(display.add_point(Point::ZERO));
        }
        assert!(!display.add_point(Point::new(1.0, 1.0)));
        assert_eq!(display.len(), MAX_POINTS);
    }
}
