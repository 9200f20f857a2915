use core::fmt;

use embedded_graphics::prelude::Point;

use crate::grid::{DotGrid, DotId, MAX_DOTS};

/// Canonical encoding of an ordered dot sequence.
///
/// Each dot contributes one base-36 symbol of its 1-based row-major number,
/// so a 3x3 grid reads like a keypad (`"1236"`) and every supported grid size
/// encodes injectively.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature(heapless::String<MAX_DOTS>);

impl Signature {
    pub fn from_ids(ids: &[DotId], grid_size: u8) -> Self {
        let mut encoded = heapless::String::new();
        for id in ids {
            let number = id.index(grid_size) as u32 + 1;
            let symbol = char::from_digit(number, 36)
                .unwrap_or('?')
                .to_ascii_uppercase();
            if encoded.push(symbol).is_err() {
                break;
            }
        }
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered dots touched by the current (or most recent) gesture.
#[derive(Clone, Debug, Default)]
pub struct PatternPath {
    marked: heapless::Vec<DotId, MAX_DOTS>,
}

impl PatternPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marked(&self) -> &[DotId] {
        &self.marked
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }

    pub fn last(&self) -> Option<DotId> {
        self.marked.last().copied()
    }

    pub fn contains(&self, id: DotId) -> bool {
        self.marked.contains(&id)
    }

    pub fn clear(&mut self) {
        self.marked.clear();
    }

    pub fn signature(&self, grid_size: u8) -> Signature {
        Signature::from_ids(&self.marked, grid_size)
    }

    /// Hit-tests `point` against the untouched dots of `grid`; a hit marks
    /// the dot touched and appends it to the path.
    pub fn test_touch(&mut self, grid: &mut DotGrid, point: Point, now_ms: u64) -> Option<DotId> {
        let idx = grid.nearest_untouched(point)?;
        let id = grid.dots().get(idx)?.id;
        if self.contains(id) || self.marked.push(id).is_err() {
            return None;
        }
        grid.mark_touched(idx, now_ms);
        log::debug!(
            "pattern path: hit r{}c{} at ({}, {}) len={}",
            id.row,
            id.column,
            point.x,
            point.y,
            self.marked.len()
        );
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::prelude::Size;

    use super::*;
    use crate::grid::GridGeometry;

    fn grid(size: u8) -> DotGrid {
        let mut grid = DotGrid::new(GridGeometry {
            grid_size: size,
            dot_radius_percent: 12,
            hit_radius_percent: 35,
        });
        grid.ensure_layout(Size::new(100 * u32::from(size), 100 * u32::from(size)));
        grid
    }

    fn at(row: i32, column: i32) -> Point {
        Point::new(column * 100 + 50, row * 100 + 50)
    }

    #[test]
    fn keypad_signature_for_three_by_three() {
        let ids = [
            DotId::new(0, 0),
            DotId::new(0, 1),
            DotId::new(0, 2),
            DotId::new(1, 2),
        ];
        assert_eq!(Signature::from_ids(&ids, 3).as_str(), "1236");
    }

    #[test]
    fn larger_grids_use_letters_past_nine() {
        let ids = [DotId::new(2, 0), DotId::new(4, 4), DotId::new(0, 0)];
        assert_eq!(Signature::from_ids(&ids, 5).as_str(), "BP1");
    }

    #[test]
    fn signature_is_order_sensitive_and_stable() {
        let forward = [DotId::new(0, 0), DotId::new(1, 1), DotId::new(2, 2)];
        let backward = [DotId::new(2, 2), DotId::new(1, 1), DotId::new(0, 0)];
        let a = Signature::from_ids(&forward, 3);
        assert_eq!(a, Signature::from_ids(&forward, 3));
        assert_ne!(a, Signature::from_ids(&backward, 3));
    }

    #[test]
    fn every_permutation_of_a_set_has_a_distinct_signature() {
        let ids = [DotId::new(0, 0), DotId::new(1, 0), DotId::new(2, 1)];
        let orders = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        let mut seen: std::vec::Vec<Signature> = std::vec::Vec::new();
        for order in orders {
            let sequence = order.map(|i| ids[i]);
            let signature = Signature::from_ids(&sequence, 3);
            assert!(!seen.contains(&signature), "duplicate {signature}");
            seen.push(signature);
        }
    }

    #[test]
    fn touch_appends_in_order_without_repeats() {
        let mut grid = grid(3);
        let mut path = PatternPath::new();

        assert_eq!(path.test_touch(&mut grid, at(0, 0), 0), Some(DotId::new(0, 0)));
        assert_eq!(path.test_touch(&mut grid, at(0, 1), 1), Some(DotId::new(0, 1)));
        assert_eq!(path.test_touch(&mut grid, at(0, 0), 2), None);
        assert_eq!(path.test_touch(&mut grid, at(0, 1), 3), None);
        assert_eq!(path.test_touch(&mut grid, at(1, 1), 4), Some(DotId::new(1, 1)));

        assert_eq!(
            path.marked(),
            &[DotId::new(0, 0), DotId::new(0, 1), DotId::new(1, 1)]
        );
        assert_eq!(path.signature(3).as_str(), "125");
    }

    #[test]
    fn touch_between_dots_is_ignored() {
        let mut grid = grid(3);
        let mut path = PatternPath::new();
        assert_eq!(path.test_touch(&mut grid, Point::new(100, 100), 0), None);
        assert!(path.is_empty());
        assert!(grid.dots().iter().all(|dot| !dot.touched));
    }
}
